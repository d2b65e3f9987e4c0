use std::{
    cell::{Ref, RefCell, RefMut},
    rc::Rc,
};

/// A single-threaded, reference-counted handle with interior mutability.
///
/// `StResource` is deliberately `!Send`: a value behind it can only be touched
/// by the thread that created it. This is how the engine guarantees that worker
/// threads never see the world block map or the edit store.
///
/// # Examples
///
/// ```
/// use voxel_world::core::StResource;
///
/// let counter = StResource::new(0u32);
/// let alias = counter.clone();
///
/// *alias.get_mut() += 1;
/// assert_eq!(*counter.get(), 1);
/// assert_eq!(counter.handle_count(), 2);
/// ```
///
/// # Panics
/// Borrowing follows `RefCell` rules: taking `get_mut()` while any other guard
/// from the same handle family is alive panics. Guards should be scoped to a
/// single operation and never held across calls into other subsystems.
pub struct StResource<T> {
    resource: Rc<RefCell<T>>,
}

impl<T> StResource<T> {
    /// Wraps `resource` in a new handle.
    pub fn new(resource: T) -> Self {
        Self {
            resource: Rc::new(RefCell::new(resource)),
        }
    }

    /// Borrows the contained value immutably.
    pub fn get(&self) -> Ref<'_, T> {
        self.resource.borrow()
    }

    /// Borrows the contained value mutably.
    pub fn get_mut(&self) -> RefMut<'_, T> {
        self.resource.borrow_mut()
    }

    /// Number of live handles pointing at the same value.
    pub fn handle_count(&self) -> usize {
        Rc::strong_count(&self.resource)
    }
}

impl<T: Default> Default for StResource<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Clone for StResource<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
        }
    }
}
