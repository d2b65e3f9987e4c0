//! # Task System Core Traits
//!
//! This module defines the fundamental building blocks of the task system.
//!
//! ## Core Components
//! - `Task`: a unit of work executed on a worker thread
//! - `TaskResult`: what a worker hands back to the owning thread
//! - `TaskFailure`: a task that panicked instead of producing output
//!
//! ## Task Lifecycle
//! 1. A `Task` is created and scheduled via `TaskManager::publish_task()`
//! 2. The task's `process()` method is called on a worker thread
//! 3. The output (or the failure) is wrapped in a `TaskResult` with the task's key
//! 4. The owning thread collects results through `TaskManager::process_completed_tasks()`
//!
//! ## Thread Safety
//! - `Task` must be `Send` to be transferred between threads
//! - Its key and output must be `Send` to be transferred back
//! - Tasks own their inputs; they never reach into owning-thread state

use std::any::Any;

use thiserror::Error;

/// A unit of work that can be executed on a worker thread.
///
/// Tasks should be self-contained and own all the data they need. The key
/// identifies the task to the owning thread when its result comes back.
pub trait Task: Send + 'static {
    /// Identifies the task in its result.
    type Key: Send + 'static;
    /// What a successful run produces.
    type Output: Send + 'static;

    /// The key reported alongside this task's result.
    fn key(&self) -> Self::Key;

    /// Performs the work. Runs on a worker thread.
    fn process(&self) -> Self::Output;
}

/// A task that panicked on its worker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("task panicked: {message}")]
pub struct TaskFailure {
    /// Panic payload, when it was a string.
    pub message: String,
}

impl TaskFailure {
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(message) = payload.downcast_ref::<&str>() {
            (*message).to_string()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            "non-string panic payload".to_string()
        };
        TaskFailure { message }
    }
}

/// The outcome of one task, delivered to the owning thread.
pub struct TaskResult<T: Task> {
    /// Key of the task that produced this result.
    pub key: T::Key,
    /// The task's output, or the reason it has none.
    pub output: Result<T::Output, TaskFailure>,
}
