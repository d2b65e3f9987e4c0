//! # Task Management System
//!
//! This module provides a fixed-size worker pool for running pure compute jobs
//! off the owning thread. Workers never see owning-thread state: a task carries
//! its inputs in, and its output comes back through a single FIFO result
//! channel that only the owning thread drains.
//!
//! ## Architecture Overview
//!
//! - `TaskManager`: central coordinator for task distribution and result collection
//! - `Task`: a unit of work that can be executed on a worker
//! - `TaskResult`: the key of a finished task plus its output or failure
//! - `TaskChannel`: the owning thread's handle on one worker
//!
//! ## Task Lifecycle
//! 1. Tasks are published via `TaskManager::publish_task()`
//! 2. The manager hands them to idle workers round-robin, queueing the rest
//! 3. Workers run `Task::process` inside `catch_unwind`, so a panicking task
//!    becomes a `TaskFailure` instead of a dead worker
//! 4. The owning thread collects results with `process_completed_tasks()`, which
//!    also feeds queued tasks to workers that just became idle
//!
//! ## Shutdown
//! `shutdown()` stops accepting work, drops the queue and closes every worker's
//! task channel without joining. Jobs already running finish on their own and
//! their results are never read.
//!
//! ## Example Usage
//! ```
//! use voxel_world::engine_state::task_management::{task::Task, TaskManager};
//!
//! struct Square(u64);
//!
//! impl Task for Square {
//!     type Key = u64;
//!     type Output = u64;
//!     fn key(&self) -> u64 { self.0 }
//!     fn process(&self) -> u64 { self.0 * self.0 }
//! }
//!
//! let mut task_manager = TaskManager::new(2);
//! task_manager.publish_task(Square(3));
//!
//! let mut results = Vec::new();
//! while results.is_empty() {
//!     results = task_manager.process_completed_tasks();
//!     std::thread::yield_now();
//! }
//! assert_eq!(results[0].output, Ok(9));
//! ```

pub mod task;

use std::{
    collections::VecDeque,
    panic::{self, AssertUnwindSafe},
    sync::mpsc::{channel, Receiver, Sender},
    thread::{self, JoinHandle},
};

use log::{debug, error, info};
use task::{Task, TaskFailure, TaskResult};

/// Maximum number of tasks that can be in flight per worker channel.
///
/// Kept at 1 so a busy worker never holds work another idle worker could take.
pub const MAX_TASKS_IN_FLIGHT: usize = 1;

/// The owning thread's end of one worker.
struct TaskChannel<T: Task> {
    /// `None` once the pool has shut down
    task_sender: Option<Sender<T>>,
    num_tasks_in_flight: usize,
    _worker: JoinHandle<()>,
}

/// Manages a pool of worker threads and coordinates task execution.
///
/// The `TaskManager` is responsible for:
/// - Creating the worker threads
/// - Distributing tasks across available workers
/// - Collecting task results in completion order
/// - Queuing tasks while all workers are busy
///
/// A pool with zero workers is valid: every task stays queued. This keeps
/// scheduling deterministic in tests.
pub struct TaskManager<T: Task> {
    channels: Vec<TaskChannel<T>>,
    result_receiver: Receiver<(usize, TaskResult<T>)>,
    queued_tasks: VecDeque<T>,
    current_channel: usize,
    accepting: bool,
}

impl<T: Task> TaskManager<T> {
    /// Creates a new `TaskManager` with the specified number of worker threads.
    ///
    /// A worker whose thread cannot be spawned is logged and left out of the
    /// pool.
    pub fn new(num_workers: usize) -> Self {
        let (result_tx, result_rx) = channel::<(usize, TaskResult<T>)>();
        let mut channels = Vec::with_capacity(num_workers);

        info!(
            "Starting {} workers (available parallelism: {:?})",
            num_workers,
            thread::available_parallelism()
        );

        for _ in 0..num_workers {
            let index = channels.len();
            let (task_tx, task_rx) = channel::<T>();
            let result_tx = result_tx.clone();

            let task_closure = move || {
                while let Ok(task) = task_rx.recv() {
                    let key = task.key();
                    let output = panic::catch_unwind(AssertUnwindSafe(|| task.process()))
                        .map_err(TaskFailure::from_panic);
                    if result_tx.send((index, TaskResult { key, output })).is_err() {
                        break;
                    }
                }
            };

            match thread::Builder::new()
                .name(format!("worker-{}", index))
                .spawn(task_closure)
            {
                Ok(worker) => channels.push(TaskChannel {
                    task_sender: Some(task_tx),
                    num_tasks_in_flight: 0,
                    _worker: worker,
                }),
                Err(spawn_error) => error!("Failed to spawn worker {}: {}", index, spawn_error),
            }
        }

        TaskManager {
            channels,
            result_receiver: result_rx,
            queued_tasks: VecDeque::new(),
            current_channel: 0,
            accepting: true,
        }
    }

    /// Attempts to send a task to a specific worker channel.
    ///
    /// # Returns
    /// - `Ok(())` if the task was handed to the worker
    /// - `Err(task)` if the worker is gone, giving the task back for requeueing
    fn try_send_task(&mut self, task: T, channel_idx: usize) -> Result<(), T> {
        let channel = &mut self.channels[channel_idx];
        let Some(sender) = &channel.task_sender else {
            return Err(task);
        };
        match sender.send(task) {
            Ok(()) => {
                channel.num_tasks_in_flight += 1;
                Ok(())
            }
            Err(send_error) => Err(send_error.0),
        }
    }

    /// Finds an idle worker, round-robin from the last one used.
    fn find_available_channel(&self) -> Option<usize> {
        let count = self.channels.len();
        (0..count)
            .map(|offset| (self.current_channel + offset) % count)
            .find(|&index| {
                let channel = &self.channels[index];
                channel.task_sender.is_some() && channel.num_tasks_in_flight < MAX_TASKS_IN_FLIGHT
            })
    }

    /// Publishes a new task for execution.
    ///
    /// # Returns
    /// - `true` if the task was immediately handed to a worker
    /// - `false` if it was queued, or dropped because the pool has shut down
    pub fn publish_task(&mut self, task: T) -> bool {
        if !self.accepting {
            debug!("Task rejected: pool is shut down");
            return false;
        }

        match self.find_available_channel() {
            Some(channel_idx) => match self.try_send_task(task, channel_idx) {
                Ok(()) => {
                    self.current_channel = (channel_idx + 1) % self.channels.len();
                    true
                }
                Err(task) => {
                    self.queued_tasks.push_back(task);
                    false
                }
            },
            None => {
                self.queued_tasks.push_back(task);
                false
            }
        }
    }

    /// Hands queued tasks, oldest first, to any idle workers.
    pub fn process_queued_tasks(&mut self) {
        while !self.queued_tasks.is_empty() {
            let Some(channel_idx) = self.find_available_channel() else {
                break;
            };
            let Some(task) = self.queued_tasks.pop_front() else {
                break;
            };
            match self.try_send_task(task, channel_idx) {
                Ok(()) => self.current_channel = (channel_idx + 1) % self.channels.len(),
                Err(task) => {
                    self.queued_tasks.push_front(task);
                    break;
                }
            }
        }
    }

    /// Collects every result that has arrived since the last call.
    ///
    /// Results come back in completion order. Workers freed by these results
    /// are immediately given queued tasks.
    pub fn process_completed_tasks(&mut self) -> Vec<TaskResult<T>> {
        let mut results = Vec::new();
        while let Ok((channel_idx, result)) = self.result_receiver.try_recv() {
            if let Some(channel) = self.channels.get_mut(channel_idx) {
                channel.num_tasks_in_flight = channel.num_tasks_in_flight.saturating_sub(1);
            }
            results.push(result);
        }

        if self.accepting {
            self.process_queued_tasks();
        }
        results
    }

    /// Stops accepting work and releases the workers without waiting for them.
    pub fn shutdown(&mut self) {
        if !self.accepting {
            return;
        }
        self.accepting = false;

        let dropped = self.queued_tasks.len();
        self.queued_tasks.clear();
        let in_flight = self.tasks_in_flight();
        for channel in &mut self.channels {
            channel.task_sender = None;
        }

        info!(
            "Worker pool shut down ({} queued tasks dropped, {} left running)",
            dropped, in_flight
        );
    }

    /// Whether new tasks are still accepted.
    pub fn is_accepting(&self) -> bool {
        self.accepting
    }

    /// Number of worker threads in the pool.
    pub fn worker_count(&self) -> usize {
        self.channels.len()
    }

    /// Tasks waiting for an idle worker.
    pub fn queued_len(&self) -> usize {
        self.queued_tasks.len()
    }

    /// Tasks handed to workers whose results have not been collected.
    pub fn tasks_in_flight(&self) -> usize {
        self.channels
            .iter()
            .map(|channel| channel.num_tasks_in_flight)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    struct Double(u32);

    impl Task for Double {
        type Key = u32;
        type Output = u32;

        fn key(&self) -> u32 {
            self.0
        }

        fn process(&self) -> u32 {
            if self.0 == 13 {
                panic!("unlucky input");
            }
            self.0 * 2
        }
    }

    fn collect(manager: &mut TaskManager<Double>, expected: usize) -> Vec<TaskResult<Double>> {
        let mut results = Vec::new();
        for _ in 0..5_000 {
            results.extend(manager.process_completed_tasks());
            if results.len() >= expected {
                break;
            }
            thread::sleep(Duration::from_millis(1));
        }
        results
    }

    #[test]
    fn test_every_task_completes() {
        let mut manager = TaskManager::new(2);
        for value in 0..10 {
            manager.publish_task(Double(value));
        }
        assert!(manager.tasks_in_flight() <= 2);

        let mut results = collect(&mut manager, 10);
        results.sort_by_key(|result| result.key);

        assert_eq!(results.len(), 10);
        for (value, result) in results.iter().enumerate() {
            assert_eq!(result.key, value as u32);
            assert_eq!(result.output, Ok(value as u32 * 2));
        }
        assert_eq!(manager.queued_len(), 0);
        assert_eq!(manager.tasks_in_flight(), 0);
    }

    #[test]
    fn test_panicking_task_is_reported() {
        let mut manager = TaskManager::new(1);
        manager.publish_task(Double(13));
        manager.publish_task(Double(4));

        let mut results = collect(&mut manager, 2);
        results.sort_by_key(|result| result.key);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].output, Ok(8));
        let failure = results[1].output.as_ref().unwrap_err();
        assert_eq!(failure.message, "unlucky input");
    }

    #[test]
    fn test_zero_workers_keeps_tasks_queued() {
        let mut manager = TaskManager::new(0);
        assert!(!manager.publish_task(Double(1)));
        assert!(!manager.publish_task(Double(2)));

        assert!(manager.process_completed_tasks().is_empty());
        assert_eq!(manager.queued_len(), 2);
        assert_eq!(manager.worker_count(), 0);
    }

    #[test]
    fn test_shutdown_rejects_new_tasks() {
        let mut manager = TaskManager::new(0);
        manager.publish_task(Double(1));
        manager.shutdown();

        assert!(!manager.is_accepting());
        assert_eq!(manager.queued_len(), 0);
        assert!(!manager.publish_task(Double(2)));
        assert_eq!(manager.queued_len(), 0);
    }
}
