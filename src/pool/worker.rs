//! Fixed-size worker pool over a bounded task queue.

use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use super::error::{PoolError, PoolResult};
use super::PoolStats;

/// A unit of work: a boxed callable run exactly once by some worker.
type Job = Box<dyn FnOnce() -> Result<(), String> + Send + 'static>;

struct Task {
    job: Job,
    /// Logical priority, recorded but never used for ordering.
    priority: u8,
    submitted_at: Instant,
}

struct QueueState {
    tasks: VecDeque<Task>,
    shutdown: bool,
    submitted: u64,
    dequeued: u64,
    completed: u64,
    failed: u64,
    rejected: u64,
    avg_queue_wait_secs: f64,
}

struct Shared {
    queue: Mutex<QueueState>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: usize,
}

/// A fixed set of worker threads draining a bounded FIFO task queue.
///
/// `submit` applies backpressure by blocking while the queue is full;
/// `shutdown_and_join` stops intake immediately but drains already-queued
/// tasks before workers exit. Tasks run outside the queue lock, and a
/// panicking or failing task is captured, logged and counted without
/// affecting its worker or other tasks.
pub struct WorkerPool {
    shared: Arc<Shared>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    worker_count: usize,
    name: String,
}

impl WorkerPool {
    /// Create a pool with `workers` threads and a queue bounded at `capacity`.
    ///
    /// # Panics
    /// Panics if `workers` or `capacity` is zero, or if a worker thread
    /// cannot be spawned.
    pub fn new(workers: usize, capacity: usize, name: impl Into<String>) -> Self {
        assert!(workers > 0, "pool must have at least one worker");
        assert!(capacity > 0, "queue capacity must be non-zero");
        let name = name.into();

        let shared = Arc::new(Shared {
            queue: Mutex::new(QueueState {
                tasks: VecDeque::with_capacity(capacity),
                shutdown: false,
                submitted: 0,
                dequeued: 0,
                completed: 0,
                failed: 0,
                rejected: 0,
                avg_queue_wait_secs: 0.0,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity,
        });

        let mut handles = Vec::with_capacity(workers);
        for id in 0..workers {
            let shared = Arc::clone(&shared);
            let handle = thread::Builder::new()
                .name(format!("{}-{}", name, id))
                .spawn(move || worker_loop(id, &shared))
                .expect("failed to spawn worker thread");
            handles.push(handle);
        }

        tracing::info!(
            pool = %name,
            workers,
            capacity,
            "worker pool created"
        );

        Self {
            shared,
            workers: Mutex::new(handles),
            worker_count: workers,
            name,
        }
    }

    /// Submit a task, blocking while the queue is full.
    ///
    /// Returns `Rejected` once shutdown has begun, including for callers
    /// already blocked on a full queue.
    pub fn submit<F>(&self, job: F) -> PoolResult<()>
    where
        F: FnOnce() -> Result<(), String> + Send + 'static,
    {
        self.submit_with_priority(job, 0)
    }

    /// Submit with a logical priority.
    ///
    /// The priority is recorded for observability only; dequeue order stays
    /// FIFO.
    pub fn submit_with_priority<F>(&self, job: F, priority: u8) -> PoolResult<()>
    where
        F: FnOnce() -> Result<(), String> + Send + 'static,
    {
        let mut queue = self.shared.queue.lock().unwrap();
        loop {
            if queue.shutdown {
                queue.rejected += 1;
                return Err(PoolError::Rejected);
            }
            if queue.tasks.len() < self.shared.capacity {
                break;
            }
            queue = self.shared.not_full.wait(queue).unwrap();
        }

        queue.tasks.push_back(Task {
            job: Box::new(job),
            priority,
            submitted_at: Instant::now(),
        });
        queue.submitted += 1;
        tracing::trace!(pool = %self.name, priority, queued = queue.tasks.len(), "task submitted");
        drop(queue);
        self.shared.not_empty.notify_one();
        Ok(())
    }

    /// Stop intake, drain the queue and join every worker.
    ///
    /// Idempotent: a second call finds no handles and returns immediately.
    /// Returns `WorkerPanic` if a worker thread itself died, which task
    /// panics (captured per-task) can never cause.
    pub fn shutdown_and_join(&self) -> PoolResult<()> {
        {
            let mut queue = self.shared.queue.lock().unwrap();
            if !queue.shutdown {
                queue.shutdown = true;
                tracing::info!(
                    pool = %self.name,
                    queued = queue.tasks.len(),
                    "shutting down worker pool"
                );
            }
        }
        // Wake workers waiting for tasks and submitters waiting for space.
        self.shared.not_empty.notify_all();
        self.shared.not_full.notify_all();

        let handles: Vec<_> = self.workers.lock().unwrap().drain(..).collect();
        let mut first_panic = None;
        for handle in handles {
            if let Err(payload) = handle.join() {
                first_panic.get_or_insert_with(|| panic_message(payload.as_ref()));
            }
        }
        match first_panic {
            Some(msg) => Err(PoolError::WorkerPanic(msg)),
            None => Ok(()),
        }
    }

    /// Number of worker threads.
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Maximum queued tasks.
    pub fn queue_capacity(&self) -> usize {
        self.shared.capacity
    }

    /// Tasks currently queued (not yet picked up by a worker).
    pub fn queue_len(&self) -> usize {
        self.shared.queue.lock().unwrap().tasks.len()
    }

    /// True once shutdown has begun.
    pub fn is_shutdown(&self) -> bool {
        self.shared.queue.lock().unwrap().shutdown
    }

    /// Pool name used in logs and worker thread names.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Snapshot of queue counters, taken under the lock.
    pub fn stats(&self) -> PoolStats {
        let queue = self.shared.queue.lock().unwrap();
        PoolStats {
            workers: self.worker_count,
            capacity: self.shared.capacity,
            queue_len: queue.tasks.len(),
            submitted: queue.submitted,
            completed: queue.completed,
            failed: queue.failed,
            rejected: queue.rejected,
            avg_queue_wait_secs: queue.avg_queue_wait_secs,
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        let _ = self.shutdown_and_join();
    }
}

fn worker_loop(id: usize, shared: &Shared) {
    tracing::debug!(worker = id, "worker started");
    loop {
        let task = {
            let mut queue = shared.queue.lock().unwrap();
            while queue.tasks.is_empty() && !queue.shutdown {
                queue = shared.not_empty.wait(queue).unwrap();
            }
            let Some(task) = queue.tasks.pop_front() else {
                // Empty after the wait loop means shutdown with a drained queue.
                break;
            };
            queue.dequeued += 1;
            let waited = task.submitted_at.elapsed().as_secs_f64();
            queue.avg_queue_wait_secs =
                (queue.avg_queue_wait_secs * (queue.dequeued - 1) as f64 + waited)
                    / queue.dequeued as f64;
            shared.not_full.notify_one();
            tracing::trace!(worker = id, priority = task.priority, "task dequeued");
            task
        };

        // Run outside the lock so execution never blocks other workers or
        // submitters.
        let result = catch_unwind(AssertUnwindSafe(move || (task.job)()));
        let mut queue = shared.queue.lock().unwrap();
        match result {
            Ok(Ok(())) => {
                queue.completed += 1;
            }
            Ok(Err(msg)) => {
                queue.failed += 1;
                tracing::error!(worker = id, error = %msg, "task failed");
            }
            Err(payload) => {
                queue.failed += 1;
                tracing::error!(
                    worker = id,
                    panic = %panic_message(payload.as_ref()),
                    "task panicked"
                );
            }
        }
    }
    tracing::debug!(worker = id, "worker stopped");
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
