//! Bounded worker pool with caller-runs overflow.
//!
//! Tasks are queued on a bounded channel served by a fixed set of worker threads. When
//! the queue is full the submitting thread runs the task itself, so submission never
//! blocks indefinitely and never drops work. It provides:
//! 1. **Dispatch:** `submit` queues or runs inline.
//! 2. **Accounting:** A live counter of outstanding tasks with a bounded idle wait.
//! 3. **Shutdown:** Bounded drain, then cancellation of queued tasks and release of workers.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::{Arc, Condvar, Mutex, PoisonError, RwLock};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::common::constants::POLL_INTERVAL_MS;

/// A unit of work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// A counter that can be waited on until it reaches zero.
#[derive(Debug, Default)]
pub struct TaskCounter {
    count: Mutex<usize>,
    zero: Condvar,
}

impl TaskCounter {
    /// Increments the counter and returns a guard that decrements it when dropped.
    pub fn track(self: &Arc<Self>) -> CounterGuard {
        *self.count.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        CounterGuard {
            counter: Arc::clone(self),
        }
    }

    /// Current value.
    pub fn get(&self) -> usize {
        *self.count.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Waits until the counter is zero.
    ///
    /// # Returns
    ///
    /// `false` if `timeout` elapsed first.
    pub fn wait_zero(&self, timeout: Duration) -> bool {
        let guard = self.count.lock().unwrap_or_else(PoisonError::into_inner);
        let (guard, _) = self
            .zero
            .wait_timeout_while(guard, timeout, |count| *count > 0)
            .unwrap_or_else(PoisonError::into_inner);
        *guard == 0
    }

    fn decrement(&self) {
        let mut count = self.count.lock().unwrap_or_else(PoisonError::into_inner);
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.zero.notify_all();
        }
    }
}

/// Decrements its `TaskCounter` on drop, including when a task panics or is discarded.
#[derive(Debug)]
pub struct CounterGuard {
    counter: Arc<TaskCounter>,
}

impl Drop for CounterGuard {
    fn drop(&mut self) {
        self.counter.decrement();
    }
}

/// Outcome of `WorkerPool::shutdown`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Every outstanding task finished within the timeout.
    pub drained: bool,
    /// Workers still busy at the deadline, released without joining.
    pub detached: usize,
}

fn run_guarded(task: Task) {
    if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
        warn!("bus task panicked");
    }
}

/// Fixed-size thread pool with a bounded queue and caller-runs overflow.
#[derive(Debug)]
pub struct WorkerPool {
    sender: RwLock<Option<SyncSender<Task>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    pending: Arc<TaskCounter>,
    cancelled: Arc<AtomicBool>,
}

impl WorkerPool {
    /// Starts `workers` threads sharing a queue of `capacity` tasks.
    ///
    /// With zero workers every task runs on the submitting thread.
    pub fn new(workers: usize, capacity: usize) -> Self {
        let pending = Arc::new(TaskCounter::default());
        let cancelled = Arc::new(AtomicBool::new(false));
        if workers == 0 {
            return Self {
                sender: RwLock::new(None),
                workers: Mutex::new(Vec::new()),
                pending,
                cancelled,
            };
        }

        let (tx, rx) = mpsc::sync_channel::<Task>(capacity.max(1));
        let rx = Arc::new(Mutex::new(rx));
        let handles = (0..workers)
            .map(|id| {
                let rx = Arc::clone(&rx);
                let cancelled = Arc::clone(&cancelled);
                thread::Builder::new()
                    .name(format!("bus-worker-{id}"))
                    .spawn(move || worker_loop(&rx, &cancelled))
            })
            .filter_map(Result::ok)
            .collect::<Vec<_>>();
        debug!(workers = handles.len(), capacity, "bus pool started");

        Self {
            sender: RwLock::new(if handles.is_empty() { None } else { Some(tx) }),
            workers: Mutex::new(handles),
            pending,
            cancelled,
        }
    }

    /// Number of live worker threads.
    pub fn workers(&self) -> usize {
        self.workers.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Tasks submitted but not yet finished.
    pub fn pending(&self) -> usize {
        self.pending.get()
    }

    /// Queues a task, or runs it on the calling thread if the queue is full or the pool
    /// has no workers.
    pub fn submit(&self, task: Task) {
        let guard = self.pending.track();
        let task: Task = Box::new(move || {
            task();
            drop(guard);
        });
        let sender = self.sender.read().unwrap_or_else(PoisonError::into_inner);
        let overflow = match sender.as_ref() {
            Some(tx) => match tx.try_send(task) {
                Ok(()) => None,
                Err(TrySendError::Full(task) | TrySendError::Disconnected(task)) => Some(task),
            },
            None => Some(task),
        };
        drop(sender);
        if let Some(task) = overflow {
            run_guarded(task);
        }
    }

    /// Waits up to `timeout` for every outstanding task to finish.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        self.pending.wait_zero(timeout)
    }

    /// Stops the pool.
    ///
    /// Waits up to `timeout` for outstanding tasks. If they do not drain, queued tasks
    /// are discarded unrun. Workers are then joined until the same deadline; any still
    /// busy afterwards are detached and left to exit on their own.
    pub fn shutdown(&self, timeout: Duration) -> ShutdownReport {
        let deadline = Instant::now() + timeout;
        let drained = self.wait_idle(timeout);
        if !drained {
            self.cancelled.store(true, Ordering::SeqCst);
            warn!(pending = self.pending(), "bus shutdown timed out, cancelling queued tasks");
        }
        drop(
            self.sender
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .take(),
        );

        let mut handles: Vec<JoinHandle<()>> = self
            .workers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        loop {
            let (finished, busy): (Vec<_>, Vec<_>) =
                handles.into_iter().partition(JoinHandle::is_finished);
            for handle in finished {
                let _ = handle.join();
            }
            handles = busy;
            if handles.is_empty() || Instant::now() >= deadline {
                break;
            }
            thread::sleep(Duration::from_millis(POLL_INTERVAL_MS));
        }
        let detached = handles.len();
        if detached > 0 {
            warn!(detached, "bus workers still busy after shutdown timeout, detaching");
        }
        ShutdownReport { drained, detached }
    }
}

fn worker_loop(rx: &Mutex<Receiver<Task>>, cancelled: &AtomicBool) {
    loop {
        let next = match rx.lock() {
            Ok(guard) => guard.recv(),
            Err(_) => break,
        };
        let Ok(task) = next else {
            break;
        };
        if cancelled.load(Ordering::SeqCst) {
            drop(task);
            continue;
        }
        run_guarded(task);
    }
}
