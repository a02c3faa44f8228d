//! Message bus.
//!
//! One-directional publish/subscribe from the simulation engine to any number of
//! observers. It provides:
//! 1. **Registry:** Listeners register and unregister concurrently with dispatch; a
//!    change only affects later dispatches.
//! 2. **Fan-out:** Each send becomes one task per listener on a bounded worker pool,
//!    overflowing onto the sending thread when the pool is saturated.
//! 3. **Critical Wait:** A live count of critical processing that the sender may wait on,
//!    bounded by a timeout after which it warns and proceeds.
//! 4. **Shutdown:** Bounded drain, then cancellation of whatever is still queued.

/// Listener capability trait.
pub mod listener;

/// Message taxonomy.
pub mod message;

/// Worker pool with caller-runs overflow.
pub mod pool;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tracing::{trace, warn};

use crate::config::BusConfig;

pub use self::listener::Listener;
pub use self::message::Message;

use self::pool::{ShutdownReport, TaskCounter, WorkerPool};

/// Handle returned by `register`, used to unregister.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Registry = Vec<(ListenerId, Arc<dyn Listener>)>;

/// Publish/subscribe hub between the engine and its observers.
pub struct MessageBus {
    listeners: RwLock<Registry>,
    next_id: AtomicU64,
    pool: WorkerPool,
    critical: Arc<TaskCounter>,
    critical_timeout: Duration,
    critical_timeouts: AtomicU64,
}

impl std::fmt::Debug for MessageBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageBus")
            .field("listeners", &self.listener_count())
            .field("pool", &self.pool)
            .field("critical_timeout", &self.critical_timeout)
            .finish_non_exhaustive()
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new(&BusConfig::default())
    }
}

impl MessageBus {
    /// Creates a bus with its worker pool sized from `config`.
    pub fn new(config: &BusConfig) -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(0),
            pool: WorkerPool::new(config.workers, config.queue_capacity()),
            critical: Arc::new(TaskCounter::default()),
            critical_timeout: Duration::from_millis(config.critical_timeout_ms),
            critical_timeouts: AtomicU64::new(0),
        }
    }

    /// A bus that dispatches every message on the sending thread.
    pub fn inline() -> Self {
        Self::new(&BusConfig {
            workers: 0,
            ..BusConfig::default()
        })
    }

    /// Registers a listener for subsequent dispatches.
    pub fn register(&self, listener: Arc<dyn Listener>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));
        id
    }

    /// Removes a listener.
    ///
    /// # Returns
    ///
    /// `false` if the id was not registered.
    pub fn unregister(&self, id: ListenerId) -> bool {
        let mut listeners = self
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Delivers `message` to every listener registered at the time of the call.
    ///
    /// Delivery is asynchronous unless the pool is saturated or has no workers, in which
    /// case some or all handlers run before this returns.
    pub fn send_message(&self, message: Message) {
        let targets: Vec<Arc<dyn Listener>> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        if targets.is_empty() {
            return;
        }
        trace!(kind = message.name(), listeners = targets.len(), "dispatch");
        let message = Arc::new(message);
        for listener in targets {
            let critical = listener
                .is_critical(&message)
                .then(|| self.critical.track());
            let message = Arc::clone(&message);
            self.pool.submit(Box::new(move || {
                listener.handle(&message);
                drop(critical);
            }));
        }
    }

    /// Waits up to the configured timeout for outstanding critical processing.
    ///
    /// # Returns
    ///
    /// `false` if the wait timed out; a warning is logged and the caller proceeds.
    pub fn wait_for_critical(&self) -> bool {
        if self.critical.wait_zero(self.critical_timeout) {
            return true;
        }
        let _ = self.critical_timeouts.fetch_add(1, Ordering::Relaxed);
        warn!(
            outstanding = self.critical.get(),
            timeout_ms = self.critical_timeout.as_millis() as u64,
            "critical listeners did not finish in time"
        );
        false
    }

    /// Number of critical waits that timed out.
    pub fn critical_timeouts(&self) -> u64 {
        self.critical_timeouts.load(Ordering::Relaxed)
    }

    /// Waits up to `timeout` for every dispatched task to finish.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        self.pool.wait_idle(timeout)
    }

    /// Stops dispatch workers, bounded by the critical timeout.
    pub fn shutdown(&self) -> ShutdownReport {
        self.pool.shutdown(self.critical_timeout)
    }
}
