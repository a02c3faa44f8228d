use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;

use mipsim_core::bus::MessageBus;
use mipsim_core::bus::pool::ShutdownReport;

use super::{bus, ping};
use crate::common::mocks::listener::CountingListener;

#[test]
fn idle_bus_drains_cleanly() {
    let bus = bus(4, None, 500);
    let counter = Arc::new(CountingListener::new());
    let _ = bus.register(counter.clone());
    bus.send_message(ping());

    let report = bus.shutdown();

    assert_eq!(
        report,
        ShutdownReport {
            drained: true,
            detached: 0
        }
    );
    assert_eq!(counter.calls(), 1);
}

#[test]
fn inline_bus_has_nothing_to_drain() {
    let bus = MessageBus::inline();

    assert_eq!(
        bus.shutdown(),
        ShutdownReport {
            drained: true,
            detached: 0
        }
    );
}

#[test]
fn timed_out_shutdown_cancels_queued_tasks_and_detaches_busy_workers() {
    let bus = bus(1, Some(4), 20);
    let slow = Arc::new(CountingListener::slow(Duration::from_millis(300)));
    let _ = bus.register(slow.clone());
    for _ in 0..3 {
        bus.send_message(ping());
    }

    let report = bus.shutdown();

    assert!(!report.drained);
    assert_eq!(report.detached, 1);
    // the running task finishes; the two queued behind it are dropped
    assert!(bus.wait_idle(Duration::from_secs(5)));
    assert_eq!(slow.calls(), 1);
}

#[test]
fn messages_after_shutdown_run_on_the_sender() {
    let bus = bus(2, None, 200);
    let counter = Arc::new(CountingListener::new());
    let _ = bus.register(counter.clone());
    let _ = bus.shutdown();

    bus.send_message(ping());

    assert_eq!(counter.calls(), 1);
}
