use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;

use mipsim_core::bus::message::SimulationEvent;
use mipsim_core::bus::{Listener, Message, MessageBus};

use super::{bus, ping};
use crate::common::mocks::listener::{CountingListener, RecordingListener};

#[test]
fn every_listener_sees_every_message() {
    let bus = bus(8, None, 100);
    let listeners: Vec<_> = (0..16).map(|_| Arc::new(CountingListener::new())).collect();
    for listener in &listeners {
        let _ = bus.register(listener.clone());
    }

    bus.send_message(ping());
    bus.send_message(ping());

    assert!(bus.wait_idle(Duration::from_secs(5)));
    let total: usize = listeners.iter().map(|l| l.calls()).sum();
    assert_eq!(total, 32);
    assert!(listeners.iter().all(|l| l.calls() == 2));
    let _ = bus.shutdown();
}

#[test]
fn inline_bus_delivers_in_order_on_the_caller() {
    let bus = MessageBus::inline();
    let recorder = Arc::new(RecordingListener::new());
    let _ = bus.register(recorder.clone());

    bus.send_message(Message::Simulation(SimulationEvent::Started));
    bus.send_message(Message::Simulation(SimulationEvent::Paused));
    bus.send_message(Message::Simulation(SimulationEvent::Resumed));

    assert_eq!(
        recorder.messages(),
        vec![
            Message::Simulation(SimulationEvent::Started),
            Message::Simulation(SimulationEvent::Paused),
            Message::Simulation(SimulationEvent::Resumed),
        ]
    );
}

#[test]
fn unregistered_listeners_stop_receiving() {
    let bus = MessageBus::inline();
    let kept = Arc::new(CountingListener::new());
    let dropped = Arc::new(CountingListener::new());
    let _ = bus.register(kept.clone());
    let id = bus.register(dropped.clone());
    assert_eq!(bus.listener_count(), 2);

    bus.send_message(ping());
    assert!(bus.unregister(id));
    assert!(!bus.unregister(id));
    bus.send_message(ping());

    assert_eq!(bus.listener_count(), 1);
    assert_eq!(kept.calls(), 2);
    assert_eq!(dropped.calls(), 1);
}

#[test]
fn sending_without_listeners_is_a_no_op() {
    let bus = bus(2, None, 100);

    bus.send_message(ping());

    assert!(bus.wait_idle(Duration::from_millis(100)));
    let _ = bus.shutdown();
}

#[test]
fn saturated_pool_runs_overflow_on_the_sender() {
    let bus = bus(1, Some(1), 100);
    let slow = Arc::new(CountingListener::slow(Duration::from_millis(20)));
    let _ = bus.register(slow.clone());

    for _ in 0..6 {
        bus.send_message(ping());
    }

    assert!(bus.wait_idle(Duration::from_secs(5)));
    assert_eq!(slow.calls(), 6);
    let _ = bus.shutdown();
}

#[derive(Debug)]
struct Panicking;

impl Listener for Panicking {
    fn on_simulation(&self, _event: SimulationEvent) {
        panic!("listener failure");
    }
}

#[test]
fn a_panicking_listener_does_not_stop_dispatch() {
    let bus = MessageBus::inline();
    let _ = bus.register(Arc::new(Panicking));
    let counter = Arc::new(CountingListener::new());
    let _ = bus.register(counter.clone());

    bus.send_message(ping());
    bus.send_message(ping());

    assert_eq!(counter.calls(), 2);
}
