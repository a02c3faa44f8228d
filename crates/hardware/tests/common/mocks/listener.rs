use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use mipsim_core::bus::Listener;
use mipsim_core::bus::Message;
use mipsim_core::bus::message::PipelineStateMessage;
use mipsim_core::core::pipeline::hazards::HazardKind;

/// Records every message in arrival order.
#[derive(Debug, Default)]
pub struct RecordingListener {
    messages: Mutex<Vec<Message>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.messages.lock().unwrap().clone()
    }

    pub fn hazards(&self) -> Vec<HazardKind> {
        self.messages()
            .into_iter()
            .filter_map(|m| match m {
                Message::PipelineHazard(kind) => Some(kind),
                _ => None,
            })
            .collect()
    }

    pub fn pipeline_states(&self) -> Vec<PipelineStateMessage> {
        self.messages()
            .into_iter()
            .filter_map(|m| match m {
                Message::PipelineState(state) => Some(state),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, name: &str) -> usize {
        self.messages().iter().filter(|m| m.name() == name).count()
    }
}

impl Listener for RecordingListener {
    fn handle(&self, message: &Message) {
        self.messages.lock().unwrap().push(message.clone());
    }
}

/// Counts invocations, optionally sleeping in each one and optionally critical.
#[derive(Debug, Default)]
pub struct CountingListener {
    calls: AtomicUsize,
    delay: Duration,
    critical: bool,
}

impl CountingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn critical(delay: Duration) -> Self {
        Self {
            delay,
            critical: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Listener for CountingListener {
    fn is_critical(&self, _message: &Message) -> bool {
        self.critical
    }

    fn handle(&self, _message: &Message) {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        let _ = self.calls.fetch_add(1, Ordering::SeqCst);
    }
}
