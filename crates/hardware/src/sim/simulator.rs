//! Simulator: owns the CPU on a dedicated simulation thread.
//!
//! The controller drives the fetch-decode-execute loop and exposes lifecycle control
//! to other threads. It provides:
//! 1. **Lifecycle:** `NotRunning → Running ⇄ Paused → Stopped → NotRunning`, broadcast
//!    as `Simulation` messages. A stop request is sampled once per cycle; `join` returns
//!    the controller to `NotRunning`, after which `load` installs the next program.
//! 2. **Single Writer:** Registers and memory are only touched by the simulation
//!    thread; snapshots and register writes are marshalled through a command channel.
//! 3. **Pacing:** An optional clock frequency throttles the loop and an optional cycle
//!    cap bounds it.
//! 4. **Failure Handling:** A runtime exception is turned into a `Problem` message and
//!    an error-stream line, then the run stops cleanly.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::bus::message::{AnnotationMessage, ProblemMessage, SimulationEvent};
use crate::bus::{Message, MessageBus};
use crate::common::constants::POLL_INTERVAL_MS;
use crate::common::{Address, RegRef, RegisterFile, SimError, Word};
use crate::config::CpuConfig;
use crate::core::{Cpu, ExitStatus};
use crate::sim::io::{Io, Stream};
use crate::stats::SimStats;

/// How long a snapshot request waits for the simulation thread.
const SNAPSHOT_TIMEOUT: Duration = Duration::from_secs(1);

/// Lifecycle state of the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RunState {
    /// Created, not yet started.
    NotRunning,
    /// Executing cycles.
    Running,
    /// Started but holding between cycles.
    Paused,
    /// The run ended; `join` collects it.
    Stopped,
}

/// Misuse of the controller.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ControlError {
    /// `start` was called twice.
    #[error("simulation already started")]
    AlreadyStarted,
    /// `join` was called before `start`, or twice.
    #[error("simulation is not running")]
    NotStarted,
    /// `load` was called while a run is in progress or not yet joined.
    #[error("simulation is still running")]
    Busy,
    /// The simulation thread panicked.
    #[error("simulation thread panicked")]
    Panicked,
}

/// Outcome of a finished run.
#[derive(Debug)]
pub struct RunReport {
    /// Why the run ended.
    pub status: ExitStatus,
    /// The runtime exception that ended the run, if any.
    pub error: Option<SimError>,
    /// Final statistics.
    pub stats: SimStats,
    /// The CPU in its final state.
    pub cpu: Cpu,
}

enum Command {
    Snapshot(Sender<RegisterFile>),
    WriteRegister(RegRef, Word),
    Step,
}

struct Control {
    state: Mutex<RunState>,
    stop: AtomicBool,
}

impl Control {
    fn state(&self) -> RunState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: RunState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// Moves `from → to`; `false` if the state was something else.
    fn transition(&self, from: RunState, to: RunState) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state == from {
            *state = to;
            true
        } else {
            false
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Limits {
    period: Option<Duration>,
    max_cycles: Option<u64>,
}

/// Threaded run controller.
pub struct Simulator {
    control: Arc<Control>,
    bus: Arc<MessageBus>,
    io: Arc<dyn Io>,
    limits: Limits,
    commands: Sender<Command>,
    idle: Option<(Cpu, Receiver<Command>)>,
    handle: Option<JoinHandle<RunReport>>,
}

impl std::fmt::Debug for Simulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulator")
            .field("state", &self.state())
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl Simulator {
    /// Wraps a ready CPU. Nothing runs until `start`.
    ///
    /// # Arguments
    ///
    /// * `cpu` - The CPU, already loaded with a program.
    /// * `config` - Frequency and cycle cap.
    pub fn new(cpu: Cpu, config: &CpuConfig) -> Self {
        let bus = Arc::clone(cpu.bus());
        let io = Arc::clone(cpu.io());
        let (commands, receiver) = mpsc::channel();
        let period = (config.frequency_hz > 0)
            .then(|| Duration::from_nanos(1_000_000_000 / config.frequency_hz));
        Self {
            control: Arc::new(Control {
                state: Mutex::new(RunState::NotRunning),
                stop: AtomicBool::new(false),
            }),
            bus,
            io,
            limits: Limits {
                period,
                max_cycles: config.max_cycles,
            },
            commands,
            idle: Some((cpu, receiver)),
            handle: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RunState {
        self.control.state()
    }

    /// Starts the simulation thread.
    ///
    /// # Errors
    ///
    /// `ControlError::AlreadyStarted` on a second call.
    pub fn start(&mut self) -> Result<(), ControlError> {
        self.spawn(RunState::Running)
    }

    /// Starts the simulation thread in the paused state, for stepping.
    ///
    /// # Errors
    ///
    /// `ControlError::AlreadyStarted` on a second call.
    pub fn start_paused(&mut self) -> Result<(), ControlError> {
        self.spawn(RunState::Paused)
    }

    fn spawn(&mut self, initial: RunState) -> Result<(), ControlError> {
        let (cpu, receiver) = self.idle.take().ok_or(ControlError::AlreadyStarted)?;
        self.control.set_state(initial);
        info!(pipelined = cpu.pipelined, "simulation started");
        self.bus
            .send_message(Message::Simulation(SimulationEvent::Started));

        let control = Arc::clone(&self.control);
        let limits = self.limits;
        let handle = thread::Builder::new()
            .name("simulation".to_string())
            .spawn(move || run(cpu, &control, &receiver, limits));
        match handle {
            Ok(handle) => {
                self.handle = Some(handle);
                Ok(())
            }
            Err(err) => {
                error!(%err, "could not spawn simulation thread");
                self.control.set_state(RunState::Stopped);
                Err(ControlError::Panicked)
            }
        }
    }

    /// Holds the run between cycles. Returns `false` if it was not running.
    pub fn pause(&self) -> bool {
        let paused = self
            .control
            .transition(RunState::Running, RunState::Paused);
        if paused {
            info!("simulation paused");
            self.bus
                .send_message(Message::Simulation(SimulationEvent::Paused));
        }
        paused
    }

    /// Continues a paused run. Returns `false` if it was not paused.
    pub fn resume(&self) -> bool {
        let resumed = self
            .control
            .transition(RunState::Paused, RunState::Running);
        if resumed {
            info!("simulation resumed");
            self.bus
                .send_message(Message::Simulation(SimulationEvent::Resumed));
        }
        resumed
    }

    /// Executes one cycle of a paused run. Returns `false` if it is not paused.
    pub fn step(&self) -> bool {
        self.state() == RunState::Paused && self.commands.send(Command::Step).is_ok()
    }

    /// Executes one cycle of a paused run and waits for it to finish.
    ///
    /// Unlike `step`, this blocks for as long as the cycle takes, including a read
    /// syscall waiting on input.
    ///
    /// # Returns
    ///
    /// The registers after the cycle, or `None` if the run was not paused or ended
    /// during the cycle.
    pub fn step_and_wait(&self) -> Option<RegisterFile> {
        if !self.step() {
            return None;
        }
        let (tx, rx) = mpsc::channel();
        self.commands.send(Command::Snapshot(tx)).ok()?;
        rx.recv().ok()
    }

    /// Requests the run to stop after the current cycle and cancels any blocked read.
    ///
    /// Idempotent; only the first call broadcasts `Stopping`.
    pub fn stop(&self) {
        if self.control.stop.swap(true, Ordering::SeqCst) {
            return;
        }
        info!("simulation stopping");
        self.io.cancel_read();
        self.bus
            .send_message(Message::Simulation(SimulationEvent::Stopping));
    }

    /// Waits for the simulation thread to end.
    ///
    /// # Errors
    ///
    /// `ControlError::NotStarted` if there is no thread to join, or
    /// `ControlError::Panicked` if it panicked. Either way the controller is back in
    /// `NotRunning` afterwards.
    pub fn join(&mut self) -> Result<RunReport, ControlError> {
        let handle = self.handle.take().ok_or(ControlError::NotStarted)?;
        let report = handle.join().map_err(|_| ControlError::Panicked);
        self.control.set_state(RunState::NotRunning);
        report
    }

    /// Installs a fresh CPU for another run on this controller.
    ///
    /// Pacing and the cycle cap carry over; bus and I/O are taken from `cpu`, and reads
    /// cancelled by an earlier `stop` are re-armed.
    ///
    /// # Errors
    ///
    /// `ControlError::Busy` unless the previous run has been joined.
    pub fn load(&mut self, cpu: Cpu) -> Result<(), ControlError> {
        if self.handle.is_some() || self.state() != RunState::NotRunning {
            return Err(ControlError::Busy);
        }
        let (commands, receiver) = mpsc::channel();
        self.bus = Arc::clone(cpu.bus());
        self.io = Arc::clone(cpu.io());
        self.commands = commands;
        self.idle = Some((cpu, receiver));
        self.control.stop.store(false, Ordering::SeqCst);
        self.io.reset_cancel();
        info!("program loaded");
        Ok(())
    }

    /// Point-in-time copy of the register file.
    ///
    /// # Returns
    ///
    /// `None` once the run has ended or if the simulation thread does not answer in time.
    pub fn snapshot(&self) -> Option<RegisterFile> {
        if let Some((cpu, _)) = &self.idle {
            return Some(cpu.regs.clone());
        }
        let (tx, rx) = mpsc::channel();
        self.commands.send(Command::Snapshot(tx)).ok()?;
        rx.recv_timeout(SNAPSHOT_TIMEOUT).ok()
    }

    /// Asks the simulation thread to write a register before its next cycle.
    ///
    /// # Returns
    ///
    /// `false` once the run has ended.
    pub fn write_register(&mut self, register: RegRef, value: Word) -> bool {
        if let Some((cpu, _)) = &mut self.idle {
            apply_write(cpu, register, value);
            return true;
        }
        self.commands
            .send(Command::WriteRegister(register, value))
            .is_ok()
    }

    /// Publishes a user note, optionally attached to an address.
    pub fn annotate(&self, address: Option<Address>, text: impl Into<String>) {
        self.bus
            .send_message(Message::Annotation(AnnotationMessage {
                address,
                text: text.into(),
            }));
    }
}

impl Drop for Simulator {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.stop();
            let _ = handle.join();
        }
    }
}

fn apply_write(cpu: &mut Cpu, register: RegRef, value: Word) {
    match register {
        RegRef::Gpr(reg) => {
            let _ = cpu.regs.write(reg, value);
        }
        RegRef::Hi => cpu.regs.hi = value,
        RegRef::Lo => cpu.regs.lo = value,
    }
}

/// Applies queued commands up to and including the first `Step`.
///
/// Returns `true` if a single step was requested; later commands stay queued so they
/// observe the state after that step.
fn drain_commands(cpu: &mut Cpu, commands: &Receiver<Command>, first: Option<Command>) -> bool {
    let mut next = first.or_else(|| commands.try_recv().ok());
    while let Some(command) = next {
        match command {
            Command::Snapshot(reply) => {
                let _ = reply.send(cpu.regs.clone());
            }
            Command::WriteRegister(register, value) => apply_write(cpu, register, value),
            Command::Step => return true,
        }
        next = commands.try_recv().ok();
    }
    false
}

fn run(mut cpu: Cpu, control: &Control, commands: &Receiver<Command>, limits: Limits) -> RunReport {
    let bus = Arc::clone(cpu.bus());
    let poll = Duration::from_millis(POLL_INTERVAL_MS);
    let mut error = None;

    let status = loop {
        let mut step = drain_commands(&mut cpu, commands, None);
        if control.stop.load(Ordering::SeqCst) {
            break ExitStatus::Stopped;
        }
        if control.state() == RunState::Paused && !step {
            match commands.recv_timeout(poll) {
                Ok(command) => step = drain_commands(&mut cpu, commands, Some(command)),
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => {}
            }
            if !step {
                continue;
            }
        }
        if limits
            .max_cycles
            .is_some_and(|max| cpu.stats.cycles >= max)
        {
            warn!(cycles = cpu.stats.cycles, "cycle limit reached");
            break ExitStatus::Stopped;
        }

        let started = Instant::now();
        match cpu.step() {
            Ok(Some(status)) => break status,
            Ok(None) => {}
            Err(err) => {
                report_exception(&cpu, &err);
                error = Some(err);
                break ExitStatus::Stopped;
            }
        }
        if !bus.wait_for_critical() {
            cpu.stats.critical_timeouts += 1;
        }
        if let Some(rest) = limits
            .period
            .and_then(|period| period.checked_sub(started.elapsed()))
        {
            thread::sleep(rest);
        }
    };

    control.set_state(RunState::Stopped);
    info!(?status, cycles = cpu.stats.cycles, "simulation stopped");
    bus.send_message(Message::Simulation(SimulationEvent::Stopped));
    RunReport {
        status,
        error,
        stats: cpu.stats.clone(),
        cpu,
    }
}

fn report_exception(cpu: &Cpu, err: &SimError) {
    let address = err.address();
    let line = address.and_then(|addr| cpu.program().line_of(addr));
    error!(kind = err.kind(), %err, "run aborted by runtime exception");
    cpu.io()
        .print_string(Stream::Error, &format!("{}: {err}\n", err.kind()));
    cpu.bus()
        .send_message(Message::Problem(ProblemMessage {
            message: err.to_string(),
            address,
            line,
        }));
}
