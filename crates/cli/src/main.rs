//! MIPS assembler and simulator CLI.
//!
//! This binary provides a single entry point for both run modes. It performs:
//! 1. **Headless run:** Assemble a source file and run it to completion (`mipsim run`).
//! 2. **Interactive run:** Assemble and step through it from a console prompt
//!    (`mipsim gui`).
//!
//! Assembly problems are printed as `line:col: message` followed by a count, and the
//! process exits with code 1. A runtime exception also exits with code 1.

mod observers;

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use mipsim_core::asm::AssemblerOptions;
use mipsim_core::bus::MessageBus;
use mipsim_core::config::Config;
use mipsim_core::core::{Cpu, ExitStatus};
use mipsim_core::sim::loader::{self, LoadError};
use mipsim_core::sim::simulator::{ControlError, RunReport, RunState};
use mipsim_core::sim::{ConsoleIo, Io, Simulator, Stream};

use crate::observers::{ConsoleListener, JsonTraceListener};

#[derive(Parser, Debug)]
#[command(
    name = "mipsim",
    author,
    version,
    about = "MIPS assembler and teaching simulator",
    long_about = "Assemble a MIPS source file and run it single-cycle or pipelined.\n\nExamples:\n  mipsim run hello.s\n  mipsim run loop.s --pipelined --trace-json\n  mipsim gui loop.s --pipelined"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Assemble and run a program to completion.
    Run(RunArgs),
    /// Assemble a program and step through it interactively.
    Gui(RunArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Assembly source file.
    file: PathBuf,

    /// Use the three-slot pipeline instead of single-cycle execution.
    #[arg(long)]
    pipelined: bool,

    /// Accept 32-bit integers in immediate operand slots.
    #[arg(long)]
    permissive: bool,

    /// Show the debug stream and raise logging to debug.
    #[arg(long)]
    debug: bool,

    /// Clock frequency in Hz (0 = unthrottled).
    #[arg(long, value_name = "HZ")]
    frequency: Option<u64>,

    /// JSON configuration file; flags override its values.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write every bus message to stderr as JSON lines.
    #[arg(long)]
    trace_json: bool,

    /// Stop after this many cycles.
    #[arg(long, value_name = "N")]
    max_cycles: Option<u64>,
}

impl RunArgs {
    fn config(&self) -> Result<Config, LoadError> {
        let mut config = match &self.config {
            Some(path) => loader::load_config(path)?,
            None => Config::default(),
        };
        config.cpu.pipelined |= self.pipelined;
        config.assembler.permissive |= self.permissive;
        config.general.show_debug_stream |= self.debug;
        if let Some(hz) = self.frequency {
            config.cpu.frequency_hz = hz;
        }
        if self.max_cycles.is_some() {
            config.cpu.max_cycles = self.max_cycles;
        }
        Ok(config)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let (args, interactive) = match &cli.command {
        Commands::Run(args) => (args, false),
        Commands::Gui(args) => (args, true),
    };
    init_logging(args.debug);

    let config = match args.config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };
    match execute(&args.file, &config, args.trace_json, interactive) {
        Ok(code) => code,
        Err(err) => report_load_error(&err),
    }
}

fn init_logging(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn report_load_error(err: &LoadError) -> ExitCode {
    match err {
        LoadError::Assemble(assemble) => {
            for problem in assemble.problems() {
                eprintln!("{problem}");
            }
            eprintln!("{} problem(s) found", assemble.problems().len());
        }
        other => eprintln!("error: {other}"),
    }
    ExitCode::FAILURE
}

/// Assembles `file`, runs it, and maps the outcome to a process exit code.
fn execute(
    file: &Path,
    config: &Config,
    trace_json: bool,
    interactive: bool,
) -> Result<ExitCode, LoadError> {
    let program = loader::load_program(file, AssemblerOptions::from(config))?;

    let bus = Arc::new(MessageBus::new(&config.bus));
    let _ = bus.register(Arc::new(ConsoleListener));
    if trace_json {
        let _ = bus.register(Arc::new(JsonTraceListener::new(io::stderr())));
    }
    let io: Arc<dyn Io> = Arc::new(ConsoleIo::new(config.general.show_debug_stream));

    let cpu = match Cpu::new(program, config, Arc::clone(&bus), Arc::clone(&io)) {
        Ok(cpu) => cpu,
        Err(err) => {
            eprintln!("error: {err}");
            return Ok(ExitCode::FAILURE);
        }
    };
    let mut simulator = Simulator::new(cpu, &config.cpu);

    let report = if interactive {
        console_stepper(&mut simulator, io.as_ref())
    } else {
        simulator.start().and_then(|()| simulator.join())
    };

    let shutdown = bus.shutdown();
    debug!(?shutdown, "bus shut down");

    match report {
        Ok(report) => Ok(summarize(&report)),
        Err(err) => {
            eprintln!("error: {err}");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn summarize(report: &RunReport) -> ExitCode {
    report.stats.print();
    if report.error.is_some() {
        report.cpu.dump_state();
        return ExitCode::FAILURE;
    }
    match report.status {
        ExitStatus::Exited(code) => println!("\n[*] Exited with code {code}"),
        ExitStatus::Finished => println!("\n[*] Dropped off the end of the program"),
        ExitStatus::Cancelled => println!("\n[*] Input cancelled"),
        ExitStatus::Stopped => println!("\n[*] Stopped"),
    }
    ExitCode::SUCCESS
}

/// Interactive loop for `gui`: `step`, `continue`, `regs`, `quit`.
///
/// Commands and program reads share stdin. A step waits for its cycle, so a read
/// syscall takes the next line before the prompt returns. After `continue` the
/// program owns stdin.
fn console_stepper(
    simulator: &mut Simulator,
    io: &dyn Io,
) -> Result<RunReport, ControlError> {
    simulator.start_paused()?;
    io.print_string(
        Stream::Standard,
        "commands: step (s), continue (c), regs (r), quit (q)\n",
    );
    loop {
        if simulator.state() == RunState::Stopped {
            break;
        }
        io.print_string(Stream::Standard, "(mipsim) ");
        let Ok(line) = io.read_string(Stream::Standard, 256) else {
            simulator.stop();
            break;
        };
        match line.trim() {
            "step" | "s" | "" => {
                if let Some(regs) = simulator.step_and_wait() {
                    io.print_string(Stream::Standard, &format!("pc = {}\n", regs.pc));
                }
            }
            "continue" | "c" => {
                let _ = simulator.resume();
                break;
            }
            "regs" | "r" => match simulator.snapshot() {
                Some(regs) => regs.dump(),
                None => warn!("no register snapshot available"),
            },
            "quit" | "q" => {
                simulator.stop();
                break;
            }
            other => io.print_string(Stream::Error, &format!("unknown command '{other}'\n")),
        }
    }
    simulator.join()
}
