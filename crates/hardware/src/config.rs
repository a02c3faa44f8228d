//! Configuration system for the MIPS simulator.
//!
//! This module defines the configuration structures used to parameterize the assembler,
//! the CPU and the message bus. It provides:
//! 1. **Defaults:** Baseline memory layout, bus sizing and timeouts.
//! 2. **Structures:** Hierarchical config for general, assembler, cpu, memory and bus.
//!
//! Configuration is supplied as JSON (`--config` on the CLI) or built with
//! `Config::default()`. Every field may be omitted and falls back to its default.

use serde::Deserialize;

use crate::common::constants;

/// Default configuration constants for the simulator.
mod defaults {
    /// Number of bus worker threads.
    pub const BUS_WORKERS: usize = 8;

    /// Maximum time the simulation waits for critical listeners, in milliseconds.
    pub const CRITICAL_TIMEOUT_MS: u64 = 100;
}

/// Root configuration structure containing all simulator settings.
///
/// # Examples
///
/// ```
/// use mipsim_core::config::Config;
///
/// let config = Config::default();
/// assert!(!config.cpu.pipelined);
/// assert_eq!(config.memory.text_base, 0x0040_0000);
/// assert_eq!(config.bus.workers, 8);
/// ```
///
/// Deserializing from JSON:
///
/// ```
/// use mipsim_core::config::Config;
///
/// let json = r#"{
///     "general": { "trace": true },
///     "cpu": { "pipelined": true, "frequency_hz": 10 },
///     "bus": { "workers": 2, "critical_timeout_ms": 50 }
/// }"#;
///
/// let config: Config = serde_json::from_str(json).unwrap();
/// assert!(config.general.trace);
/// assert!(config.cpu.pipelined);
/// assert_eq!(config.cpu.frequency_hz, 10);
/// assert_eq!(config.bus.queue_capacity(), 2);
/// assert_eq!(config.memory.data_base, 0x1000_0000);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General simulation settings
    pub general: GeneralConfig,
    /// Assembler settings
    pub assembler: AssemblerConfig,
    /// Execution engine settings
    pub cpu: CpuConfig,
    /// Memory layout
    pub memory: MemoryConfig,
    /// Message bus sizing
    pub bus: BusConfig,
}

/// General simulation settings and options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GeneralConfig {
    /// Log every executed instruction at debug level.
    #[serde(default)]
    pub trace: bool,

    /// Deliver output written to the debug stream.
    #[serde(default)]
    pub show_debug_stream: bool,
}

/// Assembler settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AssemblerConfig {
    /// Accept full 32-bit integers where a 16-bit immediate is expected.
    #[serde(default)]
    pub permissive: bool,
}

/// Execution engine settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CpuConfig {
    /// Use the three-slot pipelined model instead of single-cycle execution.
    #[serde(default)]
    pub pipelined: bool,

    /// Cycle frequency in Hz; 0 runs unthrottled.
    #[serde(default)]
    pub frequency_hz: u64,

    /// Stop the run after this many cycles.
    #[serde(default)]
    pub max_cycles: Option<u64>,
}

/// Memory region layout.
///
/// The stack grows down from `stack_top`; the heap grows up from `heap_base` as the
/// program break advances.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MemoryConfig {
    /// First text-segment address.
    #[serde(default = "MemoryConfig::default_text_base")]
    pub text_base: u32,

    /// First static-data address.
    #[serde(default = "MemoryConfig::default_data_base")]
    pub data_base: u32,

    /// First heap address (end of static data).
    #[serde(default = "MemoryConfig::default_heap_base")]
    pub heap_base: u32,

    /// Maximum heap size in bytes.
    #[serde(default = "MemoryConfig::default_heap_size")]
    pub heap_size: u32,

    /// Highest stack word address.
    #[serde(default = "MemoryConfig::default_stack_top")]
    pub stack_top: u32,

    /// Initial `$sp`.
    #[serde(default = "MemoryConfig::default_stack_pointer")]
    pub stack_pointer: u32,

    /// Maximum stack size in bytes.
    #[serde(default = "MemoryConfig::default_stack_size")]
    pub stack_size: u32,

    /// Initial `$gp`.
    #[serde(default = "MemoryConfig::default_global_pointer")]
    pub global_pointer: u32,
}

impl MemoryConfig {
    fn default_text_base() -> u32 {
        constants::TEXT_BASE
    }

    fn default_data_base() -> u32 {
        constants::DATA_BASE
    }

    fn default_heap_base() -> u32 {
        constants::HEAP_BASE
    }

    fn default_heap_size() -> u32 {
        constants::HEAP_SIZE
    }

    fn default_stack_top() -> u32 {
        constants::STACK_TOP
    }

    fn default_stack_pointer() -> u32 {
        constants::STACK_POINTER
    }

    fn default_stack_size() -> u32 {
        constants::STACK_SIZE
    }

    fn default_global_pointer() -> u32 {
        constants::GLOBAL_POINTER
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            text_base: Self::default_text_base(),
            data_base: Self::default_data_base(),
            heap_base: Self::default_heap_base(),
            heap_size: Self::default_heap_size(),
            stack_top: Self::default_stack_top(),
            stack_pointer: Self::default_stack_pointer(),
            stack_size: Self::default_stack_size(),
            global_pointer: Self::default_global_pointer(),
        }
    }
}

/// Message bus configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BusConfig {
    /// Worker threads; 0 dispatches every message on the sending thread.
    #[serde(default = "BusConfig::default_workers")]
    pub workers: usize,

    /// Pending-task queue bound; defaults to the worker count.
    #[serde(default)]
    pub queue_capacity: Option<usize>,

    /// Bound on critical-listener waits and on shutdown, in milliseconds.
    #[serde(default = "BusConfig::default_critical_timeout_ms")]
    pub critical_timeout_ms: u64,
}

impl BusConfig {
    fn default_workers() -> usize {
        defaults::BUS_WORKERS
    }

    fn default_critical_timeout_ms() -> u64 {
        defaults::CRITICAL_TIMEOUT_MS
    }

    /// Effective queue bound.
    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity.unwrap_or(self.workers)
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            workers: Self::default_workers(),
            queue_capacity: None,
            critical_timeout_ms: Self::default_critical_timeout_ms(),
        }
    }
}
