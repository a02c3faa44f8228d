//! Simulation statistics collection and reporting.
//!
//! This module tracks run metrics for the MIPS simulator. It provides:
//! 1. **Cycle and CPI:** Total cycles, retired instructions, and derived metrics.
//! 2. **Instruction mix:** Counts by internal format (R, I, J, load/store, special).
//! 3. **Hazards:** RAW, WAW and control hazard counts plus pipeline bubbles.
//! 4. **Bus:** Critical-listener waits that timed out.

use std::fmt::{self, Write as _};
use std::time::{Duration, Instant};

use crate::core::pipeline::hazards::HazardKind;
use crate::isa::decode::InstructionKind;

/// Simulation statistics structure tracking all run metrics.
#[derive(Clone, Debug)]
pub struct SimStats {
    start_time: Instant,
    /// Total simulator cycles elapsed (pipeline ticks in pipelined mode).
    pub cycles: u64,
    /// Number of instructions that completed execution.
    pub instructions_retired: u64,

    /// Retired R-format (ALU) instructions.
    pub inst_r: u64,
    /// Retired I-format (branch) instructions.
    pub inst_i: u64,
    /// Retired J-format (jump) instructions.
    pub inst_j: u64,
    /// Retired load/store format instructions.
    pub inst_ls: u64,
    /// Retired special instructions (syscall, nop).
    pub inst_special: u64,

    /// Read-after-write hazards detected.
    pub hazards_raw: u64,
    /// Write-after-write hazards detected.
    pub hazards_waw: u64,
    /// Control hazards detected.
    pub hazards_control: u64,
    /// Pipeline slots left empty because of a hazard.
    pub bubbles: u64,

    /// Critical-listener waits that hit the timeout.
    pub critical_timeouts: u64,
}

impl Default for SimStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            cycles: 0,
            instructions_retired: 0,
            inst_r: 0,
            inst_i: 0,
            inst_j: 0,
            inst_ls: 0,
            inst_special: 0,
            hazards_raw: 0,
            hazards_waw: 0,
            hazards_control: 0,
            bubbles: 0,
            critical_timeouts: 0,
        }
    }
}

/// Section names for selective stats output.
///
/// Valid section identifiers: `"summary"`, `"instruction_mix"`, `"hazards"`.
/// Pass an empty slice to `report_sections` to render all sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "instruction_mix", "hazards"];

impl SimStats {
    /// Counts one retired instruction of the given format.
    pub const fn record_retired(&mut self, kind: InstructionKind) {
        self.instructions_retired += 1;
        match kind {
            InstructionKind::R => self.inst_r += 1,
            InstructionKind::I => self.inst_i += 1,
            InstructionKind::J => self.inst_j += 1,
            InstructionKind::Ls => self.inst_ls += 1,
            InstructionKind::Special => self.inst_special += 1,
        }
    }

    /// Counts one detected hazard.
    pub const fn record_hazard(&mut self, kind: HazardKind) {
        match kind {
            HazardKind::Raw => self.hazards_raw += 1,
            HazardKind::Waw => self.hazards_waw += 1,
            HazardKind::Control => self.hazards_control += 1,
        }
    }

    /// Total hazards of every kind.
    pub const fn hazards(&self) -> u64 {
        self.hazards_raw + self.hazards_waw + self.hazards_control
    }

    /// Wall-clock time since the statistics were created.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Renders the requested sections.
    ///
    /// # Arguments
    ///
    /// * `sections` - Section names from `STATS_SECTIONS`, or empty for all.
    pub fn report_sections(&self, sections: &[&str]) -> String {
        let want = |s: &str| sections.is_empty() || sections.contains(&s);
        let cyc = self.cycles.max(1) as f64;
        let instr = self.instructions_retired.max(1) as f64;
        let pct = |n: u64, total: f64| (n as f64 / total) * 100.0;
        let mut out = String::new();

        let _ = writeln!(out, "==========================================================");
        let _ = writeln!(out, "MIPS SIMULATION STATISTICS");
        let _ = writeln!(out, "==========================================================");
        if want("summary") {
            let _ = writeln!(out, "host_seconds             {:.4} s", self.elapsed().as_secs_f64());
            let _ = writeln!(out, "sim_cycles               {}", self.cycles);
            let _ = writeln!(out, "sim_insts                {}", self.instructions_retired);
            let _ = writeln!(out, "sim_cpi                  {:.4}", cyc / instr);
            let _ = writeln!(out, "bus.critical_timeouts    {}", self.critical_timeouts);
            let _ = writeln!(out, "----------------------------------------------------------");
        }
        if want("instruction_mix") {
            let _ = writeln!(out, "INSTRUCTION MIX");
            for (name, n) in [
                ("op.r", self.inst_r),
                ("op.i", self.inst_i),
                ("op.j", self.inst_j),
                ("op.ls", self.inst_ls),
                ("op.special", self.inst_special),
            ] {
                let _ = writeln!(out, "  {name:<22} {n} ({:.2}%)", pct(n, instr));
            }
            let _ = writeln!(out, "----------------------------------------------------------");
        }
        if want("hazards") {
            let _ = writeln!(out, "HAZARDS");
            let _ = writeln!(out, "  hazard.raw             {}", self.hazards_raw);
            let _ = writeln!(out, "  hazard.waw             {}", self.hazards_waw);
            let _ = writeln!(out, "  hazard.control         {}", self.hazards_control);
            let _ = writeln!(
                out,
                "  bubbles                {} ({:.2}% of cycles)",
                self.bubbles,
                pct(self.bubbles, cyc)
            );
        }
        let _ = writeln!(out, "==========================================================");
        out
    }

    /// Prints all statistics sections to stdout.
    pub fn print(&self) {
        print!("{self}");
    }
}

impl fmt::Display for SimStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.report_sections(&[]))
    }
}
