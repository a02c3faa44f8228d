//! Main Execution Loop.
//!
//! This module implements both execution models of the CPU. It performs the following:
//! 1. **Single-Cycle:** Fetch, decode and execute one instruction per step, announcing
//!    each stage with a `StageEnter` message.
//! 2. **Pipelined:** One tick advances three slots (fetched, decoded, executed). Data
//!    hazards hold the fetched instruction and leave the decode slot empty; control
//!    hazards suppress the fetch until the branch or jump has executed.
//! 3. **Execute:** Applies a decoded instruction to registers, memory and the PC.
//! 4. **Observability:** Register changes, data movements, hazards and slot contents are
//!    published on the bus.

use std::mem;

use tracing::debug;

use super::{Cpu, ExitStatus};
use crate::bus::Message;
use crate::bus::message::{
    ExecuteStatementMessage, InstructionTypeMessage, PipelineStateMessage,
    RegisterChangedMessage, Stage,
};
use crate::common::constants::INSTRUCTION_SIZE;
use crate::common::{AccessWidth, Address, RegRef, SimError, Word};
use crate::core::pipeline::hazards::{self, HazardKind};
use crate::core::pipeline::latches::DecodedEntry;
use crate::core::units::alu::{Alu, AluOp, arithmetic};
use crate::isa::abi::REG_LINK;
use crate::isa::decode::{self, Decoded, IType, LsType, RType};
use crate::isa::disasm::disassemble;
use crate::isa::instruction::Instruction;
use crate::isa::program::Statement;
use crate::sim::io::Stream;

/// Control-flow outcome of one executed instruction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Effect {
    next_pc: Option<Address>,
    exit: Option<ExitStatus>,
}

impl Effect {
    const fn jump(target: Address) -> Self {
        Self {
            next_pc: Some(target),
            exit: None,
        }
    }
}

impl Cpu {
    /// Advances the machine by one cycle in the configured execution model.
    ///
    /// # Returns
    ///
    /// `Some(status)` once the run is over, `None` while it continues.
    ///
    /// # Errors
    ///
    /// Any runtime exception raised while fetching, decoding or executing.
    pub fn step(&mut self) -> Result<Option<ExitStatus>, SimError> {
        if self.pipelined {
            self.tick()
        } else {
            self.step_single()
        }
    }

    /// Executes exactly one instruction, stage by stage.
    ///
    /// # Errors
    ///
    /// Any runtime exception; a PC outside the text segment (other than one past its
    /// end) is a program error.
    pub fn step_single(&mut self) -> Result<Option<ExitStatus>, SimError> {
        let pc = self.regs.pc;

        self.publish(Message::StageEnter(Stage::Fetch));
        let Some(statement) = self.fetch(pc)? else {
            return Ok(Some(ExitStatus::Finished));
        };
        self.stats.cycles += 1;

        self.publish(Message::StageEnter(Stage::Decode));
        let decoded = self.decode(&statement, pc)?;

        self.publish(Message::StageEnter(Stage::Execute));
        let effect = self.execute(pc, &statement, decoded)?;
        self.regs.pc = effect
            .next_pc
            .unwrap_or_else(|| pc.advance(INSTRUCTION_SIZE));
        Ok(effect.exit)
    }

    /// Advances the three-slot pipeline by one tick.
    ///
    /// The instruction in the decode slot executes, the fetched one is decoded and a new
    /// one is fetched at `pc`, unless a hazard intervenes:
    /// - RAW/WAW between the decoding and executing instructions: the fetched
    ///   instruction is held and the decode slot is left empty.
    /// - CONTROL: a branch or jump was just decoded, so nothing is fetched until it has
    ///   executed and the PC is known.
    ///
    /// A `PipelineHazard` message (if any) is published before the `PipelineState`.
    ///
    /// # Errors
    ///
    /// Any runtime exception raised by the stages.
    pub fn tick(&mut self) -> Result<Option<ExitStatus>, SimError> {
        let executing = self.pipeline.slots.decoded.take();
        let decoding = self.pipeline.slots.fetched.take();

        let executing_stmt = executing
            .as_ref()
            .map(|entry| self.statement(entry.address))
            .transpose()?;
        let decoding_stmt = decoding.map(|addr| self.statement(addr)).transpose()?;
        let data_hazard = match (&decoding_stmt, &executing_stmt) {
            (Some(younger), Some(older)) => hazards::detect_data(younger, older),
            _ => None,
        };

        let executed = executing.as_ref().map(|entry| entry.address);
        if let (Some(entry), Some(statement)) = (executing, executing_stmt) {
            let effect = self.execute(entry.address, &statement, entry.decoded)?;
            if let Some(target) = effect.next_pc {
                self.regs.pc = target;
            }
            if effect.exit.is_some() {
                self.stats.cycles += 1;
                self.pipeline.slots.flush();
                self.pipeline.last_hazard = None;
                self.publish_pipeline_state(executed, false);
                return Ok(effect.exit);
            }
        }

        let mut hazard = data_hazard;
        let mut is_jump = false;
        if data_hazard.is_some() {
            self.pipeline.slots.fetched = decoding;
            self.stats.bubbles += 1;
        } else {
            let mut control = false;
            if let (Some(addr), Some(statement)) = (decoding, decoding_stmt) {
                let decoded = self.decode(&statement, addr)?;
                control = hazards::is_control(&statement);
                self.pipeline.slots.decoded = Some(DecodedEntry {
                    address: addr,
                    decoded,
                });
            }
            if control {
                hazard = Some(HazardKind::Control);
                self.stats.bubbles += 1;
            } else {
                let pc = self.regs.pc;
                if self.fetch(pc)?.is_some() {
                    is_jump = self.pipeline.tracker.observe(pc);
                    self.pipeline.slots.fetched = Some(pc);
                    self.regs.pc = pc.advance(INSTRUCTION_SIZE);
                }
            }
        }

        if executed.is_none() && self.pipeline.slots.is_empty() {
            return Ok(Some(ExitStatus::Finished));
        }

        self.stats.cycles += 1;
        self.pipeline.last_hazard = hazard;
        if let Some(kind) = hazard {
            debug!(?kind, pc = %self.regs.pc, "pipeline hazard");
            self.stats.record_hazard(kind);
            self.publish(Message::PipelineHazard(kind));
        }
        self.publish_pipeline_state(executed, is_jump);
        Ok(None)
    }

    /// Writes a register and publishes the change if its value differs.
    pub(super) fn set_register(&mut self, register: RegRef, value: Word) {
        let (old, new) = match register {
            RegRef::Gpr(reg) => {
                let old = self.regs.write(reg, value);
                (old, self.regs.read(reg))
            }
            RegRef::Hi => (mem::replace(&mut self.regs.hi, value), value),
            RegRef::Lo => (mem::replace(&mut self.regs.lo, value), value),
        };
        if old != new {
            self.publish(Message::RegisterChanged(RegisterChangedMessage {
                register,
                old,
                new,
            }));
        }
    }

    pub(super) fn publish(&self, message: Message) {
        self.bus.send_message(message);
    }

    fn publish_pipeline_state(&self, executed: Option<Address>, is_jump: bool) {
        let slots = &self.pipeline.slots;
        self.publish(Message::PipelineState(PipelineStateMessage {
            fetched: slots.fetched,
            decoded: slots.decoded.as_ref().map(|entry| entry.address),
            executed,
            is_jump,
        }));
    }

    fn statement(&self, addr: Address) -> Result<Statement, SimError> {
        self.program
            .statement_at(addr)
            .cloned()
            .ok_or_else(|| SimError::Program {
                address: Some(addr),
                message: format!("no statement at {addr}"),
            })
    }

    /// Fetches the statement at `pc` and publishes it.
    ///
    /// # Returns
    ///
    /// `None` when `pc` is exactly one past the last statement.
    fn fetch(&self, pc: Address) -> Result<Option<Statement>, SimError> {
        match self.program.statement_at(pc) {
            Some(statement) => {
                self.publish(Message::ExecuteStatement(ExecuteStatementMessage {
                    address: pc,
                    line: statement.line,
                    text: disassemble(statement),
                }));
                Ok(Some(statement.clone()))
            }
            None if pc == self.program.text_end() => Ok(None),
            None => Err(SimError::Program {
                address: Some(pc),
                message: format!("pc {pc} is outside the text segment"),
            }),
        }
    }

    fn decode(&self, statement: &Statement, address: Address) -> Result<Decoded, SimError> {
        let decoded = decode::decode(statement, address, &self.regs, &self.program)?;
        self.publish(Message::InstructionType(InstructionTypeMessage {
            address,
            kind: decoded.kind(),
        }));
        Ok(decoded)
    }

    fn execute(
        &mut self,
        address: Address,
        statement: &Statement,
        decoded: Decoded,
    ) -> Result<Effect, SimError> {
        debug!(%address, line = statement.line, "{}", disassemble(statement));
        if self.trace {
            self.io.print_string(
                Stream::Debug,
                &format!("{address}: {}\n", disassemble(statement)),
            );
        }

        let kind = decoded.kind();
        let effect = match decoded {
            Decoded::RType(r) => {
                self.execute_r(address, &r)?;
                Effect::default()
            }
            Decoded::IType(i) => Self::execute_branch(&i),
            Decoded::JType(j) => {
                if let Some(link) = j.link {
                    self.set_register(RegRef::Gpr(REG_LINK), link);
                }
                Effect::jump(j.target)
            }
            Decoded::LsType(ls) => {
                self.execute_ls(address, &ls)?;
                Effect::default()
            }
            Decoded::Special(special) => match special.op {
                Instruction::Syscall => Effect {
                    next_pc: None,
                    exit: self.syscall(address)?,
                },
                Instruction::Break => {
                    return Err(SimError::Instruction {
                        address,
                        message: "break".to_string(),
                    });
                }
                _ => Effect::default(),
            },
        };
        self.stats.record_retired(kind);
        Ok(effect)
    }

    fn execute_r(&mut self, address: Address, r: &RType) -> Result<(), SimError> {
        use Instruction as I;

        let a = r.source1.unwrap_or(Word::ZERO);
        let b = r.source2.unwrap_or(Word::ZERO);
        let result = match r.op {
            I::Mult | I::Multu => {
                let (hi, lo) = arithmetic::multiply(a, b, r.op == I::Mult);
                self.set_register(RegRef::Hi, hi);
                self.set_register(RegRef::Lo, lo);
                return Ok(());
            }
            I::Div | I::Divu => {
                if let Some((hi, lo)) = arithmetic::divide(a, b, r.op == I::Div) {
                    self.set_register(RegRef::Hi, hi);
                    self.set_register(RegRef::Lo, lo);
                }
                return Ok(());
            }
            I::Mthi => {
                self.set_register(RegRef::Hi, a);
                return Ok(());
            }
            I::Mtlo => {
                self.set_register(RegRef::Lo, a);
                return Ok(());
            }
            I::Mfhi | I::Mflo | I::Move => a,
            op => {
                let alu_op = AluOp::from_instruction(op).ok_or_else(|| SimError::Execute {
                    address,
                    message: format!("{op} is not an ALU operation"),
                })?;
                Alu::execute(alu_op, a, b).ok_or_else(|| SimError::Execute {
                    address,
                    message: format!("arithmetic overflow in {op} ({a}, {b})"),
                })?
            }
        };
        if let Some(dest) = r.dest {
            self.set_register(RegRef::Gpr(dest), result);
        }
        Ok(())
    }

    fn execute_branch(i: &IType) -> Effect {
        use Instruction as I;

        let v1 = i.value1.unwrap_or(Word::ZERO);
        let v2 = i.value2.unwrap_or(Word::ZERO);
        let taken = match i.op {
            I::Beq => v1 == v2,
            I::Bne => v1 != v2,
            I::Blez => v1.signed() <= 0,
            I::Bgtz => v1.signed() > 0,
            I::Bltz => v1.signed() < 0,
            I::Bgez => v1.signed() >= 0,
            _ => false,
        };
        Effect {
            next_pc: if taken { i.target } else { None },
            exit: None,
        }
    }

    fn execute_ls(&mut self, address: Address, ls: &LsType) -> Result<(), SimError> {
        use Instruction as I;

        let target = || {
            ls.address.ok_or_else(|| SimError::Execute {
                address,
                message: format!("{} has no effective address", ls.op),
            })
        };
        let loaded = match ls.op {
            I::Li => ls.immediate.unwrap_or(Word::ZERO),
            I::La => Word::from_unsigned(target()?.val()),
            I::Lw => self.load(target()?, AccessWidth::Word, true)?,
            I::Lh => self.load(target()?, AccessWidth::Half, true)?,
            I::Lhu => self.load(target()?, AccessWidth::Half, false)?,
            I::Lb => self.load(target()?, AccessWidth::Byte, true)?,
            I::Lbu => self.load(target()?, AccessWidth::Byte, false)?,
            I::Sw => return self.store(target()?, AccessWidth::Word, ls.value),
            I::Sh => return self.store(target()?, AccessWidth::Half, ls.value),
            I::Sb => return self.store(target()?, AccessWidth::Byte, ls.value),
            op => {
                return Err(SimError::Execute {
                    address,
                    message: format!("{op} is not a load or store"),
                });
            }
        };
        if let Some(dest) = ls.dest {
            self.set_register(RegRef::Gpr(dest), loaded);
        }
        Ok(())
    }
}
