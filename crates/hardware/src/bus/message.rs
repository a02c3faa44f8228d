//! Message taxonomy.
//!
//! Every event the engine publishes is one variant of `Message`, each carrying its own
//! payload struct. Messages are created transiently, cloned into each dispatch task and
//! never persisted. All payloads serialize with `serde` for trace output.

use serde::Serialize;

use crate::common::addr::Address;
use crate::common::data::{AccessType, AccessWidth};
use crate::common::reg::RegRef;
use crate::common::word::Word;
use crate::core::pipeline::hazards::HazardKind;
use crate::isa::decode::InstructionKind;

/// A free-form note attached to the run (e.g. by a scripting bridge or the stepper).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AnnotationMessage {
    /// Address the note refers to, if any.
    pub address: Option<Address>,
    /// Note text.
    pub text: String,
}

/// A data memory access performed by a load, store or syscall.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DataMovementMessage {
    /// Data address.
    pub address: Address,
    /// Access width.
    pub width: AccessWidth,
    /// Read or write.
    pub access: AccessType,
    /// Value read or written.
    pub value: Word,
}

/// A statement entering the fetch stage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExecuteStatementMessage {
    /// Address of the statement.
    pub address: Address,
    /// Source line.
    pub line: u32,
    /// Disassembled statement.
    pub text: String,
}

/// The internal format chosen at decode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InstructionTypeMessage {
    /// Address of the statement.
    pub address: Address,
    /// Internal format family.
    pub kind: InstructionKind,
}

/// The addresses in each pipeline slot after a tick.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStateMessage {
    /// Address in the fetch slot.
    pub fetched: Option<Address>,
    /// Address in the decode slot.
    pub decoded: Option<Address>,
    /// Address executed this tick.
    pub executed: Option<Address>,
    /// `true` if this tick's fetch did not follow the previous fetch by one instruction.
    pub is_jump: bool,
}

/// A runtime exception or other failure surfaced on the error stream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProblemMessage {
    /// Description.
    pub message: String,
    /// Address of the instruction or data access involved, if any.
    pub address: Option<Address>,
    /// Source line of the instruction involved, if known.
    pub line: Option<u32>,
}

/// A register value change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RegisterChangedMessage {
    /// Register written.
    pub register: RegRef,
    /// Value before the write.
    pub old: Word,
    /// Value after the write.
    pub new: Word,
}

/// Lifecycle transition of the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SimulationEvent {
    /// The run started.
    Started,
    /// The run was paused.
    Paused,
    /// The run resumed after a pause.
    Resumed,
    /// A stop was requested.
    Stopping,
    /// The run ended.
    Stopped,
}

/// Pipeline stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Stage {
    /// Instruction fetch.
    Fetch,
    /// Decode into an internal format.
    Decode,
    /// Execute and write back.
    Execute,
}

/// Every event published on the bus.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum Message {
    /// A user note.
    Annotation(AnnotationMessage),
    /// A data memory access.
    DataMovement(DataMovementMessage),
    /// A statement was fetched.
    ExecuteStatement(ExecuteStatementMessage),
    /// A statement was decoded.
    InstructionType(InstructionTypeMessage),
    /// A hazard was detected this tick.
    PipelineHazard(HazardKind),
    /// Slot contents after a pipelined tick.
    PipelineState(PipelineStateMessage),
    /// A runtime failure.
    Problem(ProblemMessage),
    /// A register changed.
    RegisterChanged(RegisterChangedMessage),
    /// A lifecycle transition.
    Simulation(SimulationEvent),
    /// A single-cycle stage began.
    StageEnter(Stage),
}

impl Message {
    /// Short variant name, for logging.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Annotation(_) => "Annotation",
            Self::DataMovement(_) => "DataMovement",
            Self::ExecuteStatement(_) => "ExecuteStatement",
            Self::InstructionType(_) => "InstructionType",
            Self::PipelineHazard(_) => "PipelineHazard",
            Self::PipelineState(_) => "PipelineState",
            Self::Problem(_) => "Problem",
            Self::RegisterChanged(_) => "RegisterChanged",
            Self::Simulation(_) => "Simulation",
            Self::StageEnter(_) => "StageEnter",
        }
    }
}
