//! Listener capability set.
//!
//! A listener implements only the handlers for the message kinds it cares about; every
//! other kind falls through to a no-op default. Delivery goes through `handle`, which
//! dispatches on the message tag with a single match.

use crate::bus::message::{
    AnnotationMessage, DataMovementMessage, ExecuteStatementMessage, InstructionTypeMessage,
    Message, PipelineStateMessage, ProblemMessage, RegisterChangedMessage, SimulationEvent, Stage,
};
use crate::core::pipeline::hazards::HazardKind;

/// An observer of bus messages.
///
/// Handlers run on bus worker threads or, when the pool is saturated, on the sending
/// thread, so implementations must be thread-safe and must not assume ordering across
/// messages.
pub trait Listener: Send + Sync {
    /// Handles an annotation.
    fn on_annotation(&self, _message: &AnnotationMessage) {}

    /// Handles a data movement.
    fn on_data_movement(&self, _message: &DataMovementMessage) {}

    /// Handles a fetched statement.
    fn on_execute_statement(&self, _message: &ExecuteStatementMessage) {}

    /// Handles a decoded instruction type.
    fn on_instruction_type(&self, _message: &InstructionTypeMessage) {}

    /// Handles a pipeline hazard.
    fn on_pipeline_hazard(&self, _kind: HazardKind) {}

    /// Handles a pipeline state.
    fn on_pipeline_state(&self, _message: &PipelineStateMessage) {}

    /// Handles a runtime problem.
    fn on_problem(&self, _message: &ProblemMessage) {}

    /// Handles a register change.
    fn on_register_changed(&self, _message: &RegisterChangedMessage) {}

    /// Handles a lifecycle transition.
    fn on_simulation(&self, _event: SimulationEvent) {}

    /// Handles a stage entry.
    fn on_stage_enter(&self, _stage: Stage) {}

    /// Whether the simulation should wait (bounded) for this listener to finish
    /// processing `message` before continuing.
    fn is_critical(&self, _message: &Message) -> bool {
        false
    }

    /// Routes a message to the matching handler.
    fn handle(&self, message: &Message) {
        match message {
            Message::Annotation(m) => self.on_annotation(m),
            Message::DataMovement(m) => self.on_data_movement(m),
            Message::ExecuteStatement(m) => self.on_execute_statement(m),
            Message::InstructionType(m) => self.on_instruction_type(m),
            Message::PipelineHazard(kind) => self.on_pipeline_hazard(*kind),
            Message::PipelineState(m) => self.on_pipeline_state(m),
            Message::Problem(m) => self.on_problem(m),
            Message::RegisterChanged(m) => self.on_register_changed(m),
            Message::Simulation(event) => self.on_simulation(*event),
            Message::StageEnter(stage) => self.on_stage_enter(*stage),
        }
    }
}
