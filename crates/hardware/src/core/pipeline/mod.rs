//! Three-slot instruction pipeline.
//!
//! The pipelined execution model keeps up to three instructions in flight (fetched,
//! decoded, executed) and reports hazards instead of resolving them with forwarding or
//! prediction. A hazard leaves a slot empty for the tick it is detected in.

/// RAW, WAW and control hazard classification.
pub mod hazards;

/// Slot contents and jump tracking.
pub mod latches;

use crate::core::pipeline::hazards::HazardKind;
use crate::core::pipeline::latches::{PipelineSlots, PipelineTracker};

/// Pipeline state owned by the CPU in pipelined mode.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pipeline {
    /// In-flight instructions.
    pub slots: PipelineSlots,
    /// Fetch history for jump classification.
    pub tracker: PipelineTracker,
    /// Most recent hazard, if the last tick detected one.
    pub last_hazard: Option<HazardKind>,
}
