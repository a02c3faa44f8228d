//! Pipeline slot structures.
//!
//! The pipelined model keeps at most three instructions in flight:
//! Fetch → Decode → Execute.
//!
//! 1. **Slots:** What each stage holds between ticks.
//! 2. **Jump Tracking:** Classifies each fetch as sequential or a jump for history consumers.

use crate::common::addr::Address;
use crate::common::constants::INSTRUCTION_SIZE;
use crate::isa::decode::Decoded;

/// Entry in the decode slot: the instruction's address and its decoded form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedEntry {
    /// Address of the instruction.
    pub address: Address,
    /// Internal representation produced at decode.
    pub decoded: Decoded,
}

/// The in-flight instructions between two ticks.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PipelineSlots {
    /// Fetched, waiting to be decoded.
    pub fetched: Option<Address>,
    /// Decoded, waiting to be executed.
    pub decoded: Option<DecodedEntry>,
}

impl PipelineSlots {
    /// `true` when no instruction is in flight.
    pub const fn is_empty(&self) -> bool {
        self.fetched.is_none() && self.decoded.is_none()
    }

    /// Drops every in-flight instruction.
    pub fn flush(&mut self) {
        self.fetched = None;
        self.decoded = None;
    }
}

/// Remembers the previous fetch address to classify jumps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineTracker {
    previous_fetch: Option<Address>,
}

impl PipelineTracker {
    /// Creates a tracker with no fetch history.
    pub const fn new() -> Self {
        Self {
            previous_fetch: None,
        }
    }

    /// Records a fetch.
    ///
    /// # Returns
    ///
    /// `true` if `address` is not exactly one instruction after the previous fetch.
    /// The first fetch is never a jump.
    pub fn observe(&mut self, address: Address) -> bool {
        let is_jump = self
            .previous_fetch
            .is_some_and(|prev| address.distance_from(prev) != i64::from(INSTRUCTION_SIZE));
        self.previous_fetch = Some(address);
        is_jump
    }

    /// Forgets the fetch history.
    pub const fn reset(&mut self) {
        self.previous_fetch = None;
    }
}
