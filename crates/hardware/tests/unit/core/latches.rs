use pretty_assertions::assert_eq;

use mipsim_core::common::Address;
use mipsim_core::core::pipeline::latches::{DecodedEntry, PipelineSlots, PipelineTracker};
use mipsim_core::isa::decode::{Decoded, Special};
use mipsim_core::isa::instruction::Instruction;

#[test]
fn tracker_flags_non_sequential_fetches() {
    let mut tracker = PipelineTracker::new();

    let flags: Vec<_> = [100, 104, 108, 200]
        .into_iter()
        .map(|a| tracker.observe(Address::new(a)))
        .collect();

    assert_eq!(flags, vec![false, false, false, true]);
}

#[test]
fn backwards_and_repeated_fetches_are_jumps() {
    let mut tracker = PipelineTracker::new();

    assert!(!tracker.observe(Address::new(0x40)));
    assert!(tracker.observe(Address::new(0x40)));
    assert!(tracker.observe(Address::new(0x20)));
    assert!(!tracker.observe(Address::new(0x24)));
}

#[test]
fn reset_forgets_the_previous_fetch() {
    let mut tracker = PipelineTracker::new();
    let _ = tracker.observe(Address::new(0x100));

    tracker.reset();

    assert!(!tracker.observe(Address::new(0x400)));
}

#[test]
fn slots_flush_to_empty() {
    let mut slots = PipelineSlots {
        fetched: Some(Address::new(0x0040_0008)),
        decoded: Some(DecodedEntry {
            address: Address::new(0x0040_0004),
            decoded: Decoded::Special(Special {
                op: Instruction::Nop,
            }),
        }),
    };
    assert!(!slots.is_empty());

    slots.flush();

    assert!(slots.is_empty());
    assert_eq!(slots, PipelineSlots::default());
}
