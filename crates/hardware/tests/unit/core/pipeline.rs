use pretty_assertions::assert_eq;
use rstest::rstest;

use mipsim_core::bus::message::PipelineStateMessage;
use mipsim_core::common::{Address, Register};
use mipsim_core::core::ExitStatus;
use mipsim_core::core::pipeline::hazards::HazardKind;

use crate::common::harness::TestContext;

fn at(addr: u32) -> Option<Address> {
    Some(Address::new(addr))
}

fn state(
    fetched: Option<Address>,
    decoded: Option<Address>,
    executed: Option<Address>,
    is_jump: bool,
) -> PipelineStateMessage {
    PipelineStateMessage {
        fetched,
        decoded,
        executed,
        is_jump,
    }
}

const RAW_PAIR: &str = ".text\nmain: addi $t0, $zero, 5\n      add $t1, $t0, $t0\n";

#[test]
fn dependent_pair_reports_exactly_one_raw() {
    let mut ctx = TestContext::pipelined(RAW_PAIR);

    let mut ticks = 0;
    let status = loop {
        ticks += 1;
        if let Some(status) = ctx.cpu.tick().unwrap() {
            break status;
        }
    };

    assert_eq!(status, ExitStatus::Finished);
    assert_eq!(ticks, 6);
    assert_eq!(ctx.recorder.hazards(), vec![HazardKind::Raw]);
    assert_eq!(ctx.reg(Register::T0), 5);
    assert_eq!(ctx.reg(Register::T1), 10);
    assert_eq!(
        ctx.recorder.pipeline_states(),
        vec![
            state(at(0x0040_0000), None, None, false),
            state(at(0x0040_0004), at(0x0040_0000), None, false),
            state(at(0x0040_0004), None, at(0x0040_0000), false),
            state(None, at(0x0040_0004), None, false),
            state(None, None, at(0x0040_0004), false),
        ]
    );
    assert_eq!(ctx.cpu.stats.cycles, 5);
    assert_eq!(ctx.cpu.stats.bubbles, 1);
    assert_eq!(ctx.cpu.stats.hazards_raw, 1);
}

#[test]
fn hazard_message_precedes_its_state() {
    let mut ctx = TestContext::pipelined(RAW_PAIR);

    ctx.run_ok();

    let names: Vec<_> = ctx
        .recorder
        .messages()
        .iter()
        .map(|m| m.name())
        .filter(|n| *n == "PipelineHazard" || *n == "PipelineState")
        .collect();
    assert_eq!(
        names,
        vec![
            "PipelineState",
            "PipelineState",
            "PipelineHazard",
            "PipelineState",
            "PipelineState",
            "PipelineState",
        ]
    );
}

#[test]
fn single_cycle_mode_reports_no_hazards() {
    let mut ctx = TestContext::new(RAW_PAIR);

    ctx.run_ok();

    assert_eq!(ctx.recorder.count("PipelineHazard"), 0);
    assert_eq!(ctx.recorder.count("PipelineState"), 0);
    assert_eq!(ctx.cpu.stats.hazards(), 0);
}

#[test]
fn jump_stalls_fetch_and_flags_the_redirect() {
    let source = "\
.text
main:   j target
        addi $t0, $zero, 99
target: addi $t0, $zero, 1
";
    let mut ctx = TestContext::pipelined(source);

    assert_eq!(ctx.run_ok(), ExitStatus::Finished);

    assert_eq!(ctx.recorder.hazards(), vec![HazardKind::Control]);
    assert_eq!(ctx.reg(Register::T0), 1);
    assert_eq!(
        ctx.recorder.pipeline_states(),
        vec![
            state(at(0x0040_0000), None, None, false),
            state(None, at(0x0040_0000), None, false),
            state(at(0x0040_0008), None, at(0x0040_0000), true),
            state(None, at(0x0040_0008), None, false),
            state(None, None, at(0x0040_0008), false),
        ]
    );
}

#[test]
fn write_after_write_is_reported() {
    let mut ctx =
        TestContext::pipelined(".text\nmain: addi $t0, $zero, 1\n      addi $t0, $zero, 2\n");

    ctx.run_ok();

    assert_eq!(ctx.recorder.hazards(), vec![HazardKind::Waw]);
    assert_eq!(ctx.reg(Register::T0), 2);
    assert_eq!(ctx.cpu.stats.hazards_waw, 1);
}

#[test]
fn independent_instructions_flow_without_bubbles() {
    let mut ctx = TestContext::pipelined(
        ".text\nmain: addi $t0, $zero, 1\n      addi $t1, $zero, 2\n      addi $t2, $zero, 3\n",
    );

    ctx.run_ok();

    assert_eq!(ctx.recorder.hazards(), vec![]);
    assert_eq!(ctx.cpu.stats.bubbles, 0);
    // three instructions plus two fill ticks
    assert_eq!(ctx.cpu.stats.cycles, 5);
}

#[test]
fn exit_syscall_flushes_the_pipeline() {
    let mut ctx = TestContext::pipelined(
        ".text\nmain: li $v0, 10\n      syscall\n      addi $t0, $zero, 7\n",
    );

    assert_eq!(ctx.run_ok(), ExitStatus::Exited(0));

    assert_eq!(ctx.reg(Register::T0), 0);
    assert!(ctx.cpu.pipeline.slots.is_empty());
    assert_eq!(ctx.cpu.pipeline.last_hazard, None);
    let last = ctx.recorder.pipeline_states().pop().unwrap();
    assert_eq!(last, state(None, None, at(0x0040_0004), false));
}

#[rstest]
#[case(
    "\
.text
main:   li $t0, 5
        li $t1, 0
loop:   add $t1, $t1, $t0
        addi $t0, $t0, -1
        bgtz $t0, loop
        li $v0, 10
        syscall
"
)]
#[case(
    "\
.text
main:   li $a0, 6
        jal square
        move $s0, $v0
        j end
square: mult $a0, $a0
        mflo $v0
        jr $ra
end:    nop
"
)]
#[case(
    "\
.data
arr:    .word 3, 1, 4, 1, 5
.text
main:   la $t0, arr
        li $t1, 5
        li $t2, 0
next:   lw $t3, 0($t0)
        add $t2, $t2, $t3
        addi $t0, $t0, 4
        addi $t1, $t1, -1
        bne $t1, $zero, next
        sw $t2, -4($sp)
"
)]
fn pipelined_results_match_single_cycle(#[case] source: &str) {
    let mut single = TestContext::new(source);
    let mut piped = TestContext::pipelined(source);

    let a = single.run_ok();
    let b = piped.run_ok();

    assert_eq!(a, b);
    assert_eq!(single.cpu.regs.gprs(), piped.cpu.regs.gprs());
    assert_eq!(single.cpu.regs.hi, piped.cpu.regs.hi);
    assert_eq!(single.cpu.regs.lo, piped.cpu.regs.lo);
    assert_eq!(
        single.cpu.stats.instructions_retired,
        piped.cpu.stats.instructions_retired
    );
    assert!(piped.cpu.stats.cycles > single.cpu.stats.cycles);
}
