use pretty_assertions::assert_eq;

use mipsim_core::bus::Message;
use mipsim_core::bus::message::{DataMovementMessage, RegisterChangedMessage, Stage};
use mipsim_core::common::{AccessType, AccessWidth, Address, RegRef, Register, SimError, Word};
use mipsim_core::config::Config;
use mipsim_core::core::ExitStatus;

use crate::common::harness::TestContext;
use crate::common::mocks::io::ScriptedIo;

#[test]
fn addi_writes_destination() {
    let mut ctx = TestContext::new(".text\nmain: addi $t0, $zero, 5\n");

    assert_eq!(ctx.run_ok(), ExitStatus::Finished);
    assert_eq!(ctx.reg(Register::T0), 5);
    assert_eq!(ctx.cpu.pc(), Address::new(0x0040_0004));
    assert_eq!(ctx.cpu.stats.cycles, 1);
    assert_eq!(ctx.cpu.stats.instructions_retired, 1);
}

#[test]
fn entry_registers_are_initialised() {
    let ctx = TestContext::new(".text\nnop\nmain: nop\n");

    assert_eq!(ctx.cpu.pc(), Address::new(0x0040_0004));
    assert_eq!(ctx.cpu.regs.read(Register::SP).unsigned(), 0x7FFF_EFFC);
    assert_eq!(ctx.cpu.regs.read(Register::GP).unsigned(), 0x1000_8000);
}

#[test]
fn checked_add_overflow_is_an_execute_error() {
    let mut ctx = TestContext::new(
        ".text\nmain: li $t0, 0x7FFFFFFF\n      addi $t1, $t0, 1\n",
    );

    let err = ctx.run().unwrap_err();

    assert!(matches!(err, SimError::Execute { address, .. } if address == Address::new(0x0040_0004)));
    assert!(err.to_string().contains("overflow"));
    assert_eq!(ctx.reg(Register::T1), 0);
}

#[test]
fn unsigned_add_wraps() {
    let mut ctx = TestContext::new(
        ".text\nmain: li $t0, 0x7FFFFFFF\n      addiu $t1, $t0, 1\n",
    );

    ctx.run_ok();

    assert_eq!(ctx.cpu.regs.read(Register::T1).unsigned(), 0x8000_0000);
}

#[test]
fn loop_counts_down_with_branches() {
    let source = "\
.text
main:   li $t0, 5
        li $t1, 0
loop:   add $t1, $t1, $t0
        addi $t0, $t0, -1
        bgtz $t0, loop
        li $v0, 10
        syscall
";
    let mut ctx = TestContext::new(source);

    assert_eq!(ctx.run_ok(), ExitStatus::Exited(0));
    assert_eq!(ctx.reg(Register::T1), 15);
    assert_eq!(ctx.reg(Register::T0), 0);
}

#[test]
fn call_and_return_through_ra() {
    let source = "\
.text
main:   jal double
        j end
double: add $v1, $a0, $a0
        jr $ra
end:    nop
";
    let mut ctx = TestContext::new(source);
    let _ = ctx.cpu.regs.write(Register::A0, Word::from_signed(21));

    assert_eq!(ctx.run_ok(), ExitStatus::Finished);
    assert_eq!(ctx.reg(Register::V1), 42);
    assert_eq!(ctx.cpu.regs.read(Register::RA).unsigned(), 0x0040_0004);
}

#[test]
fn multiply_and_divide_use_hi_lo() {
    let source = "\
.text
main:   li $t0, -7
        li $t1, 2
        div $t0, $t1
        mflo $t2
        mfhi $t3
        mult $t0, $t1
        mflo $t4
        li $t5, 0
        div $t0, $t5
        mflo $t6
";
    let mut ctx = TestContext::new(source);

    ctx.run_ok();

    assert_eq!(ctx.reg(Register::T2), -3);
    assert_eq!(ctx.reg(Register::new(11).unwrap()), -1);
    assert_eq!(ctx.reg(Register::new(12).unwrap()), -14);
    // division by zero leaves hi/lo from the multiply
    assert_eq!(ctx.reg(Register::new(14).unwrap()), -14);
    assert_eq!(ctx.cpu.regs.hi.signed(), -1);
}

#[test]
fn loads_and_stores_move_data() {
    let source = "\
.data
vals:   .word 0x11223344, -1
bytes:  .byte 0x80
.text
main:   la $t0, vals
        lw $t1, 0($t0)
        lh $t2, vals+4
        lbu $t3, bytes
        lb $t4, bytes
        sw $t1, -4($sp)
        lw $t5, -4($sp)
        sb $t1, 4($t0)
        lhu $t6, 4($t0)
";
    let mut ctx = TestContext::new(source);

    ctx.run_ok();

    assert_eq!(ctx.reg(Register::T0), 0x1000_0000);
    assert_eq!(ctx.reg(Register::T1), 0x1122_3344);
    assert_eq!(ctx.reg(Register::T2), -1);
    assert_eq!(ctx.reg(Register::new(11).unwrap()), 0x80);
    assert_eq!(ctx.reg(Register::new(12).unwrap()), -128);
    assert_eq!(ctx.reg(Register::new(13).unwrap()), 0x1122_3344);
    assert_eq!(ctx.reg(Register::new(14).unwrap()), 0x44FF);
}

#[test]
fn data_movements_are_published() {
    let mut ctx = TestContext::new(".text\nmain: li $t0, 9\n      sw $t0, 0($sp)\n");

    ctx.run_ok();

    let moves: Vec<_> = ctx
        .recorder
        .messages()
        .into_iter()
        .filter_map(|m| match m {
            Message::DataMovement(d) => Some(d),
            _ => None,
        })
        .collect();
    assert_eq!(
        moves,
        vec![DataMovementMessage {
            address: Address::new(0x7FFF_EFFC),
            width: AccessWidth::Word,
            access: AccessType::Write,
            value: Word::from_signed(9),
        }]
    );
}

#[test]
fn register_changes_are_published_only_when_values_differ() {
    let mut ctx = TestContext::new(".text\nmain: li $t0, 3\n      li $t0, 3\n      li $zero, 1\n");

    ctx.run_ok();

    let changes: Vec<_> = ctx
        .recorder
        .messages()
        .into_iter()
        .filter_map(|m| match m {
            Message::RegisterChanged(c) => Some(c),
            _ => None,
        })
        .collect();
    assert_eq!(
        changes,
        vec![RegisterChangedMessage {
            register: RegRef::Gpr(Register::T0),
            old: Word::ZERO,
            new: Word::from_signed(3),
        }]
    );
    assert_eq!(ctx.reg(Register::ZERO), 0);
}

#[test]
fn single_cycle_announces_each_stage() {
    let mut ctx = TestContext::new(".text\nmain: nop\n");

    ctx.run_ok();

    let stages: Vec<_> = ctx
        .recorder
        .messages()
        .into_iter()
        .filter_map(|m| match m {
            Message::StageEnter(stage) => Some(stage),
            _ => None,
        })
        .collect();
    // the final fetch finds the end of the text segment
    assert_eq!(
        stages,
        vec![Stage::Fetch, Stage::Decode, Stage::Execute, Stage::Fetch]
    );
    assert_eq!(ctx.recorder.count("ExecuteStatement"), 1);
    assert_eq!(ctx.recorder.count("InstructionType"), 1);
    assert_eq!(ctx.recorder.count("PipelineHazard"), 0);
}

#[test]
fn jumping_outside_the_text_segment_is_a_program_error() {
    let mut ctx = TestContext::new(".text\nmain: li $t0, 0x500000\n      jr $t0\n");

    let err = ctx.run().unwrap_err();

    assert_eq!(err.kind(), "ProgramError");
    assert_eq!(err.address(), Some(Address::new(0x0050_0000)));
}

#[test]
fn break_raises_an_instruction_error() {
    let mut ctx = TestContext::new(".text\nmain: break\n");

    assert_eq!(ctx.run().unwrap_err().kind(), "InstructionError");
}

#[test]
fn memory_faults_propagate() {
    let mut ctx = TestContext::new(".text\nmain: lw $t0, 0($zero)\n");

    assert_eq!(ctx.run().unwrap_err().kind(), "MemoryError");
}

#[test]
fn trace_mode_writes_to_the_debug_stream() {
    let mut config = Config::default();
    config.general.trace = true;
    let mut ctx = TestContext::with_config(".text\nmain: nop\n", config, ScriptedIo::new());

    ctx.run_ok();

    assert_eq!(ctx.io.debug_output(), "0x00400000: nop\n");
}
