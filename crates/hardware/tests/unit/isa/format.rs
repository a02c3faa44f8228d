use pretty_assertions::assert_eq;
use rstest::rstest;

use mipsim_core::common::Register;
use mipsim_core::isa::format::{FormatMismatch, OperandFormat, OperandType};
use mipsim_core::isa::instruction::Instruction;
use mipsim_core::isa::operand::{AddressOperand, Operand};

#[rstest]
#[case(OperandType::DestRegister, OperandType::Register, false, true)]
#[case(OperandType::TargetRegister, OperandType::Register, false, true)]
#[case(OperandType::Register, OperandType::DestRegister, false, false)]
#[case(OperandType::Immediate, OperandType::UnsignedImmediate, false, true)]
#[case(OperandType::UnsignedImmediate, OperandType::Immediate, true, false)]
#[case(OperandType::Integer, OperandType::Immediate, false, true)]
#[case(OperandType::Immediate, OperandType::Integer, false, false)]
#[case(OperandType::Immediate, OperandType::Integer, true, true)]
#[case(OperandType::UnsignedImmediate, OperandType::Integer, true, true)]
#[case(OperandType::Address, OperandType::Label, false, true)]
#[case(OperandType::Address, OperandType::BaseOffset, false, true)]
#[case(OperandType::Label, OperandType::BaseOffset, false, false)]
#[case(OperandType::String, OperandType::String, false, true)]
fn acceptance(
    #[case] slot: OperandType,
    #[case] actual: OperandType,
    #[case] permissive: bool,
    #[case] expected: bool,
) {
    assert_eq!(slot.accepts(actual, permissive), expected);
}

#[test]
fn every_opcode_has_a_bounded_format() {
    for &op in Instruction::ALL {
        let format = op.format();
        assert!(format.arity() <= 3, "{op}");
        assert_eq!(Instruction::from_mnemonic(op.mnemonic()), Some(op));
    }
}

#[test]
fn mnemonics_are_case_insensitive() {
    assert_eq!(Instruction::from_mnemonic("ADDI"), Some(Instruction::Addi));
    assert_eq!(Instruction::from_mnemonic("SysCall"), Some(Instruction::Syscall));
    assert_eq!(Instruction::from_mnemonic("addx"), None);
}

#[test]
fn validate_reports_count_before_types() {
    let operands = vec![Operand::Integer(1)];

    assert_eq!(
        OperandFormat::DEST_SRC_TARGET.validate(&operands, false),
        Err(FormatMismatch::Count {
            expected: 3,
            found: 1
        })
    );
}

#[test]
fn validate_names_the_failing_position() {
    let operands = vec![
        Operand::Register(Register::T0),
        Operand::Address(AddressOperand::base_offset(0, Register::SP)),
    ];

    let err = OperandFormat::SRC_LABEL.validate(&operands, false).unwrap_err();

    assert_eq!(
        err,
        FormatMismatch::Type {
            position: 1,
            expected: &[OperandType::Label],
            found: OperandType::BaseOffset,
        }
    );
    assert_eq!(err.to_string(), "operand 2 must be label, found base-offset address");
}

#[test]
fn loads_accept_both_address_shapes() {
    let format = Instruction::Lw.format();
    let target = Operand::Register(Register::T1);

    for address in [
        AddressOperand::label("buf"),
        AddressOperand::base_offset(4, Register::SP),
    ] {
        let operands = vec![target.clone(), Operand::Address(address)];
        assert_eq!(format.validate(&operands, false), Ok(()));
    }
}

#[test]
fn control_and_memory_classification() {
    let control: Vec<_> = Instruction::ALL
        .iter()
        .copied()
        .filter(|i| i.is_control())
        .collect();

    assert_eq!(control.len(), 10);
    assert!(Instruction::Jalr.is_control());
    assert!(!Instruction::Syscall.is_control());
    assert!(Instruction::Sb.is_store());
    assert!(!Instruction::Sb.is_load());
    assert!(Instruction::Lhu.is_load());
}
