use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

use mipsim_core::asm::operand::{OperandExtractor, parse_integer, unescape};
use mipsim_core::asm::syntax::{OperandKind, OperandNode, Span};
use mipsim_core::common::Register;
use mipsim_core::isa::abi::RegisterTable;
use mipsim_core::isa::format::OperandType;
use mipsim_core::isa::operand::{AddressOperand, Operand};

fn node(kind: OperandKind) -> OperandNode {
    OperandNode::new(kind, Span::new(3, 9, 12))
}

#[rstest]
#[case("0", Some(0))]
#[case("42", Some(42))]
#[case("-42", Some(-42))]
#[case("+7", Some(7))]
#[case("0x1F", Some(31))]
#[case("0XfF", Some(255))]
#[case("-0x10", Some(-16))]
#[case("0xFFFFFFFF", Some(-1))]
#[case("4294967296", Some(0))]
#[case("2147483648", Some(i32::MIN))]
#[case("", None)]
#[case("-", None)]
#[case("0x", None)]
#[case("12a", None)]
fn integer_literals(#[case] text: &str, #[case] expected: Option<i32>) {
    assert_eq!(parse_integer(text), expected);
}

#[rstest]
#[case("plain", "plain")]
#[case("a\\nb", "a\nb")]
#[case("tab\\there", "tab\there")]
#[case("\\\"quoted\\\"", "\"quoted\"")]
#[case("back\\\\slash", "back\\slash")]
#[case("nul\\0", "nul\0")]
#[case("keep\\q", "keepq")]
fn escapes(#[case] body: &str, #[case] expected: &str) {
    assert_eq!(unescape(body), expected);
}

#[test]
fn registers_resolve_by_name_and_number() {
    let table = RegisterTable::default();
    let extractor = OperandExtractor::new(&table);
    let mut problems = Vec::new();

    let by_name = extractor.extract(&node(OperandKind::Register("$t0".into())), &mut problems);
    let by_number = extractor.extract(&node(OperandKind::Register("$8".into())), &mut problems);
    let alias = extractor.extract(&node(OperandKind::Register("$s8".into())), &mut problems);

    assert!(problems.is_empty());
    assert_eq!(by_name, Some(Operand::Register(Register::T0)));
    assert_eq!(by_number, by_name);
    assert_eq!(alias, Some(Operand::Register(Register::FP)));
}

#[rstest]
#[case("$t10")]
#[case("$32")]
#[case("$pc")]
fn unknown_register_is_a_located_problem(#[case] text: &str) {
    let table = RegisterTable::default();
    let mut problems = Vec::new();

    let operand = OperandExtractor::new(&table)
        .extract(&node(OperandKind::Register(text.into())), &mut problems);

    assert_eq!(operand, None);
    assert_eq!(problems.len(), 1);
    assert_eq!(problems[0].line, Some(3));
    assert_eq!(problems[0].span, Some((9, 12)));
    assert!(problems[0].message.contains(text));
}

#[test]
fn address_parts_are_independent() {
    let table = RegisterTable::default();
    let extractor = OperandExtractor::new(&table);
    let mut problems = Vec::new();

    let base_offset = extractor.extract(
        &node(OperandKind::Address {
            label: None,
            offset: Some("-8".into()),
            base: Some("$sp".into()),
        }),
        &mut problems,
    );
    let label = extractor.extract(
        &node(OperandKind::Address {
            label: Some("msg".into()),
            offset: None,
            base: None,
        }),
        &mut problems,
    );

    assert!(problems.is_empty());
    let base_offset = base_offset.unwrap();
    assert_eq!(
        base_offset,
        Operand::Address(AddressOperand::base_offset(-8, Register::SP))
    );
    assert_eq!(base_offset.operand_type(), OperandType::BaseOffset);
    let label = label.unwrap();
    assert_eq!(label, Operand::Address(AddressOperand::label("msg")));
    assert_eq!(label.operand_type(), OperandType::Label);
    assert_eq!(label.label(), Some("msg"));
}

#[test]
fn bad_base_register_drops_the_whole_operand() {
    let table = RegisterTable::default();
    let mut problems = Vec::new();

    let operand = OperandExtractor::new(&table).extract(
        &node(OperandKind::Address {
            label: None,
            offset: Some("4".into()),
            base: Some("$nope".into()),
        }),
        &mut problems,
    );

    assert_eq!(operand, None);
    assert_eq!(problems.len(), 1);
}

#[test]
fn strings_are_unescaped_during_extraction() {
    let table = RegisterTable::default();
    let mut problems = Vec::new();

    let operand = OperandExtractor::new(&table)
        .extract(&node(OperandKind::String("hi\\n".into())), &mut problems);

    assert_eq!(operand, Some(Operand::String("hi\n".to_string())));
    assert_eq!(operand.unwrap().operand_type(), OperandType::String);
}

#[rstest]
#[case(0, OperandType::UnsignedImmediate)]
#[case(0xFFFF, OperandType::UnsignedImmediate)]
#[case(0x1_0000, OperandType::Integer)]
#[case(-1, OperandType::Immediate)]
#[case(-0x8000, OperandType::Immediate)]
#[case(-0x8001, OperandType::Integer)]
fn integers_classify_by_narrowest_class(#[case] value: i32, #[case] expected: OperandType) {
    assert_eq!(Operand::Integer(value).operand_type(), expected);
}

proptest! {
    #[test]
    fn decimal_literals_match_std(value in any::<i32>()) {
        prop_assert_eq!(parse_integer(&value.to_string()), Some(value));
    }

    #[test]
    fn hex_literals_match_std(value in any::<u32>()) {
        prop_assert_eq!(parse_integer(&format!("0x{value:X}")), Some(value as i32));
    }
}
