//! # Word Tests
//!
//! Signed/unsigned views, checked versus wrapping arithmetic, and big-endian byte
//! encoding of the 32-bit word.

use mipsim_core::common::Word;
use proptest::prelude::*;
use rstest::rstest;

#[rstest]
#[case(0)]
#[case(1)]
#[case(-1)]
#[case(10)]
#[case(-10)]
#[case(255)]
#[case(i32::MAX)]
#[case(i32::MIN)]
fn signed_value_survives_byte_encoding(#[case] value: i32) {
    let bytes = Word::from_signed(value).to_bytes();
    assert_eq!(Word::from_bytes(bytes).signed(), value);
}

#[test]
fn bytes_are_big_endian() {
    assert_eq!(
        Word::from_unsigned(0x0102_0304).to_bytes(),
        [0x01, 0x02, 0x03, 0x04]
    );
}

#[test]
fn checked_add_overflows_at_i32_max() {
    let max = Word::from_signed(i32::MAX);
    let one = Word::from_signed(1);
    assert_eq!(max.checked_add(one), None);
    assert_eq!(max.wrapping_add(one), Word::from_unsigned(0x8000_0000));
}

#[test]
fn checked_sub_overflows_at_i32_min() {
    let min = Word::from_signed(i32::MIN);
    let one = Word::from_signed(1);
    assert_eq!(min.checked_sub(one), None);
    assert_eq!(min.wrapping_sub(one), Word::from_signed(i32::MAX));
}

#[test]
fn half_and_byte_extension() {
    assert_eq!(Word::from_half_bytes([0xFF, 0xFE], true).signed(), -2);
    assert_eq!(Word::from_half_bytes([0xFF, 0xFE], false).unsigned(), 0xFFFE);
    assert_eq!(Word::from_byte(0x80, true).signed(), -128);
    assert_eq!(Word::from_byte(0x80, false).unsigned(), 0x80);
}

proptest! {
    #[test]
    fn checked_add_matches_widened_sum(a in any::<i32>(), b in any::<i32>()) {
        let wide = i64::from(a) + i64::from(b);
        let checked = Word::from_signed(a).checked_add(Word::from_signed(b));
        if wide > i64::from(i32::MAX) || wide < i64::from(i32::MIN) {
            prop_assert_eq!(checked, None);
        } else {
            prop_assert_eq!(checked.map(Word::signed), Some(wide as i32));
        }
    }

    #[test]
    fn wrapping_add_never_fails(a in any::<u32>(), b in any::<u32>()) {
        let sum = Word::from_unsigned(a).wrapping_add(Word::from_unsigned(b));
        prop_assert_eq!(sum.unsigned(), a.wrapping_add(b));
    }

    #[test]
    fn signed_and_unsigned_views_agree(v in any::<u32>()) {
        let word = Word::from_unsigned(v);
        prop_assert_eq!(word.signed() as u32, v);
    }
}
