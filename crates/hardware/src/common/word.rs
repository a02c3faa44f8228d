//! Two's-complement 32-bit words.
//!
//! `Word` is the value type of every register and every aligned memory word. It keeps
//! the raw bit pattern and offers explicit signed and unsigned views. It provides:
//! 1. **Decoding:** Signed (`i32`) and unsigned (`u32`) interpretation of the same bits.
//! 2. **Checked Arithmetic:** Overflow detection by widening to 64 bits before narrowing.
//! 3. **Wrapping Arithmetic:** Explicit modulo-2^32 reduction, independent of the checked path.
//! 4. **Byte Encoding:** Big-endian conversion for words, half-words and bytes.

use std::fmt;

use serde::Serialize;

/// Modulus of 32-bit wrapping arithmetic.
const MODULUS: u64 = 1 << 32;

/// A 32-bit two's-complement value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Word(u32);

impl Word {
    /// The all-zero word.
    pub const ZERO: Self = Self(0);

    /// Creates a word from a signed value.
    #[inline(always)]
    pub const fn from_signed(value: i32) -> Self {
        Self(value as u32)
    }

    /// Creates a word from an unsigned value.
    #[inline(always)]
    pub const fn from_unsigned(value: u32) -> Self {
        Self(value)
    }

    /// Interprets the bits as a signed two's-complement value.
    #[inline(always)]
    pub const fn signed(self) -> i32 {
        self.0 as i32
    }

    /// Interprets the bits as an unsigned value.
    #[inline(always)]
    pub const fn unsigned(self) -> u32 {
        self.0
    }

    /// Narrows a widened result, returning `None` outside `[-2^31, 2^31 - 1]`.
    fn narrow(wide: i64) -> Option<Self> {
        if (i64::from(i32::MIN)..=i64::from(i32::MAX)).contains(&wide) {
            Some(Self::from_signed(wide as i32))
        } else {
            None
        }
    }

    /// Signed addition that reports overflow.
    ///
    /// Both operands are widened to 64 bits, added, and the sum is compared
    /// against the 32-bit signed range.
    ///
    /// # Returns
    ///
    /// `None` if the mathematical sum does not fit in 32 bits.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        Self::narrow(i64::from(self.signed()) + i64::from(rhs.signed()))
    }

    /// Signed subtraction that reports overflow.
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        Self::narrow(i64::from(self.signed()) - i64::from(rhs.signed()))
    }

    /// Addition modulo 2^32. Never overflows.
    pub fn wrapping_add(self, rhs: Self) -> Self {
        let sum = u64::from(self.0) + u64::from(rhs.0);
        Self((sum % MODULUS) as u32)
    }

    /// Subtraction modulo 2^32. Never overflows.
    pub fn wrapping_sub(self, rhs: Self) -> Self {
        let diff = u64::from(self.0) + MODULUS - u64::from(rhs.0);
        Self((diff % MODULUS) as u32)
    }

    /// Encodes the word as four big-endian bytes.
    pub const fn to_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    /// Decodes four big-endian bytes.
    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Self(u32::from_be_bytes(bytes))
    }

    /// Encodes the low 16 bits as two big-endian bytes.
    pub const fn to_half_bytes(self) -> [u8; 2] {
        (self.0 as u16).to_be_bytes()
    }

    /// Decodes two big-endian bytes, sign- or zero-extending to 32 bits.
    pub const fn from_half_bytes(bytes: [u8; 2], signed: bool) -> Self {
        let half = u16::from_be_bytes(bytes);
        if signed {
            Self::from_signed(half as i16 as i32)
        } else {
            Self(half as u32)
        }
    }

    /// Decodes one byte, sign- or zero-extending to 32 bits.
    pub const fn from_byte(byte: u8, signed: bool) -> Self {
        if signed {
            Self::from_signed(byte as i8 as i32)
        } else {
            Self(byte as u32)
        }
    }

    /// Returns the low byte.
    pub const fn low_byte(self) -> u8 {
        self.0 as u8
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.signed())
    }
}

impl fmt::LowerHex for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl From<i32> for Word {
    fn from(value: i32) -> Self {
        Self::from_signed(value)
    }
}

impl From<u32> for Word {
    fn from(value: u32) -> Self {
        Self::from_unsigned(value)
    }
}
