//! Simulated address type.
//!
//! MIPS addresses are 32 bits wide. This module wraps them in a strong type so that
//! addresses cannot be confused with data words. It provides the following:
//! 1. **Type Safety:** Distinguishes addresses from plain integers at compile time.
//! 2. **Address Manipulation:** Wrapping offsets, alignment checks and segment-relative math.

use std::fmt;

use serde::Serialize;

/// A 32-bit address in the simulated MIPS address space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Address(pub u32);

impl Address {
    /// Creates a new address from a raw 32-bit value.
    #[inline(always)]
    pub const fn new(addr: u32) -> Self {
        Self(addr)
    }

    /// Returns the raw 32-bit address value.
    #[inline(always)]
    pub const fn val(self) -> u32 {
        self.0
    }

    /// Returns this address displaced by a signed byte offset.
    ///
    /// Address arithmetic wraps modulo 2^32 like the hardware adder does.
    ///
    /// # Arguments
    ///
    /// * `offset` - Signed displacement in bytes.
    #[inline]
    pub const fn offset(self, offset: i32) -> Self {
        Self(self.0.wrapping_add(offset as u32))
    }

    /// Returns this address advanced by an unsigned byte count.
    #[inline]
    pub const fn advance(self, bytes: u32) -> Self {
        Self(self.0.wrapping_add(bytes))
    }

    /// Returns `true` if the address is a multiple of `align` bytes.
    ///
    /// `align` must be a power of two.
    #[inline]
    pub const fn is_aligned(self, align: u32) -> bool {
        self.0 & (align - 1) == 0
    }

    /// Signed distance in bytes from `other` to `self`.
    #[inline]
    pub const fn distance_from(self, other: Self) -> i64 {
        self.0 as i64 - other.0 as i64
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

impl From<u32> for Address {
    fn from(value: u32) -> Self {
        Self(value)
    }
}
