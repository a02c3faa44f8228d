//! Simulated data memory.
//!
//! Memory is partitioned into regions rather than stored as one flat array:
//! 1. **Text:** Holds statements, not bytes; data accesses to it raise a memory error.
//! 2. **Static Data:** `[data_base, heap_base)`, initialized from the program's data image.
//! 3. **Heap:** `[heap_base, break)`, grown by `sbrk` up to `heap_size` bytes.
//! 4. **Stack:** `stack_size` bytes ending just past `stack_top`, growing downward.
//!
//! Word and half-word accesses must be naturally aligned. Accesses just below the stack
//! limit raise a stack error; everything else outside a region is a memory error.

use tracing::debug;

use crate::common::addr::Address;
use crate::common::constants::STACK_GUARD_BYTES;
use crate::common::data::{AccessType, AccessWidth};
use crate::common::error::SimError;
use crate::common::word::Word;
use crate::config::MemoryConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Region {
    Data,
    Heap,
    Stack,
}

/// Region-partitioned data memory with a heap break pointer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Memory {
    text_base: u32,
    text_end: u32,
    data_base: u32,
    heap_base: u32,
    heap_limit: u32,
    stack_base: u32,
    stack_end: u32,
    data: Vec<u8>,
    heap: Vec<u8>,
    stack: Vec<u8>,
}

impl Memory {
    /// Creates memory for a program.
    ///
    /// # Arguments
    ///
    /// * `layout` - Region bases and sizes.
    /// * `text_end` - First address past the program's last statement.
    /// * `data_image` - Initial static data, copied to `data_base`.
    pub fn new(layout: &MemoryConfig, text_end: Address, data_image: &[u8]) -> Self {
        let static_size = layout.heap_base.saturating_sub(layout.data_base) as usize;
        let mut data = vec![0; static_size.max(data_image.len())];
        data[..data_image.len()].copy_from_slice(data_image);

        let stack_end = layout.stack_top.saturating_add(4);
        let stack_base = stack_end.saturating_sub(layout.stack_size);
        Self {
            text_base: layout.text_base,
            text_end: text_end.val(),
            data_base: layout.data_base,
            heap_base: layout.heap_base,
            heap_limit: layout.heap_base.saturating_add(layout.heap_size),
            stack_base,
            stack_end,
            data,
            heap: Vec::new(),
            stack: vec![0; (stack_end - stack_base) as usize],
        }
    }

    /// Current program break (first address past the heap).
    pub fn brk(&self) -> Address {
        Address::new(self.heap_base + self.heap.len() as u32)
    }

    /// Moves the program break up by `increment` bytes.
    ///
    /// # Returns
    ///
    /// The previous break, i.e. the start of the newly allocated block.
    ///
    /// # Errors
    ///
    /// `SimError::Heap` for a negative increment or when the heap would exceed its size.
    pub fn sbrk(&mut self, increment: i32) -> Result<Address, SimError> {
        let old = self.brk();
        if increment < 0 {
            return Err(SimError::Heap {
                requested: increment,
                message: "heap cannot shrink".to_string(),
            });
        }
        let new_break = u64::from(old.val()) + u64::from(increment.unsigned_abs());
        if new_break > u64::from(self.heap_limit) {
            return Err(SimError::Heap {
                requested: increment,
                message: format!("heap exhausted at break {old}"),
            });
        }
        self.heap.resize((new_break - u64::from(self.heap_base)) as usize, 0);
        debug!(%old, increment, "heap grown");
        Ok(old)
    }

    fn locate(
        &self,
        addr: Address,
        len: u32,
        access: AccessType,
    ) -> Result<(Region, usize), SimError> {
        let a = addr.val();
        let fault = |message: String| SimError::Memory {
            address: addr,
            message,
        };
        let end = u64::from(a) + u64::from(len);
        let within = |base: u32, limit: u64| a >= base && end <= limit;

        if within(self.data_base, u64::from(self.heap_base)) {
            return Ok((Region::Data, (a - self.data_base) as usize));
        }
        if within(self.heap_base, u64::from(self.brk().val())) {
            return Ok((Region::Heap, (a - self.heap_base) as usize));
        }
        if within(self.stack_base, u64::from(self.stack_end)) {
            return Ok((Region::Stack, (a - self.stack_base) as usize));
        }
        if a < self.stack_base && a >= self.stack_base.saturating_sub(STACK_GUARD_BYTES) {
            return Err(SimError::Stack { address: addr });
        }
        if a >= self.text_base && a < self.text_end {
            return Err(fault(format!("{access:?} access to the text segment")));
        }
        Err(fault(format!("{access:?} access outside mapped memory")))
    }

    fn region_mut(&mut self, region: Region) -> &mut Vec<u8> {
        match region {
            Region::Data => &mut self.data,
            Region::Heap => &mut self.heap,
            Region::Stack => &mut self.stack,
        }
    }

    fn region(&self, region: Region) -> &[u8] {
        match region {
            Region::Data => &self.data,
            Region::Heap => &self.heap,
            Region::Stack => &self.stack,
        }
    }

    fn check_alignment(addr: Address, width: AccessWidth) -> Result<(), SimError> {
        if addr.is_aligned(width.bytes()) {
            Ok(())
        } else {
            Err(SimError::Memory {
                address: addr,
                message: format!("unaligned {width:?} access"),
            })
        }
    }

    /// Reads a value of the given width.
    ///
    /// Bytes and half-words are sign- or zero-extended according to `signed`.
    ///
    /// # Errors
    ///
    /// Memory or stack errors for misaligned or unmapped addresses.
    pub fn load(&self, addr: Address, width: AccessWidth, signed: bool) -> Result<Word, SimError> {
        Self::check_alignment(addr, width)?;
        let (region, off) = self.locate(addr, width.bytes(), AccessType::Read)?;
        let bytes = self.region(region);
        Ok(match width {
            AccessWidth::Byte => Word::from_byte(bytes[off], signed),
            AccessWidth::Half => Word::from_half_bytes([bytes[off], bytes[off + 1]], signed),
            AccessWidth::Word => Word::from_bytes([
                bytes[off],
                bytes[off + 1],
                bytes[off + 2],
                bytes[off + 3],
            ]),
        })
    }

    /// Writes the low `width` bytes of `value`.
    ///
    /// # Errors
    ///
    /// Memory or stack errors for misaligned or unmapped addresses.
    pub fn store(&mut self, addr: Address, width: AccessWidth, value: Word) -> Result<(), SimError> {
        Self::check_alignment(addr, width)?;
        let (region, off) = self.locate(addr, width.bytes(), AccessType::Write)?;
        let bytes = self.region_mut(region);
        match width {
            AccessWidth::Byte => bytes[off] = value.low_byte(),
            AccessWidth::Half => bytes[off..off + 2].copy_from_slice(&value.to_half_bytes()),
            AccessWidth::Word => bytes[off..off + 4].copy_from_slice(&value.to_bytes()),
        }
        Ok(())
    }

    /// Copies `data` to consecutive bytes starting at `addr`.
    ///
    /// # Errors
    ///
    /// Fails on the first unmapped byte; earlier bytes stay written.
    pub fn write_bytes(&mut self, addr: Address, data: &[u8]) -> Result<(), SimError> {
        for (i, byte) in data.iter().enumerate() {
            let at = addr.advance(i as u32);
            self.store(at, AccessWidth::Byte, Word::from_unsigned(u32::from(*byte)))?;
        }
        Ok(())
    }

    /// Reads a NUL-terminated string of at most `max` bytes (terminator excluded).
    ///
    /// # Errors
    ///
    /// Memory errors if the string runs into unmapped memory, or a memory error at
    /// `addr` if no terminator is found within `max` bytes.
    pub fn read_cstring(&self, addr: Address, max: u32) -> Result<Vec<u8>, SimError> {
        let mut out = Vec::new();
        for i in 0..max {
            let byte = self.load(addr.advance(i), AccessWidth::Byte, false)?.low_byte();
            if byte == 0 {
                return Ok(out);
            }
            out.push(byte);
        }
        Err(SimError::Memory {
            address: addr,
            message: format!("string exceeds {max} bytes without a terminator"),
        })
    }
}
