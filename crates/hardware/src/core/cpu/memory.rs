//! Memory Access Helpers.
//!
//! This module provides the interface between the execute stage and the data memory.
//! Every successful access is published as a `DataMovement` message; failed accesses
//! propagate the memory exception without publishing.

use super::Cpu;
use crate::bus::Message;
use crate::bus::message::DataMovementMessage;
use crate::common::{AccessType, AccessWidth, Address, SimError, Word};

impl Cpu {
    /// Loads a value and publishes the access.
    ///
    /// # Errors
    ///
    /// Memory or stack exceptions from the underlying access.
    pub fn load(
        &mut self,
        address: Address,
        width: AccessWidth,
        signed: bool,
    ) -> Result<Word, SimError> {
        let value = self.memory.load(address, width, signed)?;
        self.publish_access(address, width, AccessType::Read, value);
        Ok(value)
    }

    /// Stores the low `width` bytes of `value` and publishes the access.
    ///
    /// # Errors
    ///
    /// Memory or stack exceptions from the underlying access.
    pub fn store(
        &mut self,
        address: Address,
        width: AccessWidth,
        value: Word,
    ) -> Result<(), SimError> {
        self.memory.store(address, width, value)?;
        self.publish_access(address, width, AccessType::Write, value);
        Ok(())
    }

    /// Stores `data` byte by byte from `address`, publishing each byte.
    ///
    /// # Errors
    ///
    /// Fails on the first unmapped byte; earlier bytes stay written.
    pub fn store_bytes(&mut self, address: Address, data: &[u8]) -> Result<(), SimError> {
        for (offset, byte) in (0u32..).zip(data) {
            let value = Word::from_unsigned(u32::from(*byte));
            self.store(address.advance(offset), AccessWidth::Byte, value)?;
        }
        Ok(())
    }

    fn publish_access(&self, address: Address, width: AccessWidth, access: AccessType, value: Word) {
        self.bus
            .send_message(Message::DataMovement(DataMovementMessage {
                address,
                width,
                access,
                value,
            }));
    }
}
