//! Syscall dispatch.
//!
//! `syscall` reads its number from `$v0` and its arguments from `$a0`/`$a1`. Console
//! I/O is delegated to the `Io` collaborator.
//!
//! | `$v0` | Service       | Arguments                     | Result        |
//! |-------|---------------|-------------------------------|---------------|
//! | 1     | print int     | `$a0` value                   |               |
//! | 4     | print string  | `$a0` address of NUL string   |               |
//! | 5     | read int      |                               | `$v0`         |
//! | 8     | read string   | `$a0` buffer, `$a1` length    | buffer        |
//! | 9     | sbrk          | `$a0` bytes                   | `$v0` address |
//! | 10    | exit          |                               |               |
//! | 11    | print char    | `$a0` character               |               |
//! | 12    | read char     |                               | `$v0`         |
//! | 17    | exit2         | `$a0` exit code               |               |

use tracing::debug;

use super::{Cpu, ExitStatus};
use crate::common::constants::MAX_STRING_LENGTH;
use crate::common::{Address, RegRef, SimError, Word};
use crate::isa::abi::{REG_ARG0, REG_ARG1, REG_RESULT, REG_SYSCALL};
use crate::sim::io::{ReadError, Stream};

/// Print the integer in `$a0`.
pub const PRINT_INT: i32 = 1;
/// Print the NUL-terminated string at `$a0`.
pub const PRINT_STRING: i32 = 4;
/// Read an integer into `$v0`.
pub const READ_INT: i32 = 5;
/// Read a line into the buffer at `$a0` of length `$a1`.
pub const READ_STRING: i32 = 8;
/// Grow the heap by `$a0` bytes.
pub const SBRK: i32 = 9;
/// Terminate with code 0.
pub const EXIT: i32 = 10;
/// Print the character in `$a0`.
pub const PRINT_CHAR: i32 = 11;
/// Read a character into `$v0`.
pub const READ_CHAR: i32 = 12;
/// Terminate with the code in `$a0`.
pub const EXIT2: i32 = 17;

impl Cpu {
    /// Executes the syscall at `at`.
    ///
    /// # Returns
    ///
    /// `Some(status)` if the syscall ends the run (exit, or a cancelled read).
    ///
    /// # Errors
    ///
    /// `SimError::Instruction` for an unknown service number, `SimError::Program` for
    /// unusable input, plus memory and heap exceptions from the service itself.
    pub(super) fn syscall(&mut self, at: Address) -> Result<Option<ExitStatus>, SimError> {
        let number = self.regs.read(REG_SYSCALL).signed();
        let a0 = self.regs.read(REG_ARG0);
        debug!(%at, number, "syscall");

        match number {
            PRINT_INT => self.io.print_int(Stream::Standard, a0.signed()),
            PRINT_STRING => {
                let bytes = self
                    .memory
                    .read_cstring(Address::new(a0.unsigned()), MAX_STRING_LENGTH)?;
                self.io
                    .print_string(Stream::Standard, &String::from_utf8_lossy(&bytes));
            }
            PRINT_CHAR => self
                .io
                .print_char(Stream::Standard, char::from(a0.low_byte())),
            READ_INT => {
                let value = match self.io.read_int(Stream::Standard) {
                    Ok(value) => value,
                    Err(err) => return read_failure(at, err),
                };
                self.set_register(RegRef::Gpr(REG_RESULT), Word::from_signed(value));
            }
            READ_CHAR => {
                let ch = match self.io.read_char(Stream::Standard) {
                    Ok(ch) => ch,
                    Err(err) => return read_failure(at, err),
                };
                self.set_register(RegRef::Gpr(REG_RESULT), Word::from_unsigned(u32::from(ch)));
            }
            READ_STRING => {
                let capacity = self.regs.read(REG_ARG1).signed();
                if capacity < 1 {
                    return Ok(None);
                }
                let max_len = usize::try_from(capacity - 1).unwrap_or_default();
                let line = match self.io.read_string(Stream::Standard, max_len) {
                    Ok(line) => line,
                    Err(err) => return read_failure(at, err),
                };
                let mut bytes = line.into_bytes();
                bytes.truncate(max_len);
                bytes.push(0);
                self.store_bytes(Address::new(a0.unsigned()), &bytes)?;
            }
            SBRK => {
                let old = self.memory.sbrk(a0.signed())?;
                self.set_register(RegRef::Gpr(REG_RESULT), Word::from_unsigned(old.val()));
            }
            EXIT => return Ok(Some(ExitStatus::Exited(0))),
            EXIT2 => return Ok(Some(ExitStatus::Exited(a0.signed()))),
            other => {
                return Err(SimError::Instruction {
                    address: at,
                    message: format!("unknown syscall {other}"),
                });
            }
        }
        Ok(None)
    }
}

fn read_failure(at: Address, err: ReadError) -> Result<Option<ExitStatus>, SimError> {
    match err {
        ReadError::Cancelled => Ok(Some(ExitStatus::Cancelled)),
        ReadError::InvalidInput(_) | ReadError::Closed => Err(SimError::Program {
            address: Some(at),
            message: err.to_string(),
        }),
    }
}
