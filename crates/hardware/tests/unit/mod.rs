//! # Unit Suites
//!
//! One module per subsystem of the simulator: shared value types, the assembler, the
//! instruction set, the CPU core, the message bus and the run controller.



/// Operand formats, decoding and disassembly.
pub mod isa;




/// Configuration defaults and JSON loading.
pub mod config;
