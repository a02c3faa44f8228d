/// Operand-type acceptance and format validation.
pub mod format;


/// Statement rendering.
pub mod disasm;
