/// I/O collaborators for syscall tests.
pub mod io;

/// Bus listeners that record or count what they receive.
pub mod listener;
