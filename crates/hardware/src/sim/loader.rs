//! Source and configuration loading.
//!
//! This module turns files on disk into the inputs of a run. It performs:
//! 1. **Source loading:** Reads an assembly file and assembles it into a `Program`.
//! 2. **Configuration loading:** Reads a JSON configuration file into a `Config`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::asm::{AssembleError, AssemblerOptions, assemble_source};
use crate::config::Config;
use crate::isa::program::Program;

/// Failure to turn a file into a program or configuration.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("could not read '{}': {source}", path.display())]
    Read {
        /// The file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The configuration file is not valid JSON for `Config`.
    #[error("invalid configuration '{}': {source}", path.display())]
    Config {
        /// The file.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
    /// The source did not assemble.
    #[error(transparent)]
    Assemble(#[from] AssembleError),
}

/// Reads a source file into a string.
///
/// # Errors
///
/// `LoadError::Read` if the file cannot be read as UTF-8 text.
pub fn read_source(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads and assembles a source file.
///
/// # Arguments
///
/// * `path` - Path to the assembly source.
/// * `options` - Assembler options (permissiveness, segment bases).
///
/// # Errors
///
/// `LoadError::Read` for unreadable files, `LoadError::Assemble` carrying every problem
/// found otherwise.
pub fn load_program(path: &Path, options: AssemblerOptions) -> Result<Program, LoadError> {
    let source = read_source(path)?;
    let program = assemble_source(&source, options)?;
    debug!(
        path = %path.display(),
        statements = program.statements().len(),
        variables = program.variables().len(),
        "program loaded"
    );
    Ok(program)
}

/// Reads a JSON configuration file. Missing sections and fields take their defaults.
///
/// # Errors
///
/// `LoadError::Read` for unreadable files, `LoadError::Config` for invalid JSON.
pub fn load_config(path: &Path) -> Result<Config, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| LoadError::Config {
        path: path.to_path_buf(),
        source,
    })
}
