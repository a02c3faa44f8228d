//! Assembly-time problems.
//!
//! Problems are plain data: they are accumulated, never thrown, so that one pass
//! reports everything wrong with a program.

use std::fmt;

use serde::Serialize;

use crate::asm::syntax::Span;

/// A recoverable validation failure found while assembling.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Problem {
    /// Description.
    pub message: String,
    /// Source line, if known.
    pub line: Option<u32>,
    /// Column range `[start, end)` on that line, if known.
    pub span: Option<(usize, usize)>,
}

impl Problem {
    /// A problem without a location.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
            span: None,
        }
    }

    /// A problem located at `span`.
    pub fn at(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            line: Some(span.line),
            span: Some((span.start, span.end)),
        }
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.line, self.span) {
            (Some(line), Some((start, _))) => write!(f, "{line}:{start}: {}", self.message),
            (Some(line), None) => write!(f, "{line}: {}", self.message),
            _ => write!(f, "{}", self.message),
        }
    }
}
