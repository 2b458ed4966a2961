//! Source location tracking for error reporting.
//!
//! Every node handed to the code generator carries the line it was parsed
//! from. [`Span`] wraps that line so diagnostics can point back at it.

use std::fmt;

/// A source location, represented by its line.
///
/// Line 0 means the location is unknown (synthetic nodes built without a
/// source, for instance).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Line number (1-indexed, 0 when unknown).
    pub line: u32,
}

impl Span {
    /// Create a span for a source line.
    #[inline]
    pub fn new(line: u32) -> Self {
        Self { line }
    }

    /// A span with no known source line.
    #[inline]
    pub fn unknown() -> Self {
        Self { line: 0 }
    }

    /// Whether the line is known.
    #[inline]
    pub fn is_known(&self) -> bool {
        self.line != 0
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}", self.line)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_known() {
            write!(f, "line {}", self.line)
        } else {
            write!(f, "unknown line")
        }
    }
}
