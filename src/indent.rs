//! Indentation tracking.

use std::fmt;

use crate::error::{Error, Result};

/// An immutable indentation value: a base unit string repeated `level` times.
///
/// `incr` and `decr` return new values rather than mutating, so a rendering
/// context can hand a deeper indent to its children while keeping its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indent {
    unit: String,
    level: usize,
    current: String,
}

impl Indent {
    /// Create an indent at level zero.
    pub fn new(unit: &str) -> Self {
        Indent {
            unit: unit.to_string(),
            level: 0,
            current: String::new(),
        }
    }

    fn at_level(unit: &str, level: usize) -> Self {
        Indent {
            unit: unit.to_string(),
            level,
            current: unit.repeat(level),
        }
    }

    /// Current nesting level.
    pub fn level(&self) -> usize {
        self.level
    }

    /// The materialized indent string for the current level.
    pub fn as_str(&self) -> &str {
        &self.current
    }

    /// A new indent one level deeper.
    pub fn incr(&self) -> Self {
        Indent::at_level(&self.unit, self.level + 1)
    }

    /// A new indent one level shallower. Level zero cannot be decremented;
    /// the recursive render/unrender symmetry should make that unreachable.
    pub fn decr(&self) -> Result<Self> {
        if self.level == 0 {
            return Err(Error::IndentUnderflow);
        }
        Ok(Indent::at_level(&self.unit, self.level - 1))
    }
}

impl fmt::Display for Indent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.current)
    }
}
