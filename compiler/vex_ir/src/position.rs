//! Source positions.

use std::fmt;

/// A location in a source file.
///
/// `line` is 1-based, `column` is 0-based. Diagnostics add one to the
/// column when rendering for humans.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, Debug, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    /// Position of the first byte of a file.
    pub const START: Position = Position { line: 1, column: 0 };

    #[inline]
    pub const fn new(line: u32, column: u32) -> Self {
        Position { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column + 1)
    }
}
