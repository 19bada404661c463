//! Rendered diagnostics.

use std::fmt;

use vex_ir::Position;

use crate::{CompileError, ErrorKind};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
}

/// A single message for the user.
///
/// Built with the `error`/`warning` constructors and refined with
/// `with_note`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// `None` for warnings.
    pub kind: Option<ErrorKind>,
    pub message: String,
    pub pos: Position,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn error(kind: ErrorKind, pos: Position, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Error,
            kind: Some(kind),
            message: message.into(),
            pos,
            notes: Vec::new(),
        }
    }

    pub fn warning(pos: Position, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            kind: None,
            message: message.into(),
            pos,
            notes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// The `Kind` column of the rendered line.
    pub fn label(&self) -> &'static str {
        match self.kind {
            Some(kind) => kind.label(),
            None => "Warning",
        }
    }

    /// Render as `<file>:<line>:<col+1>: <Kind>: <message>`, notes indented below.
    pub fn render(&self, file: &str) -> String {
        let mut out = format!("{file}:{}: {}: {}", self.pos, self.label(), self.message);
        for note in &self.notes {
            out.push_str("\n    note: ");
            out.push_str(note);
        }
        out
    }
}

impl From<CompileError> for Diagnostic {
    fn from(err: CompileError) -> Self {
        Diagnostic::error(err.kind, err.pos, err.message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.pos, self.label(), self.message)
    }
}

#[cfg(test)]
mod tests;
