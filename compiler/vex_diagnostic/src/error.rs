//! The error taxonomy shared by every phase.

use std::fmt;

use vex_ir::Position;

/// What kind of problem a [`CompileError`] describes.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorKind {
    /// Malformed tokens or grammar.
    Syntax,
    /// Constant division by zero, operators that make no sense for the operand types.
    Math,
    /// Incompatible types, invalid conversions.
    Type,
    /// Redefinitions, misplaced control flow, missing returns.
    Logic,
    /// Undefined names, modules, members.
    Missing,
    /// Environment failures: I/O, lock markers, artifacts.
    SysErr,
    /// Already reported. Unwinds to the nearest recovery point silently.
    Reported,
}

impl ErrorKind {
    /// Name used in rendered diagnostics.
    pub const fn label(self) -> &'static str {
        match self {
            ErrorKind::Syntax => "SyntaxError",
            ErrorKind::Math => "MathError",
            ErrorKind::Type => "TypeError",
            ErrorKind::Logic => "LogicError",
            ErrorKind::Missing => "MissingError",
            ErrorKind::SysErr => "SysError",
            ErrorKind::Reported => "Reported",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A positioned compile error.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{pos}: {kind}: {message}")]
pub struct CompileError {
    pub kind: ErrorKind,
    pub message: String,
    pub pos: Position,
}

pub type CompileResult<T> = Result<T, CompileError>;

impl CompileError {
    pub fn new(kind: ErrorKind, pos: Position, message: impl Into<String>) -> Self {
        CompileError {
            kind,
            message: message.into(),
            pos,
        }
    }

    pub fn syntax(pos: Position, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Syntax, pos, message)
    }

    pub fn math(pos: Position, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Math, pos, message)
    }

    pub fn type_error(pos: Position, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Type, pos, message)
    }

    pub fn logic(pos: Position, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Logic, pos, message)
    }

    pub fn missing(pos: Position, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Missing, pos, message)
    }

    pub fn sys(pos: Position, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SysErr, pos, message)
    }

    /// The silent sentinel.
    pub fn reported(pos: Position) -> Self {
        Self::new(ErrorKind::Reported, pos, String::new())
    }

    #[inline]
    pub fn is_reported(&self) -> bool {
        self.kind == ErrorKind::Reported
    }

    /// Re-position an error that was raised without location information.
    #[must_use]
    pub fn at(mut self, pos: Position) -> Self {
        self.pos = pos;
        self
    }
}
