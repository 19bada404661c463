//! Type errors, mapped onto the shared error taxonomy at the crate boundary.

use vex_diagnostic::{CompileError, ErrorKind};
use vex_ir::{Position, Type};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    #[error("undefined struct `{0}`")]
    UnknownStruct(String),

    #[error("struct `{0}` is already defined")]
    StructRedefinition(String),

    #[error("struct `{ty}` has no member `{member}`")]
    UnknownMember { ty: String, member: String },

    #[error("struct `{0}` contains itself by value")]
    RecursiveStruct(String),

    #[error("type `{0}` is too large")]
    TooLarge(String),

    #[error("vector element type must be a scalar, found `{0}`")]
    VectorElement(Type),

    #[error("cannot store a value of type `void`")]
    VoidValue,

    #[error("cannot convert `{from}` to `{to}`")]
    Incompatible { from: Type, to: Type },

    #[error("implicit narrowing from `{from}` to `{to}` requires an explicit cast")]
    Narrowing { from: Type, to: Type },

    #[error("cannot convert `{from}` to `{to}` without an explicit cast")]
    PointerMismatch { from: Type, to: Type },

    #[error("cannot convert array `{from}` to `{to}`: take the address first")]
    ArrayPointer { from: Type, to: Type },
}

impl TypeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TypeError::UnknownStruct(_) | TypeError::UnknownMember { .. } => ErrorKind::Missing,
            TypeError::StructRedefinition(_) => ErrorKind::Logic,
            _ => ErrorKind::Type,
        }
    }

    /// Attach a position, producing a reportable error.
    pub fn at(self, pos: Position) -> CompileError {
        CompileError::new(self.kind(), pos, self.to_string())
    }
}
