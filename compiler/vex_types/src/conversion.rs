//! The conversion primitive behind casts, call arguments and returns.

use tracing::trace;
use vex_ir::Type;

use crate::{lattice::promotes_to, TypeError};

/// How a value is converted. The backend picks the instruction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Conversion {
    /// Same type, nothing to emit.
    Identity,
    /// Up the lattice (sign-extend, int-to-float, float-extend).
    Promote,
    /// Down the lattice (truncate, float-to-int toward zero, float-truncate).
    Demote,
    /// Pointer to pointer of another pointee.
    PointerCast,
    PointerToInt,
    IntToPointer,
}

impl Conversion {
    #[inline]
    pub fn is_narrowing(self) -> bool {
        self == Conversion::Demote
    }
}

/// Who asked for the conversion.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConvertMode {
    /// Call arguments, returns, operands: promotion only.
    Implicit,
    /// A scalar store into an existing or declared binding: demotion is
    /// performed, and the caller must warn.
    WarnedStore,
    /// `expr as T`
    Explicit,
}

/// Decide how to convert a `from` value into `to`.
pub fn convert(from: &Type, to: &Type, mode: ConvertMode) -> Result<Conversion, TypeError> {
    if from == to {
        return Ok(Conversion::Identity);
    }
    let explicit = mode == ConvertMode::Explicit;
    let incompatible = || TypeError::Incompatible {
        from: from.clone(),
        to: to.clone(),
    };

    let conversion = match (from, to) {
        (Type::Void, _) => return Err(TypeError::VoidValue),
        (Type::Scalar(f), Type::Scalar(t)) => {
            if promotes_to(*f, *t) {
                Conversion::Promote
            } else if mode == ConvertMode::Implicit {
                return Err(TypeError::Narrowing {
                    from: from.clone(),
                    to: to.clone(),
                });
            } else {
                Conversion::Demote
            }
        }
        (Type::Pointer(_), Type::Pointer(_)) => {
            if explicit {
                Conversion::PointerCast
            } else {
                return Err(TypeError::PointerMismatch {
                    from: from.clone(),
                    to: to.clone(),
                });
            }
        }
        (Type::Pointer(_), Type::Scalar(s)) if s.is_integral() && explicit => {
            Conversion::PointerToInt
        }
        (Type::Scalar(s), Type::Pointer(_)) if s.is_integral() && explicit => {
            Conversion::IntToPointer
        }
        (Type::Array(..), Type::Pointer(_)) | (Type::Pointer(_), Type::Array(..)) => {
            return Err(TypeError::ArrayPointer {
                from: from.clone(),
                to: to.clone(),
            });
        }
        _ => return Err(incompatible()),
    };
    trace!(%from, %to, ?conversion, "convert");
    Ok(conversion)
}

#[cfg(test)]
mod tests;
