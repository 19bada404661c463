//! The scalar promotion lattice.
//!
//! `bool < i8 < i16 < i32 < i64 < i128 < f32 < f64`. Moving up is a free
//! implicit promotion; moving down is a demotion that needs an explicit
//! cast (or the single warned store case, see `storage`).

use vex_ir::{NumValue, Scalar};

/// Whether `from` widens into `to` without a cast.
#[inline]
pub fn promotes_to(from: Scalar, to: Scalar) -> bool {
    from.rank() <= to.rank()
}

/// Result type of a binary operation on `a` and `b`.
#[inline]
pub fn common_scalar(a: Scalar, b: Scalar) -> Scalar {
    if a.rank() >= b.rank() {
        a
    } else {
        b
    }
}

/// Whether an untyped literal can be materialized at `target`. Integers
/// must be exact; a float may round to the nearest `f32` but not overflow.
#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "round-trip and overflow checks detect the lossy cases"
)]
pub fn literal_fits(value: NumValue, target: Scalar) -> bool {
    match (value, target) {
        (NumValue::Int(v), Scalar::Bool) => v <= 1,
        (NumValue::Int(v), Scalar::I8) => v <= i8::MAX as u128,
        (NumValue::Int(v), Scalar::I16) => v <= i16::MAX as u128,
        (NumValue::Int(v), Scalar::I32) => v <= i32::MAX as u128,
        (NumValue::Int(v), Scalar::I64) => v <= i64::MAX as u128,
        (NumValue::Int(v), Scalar::I128) => v <= i128::MAX as u128,
        (NumValue::Int(v), Scalar::F32) => (v as f32) as u128 == v,
        (NumValue::Int(v), Scalar::F64) => (v as f64) as u128 == v,
        (NumValue::Float(v), Scalar::F32) => (v as f32).is_finite(),
        (NumValue::Float(_), Scalar::F64) => true,
        (NumValue::Float(_), _) => false,
    }
}

/// Smallest scalar an untyped literal defaults to: `i32` for integers
/// (`i64`/`i128` when too large), `f64` for floats.
pub fn default_literal_scalar(value: NumValue) -> Scalar {
    match value {
        NumValue::Float(_) => Scalar::F64,
        NumValue::Int(_) => [Scalar::I32, Scalar::I64, Scalar::I128]
            .into_iter()
            .find(|s| literal_fits(value, *s))
            .unwrap_or(Scalar::I128),
    }
}

#[cfg(test)]
mod tests;
