//! Operands, constant folding and conversions.

use vex_diagnostic::{CompileError, CompileResult};
use vex_ir::{Node, NumValue, Position, Scalar, Type, ValueId};
use vex_types::{convert, default_literal_scalar, literal_fits, ConvertMode, Conversion};

use super::Lowerer;
use crate::backend::{Backend, CastOp, Constant, Predicate};

/// A lowered value.
///
/// Scalars and pointers are SSA values. Aggregates (arrays, vectors,
/// structs) are represented by the address of their storage.
#[derive(Clone, Debug)]
pub(crate) struct Operand {
    pub id: ValueId,
    pub ty: Type,
    /// Compile-time value, when known.
    pub konst: Option<Constant>,
    /// An untyped numeric literal: it can be rematerialized at any scalar
    /// type that represents its value exactly.
    pub literal: bool,
}

impl Operand {
    pub fn value(id: ValueId, ty: Type) -> Self {
        Operand {
            id,
            ty,
            konst: None,
            literal: false,
        }
    }

    pub fn void() -> Self {
        Operand::value(ValueId::NONE, Type::Void)
    }

    pub fn is_true(&self) -> Option<bool> {
        match self.konst? {
            Constant::Int(v) => Some(v != 0),
            Constant::Float(v) => Some(v != 0.0),
            Constant::Null => Some(false),
        }
    }
}

/// Wrap `v` to the width of the integer type `s`, sign-extended.
pub(crate) fn wrap_int(v: i128, s: Scalar) -> i128 {
    match s.bits() {
        1 => v & 1,
        128 => v,
        bits => {
            let shift = 128 - bits;
            (v << shift) >> shift
        }
    }
}

/// Round a float constant to the precision of `s`.
#[expect(clippy::cast_possible_truncation, reason = "f32 rounding is the point")]
pub(crate) fn round_float(v: f64, s: Scalar) -> f64 {
    if s == Scalar::F32 {
        f64::from(v as f32)
    } else {
        v
    }
}

/// Whether constant `c` is exactly representable at `s`.
pub(crate) fn constant_fits(c: Constant, s: Scalar) -> bool {
    match c {
        Constant::Int(v) if s.is_integral() => v == wrap_int(v, s),
        Constant::Int(v) => literal_fits(NumValue::Int(v.unsigned_abs()), s),
        Constant::Float(v) => literal_fits(NumValue::Float(v.abs()), s),
        Constant::Null => false,
    }
}

/// Convert a constant between scalar types, with the same semantics as
/// the instruction it replaces.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    reason = "constant conversions mirror the runtime instructions"
)]
pub(crate) fn convert_constant(c: Constant, to: Scalar) -> Constant {
    match (c, to.is_float()) {
        (Constant::Int(v), false) => Constant::Int(wrap_int(v, to)),
        (Constant::Int(v), true) => Constant::Float(round_float(v as f64, to)),
        (Constant::Float(v), false) => Constant::Int(wrap_int(v.trunc() as i128, to)),
        (Constant::Float(v), true) => Constant::Float(round_float(v, to)),
        (Constant::Null, _) => Constant::Int(0),
    }
}

impl<B: Backend> Lowerer<'_, B> {
    /// Emit constant `c` at scalar type `s`.
    pub(crate) fn constant(&mut self, c: Constant, s: Scalar, literal: bool) -> Operand {
        let c = convert_constant(c, s);
        let id = match c {
            Constant::Int(v) => self.backend.const_int(s, v),
            Constant::Float(v) => self.backend.const_float(s, v),
            Constant::Null => self.backend.const_int(s, 0),
        };
        Operand {
            id,
            ty: Type::Scalar(s),
            konst: Some(c),
            literal,
        }
    }

    pub(crate) fn number(&mut self, value: NumValue) -> Operand {
        let s = default_literal_scalar(value);
        let c = match value {
            NumValue::Int(v) => Constant::Int(i128::try_from(v).unwrap_or(i128::MAX)),
            NumValue::Float(v) => Constant::Float(v),
        };
        self.constant(c, s, true)
    }

    pub(crate) fn boolean(&mut self, value: bool) -> Operand {
        self.constant(Constant::Int(i128::from(value)), Scalar::Bool, false)
    }

    /// Rematerialize a literal at `to` if it fits; otherwise hand
    /// the operand back unchanged.
    pub(crate) fn fit_literal(&mut self, op: Operand, to: &Type) -> Operand {
        let (Some(c), Some(s)) = (op.konst, to.as_scalar()) else {
            return op;
        };
        if !op.literal || op.ty == *to || !constant_fits(c, s) {
            return op;
        }
        let c = convert_constant(c, s);
        self.constant(c, s, true)
    }

    /// Convert `op` to `to` under `mode`.
    pub(crate) fn coerce(
        &mut self,
        op: Operand,
        to: &Type,
        mode: ConvertMode,
        pos: Position,
    ) -> CompileResult<Operand> {
        let op = self.fit_literal(op, to);
        if op.ty == *to {
            return Ok(op);
        }
        let conversion = convert(&op.ty, to, mode).map_err(|e| e.at(pos))?;
        Ok(self.apply_conversion(op, conversion, to))
    }

    /// Carry out a decided conversion.
    pub(crate) fn apply_conversion(
        &mut self,
        op: Operand,
        conversion: Conversion,
        to: &Type,
    ) -> Operand {
        let cast = match conversion {
            Conversion::Identity => return op,
            Conversion::Promote | Conversion::Demote => {
                let (Some(from), Some(target)) = (op.ty.as_scalar(), to.as_scalar()) else {
                    return op;
                };
                if let Some(c) = op.konst {
                    return self.constant(convert_constant(c, target), target, false);
                }
                match CastOp::between(from, target) {
                    Some(cast) => cast,
                    None => return Operand::value(op.id, to.clone()),
                }
            }
            Conversion::PointerCast => CastOp::BitCast,
            Conversion::PointerToInt => CastOp::PtrToInt,
            Conversion::IntToPointer => CastOp::IntToPtr,
        };
        let id = self.backend.convert(cast, op.id, to);
        Operand::value(id, to.clone())
    }

    /// Reduce a scalar or pointer to `bool` (non-zero is true).
    pub(crate) fn to_bool(&mut self, op: Operand, pos: Position) -> CompileResult<Operand> {
        if op.ty == Type::BOOL {
            return Ok(op);
        }
        if let Some(truth) = op.is_true() {
            return Ok(self.boolean(truth));
        }
        let (pred, zero) = match &op.ty {
            Type::Scalar(s) if s.is_float() => (Predicate::ONe, self.backend.const_float(*s, 0.0)),
            Type::Scalar(s) => (Predicate::Ne, self.backend.const_int(*s, 0)),
            Type::Pointer(_) => (Predicate::Ne, self.backend.const_null(&op.ty)),
            other => {
                return Err(CompileError::type_error(
                    pos,
                    format!("expected a condition, found a value of type `{other}`"),
                ));
            }
        };
        let id = self.backend.compare(pred, &op.ty, op.id, zero);
        Ok(Operand::value(id, Type::BOOL))
    }

    /// Lower a branch condition, warning when it is a constant.
    pub(crate) fn condition(&mut self, node: &Node) -> CompileResult<Operand> {
        let pos = node.token.pos();
        let op = self.lower_expr(node)?;
        let op = self.to_bool(op, pos)?;
        match op.is_true() {
            Some(true) => self.warn(pos, "condition is always true"),
            Some(false) => self.warn(pos, "condition is always false"),
            None => {}
        }
        Ok(op)
    }
}
