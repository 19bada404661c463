//! Operators, casts and `sizeof`.

use vex_diagnostic::{CompileError, CompileResult};
use vex_ir::{BinaryOp, Node, NodeKind, Position, Scalar, SizeofArg, Type, UnaryOp};
use vex_types::{common_scalar, ConvertMode};

use super::operand::{constant_fits, round_float, wrap_int};
use super::{Lowerer, Operand};
use crate::backend::{Backend, Constant, Opcode, Predicate};

fn unsupported(op: BinaryOp, ty: &Type, pos: Position) -> CompileError {
    CompileError::math(
        pos,
        format!("operator `{}` is not supported for `{ty}`", op.as_symbol()),
    )
}

fn opcode(op: BinaryOp, float: bool) -> Option<Opcode> {
    let code = match (op, float) {
        (BinaryOp::Add, false) => Opcode::Add,
        (BinaryOp::Sub, false) => Opcode::Sub,
        (BinaryOp::Mul, false) => Opcode::Mul,
        (BinaryOp::Div, false) => Opcode::SDiv,
        (BinaryOp::Mod, false) => Opcode::SRem,
        (BinaryOp::Add, true) => Opcode::FAdd,
        (BinaryOp::Sub, true) => Opcode::FSub,
        (BinaryOp::Mul, true) => Opcode::FMul,
        (BinaryOp::Div, true) => Opcode::FDiv,
        (BinaryOp::Mod, true) => Opcode::FRem,
        (BinaryOp::BitAnd, false) => Opcode::And,
        (BinaryOp::BitOr, false) => Opcode::Or,
        (BinaryOp::BitXor, false) => Opcode::Xor,
        (BinaryOp::Shl, false) => Opcode::Shl,
        (BinaryOp::Shr, false) => Opcode::AShr,
        _ => return None,
    };
    Some(code)
}

fn predicate(op: BinaryOp, float: bool) -> Option<Predicate> {
    let pred = match (op, float) {
        (BinaryOp::Eq, false) => Predicate::Eq,
        (BinaryOp::NotEq, false) => Predicate::Ne,
        (BinaryOp::Lt, false) => Predicate::Slt,
        (BinaryOp::LtEq, false) => Predicate::Sle,
        (BinaryOp::Gt, false) => Predicate::Sgt,
        (BinaryOp::GtEq, false) => Predicate::Sge,
        (BinaryOp::Eq, true) => Predicate::OEq,
        (BinaryOp::NotEq, true) => Predicate::ONe,
        (BinaryOp::Lt, true) => Predicate::OLt,
        (BinaryOp::LtEq, true) => Predicate::OLe,
        (BinaryOp::Gt, true) => Predicate::OGt,
        (BinaryOp::GtEq, true) => Predicate::OGe,
        _ => return None,
    };
    Some(pred)
}

#[expect(clippy::float_cmp, reason = "folding mirrors ordered float compares")]
fn fold_compare(op: BinaryOp, a: Constant, b: Constant) -> Option<bool> {
    let result = match (a, b) {
        (Constant::Int(a), Constant::Int(b)) => match op {
            BinaryOp::Eq => a == b,
            BinaryOp::NotEq => a != b,
            BinaryOp::Lt => a < b,
            BinaryOp::LtEq => a <= b,
            BinaryOp::Gt => a > b,
            BinaryOp::GtEq => a >= b,
            _ => return None,
        },
        (Constant::Float(a), Constant::Float(b)) => match op {
            BinaryOp::Eq => a == b,
            BinaryOp::NotEq => a != b,
            BinaryOp::Lt => a < b,
            BinaryOp::LtEq => a <= b,
            BinaryOp::Gt => a > b,
            BinaryOp::GtEq => a >= b,
            _ => return None,
        },
        _ => return None,
    };
    Some(result)
}

/// Fold an arithmetic or bitwise operation on two constants of type `s`.
/// Division by zero has been rejected already.
fn fold_arith(op: BinaryOp, a: Constant, b: Constant, s: Scalar) -> Option<Constant> {
    match (a, b) {
        (Constant::Int(a), Constant::Int(b)) => {
            let shift = || u32::try_from(b).ok().filter(|&n| n < s.bits());
            let v = match op {
                BinaryOp::Add => a.wrapping_add(b),
                BinaryOp::Sub => a.wrapping_sub(b),
                BinaryOp::Mul => a.wrapping_mul(b),
                BinaryOp::Div => a.wrapping_div(b),
                BinaryOp::Mod => a.wrapping_rem(b),
                BinaryOp::BitAnd => a & b,
                BinaryOp::BitOr => a | b,
                BinaryOp::BitXor => a ^ b,
                BinaryOp::Shl => a.wrapping_shl(shift()?),
                BinaryOp::Shr => a.wrapping_shr(shift()?),
                _ => return None,
            };
            Some(Constant::Int(wrap_int(v, s)))
        }
        (Constant::Float(a), Constant::Float(b)) => {
            let v = match op {
                BinaryOp::Add => a + b,
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                BinaryOp::Div => a / b,
                BinaryOp::Mod => a % b,
                _ => return None,
            };
            Some(Constant::Float(round_float(v, s)))
        }
        _ => None,
    }
}

/// Common scalar type of two operands. An untyped literal adopts the
/// other side's type when its value fits there.
fn unify(l: &Operand, r: &Operand, ls: Scalar, rs: Scalar) -> Scalar {
    let fits = |op: &Operand, s: Scalar| op.konst.is_some_and(|c| constant_fits(c, s));
    match (l.literal, r.literal) {
        (true, false) if fits(l, rs) => rs,
        (false, true) if fits(r, ls) => ls,
        _ => common_scalar(ls, rs),
    }
}

impl<B: Backend> Lowerer<'_, B> {
    pub(crate) fn lower_binop(
        &mut self,
        op: BinaryOp,
        lhs: &Node,
        rhs: &Node,
        pos: Position,
    ) -> CompileResult<Operand> {
        if op.is_logical() {
            return self.short_circuit(op, lhs, rhs, pos);
        }
        let l = self.lower_expr(lhs)?;
        let r = self.lower_expr(rhs)?;
        self.binop_operands(op, l, r, pos)
    }

    /// A non-logical binary operator over evaluated operands.
    pub(crate) fn binop_operands(
        &mut self,
        op: BinaryOp,
        l: Operand,
        r: Operand,
        pos: Position,
    ) -> CompileResult<Operand> {
        if let (Some(ls), Some(rs)) = (l.ty.as_scalar(), r.ty.as_scalar()) {
            let s = unify(&l, &r, ls, rs);
            return self.scalar_binop(op, l, r, s, pos);
        }
        let integral_rhs = r.ty.as_scalar().is_some_and(|s| s.is_integral());
        if l.ty.is_pointer() && integral_rhs && matches!(op, BinaryOp::Add | BinaryOp::Sub) {
            return self.pointer_offset(op, l, r, pos);
        }
        if l.ty.is_pointer() && l.ty == r.ty && matches!(op, BinaryOp::Eq | BinaryOp::NotEq) {
            let pred = if op == BinaryOp::Eq {
                Predicate::Eq
            } else {
                Predicate::Ne
            };
            let id = self.backend.compare(pred, &l.ty, l.id, r.id);
            return Ok(Operand::value(id, Type::BOOL));
        }
        Err(unsupported(op, &l.ty, pos))
    }

    fn scalar_binop(
        &mut self,
        op: BinaryOp,
        l: Operand,
        r: Operand,
        s: Scalar,
        pos: Position,
    ) -> CompileResult<Operand> {
        let ty = Type::Scalar(s);
        let literal = l.literal && r.literal;
        let l = self.coerce(l, &ty, ConvertMode::Implicit, pos)?;
        let r = self.coerce(r, &ty, ConvertMode::Implicit, pos)?;

        if op.is_comparison() {
            if let (Some(a), Some(b)) = (l.konst, r.konst) {
                if let Some(truth) = fold_compare(op, a, b) {
                    return Ok(self.boolean(truth));
                }
            }
            let pred = predicate(op, s.is_float()).ok_or_else(|| unsupported(op, &ty, pos))?;
            let id = self.backend.compare(pred, &ty, l.id, r.id);
            return Ok(Operand::value(id, Type::BOOL));
        }

        let code = opcode(op, s.is_float()).ok_or_else(|| unsupported(op, &ty, pos))?;
        if matches!(op, BinaryOp::Div | BinaryOp::Mod) && r.is_true() == Some(false) {
            let what = if op == BinaryOp::Div {
                "division"
            } else {
                "modulo"
            };
            return Err(CompileError::math(pos, format!("{what} by zero")));
        }
        if let (Some(a), Some(b)) = (l.konst, r.konst) {
            if let Some(c) = fold_arith(op, a, b, s) {
                return Ok(self.constant(c, s, literal));
            }
        }
        let id = self.backend.binary(code, &ty, l.id, r.id);
        Ok(Operand::value(id, ty))
    }

    /// `p + n`, `p - n`: element-wise pointer arithmetic.
    fn pointer_offset(
        &mut self,
        op: BinaryOp,
        ptr: Operand,
        offset: Operand,
        pos: Position,
    ) -> CompileResult<Operand> {
        let Some(pointee) = ptr.ty.pointee().cloned() else {
            return Err(unsupported(op, &ptr.ty, pos));
        };
        if pointee.is_void() {
            return Err(unsupported(op, &ptr.ty, pos));
        }
        let mut index = self.coerce(offset, &Type::I64, ConvertMode::Implicit, pos)?;
        if op == BinaryOp::Sub {
            let zero = self.backend.const_int(Scalar::I64, 0);
            index = Operand::value(
                self.backend.binary(Opcode::Sub, &Type::I64, zero, index.id),
                Type::I64,
            );
        }
        let id = self.backend.gep(&pointee, ptr.id, &[index.id], &pointee);
        Ok(Operand::value(id, ptr.ty))
    }

    /// `&&` and `||`: the right operand runs only when needed.
    fn short_circuit(
        &mut self,
        op: BinaryOp,
        lhs: &Node,
        rhs: &Node,
        pos: Position,
    ) -> CompileResult<Operand> {
        let l = self.lower_expr(lhs)?;
        let l = self.to_bool(l, lhs.token.pos())?;
        let is_and = op == BinaryOp::And;
        if let Some(truth) = l.is_true() {
            if truth != is_and {
                return Ok(self.boolean(truth));
            }
            let r = self.lower_expr(rhs)?;
            return self.to_bool(r, rhs.token.pos());
        }

        let (rhs_name, end_name) = if is_and {
            ("and.rhs", "and.end")
        } else {
            ("or.rhs", "or.end")
        };
        let rhs_block = self.append_block(pos, rhs_name)?;
        let end = self.append_block(pos, end_name)?;
        let lhs_end = self.block_here();
        if is_and {
            self.backend.cond_br(l.id, rhs_block, end);
        } else {
            self.backend.cond_br(l.id, end, rhs_block);
        }

        self.backend.position_at_end(rhs_block);
        let r = self.lower_expr(rhs)?;
        let r = self.to_bool(r, rhs.token.pos())?;
        let rhs_end = self.block_here();
        self.backend.br(end);

        self.backend.position_at_end(end);
        let short = self.backend.const_int(Scalar::Bool, i128::from(!is_and));
        let id = self
            .backend
            .phi(&Type::BOOL, &[(short, lhs_end), (r.id, rhs_end)]);
        Ok(Operand::value(id, Type::BOOL))
    }

    pub(crate) fn lower_unary(
        &mut self,
        op: UnaryOp,
        operand: &Node,
        pos: Position,
    ) -> CompileResult<Operand> {
        match op {
            UnaryOp::Neg => {
                let v = self.lower_expr(operand)?;
                let Some(s) = v.ty.as_scalar() else {
                    return Err(CompileError::math(
                        pos,
                        format!("cannot negate a value of type `{}`", v.ty),
                    ));
                };
                match v.konst {
                    Some(Constant::Int(c)) => {
                        let negated = if v.literal { -c } else { wrap_int(c.wrapping_neg(), s) };
                        Ok(self.constant(Constant::Int(negated), s, v.literal))
                    }
                    Some(Constant::Float(c)) => Ok(self.constant(Constant::Float(-c), s, v.literal)),
                    _ => {
                        let (code, zero) = if s.is_float() {
                            (Opcode::FSub, self.backend.const_float(s, 0.0))
                        } else {
                            (Opcode::Sub, self.backend.const_int(s, 0))
                        };
                        let id = self.backend.binary(code, &v.ty, zero, v.id);
                        Ok(Operand::value(id, v.ty))
                    }
                }
            }
            UnaryOp::Not => {
                let v = self.lower_expr(operand)?;
                let v = self.to_bool(v, pos)?;
                if let Some(truth) = v.is_true() {
                    return Ok(self.boolean(!truth));
                }
                let one = self.backend.const_int(Scalar::Bool, 1);
                let id = self.backend.binary(Opcode::Xor, &Type::BOOL, v.id, one);
                Ok(Operand::value(id, Type::BOOL))
            }
            UnaryOp::BitNot => {
                let v = self.lower_expr(operand)?;
                let s = v
                    .ty
                    .as_scalar()
                    .filter(|s| s.is_integral())
                    .ok_or_else(|| {
                        CompileError::math(
                            pos,
                            format!("operator `~` is not supported for `{}`", v.ty),
                        )
                    })?;
                if let Some(Constant::Int(c)) = v.konst {
                    return Ok(self.constant(Constant::Int(wrap_int(!c, s)), s, false));
                }
                let ones = self.backend.const_int(s, wrap_int(-1, s));
                let id = self.backend.binary(Opcode::Xor, &v.ty, v.id, ones);
                Ok(Operand::value(id, v.ty))
            }
            UnaryOp::AddrOf => {
                let NodeKind::Variable {
                    module,
                    name,
                    offsets,
                } = &operand.kind
                else {
                    return Err(CompileError::type_error(
                        pos,
                        format!("cannot take the address of `{operand}`"),
                    ));
                };
                let place = self.place(module, name, offsets, pos)?;
                Ok(Operand::value(place.addr, place.ty.pointer_to()))
            }
            UnaryOp::Deref => {
                let place = self.deref_place(operand, pos)?;
                Ok(self.read_place(place))
            }
        }
    }

    pub(crate) fn lower_cast(
        &mut self,
        expr: &Node,
        target: &Type,
        pos: Position,
    ) -> CompileResult<Operand> {
        self.ctx.registry.register(target).map_err(|e| e.at(pos))?;
        let v = self.lower_expr(expr)?;
        self.coerce(v, target, ConvertMode::Explicit, pos)
    }

    /// `sizeof(T)` or `sizeof(expr)`, an untyped `i64` constant. The
    /// expression form is lowered for its effects.
    pub(crate) fn lower_sizeof(&mut self, arg: &SizeofArg, pos: Position) -> CompileResult<Operand> {
        let ty = match arg {
            SizeofArg::Type(ty) => {
                self.ctx.registry.register(ty).map_err(|e| e.at(pos))?;
                ty.clone()
            }
            SizeofArg::Expr(expr) => self.lower_expr(expr)?.ty,
        };
        let size = self.ctx.registry.size_of(&ty).map_err(|e| e.at(pos))?;
        Ok(self.constant(Constant::Int(i128::from(size)), Scalar::I64, true))
    }
}
