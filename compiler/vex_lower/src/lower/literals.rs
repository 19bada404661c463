//! String, struct and array literals.

use vex_diagnostic::{CompileError, CompileResult};
use vex_ir::{Node, Position, Scalar, Type};
use vex_types::{common_scalar, StoreSite};

use super::{Lowerer, Operand};
use crate::backend::Backend;

impl<B: Backend> Lowerer<'_, B> {
    pub(crate) fn string(&mut self, text: &str) -> Operand {
        let id = self.backend.const_string(text);
        Operand::value(id, Type::c_string())
    }

    /// `Name(args)`: a fresh struct, members stored in order.
    pub(crate) fn lower_object(
        &mut self,
        module: &[String],
        name: &str,
        args: &[Node],
        pos: Position,
    ) -> CompileResult<Operand> {
        self.current_function(pos)?;
        let def = self
            .ctx
            .resolver
            .candidates(module, name)
            .iter()
            .find_map(|c| self.ctx.registry.struct_def(c))
            .cloned()
            .ok_or_else(|| CompileError::missing(pos, format!("undefined struct `{name}`")))?;
        if def.members.len() != args.len() {
            return Err(CompileError::type_error(
                pos,
                format!(
                    "struct `{}` has {} member(s), found {} argument(s)",
                    def.name,
                    def.members.len(),
                    args.len()
                ),
            ));
        }
        let ty = Type::Struct(def.name.clone());
        let slot = self.backend.alloca(&ty, &def.name.name);
        for (index, ((_, member_ty), arg)) in def.members.iter().zip(args).enumerate() {
            let value = self.lower_expr_expecting(arg, Some(member_ty))?;
            #[expect(clippy::cast_possible_truncation, reason = "member counts fit in u32")]
            let addr = self
                .backend
                .struct_gep(&ty, slot, index as u32, member_ty);
            self.store_into(addr, member_ty, value, StoreSite::Element, arg.token.pos())?;
        }
        Ok(Operand::value(slot, ty))
    }

    /// `[a, b, ...]`. The element type comes from the destination when it
    /// is an array; otherwise from the elements themselves.
    pub(crate) fn lower_array(
        &mut self,
        elems: &[Node],
        expected: Option<&Type>,
        pos: Position,
    ) -> CompileResult<Operand> {
        self.current_function(pos)?;
        let mut values = Vec::with_capacity(elems.len());
        for elem in elems {
            let expected_elem = expected.and_then(Type::element);
            values.push(self.lower_expr_expecting(elem, expected_elem.as_ref())?);
        }

        let (elem_ty, len) = match expected {
            Some(Type::Array(elem, len)) => ((**elem).clone(), *len),
            _ => (infer_element(&values, pos)?, values.len() as u64),
        };
        if values.len() as u64 > len {
            return Err(CompileError::type_error(
                pos,
                format!("too many elements for `{elem_ty}[{len}]`: found {}", values.len()),
            ));
        }
        self.ctx
            .registry
            .register(&elem_ty)
            .map_err(|e| e.at(pos))?;

        let ty = Type::Array(Box::new(elem_ty.clone()), len);
        let slot = self.backend.alloca(&ty, "array");
        let zero = self.backend.const_int(Scalar::I64, 0);
        for (i, (value, elem)) in values.into_iter().zip(elems).enumerate() {
            let index = self.backend.const_int(Scalar::I64, i as i128);
            let addr = self.backend.gep(&ty, slot, &[zero, index], &elem_ty);
            self.store_into(addr, &elem_ty, value, StoreSite::Element, elem.token.pos())?;
        }
        Ok(Operand::value(slot, ty))
    }
}

/// Element type of an array literal: the first element's type, widened
/// over the other literal elements.
fn infer_element(values: &[Operand], pos: Position) -> CompileResult<Type> {
    let Some(first) = values.first() else {
        return Err(CompileError::type_error(
            pos,
            "cannot infer the element type of an empty array",
        ));
    };
    if !first.literal {
        return Ok(first.ty.clone());
    }
    let mut scalar: Option<Scalar> = None;
    for value in values {
        match value.ty.as_scalar() {
            Some(s) if value.literal => {
                scalar = Some(scalar.map_or(s, |acc| common_scalar(acc, s)));
            }
            _ => return Ok(value.ty.clone()),
        }
    }
    Ok(scalar.map_or_else(|| first.ty.clone(), Type::Scalar))
}
