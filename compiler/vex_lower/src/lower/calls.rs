//! Calls and generic dispatch.

use tracing::trace;
use vex_diagnostic::{CompileError, CompileResult};
use vex_ir::{Node, Position, QualifiedName, Scalar, Type};
use vex_types::ConvertMode;

use super::{Lowerer, Operand};
use crate::backend::Backend;

fn written(module: &[String], name: &str) -> String {
    if module.is_empty() {
        name.to_owned()
    } else {
        format!("{}::{name}", module.join("::"))
    }
}

impl<B: Backend> Lowerer<'_, B> {
    /// `f(args)`: a concrete function first, then a generic of that name.
    pub(crate) fn lower_call(
        &mut self,
        module: &[String],
        name: &str,
        args: &[Node],
        pos: Position,
    ) -> CompileResult<Operand> {
        self.current_function(pos)?;
        let candidates = self.ctx.resolver.candidates(module, name);
        if let Some(function) = candidates
            .iter()
            .find(|c| self.ctx.functions.contains_key(c))
            .cloned()
        {
            return self.call_function(&function, None, args, pos);
        }
        if let Some(generic) = candidates
            .iter()
            .find(|c| self.ctx.generics.get(c).is_some())
            .cloned()
        {
            return self.call_generic(&generic, args, pos);
        }
        Err(CompileError::missing(
            pos,
            format!("undefined function `{}`", written(module, name)),
        ))
    }

    /// Pick a generic's implementation from its discriminant argument.
    fn call_generic(
        &mut self,
        generic: &QualifiedName,
        args: &[Node],
        pos: Position,
    ) -> CompileResult<Operand> {
        let index = self.ctx.generics.get(generic).map_or(0, |def| def.index);
        if index >= args.len() {
            return Err(CompileError::type_error(
                pos,
                format!(
                    "generic `{generic}` dispatches on argument {index}, found {} argument(s)",
                    args.len()
                ),
            ));
        }
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.lower_expr(arg)?);
        }
        let type_name = self.ctx.registry.display_name(&values[index].ty);
        let symbol = self
            .ctx
            .generics
            .dispatch(generic, &type_name)
            .map_err(|e| e.at(pos))?
            .to_owned();
        trace!(%generic, %type_name, %symbol, "generic dispatch");
        let target = self
            .ctx
            .function_by_symbol(&symbol)
            .cloned()
            .ok_or_else(|| CompileError::missing(pos, format!("undefined function `{symbol}`")))?;
        let positions: Vec<Position> = args.iter().map(|a| a.token.pos()).collect();
        self.emit_call(&target, values, &positions, pos)
    }

    /// Call a known function, lowering the arguments against its
    /// parameter types. `receiver` is prepended for method calls.
    pub(crate) fn call_function(
        &mut self,
        function: &QualifiedName,
        receiver: Option<Operand>,
        args: &[Node],
        pos: Position,
    ) -> CompileResult<Operand> {
        let params = self
            .ctx
            .functions
            .get(function)
            .map(|f| f.sig.params.clone())
            .unwrap_or_default();
        let skip = usize::from(receiver.is_some());
        let mut values: Vec<Operand> = receiver.into_iter().collect();
        let mut positions = vec![pos; skip];
        for (i, arg) in args.iter().enumerate() {
            let expected = params.get(i + skip);
            values.push(self.lower_expr_expecting(arg, expected)?);
            positions.push(arg.token.pos());
        }
        self.emit_call(function, values, &positions, pos)
    }

    /// Check arity, convert arguments and emit the call.
    fn emit_call(
        &mut self,
        function: &QualifiedName,
        values: Vec<Operand>,
        positions: &[Position],
        pos: Position,
    ) -> CompileResult<Operand> {
        let Some(entry) = self.ctx.functions.get(function).cloned() else {
            return Err(CompileError::missing(
                pos,
                format!("undefined function `{function}`"),
            ));
        };
        let sig = &entry.sig;
        let arity_ok = if sig.variadic {
            values.len() >= sig.params.len()
        } else {
            values.len() == sig.params.len()
        };
        if !arity_ok {
            return Err(CompileError::type_error(
                pos,
                format!(
                    "function `{function}` takes {}{} argument(s), found {}",
                    if sig.variadic { "at least " } else { "" },
                    sig.params.len(),
                    values.len()
                ),
            ));
        }

        let mut args = Vec::with_capacity(values.len());
        for (i, value) in values.into_iter().enumerate() {
            let at = positions.get(i).copied().unwrap_or(pos);
            let value = match sig.params.get(i) {
                Some(param) => self.coerce(value, param, ConvertMode::Implicit, at)?,
                None => self.variadic_promote(value, at)?,
            };
            args.push(value.id);
        }

        let id = match entry.id {
            Some(id) => id,
            None => {
                let id = self.backend.declare_function(&entry.symbol, sig);
                if let Some(f) = self.ctx.functions.get_mut(function) {
                    f.id = Some(id);
                }
                id
            }
        };
        let result = self.backend.call(id, &args);
        Ok(match result {
            Some(value) => Operand::value(value, sig.ret.clone()),
            None => Operand::void(),
        })
    }

    /// C default promotions for arguments passed through `...`.
    fn variadic_promote(&mut self, value: Operand, pos: Position) -> CompileResult<Operand> {
        match value.ty.as_scalar() {
            Some(Scalar::F32) => self.coerce(value, &Type::F64, ConvertMode::Implicit, pos),
            Some(Scalar::Bool | Scalar::I8 | Scalar::I16) => {
                self.coerce(value, &Type::I32, ConvertMode::Implicit, pos)
            }
            Some(_) => Ok(value),
            None if value.ty.is_pointer() => Ok(value),
            None => Err(CompileError::type_error(
                pos,
                format!("cannot pass a value of type `{}` through `...`", value.ty),
            )),
        }
    }
}
