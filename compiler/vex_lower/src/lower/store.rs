//! Declarations and assignments.
//!
//! Every store asks the storage engine what to do, then does it:
//!
//! | action          | emitted                                         |
//! |-----------------|-------------------------------------------------|
//! | `Rebind`        | nothing; the name points at the value           |
//! |                 | (`memcpy` when assigned from a nested block)    |
//! | `AllocateStore` | conversion, then `alloca` (new) + `store`       |
//! | `ByteCopy`      | `memcpy` of the decided size                    |
//! | `PointerStore`  | optional `bitcast`, then `store`                |
//! | `BitCastStore`  | `memcpy` of the left type's size                |

use tracing::trace;
use vex_diagnostic::{CompileError, CompileResult};
use vex_ir::{BinaryOp, Node, NodeKind, Position, Type, ValueId};
use vex_resolve::{Binding, BindingFlags};
use vex_types::{decide_storage, StorageAction, StorageRequest, StoreSite};

use super::place::{Place, PlaceKind};
use super::{Lowerer, Operand};
use crate::backend::{Backend, CastOp};

impl<B: Backend> Lowerer<'_, B> {
    fn decide(
        &mut self,
        existing: Option<&Type>,
        declared: Option<&Type>,
        value: &Operand,
        site: StoreSite,
        pos: Position,
    ) -> CompileResult<StorageAction> {
        decide_storage(
            &self.ctx.registry,
            &StorageRequest {
                existing,
                declared,
                value: &value.ty,
                site,
            },
        )
        .map_err(|e| e.at(pos))
    }

    fn warn_narrowing(&mut self, from: &Type, to: &Type, pos: Position) {
        self.warn(pos, format!("implicit narrowing from `{from}` to `{to}`"));
    }

    /// Scalar or pointer value ready to `store` into a `left` slot.
    fn stored_value(
        &mut self,
        value: Operand,
        action: StorageAction,
        left: &Type,
        pos: Position,
    ) -> Operand {
        match action {
            StorageAction::AllocateStore {
                conversion,
                narrowing_warning,
            } => {
                if narrowing_warning {
                    self.warn_narrowing(&value.ty, left, pos);
                }
                self.apply_conversion(value, conversion, left)
            }
            StorageAction::PointerStore { cast: true } => {
                let id = self.backend.convert(CastOp::BitCast, value.id, left);
                Operand::value(id, left.clone())
            }
            _ => value,
        }
    }

    /// Carry out `action` against existing storage at `addr`.
    fn store_action(
        &mut self,
        addr: ValueId,
        left: &Type,
        value: Operand,
        action: StorageAction,
        pos: Position,
    ) -> CompileResult<()> {
        match action {
            StorageAction::ByteCopy { bytes } => self.backend.memcpy(addr, value.id, bytes),
            StorageAction::Rebind | StorageAction::BitCastStore => {
                let bytes = self.ctx.registry.size_of(left).map_err(|e| e.at(pos))?;
                self.backend.memcpy(addr, value.id, bytes);
            }
            StorageAction::AllocateStore { .. } | StorageAction::PointerStore { .. } => {
                let value = self.stored_value(value, action, left, pos);
                self.backend.store(value.id, addr);
            }
        }
        Ok(())
    }

    /// Store into an existing location of type `left`.
    pub(crate) fn store_into(
        &mut self,
        addr: ValueId,
        left: &Type,
        value: Operand,
        site: StoreSite,
        pos: Position,
    ) -> CompileResult<()> {
        let value = self.fit_literal(value, left);
        let action = self.decide(Some(left), None, &value, site, pos)?;
        self.store_action(addr, left, value, action, pos)
    }

    /// Bind a new name in the innermost scope.
    pub(crate) fn bind_new(
        &mut self,
        name: &str,
        declared: Option<&Type>,
        value: Operand,
        site: StoreSite,
        pos: Position,
    ) -> CompileResult<()> {
        let value = match declared {
            Some(ty) => self.fit_literal(value, ty),
            None => value,
        };
        let action = self.decide(None, declared, &value, site, pos)?;
        let ty = declared.cloned().unwrap_or_else(|| value.ty.clone());
        if action == StorageAction::Rebind {
            // Incoming aggregates live in the caller.
            let shared =
                site == StoreSite::Param || self.ctx.symbols.shares_storage(name, value.id);
            self.ctx.symbols.insert(name, Binding::local(ty, value.id));
            if shared {
                self.ctx.symbols.mark_shared(value.id);
            }
            return Ok(());
        }
        let slot = self.backend.alloca(&ty, name);
        self.store_action(slot, &ty, value, action, pos)?;
        self.ctx.symbols.insert(name, Binding::local(ty, slot));
        Ok(())
    }

    /// Assign to a local binding, which may be rebound to new storage.
    ///
    /// A rebind only happens in the scope that declared the name: there it
    /// dominates every later use. From a nested block (a branch or a loop
    /// body) the value is copied into the binding's storage instead.
    fn assign_local(
        &mut self,
        name: &str,
        binding: Binding,
        value: Operand,
        pos: Position,
    ) -> CompileResult<()> {
        let value = self.fit_literal(value, &binding.ty);
        let action = self.decide(Some(&binding.ty), None, &value, StoreSite::Assign, pos)?;
        if action == StorageAction::Rebind {
            if self.ctx.symbols.is_local(name) {
                let shared = self.ctx.symbols.shares_storage(name, value.id);
                if let Some(slot) = self.ctx.symbols.find_mut(name) {
                    slot.addr = value.id;
                    slot.flags.remove(BindingFlags::REBOUND);
                }
                if shared {
                    self.ctx.symbols.mark_shared(value.id);
                }
                return Ok(());
            }
            if !binding.owns_storage() {
                let owner = if binding.flags.contains(BindingFlags::PARAMETER) {
                    "the caller"
                } else {
                    "the value it was bound to"
                };
                self.warn(
                    pos,
                    format!("assignment to `{name}` copies into storage shared with {owner}"),
                );
            }
            trace!(name, "conditional rebind lowered as a copy");
        }
        self.store_action(binding.addr, &binding.ty, value, action, pos)
    }

    // -----------------------------------------------------------------------
    // Assign nodes
    // -----------------------------------------------------------------------

    pub(crate) fn lower_assign(
        &mut self,
        target: &Node,
        declared: Option<&Type>,
        value: Option<&Node>,
        pos: Position,
    ) -> CompileResult<()> {
        self.current_function(pos)?;
        match declared {
            Some(ty) => self.lower_declaration(target, ty, value, pos),
            None => {
                let Some(value) = value else {
                    return Err(CompileError::syntax(pos, "expected a value to assign"));
                };
                self.lower_assignment(target, value, pos)
            }
        }
    }

    /// `name: T = value` / `name: T;`
    fn lower_declaration(
        &mut self,
        target: &Node,
        ty: &Type,
        value: Option<&Node>,
        pos: Position,
    ) -> CompileResult<()> {
        let NodeKind::Variable { name, .. } = &target.kind else {
            return Err(CompileError::syntax(pos, format!("cannot declare `{target}`")));
        };
        if self.ctx.symbols.is_local(name) {
            return Err(CompileError::logic(
                pos,
                format!("variable `{name}` is already declared in this scope"),
            ));
        }
        self.ctx.registry.register(ty).map_err(|e| e.at(pos))?;
        match value {
            Some(value) => {
                let op = self.lower_expr_expecting(value, Some(ty))?;
                self.bind_new(name, Some(ty), op, StoreSite::Init, value.token.pos())
            }
            None => {
                if ty.is_void() {
                    return Err(CompileError::type_error(
                        pos,
                        format!("variable `{name}` cannot have type `void`"),
                    ));
                }
                let slot = self.backend.alloca(ty, name);
                self.ctx
                    .symbols
                    .insert(name.as_str(), Binding::local(ty.clone(), slot));
                Ok(())
            }
        }
    }

    /// `target = value`; an unknown plain name declares a new local.
    fn lower_assignment(&mut self, target: &Node, value: &Node, pos: Position) -> CompileResult<()> {
        if let NodeKind::Variable {
            module,
            name,
            offsets,
        } = &target.kind
        {
            if module.is_empty() && offsets.is_empty() {
                if let Some(binding) = self.ctx.symbols.find(name).cloned() {
                    let op = self.lower_expr_expecting(value, Some(&binding.ty))?;
                    return self.assign_local(name, binding, op, pos);
                }
                if self.find_global(module, name).is_none() {
                    let op = self.lower_expr(value)?;
                    return self.bind_new(name, None, op, StoreSite::Assign, pos);
                }
            }
        }
        let place = self.target_place(target)?;
        // `t op= v` reads and writes through one address.
        if let NodeKind::BinOp { op, rhs, .. } = &value.kind {
            if BinaryOp::from_compound_assign(value.token.kind).is_some() {
                let current = self.read_place(place.clone());
                let rhs = self.lower_expr(rhs)?;
                let op = self.binop_operands(*op, current, rhs, value.token.pos())?;
                return self.store_place(place, op, pos);
            }
        }
        let op = self.lower_expr_expecting(value, Some(&place.ty))?;
        self.store_place(place, op, pos)
    }

    fn store_place(&mut self, place: Place, value: Operand, pos: Position) -> CompileResult<()> {
        debug_assert!(place.kind != PlaceKind::Temporary);
        self.store_into(place.addr, &place.ty, value, StoreSite::Assign, pos)
    }
}
