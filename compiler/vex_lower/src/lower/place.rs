//! Variables, access chains and addresses.

use vex_diagnostic::{CompileError, CompileResult};
use vex_ir::{
    Node, NodeKind, OffsetKind, OffsetOp, Position, QualifiedName, Scalar, Type, UnaryOp, ValueId,
};
use vex_resolve::Binding;
use vex_types::ConvertMode;

use super::{Lowerer, Operand};
use crate::backend::{Backend, Constant};

/// What a place refers to.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum PlaceKind {
    /// A local binding, by name.
    Local(String),
    Global(QualifiedName),
    /// An element, member or pointee.
    Element,
    /// A spilled call result; not assignable.
    Temporary,
}

/// An addressable location: `addr` points at a `ty`.
#[derive(Clone, Debug)]
pub(crate) struct Place {
    pub addr: ValueId,
    pub ty: Type,
    pub kind: PlaceKind,
}

impl<B: Backend> Lowerer<'_, B> {
    /// Find a global through the module resolver and make sure the current
    /// module has its address.
    pub(crate) fn find_global(&mut self, module: &[String], name: &str) -> Option<Place> {
        let qualified = self
            .ctx
            .resolver
            .candidates(module, name)
            .into_iter()
            .find(|c| self.ctx.globals.contains_key(c))?;
        let entry = self.ctx.globals.get_mut(&qualified)?;
        let addr = match entry.addr {
            Some(addr) => addr,
            None => {
                let addr = self.backend.global(&entry.symbol, &entry.ty, None, true);
                entry.addr = Some(addr);
                addr
            }
        };
        Some(Place {
            addr,
            ty: entry.ty.clone(),
            kind: PlaceKind::Global(qualified),
        })
    }

    /// The storage a (possibly qualified) name refers to.
    pub(crate) fn base_place(
        &mut self,
        module: &[String],
        name: &str,
        pos: Position,
    ) -> CompileResult<Place> {
        if module.is_empty() {
            if let Some(Binding { ty, addr, .. }) = self.ctx.symbols.find(name) {
                return Ok(Place {
                    addr: *addr,
                    ty: ty.clone(),
                    kind: PlaceKind::Local(name.to_owned()),
                });
            }
        }
        self.find_global(module, name).ok_or_else(|| {
            let written = if module.is_empty() {
                name.to_owned()
            } else {
                format!("{}::{name}", module.join("::"))
            };
            CompileError::missing(pos, format!("undefined variable `{written}`"))
        })
    }

    /// Apply an access chain left to right.
    pub(crate) fn place(
        &mut self,
        module: &[String],
        name: &str,
        offsets: &[OffsetOp],
        pos: Position,
    ) -> CompileResult<Place> {
        let mut place = self.base_place(module, name, pos)?;
        for offset in offsets {
            place = self.apply_offset(place, offset)?;
        }
        Ok(place)
    }

    fn apply_offset(&mut self, place: Place, offset: &OffsetOp) -> CompileResult<Place> {
        let pos = offset.token.pos();
        match &offset.kind {
            OffsetKind::Index(index) => self.index(place, index, pos),
            OffsetKind::Member(member) => self.member(place, member, pos),
            OffsetKind::MethodCall { name, args } => {
                let result = self.method_call(place, name, args, pos)?;
                self.spill(result, pos)
            }
        }
    }

    /// Load the pointer stored at `place` when it points at a struct, so
    /// `p.x` works on `P*` as on `P`.
    fn through_pointer(&mut self, place: Place) -> Place {
        match &place.ty {
            Type::Pointer(inner) if matches!(**inner, Type::Struct(_)) => {
                let inner = (**inner).clone();
                let addr = self.backend.load(&place.ty, place.addr);
                Place {
                    addr,
                    ty: inner,
                    kind: PlaceKind::Element,
                }
            }
            _ => place,
        }
    }

    fn index(&mut self, place: Place, index: &Node, pos: Position) -> CompileResult<Place> {
        let idx = self.lower_expr(index)?;
        if !idx.ty.as_scalar().is_some_and(|s| s.is_integral() && s != Scalar::Bool) {
            return Err(CompileError::type_error(
                index.token.pos(),
                format!("array index must be an integer, found `{}`", idx.ty),
            ));
        }
        let idx = self.coerce(idx, &Type::I64, ConvertMode::Implicit, pos)?;
        match place.ty.clone() {
            ty @ (Type::Array(..) | Type::Vector(..)) => {
                let len = match &ty {
                    Type::Array(_, len) => *len,
                    Type::Vector(_, len) => u64::from(*len),
                    _ => 0,
                };
                if let Some(Constant::Int(i)) = idx.konst {
                    if i < 0 || i >= i128::from(len) {
                        return Err(CompileError::type_error(
                            index.token.pos(),
                            format!("index {i} is out of bounds for `{ty}`"),
                        ));
                    }
                }
                let elem = ty.element().unwrap_or(Type::Void);
                let zero = self.backend.const_int(Scalar::I64, 0);
                let addr = self.backend.gep(&ty, place.addr, &[zero, idx.id], &elem);
                Ok(Place {
                    addr,
                    ty: elem,
                    kind: PlaceKind::Element,
                })
            }
            Type::Pointer(inner) if !inner.is_void() => {
                let base = self.backend.load(&place.ty, place.addr);
                let addr = self.backend.gep(&inner, base, &[idx.id], &inner);
                Ok(Place {
                    addr,
                    ty: *inner,
                    kind: PlaceKind::Element,
                })
            }
            other => Err(CompileError::type_error(
                pos,
                format!("cannot index a value of type `{other}`"),
            )),
        }
    }

    fn member(&mut self, place: Place, member: &str, pos: Position) -> CompileResult<Place> {
        let place = self.through_pointer(place);
        let Type::Struct(name) = &place.ty else {
            return Err(CompileError::type_error(
                pos,
                format!("`{}` has no members", place.ty),
            ));
        };
        let (ordinal, ty) = self
            .ctx
            .registry
            .member_ordinal(name, member)
            .map_err(|e| e.at(pos))?;
        #[expect(clippy::cast_possible_truncation, reason = "member counts fit in u32")]
        let index = ordinal as u32;
        let addr = self.backend.struct_gep(&place.ty, place.addr, index, &ty);
        Ok(Place {
            addr,
            ty,
            kind: PlaceKind::Element,
        })
    }

    /// Give a call result an address so the chain can continue.
    fn spill(&mut self, value: Operand, pos: Position) -> CompileResult<Place> {
        if value.ty.is_void() {
            return Err(CompileError::type_error(
                pos,
                "cannot use the result of a `void` method",
            ));
        }
        if value.ty.is_aggregate() {
            return Ok(Place {
                addr: value.id,
                ty: value.ty,
                kind: PlaceKind::Temporary,
            });
        }
        let slot = self.backend.alloca(&value.ty, "tmp");
        self.backend.store(value.id, slot);
        Ok(Place {
            addr: slot,
            ty: value.ty,
            kind: PlaceKind::Temporary,
        })
    }

    /// `obj.f(args)`: `f` from the struct's module, called with the
    /// object's address first.
    pub(crate) fn method_call(
        &mut self,
        place: Place,
        method: &str,
        args: &[Node],
        pos: Position,
    ) -> CompileResult<Operand> {
        let place = self.through_pointer(place);
        let Type::Struct(struct_name) = &place.ty else {
            return Err(CompileError::type_error(
                pos,
                format!("methods can only be called on structs, found `{}`", place.ty),
            ));
        };
        let function = QualifiedName::new(struct_name.module.clone(), method);
        if !self.ctx.functions.contains_key(&function) {
            return Err(CompileError::missing(
                pos,
                format!("struct `{struct_name}` has no method `{method}`"),
            ));
        }
        let receiver = Operand::value(place.addr, place.ty.clone().pointer_to());
        self.call_function(&function, Some(receiver), args, pos)
    }

    /// Read a variable: aggregates by address, everything else by value.
    pub(crate) fn read_variable(
        &mut self,
        module: &[String],
        name: &str,
        offsets: &[OffsetOp],
        pos: Position,
    ) -> CompileResult<Operand> {
        self.current_function(pos)?;
        // A trailing method call is the value itself; no spill.
        if let Some((last, init)) = offsets.split_last() {
            if let OffsetKind::MethodCall { name: method, args } = &last.kind {
                let place = self.place(module, name, init, pos)?;
                return self.method_call(place, method, args, last.token.pos());
            }
        }
        let place = self.place(module, name, offsets, pos)?;
        Ok(self.read_place(place))
    }

    pub(crate) fn read_place(&mut self, place: Place) -> Operand {
        if place.ty.is_aggregate() {
            return Operand::value(place.addr, place.ty);
        }
        let id = self.backend.load(&place.ty, place.addr);
        Operand::value(id, place.ty)
    }

    /// The place an assignment target denotes.
    pub(crate) fn target_place(&mut self, target: &Node) -> CompileResult<Place> {
        let pos = target.token.pos();
        match &target.kind {
            NodeKind::Variable {
                module,
                name,
                offsets,
            } => {
                let place = self.place(module, name, offsets, pos)?;
                if place.kind == PlaceKind::Temporary {
                    return Err(CompileError::logic(
                        pos,
                        "cannot assign to the result of a call",
                    ));
                }
                Ok(place)
            }
            NodeKind::UnaryOp {
                op: UnaryOp::Deref,
                operand,
            } => self.deref_place(operand, pos),
            _ => Err(CompileError::logic(
                pos,
                format!("cannot assign to `{target}`"),
            )),
        }
    }

    /// `*expr` as a location.
    pub(crate) fn deref_place(&mut self, operand: &Node, pos: Position) -> CompileResult<Place> {
        let ptr = self.lower_expr(operand)?;
        match &ptr.ty {
            Type::Pointer(inner) if !inner.is_void() => Ok(Place {
                addr: ptr.id,
                ty: (**inner).clone(),
                kind: PlaceKind::Element,
            }),
            other => Err(CompileError::type_error(
                pos,
                format!("cannot dereference a value of type `{other}`"),
            )),
        }
    }
}
