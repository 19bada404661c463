//! The recording backend.
//!
//! `IrModule` implements [`Backend`] by appending instructions to plain
//! vectors. It is what tests inspect and what module artifacts carry; its
//! `Display` prints an LLVM-flavoured listing.
//!
//! Value, block and function ids are indices into the module's tables and
//! are unique across the whole module. Allocas are hoisted into the entry
//! block of their function.

mod display;

use rustc_hash::FxHashMap;
use tracing::trace;
use vex_ir::{BlockId, FnSig, FunctionId, Scalar, Type, ValueId};

use crate::backend::{Backend, CastOp, Constant, Opcode, Predicate};

/// What a value is.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueKind {
    Const(Constant),
    Param { func: FunctionId, index: u32 },
    Global(String),
    /// Index into the module's string table.
    Str(u32),
    /// Result of an instruction.
    Inst,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueDef {
    pub ty: Type,
    pub kind: ValueKind,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Op {
    Alloca(Type),
    Load { ty: Type, ptr: ValueId },
    Store { value: ValueId, ptr: ValueId },
    Gep { base: Type, ptr: ValueId, indices: Vec<ValueId> },
    StructGep { base: Type, ptr: ValueId, index: u32 },
    Memcpy { dst: ValueId, src: ValueId, bytes: u64 },
    Binary { op: Opcode, lhs: ValueId, rhs: ValueId },
    Compare { pred: Predicate, lhs: ValueId, rhs: ValueId },
    Convert { op: CastOp, value: ValueId, to: Type },
    Call { callee: FunctionId, args: Vec<ValueId> },
    Phi { incoming: Vec<(ValueId, BlockId)> },
    Br(BlockId),
    CondBr { cond: ValueId, then_block: BlockId, else_block: BlockId },
    Ret(Option<ValueId>),
    Unreachable,
}

impl Op {
    #[inline]
    pub fn is_terminator(&self) -> bool {
        matches!(self, Op::Br(_) | Op::CondBr { .. } | Op::Ret(_) | Op::Unreachable)
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Inst {
    pub result: Option<ValueId>,
    pub op: Op,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct IrBlock {
    pub name: String,
    pub func: FunctionId,
    pub insts: Vec<Inst>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct IrFunction {
    pub symbol: String,
    pub sig: FnSig,
    pub params: Vec<ValueId>,
    /// Empty for declarations.
    pub blocks: Vec<BlockId>,
}

impl IrFunction {
    #[inline]
    pub fn is_definition(&self) -> bool {
        !self.blocks.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct IrGlobal {
    pub symbol: String,
    pub ty: Type,
    pub init: Option<Constant>,
    pub external: bool,
    pub addr: ValueId,
}

/// An in-memory SSA module.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct IrModule {
    name: String,
    values: Vec<ValueDef>,
    blocks: Vec<IrBlock>,
    functions: Vec<IrFunction>,
    globals: Vec<IrGlobal>,
    strings: Vec<String>,
    #[cfg_attr(feature = "cache", serde(skip))]
    function_ids: FxHashMap<String, FunctionId>,
    #[cfg_attr(feature = "cache", serde(skip))]
    current: Option<BlockId>,
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "tables are indexed by u32 ids"
)]
fn raw(len: usize) -> u32 {
    len as u32
}

impl IrModule {
    pub fn new(name: impl Into<String>) -> Self {
        IrModule {
            name: name.into(),
            ..IrModule::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self, id: ValueId) -> Option<&ValueDef> {
        self.values.get(id.index())
    }

    pub fn block(&self, id: BlockId) -> Option<&IrBlock> {
        self.blocks.get(id.index())
    }

    pub fn functions(&self) -> &[IrFunction] {
        &self.functions
    }

    pub fn function(&self, symbol: &str) -> Option<&IrFunction> {
        self.functions.iter().find(|f| f.symbol == symbol)
    }

    pub fn globals(&self) -> &[IrGlobal] {
        &self.globals
    }

    pub fn strings(&self) -> &[String] {
        &self.strings
    }

    /// All instructions of a function, in block order.
    pub fn instructions<'a>(&'a self, func: &'a IrFunction) -> impl Iterator<Item = &'a Inst> + 'a {
        func.blocks
            .iter()
            .filter_map(|b| self.blocks.get(b.index()))
            .flat_map(|b| b.insts.iter())
    }

    fn new_value(&mut self, ty: Type, kind: ValueKind) -> ValueId {
        let id = ValueId::from_raw(raw(self.values.len()));
        self.values.push(ValueDef { ty, kind });
        id
    }

    /// Type of a value, `void` for unknown ids.
    pub fn value_type(&self, id: ValueId) -> Type {
        self.values
            .get(id.index())
            .map_or(Type::Void, |v| v.ty.clone())
    }

    /// Append an instruction at the current position.
    fn push(&mut self, ty: Option<Type>, op: Op) -> ValueId {
        let result = ty.map(|ty| self.new_value(ty, ValueKind::Inst));
        match self.current.and_then(|b| self.blocks.get_mut(b.index())) {
            Some(block) => block.insts.push(Inst { result, op }),
            None => trace!(?op, "instruction outside any block dropped"),
        }
        result.unwrap_or(ValueId::NONE)
    }

    fn entry_block(&self) -> Option<BlockId> {
        let block = self.blocks.get(self.current?.index())?;
        self.functions.get(block.func.index())?.blocks.first().copied()
    }
}

impl Backend for IrModule {
    fn declare_function(&mut self, symbol: &str, sig: &FnSig) -> FunctionId {
        if let Some(&id) = self.function_ids.get(symbol) {
            return id;
        }
        let id = FunctionId::from_raw(raw(self.functions.len()));
        let params = sig
            .params
            .iter()
            .enumerate()
            .map(|(i, ty)| {
                self.new_value(
                    ty.clone(),
                    ValueKind::Param {
                        func: id,
                        index: raw(i),
                    },
                )
            })
            .collect();
        self.functions.push(IrFunction {
            symbol: symbol.to_owned(),
            sig: sig.clone(),
            params,
            blocks: Vec::new(),
        });
        self.function_ids.insert(symbol.to_owned(), id);
        id
    }

    fn define_function(&mut self, func: FunctionId) -> BlockId {
        let entry = self.append_block(func, "entry");
        self.position_at_end(entry);
        entry
    }

    fn param(&mut self, func: FunctionId, index: usize) -> ValueId {
        self.functions
            .get(func.index())
            .and_then(|f| f.params.get(index))
            .copied()
            .unwrap_or(ValueId::NONE)
    }

    fn append_block(&mut self, func: FunctionId, name: &str) -> BlockId {
        let id = BlockId::from_raw(raw(self.blocks.len()));
        self.blocks.push(IrBlock {
            name: name.to_owned(),
            func,
            insts: Vec::new(),
        });
        if let Some(f) = self.functions.get_mut(func.index()) {
            f.blocks.push(id);
        }
        id
    }

    fn position_at_end(&mut self, block: BlockId) {
        self.current = Some(block);
    }

    fn current_block(&self) -> Option<BlockId> {
        self.current
    }

    fn has_terminator(&self, block: BlockId) -> bool {
        self.blocks
            .get(block.index())
            .and_then(|b| b.insts.last())
            .is_some_and(|inst| inst.op.is_terminator())
    }

    fn const_int(&mut self, ty: Scalar, value: i128) -> ValueId {
        self.new_value(Type::Scalar(ty), ValueKind::Const(Constant::Int(value)))
    }

    fn const_float(&mut self, ty: Scalar, value: f64) -> ValueId {
        self.new_value(Type::Scalar(ty), ValueKind::Const(Constant::Float(value)))
    }

    fn const_null(&mut self, ty: &Type) -> ValueId {
        self.new_value(ty.clone(), ValueKind::Const(Constant::Null))
    }

    fn const_string(&mut self, text: &str) -> ValueId {
        let index = raw(self.strings.len());
        self.strings.push(text.to_owned());
        self.new_value(Type::c_string(), ValueKind::Str(index))
    }

    fn alloca(&mut self, ty: &Type, _name: &str) -> ValueId {
        let result = self.new_value(ty.clone().pointer_to(), ValueKind::Inst);
        let inst = Inst {
            result: Some(result),
            op: Op::Alloca(ty.clone()),
        };
        match self.entry_block().and_then(|b| self.blocks.get_mut(b.index())) {
            Some(entry) => {
                let at = entry
                    .insts
                    .iter()
                    .position(|i| !matches!(i.op, Op::Alloca(_)))
                    .unwrap_or(entry.insts.len());
                entry.insts.insert(at, inst);
            }
            None => trace!("alloca outside any function dropped"),
        }
        result
    }

    fn load(&mut self, ty: &Type, ptr: ValueId) -> ValueId {
        self.push(
            Some(ty.clone()),
            Op::Load {
                ty: ty.clone(),
                ptr,
            },
        )
    }

    fn store(&mut self, value: ValueId, ptr: ValueId) {
        self.push(None, Op::Store { value, ptr });
    }

    fn gep(&mut self, base: &Type, ptr: ValueId, indices: &[ValueId], result: &Type) -> ValueId {
        self.push(
            Some(result.clone().pointer_to()),
            Op::Gep {
                base: base.clone(),
                ptr,
                indices: indices.to_vec(),
            },
        )
    }

    fn struct_gep(&mut self, base: &Type, ptr: ValueId, index: u32, member: &Type) -> ValueId {
        self.push(
            Some(member.clone().pointer_to()),
            Op::StructGep {
                base: base.clone(),
                ptr,
                index,
            },
        )
    }

    fn memcpy(&mut self, dst: ValueId, src: ValueId, bytes: u64) {
        self.push(None, Op::Memcpy { dst, src, bytes });
    }

    fn binary(&mut self, op: Opcode, ty: &Type, lhs: ValueId, rhs: ValueId) -> ValueId {
        self.push(Some(ty.clone()), Op::Binary { op, lhs, rhs })
    }

    fn compare(&mut self, pred: Predicate, _ty: &Type, lhs: ValueId, rhs: ValueId) -> ValueId {
        self.push(Some(Type::BOOL), Op::Compare { pred, lhs, rhs })
    }

    fn convert(&mut self, op: CastOp, value: ValueId, to: &Type) -> ValueId {
        self.push(
            Some(to.clone()),
            Op::Convert {
                op,
                value,
                to: to.clone(),
            },
        )
    }

    fn call(&mut self, callee: FunctionId, args: &[ValueId]) -> Option<ValueId> {
        let ret = self
            .functions
            .get(callee.index())
            .map_or(Type::Void, |f| f.sig.ret.clone());
        let ty = (!ret.is_void()).then_some(ret);
        let has_result = ty.is_some();
        let id = self.push(
            ty,
            Op::Call {
                callee,
                args: args.to_vec(),
            },
        );
        has_result.then_some(id)
    }

    fn phi(&mut self, ty: &Type, incoming: &[(ValueId, BlockId)]) -> ValueId {
        self.push(
            Some(ty.clone()),
            Op::Phi {
                incoming: incoming.to_vec(),
            },
        )
    }

    fn br(&mut self, dest: BlockId) {
        self.push(None, Op::Br(dest));
    }

    fn cond_br(&mut self, cond: ValueId, then_block: BlockId, else_block: BlockId) {
        self.push(
            None,
            Op::CondBr {
                cond,
                then_block,
                else_block,
            },
        );
    }

    fn ret(&mut self, value: Option<ValueId>) {
        self.push(None, Op::Ret(value));
    }

    fn unreachable(&mut self) {
        self.push(None, Op::Unreachable);
    }

    fn global(
        &mut self,
        symbol: &str,
        ty: &Type,
        init: Option<Constant>,
        external: bool,
    ) -> ValueId {
        if let Some(existing) = self.globals.iter().find(|g| g.symbol == symbol) {
            return existing.addr;
        }
        let addr = self.new_value(ty.clone().pointer_to(), ValueKind::Global(symbol.to_owned()));
        self.globals.push(IrGlobal {
            symbol: symbol.to_owned(),
            ty: ty.clone(),
            init,
            external,
            addr,
        });
        addr
    }
}

#[cfg(test)]
mod tests;
