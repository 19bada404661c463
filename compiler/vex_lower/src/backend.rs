//! The SSA emission interface.
//!
//! Lowering drives a [`Backend`] through opaque ids only. Every method
//! takes `&mut self`; the backend owns all emitted state. Types are the
//! front end's own [`Type`] descriptors; aggregates (arrays, vectors,
//! structs) are always handled through pointers to their storage.
//!
//! | Category | Methods |
//! |----------|---------|
//! | Functions | `declare_function`, `define_function`, `param` |
//! | Blocks | `append_block`, `position_at_end`, `current_block`, `has_terminator` |
//! | Constants | `const_int`, `const_float`, `const_null`, `const_string` |
//! | Memory | `alloca`, `load`, `store`, `gep`, `struct_gep`, `memcpy` |
//! | Arithmetic | `binary`, `compare`, `convert` |
//! | Calls and merges | `call`, `phi` |
//! | Control flow | `br`, `cond_br`, `ret`, `unreachable` |
//! | Globals | `global` |

use std::fmt;

use vex_ir::{BlockId, FnSig, FunctionId, Scalar, Type, ValueId};

/// Binary instruction opcodes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Opcode {
    Add,
    Sub,
    Mul,
    SDiv,
    SRem,
    FAdd,
    FSub,
    FMul,
    FDiv,
    FRem,
    And,
    Or,
    Xor,
    Shl,
    AShr,
}

impl Opcode {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::SDiv => "sdiv",
            Self::SRem => "srem",
            Self::FAdd => "fadd",
            Self::FSub => "fsub",
            Self::FMul => "fmul",
            Self::FDiv => "fdiv",
            Self::FRem => "frem",
            Self::And => "and",
            Self::Or => "or",
            Self::Xor => "xor",
            Self::Shl => "shl",
            Self::AShr => "ashr",
        }
    }
}

/// Comparison predicates. Integer predicates are signed; float ones ordered.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Predicate {
    Eq,
    Ne,
    Slt,
    Sle,
    Sgt,
    Sge,
    OEq,
    ONe,
    OLt,
    OLe,
    OGt,
    OGe,
}

impl Predicate {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Slt => "slt",
            Self::Sle => "sle",
            Self::Sgt => "sgt",
            Self::Sge => "sge",
            Self::OEq => "oeq",
            Self::ONe => "one",
            Self::OLt => "olt",
            Self::OLe => "ole",
            Self::OGt => "ogt",
            Self::OGe => "oge",
        }
    }

    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(
            self,
            Self::OEq | Self::ONe | Self::OLt | Self::OLe | Self::OGt | Self::OGe
        )
    }
}

/// Conversion instructions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum CastOp {
    Trunc,
    SExt,
    ZExt,
    FpTrunc,
    FpExt,
    FpToSi,
    SiToFp,
    BitCast,
    PtrToInt,
    IntToPtr,
}

impl CastOp {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Trunc => "trunc",
            Self::SExt => "sext",
            Self::ZExt => "zext",
            Self::FpTrunc => "fptrunc",
            Self::FpExt => "fpext",
            Self::FpToSi => "fptosi",
            Self::SiToFp => "sitofp",
            Self::BitCast => "bitcast",
            Self::PtrToInt => "ptrtoint",
            Self::IntToPtr => "inttoptr",
        }
    }

    /// Instruction for a scalar-to-scalar conversion, `None` when the
    /// representation does not change.
    pub fn between(from: Scalar, to: Scalar) -> Option<CastOp> {
        use std::cmp::Ordering;
        match (from.is_float(), to.is_float()) {
            (false, false) => match from.bits().cmp(&to.bits()) {
                Ordering::Less if from == Scalar::Bool => Some(Self::ZExt),
                Ordering::Less => Some(Self::SExt),
                Ordering::Greater => Some(Self::Trunc),
                Ordering::Equal => None,
            },
            (false, true) => Some(Self::SiToFp),
            (true, false) => Some(Self::FpToSi),
            (true, true) => match from.bits().cmp(&to.bits()) {
                Ordering::Less => Some(Self::FpExt),
                Ordering::Greater => Some(Self::FpTrunc),
                Ordering::Equal => None,
            },
        }
    }
}

/// Compile-time constant payload.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Constant {
    Int(i128),
    Float(f64),
    Null,
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Int(v) => write!(f, "{v}"),
            Constant::Float(v) => write!(f, "{v:?}"),
            Constant::Null => f.write_str("null"),
        }
    }
}

/// An SSA emission backend.
pub trait Backend {
    /// Declare a function symbol. Declaring the same symbol twice returns
    /// the same id.
    fn declare_function(&mut self, symbol: &str, sig: &FnSig) -> FunctionId;

    /// Start the body of a declared function; returns its entry block,
    /// with the builder positioned there.
    fn define_function(&mut self, func: FunctionId) -> BlockId;

    /// The `index`-th incoming argument of `func`.
    fn param(&mut self, func: FunctionId, index: usize) -> ValueId;

    fn append_block(&mut self, func: FunctionId, name: &str) -> BlockId;
    fn position_at_end(&mut self, block: BlockId);
    fn current_block(&self) -> Option<BlockId>;
    fn has_terminator(&self, block: BlockId) -> bool;

    fn const_int(&mut self, ty: Scalar, value: i128) -> ValueId;
    fn const_float(&mut self, ty: Scalar, value: f64) -> ValueId;
    fn const_null(&mut self, ty: &Type) -> ValueId;
    /// A NUL-terminated byte string; the value is an `i8*`.
    fn const_string(&mut self, text: &str) -> ValueId;

    /// Stack slot for one `ty`; the value is a `ty*`.
    fn alloca(&mut self, ty: &Type, name: &str) -> ValueId;
    fn load(&mut self, ty: &Type, ptr: ValueId) -> ValueId;
    fn store(&mut self, value: ValueId, ptr: ValueId);
    /// Address of `ptr[indices...]`, `ptr` pointing at `base`. The result
    /// points at `result`.
    fn gep(&mut self, base: &Type, ptr: ValueId, indices: &[ValueId], result: &Type) -> ValueId;
    /// Address of member `index` of the struct `ptr` points at.
    fn struct_gep(&mut self, base: &Type, ptr: ValueId, index: u32, member: &Type) -> ValueId;
    fn memcpy(&mut self, dst: ValueId, src: ValueId, bytes: u64);

    fn binary(&mut self, op: Opcode, ty: &Type, lhs: ValueId, rhs: ValueId) -> ValueId;
    /// Result is a `bool`.
    fn compare(&mut self, pred: Predicate, ty: &Type, lhs: ValueId, rhs: ValueId) -> ValueId;
    fn convert(&mut self, op: CastOp, value: ValueId, to: &Type) -> ValueId;

    /// `None` for `void` callees.
    fn call(&mut self, callee: FunctionId, args: &[ValueId]) -> Option<ValueId>;
    fn phi(&mut self, ty: &Type, incoming: &[(ValueId, BlockId)]) -> ValueId;

    fn br(&mut self, dest: BlockId);
    fn cond_br(&mut self, cond: ValueId, then_block: BlockId, else_block: BlockId);
    fn ret(&mut self, value: Option<ValueId>);
    fn unreachable(&mut self);

    /// A module-level variable; the value is a `ty*`. `init` is `None` for
    /// a zero-initialized definition; `external` globals live in another unit.
    fn global(&mut self, symbol: &str, ty: &Type, init: Option<Constant>, external: bool)
        -> ValueId;
}

#[cfg(test)]
mod tests;
