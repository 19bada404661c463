//! The Vex abstract syntax tree.
//!
//! A closed sum type. Every [`Node`] owns its children and carries the
//! token it was parsed from, so diagnostics can always point at source.
//! Rewrite passes (compound-assignment desugaring, `grad`) build new
//! nodes instead of mutating shared ones.

mod display;
mod operators;

use smallvec::SmallVec;

use crate::{QualifiedName, Token, Type};

pub use operators::{BinaryOp, UnaryOp};

/// An AST node: what it is, and where it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub token: Token,
}

impl Node {
    pub fn new(kind: NodeKind, token: Token) -> Self {
        Node { kind, token }
    }

    /// The `NoneAst` sentinel.
    pub fn none(token: Token) -> Self {
        Node::new(NodeKind::NoneAst, token)
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self.kind, NodeKind::NoneAst)
    }

    /// Nodes that produce a value when lowered.
    pub fn is_expression(&self) -> bool {
        match &self.kind {
            NodeKind::BinOp { .. }
            | NodeKind::UnaryOp { .. }
            | NodeKind::BlockExpr { .. }
            | NodeKind::Boolean(_)
            | NodeKind::FunctionCall { .. }
            | NodeKind::Num(_)
            | NodeKind::Object { .. }
            | NodeKind::Sizeof(_)
            | NodeKind::Str(_)
            | NodeKind::TypeTrans { .. }
            | NodeKind::ArrayInit(_)
            | NodeKind::Variable { .. } => true,
            NodeKind::If { is_expr, .. } => *is_expr,
            _ => false,
        }
    }
}

/// Numeric literal payload.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum NumValue {
    Int(u128),
    Float(f64),
}

impl NumValue {
    #[expect(
        clippy::cast_precision_loss,
        reason = "literal folding tolerates rounding of huge integers"
    )]
    pub fn as_f64(self) -> f64 {
        match self {
            NumValue::Int(v) => v as f64,
            NumValue::Float(v) => v,
        }
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        match self {
            NumValue::Int(v) => v == 0,
            NumValue::Float(v) => v == 0.0,
        }
    }
}

/// One step of a variable access chain, applied left to right.
#[derive(Clone, Debug, PartialEq)]
pub struct OffsetOp {
    pub kind: OffsetKind,
    pub token: Token,
}

#[derive(Clone, Debug, PartialEq)]
pub enum OffsetKind {
    /// `[expr]`
    Index(Box<Node>),
    /// `.name`
    Member(String),
    /// `.name(args)`, called with the object's address first.
    MethodCall { name: String, args: Vec<Node> },
}

/// One link in an `if/elif/else` chain.
///
/// The chain is right-recursive and always ends in `Fi`, which has no body.
#[derive(Clone, Debug, PartialEq)]
pub enum IfLink {
    Arm {
        cond: Box<Node>,
        body: Box<Node>,
        next: Box<IfLink>,
    },
    Else(Box<Node>),
    Fi,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoopCtrl {
    Break,
    Continue,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SizeofArg {
    Type(Type),
    Expr(Box<Node>),
}

/// `fn name(params) -> ret { body }`; no body means a C-linkage declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    /// `Param` nodes.
    pub params: Vec<Node>,
    pub ret: Type,
    pub variadic: bool,
    pub body: Option<Box<Node>>,
}

/// `generic name(index) { type: func, ..., default: func }`.
#[derive(Clone, Debug, PartialEq)]
pub struct GenericDecl {
    pub name: String,
    /// Which argument's type selects the target.
    pub index: usize,
    /// Entries as written; function names are not yet resolved.
    pub entries: Vec<(Type, QualifiedName)>,
    pub default: Option<QualifiedName>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StructDecl {
    pub name: String,
    pub members: Vec<(String, Type)>,
}

/// Node variants.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    /// `target = value`, or a declaration `target: ty = value` / `target: ty;`.
    Assign {
        target: Box<Node>,
        declared: Option<Type>,
        value: Option<Box<Node>>,
    },
    BinOp {
        op: BinaryOp,
        lhs: Box<Node>,
        rhs: Box<Node>,
    },
    UnaryOp {
        op: UnaryOp,
        operand: Box<Node>,
    },
    /// `{ stmts; value }` in expression position.
    BlockExpr {
        stmts: Vec<Node>,
        value: Box<Node>,
    },
    Boolean(bool),
    /// A statement list.
    Compound(Vec<Node>),
    For {
        init: Box<Node>,
        cond: Box<Node>,
        step: Box<Node>,
        body: Box<Node>,
    },
    While {
        cond: Box<Node>,
        body: Box<Node>,
    },
    FunctionDecl(Box<FunctionDecl>),
    /// `name(args)`; `module` holds the written qualification.
    FunctionCall {
        module: Vec<String>,
        name: String,
        args: Vec<Node>,
    },
    Generic(Box<GenericDecl>),
    Global {
        name: String,
        ty: Type,
        value: Option<Box<Node>>,
    },
    If {
        chain: Box<IfLink>,
        /// Used for its value; arms merge through a phi.
        is_expr: bool,
    },
    LoopCtrl(LoopCtrl),
    Num(NumValue),
    /// Struct literal `Name(args)`.
    Object {
        module: Vec<String>,
        name: String,
        args: Vec<Node>,
    },
    Param {
        name: String,
        ty: Type,
    },
    Return(Option<Box<Node>>),
    Sizeof(SizeofArg),
    Str(String),
    /// `expr as T`
    TypeTrans {
        expr: Box<Node>,
        target: Type,
    },
    ArrayInit(Vec<Node>),
    Variable {
        module: Vec<String>,
        name: String,
        offsets: SmallVec<[OffsetOp; 2]>,
    },
    Import {
        path: Vec<String>,
        rename: Option<String>,
    },
    StructDecl(Box<StructDecl>),
    ModuleDecl(Vec<String>),
    NoneAst,
}
