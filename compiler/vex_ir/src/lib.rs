//! Vex IR - shared data structures for every compiler phase.
//!
//! - [`Position`]: 1-based line, 0-based column source locations
//! - [`Token`] / [`TokenKind`]: lexer output
//! - [`Node`] / [`NodeKind`]: the AST, a closed sum type owned as a tree
//! - [`Type`] / [`Scalar`]: type descriptors shared by parser, registry and lowering
//! - [`ModulePath`] / [`QualifiedName`]: canonical module paths for resolution and mangling
//! - [`ValueId`] / [`BlockId`] / [`FunctionId`]: opaque handles into an SSA backend
//!
//! With the `cache` feature, everything that ends up in a compiled module
//! artifact derives `serde::Serialize` / `serde::Deserialize`.

pub mod ast;
mod module_path;
mod position;
mod ssa;
mod token;
mod ty;

pub use ast::{
    BinaryOp, FunctionDecl, GenericDecl, IfLink, LoopCtrl, Node, NodeKind, NumValue, OffsetKind,
    OffsetOp, SizeofArg, StructDecl, UnaryOp,
};
pub use module_path::{ModulePath, QualifiedName};
pub use position::Position;
pub use ssa::{BlockId, FunctionId, ValueId};
pub use token::{Token, TokenKind, TokenValue};
pub use ty::{FnSig, Scalar, Type};
