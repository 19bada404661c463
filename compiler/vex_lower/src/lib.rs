//! Semantic lowering for Vex.
//!
//! Walks a parsed unit and emits SSA through the [`Backend`] trait. The
//! crate ships one backend, [`IrModule`], which records what it is given
//! and prints it as an LLVM-flavoured listing.
//!
//! ```text
//! source ──parse_unit──▶ Node ──Lowerer──▶ Backend (IrModule)
//!                                  │
//!                                  └── CompilationContext: scopes, registry,
//!                                      resolver, generics, functions, globals,
//!                                      diagnostics
//! ```
//!
//! After lowering, [`CompilationContext::interface`] collects what the unit
//! exports, for its importers.

mod backend;
mod context;
mod interface;
mod ir;
mod lower;

pub use backend::{Backend, CastOp, Constant, Opcode, Predicate};
pub use context::{CompilationContext, Exports, FunctionEntry, GlobalEntry};
pub use interface::{ExportedFunction, ExportedGlobal, ModuleInterface};
pub use ir::{Inst, IrBlock, IrFunction, IrGlobal, IrModule, Op, ValueDef, ValueKind};
pub use lower::Lowerer;

/// Parse and lower one unit into a fresh [`IrModule`] named `name`.
/// Diagnostics land in `ctx.diagnostics`.
pub fn compile_unit(ctx: &mut CompilationContext, source: &str, name: &str) -> IrModule {
    let unit = vex_parse::parse_unit(
        source,
        &mut ctx.registry,
        &ctx.resolver,
        &mut ctx.diagnostics,
    );
    let mut module = IrModule::new(name);
    Lowerer::new(ctx, &mut module).lower_unit(&unit);
    module
}
