//! Name resolution for Vex.
//!
//! - [`SymbolTable`]: the stack of lexical scopes, with `break`/`continue`
//!   targets inherited through non-loop scopes
//! - [`ModuleResolver`]: current module, package prefix, import aliases,
//!   and the candidate list for a (possibly qualified) name
//! - [`mangle`] / [`demangle`]: length-prefixed linkage names
//! - [`GenericTable`]: generic functions dispatched on an argument's type

mod error;
mod generic;
mod mangle;
mod module;
mod scope;

pub use error::ResolveError;
pub use generic::{GenericDef, GenericTable};
pub use mangle::{demangle, mangle, MANGLE_PREFIX};
pub use module::{Candidates, ModuleResolver, ROOT_SEGMENT};
pub use scope::{Binding, BindingFlags, Scope, SymbolTable};
