//! Diagnostics for the Vex compiler.
//!
//! Every phase returns [`CompileResult`]. Errors carry an [`ErrorKind`] and a
//! source [`Position`](vex_ir::Position); the statement-list loops in the
//! parser and lowering catch them and hand them to a [`DiagnosticQueue`],
//! which counts, deduplicates, caps and renders them as
//!
//! ```text
//! main.vx:3:5: TypeError: cannot convert `f64*` to `i32`
//! 1 error(s), 0 warning(s)
//! ```
//!
//! # Error Guarantees
//!
//! [`ErrorGuaranteed`] can only be obtained by pushing an error into a
//! queue, so a function returning `Result<T, ErrorGuaranteed>` has provably
//! reported something before failing.

mod diagnostic;
mod error;
mod guarantee;
pub mod queue;

pub use diagnostic::{Diagnostic, Severity};
pub use error::{CompileError, CompileResult, ErrorKind};
pub use guarantee::ErrorGuaranteed;
pub use queue::{DiagnosticConfig, DiagnosticQueue};
