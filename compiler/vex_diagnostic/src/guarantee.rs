//! Proof that an error was reported.

use vex_ir::Position;

use crate::CompileError;

/// Only [`DiagnosticQueue`](crate::DiagnosticQueue) can create this.
///
/// Zero-sized; the private field prevents construction elsewhere.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ErrorGuaranteed(());

impl ErrorGuaranteed {
    pub(crate) fn new() -> Self {
        ErrorGuaranteed(())
    }

    /// The silent sentinel standing for the error this proves was reported.
    pub fn at(self, pos: Position) -> CompileError {
        CompileError::reported(pos)
    }
}
