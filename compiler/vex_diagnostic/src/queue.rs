//! Diagnostic queue: counting, deduplication and error limits.

use std::io::{self, Write};

use vex_ir::Position;

use crate::{CompileError, Diagnostic, ErrorGuaranteed};

/// Configuration for diagnostic processing.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Maximum number of errors kept for printing (0 = unlimited). Errors
    /// past the limit are still counted.
    pub error_limit: usize,
    /// Drop a diagnostic identical in position and message to the previous
    /// one (the same fault reported twice).
    pub deduplicate: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            error_limit: 20,
            deduplicate: true,
        }
    }
}

impl DiagnosticConfig {
    /// No limits (for testing).
    pub fn unlimited() -> Self {
        DiagnosticConfig {
            error_limit: 0,
            deduplicate: false,
        }
    }
}

/// Collects the diagnostics of one compilation unit.
#[derive(Clone, Debug)]
pub struct DiagnosticQueue {
    file: String,
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
    config: DiagnosticConfig,
}

impl DiagnosticQueue {
    pub fn new(file: impl Into<String>) -> Self {
        Self::with_config(file, DiagnosticConfig::default())
    }

    pub fn with_config(file: impl Into<String>, config: DiagnosticConfig) -> Self {
        DiagnosticQueue {
            file: file.into(),
            diagnostics: Vec::new(),
            error_count: 0,
            warning_count: 0,
            config,
        }
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    /// Report an error. The `Reported` sentinel is swallowed (it was
    /// already reported where it was raised).
    pub fn emit_error(&mut self, err: CompileError) -> ErrorGuaranteed {
        if !err.is_reported() {
            self.push(Diagnostic::from(err));
        }
        ErrorGuaranteed::new()
    }

    pub fn warn(&mut self, pos: Position, message: impl Into<String>) {
        self.push(Diagnostic::warning(pos, message));
    }

    fn push(&mut self, diag: Diagnostic) {
        if self.config.deduplicate && self.is_duplicate(&diag) {
            return;
        }
        if diag.is_error() {
            self.error_count += 1;
            if self.config.error_limit > 0 && self.error_count > self.config.error_limit {
                return;
            }
        } else {
            self.warning_count += 1;
        }
        self.diagnostics.push(diag);
    }

    fn is_duplicate(&self, diag: &Diagnostic) -> bool {
        self.diagnostics.last().is_some_and(|prev| {
            prev.pos == diag.pos
                && prev.severity == diag.severity
                && prev.message == diag.message
        })
    }

    #[inline]
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    #[inline]
    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    #[inline]
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Diagnostics kept for printing, in emission order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| !d.is_error())
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    /// `<n> error(s), <m> warning(s)`
    pub fn summary(&self) -> String {
        format!(
            "{} error(s), {} warning(s)",
            self.error_count, self.warning_count
        )
    }

    /// Write every kept diagnostic, then the summary line.
    pub fn render(&self, out: &mut impl Write) -> io::Result<()> {
        for diag in &self.diagnostics {
            writeln!(out, "{}", diag.render(&self.file))?;
        }
        let hidden = self.error_count.saturating_sub(self.errors().count());
        if hidden > 0 {
            writeln!(out, "({hidden} more error(s) not shown)")?;
        }
        writeln!(out, "{}", self.summary())
    }

    pub fn render_to_string(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.render(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// `Err` if any error was reported.
    pub fn finish(&self) -> Result<(), ErrorGuaranteed> {
        if self.has_errors() {
            Err(ErrorGuaranteed::new())
        } else {
            Ok(())
        }
    }
}
