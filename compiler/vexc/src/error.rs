//! Build-level errors.
//!
//! Errors inside a unit are diagnostics and stay in its
//! [`DiagnosticQueue`](vex_diagnostic::DiagnosticQueue); these are the
//! failures around units: files, artifacts, the import graph.

use std::path::PathBuf;

use vex_diagnostic::ErrorKind;
use vex_ir::ModulePath;

fn cycle_text(cycle: &[ModulePath]) -> String {
    cycle
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("cannot access `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot encode artifact `{}`: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: bincode::Error,
    },

    #[error("cannot decode artifact `{}`: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: bincode::Error,
    },

    #[error("artifact `{}` has format version {found}, expected {expected}", path.display())]
    FormatVersion {
        path: PathBuf,
        found: u32,
        expected: u32,
    },

    #[error("`{}` is outside the package root `{}`", path.display(), root.display())]
    OutsideRoot { path: PathBuf, root: PathBuf },

    #[error("circular dependency: {}", cycle_text(.cycle))]
    CircularDependency { cycle: Vec<ModulePath> },

    #[error("circular dependency: `{module}` is already being compiled (`{}` exists)", lock.display())]
    Locked { module: ModulePath, lock: PathBuf },

    #[error("`{module}` was not compiled: dependency `{dependency}` failed")]
    FailedDependency {
        module: ModulePath,
        dependency: ModulePath,
    },

    #[error("cannot start the build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl BuildError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BuildError::Io {
            path: path.into(),
            source,
        }
    }

    /// Diagnostic kind this error is reported under.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BuildError::Io { .. }
            | BuildError::Encode { .. }
            | BuildError::Decode { .. }
            | BuildError::FormatVersion { .. }
            | BuildError::OutsideRoot { .. }
            | BuildError::ThreadPool(_) => ErrorKind::SysErr,
            BuildError::CircularDependency { .. } | BuildError::Locked { .. } => ErrorKind::Logic,
            BuildError::FailedDependency { .. } => ErrorKind::Missing,
        }
    }
}
