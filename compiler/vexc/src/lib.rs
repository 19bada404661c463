//! The Vex compiler driver.
//!
//! Builds a package from its entry file: scans the import graph, rejects
//! cycles, and compiles units in dependency waves, writing one artifact per
//! module. The `vexc` binary is a thin command-line layer over [`Driver`].

pub mod artifact;
pub mod driver;
mod error;
pub mod graph;
pub mod lock;
pub mod options;

use std::sync::Once;

pub use artifact::{artifact_path, ModuleArtifact};
pub use driver::{compile_module, BuildReport, Driver, UnitReport, UnitStatus};
pub use error::BuildError;
pub use graph::{DependencyGraph, PackageLayout};
pub use lock::{lock_path, LockGuard};
pub use options::{parse_build_options, BuildOptions};

static TRACING_INIT: Once = Once::new();

/// Install a tracing subscriber when `VEX_LOG` (or `RUST_LOG`) is set.
///
/// `VEX_LOG=vex_lower=debug`, `VEX_LOG=vexc=trace`, and so on. With
/// `VEX_LOG_TREE` set, spans are printed as an indented tree. Safe to call
/// more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let Some(directives) = std::env::var("VEX_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .ok()
        else {
            return;
        };
        let filter = EnvFilter::new(directives);
        let registry = tracing_subscriber::registry().with(filter);
        if std::env::var_os("VEX_LOG_TREE").is_some() {
            registry
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_targets(true)
                        .with_writer(std::io::stderr),
                )
                .init();
        } else {
            registry
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_level(true)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    });
}
