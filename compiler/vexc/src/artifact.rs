//! Per-module compiled artifacts.
//!
//! # Layout
//!
//! ```text
//! <out_dir>/
//! ├── main.vxo          # bincode-encoded ModuleArtifact
//! ├── main.vxo.lock     # present only while `main` compiles
//! └── net/
//!     ├── http.vxo
//!     └── http.vxir     # IR listing, with --emit-ir
//! ```
//!
//! The interface carries everything an importer needs (function
//! signatures, globals, struct layouts, generic tables) so dependents never
//! re-parse a dependency's source.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use tracing::trace;
use vex_ir::ModulePath;
use vex_lower::{IrModule, ModuleInterface};

use crate::BuildError;

/// Bumped whenever the encoded shape changes.
pub const FORMAT_VERSION: u32 = 1;

pub const ARTIFACT_EXTENSION: &str = "vxo";

pub const LISTING_EXTENSION: &str = "vxir";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModuleArtifact {
    pub format_version: u32,
    pub module_path: ModulePath,
    pub interface: ModuleInterface,
    pub ir: IrModule,
}

impl ModuleArtifact {
    pub fn new(module_path: ModulePath, interface: ModuleInterface, ir: IrModule) -> Self {
        ModuleArtifact {
            format_version: FORMAT_VERSION,
            module_path,
            interface,
            ir,
        }
    }

    pub fn write(&self, path: &Path) -> Result<(), BuildError> {
        let data = bincode::serialize(self).map_err(|source| BuildError::Encode {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
        }
        fs::write(path, data).map_err(|e| BuildError::io(path, e))
    }

    pub fn read(path: &Path) -> Result<Self, BuildError> {
        let data = fs::read(path).map_err(|e| BuildError::io(path, e))?;
        let artifact: ModuleArtifact =
            bincode::deserialize(&data).map_err(|source| BuildError::Decode {
                path: path.to_path_buf(),
                source,
            })?;
        if artifact.format_version != FORMAT_VERSION {
            return Err(BuildError::FormatVersion {
                path: path.to_path_buf(),
                found: artifact.format_version,
                expected: FORMAT_VERSION,
            });
        }
        Ok(artifact)
    }
}

/// `<out_dir>/<segments joined by '/'>.vxo`
pub fn artifact_path(out_dir: &Path, module: &ModulePath) -> PathBuf {
    let mut path = out_dir.to_path_buf();
    path.extend(module.segments());
    path.set_extension(ARTIFACT_EXTENSION);
    path
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Whether `artifact` must be rebuilt: it is missing, or older than its
/// source or any dependency artifact.
pub fn is_stale(artifact: &Path, source: &Path, dependencies: &[PathBuf]) -> bool {
    let Some(built) = modified(artifact) else {
        trace!(artifact = %artifact.display(), "no artifact");
        return true;
    };
    let newer = |input: &Path| modified(input).map_or(true, |t| t > built);
    if newer(source) {
        trace!(artifact = %artifact.display(), "source changed");
        return true;
    }
    dependencies.iter().any(|dep| newer(dep))
}
