//! Lock markers.
//!
//! A zero-byte `<artifact>.lock` exists exactly while its unit compiles.
//! Finding one already present means the unit is being compiled further up
//! the current import chain (or by a concurrent build), so the build stops
//! with a circular-dependency error instead of waiting.

use std::ffi::OsString;
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{trace, warn};
use vex_ir::ModulePath;

use crate::BuildError;

/// `<artifact>.lock`
pub fn lock_path(artifact: &Path) -> PathBuf {
    let mut name = OsString::from(artifact.as_os_str());
    name.push(".lock");
    PathBuf::from(name)
}

/// Holds a lock marker; dropping it removes the file.
#[derive(Debug)]
pub struct LockGuard {
    path: PathBuf,
}

impl LockGuard {
    pub fn acquire(artifact: &Path, module: &ModulePath) -> Result<Self, BuildError> {
        let path = lock_path(artifact);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
        }
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => {
                trace!(lock = %path.display(), "locked");
                Ok(LockGuard { path })
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(BuildError::Locked {
                module: module.clone(),
                lock: path,
            }),
            Err(e) => Err(BuildError::io(path, e)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!(lock = %self.path.display(), error = %e, "cannot remove lock marker");
        }
    }
}
