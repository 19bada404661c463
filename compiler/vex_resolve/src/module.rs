//! Module paths, imports and aliases.
//!
//! A name `m1::...::mk::name` (or bare `name`) written in module `cur`
//! resolves through an ordered candidate list; the caller takes the first
//! candidate its symbol table knows:
//!
//! 1. no qualification: `cur::name`, then the global `name`
//! 2. `root::rest::name`: `<package>::rest::name`
//! 3. otherwise: `cur::m1::..::name`, then the longest registered alias
//!    prefix substituted by its canonical path, then `m1::..::name` as
//!    written
//!
//! Every import records three alias entries (the spelling as written, the
//! canonical path mapped to itself, and the rename) so all spellings
//! converge on one canonical path, and so on one mangled name.

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use tracing::debug;
use vex_ir::{ModulePath, QualifiedName};

use crate::ResolveError;

/// First segment of an absolute path.
pub const ROOT_SEGMENT: &str = "root";

/// Candidate names, most specific first.
pub type Candidates = SmallVec<[QualifiedName; 4]>;

#[derive(Clone, Debug, Default)]
pub struct ModuleResolver {
    package: ModulePath,
    current: ModulePath,
    known: FxHashSet<ModulePath>,
    aliases: FxHashMap<String, ModulePath>,
}

fn push_unique(out: &mut Candidates, candidate: QualifiedName) {
    if !out.contains(&candidate) {
        out.push(candidate);
    }
}

impl ModuleResolver {
    /// A resolver for units of the package rooted at `package`.
    pub fn new(package: ModulePath) -> Self {
        ModuleResolver {
            package,
            ..ModuleResolver::default()
        }
    }

    pub fn package(&self) -> &ModulePath {
        &self.package
    }

    pub fn current(&self) -> &ModulePath {
        &self.current
    }

    /// Set the current module (`module a::b;`). Returns `false` when it was
    /// already the current module.
    pub fn set_current(&mut self, path: ModulePath) -> bool {
        if path == self.current {
            return false;
        }
        debug!(module = %path, "current module");
        self.known.insert(path.clone());
        self.current = path;
        true
    }

    /// Make `path` importable.
    pub fn add_known(&mut self, path: ModulePath) {
        self.known.insert(path);
    }

    pub fn is_known(&self, path: &ModulePath) -> bool {
        self.known.contains(path)
    }

    /// `root::rest` → `<package>::rest`; anything else unchanged.
    fn absolute(&self, segments: &[String]) -> Option<ModulePath> {
        match segments.split_first() {
            Some((first, rest)) if first == ROOT_SEGMENT => Some(self.package.join(rest)),
            _ => None,
        }
    }

    /// Longest registered alias prefix of `segments`, substituted.
    fn substitute_alias(&self, segments: &[String]) -> Option<ModulePath> {
        (1..=segments.len()).rev().find_map(|len| {
            let key = segments[..len].join(ModulePath::SEPARATOR);
            self.aliases
                .get(&key)
                .map(|canonical| canonical.join(&segments[len..]))
        })
    }

    /// Candidate qualified names for `modinfo::name`, in resolution order.
    pub fn candidates(&self, modinfo: &[String], name: &str) -> Candidates {
        let mut out = Candidates::new();
        if modinfo.is_empty() {
            push_unique(&mut out, QualifiedName::new(self.current.clone(), name));
            push_unique(&mut out, QualifiedName::global(name));
            return out;
        }
        if let Some(abs) = self.absolute(modinfo) {
            push_unique(&mut out, QualifiedName::new(abs, name));
            return out;
        }
        push_unique(&mut out, QualifiedName::new(self.current.join(modinfo), name));
        if let Some(path) = self.substitute_alias(modinfo) {
            push_unique(&mut out, QualifiedName::new(path, name));
        }
        push_unique(&mut out, QualifiedName::new(ModulePath::from(modinfo), name));
        out
    }

    /// Resolve an `import` to its canonical module and record its aliases.
    pub fn resolve_import(
        &mut self,
        path: &[String],
        rename: Option<&str>,
    ) -> Result<ModulePath, ResolveError> {
        let canonical = self
            .import_candidates(path)
            .into_iter()
            .find(|p| self.known.contains(p))
            .ok_or_else(|| ResolveError::UnknownModule(path.join(ModulePath::SEPARATOR)))?;

        let written = path.join(ModulePath::SEPARATOR);
        self.aliases.insert(written, canonical.clone());
        self.aliases.insert(canonical.to_string(), canonical.clone());
        if let Some(alias) = rename {
            self.aliases.insert(alias.to_owned(), canonical.clone());
        }
        debug!(import = %path.join("::"), canonical = %canonical, alias = ?rename, "import");
        Ok(canonical)
    }

    /// Where an import path may point, most local first: a sibling of the
    /// current module, a child of it, an alias, a package module, then the
    /// path as written.
    pub fn import_candidates(&self, path: &[String]) -> SmallVec<[ModulePath; 4]> {
        let mut out: SmallVec<[ModulePath; 4]> = SmallVec::new();
        let mut add = |p: ModulePath| {
            if !p.is_empty() && !out.contains(&p) {
                out.push(p);
            }
        };
        if let Some(abs) = self.absolute(path) {
            add(abs);
            return out;
        }
        if !self.current.is_empty() {
            add(self.current.parent().join(path));
            add(self.current.join(path));
        }
        if let Some(sub) = self.substitute_alias(path) {
            add(sub);
        }
        if !self.package.is_empty() {
            add(self.package.join(path));
        }
        add(ModulePath::from(path));
        out
    }

    /// Canonical path for a path spelling. Idempotent on canonical paths.
    pub fn resolve_path(&self, text: &str) -> ModulePath {
        self.aliases
            .get(text)
            .cloned()
            .unwrap_or_else(|| ModulePath::parse(text))
    }

    /// Canonical module of an alias spelling, if registered.
    pub fn alias(&self, spelling: &str) -> Option<&ModulePath> {
        self.aliases.get(spelling)
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
