//! Module paths and qualified names.

use std::fmt;

/// A module path such as `a::b::c`. The empty path is the global
/// (C-linkage) namespace.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct ModulePath(Vec<String>);

impl ModulePath {
    pub const SEPARATOR: &'static str = "::";

    pub fn global() -> Self {
        ModulePath(Vec::new())
    }

    pub fn new(segments: Vec<String>) -> Self {
        ModulePath(segments)
    }

    /// Parse `a::b::c`. Empty segments are dropped.
    pub fn parse(text: &str) -> Self {
        ModulePath(
            text.split(Self::SEPARATOR)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect(),
        )
    }

    #[inline]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    #[inline]
    pub fn is_global(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Everything but the last segment. The parent of the global path is global.
    #[must_use]
    pub fn parent(&self) -> ModulePath {
        let mut segs = self.0.clone();
        segs.pop();
        ModulePath(segs)
    }

    #[must_use]
    pub fn join(&self, tail: &[String]) -> ModulePath {
        let mut segs = self.0.clone();
        segs.extend(tail.iter().cloned());
        ModulePath(segs)
    }

    pub fn starts_with(&self, prefix: &[String]) -> bool {
        self.0.starts_with(prefix)
    }

    pub fn into_segments(self) -> Vec<String> {
        self.0
    }
}

impl<const N: usize> From<[&str; N]> for ModulePath {
    fn from(segments: [&str; N]) -> Self {
        ModulePath(segments.iter().map(|s| (*s).to_owned()).collect())
    }
}

impl From<&[String]> for ModulePath {
    fn from(segments: &[String]) -> Self {
        ModulePath(segments.to_vec())
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(Self::SEPARATOR))
    }
}

/// A name inside a module: `a::b::name`.
#[derive(Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct QualifiedName {
    pub module: ModulePath,
    pub name: String,
}

impl QualifiedName {
    pub fn new(module: ModulePath, name: impl Into<String>) -> Self {
        QualifiedName {
            module,
            name: name.into(),
        }
    }

    /// A name in the global namespace.
    pub fn global(name: impl Into<String>) -> Self {
        QualifiedName::new(ModulePath::global(), name)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.module.is_global() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}::{}", self.module, self.name)
        }
    }
}

#[cfg(test)]
mod tests;
