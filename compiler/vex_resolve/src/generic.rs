//! Generic functions: one name, several implementations, chosen by the
//! type of one designated argument.

use std::collections::BTreeMap;

use tracing::debug;
use vex_ir::QualifiedName;

use crate::ResolveError;

/// A generic definition.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct GenericDef {
    pub name: QualifiedName,
    /// Index of the discriminant argument.
    pub index: usize,
    /// Type display name → mangled implementation.
    pub targets: BTreeMap<String, String>,
    /// Mangled fallback implementation.
    pub default: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct GenericTable {
    defs: BTreeMap<QualifiedName, GenericDef>,
}

impl GenericTable {
    pub fn new() -> Self {
        GenericTable::default()
    }

    pub fn define(&mut self, def: GenericDef) -> Result<(), ResolveError> {
        if self.defs.contains_key(&def.name) {
            return Err(ResolveError::GenericRedefinition(def.name.to_string()));
        }
        debug!(generic = %def.name, targets = def.targets.len(), "define generic");
        self.defs.insert(def.name.clone(), def);
        Ok(())
    }

    /// Load a definition from a compiled module; identical re-imports are no-ops.
    pub fn import(&mut self, def: GenericDef) -> Result<(), ResolveError> {
        match self.defs.get(&def.name) {
            Some(existing) if *existing == def => Ok(()),
            Some(_) => Err(ResolveError::GenericRedefinition(def.name.to_string())),
            None => {
                self.defs.insert(def.name.clone(), def);
                Ok(())
            }
        }
    }

    pub fn get(&self, name: &QualifiedName) -> Option<&GenericDef> {
        self.defs.get(name)
    }

    /// Mangled implementation of `name` for a discriminant of type
    /// `type_name`, falling back to the default.
    pub fn dispatch(&self, name: &QualifiedName, type_name: &str) -> Result<&str, ResolveError> {
        let no_match = || ResolveError::NoGenericMatch {
            generic: name.to_string(),
            ty: type_name.to_owned(),
        };
        let def = self.defs.get(name).ok_or_else(no_match)?;
        def.targets
            .get(type_name)
            .or(def.default.as_ref())
            .map(String::as_str)
            .ok_or_else(no_match)
    }

    /// Generics defined in `module`, in name order.
    pub fn defined_in<'a>(
        &'a self,
        module: &'a vex_ir::ModulePath,
    ) -> impl Iterator<Item = &'a GenericDef> + 'a {
        self.defs.values().filter(move |d| &d.name.module == module)
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
