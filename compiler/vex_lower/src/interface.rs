//! What a compiled unit exports to its importers.
//!
//! Importers rebuild their registry, function table, global table and
//! generic table from the interface alone; the source is never re-parsed.

use vex_ir::{FnSig, ModulePath, QualifiedName, Type};
use vex_resolve::GenericDef;
use vex_types::StructDef;

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct ExportedFunction {
    pub name: QualifiedName,
    pub symbol: String,
    pub sig: FnSig,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct ExportedGlobal {
    pub name: QualifiedName,
    pub symbol: String,
    pub ty: Type,
}

/// The exported surface of one unit, in deterministic order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct ModuleInterface {
    /// The unit's own module path.
    pub module: ModulePath,
    /// Modules the unit declared with `module`.
    pub modules: Vec<ModulePath>,
    pub functions: Vec<ExportedFunction>,
    pub globals: Vec<ExportedGlobal>,
    /// Member lists, offsets and byte sizes.
    pub structs: Vec<StructDef>,
    pub generics: Vec<GenericDef>,
}

impl ModuleInterface {
    pub fn function(&self, name: &QualifiedName) -> Option<&ExportedFunction> {
        self.functions.iter().find(|f| &f.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
            && self.globals.is_empty()
            && self.structs.is_empty()
            && self.generics.is_empty()
    }
}
