//! Per-unit compilation state.
//!
//! One [`CompilationContext`] per unit. It owns every table lowering
//! consults; parallel builds give each unit its own context, so nothing in
//! here is shared across threads.

use rustc_hash::FxHashMap;
use tracing::debug;
use vex_diagnostic::{CompileError, CompileResult, DiagnosticConfig, DiagnosticQueue};
use vex_ir::{FnSig, FunctionId, ModulePath, Position, QualifiedName, Type, ValueId};
use vex_resolve::{GenericTable, ModuleResolver, SymbolTable};
use vex_types::TypeRegistry;

use crate::interface::{ExportedFunction, ExportedGlobal, ModuleInterface};

/// A known function.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionEntry {
    pub sig: FnSig,
    /// Linkage name.
    pub symbol: String,
    /// Backend handle, once declared in the current module.
    pub id: Option<FunctionId>,
    /// Has a body (here or in the unit it was imported from).
    pub defined: bool,
    /// Declared by this unit rather than imported.
    pub local: bool,
}

/// A known module-level variable.
#[derive(Clone, Debug, PartialEq)]
pub struct GlobalEntry {
    pub ty: Type,
    pub symbol: String,
    /// Address in the current module, once declared.
    pub addr: Option<ValueId>,
    pub local: bool,
}

/// Items this unit defines, beyond functions and globals.
#[derive(Clone, Debug, Default)]
pub struct Exports {
    pub modules: Vec<ModulePath>,
    pub structs: Vec<QualifiedName>,
    pub generics: Vec<QualifiedName>,
}

pub struct CompilationContext {
    pub symbols: SymbolTable,
    pub registry: TypeRegistry,
    pub resolver: ModuleResolver,
    pub generics: GenericTable,
    pub functions: FxHashMap<QualifiedName, FunctionEntry>,
    pub globals: FxHashMap<QualifiedName, GlobalEntry>,
    pub diagnostics: DiagnosticQueue,
    pub exports: Exports,
    /// Linkage name → function, for generic dispatch targets.
    symbol_names: FxHashMap<String, QualifiedName>,
}

impl CompilationContext {
    /// Context for `file`, a unit of the package rooted at `package`.
    pub fn new(file: impl Into<String>, package: ModulePath) -> Self {
        Self::with_config(file, package, DiagnosticConfig::default())
    }

    pub fn with_config(
        file: impl Into<String>,
        package: ModulePath,
        config: DiagnosticConfig,
    ) -> Self {
        CompilationContext {
            symbols: SymbolTable::new(),
            registry: TypeRegistry::new(),
            resolver: ModuleResolver::new(package),
            generics: GenericTable::new(),
            functions: FxHashMap::default(),
            globals: FxHashMap::default(),
            diagnostics: DiagnosticQueue::with_config(file, config),
            exports: Exports::default(),
            symbol_names: FxHashMap::default(),
        }
    }

    pub fn file(&self) -> &str {
        self.diagnostics.file()
    }

    /// Record that `symbol` is the linkage name of `name`.
    pub fn record_symbol(&mut self, symbol: &str, name: &QualifiedName) {
        self.symbol_names.insert(symbol.to_owned(), name.clone());
    }

    /// Function behind a linkage name.
    pub fn function_by_symbol(&self, symbol: &str) -> Option<&QualifiedName> {
        self.symbol_names.get(symbol)
    }

    /// Load the exports of a compiled dependency.
    ///
    /// Re-importing the same interface (a diamond in the import graph) is a
    /// no-op; conflicting definitions are errors.
    pub fn import_interface(&mut self, interface: &ModuleInterface) -> CompileResult<()> {
        let pos = Position::START;
        debug!(module = %interface.module, "import interface");
        self.resolver.add_known(interface.module.clone());
        for module in &interface.modules {
            self.resolver.add_known(module.clone());
        }
        for def in &interface.structs {
            self.registry
                .import_struct(def.clone())
                .map_err(|e| e.at(pos))?;
        }
        for f in &interface.functions {
            match self.functions.get(&f.name) {
                Some(existing) if existing.sig != f.sig => {
                    return Err(CompileError::type_error(
                        pos,
                        format!(
                            "conflicting declarations of `{}`: `{}` and `{}`",
                            f.name, existing.sig, f.sig
                        ),
                    ));
                }
                Some(_) => {}
                None => {
                    self.functions.insert(
                        f.name.clone(),
                        FunctionEntry {
                            sig: f.sig.clone(),
                            symbol: f.symbol.clone(),
                            id: None,
                            defined: true,
                            local: false,
                        },
                    );
                }
            }
            self.record_symbol(&f.symbol, &f.name);
        }
        for g in &interface.globals {
            self.globals.entry(g.name.clone()).or_insert_with(|| GlobalEntry {
                ty: g.ty.clone(),
                symbol: g.symbol.clone(),
                addr: None,
                local: false,
            });
        }
        for def in &interface.generics {
            self.generics
                .import(def.clone())
                .map_err(|e| e.at(pos))?;
        }
        Ok(())
    }

    /// Everything this unit defined, as seen by importers of `module`.
    pub fn interface(&self, module: ModulePath) -> ModuleInterface {
        let mut functions: Vec<ExportedFunction> = self
            .functions
            .iter()
            .filter(|(_, f)| f.local)
            .map(|(name, f)| ExportedFunction {
                name: name.clone(),
                symbol: f.symbol.clone(),
                sig: f.sig.clone(),
            })
            .collect();
        functions.sort_by(|a, b| a.name.cmp(&b.name));

        let mut globals: Vec<ExportedGlobal> = self
            .globals
            .iter()
            .filter(|(_, g)| g.local)
            .map(|(name, g)| ExportedGlobal {
                name: name.clone(),
                symbol: g.symbol.clone(),
                ty: g.ty.clone(),
            })
            .collect();
        globals.sort_by(|a, b| a.name.cmp(&b.name));

        let structs = self
            .exports
            .structs
            .iter()
            .filter_map(|name| self.registry.struct_def(name).cloned())
            .collect();
        let generics = self
            .exports
            .generics
            .iter()
            .filter_map(|name| self.generics.get(name).cloned())
            .collect();

        ModuleInterface {
            module,
            modules: self.exports.modules.clone(),
            functions,
            globals,
            structs,
            generics,
        }
    }
}

#[cfg(test)]
mod tests;
