//! Top-level items.

use std::collections::BTreeMap;

use tracing::debug;
use vex_diagnostic::{CompileError, CompileResult};
use vex_ir::{
    FnSig, FunctionDecl, FunctionId, GenericDecl, ModulePath, Node, NodeKind, Position, QualifiedName,
    StructDecl, Type,
};
use vex_resolve::{mangle, BindingFlags, GenericDef};
use vex_types::{ConvertMode, StoreSite};

use super::{FunctionState, Lowerer, Operand};
use crate::backend::Backend;
use crate::context::{FunctionEntry, GlobalEntry};

/// Functions that keep their bare name in every module.
const ENTRY_POINT: &str = "main";

impl<B: Backend> Lowerer<'_, B> {
    fn qualify(&self, name: &str) -> QualifiedName {
        QualifiedName::new(self.ctx.resolver.current().clone(), name)
    }

    // -----------------------------------------------------------------------
    // Modules and imports
    // -----------------------------------------------------------------------

    pub(crate) fn lower_module_decl(&mut self, path: &[String], pos: Position) {
        let path = ModulePath::from(path);
        if self.ctx.resolver.set_current(path.clone()) {
            if !self.ctx.exports.modules.contains(&path) {
                self.ctx.exports.modules.push(path);
            }
        } else {
            self.warn(pos, format!("redundant module declaration `{path}`"));
        }
    }

    pub(crate) fn lower_import(
        &mut self,
        path: &[String],
        rename: Option<&str>,
        pos: Position,
    ) -> CompileResult<()> {
        self.ctx
            .resolver
            .resolve_import(path, rename)
            .map(drop)
            .map_err(|e| e.at(pos))
    }

    /// The parser registered the layout; record the struct as an export.
    pub(crate) fn lower_struct_decl(&mut self, decl: &StructDecl) {
        let name = self.qualify(&decl.name);
        if self.ctx.registry.is_struct(&name) && !self.ctx.exports.structs.contains(&name) {
            self.ctx.exports.structs.push(name);
        }
    }

    // -----------------------------------------------------------------------
    // Globals
    // -----------------------------------------------------------------------

    pub(crate) fn lower_global(
        &mut self,
        name: &str,
        ty: &Type,
        value: Option<&Node>,
        pos: Position,
    ) -> CompileResult<()> {
        let qualified = self.qualify(name);
        if self.ctx.globals.contains_key(&qualified) {
            return Err(CompileError::logic(
                pos,
                format!("global `{qualified}` is already defined"),
            ));
        }
        self.ctx.registry.register(ty).map_err(|e| e.at(pos))?;
        if ty.is_void() {
            return Err(CompileError::type_error(
                pos,
                format!("global `{name}` cannot have type `void`"),
            ));
        }
        let init = match value {
            Some(node) => {
                let op = self.lower_expr(node)?;
                let op = self.coerce(op, ty, ConvertMode::Implicit, node.token.pos())?;
                let konst = op.konst.ok_or_else(|| {
                    CompileError::type_error(
                        node.token.pos(),
                        format!("initializer of global `{name}` must be a numeric constant"),
                    )
                })?;
                Some(konst)
            }
            None => None,
        };
        let symbol = mangle(&qualified);
        let addr = self.backend.global(&symbol, ty, init, false);
        debug!(global = %qualified, %symbol, "define global");
        self.ctx.globals.insert(
            qualified,
            GlobalEntry {
                ty: ty.clone(),
                symbol,
                addr: Some(addr),
                local: true,
            },
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Generics
    // -----------------------------------------------------------------------

    /// Linkage name of the function a generic entry names.
    fn generic_target(&self, target: &QualifiedName, pos: Position) -> CompileResult<String> {
        self.ctx
            .resolver
            .candidates(target.module.segments(), &target.name)
            .iter()
            .find_map(|c| self.ctx.functions.get(c))
            .map(|entry| entry.symbol.clone())
            .ok_or_else(|| CompileError::missing(pos, format!("undefined function `{target}`")))
    }

    pub(crate) fn lower_generic(&mut self, decl: &GenericDecl, pos: Position) -> CompileResult<()> {
        let name = self.qualify(&decl.name);
        let mut targets = BTreeMap::new();
        for (ty, target) in &decl.entries {
            let symbol = self.generic_target(target, pos)?;
            let key = self.ctx.registry.display_name(ty);
            if targets.insert(key.clone(), symbol).is_some() {
                return Err(CompileError::logic(
                    pos,
                    format!("generic `{name}` has two implementations for `{key}`"),
                ));
            }
        }
        let default = decl
            .default
            .as_ref()
            .map(|target| self.generic_target(target, pos))
            .transpose()?;
        self.ctx
            .generics
            .define(GenericDef {
                name: name.clone(),
                index: decl.index,
                targets,
                default,
            })
            .map_err(|e| e.at(pos))?;
        self.ctx.exports.generics.push(name);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Functions
    // -----------------------------------------------------------------------

    fn signature(&mut self, decl: &FunctionDecl, pos: Position) -> CompileResult<FnSig> {
        let mut params = Vec::with_capacity(decl.params.len());
        for param in &decl.params {
            let NodeKind::Param { name, ty } = &param.kind else {
                return Err(CompileError::syntax(param.token.pos(), "expected a parameter"));
            };
            let at = param.token.pos();
            self.ctx.registry.register(ty).map_err(|e| e.at(at))?;
            if ty.is_void() {
                return Err(CompileError::type_error(
                    at,
                    format!("parameter `{name}` cannot have type `void`"),
                ));
            }
            params.push(ty.clone());
        }
        self.ctx
            .registry
            .register(&decl.ret)
            .map_err(|e| e.at(pos))?;
        Ok(FnSig {
            params,
            ret: decl.ret.clone(),
            variadic: decl.variadic,
        })
    }

    pub(crate) fn lower_function(&mut self, decl: &FunctionDecl, pos: Position) -> CompileResult<()> {
        let name = self.qualify(&decl.name);
        let sig = self.signature(decl, pos)?;
        // Declarations without a body name C functions.
        let symbol = if decl.body.is_none() || decl.name == ENTRY_POINT {
            decl.name.clone()
        } else {
            mangle(&name)
        };

        let defined_before = match self.ctx.functions.get(&name) {
            Some(entry) if entry.sig != sig => {
                return Err(CompileError::type_error(
                    pos,
                    format!(
                        "conflicting declarations of `{name}`: `{}` and `{sig}`",
                        entry.sig
                    ),
                ));
            }
            Some(entry) if entry.defined && decl.body.is_some() => {
                return Err(CompileError::logic(
                    pos,
                    format!("function `{name}` is already defined"),
                ));
            }
            Some(entry) => entry.defined,
            None => false,
        };

        let symbol = match self.ctx.functions.get(&name) {
            Some(entry) => entry.symbol.clone(),
            None => symbol,
        };
        let id = self.backend.declare_function(&symbol, &sig);
        debug!(function = %name, %symbol, "declare function");
        self.ctx.record_symbol(&symbol, &name);
        self.ctx.functions.insert(
            name.clone(),
            FunctionEntry {
                sig: sig.clone(),
                symbol,
                id: Some(id),
                defined: defined_before || decl.body.is_some(),
                local: true,
            },
        );

        match &decl.body {
            Some(body) => self.lower_body(decl, name, sig, body),
            None => Ok(()),
        }
    }

    fn lower_body(
        &mut self,
        decl: &FunctionDecl,
        name: QualifiedName,
        sig: FnSig,
        body: &Node,
    ) -> CompileResult<()> {
        let Some(id) = self.ctx.functions.get(&name).and_then(|f| f.id) else {
            return Ok(());
        };
        let entry = self.backend.define_function(id);
        self.function = Some(FunctionState {
            id,
            name: name.clone(),
            ret: sig.ret.clone(),
            tail_error: None,
        });

        let result = self.scoped(entry, |this| {
            this.bind_params(decl, &sig, id);
            match &body.kind {
                NodeKind::Compound(stmts) => this.lower_statements(stmts),
                _ => this.lower_statements(std::slice::from_ref(body)),
            }
            this.finish_function(&name, &sig, body.token.pos())
        });
        self.function = None;
        result
    }

    /// Bind each incoming argument to its parameter name.
    fn bind_params(&mut self, decl: &FunctionDecl, sig: &FnSig, id: FunctionId) {
        for (index, (param, ty)) in decl.params.iter().zip(&sig.params).enumerate() {
            let NodeKind::Param { name, .. } = &param.kind else {
                continue;
            };
            let pos = param.token.pos();
            if self.ctx.symbols.is_local(name) {
                self.report(CompileError::logic(
                    pos,
                    format!("duplicate parameter `{name}`"),
                ));
                continue;
            }
            let value = self.backend.param(id, index);
            let op = Operand::value(value, ty.clone());
            match self.bind_new(name, None, op, StoreSite::Param, pos) {
                Ok(()) => {
                    if let Some(binding) = self.ctx.symbols.find_mut(name) {
                        binding.flags |= BindingFlags::PARAMETER;
                    }
                }
                Err(err) => {
                    self.report(err);
                }
            }
        }
    }

    /// Close the body: implicit `ret void`, or a missing-return error unless
    /// the body's last statement already reported one.
    fn finish_function(
        &mut self,
        name: &QualifiedName,
        sig: &FnSig,
        pos: Position,
    ) -> CompileResult<()> {
        if self.terminated() {
            return Ok(());
        }
        if sig.ret.is_void() {
            self.backend.ret(None);
            return Ok(());
        }
        self.backend.unreachable();
        // A body whose last statement failed may have been meant to return.
        if let Some(reported) = self.function.as_ref().and_then(|f| f.tail_error) {
            return Err(reported.at(pos));
        }
        Err(CompileError::logic(
            pos,
            format!("missing return in function `{name}` returning `{}`", sig.ret),
        ))
    }
}
