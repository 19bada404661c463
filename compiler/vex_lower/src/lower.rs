//! AST to SSA lowering.
//!
//! `Lowerer` walks a parsed unit, consulting the [`CompilationContext`]
//! for bindings, names and storage decisions, and drives a [`Backend`].
//!
//! # Architecture
//!
//! ```text
//! Lowerer
//!   ├── operand.rs      constants, literal materialization, conversions
//!   ├── items.rs        module, import, struct, global, generic, fn
//!   ├── place.rs        variables, offsets, method calls, addresses
//!   ├── store.rs        declarations and assignments via the storage engine
//!   ├── operators.rs    binary, unary, cast, sizeof
//!   ├── literals.rs     numbers, strings, struct and array literals
//!   ├── calls.rs        calls, generic dispatch, arguments
//!   └── control_flow.rs if, while, for, break/continue, return, blocks
//! ```
//!
//! # Recovery
//!
//! Statement lists are the only place errors are caught: a failed
//! statement is reported and the next one is lowered. Everything below a
//! statement returns `Err`.

mod calls;
mod control_flow;
mod items;
mod literals;
mod operand;
mod operators;
mod place;
mod store;

use tracing::{debug, trace};
use vex_diagnostic::{CompileError, CompileResult, ErrorGuaranteed};
use vex_ir::{BlockId, FunctionId, Node, NodeKind, Position, QualifiedName, Type};
use vex_stack::ensure_sufficient_stack;

use crate::backend::Backend;
use crate::context::CompilationContext;

pub(crate) use operand::Operand;

/// The function whose body is being lowered.
pub(crate) struct FunctionState {
    pub id: FunctionId,
    pub name: QualifiedName,
    pub ret: Type,
    /// Set while the most recently lowered statement of the body failed.
    pub tail_error: Option<ErrorGuaranteed>,
}

pub struct Lowerer<'a, B: Backend> {
    pub(crate) ctx: &'a mut CompilationContext,
    pub(crate) backend: &'a mut B,
    pub(crate) function: Option<FunctionState>,
    /// `break` count per enclosing loop, innermost last.
    pub(crate) loops: Vec<u32>,
}

impl<'a, B: Backend> Lowerer<'a, B> {
    pub fn new(ctx: &'a mut CompilationContext, backend: &'a mut B) -> Self {
        Lowerer {
            ctx,
            backend,
            function: None,
            loops: Vec::new(),
        }
    }

    /// Lower a parsed unit (a `Compound` of top-level statements).
    pub fn lower_unit(&mut self, unit: &Node) {
        debug!(file = self.ctx.file(), "lower unit");
        let NodeKind::Compound(items) = &unit.kind else {
            self.report(CompileError::logic(
                unit.token.pos(),
                "expected a list of top-level statements",
            ));
            return;
        };
        for item in items {
            if let Err(err) = self.lower_item(item) {
                self.report(err);
            }
        }
    }

    pub(crate) fn report(&mut self, err: CompileError) -> ErrorGuaranteed {
        trace!(%err, "lowering error");
        self.ctx.diagnostics.emit_error(err)
    }

    pub(crate) fn warn(&mut self, pos: Position, message: impl Into<String>) {
        self.ctx.diagnostics.warn(pos, message);
    }

    // -----------------------------------------------------------------------
    // Scopes and blocks
    // -----------------------------------------------------------------------

    /// Run `f` in a fresh scope; the scope is popped on every path.
    pub(crate) fn scoped<R>(&mut self, block: BlockId, f: impl FnOnce(&mut Self) -> R) -> R {
        self.ctx.symbols.push(block);
        let result = f(self);
        self.ctx.symbols.pop();
        result
    }

    /// Like [`scoped`](Self::scoped), for a loop body.
    pub(crate) fn loop_scoped(
        &mut self,
        body: BlockId,
        exit: BlockId,
        entry: BlockId,
        f: impl FnOnce(&mut Self),
    ) -> u32 {
        self.ctx.symbols.push_loop(body, exit, entry);
        self.loops.push(0);
        f(self);
        self.ctx.symbols.pop();
        self.loops.pop().unwrap_or(0)
    }

    /// The function being lowered; executable code needs one.
    pub(crate) fn current_function(&self, pos: Position) -> CompileResult<FunctionId> {
        self.function
            .as_ref()
            .map(|f| f.id)
            .ok_or_else(|| CompileError::logic(pos, "executable statement outside a function"))
    }

    pub(crate) fn block_here(&self) -> BlockId {
        self.backend.current_block().unwrap_or(BlockId::NONE)
    }

    /// Whether the current block already ends in a terminator.
    pub(crate) fn terminated(&self) -> bool {
        self.backend
            .current_block()
            .is_some_and(|b| self.backend.has_terminator(b))
    }

    pub(crate) fn append_block(&mut self, pos: Position, name: &str) -> CompileResult<BlockId> {
        let func = self.current_function(pos)?;
        Ok(self.backend.append_block(func, name))
    }

    // -----------------------------------------------------------------------
    // Statements
    // -----------------------------------------------------------------------

    /// Lower a statement list in the current scope. Each failing statement
    /// is reported on its own; code after a terminator is reported once and
    /// skipped.
    pub(crate) fn lower_statements(&mut self, stmts: &[Node]) {
        for stmt in stmts {
            if stmt.is_none() {
                continue;
            }
            if self.terminated() {
                self.warn(stmt.token.pos(), "unreachable code");
                break;
            }
            let failed = self.lower_stmt(stmt).err().map(|err| self.report(err));
            if let Some(function) = self.function.as_mut() {
                function.tail_error = failed;
            }
        }
    }

    /// A top-level item.
    fn lower_item(&mut self, node: &Node) -> CompileResult<()> {
        let pos = node.token.pos();
        match &node.kind {
            NodeKind::ModuleDecl(path) => {
                self.lower_module_decl(path, pos);
                Ok(())
            }
            NodeKind::Import { path, rename } => self.lower_import(path, rename.as_deref(), pos),
            NodeKind::StructDecl(decl) => {
                self.lower_struct_decl(decl);
                Ok(())
            }
            NodeKind::Global { name, ty, value } => {
                self.lower_global(name, ty, value.as_deref(), pos)
            }
            NodeKind::Generic(decl) => self.lower_generic(decl, pos),
            NodeKind::FunctionDecl(decl) => self.lower_function(decl, pos),
            NodeKind::NoneAst => Ok(()),
            NodeKind::Return(_) | NodeKind::LoopCtrl(_) => self.lower_stmt(node),
            _ => Err(CompileError::logic(
                pos,
                "executable statement outside a function",
            )),
        }
    }

    /// A statement inside a function body.
    pub(crate) fn lower_stmt(&mut self, node: &Node) -> CompileResult<()> {
        ensure_sufficient_stack(|| self.lower_stmt_inner(node))
    }

    fn lower_stmt_inner(&mut self, node: &Node) -> CompileResult<()> {
        let pos = node.token.pos();
        match &node.kind {
            NodeKind::Compound(stmts) => {
                let block = self.block_here();
                self.scoped(block, |this| this.lower_statements(stmts));
                Ok(())
            }
            NodeKind::Assign {
                target,
                declared,
                value,
            } => self.lower_assign(target, declared.as_ref(), value.as_deref(), pos),
            NodeKind::If {
                chain,
                is_expr: false,
            } => self.lower_if(chain, pos),
            NodeKind::While { cond, body } => self.lower_while(cond, body, pos),
            NodeKind::For {
                init,
                cond,
                step,
                body,
            } => self.lower_for(init, cond, step, body, pos),
            NodeKind::LoopCtrl(ctrl) => self.lower_loop_ctrl(*ctrl, pos),
            NodeKind::Return(value) => self.lower_return(value.as_deref(), pos),
            NodeKind::NoneAst => Ok(()),
            NodeKind::ModuleDecl(_) | NodeKind::Import { .. } | NodeKind::StructDecl(_) => {
                Err(CompileError::logic(
                    pos,
                    "module, import and struct declarations are only allowed at module level",
                ))
            }
            NodeKind::Global { name, .. } => Err(CompileError::logic(
                pos,
                format!("global `{name}` must be declared at module level"),
            )),
            NodeKind::Generic(decl) => Err(CompileError::logic(
                pos,
                format!("generic `{}` must be declared at module level", decl.name),
            )),
            NodeKind::FunctionDecl(decl) => Err(CompileError::logic(
                pos,
                format!("function `{}` cannot be defined inside another function", decl.name),
            )),
            NodeKind::Param { .. } => Err(CompileError::syntax(pos, "unexpected parameter")),
            _ => {
                self.current_function(pos)?;
                self.lower_expr(node).map(drop)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Expressions
    // -----------------------------------------------------------------------

    pub(crate) fn lower_expr(&mut self, node: &Node) -> CompileResult<Operand> {
        self.lower_expr_expecting(node, None)
    }

    /// Lower an expression whose destination type is known; array and
    /// struct literals use it to pick their element types.
    pub(crate) fn lower_expr_expecting(
        &mut self,
        node: &Node,
        expected: Option<&Type>,
    ) -> CompileResult<Operand> {
        ensure_sufficient_stack(|| self.lower_expr_inner(node, expected))
    }

    fn lower_expr_inner(&mut self, node: &Node, expected: Option<&Type>) -> CompileResult<Operand> {
        let pos = node.token.pos();
        match &node.kind {
            NodeKind::Num(value) => Ok(self.number(*value)),
            NodeKind::Boolean(value) => Ok(self.boolean(*value)),
            NodeKind::Str(text) => Ok(self.string(text)),
            NodeKind::BinOp { op, lhs, rhs } => self.lower_binop(*op, lhs, rhs, pos),
            NodeKind::UnaryOp { op, operand } => self.lower_unary(*op, operand, pos),
            NodeKind::TypeTrans { expr, target } => self.lower_cast(expr, target, pos),
            NodeKind::Sizeof(arg) => self.lower_sizeof(arg, pos),
            NodeKind::Variable {
                module,
                name,
                offsets,
            } => self.read_variable(module, name, offsets, pos),
            NodeKind::FunctionCall { module, name, args } => {
                self.lower_call(module, name, args, pos)
            }
            NodeKind::Object { module, name, args } => {
                self.lower_object(module, name, args, pos)
            }
            NodeKind::ArrayInit(elems) => self.lower_array(elems, expected, pos),
            NodeKind::BlockExpr { stmts, value } => self.lower_block_expr(stmts, value, expected),
            NodeKind::If {
                chain,
                is_expr: true,
            } => self.lower_if_expr(chain, expected, pos),
            _ => Err(CompileError::syntax(
                pos,
                format!("`{node}` is not an expression"),
            )),
        }
    }
}

#[cfg(test)]
mod tests;
