//! Control flow: `if` chains, loops, `break`/`continue`, `return` and
//! block expressions.

use vex_diagnostic::{CompileError, CompileResult};
use vex_ir::{BlockId, IfLink, LoopCtrl, Node, NodeKind, Position, Scalar, Type, ValueId};
use vex_types::{common_scalar, ConvertMode};

use super::operand::constant_fits;
use super::{Lowerer, Operand};
use crate::backend::Backend;

impl<B: Backend> Lowerer<'_, B> {
    /// A block body in its own scope; an arm, loop body or nested block.
    fn lower_nested(&mut self, body: &Node) {
        let block = self.block_here();
        self.scoped(block, |this| match &body.kind {
            NodeKind::Compound(stmts) => this.lower_statements(stmts),
            _ => this.lower_statements(std::slice::from_ref(body)),
        });
    }

    /// Branch to `dest` unless the block already ended. Returns whether
    /// the branch was emitted.
    fn fall_through(&mut self, dest: BlockId) -> bool {
        if self.terminated() {
            return false;
        }
        self.backend.br(dest);
        true
    }

    // -----------------------------------------------------------------------
    // If / elif / else
    // -----------------------------------------------------------------------

    pub(crate) fn lower_if(&mut self, chain: &IfLink, pos: Position) -> CompileResult<()> {
        let end = self.append_block(pos, "if.end")?;
        let reached = self.if_link(chain, end, pos)?;
        self.backend.position_at_end(end);
        if !reached {
            self.backend.unreachable();
        }
        Ok(())
    }

    /// Lower one link; returns whether any path reached `end`.
    fn if_link(&mut self, link: &IfLink, end: BlockId, pos: Position) -> CompileResult<bool> {
        match link {
            IfLink::Fi => Ok(self.fall_through(end)),
            IfLink::Else(body) => {
                self.lower_nested(body);
                Ok(self.fall_through(end))
            }
            IfLink::Arm { cond, body, next } => {
                let c = self.condition(cond)?;
                let then_block = self.append_block(pos, "if.then")?;
                let else_block = self.append_block(pos, "if.else")?;
                self.backend.cond_br(c.id, then_block, else_block);

                self.backend.position_at_end(then_block);
                self.lower_nested(body);
                let from_then = self.fall_through(end);

                self.backend.position_at_end(else_block);
                let from_else = self.if_link(next, end, pos)?;
                Ok(from_then || from_else)
            }
        }
    }

    /// `if` used as a value: each arm's value merges in a phi.
    pub(crate) fn lower_if_expr(
        &mut self,
        chain: &IfLink,
        expected: Option<&Type>,
        pos: Position,
    ) -> CompileResult<Operand> {
        let end = self.append_block(pos, "if.value")?;
        let mut incoming = Vec::new();
        self.if_value_link(chain, end, expected, &mut incoming, pos)?;
        self.backend.position_at_end(end);
        self.merge(incoming, pos)
    }

    fn if_value_link(
        &mut self,
        link: &IfLink,
        end: BlockId,
        expected: Option<&Type>,
        incoming: &mut Vec<(Operand, BlockId)>,
        pos: Position,
    ) -> CompileResult<()> {
        match link {
            IfLink::Fi => Err(CompileError::logic(
                pos,
                "`if` used as a value needs an `else` arm",
            )),
            IfLink::Else(body) => self.arm_value(body, end, expected, incoming),
            IfLink::Arm { cond, body, next } => {
                let c = self.condition(cond)?;
                let then_block = self.append_block(pos, "if.then")?;
                let else_block = self.append_block(pos, "if.else")?;
                self.backend.cond_br(c.id, then_block, else_block);
                self.backend.position_at_end(then_block);
                self.arm_value(body, end, expected, incoming)?;
                self.backend.position_at_end(else_block);
                self.if_value_link(next, end, expected, incoming, pos)
            }
        }
    }

    fn arm_value(
        &mut self,
        body: &Node,
        end: BlockId,
        expected: Option<&Type>,
        incoming: &mut Vec<(Operand, BlockId)>,
    ) -> CompileResult<()> {
        let value = self.lower_expr_expecting(body, expected)?;
        if !self.terminated() {
            incoming.push((value, self.block_here()));
            self.backend.br(end);
        }
        Ok(())
    }

    /// Join arm values. Untyped literal arms adopt the other arms' type;
    /// any other disagreement is ambiguous.
    fn merge(&mut self, incoming: Vec<(Operand, BlockId)>, pos: Position) -> CompileResult<Operand> {
        if incoming.is_empty() {
            self.backend.unreachable();
            return Ok(Operand::void());
        }
        let typed = incoming.iter().find(|(v, _)| !v.literal).map(|(v, _)| v.ty.clone());
        let ty = match typed {
            Some(ty) => ty,
            None => {
                let widest = incoming
                    .iter()
                    .filter_map(|(v, _)| v.ty.as_scalar())
                    .reduce(common_scalar)
                    .unwrap_or(Scalar::I32);
                Type::Scalar(widest)
            }
        };
        if ty.is_void() {
            if incoming.iter().all(|(v, _)| v.ty.is_void()) {
                return Ok(Operand::void());
            }
            return Err(ambiguous(&incoming, pos));
        }

        let mut pairs: Vec<(ValueId, BlockId)> = Vec::with_capacity(incoming.len());
        for (value, block) in &incoming {
            let value = match (value.literal, value.konst, ty.as_scalar()) {
                (true, Some(c), Some(s)) if constant_fits(c, s) => {
                    self.coerce(value.clone(), &ty, ConvertMode::Implicit, pos)?
                }
                _ => value.clone(),
            };
            if value.ty != ty {
                return Err(ambiguous(&incoming, pos));
            }
            pairs.push((value.id, *block));
        }
        let id = self.backend.phi(&ty, &pairs);
        Ok(Operand::value(id, ty))
    }

    /// `{ stmts; value }` in expression position.
    pub(crate) fn lower_block_expr(
        &mut self,
        stmts: &[Node],
        value: &Node,
        expected: Option<&Type>,
    ) -> CompileResult<Operand> {
        let block = self.block_here();
        self.scoped(block, |this| {
            this.lower_statements(stmts);
            if value.is_none() || this.terminated() {
                return Ok(Operand::void());
            }
            this.lower_expr_expecting(value, expected)
        })
    }

    // -----------------------------------------------------------------------
    // Loops
    // -----------------------------------------------------------------------

    pub(crate) fn lower_while(&mut self, cond: &Node, body: &Node, pos: Position) -> CompileResult<()> {
        let cond_block = self.append_block(pos, "while.cond")?;
        let body_block = self.append_block(pos, "while.body")?;
        let exit = self.append_block(pos, "while.end")?;
        self.backend.br(cond_block);

        self.backend.position_at_end(cond_block);
        let c = self.lower_expr(cond)?;
        let c = self.to_bool(c, cond.token.pos())?;
        if c.is_true() == Some(false) {
            self.warn(cond.token.pos(), "condition is always false");
        }
        self.backend.cond_br(c.id, body_block, exit);

        self.backend.position_at_end(body_block);
        let breaks = self.loop_scoped(body_block, exit, cond_block, |this| this.lower_nested(body));
        self.fall_through(cond_block);

        self.backend.position_at_end(exit);
        if c.is_true() == Some(true) && breaks == 0 {
            self.warn(pos, "possible infinite loop");
        }
        Ok(())
    }

    pub(crate) fn lower_for(
        &mut self,
        init: &Node,
        cond: &Node,
        step: &Node,
        body: &Node,
        pos: Position,
    ) -> CompileResult<()> {
        let block = self.block_here();
        self.scoped(block, |this| {
            if !init.is_none() {
                this.lower_stmt(init)?;
            }
            let cond_block = this.append_block(pos, "for.cond")?;
            let body_block = this.append_block(pos, "for.body")?;
            let step_block = this.append_block(pos, "for.step")?;
            let exit = this.append_block(pos, "for.end")?;
            this.backend.br(cond_block);

            this.backend.position_at_end(cond_block);
            let forever = if cond.is_none() {
                this.backend.br(body_block);
                true
            } else {
                let c = this.condition(cond)?;
                this.backend.cond_br(c.id, body_block, exit);
                c.is_true() == Some(true)
            };

            this.backend.position_at_end(body_block);
            let breaks =
                this.loop_scoped(body_block, exit, step_block, |inner| inner.lower_nested(body));
            this.fall_through(step_block);

            this.backend.position_at_end(step_block);
            if !step.is_none() {
                this.lower_stmt(step)?;
            }
            this.backend.br(cond_block);

            this.backend.position_at_end(exit);
            if forever && breaks == 0 {
                this.warn(pos, "possible infinite loop");
            }
            Ok(())
        })
    }

    pub(crate) fn lower_loop_ctrl(&mut self, ctrl: LoopCtrl, pos: Position) -> CompileResult<()> {
        let keyword = match ctrl {
            LoopCtrl::Break => "break",
            LoopCtrl::Continue => "continue",
        };
        let Some((exit, entry)) = self.ctx.symbols.loop_targets() else {
            return Err(CompileError::logic(
                pos,
                format!("`{keyword}` outside of a loop"),
            ));
        };
        match ctrl {
            LoopCtrl::Break => {
                if let Some(count) = self.loops.last_mut() {
                    *count += 1;
                }
                self.backend.br(exit);
            }
            LoopCtrl::Continue => self.backend.br(entry),
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Return
    // -----------------------------------------------------------------------

    pub(crate) fn lower_return(&mut self, value: Option<&Node>, pos: Position) -> CompileResult<()> {
        let Some(function) = self.function.as_ref() else {
            return Err(CompileError::logic(pos, "`return` outside of a function"));
        };
        let ret = function.ret.clone();
        let name = function.name.clone();
        match value {
            None if ret.is_void() => {
                self.backend.ret(None);
                Ok(())
            }
            None => Err(CompileError::type_error(
                pos,
                format!("function `{name}` must return a value of type `{ret}`"),
            )),
            Some(node) if ret.is_void() => Err(CompileError::type_error(
                node.token.pos(),
                format!("function `{name}` returns `void` and cannot return a value"),
            )),
            Some(node) => {
                let v = self.lower_expr_expecting(node, Some(&ret))?;
                let v = self.coerce(v, &ret, ConvertMode::Implicit, node.token.pos())?;
                self.backend.ret(Some(v.id));
                Ok(())
            }
        }
    }
}

fn ambiguous(incoming: &[(Operand, BlockId)], pos: Position) -> CompileError {
    let types: Vec<String> = incoming.iter().map(|(v, _)| format!("`{}`", v.ty)).collect();
    CompileError::logic(
        pos,
        format!("ambiguous phi merge: arms have types {}", types.join(", ")),
    )
}
