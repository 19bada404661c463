//! Control flow, declarations of locals, and assignments.

use smallvec::SmallVec;
use vex_diagnostic::{CompileError, CompileResult};
use vex_ir::{BinaryOp, IfLink, LoopCtrl, Node, NodeKind, TokenKind, UnaryOp};

use crate::Parser;

impl Parser<'_, '_> {
    /// Condition after `if`, `elif` or `while`. A body brace in its place,
    /// or an empty `[]`, means the condition is missing.
    pub(crate) fn condition(&mut self, keyword: &str) -> CompileResult<Node> {
        let missing =
            |pos| CompileError::syntax(pos, format!("missing condition after `{keyword}`"));
        if self.check(TokenKind::LBrace) {
            return Err(missing(self.pos()));
        }
        let cond = self.parse_expr()?;
        if matches!(&cond.kind, NodeKind::ArrayInit(items) if items.is_empty()) {
            return Err(missing(cond.token.pos()));
        }
        Ok(cond)
    }

    /// `if c { } elif d { } else { }` as a statement.
    pub(crate) fn if_statement(&mut self) -> CompileResult<Node> {
        let kw = self.bump();
        let chain = self.if_chain("if", false)?;
        Ok(Node::new(
            NodeKind::If {
                chain: Box::new(chain),
                is_expr: false,
            },
            kw,
        ))
    }

    /// The chain after `if`/`elif` has been consumed: `cond body [next]`.
    ///
    /// With `as_value` the arms are block expressions and the chain must
    /// end in `else`.
    pub(crate) fn if_chain(&mut self, keyword: &str, as_value: bool) -> CompileResult<IfLink> {
        let cond = self.condition(keyword)?;
        let arm = self.arm(as_value)?;
        let next = if self.eat(TokenKind::Elif) {
            self.if_chain("elif", as_value)?
        } else if self.eat(TokenKind::Else) {
            IfLink::Else(Box::new(self.arm(as_value)?))
        } else if as_value {
            return Err(CompileError::syntax(
                self.pos(),
                "`if` used as a value needs an `else` arm",
            ));
        } else {
            IfLink::Fi
        };
        Ok(IfLink::Arm {
            cond: Box::new(cond),
            body: Box::new(arm),
            next: Box::new(next),
        })
    }

    fn arm(&mut self, as_value: bool) -> CompileResult<Node> {
        if as_value {
            self.block_expr()
        } else {
            self.block()
        }
    }

    /// `while cond { body }`
    pub(crate) fn while_loop(&mut self) -> CompileResult<Node> {
        let kw = self.bump();
        let cond = self.condition("while")?;
        let body = self.block()?;
        Ok(Node::new(
            NodeKind::While {
                cond: Box::new(cond),
                body: Box::new(body),
            },
            kw,
        ))
    }

    /// `for init; cond; step { body }`; each header part may be empty.
    pub(crate) fn for_loop(&mut self) -> CompileResult<Node> {
        let kw = self.bump();
        let init = if self.check(TokenKind::Semi) {
            Node::none(self.current().clone())
        } else {
            self.assignment_or_expr()?
        };
        self.expect(TokenKind::Semi)?;
        let cond = if self.check(TokenKind::Semi) {
            Node::none(self.current().clone())
        } else {
            self.parse_expr()?
        };
        self.expect(TokenKind::Semi)?;
        let step = if self.check(TokenKind::LBrace) {
            Node::none(self.current().clone())
        } else {
            self.assignment_or_expr()?
        };
        let body = self.block()?;
        Ok(Node::new(
            NodeKind::For {
                init: Box::new(init),
                cond: Box::new(cond),
                step: Box::new(step),
                body: Box::new(body),
            },
            kw,
        ))
    }

    /// `break;` or `continue;`
    pub(crate) fn loop_control(&mut self) -> CompileResult<Node> {
        let kw = self.bump();
        let ctrl = if kw.is(TokenKind::Break) {
            LoopCtrl::Break
        } else {
            LoopCtrl::Continue
        };
        self.end_statement(kw.pos())?;
        Ok(Node::new(NodeKind::LoopCtrl(ctrl), kw))
    }

    /// `return;` or `return expr;`
    pub(crate) fn return_statement(&mut self) -> CompileResult<Node> {
        let kw = self.bump();
        let value = if self.check(TokenKind::Semi) {
            None
        } else {
            Some(Box::new(self.parse_expr()?))
        };
        self.end_statement(kw.pos())?;
        Ok(Node::new(NodeKind::Return(value), kw))
    }

    /// Declaration, assignment or expression, then `;`.
    pub(crate) fn simple_statement(&mut self) -> CompileResult<Node> {
        let start = self.pos();
        let node = self.assignment_or_expr()?;
        self.end_statement(start)?;
        Ok(node)
    }

    /// `name: type [= value]`, `target [op]= value`, or a bare expression.
    pub(crate) fn assignment_or_expr(&mut self) -> CompileResult<Node> {
        if self.check(TokenKind::Ident)
            && self.current().module_path.is_empty()
            && self.cursor.peek_kind() == TokenKind::Colon
        {
            return self.declaration();
        }

        let target = self.parse_expr()?;
        if self.check(TokenKind::Eq) {
            let eq = self.bump();
            check_assignable(&target)?;
            let value = self.parse_expr()?;
            return Ok(Node::new(
                NodeKind::Assign {
                    target: Box::new(target),
                    declared: None,
                    value: Some(Box::new(value)),
                },
                eq,
            ));
        }
        if let Some(op) = BinaryOp::from_compound_assign(self.cursor.kind()) {
            let tok = self.bump();
            check_assignable(&target)?;
            let rhs = self.parse_expr()?;
            // `a op= b` becomes `a = a op b`, marked by the operator token;
            // lowering evaluates the target once.
            let value = Node::new(
                NodeKind::BinOp {
                    op,
                    lhs: Box::new(target.clone()),
                    rhs: Box::new(rhs),
                },
                tok.clone(),
            );
            return Ok(Node::new(
                NodeKind::Assign {
                    target: Box::new(target),
                    declared: None,
                    value: Some(Box::new(value)),
                },
                tok,
            ));
        }
        Ok(target)
    }

    /// `name: type [= value]`
    fn declaration(&mut self) -> CompileResult<Node> {
        let name_tok = self.bump();
        let colon = self.bump();
        let name = name_tok.ident().unwrap_or_default().to_owned();
        let ty = self.parse_type()?;
        let value = if self.eat(TokenKind::Eq) {
            Some(Box::new(self.parse_expr()?))
        } else {
            None
        };
        let target = Node::new(
            NodeKind::Variable {
                module: Vec::new(),
                name,
                offsets: SmallVec::new(),
            },
            name_tok,
        );
        Ok(Node::new(
            NodeKind::Assign {
                target: Box::new(target),
                declared: Some(ty),
                value,
            },
            colon,
        ))
    }
}

/// Only variables (with any offset chain) and dereferences can be stored to.
fn check_assignable(target: &Node) -> CompileResult<()> {
    match &target.kind {
        NodeKind::Variable { .. }
        | NodeKind::UnaryOp {
            op: UnaryOp::Deref,
            ..
        } => Ok(()),
        _ => Err(CompileError::syntax(
            target.token.pos(),
            format!("cannot assign to `{target}`"),
        )),
    }
}
