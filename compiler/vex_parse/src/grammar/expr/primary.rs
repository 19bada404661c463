//! Primary expressions.

use vex_diagnostic::CompileResult;
use vex_ir::{Node, NodeKind, NumValue, SizeofArg, TokenKind, TokenValue, Type};

use crate::grad::derivative;
use crate::recovery::STMT_KEYWORDS;
use crate::Parser;

impl Parser<'_, '_> {
    pub(crate) fn parse_primary(&mut self) -> CompileResult<Node> {
        let tok = self.current().clone();
        match (tok.kind, tok.value.clone()) {
            (TokenKind::Int, TokenValue::Int(v)) => {
                self.bump();
                Ok(Node::new(NodeKind::Num(NumValue::Int(v)), tok))
            }
            (TokenKind::Float, TokenValue::Float(v)) => {
                self.bump();
                Ok(Node::new(NodeKind::Num(NumValue::Float(v)), tok))
            }
            // A character literal is an `i8` constant.
            (TokenKind::Char, TokenValue::Char(c)) => {
                let num = Node::new(NodeKind::Num(NumValue::Int(u128::from(c))), tok.clone());
                self.bump();
                Ok(Node::new(
                    NodeKind::TypeTrans {
                        expr: Box::new(num),
                        target: Type::I8,
                    },
                    tok,
                ))
            }
            (TokenKind::Str, TokenValue::Str(s)) => {
                self.bump();
                Ok(Node::new(NodeKind::Str(s), tok))
            }
            (TokenKind::True | TokenKind::False, _) => {
                self.bump();
                Ok(Node::new(NodeKind::Boolean(tok.is(TokenKind::True)), tok))
            }
            (TokenKind::LParen, _) => {
                self.bump();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            (TokenKind::LBracket, _) => {
                self.bump();
                let items = self.comma_list(TokenKind::RBracket)?;
                Ok(Node::new(NodeKind::ArrayInit(items), tok))
            }
            (TokenKind::LBrace, _) => self.block_expr(),
            (TokenKind::If, _) => {
                self.bump();
                let chain = self.if_chain("if", true)?;
                Ok(Node::new(
                    NodeKind::If {
                        chain: Box::new(chain),
                        is_expr: true,
                    },
                    tok,
                ))
            }
            (TokenKind::Sizeof, _) => self.sizeof(),
            (TokenKind::Grad, _) => self.grad(),
            (TokenKind::Ident, TokenValue::Ident(name)) => {
                let module = tok.module_path.clone();
                if self.cursor.peek_kind() == TokenKind::LParen {
                    self.bump();
                    self.bump();
                    let args = self.comma_list(TokenKind::RParen)?;
                    // Struct literal or call is settled by the registry.
                    let kind = if self.lookup_struct(&module, &name).is_some() {
                        NodeKind::Object { module, name, args }
                    } else {
                        NodeKind::FunctionCall { module, name, args }
                    };
                    return Ok(Node::new(kind, tok));
                }
                self.bump();
                let offsets = self.offsets()?;
                Ok(Node::new(
                    NodeKind::Variable {
                        module,
                        name,
                        offsets,
                    },
                    tok,
                ))
            }
            _ => Err(self.unexpected("an expression")),
        }
    }

    /// `{ statements [value] }` producing a value.
    ///
    /// A trailing expression without `;` is the value; without one the
    /// value is `NoneAst`.
    pub(crate) fn block_expr(&mut self) -> CompileResult<Node> {
        let open = self.expect(TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        let mut value = Node::none(open.clone());
        while !self.check(TokenKind::RBrace) {
            if self.cursor.is_at_end() {
                return Err(self.unexpected("`}`"));
            }
            let kind = self.cursor.kind();
            if STMT_KEYWORDS.contains(kind) || kind == TokenKind::LBrace {
                stmts.push(self.statement()?);
                continue;
            }
            let start = self.pos();
            let node = self.assignment_or_expr()?;
            if self.check(TokenKind::RBrace) && node.is_expression() {
                value = node;
                break;
            }
            self.end_statement(start)?;
            stmts.push(node);
        }
        self.expect(TokenKind::RBrace)?;
        Ok(Node::new(
            NodeKind::BlockExpr {
                stmts,
                value: Box::new(value),
            },
            open,
        ))
    }

    /// `sizeof(type)` or `sizeof(expr)`. A type is tried first.
    fn sizeof(&mut self) -> CompileResult<Node> {
        let kw = self.bump();
        self.expect(TokenKind::LParen)?;
        let snapshot = self.cursor.snapshot();
        let arg = match self.parse_type() {
            Ok(ty) if self.check(TokenKind::RParen) => SizeofArg::Type(ty),
            _ => {
                self.cursor.restore(snapshot);
                SizeofArg::Expr(Box::new(self.parse_expr()?))
            }
        };
        self.expect(TokenKind::RParen)?;
        Ok(Node::new(NodeKind::Sizeof(arg), kw))
    }

    /// `grad(expr, var)`: the derivative of `expr` with respect to `var`.
    fn grad(&mut self) -> CompileResult<Node> {
        self.bump();
        self.expect(TokenKind::LParen)?;
        let expr = self.parse_expr()?;
        self.expect(TokenKind::Comma)?;
        let (_, var) = self.expect_name("a variable name")?;
        self.expect(TokenKind::RParen)?;
        derivative(&expr, &var)
    }

    /// Comma-separated expressions up to and including `close`.
    pub(crate) fn comma_list(&mut self, close: TokenKind) -> CompileResult<Vec<Node>> {
        let mut items = Vec::new();
        while !self.check(close) {
            items.push(self.parse_expr()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(close)?;
        Ok(items)
    }
}
