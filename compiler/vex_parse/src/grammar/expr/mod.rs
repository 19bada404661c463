//! Expression parsing.
//!
//! - `mod.rs`: entry point and the binary precedence chain
//! - `primary.rs`: literals, calls, struct literals, block and `if` values
//! - `postfix.rs`: offset chains and argument lists

mod postfix;
mod primary;

use vex_diagnostic::CompileResult;
use vex_ir::{BinaryOp, Node, NodeKind, Token, TokenKind, UnaryOp};
use vex_stack::ensure_sufficient_stack;

use crate::Parser;

fn binary(op: BinaryOp, token: Token, lhs: Node, rhs: Node) -> Node {
    Node::new(
        NodeKind::BinOp {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        },
        token,
    )
}

impl Parser<'_, '_> {
    /// Parse an expression.
    pub(crate) fn parse_expr(&mut self) -> CompileResult<Node> {
        ensure_sufficient_stack(|| self.parse_logical_or())
    }

    /// Parse `||` (lowest precedence).
    fn parse_logical_or(&mut self) -> CompileResult<Node> {
        let mut left = self.parse_logical_and()?;
        while self.check(TokenKind::PipePipe) {
            let tok = self.bump();
            let right = self.parse_logical_and()?;
            left = binary(BinaryOp::Or, tok, left, right);
        }
        Ok(left)
    }

    /// Parse `&&`
    fn parse_logical_and(&mut self) -> CompileResult<Node> {
        let mut left = self.parse_bitwise_or()?;
        while self.check(TokenKind::AmpAmp) {
            let tok = self.bump();
            let right = self.parse_bitwise_or()?;
            left = binary(BinaryOp::And, tok, left, right);
        }
        Ok(left)
    }

    /// Parse `|`
    fn parse_bitwise_or(&mut self) -> CompileResult<Node> {
        let mut left = self.parse_bitwise_xor()?;
        while self.check(TokenKind::Pipe) {
            let tok = self.bump();
            let right = self.parse_bitwise_xor()?;
            left = binary(BinaryOp::BitOr, tok, left, right);
        }
        Ok(left)
    }

    /// Parse `^`
    fn parse_bitwise_xor(&mut self) -> CompileResult<Node> {
        let mut left = self.parse_bitwise_and()?;
        while self.check(TokenKind::Caret) {
            let tok = self.bump();
            let right = self.parse_bitwise_and()?;
            left = binary(BinaryOp::BitXor, tok, left, right);
        }
        Ok(left)
    }

    /// Parse `&` (binary)
    fn parse_bitwise_and(&mut self) -> CompileResult<Node> {
        let mut left = self.parse_equality()?;
        while self.check(TokenKind::Amp) {
            let tok = self.bump();
            let right = self.parse_equality()?;
            left = binary(BinaryOp::BitAnd, tok, left, right);
        }
        Ok(left)
    }

    /// Parse `==` `!=`
    fn parse_equality(&mut self) -> CompileResult<Node> {
        let mut left = self.parse_comparison()?;
        while let Some(op) = self.match_op(&[TokenKind::EqEq, TokenKind::NotEq]) {
            let tok = self.bump();
            let right = self.parse_comparison()?;
            left = binary(op, tok, left, right);
        }
        Ok(left)
    }

    /// Parse `<` `<=` `>` `>=`
    fn parse_comparison(&mut self) -> CompileResult<Node> {
        let mut left = self.parse_shift()?;
        while let Some(op) = self.match_op(&[
            TokenKind::Lt,
            TokenKind::LtEq,
            TokenKind::Gt,
            TokenKind::GtEq,
        ]) {
            let tok = self.bump();
            let right = self.parse_shift()?;
            left = binary(op, tok, left, right);
        }
        Ok(left)
    }

    /// Parse `<<` `>>`
    fn parse_shift(&mut self) -> CompileResult<Node> {
        let mut left = self.parse_additive()?;
        while let Some(op) = self.match_op(&[TokenKind::Shl, TokenKind::Shr]) {
            let tok = self.bump();
            let right = self.parse_additive()?;
            left = binary(op, tok, left, right);
        }
        Ok(left)
    }

    /// Parse `+` `-`
    fn parse_additive(&mut self) -> CompileResult<Node> {
        let mut left = self.parse_multiplicative()?;
        while let Some(op) = self.match_op(&[TokenKind::Plus, TokenKind::Minus]) {
            let tok = self.bump();
            let right = self.parse_multiplicative()?;
            left = binary(op, tok, left, right);
        }
        Ok(left)
    }

    /// Parse `*` `/` `%`
    fn parse_multiplicative(&mut self) -> CompileResult<Node> {
        let mut left = self.parse_cast()?;
        while let Some(op) =
            self.match_op(&[TokenKind::Star, TokenKind::Slash, TokenKind::Percent])
        {
            let tok = self.bump();
            let right = self.parse_cast()?;
            left = binary(op, tok, left, right);
        }
        Ok(left)
    }

    fn match_op(&self, kinds: &[TokenKind]) -> Option<BinaryOp> {
        let kind = self.cursor.kind();
        if kinds.contains(&kind) {
            BinaryOp::from_token(kind)
        } else {
            None
        }
    }

    /// Parse `unary { as type }`
    fn parse_cast(&mut self) -> CompileResult<Node> {
        let mut expr = self.parse_unary()?;
        while self.check(TokenKind::As) {
            let tok = self.bump();
            let target = self.parse_cast_type()?;
            expr = Node::new(
                NodeKind::TypeTrans {
                    expr: Box::new(expr),
                    target,
                },
                tok,
            );
        }
        Ok(expr)
    }

    /// Parse prefix `-` `!` `~` `&` `*`
    fn parse_unary(&mut self) -> CompileResult<Node> {
        match UnaryOp::from_token(self.cursor.kind()) {
            Some(op) => {
                let tok = self.bump();
                let operand = ensure_sufficient_stack(|| self.parse_unary())?;
                Ok(Node::new(
                    NodeKind::UnaryOp {
                        op,
                        operand: Box::new(operand),
                    },
                    tok,
                ))
            }
            None => self.parse_primary(),
        }
    }
}
