//! Grammar productions.
//!
//! # Module Structure
//!
//! - `mod.rs`: statement lists, blocks, statement dispatch
//! - `item.rs`: `module`, `import`, `struct`, `global`, `generic`, `fn`
//! - `stmt.rs`: control flow and assignments
//! - `expr/`: the expression precedence chain
//! - `ty.rs`: the type sub-grammar

mod expr;
mod item;
mod stmt;
mod ty;

use vex_diagnostic::{CompileError, CompileResult};
use vex_ir::{Node, NodeKind, Position, TokenKind};

use crate::recovery::{synchronize, TokenSet, STMT_FIRST, STMT_RECOVERY};
use crate::Parser;

/// Tokens an expression can start with.
pub(crate) const EXPR_FIRST: TokenSet = TokenSet::new()
    .with(TokenKind::Int)
    .with(TokenKind::Float)
    .with(TokenKind::Char)
    .with(TokenKind::Str)
    .with(TokenKind::Ident)
    .with(TokenKind::True)
    .with(TokenKind::False)
    .with(TokenKind::LParen)
    .with(TokenKind::LBracket)
    .with(TokenKind::LBrace)
    .with(TokenKind::If)
    .with(TokenKind::Sizeof)
    .with(TokenKind::Grad)
    .with(TokenKind::Minus)
    .with(TokenKind::Bang)
    .with(TokenKind::Tilde)
    .with(TokenKind::Amp)
    .with(TokenKind::Star);

impl Parser<'_, '_> {
    /// Statements up to (not including) `close`.
    ///
    /// Errors are reported and skipped. Returns `false` when input ran out
    /// while recovering.
    pub(crate) fn statement_list(&mut self, close: TokenKind) -> (Vec<Node>, bool) {
        let mut stmts = Vec::new();
        loop {
            self.flush_lex_errors();
            if self.check(close) || self.cursor.is_at_end() {
                return (stmts, true);
            }
            let start = self.pos();
            match self.statement() {
                Ok(node) => stmts.push(node),
                Err(err) => {
                    self.diagnostics.emit_error(err);
                    // Nothing consumed: drop the offending token and retry.
                    if self.pos() == start {
                        self.bump();
                        continue;
                    }
                    if !synchronize(&mut self.cursor, STMT_RECOVERY) {
                        self.flush_lex_errors();
                        return (stmts, false);
                    }
                }
            }
        }
    }

    /// `{ statements }` as a `Compound` node.
    pub(crate) fn block(&mut self) -> CompileResult<Node> {
        let open = self.expect(TokenKind::LBrace)?;
        let (stmts, complete) = self.statement_list(TokenKind::RBrace);
        if !complete {
            return Err(CompileError::reported(open.pos()));
        }
        self.expect(TokenKind::RBrace)?;
        Ok(Node::new(NodeKind::Compound(stmts), open))
    }

    /// One statement.
    pub(crate) fn statement(&mut self) -> CompileResult<Node> {
        match self.cursor.kind() {
            TokenKind::Module => self.module_decl(),
            TokenKind::Import => self.import(),
            TokenKind::Struct => self.struct_decl(),
            TokenKind::Global => self.global(),
            TokenKind::Generic => self.generic(),
            TokenKind::Fn => self.function(),
            TokenKind::If => self.if_statement(),
            TokenKind::While => self.while_loop(),
            TokenKind::For => self.for_loop(),
            TokenKind::Break | TokenKind::Continue => self.loop_control(),
            TokenKind::Return => self.return_statement(),
            TokenKind::LBrace => self.block(),
            kind if STMT_FIRST.union(EXPR_FIRST).contains(kind) => self.simple_statement(),
            _ => Err(self.unexpected("a statement")),
        }
    }

    /// A `;` ending a statement that began at `start`.
    pub(crate) fn end_statement(&mut self, start: Position) -> CompileResult<()> {
        if self.eat(TokenKind::Semi) {
            Ok(())
        } else {
            Err(CompileError::syntax(
                self.pos(),
                format!(
                    "expected `;` after the statement at {start}, found {}",
                    self.current()
                ),
            ))
        }
    }
}
