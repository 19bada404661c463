//! Recursive descent parser for Vex.
//!
//! Builds a positioned [`Node`] tree from source text. One token of
//! lookahead, plus a peek past it for the `ident (`, `ident :` and
//! `ident =` decisions.
//!
//! Struct declarations are registered in the [`TypeRegistry`] as they are
//! parsed: the registry decides whether `Name(args)` is a struct literal or
//! a call, and resolves named types.
//!
//! # Recovery
//!
//! Statement lists are the only recovery point. A failed statement is
//! reported, tokens are skipped to the next statement start (or the
//! closing `}`), and parsing continues. Running out of input while
//! recovering ends the enclosing block with the silent `Reported` error.

mod cursor;
mod grad;
mod grammar;
mod imports;
mod recovery;

use tracing::debug;
use vex_diagnostic::{CompileError, CompileResult, DiagnosticQueue};
use vex_ir::{ModulePath, Node, NodeKind, Position, QualifiedName, Token, TokenKind};
use vex_resolve::ModuleResolver;
use vex_types::TypeRegistry;

use cursor::Cursor;

pub use grad::derivative;
pub use imports::{scan_imports, ImportScan, ScannedImport};
pub use recovery::{TokenSet, STMT_FIRST, STMT_KEYWORDS, STMT_RECOVERY};

/// Parse a whole unit into a `Compound` node of top-level statements.
pub fn parse_unit(
    source: &str,
    registry: &mut TypeRegistry,
    resolver: &ModuleResolver,
    diagnostics: &mut DiagnosticQueue,
) -> Node {
    let mut parser = Parser::new(source, registry, resolver, diagnostics);
    parser.parse_unit()
}

/// Parser state.
pub struct Parser<'src, 'ctx> {
    cursor: Cursor<'src>,
    registry: &'ctx mut TypeRegistry,
    /// Parse-time view of modules and imports, for struct lookup.
    resolver: ModuleResolver,
    diagnostics: &'ctx mut DiagnosticQueue,
    /// Struct whose members are being parsed; may point to itself.
    declaring: Option<QualifiedName>,
}

impl<'src, 'ctx> Parser<'src, 'ctx> {
    pub fn new(
        source: &'src str,
        registry: &'ctx mut TypeRegistry,
        resolver: &ModuleResolver,
        diagnostics: &'ctx mut DiagnosticQueue,
    ) -> Self {
        Parser {
            cursor: Cursor::new(source),
            registry,
            resolver: resolver.clone(),
            diagnostics,
            declaring: None,
        }
    }

    pub fn parse_unit(&mut self) -> Node {
        debug!(file = self.diagnostics.file(), "parse unit");
        let start = Token::synthetic(TokenKind::LBrace);
        let (stmts, _) = self.statement_list(TokenKind::End);
        self.flush_lex_errors();
        Node::new(NodeKind::Compound(stmts), start)
    }

    // Token helpers

    #[inline]
    fn check(&self, kind: TokenKind) -> bool {
        self.cursor.kind() == kind
    }

    #[inline]
    fn current(&self) -> &Token {
        self.cursor.current()
    }

    #[inline]
    fn pos(&self) -> Position {
        self.cursor.pos()
    }

    #[inline]
    fn bump(&mut self) -> Token {
        self.cursor.bump()
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> CompileResult<Token> {
        if self.check(kind) {
            Ok(self.bump())
        } else {
            Err(self.unexpected(&format!("{kind}")))
        }
    }

    fn unexpected(&self, expected: &str) -> CompileError {
        CompileError::syntax(
            self.pos(),
            format!("expected {expected}, found {}", self.current()),
        )
    }

    /// An unqualified identifier.
    fn expect_name(&mut self, what: &str) -> CompileResult<(Token, String)> {
        let tok = self.current().clone();
        match tok.ident() {
            Some(name) if tok.module_path.is_empty() => {
                let name = name.to_owned();
                self.bump();
                Ok((tok, name))
            }
            Some(_) => Err(CompileError::syntax(
                tok.pos(),
                format!("{what} cannot be qualified"),
            )),
            None => Err(self.unexpected(what)),
        }
    }

    /// A possibly qualified identifier, as written.
    fn expect_path(&mut self, what: &str) -> CompileResult<(Token, Vec<String>, String)> {
        let tok = self.current().clone();
        match tok.ident() {
            Some(name) => {
                let name = name.to_owned();
                let module = tok.module_path.clone();
                self.bump();
                Ok((tok, module, name))
            }
            None => Err(self.unexpected(what)),
        }
    }

    /// Struct named `module::name` as seen from the current module.
    fn lookup_struct(&self, module: &[String], name: &str) -> Option<QualifiedName> {
        self.resolver
            .candidates(module, name)
            .into_iter()
            .find(|q| self.registry.is_struct(q))
    }

    fn current_module(&self) -> &ModulePath {
        self.resolver.current()
    }

    fn flush_lex_errors(&mut self) {
        for err in self.cursor.take_lex_errors() {
            self.diagnostics.emit_error(err);
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
