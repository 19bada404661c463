//! Token cursor over the lexer.
//!
//! Holds the current token; lookahead past it goes through the lexer's
//! stash/restore. Lexer errors never stop the cursor: they are queued
//! for the statement loop to report, and lexing resumes after the bad
//! input.

use vex_diagnostic::CompileError;
use vex_ir::{Position, Token, TokenKind};
use vex_lexer::{Lexer, LexerState};

/// Everything needed to rewind the cursor.
#[derive(Clone, Debug)]
pub(crate) struct CursorSnapshot {
    lexer: LexerState,
    current: Token,
    pending_errors: usize,
}

pub(crate) struct Cursor<'a> {
    lexer: Lexer<'a>,
    current: Token,
    lex_errors: Vec<CompileError>,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        let mut cursor = Cursor {
            lexer: Lexer::new(source),
            current: Token::synthetic(TokenKind::End),
            lex_errors: Vec::new(),
        };
        cursor.current = cursor.lex();
        cursor
    }

    fn lex(&mut self) -> Token {
        loop {
            match self.lexer.next_token() {
                Ok(tok) => return tok,
                Err(err) => self.lex_errors.push(err),
            }
        }
    }

    #[inline]
    pub(crate) fn current(&self) -> &Token {
        &self.current
    }

    #[inline]
    pub(crate) fn kind(&self) -> TokenKind {
        self.current.kind
    }

    #[inline]
    pub(crate) fn pos(&self) -> Position {
        self.current.pos()
    }

    #[inline]
    pub(crate) fn is_at_end(&self) -> bool {
        self.current.is(TokenKind::End)
    }

    /// Consume the current token and return it.
    pub(crate) fn bump(&mut self) -> Token {
        let next = self.lex();
        std::mem::replace(&mut self.current, next)
    }

    /// Kind of the token after the current one.
    pub(crate) fn peek_kind(&mut self) -> TokenKind {
        self.lexer
            .peek_token()
            .map_or(TokenKind::End, |tok| tok.kind)
    }

    pub(crate) fn snapshot(&self) -> CursorSnapshot {
        CursorSnapshot {
            lexer: self.lexer.stash(),
            current: self.current.clone(),
            pending_errors: self.lex_errors.len(),
        }
    }

    pub(crate) fn restore(&mut self, snapshot: CursorSnapshot) {
        self.lexer.restore(snapshot.lexer);
        self.current = snapshot.current;
        self.lex_errors.truncate(snapshot.pending_errors);
    }

    /// Lexer errors seen since the last call.
    pub(crate) fn take_lex_errors(&mut self) -> Vec<CompileError> {
        std::mem::take(&mut self.lex_errors)
    }
}

#[cfg(test)]
mod tests;
