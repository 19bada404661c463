//! Lexer for Vex.
//!
//! A hand-written, pull-based scanner: the parser asks for one token at a
//! time with [`Lexer::next_token`]. Lookahead past the current token is a
//! snapshot round trip ([`Lexer::stash`] / [`Lexer::restore`]); the state
//! is three integers, so [`Lexer::peek_token`] costs one extra scan.
//!
//! Whitespace and comments are skipped inside `next_token`. Once the input
//! is exhausted every call returns an `End` token.

mod cursor;
mod escape;
mod number;

use tracing::trace;
use vex_diagnostic::{CompileError, CompileResult};
use vex_ir::{Position, Token, TokenKind, TokenValue};

use cursor::Cursor;
pub use cursor::LexerState;

#[inline]
fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

#[inline]
fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

pub struct Lexer<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            cursor: Cursor::new(source),
        }
    }

    /// Snapshot for backtracking.
    #[inline]
    pub fn stash(&self) -> LexerState {
        self.cursor.state()
    }

    #[inline]
    pub fn restore(&mut self, state: LexerState) {
        self.cursor.set_state(state);
    }

    /// The token `next_token` would return, without consuming it.
    pub fn peek_token(&mut self) -> CompileResult<Token> {
        let saved = self.stash();
        let tok = self.next_token();
        self.restore(saved);
        tok
    }

    /// Position of the next unread byte.
    pub fn position(&self) -> Position {
        self.cursor.position()
    }

    pub fn next_token(&mut self) -> CompileResult<Token> {
        self.skip_trivia()?;
        let start = self.cursor.position();
        if self.cursor.is_eof() {
            return Ok(Token::new(TokenKind::End, start));
        }

        let b = self.cursor.current();
        let tok = if b.is_ascii_digit() {
            let (kind, value) = number::scan_number(&mut self.cursor)?;
            Token::new(kind, start).with_value(value)
        } else if is_ident_start(b) {
            self.identifier(start)
        } else if b == b'"' {
            self.string(start)?
        } else if b == b'\'' {
            self.char_literal(start)?
        } else {
            Token::new(self.punctuator(start)?, start)
        };
        trace!(kind = ?tok.kind, line = start.line, column = start.column, "token");
        Ok(tok)
    }

    fn skip_trivia(&mut self) -> CompileResult<()> {
        loop {
            let c = &mut self.cursor;
            match (c.current(), c.peek()) {
                (b' ' | b'\t' | b'\r' | b'\n', _) => c.advance(),
                (b'/', b'/') => c.eat_while(|b| b != b'\n'),
                (b'/', b'*') => {
                    let start = c.position();
                    c.advance_n(2);
                    loop {
                        if c.is_eof() {
                            return Err(CompileError::syntax(start, "unterminated block comment"));
                        }
                        if c.current() == b'*' && c.peek() == b'/' {
                            c.advance_n(2);
                            break;
                        }
                        c.advance();
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    /// `name` or `a::b::name`. `::` only continues the identifier when an
    /// identifier byte follows it.
    fn identifier(&mut self, start: Position) -> Token {
        let c = &mut self.cursor;
        let mut segments = Vec::new();
        loop {
            let begin = c.offset();
            c.eat_while(is_ident_continue);
            let text = c.slice_from(begin).to_owned();
            if c.current() == b':' && c.peek() == b':' && is_ident_start(c.peek2()) {
                segments.push(text);
                c.advance_n(2);
                continue;
            }

            if segments.is_empty() {
                if let Some(kw) = TokenKind::keyword(&text) {
                    return Token::new(kw, start);
                }
            }
            let mut tok = Token::new(TokenKind::Ident, start).with_value(TokenValue::Ident(text));
            tok.module_path = segments;
            return tok;
        }
    }

    /// Bytes of a quoted literal up to the closing `quote`, escapes decoded.
    fn quoted(&mut self, start: Position, quote: u8, what: &str) -> CompileResult<Vec<u8>> {
        let c = &mut self.cursor;
        c.advance();
        let mut bytes = Vec::new();
        loop {
            if c.is_eof() || c.current() == b'\n' {
                return Err(CompileError::syntax(start, format!("unterminated {what} literal")));
            }
            match c.current() {
                b if b == quote => {
                    c.advance();
                    return Ok(bytes);
                }
                b'\\' => bytes.push(escape::scan_escape(c)?),
                b => {
                    bytes.push(b);
                    c.advance();
                }
            }
        }
    }

    fn string(&mut self, start: Position) -> CompileResult<Token> {
        let bytes = self.quoted(start, b'"', "string")?;
        // Escaped bytes above 0x7f are kept as the matching Latin-1 char.
        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(err) => err.into_bytes().into_iter().map(char::from).collect(),
        };
        Ok(Token::new(TokenKind::Str, start).with_value(TokenValue::Str(text)))
    }

    fn char_literal(&mut self, start: Position) -> CompileResult<Token> {
        let bytes = self.quoted(start, b'\'', "char")?;
        match bytes.as_slice() {
            [b] => Ok(Token::new(TokenKind::Char, start).with_value(TokenValue::Char(*b))),
            _ => Err(CompileError::syntax(
                start,
                "char literal must contain exactly one byte",
            )),
        }
    }

    fn punctuator(&mut self, start: Position) -> CompileResult<TokenKind> {
        let c = &mut self.cursor;
        let (kind, len) = match (c.current(), c.peek(), c.peek2()) {
            (b'.', b'.', b'.') => (TokenKind::Ellipsis, 3),
            (b'-', b'>', _) => (TokenKind::Arrow, 2),
            (b'=', b'>', _) => (TokenKind::FatArrow, 2),
            (b'&', b'&', _) => (TokenKind::AmpAmp, 2),
            (b'|', b'|', _) => (TokenKind::PipePipe, 2),
            (b'=', b'=', _) => (TokenKind::EqEq, 2),
            (b'!', b'=', _) => (TokenKind::NotEq, 2),
            (b'<', b'=', _) => (TokenKind::LtEq, 2),
            (b'>', b'=', _) => (TokenKind::GtEq, 2),
            (b'<', b'<', _) => (TokenKind::Shl, 2),
            (b'>', b'>', _) => (TokenKind::Shr, 2),
            (b'+', b'=', _) => (TokenKind::PlusEq, 2),
            (b'-', b'=', _) => (TokenKind::MinusEq, 2),
            (b'*', b'=', _) => (TokenKind::StarEq, 2),
            (b'/', b'=', _) => (TokenKind::SlashEq, 2),
            (b'(', _, _) => (TokenKind::LParen, 1),
            (b')', _, _) => (TokenKind::RParen, 1),
            (b'{', _, _) => (TokenKind::LBrace, 1),
            (b'}', _, _) => (TokenKind::RBrace, 1),
            (b'[', _, _) => (TokenKind::LBracket, 1),
            (b']', _, _) => (TokenKind::RBracket, 1),
            (b',', _, _) => (TokenKind::Comma, 1),
            (b';', _, _) => (TokenKind::Semi, 1),
            (b':', _, _) => (TokenKind::Colon, 1),
            (b'.', _, _) => (TokenKind::Dot, 1),
            (b'+', _, _) => (TokenKind::Plus, 1),
            (b'-', _, _) => (TokenKind::Minus, 1),
            (b'*', _, _) => (TokenKind::Star, 1),
            (b'/', _, _) => (TokenKind::Slash, 1),
            (b'%', _, _) => (TokenKind::Percent, 1),
            (b'&', _, _) => (TokenKind::Amp, 1),
            (b'|', _, _) => (TokenKind::Pipe, 1),
            (b'^', _, _) => (TokenKind::Caret, 1),
            (b'~', _, _) => (TokenKind::Tilde, 1),
            (b'!', _, _) => (TokenKind::Bang, 1),
            (b'<', _, _) => (TokenKind::Lt, 1),
            (b'>', _, _) => (TokenKind::Gt, 1),
            (b'=', _, _) => (TokenKind::Eq, 1),
            (other, _, _) => {
                // Skip the offending byte (and any UTF-8 continuation bytes)
                // so the caller can resynchronize.
                c.advance();
                c.eat_while(|b| (0x80..0xc0).contains(&b));
                let shown = if other.is_ascii_graphic() {
                    format!("`{}`", char::from(other))
                } else {
                    format!("byte 0x{other:02x}")
                };
                return Err(CompileError::syntax(start, format!("unexpected character {shown}")));
            }
        };
        c.advance_n(len);
        Ok(kind)
    }
}

/// Lex a whole source into tokens, stopping at the first error.
/// The returned vector always ends with an `End` token.
pub fn tokenize(source: &str) -> CompileResult<Vec<Token>> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let tok = lexer.next_token()?;
        let done = tok.is(TokenKind::End);
        tokens.push(tok);
        if done {
            return Ok(tokens);
        }
    }
}

#[cfg(test)]
mod tests;
