use pretty_assertions::assert_eq;

use super::*;
use vex_diagnostic::ErrorKind;

fn kinds(src: &str) -> Vec<TokenKind> {
    tokenize(src)
        .unwrap_or_default()
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

#[test]
fn function_header() {
    assert_eq!(
        kinds("fn add(a: i32, ...) -> i32;"),
        vec![
            TokenKind::Fn,
            TokenKind::Ident,
            TokenKind::LParen,
            TokenKind::Ident,
            TokenKind::Colon,
            TokenKind::Ident,
            TokenKind::Comma,
            TokenKind::Ellipsis,
            TokenKind::RParen,
            TokenKind::Arrow,
            TokenKind::Ident,
            TokenKind::Semi,
            TokenKind::End,
        ]
    );
}

#[test]
fn comments_and_whitespace_are_skipped() {
    assert_eq!(
        kinds("// line\n x /* block\n comment */ += 1"),
        vec![TokenKind::Ident, TokenKind::PlusEq, TokenKind::Int, TokenKind::End]
    );
}

#[test]
fn unterminated_block_comment() {
    let err = tokenize("x /* never closed").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Syntax);
    assert_eq!(err.pos, Position::new(1, 2));
}

#[test]
fn qualified_identifier_splits_segments() {
    let toks = tokenize("a::b::c").unwrap_or_default();
    assert_eq!(toks[0].kind, TokenKind::Ident);
    assert_eq!(toks[0].module_path, vec!["a".to_owned(), "b".to_owned()]);
    assert_eq!(toks[0].ident(), Some("c"));
}

#[test]
fn keyword_check_skipped_for_qualified_names() {
    let toks = tokenize("m::if if").unwrap_or_default();
    assert_eq!(toks[0].kind, TokenKind::Ident);
    assert_eq!(toks[0].ident(), Some("if"));
    assert_eq!(toks[1].kind, TokenKind::If);
}

#[test]
fn trailing_colons_are_not_a_segment() {
    assert_eq!(
        kinds("x: i32"),
        vec![TokenKind::Ident, TokenKind::Colon, TokenKind::Ident, TokenKind::End]
    );
}

#[test]
fn string_escapes_decode() {
    let toks = tokenize(r#""a\tb\x41\012""#).unwrap_or_default();
    assert_eq!(toks[0].value, TokenValue::Str("a\tbA\n".into()));
}

#[test]
fn char_literal_must_be_one_byte() {
    let toks = tokenize(r"'\n'").unwrap_or_default();
    assert_eq!(toks[0].value, TokenValue::Char(b'\n'));
    assert_eq!(tokenize("'ab'").unwrap_err().kind, ErrorKind::Syntax);
    assert_eq!(tokenize("''").unwrap_err().kind, ErrorKind::Syntax);
}

#[test]
fn unterminated_string() {
    let err = tokenize("\"abc").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Syntax);
    assert!(err.message.contains("unterminated string"));
}

#[test]
fn end_is_idempotent() {
    let mut lexer = Lexer::new("x");
    assert!(lexer.next_token().is_ok_and(|t| t.is(TokenKind::Ident)));
    for _ in 0..3 {
        assert!(lexer.next_token().is_ok_and(|t| t.is(TokenKind::End)));
    }
}

#[test]
fn peek_does_not_consume() {
    let mut lexer = Lexer::new("foo (");
    let peeked = lexer.peek_token().map(|t| t.kind);
    assert_eq!(peeked, Ok(TokenKind::Ident));
    assert_eq!(lexer.next_token().map(|t| t.kind), Ok(TokenKind::Ident));
    assert_eq!(lexer.next_token().map(|t| t.kind), Ok(TokenKind::LParen));
}

#[test]
fn stash_restore_rewinds_positions() {
    let mut lexer = Lexer::new("a\n  b c");
    let _ = lexer.next_token();
    let saved = lexer.stash();
    let b = lexer.next_token().unwrap_or_else(|_| Token::synthetic(TokenKind::End));
    assert_eq!(b.pos(), Position::new(2, 2));
    let _ = lexer.next_token();
    lexer.restore(saved);
    let again = lexer.next_token().unwrap_or_else(|_| Token::synthetic(TokenKind::End));
    assert_eq!(again, b);
}

#[test]
fn unexpected_character_advances() {
    let mut lexer = Lexer::new("@ x");
    assert!(lexer.next_token().is_err());
    assert!(lexer.next_token().is_ok_and(|t| t.is(TokenKind::Ident)));
}

#[test]
fn all_punctuators() {
    assert_eq!(
        kinds("&& || == != <= >= << >> => -= *= /= % ^ ~ !"),
        vec![
            TokenKind::AmpAmp,
            TokenKind::PipePipe,
            TokenKind::EqEq,
            TokenKind::NotEq,
            TokenKind::LtEq,
            TokenKind::GtEq,
            TokenKind::Shl,
            TokenKind::Shr,
            TokenKind::FatArrow,
            TokenKind::MinusEq,
            TokenKind::StarEq,
            TokenKind::SlashEq,
            TokenKind::Percent,
            TokenKind::Caret,
            TokenKind::Tilde,
            TokenKind::Bang,
            TokenKind::End,
        ]
    );
}
