use super::*;

#[test]
fn keywords_round_trip_through_describe() {
    for text in ["fn", "elif", "sizeof", "generic", "grad", "default"] {
        let kind = TokenKind::keyword(text).unwrap_or(TokenKind::Ident);
        assert_eq!(kind.describe(), text);
    }
    assert_eq!(TokenKind::keyword("fi"), None);
    assert_eq!(TokenKind::keyword("Fn"), None);
}

#[test]
fn discriminants_fit_a_u128_set() {
    assert!(TokenKind::MAX_DISCRIMINANT < 128);
}

#[test]
fn qualified_identifier_display() {
    let mut tok = Token::new(TokenKind::Ident, Position::new(3, 4))
        .with_value(TokenValue::Ident("c".into()));
    tok.module_path = vec!["a".into(), "b".into()];
    assert_eq!(tok.to_string(), "`a::b::c`");
    assert_eq!(tok.pos(), Position::new(3, 4));
}

#[test]
fn punctuation_display_is_quoted() {
    assert_eq!(TokenKind::Ellipsis.to_string(), "`...`");
    assert_eq!(TokenKind::End.to_string(), "end of input");
}
