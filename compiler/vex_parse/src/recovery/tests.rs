use super::*;

#[test]
fn membership() {
    assert!(STMT_FIRST.contains(TokenKind::While));
    assert!(!STMT_FIRST.contains(TokenKind::Semi));
    assert!(STMT_RECOVERY.contains(TokenKind::RBrace));
    assert!(!STMT_RECOVERY.contains(TokenKind::Ident));
    assert!(TokenSet::new().is_empty());
    let both = TokenSet::new()
        .with(TokenKind::Comma)
        .union(TokenSet::new().with(TokenKind::Semi));
    assert!(both.contains(TokenKind::Comma) && both.contains(TokenKind::Semi));
}

#[test]
fn synchronize_stops_at_statement_keyword() {
    let mut c = Cursor::new("1 + ) while x {}");
    assert!(synchronize(&mut c, STMT_RECOVERY));
    assert_eq!(c.kind(), TokenKind::While);
}

#[test]
fn synchronize_consumes_semicolon() {
    let mut c = Cursor::new("= 3 ; y = 1;");
    assert!(synchronize(&mut c, STMT_RECOVERY));
    assert_eq!(c.current().ident(), Some("y"));
}

#[test]
fn synchronize_skips_nested_blocks() {
    let mut c = Cursor::new("{ x = 1; } } z");
    assert!(synchronize(&mut c, STMT_RECOVERY));
    assert_eq!(c.kind(), TokenKind::RBrace);
    c.bump();
    assert_eq!(c.current().ident(), Some("z"));
}

#[test]
fn synchronize_reports_end() {
    let mut c = Cursor::new("1 2 3");
    assert!(!synchronize(&mut c, STMT_RECOVERY));
    assert!(c.is_at_end());
}
