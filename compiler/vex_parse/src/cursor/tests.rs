use super::*;

#[test]
fn bump_returns_consumed_token() {
    let mut c = Cursor::new("a b");
    let a = c.bump();
    assert_eq!(a.ident(), Some("a"));
    assert_eq!(c.current().ident(), Some("b"));
    c.bump();
    assert!(c.is_at_end());
}

#[test]
fn peek_sees_past_current() {
    let mut c = Cursor::new("x = 1");
    assert_eq!(c.kind(), TokenKind::Ident);
    assert_eq!(c.peek_kind(), TokenKind::Eq);
    assert_eq!(c.kind(), TokenKind::Ident);
}

#[test]
fn lex_errors_are_queued_not_fatal() {
    let mut c = Cursor::new("a @ b");
    c.bump();
    assert_eq!(c.current().ident(), Some("b"));
    assert_eq!(c.take_lex_errors().len(), 1);
    assert!(c.take_lex_errors().is_empty());
}

#[test]
fn snapshot_restores_everything() {
    let mut c = Cursor::new("a b c");
    let snap = c.snapshot();
    c.bump();
    c.bump();
    c.restore(snap);
    assert_eq!(c.current().ident(), Some("a"));
}
