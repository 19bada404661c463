use pretty_assertions::assert_eq;

use super::*;

#[test]
fn error_render_format() {
    let diag = Diagnostic::error(ErrorKind::Type, Position::new(3, 4), "bad store");
    assert_eq!(diag.render("main.vx"), "main.vx:3:5: TypeError: bad store");
}

#[test]
fn warning_render_uses_warning_label() {
    let diag = Diagnostic::warning(Position::new(1, 0), "implicit narrowing from f64 to i32");
    assert!(!diag.is_error());
    assert_eq!(
        diag.render("a.vx"),
        "a.vx:1:1: Warning: implicit narrowing from f64 to i32"
    );
}

#[test]
fn notes_render_indented() {
    let diag = Diagnostic::error(ErrorKind::SysErr, Position::START, "circular dependency")
        .with_note("a -> b")
        .with_note("b -> a");
    assert_eq!(
        diag.render("a.vx"),
        "a.vx:1:1: SysError: circular dependency\n    note: a -> b\n    note: b -> a"
    );
}

#[test]
fn from_compile_error_keeps_everything() {
    let err = CompileError::missing(Position::new(7, 2), "undefined variable `q`");
    let diag = Diagnostic::from(err);
    assert_eq!(diag.kind, Some(ErrorKind::Missing));
    assert_eq!(diag.pos, Position::new(7, 2));
    assert_eq!(diag.message, "undefined variable `q`");
}
