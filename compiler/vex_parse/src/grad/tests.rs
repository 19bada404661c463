use pretty_assertions::assert_eq;
use smallvec::SmallVec;
use vex_ir::{ast::OffsetOp, Position, TokenKind, TokenValue};

use super::*;

fn tok() -> Token {
    Token::new(TokenKind::Ident, Position::new(1, 0))
}

fn num(v: u128) -> Node {
    int(v, &tok())
}

fn var(name: &str) -> Node {
    let offsets: SmallVec<[OffsetOp; 2]> = SmallVec::new();
    Node::new(
        NodeKind::Variable {
            module: Vec::new(),
            name: name.into(),
            offsets,
        },
        tok().with_value(TokenValue::Ident(name.into())),
    )
}

fn d(expr: &Node) -> String {
    derivative(expr, "x").unwrap().to_string()
}

#[test]
fn constants_and_variables() {
    assert_eq!(d(&num(7)), "0");
    assert_eq!(d(&var("x")), "1");
    assert_eq!(d(&var("y")), "0");
}

#[test]
fn sum_and_difference() {
    assert_eq!(d(&binop(BinaryOp::Add, var("x"), num(3), &tok())), "1");
    assert_eq!(d(&binop(BinaryOp::Sub, num(3), var("x"), &tok())), "(- 1)");
}

#[test]
fn product_rule() {
    // d(x * x) = 1 * x + x * 1 = x + x
    let sq = binop(BinaryOp::Mul, var("x"), var("x"), &tok());
    assert_eq!(d(&sq), "(+ x x)");
    // d(3 * x) = 0 * x + 3 * 1 = 3
    let lin = binop(BinaryOp::Mul, num(3), var("x"), &tok());
    assert_eq!(d(&lin), "3");
}

#[test]
fn quotient_rule() {
    // d(1 / x) = (0 * x - 1 * 1) / (x * x)
    let inv = binop(BinaryOp::Div, num(1), var("x"), &tok());
    assert_eq!(d(&inv), "(/ (- 1) (* x x))");
}

#[test]
fn negation() {
    let n = neg(var("x"), &tok());
    assert_eq!(n.to_string(), "(- x)");
    assert_eq!(d(&n), "(- 1)");
}

#[test]
fn unsupported_operator_is_syntax_error() {
    let cmp = binop(BinaryOp::Lt, var("x"), num(1), &tok());
    let err = derivative(&cmp, "x").unwrap_err();
    assert_eq!(err.kind, vex_diagnostic::ErrorKind::Syntax);
    assert!(err.message.contains("cannot differentiate"));
}
