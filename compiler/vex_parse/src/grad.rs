//! Symbolic differentiation for `grad(expr, x)`.
//!
//! Handles numbers, variables, `+ - * /` and unary minus. The result is
//! lightly simplified (`0 + e`, `1 * e`, `0 * e`) so simple inputs give
//! readable trees.

use vex_diagnostic::{CompileError, CompileResult};
use vex_ir::{BinaryOp, Node, NodeKind, NumValue, Token, UnaryOp};
use vex_stack::ensure_sufficient_stack;

/// `d expr / d var`, as a new tree.
pub fn derivative(expr: &Node, var: &str) -> CompileResult<Node> {
    ensure_sufficient_stack(|| derive(expr, var))
}

fn derive(expr: &Node, var: &str) -> CompileResult<Node> {
    let tok = &expr.token;
    match &expr.kind {
        NodeKind::Num(_) => Ok(int(0, tok)),
        NodeKind::Variable {
            module,
            name,
            offsets,
        } => {
            let is_var = module.is_empty() && offsets.is_empty() && name == var;
            Ok(int(u128::from(is_var), tok))
        }
        NodeKind::UnaryOp {
            op: UnaryOp::Neg,
            operand,
        } => Ok(neg(derivative(operand, var)?, tok)),
        NodeKind::BinOp { op, lhs, rhs } => {
            let da = derivative(lhs, var)?;
            let db = derivative(rhs, var)?;
            let a = (**lhs).clone();
            let b = (**rhs).clone();
            match op {
                BinaryOp::Add => Ok(add(da, db, tok)),
                BinaryOp::Sub => Ok(sub(da, db, tok)),
                // (a b)' = a' b + a b'
                BinaryOp::Mul => Ok(add(mul(da, b, tok), mul(a, db, tok), tok)),
                // (a / b)' = (a' b - a b') / (b b)
                BinaryOp::Div => {
                    let num = sub(mul(da, b.clone(), tok), mul(a, db, tok), tok);
                    Ok(div(num, mul(b.clone(), b, tok), tok))
                }
                _ => Err(unsupported(expr)),
            }
        }
        _ => Err(unsupported(expr)),
    }
}

fn unsupported(expr: &Node) -> CompileError {
    CompileError::syntax(
        expr.token.pos(),
        format!("cannot differentiate `{expr}`"),
    )
}

fn int(v: u128, tok: &Token) -> Node {
    Node::new(NodeKind::Num(NumValue::Int(v)), tok.clone())
}

fn is_const(node: &Node, v: f64) -> bool {
    #[expect(clippy::float_cmp, reason = "exact 0 and 1 literals")]
    let eq = |n: NumValue| n.as_f64() == v;
    matches!(node.kind, NodeKind::Num(n) if eq(n))
}

fn binop(op: BinaryOp, lhs: Node, rhs: Node, tok: &Token) -> Node {
    Node::new(
        NodeKind::BinOp {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        },
        tok.clone(),
    )
}

fn neg(node: Node, tok: &Token) -> Node {
    if is_const(&node, 0.0) {
        return node;
    }
    Node::new(
        NodeKind::UnaryOp {
            op: UnaryOp::Neg,
            operand: Box::new(node),
        },
        tok.clone(),
    )
}

fn add(a: Node, b: Node, tok: &Token) -> Node {
    if is_const(&a, 0.0) {
        b
    } else if is_const(&b, 0.0) {
        a
    } else {
        binop(BinaryOp::Add, a, b, tok)
    }
}

fn sub(a: Node, b: Node, tok: &Token) -> Node {
    if is_const(&b, 0.0) {
        a
    } else if is_const(&a, 0.0) {
        neg(b, tok)
    } else {
        binop(BinaryOp::Sub, a, b, tok)
    }
}

fn mul(a: Node, b: Node, tok: &Token) -> Node {
    if is_const(&a, 0.0) || is_const(&b, 0.0) {
        int(0, tok)
    } else if is_const(&a, 1.0) {
        b
    } else if is_const(&b, 1.0) {
        a
    } else {
        binop(BinaryOp::Mul, a, b, tok)
    }
}

fn div(a: Node, b: Node, tok: &Token) -> Node {
    if is_const(&a, 0.0) {
        a
    } else {
        binop(BinaryOp::Div, a, b, tok)
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
