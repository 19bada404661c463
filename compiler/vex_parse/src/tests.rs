use pretty_assertions::assert_eq;
use vex_diagnostic::{DiagnosticQueue, ErrorKind};
use vex_ir::{BinaryOp, ModulePath, Node, NodeKind, NumValue, QualifiedName};
use vex_resolve::ModuleResolver;
use vex_types::TypeRegistry;

use crate::parse_unit;

struct Parsed {
    tree: Node,
    diagnostics: DiagnosticQueue,
    registry: TypeRegistry,
}

fn parse(source: &str) -> Parsed {
    let mut registry = TypeRegistry::new();
    let resolver = ModuleResolver::new(ModulePath::global());
    let mut diagnostics = DiagnosticQueue::new("test.vx");
    let tree = parse_unit(source, &mut registry, &resolver, &mut diagnostics);
    Parsed {
        tree,
        diagnostics,
        registry,
    }
}

/// The printed tree of an error-free source.
fn ast(source: &str) -> String {
    let parsed = parse(source);
    assert!(
        !parsed.diagnostics.has_errors(),
        "unexpected errors:\n{}",
        parsed.diagnostics.render_to_string()
    );
    parsed.tree.to_string()
}

fn errors(source: &str) -> Vec<(ErrorKind, String)> {
    parse(source)
        .diagnostics
        .errors()
        .map(|d| (d.kind.unwrap_or(ErrorKind::Reported), d.message.clone()))
        .collect()
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let parsed = parse("x: i32 = 3 + 4 * 2;");
    let NodeKind::Compound(stmts) = &parsed.tree.kind else {
        panic!("expected a statement list");
    };
    let NodeKind::Assign { value: Some(value), .. } = &stmts[0].kind else {
        panic!("expected a declaration");
    };
    let NodeKind::BinOp { op, lhs, rhs } = &value.kind else {
        panic!("expected a binary operation");
    };
    assert_eq!(*op, BinaryOp::Add);
    assert_eq!(lhs.kind, NodeKind::Num(NumValue::Int(3)));
    assert!(matches!(rhs.kind, NodeKind::BinOp { op: BinaryOp::Mul, .. }));
    assert_eq!(value.to_string(), "(+ 3 (* 4 2))");
}

#[test]
fn precedence_cascade() {
    assert_eq!(
        ast("r = a || b && c | d ^ e & f == g < h << i + j * k;"),
        "(do (= r (|| a (&& b (| c (^ d (& e (== f (< g (<< h (+ i (* j k))))))))))))"
    );
}

#[test]
fn binary_levels_are_left_associative() {
    assert_eq!(ast("r = a - b - c;"), "(do (= r (- (- a b) c)))");
    assert_eq!(ast("r = a / b * c;"), "(do (= r (* (/ a b) c)))");
}

#[test]
fn unary_and_cast() {
    assert_eq!(ast("r = -x as f32;"), "(do (= r (as (- x) f32)))");
    assert_eq!(ast("r = *p + &q;"), "(do (= r (+ (* p) (& q))))");
    assert_eq!(ast("r = !~x;"), "(do (= r (! (~ x))))");
}

#[test]
fn cast_keeps_trailing_star_for_multiplication() {
    assert_eq!(
        ast("y: f64 = x as f64 * 2.0;"),
        "(do (let y f64 (* (as x f64) 2.0)))"
    );
    assert_eq!(ast("p: i8* = q as i8*;"), "(do (let p i8* (as q i8*)))");
    assert_eq!(ast("p: i8** = q as i8**;"), "(do (let p i8** (as q i8**)))");
}

#[test]
fn declarations_and_assignments() {
    assert_eq!(
        ast("x: i32 = 1; x = 2; y: f64; p.x = 3.0; arr[1] = 4; *ptr = 5;"),
        "(do (let x i32 1) (= x 2) (let y f64) (= p.x 3.0) (= arr[1] 4) (= (* ptr) 5))"
    );
}

#[test]
fn compound_assignment_desugars() {
    assert_eq!(ast("x += 2;"), "(do (= x (+ x 2)))");
    assert_eq!(ast("a[i] *= b - 1;"), "(do (= a[i] (* a[i] (- b 1))))");
}

#[test]
fn assignment_target_must_be_storable() {
    let errs = errors("f() = 3;");
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].0, ErrorKind::Syntax);
    assert!(errs[0].1.contains("cannot assign"), "{}", errs[0].1);
}

#[test]
fn offset_chains() {
    assert_eq!(
        ast("r = p.pts[1].x; q.scale(2.0, 3);"),
        "(do (= r p.pts[1].x) q.scale(2.0 3))"
    );
}

#[test]
fn literals() {
    assert_eq!(
        ast(r#"s: i8* = "hi\n"; c: i8 = 'a'; b: bool = true; a: i32[3] = [1, 2, 3,];"#),
        "(do (let s i8* \"hi\\n\") (let c i8 (as 97 i8)) (let b bool true) (let a i32[3] (array 1 2 3)))"
    );
}

#[test]
fn types() {
    assert_eq!(
        ast("a: vec<f32, 4>; b: i32[4]*; c: i32*[2]; d: void*;"),
        "(do (let a vec<f32,4>) (let b i32[4]*) (let c i32*[2]) (let d void*))"
    );
}

#[test]
fn vector_element_must_be_scalar() {
    let errs = errors("a: vec<i32*, 4>;");
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].0, ErrorKind::Type);
}

#[test]
fn array_length_must_be_constant() {
    let errs = errors("a: i32[n];");
    assert_eq!(errs.len(), 1);
    assert!(errs[0].1.contains("integer constant"));
}

#[test]
fn unknown_type_is_missing() {
    let errs = errors("p: Point;");
    assert_eq!(errs, [(ErrorKind::Missing, "undefined type `Point`".to_owned())]);
}

#[test]
fn struct_literal_versus_call() {
    assert_eq!(
        ast("struct P { x: f64, y: f64 }\np: P = P(1.0, 2.0);\nq: i32 = f(1);"),
        "(do (struct P (x f64) (y f64)) (let p P (object P 1.0 2.0)) (let q i32 (call f 1)))"
    );
}

#[test]
fn struct_is_registered_while_parsing() {
    let parsed = parse("struct Node { value: i32, next: Node* }");
    assert!(!parsed.diagnostics.has_errors());
    let def = parsed
        .registry
        .struct_def(&QualifiedName::global("Node"))
        .unwrap();
    assert_eq!(def.members.len(), 2);
    assert_eq!(def.layout.size, 16);
}

#[test]
fn struct_redefinition_is_logic_error() {
    let errs = errors("struct P { x: i32 }\nstruct P { y: i32 }");
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].0, ErrorKind::Logic);
}

#[test]
fn qualified_struct_from_another_module() {
    assert_eq!(
        ast("module geo;\nstruct P { x: f64 }\nmodule app;\np: geo::P = geo::P(1.0);"),
        "(do (module geo) (struct P (x f64)) (module app) (let p geo::P (object geo::P 1.0)))"
    );
}

#[test]
fn module_and_imports() {
    assert_eq!(
        ast("module a::b;\nimport c;\nimport root::d::e as f;"),
        "(do (module a::b) (import c) (import root::d::e as f))"
    );
}

#[test]
fn globals_and_generics() {
    assert_eq!(
        ast("global counter: i64 = 0;\ngeneric show(0) { i32: show_int, f64: io::show_float, default: show_any }"),
        "(do (global counter i64 0) (generic show 0 (i32 show_int) (f64 io::show_float) (default show_any)))"
    );
}

#[test]
fn functions() {
    assert_eq!(
        ast("fn add(a: i32, b: i32) -> i32 { return a + b; }\nfn printf(fmt: i8*, ...) -> i32;\nfn main() { return; }"),
        "(do (fn add ((a i32) (b i32)) i32 (do (return (+ a b)))) \
         (fn printf ((fmt i8*) ...) i32) \
         (fn main () void (do (return))))"
    );
}

#[test]
fn ellipsis_must_be_last() {
    let errs = errors("fn f(a: i32, ..., b: i32);");
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].0, ErrorKind::Syntax);
    assert!(errs[0].1.contains("must be the last"));
}

#[test]
fn control_flow() {
    assert_eq!(
        ast("if a { x = 1; } elif b { x = 2; } else { x = 3; }\n\
             while c { break; }\n\
             for i: i32 = 0; i < n; i += 1 { continue; }\n\
             { y = 1; }"),
        "(do (if a (do (= x 1)) b (do (= x 2)) else (do (= x 3))) \
         (while c (do (break))) \
         (for (let i i32 0) (< i n) (= i (+ i 1)) (do (continue))) \
         (do (= y 1)))"
    );
}

#[test]
fn empty_for_header_parts() {
    assert_eq!(ast("for ;; { break; }"), "(do (for () () () (do (break))))");
}

#[test]
fn elif_without_condition_is_syntax_error() {
    let errs = errors("if a { x = 1; } elif { x = 2; }");
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].0, ErrorKind::Syntax);
    assert!(errs[0].1.contains("missing condition after `elif`"));
}

#[test]
fn empty_brackets_are_not_a_condition() {
    for source in [
        "fn f(c: bool) { if c { } elif [] { } }",
        "fn f() { while [] { } }",
    ] {
        let errs = errors(source);
        assert_eq!(errs.len(), 1, "{source}: {errs:?}");
        assert_eq!(errs[0].0, ErrorKind::Syntax, "{source}");
        assert!(errs[0].1.starts_with("missing condition after"), "{source}");
    }
}

#[test]
fn block_and_if_values() {
    assert_eq!(
        ast("v: i32 = { a: i32 = 1; a + 1 };\nw: i32 = if c { 1 } else { 2 };"),
        "(do (let v i32 (block (let a i32 1) (+ a 1))) \
         (let w i32 (if c (block 1) else (block 2))))"
    );
}

#[test]
fn if_value_needs_else() {
    let errs = errors("v: i32 = if c { 1 };");
    assert_eq!(errs.len(), 1);
    assert!(errs[0].1.contains("needs an `else`"));
}

#[test]
fn sizeof_type_or_expression() {
    assert_eq!(
        ast("n: i64 = sizeof(i32[4]); m: i64 = sizeof(x + 1);"),
        "(do (let n i64 (sizeof i32[4])) (let m i64 (sizeof (+ x 1))))"
    );
}

#[test]
fn grad_rewrites_to_derivative() {
    assert_eq!(
        ast("d: f64 = grad(x * x + 3 * x, x);"),
        "(do (let d f64 (+ (+ x x) 3)))"
    );
}

#[test]
fn recovery_continues_after_bad_statement() {
    let parsed = parse("x: i32 = ;\ny: i32 = 2;");
    assert_eq!(parsed.diagnostics.error_count(), 1);
    assert_eq!(parsed.tree.to_string(), "(do (let y i32 2))");
}

#[test]
fn recovery_inside_function_body() {
    let parsed = parse("fn f() { x = = 1; y = 2; }\nfn g() {}");
    assert_eq!(parsed.diagnostics.error_count(), 1);
    assert_eq!(
        parsed.tree.to_string(),
        "(do (fn f () void (do (= y 2))) (fn g () void (do)))"
    );
}

#[test]
fn several_errors_are_all_reported() {
    let parsed = parse("x = ;\nif { }\ny: = 1;\nz = 3;");
    assert_eq!(parsed.diagnostics.error_count(), 3);
    assert_eq!(parsed.tree.to_string(), "(do (= z 3))");
}

#[test]
fn missing_semicolon() {
    let errs = errors("x = 1\ny = 2;");
    assert_eq!(errs.len(), 1);
    assert!(errs[0].1.starts_with("expected `;`"), "{}", errs[0].1);
}

#[test]
fn unterminated_block_reports_once() {
    let errs = errors("fn f() { x = 1;");
    assert_eq!(errs.len(), 1);
    assert!(errs[0].1.contains("end of input"), "{}", errs[0].1);
}

#[test]
fn lexer_errors_are_reported_in_place() {
    let parsed = parse("x: i32 = 1 @;\ny: i32 = 2;");
    assert_eq!(parsed.diagnostics.error_count(), 1);
    assert_eq!(parsed.tree.to_string(), "(do (let x i32 1) (let y i32 2))");
}

#[test]
fn stray_closing_brace() {
    let parsed = parse("} x = 1;");
    assert_eq!(parsed.diagnostics.error_count(), 1);
    assert_eq!(parsed.tree.to_string(), "(do (= x 1))");
}

#[test]
fn deep_nesting_does_not_overflow() {
    let depth = 5_000;
    let source = format!("x = {}1{};", "(".repeat(depth), ")".repeat(depth));
    assert_eq!(ast(&source), "(do (= x 1))");
}
