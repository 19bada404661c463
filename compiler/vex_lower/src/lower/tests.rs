use pretty_assertions::assert_eq;
use vex_diagnostic::ErrorKind;
use vex_ir::ModulePath;

use crate::{compile_unit, CompilationContext, IrModule, Op};

fn compile(source: &str) -> (IrModule, CompilationContext) {
    let mut ctx = CompilationContext::new("test.vx", ModulePath::global());
    let module = compile_unit(&mut ctx, source, "test");
    (module, ctx)
}

/// The listing of a unit that must lower cleanly.
fn ir(source: &str) -> String {
    let (module, ctx) = compile(source);
    assert!(
        !ctx.diagnostics.has_errors(),
        "unexpected errors:\n{}",
        ctx.diagnostics.render_to_string()
    );
    module.to_string()
}

fn errors(source: &str) -> Vec<(ErrorKind, String)> {
    let (_, ctx) = compile(source);
    ctx.diagnostics
        .errors()
        .map(|d| (d.kind.unwrap_or(ErrorKind::Reported), d.message.clone()))
        .collect()
}

fn warnings(source: &str) -> Vec<String> {
    let (_, ctx) = compile(source);
    ctx.diagnostics
        .warnings()
        .map(|d| d.message.clone())
        .collect()
}

// Storage

#[test]
fn folded_arithmetic_is_stored_as_a_constant() {
    let listing = ir("fn main() -> i32 { x = 3 + 4 * 2; return x; }");
    assert_eq!(
        listing,
        "; module test\n\
         \n\
         define i32 @main() {\n\
         entry0:\n  \
         %5 = alloca i32\n  \
         store i32 11, i32* %5\n  \
         %6 = load i32, i32* %5\n  \
         ret i32 %6\n\
         }\n"
    );
}

#[test]
fn narrowing_store_warns_once() {
    let source = "fn main() { a: i32 = 5; a = 3.9; }";
    let listing = ir(source);
    assert!(listing.contains("store i32 3,"), "{listing}");
    assert_eq!(
        warnings(source),
        vec!["implicit narrowing from `f64` to `i32`".to_owned()]
    );
}

#[test]
fn narrowing_stores_on_one_line_each_warn() {
    let source = "fn main() { a: i32 = 0; b: i32 = 0; a = 3.9; b = 3.9; }";
    let (_, ctx) = compile(source);
    assert_eq!(ctx.diagnostics.warning_count(), 2);
    assert_eq!(
        warnings(source),
        vec!["implicit narrowing from `f64` to `i32`".to_owned(); 2]
    );
}

#[test]
fn float_literal_rounds_into_f32_silently() {
    let source = "fn main() { x: f32 = 0.1; y: f32 = x * 0.3; }";
    assert_eq!(warnings(source), Vec::<String>::new());
    assert!(!ir(source).contains("fptrunc"));
    assert_eq!(
        warnings("fn main() { z: f32 = 1.0e39; }"),
        vec!["implicit narrowing from `f64` to `f32`".to_owned()]
    );
}

#[test]
fn narrowing_argument_needs_a_cast() {
    let errs = errors("fn g(x: i32) {} fn f(y: f64) { g(y); }");
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].0, ErrorKind::Type);
    assert!(errs[0].1.contains("implicit narrowing"), "{}", errs[0].1);
}

#[test]
fn explicit_cast_converts() {
    let listing = ir("fn f(y: f64) -> i32 { return y as i32; }");
    assert!(listing.contains("fptosi f64"), "{listing}");
}

#[test]
fn aggregate_declaration_copies_bytes() {
    let listing = ir("fn main() { a: i32[3] = [1, 2, 3]; b = a; }");
    assert_eq!(listing.matches("alloca").count(), 2, "{listing}");
    assert!(listing.contains("memcpy"), "{listing}");
}

/// Instructions of the first block named `name` in function `func`.
fn block_ops<'m>(module: &'m IrModule, func: &str, name: &str) -> Vec<&'m Op> {
    let f = module
        .function(func)
        .unwrap_or_else(|| panic!("no function `{func}`"));
    f.blocks
        .iter()
        .filter_map(|&b| module.block(b))
        .find(|b| b.name == name)
        .unwrap_or_else(|| panic!("no block `{name}`"))
        .insts
        .iter()
        .map(|i| &i.op)
        .collect()
}

#[test]
fn rebind_in_the_declaring_scope_copies_nothing() {
    let listing = ir("fn f() -> i32 { a = [1, 2, 3]; b = [4, 5, 6]; a = b; return a[0]; }");
    assert!(!listing.contains("memcpy"), "{listing}");
}

#[test]
fn rebind_inside_a_branch_copies_into_the_outer_storage() {
    let source = "fn f(c: bool) -> i32 { a = [1, 2, 3]; b = [4, 5, 6]; if c { a = b; } return a[0]; }";
    let (module, ctx) = compile(source);
    assert!(!ctx.diagnostics.has_errors());
    assert!(warnings(source).is_empty());

    let then_ops = block_ops(&module, "f", "if.then");
    let Some(&&Op::Memcpy { dst, src, bytes }) =
        then_ops.iter().find(|op| matches!(op, Op::Memcpy { .. }))
    else {
        panic!("if.then does not copy: {then_ops:?}");
    };
    assert_ne!(dst, src);
    assert_eq!(bytes, 12);

    // After the branch, `a` still reads its own storage.
    let end_ops = block_ops(&module, "f", "if.end");
    assert!(
        end_ops
            .iter()
            .any(|op| matches!(op, Op::Gep { ptr, .. } if *ptr == dst)),
        "{end_ops:?}"
    );
}

#[test]
fn rebind_inside_a_loop_body_copies() {
    let listing = ir("fn g(n: i32) -> i32 {
            a = [1, 2, 3];
            b = [4, 5, 6];
            i: i32 = 0;
            while i < n { a = b; i += 1; }
            return a[0];
        }");
    assert!(listing.contains("memcpy"), "{listing}");
}

#[test]
fn nested_copy_into_shared_storage_warns() {
    let warns = warnings(
        "fn f(c: bool) { a = [1, 2, 3]; b = a; d = [7, 8, 9]; if c { b = d; } }",
    );
    assert_eq!(
        warns,
        vec!["assignment to `b` copies into storage shared with the value it was bound to".to_owned()]
    );
}

#[test]
fn compound_assignment_evaluates_the_index_once() {
    let source = "fn g() -> i64 { return 1; }\n\
                  fn f() -> i32 { a: i32[3] = [1, 2, 3]; a[g()] += 4; return a[1]; }";
    let (module, ctx) = compile(source);
    assert!(!ctx.diagnostics.has_errors(), "{}", ctx.diagnostics.render_to_string());
    let ops = block_ops(&module, "f", "entry");
    let calls = ops.iter().filter(|op| matches!(op, Op::Call { .. })).count();
    assert_eq!(calls, 1);
    let stores = ops.iter().filter(|op| matches!(op, Op::Store { .. })).count();
    let loads = ops.iter().filter(|op| matches!(op, Op::Load { .. })).count();
    assert!(stores >= 1 && loads >= 2, "{ops:?}");
}

#[test]
fn oversized_array_declaration_is_a_type_error() {
    let errs = errors("fn f() { x: i64[4611686018427387904]; }");
    assert_eq!(
        errs,
        vec![(
            ErrorKind::Type,
            "type `i64[4611686018427387904]` is too large".to_owned()
        )]
    );
}

#[test]
fn redeclaration_in_one_scope_is_rejected() {
    let errs = errors("fn f() { x: i32 = 1; x: i32 = 2; }");
    assert_eq!(
        errs,
        vec![(
            ErrorKind::Logic,
            "variable `x` is already declared in this scope".to_owned()
        )]
    );
}

#[test]
fn shadowing_in_a_nested_block_is_allowed() {
    ir("fn f() { x: i32 = 1; { x: i32 = 2; } x = 3; }");
}

#[test]
fn undefined_variable_is_missing() {
    let errs = errors("fn f() -> i32 { return y; }");
    assert_eq!(
        errs,
        vec![(ErrorKind::Missing, "undefined variable `y`".to_owned())]
    );
}

#[test]
fn same_undefined_name_twice_on_a_line() {
    let errs = errors("fn f() { x: i32 = y; z: i32 = y; }");
    assert_eq!(
        errs,
        vec![(ErrorKind::Missing, "undefined variable `y`".to_owned()); 2]
    );
}

#[test]
fn failed_last_statement_is_not_also_a_missing_return() {
    assert_eq!(errors("fn f() -> i32 { return y; }").len(), 1);
    assert_eq!(errors("fn f(c: bool) -> i32 { if c { return 1; } return c + q; }").len(), 1);
    let errs = errors("fn f() -> i32 { a: i32 = y; a = 1; }");
    assert_eq!(errs.len(), 2, "{errs:?}");
    assert_eq!(errs[0].0, ErrorKind::Missing);
    assert_eq!(errs[1].0, ErrorKind::Logic);
    assert!(errs[1].1.starts_with("missing return"), "{}", errs[1].1);
}

#[test]
fn errors_do_not_stop_the_rest_of_the_body() {
    let source = "fn f() { a: i32 = y; b: i32 = z; c: i32 = 1; }";
    let (module, ctx) = compile(source);
    assert_eq!(ctx.diagnostics.error_count(), 2);
    assert!(module.to_string().contains("store i32 1,"));
    assert_eq!(ctx.symbols.depth(), 0);
}

// Globals

#[test]
fn globals_are_emitted_and_loaded() {
    let listing = ir("global counter: i64 = 7;
         fn bump() -> i64 { counter = counter + 1; return counter; }");
    assert!(listing.contains("@counter = global i64 7"), "{listing}");
    assert!(listing.contains("load i64, i64* @counter"), "{listing}");
}

#[test]
fn global_initializer_must_be_constant() {
    let errs = errors("fn one() -> i32 { return 1; } global g: i32 = one();");
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].0, ErrorKind::Type);
}

#[test]
fn statement_outside_a_function() {
    let errs = errors("x = 1;");
    assert_eq!(
        errs,
        vec![(
            ErrorKind::Logic,
            "executable statement outside a function".to_owned()
        )]
    );
}

// Operators

#[test]
fn division_by_constant_zero() {
    let errs = errors("fn f(a: i32) -> i32 { return a / 0; }");
    assert_eq!(errs, vec![(ErrorKind::Math, "division by zero".to_owned())]);
}

#[test]
fn bitwise_operator_on_floats() {
    let errs = errors("fn f(a: f64) -> f64 { return a & 1.0; }");
    assert_eq!(
        errs,
        vec![(
            ErrorKind::Math,
            "operator `&` is not supported for `f64`".to_owned()
        )]
    );
}

#[test]
fn logical_and_short_circuits() {
    let listing = ir("fn f(a: bool, b: bool) -> bool { return a && b; }");
    assert!(listing.contains("and.rhs1:"), "{listing}");
    assert!(listing.contains("phi bool [0, %entry0]"), "{listing}");
}

// Functions and calls

#[test]
fn missing_return_is_a_logic_error() {
    let errs = errors("fn f() -> i32 { x = 1; }");
    assert_eq!(
        errs,
        vec![(
            ErrorKind::Logic,
            "missing return in function `f` returning `i32`".to_owned()
        )]
    );
}

#[test]
fn code_after_return_warns_once() {
    let warns = warnings("fn f() -> i32 { return 1; x = 2; y = 3; }");
    assert_eq!(warns, vec!["unreachable code".to_owned()]);
}

#[test]
fn return_outside_a_function() {
    let errs = errors("return 1;");
    assert_eq!(
        errs,
        vec![(ErrorKind::Logic, "`return` outside of a function".to_owned())]
    );
}

#[test]
fn function_redefinition() {
    let errs = errors("fn f() {} fn f() {}");
    assert_eq!(
        errs,
        vec![(ErrorKind::Logic, "function `f` is already defined".to_owned())]
    );
}

#[test]
fn wrong_arity() {
    let errs = errors("fn g(x: i32) {} fn f() { g(1, 2); }");
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].0, ErrorKind::Type);
}

#[test]
fn variadic_call_keeps_c_symbol() {
    let listing = ir("fn printf(fmt: i8*, ...) -> i32;
         fn main() { printf(\"%d\", 1); }");
    assert!(listing.contains("declare i32 @printf(i8*, ...)"), "{listing}");
    assert!(
        listing.contains("call i32 @printf(i8* @.str.0, i32 1)"),
        "{listing}"
    );
}

#[test]
fn qualified_and_aliased_calls_share_a_symbol() {
    let listing = ir("module a::b::c;
         fn f() {}
         module app;
         import a::b::c as d;
         fn main() { d::f(); a::b::c::f(); }");
    assert!(listing.contains("define void @_ZN1a1b1c1fE()"), "{listing}");
    assert_eq!(
        listing.matches("call void @_ZN1a1b1c1fE()").count(),
        2,
        "{listing}"
    );
}

#[test]
fn redundant_module_declaration_warns() {
    let warns = warnings("module a; module a;");
    assert_eq!(warns, vec!["redundant module declaration `a`".to_owned()]);
}

// Generics

const SHOW: &str = "fn show_int(x: i32) -> i32 { return 1; }
     fn show_any(x: f64) -> i32 { return 0; }";

#[test]
fn generic_dispatches_on_argument_type() {
    let source = format!(
        "{SHOW}
         generic show(0) {{ i32: show_int, default: show_any }}
         fn main() {{ a = show(5); b = show(2.5); }}"
    );
    let listing = ir(&source);
    assert!(listing.contains("call i32 @show_int(i32 5)"), "{listing}");
    assert!(listing.contains("call i32 @show_any(f64 2.5)"), "{listing}");
}

#[test]
fn generic_without_match_names_the_type() {
    let source = format!(
        "{SHOW}
         generic show(0) {{ i32: show_int }}
         fn main() {{ b = show(2.5); }}"
    );
    let errs = errors(&source);
    assert_eq!(
        errs,
        vec![(
            ErrorKind::Missing,
            "generic `show` has no implementation for type `f64`".to_owned()
        )]
    );
}

// Control flow

#[test]
fn break_outside_a_loop() {
    let errs = errors("fn main() { break; }");
    assert_eq!(
        errs,
        vec![(ErrorKind::Logic, "`break` outside of a loop".to_owned())]
    );
}

#[test]
fn break_inside_if_leaves_the_loop() {
    let (module, ctx) = compile(
        "fn main() { i: i32 = 0; while i < 10 { if i == 5 { break; } i = i + 1; } }",
    );
    assert!(!ctx.diagnostics.has_errors());
    let main = module.function("main").unwrap_or_else(|| panic!("no main"));
    let then_block = main
        .blocks
        .iter()
        .filter_map(|&b| module.block(b))
        .find(|b| b.name == "if.then")
        .unwrap_or_else(|| panic!("no if.then block"));
    let Some(Op::Br(dest)) = then_block.insts.last().map(|i| &i.op) else {
        panic!("if.then does not end in a branch");
    };
    assert_eq!(module.block(*dest).map(|b| b.name.as_str()), Some("while.end"));
    assert!(warnings("fn main() { while true { break; } }").is_empty());
}

#[test]
fn constant_true_loop_without_break_warns() {
    let warns = warnings("fn main() { while true { x = 1; } }");
    assert_eq!(warns, vec!["possible infinite loop".to_owned()]);
}

#[test]
fn constant_condition_warns() {
    let warns = warnings("fn main() { if false { x = 1; } }");
    assert_eq!(warns, vec!["condition is always false".to_owned()]);
}

#[test]
fn for_loop_continue_runs_the_step() {
    let listing = ir("fn f() -> i32 {
            s: i32 = 0;
            for i: i32 = 0; i < 10; i += 1 { if i == 3 { continue; } s += i; }
            return s;
        }");
    assert!(listing.contains("br label %for.step"), "{listing}");
}

#[test]
fn if_expression_merges_with_phi() {
    let listing = ir("fn f(c: bool) -> i32 { v: i32 = if c { 1 } else { 2 }; return v; }");
    assert!(listing.contains("phi i32 [1, %if.then"), "{listing}");
}

#[test]
fn if_expression_arms_must_agree() {
    let errs = errors("fn f(c: bool, x: f64, y: i32) { v = if c { x } else { y }; }");
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].0, ErrorKind::Logic);
    assert!(errs[0].1.starts_with("ambiguous phi merge"), "{}", errs[0].1);
}

#[test]
fn block_expression_yields_its_tail() {
    let listing = ir("fn f() -> i32 { v: i32 = { a: i32 = 1; a + 1 }; return v; }");
    assert!(listing.contains("add i32"), "{listing}");
}

// Structs

#[test]
fn struct_members_and_methods() {
    let listing = ir("module geo;
         struct P { x: f64, y: f64 }
         fn norm(p: P*) -> f64 { return p.x * p.x + p.y * p.y; }
         module app;
         fn main() { p: geo::P = geo::P(3.0, 4.0); p.y = 1.0; n: f64 = p.norm(); }");
    assert!(listing.contains("alloca geo::P"), "{listing}");
    assert!(listing.contains("store f64 1.0,"), "{listing}");
    assert!(
        listing.contains("call f64 @_ZN3geo4normE(geo::P* %"),
        "{listing}"
    );
}

#[test]
fn unknown_method() {
    let errs = errors("struct P { x: i32 } fn main() { p: P = P(1); p.grow(); }");
    assert_eq!(
        errs,
        vec![(ErrorKind::Missing, "struct `P` has no method `grow`".to_owned())]
    );
}

#[test]
fn struct_literal_arity() {
    let errs = errors("struct P { x: i32, y: i32 } fn main() { p: P = P(1); }");
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].0, ErrorKind::Type);
}
