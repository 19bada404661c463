use pretty_assertions::assert_eq;
use vex_diagnostic::ErrorKind;
use vex_ir::{FnSig, ModulePath, QualifiedName, Type};

use crate::{compile_unit, CompilationContext, ExportedFunction, ModuleInterface};

const MATH: &str = "module math;
    struct V { x: i32, y: i32 }
    global scale: i32 = 2;
    fn sub(a: i32, b: i32) -> i32 { return a - b; }
    fn add(a: i32, b: i32) -> i32 { return a + b; }
    fn puts(s: i8*) -> i32;";

fn math_interface() -> ModuleInterface {
    let mut ctx = CompilationContext::new("math.vx", ModulePath::global());
    compile_unit(&mut ctx, MATH, "math");
    assert!(!ctx.diagnostics.has_errors(), "{}", ctx.diagnostics.render_to_string());
    ctx.interface(ModulePath::from(["math"]))
}

#[test]
fn interface_lists_local_definitions_sorted() {
    let iface = math_interface();
    let names: Vec<String> = iface.functions.iter().map(|f| f.name.to_string()).collect();
    assert_eq!(names, vec!["math::add", "math::puts", "math::sub"]);
    assert_eq!(iface.functions[0].symbol, "_ZN4math3addE");
    assert_eq!(iface.functions[1].symbol, "puts");
    assert_eq!(iface.globals.len(), 1);
    assert_eq!(iface.globals[0].symbol, "_ZN4math5scaleE");
    assert_eq!(iface.structs.len(), 1);
    assert_eq!(iface.structs[0].layout.size, 8);
    assert_eq!(iface.modules, vec![ModulePath::from(["math"])]);
}

#[test]
fn imported_definitions_are_declared_on_use() {
    let iface = math_interface();
    let mut ctx = CompilationContext::new("app.vx", ModulePath::global());
    assert!(ctx.import_interface(&iface).is_ok());
    let module = compile_unit(
        &mut ctx,
        "import math;
         fn main() -> i32 { v: math::V = math::V(1, 2); return math::add(v.x, math::scale); }",
        "app",
    );
    assert!(!ctx.diagnostics.has_errors(), "{}", ctx.diagnostics.render_to_string());
    let listing = module.to_string();
    assert!(listing.contains("declare i32 @_ZN4math3addE(i32, i32)"), "{listing}");
    assert!(listing.contains("@_ZN4math5scaleE = external global i32"), "{listing}");

    // Nothing imported leaks into this unit's own interface.
    let own = ctx.interface(ModulePath::global());
    assert_eq!(own.functions.len(), 1);
    assert_eq!(own.functions[0].symbol, "main");
    assert!(own.globals.is_empty());
}

#[test]
fn reimporting_is_a_no_op() {
    let iface = math_interface();
    let mut ctx = CompilationContext::new("app.vx", ModulePath::global());
    assert!(ctx.import_interface(&iface).is_ok());
    assert!(ctx.import_interface(&iface).is_ok());
    assert_eq!(ctx.functions.len(), 3);
}

#[test]
fn conflicting_signatures_are_rejected() {
    let iface = math_interface();
    let mut ctx = CompilationContext::new("app.vx", ModulePath::global());
    assert!(ctx.import_interface(&iface).is_ok());

    let other = ModuleInterface {
        module: ModulePath::from(["math"]),
        functions: vec![ExportedFunction {
            name: QualifiedName::new(ModulePath::from(["math"]), "add"),
            symbol: "_ZN4math3addE".to_owned(),
            sig: FnSig {
                params: vec![Type::F64],
                ret: Type::F64,
                variadic: false,
            },
        }],
        ..ModuleInterface::default()
    };
    let err = ctx.import_interface(&other);
    assert!(matches!(err, Err(ref e) if e.kind == ErrorKind::Type), "{err:?}");
}

#[test]
fn generic_definitions_travel_with_the_interface() {
    let mut ctx = CompilationContext::new("fmt.vx", ModulePath::global());
    compile_unit(
        &mut ctx,
        "module fmt;
         fn show_int(x: i32) -> i32 { return x; }
         generic show(0) { i32: show_int }",
        "fmt",
    );
    let iface = ctx.interface(ModulePath::from(["fmt"]));
    assert_eq!(iface.generics.len(), 1);

    let mut app = CompilationContext::new("app.vx", ModulePath::global());
    assert!(app.import_interface(&iface).is_ok());
    let module = compile_unit(
        &mut app,
        "import fmt; fn main() { n = fmt::show(4); }",
        "app",
    );
    assert!(!app.diagnostics.has_errors(), "{}", app.diagnostics.render_to_string());
    assert!(module.to_string().contains("call i32 @_ZN3fmt8show_intE(i32 4)"));
}
