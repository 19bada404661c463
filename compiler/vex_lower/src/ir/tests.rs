use pretty_assertions::assert_eq;
use vex_ir::{FnSig, Scalar, Type};

use super::*;

fn sig(params: Vec<Type>, ret: Type) -> FnSig {
    FnSig {
        params,
        ret,
        variadic: false,
    }
}

#[test]
fn redeclaring_returns_the_same_function() {
    let mut m = IrModule::new("t");
    let a = m.declare_function("f", &sig(vec![], Type::Void));
    let b = m.declare_function("f", &sig(vec![], Type::Void));
    assert_eq!(a, b);
    assert_eq!(m.functions().len(), 1);
}

#[test]
fn allocas_are_hoisted_into_the_entry_block() {
    let mut m = IrModule::new("t");
    let f = m.declare_function("f", &sig(vec![], Type::Void));
    m.define_function(f);
    let one = m.const_int(Scalar::I32, 1);
    let first = m.alloca(&Type::I32, "a");
    m.store(one, first);
    let body = m.append_block(f, "body");
    m.br(body);
    m.position_at_end(body);
    let second = m.alloca(&Type::F64, "b");
    m.ret(None);

    let func = &m.functions()[0];
    let entry = m.block(func.blocks[0]).map(|b| b.insts.clone()).unwrap_or_default();
    assert_eq!(entry[0].result, Some(first));
    assert_eq!(entry[1].result, Some(second));
    assert!(matches!(entry[2].op, Op::Store { .. }));
    assert!(m.has_terminator(body));
    assert_eq!(m.value_type(second), Type::F64.pointer_to());
}

#[test]
fn void_calls_have_no_result() {
    let mut m = IrModule::new("t");
    let callee = m.declare_function("g", &sig(vec![], Type::Void));
    let f = m.declare_function("f", &sig(vec![], Type::I32));
    m.define_function(f);
    assert_eq!(m.call(callee, &[]), None);
    let h = m.declare_function("h", &sig(vec![], Type::I32));
    assert!(m.call(h, &[]).is_some());
}

#[test]
fn listing() {
    let mut m = IrModule::new("demo");
    m.global("counter", &Type::I32, Some(Constant::Int(7)), false);
    let puts = m.declare_function(
        "puts",
        &FnSig {
            params: vec![Type::c_string()],
            ret: Type::I32,
            variadic: true,
        },
    );
    let main = m.declare_function("main", &sig(vec![], Type::I32));
    m.define_function(main);
    let text = m.const_string("hi");
    m.call(puts, &[text]);
    let zero = m.const_int(Scalar::I32, 0);
    m.ret(Some(zero));

    let expected = "\
; module demo
@counter = global i32 7
@.str.0 = constant \"hi\"

declare i32 @puts(i8*, ...)

define i32 @main() {
entry0:
  %3 = call i32 @puts(i8* @.str.0)
  ret i32 0
}
";
    assert_eq!(m.to_string(), expected);
}
