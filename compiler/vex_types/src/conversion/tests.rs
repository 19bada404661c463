use vex_ir::Scalar;

use super::*;

#[test]
fn promotion_is_implicit() {
    assert_eq!(
        convert(&Type::I32, &Type::F64, ConvertMode::Implicit),
        Ok(Conversion::Promote)
    );
    assert_eq!(
        convert(&Type::I64, &Type::I64, ConvertMode::Implicit),
        Ok(Conversion::Identity)
    );
}

#[test]
fn demotion_needs_a_cast_or_a_warned_store() {
    assert!(matches!(
        convert(&Type::F64, &Type::I32, ConvertMode::Implicit),
        Err(TypeError::Narrowing { .. })
    ));
    assert_eq!(
        convert(&Type::F64, &Type::I32, ConvertMode::WarnedStore),
        Ok(Conversion::Demote)
    );
    assert_eq!(
        convert(&Type::I64, &Type::Scalar(Scalar::I8), ConvertMode::Explicit),
        Ok(Conversion::Demote)
    );
}

#[test]
fn pointer_casts_are_explicit_only() {
    let a = Type::I32.pointer_to();
    let b = Type::I8.pointer_to();
    assert!(matches!(
        convert(&a, &b, ConvertMode::Implicit),
        Err(TypeError::PointerMismatch { .. })
    ));
    assert_eq!(convert(&a, &b, ConvertMode::Explicit), Ok(Conversion::PointerCast));
}

#[test]
fn pointer_integer_reinterpretation() {
    let p = Type::F64.pointer_to();
    assert_eq!(
        convert(&p, &Type::I64, ConvertMode::Explicit),
        Ok(Conversion::PointerToInt)
    );
    assert_eq!(
        convert(&Type::I64, &p, ConvertMode::Explicit),
        Ok(Conversion::IntToPointer)
    );
    assert!(convert(&Type::F64, &p, ConvertMode::Explicit).is_err());
    assert!(convert(&p, &Type::I64, ConvertMode::Implicit).is_err());
}

#[test]
fn arrays_never_decay() {
    let arr = Type::Array(Box::new(Type::I32), 4);
    let err = convert(&arr, &Type::I32.pointer_to(), ConvertMode::Explicit).unwrap_err();
    assert!(err.to_string().contains("take the address first"));
}

#[test]
fn void_is_never_a_value() {
    assert_eq!(
        convert(&Type::Void, &Type::I32, ConvertMode::Explicit),
        Err(TypeError::VoidValue)
    );
}
