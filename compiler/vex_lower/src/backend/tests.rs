use super::*;

#[test]
fn scalar_casts() {
    assert_eq!(CastOp::between(Scalar::I32, Scalar::I64), Some(CastOp::SExt));
    assert_eq!(CastOp::between(Scalar::Bool, Scalar::I32), Some(CastOp::ZExt));
    assert_eq!(CastOp::between(Scalar::I64, Scalar::I8), Some(CastOp::Trunc));
    assert_eq!(CastOp::between(Scalar::I32, Scalar::F64), Some(CastOp::SiToFp));
    assert_eq!(CastOp::between(Scalar::F64, Scalar::I32), Some(CastOp::FpToSi));
    assert_eq!(CastOp::between(Scalar::F32, Scalar::F64), Some(CastOp::FpExt));
    assert_eq!(CastOp::between(Scalar::F64, Scalar::F32), Some(CastOp::FpTrunc));
    assert_eq!(CastOp::between(Scalar::I16, Scalar::I16), None);
}

#[test]
fn predicate_families() {
    assert!(Predicate::OLt.is_float());
    assert!(!Predicate::Slt.is_float());
    assert_eq!(Predicate::ONe.name(), "one");
}

#[test]
fn constants_print() {
    assert_eq!(Constant::Int(-3).to_string(), "-3");
    assert_eq!(Constant::Float(2.0).to_string(), "2.0");
    assert_eq!(Constant::Null.to_string(), "null");
}
