use proptest::prelude::*;

use super::*;

fn any_scalar() -> impl Strategy<Value = Scalar> {
    (0usize..Scalar::ALL.len()).prop_map(|i| Scalar::ALL[i])
}

#[test]
fn common_type_of_int_and_float_is_float() {
    assert_eq!(common_scalar(Scalar::I64, Scalar::F32), Scalar::F32);
    assert_eq!(common_scalar(Scalar::I32, Scalar::I32), Scalar::I32);
    assert_eq!(common_scalar(Scalar::Bool, Scalar::I8), Scalar::I8);
}

#[test]
fn literal_representability() {
    assert!(literal_fits(NumValue::Int(127), Scalar::I8));
    assert!(!literal_fits(NumValue::Int(128), Scalar::I8));
    assert!(literal_fits(NumValue::Int(1), Scalar::Bool));
    assert!(literal_fits(NumValue::Int(5), Scalar::F64));
    assert!(!literal_fits(NumValue::Float(3.9), Scalar::I32));
    assert!(literal_fits(NumValue::Float(0.5), Scalar::F32));
    assert!(!literal_fits(NumValue::Int((1 << 24) + 1), Scalar::F32));
}

#[test]
fn float_literal_rounds_to_nearest_f32() {
    assert!(literal_fits(NumValue::Float(0.1), Scalar::F32));
    assert!(literal_fits(NumValue::Float(3.141_592_653_589_793), Scalar::F32));
    assert!(literal_fits(NumValue::Float(f64::from(f32::MAX)), Scalar::F32));
    assert!(!literal_fits(NumValue::Float(1e39), Scalar::F32));
    assert!(!literal_fits(NumValue::Float(f64::MAX), Scalar::F32));
}

#[test]
fn default_literal_widens_when_needed() {
    assert_eq!(default_literal_scalar(NumValue::Int(3)), Scalar::I32);
    assert_eq!(default_literal_scalar(NumValue::Int(1 << 40)), Scalar::I64);
    assert_eq!(default_literal_scalar(NumValue::Float(1.0)), Scalar::F64);
}

proptest! {
    #[test]
    fn common_scalar_is_an_upper_bound(a in any_scalar(), b in any_scalar()) {
        let c = common_scalar(a, b);
        prop_assert!(promotes_to(a, c));
        prop_assert!(promotes_to(b, c));
        prop_assert_eq!(c, common_scalar(b, a));
    }

    #[test]
    fn promotion_is_transitive(a in any_scalar(), b in any_scalar(), c in any_scalar()) {
        if promotes_to(a, b) && promotes_to(b, c) {
            prop_assert!(promotes_to(a, c));
        }
    }
}
