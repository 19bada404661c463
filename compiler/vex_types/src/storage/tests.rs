use pretty_assertions::assert_eq;
use proptest::prelude::*;
use vex_ir::{ModulePath, QualifiedName};

use super::*;

fn decide(
    reg: &TypeRegistry,
    existing: Option<&Type>,
    declared: Option<&Type>,
    value: &Type,
    site: StoreSite,
) -> Result<StorageAction, TypeError> {
    decide_storage(
        reg,
        &StorageRequest {
            existing,
            declared,
            value,
            site,
        },
    )
}

fn arr(elem: Type, len: u64) -> Type {
    Type::Array(Box::new(elem), len)
}

#[test]
fn fresh_composites_rebind() {
    let reg = TypeRegistry::new();
    let a = arr(Type::I32, 4);
    assert_eq!(
        decide(&reg, None, None, &a, StoreSite::Assign),
        Ok(StorageAction::Rebind)
    );
    assert_eq!(
        decide(&reg, Some(&a), None, &a, StoreSite::Assign),
        Ok(StorageAction::Rebind)
    );
}

#[test]
fn declared_composite_copies() {
    let reg = TypeRegistry::new();
    let a = arr(Type::I32, 4);
    assert_eq!(
        decide(&reg, None, Some(&a), &a, StoreSite::Init),
        Ok(StorageAction::ByteCopy { bytes: 16 })
    );
}

#[test]
fn vector_array_copy_is_bounded_by_smaller_side() {
    let reg = TypeRegistry::new();
    let v = Type::Vector(Scalar::I32, 4);
    let a = arr(Type::I32, 2);
    assert_eq!(
        decide(&reg, Some(&v), None, &a, StoreSite::Assign),
        Ok(StorageAction::ByteCopy { bytes: 8 })
    );
    assert_eq!(
        decide(&reg, Some(&a), None, &v, StoreSite::Assign),
        Ok(StorageAction::ByteCopy { bytes: 8 })
    );
}

#[test]
fn element_mismatch_is_a_type_error() {
    let reg = TypeRegistry::new();
    let v = Type::Vector(Scalar::F32, 4);
    let a = arr(Type::I32, 4);
    assert!(matches!(
        decide(&reg, None, Some(&v), &a, StoreSite::Init),
        Err(TypeError::Incompatible { .. })
    ));
}

#[test]
fn narrowing_store_warns() {
    let reg = TypeRegistry::new();
    assert_eq!(
        decide(&reg, Some(&Type::I32), None, &Type::F64, StoreSite::Assign),
        Ok(StorageAction::AllocateStore {
            conversion: Conversion::Demote,
            narrowing_warning: true,
        })
    );
}

#[test]
fn narrowing_into_struct_member_literal_is_an_error() {
    let reg = TypeRegistry::new();
    assert!(matches!(
        decide(&reg, Some(&Type::I32), None, &Type::F64, StoreSite::Element),
        Err(TypeError::Narrowing { .. })
    ));
}

#[test]
fn widening_store_is_silent() {
    let reg = TypeRegistry::new();
    assert_eq!(
        decide(&reg, None, Some(&Type::F64), &Type::I32, StoreSite::Init),
        Ok(StorageAction::AllocateStore {
            conversion: Conversion::Promote,
            narrowing_warning: false,
        })
    );
}

#[test]
fn pointer_stores() {
    let reg = TypeRegistry::new();
    let p = Type::I32.pointer_to();
    let bytes = Type::c_string();
    let q = Type::F64.pointer_to();
    assert_eq!(
        decide(&reg, Some(&p), None, &p, StoreSite::Assign),
        Ok(StorageAction::PointerStore { cast: false })
    );
    assert_eq!(
        decide(&reg, None, Some(&p), &bytes, StoreSite::Init),
        Ok(StorageAction::PointerStore { cast: true })
    );
    assert!(decide(&reg, Some(&p), None, &q, StoreSite::Assign).is_err());
    assert!(matches!(
        decide(&reg, Some(&p), None, &arr(Type::I32, 2), StoreSite::Assign),
        Err(TypeError::ArrayPointer { .. })
    ));
}

#[test]
fn structs_copy_or_bitcast() {
    let mut reg = TypeRegistry::new();
    let m = ModulePath::from(["m"]);
    let a = QualifiedName::new(m.clone(), "A");
    let b = QualifiedName::new(m.clone(), "B");
    let c = QualifiedName::new(m, "C");
    reg.register_struct(a.clone(), vec![("x".into(), Type::F64)]).unwrap();
    reg.register_struct(b.clone(), vec![("y".into(), Type::F64)]).unwrap();
    reg.register_struct(c.clone(), vec![("z".into(), Type::I8)]).unwrap();
    let (ta, tb, tc) = (Type::Struct(a), Type::Struct(b), Type::Struct(c));
    assert_eq!(
        decide(&reg, Some(&ta), None, &ta, StoreSite::Assign),
        Ok(StorageAction::ByteCopy { bytes: 8 })
    );
    assert_eq!(
        decide(&reg, None, Some(&ta), &tb, StoreSite::Init),
        Ok(StorageAction::BitCastStore)
    );
    assert!(decide(&reg, None, Some(&ta), &tc, StoreSite::Init).is_err());
}

#[test]
fn void_right_hand_side() {
    let reg = TypeRegistry::new();
    assert_eq!(
        decide(&reg, None, None, &Type::Void, StoreSite::Assign),
        Err(TypeError::VoidValue)
    );
}

#[test]
fn scalar_into_pointer_is_rejected() {
    let reg = TypeRegistry::new();
    assert!(decide(&reg, None, Some(&Type::I64.pointer_to()), &Type::I64, StoreSite::Init).is_err());
}

fn any_scalar() -> impl Strategy<Value = Scalar> {
    (0usize..Scalar::ALL.len()).prop_map(|i| Scalar::ALL[i])
}

proptest! {
    /// Storing A into B and back into A is either free both ways or
    /// flagged: a narrowing step always carries the warning.
    #[test]
    fn round_trip_is_lossless_or_flagged(a in any_scalar(), b in any_scalar()) {
        let reg = TypeRegistry::new();
        let (ta, tb) = (Type::Scalar(a), Type::Scalar(b));
        for (from, to) in [(&ta, &tb), (&tb, &ta)] {
            let action = decide(&reg, Some(to), None, from, StoreSite::Assign);
            match action {
                Ok(StorageAction::AllocateStore { conversion, narrowing_warning }) => {
                    prop_assert_eq!(narrowing_warning, to.as_scalar() < from.as_scalar());
                    prop_assert_eq!(narrowing_warning, conversion == Conversion::Demote);
                }
                other => prop_assert!(false, "unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn byte_copy_never_exceeds_either_side(n in 1u32..64, m in 1u64..64) {
        let reg = TypeRegistry::new();
        let v = Type::Vector(Scalar::F32, n);
        let a = arr(Type::Scalar(Scalar::F32), m);
        let action = decide(&reg, Some(&v), None, &a, StoreSite::Assign);
        let expected = (u64::from(n) * 4).min(m * 4);
        prop_assert_eq!(action, Ok(StorageAction::ByteCopy { bytes: expected }));
    }
}
