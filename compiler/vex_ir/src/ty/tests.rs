use super::*;
use crate::ModulePath;

#[test]
fn lattice_order_follows_declaration() {
    let ranks: Vec<u8> = Scalar::ALL.iter().map(|s| s.rank()).collect();
    assert_eq!(ranks, (0..8).collect::<Vec<u8>>());
    assert!(Scalar::I128 < Scalar::F32);
    assert!(Scalar::Bool < Scalar::I8);
}

#[test]
fn scalar_names_parse_back() {
    for s in Scalar::ALL {
        assert_eq!(Scalar::from_name(s.name()), Some(s));
    }
    assert_eq!(Scalar::from_name("u32"), None);
}

#[test]
fn type_display() {
    let point = Type::Struct(QualifiedName::new(ModulePath::from(["geo"]), "Point"));
    assert_eq!(point.to_string(), "geo::Point");
    assert_eq!(Type::c_string().to_string(), "i8*");
    assert_eq!(
        Type::Array(Box::new(Type::F64), 4).pointer_to().to_string(),
        "f64[4]*"
    );
    assert_eq!(Type::Vector(Scalar::F32, 4).to_string(), "vec<f32,4>");
}

#[test]
fn signature_display_with_varargs() {
    let sig = FnSig {
        params: vec![Type::c_string()],
        ret: Type::I32,
        variadic: true,
    };
    assert_eq!(sig.to_string(), "fn(i8*, ...) -> i32");
}

#[test]
fn aggregates() {
    assert!(Type::Vector(Scalar::I32, 2).is_aggregate());
    assert!(!Type::I64.pointer_to().is_aggregate());
    assert_eq!(Type::Vector(Scalar::I16, 8).element(), Some(Type::Scalar(Scalar::I16)));
}
