use super::*;

#[test]
fn parse_and_display() {
    let path = ModulePath::parse("a::b::c");
    assert_eq!(path.segments(), ["a", "b", "c"]);
    assert_eq!(path.to_string(), "a::b::c");
    assert!(ModulePath::parse("").is_global());
}

#[test]
fn parent_of_global_is_global() {
    assert!(ModulePath::global().parent().is_global());
    assert_eq!(ModulePath::from(["a", "b"]).parent(), ModulePath::from(["a"]));
}

#[test]
fn join_extends() {
    let base = ModulePath::from(["pkg"]);
    let joined = base.join(&["x".to_owned(), "y".to_owned()]);
    assert_eq!(joined.to_string(), "pkg::x::y");
    assert!(joined.starts_with(base.segments()));
}

#[test]
fn qualified_name_display() {
    assert_eq!(QualifiedName::global("printf").to_string(), "printf");
    assert_eq!(
        QualifiedName::new(ModulePath::from(["m"]), "f").to_string(),
        "m::f"
    );
}
