use pretty_assertions::assert_eq;

use super::*;
use crate::mangle;

fn segs(text: &str) -> Vec<String> {
    ModulePath::parse(text).into_segments()
}

fn resolver() -> ModuleResolver {
    let mut r = ModuleResolver::new(ModulePath::from(["pkg"]));
    r.set_current(ModulePath::from(["pkg", "app"]));
    r.add_known(ModulePath::from(["a", "b", "c"]));
    r.add_known(ModulePath::from(["pkg", "util"]));
    r
}

#[test]
fn unqualified_tries_current_then_global() {
    let r = resolver();
    let c = r.candidates(&[], "f");
    assert_eq!(
        c.iter().map(ToString::to_string).collect::<Vec<_>>(),
        vec!["pkg::app::f", "f"]
    );
}

#[test]
fn root_is_the_package_prefix() {
    let r = resolver();
    let c = r.candidates(&segs("root::util"), "f");
    assert_eq!(c.len(), 1);
    assert_eq!(c[0].to_string(), "pkg::util::f");
}

#[test]
fn qualified_tries_relative_alias_then_as_written() {
    let mut r = resolver();
    r.resolve_import(&segs("a::b::c"), Some("d")).unwrap();
    let c = r.candidates(&segs("d"), "f");
    assert_eq!(
        c.iter().map(ToString::to_string).collect::<Vec<_>>(),
        vec!["pkg::app::d::f", "a::b::c::f", "d::f"]
    );
}

#[test]
fn longest_alias_prefix_wins() {
    let mut r = resolver();
    r.add_known(ModulePath::from(["a", "b"]));
    r.resolve_import(&segs("a::b"), Some("x")).unwrap();
    r.resolve_import(&segs("a::b::c"), Some("y")).unwrap();
    let c = r.candidates(&segs("a::b::c"), "f");
    assert!(c.iter().any(|q| q.to_string() == "a::b::c::f"));
    let aliased = r.candidates(&segs("x::c"), "g");
    assert!(aliased.iter().any(|q| q.to_string() == "a::b::c::g"));
}

#[test]
fn unknown_import_is_missing() {
    let mut r = resolver();
    let err = r.resolve_import(&segs("nope"), None).unwrap_err();
    assert_eq!(err, ResolveError::UnknownModule("nope".into()));
    assert_eq!(err.kind(), vex_diagnostic::ErrorKind::Missing);
}

#[test]
fn sibling_import_resolves_relative_to_parent() {
    let mut r = resolver();
    assert_eq!(
        r.resolve_import(&segs("util"), None),
        Ok(ModulePath::from(["pkg", "util"]))
    );
    assert_eq!(
        r.resolve_import(&segs("root::util"), None),
        Ok(ModulePath::from(["pkg", "util"]))
    );
}

#[test]
fn resolution_is_idempotent() {
    let mut r = resolver();
    let canonical = r.resolve_import(&segs("a::b::c"), Some("d")).unwrap();
    let text = canonical.to_string();
    assert_eq!(r.resolve_path(&text), canonical);
    assert_eq!(r.resolve_path(&r.resolve_path(&text).to_string()), canonical);
    assert_eq!(r.resolve_path("d"), canonical);
}

#[test]
fn spellings_converge_on_one_mangled_name() {
    let mut r = resolver();
    r.resolve_import(&segs("a::b::c"), None).unwrap();
    r.resolve_import(&segs("a::b::c"), Some("d")).unwrap();
    let exported = QualifiedName::new(ModulePath::from(["a", "b", "c"]), "f");
    let via_alias = r.candidates(&segs("d"), "f");
    let via_full = r.candidates(&segs("a::b::c"), "f");
    let pick = |c: &Candidates| c.iter().find(|q| **q == exported).map(mangle);
    assert_eq!(pick(&via_alias), pick(&via_full));
    assert!(pick(&via_alias).is_some());
}

#[test]
fn redundant_module_declaration_is_reported() {
    let mut r = resolver();
    assert!(!r.set_current(ModulePath::from(["pkg", "app"])));
    assert!(r.set_current(ModulePath::from(["pkg", "other"])));
}
