use pretty_assertions::assert_eq;
use vex_ir::ModulePath;

use super::*;

fn show() -> GenericDef {
    let mut targets = BTreeMap::new();
    targets.insert("i32".to_owned(), "_ZN2io8show_intE".to_owned());
    targets.insert("f64".to_owned(), "_ZN2io10show_floatE".to_owned());
    GenericDef {
        name: QualifiedName::new(ModulePath::from(["io"]), "show"),
        index: 0,
        targets,
        default: Some("_ZN2io8show_anyE".to_owned()),
    }
}

#[test]
fn exact_match_wins() {
    let mut table = GenericTable::new();
    table.define(show()).unwrap();
    assert_eq!(
        table.dispatch(&show().name, "f64"),
        Ok("_ZN2io10show_floatE")
    );
}

#[test]
fn falls_back_to_default() {
    let mut table = GenericTable::new();
    table.define(show()).unwrap();
    assert_eq!(table.dispatch(&show().name, "i8*"), Ok("_ZN2io8show_anyE"));
}

#[test]
fn miss_without_default_names_the_type() {
    let mut def = show();
    def.default = None;
    let mut table = GenericTable::new();
    table.define(def.clone()).unwrap();
    let err = table.dispatch(&def.name, "f32").unwrap_err();
    assert_eq!(err.to_string(), "generic `io::show` has no implementation for type `f32`");
    assert_eq!(err.kind(), vex_diagnostic::ErrorKind::Missing);
}

#[test]
fn redefinition_is_a_logic_error() {
    let mut table = GenericTable::new();
    table.define(show()).unwrap();
    let err = table.define(show()).unwrap_err();
    assert_eq!(err.kind(), vex_diagnostic::ErrorKind::Logic);
    assert!(table.import(show()).is_ok());
}
