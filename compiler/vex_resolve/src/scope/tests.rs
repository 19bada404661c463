use proptest::prelude::*;

use super::*;

fn block(n: u32) -> BlockId {
    BlockId::from_raw(n)
}

fn binding(n: u32) -> Binding {
    Binding::local(Type::I32, ValueId::from_raw(n))
}

#[test]
fn innermost_binding_wins() {
    let mut table = SymbolTable::new();
    table.push(block(0));
    table.insert("x", binding(1));
    table.push(block(1));
    table.insert("x", binding(2));
    assert_eq!(table.find("x").map(|b| b.addr.raw()), Some(2));
    table.pop();
    assert_eq!(table.find("x").map(|b| b.addr.raw()), Some(1));
}

#[test]
fn popped_bindings_are_gone() {
    let mut table = SymbolTable::new();
    table.push(block(0));
    table.with_scope(block(1), |t| {
        t.insert("tmp", binding(3));
        assert!(t.find("tmp").is_some());
    });
    assert!(table.find("tmp").is_none());
    assert_eq!(table.depth(), 1);
}

#[test]
fn loop_targets_are_inherited_through_plain_scopes() {
    let mut table = SymbolTable::new();
    table.push(block(0));
    assert_eq!(table.loop_targets(), None);
    table.push_loop(block(1), block(9), block(8));
    table.push(block(2));
    table.push(block(3));
    assert_eq!(table.loop_targets(), Some((block(9), block(8))));
    table.push_loop(block(4), block(7), block(6));
    assert_eq!(table.loop_targets(), Some((block(7), block(6))));
    table.pop();
    assert_eq!(table.loop_targets(), Some((block(9), block(8))));
}

#[test]
fn is_local_only_checks_innermost() {
    let mut table = SymbolTable::new();
    table.push(block(0));
    table.insert("a", binding(0));
    table.push(block(1));
    assert!(!table.is_local("a"));
    assert!(table.find("a").is_some());
}

#[test]
fn find_mut_updates_in_place() {
    let mut table = SymbolTable::new();
    table.push(block(0));
    table.insert("v", binding(0));
    if let Some(b) = table.find_mut("v") {
        b.ty = Type::F64;
    }
    assert_eq!(table.find("v").map(|b| b.ty.clone()), Some(Type::F64));
}

#[test]
fn shared_storage_is_flagged_on_every_alias() {
    let mut table = SymbolTable::new();
    table.push(block(0));
    table.insert("a", binding(4));
    table.insert("b", binding(5));
    assert!(table.shares_storage("c", ValueId::from_raw(4)));
    assert!(!table.shares_storage("a", ValueId::from_raw(4)));

    table.insert("c", binding(4));
    table.mark_shared(ValueId::from_raw(4));
    let owns = |t: &SymbolTable, n: &str| t.find(n).map(Binding::owns_storage);
    assert_eq!(owns(&table, "a"), Some(false));
    assert_eq!(owns(&table, "c"), Some(false));
    assert_eq!(owns(&table, "b"), Some(true));
}

#[test]
fn with_scope_pops_on_error_results() {
    let mut table = SymbolTable::new();
    let result: Result<(), &str> = table.with_scope(block(0), |t| {
        t.insert("x", binding(1));
        Err("failed")
    });
    assert!(result.is_err());
    assert_eq!(table.depth(), 0);
}

proptest! {
    /// Any nesting of scoped work, failing or not, leaves the stack balanced.
    #[test]
    fn scopes_stay_balanced(shape in proptest::collection::vec((0u8..3, any::<bool>()), 0..40)) {
        let mut table = SymbolTable::new();
        fn nest(t: &mut SymbolTable, shape: &[(u8, bool)]) -> Result<(), ()> {
            let Some(((kind, fail), rest)) = shape.split_first() else {
                return Ok(());
            };
            let run = |t: &mut SymbolTable| {
                t.insert("x", Binding::local(Type::I32, ValueId::NONE));
                if *fail { Err(()) } else { nest(t, rest) }
            };
            match kind {
                0 => t.with_scope(BlockId::NONE, run),
                _ => {
                    t.push_loop(BlockId::NONE, BlockId::NONE, BlockId::NONE);
                    let r = run(t);
                    t.pop();
                    r
                }
            }
        }
        let _ = nest(&mut table, &shape);
        prop_assert_eq!(table.depth(), 0);
    }
}
