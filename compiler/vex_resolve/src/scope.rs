//! Lexical scopes.
//!
//! A [`SymbolTable`] is a stack of [`Scope`]s. Lookup walks innermost to
//! outermost; insertion always targets the innermost scope. Popping a
//! scope drops its bindings for good.
//!
//! `break`/`continue` targets are copied into every pushed scope, so a
//! `break` inside an `if` inside a `while` still finds the loop. Only
//! [`SymbolTable::push_loop`] replaces them.

use bitflags::bitflags;
use rustc_hash::FxHashMap;
use tracing::trace;
use vex_ir::{BlockId, Type, ValueId};

bitflags! {
    /// Properties of a binding.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
    pub struct BindingFlags: u8 {
        /// A function parameter.
        const PARAMETER = 1 << 0;
        /// Shares storage with the value it was bound to (array/vector rebind).
        const REBOUND   = 1 << 1;
    }
}

/// A named storage location.
#[derive(Clone, Debug, PartialEq)]
pub struct Binding {
    /// Content type.
    pub ty: Type,
    /// Address of the storage.
    pub addr: ValueId,
    pub flags: BindingFlags,
}

impl Binding {
    /// A binding with its own slot.
    pub fn local(ty: Type, addr: ValueId) -> Self {
        Binding {
            ty,
            addr,
            flags: BindingFlags::empty(),
        }
    }

    /// Whether writes to `addr` are visible only through this binding.
    pub fn owns_storage(&self) -> bool {
        !self.flags.contains(BindingFlags::REBOUND)
    }
}

#[derive(Clone, Debug)]
pub struct Scope {
    pub block: BlockId,
    bindings: FxHashMap<String, Binding>,
    pub loop_exit: Option<BlockId>,
    pub loop_entry: Option<BlockId>,
}

impl Scope {
    fn new(block: BlockId, loop_exit: Option<BlockId>, loop_entry: Option<BlockId>) -> Self {
        Scope {
            block,
            bindings: FxHashMap::default(),
            loop_exit,
            loop_entry,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable::default()
    }

    /// Enter a non-loop scope; loop targets carry over.
    pub fn push(&mut self, block: BlockId) {
        let (exit, entry) = self
            .scopes
            .last()
            .map_or((None, None), |s| (s.loop_exit, s.loop_entry));
        self.scopes.push(Scope::new(block, exit, entry));
        trace!(depth = self.scopes.len(), "push scope");
    }

    /// Enter a loop body: `exit` is where `break` goes, `entry` where
    /// `continue` goes.
    pub fn push_loop(&mut self, block: BlockId, exit: BlockId, entry: BlockId) {
        self.scopes.push(Scope::new(block, Some(exit), Some(entry)));
        trace!(depth = self.scopes.len(), "push loop scope");
    }

    pub fn pop(&mut self) -> Option<Scope> {
        trace!(depth = self.scopes.len(), "pop scope");
        self.scopes.pop()
    }

    /// Run `f` inside a fresh scope, popping it on every exit path.
    pub fn with_scope<R>(&mut self, block: BlockId, f: impl FnOnce(&mut Self) -> R) -> R {
        self.push(block);
        let result = f(self);
        self.pop();
        result
    }

    pub fn find(&self, name: &str) -> Option<&Binding> {
        self.scopes.iter().rev().find_map(|s| s.bindings.get(name))
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Binding> {
        self.scopes
            .iter_mut()
            .rev()
            .find_map(|s| s.bindings.get_mut(name))
    }

    /// Whether a binding not named `name` has its storage at `addr`.
    pub fn shares_storage(&self, name: &str, addr: ValueId) -> bool {
        self.scopes
            .iter()
            .flat_map(|s| s.bindings.iter())
            .any(|(other, b)| other != name && b.addr == addr)
    }

    /// Flag every binding whose storage is at `addr` as sharing it.
    pub fn mark_shared(&mut self, addr: ValueId) {
        for binding in self
            .scopes
            .iter_mut()
            .flat_map(|s| s.bindings.values_mut())
            .filter(|b| b.addr == addr)
        {
            binding.flags |= BindingFlags::REBOUND;
        }
    }

    /// Whether `name` is bound in the innermost scope.
    pub fn is_local(&self, name: &str) -> bool {
        self.scopes
            .last()
            .is_some_and(|s| s.bindings.contains_key(name))
    }

    /// Bind `name` in the innermost scope, returning any binding it replaced.
    /// Without a scope, nothing is bound.
    pub fn insert(&mut self, name: impl Into<String>, binding: Binding) -> Option<Binding> {
        self.scopes
            .last_mut()
            .and_then(|s| s.bindings.insert(name.into(), binding))
    }

    /// `(exit, entry)` of the innermost enclosing loop.
    pub fn loop_targets(&self) -> Option<(BlockId, BlockId)> {
        let scope = self.scopes.last()?;
        Some((scope.loop_exit?, scope.loop_entry?))
    }

    pub fn current(&self) -> Option<&Scope> {
        self.scopes.last()
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}

#[cfg(test)]
mod tests;
