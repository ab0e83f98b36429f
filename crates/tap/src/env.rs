//! Lexical environment stack.
//!
//! A growable `Vec<Environment>` used strictly as a LIFO stack, capped by
//! [`crate::limits::Limits::max_env_stack`] so recursion depth is still
//! bounded, against a configurable ceiling rather than a fixed array
//! size.

use crate::symtab::SymbolTable;
use crate::types_registry::TypeTag;

/// A single lexical scope: its own symbol table, the index of its parent
/// scope in the owning `EnvStack`, the number of user bindings inserted
/// since the scope was entered (used by the tail-call reuse rule), and
/// the composite types declared directly in this scope.
#[derive(Debug)]
pub struct Environment {
    pub table: SymbolTable,
    pub parent: Option<usize>,
    pub insertions: usize,
    pub declared_types: Vec<TypeTag>,
}

impl Environment {
    #[must_use]
    pub fn root() -> Self {
        Self {
            table: SymbolTable::root(),
            parent: None,
            insertions: 0,
            declared_types: Vec::new(),
        }
    }

    #[must_use]
    pub fn child(parent: usize) -> Self {
        Self {
            table: SymbolTable::scope(),
            parent: Some(parent),
            insertions: 0,
            declared_types: Vec::new(),
        }
    }
}

/// The full stack of live environments, always containing at least the
/// root scope at index 0. `current` is the top-of-stack index.
#[derive(Debug)]
pub struct EnvStack {
    scopes: Vec<Environment>,
    max_depth: usize,
}

impl EnvStack {
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self { scopes: vec![Environment::root()], max_depth }
    }

    #[must_use]
    pub fn current(&self) -> usize {
        self.scopes.len() - 1
    }

    #[must_use]
    pub fn get(&self, idx: usize) -> &Environment {
        &self.scopes[idx]
    }

    pub fn get_mut(&mut self, idx: usize) -> &mut Environment {
        &mut self.scopes[idx]
    }

    /// Pushes a fresh child scope on top of `current`, returning its index.
    /// Returns `Err` if doing so would exceed `max_depth`.
    pub fn enter(&mut self) -> Result<usize, EnvStackOverflow> {
        if self.scopes.len() >= self.max_depth {
            return Err(EnvStackOverflow);
        }
        let parent = self.current();
        self.scopes.push(Environment::child(parent));
        Ok(self.current())
    }

    /// Pops the top scope. Never pops the root scope.
    pub fn leave(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Implements the tail-call reuse rule: `current` is the scope that
    /// would become the parent of a brand-new call frame; if nothing has
    /// been bound into it yet, a tail call reuses `current` directly as
    /// its own frame instead of pushing a new child. This is what keeps a
    /// self-recursive tail call (each one dispatched through an
    /// intervening primitive like `if`, which always opens its own empty
    /// scope around the branch it forces) from growing the scope stack by
    /// more than one frame per recursion level instead of one per call.
    #[must_use]
    pub fn can_reuse_parent(&self) -> bool {
        self.scopes[self.current()].insertions == 0
    }

    /// Binds `entry` into the scope immediately below `current`, the
    /// effect `set` relies on to make a binding outlive the primitive call
    /// frame it executes in. Rebinds a prior plain value under the same
    /// name in place (see [`crate::symtab::SymbolTable::upsert`]) rather
    /// than accumulating a fresh entry on every reassignment.
    pub fn insert_at_parent(&mut self, entry: crate::symtab::Entry) {
        let cur = self.current();
        let target = self.scopes[cur].parent.unwrap_or(cur);
        self.scopes[target].table.upsert(entry);
        self.scopes[target].insertions += 1;
    }

    pub fn insert_current(&mut self, entry: crate::symtab::Entry) {
        let cur = self.current();
        self.scopes[cur].table.insert(entry);
        self.scopes[cur].insertions += 1;
    }

    /// Scans from `current` up to and including the root scope, yielding
    /// scope indices outer-loop order for dispatch/lookup.
    pub fn scan_order(&self) -> impl Iterator<Item = usize> {
        (0..=self.current()).rev()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvStackOverflow;
