//! Chained-bucket symbol table.
//!
//! Reimplements the original hashtable exactly: the same multiplicative
//! hash (`hash = ch + (hash << 5) - hash`, i.e. `hash * 33 + ch`), the
//! same chained-bucket collision strategy, and the same "lookup returns
//! every matching entry" contract that the dispatcher relies on to
//! implement overloading. Entries within a bucket are kept in insertion
//! order (oldest first); see `DESIGN.md` for why this was chosen over the
//! original's head-insertion (newest-first) order.

use crate::expr::Expr;

/// Root scopes start with this many buckets; inner scopes get the smaller
/// default. Both values are carried over from `constants.h` unchanged.
pub const INITIAL_ROOT_ENV_SIZE: usize = 11519;
pub const INITIAL_ENV_SIZE: usize = 89;

/// What an entry's value represents, controlling how it participates in
/// cleanup and whether it may be called as a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A built-in function implemented in Rust.
    Primitive,
    /// A user-defined variable or function bound via `set`/parameter
    /// binding.
    User,
    /// A value that does not own any heap-tracked resource and needs no
    /// special cleanup (kept for parity with the original's `HFLAG_DIRECT`;
    /// Rust's ownership model makes this purely informational here).
    Direct,
}

/// A single binding in the symbol table: the bound value plus enough
/// metadata to support overload resolution (arity bounds, parameter
/// kinds) for function bindings.
#[derive(Debug, Clone)]
pub struct Entry {
    pub name: String,
    pub kind: EntryKind,
    pub value: Expr,
}

impl Entry {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: EntryKind, value: Expr) -> Self {
        Self { name: name.into(), kind, value }
    }
}

/// Computes the original hashtable's string hash, truncated into the
/// range `0..modulo`.
#[must_use]
pub fn hash_name(name: &str, modulo: usize) -> usize {
    let mut hash: u64 = 0;
    for b in name.bytes() {
        hash = u64::from(b).wrapping_add(hash << 5).wrapping_sub(hash);
    }
    (hash as usize) % modulo.max(1)
}

/// A chained-bucket hash table of name -> entries. Each bucket can hold
/// more than one entry for the same name, since Tap allows overloaded
/// function definitions distinguished by arity and parameter kind.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    buckets: Vec<Vec<Entry>>,
}

impl SymbolTable {
    #[must_use]
    pub fn with_capacity(bucket_count: usize) -> Self {
        Self { buckets: (0..bucket_count.max(1)).map(|_| Vec::new()).collect() }
    }

    #[must_use]
    pub fn root() -> Self {
        Self::with_capacity(INITIAL_ROOT_ENV_SIZE)
    }

    #[must_use]
    pub fn scope() -> Self {
        Self::with_capacity(INITIAL_ENV_SIZE)
    }

    fn bucket_index(&self, name: &str) -> usize {
        hash_name(name, self.buckets.len())
    }

    /// Inserts a new entry at the end of its bucket, preserving the
    /// insertion order the dispatcher depends on when scanning candidates.
    pub fn insert(&mut self, entry: Entry) {
        let idx = self.bucket_index(&entry.name);
        self.buckets[idx].push(entry);
    }

    /// Returns every entry bound to `name` in this scope, in insertion
    /// order.
    pub fn lookup(&self, name: &str) -> impl Iterator<Item = &Entry> {
        let idx = self.bucket_index(name);
        self.buckets[idx].iter().filter(move |e| e.name == name)
    }

    /// Binds `entry`, rebinding a prior non-function entry of the same
    /// name in place rather than appending a duplicate: ordinary `set`
    /// reassignment (`(set "y" 10) (set "y" 20)`) must make later lookups
    /// see `20`, not the first-inserted `10`, since [`SymbolTable::lookup`]
    /// and every consumer that takes its first result (plain variable
    /// reads) would otherwise keep finding the oldest entry forever. A
    /// function value is always appended instead, since redefining a name
    /// with a new signature is how a caller builds up overloads under one
    /// name, not how it replaces one.
    pub fn upsert(&mut self, entry: Entry) {
        let is_function = matches!(entry.value.kind, crate::expr::ExprKind::Function(_));
        if !is_function {
            let idx = self.bucket_index(&entry.name);
            if let Some(existing) = self.buckets[idx]
                .iter_mut()
                .find(|e| e.name == entry.name && !matches!(e.value.kind, crate::expr::ExprKind::Function(_)))
            {
                *existing = entry;
                return;
            }
        }
        self.insert(entry);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_matches_original_formula() {
        // "a" -> ch=97, hash starts at 0: 97 + (0<<5) - 0 = 97
        assert_eq!(hash_name("a", 1000), 97);
    }

    #[test]
    fn lookup_preserves_insertion_order() {
        let mut table = SymbolTable::scope();
        table.insert(Entry::new("f", EntryKind::User, Expr::int(1)));
        table.insert(Entry::new("f", EntryKind::User, Expr::int(2)));
        let vals: Vec<i64> = table
            .lookup("f")
            .map(|e| match e.value.kind {
                crate::expr::ExprKind::Int(n) => n,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(vals, vec![1, 2]);
    }
}
