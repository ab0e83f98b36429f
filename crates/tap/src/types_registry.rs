//! Composite (user-declared) type registry.
//!
//! Intrinsic kinds occupy tags `0..=11`; every `new-type` declaration is
//! assigned the next tag starting at `COMPOSITE_BASE`, matching
//! `TYPE_COMP_START` in the original `constants.h`. Each environment owns
//! its own registry, exactly as the original attaches a types array to
//! each scope: a composite type is visible only from the scope it was
//! declared in outward to the root.

use crate::expr::{Expr, ValueKind};

/// The first tag id available for composite types; tags below this are
/// reserved for the eleven intrinsic kinds.
pub const COMPOSITE_BASE: u32 = 12;

/// Opaque identifier for a composite type, unique across an entire run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeTag(pub u32);

/// `public`/`private` on a `property` clause. Recorded for fidelity with
/// the original property-template layout; nothing in the validation path
/// consults it, since the source never enforces property privacy either.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Privacy {
    Public,
    Private,
}

/// `global`/`local` on a `property` clause, same status as `Privacy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Range {
    Global,
    Local,
}

/// A single declared property slot on a composite type: a name, the list
/// of value kinds it accepts (empty means any kind, matching the
/// `unknown`-kind wildcard in the data model), and an optional default
/// expression used to fill the slot when `obj`/`new` omits it.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySpec {
    pub name: String,
    pub kinds: Vec<ValueKind>,
    pub privacy: Privacy,
    pub range: Range,
    pub required: bool,
    pub default: Option<Expr>,
}

/// A declared composite type: its own property specs plus the tags of any
/// types it inherits from (property and requirement lookups walk this
/// list the same way the original `prim_tNew` walks a type's parents).
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeType {
    pub tag: TypeTag,
    pub name: String,
    pub properties: Vec<PropertySpec>,
    pub parents: Vec<TypeTag>,
}

impl CompositeType {
    /// All property specs visible on this type, including inherited ones,
    /// parents listed before the type's own properties.
    #[must_use]
    pub fn all_properties<'a>(&'a self, registry: &'a TypeRegistry) -> Vec<&'a PropertySpec> {
        let mut out = Vec::new();
        for parent in &self.parents {
            if let Some(parent_ty) = registry.get(*parent) {
                out.extend(parent_ty.all_properties(registry));
            }
        }
        out.extend(self.properties.iter());
        out
    }
}

/// Allocates fresh `TypeTag`s and stores every declared `CompositeType` for
/// the lifetime of a run. Shared across all environments via the
/// interpreter context; an individual environment only needs to know
/// which tags were declared while it was the current scope to implement
/// scoped visibility, which `Environment::declared_types` tracks.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: Vec<CompositeType>,
    next_tag: u32,
}

impl TypeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self { types: Vec::new(), next_tag: COMPOSITE_BASE }
    }

    pub fn declare(&mut self, name: String, properties: Vec<PropertySpec>, parents: Vec<TypeTag>) -> TypeTag {
        let tag = TypeTag(self.next_tag);
        self.next_tag += 1;
        self.types.push(CompositeType { tag, name, properties, parents });
        tag
    }

    #[must_use]
    pub fn get(&self, tag: TypeTag) -> Option<&CompositeType> {
        self.types.iter().find(|t| t.tag == tag)
    }

    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&CompositeType> {
        self.types.iter().rev().find(|t| t.name == name)
    }
}
