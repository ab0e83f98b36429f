//! The unified expression/value tree.
//!
//! Tap has one node type that serves both as a parsed AST node and as a
//! runtime value: `container-expression`, `lazy-expression` and
//! `array-expression` are parsed forms that the evaluator reduces to a
//! value in place, and every other `ExprKind` already *is* its own value.
//! This mirrors the original interpreter's single `expression` struct,
//! which is mutated in place as it moves from parsed tree to evaluated
//! result.
//!
//! Every node owns its children outright (`Box<Expr>`), including the
//! `next` sibling link used to chain an expression's argument list. There
//! is no shared ownership and no manual `free`: dropping the root of a
//! tree drops the whole tree.

use std::collections::VecDeque;
use std::fmt;

use crate::types_registry::TypeTag;

/// Minutes-since-epoch is overkill for Tap's date primitives; dates are
/// stored as a signed second count, matching the original `time_t`-backed
/// representation.
pub type DateValue = i64;

/// A resizable double-ended array value. `VecDeque` already gives O(1)
/// push/pop at both ends, which is exactly the trimmable ring buffer the
/// original hand-rolled `start`/`end`/`size` array offers; reusing it here
/// avoids re-implementing a manual ring buffer for no behavioral gain.
pub type TapArray = VecDeque<Expr>;

/// An object instance: the composite type tag plus its bound property
/// values in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct TapObject {
    pub type_tag: TypeTag,
    pub properties: Vec<(String, Expr)>,
}

impl TapObject {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Expr> {
        self.properties.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn set(&mut self, name: &str, value: Expr) {
        if let Some(slot) = self.properties.iter_mut().find(|(n, _)| n == name) {
            slot.1 = value;
        } else {
            self.properties.push((name.to_string(), value));
        }
    }
}

/// A callable value: discriminated between a primitive implemented in Rust
/// (an opaque id into the interpreter's primitive table) and a user
/// function (an owned body expression), matching the "primitive vs.
/// user" split of the function value described in the data model.
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionBody {
    Primitive(crate::dispatch::PrimitiveId),
    User(Box<Expr>),
}

/// A callable function value: its name (for error messages and `here`
/// self-reference), formal parameters with kind constraints, a variadic
/// tail flag, and its body.
#[derive(Debug, Clone, PartialEq)]
pub struct TapFunction {
    pub name: Option<String>,
    pub params: Vec<Param>,
    /// `true` when the final parameter accepts `...` (zero or more trailing
    /// arguments), matching `UFUNC_MORE_ARGS` in the original source.
    pub variadic: bool,
    pub body: FunctionBody,
}

impl TapFunction {
    /// Every named parameter is required; `variadic` only affects the
    /// upper bound (a trailing `...` accepts any number of further
    /// arguments beyond the named ones, so it is never itself counted as
    /// a parameter).
    #[must_use]
    pub fn minargs(&self) -> usize {
        self.params.len()
    }

    #[must_use]
    pub fn maxargs(&self) -> Option<usize> {
        if self.variadic {
            None
        } else {
            Some(self.params.len())
        }
    }
}

/// A single formal parameter: its name and the list of value kinds it
/// accepts. An empty `kinds` list is the wildcard ("unknown") kind,
/// matching any argument.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub kinds: Vec<ValueKind>,
}

impl Param {
    #[must_use]
    pub fn any(name: impl Into<String>) -> Self {
        Self { name: name.into(), kinds: Vec::new() }
    }

    #[must_use]
    pub fn of_kind(name: impl Into<String>, kind: ValueKind) -> Self {
        Self { name: name.into(), kinds: vec![kind] }
    }

    #[must_use]
    pub fn matches(&self, actual: ValueKind) -> bool {
        self.kinds.is_empty() || self.kinds.contains(&actual)
    }
}

/// The ten intrinsic value kinds plus the open-ended range of composite
/// (user-declared) type kinds, which start at `TypeTag::COMPOSITE_BASE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Nil,
    Container,
    Lazy,
    Int,
    Float,
    Str,
    Array,
    Date,
    Object,
    Function,
    Type,
    Composite(TypeTag),
}

/// The payload carried by an `Expr`. Parsed-but-not-yet-reduced forms
/// (`Container`, `Lazy`, `Array`) hold their unevaluated children; every
/// other variant already holds its final runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Nil,
    /// `(...)`: a container expression. Holds the head of the
    /// operator/operand chain via `Expr::next`. `is_array` is set when the
    /// container was opened with `{` rather than `(`: evaluating such a
    /// container builds an array value from its evaluated children instead
    /// of applying the head as a callable.
    Container(Option<Box<Expr>>, bool),
    /// `[...]`: a lazy expression, forced on demand and never memoized.
    /// A `refs` bookkeeping list for tracking every lazy node's forcing
    /// sites is intentionally omitted: nothing here ever consults it, so
    /// it would carry no observable behavior.
    Lazy(Box<Expr>),
    Int(i64),
    Float(f64),
    Str(String, StrFlag),
    /// Once evaluated, an array value (built from an array-expression
    /// container, or returned directly by an array primitive).
    Array(TapArray),
    Date(DateValue),
    Object(TapObject),
    Function(TapFunction),
    Type(TypeTag),
}

/// Distinguishes the three roles a string-typed expression node can play.
/// Symbols are not modeled here: a `'name` token compiles directly to an
/// `Int` holding the name's hash, since symbol equality is integer
/// equality once parsing is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrFlag {
    /// A `"..."` string literal: evaluates to a copy of itself.
    Literal,
    /// A bare identifier token: evaluates by variable lookup.
    VarRef,
}

/// A node in the expression tree / a runtime value. `next` threads a
/// sibling list used for container-expression operand chains and for
/// array-expression element chains prior to evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub next: Option<Box<Expr>>,
    pub line: u32,
    pub col: u32,
}

impl Expr {
    #[must_use]
    pub fn new(kind: ExprKind, line: u32, col: u32) -> Self {
        Self { kind, next: None, line, col }
    }

    #[must_use]
    pub fn nil() -> Self {
        Self { kind: ExprKind::Nil, next: None, line: 0, col: 0 }
    }

    #[must_use]
    pub fn nil_at(line: u32, col: u32) -> Self {
        Self { kind: ExprKind::Nil, next: None, line, col }
    }

    #[must_use]
    pub fn int(value: i64) -> Self {
        Self::new(ExprKind::Int(value), 0, 0)
    }

    #[must_use]
    pub fn float(value: f64) -> Self {
        Self::new(ExprKind::Float(value), 0, 0)
    }

    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::new(ExprKind::Str(value.into(), StrFlag::Literal), 0, 0)
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        matches!(self.kind, ExprKind::Nil)
    }

    #[must_use]
    pub fn kind_tag(&self) -> ValueKind {
        match &self.kind {
            ExprKind::Nil => ValueKind::Nil,
            ExprKind::Container(..) => ValueKind::Container,
            ExprKind::Lazy(_) => ValueKind::Lazy,
            ExprKind::Int(_) => ValueKind::Int,
            ExprKind::Float(_) => ValueKind::Float,
            ExprKind::Str(..) => ValueKind::Str,
            ExprKind::Array(_) => ValueKind::Array,
            ExprKind::Date(_) => ValueKind::Date,
            ExprKind::Object(obj) => ValueKind::Composite(obj.type_tag),
            ExprKind::Function(_) => ValueKind::Function,
            ExprKind::Type(_) => ValueKind::Type,
        }
    }

    /// Deep clone: follows `next` as well as the node's own children.
    /// Equivalent to the original `copy()`.
    #[must_use]
    pub fn clone_deep(&self) -> Self {
        self.clone()
    }

    /// Shallow clone: clones this node and its children, but does not
    /// follow `next`. Equivalent to the original `copy_one()`.
    #[must_use]
    pub fn clone_one(&self) -> Self {
        let mut c = self.clone();
        c.next = None;
        c
    }

    /// Appends `tail` to the end of this node's sibling chain.
    pub fn push_next(&mut self, tail: Expr) {
        match &mut self.next {
            Some(n) => n.push_next(tail),
            None => self.next = Some(Box::new(tail)),
        }
    }

    /// Iterates this node and every node reachable via `next`.
    pub fn iter_chain(&self) -> ChainIter<'_> {
        ChainIter { cur: Some(self) }
    }
}

/// Reads a single name out of a parameter/property-list entry: either a
/// bare identifier (`n`) or one wrapped in a single pair of parens
/// (`(n)`) — both `function`'s `[(n) (m)]` parameter lists and
/// `new-type`'s `[(a) (b)]` property lists use the parenthesized form,
/// since each entry is itself parsed as its own top-level call-shaped
/// form inside the surrounding lazy brackets.
#[must_use]
pub fn bare_name(node: &Expr) -> Option<&str> {
    match &node.kind {
        ExprKind::Str(name, _) => Some(name.as_str()),
        ExprKind::Container(Some(inner), false) => match &inner.kind {
            ExprKind::Str(name, _) => Some(name.as_str()),
            _ => None,
        },
        _ => None,
    }
}

pub struct ChainIter<'a> {
    cur: Option<&'a Expr>,
}

impl<'a> Iterator for ChainIter<'a> {
    type Item = &'a Expr;

    fn next(&mut self) -> Option<&'a Expr> {
        let cur = self.cur.take()?;
        self.cur = cur.next.as_deref();
        Some(cur)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Nil => write!(f, "nil"),
            ValueKind::Container => write!(f, "expression"),
            ValueKind::Lazy => write!(f, "lazy expression"),
            ValueKind::Int => write!(f, "integer"),
            ValueKind::Float => write!(f, "float"),
            ValueKind::Str => write!(f, "string"),
            ValueKind::Array => write!(f, "array"),
            ValueKind::Date => write!(f, "date"),
            ValueKind::Object => write!(f, "object"),
            ValueKind::Function => write!(f, "function"),
            ValueKind::Type => write!(f, "type"),
            ValueKind::Composite(tag) => write!(f, "composite#{}", tag.0),
        }
    }
}
