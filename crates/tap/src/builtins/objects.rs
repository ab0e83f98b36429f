//! Composite-type and object primitives: `new-type`, `obj`/`new`, `type-of`.
//!
//! Property access itself (`obj.prop`) is not a primitive call — it is
//! handled directly by the evaluator's object-indexing path in `eval.rs`,
//! the same way array indexing is not a primitive either.

use crate::context::Interpreter;
use crate::dispatch::{invalid_arg_error, PrimitiveTable};
use crate::env::EnvStack;
use crate::error::{Diagnostic, ErrorKind};
use crate::eval;
use crate::expr::{Expr, ExprKind, Param, TapObject, ValueKind};
use crate::types_registry::{Privacy, PropertySpec, Range, TypeTag};

pub fn register(table: &mut PrimitiveTable, envs: &mut EnvStack) {
    super::register(
        table,
        envs,
        "new-type",
        vec![Param::any("name"), Param::any("body")],
        false,
        new_type_fn,
    );
    super::register(table, envs, "obj", vec![Param::any("type"), Param::any("pairs")], false, obj_fn);
    super::register(table, envs, "new", vec![Param::any("type"), Param::any("pairs")], false, obj_fn);
    super::register(table, envs, "type-of", vec![Param::any("value")], false, type_of_fn);
}

pub(crate) fn unwrap_lazy(expr: &Expr) -> &Expr {
    match &expr.kind {
        ExprKind::Lazy(inner) => inner,
        _ => expr,
    }
}

/// Pulls the call-shape (`name arg arg ...`) out of a parsed-but-unevaluated
/// clause node: the lazy `new-type` body holds each clause as its own
/// `Container`, exactly as it would parse standalone as a call.
fn clause_parts(node: &Expr) -> Option<(&str, Vec<&Expr>)> {
    let ExprKind::Container(Some(head), false) = &node.kind else {
        return None;
    };
    let ExprKind::Str(name, _) = &head.kind else {
        return None;
    };
    let mut args = Vec::new();
    let mut cur = head.next.as_deref();
    while let Some(n) = cur {
        args.push(n);
        cur = n.next.as_deref();
    }
    Some((name.as_str(), args))
}

fn parse_privacy(node: &Expr) -> Privacy {
    match crate::expr::bare_name(node) {
        Some("private") => Privacy::Private,
        _ => Privacy::Public,
    }
}

fn parse_range(node: &Expr) -> Range {
    match crate::expr::bare_name(node) {
        Some("global") => Range::Global,
        _ => Range::Local,
    }
}

/// A kind-spec clause is either a single bare kind name (`int`) or a
/// `[...]`-wrapped list of them (`[int float]`), shared between
/// `new-type`'s `property` clauses and `function`/`lambda`'s per-parameter
/// kind constraints (§4.G: "an argument spec is (name, list of permitted
/// kinds, ...)"). An empty list means "unknown" — any kind accepted.
pub(crate) fn parse_kind_spec(node: &Expr, types: &crate::types_registry::TypeRegistry) -> Vec<ValueKind> {
    let inner = unwrap_lazy(node);
    match &inner.kind {
        ExprKind::Container(Some(head), _) => head
            .iter_chain()
            .filter_map(|child| crate::expr::bare_name(child))
            .filter_map(|name| kind_name_to_value(name, types))
            .collect(),
        ExprKind::Str(name, _) => kind_name_to_value(name, types).into_iter().collect(),
        _ => Vec::new(),
    }
}

pub(crate) fn kind_name_to_value(name: &str, types: &crate::types_registry::TypeRegistry) -> Option<ValueKind> {
    Some(match name {
        "nil" => ValueKind::Nil,
        "expression" => ValueKind::Container,
        "lazy" | "lazy-expression" => ValueKind::Lazy,
        "int" | "integer" => ValueKind::Int,
        "float" => ValueKind::Float,
        "string" | "str" => ValueKind::Str,
        "array" => ValueKind::Array,
        "date" => ValueKind::Date,
        "object" => ValueKind::Object,
        "function" => ValueKind::Function,
        "type" => ValueKind::Type,
        other => ValueKind::Composite(types.find_by_name(other)?.tag),
    })
}

/// `(new-type "Name" [(property public local [int] "x" 0) ... (required
/// "x") (inherits Parent)])` — declares a composite type from a lazy body
/// of `property`/`required`/`inherits` clauses, assigns the next composite
/// id, and binds the name to a type value (escaping the transient scope
/// this primitive runs in, the same way `set` escapes its own).
fn new_type_fn(interp: &mut Interpreter, args: &[Expr], line: u32, col: u32) -> Result<Expr, Diagnostic> {
    let ExprKind::Str(name, _) = &args[0].kind else {
        return Err(invalid_arg_error("new-type requires a string name", line, col));
    };

    let body_ast = unwrap_lazy(&args[1]);
    let mut properties = Vec::new();
    let mut required_names: Vec<String> = Vec::new();
    let mut parents: Vec<TypeTag> = Vec::new();

    if let ExprKind::Container(Some(head), _) = &body_ast.kind {
        for node in head.iter_chain() {
            let Some((clause, clause_args)) = clause_parts(node) else {
                continue;
            };
            match clause {
                "required" => {
                    for a in clause_args {
                        if let Some(n) = crate::expr::bare_name(a) {
                            required_names.push(n.to_string());
                        }
                    }
                }
                "inherits" => {
                    for a in clause_args {
                        let Some(parent_name) = crate::expr::bare_name(a) else {
                            continue;
                        };
                        match interp.types.find_by_name(parent_name) {
                            Some(ty) => parents.push(ty.tag),
                            None => {
                                return Err(Diagnostic::new(
                                    ErrorKind::UndefinedTyp,
                                    format!("undefined type '{parent_name}'"),
                                    line,
                                    col,
                                ))
                            }
                        }
                    }
                }
                "property" => {
                    if clause_args.len() < 4 {
                        return Err(invalid_arg_error(
                            "property clause requires privacy, range, kinds and a name",
                            line,
                            col,
                        ));
                    }
                    let privacy = parse_privacy(clause_args[0]);
                    let range = parse_range(clause_args[1]);
                    let kinds = parse_kind_spec(clause_args[2], &interp.types);
                    let prop_name = match &clause_args[3].kind {
                        ExprKind::Str(n, _) => n.clone(),
                        _ => return Err(invalid_arg_error("property name must be a string", line, col)),
                    };
                    let default = clause_args.get(4).map(|e| e.clone_deep());
                    properties.push(PropertySpec { name: prop_name, kinds, privacy, range, required: false, default });
                }
                _ => {}
            }
        }
    }

    for spec in &mut properties {
        if required_names.iter().any(|n| n == &spec.name) {
            spec.required = true;
        }
    }

    let tag = interp.types.declare(name.clone(), properties, parents);
    let type_value = Expr::new(ExprKind::Type(tag), line, col);
    eval::bind_kind(interp, name.clone(), crate::symtab::EntryKind::Direct, type_value.clone_deep(), true);
    let parent = interp.envs.get(interp.envs.current()).parent.unwrap_or(interp.envs.current());
    interp.envs.get_mut(parent).declared_types.push(tag);
    Ok(type_value)
}

/// `(obj Point [("x" 3) ("y" 4)])` (aliased as `new`) — the first argument
/// is a type value, the second a lazy list of `(name value)` pairs.
/// Missing required properties are an error; missing optional properties
/// fall back to their declared default expression (evaluated at
/// construction time, not when `new-type` parsed it), or nil.
fn obj_fn(interp: &mut Interpreter, args: &[Expr], line: u32, col: u32) -> Result<Expr, Diagnostic> {
    let ExprKind::Type(tag) = args[0].kind else {
        return Err(invalid_arg_error("obj requires a type", line, col));
    };

    let pairs_ast = unwrap_lazy(&args[1]);
    let mut provided: Vec<(String, Expr)> = Vec::new();
    if let ExprKind::Container(Some(head), _) = &pairs_ast.kind {
        for node in head.iter_chain() {
            let ExprKind::Container(Some(inner_head), false) = &node.kind else {
                continue;
            };
            let ExprKind::Str(prop_name, _) = &inner_head.kind else {
                return Err(invalid_arg_error("property name must be a string", line, col));
            };
            let value = match inner_head.next.as_deref() {
                Some(v) => eval::evaluate(interp, v),
                None => Expr::nil(),
            };
            provided.push((prop_name.clone(), value));
        }
    }

    let Some(specs) = interp.types.get(tag).map(|ty| ty.all_properties(&interp.types).into_iter().cloned().collect::<Vec<_>>()) else {
        return Err(Diagnostic::new(ErrorKind::UndefinedTyp, "undefined type", line, col));
    };

    let mut properties = Vec::new();
    let mut remaining = provided;
    for spec in &specs {
        if let Some(pos) = remaining.iter().position(|(n, _)| n == &spec.name) {
            let (n, v) = remaining.remove(pos);
            if !spec.kinds.is_empty() && !spec.kinds.contains(&v.kind_tag()) {
                return Err(Diagnostic::new(
                    ErrorKind::InvalidPropTyp,
                    format!("property '{n}' has the wrong type"),
                    line,
                    col,
                ));
            }
            properties.push((n, v));
        } else if spec.required {
            return Err(Diagnostic::new(
                ErrorKind::UndefinedProp,
                format!("missing required property '{}'", spec.name),
                line,
                col,
            ));
        } else {
            let default = match &spec.default {
                Some(expr) => eval::evaluate(interp, expr),
                None => Expr::nil(),
            };
            properties.push((spec.name.clone(), default));
        }
    }
    properties.extend(remaining);

    Ok(Expr::new(ExprKind::Object(TapObject { type_tag: tag, properties }), line, col))
}

fn type_of_fn(_interp: &mut Interpreter, args: &[Expr], line: u32, col: u32) -> Result<Expr, Diagnostic> {
    let tag = match args[0].kind_tag() {
        ValueKind::Composite(tag) => tag,
        other => TypeTag(kind_to_intrinsic_tag(other)),
    };
    Ok(Expr::new(ExprKind::Type(tag), line, col))
}

fn kind_to_intrinsic_tag(kind: ValueKind) -> u32 {
    match kind {
        ValueKind::Nil => 1,
        ValueKind::Container => 2,
        ValueKind::Lazy => 3,
        ValueKind::Int => 4,
        ValueKind::Float => 5,
        ValueKind::Str => 6,
        ValueKind::Array => 7,
        ValueKind::Date => 8,
        ValueKind::Object => 9,
        ValueKind::Function => 10,
        ValueKind::Type => 11,
        ValueKind::Composite(tag) => tag.0,
    }
}
