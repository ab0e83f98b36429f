//! Control-flow and binding primitives: `if`, `set`, `eval`, `function`/
//! `lambda`, `quote`, `print`.
//!
//! These have cross-component semantics — lazy argument forcing, scope
//! escape, self-reference — that a generic "evaluate all arguments" rule
//! can't express, so each gets its own hand-written body.

use std::borrow::Cow;

use crate::context::Interpreter;
use crate::dispatch::PrimitiveTable;
use crate::env::EnvStack;
use crate::error::Diagnostic;
use crate::eval;
use crate::expr::{Expr, ExprKind, FunctionBody, Param, StrFlag, TapFunction};
use crate::format::printed_form;

pub fn register(table: &mut PrimitiveTable, envs: &mut EnvStack) {
    super::register(table, envs, "if", vec![Param::any("cond")], true, if_fn);
    super::register(table, envs, "set", vec![Param::any("name"), Param::any("value")], false, set_fn);
    super::register(table, envs, "eval", vec![Param::any("value")], false, eval_fn);
    super::register(table, envs, "function", vec![Param::any("params"), Param::any("body")], false, function_fn);
    super::register(table, envs, "lambda", vec![Param::any("params"), Param::any("body")], false, function_fn);
    super::register(table, envs, "quote", vec![Param::any("value")], false, quote_fn);
    super::register(table, envs, "print", vec![Param::any("value")], true, print_fn);
}

/// `if` — variadic pairs of (condition, branch); a final unpaired branch
/// is the else clause. Conditions and branches written with `[...]`
/// arrive still lazy and are forced only when actually selected; a
/// condition/branch written without brackets has already been evaluated
/// by the generic argument-preparation step, so forcing it again is a
/// no-op clone.
fn if_fn(interp: &mut Interpreter, args: &[Expr], line: u32, col: u32) -> Result<Expr, Diagnostic> {
    let mut i = 0;
    while i + 1 < args.len() {
        let cond = eval::force(interp, &args[i]);
        if is_truthy(&cond) {
            return Ok(eval::force(interp, &args[i + 1]));
        }
        i += 2;
    }
    if i < args.len() {
        return Ok(eval::force(interp, &args[i]));
    }
    Ok(Expr::nil_at(line, col))
}

fn is_truthy(value: &Expr) -> bool {
    !matches!(value.kind, ExprKind::Nil | ExprKind::Int(0))
}

/// `set` — binds a name in the *parent* scope so the assignment survives
/// the transient scope this primitive itself runs in.
fn set_fn(interp: &mut Interpreter, args: &[Expr], line: u32, col: u32) -> Result<Expr, Diagnostic> {
    let ExprKind::Str(name, _) = &args[0].kind else {
        return Err(crate::dispatch::invalid_arg_error("set requires a string name", line, col));
    };
    let value = args[1].clone_deep();
    eval::bind(interp, name.clone(), value.clone_deep(), true);
    Ok(value)
}

fn eval_fn(interp: &mut Interpreter, args: &[Expr], _line: u32, _col: u32) -> Result<Expr, Diagnostic> {
    Ok(eval::force(interp, &args[0]))
}

/// `function`/`lambda` — builds a user function from a lazy parameter
/// list and a lazy body. `...` as the final parameter name sets
/// `maxargs = None` (unbounded). Each parameter entry is a bare name
/// (`n`), a name alone in parens (`(n)`), or a name paired with a kind
/// constraint (`(n int)`, or `(n [int float])` for more than one
/// permitted kind) — the same kind-spec shape `new-type`'s `property`
/// clauses use, per §4.G's "an argument spec is (name, list of permitted
/// kinds, ...)".
fn function_fn(interp: &mut Interpreter, args: &[Expr], line: u32, col: u32) -> Result<Expr, Diagnostic> {
    let params_ast = unwrap_lazy(&args[0]);
    let body_ast = unwrap_lazy(&args[1]);

    let mut params = Vec::new();
    let mut variadic = false;
    if let ExprKind::Container(Some(head), _) = &params_ast.kind {
        for node in head.iter_chain() {
            match parse_param_entry(node, &interp.types) {
                Some(ParamEntry::Variadic) => variadic = true,
                Some(ParamEntry::Named(param)) => params.push(param),
                None => {}
            }
        }
    }

    let function = TapFunction {
        name: None,
        params,
        variadic,
        body: FunctionBody::User(Box::new(body_ast.clone_one())),
    };
    Ok(Expr::new(ExprKind::Function(function), line, col))
}

enum ParamEntry {
    Named(Param),
    Variadic,
}

/// Reads one entry out of a parsed parameter list: a bare name, a
/// single-child container wrapping just a name, or a two-child container
/// pairing a name with a kind-spec (a bare kind name or a `[...]` list of
/// them, via the same parsing `new-type`'s property clauses use).
fn parse_param_entry(node: &Expr, types: &crate::types_registry::TypeRegistry) -> Option<ParamEntry> {
    let (name, kind_node) = match &node.kind {
        ExprKind::Str(name, _) => (name.as_str(), None),
        ExprKind::Container(Some(head), false) => {
            let ExprKind::Str(name, _) = &head.kind else { return None };
            (name.as_str(), head.next.as_deref())
        }
        _ => return None,
    };
    if name == "..." {
        return Some(ParamEntry::Variadic);
    }
    let kinds = kind_node.map_or_else(Vec::new, |k| super::objects::parse_kind_spec(k, types));
    Some(ParamEntry::Named(Param { name: name.to_string(), kinds }))
}

fn unwrap_lazy(expr: &Expr) -> &Expr {
    match &expr.kind {
        ExprKind::Lazy(inner) => inner,
        _ => expr,
    }
}

/// `quote` — returns its argument exactly as received, without forcing
/// it even if it is a lazy value.
fn quote_fn(_interp: &mut Interpreter, args: &[Expr], _line: u32, _col: u32) -> Result<Expr, Diagnostic> {
    Ok(args[0].clone_deep())
}

/// `print` — writes the printed form of each argument, space-separated,
/// terminated by a newline, and returns the last argument's value.
fn print_fn(interp: &mut Interpreter, args: &[Expr], line: u32, col: u32) -> Result<Expr, Diagnostic> {
    let mut last = Expr::nil_at(line, col);
    for (i, arg) in args.iter().enumerate() {
        let forced = eval::force(interp, arg);
        if i > 0 {
            interp.print.push(' ');
        }
        let text = printed_form(&forced, &interp.types);
        interp.print.write(Cow::Owned(text));
        last = forced;
    }
    interp.print.push('\n');
    Ok(last)
}
