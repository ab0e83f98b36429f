//! The evaluator: a mutually recursive family of routines dispatching on
//! value kind, including lazy forcing, array/object/date indexing, and
//! function application.

use smallvec::SmallVec;

use crate::context::Interpreter;
use crate::dispatch;
use crate::error::{Diagnostic, ErrorKind};
use crate::expr::{Expr, ExprKind, StrFlag, TapObject, ValueKind};
use crate::symtab::{Entry, EntryKind};

/// Most calls pass a handful of arguments; inlining up to four avoids a
/// heap allocation on the hot path of every function application.
type ArgList = SmallVec<[Expr; 4]>;

/// Evaluates a single top-level source: the parser returns a flat sibling
/// chain of independent forms, which are evaluated left-to-right with the
/// last one's value as the program's result (scenario: `(set "y" 10)
/// (+ y 5)` -> `15`).
pub fn run_program(interp: &mut Interpreter, program: &Expr) -> Expr {
    let mut result = Expr::nil();
    for form in program.iter_chain() {
        result = evaluate(interp, form);
    }
    result
}

/// Evaluates a single expression, dispatching on its kind per the
/// evaluator's table. Every error path records into `interp.errors` and
/// substitutes nil rather than propagating, so this function never fails
/// observably — it always returns *some* value.
pub fn evaluate(interp: &mut Interpreter, expr: &Expr) -> Expr {
    if interp.enter_recursion().is_err() {
        record(interp, Diagnostic::new(ErrorKind::General, "recursion limit exceeded", expr.line, expr.col));
        return Expr::nil_at(expr.line, expr.col);
    }
    let result = evaluate_inner(interp, expr);
    interp.leave_recursion();
    result
}

fn evaluate_inner(interp: &mut Interpreter, expr: &Expr) -> Expr {
    match &expr.kind {
        ExprKind::Nil => Expr::nil_at(expr.line, expr.col),
        ExprKind::Container(head, true) => eval_array_expression(interp, head.as_deref()),
        ExprKind::Container(head, false) => eval_call(interp, head.as_deref(), expr.line, expr.col),
        ExprKind::Lazy(child) => evaluate(interp, child),
        ExprKind::Int(_) | ExprKind::Float(_) | ExprKind::Date(_) | ExprKind::Type(_) => expr.clone_one(),
        ExprKind::Str(name, StrFlag::VarRef) => eval_var_ref(interp, name, expr.line, expr.col),
        ExprKind::Str(..) => expr.clone_one(),
        ExprKind::Function(_) => expr.clone_one(),
        ExprKind::Array(arr) => eval_array_index(interp, arr, expr.next.as_deref(), expr.line, expr.col),
        ExprKind::Object(obj) => eval_object_index(interp, obj, expr.next.as_deref(), expr.line, expr.col),
    }
}

fn record(interp: &mut Interpreter, diagnostic: Diagnostic) {
    interp.tracer.on_error(&diagnostic);
    interp.errors.record(diagnostic);
}

fn lookup_var(interp: &Interpreter, name: &str) -> Option<Expr> {
    for scope_idx in interp.envs.scan_order() {
        if let Some(entry) = interp.envs.get(scope_idx).table.lookup(name).next() {
            return Some(entry.value.clone_deep());
        }
    }
    None
}

fn eval_var_ref(interp: &mut Interpreter, name: &str, line: u32, col: u32) -> Expr {
    match lookup_var(interp, name) {
        Some(value) => value,
        None => {
            record(interp, Diagnostic::new(ErrorKind::UndefinedVar, format!("undefined variable '{name}'"), line, col));
            Expr::nil_at(line, col)
        }
    }
}

/// Evaluates an array-expression container: every child is evaluated and
/// the results packed into a fresh array value, left-to-right.
fn eval_array_expression(interp: &mut Interpreter, head: Option<&Expr>) -> Expr {
    let mut arr = crate::expr::TapArray::new();
    let mut cur = head;
    while let Some(node) = cur {
        arr.push_back(eval_argument(interp, node));
        cur = node.next.as_deref();
    }
    Expr::new(ExprKind::Array(arr), 0, 0)
}

/// A function application: the head names (or already is) a callable,
/// and the rest of the sibling chain are its arguments.
fn eval_call(interp: &mut Interpreter, head: Option<&Expr>, line: u32, col: u32) -> Expr {
    let Some(head) = head else {
        return Expr::nil_at(line, col);
    };

    let mut args = ArgList::new();
    let mut cur = head.next.as_deref();
    while let Some(node) = cur {
        args.push(eval_argument(interp, node));
        cur = node.next.as_deref();
    }

    // The head names a callable either directly (a bare variable
    // reference resolved through the overload dispatcher) or indirectly:
    // any other shape — a nested call, a forced lazy expression, an
    // already-evaluated function literal — is evaluated first and must
    // produce a function value. This is what lets
    // `((function [x] [(* x x)]) 7)` apply the freshly built lambda
    // in place, without naming it first.
    match &head.kind {
        ExprKind::Str(name, StrFlag::VarRef) => {
            interp.tracer.on_call(name, args.len());
            match dispatch::resolve(interp, name, &args) {
                dispatch::DispatchOutcome::Matched(resolved) => invoke_and_record(interp, resolved, &args, line, col),
                // A function exists under this name but no overload's
                // arity/kind signature accepts this call: §4.E reports
                // these as distinct error codes from a wholly undefined
                // name, rather than falling through to the array/object
                // value-indexing path below.
                dispatch::DispatchOutcome::ArityMismatch => {
                    record(interp, dispatch::invalid_num_args_error(format!("wrong number of arguments to '{name}'"), line, col));
                    Expr::nil_at(line, col)
                }
                dispatch::DispatchOutcome::KindMismatch => {
                    record(interp, dispatch::invalid_arg_error(format!("wrong argument type for '{name}'"), line, col));
                    Expr::nil_at(line, col)
                }
                // No function overload at all; `(person "x")` and
                // `(items 2)` apply a variable bound to an object or array
                // the same way a call applies a function name, which is
                // how property/element access reaches the indexing path
                // below instead of a primitive call.
                dispatch::DispatchOutcome::NoSuchName => eval_name_as_value(interp, name, &args, line, col),
            }
        }
        ExprKind::Function(f) => {
            let resolved = dispatch::Resolved { function: f.clone() };
            invoke_and_record(interp, resolved, &args, line, col)
        }
        // Any other head shape — a nested call, a forced lazy expression —
        // is evaluated first. A single-form lazy body like `[(* x x)]`
        // parses to a container whose lone child is itself the `(* x x)`
        // call with no further siblings; forcing it reaches this arm with
        // `args` empty and `callee` already holding the call's own
        // result, which is exactly the value the force should produce.
        // Only a call written with actual operand siblings (`args`
        // non-empty) demands that the evaluated head be a function value.
        _ => {
            let callee = evaluate(interp, head);
            if matches!(callee.kind, ExprKind::Function(_)) {
                let ExprKind::Function(f) = callee.kind else { unreachable!() };
                let resolved = dispatch::Resolved { function: f };
                invoke_and_record(interp, resolved, &args, line, col)
            } else if args.is_empty() {
                callee
            } else {
                record(interp, Diagnostic::new(ErrorKind::UndefinedFun, "call head is not callable", line, col));
                Expr::nil_at(line, col)
            }
        }
    }
}

fn invoke_and_record(
    interp: &mut Interpreter,
    resolved: dispatch::Resolved,
    args: &[Expr],
    line: u32,
    col: u32,
) -> Expr {
    match dispatch::invoke(interp, resolved, args, line, col) {
        Ok(value) => value,
        Err(diagnostic) => {
            record(interp, diagnostic);
            Expr::nil_at(line, col)
        }
    }
}

/// Prepares a single argument expression for a call: array-expressions
/// are evaluated and packed, variable references are resolved, lazy
/// expressions are passed through unforced (the dispatcher re-checks
/// the declared parameter kind before forcing anything), and everything
/// else is copied through as-is.
pub fn eval_argument(interp: &mut Interpreter, node: &Expr) -> Expr {
    match &node.kind {
        ExprKind::Container(head, true) => eval_array_expression(interp, head.as_deref()),
        ExprKind::Container(..) => evaluate(interp, node),
        ExprKind::Str(name, StrFlag::VarRef) => eval_var_ref(interp, name, node.line, node.col),
        ExprKind::Lazy(_) => node.clone_one(),
        _ => node.clone_one(),
    }
}

/// A call head that named neither a function overload nor a bare
/// undefined name: `name` is bound to an ordinary value, and `args`
/// (already evaluated) supplies the index or property-name operand —
/// `(items 2)` indexes an array, `(person "x")` reads a property.
fn eval_name_as_value(interp: &mut Interpreter, name: &str, args: &[Expr], line: u32, col: u32) -> Expr {
    match lookup_var(interp, name) {
        Some(Expr { kind: ExprKind::Array(arr), .. }) => match args.first() {
            Some(index) => index_array(interp, &arr, index, line, col),
            None => Expr::nil_at(line, col),
        },
        Some(Expr { kind: ExprKind::Object(obj), .. }) => match args.first() {
            Some(prop) => index_object(interp, &obj, prop, line, col),
            None => Expr::nil_at(line, col),
        },
        _ => {
            record(interp, dispatch::undefined_function_error(name, line, col));
            Expr::nil_at(line, col)
        }
    }
}

fn index_array(interp: &mut Interpreter, arr: &crate::expr::TapArray, index_value: &Expr, line: u32, col: u32) -> Expr {
    let ExprKind::Int(i) = index_value.kind else {
        record(interp, Diagnostic::new(ErrorKind::InvalidArg, "array index must be an integer", line, col));
        return Expr::nil_at(line, col);
    };
    if i < 0 || (i as usize) >= arr.len() {
        record(interp, Diagnostic::new(ErrorKind::OutOfBounds, format!("index {i} out of bounds"), line, col));
        return Expr::nil_at(line, col);
    }
    arr[i as usize].clone_deep()
}

fn index_object(interp: &mut Interpreter, obj: &TapObject, prop_value: &Expr, line: u32, col: u32) -> Expr {
    let ExprKind::Str(name, _) = &prop_value.kind else {
        record(interp, Diagnostic::new(ErrorKind::InvalidArg, "property name must be a string", line, col));
        return Expr::nil_at(line, col);
    };
    match obj.get(name) {
        Some(value) => value.clone_deep(),
        None => {
            record(interp, Diagnostic::new(ErrorKind::UndefinedProp, format!("undefined property '{name}'"), line, col));
            Expr::nil_at(line, col)
        }
    }
}

fn eval_array_index(
    interp: &mut Interpreter,
    arr: &crate::expr::TapArray,
    index_expr: Option<&Expr>,
    line: u32,
    col: u32,
) -> Expr {
    let Some(index_expr) = index_expr else {
        return Expr::nil_at(line, col);
    };
    let index_value = evaluate(interp, index_expr);
    index_array(interp, arr, &index_value, line, col)
}

fn eval_object_index(
    interp: &mut Interpreter,
    obj: &TapObject,
    prop_expr: Option<&Expr>,
    line: u32,
    col: u32,
) -> Expr {
    let Some(prop_expr) = prop_expr else {
        return Expr::nil_at(line, col);
    };
    let prop_value = evaluate(interp, prop_expr);
    index_object(interp, obj, &prop_value, line, col)
}

/// Binds `name` in the given scope directly (used by the `set` primitive
/// through `EnvStack::insert_at_parent`, and by `function`'s self-binding
/// of `here`). Exposed here so builtins don't need to reach into
/// `symtab::Entry` construction themselves for the common case.
pub fn bind(interp: &mut Interpreter, name: impl Into<String>, value: Expr, at_parent: bool) {
    bind_kind(interp, name, EntryKind::User, value, at_parent);
}

/// As [`bind`], but lets the caller choose the entry's cleanup kind —
/// used by `new-type` to bind a type name as [`EntryKind::Direct`], since
/// a declared type isn't torn down the way an ordinary user binding is.
pub fn bind_kind(interp: &mut Interpreter, name: impl Into<String>, kind: EntryKind, value: Expr, at_parent: bool) {
    let entry = Entry::new(name, kind, value);
    if at_parent {
        interp.envs.insert_at_parent(entry);
    } else {
        interp.envs.insert_current(entry);
    }
}

#[must_use]
pub fn kind_of(expr: &Expr) -> ValueKind {
    expr.kind_tag()
}

/// Forces `expr` if it is still an unforced lazy value, otherwise returns
/// it unchanged. Arguments prepared by [`eval_argument`] are already
/// evaluated unless the call site wrote them with `[...]`, in which case
/// they arrive here still wrapped — this is the one place primitives like
/// `if` and `eval` resolve that difference.
pub fn force(interp: &mut Interpreter, expr: &Expr) -> Expr {
    match &expr.kind {
        ExprKind::Lazy(inner) => evaluate(interp, inner),
        _ => expr.clone_one(),
    }
}
