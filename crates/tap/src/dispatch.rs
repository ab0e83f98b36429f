//! Function registry & dispatcher — name + arity + argument-kind overload
//! resolution across the scope stack.
//!
//! Primitives and user functions share one name table (the symbol table
//! entries of kind `Primitive`/`User`); what differs is only how the
//! chosen candidate's body is invoked. Primitive bodies live in a
//! separate `PrimitiveTable` indexed by `PrimitiveId`, since a Rust `fn`
//! pointer doesn't fit inside the `Expr` value type the way an opaque
//! callable pointer would.

use crate::context::Interpreter;
use crate::error::{Diagnostic, ErrorKind};
use crate::expr::{Expr, ExprKind, FunctionBody, TapFunction};
use crate::symtab::{Entry, EntryKind};

/// Identifies a primitive's Rust implementation inside a `PrimitiveTable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrimitiveId(pub u32);

/// A primitive's Rust implementation: reads its arguments by index, must
/// not mutate them, and returns its result directly rather than through
/// an out-parameter pair, which would invite writing through the wrong
/// field.
pub type PrimitiveFn = fn(&mut Interpreter, &[Expr], u32, u32) -> Result<Expr, Diagnostic>;

struct PrimitiveEntry {
    func: PrimitiveFn,
}

/// Owns every primitive's Rust implementation, indexed by `PrimitiveId`.
/// The signature metadata (name, arity, parameter kinds) that the
/// dispatcher matches against lives in the symbol table alongside every
/// other binding, not here.
#[derive(Default)]
pub struct PrimitiveTable {
    entries: Vec<PrimitiveEntry>,
}

impl PrimitiveTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, func: PrimitiveFn) -> PrimitiveId {
        let id = PrimitiveId(u32::try_from(self.entries.len()).expect("primitive table overflow"));
        self.entries.push(PrimitiveEntry { func });
        id
    }

    #[must_use]
    fn get(&self, id: PrimitiveId) -> PrimitiveFn {
        self.entries[id.0 as usize].func
    }
}

/// The result of overload resolution: the winning function value plus the
/// scope index it was found in (needed by the caller to decide whether a
/// user-function call may reuse that scope under tail-call optimisation).
pub struct Resolved {
    pub function: TapFunction,
}

/// Why overload resolution found no usable candidate for a name, used to
/// pick between §4.E's three distinct error codes: a name bound to no
/// function at all is `undefined-fun`, one bound only to functions whose
/// arity rejects this call is `invalid-num-args`, and one bound to a
/// function of the right arity but the wrong argument kinds is
/// `invalid-arg`. Kind mismatches take priority over arity mismatches
/// when both kinds of rejects are seen for the same name, since an
/// arity-compatible-but-wrong-kind candidate is a closer miss.
pub enum DispatchOutcome {
    Matched(Resolved),
    ArityMismatch,
    KindMismatch,
    NoSuchName,
}

/// Scans scopes from `current` down to the root, collecting every entry
/// named `name`, and returns the first candidate whose arity and
/// parameter kinds accept `args`. Insertion order within a scope is
/// preserved and scanning proceeds outer-loop over scopes / inner-loop
/// over same-scope candidates, matching the contract exactly.
pub fn resolve(interp: &Interpreter, name: &str, args: &[Expr]) -> DispatchOutcome {
    let mut saw_any_function = false;
    let mut saw_arity_match = false;
    for scope_idx in interp.envs.scan_order() {
        let scope = interp.envs.get(scope_idx);
        for entry in scope.table.lookup(name) {
            if let ExprKind::Function(f) = &entry.value.kind {
                saw_any_function = true;
                if !arity_matches(f, args.len()) {
                    continue;
                }
                saw_arity_match = true;
                if kinds_match(f, args) {
                    return DispatchOutcome::Matched(Resolved { function: f.clone() });
                }
            }
        }
    }
    if !saw_any_function {
        DispatchOutcome::NoSuchName
    } else if saw_arity_match {
        DispatchOutcome::KindMismatch
    } else {
        DispatchOutcome::ArityMismatch
    }
}

fn arity_matches(f: &TapFunction, n: usize) -> bool {
    if n < f.minargs() {
        return false;
    }
    if let Some(max) = f.maxargs() {
        if n > max {
            return false;
        }
    }
    true
}

fn kinds_match(f: &TapFunction, args: &[Expr]) -> bool {
    for (i, param) in f.params.iter().enumerate() {
        if i >= f.minargs() {
            break;
        }
        let Some(arg) = args.get(i) else { break };
        if !param.matches(arg.kind_tag()) {
            return false;
        }
    }
    true
}

/// Invokes `resolved` with already-evaluated `args`, implementing the
/// primitive-vs-user-function split and the tail-call reuse rule.
pub fn invoke(
    interp: &mut Interpreter,
    resolved: Resolved,
    args: &[Expr],
    line: u32,
    col: u32,
) -> Result<Expr, Diagnostic> {
    let TapFunction { name, params, variadic, body } = resolved.function;
    match body {
        FunctionBody::Primitive(id) => {
            if interp.envs.enter().is_err() {
                interp.mark_resource_exhausted();
                return Err(Diagnostic::new(ErrorKind::General, "scope stack exhausted", line, col));
            }
            interp.tracer.on_enter_scope(interp.envs.current());
            let func = interp.primitives.get(id);
            let result = func(interp, args, line, col);
            interp.tracer.on_leave_scope(interp.envs.current());
            interp.envs.leave();
            result
        }
        FunctionBody::User(user_body) => {
            invoke_user(interp, name, params, variadic, &user_body, args, line, col)
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn invoke_user(
    interp: &mut Interpreter,
    name: Option<String>,
    params: Vec<crate::expr::Param>,
    variadic: bool,
    body: &Expr,
    args: &[Expr],
    line: u32,
    col: u32,
) -> Result<Expr, Diagnostic> {
    let reuse = interp.envs.can_reuse_parent();
    if !reuse {
        if interp.envs.enter().is_err() {
            interp.mark_resource_exhausted();
            return Err(Diagnostic::new(ErrorKind::General, "scope stack exhausted", line, col));
        }
        interp.tracer.on_enter_scope(interp.envs.current());
    }

    bind_params(interp, &params, args);
    // `here` names the function currently being invoked, for recursion by
    // self-reference (§4.E): bound on every user-function call, not only
    // ones that happen to also be reachable under a `set`-bound name.
    let self_fn = Expr::new(
        ExprKind::Function(TapFunction {
            name: name.clone(),
            params: params.clone(),
            variadic,
            body: FunctionBody::User(Box::new(body.clone())),
        }),
        line,
        col,
    );
    interp.envs.insert_current(Entry::new("here", EntryKind::User, self_fn));

    let result = crate::eval::evaluate(interp, body);
    if !reuse {
        interp.tracer.on_leave_scope(interp.envs.current());
        interp.envs.leave();
    }
    result
}

fn bind_params(interp: &mut Interpreter, params: &[crate::expr::Param], args: &[Expr]) {
    for (i, param) in params.iter().enumerate() {
        let value = if let Some(arg) = args.get(i) {
            arg.clone_deep()
        } else {
            Expr::nil()
        };
        interp.envs.insert_current(Entry::new(param.name.clone(), EntryKind::User, value));
    }
    if params.len() < args.len() {
        // Variadic tail: bind the remaining arguments under the
        // conventional name used by array primitives operating on the
        // rest-args, matching `UFUNC_MORE_ARGS`'s intent of "the rest".
        let rest: crate::expr::TapArray = args[params.len()..].iter().map(Expr::clone_deep).collect();
        interp.envs.insert_current(Entry::new(
            "...",
            EntryKind::User,
            Expr::new(ExprKind::Array(rest), 0, 0),
        ));
    }
}

/// Reports `ERR_UNDEFINED_FUN` for a call whose head matched no
/// registered overload.
#[must_use]
pub fn undefined_function_error(name: &str, line: u32, col: u32) -> Diagnostic {
    Diagnostic::new(ErrorKind::UndefinedFun, format!("undefined function '{name}'"), line, col)
}

#[must_use]
pub fn invalid_arg_error(message: impl Into<String>, line: u32, col: u32) -> Diagnostic {
    Diagnostic::new(ErrorKind::InvalidArg, message, line, col)
}

#[must_use]
pub fn invalid_num_args_error(message: impl Into<String>, line: u32, col: u32) -> Diagnostic {
    Diagnostic::new(ErrorKind::InvalidNumArgs, message, line, col)
}
