//! Boolean-ish primitives: `and`, `or`, `not`. Tap has no boolean kind, so
//! these return integer `1`/`0`, matching the rest of the comparison
//! primitives.

use crate::context::Interpreter;
use crate::dispatch::PrimitiveTable;
use crate::env::EnvStack;
use crate::error::Diagnostic;
use crate::eval;
use crate::expr::{Expr, ExprKind, Param};

pub fn register(table: &mut PrimitiveTable, envs: &mut EnvStack) {
    super::register(table, envs, "and", vec![Param::any("a")], true, and_fn);
    super::register(table, envs, "or", vec![Param::any("a")], true, or_fn);
    super::register(table, envs, "not", vec![Param::any("a")], false, not_fn);
}

fn is_truthy(value: &Expr) -> bool {
    !matches!(value.kind, ExprKind::Nil | ExprKind::Int(0))
}

fn bool_expr(value: bool) -> Expr {
    Expr::int(i64::from(value))
}

/// Short-circuits on the first falsy argument; later arguments written
/// with `[...]` are never forced once a prior one already failed.
fn and_fn(interp: &mut Interpreter, args: &[Expr], _line: u32, _col: u32) -> Result<Expr, Diagnostic> {
    for arg in args {
        let forced = eval::force(interp, arg);
        if !is_truthy(&forced) {
            return Ok(bool_expr(false));
        }
    }
    Ok(bool_expr(true))
}

fn or_fn(interp: &mut Interpreter, args: &[Expr], _line: u32, _col: u32) -> Result<Expr, Diagnostic> {
    for arg in args {
        let forced = eval::force(interp, arg);
        if is_truthy(&forced) {
            return Ok(bool_expr(true));
        }
    }
    Ok(bool_expr(false))
}

fn not_fn(interp: &mut Interpreter, args: &[Expr], _line: u32, _col: u32) -> Result<Expr, Diagnostic> {
    let forced = eval::force(interp, &args[0]);
    Ok(bool_expr(!is_truthy(&forced)))
}
