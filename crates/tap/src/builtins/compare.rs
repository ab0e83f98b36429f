//! Comparison primitives. Tap has no boolean kind, so comparisons return
//! integer `1`/`0`, matching the C heritage the interpreter inherits its
//! truthiness convention from (`if` treats `nil` and integer `0` as
//! falsy, everything else as truthy).

use std::cmp::Ordering;

use crate::context::Interpreter;
use crate::dispatch::{invalid_arg_error, PrimitiveTable};
use crate::env::EnvStack;
use crate::error::Diagnostic;
use crate::expr::{Expr, ExprKind, Param};

pub fn register(table: &mut PrimitiveTable, envs: &mut EnvStack) {
    let binary = || vec![Param::any("a"), Param::any("b")];
    super::register(table, envs, "==", binary(), false, eq_fn);
    super::register(table, envs, "!=", binary(), false, ne_fn);
    super::register(table, envs, "<", binary(), false, lt_fn);
    super::register(table, envs, ">", binary(), false, gt_fn);
    super::register(table, envs, "<=", binary(), false, le_fn);
    super::register(table, envs, ">=", binary(), false, ge_fn);
}

/// Structural equality: numbers compare across int/float, strings compare
/// by content, symbols (plain integers after parsing) compare by hash
/// equality — which falls out of plain integer equality for free.
fn values_equal(a: &Expr, b: &Expr) -> bool {
    match (&a.kind, &b.kind) {
        (ExprKind::Nil, ExprKind::Nil) => true,
        (ExprKind::Int(x), ExprKind::Int(y)) => x == y,
        (ExprKind::Float(x), ExprKind::Float(y)) => (x - y).abs() < f64::EPSILON,
        (ExprKind::Int(x), ExprKind::Float(y)) | (ExprKind::Float(y), ExprKind::Int(x)) => {
            (*x as f64 - y).abs() < f64::EPSILON
        }
        (ExprKind::Str(x, _), ExprKind::Str(y, _)) => x == y,
        (ExprKind::Date(x), ExprKind::Date(y)) => x == y,
        (ExprKind::Type(x), ExprKind::Type(y)) => x == y,
        _ => false,
    }
}

fn ordering(a: &Expr, b: &Expr, line: u32, col: u32) -> Result<Ordering, Diagnostic> {
    match (&a.kind, &b.kind) {
        (ExprKind::Int(x), ExprKind::Int(y)) => Ok(x.cmp(y)),
        (ExprKind::Float(x), ExprKind::Float(y)) => x.partial_cmp(y).ok_or_else(|| invalid_arg_error("NaN is unordered", line, col)),
        (ExprKind::Int(x), ExprKind::Float(y)) => (*x as f64).partial_cmp(y).ok_or_else(|| invalid_arg_error("NaN is unordered", line, col)),
        (ExprKind::Float(x), ExprKind::Int(y)) => x.partial_cmp(&(*y as f64)).ok_or_else(|| invalid_arg_error("NaN is unordered", line, col)),
        (ExprKind::Str(x, _), ExprKind::Str(y, _)) => Ok(x.cmp(y)),
        _ => Err(invalid_arg_error("values are not ordered", line, col)),
    }
}

fn bool_expr(value: bool) -> Expr {
    Expr::int(i64::from(value))
}

fn eq_fn(_i: &mut Interpreter, args: &[Expr], _l: u32, _c: u32) -> Result<Expr, Diagnostic> {
    Ok(bool_expr(values_equal(&args[0], &args[1])))
}

fn ne_fn(_i: &mut Interpreter, args: &[Expr], _l: u32, _c: u32) -> Result<Expr, Diagnostic> {
    Ok(bool_expr(!values_equal(&args[0], &args[1])))
}

fn lt_fn(_i: &mut Interpreter, args: &[Expr], l: u32, c: u32) -> Result<Expr, Diagnostic> {
    Ok(bool_expr(ordering(&args[0], &args[1], l, c)? == Ordering::Less))
}

fn gt_fn(_i: &mut Interpreter, args: &[Expr], l: u32, c: u32) -> Result<Expr, Diagnostic> {
    Ok(bool_expr(ordering(&args[0], &args[1], l, c)? == Ordering::Greater))
}

fn le_fn(_i: &mut Interpreter, args: &[Expr], l: u32, c: u32) -> Result<Expr, Diagnostic> {
    Ok(bool_expr(ordering(&args[0], &args[1], l, c)? != Ordering::Greater))
}

fn ge_fn(_i: &mut Interpreter, args: &[Expr], l: u32, c: u32) -> Result<Expr, Diagnostic> {
    Ok(bool_expr(ordering(&args[0], &args[1], l, c)? != Ordering::Less))
}
