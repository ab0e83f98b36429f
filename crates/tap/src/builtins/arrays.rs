//! Array primitives: `push`, `pop`, `len`, `get`, `array.str`.
//!
//! `array.str` is fixed relative to its source-of-inspiration: it now
//! returns a genuine `ExprKind::Str` rather than a value tagged as a
//! string but carrying unjoined element text.

use crate::context::Interpreter;
use crate::dispatch::{invalid_arg_error, PrimitiveTable};
use crate::env::EnvStack;
use crate::error::{Diagnostic, ErrorKind};
use crate::expr::{Expr, ExprKind, Param, StrFlag, ValueKind};
use crate::format::printed_form;

pub fn register(table: &mut PrimitiveTable, envs: &mut EnvStack) {
    super::register(
        table,
        envs,
        "push",
        vec![Param::of_kind("arr", ValueKind::Array), Param::any("value")],
        false,
        push_fn,
    );
    super::register(table, envs, "pop", vec![Param::of_kind("arr", ValueKind::Array)], false, pop_fn);
    super::register(table, envs, "len", vec![Param::of_kind("arr", ValueKind::Array)], false, len_fn);
    super::register(
        table,
        envs,
        "get",
        vec![Param::of_kind("arr", ValueKind::Array), Param::of_kind("index", ValueKind::Int)],
        false,
        get_fn,
    );
    super::register(table, envs, "array.str", vec![Param::of_kind("arr", ValueKind::Array)], false, array_str_fn);
}

fn as_array(arg: &Expr, line: u32, col: u32) -> Result<&crate::expr::TapArray, Diagnostic> {
    match &arg.kind {
        ExprKind::Array(a) => Ok(a),
        _ => Err(invalid_arg_error("expected an array", line, col)),
    }
}

fn push_fn(_i: &mut Interpreter, args: &[Expr], line: u32, col: u32) -> Result<Expr, Diagnostic> {
    let mut arr = as_array(&args[0], line, col)?.clone();
    arr.push_back(args[1].clone_deep());
    Ok(Expr::new(ExprKind::Array(arr), line, col))
}

fn pop_fn(_i: &mut Interpreter, args: &[Expr], line: u32, col: u32) -> Result<Expr, Diagnostic> {
    let mut arr = as_array(&args[0], line, col)?.clone();
    match arr.pop_back() {
        Some(_) => Ok(Expr::new(ExprKind::Array(arr), line, col)),
        None => Err(Diagnostic::new(ErrorKind::OutOfBounds, "pop on an empty array", line, col)),
    }
}

fn len_fn(_i: &mut Interpreter, args: &[Expr], line: u32, col: u32) -> Result<Expr, Diagnostic> {
    let arr = as_array(&args[0], line, col)?;
    Ok(Expr::int(arr.len() as i64))
}

fn get_fn(_i: &mut Interpreter, args: &[Expr], line: u32, col: u32) -> Result<Expr, Diagnostic> {
    let arr = as_array(&args[0], line, col)?;
    let ExprKind::Int(index) = args[1].kind else {
        return Err(invalid_arg_error("expected an integer index", line, col));
    };
    if index < 0 || (index as usize) >= arr.len() {
        return Err(Diagnostic::new(ErrorKind::OutOfBounds, format!("index {index} out of bounds"), line, col));
    }
    Ok(arr[index as usize].clone_deep())
}

/// Joins every element's printed form with no separator into one genuine
/// string value.
fn array_str_fn(interp: &mut Interpreter, args: &[Expr], line: u32, col: u32) -> Result<Expr, Diagnostic> {
    let arr = as_array(&args[0], line, col)?;
    let mut out = String::new();
    for element in arr {
        out.push_str(&printed_form(element, &interp.types));
    }
    Ok(Expr::new(ExprKind::Str(out, StrFlag::Literal), line, col))
}
