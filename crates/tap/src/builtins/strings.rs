//! String primitives: `len`, `upper`, `lower`, `substr`, `find`, `contains`.
//!
//! `contains` is grounded on `primitives/prim_str.c`'s `prim_sContains`,
//! which delegates to `prim_sFind` and then tests `intval > 0` — a bug
//! that misses a match at index 0 (`find` returns `0` for a match at the
//! very start of the string, and `0 > 0` is false). The rewrite fixes this
//! with `>= 0` rather than reproducing it; see `DESIGN.md`.

use crate::context::Interpreter;
use crate::dispatch::{invalid_arg_error, PrimitiveTable};
use crate::env::EnvStack;
use crate::error::Diagnostic;
use crate::expr::{Expr, ExprKind, Param, StrFlag, ValueKind};

pub fn register(table: &mut PrimitiveTable, envs: &mut EnvStack) {
    super::register(table, envs, "len", vec![Param::of_kind("s", ValueKind::Str)], false, len_fn);
    super::register(table, envs, "upper", vec![Param::of_kind("s", ValueKind::Str)], false, upper_fn);
    super::register(table, envs, "lower", vec![Param::of_kind("s", ValueKind::Str)], false, lower_fn);
    super::register(
        table,
        envs,
        "substr",
        vec![Param::of_kind("s", ValueKind::Str), Param::of_kind("start", ValueKind::Int), Param::of_kind("len", ValueKind::Int)],
        false,
        substr_fn,
    );
    super::register(
        table,
        envs,
        "find",
        vec![Param::of_kind("s", ValueKind::Str), Param::any("needle")],
        false,
        find_fn,
    );
    super::register(
        table,
        envs,
        "contains",
        vec![Param::of_kind("s", ValueKind::Str), Param::any("needle")],
        false,
        contains_fn,
    );
}

fn as_str(arg: &Expr, line: u32, col: u32) -> Result<&str, Diagnostic> {
    match &arg.kind {
        ExprKind::Str(s, _) => Ok(s.as_str()),
        _ => Err(invalid_arg_error("expected a string", line, col)),
    }
}

fn len_fn(_i: &mut Interpreter, args: &[Expr], line: u32, col: u32) -> Result<Expr, Diagnostic> {
    let s = as_str(&args[0], line, col)?;
    Ok(Expr::int(s.chars().count() as i64))
}

fn upper_fn(_i: &mut Interpreter, args: &[Expr], line: u32, col: u32) -> Result<Expr, Diagnostic> {
    let s = as_str(&args[0], line, col)?;
    Ok(Expr::new(ExprKind::Str(s.to_uppercase(), StrFlag::Literal), line, col))
}

fn lower_fn(_i: &mut Interpreter, args: &[Expr], line: u32, col: u32) -> Result<Expr, Diagnostic> {
    let s = as_str(&args[0], line, col)?;
    Ok(Expr::new(ExprKind::Str(s.to_lowercase(), StrFlag::Literal), line, col))
}

/// `substr` clamps `start` and `len` to the string's bounds rather than
/// erroring on an out-of-range request, since an empty result is always a
/// valid substring.
fn substr_fn(_i: &mut Interpreter, args: &[Expr], line: u32, col: u32) -> Result<Expr, Diagnostic> {
    let s = as_str(&args[0], line, col)?;
    let chars: Vec<char> = s.chars().collect();
    let ExprKind::Int(start) = args[1].kind else {
        return Err(invalid_arg_error("expected an integer start", line, col));
    };
    let ExprKind::Int(length) = args[2].kind else {
        return Err(invalid_arg_error("expected an integer length", line, col));
    };
    let start = start.max(0) as usize;
    let start = start.min(chars.len());
    let end = start.saturating_add(length.max(0) as usize).min(chars.len());
    let out: String = chars[start..end].iter().collect();
    Ok(Expr::new(ExprKind::Str(out, StrFlag::Literal), line, col))
}

/// `find` — the index of `needle` (a single character given as an
/// integer, or a substring given as a string) in `s`, or `-1` if absent.
fn find_fn(_i: &mut Interpreter, args: &[Expr], line: u32, col: u32) -> Result<Expr, Diagnostic> {
    let s = as_str(&args[0], line, col)?;
    let index = match &args[1].kind {
        ExprKind::Int(code) => {
            let ch = char::from_u32(u32::try_from(*code).unwrap_or(0)).unwrap_or('\0');
            s.find(ch)
        }
        ExprKind::Str(needle, _) => s.find(needle.as_str()),
        _ => return Err(invalid_arg_error("find requires a string or integer needle", line, col)),
    };
    Ok(Expr::int(index.map_or(-1, |byte_idx| s[..byte_idx].chars().count() as i64)))
}

/// `contains` — whether `needle` occurs anywhere in `s`, including at
/// index 0.
fn contains_fn(interp: &mut Interpreter, args: &[Expr], line: u32, col: u32) -> Result<Expr, Diagnostic> {
    let found = find_fn(interp, args, line, col)?;
    let ExprKind::Int(index) = found.kind else {
        unreachable!("find always returns an integer");
    };
    Ok(Expr::int(i64::from(index >= 0)))
}
