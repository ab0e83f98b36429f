//! Date primitives: `now`, `date.format`.

use crate::context::Interpreter;
use crate::dispatch::{invalid_arg_error, PrimitiveTable};
use crate::env::EnvStack;
use crate::error::{Diagnostic, ErrorKind};
use crate::expr::{Expr, ExprKind, Param, StrFlag, ValueKind};
use crate::format::format_date;

pub fn register(table: &mut PrimitiveTable, envs: &mut EnvStack) {
    super::register(table, envs, "now", vec![], false, now_fn);
    super::register(
        table,
        envs,
        "date.format",
        vec![Param::of_kind("date", ValueKind::Date), Param::of_kind("fmt", ValueKind::Str)],
        false,
        date_format_fn,
    );
}

/// The interpreter is deterministic in every other respect, so the wall
/// clock is the one primitive allowed to reach outside the evaluator's
/// otherwise-pure value model.
fn now_fn(_i: &mut Interpreter, _args: &[Expr], line: u32, col: u32) -> Result<Expr, Diagnostic> {
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);
    Ok(Expr::new(ExprKind::Date(secs), line, col))
}

fn date_format_fn(_i: &mut Interpreter, args: &[Expr], line: u32, col: u32) -> Result<Expr, Diagnostic> {
    let ExprKind::Date(secs) = args[0].kind else {
        return Err(invalid_arg_error("expected a date", line, col));
    };
    let ExprKind::Str(fmt, _) = &args[1].kind else {
        return Err(invalid_arg_error("expected a format string", line, col));
    };
    match format_date(secs, fmt) {
        Some(text) => Ok(Expr::new(ExprKind::Str(text, StrFlag::Literal), line, col)),
        None => Err(Diagnostic::new(ErrorKind::InvalidArg, "unrecognized format code", line, col)),
    }
}
