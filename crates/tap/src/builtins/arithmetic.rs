//! Arithmetic primitives, overloaded per first-argument kind: `+ - * /`
//! each register one candidate per accepted first-argument kind, and the
//! dispatcher picks the right body by matching that kind — `+` over
//! integers, floats, strings (concatenation), and dates (offset by
//! seconds) are each a separate overload under the same name.

use crate::context::Interpreter;
use crate::dispatch::{invalid_arg_error, PrimitiveTable};
use crate::env::EnvStack;
use crate::error::Diagnostic;
use crate::expr::{Expr, ExprKind, Param, StrFlag, TapArray, ValueKind};

pub fn register(table: &mut PrimitiveTable, envs: &mut EnvStack) {
    super::register(table, envs, "+", vec![Param::of_kind("a", ValueKind::Int)], true, add_int);
    super::register(table, envs, "+", vec![Param::of_kind("a", ValueKind::Float)], true, add_float);
    super::register(table, envs, "+", vec![Param::of_kind("a", ValueKind::Str)], true, add_str);
    super::register(table, envs, "+", vec![Param::of_kind("a", ValueKind::Array)], true, add_array);
    super::register(table, envs, "+", vec![Param::of_kind("a", ValueKind::Date)], true, add_date);

    super::register(table, envs, "-", vec![Param::of_kind("a", ValueKind::Int)], true, sub_int);
    super::register(table, envs, "-", vec![Param::of_kind("a", ValueKind::Float)], true, sub_float);

    super::register(table, envs, "*", vec![Param::of_kind("a", ValueKind::Int)], true, mul_int);
    super::register(table, envs, "*", vec![Param::of_kind("a", ValueKind::Float)], true, mul_float);

    super::register(table, envs, "/", vec![Param::of_kind("a", ValueKind::Int)], true, div_int);
    super::register(table, envs, "/", vec![Param::of_kind("a", ValueKind::Float)], true, div_float);
}

fn as_int(arg: &Expr, line: u32, col: u32) -> Result<i64, Diagnostic> {
    match arg.kind {
        ExprKind::Int(n) => Ok(n),
        _ => Err(invalid_arg_error("expected an integer", line, col)),
    }
}

fn as_float(arg: &Expr, line: u32, col: u32) -> Result<f64, Diagnostic> {
    match arg.kind {
        ExprKind::Float(f) => Ok(f),
        ExprKind::Int(n) => Ok(n as f64),
        _ => Err(invalid_arg_error("expected a float", line, col)),
    }
}

fn add_int(_i: &mut Interpreter, args: &[Expr], line: u32, col: u32) -> Result<Expr, Diagnostic> {
    let mut total = 0_i64;
    for a in args {
        total = total.wrapping_add(as_int(a, line, col)?);
    }
    Ok(Expr::int(total))
}

fn add_float(_i: &mut Interpreter, args: &[Expr], line: u32, col: u32) -> Result<Expr, Diagnostic> {
    let mut total = 0.0_f64;
    for a in args {
        total += as_float(a, line, col)?;
    }
    Ok(Expr::float(total))
}

fn add_str(_i: &mut Interpreter, args: &[Expr], line: u32, col: u32) -> Result<Expr, Diagnostic> {
    let mut out = String::new();
    for a in args {
        match &a.kind {
            ExprKind::Str(s, _) => out.push_str(s),
            _ => return Err(invalid_arg_error("expected a string", line, col)),
        }
    }
    Ok(Expr::new(ExprKind::Str(out, StrFlag::Literal), line, col))
}

fn add_array(_i: &mut Interpreter, args: &[Expr], line: u32, col: u32) -> Result<Expr, Diagnostic> {
    let mut out = TapArray::new();
    for a in args {
        match &a.kind {
            ExprKind::Array(arr) => out.extend(arr.iter().cloned()),
            _ => return Err(invalid_arg_error("expected an array", line, col)),
        }
    }
    Ok(Expr::new(ExprKind::Array(out), line, col))
}

/// `(+ date offset...)`: a date plus one or more integer offsets, each in
/// seconds, matching the original's `time_t`-as-integer arithmetic.
fn add_date(_i: &mut Interpreter, args: &[Expr], line: u32, col: u32) -> Result<Expr, Diagnostic> {
    let mut iter = args.iter();
    let Some(first) = iter.next() else {
        return Err(invalid_arg_error("+ requires at least one argument", line, col));
    };
    let ExprKind::Date(mut secs) = first.kind else {
        return Err(invalid_arg_error("expected a date", line, col));
    };
    for a in iter {
        secs += as_int(a, line, col)?;
    }
    Ok(Expr::new(ExprKind::Date(secs), line, col))
}

fn sub_int(_i: &mut Interpreter, args: &[Expr], line: u32, col: u32) -> Result<Expr, Diagnostic> {
    let mut iter = args.iter();
    let Some(first) = iter.next() else {
        return Err(invalid_arg_error("- requires at least one argument", line, col));
    };
    let mut total = as_int(first, line, col)?;
    if args.len() == 1 {
        return Ok(Expr::int(-total));
    }
    for a in iter {
        total = total.wrapping_sub(as_int(a, line, col)?);
    }
    Ok(Expr::int(total))
}

fn sub_float(_i: &mut Interpreter, args: &[Expr], line: u32, col: u32) -> Result<Expr, Diagnostic> {
    let mut iter = args.iter();
    let Some(first) = iter.next() else {
        return Err(invalid_arg_error("- requires at least one argument", line, col));
    };
    let mut total = as_float(first, line, col)?;
    if args.len() == 1 {
        return Ok(Expr::float(-total));
    }
    for a in iter {
        total -= as_float(a, line, col)?;
    }
    Ok(Expr::float(total))
}

fn mul_int(_i: &mut Interpreter, args: &[Expr], line: u32, col: u32) -> Result<Expr, Diagnostic> {
    let mut total = 1_i64;
    for a in args {
        total = total.wrapping_mul(as_int(a, line, col)?);
    }
    Ok(Expr::int(total))
}

fn mul_float(_i: &mut Interpreter, args: &[Expr], line: u32, col: u32) -> Result<Expr, Diagnostic> {
    let mut total = 1.0_f64;
    for a in args {
        total *= as_float(a, line, col)?;
    }
    Ok(Expr::float(total))
}

fn div_int(_i: &mut Interpreter, args: &[Expr], line: u32, col: u32) -> Result<Expr, Diagnostic> {
    let mut iter = args.iter();
    let Some(first) = iter.next() else {
        return Err(invalid_arg_error("/ requires at least one argument", line, col));
    };
    let mut total = as_int(first, line, col)?;
    for a in iter {
        let divisor = as_int(a, line, col)?;
        if divisor == 0 {
            return Err(invalid_arg_error("division by zero", line, col));
        }
        total /= divisor;
    }
    Ok(Expr::int(total))
}

fn div_float(_i: &mut Interpreter, args: &[Expr], line: u32, col: u32) -> Result<Expr, Diagnostic> {
    let mut iter = args.iter();
    let Some(first) = iter.next() else {
        return Err(invalid_arg_error("/ requires at least one argument", line, col));
    };
    let mut total = as_float(first, line, col)?;
    for a in iter {
        total /= as_float(a, line, col)?;
    }
    Ok(Expr::float(total))
}
