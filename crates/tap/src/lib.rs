//! Tap: a tree-walking interpreter for a small S-expression language.
//!
//! A Tap program is a flat sequence of top-level forms built from three
//! bracket kinds — `(...)` function application, `[...]` a lazy
//! expression forced on demand, `{...}` an array literal — over ten
//! intrinsic value kinds plus open-ended user-declared composite types.
//! Parsing and evaluation never abort on error: both record a
//! [`error::Diagnostic`] into the run's [`error::ErrorLog`] and substitute
//! `nil`, then keep going.

mod builtins;
pub mod context;
pub mod dispatch;
pub mod env;
pub mod error;
pub mod eval;
pub mod expr;
pub mod format;
pub mod limits;
pub mod parser;
pub mod print;
pub mod symtab;
pub mod trace;
pub mod types_registry;

pub use crate::{
    context::{Interpreter, RecursionLimitExceeded},
    error::{Diagnostic, ErrorKind, ErrorLog},
    expr::{Expr, ExprKind, ValueKind},
    limits::Limits,
    print::{CollectStringPrint, NoPrint, PrintWriter, StdPrint},
    trace::{NoopTracer, StderrTracer, Tracer},
};

/// Parses and evaluates `source` against a fresh default interpreter,
/// returning the program's final value together with every diagnostic
/// recorded along the way.
#[must_use]
pub fn run(source: &str) -> (Expr, ErrorLog) {
    let mut interp = Interpreter::new();
    run_with(&mut interp, source)
}

/// Parses and evaluates `source` against an existing interpreter,
/// preserving whatever bindings and composite types it already carries —
/// the shape a REPL or an embedding host needs to run successive chunks
/// of source against one accumulating session.
pub fn run_with(interp: &mut Interpreter, source: &str) -> (Expr, ErrorLog) {
    let mut parse_errors = error::ErrorLog::new();
    let program = parser::parse(source, &mut parse_errors);
    for diagnostic in parse_errors.drain() {
        interp.errors.record(diagnostic);
    }
    let value = eval::run_program(interp, &program);
    (value, std::mem::take(&mut interp.errors))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_level_forms_share_one_scope() {
        let (value, errors) = run(r#"(set "y" 10) (+ y 5)"#);
        assert!(errors.is_empty());
        assert_eq!(value.kind, ExprKind::Int(15));
    }

    #[test]
    fn undefined_variable_records_error_and_yields_nil() {
        let (value, errors) = run("missing");
        assert!(value.is_nil());
        assert_eq!(errors.entries().len(), 1);
        assert_eq!(errors.entries()[0].kind, ErrorKind::UndefinedVar);
    }

    #[test]
    fn recursive_function_via_here() {
        let source = r#"
            (set "fact" (function [(n)] [
                (if (== n 0) [1] [(* n (fact (- n 1)))])
            ]))
            (fact 5)
        "#;
        let (value, errors) = run(source);
        assert!(errors.is_empty());
        assert_eq!(value.kind, ExprKind::Int(120));
    }
}
