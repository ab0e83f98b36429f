//! End-to-end tests driving the interpreter through its public `run`
//! entry point, the way an embedding host or the CLI would.

use pretty_assertions::assert_eq;
use tap::{ErrorKind, ExprKind};

/// Runs `source` and asserts no diagnostics were recorded, returning the
/// final value.
fn eval_ok(source: &str) -> tap::Expr {
    let (value, errors) = tap::run(source);
    assert!(errors.is_empty(), "unexpected errors: {errors}");
    value
}

/// Arithmetic primitives are variadic: `+` folds every argument.
#[test]
fn variadic_addition() {
    let value = eval_ok("(+ 1 2 3)");
    assert_eq!(value.kind, ExprKind::Int(6));
}

/// `if` selects a branch by truthiness and leaves the other branch
/// unevaluated when it is written as a lazy `[...]` expression.
#[test]
fn if_selects_taken_branch() {
    let value = eval_ok(r#"(if (> 5 3) "yes" "no")"#);
    assert!(matches!(&value.kind, ExprKind::Str(s, _) if s == "yes"));
}

/// A single-parameter function built with `function` and the
/// parenthesized parameter-list entry syntax.
#[test]
fn function_call_with_single_param() {
    let value = eval_ok("((function [(x)] [(* x x)]) 7)");
    assert_eq!(value.kind, ExprKind::Int(49));
}

/// `set` binds into the enclosing scope, so a later top-level form in the
/// same program sees the binding.
#[test]
fn set_binds_into_shared_top_level_scope() {
    let value = eval_ok(r#"(set "y" 10) (+ y 5)"#);
    assert_eq!(value.kind, ExprKind::Int(15));
}

/// Declaring a composite type with typed, required properties,
/// constructing an instance with `obj`, and reading a property back out
/// through the call-syntax indexing path.
#[test]
fn composite_type_roundtrip() {
    let value = eval_ok(
        r#"
        (new-type "Point" [
            (property public local [int] "x" 0)
            (property public local [int] "y" 0)
            (required "x" "y")
        ])
        (set "p" (obj Point [("x" 3) ("y" 4)]))
        (p "x")
        "#,
    );
    assert_eq!(value.kind, ExprKind::Int(3));
}

/// A required property omitted at construction time is reported as
/// `UndefinedProp` rather than silently defaulting.
#[test]
fn missing_required_property_is_recorded_as_undefined_prop() {
    let (value, errors) = tap::run(
        r#"
        (new-type "Point" [
            (property public local [int] "x" 0)
            (required "x")
        ])
        (obj Point [])
        "#,
    );
    assert!(value.is_nil());
    assert_eq!(errors.entries().len(), 1);
    assert_eq!(errors.entries()[0].kind, ErrorKind::UndefinedProp);
}

/// An optional property omitted at construction time falls back to its
/// declared default rather than being rejected.
#[test]
fn optional_property_falls_back_to_default() {
    let value = eval_ok(
        r#"
        (new-type "Counter" [(property public local [int] "n" 0)])
        (set "c" (obj Counter []))
        (c "n")
        "#,
    );
    assert_eq!(value.kind, ExprKind::Int(0));
}

/// A variable bound to an array can be indexed the same way: the call
/// head resolves to the array, and the lone argument is the index.
#[test]
fn array_index_via_call_syntax() {
    let value = eval_ok(r#"(set "arr" {1 2 3}) (arr 1)"#);
    assert_eq!(value.kind, ExprKind::Int(2));
}

/// Indexing an array out of bounds records `OutOfBounds` and yields nil
/// rather than aborting the run.
#[test]
fn array_index_out_of_bounds_records_error() {
    let (value, errors) = tap::run(r#"(set "arr" {1 2 3}) (arr 5)"#);
    assert!(value.is_nil());
    assert_eq!(errors.entries().len(), 1);
    assert_eq!(errors.entries()[0].kind, ErrorKind::OutOfBounds);
}

/// A lone open paren parses as a single nil-valued container and the
/// missing close is reported as an `UnclosedParen` diagnostic; parsing
/// never aborts the run.
#[test]
fn unclosed_paren_is_recovered_and_reported() {
    let (value, errors) = tap::run("(");
    assert!(value.is_nil());
    assert_eq!(errors.entries().len(), 1);
    assert_eq!(errors.entries()[0].kind, ErrorKind::UnclosedParen);
}

/// `+` dispatches to a different overload per first-argument kind:
/// integers, floats, strings (concatenation), and arrays (concatenation)
/// all share the name.
#[test]
fn addition_overloads_by_first_argument_kind() {
    assert_eq!(eval_ok("(+ 1 2)").kind, ExprKind::Int(3));
    assert!(matches!(eval_ok("(+ 1.5 2.5)").kind, ExprKind::Float(f) if (f - 4.0).abs() < f64::EPSILON));
    assert!(matches!(&eval_ok(r#"(+ "a" "b")"#).kind, ExprKind::Str(s, _) if s == "ab"));
    let joined = eval_ok("(+ {1 2} {3})");
    let ExprKind::Array(arr) = joined.kind else { panic!("expected array") };
    assert_eq!(arr.len(), 3);
}

/// `if`'s untaken branch, written lazily, is never forced: a reference
/// to an undefined variable inside it must not raise an error.
#[test]
fn if_does_not_force_the_untaken_branch() {
    let (value, errors) = tap::run("(if (> 1 2) [undefined_in_taken_branch] [5])");
    assert!(errors.is_empty(), "untaken branch must not be evaluated: {errors}");
    assert_eq!(value.kind, ExprKind::Int(5));
}

/// Symbols compile to their name's hash at parse time, so two identical
/// symbol tokens compare equal by plain integer equality.
#[test]
fn symbols_compare_equal_by_hash() {
    let value = eval_ok("(== 'ok 'ok)");
    assert_eq!(value.kind, ExprKind::Int(1));
}

/// A recursive function refers to itself by the name it was `set` under,
/// using the `[(n)]` single-parameter entry syntax.
#[test]
fn recursive_factorial() {
    let source = r#"
        (set "fact" (function [(n)] [
            (if (== n 0) [1] [(* n (fact (- n 1)))])
        ]))
        (fact 5)
    "#;
    let value = eval_ok(source);
    assert_eq!(value.kind, ExprKind::Int(120));
}

/// `set` reassigns an existing plain binding in place: a later `set` of
/// the same name must be what subsequent lookups see, not the first
/// value it was ever bound to.
#[test]
fn set_reassigns_existing_variable() {
    let value = eval_ok(r#"(set "y" 10) (set "y" 20) (+ y 5)"#);
    assert_eq!(value.kind, ExprKind::Int(25));
}

/// A self-recursive tail call reuses its caller's scope (via
/// `EnvStack::can_reuse_parent`) instead of pushing a fresh one for every
/// level, so a recursion depth well past `INITIAL_ENV_COUNT/2` (50) still
/// fits inside the default environment-stack budget instead of hitting
/// `EnvStackOverflow`.
#[test]
fn deep_tail_recursion_stays_within_env_stack_budget() {
    let source = r#"
        (set "count" (function [(n)] [
            (if (== n 0) [0] [(count (- n 1))])
        ]))
        (count 60)
    "#;
    let (value, errors) = tap::run(source);
    assert!(errors.is_empty(), "deep recursion hit resource limits: {errors}");
    assert_eq!(value.kind, ExprKind::Int(0));
}

/// Calling a user function with too few arguments is `InvalidNumArgs`, not
/// the generic `UndefinedFun` a wholly unknown name would get — the name
/// is bound, just not to a candidate with a compatible arity.
#[test]
fn wrong_arity_call_is_invalid_num_args() {
    let (value, errors) = tap::run(
        r#"
        (set "double" (function [(n)] [(* n 2)]))
        (double)
        "#,
    );
    assert!(value.is_nil());
    assert_eq!(errors.entries().len(), 1);
    assert_eq!(errors.entries()[0].kind, ErrorKind::InvalidNumArgs);
}

/// Calling a user function with an argument of the wrong declared kind is
/// `InvalidArg`, distinct from an arity mismatch on the same name.
#[test]
fn wrong_kind_call_is_invalid_arg() {
    let (value, errors) = tap::run(
        r#"
        (set "only-ints" (function [(n int)] [n]))
        (only-ints "not an int")
        "#,
    );
    assert!(value.is_nil());
    assert_eq!(errors.entries().len(), 1);
    assert_eq!(errors.entries()[0].kind, ErrorKind::InvalidArg);
}

/// Referencing an undefined variable records `UndefinedVar` and
/// substitutes nil rather than aborting the run.
#[test]
fn undefined_variable_is_recorded_and_recovered() {
    let (value, errors) = tap::run("missing");
    assert!(value.is_nil());
    assert_eq!(errors.entries().len(), 1);
    assert_eq!(errors.entries()[0].kind, ErrorKind::UndefinedVar);
}
