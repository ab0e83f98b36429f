//! Execution tracing.
//!
//! A single trait with swappable zero-cost implementations, the same
//! shape as a bytecode-VM tracer scaled down to the handful of events a
//! recursive tree-walker can actually emit: scope transitions, calls, and
//! errors as they're recorded.

/// Hook points the evaluator fires into as it runs. `NoopTracer`'s methods
/// are `#[inline]` no-ops and compile away entirely; implement this trait
/// to observe a run without touching the evaluator itself.
pub trait Tracer {
    fn on_enter_scope(&mut self, _depth: usize) {}
    fn on_leave_scope(&mut self, _depth: usize) {}
    fn on_call(&mut self, _name: &str, _arg_count: usize) {}
    fn on_error(&mut self, _diagnostic: &crate::error::Diagnostic) {}
}

/// The default tracer: observes nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTracer;

impl Tracer for NoopTracer {}

/// Prints every event to stderr as it happens, for debugging interpreter
/// runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrTracer;

impl Tracer for StderrTracer {
    fn on_enter_scope(&mut self, depth: usize) {
        eprintln!("enter scope depth={depth}");
    }

    fn on_leave_scope(&mut self, depth: usize) {
        eprintln!("leave scope depth={depth}");
    }

    fn on_call(&mut self, name: &str, arg_count: usize) {
        eprintln!("call {name} argc={arg_count}");
    }

    fn on_error(&mut self, diagnostic: &crate::error::Diagnostic) {
        eprintln!("error {diagnostic}");
    }
}
