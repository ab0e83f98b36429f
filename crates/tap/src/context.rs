//! The interpreter context: every piece of state the parser and evaluator
//! share, grouped into one value instead of process globals — a single
//! owned replacement for the original's global environment stack, type
//! counter, and error log.

use crate::builtins;
use crate::dispatch::PrimitiveTable;
use crate::env::EnvStack;
use crate::error::ErrorLog;
use crate::limits::Limits;
use crate::print::{NoPrint, PrintWriter, StdPrint};
use crate::trace::{NoopTracer, Tracer};
use crate::types_registry::TypeRegistry;

/// Owns every piece of run-wide state: the environment stack, the
/// composite type registry, the primitive function table, the error log,
/// resource limits, the tracer, and the `print` sink. The tracer and
/// print sink are boxed trait objects so embedding code can swap them
/// without propagating generic parameters through every evaluator
/// function, matching how little either one is on the hot path of a
/// tree-walking evaluator.
pub struct Interpreter {
    pub envs: EnvStack,
    pub types: TypeRegistry,
    pub primitives: PrimitiveTable,
    pub errors: ErrorLog,
    pub limits: Limits,
    pub tracer: Box<dyn Tracer>,
    pub print: Box<dyn PrintWriter>,
    recursion_depth: usize,
    resource_exhausted: bool,
}

impl Interpreter {
    #[must_use]
    pub fn new() -> Self {
        Self::with(Limits::default(), Box::new(NoopTracer), Box::new(StdPrint))
    }

    /// Convenience constructor for tests that don't care about stdout.
    #[must_use]
    pub fn silent() -> Self {
        Self::with(Limits::default(), Box::new(NoopTracer), Box::new(NoPrint))
    }

    #[must_use]
    pub fn with(limits: Limits, tracer: Box<dyn Tracer>, print: Box<dyn PrintWriter>) -> Self {
        let mut envs = EnvStack::new(limits.max_env_stack);
        let mut primitives = PrimitiveTable::new();
        builtins::register_all(&mut primitives, &mut envs);
        Self {
            envs,
            types: TypeRegistry::new(),
            primitives,
            errors: ErrorLog::new(),
            limits,
            tracer,
            print,
            recursion_depth: 0,
            resource_exhausted: false,
        }
    }

    /// Guards a recursive evaluation step, returning `Err` once the
    /// configured recursion ceiling is exceeded. Pairs with
    /// `leave_recursion` on every exit path, mirroring the enter/leave
    /// discipline required of scopes.
    pub fn enter_recursion(&mut self) -> Result<(), RecursionLimitExceeded> {
        if self.recursion_depth >= self.limits.max_recursion_depth {
            self.resource_exhausted = true;
            return Err(RecursionLimitExceeded);
        }
        self.recursion_depth += 1;
        Ok(())
    }

    pub fn leave_recursion(&mut self) {
        self.recursion_depth = self.recursion_depth.saturating_sub(1);
    }

    #[must_use]
    pub fn recursion_depth(&self) -> usize {
        self.recursion_depth
    }

    /// Records that the run hit a hard resource ceiling (recursion depth
    /// or environment stack depth). The CLI surfaces this as its
    /// out-of-memory exit code.
    pub fn mark_resource_exhausted(&mut self) {
        self.resource_exhausted = true;
    }

    #[must_use]
    pub fn is_resource_exhausted(&self) -> bool {
        self.resource_exhausted
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// Signals that a run exceeded its configured recursion ceiling. Surfaced
/// by the CLI as the out-of-memory exit code, since a tree-walker cannot
/// otherwise distinguish "true allocation failure" from "we chose a
/// depth ceiling" without relying on platform-specific stack-overflow
/// recovery the original interpreter doesn't attempt either.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecursionLimitExceeded;
