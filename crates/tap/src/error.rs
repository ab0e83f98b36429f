//! Diagnostics and the append-only error log.
//!
//! Tap never aborts evaluation on error: the parser and evaluator record a
//! [`Diagnostic`] and substitute `nil` wherever an error is detected, then
//! keep going. `ErrorKind` mirrors the eleven error codes of the original
//! interpreter; the numeric codes are preserved as `repr` discriminants so
//! the CLI's error report matches the original wire format.

use std::fmt;

use strum::{Display, EnumString, IntoStaticStr};

/// The eleven error categories a Tap program can raise during parsing or
/// evaluation. Discriminants match the original `ERR_*` constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
pub enum ErrorKind {
    General = 0,
    UnclosedParen = 1,
    UnmatchedParen = 2,
    UnclosedStrLit = 3,
    InvalidArg = 4,
    InvalidNumArgs = 5,
    InvalidPropTyp = 6,
    UndefinedVar = 7,
    UndefinedFun = 8,
    UndefinedTyp = 9,
    UndefinedProp = 10,
    OutOfBounds = 11,
}

impl ErrorKind {
    /// The numeric code used in error reports, matching the original codes.
    #[must_use]
    pub fn code(self) -> u32 {
        self as u32
    }

    /// The static label printed in an error report (distinct from the
    /// `Display`/`EnumString` derive, which renders the Rust variant name
    /// rather than this human-readable label).
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::General => "general error",
            ErrorKind::UnclosedParen => "unclosed parenthesis",
            ErrorKind::UnmatchedParen => "unmatched parenthesis",
            ErrorKind::UnclosedStrLit => "unclosed string literal",
            ErrorKind::InvalidArg => "invalid argument",
            ErrorKind::InvalidNumArgs => "invalid number of arguments",
            ErrorKind::InvalidPropTyp => "invalid property type",
            ErrorKind::UndefinedVar => "undefined variable",
            ErrorKind::UndefinedFun => "undefined function",
            ErrorKind::UndefinedTyp => "undefined type",
            ErrorKind::UndefinedProp => "undefined property",
            ErrorKind::OutOfBounds => "index out of bounds",
        }
    }
}

/// A single recorded error: what went wrong, a human-readable message, and
/// where in the source it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub message: String,
    pub line: u32,
    pub column: u32,
}

impl Diagnostic {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            kind,
            message: message.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ({}:{})",
            self.kind.code(),
            self.message,
            self.line,
            self.column
        )
    }
}

impl Diagnostic {
    /// Renders one line of the error report: `\tError N: <label>, line L,
    /// index I: "<message>"`. `n` is the diagnostic's 1-based position in
    /// the log, not its error code.
    fn report_line(&self, n: usize) -> String {
        format!(
            "\tError {n}: {}, line {}, index {}: \"{}\"",
            self.kind.label(),
            self.line,
            self.column,
            self.message
        )
    }
}

/// Append-only log of every diagnostic raised during a run. Shared by the
/// parser and the evaluator via the interpreter context.
#[derive(Debug, Default, Clone)]
pub struct ErrorLog {
    entries: Vec<Diagnostic>,
}

impl ErrorLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    #[must_use]
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn drain(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.entries)
    }
}

/// The full error report: `Errors:\n` followed by one `report_line` per
/// recorded diagnostic, in the order they were recorded.
impl fmt::Display for ErrorLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Errors:")?;
        for (i, entry) in self.entries.iter().enumerate() {
            writeln!(f, "{}", entry.report_line(i + 1))?;
        }
        Ok(())
    }
}
