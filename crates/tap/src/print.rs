//! The `print` primitive's output sink.
//!
//! One trait with three implementations, so tests can capture output
//! instead of touching real stdout, and the CLI can stream straight to it.

use std::borrow::Cow;
use std::io::{self, Write as _};

/// Destination for text produced by the `print` primitive.
pub trait PrintWriter {
    /// Writes a single formatted value's text, with no separator or
    /// trailing newline added.
    fn write(&mut self, output: Cow<'_, str>);

    /// Writes a single separator or terminator character (space, newline).
    fn push(&mut self, ch: char);
}

/// Writes straight to stdout.
#[derive(Debug, Default)]
pub struct StdPrint;

impl PrintWriter for StdPrint {
    fn write(&mut self, output: Cow<'_, str>) {
        let _ = io::stdout().write_all(output.as_bytes());
    }

    fn push(&mut self, ch: char) {
        let mut buf = [0_u8; 4];
        let _ = io::stdout().write_all(ch.encode_utf8(&mut buf).as_bytes());
    }
}

/// Collects everything written into an in-memory string. Used by tests
/// that need to assert on `print` output.
#[derive(Debug, Default)]
pub struct CollectStringPrint(String);

impl CollectStringPrint {
    #[must_use]
    pub fn new() -> Self {
        Self(String::new())
    }

    #[must_use]
    pub fn output(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_output(self) -> String {
        self.0
    }
}

impl PrintWriter for CollectStringPrint {
    fn write(&mut self, output: Cow<'_, str>) {
        self.0.push_str(&output);
    }

    fn push(&mut self, ch: char) {
        self.0.push(ch);
    }
}

/// Discards everything written to it.
#[derive(Debug, Default)]
pub struct NoPrint;

impl PrintWriter for NoPrint {
    fn write(&mut self, _output: Cow<'_, str>) {}
    fn push(&mut self, _ch: char) {}
}
