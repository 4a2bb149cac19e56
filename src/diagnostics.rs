//! Reporting of malformed source code.
//!
//! The scanner never stops on bad input. It hands each problem to a
//! [DiagnosticConsumer] as a line-tagged [Diagnostic] and keeps going;
//! the consumer decides how to show it and remembers whether anything
//! went wrong, so a driver can pick an exit status afterwards.

use std::fmt;
use std::io::{self, Write};

use colored::Colorize;

use crate::error::LexError;

/// A problem found on one line of the source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// The 1-based line the problem was found on
    pub line: usize,
    /// What went wrong
    pub error: LexError,
}

impl Diagnostic {
    /// Creates a `Diagnostic` for `error` found on `line`.
    pub fn new(line: usize, error: LexError) -> Diagnostic {
        Diagnostic { line, error }
    }

    /// The human-readable message, without the line prefix.
    pub fn message(&self) -> String {
        self.error.to_string()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[line: {}] Error: {}", self.line, self.error)
    }
}

/// An interface for an object that receives diagnostics from the
/// scanner as they are found.
pub trait DiagnosticConsumer {
    /// Accepts one diagnostic.
    fn handle_diagnostic(&mut self, diag: Diagnostic);

    /// Checks if any diagnostic arrived since creation or the last
    /// [reset](DiagnosticConsumer::reset).
    fn had_error(&self) -> bool;

    /// Forgets about earlier diagnostics, e.g. between prompt lines.
    fn reset(&mut self);

    /// Pushes out anything buffered.
    fn flush(&mut self) {}
}

/// Collects every diagnostic, in the order they were reported.
impl DiagnosticConsumer for Vec<Diagnostic> {
    fn handle_diagnostic(&mut self, diag: Diagnostic) {
        self.push(diag);
    }

    fn had_error(&self) -> bool {
        !self.is_empty()
    }

    fn reset(&mut self) {
        self.clear();
    }
}

/// Throws diagnostics away, only remembering that there were some.
#[derive(Debug, Default)]
pub struct NullDiagnosticConsumer {
    had_error: bool,
}

impl DiagnosticConsumer for NullDiagnosticConsumer {
    fn handle_diagnostic(&mut self, _diag: Diagnostic) {
        self.had_error = true;
    }

    fn had_error(&self) -> bool {
        self.had_error
    }

    fn reset(&mut self) {
        self.had_error = false;
    }
}

/// Writes one line per diagnostic to a stream.
pub struct StreamDiagnosticConsumer<W: Write> {
    stream: io::BufWriter<W>,
    color: bool,
    error_count: usize,
}

impl<W: Write> StreamDiagnosticConsumer<W> {
    /// Creates a consumer writing to `stream`. With `color` set, the
    /// `Error` label is highlighted.
    pub fn new(stream: W, color: bool) -> StreamDiagnosticConsumer<W> {
        StreamDiagnosticConsumer {
            stream: io::BufWriter::new(stream),
            color,
            error_count: 0,
        }
    }

    /// How many diagnostics arrived since creation or the last reset.
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// The underlying stream, holding whatever has been flushed so far.
    pub fn get_ref(&self) -> &W {
        self.stream.get_ref()
    }

    /// Flushes and hands back the underlying stream.
    pub fn into_inner(self) -> io::Result<W> {
        self.stream.into_inner().map_err(|e| e.into_error())
    }
}

impl<W: Write> DiagnosticConsumer for StreamDiagnosticConsumer<W> {
    fn handle_diagnostic(&mut self, diag: Diagnostic) {
        self.error_count += 1;

        // A diagnostic that can't be written has nowhere else to go.
        let _ = if self.color {
            writeln!(
                self.stream,
                "[line: {}] {}: {}",
                diag.line,
                "Error".bright_red().bold(),
                diag.error
            )
        } else {
            writeln!(self.stream, "{}", diag)
        };
    }

    fn had_error(&self) -> bool {
        self.error_count > 0
    }

    fn reset(&mut self) {
        self.error_count = 0;
    }

    fn flush(&mut self) {
        let _ = self.stream.flush();
    }
}

/// A consumer reporting to standard error.
pub fn console_diagnostic_consumer(color: bool) -> StreamDiagnosticConsumer<io::Stderr> {
    StreamDiagnosticConsumer::new(io::stderr(), color)
}
