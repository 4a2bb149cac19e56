//! The thin shell around the lexer behind the `rlox` command.
//!
//! A [Driver] feeds whole programs, either a script file or one
//! prompt line at a time, to [tokenize](crate::tokenize) and prints
//! the tokens it gets back. Deciding how the process should exit is
//! left to the caller through [ExitStatus].

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::diagnostics::DiagnosticConsumer;
use crate::error::DriverError;
use crate::token::Token;
use crate::tokenize;

/// How a run should end the process, using the `sysexits.h` codes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    /// Everything scanned cleanly
    Success,
    /// The command line was malformed
    Usage,
    /// The script contained lexical errors
    DataError,
    /// The script or console couldn't be read or written
    IoError,
}

impl ExitStatus {
    /// The process exit code.
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::Usage => 64,
            ExitStatus::DataError => 65,
            ExitStatus::IoError => 74,
        }
    }
}

/// Runs Lox programs through the lexer, listing tokens to `out` and
/// diagnostics to `diags`.
pub struct Driver<W: Write, D: DiagnosticConsumer> {
    out: W,
    diags: D,
    quiet: bool,
}

impl<W: Write, D: DiagnosticConsumer> Driver<W, D> {
    /// Creates a `Driver` that prints every token.
    pub fn new(out: W, diags: D) -> Driver<W, D> {
        Driver {
            out,
            diags,
            quiet: false,
        }
    }

    /// With `quiet` set, the token listing is left out and only
    /// diagnostics are reported.
    pub fn quiet(mut self, quiet: bool) -> Driver<W, D> {
        self.quiet = quiet;
        self
    }

    /// Scans one complete program, returning how many tokens it
    /// produced (the `Eof` token included).
    pub fn run(&mut self, source: &str) -> io::Result<usize> {
        let tokens = tokenize(source, &mut self.diags);

        // Diagnostics go out even when the listing can't.
        let listed = self.list(&tokens).and_then(|()| self.out.flush());
        self.diags.flush();
        listed?;

        Ok(tokens.len())
    }

    fn list(&mut self, tokens: &[Token<'_>]) -> io::Result<()> {
        if !self.quiet {
            for token in tokens {
                writeln!(self.out, "<\t{}", token)?;
            }
        }

        Ok(())
    }

    /// Scans the script at `path`.
    ///
    /// Bytes that aren't valid UTF-8 are replaced with U+FFFD, which
    /// then gets reported as an unexpected character.
    pub fn run_file(&mut self, path: &Path) -> Result<ExitStatus, DriverError> {
        let bytes = fs::read(path).map_err(|source| DriverError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let source = String::from_utf8_lossy(&bytes);

        self.run(&source)?;

        if self.diags.had_error() {
            Ok(ExitStatus::DataError)
        } else {
            Ok(ExitStatus::Success)
        }
    }

    /// Reads and scans `input` line by line until it runs out.
    ///
    /// Each line is its own program; lexical errors on one line don't
    /// carry over to the next.
    pub fn run_prompt<R: BufRead>(&mut self, mut input: R) -> Result<(), DriverError> {
        let mut line = String::new();

        loop {
            write!(self.out, "> ")?;
            self.out.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                // Ctrl-D
                break;
            }

            self.run(line.trim_end_matches(&['\n', '\r'][..]))?;
            self.diags.reset();
        }

        Ok(())
    }

    /// Gives back the output stream and diagnostic consumer.
    pub fn into_parts(self) -> (W, D) {
        (self.out, self.diags)
    }
}
