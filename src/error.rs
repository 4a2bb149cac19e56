use std::error;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Represents a malformed piece of Lox source code.
///
/// Neither case stops a scan: the offending lexeme is reported and
/// left out of the token sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LexError {
    /// A `"` was opened but the source ended before it was closed
    UnterminatedString,
    /// A grapheme that doesn't start any Lox lexeme
    UnexpectedCharacter(String),
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::UnterminatedString => f.write_str("Unterminated string."),
            LexError::UnexpectedCharacter(g) => write!(f, "Unexpected character '{}'.", g),
        }
    }
}

impl error::Error for LexError {}

/// Represents a failure of the driver to get at its input.
#[derive(Debug)]
pub enum DriverError {
    /// The script file couldn't be read
    Io {
        /// Path given on the command line
        path: PathBuf,
        /// What went wrong
        source: io::Error,
    },
    /// Reading input or writing the token listing failed
    Console(io::Error),
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::Io { path, source } => {
                write!(f, "could not read {}: {}", path.display(), source)
            }
            DriverError::Console(e) => write!(f, "console I/O failed: {}", e),
        }
    }
}

impl From<io::Error> for DriverError {
    fn from(e: io::Error) -> Self {
        DriverError::Console(e)
    }
}

impl error::Error for DriverError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            DriverError::Io { source, .. } => Some(source),
            DriverError::Console(e) => Some(e),
        }
    }
}
