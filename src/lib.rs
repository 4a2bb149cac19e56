#![warn(bad_style)]
#![warn(future_incompatible)]
#![warn(nonstandard_style)]
#![warn(rust_2018_compatibility)]
#![warn(rust_2018_idioms)]
#![warn(missing_docs)]

//! Lexical front end for Bob Nystrom's
//! [Lox](https://github.com/munificent/craftinginterpreters)
//! programming language, from [Crafting
//! Interpreters](https://craftinginterpreters.com/).
//!
//! This crate turns Lox source code into a flat list of syntax
//! tokens for a parser to consume, plus the small driver behind the
//! `rlox` command that prints those tokens.
//!
//! # Behaviour
//!
//! - Source code is walked grapheme-by-grapheme, so a stray accented
//!   letter or emoji is reported once, as one character
//! - Identifiers, keywords and numbers are ASCII-only, as in the
//!   reference grammar
//! - Malformed input never stops a scan: problems go to a
//!   [`DiagnosticConsumer`] and the scan carries on
//! - Every token list ends with exactly one [`TokenType::Eof`] token

mod diagnostics;
pub mod driver;
mod error;
mod scanner;
mod token;

pub use crate::diagnostics::{
    console_diagnostic_consumer, Diagnostic, DiagnosticConsumer, NullDiagnosticConsumer,
    StreamDiagnosticConsumer,
};
pub use crate::error::{DriverError, LexError};
use crate::scanner::Scanner;
pub use crate::token::{keyword, Literal, Token, TokenType};

/// Converts Lox source code into syntax tokens.
///
/// The source code is required to outlive the resultant syntax
/// tokens, as the tokens contain references to the parts of code they
/// were constructed from.
///
/// Unterminated strings and unexpected characters are handed to
/// `diags` and left out of the result; the scan always runs to the
/// end and the last token is always an `Eof` token.
///
/// # Examples
///
/// Converting valid Lox code into syntax tokens:
///
/// ```
/// # use rlox_lexer::{tokenize, Diagnostic, Literal, TokenType};
/// let source = "var x = (42);";
/// let mut diags: Vec<Diagnostic> = Vec::new();
/// let tokens = tokenize(source, &mut diags);
///
/// let token_types: Vec<TokenType> = tokens.iter().map(|t| t.token_type).collect();
/// assert_eq!(
///     token_types,
///     vec![
///         TokenType::Var,
///         TokenType::Identifier,
///         TokenType::Equal,
///         TokenType::LeftParen,
///         TokenType::Number,
///         TokenType::RightParen,
///         TokenType::Semicolon,
///         TokenType::Eof,
///     ]
/// );
///
/// let lexemes: Vec<&str> = tokens.iter().map(|t| t.lexeme).collect();
/// assert_eq!(lexemes, vec!["var", "x", "=", "(", "42", ")", ";", ""]);
///
/// assert_eq!(tokens[4].literal, Literal::Number(42.0));
/// assert!(diags.is_empty());
/// ```
///
/// Unterminated strings are reported, not returned:
///
/// ```
/// # use rlox_lexer::{tokenize, Diagnostic, LexError, Token};
/// let mut diags: Vec<Diagnostic> = Vec::new();
/// let tokens = tokenize("var x = \"", &mut diags);
///
/// assert_eq!(tokens.len(), 4);
/// assert_eq!(tokens[3], Token::eof(1));
/// assert_eq!(diags, vec![Diagnostic::new(1, LexError::UnterminatedString)]);
/// ```
pub fn tokenize<'a, D>(source: &'a str, diags: &mut D) -> Vec<Token<'a>>
where
    D: DiagnosticConsumer + ?Sized,
{
    let mut scanner = Scanner::new(source);
    let mut tokens: Vec<Token<'a>> = Vec::new();

    while let Some(token) = scanner.next_token(diags) {
        tokens.push(token);
    }

    tokens
}
