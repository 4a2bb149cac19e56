use crate::diagnostics::{Diagnostic, DiagnosticConsumer};
use crate::error::LexError;
use crate::token::TokenType::*;
use crate::token::{keyword, Literal, Token, TokenType};

use unicode_segmentation::UnicodeSegmentation;

/// Internal structure for scanning through Lox source code
/// grapheme-by-grapheme to produce `Token`s.
pub struct Scanner<'a> {
    /// The original source code, expected to outlive this struct
    source: &'a str,
    /// `GraphemeIndices`, tuples of byte offsets and graphemes
    graphemes: Vec<(usize, &'a str)>,
    /// Index of the first grapheme of the current lexeme
    start: usize,
    /// Index of the next grapheme to be taken
    current: usize,
    /// Line the `current` grapheme is on
    line: usize,
    /// Line the current lexeme started on
    start_line: usize,
    /// Whether the `Eof` token has been handed out
    finished: bool,
}

impl<'a> Scanner<'a> {
    /// Creates a new `Scanner`.
    pub fn new(source: &'a str) -> Scanner<'a> {
        // We need two graphemes of lookahead for numbers, so it's
        // easier to collect the iterator up front than to juggle it.
        let mut graphemes: Vec<(usize, &'a str)> = Vec::new();
        for (offset, grapheme) in UnicodeSegmentation::grapheme_indices(source, true) {
            // A combining mark after `"` or `=` must not hide it, so an
            // ASCII head always stands alone.
            if grapheme.len() > 1 && grapheme.as_bytes()[0].is_ascii() {
                graphemes.push((offset, &grapheme[..1]));
                graphemes.push((offset + 1, &grapheme[1..]));
            } else {
                graphemes.push((offset, grapheme));
            }
        }

        Scanner {
            source,
            graphemes,
            start: 0,
            current: 0,
            line: 1,
            start_line: 1,
            finished: false,
        }
    }

    /// Advances the `Scanner` forward, returning the next `Token`.
    ///
    /// Malformed lexemes are reported to `diags` and skipped. Once
    /// the source is used up a single `Eof` token is returned, and
    /// `None` after that.
    pub fn next_token<D>(&mut self, diags: &mut D) -> Option<Token<'a>>
    where
        D: DiagnosticConsumer + ?Sized,
    {
        loop {
            self.skip_ignorables();

            let grapheme = match self.take() {
                Some(grapheme) => grapheme,
                None => return self.finish(),
            };

            let token = match grapheme {
                // Always 1-grapheme matches
                "(" => self.make_token(LeftParen),
                ")" => self.make_token(RightParen),
                "{" => self.make_token(LeftBrace),
                "}" => self.make_token(RightBrace),
                ";" => self.make_token(Semicolon),
                "," => self.make_token(Comma),
                "." => self.make_token(Dot),
                "-" => self.make_token(Minus),
                "+" => self.make_token(Plus),
                "*" => self.make_token(Star),
                // `//` never gets here, see `skip_ignorables`
                "/" => self.make_token(Slash),

                // 1 or maybe 2-grapheme matches
                "!" => self.make_either("=", BangEqual, Bang),
                "=" => self.make_either("=", EqualEqual, Equal),
                "<" => self.make_either("=", LessEqual, Less),
                ">" => self.make_either("=", GreaterEqual, Greater),

                // Literals
                "\"" => match self.make_string_literal() {
                    Ok(token) => token,
                    Err(error) => {
                        diags.handle_diagnostic(Diagnostic::new(self.line, error));
                        continue;
                    }
                },
                g if is_ascii_digit(g) => self.make_number_literal(),

                // Identifiers and keywords
                // (number literal case must come before this)
                g if is_identifier_start(g) => self.make_identifier(),

                g => {
                    let error = LexError::UnexpectedCharacter(g.to_string());
                    diags.handle_diagnostic(Diagnostic::new(self.line, error));
                    continue;
                }
            };

            return Some(token);
        }
    }

    /// Hands out the `Eof` token exactly once.
    fn finish(&mut self) -> Option<Token<'a>> {
        if self.finished {
            None
        } else {
            self.finished = true;
            Some(Token::eof(self.line))
        }
    }

    /// Checks if every grapheme has been taken.
    fn at_end(&self) -> bool {
        self.current >= self.graphemes.len()
    }

    // ================================
    // METHODS FOR EXTRACTING GRAPHEMES
    // ================================
    // The following methods all have to do with looking for, testing
    // against, and retrieving graphemes from our collection of
    // grapheme indices. So if you're unsure what these methods do
    // based on their name alone, just mentally append "grapheme" to
    // the end of it.

    fn peek(&self) -> Option<&'a str> {
        self.graphemes.get(self.current).map(|&(_, g)| g)
    }

    fn peek_is(&self, expected: &str) -> bool {
        self.peek() == Some(expected)
    }

    fn peek_next(&self) -> Option<&'a str> {
        self.graphemes.get(self.current + 1).map(|&(_, g)| g)
    }

    fn peek_next_is(&self, expected: &str) -> bool {
        self.peek_next() == Some(expected)
    }

    fn take(&mut self) -> Option<&'a str> {
        let grapheme = self.peek()?;
        self.current += 1;
        Some(grapheme)
    }

    fn take_if(&mut self, expected: &str) -> bool {
        if self.peek_is(expected) {
            self.take();
            true
        } else {
            false
        }
    }

    fn take_while(&mut self, predicate: fn(&str) -> bool) {
        while self.peek().map_or(false, predicate) {
            self.take();
        }
    }

    // ==============================
    // METHODS FOR EXTRACTING LEXEMES
    // ==============================

    /// Advances the `Scanner` past whitespace, newlines, and line
    /// comments until it is either at the end of the source code or
    /// it points to the first grapheme of a lexeme.
    fn skip_ignorables(&mut self) {
        while let Some(current) = self.peek() {
            match current {
                g if is_newline(g) => {
                    self.take();
                    self.line += 1;
                }
                g if is_whitespace(g) => {
                    self.take();
                }

                // Comments run up to, but not including, the newline
                "/" if self.peek_next_is("/") => {
                    while self.peek().map_or(false, |g| !is_newline(g)) {
                        self.take();
                    }
                }

                _ => break,
            }
        }

        // Re-sync so `start` points to the start of the next lexeme
        self.start = self.current;
        self.start_line = self.line;
    }

    /// Byte offset in the source code of the grapheme at `index`.
    ///
    /// One past the last grapheme maps to the end of the source.
    fn byte_offset(&self, index: usize) -> usize {
        self.graphemes
            .get(index)
            .map_or(self.source.len(), |&(offset, _)| offset)
    }

    /// The part of the source code between `start` and `current`.
    fn lexeme(&self) -> &'a str {
        &self.source[self.byte_offset(self.start)..self.byte_offset(self.current)]
    }

    /// Constructs a new syntax `Token` using the current internal
    /// state of the `Scanner`.
    fn make_token(&self, token_type: TokenType) -> Token<'a> {
        Token::new(token_type, self.lexeme(), self.start_line)
    }

    /// Takes `expected` if it's next and makes a `matched` token,
    /// otherwise makes an `unmatched` one.
    fn make_either(&mut self, expected: &str, matched: TokenType, unmatched: TokenType) -> Token<'a> {
        if self.take_if(expected) {
            self.make_token(matched)
        } else {
            self.make_token(unmatched)
        }
    }

    /// Constructs a new string literal syntax `Token`.
    ///
    /// Expects the opening quote to have been taken already. Strings
    /// may span lines; backslashes get no special treatment.
    ///
    /// # Returns
    ///
    /// `Err` if the string is unterminated.
    fn make_string_literal(&mut self) -> Result<Token<'a>, LexError> {
        while let Some(grapheme) = self.peek() {
            if grapheme == "\"" {
                break;
            }
            if is_newline(grapheme) {
                self.line += 1;
            }
            self.take();
        }

        if !self.take_if("\"") {
            return Err(LexError::UnterminatedString);
        }

        let mut token = self.make_token(String);
        // Both quotes are single bytes
        token.literal = Literal::String(&token.lexeme[1..token.lexeme.len() - 1]);

        Ok(token)
    }

    /// Constructs a new number literal syntax `Token`.
    fn make_number_literal(&mut self) -> Token<'a> {
        // We know we just saw an ASCII digit.
        self.take_while(is_ascii_digit);

        // A fractional part needs at least one digit after the "."
        if self.peek_is(".") && self.peek_next().map_or(false, is_ascii_digit) {
            self.take();
            self.take_while(is_ascii_digit);
        }

        let mut token = self.make_token(Number);
        let value = token
            .lexeme
            .parse::<f64>()
            .expect("a run of ASCII digits with an optional fraction is a valid f64");
        token.literal = Literal::Number(value);

        token
    }

    /// Constructs a new identifier or keyword syntax `Token`.
    fn make_identifier(&mut self) -> Token<'a> {
        self.take_while(is_identifier_continue);

        let mut token = self.make_token(Identifier);
        if let Some(reserved) = keyword(token.lexeme) {
            token.token_type = reserved;
        }

        token
    }
}

// ========================
// GRAPHEME UTILITY METHODS
// ========================

/// The byte of a grapheme made of a single ASCII character.
fn single_ascii(grapheme: &str) -> Option<u8> {
    match grapheme.as_bytes() {
        &[b] if b.is_ascii() => Some(b),
        _ => None,
    }
}

/// Checks for the whitespace Lox ignores, newlines excluded.
fn is_whitespace(grapheme: &str) -> bool {
    matches!(grapheme, " " | "\t" | "\r")
}

/// Checks if a grapheme ends a line.
///
/// A `"\r\n"` cluster has been split in two by `Scanner::new`, so
/// the `"\r"` is ordinary whitespace.
fn is_newline(grapheme: &str) -> bool {
    grapheme == "\n"
}

/// Checks for an ASCII digit.
fn is_ascii_digit(grapheme: &str) -> bool {
    single_ascii(grapheme).map_or(false, |b| b.is_ascii_digit())
}

/// Checks if a grapheme can start an identifier.
fn is_identifier_start(grapheme: &str) -> bool {
    single_ascii(grapheme).map_or(false, |b| b.is_ascii_alphabetic() || b == b'_')
}

/// Checks if a grapheme can continue an identifier.
fn is_identifier_continue(grapheme: &str) -> bool {
    single_ascii(grapheme).map_or(false, |b| b.is_ascii_alphanumeric() || b == b'_')
}

#[cfg(test)]
mod tests {
    use super::*;

    // NOTE: It's correct to assume the number of graphemes is equal
    // to the number of "characters" you see. This is not true when
    // thinking in terms of Rust's `char` type.

    fn scan_all(source: &str) -> (Vec<Token<'_>>, Vec<Diagnostic>) {
        let mut scanner = Scanner::new(source);
        let mut diags: Vec<Diagnostic> = Vec::new();
        let mut tokens = Vec::new();

        while let Some(token) = scanner.next_token(&mut diags) {
            tokens.push(token);
        }

        (tokens, diags)
    }

    fn types(source: &str) -> Vec<TokenType> {
        scan_all(source).0.iter().map(|t| t.token_type).collect()
    }

    #[test]
    fn at_end_of_empty_string() {
        let s = Scanner::new("");
        assert!(s.at_end())
    }

    #[test]
    fn not_at_end_of_nonempty_string() {
        let s = Scanner::new("Hello");
        assert!(!s.at_end())
    }

    #[test]
    fn not_at_end_partially_finished_scanner() {
        let mut s = Scanner::new("Olá");
        s.take();
        s.take();

        assert!(!s.at_end())
    }

    #[test]
    fn at_end_finished_scanner() {
        let mut s = Scanner::new("Olá");
        s.take();
        s.take();
        s.take();

        assert!(s.at_end())
    }

    // ==============================
    // TESTS FOR EXTRACTING GRAPHEMES
    // ==============================

    #[test]
    fn take_empty_string_yields_none() {
        let mut s = Scanner::new("");
        assert!(s.take().is_none());
    }

    #[test]
    fn take_nonempty_string_yields_graphemes() {
        let mut s = Scanner::new("Olá");

        assert_eq!(s.take(), Some("O"));
        assert_eq!(s.take(), Some("l"));
        assert_eq!(s.take(), Some("á"));
        assert!(s.take().is_none());
    }

    #[test]
    fn take_splits_ascii_head_off_cluster() {
        let mut s = Scanner::new("\r\n=\u{0301}x");

        assert_eq!(s.take(), Some("\r"));
        assert_eq!(s.take(), Some("\n"));
        assert_eq!(s.take(), Some("="));
        assert_eq!(s.take(), Some("\u{0301}"));
        assert_eq!(s.take(), Some("x"));
        assert!(s.take().is_none());
    }

    #[test]
    fn take_keeps_non_ascii_cluster_whole() {
        let mut s = Scanner::new("\u{00e9}\u{0301}!");

        assert_eq!(s.take(), Some("\u{00e9}\u{0301}"));
        assert_eq!(s.take(), Some("!"));
    }

    #[test]
    fn take_if_advances_scanner() {
        let mut s = Scanner::new("Olá");
        s.take();
        s.take();

        assert!(s.take_if("á"));
        assert!(s.take().is_none());
    }

    #[test]
    fn take_if_doesnt_advance_scanner() {
        let mut s = Scanner::new("Olá");
        s.take();
        s.take();

        assert!(!s.take_if("a"));
        assert_eq!(s.take(), Some("á"));
    }

    #[test]
    fn peek_next_nonempty_string_yields_grapheme() {
        let s = Scanner::new("Hello");
        assert_eq!(s.peek_next(), Some("e"));
    }

    #[test]
    fn peek_next_short_string_yields_none() {
        let s = Scanner::new("H");
        assert!(s.peek_next().is_none());
    }

    #[test]
    fn peek_next_is() {
        let s = Scanner::new("Hello");
        assert!(s.peek_next_is("e"));
        assert!(!s.peek_next_is("l"));
    }

    #[test]
    fn peek_is() {
        let s = Scanner::new("Hello");
        assert!(s.peek_is("H"));
        assert!(!s.peek_is("e"));
    }

    #[test]
    fn peek_empty_string_yields_none() {
        let s = Scanner::new("");
        assert!(s.peek().is_none());
    }

    // ============================
    // TESTS FOR EXTRACTING LEXEMES
    // ============================

    #[test]
    fn make_identifier_nonkeyword() {
        let mut s = Scanner::new("poTat0_ rest");
        // Remember to consume initial alphabetic grapheme
        s.take();

        let token = s.make_identifier();
        assert_eq!(token, Token::new(Identifier, "poTat0_", 1));
        assert!(token.literal.is_absent());
    }

    #[test]
    fn make_identifier_keyword() {
        let mut s = Scanner::new("var");
        s.take();

        assert_eq!(s.make_identifier(), Token::new(Var, "var", 1));
    }

    #[test]
    fn make_identifier_stops_at_non_ascii() {
        let mut s = Scanner::new("abcé");
        s.take();

        assert_eq!(s.make_identifier().lexeme, "abc");
        assert_eq!(s.peek(), Some("é"));
    }

    #[test]
    fn make_integer_literal() {
        let mut s = Scanner::new("123abc");
        // Consume initial digit
        s.take();

        let token = s.make_number_literal();
        assert_eq!(token.lexeme, "123");
        assert_eq!(token.literal, Literal::Number(123.0));
    }

    #[test]
    fn make_decimal_literal() {
        let mut s = Scanner::new("1.0012");
        s.take();

        let token = s.make_number_literal();
        assert_eq!(token.lexeme, "1.0012");
        assert_eq!(token.literal, Literal::Number(1.0012));
    }

    #[test]
    fn make_number_leaves_trailing_dot() {
        let mut s = Scanner::new("12.x");
        s.take();

        assert_eq!(s.make_number_literal().lexeme, "12");
        assert_eq!(s.peek(), Some("."));
    }

    #[test]
    fn make_string_literal() {
        let mut s = Scanner::new("\t\"Hello\"");
        s.skip_ignorables();

        // Don't forget to consume the starting open quote
        s.take();

        let token = s.make_string_literal().unwrap();
        assert_eq!(token.token_type, String);
        assert_eq!(token.lexeme, "\"Hello\"");
        assert_eq!(token.literal, Literal::String("Hello"));
    }

    #[test]
    fn make_string_literal_empty_literal() {
        let mut s = Scanner::new("\"\"");
        s.take();

        let token = s.make_string_literal().unwrap();
        assert_eq!(token.literal, Literal::String(""));
    }

    #[test]
    fn make_string_literal_keeps_backslashes() {
        let mut s = Scanner::new(r#""a\nb""#);
        s.take();

        let token = s.make_string_literal().unwrap();
        assert_eq!(token.literal, Literal::String(r"a\nb"));
    }

    #[test]
    fn make_string_literal_unterminated() {
        let mut s = Scanner::new("\"unterminated!");
        s.take();

        assert_eq!(s.make_string_literal(), Err(LexError::UnterminatedString));
    }

    #[test]
    fn make_token_on_empty_lexeme() {
        let s = Scanner::new("");
        assert_eq!(s.make_token(Eof), Token::eof(1));
    }

    #[test]
    fn make_token_at_end() {
        let mut s = Scanner::new("Hello");
        s.take_while(is_identifier_continue);
        assert!(s.at_end());

        assert_eq!(s.make_token(Identifier).lexeme, "Hello");
    }

    #[test]
    fn make_token_not_at_end() {
        let mut s = Scanner::new("Hello there");
        s.take_while(is_identifier_continue);
        assert!(!s.at_end());
        assert_eq!(s.peek(), Some(" "));

        assert_eq!(s.make_token(Identifier).lexeme, "Hello");
    }

    // =========================
    // TESTS FOR UTILITY METHODS
    // =========================

    #[test]
    fn ascii_digit_graphemes() {
        for grapheme in &["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"] {
            assert!(is_ascii_digit(grapheme));
        }
    }

    #[test]
    fn nonascii_digit_graphemes() {
        for grapheme in &["৬", "٣", "ƒ", "H", "①", "1\u{0301}"] {
            assert!(!is_ascii_digit(grapheme));
        }
    }

    #[test]
    fn identifier_start_graphemes() {
        for grapheme in &["a", "Z", "_"] {
            assert!(is_identifier_start(grapheme));
        }
        for grapheme in &["0", "é", "ƒ", "%", "💝"] {
            assert!(!is_identifier_start(grapheme));
        }
    }

    #[test]
    fn skip_leading_line_comment() {
        let mut s = Scanner::new(" // Comment\r Hello\nB");
        s.skip_ignorables();

        assert_eq!(s.peek(), Some("B"));
        assert_eq!(s.line, 2);
    }

    #[test]
    fn skip_inner_line_comment() {
        let mut s = Scanner::new("Hi\n// Comment \n  There ");
        s.take();
        s.take();
        s.skip_ignorables();

        assert_eq!(s.peek(), Some("T"));
        assert_eq!(s.start_line, 3);
    }

    #[test]
    fn skip_ending_line_comment() {
        let mut s = Scanner::new("Hi\n// Comment");
        s.take();
        s.take();

        s.skip_ignorables();
        assert!(s.peek().is_none());
    }

    #[test]
    fn skip_stops_at_lone_slash() {
        let mut s = Scanner::new("  / 2");
        s.skip_ignorables();

        assert_eq!(s.peek(), Some("/"));
    }

    #[test]
    fn skip_leading_whitespace() {
        let mut s = Scanner::new("\t  \r  Hello");
        s.skip_ignorables();

        assert_eq!(s.take(), Some("H"));
    }

    #[test]
    fn skip_trailing_whitespace() {
        let mut s = Scanner::new("Hi\t \r");
        s.take();
        s.take();

        s.skip_ignorables();
        assert!(s.at_end());
    }

    #[test]
    fn skip_counts_crlf_once() {
        let mut s = Scanner::new("\r\n\r\nx");
        s.skip_ignorables();

        assert_eq!(s.line, 3);
    }

    // ==========================
    // TESTS FOR WHOLE-TOKEN SCANS
    // ==========================

    #[test]
    fn eof_is_handed_out_once() {
        let mut s = Scanner::new("");
        let mut diags: Vec<Diagnostic> = Vec::new();

        assert_eq!(s.next_token(&mut diags), Some(Token::eof(1)));
        assert_eq!(s.next_token(&mut diags), None);
    }

    #[test]
    fn slash_and_comment() {
        assert_eq!(types("a / b // c / d"), vec![Identifier, Slash, Identifier, Eof]);
    }

    #[test]
    fn block_comment_markers_are_operators() {
        assert_eq!(types("/* */"), vec![Slash, Star, Star, Slash, Eof]);
    }

    #[test]
    fn number_then_dot() {
        assert_eq!(types("1.foo"), vec![Number, Dot, Identifier, Eof]);
    }

    #[test]
    fn leading_dot_number() {
        assert_eq!(types(".5"), vec![Dot, Number, Eof]);
    }

    #[test]
    fn unexpected_characters_are_skipped() {
        let (tokens, diags) = scan_all("a @ b\n#");

        let lexemes: Vec<&str> = tokens.iter().map(|t| t.lexeme).collect();
        assert_eq!(lexemes, vec!["a", "b", ""]);
        assert_eq!(
            diags,
            vec![
                Diagnostic::new(1, LexError::UnexpectedCharacter("@".to_string())),
                Diagnostic::new(2, LexError::UnexpectedCharacter("#".to_string())),
            ]
        );
    }

    #[test]
    fn combining_mark_after_letter_is_unexpected() {
        let (tokens, diags) = scan_all("e\u{0301}");

        assert_eq!(tokens, vec![Token::new(Identifier, "e", 1), Token::eof(1)]);
        assert_eq!(
            diags,
            vec![Diagnostic::new(1, LexError::UnexpectedCharacter("\u{0301}".to_string()))]
        );
    }

    #[test]
    fn non_ascii_cluster_is_reported_once() {
        let (tokens, diags) = scan_all("\u{00e9}\u{0301}");

        assert_eq!(tokens, vec![Token::eof(1)]);
        assert_eq!(
            diags,
            vec![Diagnostic::new(
                1,
                LexError::UnexpectedCharacter("\u{00e9}\u{0301}".to_string())
            )]
        );
    }

    #[test]
    fn combining_mark_doesnt_hide_closing_quote() {
        let (tokens, diags) = scan_all("print \"hi\"\u{0301}; var x = 1;");

        assert_eq!(
            tokens.iter().map(|t| t.token_type).collect::<Vec<_>>(),
            vec![Print, String, Semicolon, Var, Identifier, Equal, Number, Semicolon, Eof]
        );
        assert_eq!(tokens[1].literal, Literal::String("hi"));
        assert_eq!(
            diags,
            vec![Diagnostic::new(1, LexError::UnexpectedCharacter("\u{0301}".to_string()))]
        );
    }

    #[test]
    fn combining_mark_doesnt_hide_operator() {
        let (tokens, diags) = scan_all("a =\u{0301} b");

        assert_eq!(
            tokens,
            vec![
                Token::new(Identifier, "a", 1),
                Token::new(Equal, "=", 1),
                Token::new(Identifier, "b", 1),
                Token::eof(1),
            ]
        );
        assert_eq!(
            diags,
            vec![Diagnostic::new(1, LexError::UnexpectedCharacter("\u{0301}".to_string()))]
        );
    }

    #[test]
    fn combining_mark_inside_string_is_kept() {
        let (tokens, diags) = scan_all("\"e\u{0301}\"");

        assert!(diags.is_empty());
        assert_eq!(tokens[0].literal, Literal::String("e\u{0301}"));
    }

    #[test]
    fn multiline_string_lines() {
        let (tokens, diags) = scan_all("\n\n\"a\nb\" c");
        assert!(diags.is_empty());

        assert_eq!(tokens[0].token_type, String);
        assert_eq!(tokens[0].literal, Literal::String("a\nb"));
        assert_eq!(tokens[0].line, 3);
        assert_eq!(tokens[1].lexeme, "c");
        assert_eq!(tokens[1].line, 4);
        assert_eq!(tokens[2], Token::eof(4));
        assert_eq!(tokens[2].line, 4);
    }

    #[test]
    fn unterminated_string_reported_where_scan_ends() {
        let (tokens, diags) = scan_all("x \"open\nstill open");

        assert_eq!(tokens, vec![Token::new(Identifier, "x", 1), Token::eof(2)]);
        assert_eq!(diags, vec![Diagnostic::new(2, LexError::UnterminatedString)]);
    }
}
