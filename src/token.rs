use std::fmt;
use std::hash::{Hash, Hasher};

#[derive(Copy, Clone, Debug)]
/// Represents a piece of Lox syntax created from Lox source code.
///
/// Two tokens are equal when their type, lexeme and literal match;
/// the line a token was found on doesn't take part in comparisons.
pub struct Token<'a> {
    /// What kind of `Token` this is
    pub token_type: TokenType,
    /// The piece of the source code this `Token` comes from
    ///
    /// (Empty for the synthetic `Eof` token)
    pub lexeme: &'a str,
    /// The decoded value of a `Number` or `String` token
    pub literal: Literal<'a>,
    /// The 1-based line the lexeme starts on
    pub line: usize,
}

impl<'a> Token<'a> {
    /// Creates a `Token` that carries no literal value.
    pub fn new(token_type: TokenType, lexeme: &'a str, line: usize) -> Token<'a> {
        Token {
            token_type,
            lexeme,
            literal: Literal::Absent,
            line,
        }
    }

    /// Creates the end-of-input marker found on `line`.
    pub fn eof(line: usize) -> Token<'a> {
        Token::new(TokenType::Eof, "", line)
    }
}

impl PartialEq for Token<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.token_type == other.token_type
            && self.lexeme == other.lexeme
            && self.literal == other.literal
    }
}

impl Eq for Token<'_> {}

impl Hash for Token<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.token_type.hash(state);
        self.lexeme.hash(state);
        self.literal.hash(state);
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.token_type, self.lexeme, self.literal)
    }
}

/// The decoded value attached to a literal token.
#[derive(Copy, Clone, Debug)]
pub enum Literal<'a> {
    /// Every token that isn't a `Number` or a `String`
    Absent,
    /// Value of a `Number` token
    Number(f64),
    /// Contents of a `String` token, without the surrounding quotes
    String(&'a str),
}

impl Literal<'_> {
    /// Checks if this is the `Absent` variant.
    pub fn is_absent(&self) -> bool {
        matches!(self, Literal::Absent)
    }
}

// Numbers are compared and hashed by bit pattern. The scanner only
// ever produces finite, non-negative values, so this agrees with `==`
// on everything it can emit while keeping `Eq` and `Hash` total.
impl PartialEq for Literal<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Literal::Absent, Literal::Absent) => true,
            (Literal::Number(a), Literal::Number(b)) => a.to_bits() == b.to_bits(),
            (Literal::String(a), Literal::String(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Literal<'_> {}

impl Hash for Literal<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Literal::Absent => {}
            Literal::Number(n) => n.to_bits().hash(state),
            Literal::String(s) => s.hash(state),
        }
    }
}

impl fmt::Display for Literal<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Absent => f.write_str("null"),
            Literal::Number(n) => write_number(f, *n),
            Literal::String(s) => f.write_str(s),
        }
    }
}

/// Writes a number the way the reference Lox implementation lists
/// it: plain decimals with a fractional part between 10^-3 and 10^7,
/// `<mantissa>E<exponent>` outside that range.
fn write_number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    if n.is_nan() {
        return f.write_str("NaN");
    }
    if n.is_infinite() {
        return f.write_str(if n > 0.0 { "Infinity" } else { "-Infinity" });
    }

    let magnitude = n.abs();
    if magnitude == 0.0 || (1e-3..1e7).contains(&magnitude) {
        // `Debug` keeps the fractional part of whole numbers ("1.0")
        return write!(f, "{:?}", n);
    }

    // `LowerExp` gives the shortest round-tripping digits, e.g. "1e21"
    let exp = format!("{:e}", n);
    let (mantissa, exponent) = exp.split_once('e').unwrap_or((exp.as_str(), "0"));
    if mantissa.contains('.') {
        write!(f, "{}E{}", mantissa, exponent)
    } else {
        write!(f, "{}.0E{}", mantissa, exponent)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
/// Describes what kind of syntax token a lexeme represents.
pub enum TokenType {
    // Only 1-character tokens
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Dot,
    Minus,
    Plus,
    Semicolon,
    Slash,
    Star,

    // 1 or maybe 2-character tokens
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,

    // Literals
    Identifier,
    String,
    Number,

    // Keywords
    And,
    Class,
    Else,
    False,
    Fun,
    For,
    If,
    Nil,
    Or,
    Print,
    Return,
    Super,
    This,
    True,
    Var,
    While,

    // Always the last token of a scan
    Eof,
}

impl TokenType {
    /// Checks if this is one of the reserved words.
    pub fn is_keyword(self) -> bool {
        use TokenType::*;

        matches!(
            self,
            And | Class
                | Else
                | False
                | Fun
                | For
                | If
                | Nil
                | Or
                | Print
                | Return
                | Super
                | This
                | True
                | Var
                | While
        )
    }

    /// Checks if tokens of this type carry a `Literal` value.
    pub fn has_literal(self) -> bool {
        matches!(self, TokenType::Number | TokenType::String)
    }

    /// The name used when printing tokens, e.g. `BANG_EQUAL`.
    pub fn name(self) -> &'static str {
        use TokenType::*;

        match self {
            LeftParen => "LEFT_PAREN",
            RightParen => "RIGHT_PAREN",
            LeftBrace => "LEFT_BRACE",
            RightBrace => "RIGHT_BRACE",
            Comma => "COMMA",
            Dot => "DOT",
            Minus => "MINUS",
            Plus => "PLUS",
            Semicolon => "SEMICOLON",
            Slash => "SLASH",
            Star => "STAR",
            Bang => "BANG",
            BangEqual => "BANG_EQUAL",
            Equal => "EQUAL",
            EqualEqual => "EQUAL_EQUAL",
            Greater => "GREATER",
            GreaterEqual => "GREATER_EQUAL",
            Less => "LESS",
            LessEqual => "LESS_EQUAL",
            Identifier => "IDENTIFIER",
            String => "STRING",
            Number => "NUMBER",
            And => "AND",
            Class => "CLASS",
            Else => "ELSE",
            False => "FALSE",
            Fun => "FUN",
            For => "FOR",
            If => "IF",
            Nil => "NIL",
            Or => "OR",
            Print => "PRINT",
            Return => "RETURN",
            Super => "SUPER",
            This => "THIS",
            True => "TRUE",
            Var => "VAR",
            While => "WHILE",
            Eof => "EOF",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Looks up the reserved word spelled `text`.
///
/// Returns `None` for anything that should scan as a plain
/// `Identifier`.
pub fn keyword(text: &str) -> Option<TokenType> {
    use TokenType::*;

    let token_type = match text {
        "and" => And,
        "class" => Class,
        "else" => Else,
        "false" => False,
        "for" => For,
        "fun" => Fun,
        "if" => If,
        "nil" => Nil,
        "or" => Or,
        "print" => Print,
        "return" => Return,
        "super" => Super,
        "this" => This,
        "true" => True,
        "var" => Var,
        "while" => While,
        _ => return None,
    };

    Some(token_type)
}
