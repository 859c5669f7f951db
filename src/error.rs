use std::fmt;

use thiserror::Error;

/// A position in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// 0-based absolute byte offset from the start of input
    pub offset: usize,
    /// 1-based line number
    pub line: usize,
    /// 1-based column (character offset within the line, plus one)
    pub column: usize,
}

impl Position {
    pub fn start() -> Self {
        Position {
            offset: 0,
            line: 1,
            column: 1,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::start()
    }
}

/// What went wrong. Every kind is fatal.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErrorKind {
    #[error("Expected number")]
    ExpectedNumber,
    #[error("Invalid number: {0}")]
    InvalidNumber(String),
    #[error("Unclosed string")]
    UnclosedString,
    #[error("Expected name")]
    ExpectedName,
    #[error("Expected array")]
    ExpectedArray,
    #[error("Expected ',' or ')' in array")]
    ExpectedCommaOrCloseParen,
    #[error("Expected constant expression")]
    ExpectedConstantExpression,
    #[error("Expected '[' after '$'")]
    ExpectedOpenBracket,
    #[error("Expected ']' to close constant expression")]
    UnclosedExpression,
    #[error("'{operation}' requires {expected} argument{}", plural(.expected))]
    ArityMismatch {
        operation: String,
        expected: usize,
        found: usize,
    },
    #[error("Division by zero")]
    DivisionByZero,
    #[error("'{operation}' cannot be applied to {found}")]
    UnsupportedType {
        operation: String,
        found: &'static str,
    },
    #[error("Integer overflow in '{0}'")]
    IntegerOverflow(String),
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),
    #[error("Undefined constant: {0}")]
    UndefinedConstant(String),
    #[error("Unexpected character: {}", describe_char(.0))]
    UnexpectedCharacter(Option<char>),
    #[error("Expected '='")]
    MissingEquals,
    #[error("Expected ';'")]
    MissingSemicolon,
    #[error("Unterminated comment")]
    UnterminatedComment,
    #[error("Nesting depth exceeds the limit of {0}")]
    NestingTooDeep(usize),
}

fn describe_char(ch: &Option<char>) -> String {
    match ch {
        Some(ch) => ch.to_string(),
        None => "end of input".to_string(),
    }
}

fn plural(count: &usize) -> &'static str {
    if *count == 1 {
        ""
    } else {
        "s"
    }
}

impl ErrorKind {
    /// Stable identifier for the kind, independent of the message text.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::ExpectedNumber => "expected-number",
            ErrorKind::InvalidNumber(_) => "invalid-number",
            ErrorKind::UnclosedString => "unclosed-string",
            ErrorKind::ExpectedName => "expected-name",
            ErrorKind::ExpectedArray => "expected-array",
            ErrorKind::ExpectedCommaOrCloseParen => "expected-comma-or-close-paren",
            ErrorKind::ExpectedConstantExpression => "expected-constant-expression",
            ErrorKind::ExpectedOpenBracket => "expected-open-bracket",
            ErrorKind::UnclosedExpression => "unclosed-expression",
            ErrorKind::ArityMismatch { .. } => "arity-mismatch",
            ErrorKind::DivisionByZero => "division-by-zero",
            ErrorKind::UnsupportedType { .. } => "unsupported-type",
            ErrorKind::IntegerOverflow(_) => "integer-overflow",
            ErrorKind::UnknownOperation(_) => "unknown-operation",
            ErrorKind::UndefinedConstant(_) => "undefined-constant",
            ErrorKind::UnexpectedCharacter(_) => "unexpected-character",
            ErrorKind::MissingEquals => "missing-equals",
            ErrorKind::MissingSemicolon => "missing-semicolon",
            ErrorKind::UnterminatedComment => "unterminated-comment",
            ErrorKind::NestingTooDeep(_) => "nesting-too-deep",
        }
    }
}

/// A parse failure tied to the point in the source where it was detected.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxError {
    pub kind: ErrorKind,
    pub position: Position,
}

impl SyntaxError {
    pub fn new(kind: ErrorKind, position: Position) -> Self {
        SyntaxError { kind, position }
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Line {}, position {}: {}",
            self.position.line, self.position.column, self.kind
        )
    }
}

impl std::error::Error for SyntaxError {}

pub type Result<T> = std::result::Result<T, SyntaxError>;
