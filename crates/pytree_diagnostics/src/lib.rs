//! pytree_diagnostics: Error types and message templates for the front end.
//!
//! The front end is fail-fast: the first lexical or grammatical problem
//! becomes a [`ParseError`] that propagates out of the `parse`/`tokenize`
//! entry points. Errors are never caught inside the core; a caller that
//! wants recovery layers it on top.

use pytree_core::{LineCol, TextPos};
use std::fmt;

pub mod messages;

/// Which stage rejected the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A malformed token: unterminated string/regex, invalid numeric
    /// literal, bad escape, illegal character.
    Lex,
    /// A well-formed token stream that does not match the grammar.
    Syntax,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Lex => write!(f, "LexError"),
            ErrorKind::Syntax => write!(f, "SyntaxError"),
        }
    }
}

/// A message template with a stable code.
#[derive(Debug, Clone, Copy)]
pub struct MessageTemplate {
    /// The error code (stable across releases, used in tests and tooling).
    pub code: u32,
    /// Which stage this message belongs to.
    pub kind: ErrorKind,
    /// The message text. May contain `{0}`, `{1}`, ... placeholders.
    pub message: &'static str,
}

/// Format a message template by replacing `{0}`, `{1}`, etc. with arguments.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

/// A positioned parse error.
///
/// `pos` is always a byte offset into the source text; `loc` is filled
/// in when the caller enabled location tracking.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message} ({pos})")]
pub struct ParseError {
    pub kind: ErrorKind,
    pub code: u32,
    pub message: String,
    /// Byte offset of the offending token or character.
    pub pos: TextPos,
    /// 1-based line / 0-based column, when location tracking is enabled.
    pub loc: Option<LineCol>,
}

impl ParseError {
    /// Realize a message template at a byte offset.
    pub fn new(template: &MessageTemplate, args: &[&str], pos: TextPos) -> Self {
        Self {
            kind: template.kind,
            code: template.code,
            message: format_message(template.message, args),
            pos,
            loc: None,
        }
    }

    /// Attach a line/column location.
    pub fn with_loc(mut self, loc: LineCol) -> Self {
        self.loc = Some(loc);
        self
    }

    /// Whether this error came out of the tokenizer.
    pub fn is_lex_error(&self) -> bool {
        self.kind == ErrorKind::Lex
    }
}

/// Convenience alias used throughout the scanner and parser.
pub type Result<T> = std::result::Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message() {
        assert_eq!(format_message("'{0}' expected", &["("]), "'(' expected");
        assert_eq!(
            format_message("{0} then {1}", &["a", "b"]),
            "a then b"
        );
    }

    #[test]
    fn test_error_display() {
        let err = ParseError::new(&messages::UNEXPECTED_TOKEN, &["def"], 12);
        assert_eq!(err.to_string(), "SyntaxError: unexpected token 'def' (12)");
        assert!(!err.is_lex_error());
    }

    #[test]
    fn test_lex_error_kind() {
        let err = ParseError::new(&messages::UNTERMINATED_STRING, &[], 0);
        assert!(err.is_lex_error());
        assert_eq!(err.code, messages::UNTERMINATED_STRING.code);
    }
}
