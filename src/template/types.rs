//! Template types and error definitions

use thiserror::Error;

/// Error raised while applying a positional format string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("Unexpected '}}' at position {0}")]
    UnexpectedClosingBrace(usize),

    #[error("Format item starting at position {0} is never closed")]
    UnclosedItem(usize),

    #[error("Missing or invalid argument index at position {0}")]
    InvalidIndex(usize),

    #[error("Index {index} is out of range ({count} argument(s) supplied)")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("Invalid alignment at position {0}")]
    InvalidAlignment(usize),

    #[error("Unexpected '{{' in format specifier at position {0}")]
    BraceInSpecifier(usize),

    #[error("Unexpected character '{ch}' at position {position}")]
    UnexpectedCharacter { ch: char, position: usize },

    #[error("Format specifier '{0}' is invalid for this value")]
    InvalidSpecifier(String),
}

/// Result type for format operations
pub type FormatResult<T> = Result<T, FormatError>;

/// A placeholder token found in a template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// The full matched text, brackets included
    pub text: &'a str,

    /// Placeholder key as written
    pub key: &'a str,

    /// Format string following the first `:` (optional)
    pub format: Option<&'a str>,

    /// Byte offset of the opening `[`
    pub start: usize,

    /// Byte offset just past the closing `]`
    pub end: usize,
}
