use crate::frontend::token::Span;

/// A parsing error with source location.
///
/// `line` and `col` are 1-based positions coming from the lexer spans. The
/// parser stops at the first error, so there is never more than one.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{line}:{col}: {message}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub col: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        ParseError {
            message: message.into(),
            line: span.line,
            col: span.col,
        }
    }
}
