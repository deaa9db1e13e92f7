//! Stream scan errors.

use thiserror::Error;

/// A structural scan failed, e.g. a balanced region hit end of input.
///
/// `context` holds the rendered source line with a caret under the
/// offending token (see [`TokenStream::error_context`](crate::TokenStream::error_context)).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub context: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>, line: usize, context: impl Into<String>) -> Self {
        ParseError {
            message: message.into(),
            line,
            context: context.into(),
        }
    }
}
