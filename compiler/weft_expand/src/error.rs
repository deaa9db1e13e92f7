//! Expansion errors.

use thiserror::Error;
use weft_eval::{CodeError, ScriptError};
use weft_lexer::LexError;
use weft_parse::SyntaxError;
use weft_stream::ParseError;

/// Why a source unit could not be expanded.
///
/// Every variant is fatal for the unit: there is no partial output.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ExpandError {
    /// The source, or text produced by a macro, does not tokenize.
    #[error("lex error: {0}")]
    Lex(#[from] LexError),
    /// A macro construct is malformed. Carries the caret context.
    #[error("{0}\n{}", .0.context)]
    Parse(#[from] ParseError),
    /// Macro code is not valid host syntax.
    #[error("syntax error in macro code: {0}")]
    Syntax(#[from] SyntaxError),
    /// Macro code raised. The traceback is kept intact.
    #[error(transparent)]
    Execution(#[from] ScriptError),
    /// A macro returned something that cannot stand in for code.
    #[error("invalid macro result: {0}")]
    Code(#[from] CodeError),
}
