//! Lexer for weft source text.
//!
//! Two layers, like a classic scanner/cooker split:
//!
//! - `raw_token`: a logos-derived scanner producing `(RawToken, span)`
//!   pairs with no notion of lines or blocks.
//! - `cooker`: turns those into [`Token`]s, adding `Newline`/`Nl`, the
//!   `Indent`/`Dedent` block markers and each token's whitespace `offset`.
//!
//! The output follows the layout contract of the expansion engine: blocks
//! are delimited by explicit `Indent`/`Dedent` tokens, and rendering the
//! tokens with [`weft_ir::untokenize`] reproduces text that lexes to the
//! same `(kind, text)` sequence.

mod cooker;
mod lex_error;
mod raw_token;

pub use lex_error::{LexError, LexErrorKind};

use weft_ir::Token;

/// Tokenize `source`, dropping the trailing `EndMarker`.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut tokens = tokenize_with_endmarker(source)?;
    tokens.pop();
    Ok(tokens)
}

/// Tokenize `source`. The last token is always `EndMarker`.
pub fn tokenize_with_endmarker(source: &str) -> Result<Vec<Token>, LexError> {
    cooker::Cooker::new(source).run()
}
