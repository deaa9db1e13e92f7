//! Macro expansion for weft source.
//!
//! Source text is tokenized, rewritten by a [`MacroProcessor`], and rendered
//! back to text with the original layout wherever tokens were passed through.
//!
//! # Macro forms
//!
//! ```text
//! macro from token import NAME        import into the macro environment
//! macro LIMIT = 16                     constant, substituted at every use
//! macro def twice(x): ...              function-like macro, `twice(21)`
//! @twice_body                          decorator macro, rewrites the block
//! def f(): ...
//! ```
//!
//! Macro code runs in an embedded interpreter; each source unit gets a
//! fresh environment.

mod error;
mod materialize;
mod options;
mod processor;

use weft_ir::untokenize;
use weft_stream::TokenStream;

pub use error::ExpandError;
pub use materialize::materialize;
pub use options::ExpandOptions;
pub use processor::{MacroProcessor, Transform};

/// Expand `source` with default options.
pub fn expand(source: &str) -> Result<String, ExpandError> {
    expand_with(source, &ExpandOptions::default())
}

/// Expand `source`. All or nothing: on error no output is produced.
#[tracing::instrument(level = "debug", skip_all, fields(bytes = source.len()))]
pub fn expand_with(source: &str, options: &ExpandOptions) -> Result<String, ExpandError> {
    let tokens = weft_lexer::tokenize_with_endmarker(source)?;
    let stream = TokenStream::with_capacity(tokens, options.lookahead_capacity());
    let mut processor = MacroProcessor::new(stream, options);
    let expanded = processor.transform().collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(tokens = expanded.len(), "expanded");
    Ok(untokenize(&expanded))
}
