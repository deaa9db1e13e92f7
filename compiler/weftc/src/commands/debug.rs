//! The `lex` command: show the token stream the expander works on.

use std::fmt::Write as _;
use std::path::Path;

use weft_ir::quoted;

use super::{read_file, CliError};

/// List the tokens of a file, one per line.
pub fn lex_file(path: &Path) -> Result<String, CliError> {
    let source = read_file(path)?;
    let tokens = weft_lexer::tokenize_with_endmarker(&source).map_err(|error| CliError::Lex {
        path: path.to_owned(),
        error,
    })?;

    let mut out = format!("Tokens for '{}' ({} tokens):\n", path.display(), tokens.len());
    for token in &tokens {
        let _ = writeln!(out, "  {:<10} {}", token.kind.name(), quoted(&token.text));
    }
    Ok(out)
}
