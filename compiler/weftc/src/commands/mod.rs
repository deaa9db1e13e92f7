//! Command handlers for the `weft` CLI.
//!
//! Each submodule implements one command. Handlers return their result
//! instead of printing or exiting, so `main` decides how to report and the
//! tests can drive them directly.

mod check;
mod debug;
mod expand;

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use weft_expand::ExpandError;
use weft_lexer::LexError;
use weft_parse::SyntaxError;

pub use check::{check_file, CheckReport};
pub use debug::lex_file;
pub use expand::{expand_file, parse_expand_args, ExpandArgs};

/// Why a command failed.
#[derive(Debug, Error)]
pub enum CliError {
    /// Bad command line.
    #[error("{0}")]
    Usage(String),
    #[error("cannot read '{}': {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("cannot write '{}': {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("{}: {error}", .path.display())]
    Lex { path: PathBuf, error: LexError },
    #[error("{}: {error}", .path.display())]
    Expand { path: PathBuf, error: ExpandError },
    /// Expansion succeeded but produced text that is not valid syntax.
    #[error("{}: expanded output does not parse: {error}", .path.display())]
    Output { path: PathBuf, error: SyntaxError },
}

impl CliError {
    /// Process exit status: 2 for usage errors, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => 2,
            _ => 1,
        }
    }
}

fn read_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_owned(),
        source,
    })
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
