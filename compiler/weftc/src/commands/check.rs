//! The `check` command: expand a file and verify the result parses.

use std::fmt;
use std::path::Path;

use weft_eval::{Namespace, PrintTarget};
use weft_expand::{ExpandOptions, MacroProcessor};
use weft_ir::untokenize;
use weft_parse::parse_module_text;
use weft_stream::TokenStream;

use super::{read_file, CliError};

/// What a successful check found.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckReport {
    /// Names bound by macro definitions and constants, sorted.
    pub macros: Vec<String>,
    /// Top-level statements in the expanded program.
    pub statements: usize,
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ok: {} statement(s), {} macro(s)",
            self.statements,
            self.macros.len()
        )?;
        if !self.macros.is_empty() {
            write!(f, " ({})", self.macros.join(", "))?;
        }
        Ok(())
    }
}

/// Expand `path` without printing the result, then parse the expanded text. Macro `print`
/// output is discarded.
pub fn check_file(path: &Path) -> Result<CheckReport, CliError> {
    let source = read_file(path)?;
    let tokens = weft_lexer::tokenize_with_endmarker(&source).map_err(|error| CliError::Lex {
        path: path.to_owned(),
        error,
    })?;

    let options = ExpandOptions::new().print_target(PrintTarget::Silent);
    let mut processor = MacroProcessor::new(TokenStream::new(tokens), &options);
    let expanded = processor
        .transform()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|error| CliError::Expand {
            path: path.to_owned(),
            error,
        })?;
    let module = parse_module_text(&untokenize(&expanded)).map_err(|error| CliError::Output {
        path: path.to_owned(),
        error,
    })?;

    Ok(CheckReport {
        macros: processor.interpreter().names(Namespace::Locals),
        statements: module.body.len(),
    })
}
