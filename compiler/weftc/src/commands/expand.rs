//! The `expand` command.

use std::path::PathBuf;

use weft_eval::PrintTarget;
use weft_expand::ExpandOptions;

use super::{read_file, CliError};
use crate::ColorMode;

/// Parsed `weft expand` arguments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpandArgs {
    pub input: PathBuf,
    /// Write here instead of stdout.
    pub output: Option<PathBuf>,
    pub color: ColorMode,
    /// Where macro `print` output goes.
    pub macro_output: PrintTarget,
}

/// Parse the arguments following `weft expand`.
pub fn parse_expand_args(args: &[String]) -> Result<ExpandArgs, CliError> {
    let mut parsed = ExpandArgs::default();
    let mut input = None;
    let mut args = args.iter();
    while let Some(arg) = args.next() {
        if arg == "-o" {
            let Some(path) = args.next() else {
                return Err(CliError::Usage("-o needs a path".to_owned()));
            };
            parsed.output = Some(PathBuf::from(path));
        } else if let Some(mode) = arg.strip_prefix("--color=") {
            parsed.color = mode.parse().map_err(CliError::Usage)?;
        } else if let Some(target) = arg.strip_prefix("--macro-output=") {
            parsed.macro_output = target.parse().map_err(CliError::Usage)?;
        } else if arg.starts_with('-') {
            return Err(CliError::Usage(format!("unknown option '{arg}'")));
        } else if input.is_none() {
            input = Some(PathBuf::from(arg));
        } else {
            return Err(CliError::Usage(format!("unexpected argument '{arg}'")));
        }
    }
    let Some(input) = input else {
        return Err(CliError::Usage("missing input file".to_owned()));
    };
    parsed.input = input;
    Ok(parsed)
}

/// Expand the input file and return the result, also writing it to the
/// output file when one was given.
pub fn expand_file(args: &ExpandArgs) -> Result<String, CliError> {
    let source = read_file(&args.input)?;
    let options = ExpandOptions::new().print_target(args.macro_output);
    let expanded =
        weft_expand::expand_with(&source, &options).map_err(|error| CliError::Expand {
            path: args.input.clone(),
            error,
        })?;
    tracing::debug!(
        input = %args.input.display(),
        bytes = expanded.len(),
        "expanded file"
    );
    if let Some(output) = &args.output {
        std::fs::write(output, &expanded).map_err(|source| CliError::Write {
            path: output.clone(),
            source,
        })?;
    }
    Ok(expanded)
}
