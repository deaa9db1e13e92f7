//! Terminal rendering of expansion errors.

use std::fmt::Write as _;
use std::path::Path;
use std::str::FromStr;

use weft_expand::ExpandError;

/// ANSI color codes for terminal output.
mod colors {
    pub const ERROR: &str = "\x1b[1;31m"; // Bold red
    pub const NOTE: &str = "\x1b[1;36m"; // Bold cyan
    pub const BOLD: &str = "\x1b[1m";
    pub const BLUE: &str = "\x1b[1;34m"; // Bold blue
    pub const RESET: &str = "\x1b[0m";
}

/// Color mode for diagnostic output.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Color when stderr is a terminal.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn should_use_colors(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

impl FromStr for ColorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(ColorMode::Auto),
            "always" => Ok(ColorMode::Always),
            "never" => Ok(ColorMode::Never),
            other => Err(format!(
                "unknown color mode '{other}' (expected auto, always or never)"
            )),
        }
    }
}

struct Palette {
    error: &'static str,
    note: &'static str,
    bold: &'static str,
    blue: &'static str,
    reset: &'static str,
}

impl Palette {
    fn new(colored: bool) -> Self {
        if colored {
            Palette {
                error: colors::ERROR,
                note: colors::NOTE,
                bold: colors::BOLD,
                blue: colors::BLUE,
                reset: colors::RESET,
            }
        } else {
            Palette {
                error: "",
                note: "",
                bold: "",
                blue: "",
                reset: "",
            }
        }
    }
}

/// Render an expansion failure of `path`:
///
/// ```text
/// error: expected `def` or `class` after decorated `macro`
///   --> demo.wf:2
///    |
///    | macro x = 1
///    |       ^
/// ```
pub fn render_error(path: &Path, error: &ExpandError, colored: bool) -> String {
    let p = Palette::new(colored);
    let mut out = String::new();
    let (headline, line, detail) = match error {
        ExpandError::Parse(err) => (err.message.clone(), Some(err.line), err.context.clone()),
        ExpandError::Execution(err) => (
            "macro code raised an exception".to_owned(),
            None,
            err.render(),
        ),
        other => (other.to_string(), None, String::new()),
    };

    let _ = writeln!(out, "{}error{}: {}{headline}{}", p.error, p.reset, p.bold, p.reset);
    match line {
        Some(line) => {
            let _ = writeln!(out, "  {}-->{} {}:{line}", p.blue, p.reset, path.display());
        }
        None => {
            let _ = writeln!(out, "  {}-->{} {}", p.blue, p.reset, path.display());
        }
    }
    if !detail.is_empty() {
        let _ = writeln!(out, "   {}|{}", p.blue, p.reset);
        for text in detail.lines() {
            let _ = writeln!(out, "   {}|{} {text}", p.blue, p.reset);
        }
    }
    if matches!(error, ExpandError::Execution(_)) {
        let _ = writeln!(
            out,
            "   {}= note{}: the traceback above is from macro code, not the expanded program",
            p.note, p.reset
        );
    }
    out
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
