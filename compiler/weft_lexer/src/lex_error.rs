//! Lexer errors.

use thiserror::Error;

/// What went wrong while lexing.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LexErrorKind {
    /// A string literal is not closed before the end of its line (or of
    /// the input, for triple-quoted strings).
    UnterminatedString,
    /// A character that starts no token.
    UnknownCharacter(char),
    /// A dedent to a width that matches no enclosing block.
    InconsistentDedent,
    /// A closing bracket without a matching opener.
    UnbalancedBracket(char),
    /// Input ended inside brackets.
    UnclosedBracket,
}

/// A lexer error with a 1-based line and column.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Error)]
#[error("line {line}, column {column}: {}", describe(.kind))]
pub struct LexError {
    pub kind: LexErrorKind,
    pub line: usize,
    pub column: usize,
}

impl LexError {
    pub fn new(kind: LexErrorKind, line: usize, column: usize) -> Self {
        LexError { kind, line, column }
    }

    /// The description without the position prefix.
    pub fn message(&self) -> String {
        describe(&self.kind)
    }
}

fn describe(kind: &LexErrorKind) -> String {
    match kind {
        LexErrorKind::UnterminatedString => "unterminated string literal".to_owned(),
        LexErrorKind::UnknownCharacter(c) => format!("unexpected character {c:?}"),
        LexErrorKind::InconsistentDedent => {
            "unindent does not match any outer indentation level".to_owned()
        }
        LexErrorKind::UnbalancedBracket(c) => format!("unmatched '{c}'"),
        LexErrorKind::UnclosedBracket => "unexpected end of input inside brackets".to_owned(),
    }
}
