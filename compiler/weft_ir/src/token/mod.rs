//! Tokens for the weft macro engine.
//!
//! A [`Token`] is an immutable `(kind, text, offset)` triple. `offset` counts
//! the whitespace characters that preceded the token on its physical line
//! and is only consulted when tokens are rendered back into text.

mod kind;
mod query;
mod render;

pub use kind::TokenKind;
pub use query::{Any, KindMatcher, TextMatcher, TokenQuery};
pub use render::{untokenize, Renderer};

use std::fmt;
use std::hash::{Hash, Hasher};

/// A lexical token.
///
/// Equality and hashing consider `kind` and `text` only.
#[derive(Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub offset: Option<usize>,
}

impl Token {
    /// Create a token without layout information.
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Token {
            kind,
            text: text.into(),
            offset: None,
        }
    }

    /// Create a token preceded by `offset` spaces.
    pub fn with_offset(kind: TokenKind, text: impl Into<String>, offset: usize) -> Self {
        Token {
            kind,
            text: text.into(),
            offset: Some(offset),
        }
    }

    pub fn op(text: impl Into<String>) -> Self {
        Token::new(TokenKind::Op, text)
    }

    pub fn name(text: impl Into<String>) -> Self {
        Token::new(TokenKind::Name, text)
    }

    /// A logical line break.
    pub fn newline() -> Self {
        Token::new(TokenKind::Newline, "\n")
    }

    pub fn end_marker() -> Self {
        Token::new(TokenKind::EndMarker, "")
    }

    /// `false` only for the end marker, so scans can loop `while token.is_present()`.
    #[inline]
    pub fn is_present(&self) -> bool {
        self.kind != TokenKind::EndMarker
    }

    #[inline]
    pub fn is(&self, kind: TokenKind, text: &str) -> bool {
        self.kind == kind && self.text == text
    }

    #[inline]
    pub fn is_op(&self, text: &str) -> bool {
        self.is(TokenKind::Op, text)
    }

    #[inline]
    pub fn is_name(&self, text: &str) -> bool {
        self.is(TokenKind::Name, text)
    }

    #[inline]
    pub fn matches(&self, query: &TokenQuery) -> bool {
        query.matches(self)
    }

    /// Render this token as source text following `last`.
    ///
    /// The recorded offset is reproduced verbatim. Without one (or with a
    /// zero offset) a single space is inserted when the two tokens would
    /// otherwise fuse on re-lexing.
    pub fn render(&self, last: Option<&Token>) -> String {
        let mut out = String::new();
        self.render_into(&mut out, last);
        out
    }

    pub(crate) fn render_into(&self, out: &mut String, last: Option<&Token>) {
        let offset = self.offset.unwrap_or(0);
        if offset == 0 {
            if must_insert_space(last, self) {
                out.push(' ');
            }
        } else {
            out.extend(std::iter::repeat(' ').take(offset));
        }
        out.push_str(&self.text);
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.text == other.text
    }
}

impl Eq for Token {}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.text.hash(state);
    }
}

impl PartialEq<(TokenKind, &str)> for Token {
    fn eq(&self, (kind, text): &(TokenKind, &str)) -> bool {
        self.is(*kind, text)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.kind, quoted(&self.text))
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Operators that never combine with a neighbour into a longer operator.
const DELIMITERS: [&str; 9] = ["(", ")", "[", "]", "{", "}", ",", ";", "~"];

/// Whether a space must separate `previous` from `current`.
///
/// Without it the pair would lex as a single token: two strings, a name
/// followed by a word-like token, two operators that could fuse (`>` `=`),
/// two numbers, a number next to `.`, or a number followed by a name
/// (`1` `e5`).
pub fn must_insert_space(previous: Option<&Token>, current: &Token) -> bool {
    let Some(previous) = previous else {
        return false;
    };
    match (previous.kind, current.kind) {
        (TokenKind::String, TokenKind::String)
        | (TokenKind::Name, TokenKind::Name | TokenKind::Number | TokenKind::String)
        | (TokenKind::Number, TokenKind::Number | TokenKind::Name) => true,
        (TokenKind::Op, TokenKind::Op) => {
            !DELIMITERS.contains(&previous.text.as_str())
                && !DELIMITERS.contains(&current.text.as_str())
        }
        (TokenKind::Number, TokenKind::Op) => current.text == ".",
        (TokenKind::Op, TokenKind::Number) => previous.text == ".",
        _ => false,
    }
}

/// Quote `text` as a single-quoted literal, switching to double quotes when
/// the text contains a single quote but no double quote.
pub fn quoted(text: &str) -> String {
    let quote = if text.contains('\'') && !text.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(text.len() + 2);
    out.push(quote);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => out.push_str(&format!("\\x{:02x}", u32::from(c))),
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
