//! Token queries.
//!
//! A [`TokenQuery`] pairs a [`KindMatcher`] with a [`TextMatcher`]. Each side
//! is a wildcard, a single value, a set of values, a pattern or a predicate,
//! and the query matches when both sides match.
//!
//! ```text
//! TokenQuery::new(TokenKind::Op, "(")              exact
//! TokenQuery::new(Any, ["def", "class"])            any kind, text in set
//! TokenQuery::new([Newline, Nl, EndMarker], Any)    line terminators
//! ```
//!
//! The matcher enums are closed, so a query built from an unsupported value
//! is a compile error rather than a runtime failure.

use std::fmt;

use regex::Regex;
use smallvec::SmallVec;

use super::{quoted, Token, TokenKind};

/// Wildcard marker accepted by both matcher sides.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Any;

/// Matches the kind of a token.
#[derive(Clone, Debug)]
pub enum KindMatcher {
    Any,
    Is(TokenKind),
    OneOf(SmallVec<[TokenKind; 4]>),
    Where(fn(TokenKind) -> bool),
}

impl KindMatcher {
    pub fn matches(&self, kind: TokenKind) -> bool {
        match self {
            KindMatcher::Any => true,
            KindMatcher::Is(expected) => *expected == kind,
            KindMatcher::OneOf(kinds) => kinds.contains(&kind),
            KindMatcher::Where(predicate) => predicate(kind),
        }
    }
}

impl From<Any> for KindMatcher {
    fn from(_: Any) -> Self {
        KindMatcher::Any
    }
}

impl From<TokenKind> for KindMatcher {
    fn from(kind: TokenKind) -> Self {
        KindMatcher::Is(kind)
    }
}

impl<const N: usize> From<[TokenKind; N]> for KindMatcher {
    fn from(kinds: [TokenKind; N]) -> Self {
        KindMatcher::OneOf(kinds.into_iter().collect())
    }
}

impl From<&[TokenKind]> for KindMatcher {
    fn from(kinds: &[TokenKind]) -> Self {
        KindMatcher::OneOf(kinds.iter().copied().collect())
    }
}

impl From<fn(TokenKind) -> bool> for KindMatcher {
    fn from(predicate: fn(TokenKind) -> bool) -> Self {
        KindMatcher::Where(predicate)
    }
}

/// Matches the text of a token.
///
/// `Pattern` follows anchored-at-start semantics: the pattern must match a
/// prefix of the text, not merely occur somewhere inside it.
#[derive(Clone, Debug)]
pub enum TextMatcher {
    Any,
    Is(String),
    Pattern(Regex),
    AnyOf(Vec<TextMatcher>),
    Where(fn(&str) -> bool),
}

impl TextMatcher {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            TextMatcher::Any => true,
            TextMatcher::Is(expected) => expected == text,
            TextMatcher::Pattern(pattern) => pattern.find(text).is_some_and(|m| m.start() == 0),
            TextMatcher::AnyOf(options) => options.iter().any(|option| option.matches(text)),
            TextMatcher::Where(predicate) => predicate(text),
        }
    }
}

impl From<Any> for TextMatcher {
    fn from(_: Any) -> Self {
        TextMatcher::Any
    }
}

impl From<&str> for TextMatcher {
    fn from(text: &str) -> Self {
        TextMatcher::Is(text.to_owned())
    }
}

impl From<String> for TextMatcher {
    fn from(text: String) -> Self {
        TextMatcher::Is(text)
    }
}

impl From<Regex> for TextMatcher {
    fn from(pattern: Regex) -> Self {
        TextMatcher::Pattern(pattern)
    }
}

impl<const N: usize> From<[&str; N]> for TextMatcher {
    fn from(options: [&str; N]) -> Self {
        TextMatcher::AnyOf(options.into_iter().map(TextMatcher::from).collect())
    }
}

impl From<Vec<TextMatcher>> for TextMatcher {
    fn from(options: Vec<TextMatcher>) -> Self {
        TextMatcher::AnyOf(options)
    }
}

impl From<fn(&str) -> bool> for TextMatcher {
    fn from(predicate: fn(&str) -> bool) -> Self {
        TextMatcher::Where(predicate)
    }
}

/// A `(kind, text)` matcher pair.
#[derive(Clone, Debug)]
pub struct TokenQuery {
    pub kind: KindMatcher,
    pub text: TextMatcher,
}

impl TokenQuery {
    pub fn new(kind: impl Into<KindMatcher>, text: impl Into<TextMatcher>) -> Self {
        TokenQuery {
            kind: kind.into(),
            text: text.into(),
        }
    }

    /// Matches every token.
    pub fn any() -> Self {
        TokenQuery::new(Any, Any)
    }

    /// Matches any token of `kind`.
    pub fn kind(kind: impl Into<KindMatcher>) -> Self {
        TokenQuery::new(kind, Any)
    }

    /// Matches the operator `text`.
    pub fn op(text: &str) -> Self {
        TokenQuery::new(TokenKind::Op, text)
    }

    /// Matches the name `text`.
    pub fn name(text: &str) -> Self {
        TokenQuery::new(TokenKind::Name, text)
    }

    /// Matches `Newline`, `Nl` and `EndMarker`.
    pub fn line_end() -> Self {
        TokenQuery::kind([TokenKind::Newline, TokenKind::Nl, TokenKind::EndMarker])
    }

    #[inline]
    pub fn matches(&self, token: &Token) -> bool {
        self.kind.matches(token.kind) && self.text.matches(&token.text)
    }
}

impl From<(TokenKind, &str)> for TokenQuery {
    fn from((kind, text): (TokenKind, &str)) -> Self {
        TokenQuery::new(kind, text)
    }
}

impl From<TokenKind> for TokenQuery {
    fn from(kind: TokenKind) -> Self {
        TokenQuery::kind(kind)
    }
}

impl fmt::Display for KindMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KindMatcher::Any => f.write_str("..."),
            KindMatcher::Is(kind) => write!(f, "{kind}"),
            KindMatcher::OneOf(kinds) => {
                let names: Vec<&str> = kinds.iter().map(|kind| kind.name()).collect();
                write!(f, "[{}]", names.join(", "))
            }
            KindMatcher::Where(_) => f.write_str("<predicate>"),
        }
    }
}

impl fmt::Display for TextMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextMatcher::Any => f.write_str("..."),
            TextMatcher::Is(text) => f.write_str(&quoted(text)),
            TextMatcher::Pattern(pattern) => write!(f, "/{}/", pattern.as_str()),
            TextMatcher::AnyOf(options) => {
                let options: Vec<String> = options.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", options.join(", "))
            }
            TextMatcher::Where(_) => f.write_str("<predicate>"),
        }
    }
}

/// Renders like a token: `(OP, ')')`, `([NEWLINE, NL], ...)`.
impl fmt::Display for TokenQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.kind, self.text)
    }
}
