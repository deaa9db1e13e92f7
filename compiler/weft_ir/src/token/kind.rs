//! Token kinds.

use std::fmt;

/// The lexical category of a [`Token`](super::Token).
///
/// Keywords are not separate kinds: `def`, `class` and `macro` are all
/// `Name` tokens, and meaning is assigned by position during expansion.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TokenKind {
    /// Identifier or keyword.
    Name,
    /// Integer, float or imaginary literal.
    Number,
    /// String literal including prefix and quotes.
    String,
    /// Operator or punctuation.
    Op,
    /// `#` comment up to the end of the physical line.
    Comment,
    /// End of a logical line.
    Newline,
    /// Line break that does not end a logical line (blank lines, comment
    /// lines, breaks inside brackets).
    Nl,
    /// Start of an indented block. Text is the literal indentation.
    Indent,
    /// End of an indented block. Text is empty.
    Dedent,
    /// End of input.
    EndMarker,
}

impl TokenKind {
    /// Every kind, in declaration order.
    pub const ALL: [TokenKind; 10] = [
        TokenKind::Name,
        TokenKind::Number,
        TokenKind::String,
        TokenKind::Op,
        TokenKind::Comment,
        TokenKind::Newline,
        TokenKind::Nl,
        TokenKind::Indent,
        TokenKind::Dedent,
        TokenKind::EndMarker,
    ];

    /// Upper-case name used in diagnostics and by the script `token` module.
    pub const fn name(self) -> &'static str {
        match self {
            TokenKind::Name => "NAME",
            TokenKind::Number => "NUMBER",
            TokenKind::String => "STRING",
            TokenKind::Op => "OP",
            TokenKind::Comment => "COMMENT",
            TokenKind::Newline => "NEWLINE",
            TokenKind::Nl => "NL",
            TokenKind::Indent => "INDENT",
            TokenKind::Dedent => "DEDENT",
            TokenKind::EndMarker => "ENDMARKER",
        }
    }

    /// Inverse of [`TokenKind::name`].
    pub fn from_name(name: &str) -> Option<TokenKind> {
        TokenKind::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// `Newline` or `Nl`.
    #[inline]
    pub fn is_line_break(self) -> bool {
        matches!(self, TokenKind::Newline | TokenKind::Nl)
    }

    /// Kinds that carry no source text of their own on the rendered line.
    #[inline]
    pub fn is_layout(self) -> bool {
        matches!(
            self,
            TokenKind::Indent | TokenKind::Dedent | TokenKind::EndMarker
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
