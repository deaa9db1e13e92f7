//! Token cursor for navigating the token sequence.
//!
//! Comments and non-logical line breaks carry no syntax, so the cursor
//! drops them up front and records the source line of every remaining
//! token instead.

use weft_ir::{Token, TokenKind};

use crate::SyntaxError;

pub(crate) struct Cursor {
    tokens: Vec<Token>,
    /// 1-based line of each token, parallel to `tokens`.
    lines: Vec<usize>,
    pos: usize,
}

impl Cursor {
    /// Build a cursor. The sequence always ends with an `EndMarker`, added
    /// when the input lacks one.
    pub(crate) fn new(tokens: impl IntoIterator<Item = Token>) -> Self {
        let mut kept = Vec::new();
        let mut lines = Vec::new();
        let mut line = 1;
        for token in tokens {
            let breaks = match token.kind {
                TokenKind::Newline | TokenKind::Nl => usize::from(!token.text.is_empty()),
                TokenKind::String => token.text.matches('\n').count(),
                _ => 0,
            };
            let kind = token.kind;
            if !matches!(kind, TokenKind::Comment | TokenKind::Nl) {
                kept.push(token);
                lines.push(line);
            }
            line += breaks;
            if kind == TokenKind::EndMarker {
                break;
            }
        }
        if kept.last().map(|token| token.kind) != Some(TokenKind::EndMarker) {
            kept.push(Token::end_marker());
            lines.push(line);
        }
        Cursor {
            tokens: kept,
            lines,
            pos: 0,
        }
    }

    #[inline]
    pub(crate) fn current(&self) -> &Token {
        self.peek_at(0)
    }

    #[inline]
    pub(crate) fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    /// The token `n` positions ahead, clamped to the end marker.
    pub(crate) fn peek_at(&self, n: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + n).min(last)]
    }

    /// Line of the current token.
    pub(crate) fn line(&self) -> usize {
        let last = self.lines.len() - 1;
        self.lines[self.pos.min(last)]
    }

    #[inline]
    pub(crate) fn is_at_end(&self) -> bool {
        self.current_kind() == TokenKind::EndMarker
    }

    #[inline]
    pub(crate) fn check_op(&self, text: &str) -> bool {
        self.current().is_op(text)
    }

    /// Whether the current token is the keyword (or name) `text`.
    #[inline]
    pub(crate) fn check_name(&self, text: &str) -> bool {
        self.current().is_name(text)
    }

    #[inline]
    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    /// Move past the current token and return it. Stays on the end marker.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !self.is_at_end() {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn eat_op(&mut self, text: &str) -> bool {
        let found = self.check_op(text);
        if found {
            self.pos += 1;
        }
        found
    }

    pub(crate) fn eat_name(&mut self, text: &str) -> bool {
        let found = self.check_name(text);
        if found {
            self.pos += 1;
        }
        found
    }

    pub(crate) fn expect_op(&mut self, text: &str) -> Result<(), SyntaxError> {
        if self.eat_op(text) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{text}'")))
        }
    }

    pub(crate) fn expect_name_keyword(&mut self, text: &str) -> Result<(), SyntaxError> {
        if self.eat_name(text) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{text}'")))
        }
    }

    /// An "expected X" error at the current token.
    pub(crate) fn unexpected(&self, expected: &str) -> SyntaxError {
        let found = match self.current_kind() {
            TokenKind::EndMarker => "end of input".to_owned(),
            TokenKind::Newline => "end of line".to_owned(),
            TokenKind::Indent => "indent".to_owned(),
            TokenKind::Dedent => "dedent".to_owned(),
            _ => format!("'{}'", self.current().text),
        };
        SyntaxError::new(format!("expected {expected}, found {found}"), self.line())
    }
}
