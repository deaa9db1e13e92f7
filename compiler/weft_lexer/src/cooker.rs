//! Layout cooking.
//!
//! Turns the flat `(RawToken, span)` sequence into tokens with layout:
//!
//! ```text
//! source → logos RawToken → Cooker → Token { kind, text, offset }
//! ```
//!
//! The cooker owns everything line-related: logical versus non-logical
//! line breaks, bracket depth, the indentation stack with its `Indent` and
//! `Dedent` markers, and the per-token `offset`.

use std::ops::Range;

use logos::Logos;
use weft_ir::{Token, TokenKind};

use crate::lex_error::{LexError, LexErrorKind};
use crate::raw_token::RawToken;

pub(crate) struct Cooker<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    /// Widths of the open indentation levels (the zero level is implicit).
    indents: Vec<usize>,
    /// Open bracket count.
    depth: usize,
    /// 1-based physical line.
    line: usize,
    /// Byte offset where the current physical line starts.
    line_start: usize,
    /// End of the previous token, if it is on the current physical line.
    prev_end: Option<usize>,
    /// Whether the current logical line has produced a non-comment token.
    line_has_content: bool,
}

impl<'src> Cooker<'src> {
    pub(crate) fn new(source: &'src str) -> Self {
        Cooker {
            source,
            tokens: Vec::new(),
            indents: Vec::new(),
            depth: 0,
            line: 1,
            line_start: 0,
            prev_end: None,
            line_has_content: false,
        }
    }

    /// Cook the whole source. The result always ends with `EndMarker`.
    pub(crate) fn run(mut self) -> Result<Vec<Token>, LexError> {
        let mut lexer = RawToken::lexer(self.source);
        while let Some(raw) = lexer.next() {
            let span = lexer.span();
            match raw {
                Ok(raw) => self.cook(raw, span)?,
                Err(()) => return Err(self.raw_error(span)),
            }
        }
        self.finish()
    }

    fn cook(&mut self, raw: RawToken, span: Range<usize>) -> Result<(), LexError> {
        let source = self.source;
        match raw {
            RawToken::Newline => {
                let kind = if self.depth > 0 || !self.line_has_content {
                    TokenKind::Nl
                } else {
                    TokenKind::Newline
                };
                self.push(kind, "\n", span.start);
                if kind == TokenKind::Newline {
                    self.line_has_content = false;
                }
                self.next_line(span.end);
            }
            RawToken::LineContinuation => self.next_line(span.end),
            RawToken::Comment => {
                self.push(TokenKind::Comment, &source[span.clone()], span.start);
                self.prev_end = Some(span.end);
            }
            RawToken::Name
            | RawToken::Number
            | RawToken::String
            | RawToken::Open
            | RawToken::Close
            | RawToken::Op => {
                if !self.line_has_content && self.depth == 0 {
                    self.indentation(span.start)?;
                }
                self.line_has_content = true;

                match raw {
                    RawToken::Open => self.depth += 1,
                    RawToken::Close => {
                        if self.depth == 0 {
                            let bracket = source[span.clone()].chars().next().unwrap_or(')');
                            return Err(
                                self.error(LexErrorKind::UnbalancedBracket(bracket), span.start)
                            );
                        }
                        self.depth -= 1;
                    }
                    _ => {}
                }

                let kind = match raw {
                    RawToken::Name => TokenKind::Name,
                    RawToken::Number => TokenKind::Number,
                    RawToken::String => TokenKind::String,
                    _ => TokenKind::Op,
                };
                let text = &source[span.clone()];
                self.push(kind, text, span.start);
                self.prev_end = Some(span.end);

                if raw == RawToken::String {
                    // triple-quoted strings may span lines
                    if let Some(last_break) = text.rfind('\n') {
                        self.line += text.matches('\n').count();
                        self.line_start = span.start + last_break + 1;
                    }
                }
            }
        }
        Ok(())
    }

    /// Compare the indentation of a logical line's first token against the
    /// stack, emitting `Indent`/`Dedent` markers.
    fn indentation(&mut self, start: usize) -> Result<(), LexError> {
        let source = self.source;
        let whitespace = &source[self.line_start..start];
        let width = whitespace.chars().count();
        let current = self.current_indent();

        if width > current {
            self.indents.push(width);
            self.tokens.push(Token::with_offset(TokenKind::Indent, whitespace, 0));
        } else if width < current {
            while self.indents.last().is_some_and(|&top| top > width) {
                self.indents.pop();
                self.tokens.push(Token::with_offset(TokenKind::Dedent, "", 0));
            }
            if self.current_indent() != width {
                return Err(self.error(LexErrorKind::InconsistentDedent, start));
            }
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<Token>, LexError> {
        if self.depth > 0 {
            return Err(self.error(LexErrorKind::UnclosedBracket, self.source.len()));
        }
        if self.line_has_content {
            self.tokens.push(Token::with_offset(TokenKind::Newline, "", 0));
        }
        for _ in self.indents.drain(..) {
            self.tokens.push(Token::with_offset(TokenKind::Dedent, "", 0));
        }
        self.tokens.push(Token::with_offset(TokenKind::EndMarker, "", 0));
        Ok(self.tokens)
    }

    fn push(&mut self, kind: TokenKind, text: &str, start: usize) {
        let offset = self.offset(start);
        self.tokens.push(Token::with_offset(kind, text, offset));
    }

    /// Whitespace before a token: since the previous token on the same
    /// line, or since the current indentation for the first one.
    fn offset(&self, start: usize) -> usize {
        match self.prev_end {
            Some(end) => self.source[end..start].chars().count(),
            None => self.column(start).saturating_sub(self.current_indent()),
        }
    }

    fn next_line(&mut self, start: usize) {
        self.line += 1;
        self.line_start = start;
        self.prev_end = None;
    }

    fn current_indent(&self) -> usize {
        self.indents.last().copied().unwrap_or(0)
    }

    /// 0-based character column of `at` on the current line.
    fn column(&self, at: usize) -> usize {
        self.source[self.line_start..at].chars().count()
    }

    fn raw_error(&self, span: Range<usize>) -> LexError {
        let slice = &self.source[span.clone()];
        let kind = if slice.ends_with('"') || slice.ends_with('\'') {
            LexErrorKind::UnterminatedString
        } else {
            LexErrorKind::UnknownCharacter(slice.chars().next().unwrap_or('\0'))
        };
        self.error(kind, span.start)
    }

    fn error(&self, kind: LexErrorKind, at: usize) -> LexError {
        LexError::new(kind, self.line, self.column(at) + 1)
    }
}
