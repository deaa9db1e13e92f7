//! Token-specialized stream with structured scans.
//!
//! All `consume_*` scans start at the committed position (pending lookahead
//! is discarded first) and never consume the end marker. The `peek_*`
//! mirrors continue from the current lookahead position and leave the
//! lookahead cursor after what they returned; call
//! [`revert`](TokenStream::revert) to rewind.

use weft_ir::{Renderer, Token, TokenKind, TokenQuery};

use crate::{ParseError, PeekableStream};

/// A [`PeekableStream`] of tokens that also tracks the current source line
/// for diagnostics.
pub struct TokenStream<I: Iterator<Item = Token>> {
    inner: PeekableStream<I>,
    /// Tokens consumed on the current line.
    line_buffer: Vec<Token>,
    /// 1-based count of line breaks consumed.
    lineno: usize,
}

impl<I: Iterator<Item = Token>> TokenStream<I> {
    pub fn new(tokens: impl IntoIterator<IntoIter = I>) -> Self {
        TokenStream::with_capacity(tokens, None)
    }

    pub fn with_capacity(tokens: impl IntoIterator<IntoIter = I>, capacity: Option<usize>) -> Self {
        TokenStream {
            inner: PeekableStream::with_capacity(tokens, capacity, Token::end_marker()),
            line_buffer: Vec::new(),
            lineno: 1,
        }
    }

    pub fn lineno(&self) -> usize {
        self.lineno
    }

    /// Tokens consumed so far on the current line.
    pub fn line_buffer(&self) -> &[Token] {
        &self.line_buffer
    }

    fn record(&mut self, token: &Token) {
        if token.kind.is_line_break() {
            self.line_buffer.clear();
            self.lineno += 1;
        } else if token.is_present() {
            self.line_buffer.push(token.clone());
        }
    }

    // === Primitive operations ===

    /// Consume the next token. Past the end this is the end marker.
    pub fn advance(&mut self) -> Token {
        let token = self.inner.advance();
        self.record(&token);
        token
    }

    pub fn peek(&mut self) -> Token {
        self.inner.peek()
    }

    pub fn peek_n(&mut self, n: usize) -> Vec<Token> {
        self.inner.peek_n(n)
    }

    pub fn unpeek(&mut self) {
        self.inner.unpeek();
    }

    pub fn commit(&mut self) {
        for token in self.inner.peeked() {
            self.record(&token);
        }
        self.inner.commit();
    }

    pub fn revert(&mut self) {
        self.inner.revert();
    }

    pub fn rollback(&self) -> TokenStream<I> {
        TokenStream {
            inner: self.inner.rollback(),
            line_buffer: self.line_buffer.clone(),
            lineno: self.lineno,
        }
    }

    /// Commit and move the parent stream to this view's position.
    ///
    /// The parent's line tracking is only refreshed by
    /// [`speculate`](Self::speculate), which has access to both.
    pub fn commit_upstream(&mut self) {
        self.commit();
        self.inner.commit_upstream();
    }

    /// Run a speculative scan on a view of this stream.
    ///
    /// `Ok(Some(_))` keeps what the view consumed (its pending lookahead is
    /// dropped), `Ok(None)` abandons the view, `Err` propagates without
    /// committing anything.
    pub fn speculate<T, E>(
        &mut self,
        scan: impl FnOnce(&mut TokenStream<I>) -> Result<Option<T>, E>,
    ) -> Result<Option<T>, E> {
        let mut view = self.rollback();
        let Some(value) = scan(&mut view)? else {
            tracing::trace!(line = self.lineno, "speculative scan abandoned");
            return Ok(None);
        };
        view.revert();
        view.inner.commit_upstream();
        self.line_buffer = view.line_buffer;
        self.lineno = view.lineno;
        Ok(Some(value))
    }

    pub fn is_exhausted(&mut self) -> bool {
        self.inner.is_exhausted()
    }

    /// Take the next token unless it is the end marker.
    fn take(&mut self) -> Option<Token> {
        self.revert();
        let token = self.peek();
        if token.is_present() {
            self.commit();
            Some(token)
        } else {
            self.revert();
            None
        }
    }

    // === Consuming scans ===

    /// Consume the next token if it matches `query`.
    pub fn consume_if(&mut self, query: &TokenQuery) -> Option<Token> {
        self.revert();
        let token = self.peek();
        if token.is_present() && query.matches(&token) {
            self.commit();
            Some(token)
        } else {
            self.revert();
            None
        }
    }

    /// Consume tokens while they match. The first non-matching token is
    /// left in the stream.
    pub fn consume_while(&mut self, query: &TokenQuery) -> Vec<Token> {
        self.revert();
        let mut consumed = Vec::new();
        loop {
            let token = self.peek();
            if !token.is_present() || !query.matches(&token) {
                self.unpeek();
                break;
            }
            self.commit();
            consumed.push(token);
        }
        self.revert();
        consumed
    }

    /// Consume tokens up to and including the first match.
    pub fn consume_until(&mut self, query: &TokenQuery) -> Vec<Token> {
        let mut consumed = Vec::new();
        while let Some(token) = self.take() {
            let done = query.matches(&token);
            consumed.push(token);
            if done {
                break;
            }
        }
        consumed
    }

    /// Consume to the end of the current line, line break included.
    pub fn consume_line(&mut self) -> Vec<Token> {
        self.consume_until(&TokenQuery::line_end())
    }

    /// Consume from the current position until the nesting level counted
    /// by `open`/`close` returns to zero.
    ///
    /// Tokens before the first `open` are included, closes among them too.
    /// Reaching the end of input with the level still positive is an error.
    pub fn consume_balanced(
        &mut self,
        open: &TokenQuery,
        close: &TokenQuery,
    ) -> Result<Vec<Token>, ParseError> {
        let mut consumed = Vec::new();
        let mut level: usize = 0;
        loop {
            let Some(token) = self.take() else {
                if level == 0 {
                    return Ok(consumed);
                }
                return Err(self.error(format!("unexpected end of input, expected {close}")));
            };
            let opens = open.matches(&token);
            // A close before any open does not end the scan.
            let closes = !opens && level > 0 && close.matches(&token);
            consumed.push(token);
            if opens {
                level += 1;
            } else if closes {
                level -= 1;
                if level == 0 {
                    return Ok(consumed);
                }
            }
        }
    }

    /// Consume a definition: its header line and, when present, the
    /// indented body that follows (`Indent` ... matching `Dedent`).
    ///
    /// A one-line definition (`def f(): ...`) is just its header.
    pub fn consume_block(&mut self) -> Result<Vec<Token>, ParseError> {
        let mut block = self.consume_until(&TokenQuery::kind(TokenKind::Newline));
        if block.last().map(|token| token.kind) != Some(TokenKind::Newline) {
            return Err(self.error("unexpected end of input in block header"));
        }

        self.revert();
        let mut trivia = Vec::new();
        let next = loop {
            let token = self.peek();
            if matches!(token.kind, TokenKind::Nl | TokenKind::Comment) {
                trivia.push(token);
            } else {
                break token;
            }
        };
        if next.kind != TokenKind::Indent {
            self.revert();
            return Ok(block);
        }
        self.unpeek();
        self.commit();
        block.extend(trivia);
        block.extend(self.consume_balanced(
            &TokenQuery::kind(TokenKind::Indent),
            &TokenQuery::kind(TokenKind::Dedent),
        )?);
        Ok(block)
    }

    // === Peeking mirrors ===

    /// Peek tokens while they match; the failing token is un-peeked.
    pub fn peek_while(&mut self, query: &TokenQuery) -> Vec<Token> {
        let mut peeked = Vec::new();
        loop {
            let token = self.peek();
            if !token.is_present() || !query.matches(&token) {
                if token.is_present() {
                    self.unpeek();
                }
                return peeked;
            }
            peeked.push(token);
        }
    }

    /// Peek tokens up to and including the first match.
    pub fn peek_until(&mut self, query: &TokenQuery) -> Vec<Token> {
        let mut peeked = Vec::new();
        loop {
            let token = self.peek();
            if !token.is_present() {
                return peeked;
            }
            let done = query.matches(&token);
            peeked.push(token);
            if done {
                return peeked;
            }
        }
    }

    pub fn peek_line(&mut self) -> Vec<Token> {
        self.peek_until(&TokenQuery::line_end())
    }

    /// Peek a balanced region. Unlike the consuming scan this does not
    /// fail at end of input; it returns nothing instead.
    pub fn peek_balanced(&mut self, open: &TokenQuery, close: &TokenQuery) -> Vec<Token> {
        let mut peeked = Vec::new();
        let mut level: usize = 0;
        loop {
            let token = self.peek();
            if !token.is_present() {
                return if level == 0 { peeked } else { Vec::new() };
            }
            let opens = open.matches(&token);
            // A close before any open does not end the scan.
            let closes = !opens && level > 0 && close.matches(&token);
            peeked.push(token);
            if opens {
                level += 1;
            } else if closes {
                level -= 1;
                if level == 0 {
                    return peeked;
                }
            }
        }
    }

    pub fn peek_block(&mut self) -> Vec<Token> {
        self.peek_balanced(
            &TokenQuery::kind(TokenKind::Indent),
            &TokenQuery::kind(TokenKind::Dedent),
        )
    }

    // === Diagnostics ===

    /// A [`ParseError`] at the current position.
    pub fn error(&mut self, message: impl Into<String>) -> ParseError {
        let context = self.error_context();
        ParseError::new(message, self.lineno, context)
    }

    /// Render the line around the current token with a caret under it:
    ///
    /// ```text
    ///     @deco(1, 2
    ///          ^
    ///          (OP, '(')
    /// ```
    ///
    /// The current token is the last one peeked, or else the last one
    /// consumed. Empty when the stream has not been used yet.
    pub fn error_context(&mut self) -> String {
        let peeked = self.inner.peeked();
        let (mut before, current) = match peeked.split_last() {
            Some((current, prefix)) => {
                let mut before = self.line_buffer.clone();
                before.extend(prefix.iter().cloned());
                (before, current.clone())
            }
            None => match self.line_buffer.split_last() {
                Some((current, prefix)) => (prefix.to_vec(), current.clone()),
                None => return String::new(),
            },
        };
        if let Some(at) = before.iter().rposition(|token| token.kind.is_line_break()) {
            before.drain(..=at);
        }

        let mut renderer = Renderer::new();
        for token in &before {
            renderer.push(token);
        }
        let prefix = renderer.finish();

        let rendered = if current.kind.is_line_break() {
            String::new()
        } else {
            current.render(before.last())
        };

        let saved = self.inner.lookahead_len();
        let after = self.peek_line();
        self.revert();
        self.inner.peek_n(saved);

        let mut suffix = Renderer::after(Some(&current));
        for token in after.iter().filter(|token| !token.kind.is_line_break()) {
            suffix.push(token);
        }
        let suffix = suffix.finish();

        let leading = rendered.len() - rendered.trim_start().len();
        let pad = " ".repeat(prefix.chars().count() + leading);
        let width = current.text.chars().count().max(1);
        let indent = "    ";
        format!(
            "{indent}{prefix}{rendered}{suffix}\n{indent}{pad}^{}\n{indent}{pad}{current}",
            "~".repeat(width - 1)
        )
    }
}

impl<I: Iterator<Item = Token>> Iterator for TokenStream<I> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let token = self.inner.next()?;
        self.record(&token);
        Some(token)
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
