//! The expansion state machine.
//!
//! Each step looks at the next token and takes one of these branches:
//!
//! | At statement start | Token              | Action                                   |
//! |--------------------|--------------------|------------------------------------------|
//! | yes                | `@`                | speculate a decorator chain (`decorators`) |
//! | yes                | `macro`            | import, constant or definition (`statements`) |
//! | any                | name bound locally | invocation or constant substitution      |
//! | any                | anything else      | pass through                             |
//!
//! `@` and `macro` are only special at the start of a logical line, so
//! `a @ b` and `x = macro` are ordinary code.

mod decorators;
mod statements;

use std::collections::VecDeque;
use std::iter::FusedIterator;

use weft_eval::{Interpreter, Namespace, Value};
use weft_ir::{untokenize, Token, TokenKind, TokenQuery};
use weft_parse::parse_expression;
use weft_stream::TokenStream;

use crate::materialize::materialize;
use crate::{ExpandError, ExpandOptions};

/// Expands the macros of one source unit.
///
/// The processor owns the macro environment for that unit; nothing carries
/// over to another unit.
pub struct MacroProcessor<I: Iterator<Item = Token>> {
    stream: TokenStream<I>,
    interpreter: Interpreter,
    /// Output produced by the last step, not yet handed out.
    pending: VecDeque<Token>,
    at_statement_start: bool,
    finished: bool,
}

impl<I: Iterator<Item = Token>> MacroProcessor<I> {
    pub fn new(stream: TokenStream<I>, options: &ExpandOptions) -> Self {
        MacroProcessor {
            stream,
            interpreter: options.interpreter(),
            pending: VecDeque::new(),
            at_statement_start: true,
            finished: false,
        }
    }

    /// The rewritten tokens, produced lazily and ending with one
    /// `EndMarker`. The first error ends the sequence.
    pub fn transform(&mut self) -> Transform<'_, I> {
        Transform { processor: self }
    }

    /// The macro environment built so far.
    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    /// Run one branch of the state machine. `false` once input is exhausted.
    fn step(&mut self) -> Result<bool, ExpandError> {
        let token = self.upcoming();
        if !token.is_present() {
            self.pending.push_back(Token::end_marker());
            return Ok(false);
        }

        if self.at_statement_start {
            if token.is_op("@") {
                if let Some(chain) = self.stream.speculate(decorators::scan_chain)? {
                    self.apply_chain(chain)?;
                    self.at_statement_start = true;
                    return Ok(true);
                }
            } else if token.is_name("macro") && self.macro_statement()? {
                self.at_statement_start = true;
                return Ok(true);
            }
        }

        let token = self.stream.advance();
        self.at_statement_start = starts_statement(&token);
        if token.kind == TokenKind::Name && self.interpreter.is_local(&token.text) {
            self.substitute(token)?;
        } else {
            self.pending.push_back(token);
        }
        Ok(true)
    }

    /// The next token, left unconsumed.
    fn upcoming(&mut self) -> Token {
        self.stream.revert();
        let token = self.stream.peek();
        self.stream.revert();
        token
    }

    /// Replace a locally bound name: `NAME(args)` is a macro invocation,
    /// a bare `NAME` a constant.
    fn substitute(&mut self, name: Token) -> Result<(), ExpandError> {
        let value = if self.upcoming().is_op("(") {
            let args = self
                .stream
                .consume_balanced(&TokenQuery::op("("), &TokenQuery::op(")"))?;
            self.invoke(&name, args)?
        } else {
            match self.constant(&name.text) {
                Some(value) => {
                    tracing::trace!(name = %name.text, "constant substitution");
                    value
                }
                None => {
                    self.pending.push_back(name);
                    return Ok(());
                }
            }
        };
        self.pending.extend(splice(&value, name.offset)?);
        Ok(())
    }

    /// The value of a macro constant. Names of macros and other callables
    /// are not constants and stay as written.
    fn constant(&self, name: &str) -> Option<Value> {
        if !self.interpreter.is_local(name) {
            return None;
        }
        self.interpreter
            .lookup(name)
            .filter(|value| !value.is_callable())
    }

    /// Evaluate `name(args)` against the macro environment.
    #[tracing::instrument(level = "debug", skip_all, fields(name = %name.text))]
    fn invoke(&self, name: &Token, args: Vec<Token>) -> Result<Value, ExpandError> {
        let mut call = Vec::with_capacity(args.len() + 1);
        call.push(name.clone());
        call.extend(args);
        let expr = parse_expression(&fragment_text(&call))?;
        Ok(self.interpreter.eval(&expr, Namespace::Locals)?)
    }

    /// Substitute every macro constant in `tokens` by its value.
    #[tracing::instrument(level = "trace", skip_all, fields(tokens = tokens.len()))]
    fn substitute_constants(&self, tokens: Vec<Token>) -> Result<Vec<Token>, ExpandError> {
        let mut out = Vec::with_capacity(tokens.len());
        for token in tokens {
            let bound = if token.kind == TokenKind::Name {
                self.constant(&token.text)
            } else {
                None
            };
            match bound {
                Some(value) => out.extend(splice(&value, token.offset)?),
                None => out.push(token),
            }
        }
        Ok(out)
    }
}

/// Lazy output of [`MacroProcessor::transform`].
pub struct Transform<'p, I: Iterator<Item = Token>> {
    processor: &'p mut MacroProcessor<I>,
}

impl<I: Iterator<Item = Token>> Iterator for Transform<'_, I> {
    type Item = Result<Token, ExpandError>;

    fn next(&mut self) -> Option<Self::Item> {
        let processor = &mut *self.processor;
        loop {
            if let Some(token) = processor.pending.pop_front() {
                return Some(Ok(token));
            }
            if processor.finished {
                return None;
            }
            match processor.step() {
                Ok(true) => {}
                Ok(false) => processor.finished = true,
                Err(err) => {
                    tracing::debug!(%err, "expansion failed");
                    processor.finished = true;
                    processor.pending.clear();
                    return Some(Err(err));
                }
            }
        }
    }
}

impl<I: Iterator<Item = Token>> FusedIterator for Transform<'_, I> {}

/// Whether the token after `token` begins a logical line.
fn starts_statement(token: &Token) -> bool {
    matches!(
        token.kind,
        TokenKind::Newline | TokenKind::Nl | TokenKind::Indent | TokenKind::Dedent
    )
}

/// Source text of a token fragment cut out of a longer line. The first
/// token's leading spaces are dropped so the text does not start indented.
pub(crate) fn fragment_text(tokens: &[Token]) -> String {
    let mut tokens = tokens.to_vec();
    if let Some(first) = tokens.first_mut() {
        first.offset = None;
    }
    untokenize(&tokens)
}

/// The tokens for `value`, placed where a token with `offset` stood.
fn splice(value: &Value, offset: Option<usize>) -> Result<Vec<Token>, ExpandError> {
    let mut tokens = materialize(value)?;
    if let Some(first) = tokens.first_mut() {
        first.offset = offset;
    }
    Ok(tokens)
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
