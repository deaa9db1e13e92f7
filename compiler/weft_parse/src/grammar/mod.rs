//! Recursive descent grammar.
//!
//! - `stmt`: statements, suites, definitions and imports
//! - `expr`: the expression precedence ladder and atoms
//! - `literal`: number, string and f-string literals

mod expr;
mod literal;
mod stmt;

use weft_ir::{Token, TokenKind};

use crate::ast::{Expr, Module};
use crate::context::ParseContext;
use crate::cursor::Cursor;
use crate::SyntaxError;

/// Reserved words. `macro` is deliberately absent: it is only special at
/// the start of a statement, which the expansion engine handles.
pub(crate) const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "break", "class", "continue", "def", "del",
    "elif", "else", "except", "finally", "for", "from", "global", "if", "import", "in", "is",
    "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try", "while", "with", "yield",
];

pub fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

/// Parser state.
pub(crate) struct Parser {
    cursor: Cursor,
    context: ParseContext,
    /// Set when `yield` is parsed in the function body being parsed.
    saw_yield: bool,
}

impl Parser {
    pub(crate) fn new(tokens: impl IntoIterator<Item = Token>) -> Self {
        Parser {
            cursor: Cursor::new(tokens),
            context: ParseContext::default(),
            saw_yield: false,
        }
    }

    pub(crate) fn parse_module(&mut self) -> Result<Module, SyntaxError> {
        let mut body = Vec::new();
        loop {
            self.skip_newlines();
            match self.cursor.current_kind() {
                TokenKind::EndMarker => break,
                TokenKind::Indent => {
                    return Err(SyntaxError::new("unexpected indent", self.cursor.line()))
                }
                TokenKind::Dedent => {
                    return Err(SyntaxError::new("unexpected dedent", self.cursor.line()))
                }
                _ => self.parse_statement(&mut body)?,
            }
        }
        tracing::trace!(statements = body.len(), "parsed module");
        Ok(Module { body })
    }

    /// A single expression, optionally surrounded by layout tokens.
    pub(crate) fn parse_expression_only(&mut self) -> Result<Expr, SyntaxError> {
        while self.cursor.check(TokenKind::Indent) || self.cursor.check(TokenKind::Newline) {
            self.cursor.advance();
        }
        let expr = self.parse_test_list()?;
        while self.cursor.check(TokenKind::Newline) || self.cursor.check(TokenKind::Dedent) {
            self.cursor.advance();
        }
        if !self.cursor.is_at_end() {
            return Err(self.cursor.unexpected("end of expression"));
        }
        Ok(expr)
    }

    fn skip_newlines(&mut self) {
        while self.cursor.check(TokenKind::Newline) {
            self.cursor.advance();
        }
    }

    /// Run `parse` with `context` in effect, restoring the previous context
    /// afterwards even on error.
    fn with_context<T>(
        &mut self,
        context: ParseContext,
        parse: impl FnOnce(&mut Self) -> Result<T, SyntaxError>,
    ) -> Result<T, SyntaxError> {
        let outer = std::mem::replace(&mut self.context, context);
        let result = parse(self);
        self.context = outer;
        result
    }

    /// Like [`with_context`](Self::with_context) for a function body; also
    /// reports whether the body contains `yield`.
    fn in_function_body<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, SyntaxError>,
    ) -> Result<(T, bool), SyntaxError> {
        let outer_yield = std::mem::replace(&mut self.saw_yield, false);
        let result = self.with_context(self.context.enter_function(), parse);
        let is_generator = std::mem::replace(&mut self.saw_yield, outer_yield);
        Ok((result?, is_generator))
    }

    /// The current token as an identifier, rejecting keywords.
    fn expect_identifier(&mut self) -> Result<String, SyntaxError> {
        let token = self.cursor.current();
        if token.kind == TokenKind::Name && !is_keyword(&token.text) {
            Ok(self.cursor.advance().text)
        } else {
            Err(self.cursor.unexpected("a name"))
        }
    }
}
