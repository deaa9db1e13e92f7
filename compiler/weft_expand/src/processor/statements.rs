//! The `macro` keyword forms.
//!
//! ```text
//! macro import m / macro from m import x    run in the global namespace
//! macro NAME = expr                          bind a constant
//! macro def f(...): / macro class C:         register a macro
//! ```

use weft_eval::Namespace;
use weft_ir::{Token, TokenKind, TokenQuery};
use weft_parse::{is_keyword, parse_module_text};

use super::{fragment_text, MacroProcessor};
use crate::ExpandError;

enum Form {
    Import,
    Constant,
    Definition,
}

fn is_definition_keyword(token: &Token) -> bool {
    token.is_name("def") || token.is_name("class")
}

impl<I: Iterator<Item = Token>> MacroProcessor<I> {
    /// Handle a statement starting with `macro`. `false` when it is not one
    /// of the macro forms and `macro` is an ordinary name. `macro` followed
    /// by a bare identifier is a malformed header.
    pub(super) fn macro_statement(&mut self) -> Result<bool, ExpandError> {
        self.stream.revert();
        let ahead = self.stream.peek_n(3);
        self.stream.revert();
        let [_, next, after] = ahead.as_slice() else {
            return Ok(false);
        };
        let form = if next.is_name("import") || next.is_name("from") {
            Form::Import
        } else if is_definition_keyword(next) {
            Form::Definition
        } else if next.kind == TokenKind::Name && after.is_op("=") {
            Form::Constant
        } else if next.kind == TokenKind::Name && !is_keyword(&next.text) {
            self.stream.peek_n(3);
            return Err(self.stream.error("expected `=` after macro constant name").into());
        } else {
            return Ok(false);
        };

        self.stream.advance();
        match form {
            Form::Import => {
                let statement = self.consume_statement()?;
                tracing::debug!(line = self.stream.lineno(), "macro import");
                self.run(&statement, Namespace::Globals)?;
            }
            Form::Constant => {
                let statement = self.consume_statement()?;
                tracing::debug!(name = %next.text, "macro constant");
                self.run(&statement, Namespace::Locals)?;
            }
            Form::Definition => {
                let block = self.stream.consume_block()?;
                self.define(&block)?;
            }
        }
        Ok(true)
    }

    /// Register a macro from its definition block.
    #[tracing::instrument(level = "debug", skip_all, fields(line = self.stream.lineno()))]
    pub(super) fn define(&self, block: &[Token]) -> Result<(), ExpandError> {
        self.run(block, Namespace::Locals)
    }

    /// Consume one logical line, including any parenthesized part that
    /// spans several physical lines.
    fn consume_statement(&mut self) -> Result<Vec<Token>, ExpandError> {
        let open = TokenQuery::new(TokenKind::Op, ["(", "[", "{"]);
        let close = TokenQuery::new(TokenKind::Op, [")", "]", "}"]);
        let mut statement = Vec::new();
        loop {
            let next = self.upcoming();
            if !next.is_present() {
                return Ok(statement);
            }
            if open.matches(&next) {
                statement.extend(self.stream.consume_balanced(&open, &close)?);
                continue;
            }
            let token = self.stream.advance();
            let done = token.kind.is_line_break();
            statement.push(token);
            if done {
                return Ok(statement);
            }
        }
    }

    /// Execute macro source in the given namespace.
    fn run(&self, tokens: &[Token], namespace: Namespace) -> Result<(), ExpandError> {
        let module = parse_module_text(&fragment_text(tokens))?;
        self.interpreter.exec(&module, namespace)?;
        Ok(())
    }
}
