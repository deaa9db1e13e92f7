//! Parser for weft macro code.
//!
//! Macro bodies are written in a small indentation-structured language.
//! This crate turns its tokens into a syntax tree and back into text:
//!
//! ```text
//! text ──weft_lexer──▶ tokens ──parse_module──▶ Module ──unparse──▶ text
//! ```
//!
//! The parser is a plain recursive descent over a [`Token`] slice. Context
//! rules (`return` outside a function, `break` outside a loop) are checked
//! while parsing. Trees are rewritten with the [`fold`] functions.

pub mod ast;
mod context;
mod cursor;
mod error;
pub mod fold;
mod grammar;
mod unparse;

pub use context::ParseContext;
pub use error::SyntaxError;
pub use grammar::is_keyword;
pub use unparse::{unparse, unparse_expr, unparse_stmt};

use weft_ir::Token;

use ast::{Expr, Module};
use grammar::Parser;

/// Parse a token sequence into a module.
pub fn parse_module(tokens: impl IntoIterator<Item = Token>) -> Result<Module, SyntaxError> {
    Parser::new(tokens).parse_module()
}

/// Lex and parse `source`.
pub fn parse_module_text(source: &str) -> Result<Module, SyntaxError> {
    let tokens = weft_lexer::tokenize_with_endmarker(source)?;
    parse_module(tokens)
}

/// Parse a single expression from text.
pub fn parse_expression(source: &str) -> Result<Expr, SyntaxError> {
    let tokens = weft_lexer::tokenize_with_endmarker(source)?;
    parse_expression_tokens(tokens)
}

/// Parse a single expression from tokens.
pub fn parse_expression_tokens(tokens: impl IntoIterator<Item = Token>) -> Result<Expr, SyntaxError> {
    Parser::new(tokens).parse_expression_only()
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
