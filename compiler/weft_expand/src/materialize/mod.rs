//! Turning macro results back into tokens.
//!
//! | Value               | Tokens                                   |
//! |---------------------|------------------------------------------|
//! | `None`              | nothing                                  |
//! | `True`/`False`      | one `Name`                               |
//! | int, float          | one `Number`                             |
//! | str of one literal  | one `String` holding the text            |
//! | str of one name     | one `Name`                               |
//! | any other str       | the text, re-lexed                       |
//! | token sequence      | the tokens                               |
//! | function, class     | error: not code                          |
//! | anything else       | its code view (or its text), re-lexed    |
//!
//! A macro may therefore return a literal, an identifier spelled as a
//! string, or a free-form fragment, and all three splice in the same way.

use weft_eval::{float_repr, Code, CodeError, Origin, Value};
use weft_ir::{Token, TokenKind};
use weft_parse::ast::ExprKind;
use weft_parse::parse_expression;

use crate::ExpandError;

/// The tokens standing in for `value` at a substitution site.
pub fn materialize(value: &Value) -> Result<Vec<Token>, ExpandError> {
    let tokens = match value {
        Value::None => Vec::new(),
        Value::Bool(b) => vec![Token::name(if *b { "True" } else { "False" })],
        Value::Int(n) => vec![Token::new(TokenKind::Number, n.to_string())],
        Value::Float(f) => vec![Token::new(TokenKind::Number, float_repr(*f))],
        Value::Str(text) => materialize_str(text)?,
        Value::Code(code) => relex(code.text())?,
        callable if callable.is_callable() => {
            return Err(CodeError::NotCode {
                type_name: callable.type_name().into_owned(),
            }
            .into());
        }
        other => match Code::from_value(other, Origin::User) {
            Ok(code) => relex(code.text())?,
            // A list or tuple of plain values splices as a display.
            Err(CodeError::NotCode { .. } | CodeError::BadToken { .. }) => relex(&other.to_str())?,
            Err(err) => return Err(err.into()),
        },
    };
    Ok(tokens)
}

fn materialize_str(text: &str) -> Result<Vec<Token>, ExpandError> {
    let trimmed = text.trim();
    match parse_expression(trimmed).map(|expr| expr.kind) {
        Ok(kind) if kind.is_constant() => Ok(vec![Token::new(TokenKind::String, trimmed)]),
        Ok(ExprKind::Name(_)) => Ok(vec![Token::name(trimmed)]),
        _ => relex(text),
    }
}

/// Lex a fragment for splicing. The line end the lexer adds to text that
/// has none is dropped, so an expression splices inline.
pub(crate) fn relex(text: &str) -> Result<Vec<Token>, ExpandError> {
    let mut tokens = weft_lexer::tokenize(text)?;
    if tokens
        .last()
        .is_some_and(|token| token.kind == TokenKind::Newline && token.text.is_empty())
    {
        tokens.pop();
    }
    Ok(tokens)
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
