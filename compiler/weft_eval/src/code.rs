//! The `Code` value: one fragment of source, viewed as text, tokens or tree.
//!
//! A `Code` starts in whichever representation it was built from and
//! derives the others on first request. Text is the pivot: tokens and
//! trees are always converted through it, never into each other. Every
//! derived view is memoized, and a `Code` never changes after construction.

use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;

use thiserror::Error;
use weft_ir::{untokenize, Token, TokenKind};
use weft_lexer::LexError;
use weft_parse::ast::Module;
use weft_parse::{parse_module_text, unparse, SyntaxError};

use crate::errors::{ErrorKind, ScriptError};
use crate::value::Value;

/// Who built a `Code` value.
///
/// Only the expansion engine creates `Engine` code. Macro classes rely on
/// the distinction: a class called with one engine-built fragment is a
/// decorator application, while a user-built fragment is an ordinary
/// constructor argument.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Origin {
    Engine,
    User,
}

impl Origin {
    pub const fn name(self) -> &'static str {
        match self {
            Origin::Engine => "engine",
            Origin::User => "user",
        }
    }
}

/// A value cannot be viewed as code.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CodeError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error("cannot convert '{type_name}' to code")]
    NotCode { type_name: String },
    #[error("expected a token or a (kind, text) pair, found {repr}")]
    BadToken { repr: String },
}

impl From<CodeError> for ScriptError {
    fn from(err: CodeError) -> Self {
        let kind = match err {
            CodeError::Lex(_) | CodeError::Syntax(_) => ErrorKind::Syntax,
            CodeError::NotCode { .. } | CodeError::BadToken { .. } => ErrorKind::Type,
        };
        ScriptError::new(kind, err.to_string())
    }
}

#[derive(Clone)]
pub struct Code(Rc<CodeInner>);

#[derive(Clone)]
struct CodeInner {
    origin: Origin,
    text: OnceCell<String>,
    tokens: OnceCell<Vec<Token>>,
    tree: OnceCell<Rc<Module>>,
}

impl CodeInner {
    fn empty(origin: Origin) -> Self {
        CodeInner {
            origin,
            text: OnceCell::new(),
            tokens: OnceCell::new(),
            tree: OnceCell::new(),
        }
    }
}

impl Code {
    pub fn from_text(text: impl Into<String>, origin: Origin) -> Self {
        let inner = CodeInner::empty(origin);
        let _ = inner.text.set(text.into());
        Code(Rc::new(inner))
    }

    /// Build from tokens. End markers are dropped; rendering stops at the
    /// first one anyway.
    pub fn from_tokens(tokens: impl IntoIterator<Item = Token>, origin: Origin) -> Self {
        let inner = CodeInner::empty(origin);
        let tokens = tokens
            .into_iter()
            .filter(|token| token.kind != TokenKind::EndMarker)
            .collect();
        let _ = inner.tokens.set(tokens);
        Code(Rc::new(inner))
    }

    pub fn from_tree(tree: impl Into<Rc<Module>>, origin: Origin) -> Self {
        let inner = CodeInner::empty(origin);
        let _ = inner.tree.set(tree.into());
        Code(Rc::new(inner))
    }

    /// View a script value as code.
    ///
    /// Accepts code, strings, tree nodes, and sequences whose items are
    /// tokens or `(kind, text)` pairs. The kind of a pair may be a kind
    /// constant or its name (`'NAME'`).
    pub fn from_value(value: &Value, origin: Origin) -> Result<Code, CodeError> {
        match value {
            Value::Code(code) => Ok(code.with_origin(origin)),
            Value::Str(text) => Ok(Code::from_text(text.as_ref(), origin)),
            Value::Node(node) => Ok(Code::from_tree(node.to_module(), origin)),
            Value::Token(token) => Ok(Code::from_tokens([Token::clone(token)], origin)),
            Value::List(items) => {
                let tokens = items
                    .borrow()
                    .iter()
                    .map(coerce_token)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Code::from_tokens(tokens, origin))
            }
            Value::Tuple(items) => {
                let tokens = items.iter().map(coerce_token).collect::<Result<Vec<_>, _>>()?;
                Ok(Code::from_tokens(tokens, origin))
            }
            other => Err(CodeError::NotCode {
                type_name: other.type_name().into_owned(),
            }),
        }
    }

    /// The same fragment under a different origin.
    #[must_use]
    pub fn with_origin(&self, origin: Origin) -> Code {
        if self.0.origin == origin {
            return self.clone();
        }
        let mut inner = CodeInner::clone(&self.0);
        inner.origin = origin;
        Code(Rc::new(inner))
    }

    #[inline]
    pub fn origin(&self) -> Origin {
        self.0.origin
    }

    #[inline]
    pub fn is_engine(&self) -> bool {
        self.0.origin == Origin::Engine
    }

    pub fn ptr_eq(&self, other: &Code) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Source text. Tokens are rendered, trees are unparsed.
    pub fn text(&self) -> &str {
        self.0.text.get_or_init(|| {
            if let Some(tokens) = self.0.tokens.get() {
                untokenize(tokens)
            } else if let Some(tree) = self.0.tree.get() {
                unparse(tree)
            } else {
                String::new()
            }
        })
    }

    /// Tokens without the end marker, lexed from the text when needed.
    pub fn tokens(&self) -> Result<&[Token], CodeError> {
        if self.0.tokens.get().is_none() {
            let tokens = weft_lexer::tokenize(self.text())?;
            let _ = self.0.tokens.set(tokens);
        }
        Ok(self.0.tokens.get().map_or(&[], Vec::as_slice))
    }

    /// Syntax tree, parsed from the text when needed.
    pub fn tree(&self) -> Result<Rc<Module>, CodeError> {
        if let Some(tree) = self.0.tree.get() {
            return Ok(Rc::clone(tree));
        }
        let tree = Rc::new(parse_module_text(self.text())?);
        let _ = self.0.tree.set(Rc::clone(&tree));
        Ok(tree)
    }
}

impl fmt::Debug for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Code")
            .field("origin", &self.0.origin)
            .field("text", &self.text())
            .finish()
    }
}

fn coerce_token(item: &Value) -> Result<Token, CodeError> {
    let pair = match item {
        Value::Token(token) => return Ok(Token::clone(token)),
        Value::Tuple(items) => items.to_vec(),
        Value::List(items) => items.borrow().clone(),
        _ => Vec::new(),
    };
    let kind = match pair.first() {
        Some(Value::Kind(kind)) => Some(*kind),
        Some(Value::Str(name)) => TokenKind::from_name(name),
        _ => None,
    };
    match (kind, pair.get(1), pair.len()) {
        (Some(kind), Some(Value::Str(text)), 2) => Ok(Token::new(kind, text.as_ref())),
        _ => Err(CodeError::BadToken { repr: item.repr() }),
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
