//! Decorator chains.
//!
//! A chain is scanned speculatively: only when every line is a well-formed
//! decorator and a `def`/`class` header follows does the scan commit.
//! Anything else (`@` as matrix multiplication, a stray operator) rewinds
//! and the tokens are processed one by one.
//!
//! Decorators bound in the macro environment are applied at expansion time,
//! innermost first, each receiving the previous result as code. The rest
//! are written back to the output unchanged.

use smallvec::SmallVec;
use weft_eval::{Code, Namespace, Origin, Value};
use weft_ir::{Token, TokenKind, TokenQuery};
use weft_parse::parse_expression;
use weft_stream::{ParseError, TokenStream};

use super::{fragment_text, MacroProcessor};
use crate::materialize::materialize;
use crate::ExpandError;

/// One `@name(args)` line.
pub(super) struct Decorator {
    at: Token,
    /// The dotted name: `name`, `.`, `name`, ...
    name: SmallVec<[Token; 3]>,
    /// Balanced argument list, empty when absent.
    args: Vec<Token>,
    /// The rest of the line and any blank or comment lines after it, as
    /// written.
    trailer: Vec<Token>,
}

impl Decorator {
    /// `@macro` marks the decorated definition as a macro.
    fn is_marker(&self) -> bool {
        self.simple_name() == Some("macro")
    }

    fn simple_name(&self) -> Option<&str> {
        match self.name.as_slice() {
            [name] => Some(&name.text),
            _ => None,
        }
    }

    /// The callee expression: the name with its arguments, if any.
    fn callee(&self) -> Vec<Token> {
        self.name.iter().chain(&self.args).cloned().collect()
    }

    /// The decorator as it appeared in the source, comments included.
    fn line(&self) -> impl Iterator<Item = Token> + '_ {
        std::iter::once(self.at.clone())
            .chain(self.callee())
            .chain(self.trailer.iter().cloned())
    }
}

pub(super) struct DecoratorChain {
    decorators: Vec<Decorator>,
    /// The header was written `macro def` or `macro class`.
    macro_header: bool,
}

fn is_definition_keyword(token: &Token) -> bool {
    token.is_name("def") || token.is_name("class")
}

/// Scan decorator lines and the definition header they decorate.
///
/// On success the view has consumed the decorators (and a `macro` keyword
/// in front of the header), leaving it at `def`/`class`.
pub(super) fn scan_chain<I: Iterator<Item = Token>>(
    view: &mut TokenStream<I>,
) -> Result<Option<DecoratorChain>, ParseError> {
    let name_query = TokenQuery::kind(TokenKind::Name);
    let mut decorators = Vec::new();
    while let Some(at) = view.consume_if(&TokenQuery::op("@")) {
        let mut name = SmallVec::new();
        loop {
            let Some(part) = view.consume_if(&name_query) else {
                return Ok(None);
            };
            name.push(part);
            match view.consume_if(&TokenQuery::op(".")) {
                Some(dot) => name.push(dot),
                None => break,
            }
        }
        view.revert();
        let has_args = view.peek().is_op("(");
        view.revert();
        let args = if has_args {
            view.consume_balanced(&TokenQuery::op("("), &TokenQuery::op(")"))?
        } else {
            Vec::new()
        };
        let mut trailer: Vec<Token> = view
            .consume_if(&TokenQuery::kind(TokenKind::Comment))
            .into_iter()
            .collect();
        let Some(newline) = view.consume_if(&TokenQuery::kind(TokenKind::Newline)) else {
            return Ok(None);
        };
        trailer.push(newline);
        trailer.extend(view.consume_while(&TokenQuery::kind([TokenKind::Nl, TokenKind::Comment])));
        decorators.push(Decorator {
            at,
            name,
            args,
            trailer,
        });
    }
    if decorators.is_empty() {
        return Ok(None);
    }

    view.revert();
    let ahead = view.peek_n(2);
    view.revert();
    let [header, second] = ahead.as_slice() else {
        return Ok(None);
    };
    if is_definition_keyword(header) {
        return Ok(Some(DecoratorChain { decorators, macro_header: false }));
    }
    if !header.is_name("macro") {
        return Ok(None);
    }
    if !is_definition_keyword(second) {
        view.peek_n(2);
        return Err(view.error("expected `def` or `class` after decorated `macro`"));
    }
    view.advance();
    Ok(Some(DecoratorChain { decorators, macro_header: true }))
}

impl<I: Iterator<Item = Token>> MacroProcessor<I> {
    /// Expand a scanned chain and the definition it decorates.
    #[tracing::instrument(level = "debug", skip_all, fields(line = self.stream.lineno()))]
    pub(super) fn apply_chain(&mut self, chain: DecoratorChain) -> Result<(), ExpandError> {
        let is_macro = chain.macro_header || chain.decorators.iter().any(Decorator::is_marker);
        let (macros, ordinary): (Vec<_>, Vec<_>) = chain
            .decorators
            .into_iter()
            .filter(|decorator| !decorator.is_marker())
            .partition(|decorator| {
                decorator
                    .simple_name()
                    .is_some_and(|name| self.interpreter.is_bound(name))
            });
        tracing::debug!(
            is_macro,
            macros = macros.len(),
            ordinary = ordinary.len(),
            "decorator chain"
        );

        if is_macro {
            let block = self.stream.consume_block()?;
            let mut definition: Vec<Token> = ordinary.iter().flat_map(Decorator::line).collect();
            definition.extend(self.apply_macros(&macros, block)?);
            return self.define(&definition);
        }

        for decorator in &ordinary {
            self.pending.extend(decorator.line());
        }
        if macros.is_empty() {
            // The definition itself is processed token by token.
            return Ok(());
        }
        let block = self.stream.consume_block()?;
        let rewritten = self.apply_macros(&macros, block)?;
        let rewritten = self.substitute_constants(rewritten)?;
        self.pending.extend(rewritten);
        self.pending.push_back(Token::newline());
        Ok(())
    }

    /// Pass `block` through `macros`, last (innermost) first.
    fn apply_macros(&self, macros: &[Decorator], mut block: Vec<Token>) -> Result<Vec<Token>, ExpandError> {
        // The header may follow `macro` on its line.
        if let Some(first) = block.first_mut() {
            first.offset = None;
        }
        if macros.is_empty() {
            return Ok(block);
        }
        let mut code = Code::from_tokens(block, Origin::Engine);
        for decorator in macros.iter().rev() {
            let expr = parse_expression(&fragment_text(&decorator.callee()))?;
            let callee = self.interpreter.eval(&expr, Namespace::Locals)?;
            tracing::trace!(decorator = decorator.simple_name().unwrap_or_default(), "applying macro");
            code = match self.interpreter.call(&callee, vec![Value::Code(code)])? {
                Value::Code(code) => code.with_origin(Origin::Engine),
                other => Code::from_tokens(materialize(&other)?, Origin::Engine),
            };
        }
        Ok(code.tokens()?.to_vec())
    }
}
