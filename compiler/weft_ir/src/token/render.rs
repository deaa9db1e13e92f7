//! Token sequence to source text.

use std::borrow::Borrow;

use super::{Token, TokenKind};

/// Incremental token renderer.
///
/// Tracks an indentation stack from `Indent`/`Dedent` tokens and writes the
/// current indentation at the start of every non-empty line. An `Indent`
/// that is not deeper than the current level is taken as relative to it,
/// which lets a fragment lexed on its own (indentation starting from zero)
/// be spliced into a block and still nest correctly.
#[derive(Debug, Default)]
pub struct Renderer {
    out: String,
    indents: Vec<usize>,
    last: Option<Token>,
    done: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer::default()
    }

    /// Start rendering as if `last` had just been written.
    pub fn after(last: Option<&Token>) -> Self {
        Renderer {
            last: last.cloned(),
            ..Renderer::default()
        }
    }

    /// Render one token. Returns `false` once the end marker was seen; later
    /// tokens are ignored.
    pub fn push(&mut self, token: &Token) -> bool {
        if self.done {
            return false;
        }
        match token.kind {
            TokenKind::EndMarker => {
                self.done = true;
                return false;
            }
            TokenKind::Indent => {
                let width = token.text.chars().count();
                let current = self.indents.last().copied().unwrap_or(0);
                self.indents
                    .push(if width <= current { current + width } else { width });
                return true;
            }
            TokenKind::Dedent => {
                self.indents.pop();
                return true;
            }
            kind => {
                let at_line_start = match &self.last {
                    None => true,
                    Some(last) => last.kind.is_line_break(),
                };
                if at_line_start && !kind.is_line_break() {
                    if let Some(&width) = self.indents.last() {
                        self.out.extend(std::iter::repeat(' ').take(width));
                    }
                }
            }
        }
        token.render_into(&mut self.out, self.last.as_ref());
        self.last = Some(token.clone());
        true
    }

    /// The last token written.
    pub fn last(&self) -> Option<&Token> {
        self.last.as_ref()
    }

    pub fn finish(self) -> String {
        self.out
    }
}

/// Render a token sequence back into source text.
///
/// Stops at the first `EndMarker`.
pub fn untokenize<T: Borrow<Token>>(tokens: impl IntoIterator<Item = T>) -> String {
    let mut renderer = Renderer::new();
    for token in tokens {
        if !renderer.push(token.borrow()) {
            break;
        }
    }
    renderer.finish()
}
