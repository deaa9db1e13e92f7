//! weft IR - token types shared by every stage of the macro engine.
//!
//! This crate contains:
//! - [`TokenKind`] and [`Token`], the `(kind, text, offset)` unit every other
//!   crate passes around
//! - [`TokenQuery`], the matcher argument of all stream search operations
//! - [`untokenize`], the single routine that turns tokens back into text
//!
//! # Design Philosophy
//!
//! Tokens compare by kind and text only. The offset is layout information
//! used by the renderer and never participates in equality, so a token
//! synthesized by a macro equals the same token lexed from source.

mod token;

pub use token::{
    must_insert_space, quoted, untokenize, Any, KindMatcher, Renderer, TextMatcher, Token,
    TokenKind, TokenQuery,
};
