//! Transactional token streams.
//!
//! - [`PeekableStream`]: a generic cursor with lookahead, commit/revert and
//!   rollback views that share one buffer.
//! - [`TokenStream`]: the token specialization with structured scans
//!   (`consume_until`, `consume_balanced`, `consume_block`, ...) and
//!   caret-style error context.
//!
//! # Cursor model
//!
//! Every stream or view has two absolute positions into the shared buffer:
//!
//! ```text
//!   consumed         peeked            not yet pulled
//! [ a  b  c ] [ d  e  f ] [ g  h  ...  (upstream iterator)
//!             ^committed  ^lookahead
//! ```
//!
//! `peek` moves `lookahead`, `commit` moves `committed` up to it, `revert`
//! moves `lookahead` back. A view starts at its parent's `committed`
//! position and only touches the parent when committed upstream.

mod error;
mod peekable;
mod token_stream;

pub use error::ParseError;
pub use peekable::PeekableStream;
pub use token_stream::TokenStream;
