//! Parse context flags.
//!
//! A statement is only legal in some enclosing constructs: `return` and
//! `yield` need a function, `break` and `continue` need a loop. The parser
//! carries the current set of enclosing constructs as flags.

use bitflags::bitflags;

bitflags! {
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct ParseContext: u8 {
        /// Inside a function or lambda body.
        const IN_FUNCTION = 1 << 0;
        /// Inside a `for`/`while` body (not crossing a function boundary).
        const IN_LOOP = 1 << 1;
        /// Directly inside a class body.
        const IN_CLASS = 1 << 2;
    }
}

impl ParseContext {
    /// Context for a function body: loops of the enclosing code do not
    /// extend into it.
    #[must_use]
    pub fn enter_function(self) -> Self {
        (self - ParseContext::IN_LOOP - ParseContext::IN_CLASS) | ParseContext::IN_FUNCTION
    }

    /// Context for a class body, which is neither a function nor a loop.
    pub const fn class_body() -> Self {
        ParseContext::IN_CLASS
    }

    #[must_use]
    pub fn enter_loop(self) -> Self {
        self | ParseContext::IN_LOOP
    }

    #[inline]
    pub fn in_function(self) -> bool {
        self.contains(ParseContext::IN_FUNCTION)
    }

    #[inline]
    pub fn in_loop(self) -> bool {
        self.contains(ParseContext::IN_LOOP)
    }
}

#[cfg(test)]
mod tests;
