//! Stack safety for the recursive parts of weft.
//!
//! Two independent mechanisms:
//!
//! - [`ensure_sufficient_stack`] grows the native stack on demand so that
//!   deeply nested expressions in macro code cannot overflow it while being
//!   parsed or evaluated.
//! - [`RecursionCounter`] bounds the *logical* call depth of macro code. A
//!   runaway recursive macro should fail with a script-level error long
//!   before it exhausts memory, and the bound is a user setting.
//!
//! ```text
//! fn eval_expr(&mut self, expr: &Expr) -> EvalResult {
//!     ensure_sufficient_stack(|| match expr { ... })
//! }
//!
//! fn call(&mut self, f: &Function) -> EvalResult {
//!     let Some(_frame) = self.depth.enter() else {
//!         return Err(ScriptError::recursion());
//!     };
//!     ...
//! }
//! ```

use std::cell::Cell;

/// Remaining stack below which we switch to a fresh segment (128KB).
const RED_ZONE: usize = 128 * 1024;

/// Size of each new stack segment (2MB).
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, first growing the stack if less than the red zone remains.
///
/// On wasm the stack is managed by the engine and `f` is called directly.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

/// Default logical depth for macro code, matching common scripting hosts.
pub const DEFAULT_RECURSION_LIMIT: usize = 1000;

/// Counts nested frames against a fixed limit.
///
/// Single-threaded: the interpreter owns one counter and hands out guards.
#[derive(Debug)]
pub struct RecursionCounter {
    depth: Cell<usize>,
    limit: usize,
}

impl RecursionCounter {
    pub fn new(limit: usize) -> Self {
        RecursionCounter {
            depth: Cell::new(0),
            limit,
        }
    }

    /// Enter one frame, or `None` if that would exceed the limit.
    ///
    /// The frame is left when the returned guard is dropped.
    #[must_use = "the frame is released as soon as the guard is dropped"]
    pub fn enter(&self) -> Option<DepthGuard<'_>> {
        let depth = self.depth.get();
        if depth >= self.limit {
            return None;
        }
        self.depth.set(depth + 1);
        Some(DepthGuard { counter: self })
    }

    /// Frames currently entered.
    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl Default for RecursionCounter {
    fn default() -> Self {
        RecursionCounter::new(DEFAULT_RECURSION_LIMIT)
    }
}

/// One entered frame of a [`RecursionCounter`].
#[derive(Debug)]
pub struct DepthGuard<'a> {
    counter: &'a RecursionCounter,
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        let depth = self.counter.depth.get();
        self.counter.depth.set(depth.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests;
