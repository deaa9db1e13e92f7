//! Expansion settings.

use weft_eval::{Interpreter, InterpreterBuilder, PrintTarget, SharedPrintHandler};
use weft_stack::DEFAULT_RECURSION_LIMIT;

/// Settings for one expansion, built like the interpreter it configures.
///
/// ```text
/// ExpandOptions::new().recursion_limit(200).print_target(PrintTarget::Silent)
/// ```
#[derive(Clone)]
pub struct ExpandOptions {
    recursion_limit: usize,
    print_handler: SharedPrintHandler,
    lookahead: Option<usize>,
}

impl ExpandOptions {
    pub fn new() -> Self {
        ExpandOptions {
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            print_handler: PrintTarget::default().handler(),
            lookahead: None,
        }
    }

    /// Maximum call depth of macro code.
    #[must_use]
    pub fn recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    /// Where macro `print` output goes.
    #[must_use]
    pub fn print_target(mut self, target: PrintTarget) -> Self {
        self.print_handler = target.handler();
        self
    }

    #[must_use]
    pub fn print_handler(mut self, handler: SharedPrintHandler) -> Self {
        self.print_handler = handler;
        self
    }

    /// Bound on the token stream's lookahead buffer. Unbounded by default;
    /// a bound smaller than the longest macro block evicts tokens a
    /// speculative scan may still need.
    #[must_use]
    pub fn lookahead(mut self, capacity: usize) -> Self {
        self.lookahead = Some(capacity);
        self
    }

    pub fn lookahead_capacity(&self) -> Option<usize> {
        self.lookahead
    }

    /// A fresh interpreter for one source unit.
    pub(crate) fn interpreter(&self) -> Interpreter {
        InterpreterBuilder::new()
            .print_handler(self.print_handler.clone())
            .recursion_limit(self.recursion_limit)
            .build()
    }
}

impl Default for ExpandOptions {
    fn default() -> Self {
        ExpandOptions::new()
    }
}
