//! Tree-walking interpreter for macro code.
//!
//! One `Interpreter` lives for the expansion of one source unit. It owns
//! the scope chain `builtins ← globals ← locals`: macro imports run against
//! `globals`, constant bindings and macro definitions against `locals`.
//! Function calls push a fresh scope whose parent is the scope the
//! function was defined in.
//!
//! Evaluation is split the way the work splits:
//!
//! - `exec` - statements and control flow
//! - `eval` - expressions, assignment targets, f-strings
//! - `call` - calls, argument binding, classes, generators
//! - `attrs` - attribute access on every value type
//! - `builtins` - builtin functions
//! - `methods` - methods of `str`, `list` and `dict`
//! - `token_module` - the importable `token` module
//! - `ast_module` - the importable `ast` module
//! - `transformer` - the `NodeTransformer` base class

mod ast_module;
mod attrs;
mod builder;
mod builtins;
mod call;
mod eval;
mod exec;
mod methods;
mod token_module;
mod transformer;

pub use builder::InterpreterBuilder;

use std::cell::RefCell;
use std::rc::Rc;

use weft_parse::ast::{Expr, Module};
use weft_stack::RecursionCounter;

use crate::environment::{LocalScope, Scope};
use crate::errors::ScriptError;
use crate::print_handler::SharedPrintHandler;
use crate::value::{Class, ModuleValue, Value};

/// Result of evaluating an expression.
pub type EvalResult = Result<Value, ScriptError>;

/// Name of the outermost traceback frame.
const TOP_LEVEL_FRAME: &str = "<macro>";

/// Which of the two macro namespaces a statement runs in.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Namespace {
    /// Macro imports; visible to all later macro code.
    Globals,
    /// Macro constants and definitions; candidates for substitution.
    Locals,
}

/// Non-local exit from a statement.
#[derive(Debug)]
pub(crate) enum ControlAction {
    Break,
    Continue,
    Return(Value),
    Error(ScriptError),
}

impl From<ScriptError> for ControlAction {
    #[inline]
    fn from(err: ScriptError) -> Self {
        ControlAction::Error(err)
    }
}

pub(crate) type ExecResult = Result<(), ControlAction>;

pub struct Interpreter {
    globals: LocalScope<Scope>,
    locals: LocalScope<Scope>,
    print_handler: SharedPrintHandler,
    recursion: RecursionCounter,
    token_module: Rc<ModuleValue>,
    ast_module: Rc<ModuleValue>,
    /// Root of the builtin exception classes.
    exception: Rc<Class>,
    /// One collector per running generator body, innermost last.
    yields: RefCell<Vec<Vec<Value>>>,
}

impl Interpreter {
    /// An interpreter with default settings: stderr output and the default
    /// recursion limit.
    pub fn new() -> Self {
        InterpreterBuilder::new().build()
    }

    fn scope(&self, namespace: Namespace) -> &LocalScope<Scope> {
        match namespace {
            Namespace::Globals => &self.globals,
            Namespace::Locals => &self.locals,
        }
    }

    /// Run a module's statements against one namespace.
    pub fn exec(&self, module: &Module, namespace: Namespace) -> Result<(), ScriptError> {
        tracing::trace!(?namespace, statements = module.body.len(), "exec");
        let scope = self.scope(namespace);
        match self.exec_block(&module.body, scope) {
            Ok(()) | Err(ControlAction::Break | ControlAction::Continue | ControlAction::Return(_)) => {
                Ok(())
            }
            Err(ControlAction::Error(err)) => {
                let line = module.body.first().map_or(1, |stmt| stmt.line);
                Err(err.unwind(TOP_LEVEL_FRAME, line))
            }
        }
    }

    /// Evaluate one expression with the names of `namespace` in view.
    pub fn eval(&self, expr: &Expr, namespace: Namespace) -> EvalResult {
        self.eval_expr(expr, self.scope(namespace))
            .map_err(|err| err.at_line(expr.line).unwind(TOP_LEVEL_FRAME, expr.line))
    }

    /// Call a script value with positional arguments.
    pub fn call(&self, callee: &Value, args: Vec<Value>) -> EvalResult {
        self.call_value(callee, args, Vec::new())
    }

    /// Resolve `name` from the locals outward.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.locals.borrow().lookup(name)
    }

    /// Whether `name` was bound by macro code, in the locals or the
    /// globals. Builtins do not count.
    pub fn is_bound(&self, name: &str) -> bool {
        self.locals.borrow().contains(name) || self.globals.borrow().contains(name)
    }

    /// Whether `name` is bound directly in the locals.
    pub fn is_local(&self, name: &str) -> bool {
        self.locals.borrow().contains(name)
    }

    pub fn define(&self, namespace: Namespace, name: impl Into<String>, value: Value) {
        self.scope(namespace).borrow_mut().define(name, value);
    }

    /// Names bound in `namespace`, sorted.
    pub fn names(&self, namespace: Namespace) -> Vec<String> {
        self.scope(namespace).borrow().names()
    }

    pub fn print_handler(&self) -> &SharedPrintHandler {
        &self.print_handler
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Interpreter::new()
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
