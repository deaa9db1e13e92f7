//! `InterpreterBuilder` for creating `Interpreter` instances.

use std::cell::RefCell;
use std::rc::Rc;

use weft_stack::{RecursionCounter, DEFAULT_RECURSION_LIMIT};

use super::ast_module::ast_module;
use super::builtins::exception_classes;
use super::token_module::token_module;
use super::transformer::node_transformer_class;
use super::Interpreter;
use crate::environment::{LocalScope, Scope};
use crate::print_handler::{stderr_handler, SharedPrintHandler};
use crate::value::{Builtin, Value};

/// Builder for interpreters with non-default output or limits.
pub struct InterpreterBuilder {
    print_handler: Option<SharedPrintHandler>,
    recursion_limit: usize,
}

impl InterpreterBuilder {
    pub fn new() -> Self {
        InterpreterBuilder {
            print_handler: None,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }

    /// Where `print` writes. Default is stderr, so macro output never
    /// mixes with expanded source on stdout.
    #[must_use]
    pub fn print_handler(mut self, handler: SharedPrintHandler) -> Self {
        self.print_handler = Some(handler);
        self
    }

    /// Maximum depth of nested macro-code calls.
    #[must_use]
    pub fn recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    pub fn build(self) -> Interpreter {
        let (exception, errors) = exception_classes();
        let node_transformer = node_transformer_class();
        let builtins = LocalScope::new(Scope::new());
        {
            let mut scope = builtins.borrow_mut();
            for builtin in Builtin::ALL {
                scope.define(builtin.name(), Value::Builtin(builtin));
            }
            for class in std::iter::once(&exception).chain(&errors) {
                scope.define(class.name.as_str(), Value::Class(Rc::clone(class)));
            }
            scope.define(
                node_transformer.name.as_str(),
                Value::Class(Rc::clone(&node_transformer)),
            );
            scope.define("True", Value::Bool(true));
            scope.define("False", Value::Bool(false));
            scope.define("None", Value::None);
        }
        let globals = LocalScope::new(Scope::with_parent(builtins));
        let locals = LocalScope::new(Scope::with_parent(globals.clone()));
        Interpreter {
            globals,
            locals,
            print_handler: self.print_handler.unwrap_or_else(stderr_handler),
            recursion: RecursionCounter::new(self.recursion_limit),
            token_module: token_module(),
            ast_module: ast_module(node_transformer),
            exception,
            yields: RefCell::new(Vec::new()),
        }
    }
}

impl Default for InterpreterBuilder {
    fn default() -> Self {
        InterpreterBuilder::new()
    }
}
