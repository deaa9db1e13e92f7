//! `NodeTransformer`: the base class for macros that rewrite syntax trees.
//!
//! A subclass defines `visit_<Kind>` methods. Visiting a node calls the
//! method for its kind (constants also answer to `visit_Num`, `visit_Str`
//! and `visit_NameConstant`), or `generic_visit` when there is none, which
//! visits every child and rebuilds the node from the results. Calling a
//! transformer on code visits its tree and returns the rewritten code.
//!
//! What a statement visitor returns decides what replaces the statement:
//!
//! | Returned value     | Replacement                        |
//! |--------------------|------------------------------------|
//! | `None`             | nothing; the statement is removed  |
//! | statement node     | that statement                     |
//! | expression node    | an expression statement            |
//! | list of nodes      | each node in order                 |
//!
//! An expression visitor must return an expression node or a constant.

use std::cell::RefCell;
use std::rc::Rc;

use weft_parse::ast::{Expr, Module, Stmt, StmtKind};
use weft_parse::fold::{fold_expr_children, fold_module_children, fold_stmt_children, Fold};

use super::ast_module::to_expr;
use super::attrs::get_attr;
use super::{EvalResult, Interpreter};
use crate::code::{Code, Origin};
use crate::errors::{self, ScriptError};
use crate::value::{Builtin, Class, Node, Value};

pub(super) fn node_transformer_class() -> Rc<Class> {
    let attrs = [Builtin::Visit, Builtin::GenericVisit, Builtin::Transform]
        .into_iter()
        .map(|builtin| (builtin.name().to_owned(), Value::Builtin(builtin)))
        .collect();
    Rc::new(Class {
        name: "NodeTransformer".to_owned(),
        bases: Vec::new(),
        attrs: RefCell::new(attrs),
    })
}

impl Interpreter {
    /// `transformer.visit(node)`
    pub(super) fn visit(&self, transformer: &Value, node: Value) -> EvalResult {
        let Value::Node(tree) = &node else {
            return Ok(node);
        };
        let visitor = std::iter::once(tree.kind())
            .chain(tree.legacy_kind())
            .find_map(|kind| get_attr(transformer, &format!("visit_{kind}")).ok());
        let visitor = match visitor {
            Some(visitor) => visitor,
            None => get_attr(transformer, "generic_visit")?,
        };
        tracing::trace!(kind = tree.kind(), "visit");
        self.call_value(&visitor, vec![node], Vec::new())
    }

    /// `transformer.generic_visit(node)`
    pub(super) fn generic_visit(&self, transformer: &Value, node: &Node) -> EvalResult {
        let mut children = Children {
            interpreter: self,
            transformer,
        };
        let rebuilt = match node {
            Node::Module(module) => {
                Node::Module(Rc::new(fold_module_children(&mut children, Module::clone(module))?))
            }
            Node::Stmt(stmt) => {
                Node::Stmt(Rc::new(fold_stmt_children(&mut children, Stmt::clone(stmt))?))
            }
            Node::Expr(expr) => {
                Node::Expr(Rc::new(fold_expr_children(&mut children, Expr::clone(expr))?))
            }
        };
        Ok(Value::Node(rebuilt))
    }

    /// `transformer(code)`
    pub(super) fn transform(&self, transformer: &Value, code: &Value) -> EvalResult {
        let tree = match code {
            Value::Code(code) => code.tree()?,
            Value::Node(node) => Rc::new(node.to_module()),
            other => {
                return Err(errors::type_error(format!(
                    "a transformer expects Code, not '{}'",
                    other.type_name()
                )));
            }
        };
        let result = self.call_value(
            &get_attr(transformer, "visit")?,
            vec![Value::Node(Node::Module(tree))],
            Vec::new(),
        )?;
        Ok(Value::Code(Code::from_value(&result, Origin::User)?))
    }
}

/// Hands each child of a node to the transformer's `visit`.
struct Children<'a> {
    interpreter: &'a Interpreter,
    transformer: &'a Value,
}

impl Children<'_> {
    fn visit(&self, node: Node) -> EvalResult {
        let visit = get_attr(self.transformer, "visit")?;
        self.interpreter.call_value(&visit, vec![Value::Node(node)], Vec::new())
    }
}

impl Fold for Children<'_> {
    type Error = ScriptError;

    fn fold_expr(&mut self, expr: Expr) -> Result<Expr, ScriptError> {
        let line = expr.line;
        match self.visit(Node::Expr(Rc::new(expr)))? {
            Value::Node(Node::Expr(expr)) => Ok(Rc::unwrap_or_clone(expr)),
            Value::Node(other) => Err(errors::type_error(format!(
                "expected an expression node, not {}",
                other.kind()
            ))),
            other => to_expr(&other, line),
        }
    }

    fn fold_stmt(&mut self, stmt: Stmt) -> Result<Vec<Stmt>, ScriptError> {
        let result = self.visit(Node::Stmt(Rc::new(stmt)))?;
        let items = match result {
            Value::None => return Ok(Vec::new()),
            nodes @ (Value::List(_) | Value::Tuple(_)) => nodes.iterate()?,
            single => vec![single],
        };
        items.into_iter().map(statement).collect()
    }
}

fn statement(value: Value) -> Result<Stmt, ScriptError> {
    match value {
        Value::Node(Node::Stmt(stmt)) => Ok(Rc::unwrap_or_clone(stmt)),
        Value::Node(Node::Expr(expr)) => {
            let line = expr.line;
            Ok(Stmt::new(StmtKind::Expr(Rc::unwrap_or_clone(expr)), line))
        }
        Value::Node(Node::Module(_)) => Err(errors::type_error(
            "expected a statement node, not Module",
        )),
        other => Err(errors::type_error(format!(
            "expected a statement node, not '{}'",
            other.type_name()
        ))),
    }
}
