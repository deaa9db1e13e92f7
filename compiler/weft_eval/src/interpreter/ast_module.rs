//! The `ast` module: node constructors and operators for tree rewriting.
//!
//! Constructors take their fields positionally or by name, as in
//! `ast.BinOp(left=node, op=ast.Add(), right=ast.Constant(1))`. Operators
//! are represented by their symbols, the same way `node.op` reports them.

use std::rc::Rc;

use rustc_hash::FxHashMap;
use weft_parse::ast::{Arg, BinaryOp, Expr, ExprKind, Stmt, StmtKind, UnaryOp};

use super::builtins::{arity, Keywords};
use super::EvalResult;
use crate::errors::{self, ScriptError};
use crate::value::{Builtin, Class, ModuleValue, Node, NodeCtor, OperatorNode, Value};

pub(super) fn ast_module(node_transformer: Rc<Class>) -> Rc<ModuleValue> {
    let mut attrs: FxHashMap<String, Value> = NodeCtor::ALL
        .into_iter()
        .map(|ctor| (ctor.name().to_owned(), Value::Builtin(Builtin::Node(ctor))))
        .collect();
    attrs.extend(
        OperatorNode::all().map(|op| (op.name().to_owned(), Value::Builtin(Builtin::Operator(op)))),
    );
    attrs.insert("NodeTransformer".to_owned(), Value::Class(node_transformer));
    attrs.insert("unparse".to_owned(), Value::Builtin(Builtin::Unparse));
    Rc::new(ModuleValue {
        name: "ast".to_owned(),
        attrs,
    })
}

/// Build the node `ctor` names from call arguments.
pub(super) fn construct(ctor: NodeCtor, args: Vec<Value>, keywords: &mut Keywords<'_>) -> EvalResult {
    let name = ctor.name();
    let fields = ctor.fields();
    arity(name, &args, 0, fields.len())?;
    let mut args = args.into_iter();
    let mut values = Vec::with_capacity(fields.len());
    for field in fields {
        let value = match args.next().or_else(|| keywords.take(field)) {
            Some(value) => value,
            None if ctor == NodeCtor::Return => Value::None,
            None => return Err(errors::missing_argument(name, field)),
        };
        values.push(value);
    }
    let line = values.iter().find_map(node_line).unwrap_or(1);

    let kind = match ctor {
        NodeCtor::Constant => return Ok(Node::from_expr(constant(&values[0], line)?)),
        NodeCtor::Name => ExprKind::Name(text(name, &values[0])?.to_owned()),
        NodeCtor::BinOp => ExprKind::Binary {
            left: Box::new(to_expr(&values[0], line)?),
            op: binary_op(&values[1])?,
            right: Box::new(to_expr(&values[2], line)?),
        },
        NodeCtor::UnaryOp => ExprKind::Unary {
            op: unary_op(&values[0])?,
            operand: Box::new(to_expr(&values[1], line)?),
        },
        NodeCtor::Call => ExprKind::Call {
            func: Box::new(to_expr(&values[0], line)?),
            args: to_exprs(&values[1], line)?.into_iter().map(Arg::Positional).collect(),
        },
        NodeCtor::Attribute => ExprKind::Attribute {
            value: Box::new(to_expr(&values[0], line)?),
            attr: text(name, &values[1])?.to_owned(),
        },
        NodeCtor::Subscript => ExprKind::Subscript {
            value: Box::new(to_expr(&values[0], line)?),
            index: Box::new(to_expr(&values[1], line)?),
        },
        NodeCtor::Tuple => ExprKind::Tuple(to_exprs(&values[0], line)?),
        NodeCtor::List => ExprKind::List(to_exprs(&values[0], line)?),
        NodeCtor::Expr => return statement(StmtKind::Expr(to_expr(&values[0], line)?), line),
        NodeCtor::Return => {
            let value = match &values[0] {
                Value::None => None,
                value => Some(to_expr(value, line)?),
            };
            return statement(StmtKind::Return(value), line);
        }
        NodeCtor::Assign => {
            let targets = to_exprs(&values[0], line)?;
            if let Some(target) = targets.iter().find(|target| !target.kind.is_target()) {
                return Err(errors::type_error(format!(
                    "cannot assign to {}",
                    target.kind.name()
                )));
            }
            return statement(
                StmtKind::Assign {
                    targets,
                    value: to_expr(&values[1], line)?,
                },
                line,
            );
        }
        NodeCtor::Pass => return statement(StmtKind::Pass, line),
    };
    Ok(Node::from_expr(Expr::new(kind, line)))
}

/// An expression for a node or a plain constant.
pub(super) fn to_expr(value: &Value, line: usize) -> Result<Expr, ScriptError> {
    match value {
        Value::Node(Node::Expr(expr)) => Ok(Expr::clone(expr)),
        other => constant(other, line),
    }
}

fn to_exprs(value: &Value, line: usize) -> Result<Vec<Expr>, ScriptError> {
    value.iterate()?.iter().map(|item| to_expr(item, line)).collect()
}

fn constant(value: &Value, line: usize) -> Result<Expr, ScriptError> {
    let kind = match value {
        Value::Int(n) => ExprKind::Int(*n),
        Value::Float(f) => ExprKind::Float(*f),
        Value::Str(s) => ExprKind::Str(s.to_string()),
        Value::Bool(b) => ExprKind::Bool(*b),
        Value::None => ExprKind::None,
        Value::Ellipsis => ExprKind::Ellipsis,
        other => {
            return Err(errors::type_error(format!(
                "expected an expression node or constant, not '{}'",
                other.type_name()
            )));
        }
    };
    Ok(Expr::new(kind, line))
}

fn statement(kind: StmtKind, line: usize) -> EvalResult {
    Ok(Node::from_stmt(Stmt::new(kind, line)))
}

fn node_line(value: &Value) -> Option<usize> {
    match value {
        Value::Node(node) => Some(node.line()),
        _ => None,
    }
}

fn text<'v>(function: &str, value: &'v Value) -> Result<&'v str, ScriptError> {
    value
        .as_str()
        .ok_or_else(|| errors::type_error(format!("{function}() expects str, not '{}'", value.type_name())))
}

fn binary_op(value: &Value) -> Result<BinaryOp, ScriptError> {
    value
        .as_str()
        .and_then(BinaryOp::from_symbol)
        .ok_or_else(|| errors::type_error(format!("expected a binary operator, not {}", value.repr())))
}

fn unary_op(value: &Value) -> Result<UnaryOp, ScriptError> {
    value
        .as_str()
        .and_then(UnaryOp::from_symbol)
        .ok_or_else(|| errors::type_error(format!("expected a unary operator, not {}", value.repr())))
}
