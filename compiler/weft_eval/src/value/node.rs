//! Syntax tree nodes as script values.
//!
//! `code.tree` hands macro code a read-only view of the parsed fragment.
//! Nodes are shared, so walking a large tree does not copy it.

use std::rc::Rc;

use weft_parse::ast::{Arg, Expr, ExprKind, Module, Stmt, StmtKind};
use weft_parse::{unparse, unparse_expr, unparse_stmt};

use super::Value;

#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Module(Rc<Module>),
    Stmt(Rc<Stmt>),
    Expr(Rc<Expr>),
}

impl Node {
    fn stmt(stmt: &Stmt) -> Value {
        Value::Node(Node::Stmt(Rc::new(stmt.clone())))
    }

    fn expr(expr: &Expr) -> Value {
        Value::Node(Node::Expr(Rc::new(expr.clone())))
    }

    pub(crate) fn from_stmt(stmt: Stmt) -> Value {
        Value::Node(Node::Stmt(Rc::new(stmt)))
    }

    pub(crate) fn from_expr(expr: Expr) -> Value {
        Value::Node(Node::Expr(Rc::new(expr)))
    }

    fn stmts(body: &[Stmt]) -> Value {
        Value::list(body.iter().map(Node::stmt).collect())
    }

    fn exprs<'a>(exprs: impl IntoIterator<Item = &'a Expr>) -> Value {
        Value::list(exprs.into_iter().map(Node::expr).collect())
    }

    /// Node name such as `FunctionDef` or `BinOp`.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Module(_) => "Module",
            Node::Stmt(stmt) => stmt.kind.name(),
            Node::Expr(expr) => expr.kind.name(),
        }
    }

    /// The older per-type name of a constant: `Num`, `Str` or `NameConstant`.
    pub fn legacy_kind(&self) -> Option<&'static str> {
        let Node::Expr(expr) = self else {
            return None;
        };
        match expr.kind {
            ExprKind::Int(_) | ExprKind::Float(_) => Some("Num"),
            ExprKind::Str(_) => Some("Str"),
            ExprKind::Bool(_) | ExprKind::None => Some("NameConstant"),
            _ => None,
        }
    }

    /// 1-based line; 1 for modules.
    pub fn line(&self) -> usize {
        match self {
            Node::Module(_) => 1,
            Node::Stmt(stmt) => stmt.line,
            Node::Expr(expr) => expr.line,
        }
    }

    pub fn unparse(&self) -> String {
        match self {
            Node::Module(module) => unparse(module),
            Node::Stmt(stmt) => unparse_stmt(stmt),
            Node::Expr(expr) => unparse_expr(expr),
        }
    }

    /// The module this node stands for; statements and expressions become
    /// single-statement modules.
    pub fn to_module(&self) -> Module {
        match self {
            Node::Module(module) => Module::clone(module),
            Node::Stmt(stmt) => Module {
                body: vec![Stmt::clone(stmt)],
            },
            Node::Expr(expr) => Module {
                body: vec![Stmt::new(StmtKind::Expr(Expr::clone(expr)), expr.line)],
            },
        }
    }

    /// Attribute lookup. `None` when the node has no such field.
    pub fn attr(&self, name: &str) -> Option<Value> {
        match name {
            "kind" => return Some(Value::string(self.kind())),
            "line" | "lineno" => return i64::try_from(self.line()).ok().map(Value::Int),
            _ => {}
        }
        match self {
            Node::Module(module) => (name == "body").then(|| Node::stmts(&module.body)),
            Node::Stmt(stmt) => stmt_attr(stmt, name),
            Node::Expr(expr) => expr_attr(expr, name),
        }
    }
}

fn stmt_attr(stmt: &Stmt, name: &str) -> Option<Value> {
    let value = match (&stmt.kind, name) {
        (StmtKind::FunctionDef(def), "name") => Value::string(def.name.as_str()),
        (StmtKind::FunctionDef(def), "body") => Node::stmts(&def.body),
        (StmtKind::FunctionDef(def), "decorators" | "decorator_list") => {
            Node::exprs(&def.decorators)
        }
        (StmtKind::FunctionDef(def), "args") => {
            let params = &def.params;
            Value::list(
                params
                    .positional
                    .iter()
                    .chain(&params.vararg)
                    .chain(&params.keyword_only)
                    .chain(&params.kwarg)
                    .map(|param| Value::string(param.name.as_str()))
                    .collect(),
            )
        }
        (StmtKind::ClassDef(def), "name") => Value::string(def.name.as_str()),
        (StmtKind::ClassDef(def), "body") => Node::stmts(&def.body),
        (StmtKind::ClassDef(def), "bases") => Node::exprs(&def.bases),
        (StmtKind::ClassDef(def), "decorators" | "decorator_list") => Node::exprs(&def.decorators),
        (
            StmtKind::If { body, .. } | StmtKind::For { body, .. } | StmtKind::While { body, .. },
            "body",
        ) => Node::stmts(body),
        (
            StmtKind::If { orelse, .. }
            | StmtKind::For { orelse, .. }
            | StmtKind::While { orelse, .. },
            "orelse",
        ) => Node::stmts(orelse),
        (StmtKind::If { test, .. } | StmtKind::While { test, .. }, "test") => Node::expr(test),
        (StmtKind::For { target, .. }, "target") => Node::expr(target),
        (StmtKind::For { iter, .. }, "iter") => Node::expr(iter),
        (StmtKind::Expr(value) | StmtKind::Assign { value, .. }, "value") => Node::expr(value),
        (StmtKind::Assign { targets, .. }, "targets") => Node::exprs(targets),
        (StmtKind::AugAssign { target, .. } | StmtKind::AnnAssign { target, .. }, "target") => {
            Node::expr(target)
        }
        (StmtKind::AugAssign { value, .. }, "value") => Node::expr(value),
        (StmtKind::AnnAssign { value, .. }, "value") | (StmtKind::Return(value), "value") => {
            value.as_ref().map_or(Value::None, Node::expr)
        }
        _ => return None,
    };
    Some(value)
}

fn expr_attr(expr: &Expr, name: &str) -> Option<Value> {
    let value = match (&expr.kind, name) {
        (ExprKind::Name(id), "id") => Value::string(id.as_str()),
        (ExprKind::Int(n), "value" | "n") => Value::Int(*n),
        (ExprKind::Float(f), "value" | "n") => Value::Float(*f),
        (ExprKind::Str(s), "value" | "s") => Value::string(s.as_str()),
        (ExprKind::Bool(b), "value") => Value::Bool(*b),
        (ExprKind::None, "value") => Value::None,
        (ExprKind::Attribute { value, .. } | ExprKind::Subscript { value, .. }, "value") => {
            Node::expr(value)
        }
        (ExprKind::Attribute { attr, .. }, "attr") => Value::string(attr.as_str()),
        (ExprKind::Subscript { index, .. }, "slice" | "index") => Node::expr(index),
        (ExprKind::Call { func, .. }, "func") => Node::expr(func),
        (ExprKind::Call { args, .. }, "args") => Node::exprs(args.iter().filter_map(|arg| match arg {
            Arg::Positional(value) | Arg::Star(value) => Some(value),
            Arg::Keyword(..) | Arg::DoubleStar(_) => None,
        })),
        (ExprKind::Binary { left, .. } | ExprKind::BoolOp { left, .. }, "left") => Node::expr(left),
        (ExprKind::Binary { right, .. } | ExprKind::BoolOp { right, .. }, "right") => {
            Node::expr(right)
        }
        (ExprKind::Binary { op, .. }, "op") => Value::string(op.as_symbol()),
        (ExprKind::Unary { operand, .. }, "operand") => Node::expr(operand),
        (ExprKind::Unary { op, .. }, "op") => Value::string(op.as_symbol()),
        (ExprKind::Tuple(items) | ExprKind::List(items), "elts") => Node::exprs(items),
        _ => return None,
    };
    Some(value)
}
