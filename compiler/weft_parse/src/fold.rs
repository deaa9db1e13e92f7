//! Rebuilding syntax trees one level at a time.
//!
//! A [`Fold`] decides what replaces each direct child of a node; the
//! `fold_*_children` functions rebuild the node from those replacements.
//! Recursion is up to the folder: calling back into `fold_*_children` from
//! `fold_expr`/`fold_stmt` walks the whole tree.

use std::rc::Rc;

use crate::ast::{
    Arg, ClassDef, Expr, ExprKind, FStringPart, FunctionDef, Generator, Module, Param, Params,
    Stmt, StmtKind,
};

pub trait Fold {
    type Error;

    /// The replacement for one expression.
    fn fold_expr(&mut self, expr: Expr) -> Result<Expr, Self::Error>;

    /// The replacements for one statement of a body. Empty removes it.
    fn fold_stmt(&mut self, stmt: Stmt) -> Result<Vec<Stmt>, Self::Error>;
}

pub fn fold_module_children<F: Fold + ?Sized>(
    folder: &mut F,
    module: Module,
) -> Result<Module, F::Error> {
    Ok(Module {
        body: fold_body(folder, module.body)?,
    })
}

pub fn fold_stmt_children<F: Fold + ?Sized>(folder: &mut F, stmt: Stmt) -> Result<Stmt, F::Error> {
    let kind = match stmt.kind {
        StmtKind::Expr(value) => StmtKind::Expr(folder.fold_expr(value)?),
        StmtKind::Assign { targets, value } => StmtKind::Assign {
            targets: fold_exprs(folder, targets)?,
            value: folder.fold_expr(value)?,
        },
        StmtKind::AugAssign { target, op, value } => StmtKind::AugAssign {
            target: folder.fold_expr(target)?,
            op,
            value: folder.fold_expr(value)?,
        },
        StmtKind::AnnAssign {
            target,
            annotation,
            value,
        } => StmtKind::AnnAssign {
            target: folder.fold_expr(target)?,
            annotation: folder.fold_expr(annotation)?,
            value: fold_opt(folder, value)?,
        },
        StmtKind::FunctionDef(def) => {
            let FunctionDef {
                name,
                params,
                returns,
                body,
                decorators,
                is_generator,
            } = Rc::unwrap_or_clone(def);
            StmtKind::FunctionDef(Rc::new(FunctionDef {
                name,
                decorators: fold_exprs(folder, decorators)?,
                params: fold_params(folder, params)?,
                returns: fold_opt(folder, returns)?,
                body: fold_body(folder, body)?,
                is_generator,
            }))
        }
        StmtKind::ClassDef(def) => {
            let ClassDef {
                name,
                bases,
                body,
                decorators,
            } = Rc::unwrap_or_clone(def);
            StmtKind::ClassDef(Rc::new(ClassDef {
                name,
                decorators: fold_exprs(folder, decorators)?,
                bases: fold_exprs(folder, bases)?,
                body: fold_body(folder, body)?,
            }))
        }
        StmtKind::Return(value) => StmtKind::Return(fold_opt(folder, value)?),
        StmtKind::If { test, body, orelse } => StmtKind::If {
            test: folder.fold_expr(test)?,
            body: fold_body(folder, body)?,
            orelse: fold_body(folder, orelse)?,
        },
        StmtKind::For {
            target,
            iter,
            body,
            orelse,
        } => StmtKind::For {
            target: folder.fold_expr(target)?,
            iter: folder.fold_expr(iter)?,
            body: fold_body(folder, body)?,
            orelse: fold_body(folder, orelse)?,
        },
        StmtKind::While { test, body, orelse } => StmtKind::While {
            test: folder.fold_expr(test)?,
            body: fold_body(folder, body)?,
            orelse: fold_body(folder, orelse)?,
        },
        StmtKind::Assert { test, msg } => StmtKind::Assert {
            test: folder.fold_expr(test)?,
            msg: fold_opt(folder, msg)?,
        },
        StmtKind::Raise(value) => StmtKind::Raise(fold_opt(folder, value)?),
        leaf @ (StmtKind::Break
        | StmtKind::Continue
        | StmtKind::Pass
        | StmtKind::Import(_)
        | StmtKind::ImportFrom { .. }
        | StmtKind::Global(_)
        | StmtKind::Nonlocal(_)) => leaf,
    };
    Ok(Stmt::new(kind, stmt.line))
}

pub fn fold_expr_children<F: Fold + ?Sized>(folder: &mut F, expr: Expr) -> Result<Expr, F::Error> {
    let kind = match expr.kind {
        ExprKind::FString(parts) => ExprKind::FString(
            parts
                .into_iter()
                .map(|part| -> Result<_, F::Error> {
                    Ok(match part {
                        FStringPart::Field {
                            value,
                            conversion,
                            spec,
                        } => FStringPart::Field {
                            value: folder.fold_expr(value)?,
                            conversion,
                            spec,
                        },
                        literal @ FStringPart::Literal(_) => literal,
                    })
                })
                .collect::<Result<_, _>>()?,
        ),
        ExprKind::Tuple(items) => ExprKind::Tuple(fold_exprs(folder, items)?),
        ExprKind::List(items) => ExprKind::List(fold_exprs(folder, items)?),
        ExprKind::Dict(entries) => ExprKind::Dict(
            entries
                .into_iter()
                .map(|(key, value)| -> Result<_, F::Error> {
                    Ok((folder.fold_expr(key)?, folder.fold_expr(value)?))
                })
                .collect::<Result<_, _>>()?,
        ),
        ExprKind::Attribute { value, attr } => ExprKind::Attribute {
            value: fold_box(folder, value)?,
            attr,
        },
        ExprKind::Subscript { value, index } => ExprKind::Subscript {
            value: fold_box(folder, value)?,
            index: fold_box(folder, index)?,
        },
        ExprKind::Slice { lower, upper, step } => ExprKind::Slice {
            lower: fold_opt_box(folder, lower)?,
            upper: fold_opt_box(folder, upper)?,
            step: fold_opt_box(folder, step)?,
        },
        ExprKind::Call { func, args } => ExprKind::Call {
            func: fold_box(folder, func)?,
            args: args
                .into_iter()
                .map(|arg| -> Result<_, F::Error> {
                    Ok(match arg {
                        Arg::Positional(value) => Arg::Positional(folder.fold_expr(value)?),
                        Arg::Keyword(name, value) => Arg::Keyword(name, folder.fold_expr(value)?),
                        Arg::Star(value) => Arg::Star(folder.fold_expr(value)?),
                        Arg::DoubleStar(value) => Arg::DoubleStar(folder.fold_expr(value)?),
                    })
                })
                .collect::<Result<_, _>>()?,
        },
        ExprKind::Unary { op, operand } => ExprKind::Unary {
            op,
            operand: fold_box(folder, operand)?,
        },
        ExprKind::Binary { left, op, right } => ExprKind::Binary {
            left: fold_box(folder, left)?,
            op,
            right: fold_box(folder, right)?,
        },
        ExprKind::BoolOp { left, op, right } => ExprKind::BoolOp {
            left: fold_box(folder, left)?,
            op,
            right: fold_box(folder, right)?,
        },
        ExprKind::Compare { left, ops } => ExprKind::Compare {
            left: fold_box(folder, left)?,
            ops: ops
                .into_iter()
                .map(|(op, operand)| -> Result<_, F::Error> { Ok((op, folder.fold_expr(operand)?)) })
                .collect::<Result<_, _>>()?,
        },
        ExprKind::IfExp { test, body, orelse } => ExprKind::IfExp {
            test: fold_box(folder, test)?,
            body: fold_box(folder, body)?,
            orelse: fold_box(folder, orelse)?,
        },
        ExprKind::Lambda { params, body } => ExprKind::Lambda {
            params: Rc::new(fold_params(folder, Rc::unwrap_or_clone(params))?),
            body: Rc::new(folder.fold_expr(Rc::unwrap_or_clone(body))?),
        },
        ExprKind::Comprehension {
            kind,
            element,
            generators,
        } => ExprKind::Comprehension {
            kind,
            element: fold_box(folder, element)?,
            generators: generators
                .into_iter()
                .map(|generator| -> Result<_, F::Error> {
                    Ok(Generator {
                        target: folder.fold_expr(generator.target)?,
                        iter: folder.fold_expr(generator.iter)?,
                        ifs: fold_exprs(folder, generator.ifs)?,
                    })
                })
                .collect::<Result<_, _>>()?,
        },
        ExprKind::Yield(value) => ExprKind::Yield(fold_opt_box(folder, value)?),
        ExprKind::YieldFrom(value) => ExprKind::YieldFrom(fold_box(folder, value)?),
        ExprKind::Starred(value) => ExprKind::Starred(fold_box(folder, value)?),
        leaf @ (ExprKind::Name(_)
        | ExprKind::Int(_)
        | ExprKind::Float(_)
        | ExprKind::Str(_)
        | ExprKind::Bool(_)
        | ExprKind::None
        | ExprKind::Ellipsis) => leaf,
    };
    Ok(Expr::new(kind, expr.line))
}

fn fold_body<F: Fold + ?Sized>(folder: &mut F, body: Vec<Stmt>) -> Result<Vec<Stmt>, F::Error> {
    let mut folded = Vec::with_capacity(body.len());
    for stmt in body {
        folded.extend(folder.fold_stmt(stmt)?);
    }
    Ok(folded)
}

fn fold_exprs<F: Fold + ?Sized>(folder: &mut F, exprs: Vec<Expr>) -> Result<Vec<Expr>, F::Error> {
    exprs.into_iter().map(|expr| folder.fold_expr(expr)).collect()
}

fn fold_opt<F: Fold + ?Sized>(folder: &mut F, expr: Option<Expr>) -> Result<Option<Expr>, F::Error> {
    expr.map(|expr| folder.fold_expr(expr)).transpose()
}

fn fold_box<F: Fold + ?Sized>(folder: &mut F, expr: Box<Expr>) -> Result<Box<Expr>, F::Error> {
    Ok(Box::new(folder.fold_expr(*expr)?))
}

fn fold_opt_box<F: Fold + ?Sized>(
    folder: &mut F,
    expr: Option<Box<Expr>>,
) -> Result<Option<Box<Expr>>, F::Error> {
    expr.map(|expr| fold_box(folder, expr)).transpose()
}

fn fold_params<F: Fold + ?Sized>(folder: &mut F, params: Params) -> Result<Params, F::Error> {
    let mut fold_param = |param: Param| -> Result<Param, F::Error> {
        Ok(Param {
            name: param.name,
            annotation: fold_opt(folder, param.annotation)?,
            default: fold_opt(folder, param.default)?,
        })
    };
    Ok(Params {
        positional: params
            .positional
            .into_iter()
            .map(&mut fold_param)
            .collect::<Result<_, _>>()?,
        vararg: params.vararg.map(&mut fold_param).transpose()?,
        keyword_only: params
            .keyword_only
            .into_iter()
            .map(&mut fold_param)
            .collect::<Result<_, _>>()?,
        kwarg: params.kwarg.map(&mut fold_param).transpose()?,
    })
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
