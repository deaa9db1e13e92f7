//! Statement execution.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use weft_parse::ast::{Alias, BinaryOp, ClassDef, Expr, ExprKind, FunctionDef, Stmt, StmtKind};

use super::attrs::{get_attr, set_attr};
use super::{ControlAction, EvalResult, ExecResult, Interpreter};
use crate::environment::{closure_scope, LocalScope, Scope};
use crate::errors::{self, ErrorKind, ScriptError};
use crate::operators::{evaluate_binary, set_subscript, subscript};
use crate::value::{Class, Function, FunctionBody, ModuleValue, Value};

impl Interpreter {
    pub(crate) fn exec_block(&self, body: &[Stmt], scope: &LocalScope<Scope>) -> ExecResult {
        for stmt in body {
            self.exec_stmt(stmt, scope)?;
        }
        Ok(())
    }

    fn exec_stmt(&self, stmt: &Stmt, scope: &LocalScope<Scope>) -> ExecResult {
        self.exec_stmt_kind(stmt, scope).map_err(|action| match action {
            ControlAction::Error(err) => ControlAction::Error(err.at_line(stmt.line)),
            other => other,
        })
    }

    fn exec_stmt_kind(&self, stmt: &Stmt, scope: &LocalScope<Scope>) -> ExecResult {
        match &stmt.kind {
            StmtKind::Expr(expr) => {
                self.eval_expr(expr, scope)?;
            }
            StmtKind::Assign { targets, value } => {
                let value = self.eval_expr(value, scope)?;
                for target in targets {
                    self.assign(target, value.clone(), scope)?;
                }
            }
            StmtKind::AugAssign { target, op, value } => {
                self.exec_aug_assign(target, *op, value, scope)?;
            }
            StmtKind::AnnAssign { target, value, .. } => {
                if let Some(value) = value {
                    let value = self.eval_expr(value, scope)?;
                    self.assign(target, value, scope)?;
                }
            }
            StmtKind::FunctionDef(def) => {
                let function = self.define_function(def, stmt.line, scope)?;
                let function = self.apply_decorators(&def.decorators, function, scope)?;
                scope.borrow_mut().define(def.name.as_str(), function);
            }
            StmtKind::ClassDef(def) => {
                let class = self.define_class(def, scope)?;
                let class = self.apply_decorators(&def.decorators, class, scope)?;
                scope.borrow_mut().define(def.name.as_str(), class);
            }
            StmtKind::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval_expr(expr, scope)?,
                    None => Value::None,
                };
                return Err(ControlAction::Return(value));
            }
            StmtKind::If { test, body, orelse } => {
                let branch = if self.eval_expr(test, scope)?.is_truthy() {
                    body
                } else {
                    orelse
                };
                return self.exec_block(branch, scope);
            }
            StmtKind::For {
                target,
                iter,
                body,
                orelse,
            } => {
                for item in self.eval_expr(iter, scope)?.iterate()? {
                    self.assign(target, item, scope)?;
                    match self.exec_block(body, scope) {
                        Ok(()) | Err(ControlAction::Continue) => {}
                        Err(ControlAction::Break) => return Ok(()),
                        Err(other) => return Err(other),
                    }
                }
                return self.exec_block(orelse, scope);
            }
            StmtKind::While { test, body, orelse } => {
                while self.eval_expr(test, scope)?.is_truthy() {
                    match self.exec_block(body, scope) {
                        Ok(()) | Err(ControlAction::Continue) => {}
                        Err(ControlAction::Break) => return Ok(()),
                        Err(other) => return Err(other),
                    }
                }
                return self.exec_block(orelse, scope);
            }
            StmtKind::Break => return Err(ControlAction::Break),
            StmtKind::Continue => return Err(ControlAction::Continue),
            StmtKind::Pass | StmtKind::Global(_) | StmtKind::Nonlocal(_) => {}
            StmtKind::Import(aliases) => self.exec_import(aliases, scope)?,
            StmtKind::ImportFrom { module, names } => {
                self.exec_import_from(module, names, scope)?;
            }
            StmtKind::Assert { test, msg } => {
                if !self.eval_expr(test, scope)?.is_truthy() {
                    let message = match msg {
                        Some(msg) => self.eval_expr(msg, scope)?.to_str(),
                        None => String::new(),
                    };
                    return Err(errors::assertion_failed(message).into());
                }
            }
            StmtKind::Raise(value) => {
                let err = match value {
                    Some(expr) => {
                        let value = self.eval_expr(expr, scope)?;
                        self.raise_value(value)?
                    }
                    None => errors::raised(
                        ErrorKind::Runtime,
                        "No active exception to reraise".to_owned(),
                    ),
                };
                return Err(err.into());
            }
        }
        Ok(())
    }

    fn define_function(
        &self,
        def: &Rc<FunctionDef>,
        line: usize,
        scope: &LocalScope<Scope>,
    ) -> EvalResult {
        let (defaults, kw_defaults) = self.eval_defaults(&def.params, scope)?;
        Ok(Value::Function(Rc::new(Function {
            name: def.name.clone(),
            body: FunctionBody::Block(Rc::clone(def)),
            defaults,
            kw_defaults,
            scope: closure_scope(scope),
            is_generator: def.is_generator,
            line,
        })))
    }

    fn define_class(&self, def: &ClassDef, scope: &LocalScope<Scope>) -> Result<Value, ControlAction> {
        let mut bases = Vec::with_capacity(def.bases.len());
        for base in &def.bases {
            match self.eval_expr(base, scope)? {
                Value::Class(class) => bases.push(class),
                other => {
                    return Err(errors::type_error(format!(
                        "cannot inherit from '{}'",
                        other.type_name()
                    ))
                    .into());
                }
            }
        }
        let body = LocalScope::new(Scope::class_body(scope.clone()));
        self.exec_block(&def.body, &body)?;
        let attrs: FxHashMap<String, Value> = body
            .borrow()
            .bindings()
            .map(|(name, value)| (name.to_owned(), value.clone()))
            .collect();
        Ok(Value::Class(Rc::new(Class {
            name: def.name.clone(),
            bases,
            attrs: RefCell::new(attrs),
        })))
    }

    /// Apply decorators bottom-up: the one written last wraps first.
    fn apply_decorators(
        &self,
        decorators: &[Expr],
        value: Value,
        scope: &LocalScope<Scope>,
    ) -> EvalResult {
        decorators.iter().rev().try_fold(value, |value, decorator| {
            let decorator = self.eval_expr(decorator, scope)?;
            self.call_value(&decorator, vec![value], Vec::new())
        })
    }

    fn exec_aug_assign(
        &self,
        target: &Expr,
        op: BinaryOp,
        value: &Expr,
        scope: &LocalScope<Scope>,
    ) -> Result<(), ScriptError> {
        match &target.kind {
            ExprKind::Name(name) => {
                let current = scope
                    .borrow()
                    .lookup(name)
                    .ok_or_else(|| errors::undefined_name(name))?;
                let rhs = self.eval_expr(value, scope)?;
                let result = augmented(&current, op, &rhs)?;
                scope.borrow_mut().define(name.as_str(), result);
            }
            ExprKind::Attribute {
                value: object,
                attr,
            } => {
                let object = self.eval_expr(object, scope)?;
                let current = get_attr(&object, attr)?;
                let rhs = self.eval_expr(value, scope)?;
                let result = augmented(&current, op, &rhs)?;
                set_attr(&object, attr, result)?;
            }
            ExprKind::Subscript {
                value: container,
                index,
            } => {
                let container = self.eval_expr(container, scope)?;
                let index = self.eval_expr(index, scope)?;
                let current = subscript(&container, &index)?;
                let rhs = self.eval_expr(value, scope)?;
                let result = augmented(&current, op, &rhs)?;
                set_subscript(&container, &index, result)?;
            }
            _ => {
                return Err(errors::syntax_error(
                    "illegal expression for augmented assignment",
                ));
            }
        }
        Ok(())
    }

    fn import_module(&self, name: &str) -> Result<Rc<ModuleValue>, ScriptError> {
        match name {
            "token" | "tokenize" => Ok(Rc::clone(&self.token_module)),
            "ast" => Ok(Rc::clone(&self.ast_module)),
            _ => Err(errors::import_error(name)),
        }
    }

    fn exec_import(&self, aliases: &[Alias], scope: &LocalScope<Scope>) -> Result<(), ScriptError> {
        for alias in aliases {
            let module = self.import_module(&alias.name)?;
            tracing::debug!(module = %alias.name, "macro import");
            let binding = alias.asname.as_deref().unwrap_or(&alias.name);
            scope.borrow_mut().define(binding, Value::Module(module));
        }
        Ok(())
    }

    fn exec_import_from(
        &self,
        module: &str,
        names: &[Alias],
        scope: &LocalScope<Scope>,
    ) -> Result<(), ScriptError> {
        let source = self.import_module(module)?;
        tracing::debug!(module, names = names.len(), "macro import");
        let mut scope = scope.borrow_mut();
        for alias in names {
            if alias.name == "*" {
                for (name, value) in &source.attrs {
                    scope.define(name.as_str(), value.clone());
                }
                continue;
            }
            let value = source
                .attrs
                .get(&alias.name)
                .cloned()
                .ok_or_else(|| errors::cannot_import_name(&alias.name, module))?;
            scope.define(alias.asname.as_deref().unwrap_or(&alias.name), value);
        }
        Ok(())
    }
}

/// `current op= rhs`. Lists are extended in place so aliases see the change.
fn augmented(current: &Value, op: BinaryOp, rhs: &Value) -> Result<Value, ScriptError> {
    if let (Value::List(items), BinaryOp::Add) = (current, op) {
        let extra = rhs.iterate()?;
        items.borrow_mut().extend(extra);
        return Ok(current.clone());
    }
    evaluate_binary(current, op, rhs)
}
