//! Expression evaluation and assignment to targets.

use std::rc::Rc;

use weft_parse::ast::{
    Arg, BoolOp, Expr, ExprKind, FStringPart, Generator, Param, Params, UnaryOp,
};
use weft_parse::parse_expression;
use weft_stack::ensure_sufficient_stack;

use super::attrs::{get_attr, set_attr};
use super::methods::render_template;
use super::{EvalResult, Interpreter};
use crate::code::CodeError;
use crate::environment::{closure_scope, LocalScope, Scope};
use crate::errors::{self, ScriptError};
use crate::format::{convert, format_value};
use crate::operators::{
    evaluate_binary, evaluate_comparison, evaluate_unary, set_subscript, slice, subscript,
};
use crate::value::{Dict, Function, FunctionBody, Value};

type Defaults = Vec<Option<Value>>;

impl Interpreter {
    pub(crate) fn eval_expr(&self, expr: &Expr, scope: &LocalScope<Scope>) -> EvalResult {
        ensure_sufficient_stack(|| self.eval_expr_inner(expr, scope))
    }

    fn eval_expr_inner(&self, expr: &Expr, scope: &LocalScope<Scope>) -> EvalResult {
        match &expr.kind {
            ExprKind::Name(name) => scope
                .borrow()
                .lookup(name)
                .ok_or_else(|| errors::undefined_name(name)),
            ExprKind::Int(n) => Ok(Value::Int(*n)),
            ExprKind::Float(f) => Ok(Value::Float(*f)),
            ExprKind::Str(s) => Ok(Value::string(s.as_str())),
            ExprKind::FString(parts) => self.eval_fstring(parts, scope),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::None => Ok(Value::None),
            ExprKind::Ellipsis => Ok(Value::Ellipsis),
            ExprKind::Tuple(items) => Ok(Value::tuple(self.eval_items(items, scope)?)),
            ExprKind::List(items) => Ok(Value::list(self.eval_items(items, scope)?)),
            ExprKind::Dict(pairs) => {
                let mut dict = Dict::new();
                for (key, value) in pairs {
                    let key = self.eval_expr(key, scope)?;
                    let value = self.eval_expr(value, scope)?;
                    dict.insert(key, value)?;
                }
                Ok(Value::dict(dict))
            }
            ExprKind::Attribute { value, attr } => get_attr(&self.eval_expr(value, scope)?, attr),
            ExprKind::Subscript { value, index } => {
                let container = self.eval_expr(value, scope)?;
                if let ExprKind::Slice { lower, upper, step } = &index.kind {
                    let lower = self.eval_bound(lower.as_deref(), scope)?;
                    let upper = self.eval_bound(upper.as_deref(), scope)?;
                    let step = self.eval_bound(step.as_deref(), scope)?;
                    return slice(&container, lower, upper, step);
                }
                subscript(&container, &self.eval_expr(index, scope)?)
            }
            ExprKind::Slice { .. } => Err(errors::syntax_error("slice outside of a subscript")),
            ExprKind::Call { func, args } => {
                let callee = self.eval_expr(func, scope)?;
                let (args, kwargs) = self.eval_args(args, scope)?;
                self.call_value(&callee, args, kwargs)
            }
            ExprKind::Unary {
                op: UnaryOp::Not,
                operand,
            } => Ok(Value::Bool(!self.eval_expr(operand, scope)?.is_truthy())),
            ExprKind::Unary { op, operand } => evaluate_unary(*op, &self.eval_expr(operand, scope)?),
            ExprKind::Binary { left, op, right } => {
                let left = self.eval_expr(left, scope)?;
                let right = self.eval_expr(right, scope)?;
                evaluate_binary(&left, *op, &right)
            }
            ExprKind::BoolOp { left, op, right } => {
                let left = self.eval_expr(left, scope)?;
                let decided = match op {
                    BoolOp::And => !left.is_truthy(),
                    BoolOp::Or => left.is_truthy(),
                };
                if decided {
                    Ok(left)
                } else {
                    self.eval_expr(right, scope)
                }
            }
            ExprKind::Compare { left, ops } => {
                let mut current = self.eval_expr(left, scope)?;
                for (op, right) in ops {
                    let right = self.eval_expr(right, scope)?;
                    if !evaluate_comparison(&current, *op, &right)? {
                        return Ok(Value::Bool(false));
                    }
                    current = right;
                }
                Ok(Value::Bool(true))
            }
            ExprKind::IfExp { test, body, orelse } => {
                if self.eval_expr(test, scope)?.is_truthy() {
                    self.eval_expr(body, scope)
                } else {
                    self.eval_expr(orelse, scope)
                }
            }
            ExprKind::Lambda { params, body } => {
                let (defaults, kw_defaults) = self.eval_defaults(params, scope)?;
                Ok(Value::Function(Rc::new(Function {
                    name: "<lambda>".to_owned(),
                    body: FunctionBody::Lambda {
                        params: Rc::clone(params),
                        body: Rc::clone(body),
                    },
                    defaults,
                    kw_defaults,
                    scope: closure_scope(scope),
                    is_generator: false,
                    line: expr.line,
                })))
            }
            ExprKind::Comprehension {
                element,
                generators,
                ..
            } => {
                let inner = LocalScope::new(Scope::with_parent(scope.clone()));
                let mut out = Vec::new();
                self.eval_comprehension(element, generators, &inner, &mut out)?;
                Ok(Value::list(out))
            }
            ExprKind::Yield(value) => {
                let value = match value {
                    Some(value) => self.eval_expr(value, scope)?,
                    None => Value::None,
                };
                self.push_yield(vec![value])?;
                Ok(Value::None)
            }
            ExprKind::YieldFrom(value) => {
                self.push_yield(self.eval_expr(value, scope)?.iterate()?)?;
                Ok(Value::None)
            }
            ExprKind::Starred(_) => Err(errors::syntax_error("can't use starred expression here")),
        }
    }

    /// Display items; `*iterable` items are spliced in.
    fn eval_items(&self, items: &[Expr], scope: &LocalScope<Scope>) -> Result<Vec<Value>, ScriptError> {
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            if let ExprKind::Starred(inner) = &item.kind {
                out.extend(self.eval_expr(inner, scope)?.iterate()?);
            } else {
                out.push(self.eval_expr(item, scope)?);
            }
        }
        Ok(out)
    }

    fn eval_args(
        &self,
        args: &[Arg],
        scope: &LocalScope<Scope>,
    ) -> Result<(Vec<Value>, Vec<(String, Value)>), ScriptError> {
        let mut positional = Vec::with_capacity(args.len());
        let mut keywords = Vec::new();
        for arg in args {
            match arg {
                Arg::Positional(expr) => positional.push(self.eval_expr(expr, scope)?),
                Arg::Star(expr) => positional.extend(self.eval_expr(expr, scope)?.iterate()?),
                Arg::Keyword(name, expr) => keywords.push((name.clone(), self.eval_expr(expr, scope)?)),
                Arg::DoubleStar(expr) => {
                    let mapping = self.eval_expr(expr, scope)?;
                    let Value::Dict(dict) = &mapping else {
                        return Err(errors::type_error(format!(
                            "argument after ** must be a mapping, not '{}'",
                            mapping.type_name()
                        )));
                    };
                    for (key, value) in dict.borrow().iter() {
                        let Value::Str(key) = key else {
                            return Err(errors::type_error("keywords must be strings"));
                        };
                        keywords.push((key.to_string(), value.clone()));
                    }
                }
            }
        }
        Ok((positional, keywords))
    }

    fn eval_bound(
        &self,
        bound: Option<&Expr>,
        scope: &LocalScope<Scope>,
    ) -> Result<Option<i64>, ScriptError> {
        let Some(bound) = bound else {
            return Ok(None);
        };
        match self.eval_expr(bound, scope)? {
            Value::None => Ok(None),
            value => value
                .as_int()
                .map(Some)
                .ok_or_else(|| errors::type_error("slice indices must be integers or None")),
        }
    }

    /// Default values of a parameter list, evaluated once at definition.
    pub(crate) fn eval_defaults(
        &self,
        params: &Params,
        scope: &LocalScope<Scope>,
    ) -> Result<(Defaults, Defaults), ScriptError> {
        let eval_default = |param: &Param| {
            param
                .default
                .as_ref()
                .map(|default| self.eval_expr(default, scope))
                .transpose()
        };
        let defaults = params.positional.iter().map(eval_default).collect::<Result<_, _>>()?;
        let kw_defaults = params.keyword_only.iter().map(eval_default).collect::<Result<_, _>>()?;
        Ok((defaults, kw_defaults))
    }

    fn eval_comprehension(
        &self,
        element: &Expr,
        generators: &[Generator],
        scope: &LocalScope<Scope>,
        out: &mut Vec<Value>,
    ) -> Result<(), ScriptError> {
        let Some((first, rest)) = generators.split_first() else {
            out.push(self.eval_expr(element, scope)?);
            return Ok(());
        };
        'items: for item in self.eval_expr(&first.iter, scope)?.iterate()? {
            self.assign(&first.target, item, scope)?;
            for condition in &first.ifs {
                if !self.eval_expr(condition, scope)?.is_truthy() {
                    continue 'items;
                }
            }
            self.eval_comprehension(element, rest, scope, out)?;
        }
        Ok(())
    }

    fn eval_fstring(&self, parts: &[FStringPart], scope: &LocalScope<Scope>) -> EvalResult {
        let mut out = String::new();
        for part in parts {
            match part {
                FStringPart::Literal(text) => out.push_str(text),
                FStringPart::Field {
                    value,
                    conversion,
                    spec,
                } => {
                    let value = convert(&self.eval_expr(value, scope)?, *conversion);
                    let spec = match spec {
                        // `f"{x:>{width}}"`: the format spec has nested fields.
                        Some(spec) if spec.contains('{') => {
                            render_template(spec, &mut |source| self.eval_source(source, scope))?
                        }
                        Some(spec) => spec.clone(),
                        None => String::new(),
                    };
                    out.push_str(&format_value(&value, &spec)?);
                }
            }
        }
        Ok(Value::string(out))
    }

    fn eval_source(&self, source: &str, scope: &LocalScope<Scope>) -> EvalResult {
        let expr = parse_expression(source).map_err(CodeError::from)?;
        self.eval_expr(&expr, scope)
    }

    /// Bind `value` to an assignment target.
    pub(crate) fn assign(
        &self,
        target: &Expr,
        value: Value,
        scope: &LocalScope<Scope>,
    ) -> Result<(), ScriptError> {
        match &target.kind {
            ExprKind::Name(name) => {
                scope.borrow_mut().define(name.as_str(), value);
                Ok(())
            }
            ExprKind::Tuple(targets) | ExprKind::List(targets) => self.unpack(targets, value, scope),
            ExprKind::Attribute {
                value: object,
                attr,
            } => set_attr(&self.eval_expr(object, scope)?, attr, value),
            ExprKind::Subscript {
                value: container,
                index,
            } => {
                if matches!(index.kind, ExprKind::Slice { .. }) {
                    return Err(errors::type_error("slice assignment is not supported"));
                }
                let container = self.eval_expr(container, scope)?;
                let index = self.eval_expr(index, scope)?;
                set_subscript(&container, &index, value)
            }
            other => Err(errors::syntax_error(format!(
                "cannot assign to {}",
                other.name()
            ))),
        }
    }

    /// `a, *rest, z = value`
    fn unpack(
        &self,
        targets: &[Expr],
        value: Value,
        scope: &LocalScope<Scope>,
    ) -> Result<(), ScriptError> {
        let mut items = value.iterate()?;
        let star = targets
            .iter()
            .position(|target| matches!(target.kind, ExprKind::Starred(_)));
        let Some(star) = star else {
            if items.len() != targets.len() {
                return Err(errors::unpack_mismatch(targets.len(), items.len()));
            }
            for (target, item) in targets.iter().zip(items) {
                self.assign(target, item, scope)?;
            }
            return Ok(());
        };

        let fixed = targets.len() - 1;
        if items.len() < fixed {
            return Err(errors::unpack_mismatch(fixed, items.len()));
        }
        let tail = items.split_off(items.len() - (fixed - star));
        let middle = items.split_off(star);
        for (target, item) in targets[..star].iter().zip(items) {
            self.assign(target, item, scope)?;
        }
        if let ExprKind::Starred(inner) = &targets[star].kind {
            self.assign(inner, Value::list(middle), scope)?;
        }
        for (target, item) in targets[star + 1..].iter().zip(tail) {
            self.assign(target, item, scope)?;
        }
        Ok(())
    }
}
