//! Calls: dispatch on the callee, argument binding, classes, generators.

use std::rc::Rc;

use weft_parse::ast::Params;
use weft_stack::ensure_sufficient_stack;

use super::{ControlAction, EvalResult, Interpreter};
use crate::environment::{LocalScope, Scope};
use crate::errors::{self, ErrorKind, ScriptError};
use crate::value::{BoundMethod, Class, Dict, Function, FunctionBody, Instance, Value};

impl Interpreter {
    pub(crate) fn call_value(
        &self,
        callee: &Value,
        args: Vec<Value>,
        kwargs: Vec<(String, Value)>,
    ) -> EvalResult {
        match callee {
            Value::Function(function) => self.call_function(function, args, kwargs),
            Value::Builtin(builtin) => self.call_builtin(*builtin, args, kwargs),
            Value::Method(method) => match &**method {
                BoundMethod::User { receiver, function } => {
                    self.call_function(function, with_receiver(receiver, args), kwargs)
                }
                BoundMethod::Native { receiver, name } => {
                    super::methods::call_method(receiver, name, args, kwargs)
                }
                BoundMethod::Builtin { receiver, builtin } => {
                    self.call_builtin(*builtin, with_receiver(receiver, args), kwargs)
                }
            },
            Value::Class(class) => self.call_class(class, args, kwargs),
            Value::Instance(instance) => match instance.class.lookup("__call__") {
                Some(method) => self.call_bound(callee, &method, args, kwargs),
                None => Err(errors::not_callable(&callee.type_name())),
            },
            other => Err(errors::not_callable(&other.type_name())),
        }
    }

    /// Call a class attribute as a method of `receiver`.
    fn call_bound(
        &self,
        receiver: &Value,
        method: &Value,
        args: Vec<Value>,
        kwargs: Vec<(String, Value)>,
    ) -> EvalResult {
        match method {
            Value::Function(function) => {
                self.call_function(function, with_receiver(receiver, args), kwargs)
            }
            Value::Builtin(builtin) if builtin.is_method() => {
                self.call_builtin(*builtin, with_receiver(receiver, args), kwargs)
            }
            other => self.call_value(other, args, kwargs),
        }
    }

    /// Calling a class constructs an instance, except for the macro factory
    /// form: a single engine-built `Code` argument builds the instance with
    /// no arguments and hands the code to the instance's `__call__`.
    fn call_class(
        &self,
        class: &Rc<Class>,
        args: Vec<Value>,
        kwargs: Vec<(String, Value)>,
    ) -> EvalResult {
        if kwargs.is_empty() && matches!(args.as_slice(), [Value::Code(code)] if code.is_engine()) {
            tracing::trace!(class = %class.name, "macro factory call");
            let instance = self.instantiate(class, Vec::new(), Vec::new())?;
            return self.call_value(&instance, args, kwargs);
        }
        self.instantiate(class, args, kwargs)
    }

    pub(crate) fn instantiate(
        &self,
        class: &Rc<Class>,
        args: Vec<Value>,
        kwargs: Vec<(String, Value)>,
    ) -> EvalResult {
        let object = Rc::new(Instance::new(Rc::clone(class)));
        let instance = Value::Instance(Rc::clone(&object));
        match class.lookup("__init__") {
            Some(init) => {
                self.call_bound(&instance, &init, args, kwargs)?;
            }
            None if class.is_subclass_of(&self.exception) => {
                if let Some((keyword, _)) = kwargs.first() {
                    return Err(errors::unexpected_keyword(&class.name, keyword));
                }
                object.attrs.borrow_mut().insert("args".to_owned(), Value::tuple(args));
            }
            None if args.is_empty() && kwargs.is_empty() => {}
            None => {
                return Err(errors::type_error(format!(
                    "{}() takes no arguments",
                    class.name
                )));
            }
        }
        Ok(instance)
    }

    pub(crate) fn call_function(
        &self,
        function: &Rc<Function>,
        args: Vec<Value>,
        kwargs: Vec<(String, Value)>,
    ) -> EvalResult {
        let scope = LocalScope::new(bind_arguments(function, args, kwargs)?);
        let Some(_frame) = self.recursion.enter() else {
            return Err(errors::recursion_limit_exceeded());
        };
        tracing::trace!(function = %function.name, depth = self.recursion.depth(), "call");
        ensure_sufficient_stack(|| self.run_function(function, &scope))
            .map_err(|err| err.unwind(&function.name, function.line))
    }

    fn run_function(&self, function: &Function, scope: &LocalScope<Scope>) -> EvalResult {
        let def = match &function.body {
            FunctionBody::Lambda { body, .. } => return self.eval_expr(body, scope),
            FunctionBody::Block(def) => def,
        };
        if !function.is_generator {
            return match self.exec_block(&def.body, scope) {
                Ok(()) | Err(ControlAction::Break | ControlAction::Continue) => Ok(Value::None),
                Err(ControlAction::Return(value)) => Ok(value),
                Err(ControlAction::Error(err)) => Err(err),
            };
        }
        // Generators run to completion; the call returns what they yielded.
        self.yields.borrow_mut().push(Vec::new());
        let outcome = self.exec_block(&def.body, scope);
        let yielded = self.yields.borrow_mut().pop().unwrap_or_default();
        match outcome {
            Err(ControlAction::Error(err)) => Err(err),
            _ => Ok(Value::list(yielded)),
        }
    }

    /// Append values produced by `yield` to the innermost running generator.
    pub(crate) fn push_yield(&self, values: Vec<Value>) -> Result<(), ScriptError> {
        let mut yields = self.yields.borrow_mut();
        let collector = yields
            .last_mut()
            .ok_or_else(|| errors::syntax_error("'yield' outside function"))?;
        collector.extend(values);
        Ok(())
    }

    /// The error a `raise` statement produces.
    ///
    /// Raising an exception class or instance keeps its kind when the class
    /// is one of the builtin errors (`raise ValueError("bad")`); anything
    /// else becomes a `RuntimeError` carrying the value's text.
    pub(crate) fn raise_value(&self, value: Value) -> Result<ScriptError, ScriptError> {
        let value = match value {
            Value::Class(class) if class.is_subclass_of(&self.exception) => {
                self.instantiate(&class, Vec::new(), Vec::new())?
            }
            other => other,
        };
        let instance = match &value {
            Value::Instance(instance) if instance.class.is_subclass_of(&self.exception) => instance,
            other => return Ok(errors::raised(ErrorKind::Runtime, other.to_str())),
        };
        let kind = exception_kind(&instance.class).unwrap_or(ErrorKind::Runtime);
        let message = match instance.attrs.borrow().get("args") {
            Some(Value::Tuple(args)) => match &**args {
                [] => String::new(),
                [single] => single.to_str(),
                _ => Value::Tuple(Rc::clone(args)).repr(),
            },
            Some(other) => other.to_str(),
            None => String::new(),
        };
        Ok(errors::raised(kind, message))
    }
}

fn with_receiver(receiver: &Value, args: Vec<Value>) -> Vec<Value> {
    let mut full = Vec::with_capacity(args.len() + 1);
    full.push(receiver.clone());
    full.extend(args);
    full
}

/// The builtin error kind a class derives from, searched depth-first.
fn exception_kind(class: &Class) -> Option<ErrorKind> {
    ErrorKind::from_name(&class.name).or_else(|| class.bases.iter().find_map(|base| exception_kind(base)))
}

/// Bind call arguments to a fresh frame scope.
fn bind_arguments(
    function: &Function,
    args: Vec<Value>,
    kwargs: Vec<(String, Value)>,
) -> Result<Scope, ScriptError> {
    let params = function.body.params();
    let name = function.name.as_str();
    let mut scope = Scope::with_parent(function.scope.clone());

    let given = args.len();
    let mut args = args.into_iter();
    for param in &params.positional {
        match args.next() {
            Some(value) => scope.define(param.name.as_str(), value),
            None => break,
        }
    }
    let extra: Vec<Value> = args.collect();
    match &params.vararg {
        Some(vararg) => scope.define(vararg.name.as_str(), Value::tuple(extra)),
        None if !extra.is_empty() => {
            return Err(errors::wrong_arg_count(
                name,
                &positional_range(params, &function.defaults),
                given,
            ));
        }
        None => {}
    }

    let mut extra_kwargs = Dict::new();
    for (keyword, value) in kwargs {
        let known = params
            .positional
            .iter()
            .chain(&params.keyword_only)
            .any(|param| param.name == keyword);
        if known {
            if scope.contains(&keyword) {
                return Err(errors::duplicate_argument(name, &keyword));
            }
            scope.define(keyword, value);
        } else if params.kwarg.is_some() {
            extra_kwargs.insert(Value::from(keyword), value)?;
        } else {
            return Err(errors::unexpected_keyword(name, &keyword));
        }
    }

    let positional = params.positional.iter().zip(&function.defaults);
    let keyword_only = params.keyword_only.iter().zip(&function.kw_defaults);
    for (param, default) in positional.chain(keyword_only) {
        if scope.contains(&param.name) {
            continue;
        }
        match default {
            Some(value) => scope.define(param.name.as_str(), value.clone()),
            None => return Err(errors::missing_argument(name, &param.name)),
        }
    }
    if let Some(kwarg) = &params.kwarg {
        scope.define(kwarg.name.as_str(), Value::dict(extra_kwargs));
    }
    Ok(scope)
}

/// How many positional arguments a function accepts, as error text.
fn positional_range(params: &Params, defaults: &[Option<Value>]) -> String {
    let max = params.positional.len();
    let min = defaults.iter().filter(|default| default.is_none()).count();
    if min == max {
        max.to_string()
    } else {
        format!("from {min} to {max}")
    }
}
