//! Attribute access.

use std::rc::Rc;

use weft_ir::Token;

use super::methods::has_method;
use super::EvalResult;
use crate::code::Code;
use crate::errors::{self, ScriptError};
use crate::value::{BoundMethod, Instance, Node, Value};

/// `value.name`
pub(crate) fn get_attr(value: &Value, name: &str) -> EvalResult {
    let found = match value {
        Value::Instance(instance) => instance_attr(value, instance, name),
        Value::Class(class) => match name {
            "__name__" => Some(Value::string(class.name.as_str())),
            "__bases__" => Some(Value::tuple(
                class.bases.iter().cloned().map(Value::Class).collect::<Vec<_>>(),
            )),
            _ => class.lookup(name),
        },
        Value::Module(module) => match name {
            "__name__" => Some(Value::string(module.name.as_str())),
            _ => module.attrs.get(name).cloned(),
        },
        Value::Function(function) => (name == "__name__").then(|| Value::string(function.name.as_str())),
        Value::Builtin(builtin) => (name == "__name__").then(|| Value::string(builtin.name())),
        Value::Code(code) => code_attr(code, name)?,
        Value::Token(token) => token_attr(token, name),
        Value::Kind(kind) => (name == "name").then(|| Value::string(kind.name())),
        Value::Node(node) => node.attr(name),
        _ => None,
    };
    match found {
        Some(found) => Ok(found),
        None if has_method(value, name) => Ok(Value::Method(Rc::new(BoundMethod::Native {
            receiver: value.clone(),
            name: name.to_owned(),
        }))),
        None => Err(errors::no_attribute(&value.type_name(), name)),
    }
}

/// `target.name = value`
pub(crate) fn set_attr(target: &Value, name: &str, value: Value) -> Result<(), ScriptError> {
    match target {
        Value::Instance(instance) => {
            instance.attrs.borrow_mut().insert(name.to_owned(), value);
            Ok(())
        }
        Value::Class(class) => {
            class.attrs.borrow_mut().insert(name.to_owned(), value);
            Ok(())
        }
        Value::Code(_) | Value::Token(_) | Value::Node(_) | Value::Module(_) => {
            Err(errors::read_only_attribute(&target.type_name(), name))
        }
        other => Err(errors::no_attribute(&other.type_name(), name)),
    }
}

/// Instance attributes shadow class attributes; functions and method
/// builtins found on the class come back bound to the instance.
fn instance_attr(value: &Value, instance: &Instance, name: &str) -> Option<Value> {
    if let Some(found) = instance.attrs.borrow().get(name) {
        return Some(found.clone());
    }
    if name == "__class__" {
        return Some(Value::Class(Rc::clone(&instance.class)));
    }
    Some(match instance.class.lookup(name)? {
        Value::Function(function) => Value::Method(Rc::new(BoundMethod::User {
            receiver: value.clone(),
            function,
        })),
        Value::Builtin(builtin) if builtin.is_method() => Value::Method(Rc::new(BoundMethod::Builtin {
            receiver: value.clone(),
            builtin,
        })),
        other => other,
    })
}

fn code_attr(code: &Code, name: &str) -> Result<Option<Value>, ScriptError> {
    let value = match name {
        "text" | "string" | "source" => Value::string(code.text()),
        "tokens" => Value::list(code.tokens()?.iter().cloned().map(Value::token).collect()),
        "tree" | "ast" => Value::Node(Node::Module(code.tree()?)),
        "origin" => Value::string(code.origin().name()),
        _ => return Ok(None),
    };
    Ok(Some(value))
}

fn token_attr(token: &Token, name: &str) -> Option<Value> {
    let value = match name {
        "kind" | "type" => Value::Kind(token.kind),
        "text" | "string" => Value::string(token.text.as_str()),
        "offset" => token
            .offset
            .and_then(|offset| i64::try_from(offset).ok())
            .map_or(Value::None, Value::Int),
        _ => return None,
    };
    Some(value)
}
