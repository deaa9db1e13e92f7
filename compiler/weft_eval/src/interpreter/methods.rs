//! Methods of the builtin container types, and `str.format`.

use std::cell::Cell;

use super::attrs::get_attr;
use super::builtins::{arity, len_value, update_dict, Keywords};
use super::EvalResult;
use crate::errors::{self, ErrorKind, ScriptError};
use crate::format::{convert, format_value, parse_template, Accessor, Piece};
use crate::operators::subscript;
use crate::value::{Dict, Value};

const STR_METHODS: &[&str] = &[
    "join",
    "split",
    "strip",
    "lstrip",
    "rstrip",
    "startswith",
    "endswith",
    "replace",
    "upper",
    "lower",
    "count",
    "find",
    "splitlines",
    "isidentifier",
    "isdigit",
    "format",
];

const LIST_METHODS: &[&str] = &["append", "extend", "pop", "insert", "index", "copy", "reverse"];

const DICT_METHODS: &[&str] = &["get", "keys", "values", "items", "update", "pop"];

pub(super) fn has_method(value: &Value, name: &str) -> bool {
    let table = match value {
        Value::Str(_) => STR_METHODS,
        Value::List(_) => LIST_METHODS,
        Value::Dict(_) => DICT_METHODS,
        _ => return false,
    };
    table.contains(&name)
}

/// Call the native method `name` on `receiver`.
pub(super) fn call_method(
    receiver: &Value,
    name: &str,
    args: Vec<Value>,
    kwargs: Vec<(String, Value)>,
) -> EvalResult {
    let qualified = format!("{}.{name}", receiver.type_name());
    let mut keywords = Keywords::new(&qualified, kwargs);
    let result = match receiver {
        Value::Str(text) if name == "format" => {
            return format_method(text, &args, keywords.take_all());
        }
        Value::Str(text) => str_method(text, name, &qualified, &args)?,
        Value::List(_) => list_method(receiver, name, &qualified, args)?,
        Value::Dict(_) => dict_method(receiver, name, &qualified, args, &mut keywords)?,
        _ => return Err(errors::no_attribute(&receiver.type_name(), name)),
    };
    keywords.finish()?;
    Ok(result)
}

fn str_arg<'v>(method: &str, value: &'v Value) -> Result<&'v str, ScriptError> {
    value.as_str().ok_or_else(|| {
        errors::type_error(format!(
            "{method}() argument must be str, not '{}'",
            value.type_name()
        ))
    })
}

fn int_arg(method: &str, value: &Value) -> Result<i64, ScriptError> {
    value.as_int().ok_or_else(|| {
        errors::type_error(format!(
            "{method}() argument must be an integer, not '{}'",
            value.type_name()
        ))
    })
}

/// Resolve a possibly negative index against `len`.
fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let index = if index < 0 { index + len } else { index };
    if (0..len).contains(&index) {
        usize::try_from(index).ok()
    } else {
        None
    }
}

fn str_method(text: &str, name: &str, qualified: &str, args: &[Value]) -> EvalResult {
    let result = match name {
        "join" => {
            arity(qualified, args, 1, 1)?;
            let parts = args[0]
                .iterate()?
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_owned).ok_or_else(|| {
                        errors::type_error(format!(
                            "sequence item: expected str instance, '{}' found",
                            item.type_name()
                        ))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Value::string(parts.join(text))
        }
        "split" => {
            arity(qualified, args, 0, 2)?;
            let limit = match args.get(1) {
                Some(n) => usize::try_from(int_arg(qualified, n)?).ok(),
                None => None,
            };
            let parts: Vec<Value> = match args.first() {
                None | Some(Value::None) => split_whitespace(text, limit),
                Some(sep) => {
                    let sep = str_arg(qualified, sep)?;
                    if sep.is_empty() {
                        return Err(errors::value_error("empty separator"));
                    }
                    match limit {
                        Some(n) => text.splitn(n + 1, sep).map(Value::from).collect(),
                        None => text.split(sep).map(Value::from).collect(),
                    }
                }
            };
            Value::list(parts)
        }
        "strip" | "lstrip" | "rstrip" => {
            arity(qualified, args, 0, 1)?;
            let chars: Option<Vec<char>> = match args.first() {
                None | Some(Value::None) => None,
                Some(chars) => Some(str_arg(qualified, chars)?.chars().collect()),
            };
            let strip = |c: char| match &chars {
                Some(chars) => chars.contains(&c),
                None => c.is_whitespace(),
            };
            let stripped = match name {
                "strip" => text.trim_matches(strip),
                "lstrip" => text.trim_start_matches(strip),
                _ => text.trim_end_matches(strip),
            };
            Value::string(stripped)
        }
        "startswith" | "endswith" => {
            arity(qualified, args, 1, 1)?;
            let candidates = match &args[0] {
                Value::Tuple(options) => options.to_vec(),
                other => vec![other.clone()],
            };
            let mut found = false;
            for candidate in &candidates {
                let affix = str_arg(qualified, candidate)?;
                found |= if name == "startswith" {
                    text.starts_with(affix)
                } else {
                    text.ends_with(affix)
                };
            }
            Value::Bool(found)
        }
        "replace" => {
            arity(qualified, args, 2, 3)?;
            let old = str_arg(qualified, &args[0])?;
            let new = str_arg(qualified, &args[1])?;
            match args.get(2).map(|n| int_arg(qualified, n)).transpose()? {
                Some(count) if count >= 0 => {
                    Value::string(text.replacen(old, new, usize::try_from(count).unwrap_or(usize::MAX)))
                }
                _ => Value::string(text.replace(old, new)),
            }
        }
        "upper" => {
            arity(qualified, args, 0, 0)?;
            Value::string(text.to_uppercase())
        }
        "lower" => {
            arity(qualified, args, 0, 0)?;
            Value::string(text.to_lowercase())
        }
        "count" => {
            arity(qualified, args, 1, 1)?;
            let needle = str_arg(qualified, &args[0])?;
            if needle.is_empty() {
                len_value(text.chars().count() + 1)
            } else {
                len_value(text.matches(needle).count())
            }
        }
        "find" => {
            arity(qualified, args, 1, 1)?;
            let needle = str_arg(qualified, &args[0])?;
            match text.find(needle) {
                Some(byte) => len_value(text[..byte].chars().count()),
                None => Value::Int(-1),
            }
        }
        "splitlines" => {
            arity(qualified, args, 0, 0)?;
            Value::list(text.lines().map(Value::from).collect())
        }
        "isidentifier" => {
            arity(qualified, args, 0, 0)?;
            let mut chars = text.chars();
            Value::Bool(
                chars.next().is_some_and(|c| c == '_' || c.is_alphabetic())
                    && chars.all(|c| c == '_' || c.is_alphanumeric()),
            )
        }
        "isdigit" => {
            arity(qualified, args, 0, 0)?;
            Value::Bool(!text.is_empty() && text.chars().all(|c| c.is_ascii_digit()))
        }
        _ => return Err(errors::no_attribute("str", name)),
    };
    Ok(result)
}

fn split_whitespace(text: &str, limit: Option<usize>) -> Vec<Value> {
    let Some(limit) = limit else {
        return text.split_whitespace().map(Value::from).collect();
    };
    let mut parts = Vec::new();
    let mut rest = text.trim_start();
    while !rest.is_empty() {
        if parts.len() == limit {
            parts.push(Value::from(rest));
            break;
        }
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        parts.push(Value::from(&rest[..end]));
        rest = rest[end..].trim_start();
    }
    parts
}

fn list_method(receiver: &Value, name: &str, qualified: &str, args: Vec<Value>) -> EvalResult {
    let Value::List(items) = receiver else {
        return Err(errors::no_attribute(&receiver.type_name(), name));
    };
    let result = match name {
        "append" => {
            arity(qualified, &args, 1, 1)?;
            items.borrow_mut().extend(args);
            Value::None
        }
        "extend" => {
            arity(qualified, &args, 1, 1)?;
            // Collect first: `xs.extend(xs)` iterates the list being extended.
            let extra = args[0].iterate()?;
            items.borrow_mut().extend(extra);
            Value::None
        }
        "pop" => {
            arity(qualified, &args, 0, 1)?;
            let mut items = items.borrow_mut();
            if items.is_empty() {
                return Err(ScriptError::new(ErrorKind::Index, "pop from empty list"));
            }
            let index = match args.first() {
                Some(index) => normalize_index(int_arg(qualified, index)?, items.len())
                    .ok_or_else(|| ScriptError::new(ErrorKind::Index, "pop index out of range"))?,
                None => items.len() - 1,
            };
            items.remove(index)
        }
        "insert" => {
            arity(qualified, &args, 2, 2)?;
            let mut args = args.into_iter();
            let (Some(index), Some(value)) = (args.next(), args.next()) else {
                return Err(errors::builtin_arity(qualified, 2, 2, 0));
            };
            let mut items = items.borrow_mut();
            let len = i64::try_from(items.len()).unwrap_or(i64::MAX);
            let index = int_arg(qualified, &index)?;
            let index = if index < 0 { (index + len).max(0) } else { index.min(len) };
            items.insert(usize::try_from(index).unwrap_or(0), value);
            Value::None
        }
        "index" => {
            arity(qualified, &args, 1, 1)?;
            let position = items.borrow().iter().position(|item| item.equals(&args[0]));
            match position {
                Some(position) => len_value(position),
                None => {
                    return Err(errors::value_error(format!("{} is not in list", args[0].repr())));
                }
            }
        }
        "copy" => {
            arity(qualified, &args, 0, 0)?;
            Value::list(items.borrow().clone())
        }
        "reverse" => {
            arity(qualified, &args, 0, 0)?;
            items.borrow_mut().reverse();
            Value::None
        }
        _ => return Err(errors::no_attribute("list", name)),
    };
    Ok(result)
}

fn dict_method(
    receiver: &Value,
    name: &str,
    qualified: &str,
    args: Vec<Value>,
    keywords: &mut Keywords<'_>,
) -> EvalResult {
    let Value::Dict(dict) = receiver else {
        return Err(errors::no_attribute(&receiver.type_name(), name));
    };
    let result = match name {
        "get" => {
            arity(qualified, &args, 1, 2)?;
            let found = dict.borrow().get(&args[0])?;
            found.or_else(|| args.get(1).cloned()).unwrap_or(Value::None)
        }
        "keys" => {
            arity(qualified, &args, 0, 0)?;
            Value::list(dict.borrow().keys())
        }
        "values" => {
            arity(qualified, &args, 0, 0)?;
            Value::list(dict.borrow().values())
        }
        "items" => {
            arity(qualified, &args, 0, 0)?;
            Value::list(
                dict.borrow()
                    .iter()
                    .map(|(key, value)| Value::tuple(vec![key.clone(), value.clone()]))
                    .collect(),
            )
        }
        "update" => {
            arity(qualified, &args, 0, 1)?;
            // Build the update separately so `d.update(d)` never holds two borrows.
            let mut update = Dict::new();
            if let Some(source) = args.first() {
                update_dict(&mut update, source)?;
            }
            for (key, value) in keywords.take_all() {
                update.insert(Value::from(key), value)?;
            }
            let mut dict = dict.borrow_mut();
            for (key, value) in update.iter() {
                dict.insert(key.clone(), value.clone())?;
            }
            Value::None
        }
        "pop" => {
            arity(qualified, &args, 1, 2)?;
            let removed = dict.borrow_mut().remove(&args[0])?;
            match (removed, args.get(1)) {
                (Some(value), _) => value,
                (None, Some(default)) => default.clone(),
                (None, None) => return Err(errors::key_not_found(args[0].repr())),
            }
        }
        _ => return Err(errors::no_attribute("dict", name)),
    };
    Ok(result)
}

/// `template.format(*args, **kwargs)`
fn format_method(template: &str, args: &[Value], kwargs: Vec<(String, Value)>) -> EvalResult {
    let next_auto = Cell::new(0usize);
    let manual = Cell::new(false);
    let mut resolve = |name: &str| -> EvalResult {
        let index = if name.is_empty() {
            if manual.get() {
                return Err(errors::value_error(
                    "cannot switch from manual field specification to automatic field numbering",
                ));
            }
            let index = next_auto.get();
            next_auto.set(index + 1);
            index
        } else if let Ok(index) = name.parse::<usize>() {
            if next_auto.get() > 0 {
                return Err(errors::value_error(
                    "cannot switch from automatic field numbering to manual field specification",
                ));
            }
            manual.set(true);
            index
        } else {
            return kwargs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone())
                .ok_or_else(|| errors::key_not_found(Value::from(name).repr()));
        };
        args.get(index).cloned().ok_or_else(|| {
            ScriptError::new(
                ErrorKind::Index,
                format!("Replacement index {index} out of range for positional args tuple"),
            )
        })
    };
    render_template(template, &mut resolve).map(Value::string)
}

/// Render a `str.format` template, resolving each field name with `resolve`.
pub(super) fn render_template(
    template: &str,
    resolve: &mut dyn FnMut(&str) -> EvalResult,
) -> Result<String, ScriptError> {
    let mut out = String::with_capacity(template.len());
    for piece in parse_template(template)? {
        let field = match piece {
            Piece::Literal(text) => {
                out.push_str(&text);
                continue;
            }
            Piece::Field(field) => field,
        };
        let mut value = resolve(field.name)?;
        for accessor in &field.accessors {
            value = match accessor {
                Accessor::Attr(attr) => get_attr(&value, attr)?,
                Accessor::Index(key) => {
                    let key = key.parse::<i64>().map_or_else(|_| Value::from(*key), Value::Int);
                    subscript(&value, &key)?
                }
            };
        }
        let value = convert(&value, field.conversion);
        let spec = if field.spec.contains('{') {
            render_template(field.spec, resolve)?
        } else {
            field.spec.to_owned()
        };
        out.push_str(&format_value(&value, &spec)?);
    }
    Ok(out)
}
