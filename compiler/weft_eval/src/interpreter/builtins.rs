//! Builtin functions and exception classes.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::rc::Rc;

use weft_ir::{Token, TokenKind};

use super::ast_module::construct;
use super::attrs::get_attr;
use super::{EvalResult, Interpreter};
use crate::code::{Code, CodeError, Origin};
use crate::errors::{self, ErrorKind, ScriptError};
use crate::format::float_to_int;
use crate::operators::evaluate_binary;
use crate::value::{BoundMethod, Builtin, Class, Dict, Value};

/// The root `Exception` class and one subclass per error kind.
pub(super) fn exception_classes() -> (Rc<Class>, Vec<Rc<Class>>) {
    let root = Rc::new(Class {
        name: "Exception".to_owned(),
        bases: Vec::new(),
        attrs: RefCell::default(),
    });
    let kinds = ErrorKind::ALL
        .into_iter()
        .map(|kind| {
            Rc::new(Class {
                name: kind.name().to_owned(),
                bases: vec![Rc::clone(&root)],
                attrs: RefCell::default(),
            })
        })
        .collect();
    (root, kinds)
}

/// Keyword arguments of a builtin call, taken by name. Whatever is left
/// when the call finishes was not accepted.
pub(super) struct Keywords<'a> {
    function: &'a str,
    entries: Vec<(String, Value)>,
}

impl<'a> Keywords<'a> {
    pub(super) fn new(function: &'a str, entries: Vec<(String, Value)>) -> Self {
        Keywords { function, entries }
    }

    pub(super) fn take(&mut self, name: &str) -> Option<Value> {
        let index = self.entries.iter().position(|(key, _)| key == name)?;
        Some(self.entries.remove(index).1)
    }

    pub(super) fn take_all(&mut self) -> Vec<(String, Value)> {
        std::mem::take(&mut self.entries)
    }

    pub(super) fn finish(self) -> Result<(), ScriptError> {
        match self.entries.first() {
            Some((key, _)) => Err(errors::unexpected_keyword(self.function, key)),
            None => Ok(()),
        }
    }
}

/// Check the positional argument count of a builtin or method.
pub(super) fn arity(function: &str, args: &[Value], min: usize, max: usize) -> Result<(), ScriptError> {
    if (min..=max).contains(&args.len()) {
        Ok(())
    } else {
        Err(errors::builtin_arity(function, min, max, args.len()))
    }
}

pub(super) fn len_value(len: usize) -> Value {
    Value::Int(i64::try_from(len).unwrap_or(i64::MAX))
}

impl Interpreter {
    pub(super) fn call_builtin(
        &self,
        builtin: Builtin,
        args: Vec<Value>,
        kwargs: Vec<(String, Value)>,
    ) -> EvalResult {
        let name = builtin.name();
        let mut keywords = Keywords::new(name, kwargs);
        let result = match builtin {
            Builtin::Print => {
                let sep = keywords.take("sep").map_or_else(|| " ".to_owned(), |v| v.to_str());
                let end = keywords.take("end").map_or_else(|| "\n".to_owned(), |v| v.to_str());
                let mut line = args.iter().map(Value::to_str).collect::<Vec<_>>().join(&sep);
                line.push_str(&end);
                self.print_handler.write(&line);
                Value::None
            }
            Builtin::Len => {
                arity(name, &args, 1, 1)?;
                length(&args[0])?
            }
            Builtin::Str => {
                arity(name, &args, 0, 1)?;
                match args.first() {
                    Some(value @ Value::Str(_)) => value.clone(),
                    Some(value) => Value::string(value.to_str()),
                    None => Value::string(""),
                }
            }
            Builtin::Repr => {
                arity(name, &args, 1, 1)?;
                Value::string(args[0].repr())
            }
            Builtin::Int => {
                arity(name, &args, 0, 2)?;
                let base = keywords.take("base").or_else(|| args.get(1).cloned());
                match args.first() {
                    Some(value) => to_int(value, base.as_ref())?,
                    None => Value::Int(0),
                }
            }
            Builtin::Float => {
                arity(name, &args, 0, 1)?;
                args.first().map_or(Ok(Value::Float(0.0)), to_float)?
            }
            Builtin::Bool => {
                arity(name, &args, 0, 1)?;
                Value::Bool(args.first().is_some_and(Value::is_truthy))
            }
            Builtin::List => {
                arity(name, &args, 0, 1)?;
                Value::list(args.first().map_or(Ok(Vec::new()), Value::iterate)?)
            }
            Builtin::Tuple => {
                arity(name, &args, 0, 1)?;
                Value::tuple(args.first().map_or(Ok(Vec::new()), Value::iterate)?)
            }
            Builtin::Dict => {
                arity(name, &args, 0, 1)?;
                let mut dict = Dict::new();
                if let Some(source) = args.first() {
                    update_dict(&mut dict, source)?;
                }
                for (key, value) in keywords.take_all() {
                    dict.insert(Value::from(key), value)?;
                }
                Value::dict(dict)
            }
            Builtin::Range => range(&args)?,
            Builtin::Enumerate => {
                arity(name, &args, 1, 2)?;
                let start = keywords.take("start").or_else(|| args.get(1).cloned());
                let start = match start {
                    Some(start) => start
                        .as_int()
                        .ok_or_else(|| errors::type_error("enumerate() start must be an integer"))?,
                    None => 0,
                };
                let items = args[0].iterate()?;
                Value::list(
                    (start..)
                        .zip(items)
                        .map(|(i, item)| Value::tuple(vec![Value::Int(i), item]))
                        .collect(),
                )
            }
            Builtin::Zip => {
                let columns = args.iter().map(Value::iterate).collect::<Result<Vec<_>, _>>()?;
                let rows = columns.iter().map(Vec::len).min().unwrap_or(0);
                Value::list(
                    (0..rows)
                        .map(|row| Value::tuple(columns.iter().map(|column| column[row].clone()).collect::<Vec<_>>()))
                        .collect(),
                )
            }
            Builtin::IsInstance => {
                arity(name, &args, 2, 2)?;
                Value::Bool(is_instance(&args[0], &args[1])?)
            }
            Builtin::HasAttr => {
                arity(name, &args, 2, 2)?;
                Value::Bool(get_attr(&args[0], attr_name(&args[1])?).is_ok())
            }
            Builtin::GetAttr => {
                arity(name, &args, 2, 3)?;
                match (get_attr(&args[0], attr_name(&args[1])?), args.get(2)) {
                    (Ok(value), _) => value,
                    (Err(err), Some(default)) if err.kind == ErrorKind::Attribute => default.clone(),
                    (Err(err), _) => return Err(err),
                }
            }
            Builtin::Min | Builtin::Max => {
                let key = keywords.take("key");
                let default = keywords.take("default");
                self.extreme(builtin, args, key.as_ref(), default)?
            }
            Builtin::Sum => {
                arity(name, &args, 1, 2)?;
                let start = keywords.take("start").or_else(|| args.get(1).cloned());
                args[0]
                    .iterate()?
                    .iter()
                    .try_fold(start.unwrap_or(Value::Int(0)), |total, item| {
                        evaluate_binary(&total, weft_parse::ast::BinaryOp::Add, item)
                    })?
            }
            Builtin::Sorted => {
                arity(name, &args, 1, 1)?;
                let key = keywords.take("key");
                let reverse = keywords.take("reverse").is_some_and(|v| v.is_truthy());
                Value::list(self.sorted(args[0].iterate()?, key.as_ref(), reverse)?)
            }
            Builtin::Reversed => {
                arity(name, &args, 1, 1)?;
                let mut items = args[0].iterate()?;
                items.reverse();
                Value::list(items)
            }
            Builtin::Any => {
                arity(name, &args, 1, 1)?;
                Value::Bool(args[0].iterate()?.iter().any(Value::is_truthy))
            }
            Builtin::All => {
                arity(name, &args, 1, 1)?;
                Value::Bool(args[0].iterate()?.iter().all(Value::is_truthy))
            }
            Builtin::Abs => {
                arity(name, &args, 1, 1)?;
                match &args[0] {
                    Value::Float(f) => Value::Float(f.abs()),
                    value => {
                        let n = value.as_int().ok_or_else(|| {
                            errors::type_error(format!(
                                "bad operand type for abs(): '{}'",
                                value.type_name()
                            ))
                        })?;
                        Value::Int(n.checked_abs().ok_or_else(|| errors::integer_overflow("abs"))?)
                    }
                }
            }
            Builtin::Type => {
                arity(name, &args, 1, 1)?;
                type_of(&args[0])
            }
            Builtin::Macro => {
                arity(name, &args, 1, 1)?;
                args[0].clone()
            }
            Builtin::Code => {
                arity(name, &args, 1, 1)?;
                Value::Code(Code::from_value(&args[0], Origin::User)?)
            }
            Builtin::Tokenize => {
                arity(name, &args, 1, 1)?;
                let tokens = match &args[0] {
                    Value::Str(text) => weft_lexer::tokenize(text).map_err(CodeError::from)?,
                    Value::Code(code) => code.tokens()?.to_vec(),
                    other => {
                        return Err(errors::type_error(format!(
                            "tokenize() expects str or Code, not '{}'",
                            other.type_name()
                        )));
                    }
                };
                Value::list(tokens.into_iter().map(Value::token).collect())
            }
            Builtin::Unparse => {
                arity(name, &args, 1, 1)?;
                match &args[0] {
                    Value::Node(node) => Value::string(node.unparse()),
                    Value::Code(code) => {
                        let tree = code.tree()?;
                        Value::string(weft_parse::unparse(&tree))
                    }
                    other => {
                        return Err(errors::type_error(format!(
                            "unparse() expects a syntax tree node, not '{}'",
                            other.type_name()
                        )));
                    }
                }
            }
            Builtin::Token => {
                arity(name, &args, 2, 3)?;
                let offset = keywords.take("offset").or_else(|| args.get(2).cloned());
                make_token(&args[0], &args[1], offset.as_ref())?
            }
            Builtin::Visit => {
                arity(name, &args, 2, 2)?;
                self.visit(&args[0], args[1].clone())?
            }
            Builtin::GenericVisit => {
                arity(name, &args, 2, 2)?;
                match &args[1] {
                    Value::Node(node) => self.generic_visit(&args[0], node)?,
                    other => {
                        return Err(errors::type_error(format!(
                            "generic_visit() expects a syntax tree node, not '{}'",
                            other.type_name()
                        )));
                    }
                }
            }
            Builtin::Transform => {
                arity(name, &args, 2, 2)?;
                self.transform(&args[0], &args[1])?
            }
            Builtin::Node(ctor) => construct(ctor, args, &mut keywords)?,
            Builtin::Operator(op) => {
                arity(name, &args, 0, 0)?;
                Value::string(op.symbol())
            }
        };
        keywords.finish()?;
        Ok(result)
    }

    /// `min` and `max`: over one iterable, or over the arguments.
    fn extreme(
        &self,
        builtin: Builtin,
        args: Vec<Value>,
        key: Option<&Value>,
        default: Option<Value>,
    ) -> EvalResult {
        arity(builtin.name(), &args, 1, usize::MAX)?;
        let candidates = if args.len() == 1 {
            args[0].iterate()?
        } else {
            args
        };
        let (wanted, symbol) = if builtin == Builtin::Min {
            (Ordering::Less, "<")
        } else {
            (Ordering::Greater, ">")
        };
        let mut best: Option<(Value, Value)> = None;
        for item in candidates {
            let rank = self.sort_key(key, &item)?;
            best = match best {
                None => Some((item, rank)),
                Some((current, current_rank)) => {
                    let ordering = rank.compare(&current_rank).ok_or_else(|| {
                        errors::not_comparable(symbol, &rank.type_name(), &current_rank.type_name())
                    })?;
                    if ordering == wanted {
                        Some((item, rank))
                    } else {
                        Some((current, current_rank))
                    }
                }
            };
        }
        match best {
            Some((item, _)) => Ok(item),
            None => default.ok_or_else(|| {
                errors::value_error(format!("{}() arg is an empty sequence", builtin.name()))
            }),
        }
    }

    fn sort_key(&self, key: Option<&Value>, item: &Value) -> EvalResult {
        match key {
            Some(Value::None) | None => Ok(item.clone()),
            Some(key) => self.call_value(key, vec![item.clone()], Vec::new()),
        }
    }

    /// A stable sort by `key`.
    fn sorted(&self, items: Vec<Value>, key: Option<&Value>, reverse: bool) -> Result<Vec<Value>, ScriptError> {
        let mut keyed = Vec::with_capacity(items.len());
        for item in items {
            keyed.push((self.sort_key(key, &item)?, item));
        }
        let mut failure = None;
        keyed.sort_by(|(a, _), (b, _)| {
            a.compare(b).unwrap_or_else(|| {
                failure.get_or_insert_with(|| errors::not_comparable("<", &a.type_name(), &b.type_name()));
                Ordering::Equal
            })
        });
        if let Some(err) = failure {
            return Err(err);
        }
        if reverse {
            keyed.reverse();
        }
        Ok(keyed.into_iter().map(|(_, item)| item).collect())
    }
}

fn length(value: &Value) -> EvalResult {
    let len = match value {
        Value::Str(s) => s.chars().count(),
        Value::List(items) => items.borrow().len(),
        Value::Tuple(items) => items.len(),
        Value::Dict(dict) => dict.borrow().len(),
        Value::Token(_) => 2,
        other => {
            return Err(errors::type_error(format!(
                "object of type '{}' has no len()",
                other.type_name()
            )));
        }
    };
    Ok(len_value(len))
}

fn to_int(value: &Value, base: Option<&Value>) -> EvalResult {
    match (value, base) {
        (Value::Str(text), base) => {
            let base = match base {
                Some(base) => base
                    .as_int()
                    .ok_or_else(|| errors::type_error("int() base must be an integer"))?,
                None => 10,
            };
            let radix = u32::try_from(base)
                .ok()
                .filter(|radix| (2..=36).contains(radix))
                .ok_or_else(|| errors::value_error("int() base must be >= 2 and <= 36"))?;
            let digits = text.trim().replace('_', "");
            i64::from_str_radix(&digits, radix).map(Value::Int).map_err(|_| {
                errors::value_error(format!(
                    "invalid literal for int() with base {base}: {}",
                    value.repr()
                ))
            })
        }
        (_, Some(_)) => Err(errors::type_error(
            "int() can't convert non-string with explicit base",
        )),
        (Value::Float(f), None) => {
            if f.is_finite() && f.abs() < 9.2e18 {
                Ok(Value::Int(float_to_int(*f)))
            } else {
                Err(errors::integer_overflow("int()"))
            }
        }
        (other, None) => other.as_int().map(Value::Int).ok_or_else(|| {
            errors::type_error(format!(
                "int() argument must be a string or a number, not '{}'",
                other.type_name()
            ))
        }),
    }
}

fn to_float(value: &Value) -> EvalResult {
    if let Value::Str(text) = value {
        return text.trim().parse::<f64>().map(Value::Float).map_err(|_| {
            errors::value_error(format!("could not convert string to float: {}", value.repr()))
        });
    }
    value.as_float().map(Value::Float).ok_or_else(|| {
        errors::type_error(format!(
            "float() argument must be a string or a number, not '{}'",
            value.type_name()
        ))
    })
}

fn range(args: &[Value]) -> EvalResult {
    let bounds = args
        .iter()
        .map(|arg| {
            arg.as_int().ok_or_else(|| {
                errors::type_error(format!(
                    "'{}' object cannot be interpreted as an integer",
                    arg.type_name()
                ))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let (start, stop, step) = match bounds.as_slice() {
        &[stop] => (0, stop, 1),
        &[start, stop] => (start, stop, 1),
        &[start, stop, step] => (start, stop, step),
        _ => return Err(errors::builtin_arity("range", 1, 3, args.len())),
    };
    if step == 0 {
        return Err(errors::value_error("range() arg 3 must not be zero"));
    }
    let mut items = Vec::new();
    let mut current = start;
    while (step > 0 && current < stop) || (step < 0 && current > stop) {
        items.push(Value::Int(current));
        match current.checked_add(step) {
            Some(next) => current = next,
            None => break,
        }
    }
    Ok(Value::list(items))
}

/// Fill `dict` from a mapping or an iterable of pairs.
pub(super) fn update_dict(dict: &mut Dict, source: &Value) -> Result<(), ScriptError> {
    if let Value::Dict(other) = source {
        let entries: Vec<(Value, Value)> = other
            .borrow()
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        for (key, value) in entries {
            dict.insert(key, value)?;
        }
        return Ok(());
    }
    for item in source.iterate()? {
        match item.iterate()?.as_slice() {
            [key, value] => dict.insert(key.clone(), value.clone())?,
            pair => {
                return Err(errors::value_error(format!(
                    "dictionary update sequence element has length {}; 2 is required",
                    pair.len()
                )));
            }
        }
    }
    Ok(())
}

/// The builtin type of a value, for `type()` and `isinstance()`.
fn builtin_type(value: &Value) -> Option<Builtin> {
    Some(match value {
        Value::Str(_) => Builtin::Str,
        Value::Int(_) => Builtin::Int,
        Value::Float(_) => Builtin::Float,
        Value::Bool(_) => Builtin::Bool,
        Value::List(_) => Builtin::List,
        Value::Tuple(_) => Builtin::Tuple,
        Value::Dict(_) => Builtin::Dict,
        Value::Code(_) => Builtin::Code,
        Value::Token(_) => Builtin::Token,
        _ => return None,
    })
}

fn type_of(value: &Value) -> Value {
    match value {
        Value::Instance(instance) => Value::Class(Rc::clone(&instance.class)),
        Value::Method(method) if !matches!(**method, BoundMethod::User { .. }) => {
            Value::string("builtin_function_or_method")
        }
        other => builtin_type(other).map_or_else(|| Value::string(other.type_name()), Value::Builtin),
    }
}

fn is_instance(value: &Value, class_info: &Value) -> Result<bool, ScriptError> {
    match class_info {
        Value::Class(class) => Ok(matches!(value, Value::Instance(instance) if instance.class.is_subclass_of(class))),
        Value::Builtin(Builtin::Node(ctor)) => {
            Ok(matches!(value, Value::Node(node) if node.kind() == ctor.name()))
        }
        Value::Builtin(builtin) if builtin.is_type() => Ok(builtin_type(value) == Some(*builtin)
            || (*builtin == Builtin::Int && matches!(value, Value::Bool(_)))),
        Value::Tuple(options) => {
            for option in options.iter() {
                if is_instance(value, option)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        _ => Err(errors::type_error(
            "isinstance() arg 2 must be a type or tuple of types",
        )),
    }
}

fn attr_name(value: &Value) -> Result<&str, ScriptError> {
    value
        .as_str()
        .ok_or_else(|| errors::type_error("attribute name must be string"))
}

fn make_token(kind: &Value, text: &Value, offset: Option<&Value>) -> EvalResult {
    let kind = match kind {
        Value::Kind(kind) => *kind,
        Value::Str(name) => TokenKind::from_name(name)
            .ok_or_else(|| errors::value_error(format!("unknown token kind '{name}'")))?,
        other => {
            return Err(errors::type_error(format!(
                "Token() kind must be a token kind, not '{}'",
                other.type_name()
            )));
        }
    };
    let text = text
        .as_str()
        .ok_or_else(|| errors::type_error("Token() text must be str"))?;
    let token = match offset {
        None | Some(Value::None) => Token::new(kind, text),
        Some(offset) => {
            let offset = offset
                .as_int()
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(|| errors::value_error("Token() offset must be a non-negative integer"))?;
            Token::with_offset(kind, text, offset)
        }
    };
    Ok(Value::token(token))
}
