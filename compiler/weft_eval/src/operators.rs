//! Operators on script values.
//!
//! Direct enum dispatch over the operand pair. Integer arithmetic is checked:
//! overflow is an `OverflowError`, never a wrap. Division and modulo round
//! toward negative infinity, so `-7 // 2 == -4` and `-7 % 2 == 1`.

use std::cmp::Ordering;

use weft_parse::ast::{BinaryOp, CmpOp, UnaryOp};

use crate::errors::{self, ScriptError};
use crate::format::percent_format;
use crate::value::{int_to_float, Value};

type EvalResult = Result<Value, ScriptError>;

#[inline]
fn checked(result: Option<i64>, op_name: &str) -> EvalResult {
    result.map(Value::Int).ok_or_else(|| errors::integer_overflow(op_name))
}

/// Evaluate `left op right`.
pub fn evaluate_binary(left: &Value, op: BinaryOp, right: &Value) -> EvalResult {
    match (left, right) {
        (Value::Int(_) | Value::Bool(_), Value::Int(_) | Value::Bool(_)) => {
            match (left.as_int(), right.as_int()) {
                (Some(a), Some(b)) => eval_int_binary(a, op, b, left, right),
                _ => Err(mismatch(left, op, right)),
            }
        }
        (Value::Float(_), Value::Int(_) | Value::Bool(_) | Value::Float(_))
        | (Value::Int(_) | Value::Bool(_), Value::Float(_)) => match (left.as_float(), right.as_float()) {
            (Some(a), Some(b)) => eval_float_binary(a, op, b, left, right),
            _ => Err(mismatch(left, op, right)),
        },
        (Value::Str(a), Value::Str(b)) if op == BinaryOp::Add => {
            Ok(Value::string(format!("{a}{b}")))
        }
        (Value::Str(a), _) if op == BinaryOp::Mod => percent_format(a, right),
        (Value::Str(s), Value::Int(_) | Value::Bool(_))
        | (Value::Int(_) | Value::Bool(_), Value::Str(s))
            if op == BinaryOp::Mul =>
        {
            let count = repeat_count(left, right);
            Ok(Value::string(s.repeat(count)))
        }
        (Value::List(a), Value::List(b)) if op == BinaryOp::Add => {
            let mut items = a.borrow().clone();
            items.extend(b.borrow().iter().cloned());
            Ok(Value::list(items))
        }
        (Value::Tuple(a), Value::Tuple(b)) if op == BinaryOp::Add => {
            Ok(Value::tuple(a.iter().chain(b.iter()).cloned().collect::<Vec<_>>()))
        }
        (Value::List(items), Value::Int(_) | Value::Bool(_))
        | (Value::Int(_) | Value::Bool(_), Value::List(items))
            if op == BinaryOp::Mul =>
        {
            let items = items.borrow();
            Ok(Value::list(repeat(&items, repeat_count(left, right))?))
        }
        (Value::Tuple(items), Value::Int(_) | Value::Bool(_))
        | (Value::Int(_) | Value::Bool(_), Value::Tuple(items))
            if op == BinaryOp::Mul =>
        {
            Ok(Value::tuple(repeat(items, repeat_count(left, right))?))
        }
        _ => Err(mismatch(left, op, right)),
    }
}

fn mismatch(left: &Value, op: BinaryOp, right: &Value) -> ScriptError {
    errors::unsupported_operand(op.as_symbol(), &left.type_name(), &right.type_name())
}

/// The integer operand of a sequence repetition, clamped at zero.
fn repeat_count(left: &Value, right: &Value) -> usize {
    let n = left.as_int().or_else(|| right.as_int()).unwrap_or(0);
    usize::try_from(n).unwrap_or(0)
}

fn repeat(items: &[Value], count: usize) -> Result<Vec<Value>, ScriptError> {
    let len = items
        .len()
        .checked_mul(count)
        .ok_or_else(|| errors::integer_overflow("repetition"))?;
    let mut out = Vec::with_capacity(len);
    for _ in 0..count {
        out.extend_from_slice(items);
    }
    Ok(out)
}

fn eval_int_binary(a: i64, op: BinaryOp, b: i64, left: &Value, right: &Value) -> EvalResult {
    match op {
        BinaryOp::Add => checked(a.checked_add(b), "addition"),
        BinaryOp::Sub => checked(a.checked_sub(b), "subtraction"),
        BinaryOp::Mul => checked(a.checked_mul(b), "multiplication"),
        BinaryOp::Div => {
            if b == 0 {
                return Err(errors::division_by_zero());
            }
            Ok(Value::Float(int_to_float(a) / int_to_float(b)))
        }
        BinaryOp::FloorDiv => {
            if b == 0 {
                return Err(errors::division_by_zero());
            }
            checked(floor_div(a, b), "floor division")
        }
        BinaryOp::Mod => {
            if b == 0 {
                return Err(errors::division_by_zero());
            }
            checked(floor_mod(a, b), "modulo")
        }
        BinaryOp::Pow => match u32::try_from(b) {
            Ok(exp) => checked(a.checked_pow(exp), "exponentiation"),
            Err(_) if b < 0 => {
                if a == 0 {
                    return Err(errors::division_by_zero());
                }
                Ok(Value::Float(int_to_float(a).powf(int_to_float(b))))
            }
            Err(_) => Err(errors::integer_overflow("exponentiation")),
        },
        BinaryOp::BitAnd => Ok(bitwise(a & b, left, right)),
        BinaryOp::BitOr => Ok(bitwise(a | b, left, right)),
        BinaryOp::BitXor => Ok(bitwise(a ^ b, left, right)),
        BinaryOp::Shl => {
            let shift = shift_count(b)?;
            if a == 0 {
                return Ok(Value::Int(0));
            }
            if shift >= 64 {
                return Err(errors::integer_overflow("left shift"));
            }
            checked(i64::try_from(i128::from(a) << shift).ok(), "left shift")
        }
        BinaryOp::Shr => {
            let shift = shift_count(b)?;
            Ok(Value::Int(if shift >= 64 {
                if a < 0 {
                    -1
                } else {
                    0
                }
            } else {
                a >> shift
            }))
        }
        BinaryOp::MatMul => Err(mismatch(left, op, right)),
    }
}

/// Bitwise results of two bools stay bools.
fn bitwise(result: i64, left: &Value, right: &Value) -> Value {
    if matches!((left, right), (Value::Bool(_), Value::Bool(_))) {
        Value::Bool(result != 0)
    } else {
        Value::Int(result)
    }
}

fn shift_count(b: i64) -> Result<u32, ScriptError> {
    if b < 0 {
        return Err(errors::value_error("negative shift count"));
    }
    Ok(u32::try_from(b).unwrap_or(u32::MAX))
}

fn floor_div(a: i64, b: i64) -> Option<i64> {
    let q = a.checked_div(b)?;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        q.checked_sub(1)
    } else {
        Some(q)
    }
}

fn floor_mod(a: i64, b: i64) -> Option<i64> {
    let r = a.checked_rem(b)?;
    if r != 0 && ((r < 0) != (b < 0)) {
        r.checked_add(b)
    } else {
        Some(r)
    }
}

fn eval_float_binary(a: f64, op: BinaryOp, b: f64, left: &Value, right: &Value) -> EvalResult {
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div | BinaryOp::FloorDiv | BinaryOp::Mod if b == 0.0 => {
            return Err(errors::division_by_zero());
        }
        BinaryOp::Div => a / b,
        BinaryOp::FloorDiv => (a / b).floor(),
        BinaryOp::Mod => {
            let r = a % b;
            if r != 0.0 && ((r < 0.0) != (b < 0.0)) {
                r + b
            } else {
                r
            }
        }
        BinaryOp::Pow => a.powf(b),
        _ => return Err(mismatch(left, op, right)),
    };
    Ok(Value::Float(result))
}

/// Evaluate a unary operator.
pub fn evaluate_unary(op: UnaryOp, operand: &Value) -> EvalResult {
    match (op, operand) {
        (UnaryOp::Not, value) => Ok(Value::Bool(!value.is_truthy())),
        (UnaryOp::Neg, Value::Float(f)) => Ok(Value::Float(-f)),
        (UnaryOp::Pos, Value::Float(f)) => Ok(Value::Float(*f)),
        (op, value) => match (op, value.as_int()) {
            (UnaryOp::Neg, Some(n)) => checked(n.checked_neg(), "negation"),
            (UnaryOp::Pos, Some(n)) => Ok(Value::Int(n)),
            (UnaryOp::Invert, Some(n)) => Ok(Value::Int(!n)),
            _ => Err(errors::bad_unary_operand(op.as_symbol(), &value.type_name())),
        },
    }
}

/// Evaluate one link of a comparison chain.
pub fn evaluate_comparison(left: &Value, op: CmpOp, right: &Value) -> Result<bool, ScriptError> {
    let ordered = |test: fn(Ordering) -> bool| {
        left.compare(right).map(test).ok_or_else(|| {
            errors::not_comparable(op.as_symbol(), &left.type_name(), &right.type_name())
        })
    };
    match op {
        CmpOp::Eq => Ok(left.equals(right)),
        CmpOp::NotEq => Ok(!left.equals(right)),
        CmpOp::Lt => ordered(Ordering::is_lt),
        CmpOp::LtEq => ordered(Ordering::is_le),
        CmpOp::Gt => ordered(Ordering::is_gt),
        CmpOp::GtEq => ordered(Ordering::is_ge),
        CmpOp::In => contains(right, left),
        CmpOp::NotIn => contains(right, left).map(|found| !found),
        CmpOp::Is => Ok(left.is_same(right)),
        CmpOp::IsNot => Ok(!left.is_same(right)),
    }
}

/// `item in container`.
pub fn contains(container: &Value, item: &Value) -> Result<bool, ScriptError> {
    match container {
        Value::Str(haystack) => match item {
            Value::Str(needle) => Ok(haystack.contains(needle.as_ref())),
            other => Err(errors::type_error(format!(
                "'in <string>' requires string as left operand, not {}",
                other.type_name()
            ))),
        },
        Value::List(items) => Ok(items.borrow().iter().any(|x| x.equals(item))),
        Value::Tuple(items) => Ok(items.iter().any(|x| x.equals(item))),
        Value::Dict(dict) => dict.borrow().contains(item),
        Value::Token(_) => Ok(container.iterate()?.iter().any(|x| x.equals(item))),
        other => Err(errors::type_error(format!(
            "argument of type '{}' is not iterable",
            other.type_name()
        ))),
    }
}

// Subscripts

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

fn integer_index(container: &Value, index: &Value) -> Result<i64, ScriptError> {
    index.as_int().ok_or_else(|| {
        errors::type_error(format!(
            "{} indices must be integers or slices, not {}",
            container.type_name(),
            index.type_name()
        ))
    })
}

/// `container[index]`.
pub fn subscript(container: &Value, index: &Value) -> EvalResult {
    match container {
        Value::List(items) => {
            let items = items.borrow();
            let i = integer_index(container, index)?;
            normalize_index(i, items.len())
                .map(|i| items[i].clone())
                .ok_or_else(|| errors::index_out_of_range("list"))
        }
        Value::Tuple(items) => {
            let i = integer_index(container, index)?;
            normalize_index(i, items.len())
                .map(|i| items[i].clone())
                .ok_or_else(|| errors::index_out_of_range("tuple"))
        }
        Value::Str(s) => {
            let i = integer_index(container, index)?;
            let chars: Vec<char> = s.chars().collect();
            normalize_index(i, chars.len())
                .map(|i| Value::string(chars[i].to_string()))
                .ok_or_else(|| errors::index_out_of_range("string"))
        }
        Value::Token(_) => {
            let parts = container.iterate()?;
            let i = integer_index(container, index)?;
            normalize_index(i, parts.len())
                .map(|i| parts[i].clone())
                .ok_or_else(|| errors::index_out_of_range("Token"))
        }
        Value::Dict(dict) => dict
            .borrow()
            .get(index)?
            .ok_or_else(|| errors::key_not_found(index.repr())),
        other => Err(errors::not_subscriptable(&other.type_name())),
    }
}

/// `container[index] = value`.
pub fn set_subscript(container: &Value, index: &Value, value: Value) -> Result<(), ScriptError> {
    match container {
        Value::List(items) => {
            let mut items = items.borrow_mut();
            let i = integer_index(container, index)?;
            let slot = normalize_index(i, items.len()).ok_or_else(|| {
                ScriptError::new(
                    errors::ErrorKind::Index,
                    "list assignment index out of range",
                )
            })?;
            items[slot] = value;
            Ok(())
        }
        Value::Dict(dict) => dict.borrow_mut().insert(index.clone(), value),
        other => Err(errors::type_error(format!(
            "'{}' object does not support item assignment",
            other.type_name()
        ))),
    }
}

/// Positions selected by `lower:upper:step` over a sequence of `len`.
pub fn slice_indices(
    len: usize,
    lower: Option<i64>,
    upper: Option<i64>,
    step: Option<i64>,
) -> Result<Vec<usize>, ScriptError> {
    let step = step.unwrap_or(1);
    if step == 0 {
        return Err(errors::value_error("slice step cannot be zero"));
    }
    let len = i64::try_from(len).map_err(|_| errors::integer_overflow("slice"))?;
    let clamp = |bound: i64, low: i64, high: i64| {
        let bound = if bound < 0 { bound + len } else { bound };
        bound.clamp(low, high)
    };
    let mut out = Vec::new();
    if step > 0 {
        let start = lower.map_or(0, |x| clamp(x, 0, len));
        let stop = upper.map_or(len, |x| clamp(x, 0, len));
        let mut i = start;
        while i < stop {
            out.extend(usize::try_from(i).ok());
            i += step;
        }
    } else {
        let start = lower.map_or(len - 1, |x| clamp(x, -1, len - 1));
        let stop = upper.map_or(-1, |x| clamp(x, -1, len - 1));
        let mut i = start;
        while i > stop {
            out.extend(usize::try_from(i).ok());
            i += step;
        }
    }
    Ok(out)
}

/// `container[lower:upper:step]`.
pub fn slice(
    container: &Value,
    lower: Option<i64>,
    upper: Option<i64>,
    step: Option<i64>,
) -> EvalResult {
    match container {
        Value::List(items) => {
            let items = items.borrow();
            let picked = slice_indices(items.len(), lower, upper, step)?;
            Ok(Value::list(picked.into_iter().map(|i| items[i].clone()).collect()))
        }
        Value::Tuple(items) => {
            let picked = slice_indices(items.len(), lower, upper, step)?;
            Ok(Value::tuple(
                picked.into_iter().map(|i| items[i].clone()).collect::<Vec<_>>(),
            ))
        }
        Value::Str(s) => {
            let chars: Vec<char> = s.chars().collect();
            let picked = slice_indices(chars.len(), lower, upper, step)?;
            Ok(Value::string(picked.into_iter().map(|i| chars[i]).collect::<String>()))
        }
        other => Err(errors::not_subscriptable(&other.type_name())),
    }
}
