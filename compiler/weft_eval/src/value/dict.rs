//! Insertion-ordered dictionaries.

use std::rc::Rc;

use rustc_hash::FxHashMap;
use weft_ir::TokenKind;

use super::Value;
use crate::errors::{self, ScriptError};

/// Hashable projection of a [`Value`].
///
/// Values that compare equal produce equal keys: `1`, `1.0` and `True` share
/// a key, and a token shares the key of its `(kind, text)` tuple.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum HashKey {
    None,
    Ellipsis,
    Int(i64),
    /// Bit pattern of a non-integral float.
    Float(u64),
    Str(String),
    Tuple(Vec<HashKey>),
    Kind(TokenKind),
    /// Identity of a shared object such as a function or class.
    Object(usize),
    Builtin(&'static str),
}

impl HashKey {
    pub fn of(value: &Value) -> Result<HashKey, ScriptError> {
        Ok(match value {
            Value::None => HashKey::None,
            Value::Ellipsis => HashKey::Ellipsis,
            Value::Bool(b) => HashKey::Int(i64::from(*b)),
            Value::Int(n) => HashKey::Int(*n),
            Value::Float(f) => float_key(*f),
            Value::Str(s) => HashKey::Str(s.to_string()),
            Value::Tuple(items) => {
                HashKey::Tuple(items.iter().map(HashKey::of).collect::<Result<_, _>>()?)
            }
            Value::Token(token) => HashKey::Tuple(vec![
                HashKey::Kind(token.kind),
                HashKey::Str(token.text.clone()),
            ]),
            Value::Kind(kind) => HashKey::Kind(*kind),
            Value::Code(code) => HashKey::Str(code.text().to_owned()),
            Value::Builtin(builtin) => HashKey::Builtin(builtin.name()),
            Value::Function(f) => identity(f),
            Value::Class(c) => identity(c),
            Value::Instance(i) => identity(i),
            Value::Module(m) => identity(m),
            Value::List(_) | Value::Dict(_) | Value::Method(_) | Value::Node(_) => {
                return Err(errors::unhashable(&value.type_name()));
            }
        })
    }
}

fn identity<T>(object: &Rc<T>) -> HashKey {
    HashKey::Object(Rc::as_ptr(object).cast::<()>() as usize)
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "only integral floats inside the i64 range are converted"
)]
fn float_key(f: f64) -> HashKey {
    if f.fract() == 0.0 && f.abs() < 9.0e18 {
        HashKey::Int(f as i64)
    } else {
        HashKey::Float(f.to_bits())
    }
}

/// A dictionary that remembers insertion order.
#[derive(Clone, Debug, Default)]
pub struct Dict {
    entries: Vec<(Value, Value)>,
    index: FxHashMap<HashKey, usize>,
}

impl Dict {
    pub fn new() -> Self {
        Dict::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &Value) -> Result<Option<Value>, ScriptError> {
        let hash = HashKey::of(key)?;
        Ok(self.index.get(&hash).map(|&i| self.entries[i].1.clone()))
    }

    pub fn contains(&self, key: &Value) -> Result<bool, ScriptError> {
        Ok(self.index.contains_key(&HashKey::of(key)?))
    }

    /// Insert or overwrite. An existing key keeps its position.
    pub fn insert(&mut self, key: Value, value: Value) -> Result<(), ScriptError> {
        let hash = HashKey::of(&key)?;
        if let Some(&i) = self.index.get(&hash) {
            self.entries[i].1 = value;
        } else {
            self.index.insert(hash, self.entries.len());
            self.entries.push((key, value));
        }
        Ok(())
    }

    pub fn remove(&mut self, key: &Value) -> Result<Option<Value>, ScriptError> {
        let hash = HashKey::of(key)?;
        let Some(i) = self.index.remove(&hash) else {
            return Ok(None);
        };
        let (_, value) = self.entries.remove(i);
        for slot in self.index.values_mut() {
            if *slot > i {
                *slot -= 1;
            }
        }
        Ok(Some(value))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> Vec<Value> {
        self.entries.iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn values(&self) -> Vec<Value> {
        self.entries.iter().map(|(_, v)| v.clone()).collect()
    }

    pub(crate) fn equals(&self, other: &Dict) -> bool {
        self.len() == other.len()
            && self.iter().all(|(key, value)| {
                matches!(other.get(key), Ok(Some(theirs)) if theirs.equals(value))
            })
    }
}
