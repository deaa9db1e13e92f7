//! Runtime values of macro code.
//!
//! Scalars are stored inline. Lists and dicts are shared mutable
//! containers (`Rc<RefCell<_>>`), so aliasing behaves the way macro
//! authors expect: appending through one name is visible through another.
//! Everything else is immutable behind an `Rc`.

mod builtin;
mod dict;
mod node;

pub use builtin::{Builtin, NodeCtor, OperatorNode};
pub use dict::{Dict, HashKey};
pub use node::Node;

use std::borrow::Cow;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use weft_ir::{quoted, Token, TokenKind};
use weft_parse::ast::{Expr, FunctionDef, Params};

use crate::code::Code;
use crate::environment::{LocalScope, Scope};
use crate::errors::{self, ScriptError};

/// Nesting depth after which `repr` stops descending into containers.
const MAX_REPR_DEPTH: usize = 64;

#[derive(Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    Ellipsis,
    List(Rc<RefCell<Vec<Value>>>),
    Tuple(Rc<[Value]>),
    Dict(Rc<RefCell<Dict>>),
    Function(Rc<Function>),
    Builtin(Builtin),
    Method(Rc<BoundMethod>),
    Class(Rc<Class>),
    Instance(Rc<Instance>),
    Module(Rc<ModuleValue>),
    Token(Rc<Token>),
    /// A token kind constant from the `token` module.
    Kind(TokenKind),
    Code(Code),
    /// A read-only syntax tree node.
    Node(Node),
}

impl Value {
    // Factories

    #[inline]
    pub fn string(text: impl Into<Rc<str>>) -> Self {
        Value::Str(text.into())
    }

    #[inline]
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(RefCell::new(items)))
    }

    #[inline]
    pub fn tuple(items: impl Into<Rc<[Value]>>) -> Self {
        Value::Tuple(items.into())
    }

    #[inline]
    pub fn dict(dict: Dict) -> Self {
        Value::Dict(Rc::new(RefCell::new(dict)))
    }

    #[inline]
    pub fn token(token: Token) -> Self {
        Value::Token(Rc::new(token))
    }

    // Inspection

    /// The type name used in error messages and by `type(x).__name__`.
    pub fn type_name(&self) -> Cow<'static, str> {
        Cow::Borrowed(match self {
            Value::None => "NoneType",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Ellipsis => "ellipsis",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Dict(_) => "dict",
            Value::Function(_) => "function",
            Value::Builtin(_) => "builtin_function_or_method",
            Value::Method(_) => "method",
            Value::Class(_) => "type",
            Value::Instance(instance) => return Cow::Owned(instance.class.name.clone()),
            Value::Module(_) => "module",
            Value::Token(_) => "Token",
            Value::Kind(_) => "TokenKind",
            Value::Code(_) => "Code",
            Value::Node(node) => node.kind(),
        })
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.borrow().is_empty(),
            Value::Tuple(items) => !items.is_empty(),
            Value::Dict(dict) => !dict.borrow().is_empty(),
            _ => true,
        }
    }

    /// Integer view of ints and bools.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    /// Float view of any number.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            other => other.as_int().map(int_to_float),
        }
    }

    /// Functions, classes and instances with `__call__`.
    pub fn is_callable(&self) -> bool {
        match self {
            Value::Function(_) | Value::Builtin(_) | Value::Method(_) | Value::Class(_) => true,
            Value::Instance(instance) => instance.class.lookup("__call__").is_some(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    // Text

    /// The `repr()` of this value.
    pub fn repr(&self) -> String {
        let mut out = String::new();
        self.repr_into(&mut out, 0);
        out
    }

    /// The `str()` of this value.
    pub fn to_str(&self) -> String {
        match self {
            Value::Str(s) => s.to_string(),
            Value::Code(code) => code.text().to_owned(),
            Value::Node(node) => node.unparse(),
            Value::Kind(kind) => kind.name().to_owned(),
            other => other.repr(),
        }
    }

    fn repr_into(&self, out: &mut String, depth: usize) {
        if depth > MAX_REPR_DEPTH {
            out.push_str("...");
            return;
        }
        match self {
            Value::None => out.push_str("None"),
            Value::Bool(true) => out.push_str("True"),
            Value::Bool(false) => out.push_str("False"),
            Value::Int(n) => out.push_str(&n.to_string()),
            Value::Float(f) => out.push_str(&float_repr(*f)),
            Value::Str(s) => out.push_str(&quoted(s)),
            Value::Ellipsis => out.push_str("Ellipsis"),
            Value::List(items) => {
                out.push('[');
                repr_items(out, &items.borrow(), depth);
                out.push(']');
            }
            Value::Tuple(items) => {
                out.push('(');
                repr_items(out, items, depth);
                if items.len() == 1 {
                    out.push(',');
                }
                out.push(')');
            }
            Value::Dict(dict) => {
                out.push('{');
                for (i, (key, value)) in dict.borrow().iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    key.repr_into(out, depth + 1);
                    out.push_str(": ");
                    value.repr_into(out, depth + 1);
                }
                out.push('}');
            }
            Value::Function(function) => out.push_str(&format!("<function {}>", function.name)),
            Value::Builtin(builtin) => {
                out.push_str(&format!("<built-in function {}>", builtin.name()));
            }
            Value::Method(method) => out.push_str(&format!("<bound method {}>", method.name())),
            Value::Class(class) => out.push_str(&format!("<class '{}'>", class.name)),
            Value::Instance(instance) => {
                out.push_str(&format!("<{} object>", instance.class.name));
            }
            Value::Module(module) => out.push_str(&format!("<module '{}'>", module.name)),
            Value::Token(token) => out.push_str(&token.to_string()),
            Value::Kind(kind) => out.push_str(kind.name()),
            Value::Code(code) => {
                out.push_str("Code(");
                out.push_str(&quoted(code.text()));
                out.push(')');
            }
            Value::Node(node) => {
                out.push_str(&format!("<{} line {}>", node.kind(), node.line()));
            }
        }
    }

    // Comparison

    /// `==` semantics.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::None, Value::None) | (Value::Ellipsis, Value::Ellipsis) => true,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                Rc::ptr_eq(a, b) || items_equal(&a.borrow(), &b.borrow())
            }
            (Value::Tuple(a), Value::Tuple(b)) => items_equal(a, b),
            (Value::Dict(a), Value::Dict(b)) => Rc::ptr_eq(a, b) || a.borrow().equals(&b.borrow()),
            (Value::Token(a), Value::Token(b)) => a == b,
            (Value::Token(token), Value::Tuple(pair)) | (Value::Tuple(pair), Value::Token(token)) => {
                token_equals_pair(token, pair)
            }
            (Value::Kind(a), Value::Kind(b)) => a == b,
            (Value::Code(a), Value::Code(b)) => a.text() == b.text(),
            (Value::Node(a), Value::Node(b)) => a == b,
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            (Value::Module(a), Value::Module(b)) => Rc::ptr_eq(a, b),
            (Value::Method(a), Value::Method(b)) => Rc::ptr_eq(a, b),
            (a, b) => match (a.as_int(), b.as_int()) {
                (Some(x), Some(y)) => x == y,
                _ => match (a.as_float(), b.as_float()) {
                    (Some(x), Some(y)) => x == y,
                    _ => false,
                },
            },
        }
    }

    /// `is` semantics: identity for shared values, equality for scalars.
    pub fn is_same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            (Value::Dict(a), Value::Dict(b)) => Rc::ptr_eq(a, b),
            (Value::Tuple(a), Value::Tuple(b)) => Rc::ptr_eq(a, b),
            (Value::Token(a), Value::Token(b)) => Rc::ptr_eq(a, b),
            (Value::Code(a), Value::Code(b)) => a.ptr_eq(b),
            _ => {
                std::mem::discriminant(self) == std::mem::discriminant(other) && self.equals(other)
            }
        }
    }

    /// Ordering for `<`, `min`, `sorted` and friends. `None` when the two
    /// values are not comparable.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            (Value::List(a), Value::List(b)) => compare_items(&a.borrow(), &b.borrow()),
            (Value::Tuple(a), Value::Tuple(b)) => compare_items(a, b),
            (Value::Kind(a), Value::Kind(b)) => Some(a.cmp(b)),
            (a, b) => match (a.as_int(), b.as_int()) {
                (Some(x), Some(y)) => Some(x.cmp(&y)),
                _ => a.as_float()?.partial_cmp(&b.as_float()?),
            },
        }
    }

    // Iteration

    /// The items produced by iterating over this value.
    pub fn iterate(&self) -> Result<Vec<Value>, ScriptError> {
        match self {
            Value::List(items) => Ok(items.borrow().clone()),
            Value::Tuple(items) => Ok(items.to_vec()),
            Value::Str(s) => Ok(s.chars().map(|c| Value::string(c.to_string())).collect()),
            Value::Dict(dict) => Ok(dict.borrow().keys()),
            Value::Token(token) => Ok(vec![
                Value::Kind(token.kind),
                Value::string(token.text.as_str()),
            ]),
            other => Err(errors::not_iterable(&other.type_name())),
        }
    }

    /// Key for dict lookups and `in` tests over dicts.
    pub fn hash_key(&self) -> Result<HashKey, ScriptError> {
        HashKey::of(self)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr())
    }
}

/// Script equality, so `1 == 1.0` holds here too.
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        self.equals(other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_str())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

impl From<Code> for Value {
    fn from(code: Code) -> Self {
        Value::Code(code)
    }
}

fn repr_items(out: &mut String, items: &[Value], depth: usize) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        item.repr_into(out, depth + 1);
    }
}

fn items_equal(a: &[Value], b: &[Value]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.equals(y))
}

fn compare_items(a: &[Value], b: &[Value]) -> Option<Ordering> {
    for (x, y) in a.iter().zip(b) {
        if !x.equals(y) {
            return x.compare(y);
        }
    }
    Some(a.len().cmp(&b.len()))
}

fn token_equals_pair(token: &Token, pair: &[Value]) -> bool {
    match pair {
        [Value::Kind(kind), Value::Str(text)] => token.is(*kind, text),
        _ => false,
    }
}

/// Shortest text that reads back as the same float.
pub fn float_repr(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_owned();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_owned();
    }
    let text = format!("{value:?}");
    if text.contains(['.', 'e']) {
        text
    } else {
        format!("{text}.0")
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "int to float conversion is lossy by definition"
)]
pub(crate) fn int_to_float(n: i64) -> f64 {
    n as f64
}

// Callables and objects

/// The code of a user function.
#[derive(Clone, Debug)]
pub enum FunctionBody {
    Block(Rc<FunctionDef>),
    Lambda { params: Rc<Params>, body: Rc<Expr> },
}

impl FunctionBody {
    pub fn params(&self) -> &Params {
        match self {
            FunctionBody::Block(def) => &def.params,
            FunctionBody::Lambda { params, .. } => params,
        }
    }
}

/// A user-defined function or lambda, closed over its defining scope.
#[derive(Debug)]
pub struct Function {
    pub name: String,
    pub body: FunctionBody,
    /// Defaults of positional parameters, evaluated at definition time.
    pub defaults: Vec<Option<Value>>,
    /// Defaults of keyword-only parameters.
    pub kw_defaults: Vec<Option<Value>>,
    pub scope: LocalScope<Scope>,
    pub is_generator: bool,
    /// Line of the definition, used for tracebacks of one-line lambdas.
    pub line: usize,
}

/// A method looked up through an instance or a builtin value.
#[derive(Debug)]
pub enum BoundMethod {
    User {
        receiver: Value,
        function: Rc<Function>,
    },
    /// A method of a builtin type, such as `str.join`.
    Native { receiver: Value, name: String },
    /// A builtin stored on a class, such as `NodeTransformer.visit`.
    Builtin { receiver: Value, builtin: Builtin },
}

impl BoundMethod {
    pub fn name(&self) -> &str {
        match self {
            BoundMethod::User { function, .. } => &function.name,
            BoundMethod::Native { name, .. } => name,
            BoundMethod::Builtin { builtin, .. } => builtin.name(),
        }
    }
}

/// A class defined by macro code.
#[derive(Debug)]
pub struct Class {
    pub name: String,
    pub bases: Vec<Rc<Class>>,
    pub attrs: RefCell<FxHashMap<String, Value>>,
}

impl Class {
    /// Depth-first lookup through the class and its bases.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.attrs.borrow().get(name) {
            return Some(value.clone());
        }
        self.bases.iter().find_map(|base| base.lookup(name))
    }

    pub fn is_subclass_of(&self, other: &Class) -> bool {
        std::ptr::eq(self, other) || self.bases.iter().any(|base| base.is_subclass_of(other))
    }
}

#[derive(Debug)]
pub struct Instance {
    pub class: Rc<Class>,
    pub attrs: RefCell<FxHashMap<String, Value>>,
}

impl Instance {
    pub fn new(class: Rc<Class>) -> Self {
        Instance {
            class,
            attrs: RefCell::new(FxHashMap::default()),
        }
    }
}

/// An importable module such as `token`.
#[derive(Debug)]
pub struct ModuleValue {
    pub name: String,
    pub attrs: FxHashMap<String, Value>,
}
