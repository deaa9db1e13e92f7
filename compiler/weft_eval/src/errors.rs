//! Errors raised by macro code.
//!
//! Every failure inside a macro body becomes a [`ScriptError`]. The
//! constructors below are the single place error messages are spelled, so
//! the interpreter never formats a message inline.

use std::fmt;

use thiserror::Error;

/// Category of a [`ScriptError`], shown as the familiar `XxxError` name.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Name,
    Type,
    Attribute,
    Index,
    Key,
    Value,
    ZeroDivision,
    Overflow,
    Assertion,
    Import,
    Recursion,
    Syntax,
    /// Raised explicitly with `raise`.
    Runtime,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 13] = [
        ErrorKind::Name,
        ErrorKind::Type,
        ErrorKind::Attribute,
        ErrorKind::Index,
        ErrorKind::Key,
        ErrorKind::Value,
        ErrorKind::ZeroDivision,
        ErrorKind::Overflow,
        ErrorKind::Assertion,
        ErrorKind::Import,
        ErrorKind::Recursion,
        ErrorKind::Syntax,
        ErrorKind::Runtime,
    ];

    /// The kind whose [`name`](Self::name) is `name`.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub const fn name(self) -> &'static str {
        match self {
            ErrorKind::Name => "NameError",
            ErrorKind::Type => "TypeError",
            ErrorKind::Attribute => "AttributeError",
            ErrorKind::Index => "IndexError",
            ErrorKind::Key => "KeyError",
            ErrorKind::Value => "ValueError",
            ErrorKind::ZeroDivision => "ZeroDivisionError",
            ErrorKind::Overflow => "OverflowError",
            ErrorKind::Assertion => "AssertionError",
            ErrorKind::Import => "ImportError",
            ErrorKind::Recursion => "RecursionError",
            ErrorKind::Syntax => "SyntaxError",
            ErrorKind::Runtime => "RuntimeError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One entry of a traceback: the function that was running and the line
/// it had reached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceFrame {
    pub function: String,
    pub line: usize,
}

/// A macro body failed.
///
/// The traceback is built while the error unwinds: the innermost statement
/// records its line, and each function boundary turns that line into a
/// [`TraceFrame`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ScriptError {
    pub kind: ErrorKind,
    pub message: String,
    /// Innermost frame first.
    frames: Vec<TraceFrame>,
    /// Line of the failing statement in the frame being unwound.
    pending_line: Option<usize>,
}

impl ScriptError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        ScriptError {
            kind,
            message: message.into(),
            frames: Vec::new(),
            pending_line: None,
        }
    }

    /// Frames from the outermost call to the failure site.
    pub fn traceback(&self) -> impl Iterator<Item = &TraceFrame> {
        self.frames.iter().rev()
    }

    /// Record the line of the statement that failed, unless a nested
    /// statement already did.
    #[must_use]
    pub(crate) fn at_line(mut self, line: usize) -> Self {
        self.pending_line.get_or_insert(line);
        self
    }

    /// Leave `function`, adding its frame to the traceback.
    #[must_use]
    pub(crate) fn unwind(mut self, function: &str, fallback_line: usize) -> Self {
        let line = self.pending_line.take().unwrap_or(fallback_line);
        self.frames.push(TraceFrame {
            function: function.to_owned(),
            line,
        });
        self
    }

    /// Multi-line report in the usual traceback layout.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if !self.frames.is_empty() {
            out.push_str("Traceback (most recent call last):\n");
            for frame in self.traceback() {
                out.push_str(&format!("  line {}, in {}\n", frame.line, frame.function));
            }
        }
        out.push_str(&self.to_string());
        out
    }
}

// Names and attributes

pub(crate) fn undefined_name(name: &str) -> ScriptError {
    ScriptError::new(ErrorKind::Name, format!("name '{name}' is not defined"))
}

pub(crate) fn no_attribute(type_name: &str, attr: &str) -> ScriptError {
    ScriptError::new(
        ErrorKind::Attribute,
        format!("'{type_name}' object has no attribute '{attr}'"),
    )
}

pub(crate) fn read_only_attribute(type_name: &str, attr: &str) -> ScriptError {
    ScriptError::new(
        ErrorKind::Attribute,
        format!("'{type_name}' object attribute '{attr}' is read-only"),
    )
}

pub(crate) fn import_error(module: &str) -> ScriptError {
    ScriptError::new(ErrorKind::Import, format!("No module named '{module}'"))
}

pub(crate) fn cannot_import_name(name: &str, module: &str) -> ScriptError {
    ScriptError::new(
        ErrorKind::Import,
        format!("cannot import name '{name}' from '{module}'"),
    )
}

// Calls

pub(crate) fn not_callable(type_name: &str) -> ScriptError {
    ScriptError::new(
        ErrorKind::Type,
        format!("'{type_name}' object is not callable"),
    )
}

pub(crate) fn wrong_arg_count(function: &str, expected: &str, got: usize) -> ScriptError {
    let was = if got == 1 { "was" } else { "were" };
    ScriptError::new(
        ErrorKind::Type,
        format!("{function}() takes {expected} positional arguments but {got} {was} given"),
    )
}

pub(crate) fn missing_argument(function: &str, param: &str) -> ScriptError {
    ScriptError::new(
        ErrorKind::Type,
        format!("{function}() missing required argument: '{param}'"),
    )
}

pub(crate) fn unexpected_keyword(function: &str, keyword: &str) -> ScriptError {
    ScriptError::new(
        ErrorKind::Type,
        format!("{function}() got an unexpected keyword argument '{keyword}'"),
    )
}

pub(crate) fn duplicate_argument(function: &str, param: &str) -> ScriptError {
    ScriptError::new(
        ErrorKind::Type,
        format!("{function}() got multiple values for argument '{param}'"),
    )
}

pub(crate) fn builtin_arity(function: &str, min: usize, max: usize, got: usize) -> ScriptError {
    let expected = match (min, max) {
        (0, 0) => "no arguments".to_owned(),
        (1, 1) => "exactly one argument".to_owned(),
        (min, max) if min == max => format!("exactly {min} arguments"),
        (0, max) => format!("at most {max} arguments"),
        (min, usize::MAX) => format!("at least {min} arguments"),
        (min, max) => format!("from {min} to {max} arguments"),
    };
    ScriptError::new(
        ErrorKind::Type,
        format!("{function}() takes {expected} ({got} given)"),
    )
}

pub(crate) fn recursion_limit_exceeded() -> ScriptError {
    ScriptError::new(ErrorKind::Recursion, "maximum recursion depth exceeded")
}

// Operators

pub(crate) fn unsupported_operand(op: &str, left: &str, right: &str) -> ScriptError {
    ScriptError::new(
        ErrorKind::Type,
        format!("unsupported operand type(s) for {op}: '{left}' and '{right}'"),
    )
}

pub(crate) fn bad_unary_operand(op: &str, type_name: &str) -> ScriptError {
    ScriptError::new(
        ErrorKind::Type,
        format!("bad operand type for unary {op}: '{type_name}'"),
    )
}

pub(crate) fn not_comparable(op: &str, left: &str, right: &str) -> ScriptError {
    ScriptError::new(
        ErrorKind::Type,
        format!("'{op}' not supported between instances of '{left}' and '{right}'"),
    )
}

pub(crate) fn division_by_zero() -> ScriptError {
    ScriptError::new(ErrorKind::ZeroDivision, "division by zero")
}

pub(crate) fn integer_overflow(operation: &str) -> ScriptError {
    ScriptError::new(
        ErrorKind::Overflow,
        format!("integer overflow in {operation}"),
    )
}

// Collections

pub(crate) fn not_iterable(type_name: &str) -> ScriptError {
    ScriptError::new(
        ErrorKind::Type,
        format!("'{type_name}' object is not iterable"),
    )
}

pub(crate) fn not_subscriptable(type_name: &str) -> ScriptError {
    ScriptError::new(
        ErrorKind::Type,
        format!("'{type_name}' object is not subscriptable"),
    )
}

pub(crate) fn unhashable(type_name: &str) -> ScriptError {
    ScriptError::new(ErrorKind::Type, format!("unhashable type: '{type_name}'"))
}

pub(crate) fn index_out_of_range(type_name: &str) -> ScriptError {
    ScriptError::new(ErrorKind::Index, format!("{type_name} index out of range"))
}

pub(crate) fn key_not_found(key_repr: String) -> ScriptError {
    ScriptError::new(ErrorKind::Key, key_repr)
}

pub(crate) fn unpack_mismatch(expected: usize, got: usize) -> ScriptError {
    let message = if got > expected {
        format!("too many values to unpack (expected {expected})")
    } else {
        format!("not enough values to unpack (expected {expected}, got {got})")
    };
    ScriptError::new(ErrorKind::Value, message)
}

// Generic

pub(crate) fn type_error(message: impl Into<String>) -> ScriptError {
    ScriptError::new(ErrorKind::Type, message)
}

pub(crate) fn value_error(message: impl Into<String>) -> ScriptError {
    ScriptError::new(ErrorKind::Value, message)
}

pub(crate) fn assertion_failed(message: String) -> ScriptError {
    ScriptError::new(ErrorKind::Assertion, message)
}

/// An error raised explicitly by macro code.
pub(crate) fn raised(kind: ErrorKind, message: String) -> ScriptError {
    ScriptError::new(kind, message)
}

pub(crate) fn syntax_error(message: impl Into<String>) -> ScriptError {
    ScriptError::new(ErrorKind::Syntax, message)
}
