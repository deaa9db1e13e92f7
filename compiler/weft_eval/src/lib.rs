//! Weft Eval - interpreter for macro code.
//!
//! Macro bodies are written in the host language's own syntax and run at
//! expansion time. This crate evaluates them.
//!
//! # Architecture
//!
//! - [`Interpreter`]: tree-walking evaluator over `weft_parse` syntax trees
//! - [`Value`]: runtime values, including [`Code`] (a block of source seen
//!   as text, tokens, or tree) and token values
//! - [`Scope`]/[`LocalScope`]: the lexical scope chain
//! - [`ScriptError`]: failures with a traceback of macro frames
//! - `NodeTransformer` and the `ast` module: macros that rewrite syntax
//!   trees instead of text
//! - [`format_value`]: the format-spec mini-language behind f-strings,
//!   `str.format` and `%`
//!
//! The interpreter is single-threaded; values use `Rc`. Only the print
//! handler is shareable across threads.

pub mod code;
mod environment;
pub mod errors;
pub mod format;
pub mod interpreter;
mod operators;
mod print_handler;
pub mod value;

pub use code::{Code, CodeError, Origin};
pub use environment::{LocalScope, Scope};
pub use errors::{ErrorKind, ScriptError, TraceFrame};
pub use format::{format_value, parse_format_spec, FormatSpec, FormatSpecError};
pub use interpreter::{EvalResult, Interpreter, InterpreterBuilder, Namespace};
pub use operators::{
    contains, evaluate_binary, evaluate_comparison, evaluate_unary, set_subscript, slice,
    slice_indices, subscript,
};
pub use print_handler::{
    buffer_handler, silent_handler, stderr_handler, stdout_handler, BufferPrintHandler,
    PrintHandlerImpl, PrintTarget, SharedPrintHandler,
};
pub use value::{float_repr, Builtin, Dict, HashKey, Node, Value};
