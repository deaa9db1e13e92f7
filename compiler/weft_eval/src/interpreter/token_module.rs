//! The `token` module (also importable as `tokenize`).

use std::rc::Rc;

use rustc_hash::FxHashMap;
use weft_ir::TokenKind;

use crate::value::{Builtin, ModuleValue, Value};

pub(super) fn token_module() -> Rc<ModuleValue> {
    let mut attrs: FxHashMap<String, Value> = TokenKind::ALL
        .into_iter()
        .map(|kind| (kind.name().to_owned(), Value::Kind(kind)))
        .collect();
    for builtin in [Builtin::Tokenize, Builtin::Token] {
        attrs.insert(builtin.name().to_owned(), Value::Builtin(builtin));
    }
    Rc::new(ModuleValue {
        name: "token".to_owned(),
        attrs,
    })
}
