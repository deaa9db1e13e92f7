//! Expansion of whole source units.

use pretty_assertions::assert_eq;
use weft_expand::ExpandError;

use crate::common::{expand, try_expand};

#[test]
fn constant_expression_is_folded() {
    assert_eq!(expand("macro X = 2 + 2\nprint(X)\n"), "print(4)\n");
}

#[test]
fn identity_macro_keeps_the_block() {
    let block = "def area(w, h):\n    return w * h  # width times height\n";
    let source = format!("macro def identity(code):\n    return code\n@identity\n{block}");
    assert_eq!(expand(&source), format!("{block}\n"));
}

#[test]
fn chained_macros_nest_like_calls() {
    let source = r#"macro def a(code):
    return "a(" + code.text.strip() + ")"
macro def b(code):
    return "b(" + code.text.strip() + ")"
@a
@b
def B(): pass
"#;
    assert_eq!(expand(source), "a(b(def B(): pass))\n");
}

#[test]
fn multi_line_macro_import() {
    let source = r"macro from token import (NAME,
                         OP)
macro def first_kind(code):
    return str(code.tokens[0].kind == NAME)
@first_kind
def f(): pass
";
    assert_eq!(expand(source), "True\n");
}

#[test]
fn constants_are_stable_across_uses_and_units() {
    let source = "macro GREETING = repr('hello')\na = GREETING\nb = GREETING\n";
    let first = expand(source);
    assert_eq!(first, "a = 'hello'\nb = 'hello'\n");
    assert_eq!(expand(source), first);
}

#[test]
fn string_constants_splice_as_names_unless_quoted() {
    assert_eq!(expand("macro TARGET = 'counter'\nTARGET += 1\n"), "counter += 1\n");
}

#[test]
fn macros_generate_code_from_token_lists() {
    let source = r"macro from token import NAME, OP, NUMBER
macro def const(code):
    name = code.tokens[1].text
    return [(NAME, name), (OP, '='), (NUMBER, '0')]
@const
def counter(): pass
print(counter)
";
    assert_eq!(expand(source), "counter=0\nprint(counter)\n");
}

#[test]
fn class_macros_take_decorator_arguments() {
    let source = r"macro class Prefix:
    def __init__(self, prefix):
        self.prefix = prefix
    def __call__(self, code):
        return code.text.replace('def ', 'def ' + self.prefix)
@Prefix('test_')
def addition():
    assert 1 + 1 == 2
";
    assert_eq!(
        expand(source),
        "def test_addition():\n    assert 1 + 1 == 2\n\n"
    );
}

#[test]
fn nested_definitions_are_expanded_in_place() {
    let source = r"macro LIMIT = 10
class Buffer:
    size = LIMIT
    def full(self, n):
        return n >= LIMIT
";
    assert_eq!(
        expand(source),
        "class Buffer:\n    size = 10\n    def full(self, n):\n        return n >= 10\n"
    );
}

#[test]
fn errors_abort_the_whole_unit() {
    let source = "x = 1\nmacro def f(x):\n    return x.missing\ny = f(2)\n";
    assert!(matches!(try_expand(source), Err(ExpandError::Execution(_))));
}
