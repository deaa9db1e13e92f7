use pretty_assertions::assert_eq;
use proptest::prelude::*;
use weft_eval::{buffer_handler, PrintTarget};
use weft_ir::{untokenize, TokenKind};
use weft_stream::TokenStream;

use super::*;
use crate::expand_with;

fn options() -> ExpandOptions {
    ExpandOptions::new().print_target(PrintTarget::Silent)
}

fn expand(source: &str) -> String {
    expand_with(source, &options()).unwrap()
}

fn expand_err(source: &str) -> ExpandError {
    expand_with(source, &options()).unwrap_err()
}

/// What the source renders to when nothing is rewritten.
fn unchanged(source: &str) -> String {
    untokenize(weft_lexer::tokenize_with_endmarker(source).unwrap())
}

#[test]
fn constant_is_substituted() {
    assert_eq!(expand("macro X = 2 + 2\nprint(X)\n"), "print(4)\n");
    assert_eq!(expand("macro X = 2 + 2\ny = X\n"), "y = 4\n");
}

#[test]
fn constants_can_be_rebound() {
    let source = "macro X = 1\na = X\nmacro X = X + 1\nb = X\n";
    assert_eq!(expand(source), "a = 1\nb = 2\n");
}

#[test]
fn expansion_is_idempotent_once_macros_are_gone() {
    let once = expand("macro N = 3\nfor i in range(N):\n    print(i * N)\n");
    assert_eq!(once, "for i in range(3):\n    print(i * 3)\n");
    assert_eq!(expand(&once), once);
}

#[test]
fn function_like_macro_is_invoked() {
    let source = r"
macro def twice(x):
    return x * 2
y = twice(21)
";
    assert_eq!(expand(source), "\ny = 42\n");
}

#[test]
fn invocation_result_fragment_is_relexed() {
    let source = r"
macro def square(x):
    return f'({x} * {x})'
y = square(3) + 1
";
    assert_eq!(expand(source), "\ny = (3 * 3) + 1\n");
}

#[test]
fn identity_decorator_reproduces_block() {
    let source = r"macro def identity(code):
    return code
@identity
def f(a, b):
    return a + b
";
    assert_eq!(expand(source), "def f(a, b):\n    return a + b\n\n");
}

#[test]
fn decorators_apply_innermost_first() {
    let source = r#"macro def first(code):
    return code.text + "x = 1\n"
macro def second(code):
    return code.text + "x = 2\n"
@first
@second
def f():
    pass
"#;
    assert_eq!(expand(source), "def f():\n    pass\nx = 2\nx = 1\n\n");
}

#[test]
fn ordinary_decorators_are_kept() {
    let source = r"macro def identity(code):
    return code
@staticmethod
@identity
def f():
    pass
";
    assert_eq!(expand(source), "@staticmethod\ndef f():\n    pass\n\n");
}

#[test]
fn chain_without_macros_is_untouched() {
    let source = "@property\ndef f(self):\n    return X\n";
    assert_eq!(expand(source), unchanged(source));
}

#[test]
fn decorator_returning_none_removes_the_block() {
    let source = r"macro def drop(code):
    return None
@drop
def f():
    pass
x = 1
";
    assert_eq!(expand(source), "\nx = 1\n");
}

#[test]
fn constants_inside_rewritten_blocks_are_substituted() {
    let source = r"macro N = 3
macro def identity(code):
    return code
@identity
def f():
    return N
";
    assert_eq!(expand(source), "def f():\n    return 3\n\n");
}

#[test]
fn macro_keyword_defines_classes() {
    let source = r"macro class Upper:
    def __call__(self, code):
        return code.text.replace('pass', 'return 1')
@Upper
def f():
    pass
";
    assert_eq!(expand(source), "def f():\n    return 1\n\n");
}

#[test]
fn node_transformer_rewrites_the_decorated_block() {
    let source = r#"macro import ast

macro class TransformInt(NodeTransformer):
    def visit_Num(self, node):
        if isinstance(node.n, int):
            return ast.BinOp(
                left=node,
                op=ast.Add(),
                right=ast.Constant(1)
            )
        return node

@TransformInt
def foo(a, b):
    return (a - 2) * (b + 2.5)

if __name__ == "__main__":
    print(foo(1, 2))
"#;
    let out = expand(source);
    assert!(
        out.contains("def foo(a, b):\n    return (a - (2 + 1)) * (b + 2.5)\n"),
        "{out}"
    );
    assert!(out.contains("if __name__ == \"__main__\":\n    print(foo(1, 2))\n"), "{out}");
    assert!(!out.contains("macro") && !out.contains("@TransformInt"), "{out}");
}

#[test]
fn decorator_arguments_build_the_macro() {
    let source = r"macro class Repeat:
    def __init__(self, n):
        self.n = n
    def __call__(self, code):
        return code.text * self.n
@Repeat(2)
def f():
    pass
";
    assert_eq!(
        expand(source),
        "def f():\n    pass\ndef f():\n    pass\n\n"
    );
}

#[test]
fn macro_marker_decorator_registers_definition() {
    let source = r"@macro
def double(x):
    return x * 2
y = double(4)
";
    assert_eq!(expand(source), "y = 8\n");
}

#[test]
fn macro_definitions_can_be_rewritten_by_macros() {
    let source = r"macro def rename(code):
    return code.text.replace('tmp', 'triple')
@rename
macro def tmp(x):
    return x * 3
y = triple(2)
";
    assert_eq!(expand(source), "y = 6\n");
}

#[test]
fn parenthesized_import_spans_lines() {
    let source = r"macro from token import (
    NAME,
    OP
)
macro K = str(OP)
print(K)
";
    assert_eq!(expand(source), "print(OP)\n");
}

#[test]
fn matrix_multiplication_is_not_a_decorator() {
    for source in ["x = a @ b\n", "x = (a\n     @ b)\n", "@foo\nx = 1\n"] {
        assert_eq!(expand(source), unchanged(source));
    }
}

#[test]
fn macro_is_an_ordinary_name_elsewhere() {
    for source in ["macro = 1\nprint(macro)\n", "x = macro\n", "macro(1)\n"] {
        assert_eq!(expand(source), unchanged(source));
    }
}

#[test]
fn macro_names_are_not_constants() {
    let source = "macro def twice(x):\n    return x * 2\ny = twice\n";
    assert_eq!(expand(source), "y = twice\n");

    let source = r"macro def identity(code):
    return code
@identity
@identity
def f():
    return identity
";
    assert_eq!(expand(source), "def f():\n    return identity\n\n");
}

#[test]
fn invocation_returning_a_function_is_an_error() {
    let source = "macro def make():\n    return len\ny = make()\n";
    assert!(matches!(expand_err(source), ExpandError::Code(_)));
}

#[test]
fn lists_of_values_splice_as_displays() {
    assert_eq!(expand("macro X = [1, 2]\ny = X\n"), "y = [1, 2]\n");
}

#[test]
fn decorator_comments_and_blank_lines_are_kept() {
    for source in [
        "@property  # note\ndef f(self):\n    return 1\n",
        "@a\n\n# c\n@b\ndef f():\n    pass\n",
        "class C:\n    @a  # first\n\n    @b\n    def f(self):\n        pass\n",
    ] {
        assert_eq!(expand(source), unchanged(source));
    }

    let source = r"macro def identity(code):
    return code
@staticmethod  # keep
@identity
def f():
    pass
";
    assert_eq!(expand(source), "@staticmethod  # keep\ndef f():\n    pass\n\n");
}

#[test]
fn macro_followed_by_a_bare_name_is_a_parse_error() {
    let err = expand_err("x = 1\nmacro foo bar\n");
    let ExpandError::Parse(err) = err else {
        panic!("expected a parse error, got {err:?}");
    };
    assert_eq!(err.line, 2);
    // Keywords after `macro` keep it an ordinary name.
    let source = "macro if flag else other\n";
    assert_eq!(expand(source), unchanged(source));
}

#[test]
fn decorated_macro_needs_a_definition() {
    let err = expand_err("@macro\nmacro x = 1\n");
    let ExpandError::Parse(err) = err else {
        panic!("expected a parse error, got {err:?}");
    };
    assert_eq!(err.line, 2);
}

#[test]
fn unbalanced_invocation_is_a_parse_error() {
    let source = "macro def f(x):\n    return x\ny = f(1,\n";
    assert!(matches!(
        expand_with(source, &options()),
        Err(ExpandError::Lex(_) | ExpandError::Parse(_))
    ));
}

#[test]
fn macro_code_errors_are_reported() {
    assert!(matches!(expand_err("macro X = 1 / 0\n"), ExpandError::Execution(_)));
    assert!(matches!(expand_err("macro def f(x) pass:\n    pass\n"), ExpandError::Syntax(_)));
    let err = expand_err("macro def f(x):\n    return x.nope\ny = f(1)\n");
    let ExpandError::Execution(err) = err else {
        panic!("expected an execution error, got {err:?}");
    };
    assert!(err.traceback().any(|frame| frame.function == "f"));
}

#[test]
fn macro_output_goes_to_the_print_handler() {
    let handler = buffer_handler();
    let options = ExpandOptions::new().print_handler(handler.clone());
    let out = expand_with("macro X = print('expanding')\nx = 1\n", &options).unwrap();
    assert_eq!(out, "x = 1\n");
    assert_eq!(handler.get_output(), "expanding\n");
}

#[test]
fn transform_ends_with_one_end_marker() {
    let tokens = weft_lexer::tokenize_with_endmarker("macro X = 1\ny = X\n").unwrap();
    let mut processor = MacroProcessor::new(TokenStream::new(tokens), &options());
    let out: Vec<_> = processor.transform().map(Result::unwrap).collect();
    assert_eq!(out.last().map(|token| token.kind), Some(TokenKind::EndMarker));
    assert_eq!(
        out.iter().filter(|token| token.kind == TokenKind::EndMarker).count(),
        1
    );
    assert!(processor.interpreter().is_local("X"));
}

#[test]
fn transform_is_fused_after_an_error() {
    let tokens = weft_lexer::tokenize_with_endmarker("macro X = 1 / 0\ny = 2\n").unwrap();
    let mut processor = MacroProcessor::new(TokenStream::new(tokens), &options());
    let mut transform = processor.transform();
    assert!(matches!(transform.next(), Some(Err(_))));
    assert!(transform.next().is_none());
    assert!(transform.next().is_none());
}

#[test]
fn bounded_lookahead_still_expands() {
    let options = options().lookahead(64);
    let source = "macro X = 7\nfor i in range(X):\n    print(X)\n";
    assert_eq!(
        expand_with(source, &options).unwrap(),
        "for i in range(7):\n    print(7)\n"
    );
}

#[test]
fn environments_do_not_leak_between_units() {
    assert_eq!(expand("macro X = 1\n"), "");
    assert_eq!(expand("y = X\n"), "y = X\n");
}

fn line() -> impl Strategy<Value = String> {
    ("[a-z][a-z0-9_]{0,5}", "[+*%-]", 0..1000_i64, "[a-z]{1,4}")
        .prop_map(|(target, op, number, other)| format!("{target}_ = {other}_ {op} {number}\n"))
}

proptest! {
    #[test]
    fn sources_without_macros_pass_through(lines in prop::collection::vec(line(), 1..8)) {
        let source = lines.concat();
        prop_assert_eq!(expand(&source), unchanged(&source));
    }
}
