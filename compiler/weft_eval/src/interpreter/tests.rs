use pretty_assertions::assert_eq;
use weft_ir::TokenKind;
use weft_parse::{parse_expression, parse_module_text};

use super::*;
use crate::code::{Code, Origin};
use crate::errors::ErrorKind;
use crate::print_handler::buffer_handler;

fn interpreter() -> Interpreter {
    InterpreterBuilder::new().print_handler(buffer_handler()).build()
}

/// Run `source` in the locals and return what it printed.
fn run(source: &str) -> String {
    let interp = interpreter();
    let module = parse_module_text(source).unwrap();
    interp.exec(&module, Namespace::Locals).unwrap();
    interp.print_handler().get_output()
}

fn run_err(source: &str) -> ScriptError {
    let interp = interpreter();
    let module = parse_module_text(source).unwrap();
    interp.exec(&module, Namespace::Locals).unwrap_err()
}

fn eval(interp: &Interpreter, source: &str) -> Value {
    interp
        .eval(&parse_expression(source).unwrap(), Namespace::Locals)
        .unwrap()
}

#[test]
fn arithmetic_and_printing() {
    assert_eq!(run("print(1 + 2 * 3, 7 // 2, 7 / 2, 2 ** 10)\n"), "7 3 3.5 1024\n");
    assert_eq!(run("print('a', 'b', sep='-', end='!')\n"), "a-b!");
}

#[test]
fn control_flow() {
    let source = r"
total = 0
for i in range(10):
    if i % 2:
        continue
    if i > 6:
        break
    total += i
else:
    total = -1
print(total)
n = 0
while n < 3:
    n += 1
else:
    print('done', n)
";
    assert_eq!(run(source), "12\ndone 3\n");
}

#[test]
fn closures_capture_defining_scope() {
    let source = r"
def counter(start):
    items = [start]
    def bump():
        items.append(items[-1] + 1)
        return items[-1]
    return bump

b = counter(10)
b()
print(b())
";
    assert_eq!(run(source), "12\n");
}

#[test]
fn default_and_keyword_arguments() {
    let source = r"
def f(a, b=2, *rest, c=3, **extra):
    return (a, b, rest, c, sorted(extra.keys()))

print(f(1))
print(f(1, 5, 6, 7, c=0, z=1, y=2))
";
    assert_eq!(
        run(source),
        "(1, 2, (), 3, [])\n(1, 5, (6, 7), 0, ['y', 'z'])\n"
    );
}

#[test]
fn argument_errors() {
    let err = run_err("def f(a, b):\n    pass\nf(1)\n");
    assert_eq!(err.kind, ErrorKind::Type);
    assert_eq!(err.message, "f() missing required argument: 'b'");

    let err = run_err("def f(a):\n    pass\nf(1, a=2)\n");
    assert_eq!(err.kind, ErrorKind::Type);

    let err = run_err("len(1, 2)\n");
    assert_eq!(err.message, "len() takes exactly one argument (2 given)");
}

#[test]
fn classes_and_bound_methods() {
    let source = r"
class Greeter:
    greeting = 'hello'
    def __init__(self, name):
        self.name = name
    def greet(self):
        return self.greeting + ' ' + self.name

class Loud(Greeter):
    def greet(self):
        return Greeter.greet(self).upper()

g = Loud('weft')
print(g.greet(), isinstance(g, Greeter), type(g).__name__)
";
    assert_eq!(run(source), "HELLO WEFT True Loud\n");
}

#[test]
fn class_called_with_engine_code_is_a_factory() {
    let source = r"
class Upper:
    def __call__(self, code):
        return code.text.upper()
";
    let interp = interpreter();
    interp
        .exec(&parse_module_text(source).unwrap(), Namespace::Locals)
        .unwrap();
    let class = interp.lookup("Upper").unwrap();

    let engine = Value::Code(Code::from_text("x = 1\n", Origin::Engine));
    let out = interp.call(&class, vec![engine]).unwrap();
    assert_eq!(out.to_str(), "X = 1\n");

    // User-built code is an ordinary constructor argument.
    let user = Value::Code(Code::from_text("x = 1\n", Origin::User));
    let err = interp.call(&class, vec![user]).unwrap_err();
    assert_eq!(err.message, "Upper() takes no arguments");
}

#[test]
fn generators_collect_yielded_values() {
    let source = r"
def evens(n):
    for i in range(n):
        if i % 2 == 0:
            yield i
    yield from ['end']

print(evens(5))
";
    assert_eq!(run(source), "[0, 2, 4, 'end']\n");
}

#[test]
fn comprehensions_and_lambdas() {
    let source = r"
squares = [x * x for x in range(5) if x != 2]
pairs = dict(zip('ab', [1, 2]))
key = lambda s: -len(s)
print(squares, pairs, sorted(['a', 'ccc', 'bb'], key=key))
";
    assert_eq!(run(source), "[0, 1, 9, 16] {'a': 1, 'b': 2} ['ccc', 'bb', 'a']\n");
}

#[test]
fn unpacking_assignment() {
    let source = r"
a, *b, c = [1, 2, 3, 4]
(x, y), z = (5, 6), 7
print(a, b, c, x, y, z)
";
    assert_eq!(run(source), "1 [2, 3] 4 5 6 7\n");
}

#[test]
fn fstrings_and_format() {
    let source = r#"
name = 'w'
width = 5
print(f"[{name!r:>{width}}] {3.14159:.2f} {255:#x}")
print('{0}-{1}-{0}'.format('a', 'b'), '{}{}'.format(1, 2))
print('{k[0]}/{v}'.format(k='xy', v=2))
print('%s=%d' % ('n', 4))
"#;
    assert_eq!(run(source), "[  'w'] 3.14 0xff\na-b-a 12\nx/2\nn=4\n");
}

#[test]
fn string_methods() {
    let source = r"
s = '  a,b,,c  '
print(s.strip().split(','), '-'.join(['x', 'y']), s.count(','), s.find('b'))
print('abc'.startswith(('x', 'a')), 'f1'.isidentifier(), '12'.isdigit(), 'AbC'.lower())
print('a b  c'.split(), 'a b c'.split(' ', 1), 'x\ny'.splitlines())
";
    assert_eq!(
        run(source),
        "['a', 'b', '', 'c'] x-y 3 4\nTrue True True abc\n['a', 'b', 'c'] ['a', 'b c'] ['x', 'y']\n"
    );
}

#[test]
fn list_and_dict_methods() {
    let source = r"
xs = [3, 1]
ys = xs
ys.append(2)
xs.extend(xs)
xs.insert(0, 9)
print(xs.pop(), xs.index(1), xs)
d = {'a': 1}
d.update(b=2)
print(d.get('z', 0), d.pop('a'), list(d.items()))
";
    assert_eq!(run(source), "2 2 [9, 3, 1, 2, 3, 1]\n0 1 [('b', 2)]\n");
}

#[test]
fn raise_uses_builtin_error_kinds() {
    let err = run_err("raise ValueError('bad value')\n");
    assert_eq!(err.kind, ErrorKind::Value);
    assert_eq!(err.message, "bad value");

    let err = run_err("class Custom(KeyError):\n    pass\nraise Custom('k')\n");
    assert_eq!(err.kind, ErrorKind::Key);

    let err = run_err("raise 'plain'\n");
    assert_eq!(err.kind, ErrorKind::Runtime);
    assert_eq!(err.message, "plain");

    let err = run_err("assert 1 == 2, 'nope'\n");
    assert_eq!(err.kind, ErrorKind::Assertion);
    assert_eq!(err.message, "nope");
}

#[test]
fn traceback_records_each_frame() {
    let source = r"
def inner():
    return 1 / 0

def outer():
    x = 1
    return inner()

outer()
";
    let err = run_err(source);
    assert_eq!(err.kind, ErrorKind::ZeroDivision);
    let frames: Vec<_> = err
        .traceback()
        .map(|frame| (frame.function.as_str(), frame.line))
        .collect();
    assert_eq!(frames, vec![("<macro>", 9), ("outer", 7), ("inner", 3)]);
    assert!(err.render().starts_with("Traceback (most recent call last):\n"));
}

#[test]
fn recursion_limit_is_an_error() {
    let interp = InterpreterBuilder::new()
        .print_handler(buffer_handler())
        .recursion_limit(50)
        .build();
    let module = parse_module_text("def f(n):\n    return f(n + 1)\nf(0)\n").unwrap();
    let err = interp.exec(&module, Namespace::Locals).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Recursion);
}

#[test]
fn token_module_imports() {
    let source = r"
from token import NAME, OP
import tokenize as tk
toks = tk.tokenize('a + 1')
print(toks[0].kind == NAME, toks[1].kind == NAME, toks[1].text, OP)
";
    assert_eq!(run(source), "True False + OP\n");

    let err = run_err("import os\n");
    assert_eq!(err.kind, ErrorKind::Import);
    let err = run_err("from token import NOPE\n");
    assert_eq!(err.kind, ErrorKind::Import);
}

#[test]
fn code_values_expose_three_views() {
    let interp = interpreter();
    interp.define(
        Namespace::Locals,
        "c",
        Value::Code(Code::from_text("y = 2\n", Origin::Engine)),
    );
    assert_eq!(eval(&interp, "c.text").to_str(), "y = 2\n");
    assert_eq!(eval(&interp, "len(c.tokens)"), Value::Int(4));
    assert_eq!(eval(&interp, "c.tokens[0].kind").to_str(), "NAME");
    assert_eq!(eval(&interp, "unparse(c)").to_str(), "y = 2\n");
    let import = parse_module_text("from token import NAME\n").unwrap();
    interp.exec(&import, Namespace::Locals).unwrap();
    assert_eq!(eval(&interp, "Token(NAME, 'q').text").to_str(), "q");
    assert_eq!(eval(&interp, "Code('z = 3').origin").to_str(), "user");
}

#[test]
fn callables_are_recognized() {
    let interp = interpreter();
    let source = "def f():\n    pass\nclass Plain:\n    pass\nclass Macro:\n    def __call__(self, code):\n        return code\n";
    interp
        .exec(&parse_module_text(source).unwrap(), Namespace::Locals)
        .unwrap();
    for callable in ["f", "len", "Plain", "Macro", "Macro()", "[].append"] {
        assert!(eval(&interp, callable).is_callable(), "{callable}");
    }
    for value in ["1", "'f'", "Plain()", "None"] {
        assert!(!eval(&interp, value).is_callable(), "{value}");
    }
}

#[test]
fn code_attributes_are_read_only() {
    let interp = interpreter();
    interp.define(
        Namespace::Locals,
        "c",
        Value::Code(Code::from_text("y = 2\n", Origin::Engine)),
    );
    let module = parse_module_text("c.text = 'x'\n").unwrap();
    let err = interp.exec(&module, Namespace::Locals).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Attribute);
}

#[test]
fn namespaces_are_separate() {
    let interp = interpreter();
    let module = parse_module_text("g = 1\n").unwrap();
    interp.exec(&module, Namespace::Globals).unwrap();
    let module = parse_module_text("l = g + 1\n").unwrap();
    interp.exec(&module, Namespace::Locals).unwrap();

    assert_eq!(interp.names(Namespace::Globals), vec!["g".to_owned()]);
    assert_eq!(interp.names(Namespace::Locals), vec!["l".to_owned()]);
    assert!(interp.is_bound("g"));
    assert!(!interp.is_local("g"));
    assert!(!interp.is_bound("print"));
    assert_eq!(interp.lookup("l"), Some(Value::Int(2)));
}

#[test]
fn builtins_cover_common_helpers() {
    let interp = interpreter();
    assert_eq!(eval(&interp, "int('ff', 16) + int(2.9) + abs(-3)"), Value::Int(260));
    assert_eq!(eval(&interp, "min([3, 1, 2]) + max(4, 9)"), Value::Int(10));
    assert_eq!(eval(&interp, "sum(range(5)) + len({'a': 1})"), Value::Int(11));
    assert_eq!(eval(&interp, "getattr(1, 'nope', 7)"), Value::Int(7));
    assert_eq!(eval(&interp, "any([0, '', 3]) and not all([1, 0])"), Value::Bool(true));
    assert_eq!(eval(&interp, "list(enumerate('ab', 1))").repr(), "[(1, 'a'), (2, 'b')]");
    assert_eq!(eval(&interp, "list(reversed(range(3)))").repr(), "[2, 1, 0]");
    assert_eq!(eval(&interp, "Token('OP', '+').kind"), Value::Kind(TokenKind::Op));

    let err = interp
        .eval(&parse_expression("range(1, 2, 0)").unwrap(), Namespace::Locals)
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Value);
    let err = interp
        .eval(&parse_expression("sorted([1, 'a'])").unwrap(), Namespace::Locals)
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Type);
}

#[test]
fn node_transformer_rewrites_expressions() {
    let source = r"
import ast
class AddOne(NodeTransformer):
    def visit_Constant(self, node):
        if isinstance(node.value, int):
            return ast.BinOp(left=node, op=ast.Add(), right=ast.Constant(1))
        return node
print(AddOne()(Code('y = (a - 2) * 2.5')).text)
";
    assert_eq!(run(source), "y = (a - (2 + 1)) * 2.5\n\n");
}

#[test]
fn generic_visit_rebuilds_children_first() {
    let source = r"
import ast
class Swap(NodeTransformer):
    def visit_BinOp(self, node):
        node = self.generic_visit(node)
        return ast.BinOp(node.right, node.op, node.left)
print(Swap()(Code('x = 1 - (2 - 3)')).text)
";
    assert_eq!(run(source), "x = 3 - 2 - 1\n\n");
}

#[test]
fn statement_visitors_remove_and_splice() {
    let source = r"
import ast
class Edit(NodeTransformer):
    def visit_Pass(self, node):
        return None
    def visit_Expr(self, node):
        return [node, ast.Expr(ast.Name('done'))]
print(Edit()(Code('f()\npass\n')).text)
";
    assert_eq!(run(source), "f()\ndone\n\n");
}

#[test]
fn ast_constructors_are_node_types() {
    let interp = interpreter();
    interp
        .exec(&parse_module_text("import ast\n").unwrap(), Namespace::Locals)
        .unwrap();
    assert_eq!(
        eval(&interp, "unparse(ast.Call(ast.Name('f'), [1, ast.UnaryOp(ast.USub(), ast.Name('x'))]))").to_str(),
        "f(1, -x)"
    );
    assert_eq!(eval(&interp, "isinstance(ast.Constant(1), ast.Constant)"), Value::Bool(true));
    assert_eq!(eval(&interp, "isinstance(ast.Name('a'), (ast.Constant, int))"), Value::Bool(false));
    assert_eq!(eval(&interp, "ast.Mult()").to_str(), "*");

    let err = interp
        .eval(&parse_expression("ast.BinOp(left=1)").unwrap(), Namespace::Locals)
        .unwrap_err();
    assert_eq!(err.message, "BinOp() missing required argument: 'op'");
}

#[test]
fn expression_visitors_must_return_expressions() {
    let source = r"
import ast
class Bad(NodeTransformer):
    def visit_Name(self, node):
        return ast.Pass()
Bad()(Code('y = a'))
";
    assert_eq!(run_err(source).kind, ErrorKind::Type);
}
