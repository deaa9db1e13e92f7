use pretty_assertions::assert_eq;

use super::*;
use crate::ast::{
    Arg, BinaryOp, BoolOp, CmpOp, ComprehensionKind, ExprKind, FStringPart, Stmt, StmtKind,
    UnaryOp,
};

fn module(source: &str) -> Module {
    parse_module_text(source).unwrap()
}

fn single(source: &str) -> StmtKind {
    let mut body = module(source).body;
    assert_eq!(body.len(), 1, "expected one statement in {source:?}");
    body.remove(0).kind
}

fn expr(source: &str) -> ExprKind {
    parse_expression(source).unwrap().kind
}

fn error(source: &str) -> SyntaxError {
    parse_module_text(source).unwrap_err()
}

fn name(name: &str) -> Expr {
    Expr::name(name, 1)
}

// === Expressions ===

#[test]
fn precedence_of_arithmetic() {
    let ExprKind::Binary { left, op, right } = expr("1 + 2 * 3") else {
        panic!("expected binary");
    };
    assert_eq!(op, BinaryOp::Add);
    assert_eq!(left.kind, ExprKind::Int(1));
    assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::Mul, .. }));
}

#[test]
fn power_is_right_associative_and_binds_tighter_than_unary() {
    let ExprKind::Unary { op, operand } = expr("-2 ** 3 ** 2") else {
        panic!("expected unary");
    };
    assert_eq!(op, UnaryOp::Neg);
    let ExprKind::Binary { right, op, .. } = operand.kind else {
        panic!("expected power");
    };
    assert_eq!(op, BinaryOp::Pow);
    assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::Pow, .. }));
}

#[test]
fn boolean_and_comparison_chains() {
    let ExprKind::BoolOp { op, left, .. } = expr("a < b <= c or not d and e") else {
        panic!("expected or");
    };
    assert_eq!(op, BoolOp::Or);
    let ExprKind::Compare { ops, .. } = left.kind else {
        panic!("expected comparison");
    };
    assert_eq!(
        ops.iter().map(|(op, _)| *op).collect::<Vec<_>>(),
        [CmpOp::Lt, CmpOp::LtEq]
    );
}

#[test]
fn two_word_comparisons() {
    let ExprKind::Compare { ops, .. } = expr("a not in b is not c") else {
        panic!("expected comparison");
    };
    assert_eq!(ops[0].0, CmpOp::NotIn);
    assert_eq!(ops[1].0, CmpOp::IsNot);
}

#[test]
fn literals() {
    assert_eq!(expr("0x1F"), ExprKind::Int(31));
    assert_eq!(expr("1_000"), ExprKind::Int(1000));
    assert_eq!(expr("2.5e1"), ExprKind::Float(25.0));
    assert_eq!(expr("'a' \"b\""), ExprKind::Str("ab".to_owned()));
    assert_eq!(expr("'tab\\there'"), ExprKind::Str("tab\there".to_owned()));
    assert_eq!(expr("r'\\d'"), ExprKind::Str("\\d".to_owned()));
    assert_eq!(expr("..."), ExprKind::Ellipsis);
    assert_eq!(expr("None"), ExprKind::None);
    assert_eq!(expr("True"), ExprKind::Bool(true));
}

#[test]
fn number_errors() {
    assert!(parse_expression("2j").is_err());
    assert!(parse_expression("99999999999999999999").is_err());
}

#[test]
fn fstrings() {
    let ExprKind::FString(parts) = expr("f'x={x!r:>4} {{y}}'") else {
        panic!("expected f-string");
    };
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0], FStringPart::Literal("x=".to_owned()));
    assert_eq!(
        parts[1],
        FStringPart::Field {
            value: name("x"),
            conversion: Some('r'),
            spec: Some(">4".to_owned()),
        }
    );
    assert_eq!(parts[2], FStringPart::Literal(" {y}".to_owned()));

    let ExprKind::FString(parts) = expr("f'{a != b}'") else {
        panic!("expected f-string");
    };
    assert!(matches!(&parts[0], FStringPart::Field { conversion: None, .. }));

    assert!(parse_expression("f'{'").is_err());
    assert!(parse_expression("f'}'").is_err());
}

#[test]
fn displays_and_comprehensions() {
    assert_eq!(expr("()"), ExprKind::Tuple(Vec::new()));
    assert_eq!(expr("(a,)"), ExprKind::Tuple(vec![name("a")]));
    assert_eq!(expr("(a)"), ExprKind::Name("a".to_owned()));
    assert!(matches!(expr("[1, 2,]"), ExprKind::List(items) if items.len() == 2));
    assert!(matches!(expr("{'a': 1, 'b': 2}"), ExprKind::Dict(entries) if entries.len() == 2));

    let ExprKind::Comprehension {
        kind, generators, ..
    } = expr("[x * 2 for x in range(3) if x for y in z]")
    else {
        panic!("expected comprehension");
    };
    assert_eq!(kind, ComprehensionKind::List);
    assert_eq!(generators.len(), 2);
    assert_eq!(generators[0].ifs.len(), 1);

    assert!(matches!(
        expr("(t for t in ts)"),
        ExprKind::Comprehension {
            kind: ComprehensionKind::Generator,
            ..
        }
    ));
    assert!(parse_expression("{1, 2}").is_err());
}

#[test]
fn calls_and_trailers() {
    let ExprKind::Call { func, args } = expr("f(a, *b, k=1, **d)") else {
        panic!("expected call");
    };
    assert_eq!(func.kind, ExprKind::Name("f".to_owned()));
    assert!(matches!(args[0], Arg::Positional(_)));
    assert!(matches!(args[1], Arg::Star(_)));
    assert!(matches!(&args[2], Arg::Keyword(name, _) if name == "k"));
    assert!(matches!(args[3], Arg::DoubleStar(_)));

    let ExprKind::Call { args, .. } = expr("join(t.text for t in tokens)") else {
        panic!("expected call");
    };
    assert!(matches!(
        &args[0],
        Arg::Positional(Expr {
            kind: ExprKind::Comprehension { .. },
            ..
        })
    ));

    assert!(matches!(expr("a.b[1:2, ::3](c)"), ExprKind::Call { .. }));
    assert!(parse_expression("f(k=1, a)").is_err());
}

#[test]
fn lambda_and_conditional() {
    let ExprKind::Lambda { params, body } = expr("lambda a, b=2, *c, **d: a if b else c") else {
        panic!("expected lambda");
    };
    assert_eq!(params.positional.len(), 2);
    assert!(params.vararg.is_some() && params.kwarg.is_some());
    assert!(matches!(body.kind, ExprKind::IfExp { .. }));
}

#[test]
fn keywords_are_not_names() {
    assert!(parse_expression("x + if").is_err());
    // only special at statement start, handled by the expander
    assert_eq!(expr("macro"), ExprKind::Name("macro".to_owned()));
}

// === Statements ===

#[test]
fn assignment_forms() {
    let StmtKind::Assign { targets, value } = single("a = b = 1\n") else {
        panic!("expected assignment");
    };
    assert_eq!(targets, vec![name("a"), name("b")]);
    assert_eq!(value.kind, ExprKind::Int(1));

    assert!(matches!(
        single("a, *rest = items\n"),
        StmtKind::Assign { targets, .. } if matches!(&targets[0].kind, ExprKind::Tuple(items) if items.len() == 2)
    ));
    assert!(matches!(
        single("x //= 2\n"),
        StmtKind::AugAssign {
            op: BinaryOp::FloorDiv,
            ..
        }
    ));
    assert!(matches!(
        single("x: int = 1\n"),
        StmtKind::AnnAssign { value: Some(_), .. }
    ));
    assert!(matches!(single("x: int\n"), StmtKind::AnnAssign { value: None, .. }));
}

#[test]
fn invalid_targets() {
    assert_eq!(error("f() = 1\n").message, "cannot assign to function call");
    assert_eq!(error("1 = x\n").message, "cannot assign to literal");
    assert!(parse_module_text("a, b += 1\n").is_err());
}

#[test]
fn function_definition() {
    let StmtKind::FunctionDef(def) =
        single("@deco\n@other(1)\ndef f(a: int, b=1, *args, c, **kw) -> str:\n    return a\n")
    else {
        panic!("expected def");
    };
    assert_eq!(def.name, "f");
    assert_eq!(def.decorators.len(), 2);
    assert_eq!(def.params.positional.len(), 2);
    assert!(def.params.positional[0].annotation.is_some());
    assert_eq!(def.params.keyword_only[0].name, "c");
    assert!(def.returns.is_some());
    assert!(!def.is_generator);
}

#[test]
fn generator_detection_stops_at_nested_functions() {
    let StmtKind::FunctionDef(outer) =
        single("def outer():\n    def inner():\n        yield 1\n    return inner\n")
    else {
        panic!("expected def");
    };
    assert!(!outer.is_generator);
    let StmtKind::FunctionDef(inner) = &outer.body[0].kind else {
        panic!("expected nested def");
    };
    assert!(inner.is_generator);

    let StmtKind::FunctionDef(def) = single("def g(xs):\n    x = yield from xs\n") else {
        panic!("expected def");
    };
    assert!(def.is_generator);
}

#[test]
fn one_line_suites() {
    let StmtKind::FunctionDef(def) = single("def f(): return 1; pass\n") else {
        panic!("expected def");
    };
    assert_eq!(def.body.len(), 2);
    assert!(matches!(single("class A: ...\n"), StmtKind::ClassDef(_)));
}

#[test]
fn class_definition() {
    let StmtKind::ClassDef(def) = single("class A(B, C):\n    x = 1\n\n    def m(self):\n        pass\n")
    else {
        panic!("expected class");
    };
    assert_eq!(def.bases.len(), 2);
    assert_eq!(def.body.len(), 2);
}

#[test]
fn control_flow() {
    let StmtKind::If { orelse, .. } = single("if a:\n    x\nelif b:\n    y\nelse:\n    z\n") else {
        panic!("expected if");
    };
    let [Stmt {
        kind: StmtKind::If { orelse: inner, .. },
        ..
    }] = orelse.as_slice()
    else {
        panic!("expected elif");
    };
    assert_eq!(inner.len(), 1);

    let StmtKind::For { target, orelse, .. } =
        single("for i, t in enumerate(ts):\n    continue\nelse:\n    pass\n")
    else {
        panic!("expected for");
    };
    assert!(matches!(target.kind, ExprKind::Tuple(_)));
    assert_eq!(orelse.len(), 1);

    assert!(matches!(
        single("while x:\n    break\n"),
        StmtKind::While { .. }
    ));
}

#[test]
fn context_rules() {
    assert_eq!(error("return 1\n").message, "'return' outside function");
    assert_eq!(error("break\n").message, "'break' outside loop");
    assert_eq!(error("x = yield 1\n").message, "'yield' outside function");
    assert_eq!(
        error("for x in y:\n    def f():\n        continue\n").message,
        "'continue' outside loop"
    );
    assert_eq!(
        error("def f():\n    class A:\n        return 1\n").message,
        "'return' outside function"
    );
}

#[test]
fn imports() {
    let StmtKind::Import(names) = single("import a.b as c, d\n") else {
        panic!("expected import");
    };
    assert_eq!(names[0].name, "a.b");
    assert_eq!(names[0].asname.as_deref(), Some("c"));
    assert_eq!(names[1].name, "d");

    let StmtKind::ImportFrom { module, names } = single("from token import (\n    NAME,\n    OP as op,\n)\n")
    else {
        panic!("expected from-import");
    };
    assert_eq!(module, "token");
    assert_eq!(names.len(), 2);
    assert_eq!(names[1].asname.as_deref(), Some("op"));

    let StmtKind::ImportFrom { module, .. } = single("from ..pkg import x\n") else {
        panic!("expected from-import");
    };
    assert_eq!(module, "..pkg");
}

#[test]
fn misc_simple_statements() {
    assert!(matches!(
        single("assert x, 'message'\n"),
        StmtKind::Assert { msg: Some(_), .. }
    ));
    assert!(matches!(single("raise\n"), StmtKind::Raise(None)));
    assert!(matches!(single("global a, b\n"), StmtKind::Global(names) if names.len() == 2));
    assert_eq!(module("a; b\n").body.len(), 2);
}

#[test]
fn line_numbers() {
    let body = module("# comment\n\nx = 1\ns = '''a\nb'''\nf(\n  1)\ny\n").body;
    let lines: Vec<usize> = body.iter().map(|stmt| stmt.line).collect();
    assert_eq!(lines, vec![3, 4, 6, 8]);
    assert_eq!(error("x = 1\ny = )\n").line, 2);
}

#[test]
fn layout_errors() {
    assert_eq!(error("def f():\nreturn 1\n").message, "expected an indented block, found 'return'");
    assert!(parse_module_text("  x\n").is_err());
    assert!(parse_module_text("@deco\nx = 1\n").is_err());
}

#[test]
fn lex_errors_become_syntax_errors() {
    let err = error("x = 'open\n");
    assert_eq!(err.line, 1);
    assert_eq!(err.message, "unterminated string literal");
}

#[test]
fn expression_entry_points() {
    let tokens = weft_lexer::tokenize("a + b").unwrap();
    assert!(matches!(
        parse_expression_tokens(tokens).unwrap().kind,
        ExprKind::Binary { .. }
    ));
    assert!(parse_expression("a = 1").is_err());
    assert!(matches!(expr("a, b"), ExprKind::Tuple(items) if items.len() == 2));
}
