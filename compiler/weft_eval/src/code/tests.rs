use pretty_assertions::assert_eq;
use weft_ir::{Token, TokenKind};

use super::*;

#[test]
fn text_to_tokens_and_tree() {
    let code = Code::from_text("x = 1\n", Origin::User);
    assert_eq!(code.text(), "x = 1\n");
    let tokens = code.tokens().unwrap();
    assert_eq!(tokens[0], (TokenKind::Name, "x"));
    assert_eq!(tokens[2], (TokenKind::Number, "1"));
    assert!(tokens.iter().all(|token| token.kind != TokenKind::EndMarker));
    assert_eq!(code.tree().unwrap().body.len(), 1);
}

#[test]
fn tokens_render_to_text() {
    let code = Code::from_tokens(
        [
            Token::name("print"),
            Token::op("("),
            Token::new(TokenKind::Number, "4"),
            Token::op(")"),
            Token::newline(),
            Token::end_marker(),
        ],
        Origin::Engine,
    );
    assert_eq!(code.text(), "print(4)\n");
    assert_eq!(code.tokens().unwrap().len(), 5);
    assert!(code.is_engine());
}

#[test]
fn tree_goes_through_text() {
    let tree = weft_parse::parse_module_text("def f():  return 1\n").unwrap();
    let code = Code::from_tree(tree, Origin::User);
    assert_eq!(code.text(), "def f():\n    return 1\n");
    let kinds: Vec<_> = code.tokens().unwrap().iter().map(|t| t.kind).collect();
    assert!(kinds.contains(&TokenKind::Indent));
    assert!(kinds.contains(&TokenKind::Dedent));
}

#[test]
fn views_are_memoized() {
    let code = Code::from_text("a + b\n", Origin::User);
    let first = code.tree().unwrap();
    let second = code.tree().unwrap();
    assert!(Rc::ptr_eq(&first, &second));
    assert!(std::ptr::eq(code.tokens().unwrap(), code.tokens().unwrap()));
}

#[test]
fn loose_pairs_become_tokens() {
    let items = Value::list(vec![
        Value::tuple(vec![Value::Kind(TokenKind::Name), Value::from("x")]),
        Value::tuple(vec![Value::from("OP"), Value::from("+")]),
        Value::token(Token::new(TokenKind::Number, "2")),
    ]);
    let code = Code::from_value(&items, Origin::User).unwrap();
    assert_eq!(code.text(), "x+2");
}

#[test]
fn rejects_values_that_are_not_code() {
    assert_eq!(
        Code::from_value(&Value::Int(3), Origin::User).unwrap_err(),
        CodeError::NotCode {
            type_name: "int".to_owned()
        }
    );
    let bad = Value::list(vec![Value::tuple(vec![Value::from("BOGUS"), Value::from("x")])]);
    assert!(matches!(
        Code::from_value(&bad, Origin::User),
        Err(CodeError::BadToken { .. })
    ));
}

#[test]
fn conversion_errors() {
    let code = Code::from_text("x = 'open\n", Origin::User);
    assert!(matches!(code.tokens(), Err(CodeError::Lex(_))));
    let code = Code::from_text("x = = 1\n", Origin::User);
    let err = ScriptError::from(code.tree().unwrap_err());
    assert_eq!(err.kind, ErrorKind::Syntax);
}

#[test]
fn origin_is_rewrapped_not_mutated() {
    let engine = Code::from_text("pass\n", Origin::Engine);
    let user = Code::from_value(&Value::Code(engine.clone()), Origin::User).unwrap();
    assert_eq!(user.origin(), Origin::User);
    assert_eq!(engine.origin(), Origin::Engine);
    assert!(!user.ptr_eq(&engine));
    assert!(engine.with_origin(Origin::Engine).ptr_eq(&engine));
}
