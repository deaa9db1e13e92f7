use pretty_assertions::assert_eq;
use weft_eval::{Builtin, Code, Dict, Origin, Value};
use weft_ir::{untokenize, Token, TokenKind};

use super::*;

fn pairs(value: &Value) -> Vec<(TokenKind, String)> {
    materialize(value)
        .unwrap()
        .into_iter()
        .map(|token| (token.kind, token.text))
        .collect()
}

fn one(kind: TokenKind, text: &str) -> Vec<(TokenKind, String)> {
    vec![(kind, text.to_owned())]
}

#[test]
fn none_emits_nothing() {
    assert!(materialize(&Value::None).unwrap().is_empty());
}

#[test]
fn scalars_become_single_tokens() {
    assert_eq!(pairs(&Value::Bool(true)), one(TokenKind::Name, "True"));
    assert_eq!(pairs(&Value::Int(-4)), one(TokenKind::Number, "-4"));
    assert_eq!(pairs(&Value::Float(2.5)), one(TokenKind::Number, "2.5"));
    assert_eq!(pairs(&Value::Float(3.0)), one(TokenKind::Number, "3.0"));
}

#[test]
fn string_holding_a_literal_is_one_string_token() {
    assert_eq!(pairs(&Value::from("'hi'")), one(TokenKind::String, "'hi'"));
    assert_eq!(pairs(&Value::from("42")), one(TokenKind::String, "42"));
}

#[test]
fn string_holding_a_name_is_one_name_token() {
    assert_eq!(pairs(&Value::from("answer")), one(TokenKind::Name, "answer"));
}

#[test]
fn string_holding_a_fragment_is_relexed() {
    assert_eq!(
        pairs(&Value::from("a + b")),
        vec![
            (TokenKind::Name, "a".to_owned()),
            (TokenKind::Op, "+".to_owned()),
            (TokenKind::Name, "b".to_owned()),
        ]
    );
    // Not an expression at all, still spliced.
    assert_eq!(pairs(&Value::from("x = 1")).len(), 3);
}

#[test]
fn code_is_spliced_with_its_line_ends() {
    let code = Value::Code(Code::from_text("x = 1\n", Origin::Engine));
    assert_eq!(
        pairs(&code),
        vec![
            (TokenKind::Name, "x".to_owned()),
            (TokenKind::Op, "=".to_owned()),
            (TokenKind::Number, "1".to_owned()),
            (TokenKind::Newline, "\n".to_owned()),
        ]
    );
}

#[test]
fn token_lists_are_spliced() {
    let tokens = Value::list(vec![
        Value::token(Token::name("f")),
        Value::token(Token::op("(")),
        Value::token(Token::op(")")),
    ]);
    assert_eq!(
        pairs(&tokens),
        vec![
            (TokenKind::Name, "f".to_owned()),
            (TokenKind::Op, "(".to_owned()),
            (TokenKind::Op, ")".to_owned()),
        ]
    );
}

#[test]
fn other_values_splice_their_text() {
    let mut dict = Dict::new();
    dict.insert(Value::from("k"), Value::Int(1)).unwrap();
    assert_eq!(
        pairs(&Value::dict(dict)),
        vec![
            (TokenKind::Op, "{".to_owned()),
            (TokenKind::String, "'k'".to_owned()),
            (TokenKind::Op, ":".to_owned()),
            (TokenKind::Number, "1".to_owned()),
            (TokenKind::Op, "}".to_owned()),
        ]
    );
}

#[test]
fn lists_of_plain_values_splice_their_text() {
    let list = Value::list(vec![Value::Int(1), Value::Int(2)]);
    assert_eq!(
        pairs(&list),
        vec![
            (TokenKind::Op, "[".to_owned()),
            (TokenKind::Number, "1".to_owned()),
            (TokenKind::Op, ",".to_owned()),
            (TokenKind::Number, "2".to_owned()),
            (TokenKind::Op, "]".to_owned()),
        ]
    );
    let pair = Value::tuple(vec![Value::from("a"), Value::None]);
    assert_eq!(untokenize(materialize(&pair).unwrap()), "('a', None)");
}

#[test]
fn callables_are_not_code() {
    let callable = Value::Builtin(Builtin::Len);
    assert!(matches!(materialize(&callable), Err(ExpandError::Code(_))));
}
