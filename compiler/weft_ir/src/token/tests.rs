use pretty_assertions::assert_eq;
use regex::Regex;

use super::*;

fn hello() -> Token {
    Token::new(TokenKind::Name, "hello")
}

fn num(text: &str) -> Token {
    Token::new(TokenKind::Number, text)
}

fn check(query: TokenQuery, expected: bool) {
    assert_eq!(hello().matches(&query), expected, "query {query:?}");
}

#[test]
fn exact_queries() {
    check(TokenQuery::new(TokenKind::Name, "hello"), true);
    check(TokenQuery::new(TokenKind::Name, "world"), false);
    check(TokenQuery::new(TokenKind::Number, "hello"), false);
}

#[test]
fn pattern_queries_are_anchored_at_start() {
    check(TokenQuery::new(TokenKind::Name, Regex::new("^h.*o$").unwrap()), true);
    check(TokenQuery::new(TokenKind::Name, Regex::new("^foo$").unwrap()), false);
    check(TokenQuery::new(Any, Regex::new("h").unwrap()), true);
    check(TokenQuery::new(Any, Regex::new("llo").unwrap()), false);
    check(TokenQuery::new(Any, Regex::new("^x").unwrap()), false);
}

#[test]
fn set_queries() {
    check(TokenQuery::new(TokenKind::Name, ["hello", "world"]), true);
    check(TokenQuery::new(TokenKind::Name, ["foo", "bar"]), false);
    check(TokenQuery::new([TokenKind::Name, TokenKind::Number], "hello"), true);
    check(TokenQuery::new([TokenKind::Number, TokenKind::String], "hello"), false);
    check(TokenQuery::new(Any, ["hello", "world"]), true);
    check(TokenQuery::new(Any, ["foo", "bar"]), false);
    check(TokenQuery::kind([TokenKind::Name, TokenKind::Number]), true);
    check(TokenQuery::kind([TokenKind::Indent, TokenKind::Op]), false);
}

#[test]
fn mixed_text_sets() {
    let options = vec![
        TextMatcher::from("foo"),
        TextMatcher::from(Regex::new("he").unwrap()),
    ];
    check(TokenQuery::new(Any, options), true);
}

#[test]
fn predicate_queries() {
    check(
        TokenQuery::new(KindMatcher::Where(|kind| kind == TokenKind::Name), "hello"),
        true,
    );
    check(
        TokenQuery::new(KindMatcher::Where(|kind| kind == TokenKind::Op), "hello"),
        false,
    );
    check(
        TokenQuery::new(TokenKind::Name, TextMatcher::Where(|text| text == "hello")),
        true,
    );
    check(
        TokenQuery::new(TokenKind::Name, TextMatcher::Where(|text| text == "world")),
        false,
    );
    check(
        TokenQuery::new(Any, TextMatcher::Where(|text| text.len() == 5)),
        true,
    );
}

#[test]
fn wildcards() {
    check(TokenQuery::kind(TokenKind::Name), true);
    check(TokenQuery::kind(TokenKind::Number), false);
    check(TokenQuery::new(Any, "hello"), true);
    check(TokenQuery::new(Any, "world"), false);
    check(TokenQuery::any(), true);
}

#[test]
fn equality_ignores_offset() {
    let a = Token::with_offset(TokenKind::Op, "+", 3);
    let b = Token::op("+");
    assert_eq!(a, b);
    assert!(a == (TokenKind::Op, "+"));
    assert!(a != (TokenKind::Op, "-"));
}

#[test]
fn debug_form() {
    assert_eq!(format!("{:?}", hello()), "(NAME, 'hello')");
    assert_eq!(format!("{}", Token::newline()), "(NEWLINE, '\\n')");
    assert_eq!(format!("{}", Token::new(TokenKind::String, "'a'")), "(STRING, \"'a'\")");
}

#[test]
fn kind_names_round_trip() {
    for kind in TokenKind::ALL {
        assert_eq!(TokenKind::from_name(kind.name()), Some(kind));
    }
    assert_eq!(TokenKind::from_name("TYPE_COMMENT"), None);
}

#[test]
fn spacing_rules() {
    let cases = [
        (Token::new(TokenKind::String, "'a'"), Token::new(TokenKind::String, "'b'"), true),
        (Token::name("x"), Token::name("y"), true),
        (Token::name("x"), Token::new(TokenKind::Number, "1"), true),
        (Token::name("f"), Token::new(TokenKind::String, "'s'"), true),
        (Token::op(">"), Token::op("="), true),
        (Token::op("*"), Token::op("*"), true),
        (Token::op("("), Token::op(")"), false),
        (Token::op(")"), Token::op(":"), false),
        (Token::op("="), Token::op("["), false),
        (num("1"), num("2"), true),
        (num("1"), Token::op("."), true),
        (num("1"), Token::name("e5"), true),
        (num("1"), Token::op("+"), false),
        (Token::op("."), num("5"), true),
        (Token::op("+"), num("5"), false),
        (Token::name("f"), Token::op("("), false),
        (Token::op("="), Token::name("x"), false),
        (Token::new(TokenKind::String, "'a'"), Token::name("x"), false),
    ];
    for (previous, current, expected) in cases {
        assert_eq!(
            must_insert_space(Some(&previous), &current),
            expected,
            "{previous} then {current}"
        );
    }
    assert!(!must_insert_space(None, &Token::name("x")));
}

#[test]
fn render_uses_offset_or_separator() {
    let less = Token::op("<");
    assert_eq!(Token::with_offset(TokenKind::Op, "=", 2).render(Some(&less)), "  =");
    assert_eq!(Token::op("=").render(Some(&less)), " =");
    assert_eq!(Token::op("=").render(Some(&Token::name("x"))), "=");
    assert_eq!(Token::op("=").render(None), "=");
}

#[test]
fn untokenize_reproduces_layout() {
    let tokens = vec![
        Token::with_offset(TokenKind::Name, "def", 0),
        Token::with_offset(TokenKind::Name, "f", 1),
        Token::with_offset(TokenKind::Op, "(", 0),
        Token::with_offset(TokenKind::Op, ")", 0),
        Token::with_offset(TokenKind::Op, ":", 0),
        Token::with_offset(TokenKind::Newline, "\n", 0),
        Token::with_offset(TokenKind::Indent, "    ", 0),
        Token::with_offset(TokenKind::Name, "return", 0),
        Token::with_offset(TokenKind::Number, "1", 1),
        Token::with_offset(TokenKind::Newline, "\n", 0),
        Token::with_offset(TokenKind::Nl, "\n", 0),
        Token::with_offset(TokenKind::Dedent, "", 0),
        Token::with_offset(TokenKind::Name, "x", 0),
        Token::with_offset(TokenKind::Newline, "\n", 0),
        Token::end_marker(),
        Token::name("ignored"),
    ];
    assert_eq!(untokenize(&tokens), "def f():\n    return 1\n\nx\n");
}

#[test]
fn untokenize_without_offsets_inserts_separators() {
    let tokens = [
        Token::name("print"),
        Token::op("("),
        Token::new(TokenKind::Number, "4"),
        Token::op(")"),
    ];
    assert_eq!(untokenize(tokens), "print(4)");

    let tokens = [Token::name("not"), Token::name("x"), Token::op("<"), Token::op("=")];
    assert_eq!(untokenize(tokens), "not x< =");
}

#[test]
fn shallow_indent_nests_relative_to_current_level() {
    let tokens = [
        Token::name("if"),
        Token::name("x"),
        Token::op(":"),
        Token::newline(),
        Token::new(TokenKind::Indent, "    "),
        Token::name("for"),
        Token::name("y"),
        Token::name("in"),
        Token::name("z"),
        Token::op(":"),
        Token::newline(),
        Token::new(TokenKind::Indent, "  "),
        Token::name("pass"),
        Token::newline(),
        Token::new(TokenKind::Dedent, ""),
        Token::name("done"),
        Token::newline(),
        Token::new(TokenKind::Dedent, ""),
    ];
    assert_eq!(
        untokenize(tokens),
        "if x:\n    for y in z:\n      pass\n    done\n"
    );
}

#[test]
fn quoting() {
    assert_eq!(quoted("a"), "'a'");
    assert_eq!(quoted("it's"), "\"it's\"");
    assert_eq!(quoted("both ' and \""), "'both \\' and \"'");
    assert_eq!(quoted("tab\there"), "'tab\\there'");
}

#[test]
fn query_display() {
    assert_eq!(TokenQuery::op(")").to_string(), "(OP, ')')");
    assert_eq!(
        TokenQuery::kind([TokenKind::Newline, TokenKind::Nl]).to_string(),
        "([NEWLINE, NL], ...)"
    );
    assert_eq!(
        TokenQuery::new(Any, ["def", "class"]).to_string(),
        "(..., ['def', 'class'])"
    );
}
