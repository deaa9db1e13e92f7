use std::convert::Infallible;

use pretty_assertions::assert_eq;
use weft_ir::{Token, TokenKind, TokenQuery};
use weft_lexer::tokenize_with_endmarker;

use super::*;

type Stream = TokenStream<std::vec::IntoIter<Token>>;

fn stream(source: &str) -> Stream {
    TokenStream::new(tokenize_with_endmarker(source).unwrap())
}

fn raw(tokens: Vec<Token>) -> Stream {
    TokenStream::new(tokens)
}

fn texts(tokens: &[Token]) -> Vec<&str> {
    tokens.iter().map(|token| token.text.as_str()).collect()
}

fn paren() -> (TokenQuery, TokenQuery) {
    (TokenQuery::op("("), TokenQuery::op(")"))
}

// === Consuming scans ===

#[test]
fn consume_if_only_takes_matches() {
    let mut s = stream("foo = 1\n");
    assert_eq!(s.consume_if(&TokenQuery::op("=")), None);
    assert_eq!(s.consume_if(&TokenQuery::name("foo")).unwrap().text, "foo");
    assert_eq!(s.advance().text, "=");
}

#[test]
fn consume_while_leaves_failing_token() {
    let mut s = stream("a b c = 1\n");
    let names = s.consume_while(&TokenQuery::kind(TokenKind::Name));
    assert_eq!(texts(&names), ["a", "b", "c"]);
    assert_eq!(s.advance().text, "=");
}

#[test]
fn consume_until_includes_terminator() {
    let mut s = stream("a b c = 1\n");
    let head = s.consume_until(&TokenQuery::op("="));
    assert_eq!(texts(&head), ["a", "b", "c", "="]);
    assert_eq!(s.advance().text, "1");
}

#[test]
fn consume_until_stops_before_end_marker() {
    let mut s = stream("a b\n");
    let all = s.consume_until(&TokenQuery::op("?"));
    assert_eq!(texts(&all), ["a", "b", "\n"]);
    assert_eq!(s.peek().kind, TokenKind::EndMarker);
}

#[test]
fn consume_line_tracks_line_numbers() {
    let mut s = stream("x = 1\ny\nz\n");
    assert_eq!(texts(&s.consume_line()), ["x", "=", "1", "\n"]);
    assert_eq!(s.lineno(), 2);
    s.consume_line();
    assert_eq!(s.lineno(), 3);
    assert!(s.line_buffer().is_empty());
    s.advance();
    assert_eq!(texts(s.line_buffer()), ["z"]);
}

#[test]
fn consume_balanced_nested_parens() {
    let mut s = stream("foo(x(y(z))) + 2\n");
    s.consume_if(&TokenQuery::name("foo")).unwrap();
    let (open, close) = paren();
    let args = s.consume_balanced(&open, &close).unwrap();
    assert_eq!(texts(&args), ["(", "x", "(", "y", "(", "z", ")", ")", ")"]);
    assert_eq!(s.advance().text, "+");
}

#[test]
fn consume_balanced_includes_leading_tokens() {
    let mut s = stream("foo(a)(b)\n");
    let (open, close) = paren();
    let call = s.consume_balanced(&open, &close).unwrap();
    assert_eq!(texts(&call), ["foo", "(", "a", ")"]);
    assert_eq!(s.advance().text, "(");
}

#[test]
fn consume_balanced_skips_closes_before_the_first_open() {
    let (open, close) = paren();
    let tokens = vec![
        Token::op(")"),
        Token::name("a"),
        Token::op("("),
        Token::name("b"),
        Token::op(")"),
        Token::name("c"),
    ];
    let mut s = raw(tokens.clone());
    let span = s.consume_balanced(&open, &close).unwrap();
    assert_eq!(texts(&span), [")", "a", "(", "b", ")"]);
    assert_eq!(s.advance().text, "c");

    let mut s = raw(tokens);
    assert_eq!(texts(&s.peek_balanced(&open, &close)), [")", "a", "(", "b", ")"]);
}

#[test]
fn consume_balanced_fails_at_end_of_input() {
    let mut s = raw(vec![Token::name("f"), Token::op("("), Token::name("a")]);
    let (open, close) = paren();
    let err = s.consume_balanced(&open, &close).unwrap_err();
    assert_eq!(err.line, 1);
    assert_eq!(err.message, "unexpected end of input, expected (OP, ')')");
    assert_eq!(
        err.to_string(),
        "line 1: unexpected end of input, expected (OP, ')')"
    );
    assert_eq!(err.context, "    f(a\n      ^\n      (NAME, 'a')");
}

#[test]
fn consume_block_takes_header_and_body() {
    let mut s = stream("def f():\n    return 1\n\nx = 2\n");
    let block = s.consume_block().unwrap();
    assert_eq!(
        texts(&block),
        ["def", "f", "(", ")", ":", "\n", "    ", "return", "1", "\n", "\n", ""]
    );
    assert_eq!(weft_ir::untokenize(&block), "def f():\n    return 1\n\n");
    assert_eq!(s.advance().text, "x");
}

#[test]
fn consume_block_one_liner_is_just_the_header() {
    let mut s = stream("def f(): return 1\nx\n");
    let block = s.consume_block().unwrap();
    assert_eq!(texts(&block).last(), Some(&"\n"));
    assert_eq!(block.len(), 8);
    assert_eq!(s.advance().text, "x");
}

#[test]
fn consume_block_skips_comment_lines_before_body() {
    let mut s = stream("def f():\n# note\n    pass\ny\n");
    let block = s.consume_block().unwrap();
    assert!(block.iter().any(|token| token.text == "# note"));
    assert_eq!(block.last().map(|token| token.kind), Some(TokenKind::Dedent));
    assert_eq!(s.advance().text, "y");
}

#[test]
fn consume_block_requires_a_header_line_end() {
    let mut s = raw(vec![Token::name("def"), Token::name("f")]);
    let err = s.consume_block().unwrap_err();
    assert_eq!(err.message, "unexpected end of input in block header");
}

// === Peeking mirrors ===

#[test]
fn peek_scans_do_not_consume() {
    let mut s = stream("a b = c\n");
    let names = s.peek_while(&TokenQuery::kind(TokenKind::Name));
    assert_eq!(texts(&names), ["a", "b"]);
    assert_eq!(s.peek().text, "=");
    s.revert();

    assert_eq!(texts(&s.peek_until(&TokenQuery::op("="))), ["a", "b", "="]);
    s.revert();
    assert_eq!(texts(&s.peek_line()), ["a", "b", "=", "c", "\n"]);
    s.revert();

    assert_eq!(s.advance().text, "a");
}

#[test]
fn peek_balanced_is_empty_when_unbalanced() {
    let (open, close) = paren();
    let mut s = raw(vec![Token::op("("), Token::name("a")]);
    assert!(s.peek_balanced(&open, &close).is_empty());

    let mut s = stream("(a)(b)\n");
    assert_eq!(texts(&s.peek_balanced(&open, &close)), ["(", "a", ")"]);
}

#[test]
fn peek_block_after_header() {
    let mut s = stream("if x:\n    y\nz\n");
    s.consume_line();
    let body = s.peek_block();
    assert_eq!(
        body.iter().map(|token| token.kind).collect::<Vec<_>>(),
        [
            TokenKind::Indent,
            TokenKind::Name,
            TokenKind::Newline,
            TokenKind::Dedent
        ]
    );
    s.revert();
    assert_eq!(s.advance().kind, TokenKind::Indent);
}

// === Speculation ===

#[test]
fn speculate_updates_line_tracking_on_success() {
    let mut s = stream("a\nb\n");
    let taken: Result<Option<usize>, Infallible> =
        s.speculate(|view| Ok(Some(view.consume_line().len())));
    assert_eq!(taken, Ok(Some(2)));
    assert_eq!(s.lineno(), 2);
    assert_eq!(s.advance().text, "b");
}

#[test]
fn speculate_miss_keeps_position() {
    let mut s = stream("@ a\n");
    let taken: Result<Option<()>, Infallible> = s.speculate(|view| {
        view.advance();
        view.consume_line();
        Ok(None)
    });
    assert_eq!(taken, Ok(None));
    assert_eq!(s.lineno(), 1);
    assert_eq!(s.advance().text, "@");
}

// === Diagnostics ===

#[test]
fn error_context_points_at_last_peeked_token() {
    let mut s = stream("x = foo(1, 2)\n");
    s.advance();
    s.advance();
    s.peek_n(2);
    assert_eq!(
        s.error_context(),
        "    x = foo(1, 2)\n           ^\n           (OP, '(')"
    );
    // lookahead is restored
    assert_eq!(s.peek().text, "1");
}

#[test]
fn error_context_underlines_whole_token() {
    let mut s = stream("value = other\n");
    s.advance();
    s.advance();
    s.peek();
    assert_eq!(
        s.error_context(),
        "    value = other\n            ^~~~~\n            (NAME, 'other')"
    );
}

#[test]
fn error_context_is_empty_before_any_read() {
    let mut s = stream("x\n");
    assert_eq!(s.error_context(), "");
    let err = s.error("nothing read");
    assert_eq!(err.line, 1);
}

#[test]
fn iterates_remaining_tokens() {
    let mut s = stream("a b\n");
    s.advance();
    let rest: Vec<Token> = s.by_ref().collect();
    assert_eq!(texts(&rest), ["b", "\n", ""]);
    assert_eq!(s.lineno(), 2);
}

mod proptest_balanced {
    use proptest::prelude::*;
    use weft_ir::{Token, TokenQuery};

    use super::super::TokenStream;

    fn nested(depth: usize) -> Vec<Token> {
        let mut tokens = vec![Token::op("("); depth];
        tokens.push(Token::name("x"));
        tokens.extend(vec![Token::op(")"); depth]);
        tokens.push(Token::op("+"));
        tokens
    }

    proptest! {
        #[test]
        fn balanced_scan_returns_matching_span(depth in 1usize..40) {
            let mut s = TokenStream::new(nested(depth));
            let span = s
                .consume_balanced(&TokenQuery::op("("), &TokenQuery::op(")"))
                .unwrap();
            prop_assert_eq!(span.len(), 2 * depth + 1);
            prop_assert!(s.advance().is_op("+"));
        }

        #[test]
        fn truncated_nesting_is_an_error(depth in 1usize..40, cut in 1usize..40) {
            let mut tokens = nested(depth);
            tokens.truncate(depth + 1 + (cut % depth).min(depth - 1));
            let mut s = TokenStream::new(tokens);
            let result = s.consume_balanced(&TokenQuery::op("("), &TokenQuery::op(")"));
            prop_assert!(result.is_err());
        }
    }
}
