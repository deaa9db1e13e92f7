use std::path::Path;

use pretty_assertions::assert_eq;
use weft_expand::ExpandError;
use weft_stream::ParseError;

use super::*;

#[test]
fn color_modes_parse() {
    assert_eq!("always".parse::<ColorMode>(), Ok(ColorMode::Always));
    assert_eq!("never".parse::<ColorMode>(), Ok(ColorMode::Never));
    assert!("sometimes".parse::<ColorMode>().is_err());
    assert!(ColorMode::Auto.should_use_colors(true));
    assert!(!ColorMode::Auto.should_use_colors(false));
    assert!(ColorMode::Always.should_use_colors(false));
}

#[test]
fn parse_errors_show_line_and_context() {
    let error = ExpandError::Parse(ParseError::new("expected `)`", 2, "f(1,\n    ^"));
    assert_eq!(
        render_error(Path::new("demo.wf"), &error, false),
        "error: expected `)`\n  --> demo.wf:2\n   |\n   | f(1,\n   |     ^\n"
    );
}

#[test]
fn execution_errors_show_the_traceback() {
    let error = weft_expand::expand("macro X = 1 / 0\n").unwrap_err();
    let out = render_error(Path::new("demo.wf"), &error, false);
    assert!(out.starts_with("error: macro code raised an exception\n  --> demo.wf\n"));
    assert!(out.contains("division by zero"));
    assert!(out.contains("= note"));
}

#[test]
fn colors_are_optional() {
    let error = ExpandError::Parse(ParseError::new("bad", 1, ""));
    assert!(render_error(Path::new("x"), &error, true).contains(colors::ERROR));
    assert!(!render_error(Path::new("x"), &error, false).contains('\x1b'));
}
