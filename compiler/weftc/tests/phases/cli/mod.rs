//! The `weft` binary.

use std::fs;
use std::process::{Command, Output};

use pretty_assertions::assert_eq;

use crate::common::source_file;

fn weft(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_weft"))
        .args(args)
        .env_remove("WEFT_LOG")
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).unwrap()
}

#[test]
fn expand_prints_to_stdout() {
    let (_dir, path) = source_file("macro X = 2 + 2\nprint(X)\n");
    let output = weft(&["expand", path.to_str().unwrap()]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "print(4)\n");
}

#[test]
fn expand_writes_output_file() {
    let (dir, path) = source_file("macro X = 3\ny = X\n");
    let out = dir.path().join("out.py");
    let output = weft(&["expand", path.to_str().unwrap(), "-o", out.to_str().unwrap()]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "");
    assert_eq!(fs::read_to_string(out).unwrap(), "y = 3\n");
}

#[test]
fn macro_print_output_is_routed() {
    let (_dir, path) = source_file("macro X = print('from macro')\nx = 1\n");
    let path = path.to_str().unwrap();

    let output = weft(&["expand", path]);
    assert_eq!(stdout(&output), "x = 1\n");
    assert_eq!(stderr(&output), "from macro\n");

    let output = weft(&["expand", path, "--macro-output=stdout"]);
    assert_eq!(stdout(&output), "from macro\nx = 1\n");

    let output = weft(&["expand", path, "--macro-output=silent"]);
    assert_eq!(stderr(&output), "");
}

#[test]
fn expansion_errors_are_rendered_without_partial_output() {
    let (_dir, path) = source_file("x = 1\n@macro\nmacro y = 2\n");
    let output = weft(&["expand", path.to_str().unwrap(), "--color=never"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout(&output), "");
    let err = stderr(&output);
    assert!(err.starts_with("error: expected `def` or `class` after decorated `macro`\n"));
    assert!(err.contains(":3\n"), "{err}");
    assert!(!err.contains('\x1b'));
}

#[test]
fn usage_errors_exit_with_two() {
    assert_eq!(weft(&["expand"]).status.code(), Some(2));
    assert_eq!(weft(&["expand", "a.wf", "--color=pink"]).status.code(), Some(2));
    assert_eq!(weft(&["frobnicate"]).status.code(), Some(2));
}

#[test]
fn lex_and_check_commands() {
    let (_dir, path) = source_file("macro N = 1\nn = N\n");
    let path = path.to_str().unwrap();

    let output = weft(&["lex", path]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("  NAME       'macro'\n"));

    let output = weft(&["check", path]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "ok: 1 statement(s), 1 macro(s) (N)\n");
}
