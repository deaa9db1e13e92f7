use std::fs;

use pretty_assertions::assert_eq;
use tempfile::tempdir;
use weft_eval::PrintTarget;

use super::*;
use crate::ColorMode;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|arg| (*arg).to_owned()).collect()
}

#[test]
fn expand_arguments() {
    let parsed = parse_expand_args(&args(&[
        "in.wf",
        "-o",
        "out.py",
        "--color=never",
        "--macro-output=silent",
    ]))
    .unwrap();
    assert_eq!(
        parsed,
        ExpandArgs {
            input: PathBuf::from("in.wf"),
            output: Some(PathBuf::from("out.py")),
            color: ColorMode::Never,
            macro_output: PrintTarget::Silent,
        }
    );

    let defaults = parse_expand_args(&args(&["in.wf"])).unwrap();
    assert_eq!(defaults.output, None);
    assert_eq!(defaults.color, ColorMode::Auto);
    assert_eq!(defaults.macro_output, PrintTarget::Stderr);
}

#[test]
fn bad_expand_arguments_are_usage_errors() {
    for bad in [
        &[][..],
        &["in.wf", "-o"][..],
        &["in.wf", "--color=pink"][..],
        &["in.wf", "--macro-output=file"][..],
        &["in.wf", "--fast"][..],
        &["a.wf", "b.wf"][..],
    ] {
        let err = parse_expand_args(&args(bad)).unwrap_err();
        assert!(matches!(err, CliError::Usage(_)), "{bad:?}: {err}");
        assert_eq!(err.exit_code(), 2);
    }
}

#[test]
fn expand_writes_the_output_file() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.wf");
    let output = dir.path().join("out.py");
    fs::write(&input, "macro X = 6 * 7\nprint(X)\n").unwrap();

    let args = ExpandArgs {
        input,
        output: Some(output.clone()),
        macro_output: PrintTarget::Silent,
        ..ExpandArgs::default()
    };
    assert_eq!(expand_file(&args).unwrap(), "print(42)\n");
    assert_eq!(fs::read_to_string(output).unwrap(), "print(42)\n");
}

#[test]
fn missing_input_is_a_read_error() {
    let dir = tempdir().unwrap();
    let args = ExpandArgs {
        input: dir.path().join("nope.wf"),
        ..ExpandArgs::default()
    };
    let err = expand_file(&args).unwrap_err();
    assert!(matches!(err, CliError::Read { .. }));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn lex_lists_every_token() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.wf");
    fs::write(&input, "x = 1\n").unwrap();

    let listing = lex_file(&input).unwrap();
    let lines: Vec<_> = listing.lines().skip(1).map(str::trim_end).collect();
    assert_eq!(
        lines,
        [
            "  NAME       'x'",
            "  OP         '='",
            "  NUMBER     '1'",
            "  NEWLINE    '\\n'",
            "  ENDMARKER  ''",
        ]
    );
    assert!(listing.starts_with("Tokens for '"));
    assert!(listing.lines().next().unwrap().ends_with("(5 tokens):"));
}

#[test]
fn check_reports_macros_and_statements() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.wf");
    fs::write(
        &input,
        "macro N = 2\nmacro def twice(x):\n    return x * N\nprint(twice(N))\ny = N\n",
    )
    .unwrap();

    let report = check_file(&input).unwrap();
    assert_eq!(
        report,
        CheckReport {
            macros: vec!["N".to_owned(), "twice".to_owned()],
            statements: 2,
        }
    );
    assert_eq!(report.to_string(), "ok: 2 statement(s), 2 macro(s) (N, twice)");
}

#[test]
fn check_rejects_broken_expansions() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.wf");
    fs::write(&input, "macro def bad():\n    return 'x ='\ny = bad()\n").unwrap();
    assert!(matches!(check_file(&input), Err(CliError::Output { .. })));
}
