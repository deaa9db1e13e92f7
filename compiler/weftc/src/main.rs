//! The `weft` command line.

use std::io::IsTerminal;
use std::path::Path;

use weftc::commands::{check_file, expand_file, lex_file, parse_expand_args, CliError};
use weftc::{init_tracing, render_error, ColorMode};

fn main() {
    init_tracing();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    match command.as_str() {
        "expand" => {
            let parsed = match parse_expand_args(&args[2..]) {
                Ok(parsed) => parsed,
                Err(err) => fail(&err, ColorMode::Auto),
            };
            match expand_file(&parsed) {
                Ok(expanded) if parsed.output.is_none() => print!("{expanded}"),
                Ok(_) => {}
                Err(err) => fail(&err, parsed.color),
            }
        }
        "lex" => {
            let Some(path) = args.get(2) else {
                eprintln!("Usage: weft lex <file>");
                std::process::exit(2);
            };
            match lex_file(Path::new(path)) {
                Ok(listing) => print!("{listing}"),
                Err(err) => fail(&err, ColorMode::Auto),
            }
        }
        "check" => {
            let Some(path) = args.get(2) else {
                eprintln!("Usage: weft check <file>");
                std::process::exit(2);
            };
            match check_file(Path::new(path)) {
                Ok(report) => println!("{report}"),
                Err(err) => fail(&err, ColorMode::Auto),
            }
        }
        "help" | "--help" | "-h" => print_usage(),
        "version" | "--version" | "-V" => println!("weft {}", env!("CARGO_PKG_VERSION")),
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(2);
        }
    }
}

/// Report `err` on stderr and exit.
fn fail(err: &CliError, color: ColorMode) -> ! {
    let colored = color.should_use_colors(std::io::stderr().is_terminal());
    match err {
        CliError::Expand { path, error } => eprint!("{}", render_error(path, error, colored)),
        CliError::Usage(message) => {
            eprintln!("error: {message}");
            eprintln!("Usage: weft expand <file> [-o <out>] [--color=auto|always|never] [--macro-output=stdout|stderr|silent]");
        }
        other => eprintln!("error: {other}"),
    }
    std::process::exit(err.exit_code());
}

fn print_usage() {
    println!("weft - macro expander");
    println!();
    println!("Usage: weft <command> [options]");
    println!();
    println!("Commands:");
    println!("  expand <file>    Expand macros and print the result");
    println!("  lex <file>       Show the token stream");
    println!("  check <file>     Expand and verify the result parses");
    println!("  help             Show this message");
    println!("  version          Show version");
    println!();
    println!("Expand options:");
    println!("  -o <path>                            Write to a file instead of stdout");
    println!("  --color=auto|always|never            Colored diagnostics (default: auto)");
    println!("  --macro-output=stdout|stderr|silent  Where macro print() goes (default: stderr)");
    println!();
    println!("Logging: set WEFT_LOG (or RUST_LOG), e.g. WEFT_LOG=weft_expand=debug");
}
