//! Raw scanner output.
//!
//! `RawToken` is the logos-derived first pass. It knows nothing about lines
//! or indentation; the cooker turns it into [`weft_ir::Token`]s.

use logos::{Lexer, Logos};

/// Raw token from logos (before layout cooking).
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\f]+")] // Horizontal whitespace is recovered from spans
pub(crate) enum RawToken {
    #[regex(r"\r?\n")]
    Newline,

    #[regex(r"\\\r?\n")]
    LineContinuation,

    #[regex(r"#[^\r\n]*")]
    Comment,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Name,

    #[regex(r"0[xX](_?[0-9a-fA-F])+")]
    #[regex(r"0[oO](_?[0-7])+")]
    #[regex(r"0[bB](_?[01])+")]
    #[regex(r"[0-9](_?[0-9])*[jJ]?")]
    #[regex(r"[0-9](_?[0-9])*\.([0-9](_?[0-9])*)?([eE][+-]?[0-9](_?[0-9])*)?[jJ]?")]
    #[regex(r"\.[0-9](_?[0-9])*([eE][+-]?[0-9](_?[0-9])*)?[jJ]?")]
    #[regex(r"[0-9](_?[0-9])*[eE][+-]?[0-9](_?[0-9])*[jJ]?")]
    Number,

    /// Only the prefix and opening quote are matched here; [`lex_string`]
    /// extends the token over the body.
    #[regex(r#"[rRbBfFuU]{0,2}["']"#, lex_string)]
    String,

    #[regex(r"[(\[{]")]
    Open,

    #[regex(r"[)\]}]")]
    Close,

    #[regex(r"\*\*=|//=|>>=|<<=|\.\.\.|->|:=|\*\*|//|<<|>>|<=|>=|==|!=|\+=|-=|\*=|/=|%=|&=|\|=|\^=|@=")]
    #[regex(r"[-+*/%@&|^~<>,:;.=]")]
    Op,
}

/// Scan a string body after its opening quote.
///
/// Handles triple quotes and backslash escapes. Returns `false` when the
/// string is unterminated, which logos reports as an error over the opener.
fn lex_string(lex: &mut Lexer<'_, RawToken>) -> bool {
    let Some(quote) = lex.slice().chars().last() else {
        return false;
    };
    let rest = lex.remainder();
    let triple: String = std::iter::repeat(quote).take(3).collect();
    let is_triple = rest.starts_with(&triple[1..]);
    let closer = if is_triple { &triple[..] } else { &triple[..1] };
    let body = if is_triple { 2 } else { 0 };

    let mut chars = rest[body..].char_indices();
    while let Some((at, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '\n' if !is_triple => return false,
            _ if rest[body + at..].starts_with(closer) => {
                lex.bump(body + at + closer.len());
                return true;
            }
            _ => {}
        }
    }
    false
}
