//! Number, string and f-string literals.

use crate::ast::{ExprKind, FStringPart};
use crate::SyntaxError;

/// Parse a number token's text.
pub(super) fn parse_number(text: &str) -> Result<ExprKind, String> {
    let digits: String = text.chars().filter(|&c| c != '_').collect();
    if digits.ends_with(['j', 'J']) {
        return Err("complex literals are not supported".to_owned());
    }
    let lower = digits.to_ascii_lowercase();
    let radix = match lower.get(..2) {
        Some("0x") => Some(16),
        Some("0o") => Some(8),
        Some("0b") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return i64::from_str_radix(&lower[2..], radix)
            .map(ExprKind::Int)
            .map_err(|_| format!("integer literal too large: {text}"));
    }
    if lower.contains(['.', 'e']) {
        return lower
            .parse::<f64>()
            .map(ExprKind::Float)
            .map_err(|_| format!("invalid float literal: {text}"));
    }
    lower
        .parse::<i64>()
        .map(ExprKind::Int)
        .map_err(|_| format!("integer literal too large: {text}"))
}

/// A string token split into its parts.
struct StringLiteral<'a> {
    /// Text between the quotes, escapes not yet processed.
    body: &'a str,
    raw: bool,
    formatted: bool,
}

fn split_literal(text: &str) -> StringLiteral<'_> {
    let prefix_len = text
        .find(|c: char| c == '\'' || c == '"')
        .unwrap_or(text.len());
    let prefix = text[..prefix_len].to_ascii_lowercase();
    let rest = &text[prefix_len..];
    let quote_len = if rest.starts_with("'''") || rest.starts_with("\"\"\"") {
        3
    } else {
        1
    };
    let body = rest
        .get(quote_len..rest.len().saturating_sub(quote_len))
        .unwrap_or("");
    StringLiteral {
        body,
        raw: prefix.contains('r'),
        formatted: prefix.contains('f'),
    }
}

/// Implicitly concatenated string tokens. Any f-string among them makes
/// the whole literal an f-string.
pub(super) fn parse_strings(pieces: &[String], line: usize) -> Result<ExprKind, SyntaxError> {
    let mut parts: Vec<FStringPart> = Vec::new();
    let mut formatted = false;
    for piece in pieces {
        let literal = split_literal(piece);
        if literal.formatted {
            formatted = true;
            for part in parse_fstring(literal.body, literal.raw, line)? {
                push_part(&mut parts, part);
            }
        } else {
            let text = if literal.raw {
                literal.body.to_owned()
            } else {
                unescape(literal.body)
            };
            push_part(&mut parts, FStringPart::Literal(text));
        }
    }
    if formatted {
        return Ok(ExprKind::FString(parts));
    }
    let mut text = String::new();
    for part in parts {
        if let FStringPart::Literal(literal) = part {
            text.push_str(&literal);
        }
    }
    Ok(ExprKind::Str(text))
}

fn push_part(parts: &mut Vec<FStringPart>, part: FStringPart) {
    if let FStringPart::Literal(text) = &part {
        if text.is_empty() {
            return;
        }
        if let Some(FStringPart::Literal(last)) = parts.last_mut() {
            last.push_str(text);
            return;
        }
    }
    parts.push(part);
}

/// Split an f-string body into literal text and `{expr[!c][:spec]}` fields.
fn parse_fstring(body: &str, raw: bool, line: usize) -> Result<Vec<FStringPart>, SyntaxError> {
    let mut parts = Vec::new();
    let mut literal = String::new();
    let flush = |literal: &mut String, parts: &mut Vec<FStringPart>| {
        if !literal.is_empty() {
            let text = if raw {
                std::mem::take(literal)
            } else {
                unescape(&std::mem::take(literal))
            };
            parts.push(FStringPart::Literal(text));
        }
    };

    let mut chars = body.char_indices().peekable();
    while let Some((at, c)) = chars.next() {
        match c {
            '{' if chars.peek().is_some_and(|&(_, next)| next == '{') => {
                chars.next();
                literal.push('{');
            }
            '}' if chars.peek().is_some_and(|&(_, next)| next == '}') => {
                chars.next();
                literal.push('}');
            }
            '}' => {
                return Err(SyntaxError::new(
                    "f-string: single '}' is not allowed",
                    line,
                ))
            }
            '{' => {
                let end = field_end(body, at + 1).ok_or_else(|| {
                    SyntaxError::new("f-string: expecting '}'", line)
                })?;
                flush(&mut literal, &mut parts);
                parts.push(parse_field(&body[at + 1..end], line)?);
                while chars.peek().is_some_and(|&(next, _)| next <= end) {
                    chars.next();
                }
            }
            _ => literal.push(c),
        }
    }
    flush(&mut literal, &mut parts);
    Ok(parts)
}

/// Byte index of the `}` closing a field that starts at `start`.
fn field_end(body: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (offset, c) in body[start..].char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            '}' if depth == 0 => return Some(start + offset),
            '}' => depth -= 1,
            _ => {}
        }
    }
    None
}

fn parse_field(field: &str, line: usize) -> Result<FStringPart, SyntaxError> {
    // `!` and `:` only split the field outside brackets and strings
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut expr_end = field.len();
    let mut conversion = None;
    let mut spec = None;
    let mut chars = field.char_indices().peekable();
    while let Some((at, c)) = chars.next() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            '!' if depth == 0 && chars.peek().is_some_and(|&(_, next)| next != '=') => {
                expr_end = at;
                let rest = &field[at + 1..];
                let (flag, tail) = rest.split_at(rest.chars().next().map_or(0, char::len_utf8));
                let flag = flag.chars().next().filter(|flag| matches!(flag, 'r' | 's' | 'a'));
                let Some(flag) = flag else {
                    return Err(SyntaxError::new(
                        "f-string: invalid conversion character",
                        line,
                    ));
                };
                conversion = Some(flag);
                if let Some(tail) = tail.strip_prefix(':') {
                    spec = Some(tail.to_owned());
                } else if !tail.is_empty() {
                    return Err(SyntaxError::new("f-string: expecting '}'", line));
                }
                break;
            }
            ':' if depth == 0 => {
                expr_end = at;
                spec = Some(field[at + 1..].to_owned());
                break;
            }
            _ => {}
        }
    }
    let source = field[..expr_end].trim();
    if source.is_empty() {
        return Err(SyntaxError::new("f-string: empty expression not allowed", line));
    }
    let value = crate::parse_expression(source)
        .map_err(|err| SyntaxError::new(format!("f-string: {}", err.message), line))?;
    Ok(FStringPart::Field {
        value,
        conversion,
        spec,
    })
}

/// Process backslash escapes. Unknown escapes are kept verbatim.
pub(crate) fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(escape) = chars.next() else {
            out.push('\\');
            break;
        };
        match escape {
            '\n' => {}
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '0' => out.push('\0'),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'v' => out.push('\x0b'),
            'x' | 'u' | 'U' => {
                let width = match escape {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let hex: String = (0..width).map_while(|_| chars.next_if(char::is_ascii_hexdigit)).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) if hex.len() == width => out.push(decoded),
                    _ => {
                        out.push('\\');
                        out.push(escape);
                        out.push_str(&hex);
                    }
                }
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    out
}
