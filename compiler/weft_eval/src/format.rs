//! String formatting: format specs, `str.format` and `%`.
//!
//! The format-spec grammar is `[[fill]align][sign][#][0][width][,|_][.precision][type]`,
//! shared by f-string fields, `str.format` fields and `format`-style padding.

use std::fmt;

use crate::errors::{self, ScriptError};
use crate::value::{float_repr, Value};

/// Parsed format specification. An empty spec leaves every field unset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormatSpec {
    pub fill: Option<char>,
    pub align: Option<Align>,
    pub sign: Option<Sign>,
    /// `#`: `0b`/`0o`/`0x` prefixes.
    pub alternate: bool,
    /// `0`: pad numbers with zeros after the sign.
    pub zero_pad: bool,
    pub width: Option<usize>,
    /// Digit grouping character, `,` or `_`.
    pub grouping: Option<char>,
    /// Decimal places for floats, maximum length for strings.
    pub precision: Option<usize>,
    pub format_type: Option<FormatType>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
    /// `=`: padding between sign and digits.
    AfterSign,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Sign {
    Plus,
    Minus,
    Space,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FormatType {
    Str,
    Decimal,
    Binary,
    Octal,
    Hex,
    HexUpper,
    Exp,
    ExpUpper,
    Fixed,
    General,
    Percent,
}

impl FormatType {
    fn from_char(c: char) -> Option<Self> {
        Some(match c {
            's' => Self::Str,
            'd' => Self::Decimal,
            'b' => Self::Binary,
            'o' => Self::Octal,
            'x' => Self::Hex,
            'X' => Self::HexUpper,
            'e' => Self::Exp,
            'E' => Self::ExpUpper,
            'f' | 'F' => Self::Fixed,
            'g' | 'G' => Self::General,
            '%' => Self::Percent,
            _ => return None,
        })
    }

    const fn is_integer_only(self) -> bool {
        matches!(
            self,
            Self::Decimal | Self::Binary | Self::Octal | Self::Hex | Self::HexUpper
        )
    }

    const fn letter(self) -> char {
        match self {
            Self::Str => 's',
            Self::Decimal => 'd',
            Self::Binary => 'b',
            Self::Octal => 'o',
            Self::Hex => 'x',
            Self::HexUpper => 'X',
            Self::Exp => 'e',
            Self::ExpUpper => 'E',
            Self::Fixed => 'f',
            Self::General => 'g',
            Self::Percent => '%',
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormatSpecError {
    UnknownType(char),
    TrailingCharacters(String),
    InvalidNumber(String),
}

impl fmt::Display for FormatSpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownType(c) => write!(f, "unknown format code '{c}'"),
            Self::TrailingCharacters(s) => write!(f, "invalid format specifier '{s}'"),
            Self::InvalidNumber(s) => write!(f, "invalid width or precision '{s}'"),
        }
    }
}

impl From<FormatSpecError> for ScriptError {
    fn from(err: FormatSpecError) -> Self {
        errors::value_error(err.to_string())
    }
}

fn align_of(c: char) -> Option<Align> {
    match c {
        '<' => Some(Align::Left),
        '^' => Some(Align::Center),
        '>' => Some(Align::Right),
        '=' => Some(Align::AfterSign),
        _ => None,
    }
}

fn take_number(chars: &[char], pos: &mut usize) -> Result<Option<usize>, FormatSpecError> {
    let start = *pos;
    while chars.get(*pos).is_some_and(char::is_ascii_digit) {
        *pos += 1;
    }
    if *pos == start {
        return Ok(None);
    }
    let text: String = chars[start..*pos].iter().collect();
    text.parse()
        .map(Some)
        .map_err(|_| FormatSpecError::InvalidNumber(text))
}

/// Parse a format spec.
pub fn parse_format_spec(spec: &str) -> Result<FormatSpec, FormatSpecError> {
    let mut result = FormatSpec::default();
    let chars: Vec<char> = spec.chars().collect();
    let mut pos = 0;

    // [[fill]align]
    if let Some(align) = chars.get(1).copied().and_then(align_of) {
        result.fill = chars.first().copied();
        result.align = Some(align);
        pos = 2;
    } else if let Some(align) = chars.first().copied().and_then(align_of) {
        result.align = Some(align);
        pos = 1;
    }

    result.sign = match chars.get(pos) {
        Some('+') => Some(Sign::Plus),
        Some('-') => Some(Sign::Minus),
        Some(' ') => Some(Sign::Space),
        _ => None,
    };
    if result.sign.is_some() {
        pos += 1;
    }

    if chars.get(pos) == Some(&'#') {
        result.alternate = true;
        pos += 1;
    }
    if chars.get(pos) == Some(&'0') {
        result.zero_pad = true;
        pos += 1;
    }
    result.width = take_number(&chars, &mut pos)?;

    if let Some(&c @ (',' | '_')) = chars.get(pos) {
        result.grouping = Some(c);
        pos += 1;
    }

    if chars.get(pos) == Some(&'.') {
        pos += 1;
        result.precision = Some(take_number(&chars, &mut pos)?.unwrap_or(0));
    }

    if let Some(&c) = chars.get(pos) {
        result.format_type = Some(FormatType::from_char(c).ok_or(FormatSpecError::UnknownType(c))?);
        pos += 1;
    }

    if pos < chars.len() {
        return Err(FormatSpecError::TrailingCharacters(spec.to_owned()));
    }
    Ok(result)
}

/// Apply `spec` to `value`.
pub fn format_value(value: &Value, spec: &str) -> Result<String, ScriptError> {
    if spec.is_empty() {
        return Ok(value.to_str());
    }
    let parsed = parse_format_spec(spec)?;
    match (parsed.format_type, value) {
        (None, Value::Int(n)) => Ok(format_int(*n, &parsed)),
        (None, Value::Float(f)) => Ok(format_float(*f, &parsed)),
        (None | Some(FormatType::Str), _) => Ok(format_str(&value.to_str(), &parsed)),
        (Some(ty), _) => {
            if ty.is_integer_only() {
                if let Some(n) = value.as_int() {
                    return Ok(format_int(n, &parsed));
                }
            } else if let Some(f) = value.as_float() {
                return Ok(format_float(f, &parsed));
            }
            Err(errors::value_error(format!(
                "unknown format code '{}' for object of type '{}'",
                ty.letter(),
                value.type_name()
            )))
        }
    }
}

fn format_int(n: i64, spec: &FormatSpec) -> String {
    let abs = n.unsigned_abs();
    let (digits, prefix) = match spec.format_type {
        Some(FormatType::Binary) => (format!("{abs:b}"), "0b"),
        Some(FormatType::Octal) => (format!("{abs:o}"), "0o"),
        Some(FormatType::Hex) => (format!("{abs:x}"), "0x"),
        Some(FormatType::HexUpper) => (format!("{abs:X}"), "0X"),
        _ => (abs.to_string(), ""),
    };
    let digits = match spec.grouping {
        Some(sep) => group_digits(&digits, sep),
        None => digits,
    };
    let prefix = if spec.alternate { prefix } else { "" };
    pad_number(sign_of(n < 0, spec), &format!("{prefix}{digits}"), spec)
}

fn format_float(f: f64, spec: &FormatSpec) -> String {
    let negative = f.is_sign_negative() && !f.is_nan();
    let precision = spec.precision.unwrap_or(6);
    let abs = f.abs();
    let body = if abs.is_nan() {
        "nan".to_owned()
    } else if abs.is_infinite() {
        "inf".to_owned()
    } else {
        match spec.format_type {
            Some(FormatType::Fixed) => format!("{abs:.precision$}"),
            Some(FormatType::Exp) => exponent(abs, precision, false),
            Some(FormatType::ExpUpper) => exponent(abs, precision, true),
            Some(FormatType::Percent) => format!("{:.precision$}%", abs * 100.0),
            Some(FormatType::General) => general(abs, precision, spec.alternate),
            _ => match spec.precision {
                Some(precision) => general(abs, precision, spec.alternate),
                None => float_repr(abs),
            },
        }
    };
    let body = match spec.grouping {
        Some(sep) => {
            let split = body.find(|c: char| !c.is_ascii_digit()).unwrap_or(body.len());
            format!("{}{}", group_digits(&body[..split], sep), &body[split..])
        }
        None => body,
    };
    pad_number(sign_of(negative, spec), &body, spec)
}

/// Scientific notation with a signed two-digit exponent: `1.5e+03`.
fn exponent(f: f64, precision: usize, upper: bool) -> String {
    let text = format!("{f:.precision$e}");
    let (mantissa, exp) = text.split_once('e').unwrap_or((&text, "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let sign = if exp < 0 { '-' } else { '+' };
    let e = if upper { 'E' } else { 'e' };
    format!("{mantissa}{e}{sign}{:02}", exp.unsigned_abs())
}

/// The `g` presentation: fixed or scientific depending on magnitude, with
/// trailing zeros removed.
fn general(f: f64, precision: usize, keep_zeros: bool) -> String {
    let precision = precision.max(1);
    if f == 0.0 {
        return "0".to_owned();
    }
    let digits = precision - 1;
    let sci = format!("{f:.digits$e}");
    let exp: i64 = sci
        .split_once('e')
        .and_then(|(_, exp)| exp.parse().ok())
        .unwrap_or(0);
    let limit = i64::try_from(precision).unwrap_or(i64::MAX);
    let text = if (-4..limit).contains(&exp) {
        let decimals = usize::try_from(limit - 1 - exp).unwrap_or(0);
        format!("{f:.decimals$}")
    } else {
        exponent(f, precision - 1, false)
    };
    if keep_zeros {
        return text;
    }
    match text.split_once('e') {
        Some((mantissa, exp)) => format!("{}e{exp}", strip_zeros(mantissa)),
        None => strip_zeros(&text).to_owned(),
    }
}

fn strip_zeros(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

fn group_digits(digits: &str, sep: char) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(sep);
        }
        out.push(c);
    }
    out
}

fn sign_of(negative: bool, spec: &FormatSpec) -> &'static str {
    match (negative, spec.sign) {
        (true, _) => "-",
        (false, Some(Sign::Plus)) => "+",
        (false, Some(Sign::Space)) => " ",
        (false, _) => "",
    }
}

/// Pad a signed number. Numbers align right by default; zero padding goes
/// between the sign and the digits.
fn pad_number(sign: &str, body: &str, spec: &FormatSpec) -> String {
    let width = spec.width.unwrap_or(0);
    let len = sign.chars().count() + body.chars().count();
    if (spec.zero_pad && spec.align.is_none()) || spec.align == Some(Align::AfterSign) {
        let fill = if spec.align.is_none() { '0' } else { spec.fill.unwrap_or(' ') };
        let padding: String = std::iter::repeat(fill).take(width.saturating_sub(len)).collect();
        return format!("{sign}{padding}{body}");
    }
    align(&format!("{sign}{body}"), spec, Align::Right)
}

fn format_str(s: &str, spec: &FormatSpec) -> String {
    let truncated: String = match spec.precision {
        Some(precision) => s.chars().take(precision).collect(),
        None => s.to_owned(),
    };
    align(&truncated, spec, Align::Left)
}

fn align(text: &str, spec: &FormatSpec, default: Align) -> String {
    let width = spec.width.unwrap_or(0);
    let len = text.chars().count();
    if len >= width {
        return text.to_owned();
    }
    let fill = spec.fill.unwrap_or(if spec.zero_pad { '0' } else { ' ' });
    let padding = width - len;
    let (before, after) = match spec.align.unwrap_or(default) {
        Align::Left => (0, padding),
        Align::Right | Align::AfterSign => (padding, 0),
        Align::Center => (padding / 2, padding - padding / 2),
    };
    let mut out = String::with_capacity(width);
    out.extend(std::iter::repeat(fill).take(before));
    out.push_str(text);
    out.extend(std::iter::repeat(fill).take(after));
    out
}

// Templates

/// One replacement field of a `str.format` template.
#[derive(Debug, PartialEq, Eq)]
pub struct Field<'a> {
    /// `""` for automatic numbering, a digit string, or a keyword name.
    pub name: &'a str,
    /// `.attr` and `[key]` accessors after the name.
    pub accessors: Vec<Accessor<'a>>,
    pub conversion: Option<char>,
    pub spec: &'a str,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Accessor<'a> {
    Attr(&'a str),
    Index(&'a str),
}

/// A template split into literal text and replacement fields.
#[derive(Debug, PartialEq, Eq)]
pub enum Piece<'a> {
    Literal(String),
    Field(Field<'a>),
}

/// Split a `str.format` template. `{{` and `}}` are literal braces; a field
/// spec may contain one level of nested `{...}` fields.
pub fn parse_template(template: &str) -> Result<Vec<Piece<'_>>, ScriptError> {
    let mut pieces = Vec::new();
    let mut literal = String::new();
    let mut rest = template;
    while let Some(i) = rest.find(['{', '}']) {
        literal.push_str(&rest[..i]);
        let after = &rest[i + 1..];
        if rest[i..].starts_with("{{") {
            literal.push('{');
            rest = &rest[i + 2..];
            continue;
        }
        if rest[i..].starts_with("}}") {
            literal.push('}');
            rest = &rest[i + 2..];
            continue;
        }
        if rest[i..].starts_with('}') {
            return Err(errors::value_error("Single '}' encountered in format string"));
        }
        let end = field_end(after)
            .ok_or_else(|| errors::value_error("expected '}' before end of string"))?;
        if !literal.is_empty() {
            pieces.push(Piece::Literal(std::mem::take(&mut literal)));
        }
        pieces.push(Piece::Field(parse_field(&after[..end])?));
        rest = &after[end + 1..];
    }
    literal.push_str(rest);
    if !literal.is_empty() {
        pieces.push(Piece::Literal(literal));
    }
    Ok(pieces)
}

/// Byte offset of the `}` closing a field body, allowing nested braces.
fn field_end(body: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in body.char_indices() {
        match c {
            '{' => depth += 1,
            '}' if depth == 0 => return Some(i),
            '}' => depth -= 1,
            _ => {}
        }
    }
    None
}

fn parse_field(body: &str) -> Result<Field<'_>, ScriptError> {
    let (head, spec) = split_spec(body);
    let (head, conversion) = match head.split_once('!') {
        Some((head, conv)) => {
            let mut chars = conv.chars();
            match (chars.next(), chars.next()) {
                (Some(c @ ('r' | 's')), None) => (head, Some(c)),
                _ => {
                    return Err(errors::value_error(
                        "expected ':' after conversion specifier",
                    ))
                }
            }
        }
        None => (head, None),
    };
    let name_end = head.find(['.', '[']).unwrap_or(head.len());
    let name = &head[..name_end];
    let mut accessors = Vec::new();
    let mut rest = &head[name_end..];
    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix('.') {
            let end = after.find(['.', '[']).unwrap_or(after.len());
            accessors.push(Accessor::Attr(&after[..end]));
            rest = &after[end..];
        } else if let Some(after) = rest.strip_prefix('[') {
            let end = after
                .find(']')
                .ok_or_else(|| errors::value_error("Missing ']' in format string"))?;
            accessors.push(Accessor::Index(&after[..end]));
            rest = &after[end + 1..];
        } else {
            return Err(errors::value_error(
                "Only '.' or '[' may follow ']' in format field specifier",
            ));
        }
    }
    Ok(Field {
        name,
        accessors,
        conversion,
        spec,
    })
}

/// Split `name!conv:spec` at the first `:` outside brackets.
fn split_spec(body: &str) -> (&str, &str) {
    let mut in_index = false;
    for (i, c) in body.char_indices() {
        match c {
            '[' => in_index = true,
            ']' => in_index = false,
            ':' if !in_index => return (&body[..i], &body[i + 1..]),
            _ => {}
        }
    }
    (body, "")
}

/// Apply a `!r`/`!s` conversion.
pub fn convert(value: &Value, conversion: Option<char>) -> Value {
    match conversion {
        Some('r') => Value::string(value.repr()),
        Some(_) => Value::string(value.to_str()),
        None => value.clone(),
    }
}

// printf-style

/// `template % args` with `%s`, `%r`, `%d`/`%i`, `%f`, `%x` and `%%`.
pub fn percent_format(template: &str, args: &Value) -> Result<Value, ScriptError> {
    let args = match args {
        Value::Tuple(items) => items.to_vec(),
        other => vec![other.clone()],
    };
    let mut args = args.into_iter();
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let mut spec = String::new();
        while let Some(&next) = chars.peek() {
            if next.is_ascii_digit() || matches!(next, '.' | '-' | '+' | ' ' | '#') {
                spec.push(next);
                chars.next();
            } else {
                break;
            }
        }
        let Some(code) = chars.next() else {
            return Err(errors::value_error("incomplete format"));
        };
        if code == '%' {
            out.push('%');
            continue;
        }
        let arg = args
            .next()
            .ok_or_else(|| errors::type_error("not enough arguments for format string"))?;
        let spec = spec.replacen('-', "<", 1);
        let text = match code {
            's' => format_value(&Value::string(arg.to_str()), &spec)?,
            'r' => format_value(&Value::string(arg.repr()), &spec)?,
            'd' | 'i' => match arg.as_float() {
                Some(f) if arg.as_int().is_none() => {
                    format_value(&Value::Int(float_to_int(f)), &format!("{spec}d"))?
                }
                Some(_) => format_value(&arg, &format!("{spec}d"))?,
                None => {
                    return Err(errors::type_error(format!(
                        "%{code} format: a number is required, not {}",
                        arg.type_name()
                    )))
                }
            },
            'f' | 'e' | 'g' | 'x' | 'X' | 'o' => format_value(&arg, &format!("{spec}{code}"))?,
            other => {
                return Err(errors::value_error(format!(
                    "unsupported format character '{other}'"
                )))
            }
        };
        out.push_str(&text);
    }
    if args.next().is_some() {
        return Err(errors::type_error(
            "not all arguments converted during string formatting",
        ));
    }
    Ok(Value::string(out))
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "float to int truncation is the documented behavior of %d"
)]
pub(crate) fn float_to_int(f: f64) -> i64 {
    f.trunc() as i64
}
