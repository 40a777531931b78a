//! Printf-style message formatting.
//!
//! Templates use percent directives:
//!
//! | Directive | Renders |
//! |-----------|---------|
//! | `%s` | the argument as a string |
//! | `%d` | the argument as a number |
//! | `%i` | the argument as an integer (fractions truncated) |
//! | `%f` | the argument as a floating point number |
//! | `%j` | the argument as JSON |
//! | `%o`, `%O` | the argument as a generic value (strings quoted) |
//! | `%c` | nothing; the argument is consumed |
//! | `%%` | a literal `%` |
//!
//! A directive with no argument left, or an unknown directive, is kept
//! verbatim. Arguments left over after the template is exhausted are
//! appended, each preceded by a single space. Formatting never fails:
//! values that are not numeric render as `NaN` under numeric directives.

use std::fmt;

use serde_json::Value;

/// A positional substitution value.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Str(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Char(char),
    Json(Value),
    Null,
}

macro_rules! impl_from_signed {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Arg {
            fn from(value: $ty) -> Self {
                Arg::Int(value as i64)
            }
        })*
    };
}

macro_rules! impl_from_unsigned {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Arg {
            fn from(value: $ty) -> Self {
                Arg::UInt(value as u64)
            }
        })*
    };
}

impl_from_signed!(i8, i16, i32, i64, isize);
impl_from_unsigned!(u8, u16, u32, u64, usize);

impl From<f32> for Arg {
    fn from(value: f32) -> Self {
        Arg::Float(f64::from(value))
    }
}

impl From<f64> for Arg {
    fn from(value: f64) -> Self {
        Arg::Float(value)
    }
}

impl From<bool> for Arg {
    fn from(value: bool) -> Self {
        Arg::Bool(value)
    }
}

impl From<char> for Arg {
    fn from(value: char) -> Self {
        Arg::Char(value)
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Arg::Str(value.to_string())
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Arg::Str(value)
    }
}

impl From<&String> for Arg {
    fn from(value: &String) -> Self {
        Arg::Str(value.clone())
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Arg::Json(value)
    }
}

impl<T: Into<Arg>> From<Option<T>> for Arg {
    fn from(value: Option<T>) -> Self {
        value.map_or(Arg::Null, Into::into)
    }
}

impl Arg {
    /// Converts the argument to a JSON value.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Arg::Str(s) => Value::String(s.clone()),
            Arg::Int(n) => Value::from(*n),
            Arg::UInt(n) => Value::from(*n),
            // Non-finite floats have no JSON form and map to null.
            Arg::Float(n) => serde_json::Number::from_f64(*n).map_or(Value::Null, Value::Number),
            Arg::Bool(b) => Value::Bool(*b),
            Arg::Char(c) => Value::String(c.to_string()),
            Arg::Json(v) => v.clone(),
            Arg::Null => Value::Null,
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            Arg::Int(n) => Some(*n as f64),
            Arg::UInt(n) => Some(*n as f64),
            Arg::Float(n) => Some(*n),
            Arg::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Arg::Null => Some(0.0),
            Arg::Str(s) => parse_number(s),
            Arg::Char(c) => c.to_digit(10).map(f64::from),
            Arg::Json(Value::Number(n)) => n.as_f64(),
            Arg::Json(Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
            Arg::Json(Value::Null) => Some(0.0),
            Arg::Json(Value::String(s)) => parse_number(s),
            Arg::Json(_) => None,
        }
    }

    fn render_number(&self) -> String {
        match self {
            Arg::Int(n) => n.to_string(),
            Arg::UInt(n) => n.to_string(),
            other => other.as_number().map_or_else(|| "NaN".to_string(), number_string),
        }
    }

    fn render_integer(&self) -> String {
        match self {
            Arg::Int(n) => n.to_string(),
            Arg::UInt(n) => n.to_string(),
            Arg::Float(n) => number_string(n.trunc()),
            Arg::Str(s) | Arg::Json(Value::String(s)) => {
                parse_integer_prefix(s).unwrap_or_else(|| "NaN".to_string())
            }
            Arg::Char(c) => c.to_digit(10).map_or_else(|| "NaN".to_string(), |d| d.to_string()),
            Arg::Json(Value::Number(n)) => n
                .as_i64()
                .map(|i| i.to_string())
                .or_else(|| n.as_u64().map(|u| u.to_string()))
                .or_else(|| n.as_f64().map(|f| number_string(f.trunc())))
                .unwrap_or_else(|| "NaN".to_string()),
            _ => "NaN".to_string(),
        }
    }

    fn render_float(&self) -> String {
        match self {
            Arg::Bool(_) | Arg::Null | Arg::Json(Value::Bool(_) | Value::Null) => "NaN".to_string(),
            other => other.as_number().map_or_else(|| "NaN".to_string(), number_string),
        }
    }

    fn render_inspect(&self) -> String {
        match self {
            Arg::Str(s) => format!("'{s}'"),
            Arg::Char(c) => format!("'{c}'"),
            Arg::Json(v) => v.to_string(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Str(s) => f.write_str(s),
            Arg::Int(n) => write!(f, "{n}"),
            Arg::UInt(n) => write!(f, "{n}"),
            Arg::Float(n) => f.write_str(&number_string(*n)),
            Arg::Bool(b) => write!(f, "{b}"),
            Arg::Char(c) => write!(f, "{c}"),
            Arg::Json(Value::String(s)) => f.write_str(s),
            Arg::Json(v) => write!(f, "{v}"),
            Arg::Null => f.write_str("null"),
        }
    }
}

fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse::<f64>().ok().filter(|n| !n.is_nan())
}

/// Leading optional sign followed by decimal digits, the way integer
/// parsing of free-form text usually behaves.
fn parse_integer_prefix(s: &str) -> Option<String> {
    let trimmed = s.trim_start();
    let (sign, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Some("0".to_string());
    }
    Some(format!("{sign}{digits}"))
}

fn number_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Turns a template and positional arguments into one string.
///
/// This is the seam for replacing the built-in printf semantics.
pub trait MessageFormatter: Send + Sync {
    fn format(&self, template: &str, args: &[Arg]) -> String;
}

/// The default percent-directive formatter.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrintfFormatter;

impl MessageFormatter for PrintfFormatter {
    fn format(&self, template: &str, args: &[Arg]) -> String {
        sprintf(template, args)
    }
}

fn is_directive(c: char) -> bool {
    matches!(c, 's' | 'd' | 'i' | 'f' | 'j' | 'o' | 'O' | 'c')
}

fn render_directive(directive: char, arg: &Arg) -> String {
    match directive {
        'd' => arg.render_number(),
        'i' => arg.render_integer(),
        'f' => arg.render_float(),
        'j' => arg.to_json().to_string(),
        'o' | 'O' => arg.render_inspect(),
        'c' => String::new(),
        _ => arg.to_string(),
    }
}

/// Formats `template` with `args` using percent directives.
#[must_use]
pub fn sprintf(template: &str, args: &[Arg]) -> String {
    let mut out = String::with_capacity(template.len() + args.len() * 8);
    let mut remaining = args.iter();
    let mut pending = remaining.next();
    let mut chars = template.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '%' {
            out.push(ch);
            continue;
        }
        let Some(&directive) = chars.peek() else {
            out.push('%');
            break;
        };
        if directive == '%' {
            chars.next();
            out.push('%');
            continue;
        }
        match pending {
            Some(arg) if is_directive(directive) => {
                chars.next();
                out.push_str(&render_directive(directive, arg));
                pending = remaining.next();
            }
            _ => out.push('%'),
        }
    }

    while let Some(arg) = pending {
        out.push(' ');
        out.push_str(&arg.to_string());
        pending = remaining.next();
    }

    out
}
