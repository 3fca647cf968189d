//! Generic literal codec for persisted property values.
//!
//! # Responsibility
//! - Read property values permissively (numbers, strings, bare words, lists).
//! - Write property values in one canonical form.
//!
//! # Invariants
//! - `Literal::parse(&literal.to_string())` yields an equal literal.
//! - Decimals are always written with a `.` so they never read back as
//!   integers.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::iter::Peekable;
use std::str::Chars;

/// One decoded property value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Wide enough for every `u64` offset and negative values alike.
    Integer(i128),
    Decimal(f64),
    Text(String),
    List(Vec<Literal>),
}

/// Error raised when one property value cannot be decoded.
///
/// Callers recover by treating the property as absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyDecodeError {
    /// Value is not a well-formed literal.
    Malformed { value: String, reason: &'static str },
    /// Value is a literal, but not of the shape the property requires.
    UnexpectedShape {
        value: String,
        expected: &'static str,
    },
}

impl PropertyDecodeError {
    pub(crate) fn malformed(value: &str, reason: &'static str) -> Self {
        Self::Malformed {
            value: value.to_string(),
            reason,
        }
    }

    pub(crate) fn unexpected(value: &str, expected: &'static str) -> Self {
        Self::UnexpectedShape {
            value: value.to_string(),
            expected,
        }
    }
}

impl Display for PropertyDecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed { value, reason } => {
                write!(f, "malformed property value `{value}`: {reason}")
            }
            Self::UnexpectedShape { value, expected } => {
                write!(f, "property value `{value}` is not {expected}")
            }
        }
    }
}

impl Error for PropertyDecodeError {}

impl Literal {
    /// Parses one property value.
    ///
    /// Bare words that are not numbers read as text, and a standalone `.`
    /// inside a list is skipped so dotted pairs such as `(2 . 140)` decode
    /// as two-element lists.
    pub fn parse(input: &str) -> Result<Self, PropertyDecodeError> {
        let mut reader = Reader {
            source: input,
            chars: input.chars().peekable(),
        };
        reader.skip_whitespace();
        if reader.chars.peek().is_none() {
            return Err(PropertyDecodeError::malformed(input, "empty value"));
        }
        let literal = reader.read_item()?;
        reader.skip_whitespace();
        if reader.chars.peek().is_some() {
            return Err(PropertyDecodeError::malformed(
                input,
                "trailing characters after value",
            ));
        }
        Ok(literal)
    }

    pub fn as_integer(&self) -> Option<i128> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns a numeric value, widening integers.
    pub fn as_decimal(&self) -> Option<f64> {
        match self {
            Self::Integer(value) => Some(*value as f64),
            Self::Decimal(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Literal]> {
        match self {
            Self::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Decimal(value) => {
                let text = value.to_string();
                if text.contains('.') {
                    write!(f, "{text}")
                } else {
                    write!(f, "{text}.0")
                }
            }
            Self::Text(value) => {
                f.write_str("\"")?;
                for ch in value.chars() {
                    match ch {
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        '\n' => f.write_str("\\n")?,
                        other => write!(f, "{other}")?,
                    }
                }
                f.write_str("\"")
            }
            Self::List(items) => {
                f.write_str("(")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
        }
    }
}

struct Reader<'a> {
    source: &'a str,
    chars: Peekable<Chars<'a>>,
}

impl Reader<'_> {
    fn skip_whitespace(&mut self) {
        while matches!(self.chars.peek(), Some(ch) if ch.is_whitespace()) {
            self.chars.next();
        }
    }

    fn read_item(&mut self) -> Result<Literal, PropertyDecodeError> {
        match self.chars.peek() {
            Some('(') => {
                self.chars.next();
                self.read_list()
            }
            Some('"') => {
                self.chars.next();
                self.read_string()
            }
            Some(')') => Err(PropertyDecodeError::malformed(
                self.source,
                "unbalanced `)`",
            )),
            Some(_) => {
                let token = self.read_token();
                Ok(classify_token(token))
            }
            None => Err(PropertyDecodeError::malformed(
                self.source,
                "unexpected end of value",
            )),
        }
    }

    fn read_list(&mut self) -> Result<Literal, PropertyDecodeError> {
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            match self.chars.peek() {
                None => {
                    return Err(PropertyDecodeError::malformed(
                        self.source,
                        "unterminated list",
                    ));
                }
                Some(')') => {
                    self.chars.next();
                    return Ok(Literal::List(items));
                }
                Some('.') => {
                    if self.at_bare_dot() {
                        self.chars.next();
                    } else {
                        items.push(self.read_item()?);
                    }
                }
                Some(_) => items.push(self.read_item()?),
            }
        }
    }

    fn at_bare_dot(&self) -> bool {
        let mut ahead = self.chars.clone();
        ahead.next();
        matches!(ahead.peek(), None | Some(')')) || ahead.peek().is_some_and(|c| c.is_whitespace())
    }

    fn read_string(&mut self) -> Result<Literal, PropertyDecodeError> {
        let mut value = String::new();
        loop {
            match self.chars.next() {
                None => {
                    return Err(PropertyDecodeError::malformed(
                        self.source,
                        "unterminated string",
                    ));
                }
                Some('"') => return Ok(Literal::Text(value)),
                Some('\\') => match self.chars.next() {
                    Some('"') => value.push('"'),
                    Some('\\') => value.push('\\'),
                    Some('n') => value.push('\n'),
                    _ => {
                        return Err(PropertyDecodeError::malformed(
                            self.source,
                            "invalid escape sequence",
                        ));
                    }
                },
                Some(ch) => value.push(ch),
            }
        }
    }

    fn read_token(&mut self) -> String {
        let mut token = String::new();
        while let Some(&ch) = self.chars.peek() {
            if ch.is_whitespace() || ch == '(' || ch == ')' || ch == '"' {
                break;
            }
            token.push(ch);
            self.chars.next();
        }
        token
    }
}

fn classify_token(token: String) -> Literal {
    if let Ok(value) = token.parse::<i128>() {
        return Literal::Integer(value);
    }
    if is_decimal_token(&token) {
        if let Ok(value) = token.parse::<f64>() {
            return Literal::Decimal(value);
        }
    }
    Literal::Text(token)
}

// Only plain `-?digits.digits` forms; `inf`/`NaN` stay text.
fn is_decimal_token(token: &str) -> bool {
    let unsigned = token.strip_prefix('-').unwrap_or(token);
    let mut dots = 0;
    let mut digits = 0;
    for ch in unsigned.chars() {
        match ch {
            '.' => dots += 1,
            '0'..='9' => digits += 1,
            _ => return false,
        }
    }
    dots == 1 && digits > 0
}
