//! Bound field values and the built-in coercions.
//!
//! Binding converts a field's raw text into a [`Value`] of the field's
//! [`FieldType`]. Decimals are exact: they keep every digit and the scale
//! as written, with no floating point in between.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use thiserror::Error;

use crate::error::DecodeError;

// ============================================================================
// Decimal
// ============================================================================

/// Largest supported scale (digits after the point).
pub const MAX_SCALE: u32 = 28;

/// Exact base-10 number: `mantissa * 10^-scale`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decimal {
    mantissa: i128,
    scale: u32,
}

/// Error parsing a [`Decimal`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseDecimalError {
    #[error("empty string")]
    Empty,
    #[error("invalid digit at offset {0}")]
    InvalidDigit(usize),
    #[error("too many digits")]
    Overflow,
}

impl Decimal {
    pub const ZERO: Decimal = Decimal {
        mantissa: 0,
        scale: 0,
    };

    /// Create a decimal from its parts. `Decimal::new(123450, 2)` is `1234.50`.
    ///
    /// # Panics
    ///
    /// If `scale` exceeds [`MAX_SCALE`]. Use [`Decimal::try_new`] for
    /// untrusted scales.
    pub fn new(mantissa: i128, scale: u32) -> Self {
        match Self::try_new(mantissa, scale) {
            Ok(d) => d,
            Err(_) => panic!("decimal scale {scale} exceeds the maximum of {MAX_SCALE}"),
        }
    }

    /// Create a decimal from its parts, failing if `scale` exceeds [`MAX_SCALE`].
    pub fn try_new(mantissa: i128, scale: u32) -> Result<Self, ParseDecimalError> {
        if scale > MAX_SCALE {
            return Err(ParseDecimalError::Overflow);
        }
        Ok(Decimal { mantissa, scale })
    }

    #[inline]
    pub fn mantissa(&self) -> i128 {
        self.mantissa
    }

    #[inline]
    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa == 0
    }

    /// Same value with trailing fractional zeros removed.
    pub fn normalize(self) -> Self {
        let Decimal {
            mut mantissa,
            mut scale,
        } = self;
        while scale > 0 && mantissa % 10 == 0 {
            mantissa /= 10;
            scale -= 1;
        }
        Decimal { mantissa, scale }
    }

    /// Nearest `f64`. Lossy.
    pub fn to_f64(&self) -> f64 {
        self.mantissa as f64 / 10f64.powi(self.scale as i32)
    }

    /// Integer part and the remainder below it, both carrying the sign.
    /// `scale <= MAX_SCALE` keeps the power of ten within `i128`.
    fn split(&self) -> (i128, i128) {
        let unit = 10i128.pow(self.scale);
        (self.mantissa / unit, self.mantissa % unit)
    }
}

impl FromStr for Decimal {
    type Err = ParseDecimalError;

    /// Parse `[+-]digits[.digits]`. At least one digit is required.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.is_empty() {
            return Err(ParseDecimalError::Empty);
        }

        let (negative, start) = match bytes[0] {
            b'-' => (true, 1),
            b'+' => (false, 1),
            _ => (false, 0),
        };

        let mut mantissa: i128 = 0;
        let mut scale: u32 = 0;
        let mut digits = 0usize;
        let mut seen_point = false;
        for (i, &b) in bytes.iter().enumerate().skip(start) {
            match b {
                b'0'..=b'9' => {
                    mantissa = mantissa
                        .checked_mul(10)
                        .and_then(|m| m.checked_add((b - b'0') as i128))
                        .ok_or(ParseDecimalError::Overflow)?;
                    digits += 1;
                    if seen_point {
                        scale += 1;
                        if scale > MAX_SCALE {
                            return Err(ParseDecimalError::Overflow);
                        }
                    }
                }
                b'.' if !seen_point => seen_point = true,
                _ => return Err(ParseDecimalError::InvalidDigit(i)),
            }
        }
        if digits == 0 {
            return Err(ParseDecimalError::InvalidDigit(start));
        }

        Ok(Decimal {
            mantissa: if negative { -mantissa } else { mantissa },
            scale,
        })
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Decimal {}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Decimal {
    /// Exact comparison. Integer parts decide first; the remainders are
    /// below `10^MAX_SCALE`, so rescaling them to a common scale never
    /// overflows.
    fn cmp(&self, other: &Self) -> Ordering {
        let (lhs_int, lhs_frac) = self.split();
        let (rhs_int, rhs_frac) = other.split();
        lhs_int.cmp(&rhs_int).then_with(|| {
            let scale = self.scale.max(other.scale);
            let lhs = lhs_frac * 10i128.pow(scale - self.scale);
            let rhs = rhs_frac * 10i128.pow(scale - other.scale);
            lhs.cmp(&rhs)
        })
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.mantissa.unsigned_abs().to_string();
        let sign = if self.mantissa < 0 { "-" } else { "" };
        let scale = self.scale as usize;
        if scale == 0 {
            return write!(f, "{sign}{digits}");
        }
        let padded = format!("{digits:0>width$}", width = scale + 1);
        let (int, frac) = padded.split_at(padded.len() - scale);
        write!(f, "{sign}{int}.{frac}")
    }
}

// ============================================================================
// Value
// ============================================================================

/// A typed field value in a bound record.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Decimal(Decimal),
    Text(String),
    Boolean(bool),
    Date(NaiveDate),
    /// Repeated elements sharing one tag name.
    List(Vec<String>),
    /// Optional field with no natural zero value that was not present.
    Absent,
}

impl Value {
    #[inline]
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    #[inline]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    #[inline]
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    #[inline]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{i}"),
            Value::Decimal(d) => write!(f, "{d}"),
            Value::Text(s) => f.write_str(s),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::List(items) => write!(f, "[{}]", items.join(", ")),
            Value::Absent => f.write_str("absent"),
        }
    }
}

// ============================================================================
// FieldType
// ============================================================================

/// Target type of a field, selecting the default coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// `i64`, surrounding whitespace ignored.
    Integer,
    /// Exact decimal, surrounding whitespace ignored.
    Decimal,
    /// Raw text, verbatim.
    Text,
    /// `true`/`false`/`1`/`0`, surrounding whitespace ignored.
    Boolean,
    /// ISO `YYYY-MM-DD`, surrounding whitespace ignored.
    Date,
    /// One entry per repeated element, verbatim.
    TextList,
}

impl FieldType {
    /// Default coercion of raw text into this type.
    ///
    /// For `TextList` this converts a single item into a one-element list;
    /// the binder accumulates items itself.
    pub fn coerce(self, raw: &str) -> Result<Value, DecodeError> {
        Ok(match self {
            FieldType::Integer => Value::Integer(raw.trim().parse()?),
            FieldType::Decimal => Value::Decimal(raw.trim().parse()?),
            FieldType::Text => Value::Text(raw.to_string()),
            FieldType::Boolean => Value::Boolean(parse_bool(raw.trim())?),
            FieldType::Date => Value::Date(raw.trim().parse()?),
            FieldType::TextList => Value::List(vec![raw.to_string()]),
        })
    }

    /// Value given to an optional field that was not present.
    pub fn zero_value(self) -> Value {
        match self {
            FieldType::Integer => Value::Integer(0),
            FieldType::Decimal => Value::Decimal(Decimal::ZERO),
            FieldType::Boolean => Value::Boolean(false),
            FieldType::TextList => Value::List(Vec::new()),
            FieldType::Text | FieldType::Date => Value::Absent,
        }
    }

    pub fn is_list(self) -> bool {
        self == FieldType::TextList
    }
}

fn parse_bool(raw: &str) -> Result<bool, DecodeError> {
    match raw {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(DecodeError::InvalidBoolean),
    }
}
