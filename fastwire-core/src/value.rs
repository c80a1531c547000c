//! Value storage for compiled field instructions.
//!
//! These types record schema-declared initial/default values. They are
//! carried on the instruction graph for the codec to consult at
//! encode/decode time; nothing here interprets the FAST wire format.

use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// Error raised when a decimal literal cannot be parsed.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid decimal literal '{0}'")]
pub struct DecimalParseError(pub String);

/// Mantissa/exponent decimal value.
///
/// `"94.32"` parses to mantissa 9432, exponent -2. The value is kept
/// exactly as written; no normalization of trailing zeros is performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DecimalValue {
    /// Mantissa digits as a signed integer.
    pub mantissa: i64,
    /// Power-of-ten exponent.
    pub exponent: i32,
}

impl DecimalValue {
    /// Creates a decimal value from mantissa and exponent.
    #[must_use]
    pub const fn new(mantissa: i64, exponent: i32) -> Self {
        Self { mantissa, exponent }
    }
}

impl FromStr for DecimalValue {
    type Err = DecimalParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DecimalParseError(s.to_string()));
        }

        let (sign, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (-1i64, rest),
            None => (1i64, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };

        let (int_part, frac_part) = match digits.split_once('.') {
            Some((i, f)) => (i, f),
            None => (digits, ""),
        };

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(DecimalParseError(s.to_string()));
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(DecimalParseError(s.to_string()));
        }

        let mut mantissa: i64 = 0;
        for b in int_part.bytes().chain(frac_part.bytes()) {
            mantissa = mantissa
                .checked_mul(10)
                .and_then(|m| m.checked_add(i64::from(b - b'0')))
                .ok_or_else(|| DecimalParseError(s.to_string()))?;
        }

        let exponent = -(frac_part.len() as i32);
        Ok(Self::new(sign * mantissa, exponent))
    }
}

/// One named numeric value of an enum instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMember {
    /// Symbolic name of the member.
    pub name: Arc<str>,
    /// Encoded numeric value.
    pub value: u64,
}

impl EnumMember {
    /// Creates a new enum member.
    #[must_use]
    pub fn new(name: Arc<str>, value: u64) -> Self {
        Self { name, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_from_integer_literal() {
        let v: DecimalValue = "943".parse().expect("Failed to parse");
        assert_eq!(v, DecimalValue::new(943, 0));
    }

    #[test]
    fn test_decimal_from_fractional_literal() {
        let v: DecimalValue = "94.32".parse().expect("Failed to parse");
        assert_eq!(v, DecimalValue::new(9432, -2));
    }

    #[test]
    fn test_decimal_negative() {
        let v: DecimalValue = "-0.5".parse().expect("Failed to parse");
        assert_eq!(v, DecimalValue::new(-5, -1));
    }

    #[test]
    fn test_decimal_keeps_trailing_zeros() {
        let v: DecimalValue = "1.20".parse().expect("Failed to parse");
        assert_eq!(v, DecimalValue::new(120, -2));
    }

    #[test]
    fn test_decimal_invalid_literals() {
        assert!("".parse::<DecimalValue>().is_err());
        assert!("abc".parse::<DecimalValue>().is_err());
        assert!("1.2.3".parse::<DecimalValue>().is_err());
        assert!(".".parse::<DecimalValue>().is_err());
    }

    #[test]
    fn test_enum_member() {
        let member = EnumMember::new(Arc::from("Buy"), 1);
        assert_eq!(&*member.name, "Buy");
        assert_eq!(member.value, 1);
    }
}
