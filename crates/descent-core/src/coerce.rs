//! Literal-to-primitive coercion rules shared by every backend.
//!
//! Coercions never reinterpret silently: text that is not a valid
//! representation of the target kind fails with
//! [`Error::NumericFormat`]. The one deliberate conversion is
//! fractional-to-integer truncation toward zero, which mirrors host numeric
//! conversion semantics.

use crate::error::{Error, Result};

// 2^63 as f64; the negated form is exactly i64::MIN.
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

fn invalid(text: impl Into<String>, target: &'static str) -> Error {
    Error::NumericFormat {
        text: text.into(),
        target,
    }
}

pub fn bool_from_text(text: &str) -> Result<bool> {
    match text {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(invalid(text, "bool")),
    }
}

/// Parse an integer literal. Fractional literals coerce by truncation toward
/// zero; anything else fails.
pub fn i64_from_text(text: &str) -> Result<i64> {
    if let Ok(n) = text.parse::<i64>() {
        return Ok(n);
    }
    let f = text.parse::<f64>().map_err(|_| invalid(text, "i64"))?;
    truncate_i64(f)
}

pub fn f64_from_text(text: &str) -> Result<f64> {
    text.parse::<f64>().map_err(|_| invalid(text, "f64"))
}

/// Truncate a float toward zero, failing when the result does not fit.
pub fn truncate_i64(value: f64) -> Result<i64> {
    let t = value.trunc();
    if t.is_finite() && t >= -I64_LIMIT && t < I64_LIMIT {
        Ok(t as i64)
    } else {
        Err(invalid(value.to_string(), "i64"))
    }
}

pub fn narrow_i32(value: i64) -> Result<i32> {
    i32::try_from(value).map_err(|_| invalid(value.to_string(), "i32"))
}

pub fn narrow_i16(value: i64) -> Result<i16> {
    i16::try_from(value).map_err(|_| invalid(value.to_string(), "i16"))
}

pub fn narrow_i8(value: i64) -> Result<i8> {
    i8::try_from(value).map_err(|_| invalid(value.to_string(), "i8"))
}
