//! Form field checks shared by the budget editor and the price catalog.
//!
//! Numeric text is parsed strictly: surrounding whitespace is ignored, anything else that
//! does not read as a finite number is rejected instead of turning into NaN.

use crate::errors::{Error, Result};

/// Returns the trimmed value, or a validation error when it is blank.
pub fn require_text<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(field, "is required"));
    }
    Ok(trimmed)
}

/// Parses a finite number from user input.
pub fn parse_number(field: &str, value: &str) -> Result<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(field, "is required"));
    }

    match trimmed.parse::<f64>() {
        Ok(number) if number.is_finite() => Ok(number),
        _ => Err(Error::validation(
            field,
            format!("'{trimmed}' is not a number"),
        )),
    }
}

/// Parses a finite number that must not be negative.
pub fn parse_non_negative(field: &str, value: &str) -> Result<f64> {
    let number = parse_number(field, value)?;
    if number < 0.0 {
        return Err(Error::validation(field, "must not be negative"));
    }
    Ok(number)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_require_text() {
        assert_eq!(require_text("title", "  Obra  ").unwrap(), "Obra");
        assert!(matches!(
            require_text("title", "   "),
            Err(Error::Validation { field, .. }) if field == "title"
        ));
    }

    #[test]
    fn test_parse_number_accepts_plain_decimals() {
        assert_eq!(parse_number("bdi", "25").unwrap(), 25.0);
        assert_eq!(parse_number("bdi", " 22.5 ").unwrap(), 22.5);
        assert_eq!(parse_number("bdi", "-3").unwrap(), -3.0);
        assert_eq!(parse_number("bdi", "1e2").unwrap(), 100.0);
    }

    #[test]
    fn test_parse_number_rejects_garbage() {
        for input in ["", "abc", "12abc", "1,5", "NaN", "inf", "-infinity"] {
            let result = parse_number("quantity", input);
            assert!(
                matches!(result, Err(Error::Validation { .. })),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_non_negative() {
        assert_eq!(parse_non_negative("unit_price", "0").unwrap(), 0.0);
        assert_eq!(parse_non_negative("unit_price", "10.75").unwrap(), 10.75);
        let err = parse_non_negative("unit_price", "-0.01").unwrap_err();
        assert_eq!(err.to_string(), "Invalid unit_price: must not be negative");
    }
}
