//! Parsing of user-typed numeric fields.
//!
//! Text that is not a finite number never reaches the document: the caller
//! names the value to use instead.

pub fn parse_number(s: &str, fallback: f64) -> f64 {
    match s.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => fallback,
    }
}

/// A timestamp or duration in milliseconds: like [`parse_number`], and never
/// negative.
pub fn parse_ms(s: &str, fallback: f64) -> f64 {
    parse_number(s, fallback).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_numeric_and_non_finite_fall_back() {
        assert_eq!(parse_number(" 12.5 ", 0.0), 12.5);
        assert_eq!(parse_number("abc", 7.0), 7.0);
        assert_eq!(parse_number("NaN", 7.0), 7.0);
        assert_eq!(parse_number("inf", 7.0), 7.0);
        assert_eq!(parse_number("", -1.0), -1.0);
    }

    #[test]
    fn milliseconds_are_non_negative() {
        assert_eq!(parse_ms("-300", 0.0), 0.0);
        assert_eq!(parse_ms("1500", 0.0), 1500.0);
    }
}
