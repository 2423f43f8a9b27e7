//! Numeric formatting and rounding helpers.
//!
//! Two rounding rules coexist: ties round to even everywhere except
//! radix-16 rendering, where a fractional part of exactly one half rounds
//! toward negative infinity so color-channel-to-hex conversions stay exact.

use crate::error::{Result, SymbolError};

/// Formats a number the way the language prints it: integer-valued numbers
/// have no decimal point.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        // Avoid "-0"
        return "0".to_string();
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Rounds half-way values to the nearest even integer, everything else to
/// the nearest integer.
pub fn round_half_even(value: f64) -> f64 {
    let floor = value.floor();
    let diff = value - floor;
    if diff > 0.5 {
        floor + 1.0
    } else if diff < 0.5 {
        floor
    } else if (floor as i64) % 2 == 0 {
        floor
    } else {
        floor + 1.0
    }
}

/// Banker's rounding at a decimal precision: `round_to(2.675, 2)` keeps the
/// scaled tie rule.
pub fn round_to_precision(value: f64, precision: i32) -> f64 {
    let scale = 10f64.powi(precision);
    round_half_even(value * scale) / scale
}

/// Renders `value` in the given radix after rounding it to an integer.
///
/// Radix 16 rounds a fractional part of exactly 0.5 toward negative
/// infinity; every other radix uses ties-to-even.
pub fn to_radix_string(value: f64, radix: i64) -> Result<String> {
    if !(2..=36).contains(&radix) {
        return Err(SymbolError::InvalidRadix { radix });
    }

    let rounded = if value.fract().abs() == 0.5 && radix == 16 {
        value.floor()
    } else {
        round_half_even(value)
    };

    let negative = rounded < 0.0;
    let mut n = rounded.abs() as u64;
    let radix = radix as u64;

    if n == 0 {
        return Ok("0".to_string());
    }

    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % radix) as usize]);
        n /= radix;
    }
    if negative {
        out.push(b'-');
    }
    out.reverse();
    Ok(String::from_utf8(out).expect("radix digits are ASCII"))
}

/// Formats a numeric color attribute: two decimals, trailing zeros
/// stripped.
pub fn format_color_component(value: f64) -> String {
    let rounded = round_to_precision(value, 2);
    format_number(rounded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_integer_valued() {
        assert_eq!(format_number(32.0), "32");
        assert_eq!(format_number(-4.0), "-4");
        assert_eq!(format_number(0.0), "0");
    }

    #[test]
    fn test_format_fractional() {
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(format_number(-0.25), "-0.25");
    }

    #[test]
    fn test_round_half_even() {
        assert_eq!(round_half_even(0.5), 0.0);
        assert_eq!(round_half_even(1.5), 2.0);
        assert_eq!(round_half_even(2.5), 2.0);
        assert_eq!(round_half_even(2.6), 3.0);
        assert_eq!(round_half_even(-0.5), 0.0);
        assert_eq!(round_half_even(-1.5), -2.0);
    }

    #[test]
    fn test_round_to_precision() {
        assert_eq!(round_to_precision(1.2345, 2), 1.23);
        // Dyadic values hit the tie rule exactly: 1.25 → 12.5 → even 12.
        assert_eq!(round_to_precision(1.25, 1), 1.2);
        assert_eq!(round_to_precision(1.75, 1), 1.8);
    }

    #[test]
    fn test_radix_bounds() {
        assert!(to_radix_string(10.0, 1).is_err());
        assert!(to_radix_string(10.0, 37).is_err());
        assert!(to_radix_string(10.0, 2).is_ok());
        assert!(to_radix_string(10.0, 36).is_ok());
    }

    #[test]
    fn test_radix_conversion() {
        assert_eq!(to_radix_string(255.0, 16).unwrap(), "ff");
        assert_eq!(to_radix_string(10.0, 2).unwrap(), "1010");
        assert_eq!(to_radix_string(35.0, 36).unwrap(), "z");
        assert_eq!(to_radix_string(0.0, 16).unwrap(), "0");
        assert_eq!(to_radix_string(-255.0, 16).unwrap(), "-ff");
    }

    #[test]
    fn test_hex_half_rounds_down() {
        // 127.5 would round to 128 under ties-to-even; hex keeps 127.
        assert_eq!(to_radix_string(127.5, 16).unwrap(), "7f");
        assert_eq!(to_radix_string(128.5, 16).unwrap(), "80");
    }

    #[test]
    fn test_decimal_half_uses_bankers() {
        assert_eq!(to_radix_string(2.5, 10).unwrap(), "2");
        assert_eq!(to_radix_string(3.5, 10).unwrap(), "4");
    }

    #[test]
    fn test_format_color_component() {
        assert_eq!(format_color_component(0.5), "0.5");
        assert_eq!(format_color_component(127.0), "127");
        assert_eq!(format_color_component(0.333333), "0.33");
        assert_eq!(format_color_component(1.999), "2");
    }
}
