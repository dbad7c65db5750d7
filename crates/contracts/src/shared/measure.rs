//! Inch measurements as the shop floor reads them.
//!
//! Lengths arrive as decimal inches. Saws and tapes are read in sixteenths, so
//! every display form here rounds to the nearest sixteenth of an inch.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const SIXTEENTHS_PER_INCH: i64 = 16;
pub const INCHES_PER_FOOT: i64 = 12;
const SIXTEENTHS_PER_FOOT: i64 = SIXTEENTHS_PER_INCH * INCHES_PER_FOOT;

/// Renders decimal inches as a whole number plus a reduced fraction.
///
/// ```
/// use contracts::shared::measure::decimal_to_fraction;
/// assert_eq!(decimal_to_fraction(96.0), "96");
/// assert_eq!(decimal_to_fraction(96.5), "96 1/2");
/// assert_eq!(decimal_to_fraction(92.625), "92 5/8");
/// assert_eq!(decimal_to_fraction(11.99), "12");
/// ```
pub fn decimal_to_fraction(value: f64) -> String {
    if !value.is_finite() {
        return String::new();
    }
    if value < 0.0 {
        return format!("-{}", decimal_to_fraction(-value));
    }
    if value.fract() == 0.0 {
        return format!("{}", value as i64);
    }

    let mut whole = value.floor() as i64;
    let mut sixteenths = ((value - value.floor()) * SIXTEENTHS_PER_INCH as f64).round() as i64;
    if sixteenths == SIXTEENTHS_PER_INCH {
        whole += 1;
        sixteenths = 0;
    }
    if sixteenths == 0 {
        return whole.to_string();
    }

    let divisor = gcd(sixteenths, SIXTEENTHS_PER_INCH);
    format!(
        "{} {}/{}",
        whole,
        sixteenths / divisor,
        SIXTEENTHS_PER_INCH / divisor
    )
}

fn gcd(a: i64, b: i64) -> i64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

/// A length decomposed into feet, inches and sixteenths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeetInches {
    pub feet: i64,
    /// Always in `0..12`
    pub inches: i64,
    /// Always in `0..16`
    pub sixteenths: i64,
}

impl FeetInches {
    /// Rounds to the nearest sixteenth first, so a remainder of 16/16 rolls
    /// into the next inch and 12 inches roll into the next foot.
    pub fn from_inches(value: f64) -> Self {
        let total = if value.is_finite() && value > 0.0 {
            (value * SIXTEENTHS_PER_INCH as f64).round() as i64
        } else {
            0
        };
        Self {
            feet: total / SIXTEENTHS_PER_FOOT,
            inches: (total % SIXTEENTHS_PER_FOOT) / SIXTEENTHS_PER_INCH,
            sixteenths: total % SIXTEENTHS_PER_INCH,
        }
    }

    pub fn to_inches(&self) -> f64 {
        (self.feet * INCHES_PER_FOOT + self.inches) as f64
            + self.sixteenths as f64 / SIXTEENTHS_PER_INCH as f64
    }
}

impl fmt::Display for FeetInches {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.feet > 0 {
            write!(f, "{}-", self.feet)?;
        }
        write!(f, "{}-{}", self.inches, self.sixteenths)
    }
}

/// Feet-inches-sixteenths string, e.g. `100.25` -> `"8-4-4"`.
pub fn feet_inches_sixteenths(value: f64) -> String {
    FeetInches::from_inches(value).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_to_fraction_integers_pass_through() {
        for n in [0, 1, 70, 96, 144, 1200] {
            assert_eq!(decimal_to_fraction(n as f64), n.to_string());
        }
    }

    #[test]
    fn test_decimal_to_fraction_reduces() {
        assert_eq!(decimal_to_fraction(96.5), "96 1/2");
        assert_eq!(decimal_to_fraction(92.25), "92 1/4");
        assert_eq!(decimal_to_fraction(92.125), "92 1/8");
        assert_eq!(decimal_to_fraction(92.0625), "92 1/16");
        assert_eq!(decimal_to_fraction(104.875), "104 7/8");
        assert_eq!(decimal_to_fraction(0.75), "0 3/4");
    }

    #[test]
    fn test_decimal_to_fraction_rounds_to_sixteenth() {
        // 0.3 * 16 = 4.8 -> 5/16
        assert_eq!(decimal_to_fraction(10.3), "10 5/16");
        // 0.01 * 16 rounds to zero
        assert_eq!(decimal_to_fraction(96.01), "96");
    }

    #[test]
    fn test_decimal_to_fraction_carries_into_whole() {
        assert_eq!(decimal_to_fraction(11.99), "12");
        assert_eq!(decimal_to_fraction(71.97), "72");
    }

    #[test]
    fn test_decimal_to_fraction_negative_and_nan() {
        assert_eq!(decimal_to_fraction(-1.5), "-1 1/2");
        assert_eq!(decimal_to_fraction(f64::NAN), "");
    }

    #[test]
    fn test_feet_inches_basic() {
        let fi = FeetInches::from_inches(100.25);
        assert_eq!(
            fi,
            FeetInches {
                feet: 8,
                inches: 4,
                sixteenths: 4
            }
        );
        assert_eq!(fi.to_string(), "8-4-4");
        assert_eq!(feet_inches_sixteenths(8.5), "8-8");
        assert_eq!(feet_inches_sixteenths(96.0), "8-0-0");
    }

    #[test]
    fn test_feet_inches_rollover() {
        // 15.999 -> 16/16 rolls into the next inch
        assert_eq!(feet_inches_sixteenths(15.999), "1-4-0");
        // 11.99 -> 12 inches rolls into a foot
        assert_eq!(feet_inches_sixteenths(11.99), "1-0-0");
        assert_eq!(feet_inches_sixteenths(143.98), "12-0-0");
    }

    #[test]
    fn test_feet_inches_decomposition_property() {
        let mut d = 0.0;
        while d < 500.0 {
            let fi = FeetInches::from_inches(d);
            assert!((0..16).contains(&fi.sixteenths), "sixteenths for {}", d);
            assert!((0..12).contains(&fi.inches), "inches for {}", d);
            assert!(
                (fi.to_inches() - d).abs() <= 1.0 / 32.0 + 1e-9,
                "round trip for {}: {:?}",
                d,
                fi
            );
            d += 0.037;
        }
    }

    #[test]
    fn test_feet_inches_non_positive() {
        assert_eq!(feet_inches_sixteenths(0.0), "0-0");
        assert_eq!(feet_inches_sixteenths(-3.0), "0-0");
    }
}
