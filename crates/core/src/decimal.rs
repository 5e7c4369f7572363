//! Fixed-point decimal values for reported measurements.
//!
//! Kinematic math runs in `f64`; values that leave the crate (persisted or
//! displayed) are converted to [`FixedDecimal`], an `i64` count of millionths.
//! The conversion rounds half away from zero once, so every platform stores
//! and prints the same digits for the same computation.
//!
//! On the wire a `FixedDecimal` is a decimal string (`"12.345600"`), never a
//! JSON float.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of fractional digits carried by a [`FixedDecimal`].
pub const DECIMAL_PLACES: u32 = 6;

/// Scale factor between a unit and the stored integer (`10^DECIMAL_PLACES`).
pub const SCALE: i64 = 1_000_000;

/// A signed decimal with exactly six fractional digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FixedDecimal {
    units: i64,
}

impl FixedDecimal {
    pub const ZERO: FixedDecimal = FixedDecimal { units: 0 };

    /// Build from a raw count of millionths.
    pub const fn from_units(units: i64) -> Self {
        Self { units }
    }

    /// Raw count of millionths.
    pub const fn units(self) -> i64 {
        self.units
    }

    /// Convert a float, rounding half away from zero to six places.
    ///
    /// Returns `None` for NaN, infinities, and magnitudes that do not fit.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let scaled = (value * SCALE as f64).round();
        if scaled < i64::MIN as f64 || scaled >= i64::MAX as f64 {
            return None;
        }
        Some(Self {
            units: scaled as i64,
        })
    }
}

impl fmt::Display for FixedDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.units < 0 { "-" } else { "" };
        let abs = self.units.unsigned_abs();
        let scale = SCALE as u64;
        write!(
            f,
            "{sign}{}.{:0width$}",
            abs / scale,
            abs % scale,
            width = DECIMAL_PLACES as usize
        )
    }
}

/// Error returned when a string is not a decimal with at most six places.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid decimal value: '{0}'")]
pub struct ParseDecimalError(String);

impl FromStr for FixedDecimal {
    type Err = ParseDecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseDecimalError(s.to_string());
        let trimmed = s.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let (int_part, frac_part) = match digits.split_once('.') {
            Some((i, f)) => (i, f),
            None => (digits, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(err());
        }
        if frac_part.len() > DECIMAL_PLACES as usize
            || !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(err());
        }

        let whole: i64 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| err())?
        };
        let mut frac: i64 = if frac_part.is_empty() {
            0
        } else {
            frac_part.parse().map_err(|_| err())?
        };
        for _ in frac_part.len()..DECIMAL_PLACES as usize {
            frac *= 10;
        }

        let units = whole
            .checked_mul(SCALE)
            .and_then(|w| w.checked_add(frac))
            .ok_or_else(err)?;
        Ok(Self {
            units: if negative { -units } else { units },
        })
    }
}

impl Serialize for FixedDecimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FixedDecimal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- from_f64 -------------------------------------------------------------

    #[test]
    fn from_f64_rounds_to_nearest_millionth() {
        assert_eq!(FixedDecimal::from_f64(0.00000075).unwrap().units(), 1);
        assert_eq!(FixedDecimal::from_f64(-0.00000075).unwrap().units(), -1);
        assert_eq!(FixedDecimal::from_f64(0.0000004).unwrap().units(), 0);
        assert_eq!(FixedDecimal::from_f64(2.5).unwrap().units(), 2_500_000);
    }

    #[test]
    fn from_f64_absorbs_binary_noise() {
        let sum = 0.1 + 0.2;
        assert_eq!(
            FixedDecimal::from_f64(sum).unwrap(),
            FixedDecimal::from_f64(0.3).unwrap()
        );
    }

    #[test]
    fn from_f64_rejects_non_finite() {
        assert!(FixedDecimal::from_f64(f64::NAN).is_none());
        assert!(FixedDecimal::from_f64(f64::INFINITY).is_none());
        assert!(FixedDecimal::from_f64(f64::NEG_INFINITY).is_none());
    }

    #[test]
    fn from_f64_rejects_overflow() {
        assert!(FixedDecimal::from_f64(1e20).is_none());
    }

    // -- Display --------------------------------------------------------------

    #[test]
    fn display_pads_fraction() {
        assert_eq!(FixedDecimal::from_units(12_345_600).to_string(), "12.345600");
        assert_eq!(FixedDecimal::from_units(5).to_string(), "0.000005");
        assert_eq!(FixedDecimal::ZERO.to_string(), "0.000000");
    }

    #[test]
    fn display_keeps_sign_for_values_below_one() {
        assert_eq!(FixedDecimal::from_units(-500_000).to_string(), "-0.500000");
    }

    // -- FromStr --------------------------------------------------------------

    #[test]
    fn parse_accepts_short_fractions() {
        let d: FixedDecimal = "10.5".parse().unwrap();
        assert_eq!(d.units(), 10_500_000);
    }

    #[test]
    fn parse_accepts_integers_and_signs() {
        assert_eq!("42".parse::<FixedDecimal>().unwrap().units(), 42_000_000);
        assert_eq!("-1.25".parse::<FixedDecimal>().unwrap().units(), -1_250_000);
        assert_eq!("+.5".parse::<FixedDecimal>().unwrap().units(), 500_000);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("".parse::<FixedDecimal>().is_err());
        assert!("abc".parse::<FixedDecimal>().is_err());
        assert!("1.2.3".parse::<FixedDecimal>().is_err());
        assert!("1.1234567".parse::<FixedDecimal>().is_err());
        assert!("1e5".parse::<FixedDecimal>().is_err());
    }

    // -- serde ----------------------------------------------------------------

    #[test]
    fn serializes_as_decimal_string() {
        let d = FixedDecimal::from_units(10_000_000);
        assert_eq!(serde_json::to_string(&d).unwrap(), "\"10.000000\"");
        let back: FixedDecimal = serde_json::from_str("\"10.000000\"").unwrap();
        assert_eq!(back, d);
    }
}
