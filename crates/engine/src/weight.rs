use std::{fmt, str::FromStr};

use crate::EngineError;

/// Waste weight represented as **integer grams**.
///
/// Deposits are weighed on scales with gram resolution; storing grams keeps
/// all pricing arithmetic in integers.
///
/// ```rust
/// use engine::Weight;
///
/// let w: Weight = "2.5".parse().unwrap();
/// assert_eq!(w.grams(), 2500);
/// assert_eq!(w.to_string(), "2.500kg");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Weight(i64);

impl Weight {
    /// Creates a weight from integer grams.
    #[must_use]
    pub const fn from_grams(grams: i64) -> Self {
        Self(grams)
    }

    /// Returns the raw value in grams.
    #[must_use]
    pub const fn grams(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:03}kg", abs / 1000, abs % 1000)
    }
}

impl FromStr for Weight {
    type Err = EngineError;

    /// Parses a kilogram string into grams.
    ///
    /// Accepts `.` or `,` as decimal separator and up to 3 fractional digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidAmount("invalid weight".to_string());
        let overflow = || EngineError::InvalidAmount("weight too large".to_string());

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(EngineError::InvalidAmount("empty weight".to_string()));
        }

        let rest = trimmed.replace(',', ".");
        let mut parts = rest.split('.');
        let kg_str = parts.next().ok_or_else(invalid)?;
        let frac_str = parts.next();

        if parts.next().is_some() {
            return Err(invalid());
        }

        if kg_str.is_empty() || !kg_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let kg: i64 = kg_str.parse().map_err(|_| invalid())?;

        let grams: i64 = match frac_str {
            None | Some("") => 0,
            Some(frac) => {
                if frac.len() > 3 || !frac.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid());
                }
                let parsed: i64 = frac.parse().map_err(|_| invalid())?;
                parsed * 10i64.pow(3 - frac.len() as u32)
            }
        };

        kg.checked_mul(1000)
            .and_then(|v| v.checked_add(grams))
            .map(Weight)
            .ok_or_else(overflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_kilograms() {
        assert_eq!("2".parse::<Weight>().unwrap().grams(), 2000);
        assert_eq!("2.5".parse::<Weight>().unwrap().grams(), 2500);
        assert_eq!("0,125".parse::<Weight>().unwrap().grams(), 125);
        assert_eq!(" 1.050 ".parse::<Weight>().unwrap().grams(), 1050);
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!("".parse::<Weight>().is_err());
        assert!("1.2345".parse::<Weight>().is_err());
        assert!("-1".parse::<Weight>().is_err());
        assert!("abc".parse::<Weight>().is_err());
    }

    #[test]
    fn display_formats_kilograms() {
        assert_eq!(Weight::from_grams(2500).to_string(), "2.500kg");
        assert_eq!(Weight::from_grams(50).to_string(), "0.050kg");
    }
}
