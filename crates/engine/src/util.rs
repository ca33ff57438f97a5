//! Internal helpers for pricing arithmetic and model conversion.
//!
//! These utilities are **not** part of the public API. They centralize the
//! rounding policy so every deposit is priced the same way.

use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Deposit value in minor units: `weight_grams * price_per_kg_minor / 1000`,
/// rounded half-up. Integer math only.
pub(crate) fn deposit_total_minor(weight_grams: i64, price_per_kg_minor: i64) -> ResultEngine<i64> {
    let scaled = weight_grams
        .checked_mul(price_per_kg_minor)
        .ok_or_else(|| EngineError::InvalidAmount("deposit value overflow".to_string()))?;
    // Half-up: bias by half the divisor before truncating. Both factors are
    // non-negative here.
    Ok((scaled + 500) / 1000)
}

/// Points earned: `floor(weight_grams * points_per_kg / 1000)`.
pub(crate) fn deposit_points(weight_grams: i64, points_per_kg: i64) -> ResultEngine<i64> {
    let scaled = weight_grams
        .checked_mul(points_per_kg)
        .ok_or_else(|| EngineError::InvalidAmount("deposit points overflow".to_string()))?;
    Ok(scaled / 1000)
}

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidId(format!("invalid {label} id")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_rounds_half_up() {
        // 1.111 kg at Rp1.11/kg = 123.321 minor -> 123
        assert_eq!(deposit_total_minor(1111, 111).unwrap(), 123);
        // 0.5 kg at Rp0.01/kg = 0.5 minor -> 1
        assert_eq!(deposit_total_minor(500, 1).unwrap(), 1);
        // 0.499 kg at Rp0.01/kg = 0.499 minor -> 0
        assert_eq!(deposit_total_minor(499, 1).unwrap(), 0);
        // Exact values stay exact: 2.5 kg at Rp20.00/kg.
        assert_eq!(deposit_total_minor(2500, 2000).unwrap(), 5000);
    }

    #[test]
    fn points_round_down() {
        // 1.999 kg at 1 point/kg -> 1 point
        assert_eq!(deposit_points(1999, 1).unwrap(), 1);
        assert_eq!(deposit_points(2000, 1).unwrap(), 2);
        assert_eq!(deposit_points(999, 1).unwrap(), 0);
        assert_eq!(deposit_points(2500, 3).unwrap(), 7);
    }

    #[test]
    fn overflow_is_rejected() {
        assert!(deposit_total_minor(i64::MAX, 2).is_err());
        assert!(deposit_points(i64::MAX, 2).is_err());
    }
}
