//! Decibel conversion utilities.
//!
//! Conversions between linear magnitude/power and decibels, matching the
//! conventions of the Intel 5300 reference firmware and its MATLAB tooling.
//! [`db`] takes an explicit [`DbUnit`] because the firmware overloads the
//! conversion: RSS aggregation treats its input as power (`10·log10(x)`),
//! while amplitude extraction treats it as a voltage magnitude
//! (`10·log10(|x|²)`).
//!
//! Zero-input policy: `db(0.0, _)` returns [`f64::NEG_INFINITY`], never
//! panics. Callers that can legitimately see an all-zero power sum (for
//! example an RSS aggregate with no antennas present) must tolerate the
//! infinite sentinel.

use serde::{Deserialize, Serialize};

/// Interpretation of the linear value passed to [`db`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DbUnit {
    /// Input is already a power quantity (mW): `10·log10(x)`.
    Power,
    /// Input is a voltage-like magnitude: `10·log10(|x|²)`.
    Voltage,
}

/// Convert a linear quantity to decibels.
///
/// With [`DbUnit::Power`] the input must be non-negative; a zero input
/// yields `-inf` per the module's zero policy.
#[must_use]
pub fn db(x: f64, unit: DbUnit) -> f64 {
    let power = match unit {
        DbUnit::Power => {
            debug_assert!(x >= 0.0, "power input to db() must be non-negative, got {x}");
            x
        }
        // |x|^2 for real inputs; squaring makes the sign irrelevant.
        DbUnit::Voltage => x * x,
    };
    10.0 * power.log10()
}

/// Convert decibels back to a linear power quantity: `10^(x/10)`.
#[must_use]
pub fn dbinv(x: f64) -> f64 {
    10f64.powf(x / 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_power_roundtrip() {
        for x in [-104.0, -50.0, -3.0, 0.0, 12.5] {
            assert_relative_eq!(db(dbinv(x), DbUnit::Power), x, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_voltage_convention_squares_magnitude() {
        // 20*log10(10) = 20 dB
        assert_relative_eq!(db(10.0, DbUnit::Voltage), 20.0, epsilon = 1e-10);
        // Sign of a voltage magnitude is irrelevant
        assert_relative_eq!(db(-10.0, DbUnit::Voltage), 20.0, epsilon = 1e-10);
        // Unit magnitude is 0 dB
        assert_relative_eq!(db(1.0, DbUnit::Voltage), 0.0, epsilon = 1e-10);
    }

    #[test]
    fn test_zero_input_is_negative_infinity() {
        let zero_power = db(0.0, DbUnit::Power);
        assert!(zero_power.is_infinite() && zero_power < 0.0);

        let zero_voltage = db(0.0, DbUnit::Voltage);
        assert!(zero_voltage.is_infinite() && zero_voltage < 0.0);
    }

    #[test]
    fn test_dbinv_of_zero_is_unity() {
        // 0 dB is a gain of exactly 1. This is why a raw RSSI of 0 must be
        // treated as "absent" and excluded from power sums instead of being
        // converted: dbinv(0) would inject 1 mW of phantom power.
        assert_relative_eq!(dbinv(0.0), 1.0, epsilon = 1e-12);
    }
}
