//! Received signal strength aggregation and SNR.
//!
//! Combines the three per-antenna RSSI readings and the AGC setting into a
//! single total RSS figure in dBm, and derives per-frame SNR from it.
//! The aggregation follows the Intel 5300 firmware convention: sum present
//! antennas in the linear power domain, convert back with the power dB
//! convention, then subtract the fixed front-end calibration offset and the
//! AGC gain.

use thiserror::Error;
use wifi_csi_core::{db, DbUnit, Frame, Rssi};

/// Fixed front-end calibration offset in dB (Intel 5300 datasheet value).
pub const RSS_CALIBRATION_OFFSET_DB: f64 = 44.0;

/// Errors raised when a frame lacks the telemetry a computation needs.
#[derive(Error, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum TelemetryError {
    /// A required telemetry field was absent from the capture record.
    #[error("frame is missing required telemetry field `{field}`")]
    MissingField {
        /// Name of the absent field
        field: &'static str,
    },
}

/// Total received signal strength in dBm.
///
/// Antennas reported as [`Rssi::NotPresent`] contribute nothing to the
/// linear power sum. With all three absent the sum is exactly zero and the
/// result is `-inf - 44 - agc`, i.e. negative infinity; this never panics
/// and callers must tolerate the infinite sentinel.
#[must_use]
pub fn total_rss(rssi_a: Rssi, rssi_b: Rssi, rssi_c: Rssi, agc_db: f64) -> f64 {
    let sum_mw: f64 = [rssi_a, rssi_b, rssi_c]
        .iter()
        .filter_map(Rssi::linear_mw)
        .sum();

    db(sum_mw, DbUnit::Power) - RSS_CALIBRATION_OFFSET_DB - agc_db
}

/// Signal-to-noise ratio of a frame in dB.
///
/// The noise floor is taken exactly as the firmware reported it, sentinel
/// included: an undefined floor (`-127`) deliberately surfaces as an
/// implausibly high SNR rather than being remapped the way the scaler
/// remaps it.
///
/// # Errors
///
/// Returns [`TelemetryError::MissingField`] naming the first absent field
/// before any computation is attempted.
pub fn snr(frame: &Frame) -> Result<f64, TelemetryError> {
    let rssi_a = frame
        .rssi_a
        .ok_or(TelemetryError::MissingField { field: "rssi_a" })?;
    let rssi_b = frame
        .rssi_b
        .ok_or(TelemetryError::MissingField { field: "rssi_b" })?;
    let rssi_c = frame
        .rssi_c
        .ok_or(TelemetryError::MissingField { field: "rssi_c" })?;
    let agc = frame
        .agc
        .ok_or(TelemetryError::MissingField { field: "agc" })?;
    let noise = frame
        .noise
        .ok_or(TelemetryError::MissingField { field: "noise" })?;

    let rss_dbm = total_rss(rssi_a, rssi_b, rssi_c, agc);
    Ok(rss_dbm - noise.reported_dbm())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array3;
    use num_complex::Complex64;
    use wifi_csi_core::dbinv;

    fn telemetry_frame() -> Frame {
        Frame::builder()
            .csi(Array3::from_elem((30, 1, 1), Complex64::new(1.0, 0.0)))
            .rssi_raw(-50.0, 0.0, 0.0)
            .agc(10.0)
            .noise_raw(-92.0)
            .build()
            .unwrap()
    }

    #[test]
    fn test_single_antenna_rss() {
        // db(dbinv(-50), pow) - 44 - 10 = -104 dBm
        let rss = total_rss(Rssi::Dbm(-50.0), Rssi::NotPresent, Rssi::NotPresent, 10.0);
        assert_relative_eq!(rss, -104.0, epsilon = 1e-10);
        assert_relative_eq!(rss, db(dbinv(-50.0), DbUnit::Power) - 54.0, epsilon = 1e-10);
    }

    #[test]
    fn test_multi_antenna_rss_sums_linear_power() {
        // Two equal antennas double the linear power: +10*log10(2) ~ 3.01 dB
        let one = total_rss(Rssi::Dbm(-50.0), Rssi::NotPresent, Rssi::NotPresent, 0.0);
        let two = total_rss(Rssi::Dbm(-50.0), Rssi::Dbm(-50.0), Rssi::NotPresent, 0.0);
        assert_relative_eq!(two - one, 10.0 * 2f64.log10(), epsilon = 1e-10);
    }

    #[test]
    fn test_all_antennas_absent_yields_negative_infinity() {
        for agc in [-20.0, 0.0, 37.0] {
            let rss = total_rss(Rssi::NotPresent, Rssi::NotPresent, Rssi::NotPresent, agc);
            assert!(rss.is_infinite() && rss < 0.0, "agc={agc} gave {rss}");
        }
    }

    #[test]
    fn test_snr_measured_noise() {
        let frame = telemetry_frame();
        let snr_db = snr(&frame).unwrap();
        // RSS = -104 dBm, noise = -92 dBm
        assert_relative_eq!(snr_db, -12.0, epsilon = 1e-10);
    }

    #[test]
    fn test_snr_uses_reported_noise_not_remap() {
        // The scaler remaps -127 to -92; SNR keeps the raw sentinel, so an
        // undefined floor inflates the SNR by 35 dB relative to the remap.
        let mut frame = telemetry_frame();
        frame.noise = Some(wifi_csi_core::NoiseFloor::from_raw(-127.0));
        let snr_db = snr(&frame).unwrap();
        assert_relative_eq!(snr_db, -104.0 + 127.0, epsilon = 1e-10);
    }

    #[test]
    fn test_snr_missing_fields() {
        let fields: [(&str, fn(&mut Frame)); 5] = [
            ("rssi_a", |f| f.rssi_a = None),
            ("rssi_b", |f| f.rssi_b = None),
            ("rssi_c", |f| f.rssi_c = None),
            ("agc", |f| f.agc = None),
            ("noise", |f| f.noise = None),
        ];

        for (name, clear) in fields {
            let mut frame = telemetry_frame();
            clear(&mut frame);
            assert_eq!(
                snr(&frame),
                Err(TelemetryError::MissingField { field: name }),
            );
        }
    }

    #[test]
    fn test_absent_antenna_is_not_a_missing_field() {
        // rssi_b/_c carry the in-band "antenna absent" marker; the field
        // itself is present, so SNR must succeed.
        let frame = telemetry_frame();
        assert_eq!(frame.rssi_b, Some(Rssi::NotPresent));
        assert!(snr(&frame).is_ok());
    }
}
