//! CSI scaling: raw channel tensors to calibrated, SNR-referenced values.
//!
//! The calibrated scaler ([`scale_frame`]) mirrors the Intel 5300
//! firmware's calibration model: it references the tensor's total power to
//! the aggregated RSS, accounts for thermal noise and ADC quantization
//! error, and applies the firmware's transmit-antenna power-splitting
//! correction. After scaling, the squared magnitude of each entry
//! approximates linear SNR for that (subcarrier, rx, tx) path.
//!
//! The simplified scaler ([`scale_simple`]) covers hardware that reports a
//! single RSSI and no AGC or noise telemetry; it only establishes a scale
//! against RSSI and is not a true SNR reference.

use ndarray::Array3;
use num_complex::Complex64;
use thiserror::Error;
use wifi_csi_core::{dbinv, Frame};

use crate::rss::{total_rss, TelemetryError};

/// Fixed subcarrier-count normalization for the Intel 20 MHz convention.
/// This is a firmware constant, not derived from the tensor's actual
/// subcarrier count.
pub const INTEL_SUBCARRIER_NORM: f64 = 30.0;

/// Normalization constant for the simplified (RSSI-only) scaler's hardware
/// family.
pub const SIMPLE_SUBCARRIER_NORM: f64 = 256.0;

/// Errors raised while scaling a CSI tensor.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ScaleError {
    /// Required telemetry was absent from the frame.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    /// The tensor's total received power is zero, so no meaningful scale
    /// factor exists. A zero-power tensor indicates a corrupt or empty
    /// capture.
    #[error("CSI tensor has zero total power; nothing to scale")]
    ZeroPowerCsi,
}

/// Total received power across the tensor: `Re(Σ h·conj(h))`.
#[must_use]
pub fn csi_power(csi: &Array3<Complex64>) -> f64 {
    csi.iter().map(Complex64::norm_sqr).sum()
}

/// Scales a frame's CSI tensor using the full calibration model.
///
/// The result has the same shape as the input; only magnitudes change.
/// Squared entry magnitudes approximate linear SNR.
///
/// # Errors
///
/// Returns [`ScaleError::Telemetry`] when the frame lacks RSSI, AGC, or
/// noise telemetry, and [`ScaleError::ZeroPowerCsi`] for an all-zero
/// tensor.
pub fn scale_frame(frame: &Frame) -> Result<Array3<Complex64>, ScaleError> {
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

    let csi_pwr = csi_power(&frame.csi);
    if csi_pwr == 0.0 {
        return Err(ScaleError::ZeroPowerCsi);
    }

    // Scale factor between normalized CSI and RSSI (mW).
    let rss_pwr = dbinv(total_rss(rssi_a, rssi_b, rssi_c, agc));
    let scale = rss_pwr / (csi_pwr / INTEL_SUBCARRIER_NORM);

    let thermal_noise_pwr = dbinv(noise.for_scaling_dbm());

    // The tensor entries are 8-bit signed values from a 6-bit ADC, so each
    // entry is off by roughly +/- 1 across real and imaginary parts. That is
    // 1 unit of power per entry, n_rx*n_tx entries per carrier, and we only
    // want one carrier's worth of error to match the one carrier's worth of
    // signal computed above.
    let quant_error_pwr = scale * frame.antenna_pairs() as f64;

    let total_noise_pwr = thermal_noise_pwr + quant_error_pwr;

    // Units of sqrt(SNR), like H in textbooks.
    let gain = (scale / total_noise_pwr).sqrt();
    let mut scaled = frame.csi.mapv(|h| h * gain);

    match frame.n_tx {
        2 => scaled.mapv_inplace(|h| h * 2f64.sqrt()),
        // sqrt(3) is ~4.77 dB, but the firmware approximates a factor of 3
        // as 4.5 dB; keep its convention rather than the exact value.
        3 => scaled.mapv_inplace(|h| h * dbinv(4.5).sqrt()),
        _ => {}
    }

    Ok(scaled)
}

/// Scales a CSI tensor against a single RSSI reading.
///
/// For hardware without AGC or noise telemetry. Only the magnitude of the
/// reading is used and no transmit-antenna correction is applied.
///
/// # Errors
///
/// Returns [`ScaleError::ZeroPowerCsi`] for an all-zero tensor.
pub fn scale_simple(
    csi: &Array3<Complex64>,
    rssi_dbm: f64,
) -> Result<Array3<Complex64>, ScaleError> {
    let csi_pwr = csi_power(csi);
    if csi_pwr == 0.0 {
        return Err(ScaleError::ZeroPowerCsi);
    }

    let rssi_pwr = dbinv(rssi_dbm.abs());
    let scale = rssi_pwr / (csi_pwr / SIMPLE_SUBCARRIER_NORM);

    Ok(csi.mapv(|h| h * scale.sqrt()))
}

/// Runs the calibrated scaler over a trace in capture order, storing each
/// result in the frame's `scaled_csi` slot.
///
/// # Errors
///
/// Stops at the first failing frame. Frames scaled before the failure keep
/// their results; the failing frame and everything after it are left
/// untouched.
pub fn scale_trace(trace: &mut [Frame]) -> Result<(), ScaleError> {
    for frame in trace.iter_mut() {
        let scaled = scale_frame(frame)?;
        frame.scaled_csi = Some(scaled);
    }
    Ok(())
}
