//! Core data types for calibrated CSI processing.
//!
//! A [`Frame`] is one hardware measurement epoch: a complex CSI tensor
//! shaped `[subcarriers, n_rx, n_tx]` together with the radio telemetry
//! needed to calibrate it (per-antenna RSSI, AGC setting, noise floor).
//!
//! The capture firmware encodes two in-band sentinels that must never leak
//! into arithmetic: an RSSI of `0` means "antenna not present", and a noise
//! floor of `-127` means "undefined" (monitor-mode capture). Both are
//! resolved into closed variants ([`Rssi`], [`NoiseFloor`]) when a frame is
//! constructed, so the scaling formulas downstream operate on unambiguous
//! values.

use ndarray::Array3;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::db::dbinv;
use crate::error::{CoreResult, FrameError};
use crate::MAX_TX_ANTENNAS;

// =============================================================================
// Telemetry Types
// =============================================================================

/// One per-antenna received-signal-strength reading.
///
/// The firmware reports `0` for antennas that are not present or not
/// measured. That value is *not* 0 dBm (which would be a very strong
/// signal): it is an absence marker, and converting it with `dbinv` would
/// inject 1 mW of phantom power into any sum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Rssi {
    /// Antenna not present / not measured (raw value `0`).
    NotPresent,
    /// Reading in dBm.
    Dbm(f64),
}

impl Rssi {
    /// Resolves a raw firmware RSSI value, mapping the `0` sentinel to
    /// [`Rssi::NotPresent`].
    #[must_use]
    pub fn from_raw(raw: f64) -> Self {
        if raw == 0.0 {
            Self::NotPresent
        } else {
            Self::Dbm(raw)
        }
    }

    /// Returns the reading in dBm, or `None` for an absent antenna.
    #[must_use]
    pub fn dbm(&self) -> Option<f64> {
        match self {
            Self::NotPresent => None,
            Self::Dbm(v) => Some(*v),
        }
    }

    /// Returns the reading as linear power in mW, or `None` for an absent
    /// antenna. Absent antennas contribute nothing to a power sum.
    #[must_use]
    pub fn linear_mw(&self) -> Option<f64> {
        self.dbm().map(dbinv)
    }
}

/// Measured noise floor in dBm.
///
/// Monitor-mode captures report the `-127` sentinel instead of a
/// measurement; the calibration model substitutes `-92` dBm for it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NoiseFloor {
    /// Measured noise floor in dBm.
    Measured(f64),
    /// Firmware sentinel `-127`: no measurement available.
    Undefined,
}

impl NoiseFloor {
    /// Raw firmware value marking an undefined noise floor.
    pub const UNDEFINED_RAW: f64 = -127.0;

    /// Substitute noise floor used when the measurement is undefined.
    pub const MONITOR_MODE_DBM: f64 = -92.0;

    /// Resolves a raw firmware noise value, mapping the `-127` sentinel to
    /// [`NoiseFloor::Undefined`].
    #[must_use]
    pub fn from_raw(raw: f64) -> Self {
        if raw == Self::UNDEFINED_RAW {
            Self::Undefined
        } else {
            Self::Measured(raw)
        }
    }

    /// Noise floor to use in the scaling model: the measurement, or
    /// [`Self::MONITOR_MODE_DBM`] when undefined.
    #[must_use]
    pub fn for_scaling_dbm(&self) -> f64 {
        match self {
            Self::Measured(v) => *v,
            Self::Undefined => Self::MONITOR_MODE_DBM,
        }
    }

    /// Noise floor exactly as the firmware reported it, sentinel included.
    ///
    /// The SNR calculator uses this value rather than the remapped one, so
    /// an undefined floor shows up as an implausibly high SNR instead of
    /// being silently papered over.
    #[must_use]
    pub fn reported_dbm(&self) -> f64 {
        match self {
            Self::Measured(v) => *v,
            Self::Undefined => Self::UNDEFINED_RAW,
        }
    }
}

// =============================================================================
// Frame
// =============================================================================

/// One frame of raw Channel State Information plus its radio telemetry.
///
/// The CSI tensor shape `[subcarriers, n_rx, n_tx]` is fixed at
/// construction; the scaler and metric extractor only ever change
/// magnitudes and phases, never the shape. Single-antenna hardware is
/// represented with degenerate trailing dimensions (`[s, 1, 1]`).
///
/// Telemetry fields are `Option` because not every capture format records
/// them (the simplified scaler exists for exactly that hardware). `None`
/// means "field absent from the capture record", which is distinct from the
/// in-band sentinels already resolved inside [`Rssi`] and [`NoiseFloor`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    /// Complex CSI tensor, shape `[subcarriers, n_rx, n_tx]`
    pub csi: Array3<Complex64>,
    /// Number of receive antennas
    pub n_rx: usize,
    /// Number of transmit antennas (1..=3)
    pub n_tx: usize,
    /// RSSI for antenna A
    pub rssi_a: Option<Rssi>,
    /// RSSI for antenna B
    pub rssi_b: Option<Rssi>,
    /// RSSI for antenna C
    pub rssi_c: Option<Rssi>,
    /// Automatic gain control setting in dB
    pub agc: Option<f64>,
    /// Measured noise floor
    pub noise: Option<NoiseFloor>,
    /// Low-order hardware clock counter; wraps periodically and is only
    /// meaningful for relative time derivation
    pub timestamp_low: u32,
    /// Calibrated CSI tensor, filled in by the scaler
    pub scaled_csi: Option<Array3<Complex64>>,
}

impl Frame {
    /// Creates a new frame builder.
    #[must_use]
    pub fn builder() -> FrameBuilder {
        FrameBuilder::default()
    }

    /// Returns the number of subcarriers.
    #[must_use]
    pub fn num_subcarriers(&self) -> usize {
        self.csi.shape()[0]
    }

    /// Returns the number of rx/tx antenna pairs per subcarrier.
    #[must_use]
    pub fn antenna_pairs(&self) -> usize {
        self.n_rx * self.n_tx
    }

    /// Returns `true` once the calibrated tensor has been computed.
    #[must_use]
    pub fn is_scaled(&self) -> bool {
        self.scaled_csi.is_some()
    }
}

/// An ordered capture of frames. Order is capture order; spacing is not
/// required to be uniform.
pub type Trace = Vec<Frame>;

// =============================================================================
// FrameBuilder
// =============================================================================

/// Builder for [`Frame`].
///
/// Raw-value setters ([`rssi_raw`](Self::rssi_raw),
/// [`noise_raw`](Self::noise_raw)) resolve the firmware sentinels;
/// [`build`](Self::build) validates the tensor shape against the antenna
/// configuration.
#[derive(Debug, Default)]
pub struct FrameBuilder {
    csi: Option<Array3<Complex64>>,
    n_rx: Option<usize>,
    n_tx: Option<usize>,
    rssi_a: Option<Rssi>,
    rssi_b: Option<Rssi>,
    rssi_c: Option<Rssi>,
    agc: Option<f64>,
    noise: Option<NoiseFloor>,
    timestamp_low: u32,
}

impl FrameBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the CSI tensor, shape `[subcarriers, n_rx, n_tx]`.
    #[must_use]
    pub fn csi(mut self, csi: Array3<Complex64>) -> Self {
        self.csi = Some(csi);
        self
    }

    /// Declares the receive antenna count (defaults to the tensor's second
    /// dimension).
    #[must_use]
    pub fn n_rx(mut self, n_rx: usize) -> Self {
        self.n_rx = Some(n_rx);
        self
    }

    /// Declares the transmit antenna count (defaults to the tensor's third
    /// dimension).
    #[must_use]
    pub fn n_tx(mut self, n_tx: usize) -> Self {
        self.n_tx = Some(n_tx);
        self
    }

    /// Sets the three per-antenna RSSI readings from raw firmware values,
    /// resolving the `0` sentinel.
    #[must_use]
    pub fn rssi_raw(mut self, a: f64, b: f64, c: f64) -> Self {
        self.rssi_a = Some(Rssi::from_raw(a));
        self.rssi_b = Some(Rssi::from_raw(b));
        self.rssi_c = Some(Rssi::from_raw(c));
        self
    }

    /// Sets the AGC value in dB.
    #[must_use]
    pub fn agc(mut self, agc_db: f64) -> Self {
        self.agc = Some(agc_db);
        self
    }

    /// Sets the noise floor from the raw firmware value, resolving the
    /// `-127` sentinel.
    #[must_use]
    pub fn noise_raw(mut self, raw_dbm: f64) -> Self {
        self.noise = Some(NoiseFloor::from_raw(raw_dbm));
        self
    }

    /// Sets an already-resolved noise floor.
    #[must_use]
    pub fn noise(mut self, noise: NoiseFloor) -> Self {
        self.noise = Some(noise);
        self
    }

    /// Sets the low-order hardware clock counter.
    #[must_use]
    pub fn timestamp_low(mut self, timestamp_low: u32) -> Self {
        self.timestamp_low = timestamp_low;
        self
    }

    /// Validates and builds the frame.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError`] when the tensor is missing or empty, the
    /// declared antenna counts disagree with the tensor shape, or the
    /// transmit antenna count falls outside the calibrated `1..=3` range.
    pub fn build(self) -> CoreResult<Frame> {
        let csi = self.csi.ok_or(FrameError::MissingCsi)?;

        let shape = csi.shape().to_vec();
        if csi.is_empty() {
            return Err(FrameError::EmptyCsi { shape });
        }

        let n_rx = self.n_rx.unwrap_or(shape[1]);
        let n_tx = self.n_tx.unwrap_or(shape[2]);
        if shape[1] != n_rx || shape[2] != n_tx {
            return Err(FrameError::ShapeMismatch { shape, n_rx, n_tx });
        }
        if n_tx == 0 || n_tx > MAX_TX_ANTENNAS {
            return Err(FrameError::UnsupportedTxCount { n_tx });
        }

        Ok(Frame {
            csi,
            n_rx,
            n_tx,
            rssi_a: self.rssi_a,
            rssi_b: self.rssi_b,
            rssi_c: self.rssi_c,
            agc: self.agc,
            noise: self.noise,
            timestamp_low: self.timestamp_low,
            scaled_csi: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_csi(subcarriers: usize, n_rx: usize, n_tx: usize) -> Array3<Complex64> {
        Array3::from_elem((subcarriers, n_rx, n_tx), Complex64::new(1.0, 0.0))
    }

    #[test]
    fn test_rssi_sentinel_resolution() {
        assert_eq!(Rssi::from_raw(0.0), Rssi::NotPresent);
        assert_eq!(Rssi::from_raw(-55.0), Rssi::Dbm(-55.0));

        assert!(Rssi::NotPresent.linear_mw().is_none());
        let mw = Rssi::Dbm(-30.0).linear_mw().unwrap();
        assert_relative_eq!(mw, 1e-3, epsilon = 1e-12);
    }

    #[test]
    fn test_noise_floor_sentinel_resolution() {
        let undefined = NoiseFloor::from_raw(-127.0);
        assert_eq!(undefined, NoiseFloor::Undefined);
        assert_relative_eq!(undefined.for_scaling_dbm(), -92.0);
        assert_relative_eq!(undefined.reported_dbm(), -127.0);

        let measured = NoiseFloor::from_raw(-88.5);
        assert_eq!(measured, NoiseFloor::Measured(-88.5));
        assert_relative_eq!(measured.for_scaling_dbm(), -88.5);
        assert_relative_eq!(measured.reported_dbm(), -88.5);
    }

    #[test]
    fn test_builder_full_frame() {
        let frame = Frame::builder()
            .csi(unit_csi(30, 3, 2))
            .rssi_raw(-50.0, -52.0, 0.0)
            .agc(22.0)
            .noise_raw(-127.0)
            .timestamp_low(12345)
            .build()
            .unwrap();

        assert_eq!(frame.num_subcarriers(), 30);
        assert_eq!(frame.n_rx, 3);
        assert_eq!(frame.n_tx, 2);
        assert_eq!(frame.antenna_pairs(), 6);
        assert_eq!(frame.rssi_c, Some(Rssi::NotPresent));
        assert_eq!(frame.noise, Some(NoiseFloor::Undefined));
        assert!(!frame.is_scaled());
    }

    #[test]
    fn test_builder_infers_antenna_counts_from_shape() {
        let frame = Frame::builder().csi(unit_csi(56, 2, 1)).build().unwrap();
        assert_eq!(frame.n_rx, 2);
        assert_eq!(frame.n_tx, 1);
    }

    #[test]
    fn test_builder_missing_csi() {
        assert!(matches!(
            Frame::builder().build(),
            Err(FrameError::MissingCsi)
        ));
    }

    #[test]
    fn test_builder_empty_csi() {
        let result = Frame::builder().csi(unit_csi(0, 1, 1)).build();
        assert!(matches!(result, Err(FrameError::EmptyCsi { .. })));
    }

    #[test]
    fn test_builder_shape_mismatch() {
        let result = Frame::builder().csi(unit_csi(30, 2, 1)).n_rx(3).build();
        assert!(matches!(
            result,
            Err(FrameError::ShapeMismatch { n_rx: 3, .. })
        ));
    }

    #[test]
    fn test_builder_rejects_four_tx_antennas() {
        let result = Frame::builder().csi(unit_csi(30, 1, 4)).build();
        assert!(matches!(
            result,
            Err(FrameError::UnsupportedTxCount { n_tx: 4 })
        ));
    }

    #[test]
    fn test_telemetry_defaults_to_absent() {
        let frame = Frame::builder().csi(unit_csi(30, 1, 1)).build().unwrap();
        assert!(frame.rssi_a.is_none());
        assert!(frame.agc.is_none());
        assert!(frame.noise.is_none());
    }
}
