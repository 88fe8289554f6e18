//! WiFi CSI Calibration & Metric Extraction
//!
//! This crate turns raw Channel State Information frames into calibrated,
//! physically meaningful quantities: scaled complex channel tensors whose
//! squared magnitudes approximate linear SNR, total received signal
//! strength, per-frame SNR, and per-trace metric matrices (amplitude in dB
//! or inter-antenna phase difference).
//!
//! # Features
//!
//! - **RSS Aggregation**: per-antenna RSSI plus AGC into one dBm figure
//! - **SNR**: RSS against the reported noise floor
//! - **CSI Scaling**: full calibration model (thermal noise, quantization
//!   error, tx power-splitting correction) and a simplified RSSI-only
//!   variant
//! - **Metric Extraction**: trace to `[subcarriers, frames]` matrix
//!
//! # Example
//!
//! ```rust
//! use ndarray::Array3;
//! use num_complex::Complex64;
//! use wifi_csi_core::Frame;
//! use wifi_csi_signal::{extract, scale_trace, CsiMetric};
//!
//! let frame = Frame::builder()
//!     .csi(Array3::from_elem((30, 2, 1), Complex64::new(1.0, 0.5)))
//!     .rssi_raw(-55.0, -58.0, 0.0)
//!     .agc(20.0)
//!     .noise_raw(-92.0)
//!     .build()
//!     .unwrap();
//!
//! let mut trace = vec![frame];
//! scale_trace(&mut trace).unwrap();
//!
//! let amplitude = extract(&trace, CsiMetric::Amplitude, None, true).unwrap();
//! assert_eq!(amplitude.matrix.dim(), (30, 1));
//! ```

#![forbid(unsafe_code)]

pub mod metrics;
pub mod rss;
pub mod scale;

// Re-export main types for convenience
pub use metrics::{extract, CsiMetric, MetricError, MetricExtraction};
pub use rss::{snr, total_rss, TelemetryError, RSS_CALIBRATION_OFFSET_DB};
pub use scale::{
    csi_power, scale_frame, scale_simple, scale_trace, ScaleError, INTEL_SUBCARRIER_NORM,
    SIMPLE_SUBCARRIER_NORM,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common result type for signal operations
pub type Result<T> = std::result::Result<T, SignalError>;

/// Unified error type for signal operations
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SignalError {
    /// Missing telemetry on a frame
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),

    /// CSI scaling error
    #[error("scaling error: {0}")]
    Scale(#[from] ScaleError),

    /// Metric extraction error
    #[error("metric extraction error: {0}")]
    Metric(#[from] MetricError),
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::metrics::{extract, CsiMetric, MetricExtraction};
    pub use crate::rss::{snr, total_rss};
    pub use crate::scale::{scale_frame, scale_simple, scale_trace};
    pub use crate::{Result, SignalError};
    pub use wifi_csi_core::prelude::*;
}
