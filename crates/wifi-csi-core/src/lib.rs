//! # WiFi-CSI Core
//!
//! Core types and utilities for calibrating WiFi Channel State Information
//! (CSI) captures.
//!
//! This crate provides the foundational building blocks consumed by the
//! scaling and metric-extraction layers:
//!
//! - **Frame Types**: [`Frame`], [`FrameBuilder`], and [`Trace`] for
//!   representing one hardware measurement epoch (complex CSI tensor plus
//!   radio telemetry) and ordered capture sequences.
//!
//! - **Telemetry Types**: [`Rssi`] and [`NoiseFloor`], which resolve the
//!   firmware's in-band sentinel values (`0` = antenna absent, `-127` =
//!   noise floor undefined) into closed variants at the data-model boundary,
//!   so downstream formulas never re-check sentinels.
//!
//! - **Decibel Conversion**: the [`db`] module, with linear/decibel
//!   conversions matching the reference firmware's power and voltage
//!   conventions.
//!
//! - **Error Types**: [`FrameError`] for construction-time validation.
//!
//! ## Example
//!
//! ```rust
//! use ndarray::Array3;
//! use num_complex::Complex64;
//! use wifi_csi_core::Frame;
//!
//! let csi = Array3::from_elem((30, 2, 1), Complex64::new(1.0, 0.0));
//! let frame = Frame::builder()
//!     .csi(csi)
//!     .rssi_raw(-55.0, -58.0, 0.0)
//!     .agc(20.0)
//!     .noise_raw(-92.0)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(frame.num_subcarriers(), 30);
//! assert!(frame.rssi_c.unwrap().dbm().is_none());
//! ```

#![forbid(unsafe_code)]

pub mod db;
pub mod error;
pub mod types;

// Re-export commonly used types at the crate root
pub use db::{db, dbinv, DbUnit};
pub use error::{CoreResult, FrameError};
pub use types::{Frame, FrameBuilder, NoiseFloor, Rssi, Trace};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Subcarrier count reported by the Intel 5300 NIC on a 20 MHz channel
pub const INTEL_5300_SUBCARRIERS: usize = 30;

/// Maximum transmit antennas supported by the calibration model
pub const MAX_TX_ANTENNAS: usize = 3;

/// Prelude module for convenient imports.
///
/// ```rust
/// use wifi_csi_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::db::{db, dbinv, DbUnit};
    pub use crate::error::{CoreResult, FrameError};
    pub use crate::types::{Frame, FrameBuilder, NoiseFloor, Rssi, Trace};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_valid() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_constants() {
        assert_eq!(INTEL_5300_SUBCARRIERS, 30);
        assert_eq!(MAX_TX_ANTENNAS, 3);
    }
}
