//! Error types for frame construction and validation.
//!
//! Validation happens once, when a [`crate::Frame`] is built; the scaling
//! and metric layers can then assume a well-formed tensor and antenna
//! configuration.

use thiserror::Error;

/// A specialized `Result` type for core operations.
pub type CoreResult<T> = Result<T, FrameError>;

/// Errors raised while constructing or validating a CSI frame.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum FrameError {
    /// The builder was finalized without a CSI tensor.
    #[error("CSI tensor is required")]
    MissingCsi,

    /// The CSI tensor contains no elements.
    #[error("CSI tensor is empty (shape {shape:?})")]
    EmptyCsi {
        /// Shape of the offending tensor
        shape: Vec<usize>,
    },

    /// The declared antenna counts disagree with the tensor's shape.
    #[error(
        "CSI tensor shape {shape:?} does not match declared antenna \
         configuration {n_rx}x{n_tx}"
    )]
    ShapeMismatch {
        /// Shape of the tensor as `[subcarriers, n_rx, n_tx]`
        shape: Vec<usize>,
        /// Declared receive antenna count
        n_rx: usize,
        /// Declared transmit antenna count
        n_tx: usize,
    },

    /// The transmit antenna count is outside the calibrated range.
    #[error("unsupported transmit antenna count {n_tx} (expected 1..=3)")]
    UnsupportedTxCount {
        /// The offending transmit antenna count
        n_tx: usize,
    },
}
