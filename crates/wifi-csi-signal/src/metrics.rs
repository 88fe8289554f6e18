//! Trace metric extraction.
//!
//! Reduces an ordered trace of frames into a real-valued matrix shaped
//! `[subcarriers, frames]`, one column per frame: either per-subcarrier
//! amplitude in dB or the phase difference between the first two receive
//! antennas. Metric selection is a closed enum dispatch with its
//! preconditions validated up front, so an unsatisfiable request (phase
//! difference on single-antenna hardware) is a distinct failure rather
//! than a zero-filled matrix.

use ndarray::{Array2, Array3};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use wifi_csi_core::{db, DbUnit, Frame};

/// Which per-cell quantity to extract from a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CsiMetric {
    /// Entry magnitude converted to dB (voltage convention).
    Amplitude,
    /// Phase at rx antenna 1 minus phase at rx antenna 0, tx antenna 0
    /// fixed, in radians. Requires at least two receive antennas.
    PhaseDifference,
}

/// A metric matrix together with the dimensions it was built from.
///
/// `num_subcarriers` and `num_frames` always equal the matrix's row and
/// column counts respectively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricExtraction {
    /// Metric values, shape `[subcarriers, frames]`
    pub matrix: Array2<f64>,
    /// Number of frames (matrix columns)
    pub num_frames: usize,
    /// Number of subcarriers (matrix rows)
    pub num_subcarriers: usize,
}

/// Errors raised during metric extraction.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum MetricError {
    /// The trace holds no frames, so there is no shape to extract against.
    #[error("trace is empty")]
    EmptyTrace,

    /// Phase difference was requested on a tensor with fewer than two
    /// receive antennas.
    #[error("phase difference requires at least 2 receive antennas, got {rx_antennas}")]
    PhaseDifferenceUndefined {
        /// Receive antenna count of the offending tensor
        rx_antennas: usize,
    },

    /// A scaled tensor was requested but the frame has not been scaled.
    #[error("frame {frame} has no scaled CSI; run the scaler over the trace first")]
    MissingScaledCsi {
        /// Index of the offending frame within the trace
        frame: usize,
    },

    /// The requested antenna stream exceeds the tensor's antenna axes.
    #[error("antenna stream {stream} out of range for a {n_rx}x{n_tx} tensor")]
    StreamOutOfRange {
        /// Requested stream index
        stream: usize,
        /// Receive antenna count
        n_rx: usize,
        /// Transmit antenna count
        n_tx: usize,
    },

    /// A frame's tensor shape differs from the first frame's.
    #[error("frame {frame} tensor shape {actual:?} differs from first frame's {expected:?}")]
    ShapeMismatch {
        /// Index of the offending frame within the trace
        frame: usize,
        /// The offending frame's tensor shape
        actual: Vec<usize>,
        /// Shape of the first frame's tensor
        expected: Vec<usize>,
    },
}

/// Extracts a `[subcarriers, frames]` metric matrix from a trace.
///
/// The tensor shape is taken from the first frame; every other frame must
/// match it. `antenna_stream` defaults to `0` when unspecified. With
/// `scaled` set, each frame's calibrated tensor is read; otherwise the raw
/// tensor is used.
///
/// # Errors
///
/// Returns [`MetricError`] when the trace is empty, a precondition of the
/// requested metric is unsatisfiable, a frame lacks its scaled tensor, or
/// tensor shapes disagree across the trace. A failure never yields a
/// partially meaningful matrix.
pub fn extract(
    trace: &[Frame],
    metric: CsiMetric,
    antenna_stream: Option<usize>,
    scaled: bool,
) -> Result<MetricExtraction, MetricError> {
    let first = trace.first().ok_or(MetricError::EmptyTrace)?;
    let shape = frame_tensor(first, 0, scaled)?.dim();
    let (num_subcarriers, n_rx, n_tx) = shape;
    let num_frames = trace.len();

    let stream = antenna_stream.unwrap_or(0);
    match metric {
        CsiMetric::Amplitude => {
            // The same stream index selects both antenna axes below, so it
            // must be valid on each.
            if stream >= n_rx || stream >= n_tx {
                return Err(MetricError::StreamOutOfRange { stream, n_rx, n_tx });
            }
        }
        CsiMetric::PhaseDifference => {
            if n_rx < 2 {
                return Err(MetricError::PhaseDifferenceUndefined { rx_antennas: n_rx });
            }
        }
    }

    let mut matrix = Array2::<f64>::zeros((num_subcarriers, num_frames));

    for (x, frame) in trace.iter().enumerate() {
        let entry = frame_tensor(frame, x, scaled)?;
        if entry.dim() != shape {
            return Err(MetricError::ShapeMismatch {
                frame: x,
                actual: entry.shape().to_vec(),
                expected: vec![num_subcarriers, n_rx, n_tx],
            });
        }

        for y in 0..num_subcarriers {
            matrix[[y, x]] = match metric {
                // Index convention inherited from the reference capture
                // tooling: the stream index is applied to the rx and tx axes
                // alike, collapsing both to the same stream.
                CsiMetric::Amplitude => db(entry[[y, stream, stream]].norm(), DbUnit::Voltage),
                CsiMetric::PhaseDifference => {
                    entry[[y, 1, 0]].arg() - entry[[y, 0, 0]].arg()
                }
            };
        }
    }

    Ok(MetricExtraction {
        matrix,
        num_frames,
        num_subcarriers,
    })
}

fn frame_tensor(frame: &Frame, index: usize, scaled: bool) -> Result<&Array3<Complex64>, MetricError> {
    if scaled {
        frame
            .scaled_csi
            .as_ref()
            .ok_or(MetricError::MissingScaledCsi { frame: index })
    } else {
        Ok(&frame.csi)
    }
}
