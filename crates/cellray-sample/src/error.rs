//! Error types for the sampling drivers.

use std::path::PathBuf;

use cellray_cloud::OracleError;
use cellray_math::Axis;
use cellray_trace::TraceError;
use thiserror::Error;

/// Errors that can occur while sampling a point cloud.
#[derive(Error, Debug)]
pub enum SampleError {
    /// The oracle has no spatial index yet.
    #[error("there is currently no valid tree for this point cloud")]
    NotBuilt,

    /// The requested region leaves the oracle's bounding box.
    #[error(
        "requested {axis} range [{requested_min}, {requested_max}] is outside the cloud bounds [{domain_min}, {domain_max}]"
    )]
    OutOfBounds {
        /// First offending axis.
        axis: Axis,
        /// Requested lower bound.
        requested_min: f64,
        /// Requested upper bound.
        requested_max: f64,
        /// Domain lower bound.
        domain_min: f64,
        /// Domain upper bound.
        domain_max: f64,
    },

    /// Invalid driver settings.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Output was requested before a run produced it.
    #[error("output has not been produced yet")]
    NotProduced,

    /// A ray faulted, aborting the whole run.
    #[error("sample {sample} failed: {source}")]
    Trace {
        /// Flattened index of the faulting sample.
        sample: usize,
        /// The ray fault.
        #[source]
        source: TraceError,
    },

    /// The oracle rejected a direct lookup.
    #[error(transparent)]
    Oracle(#[from] OracleError),

    /// IO error while writing output.
    #[error("failed to write to {path}: {source}")]
    Io {
        /// The path that failed.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Result type for sampling operations.
pub type Result<T> = std::result::Result<T, SampleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SampleError::OutOfBounds {
            axis: Axis::Z,
            requested_min: -1.0,
            requested_max: 0.5,
            domain_min: 0.0,
            domain_max: 1.0,
        };
        let msg = format!("{err}");
        assert!(msg.contains("z range"));
        assert!(msg.contains("-1"));

        let err = SampleError::Trace {
            sample: 7,
            source: TraceError::SingleCell { cell: 3 },
        };
        assert_eq!(format!("{err}"), "sample 7 failed: ray never leaves cell 3");
    }
}
