//! Error types for the point-cloud oracle.

use thiserror::Error;

/// Errors raised while loading or querying a point cloud.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OracleError {
    /// A query was issued before the spatial index was built.
    #[error("spatial index has not been built")]
    NotBuilt,

    /// No generator points survived ingestion.
    #[error("there are no points in the cloud")]
    EmptyCloud,

    /// Position and field arrays disagree in length.
    #[error("input sizes must match: {positions} positions, {values} field values")]
    LengthMismatch {
        /// Number of positions supplied.
        positions: usize,
        /// Number of field values supplied.
        values: usize,
    },
}

/// Result type for oracle operations.
pub type Result<T> = std::result::Result<T, OracleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OracleError::LengthMismatch {
            positions: 3,
            values: 2,
        };
        assert!(format!("{err}").contains("3 positions"));
        assert_eq!(format!("{}", OracleError::NotBuilt), "spatial index has not been built");
    }
}
