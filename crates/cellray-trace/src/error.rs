//! Error types for ray traversal.

use cellray_cloud::{CellId, OracleError};
use thiserror::Error;

/// Faults that abort the integration of a single ray.
///
/// None of these are retried or approximated: each one means the ray or the
/// tessellation around it violates an assumption the traversal depends on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TraceError {
    /// Start and end coincide, so the ray has no direction.
    #[error("ray start and end coincide")]
    DegenerateRay,

    /// Start and end lie in the same cell and the policy forbids that.
    #[error("ray never leaves cell {cell}")]
    SingleCell {
        /// The only cell the ray touches.
        cell: CellId,
    },

    /// A split point is a tessellation vertex touching only one of the two
    /// cells being separated.
    #[error(
        "degenerate vertex at s={s} between cells {cell_a} and {cell_b} (only {involved} is tied)"
    )]
    DegenerateVertex {
        /// Distance along the ray of the split point.
        s: f64,
        /// Cell on the near side.
        cell_a: CellId,
        /// Cell on the far side.
        cell_b: CellId,
        /// Which of the two is among the tied-nearest generators.
        involved: CellId,
    },

    /// The bisector plane of two generators is parallel to the ray.
    #[error("bisector of cells {cell_a} and {cell_b} is parallel to the ray")]
    ParallelBisector {
        /// Cell on the near side.
        cell_a: CellId,
        /// Cell on the far side.
        cell_b: CellId,
    },

    /// Traversal did not finish within the configured number of steps.
    #[error("traversal exceeded {limit} steps")]
    StepLimit {
        /// The configured limit.
        limit: usize,
    },

    /// Invalid trace settings.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// The oracle rejected a query.
    #[error(transparent)]
    Oracle(#[from] OracleError),
}

/// Result type for trace operations.
pub type Result<T> = std::result::Result<T, TraceError>;
