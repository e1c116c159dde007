#![warn(missing_docs)]

//! Ray traversal through the implicit nearest-neighbour tessellation of a
//! point cloud.
//!
//! Every generator point owns the region of space nearer to it than to any
//! other generator. A [`Ray`] walks from its start to its end, discovering the
//! boundaries it crosses lazily from nearest-neighbour queries, and integrates
//! the per-cell field weighted by the length spent in each cell.
//!
//! # Architecture
//!
//! - [`Ray`] - Start, end and unit direction; runs the traversal
//! - [`Integral`] / [`Segment`] - Path integral and the per-cell pieces of the ray
//! - [`classify`] - Decides whether a candidate split point is a real crossing
//! - `chain` - Arena-backed linked list of crossing candidates
//!
//! # Example
//!
//! ```
//! use cellray_cloud::PointCloud;
//! use cellray_math::{BoundingBox, Point3};
//! use cellray_trace::Ray;
//!
//! let points = [Point3::new(0.5, 0.5, 0.25), Point3::new(0.5, 0.5, 0.75)];
//! let bbox = BoundingBox::from_array([0.0, 1.0, 0.0, 1.0, 0.0, 1.0]);
//! let cloud = PointCloud::build_from(&points, &[1.0, 3.0], bbox).unwrap();
//!
//! let ray = Ray::new(Point3::new(0.5, 0.5, 0.0), Point3::new(0.5, 0.5, 1.0)).unwrap();
//! let integral = ray.integrate(&cloud).unwrap();
//! assert!((integral.column - 2.0).abs() < 1e-12);
//! ```

mod chain;
pub mod classify;
pub mod error;
mod ray;

pub use classify::{classify, Boundary, ClassifierSettings};
pub use error::{Result, TraceError};
pub use ray::{Integral, Ray, Segment};

use serde::{Deserialize, Serialize};

/// What to do when a ray starts and ends in the same cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SingleCellPolicy {
    /// Fail with [`TraceError::SingleCell`].
    #[default]
    Fault,
    /// Return one segment spanning the whole ray.
    SingleSegment,
}

/// Traversal parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceSettings {
    /// Boundary classifier parameters.
    pub classifier: ClassifierSettings,
    /// Handling of rays that never leave their start cell.
    pub single_cell: SingleCellPolicy,
    /// Maximum number of split evaluations per ray.
    pub max_steps: usize,
}

impl Default for TraceSettings {
    fn default() -> Self {
        Self {
            classifier: ClassifierSettings::default(),
            single_cell: SingleCellPolicy::Fault,
            max_steps: 1_000_000,
        }
    }
}

impl TraceSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        self.classifier.validate()?;
        if self.max_steps == 0 {
            return Err(TraceError::InvalidSettings(
                "max_steps must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = TraceSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.single_cell, SingleCellPolicy::Fault);
        assert_eq!(settings.classifier.max_neighbors, 8);
    }

    #[test]
    fn test_invalid_settings() {
        let settings = TraceSettings {
            max_steps: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_settings_from_partial_json() {
        let settings: TraceSettings =
            serde_json::from_str(r#"{"single_cell": "single_segment"}"#).unwrap();
        assert_eq!(settings.single_cell, SingleCellPolicy::SingleSegment);
        assert_eq!(settings.max_steps, 1_000_000);
    }
}
