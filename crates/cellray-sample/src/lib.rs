#![warn(missing_docs)]

//! Grid sampling drivers for the cellray point-cloud tracer.
//!
//! Each driver evaluates one scalar per grid cell, either by a direct
//! nearest-generator lookup or by integrating a [`Ray`](cellray_trace::Ray)
//! through the tessellation, and stores the results row-major in a
//! [`SampleBuffer`].
//!
//! # Example
//!
//! ```
//! use cellray_cloud::PointCloud;
//! use cellray_math::{BoundingBox, Point3};
//! use cellray_sample::Slice;
//!
//! let points = [Point3::new(0.25, 0.5, 0.5), Point3::new(0.75, 0.5, 0.5)];
//! let bbox = BoundingBox::from_array([0.0, 1.0, 0.0, 1.0, 0.0, 1.0]);
//! let cloud = PointCloud::build_from(&points, &[1.0, 2.0], bbox).unwrap();
//!
//! let mut slice = Slice::new([2, 2], [0.0, 1.0, 0.0, 1.0], 0.5).unwrap();
//! slice.make(&cloud).unwrap();
//! assert_eq!(slice.output().values().unwrap(), &[1.0, 1.0, 2.0, 2.0]);
//! ```

mod brute;
mod buffer;
pub mod error;
pub mod grid;
mod points;
mod projection;
mod slice;

pub use brute::BruteProjection;
pub use buffer::SampleBuffer;
pub use error::{Result, SampleError};
pub use grid::{projection_grid, AxisPair, GridSpec, Orientation};
pub use points::sample_points;
pub use projection::Projection;
pub use slice::Slice;

use cellray_cloud::SpatialOracle;
use cellray_math::BoundingBox;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Work distribution across samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleSettings {
    /// Number of consecutive samples handed to a worker at a time.
    pub chunk_size: usize,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self { chunk_size: 256 }
    }
}

impl ScheduleSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(SampleError::InvalidSettings(
                "chunk_size must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Reject runs on an unbuilt oracle.
pub(crate) fn check_built<O: SpatialOracle + ?Sized>(oracle: &O, driver: &'static str) -> Result<()> {
    if !oracle.is_built() {
        warn!(driver, "No valid tree for this point cloud, aborting");
        return Err(SampleError::NotBuilt);
    }
    Ok(())
}

/// Reject runs on an unbuilt oracle or over a region outside its domain.
pub(crate) fn check_domain<O: SpatialOracle + ?Sized>(
    oracle: &O,
    region: &BoundingBox,
    driver: &'static str,
) -> Result<()> {
    check_built(oracle, driver)?;

    let domain = oracle.bounding_box();
    if let Some(axis) = domain.first_violation(region) {
        let (requested_min, requested_max) = region.range(axis);
        let (domain_min, domain_max) = domain.range(axis);
        warn!(
            driver,
            %axis,
            requested_min,
            requested_max,
            domain_min,
            domain_max,
            "Extent out of bounds of the cloud, aborting"
        );
        return Err(SampleError::OutOfBounds {
            axis,
            requested_min,
            requested_max,
            domain_min,
            domain_max,
        });
    }
    Ok(())
}

/// Evaluate `sample` for every flattened index in parallel.
///
/// Samples are dispatched in chunks of `schedule.chunk_size`; the first error
/// aborts the run and no partial output is returned.
pub(crate) fn fill_parallel<F>(len: usize, schedule: &ScheduleSettings, sample: F) -> Result<Vec<f64>>
where
    F: Fn(usize) -> Result<f64> + Sync,
{
    schedule.validate()?;
    let chunk_size = schedule.chunk_size;
    let mut values = vec![0.0; len];
    values
        .par_chunks_mut(chunk_size)
        .enumerate()
        .try_for_each(|(chunk, out)| {
            let base = chunk * chunk_size;
            for (offset, slot) in out.iter_mut().enumerate() {
                *slot = sample(base + offset)?;
            }
            Ok::<(), SampleError>(())
        })?;
    Ok(values)
}

/// Spacing of `n` lattice points spanning `[min, max]` inclusively.
pub(crate) fn spacing(min: f64, max: f64, n: usize) -> f64 {
    if n > 1 {
        (max - min) / (n - 1) as f64
    } else {
        0.0
    }
}

pub(crate) fn check_npix(npix: &[usize]) -> Result<()> {
    if npix.iter().any(|&n| n == 0) {
        return Err(SampleError::InvalidSettings(format!(
            "pixel counts must be positive, got {npix:?}"
        )));
    }
    Ok(())
}

pub(crate) fn check_range(name: &str, min: f64, max: f64) -> Result<()> {
    if !(min.is_finite() && max.is_finite() && min <= max) {
        return Err(SampleError::InvalidSettings(format!(
            "{name} range [{min}, {max}] must be finite and ordered"
        )));
    }
    Ok(())
}
