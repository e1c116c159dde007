//! Field values at arbitrary query points.

use cellray_cloud::SpatialOracle;
use cellray_math::{BoundingBox, Point3};
use tracing::debug;

use crate::error::Result;
use crate::{check_built, check_domain, fill_parallel, ScheduleSettings};

/// Look up the field value of the cell containing each point.
///
/// The whole point set must lie inside the oracle's domain. An empty point
/// set yields an empty result once the oracle is built.
pub fn sample_points<O: SpatialOracle + Sync + ?Sized>(
    oracle: &O,
    points: &[Point3],
    schedule: &ScheduleSettings,
) -> Result<Vec<f64>> {
    check_built(oracle, "points")?;
    let Some(region) = BoundingBox::from_points(points) else {
        return Ok(Vec::new());
    };
    check_domain(oracle, &region, "points")?;

    debug!(count = points.len(), "Sampling points");
    fill_parallel(points.len(), schedule, |idx| {
        Ok(oracle.field_value(oracle.nearest(&points[idx])?))
    })
}
