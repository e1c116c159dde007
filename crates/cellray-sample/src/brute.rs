//! Projections by summing nearest-generator lookups along z.

use cellray_cloud::SpatialOracle;
use cellray_math::{Axis, BoundingBox, Point3};
use tracing::info;

use crate::buffer::SampleBuffer;
use crate::error::Result;
use crate::{check_domain, check_npix, check_range, fill_parallel, spacing, ScheduleSettings};

/// Column integrals approximated on an `nx × ny × nz` lattice.
///
/// Each pixel is the sum of the field at its `nz` lattice points times the z
/// spacing. It needs no ray traversal and serves as a reference for
/// [`Projection`](crate::Projection).
#[derive(Debug, Clone)]
pub struct BruteProjection {
    npix: [usize; 3],
    extent: BoundingBox,
    schedule: ScheduleSettings,
    output: SampleBuffer,
}

impl BruteProjection {
    /// Create a projection of `extent` with `npix = [nx, ny, nz]` samples.
    pub fn new(npix: [usize; 3], extent: BoundingBox) -> Result<Self> {
        check_npix(&npix)?;
        for axis in Axis::ALL {
            let (lo, hi) = extent.range(axis);
            check_range(&axis.to_string(), lo, hi)?;
        }
        Ok(Self {
            npix,
            extent,
            schedule: ScheduleSettings::default(),
            output: SampleBuffer::new(vec![npix[0], npix[1]]),
        })
    }

    /// Use a different work schedule.
    pub fn with_schedule(mut self, schedule: ScheduleSettings) -> Self {
        self.schedule = schedule;
        self
    }

    /// Sample the projection.
    pub fn make<O: SpatialOracle + Sync + ?Sized>(&mut self, oracle: &O) -> Result<()> {
        self.output.clear();
        check_domain(oracle, &self.extent, "brute projection")?;

        let [nx, ny, nz] = self.npix;
        let min = self.extent.min;
        let max = self.extent.max;
        let dx = spacing(min.x, max.x, nx);
        let dy = spacing(min.y, max.y, ny);
        let dz = spacing(min.z, max.z, nz);

        info!(nx, ny, nz, "Making brute-force projection");
        let values = fill_parallel(nx * ny, &self.schedule, |idx| {
            let (i, j) = (idx / ny, idx % ny);
            let (x, y) = (min.x + dx * i as f64, min.y + dy * j as f64);
            let mut sum = 0.0;
            for k in 0..nz {
                let query = Point3::new(x, y, min.z + dz * k as f64);
                sum += oracle.field_value(oracle.nearest(&query)?);
            }
            Ok(sum * dz)
        })?;
        info!("Brute-force projection complete");

        self.output.store(values);
        Ok(())
    }

    /// The sampled values.
    pub fn output(&self) -> &SampleBuffer {
        &self.output
    }
}
