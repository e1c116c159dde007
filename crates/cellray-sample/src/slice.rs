//! Planar slices by direct nearest-generator lookup.

use cellray_cloud::SpatialOracle;
use cellray_math::{BoundingBox, Point3};
use tracing::info;

use crate::buffer::SampleBuffer;
use crate::error::Result;
use crate::{check_domain, check_npix, check_range, fill_parallel, spacing, ScheduleSettings};

/// Field values on an `nx × ny` lattice in the plane `z = depth`.
#[derive(Debug, Clone)]
pub struct Slice {
    npix: [usize; 2],
    extent: [f64; 4],
    depth: f64,
    schedule: ScheduleSettings,
    output: SampleBuffer,
}

impl Slice {
    /// Create a slice over `extent = [xmin, xmax, ymin, ymax]` at `depth`.
    pub fn new(npix: [usize; 2], extent: [f64; 4], depth: f64) -> Result<Self> {
        check_npix(&npix)?;
        check_range("x", extent[0], extent[1])?;
        check_range("y", extent[2], extent[3])?;
        check_range("depth", depth, depth)?;
        Ok(Self {
            npix,
            extent,
            depth,
            schedule: ScheduleSettings::default(),
            output: SampleBuffer::new(npix.to_vec()),
        })
    }

    /// Use a different work schedule.
    pub fn with_schedule(mut self, schedule: ScheduleSettings) -> Self {
        self.schedule = schedule;
        self
    }

    /// Region of space the slice samples.
    pub fn region(&self) -> BoundingBox {
        let e = self.extent;
        BoundingBox::from_array([e[0], e[1], e[2], e[3], self.depth, self.depth])
    }

    /// Sample the slice.
    pub fn make<O: SpatialOracle + Sync + ?Sized>(&mut self, oracle: &O) -> Result<()> {
        self.output.clear();
        check_domain(oracle, &self.region(), "slice")?;

        let [nx, ny] = self.npix;
        let [x0, x1, y0, y1] = self.extent;
        let dx = spacing(x0, x1, nx);
        let dy = spacing(y0, y1, ny);
        let depth = self.depth;

        info!(nx, ny, depth, "Making slice");
        let values = fill_parallel(nx * ny, &self.schedule, |idx| {
            let (i, j) = (idx / ny, idx % ny);
            let query = Point3::new(x0 + dx * i as f64, y0 + dy * j as f64, depth);
            Ok(oracle.field_value(oracle.nearest(&query)?))
        })?;
        info!("Slice complete");

        self.output.store(values);
        Ok(())
    }

    /// The sampled values.
    pub fn output(&self) -> &SampleBuffer {
        &self.output
    }
}
