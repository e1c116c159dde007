//! Column integrals by ray traversal.

use cellray_cloud::SpatialOracle;
use cellray_math::{BoundingBox, Point3};
use cellray_trace::{Ray, TraceError, TraceSettings};
use tracing::{debug, info};

use crate::buffer::SampleBuffer;
use crate::error::{Result, SampleError};
use crate::grid::{projection_grid, GridSpec};
use crate::{check_built, check_domain, check_npix, check_range, fill_parallel, spacing, ScheduleSettings};

/// Line integrals of the field along a set of rays, one per sample.
#[derive(Debug, Clone)]
pub struct Projection {
    starts: Vec<Point3>,
    ends: Vec<Point3>,
    settings: TraceSettings,
    schedule: ScheduleSettings,
    output: SampleBuffer,
}

impl Projection {
    /// One sample per ray from `starts[i]` to `ends[i]`.
    pub fn from_rays(starts: Vec<Point3>, ends: Vec<Point3>) -> Result<Self> {
        if starts.len() != ends.len() {
            return Err(SampleError::InvalidSettings(format!(
                "{} ray starts but {} ray ends",
                starts.len(),
                ends.len()
            )));
        }
        let shape = vec![starts.len()];
        Ok(Self::with_shape(starts, ends, shape))
    }

    /// Rays parallel to z through an `nx × ny` lattice spanning `extent`.
    ///
    /// Each ray runs from `zmin` to `zmax` of the extent.
    pub fn axis_aligned(npix: [usize; 2], extent: BoundingBox) -> Result<Self> {
        check_npix(&npix)?;
        let [xmin, xmax, ymin, ymax, zmin, zmax] = extent.to_array();
        check_range("x", xmin, xmax)?;
        check_range("y", ymin, ymax)?;
        check_range("z", zmin, zmax)?;

        let [nx, ny] = npix;
        let dx = spacing(xmin, xmax, nx);
        let dy = spacing(ymin, ymax, ny);
        let mut starts = Vec::with_capacity(nx * ny);
        let mut ends = Vec::with_capacity(nx * ny);
        for i in 0..nx {
            for j in 0..ny {
                let (x, y) = (xmin + dx * i as f64, ymin + dy * j as f64);
                starts.push(Point3::new(x, y, zmin));
                ends.push(Point3::new(x, y, zmax));
            }
        }
        Ok(Self::with_shape(starts, ends, npix.to_vec()))
    }

    /// Rays through a rotated projection grid.
    pub fn from_grid(spec: &GridSpec) -> Result<Self> {
        let (starts, ends) = projection_grid(spec)?;
        Ok(Self::with_shape(starts, ends, spec.nres.to_vec()))
    }

    fn with_shape(starts: Vec<Point3>, ends: Vec<Point3>, shape: Vec<usize>) -> Self {
        Self {
            starts,
            ends,
            settings: TraceSettings::default(),
            schedule: ScheduleSettings::default(),
            output: SampleBuffer::new(shape),
        }
    }

    /// Use different traversal settings.
    pub fn with_settings(mut self, settings: TraceSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Use a different work schedule.
    pub fn with_schedule(mut self, schedule: ScheduleSettings) -> Self {
        self.schedule = schedule;
        self
    }

    /// Number of rays.
    pub fn len(&self) -> usize {
        self.starts.len()
    }

    /// Whether there are no rays.
    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    /// Trace every ray.
    ///
    /// The first ray to fault aborts the run; the output then stays
    /// unproduced.
    pub fn make<O: SpatialOracle + Sync + ?Sized>(&mut self, oracle: &O) -> Result<()> {
        self.output.clear();
        self.settings.validate().map_err(|e| match e {
            TraceError::InvalidSettings(msg) => SampleError::InvalidSettings(msg),
            other => SampleError::InvalidSettings(other.to_string()),
        })?;

        let mut region = BoundingBox::empty();
        for p in self.starts.iter().chain(&self.ends) {
            region.include_point(p);
        }
        check_built(oracle, "projection")?;
        if !self.is_empty() {
            check_domain(oracle, &region, "projection")?;
        }

        let settings = &self.settings;
        let (starts, ends) = (&self.starts, &self.ends);
        info!(rays = starts.len(), "Making projection");
        let values = fill_parallel(starts.len(), &self.schedule, |idx| {
            Ray::new(starts[idx], ends[idx])
                .and_then(|ray| ray.integrate_with(oracle, settings))
                .map(|integral| integral.column)
                .map_err(|source| {
                    debug!(sample = idx, %source, "Ray faulted");
                    SampleError::Trace {
                        sample: idx,
                        source,
                    }
                })
        })?;
        info!("Projection complete");

        self.output.store(values);
        Ok(())
    }

    /// The traced column integrals.
    pub fn output(&self) -> &SampleBuffer {
        &self.output
    }
}
