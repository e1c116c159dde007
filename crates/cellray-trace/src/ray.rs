//! Rays and their path integrals through the implicit tessellation.

use cellray_cloud::{CellId, SpatialOracle};
use cellray_math::{Dir3, Point3};
use serde::{Deserialize, Serialize};

use crate::chain::Chain;
use crate::classify::{classify, Boundary};
use crate::error::{Result, TraceError};
use crate::{SingleCellPolicy, TraceSettings};

/// A directed segment from `start` to `end`.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    start: Point3,
    end: Point3,
    direction: Dir3,
    length: f64,
}

impl Ray {
    /// Create a ray from `start` to `end`.
    ///
    /// Fails with [`TraceError::DegenerateRay`] when the two points coincide.
    pub fn new(start: Point3, end: Point3) -> Result<Self> {
        let delta = end - start;
        let length = delta.norm();
        if !(length.is_finite() && length > 0.0) {
            return Err(TraceError::DegenerateRay);
        }
        Ok(Self {
            start,
            end,
            direction: Dir3::new_unchecked(delta / length),
            length,
        })
    }

    /// Start point.
    pub fn start(&self) -> Point3 {
        self.start
    }

    /// End point.
    pub fn end(&self) -> Point3 {
        self.end
    }

    /// Unit direction from start to end.
    pub fn direction(&self) -> Dir3 {
        self.direction
    }

    /// Distance from start to end.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Evaluate the ray at distance `s` from the start.
    #[inline]
    pub fn at(&self, s: f64) -> Point3 {
        self.start + s * self.direction.as_ref()
    }

    /// Distance from the start at which the ray meets the plane bisecting
    /// the generators `a` and `b`.
    ///
    /// Returns `None` when that plane is parallel to the ray.
    pub fn split_distance(&self, a: &Point3, b: &Point3) -> Option<f64> {
        let normal = b - a;
        let on_plane = Point3::from((a.coords + b.coords) * 0.5) - self.start;
        let denom = normal.dot(self.direction.as_ref());
        if denom.abs() <= f64::EPSILON * normal.norm() {
            return None;
        }
        let s = normal.dot(&on_plane) / denom;
        s.is_finite().then_some(s)
    }

    /// Integrate the field along the ray with default settings.
    pub fn integrate<O: SpatialOracle + ?Sized>(&self, oracle: &O) -> Result<Integral> {
        self.integrate_with(oracle, &TraceSettings::default())
    }

    /// Integrate the field along the ray.
    ///
    /// Walks the chain of crossing candidates from the start cell, splitting
    /// each unresolved interval at the bisector of its two end cells until
    /// every boundary is confirmed. Each confirmed boundary emits the two
    /// segments on either side of it.
    pub fn integrate_with<O: SpatialOracle + ?Sized>(
        &self,
        oracle: &O,
        settings: &TraceSettings,
    ) -> Result<Integral> {
        settings.validate()?;
        let start_cell = oracle.nearest(&self.start)?;
        let end_cell = oracle.nearest(&self.end)?;

        if start_cell == end_cell {
            return match settings.single_cell {
                SingleCellPolicy::Fault => Err(TraceError::SingleCell { cell: start_cell }),
                SingleCellPolicy::SingleSegment => {
                    let mut integral = Integral::default();
                    integral.push(oracle, Segment::new(start_cell, 0.0, self.length));
                    Ok(integral)
                }
            };
        }

        let mut chain = Chain::seeded(start_cell, end_cell, self.length);
        let mut integral = Integral::default();
        let mut current = chain.head();
        let Some(mut next) = chain[current].next else {
            return Ok(integral);
        };

        let mut steps = 0;
        loop {
            steps += 1;
            if steps > settings.max_steps {
                return Err(TraceError::StepLimit {
                    limit: settings.max_steps,
                });
            }

            let cur = chain[current];
            let nxt = chain[next];
            let s = self
                .split_distance(&oracle.position(cur.cell), &oracle.position(nxt.cell))
                .ok_or(TraceError::ParallelBisector {
                    cell_a: cur.cell,
                    cell_b: nxt.cell,
                })?
                .clamp(cur.s, nxt.s);

            match classify(oracle, &self.at(s), cur.cell, nxt.cell, &settings.classifier)? {
                Boundary::TwoCellEdge => {
                    integral.push(oracle, Segment::new(cur.cell, cur.s, s));
                    integral.push(oracle, Segment::new(nxt.cell, s, nxt.s));
                    current = next;
                    match chain[current].next {
                        Some(n) => next = n,
                        None => break,
                    }
                }
                Boundary::Unresolved(cell) => {
                    next = chain.insert_after(current, cell, s);
                }
                Boundary::DegenerateA => {
                    return Err(TraceError::DegenerateVertex {
                        s,
                        cell_a: cur.cell,
                        cell_b: nxt.cell,
                        involved: cur.cell,
                    });
                }
                Boundary::DegenerateB => {
                    return Err(TraceError::DegenerateVertex {
                        s,
                        cell_a: cur.cell,
                        cell_b: nxt.cell,
                        involved: nxt.cell,
                    });
                }
            }
        }

        Ok(integral)
    }
}

/// A stretch of the ray inside one cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Cell the stretch lies in.
    pub cell_id: CellId,
    /// Distance from the ray start where the stretch begins.
    pub s_start: f64,
    /// Distance from the ray start where the stretch ends.
    pub s_end: f64,
    /// Signed length, `s_end - s_start`.
    pub ds: f64,
}

impl Segment {
    fn new(cell_id: CellId, s_start: f64, s_end: f64) -> Self {
        Self {
            cell_id,
            s_start,
            s_end,
            ds: s_end - s_start,
        }
    }
}

/// Result of integrating one ray.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Integral {
    /// Sum of `field(cell) * ds` over all segments.
    pub column: f64,
    /// Segments in order along the ray.
    pub segments: Vec<Segment>,
}

impl Integral {
    fn push<O: SpatialOracle + ?Sized>(&mut self, oracle: &O, segment: Segment) {
        self.column += segment.ds * oracle.field_value(segment.cell_id);
        self.segments.push(segment);
    }

    /// Sum of segment lengths.
    pub fn total_length(&self) -> f64 {
        self.segments.iter().map(|seg| seg.ds).sum()
    }

    /// Distinct cells in order of traversal.
    pub fn cells(&self) -> Vec<CellId> {
        let mut cells: Vec<CellId> = self.segments.iter().map(|seg| seg.cell_id).collect();
        cells.dedup();
        cells
    }
}
