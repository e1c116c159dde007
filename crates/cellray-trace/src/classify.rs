//! Boundary classification of candidate split points.
//!
//! A candidate split point between the cells of generators `a` and `b` is
//! checked against the generators nearest to it. The set of generators whose
//! squared distance is within a fixed tolerance of the minimum (the tied set)
//! decides what the point is.

use cellray_cloud::{CellId, OracleError, SpatialOracle};
use cellray_math::Point3;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TraceError};

/// Parameters of the widening k-nearest query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    /// Squared-distance window that counts as a tie.
    pub tolerance: f64,
    /// Hard cap on the number of neighbours requested.
    pub max_neighbors: usize,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            tolerance: 1e-9,
            max_neighbors: 8,
        }
    }
}

impl ClassifierSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(TraceError::InvalidSettings(
                "classifier tolerance must be a finite non-negative number".into(),
            ));
        }
        if self.max_neighbors < 2 {
            return Err(TraceError::InvalidSettings(
                "classifier max_neighbors must be at least 2".into(),
            ));
        }
        Ok(())
    }
}

/// What a candidate split point turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// The point lies on the face shared by `a` and `b`.
    TwoCellEdge,
    /// A vertex where `a` meets other cells but `b` does not.
    DegenerateA,
    /// A vertex where `b` meets other cells but `a` does not.
    DegenerateB,
    /// Neither `a` nor `b` owns the point: an intervening cell does.
    Unresolved(CellId),
}

/// Classify `point` as a crossing between the cells of `cell_a` and `cell_b`.
///
/// Neighbours are requested two at a time, doubling up to
/// `settings.max_neighbors`, for as long as every returned neighbour is still
/// tied and the outcome is open.
pub fn classify<O: SpatialOracle + ?Sized>(
    oracle: &O,
    point: &Point3,
    cell_a: CellId,
    cell_b: CellId,
    settings: &ClassifierSettings,
) -> std::result::Result<Boundary, OracleError> {
    let cap = settings.max_neighbors.max(2);
    let mut k = 2;

    loop {
        let hits = oracle.k_nearest(point, k)?;
        let Some(closest) = hits.first() else {
            return Err(OracleError::EmptyCloud);
        };

        let tied = hits
            .iter()
            .take_while(|n| n.dist_sq - closest.dist_sq <= settings.tolerance)
            .count();
        let has_a = hits[..tied].iter().any(|n| n.cell == cell_a);
        let has_b = hits[..tied].iter().any(|n| n.cell == cell_b);

        // The tied set may extend past this query only if every hit was tied.
        let open = tied == hits.len() && hits.len() == k && k < cap;
        if (has_a && has_b) || !open {
            let others = tied - usize::from(has_a) - usize::from(has_b);
            return Ok(resolve(has_a, has_b, others, closest.cell));
        }

        k = (k * 2).min(cap);
    }
}

fn resolve(has_a: bool, has_b: bool, others: usize, nearest: CellId) -> Boundary {
    match (has_a, has_b) {
        (true, true) => Boundary::TwoCellEdge,
        (true, false) if others > 0 => Boundary::DegenerateA,
        (false, true) if others > 0 => Boundary::DegenerateB,
        // One of the pair is strictly nearest; the other fell just outside
        // the tolerance through rounding of the split distance.
        (true, false) | (false, true) => Boundary::TwoCellEdge,
        (false, false) => Boundary::Unresolved(nearest),
    }
}
