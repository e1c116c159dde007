//! The query contract the ray engine and sampling drivers consume.

use cellray_math::{BoundingBox, Point3};

use crate::error::Result;

/// Stable index of a generator point, and of the cell it owns.
pub type CellId = usize;

/// One result of a k-nearest query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Generator id.
    pub cell: CellId,
    /// Squared Euclidean distance from the query point.
    pub dist_sq: f64,
}

/// Read-only nearest-neighbour oracle over a set of generator points.
///
/// Implementations must be safe to query from many threads at once after
/// they report [`is_built`](SpatialOracle::is_built); nothing in this
/// workspace mutates an oracle while queries are in flight.
pub trait SpatialOracle {
    /// Whether the spatial index is ready for queries.
    fn is_built(&self) -> bool;

    /// Domain the generator points were filtered against.
    fn bounding_box(&self) -> &BoundingBox;

    /// Number of generator points.
    fn len(&self) -> usize;

    /// Whether the oracle holds no generator points.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Id of the generator nearest to `point`.
    fn nearest(&self, point: &Point3) -> Result<CellId>;

    /// The `k` generators nearest to `point`, ascending by squared distance.
    ///
    /// Returns fewer than `k` entries when the cloud is smaller than `k`.
    /// The order of equidistant generators is fixed for a given index.
    fn k_nearest(&self, point: &Point3, k: usize) -> Result<Vec<Neighbor>>;

    /// Scalar field value carried by a generator.
    fn field_value(&self, cell: CellId) -> f64;

    /// Coordinate of a generator.
    fn position(&self, cell: CellId) -> Point3;
}
