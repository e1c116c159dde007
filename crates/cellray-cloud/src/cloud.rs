//! Generator point cloud backed by a kd-tree.

use cellray_math::{BoundingBox, Point3};
use kiddo::{ImmutableKdTree, SquaredEuclidean};
use tracing::{debug, info};

use crate::error::{OracleError, Result};
use crate::oracle::{CellId, Neighbor, SpatialOracle};

/// Fraction of the subbox extent kept around it when filtering generators.
///
/// Cells near the edge of the sampled region are shaped by generators just
/// outside it, so those have to survive ingestion too.
pub const BOX_PAD: f64 = 0.15;

/// Generator points, their field values and a kd-tree over the points.
///
/// The cloud is loaded first and indexed with [`build`](PointCloud::build);
/// queries fail with [`OracleError::NotBuilt`] until then. Once built the
/// cloud is never mutated, so a shared reference can be handed to any number
/// of worker threads.
pub struct PointCloud {
    points: Vec<Point3>,
    values: Vec<f64>,
    subbox: BoundingBox,
    tree: Option<ImmutableKdTree<f64, 3>>,
}

impl std::fmt::Debug for PointCloud {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointCloud")
            .field("npart", &self.points.len())
            .field("subbox", &self.subbox)
            .field("built", &self.tree.is_some())
            .finish()
    }
}

impl PointCloud {
    /// Load generators, keeping those inside `subbox` padded by [`BOX_PAD`].
    ///
    /// `subbox` itself is recorded as the domain that drivers check their
    /// sampling extents against.
    pub fn load(positions: &[Point3], values: &[f64], subbox: BoundingBox) -> Result<Self> {
        check_lengths(positions, values)?;

        let frame = subbox.padded(BOX_PAD);
        let (points, values): (Vec<Point3>, Vec<f64>) = positions
            .iter()
            .zip(values)
            .filter(|(p, _)| frame.contains_point(p))
            .map(|(p, v)| (*p, *v))
            .unzip();

        info!(
            npart_in = positions.len(),
            npart = points.len(),
            "Loaded point cloud"
        );

        Ok(Self {
            points,
            values,
            subbox,
            tree: None,
        })
    }

    /// Load every generator, using their own extent as the domain.
    pub fn load_unbounded(positions: &[Point3], values: &[f64]) -> Result<Self> {
        check_lengths(positions, values)?;
        let subbox = BoundingBox::from_points(positions).ok_or(OracleError::EmptyCloud)?;
        Self::load(positions, values, subbox)
    }

    /// Build the kd-tree, after which the cloud answers queries.
    pub fn build(&mut self) -> Result<()> {
        if self.points.is_empty() {
            return Err(OracleError::EmptyCloud);
        }

        let coords: Vec<[f64; 3]> = self.points.iter().map(|p| [p.x, p.y, p.z]).collect();
        self.tree = Some(ImmutableKdTree::new_from_slice(&coords));

        debug!(npart = self.points.len(), "Built kd-tree");
        Ok(())
    }

    /// Load and build in one step.
    pub fn build_from(positions: &[Point3], values: &[f64], subbox: BoundingBox) -> Result<Self> {
        let mut cloud = Self::load(positions, values, subbox)?;
        cloud.build()?;
        Ok(cloud)
    }

    /// Generator coordinates, indexed by cell id.
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Field values, indexed by cell id.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    fn tree(&self) -> Result<&ImmutableKdTree<f64, 3>> {
        self.tree.as_ref().ok_or(OracleError::NotBuilt)
    }
}

fn check_lengths(positions: &[Point3], values: &[f64]) -> Result<()> {
    if positions.len() != values.len() {
        return Err(OracleError::LengthMismatch {
            positions: positions.len(),
            values: values.len(),
        });
    }
    Ok(())
}

impl SpatialOracle for PointCloud {
    fn is_built(&self) -> bool {
        self.tree.is_some()
    }

    fn bounding_box(&self) -> &BoundingBox {
        &self.subbox
    }

    fn len(&self) -> usize {
        self.points.len()
    }

    fn nearest(&self, point: &Point3) -> Result<CellId> {
        let nearest = self
            .tree()?
            .nearest_one::<SquaredEuclidean>(&[point.x, point.y, point.z]);
        Ok(nearest.item as CellId)
    }

    fn k_nearest(&self, point: &Point3, k: usize) -> Result<Vec<Neighbor>> {
        let tree = self.tree()?;
        if k == 0 {
            return Ok(Vec::new());
        }
        Ok(tree
            .nearest_n::<SquaredEuclidean>(&[point.x, point.y, point.z], k)
            .into_iter()
            .map(|n| Neighbor {
                cell: n.item as CellId,
                dist_sq: n.distance,
            })
            .collect())
    }

    fn field_value(&self, cell: CellId) -> f64 {
        self.values[cell]
    }

    fn position(&self, cell: CellId) -> Point3 {
        self.points[cell]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_box() -> BoundingBox {
        BoundingBox::from_array([0.0, 1.0, 0.0, 1.0, 0.0, 1.0])
    }

    fn corners() -> (Vec<Point3>, Vec<f64>) {
        let points = vec![
            Point3::new(0.1, 0.1, 0.1),
            Point3::new(0.9, 0.1, 0.1),
            Point3::new(0.1, 0.9, 0.1),
            Point3::new(0.1, 0.1, 0.9),
        ];
        (points, vec![1.0, 2.0, 3.0, 4.0])
    }

    #[test]
    fn test_length_mismatch() {
        let (points, _) = corners();
        let err = PointCloud::load(&points, &[1.0], unit_box()).unwrap_err();
        assert_eq!(
            err,
            OracleError::LengthMismatch {
                positions: 4,
                values: 1
            }
        );
    }

    #[test]
    fn test_load_applies_padded_box() {
        let points = vec![
            Point3::new(0.5, 0.5, 0.5),
            // Inside the 15% pad.
            Point3::new(1.1, 0.5, 0.5),
            // Outside the pad.
            Point3::new(1.2, 0.5, 0.5),
            Point3::new(0.5, -0.5, 0.5),
        ];
        let cloud = PointCloud::load(&points, &[1.0, 2.0, 3.0, 4.0], unit_box()).unwrap();
        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud.values(), &[1.0, 2.0]);
        assert_eq!(cloud.bounding_box(), &unit_box());
        assert!(!cloud.is_built());
    }

    #[test]
    fn test_query_before_build() {
        let (points, values) = corners();
        let cloud = PointCloud::load(&points, &values, unit_box()).unwrap();
        let q = Point3::new(0.5, 0.5, 0.5);
        assert_eq!(cloud.nearest(&q), Err(OracleError::NotBuilt));
        assert_eq!(cloud.k_nearest(&q, 2), Err(OracleError::NotBuilt));
    }

    #[test]
    fn test_build_empty_cloud() {
        let mut cloud = PointCloud::load(&[], &[], unit_box()).unwrap();
        assert_eq!(cloud.build(), Err(OracleError::EmptyCloud));
        assert!(!cloud.is_built());
    }

    #[test]
    fn test_load_unbounded_empty() {
        assert_eq!(
            PointCloud::load_unbounded(&[], &[]).unwrap_err(),
            OracleError::EmptyCloud
        );
    }

    #[test]
    fn test_nearest() {
        let (points, values) = corners();
        let cloud = PointCloud::build_from(&points, &values, unit_box()).unwrap();
        assert!(cloud.is_built());
        assert_eq!(cloud.nearest(&Point3::new(0.8, 0.2, 0.0)).unwrap(), 1);
        assert_eq!(cloud.nearest(&Point3::new(0.0, 0.0, 1.0)).unwrap(), 3);
        assert_eq!(cloud.field_value(2), 3.0);
        assert_eq!(cloud.position(1), Point3::new(0.9, 0.1, 0.1));
    }

    #[test]
    fn test_k_nearest_sorted_with_squared_distances() {
        let (points, values) = corners();
        let cloud = PointCloud::build_from(&points, &values, unit_box()).unwrap();
        let hits = cloud.k_nearest(&Point3::new(0.1, 0.1, 0.1), 3).unwrap();
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].cell, 0);
        assert_relative_eq!(hits[0].dist_sq, 0.0);
        assert_relative_eq!(hits[1].dist_sq, 0.64, epsilon = 1e-12);
        assert!(hits.windows(2).all(|w| w[0].dist_sq <= w[1].dist_sq));
    }

    #[test]
    fn test_build_regular_lattice() {
        // 64 generators share every lattice coordinate on every axis.
        let n = 8;
        let site = |c: usize| (c as f64 + 0.5) / n as f64;
        let mut points = Vec::new();
        for i in 0..n {
            for j in 0..n {
                for k in 0..n {
                    points.push(Point3::new(site(i), site(j), site(k)));
                }
            }
        }
        let values: Vec<f64> = (0..points.len()).map(|i| i as f64).collect();
        let cloud = PointCloud::build_from(&points, &values, unit_box()).unwrap();
        assert_eq!(cloud.len(), 512);

        assert_eq!(cloud.nearest(&Point3::new(0.30, 0.55, 0.80)).unwrap(), 2 * 64 + 4 * 8 + 6);
        assert_eq!(cloud.nearest(&points[300]).unwrap(), 300);

        let hits = cloud.k_nearest(&points[0], 4).unwrap();
        assert_eq!(hits[0].cell, 0);
        assert_relative_eq!(hits[1].dist_sq, 1.0 / 64.0, epsilon = 1e-12);
        assert_relative_eq!(hits[3].dist_sq, 1.0 / 64.0, epsilon = 1e-12);
    }

    #[test]
    fn test_k_nearest_larger_than_cloud() {
        let (points, values) = corners();
        let cloud = PointCloud::build_from(&points, &values, unit_box()).unwrap();
        let hits = cloud.k_nearest(&Point3::new(0.5, 0.5, 0.5), 8).unwrap();
        assert_eq!(hits.len(), 4);
        assert!(cloud.k_nearest(&Point3::origin(), 0).unwrap().is_empty());
    }
}
