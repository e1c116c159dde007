#![warn(missing_docs)]

//! Nearest-neighbour oracle over generator point clouds.
//!
//! Each generator point owns the cell of space closer to it than to any other
//! generator. This crate never materializes those cells; it only answers the
//! nearest and k-nearest queries from which the ray engine discovers cell
//! boundaries on demand.
//!
//! # Example
//!
//! ```
//! use cellray_cloud::{PointCloud, SpatialOracle};
//! use cellray_math::{BoundingBox, Point3};
//!
//! let points = [Point3::new(0.25, 0.5, 0.5), Point3::new(0.75, 0.5, 0.5)];
//! let bbox = BoundingBox::from_array([0.0, 1.0, 0.0, 1.0, 0.0, 1.0]);
//! let cloud = PointCloud::build_from(&points, &[1.0, 2.0], bbox).unwrap();
//!
//! let cell = cloud.nearest(&Point3::new(0.9, 0.5, 0.5)).unwrap();
//! assert_eq!(cloud.field_value(cell), 2.0);
//! ```

mod cloud;
pub mod error;
mod oracle;

pub use cloud::{PointCloud, BOX_PAD};
pub use error::{OracleError, Result};
pub use oracle::{CellId, Neighbor, SpatialOracle};
