#![warn(missing_docs)]

//! Math types for the cellray point-cloud tracer.
//!
//! Thin wrappers around nalgebra providing the types shared by the oracle,
//! the ray engine and the sampling drivers: points, directions, axes, pivot
//! rotations and axis-aligned bounding boxes.

use std::fmt;

use nalgebra::{Rotation3, Unit, Vector3};
use serde::{Deserialize, Serialize};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A Cartesian axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// The x axis.
    X,
    /// The y axis.
    Y,
    /// The z axis.
    Z,
}

impl Axis {
    /// All three axes in index order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Component index of this axis (0, 1 or 2).
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        };
        f.write_str(name)
    }
}

/// A rigid rotation about a fixed pivot point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PivotRotation {
    rotation: Rotation3<f64>,
    pivot: Point3,
}

impl PivotRotation {
    /// Tait-Bryan rotation `Rz(yaw) * Ry(pitch) * Rx(roll)` about `pivot`.
    ///
    /// Roll is applied first, yaw last. Angles are in radians.
    pub fn yaw_pitch_roll(yaw: f64, pitch: f64, roll: f64, pivot: Point3) -> Self {
        Self {
            rotation: Rotation3::from_euler_angles(roll, pitch, yaw),
            pivot,
        }
    }

    /// Rotate a point about the pivot.
    pub fn apply(&self, p: &Point3) -> Point3 {
        self.pivot + self.rotation * (p - self.pivot)
    }
}

/// Axis-aligned bounding box in 3D.
///
/// Serialized as the flat `[xmin, xmax, ymin, ymax, zmin, zmax]` array used
/// throughout the sampling interfaces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 6]", into = "[f64; 6]")]
pub struct BoundingBox {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl BoundingBox {
    /// Create a box from min and max corners.
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Create a box from `[xmin, xmax, ymin, ymax, zmin, zmax]`.
    pub fn from_array(e: [f64; 6]) -> Self {
        Self {
            min: Point3::new(e[0], e[2], e[4]),
            max: Point3::new(e[1], e[3], e[5]),
        }
    }

    /// Flatten to `[xmin, xmax, ymin, ymax, zmin, zmax]`.
    pub fn to_array(&self) -> [f64; 6] {
        [
            self.min.x, self.max.x, self.min.y, self.max.y, self.min.z, self.max.z,
        ]
    }

    /// Create an empty (inverted) box suitable for expansion.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Smallest box containing every point, or `None` for an empty slice.
    pub fn from_points(points: &[Point3]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut bbox = Self::empty();
        for p in points {
            bbox.include_point(p);
        }
        Some(bbox)
    }

    /// Expand this box to include a point.
    pub fn include_point(&mut self, p: &Point3) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    /// Lower and upper bound along one axis.
    pub fn range(&self, axis: Axis) -> (f64, f64) {
        let i = axis.index();
        (self.min[i], self.max[i])
    }

    /// Grow every side by `fraction` of the box extent along that axis.
    pub fn padded(&self, fraction: f64) -> Self {
        let pad = (self.max - self.min) * fraction;
        Self {
            min: self.min - pad,
            max: self.max + pad,
        }
    }

    /// Test if a point lies inside the box (boundary inclusive).
    pub fn contains_point(&self, p: &Point3) -> bool {
        Axis::ALL.iter().all(|&axis| {
            let (lo, hi) = self.range(axis);
            let v = p[axis.index()];
            v >= lo && v <= hi
        })
    }

    /// First axis along which `other` sticks out of this box, if any.
    pub fn first_violation(&self, other: &BoundingBox) -> Option<Axis> {
        Axis::ALL.into_iter().find(|&axis| {
            let (lo, hi) = self.range(axis);
            let (olo, ohi) = other.range(axis);
            olo < lo || ohi > hi
        })
    }

    /// Test if `other` lies entirely inside this box.
    pub fn contains_box(&self, other: &BoundingBox) -> bool {
        self.first_violation(other).is_none()
    }
}

impl From<[f64; 6]> for BoundingBox {
    fn from(e: [f64; 6]) -> Self {
        Self::from_array(e)
    }
}

impl From<BoundingBox> for [f64; 6] {
    fn from(b: BoundingBox) -> Self {
        b.to_array()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_yaw_pitch_roll_order() {
        // Roll first leaves a point on x alone, then pitch 90 about y sends it to -z.
        let r = PivotRotation::yaw_pitch_roll(0.0, PI / 2.0, PI / 2.0, Point3::origin());
        let p = r.apply(&Point3::new(1.0, 0.0, 0.0));
        assert!((p - Point3::new(0.0, 0.0, -1.0)).norm() < 1e-12);
    }

    #[test]
    fn test_yaw_turns_x_into_y() {
        let r = PivotRotation::yaw_pitch_roll(PI / 2.0, 0.0, 0.0, Point3::origin());
        let p = r.apply(&Point3::new(2.0, 0.0, 3.0));
        assert!((p - Point3::new(0.0, 2.0, 3.0)).norm() < 1e-12);
    }

    #[test]
    fn test_rotation_keeps_pivot_fixed() {
        let pivot = Point3::new(1.0, 1.0, 0.0);
        let r = PivotRotation::yaw_pitch_roll(PI, 0.0, 0.0, pivot);
        let p = r.apply(&Point3::new(2.0, 1.0, 5.0));
        assert!((p - Point3::new(0.0, 1.0, 5.0)).norm() < 1e-12);
        assert!((r.apply(&pivot) - pivot).norm() < 1e-12);
    }

    #[test]
    fn test_bbox_array_layout() {
        let b = BoundingBox::from_array([0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(b.min, Point3::new(0.0, 2.0, 4.0));
        assert_eq!(b.max, Point3::new(1.0, 3.0, 5.0));
        assert_eq!(b.to_array(), [0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(b.range(Axis::Y), (2.0, 3.0));
    }

    #[test]
    fn test_bbox_from_points() {
        assert!(BoundingBox::from_points(&[]).is_none());
        let b = BoundingBox::from_points(&[
            Point3::new(1.0, -2.0, 0.5),
            Point3::new(-1.0, 4.0, 0.0),
        ])
        .unwrap();
        assert_eq!(b.to_array(), [-1.0, 1.0, -2.0, 4.0, 0.0, 0.5]);
    }

    #[test]
    fn test_bbox_containment() {
        let outer = BoundingBox::from_array([0.0, 1.0, 0.0, 1.0, 0.0, 1.0]);
        let inner = BoundingBox::from_array([0.2, 0.8, 0.0, 1.0, 0.1, 0.9]);
        assert!(outer.contains_box(&inner));
        assert!(outer.contains_box(&outer));

        let sticks_out = BoundingBox::from_array([0.2, 0.8, 0.0, 1.0, 0.1, 1.5]);
        assert_eq!(outer.first_violation(&sticks_out), Some(Axis::Z));

        assert!(outer.contains_point(&Point3::new(1.0, 0.0, 0.5)));
        assert!(!outer.contains_point(&Point3::new(1.0, -1e-9, 0.5)));
    }

    #[test]
    fn test_bbox_padded() {
        let b = BoundingBox::from_array([0.0, 10.0, -1.0, 1.0, 2.0, 2.0]);
        let p = b.padded(0.15);
        assert!((p.min.x + 1.5).abs() < 1e-12);
        assert!((p.max.x - 11.5).abs() < 1e-12);
        assert!((p.min.y + 1.3).abs() < 1e-12);
        assert_eq!(p.min.z, 2.0);
        assert_eq!(p.max.z, 2.0);
    }
}
