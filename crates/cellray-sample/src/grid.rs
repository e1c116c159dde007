//! Start and end points for rotated projection grids.
//!
//! A grid is laid down in the x/y plane and pushed to `z = bounds[0]` for the
//! ray starts and `z = bounds[1]` for the ray ends. Both grids are then
//! rotated about a center, which points the line of sight in any direction.

use std::f64::consts::PI;

use cellray_math::{PivotRotation, Point3};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SampleError};
use crate::{check_npix, check_range};

/// A named Cartesian projection: image axes, then implied line of sight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisPair {
    /// Image x along x, image y along y. Right-handed.
    Xy,
    /// Image x along y, image y along z. Right-handed.
    Yz,
    /// Image x along z, image y along x. Right-handed.
    Zx,
    /// Image x along y, image y along x. Left-handed.
    Yx,
    /// Image x along x, image y along z. Left-handed.
    Xz,
    /// Image x along z, image y along y. Left-handed.
    Zy,
}

impl AxisPair {
    /// Yaw, pitch, roll and handedness (`1.0` right, `-1.0` left).
    pub fn angles(self) -> (f64, f64, f64, f64) {
        match self {
            AxisPair::Xy => (0.0, 0.0, 0.0, 1.0),
            AxisPair::Yz => (PI / 2.0, 0.0, PI / 2.0, 1.0),
            AxisPair::Zx => (3.0 * PI / 2.0, 3.0 * PI / 2.0, 0.0, 1.0),
            AxisPair::Yx => (PI / 2.0, 0.0, PI, -1.0),
            AxisPair::Xz => (0.0, 0.0, PI / 2.0, -1.0),
            AxisPair::Zy => (0.0, 3.0 * PI / 2.0, 0.0, -1.0),
        }
    }
}

/// How the base grid is rotated about the center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// One of the six Cartesian projections.
    Axes(AxisPair),
    /// Arbitrary Tait-Bryan angles in radians.
    Angles {
        /// Rotation about z, applied last.
        yaw: f64,
        /// Rotation about y.
        pitch: f64,
        /// Rotation about x, applied first.
        roll: f64,
    },
}

impl Default for Orientation {
    fn default() -> Self {
        Orientation::Angles {
            yaw: 0.0,
            pitch: 0.0,
            roll: 0.0,
        }
    }
}

/// Layout of a projection grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    /// `[[xmin, xmax], [ymin, ymax]]` of the base grid.
    pub extent: [[f64; 2]; 2],
    /// Pixels along each image axis.
    pub nres: [usize; 2],
    /// Start and end z of every ray before rotation.
    pub bounds: [f64; 2],
    /// Rotation center; no rotation is applied without one.
    #[serde(default)]
    pub center: Option<[f64; 3]>,
    /// Rotation to apply.
    #[serde(default)]
    pub orientation: Orientation,
}

/// Ray starts and ends for every pixel of `spec`, row-major.
///
/// Pixel `(i, j)` sits at the center of its cell:
/// `x = xmin + (i + 0.5) * (xmax - xmin) / nres[0]`, likewise for y.
pub fn projection_grid(spec: &GridSpec) -> Result<(Vec<Point3>, Vec<Point3>)> {
    check_npix(&spec.nres)?;
    let [[x0, x1], [y0, y1]] = spec.extent;
    check_range("grid x", x0, x1)?;
    check_range("grid y", y0, y1)?;

    let mut bounds = spec.bounds;
    if !(bounds[0].is_finite() && bounds[1].is_finite()) || bounds[0] == bounds[1] {
        return Err(SampleError::InvalidSettings(format!(
            "projection bounds {bounds:?} must be finite and distinct"
        )));
    }
    let direction = (bounds[1] - bounds[0]).signum();

    let (yaw, pitch, roll, hand) = match spec.orientation {
        Orientation::Axes(pair) => pair.angles(),
        Orientation::Angles { yaw, pitch, roll } => (yaw, pitch, roll, direction),
    };
    // Keep the line of sight consistent with the projection's handedness.
    if hand != direction {
        bounds.swap(0, 1);
    }

    let [nx, ny] = spec.nres;
    let dx = (x1 - x0) / nx as f64;
    let dy = (y1 - y0) / ny as f64;

    let mut starts = Vec::with_capacity(nx * ny);
    let mut ends = Vec::with_capacity(nx * ny);
    for i in 0..nx {
        for j in 0..ny {
            let x = x0 + dx * (i as f64 + 0.5);
            let y = y0 + dy * (j as f64 + 0.5);
            starts.push(Point3::new(x, y, bounds[0]));
            ends.push(Point3::new(x, y, bounds[1]));
        }
    }

    if let Some([cx, cy, cz]) = spec.center {
        let rotation = PivotRotation::yaw_pitch_roll(yaw, pitch, roll, Point3::new(cx, cy, cz));
        for p in starts.iter_mut().chain(ends.iter_mut()) {
            *p = rotation.apply(p);
        }
    }

    Ok((starts, ends))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(orientation: Orientation, center: Option<[f64; 3]>) -> GridSpec {
        GridSpec {
            extent: [[0.0, 1.0], [0.0, 1.0]],
            nres: [2, 2],
            bounds: [0.0, 1.0],
            center,
            orientation,
        }
    }

    fn close(a: &Point3, b: [f64; 3]) -> bool {
        (a - Point3::new(b[0], b[1], b[2])).norm() < 1e-12
    }

    #[test]
    fn test_base_grid_pixel_centers() {
        let (starts, ends) = projection_grid(&spec(Orientation::default(), None)).unwrap();
        assert_eq!(starts.len(), 4);
        assert!(close(&starts[0], [0.25, 0.25, 0.0]));
        assert!(close(&starts[1], [0.25, 0.75, 0.0]));
        assert!(close(&starts[2], [0.75, 0.25, 0.0]));
        assert!(close(&ends[3], [0.75, 0.75, 1.0]));
    }

    #[test]
    fn test_base_grid_offset_extent() {
        let mut s = spec(Orientation::default(), None);
        s.extent = [[2.0, 4.0], [-1.0, 1.0]];
        s.nres = [1, 2];
        let (starts, _) = projection_grid(&s).unwrap();
        assert!(close(&starts[0], [3.0, -0.5, 0.0]));
        assert!(close(&starts[1], [3.0, 0.5, 0.0]));
    }

    #[test]
    fn test_yz_projection_looks_along_x() {
        let s = spec(Orientation::Axes(AxisPair::Yz), Some([0.5, 0.5, 0.5]));
        let (starts, ends) = projection_grid(&s).unwrap();
        assert!(close(&starts[0], [0.0, 0.25, 0.25]));
        assert!(close(&ends[0], [1.0, 0.25, 0.25]));
    }

    #[test]
    fn test_left_handed_projection_flips_bounds() {
        let s = spec(Orientation::Axes(AxisPair::Yx), Some([0.5, 0.5, 0.5]));
        let (starts, ends) = projection_grid(&s).unwrap();
        // Image axes swap, and the rays still run towards +z.
        assert!(close(&starts[1], [0.75, 0.25, 0.0]));
        assert!(close(&ends[1], [0.75, 0.25, 1.0]));
    }

    #[test]
    fn test_zx_projection_looks_along_y() {
        let s = spec(Orientation::Axes(AxisPair::Zx), Some([0.5, 0.5, 0.5]));
        let (starts, ends) = projection_grid(&s).unwrap();
        // Image x runs along z, image y along x.
        assert!(close(&starts[0], [0.25, 0.0, 0.25]));
        assert!(close(&ends[0], [0.25, 1.0, 0.25]));
        assert!(close(&starts[1], [0.75, 0.0, 0.25]));
    }

    #[test]
    fn test_yaw_rotates_grid_about_center() {
        let orientation = Orientation::Angles {
            yaw: PI / 2.0,
            pitch: 0.0,
            roll: 0.0,
        };
        let (starts, ends) = projection_grid(&spec(orientation, Some([0.5, 0.5, 0.5]))).unwrap();
        assert!(close(&starts[0], [0.75, 0.25, 0.0]));
        assert!(close(&ends[0], [0.75, 0.25, 1.0]));
    }

    #[test]
    fn test_no_center_no_rotation() {
        let s = spec(Orientation::Axes(AxisPair::Yz), None);
        let (starts, _) = projection_grid(&s).unwrap();
        assert!(close(&starts[0], [0.25, 0.25, 0.0]));
    }

    #[test]
    fn test_invalid_bounds() {
        let mut s = spec(Orientation::default(), None);
        s.bounds = [0.5, 0.5];
        assert!(projection_grid(&s).is_err());
    }

    #[test]
    fn test_grid_from_toml() {
        let s: GridSpec = toml::from_str(
            r#"
            extent = [[0.0, 1.0], [0.0, 2.0]]
            nres = [4, 8]
            bounds = [0.0, 1.0]
            center = [0.5, 1.0, 0.5]
            orientation = { axes = "zx" }
            "#,
        )
        .unwrap();
        assert_eq!(s.orientation, Orientation::Axes(AxisPair::Zx));
        assert_eq!(s.center, Some([0.5, 1.0, 0.5]));
    }
}
