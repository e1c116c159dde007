//! Run configuration loaded from TOML.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use cellray_math::BoundingBox;
use cellray_sample::{GridSpec, ScheduleSettings};
use cellray_trace::TraceSettings;
use serde::Deserialize;

/// Everything a run needs besides the points themselves.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Region of interest `[xmin, xmax, ymin, ymax, zmin, zmax]`.
    /// Defaults to the bounds of the loaded points.
    pub domain: Option<BoundingBox>,
    pub trace: TraceSettings,
    pub schedule: ScheduleSettings,
    pub slice: Option<SliceConfig>,
    pub brute: Option<BruteConfig>,
    pub projection: Option<ProjectionConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SliceConfig {
    pub npix: [usize; 2],
    /// `[xmin, xmax, ymin, ymax]`
    pub extent: [f64; 4],
    pub depth: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BruteConfig {
    pub npix: [usize; 3],
    pub extent: BoundingBox,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionConfig {
    /// Rays along z through a lattice spanning `extent`.
    AxisAligned {
        npix: [usize; 2],
        extent: BoundingBox,
    },
    /// Rays through a rotated grid.
    Grid(GridSpec),
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("failed to parse config {}", path.display()))
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellray_sample::{AxisPair, Orientation};

    #[test]
    fn test_empty_config() {
        let config: RunConfig = toml::from_str("").unwrap();
        assert!(config.domain.is_none());
        assert_eq!(config.schedule.chunk_size, 256);
        assert!(config.slice.is_none());
    }

    #[test]
    fn test_full_config() {
        let config: RunConfig = toml::from_str(
            r#"
            domain = [0.0, 1.0, 0.0, 1.0, 0.0, 1.0]

            [trace]
            max_steps = 100

            [slice]
            npix = [64, 32]
            extent = [0.0, 1.0, 0.0, 0.5]
            depth = 0.5

            [brute]
            npix = [8, 8, 100]
            extent = [0.1, 0.9, 0.1, 0.9, 0.0, 1.0]

            [projection.grid]
            extent = [[0.0, 1.0], [0.0, 1.0]]
            nres = [16, 16]
            bounds = [0.0, 1.0]
            center = [0.5, 0.5, 0.5]
            orientation = { axes = "xz" }
            "#,
        )
        .unwrap();
        assert_eq!(config.domain.unwrap().max.z, 1.0);
        assert_eq!(config.trace.max_steps, 100);
        assert_eq!(config.slice.unwrap().npix, [64, 32]);
        assert_eq!(config.brute.unwrap().extent.min.x, 0.1);
        match config.projection {
            Some(ProjectionConfig::Grid(spec)) => {
                assert_eq!(spec.orientation, Orientation::Axes(AxisPair::Xz));
            }
            other => panic!("unexpected projection config {other:?}"),
        }
    }

    #[test]
    fn test_axis_aligned_projection() {
        let config: RunConfig = toml::from_str(
            r#"
            [projection.axis_aligned]
            npix = [4, 4]
            extent = [0.0, 1.0, 0.0, 1.0, 0.0, 1.0]
            "#,
        )
        .unwrap();
        assert!(matches!(
            config.projection,
            Some(ProjectionConfig::AxisAligned { npix: [4, 4], .. })
        ));
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(toml::from_str::<RunConfig>("chunk = 3").is_err());
    }
}
