//! Point files: one `x y z value` generator per line.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use cellray_math::Point3;

/// Generators read from a point file.
#[derive(Debug, Default)]
pub struct Generators {
    pub positions: Vec<Point3>,
    pub values: Vec<f64>,
}

/// Read a whitespace-separated point file. Blank lines and `#` comments are
/// skipped.
pub fn read_points(path: &Path) -> Result<Generators> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read points from {}", path.display()))?;
    parse_points(&text).with_context(|| format!("in {}", path.display()))
}

pub fn parse_points(text: &str) -> Result<Generators> {
    let mut out = Generators::default();
    for (n, line) in text.lines().enumerate() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let fields = line
            .split_whitespace()
            .map(|f| f.parse::<f64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .with_context(|| format!("line {}: bad number", n + 1))?;
        let &[x, y, z, value] = fields.as_slice() else {
            bail!("line {}: expected 4 columns, found {}", n + 1, fields.len());
        };
        out.positions.push(Point3::new(x, y, z));
        out.values.push(value);
    }
    Ok(out)
}

/// Parse `x,y,z` into a point.
pub fn parse_point(s: &str) -> Result<Point3, String> {
    let coords = s
        .split(',')
        .map(|c| c.trim().parse::<f64>().map_err(|e| format!("{c:?}: {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    match coords.as_slice() {
        &[x, y, z] => Ok(Point3::new(x, y, z)),
        _ => Err(format!("expected x,y,z, got {s:?}")),
    }
}
