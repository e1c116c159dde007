//! Dense output buffers and their plain-text form.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::error::{Result, SampleError};

/// Row-major grid of sampled values, empty until a run produces it.
#[derive(Debug, Clone, Default)]
pub struct SampleBuffer {
    shape: Vec<usize>,
    values: Option<Vec<f64>>,
}

impl SampleBuffer {
    /// An unproduced buffer for a grid of the given shape.
    pub fn new(shape: Vec<usize>) -> Self {
        Self {
            shape,
            values: None,
        }
    }

    /// Grid dimensions, outermost first.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Whether a run has stored its output.
    pub fn is_produced(&self) -> bool {
        self.values.is_some()
    }

    /// The sampled values in row-major order.
    pub fn values(&self) -> Result<&[f64]> {
        self.values.as_deref().ok_or(SampleError::NotProduced)
    }

    /// Value at a multi-dimensional grid index.
    pub fn get(&self, index: &[usize]) -> Result<Option<f64>> {
        let values = self.values()?;
        if index.len() != self.shape.len() || index.iter().zip(&self.shape).any(|(i, n)| i >= n) {
            return Ok(None);
        }
        let flat = index
            .iter()
            .zip(&self.shape)
            .fold(0, |acc, (i, n)| acc * n + i);
        Ok(values.get(flat).copied())
    }

    pub(crate) fn clear(&mut self) {
        self.values = None;
    }

    pub(crate) fn store(&mut self, values: Vec<f64>) {
        self.values = Some(values);
    }

    /// Write one value per line to `path`.
    ///
    /// Nothing is created on disk when the buffer has not been produced.
    pub fn write_text(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let values = self.values()?;

        let io_err = |source: std::io::Error| SampleError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).map_err(io_err)?;
        let mut out = BufWriter::new(file);
        for v in values {
            writeln!(out, "{v}").map_err(io_err)?;
        }
        out.flush().map_err(io_err)?;

        info!(path = %path.display(), count = values.len(), "Saved samples");
        Ok(())
    }
}
