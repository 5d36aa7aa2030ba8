//! Dense lookup tables backing the latent factors and bias terms.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{RecommendError, Result};

/// Row-major `(rows, dim)` table of learned f32 parameters.
///
/// Each row is the latent vector (or scalar bias, with `dim == 1`) of one
/// indexed entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingTable {
    name: String,
    rows: usize,
    dim: usize,
    data: Vec<f32>,
}

impl EmbeddingTable {
    /// Table of zeros.
    #[must_use]
    pub fn zeros(name: &str, rows: usize, dim: usize) -> Self {
        Self {
            name: name.to_string(),
            rows,
            dim,
            data: vec![0.0; rows * dim],
        }
    }

    /// Table drawn from N(0, 1), the usual embedding initialization.
    pub fn standard_normal<R: Rng>(name: &str, rows: usize, dim: usize, rng: &mut R) -> Self {
        // Box-Muller transform
        let data = (0..rows * dim)
            .map(|_| {
                let u1: f32 = rng.gen_range(f32::EPSILON..1.0);
                let u2: f32 = rng.gen_range(0.0..1.0);
                (-2.0 * u1.ln()).sqrt() * (2.0 * std::f32::consts::PI * u2).cos()
            })
            .collect();
        Self {
            name: name.to_string(),
            rows,
            dim,
            data,
        }
    }

    /// Table from explicit row-major values.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `data.len() != rows * dim`.
    pub fn from_vec(name: &str, rows: usize, dim: usize, data: Vec<f32>) -> Result<Self> {
        if data.len() != rows * dim {
            return Err(RecommendError::invalid_input(format!(
                "{name}: expected {} values for a {rows}x{dim} table, got {}",
                rows * dim,
                data.len()
            )));
        }
        Ok(Self {
            name: name.to_string(),
            rows,
            dim,
            data,
        })
    }

    /// Table name used in error messages.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of rows (indexed entities).
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Row width.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Fails with `IndexOutOfRange` unless `index < rows`.
    pub fn check_index(&self, index: usize) -> Result<()> {
        if index < self.rows {
            Ok(())
        } else {
            Err(RecommendError::index_out_of_range(&self.name, index, self.rows))
        }
    }

    /// Row `index`.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if `index >= rows`.
    pub fn row(&self, index: usize) -> Result<&[f32]> {
        self.check_index(index)?;
        Ok(&self.data[index * self.dim..(index + 1) * self.dim])
    }

    /// All parameters, row-major.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// All parameters, row-major, mutable.
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }
}
