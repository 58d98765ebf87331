//! Sparse n-gram rows joined with dense numeric columns.

use anyhow::{anyhow, Result};
use ndarray::{s, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Compressed sparse row matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseMatrix {
    n_cols: usize,
    indptr: Vec<usize>,
    indices: Vec<usize>,
    data: Vec<f64>,
}

impl SparseMatrix {
    /// Build from per-row `(column, value)` pairs. Columns must be below `n_cols`.
    pub fn from_rows(n_cols: usize, rows: Vec<Vec<(usize, f64)>>) -> Result<Self> {
        let mut indptr = Vec::with_capacity(rows.len() + 1);
        let mut indices = Vec::new();
        let mut data = Vec::new();
        indptr.push(0);
        for mut row in rows {
            row.sort_by_key(|(col, _)| *col);
            for (col, value) in row {
                if col >= n_cols {
                    return Err(anyhow!("column {col} out of range for width {n_cols}"));
                }
                indices.push(col);
                data.push(value);
            }
            indptr.push(indices.len());
        }
        Ok(Self {
            n_cols,
            indptr,
            indices,
            data,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.indptr.len() - 1
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    /// Column indices and values stored for `row`.
    pub fn row(&self, row: usize) -> (&[usize], &[f64]) {
        let range = self.indptr[row]..self.indptr[row + 1];
        (&self.indices[range.clone()], &self.data[range])
    }

    pub fn select_rows(&self, rows: &[usize]) -> Self {
        let mut indptr = Vec::with_capacity(rows.len() + 1);
        let mut indices = Vec::new();
        let mut data = Vec::new();
        indptr.push(0);
        for &row in rows {
            let (cols, values) = self.row(row);
            indices.extend_from_slice(cols);
            data.extend_from_slice(values);
            indptr.push(indices.len());
        }
        Self {
            n_cols: self.n_cols,
            indptr,
            indices,
            data,
        }
    }

    pub fn to_dense(&self) -> Array2<f64> {
        let mut dense = Array2::zeros((self.n_rows(), self.n_cols));
        for row in 0..self.n_rows() {
            let (cols, values) = self.row(row);
            for (&col, &value) in cols.iter().zip(values) {
                dense[[row, col]] = value;
            }
        }
        dense
    }
}

/// Combined feature matrix: n-gram block first, then the scaled numeric block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureMatrix {
    pub ngrams: SparseMatrix,
    pub numeric: Array2<f64>,
}

impl FeatureMatrix {
    pub fn new(ngrams: SparseMatrix, numeric: Array2<f64>) -> Result<Self> {
        if ngrams.n_rows() != numeric.nrows() {
            return Err(anyhow!(
                "n-gram block has {} rows but numeric block has {}",
                ngrams.n_rows(),
                numeric.nrows()
            ));
        }
        Ok(Self { ngrams, numeric })
    }

    pub fn n_rows(&self) -> usize {
        self.numeric.nrows()
    }

    pub fn n_cols(&self) -> usize {
        self.ngrams.n_cols() + self.numeric.ncols()
    }

    pub fn select_rows(&self, rows: &[usize]) -> Self {
        Self {
            ngrams: self.ngrams.select_rows(rows),
            numeric: self.numeric.select(Axis(0), rows),
        }
    }

    /// `self · weights` without densifying the n-gram block.
    pub fn dot(&self, weights: &Array2<f64>) -> Array2<f64> {
        let vocab = self.ngrams.n_cols();
        let mut out = self.numeric.dot(&weights.slice(s![vocab.., ..]));
        for row in 0..self.n_rows() {
            let (cols, values) = self.ngrams.row(row);
            let mut target = out.row_mut(row);
            for (&col, &value) in cols.iter().zip(values) {
                target.scaled_add(value, &weights.row(col));
            }
        }
        out
    }

    /// `selfᵀ · rhs`, the shape of a first-layer weight gradient.
    pub fn t_dot(&self, rhs: &Array2<f64>) -> Array2<f64> {
        let vocab = self.ngrams.n_cols();
        let mut out = Array2::zeros((self.n_cols(), rhs.ncols()));
        for row in 0..self.n_rows() {
            let (cols, values) = self.ngrams.row(row);
            for (&col, &value) in cols.iter().zip(values) {
                out.row_mut(col).scaled_add(value, &rhs.row(row));
            }
        }
        out.slice_mut(s![vocab.., ..])
            .assign(&self.numeric.t().dot(rhs));
        out
    }

    /// Dense rows: n-gram weights followed by numeric columns.
    pub fn to_dense(&self) -> Array2<f64> {
        let mut dense = Array2::zeros((self.n_rows(), self.n_cols()));
        let vocab = self.ngrams.n_cols();
        dense
            .slice_mut(s![.., ..vocab])
            .assign(&self.ngrams.to_dense());
        dense.slice_mut(s![.., vocab..]).assign(&self.numeric);
        dense
    }
}
