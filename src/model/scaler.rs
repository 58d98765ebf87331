//! Per-column min-max scaling to [0, 1].

use anyhow::{anyhow, Result};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Column minima and maxima learned from a fit set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    pub min: Array1<f64>,
    pub max: Array1<f64>,
}

impl MinMaxScaler {
    /// Learn column ranges from the given rows of `data`.
    pub fn fit(data: &Array2<f64>, rows: &[usize]) -> Result<Self> {
        if rows.is_empty() {
            return Err(anyhow!("cannot fit a scaler on zero rows"));
        }
        let subset = data.select(Axis(0), rows);
        let min = subset.fold_axis(Axis(0), f64::INFINITY, |&acc, &x| acc.min(x));
        let max = subset.fold_axis(Axis(0), f64::NEG_INFINITY, |&acc, &x| acc.max(x));
        Ok(Self { min, max })
    }

    /// `(x - min) / (max - min)`; a zero-range column maps to 0.
    pub fn transform(&self, data: &Array2<f64>) -> Array2<f64> {
        let mut out = data.clone();
        for (col, mut column) in out.axis_iter_mut(Axis(1)).enumerate() {
            let (lo, hi) = (self.min[col], self.max[col]);
            let range = hi - lo;
            if range == 0.0 {
                column.fill(0.0);
            } else {
                column.mapv_inplace(|x| (x - lo) / range);
            }
        }
        out
    }

    /// Columns whose fit range was zero.
    pub fn degenerate_columns(&self) -> Vec<usize> {
        (0..self.min.len())
            .filter(|&col| self.max[col] == self.min[col])
            .collect()
    }
}
