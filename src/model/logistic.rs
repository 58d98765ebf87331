//! Logistic-regression baseline backed by linfa, fit on the dense feature rows.

use anyhow::{anyhow, Result};
use linfa::{dataset::DatasetBase, prelude::Fit};
use linfa_logistic::{FittedLogisticRegression, LogisticRegression};
use ndarray::{Array1, Array2};
use tracing::info;

use super::{matrix::FeatureMatrix, SpoilerClassifier};

pub struct LogisticBaseline {
    model: FittedLogisticRegression<f64, bool>,
    n_cols: usize,
}

impl LogisticBaseline {
    pub fn fit(x: &FeatureMatrix, y: &[bool], max_iter: usize) -> Result<Self> {
        if x.n_rows() != y.len() {
            return Err(anyhow!("{} feature rows but {} labels", x.n_rows(), y.len()));
        }
        if y.iter().all(|&v| v) || y.iter().all(|&v| !v) {
            return Err(anyhow!("training labels contain a single class"));
        }
        let dataset = DatasetBase::new(x.to_dense(), Array1::from(y.to_vec()));
        let model = LogisticRegression::default()
            .max_iterations(max_iter as u64)
            .fit(&dataset)?;
        info!(features = x.n_cols(), "fitted logistic baseline");
        Ok(Self {
            model,
            n_cols: x.n_cols(),
        })
    }
}

impl SpoilerClassifier for LogisticBaseline {
    fn predict_proba(&self, x: &FeatureMatrix) -> Result<Array2<f64>> {
        if x.n_cols() != self.n_cols {
            return Err(anyhow!(
                "matrix has {} columns, model expects {}",
                x.n_cols(),
                self.n_cols
            ));
        }
        let dense = x.to_dense();
        let positive = self.model.predict_probabilities(&dense);
        let positive_is_true = self.model.labels().pos.class;
        Ok(Array2::from_shape_fn((x.n_rows(), 2), |(row, col)| {
            let p_true = if positive_is_true {
                positive[row]
            } else {
                1.0 - positive[row]
            };
            if col == 1 {
                p_true
            } else {
                1.0 - p_true
            }
        }))
    }
}
