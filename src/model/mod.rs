//! Numeric modelling: scaling, splitting, vectorizing, classifiers and evaluation.

pub mod logistic;
pub mod matrix;
pub mod metrics;
pub mod mlp;
pub mod scaler;
pub mod split;
pub mod tfidf;

use anyhow::Result;
use clap::ValueEnum;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use matrix::FeatureMatrix;

/// A fitted binary classifier over combined feature rows.
pub trait SpoilerClassifier {
    /// One row per input row, columns `[P(false), P(true)]`.
    fn predict_proba(&self, x: &FeatureMatrix) -> Result<Array2<f64>>;

    /// `true` iff P(true) > 0.5.
    fn predict(&self, x: &FeatureMatrix) -> Result<Vec<bool>> {
        let proba = self.predict_proba(x)?;
        Ok(proba.column(1).iter().map(|&p| p > 0.5).collect())
    }
}

/// Classifier family selectable from the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
pub enum ClassifierKind {
    /// Two hidden-layer feed-forward network.
    #[default]
    Mlp,
    /// Logistic regression on the dense feature rows.
    Logistic,
}

/// Fit the chosen classifier on the training matrix.
pub fn train(
    kind: ClassifierKind,
    x: &FeatureMatrix,
    y: &[bool],
    seed: u64,
    max_iter: usize,
) -> Result<Box<dyn SpoilerClassifier>> {
    Ok(match kind {
        ClassifierKind::Mlp => {
            let config = mlp::MlpConfig {
                seed,
                max_iter,
                ..mlp::MlpConfig::default()
            };
            Box::new(mlp::Mlp::fit(x, y, &config)?)
        }
        ClassifierKind::Logistic => Box::new(logistic::LogisticBaseline::fit(x, y, max_iter)?),
    })
}
