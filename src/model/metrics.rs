//! Accuracy, confusion matrix and per-class precision/recall/F1.

use std::fmt;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::{data::checkpoint::Artifact, pipeline::stage::Stage};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassScores {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub accuracy: f64,
    /// `[[tn, fp], [fn, tp]]`: rows are true labels, columns predictions, false before true.
    pub confusion: [[usize; 2]; 2],
    /// Index 0 is the `false` class, index 1 `true`.
    pub per_class: [ClassScores; 2],
    pub macro_avg: ClassScores,
    pub weighted_avg: ClassScores,
}

impl Artifact for EvaluationReport {
    const KIND: &'static str = "evaluation";
    const VERSION: u32 = 1;
    const STAGE: Stage = Stage::Classify;
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

pub fn confusion_matrix(truth: &[bool], predicted: &[bool]) -> [[usize; 2]; 2] {
    let mut matrix = [[0usize; 2]; 2];
    for (&t, &p) in truth.iter().zip(predicted) {
        matrix[usize::from(t)][usize::from(p)] += 1;
    }
    matrix
}

/// Score predictions against ground truth. Undefined ratios are reported as 0.
pub fn evaluate(truth: &[bool], predicted: &[bool]) -> Result<EvaluationReport> {
    if truth.len() != predicted.len() {
        return Err(anyhow!(
            "{} labels but {} predictions",
            truth.len(),
            predicted.len()
        ));
    }
    if truth.is_empty() {
        return Err(anyhow!("nothing to evaluate"));
    }
    let confusion = confusion_matrix(truth, predicted);
    let correct = confusion[0][0] + confusion[1][1];

    let scores = |class: usize| {
        let tp = confusion[class][class];
        let predicted_as = confusion[0][class] + confusion[1][class];
        let support = confusion[class][0] + confusion[class][1];
        let precision = ratio(tp, predicted_as);
        let recall = ratio(tp, support);
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };
        ClassScores {
            precision,
            recall,
            f1,
            support,
        }
    };
    let per_class = [scores(0), scores(1)];
    let total = truth.len();

    let macro_avg = ClassScores {
        precision: (per_class[0].precision + per_class[1].precision) / 2.0,
        recall: (per_class[0].recall + per_class[1].recall) / 2.0,
        f1: (per_class[0].f1 + per_class[1].f1) / 2.0,
        support: total,
    };
    let weight = |class: usize| per_class[class].support as f64 / total as f64;
    let weighted = |pick: fn(&ClassScores) -> f64| {
        pick(&per_class[0]) * weight(0) + pick(&per_class[1]) * weight(1)
    };
    let weighted_avg = ClassScores {
        precision: weighted(|s| s.precision),
        recall: weighted(|s| s.recall),
        f1: weighted(|s| s.f1),
        support: total,
    };

    Ok(EvaluationReport {
        accuracy: ratio(correct, total),
        confusion,
        per_class,
        macro_avg,
        weighted_avg,
    })
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>14} {:>10} {:>10} {:>10} {:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        let row = |f: &mut fmt::Formatter<'_>, name: &str, s: &ClassScores| {
            writeln!(
                f,
                "{name:>14} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                s.precision, s.recall, s.f1, s.support
            )
        };
        row(f, "False", &self.per_class[0])?;
        row(f, "True", &self.per_class[1])?;
        writeln!(f)?;
        writeln!(
            f,
            "{:>14} {:>10} {:>10} {:>10.2} {:>10}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        row(f, "macro avg", &self.macro_avg)?;
        row(f, "weighted avg", &self.weighted_avg)?;
        writeln!(f)?;
        writeln!(f, "confusion matrix (rows true, columns predicted; False, True)")?;
        writeln!(f, "{:>8} {:>8}", self.confusion[0][0], self.confusion[0][1])?;
        write!(f, "{:>8} {:>8}", self.confusion[1][0], self.confusion[1][1])
    }
}
