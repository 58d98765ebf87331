use ndarray::Array2;
use spoiler_scope::model::{
    logistic::LogisticBaseline,
    matrix::{FeatureMatrix, SparseMatrix},
    metrics::evaluate,
    mlp::{Mlp, MlpConfig},
    SpoilerClassifier,
};

/// Separable data: the first numeric column carries the label.
fn separable(n: usize) -> (FeatureMatrix, Vec<bool>) {
    let labels: Vec<bool> = (0..n).map(|i| i % 3 == 0).collect();
    let numeric = Array2::from_shape_fn((n, 2), |(row, col)| match col {
        0 => {
            if labels[row] {
                0.9
            } else {
                0.1
            }
        }
        _ => (row % 7) as f64 / 7.0,
    });
    let ngrams = SparseMatrix::from_rows(0, vec![Vec::new(); n]).unwrap();
    (FeatureMatrix::new(ngrams, numeric).unwrap(), labels)
}

#[test]
fn mlp_learns_separable_data() {
    let (x, y) = separable(300);
    let config = MlpConfig {
        max_iter: 300,
        ..MlpConfig::default()
    };
    let model = Mlp::fit(&x, &y, &config).unwrap();
    let predicted = model.predict(&x).unwrap();
    let report = evaluate(&y, &predicted).unwrap();
    assert!(report.accuracy > 0.9, "accuracy {}", report.accuracy);

    let proba = model.predict_proba(&x).unwrap();
    assert_eq!(proba.dim(), (300, 2));
    for row in proba.outer_iter() {
        assert!((row[0] + row[1] - 1.0).abs() < 1e-9);
    }
}

#[test]
fn mlp_is_deterministic_for_a_seed() {
    let (x, y) = separable(60);
    let config = MlpConfig {
        max_iter: 20,
        ..MlpConfig::default()
    };
    let a = Mlp::fit(&x, &y, &config).unwrap();
    let b = Mlp::fit(&x, &y, &config).unwrap();
    assert_eq!(a.loss_curve, b.loss_curve);
}

#[test]
fn sparse_and_dense_inputs_agree() {
    let rows = vec![vec![(0, 0.6), (2, 0.8)], vec![], vec![(1, 1.0)]];
    let ngrams = SparseMatrix::from_rows(3, rows).unwrap();
    let numeric = Array2::from_shape_fn((3, 2), |(r, c)| (r + c) as f64 / 4.0);
    let x = FeatureMatrix::new(ngrams, numeric).unwrap();
    let weights = Array2::from_shape_fn((5, 4), |(r, c)| (r as f64 - c as f64) / 3.0);

    let sparse = x.dot(&weights);
    let dense = x.to_dense().dot(&weights);
    for (a, b) in sparse.iter().zip(dense.iter()) {
        assert!((a - b).abs() < 1e-12);
    }
    let rhs = Array2::from_shape_fn((3, 2), |(r, c)| (r * 2 + c) as f64);
    let sparse_t = x.t_dot(&rhs);
    let dense_t = x.to_dense().t().dot(&rhs);
    for (a, b) in sparse_t.iter().zip(dense_t.iter()) {
        assert!((a - b).abs() < 1e-12);
    }
}

#[test]
fn single_class_training_is_an_error() {
    let (x, _) = separable(10);
    let y = vec![true; 10];
    assert!(Mlp::fit(&x, &y, &MlpConfig::default()).is_err());
    assert!(LogisticBaseline::fit(&x, &y, 100).is_err());
}

#[test]
fn logistic_baseline_separates_data() {
    let (x, y) = separable(120);
    let model = LogisticBaseline::fit(&x, &y, 200).unwrap();
    let predicted = model.predict(&x).unwrap();
    assert!(evaluate(&y, &predicted).unwrap().accuracy > 0.9);
    let proba = model.predict_proba(&x).unwrap();
    assert!(proba.outer_iter().all(|row| (row[0] + row[1] - 1.0).abs() < 1e-9));
}

#[test]
fn report_handles_zero_division() {
    let truth = vec![true, true, false, false];
    let predicted = vec![false, false, false, false];
    let report = evaluate(&truth, &predicted).unwrap();
    assert_eq!(report.confusion, [[2, 0], [2, 0]]);
    assert_eq!(report.accuracy, 0.5);
    assert_eq!(report.per_class[1].precision, 0.0);
    assert_eq!(report.per_class[1].f1, 0.0);
    assert_eq!(report.per_class[0].recall, 1.0);
    assert!(report.to_string().contains("weighted avg"));
}
