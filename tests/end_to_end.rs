use std::{fs, path::Path};

use serde_json::json;
use spoiler_scope::{
    config::Settings,
    data::checkpoint,
    model::ClassifierKind,
    nlp::load_annotator,
    pipeline::{self, stage::Stage, Inputs, Predictions, VectorizedSet},
};
use tempfile::tempdir;

const TEXTS: [&str; 5] = [
    "The hero dies at the end and the villain wins.",
    "Beautiful photography and a moving score.",
    "Bruce Wayne reveals he was the killer all along.",
    "Solid acting, though the pacing drags in places.",
    "Turns out the ship sinks and everyone is lost.",
];

fn write_inputs(dir: &Path) -> Inputs {
    let mut reviews = String::new();
    let mut movies = String::new();
    for i in 0..10 {
        let valid = i % 2 == 0;
        let release = if valid { "2020-01-01" } else { "2020-1-1" };
        movies.push_str(&json!({ "movie_id": format!("tt{i}"), "release_date": release }).to_string());
        movies.push('\n');
        // Labels over the five valid movies: true, false, true, false, true.
        let review = json!({
            "movie_id": format!("tt{i}"),
            "review_date": format!("{} March 2020", i + 1),
            "review_summary": if i == 4 { None } else { Some("Review") },
            "review_text": TEXTS[i / 2],
            "is_spoiler": (i / 2) % 2 == 0,
        });
        reviews.push_str(&review.to_string());
        reviews.push('\n');
    }
    let inputs = Inputs {
        reviews: dir.join("reviews.jsonl"),
        movies: dir.join("movies.jsonl"),
    };
    fs::write(&inputs.reviews, reviews).unwrap();
    fs::write(&inputs.movies, movies).unwrap();
    inputs
}

fn settings(root: &Path) -> Settings {
    let mut settings = Settings::rooted(root.join("data"), root.join("outputs"));
    settings.max_iter = 50;
    settings
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn five_valid_movies_flow_through_every_stage() {
    let root = tempdir().unwrap();
    let settings = settings(root.path());
    let inputs = write_inputs(root.path());

    let summary = pipeline::join(&settings, &inputs).await.unwrap();
    assert_eq!(summary.merged, 5);
    assert_eq!(summary.unmatched, 5);

    let features = pipeline::extract(&settings, load_annotator()).await.unwrap();
    assert_eq!(features.records.len(), 5);
    assert_eq!(features.labels().iter().filter(|&&l| l).count(), 3);

    let table = pipeline::scale(&settings).await.unwrap();
    assert!(table.numeric.iter().all(|v| (0.0..=1.0).contains(v)));

    let set = pipeline::vectorize(&settings).await.unwrap();
    assert_eq!(set.train.labels.len(), 4);
    assert_eq!(set.test.labels.len(), 1);
    assert_eq!(set.train.matrix.n_cols(), set.vectorizer.n_features() + 8);

    let report = pipeline::classify(&settings, ClassifierKind::Mlp).await.unwrap();
    assert_eq!(report.macro_avg.support, 1);

    let predictions: Predictions =
        checkpoint::load(&settings.checkpoint_path("predictions.json")).unwrap();
    assert_eq!(predictions.predicted.len(), 1);
    let [p_false, p_true] = predictions.probabilities[0];
    assert!((p_false + p_true - 1.0).abs() < 1e-6);
    assert_eq!(predictions.predicted[0], p_true > 0.5);

    assert!(settings.join_output(pipeline::PREDICTIONS_CSV).exists());
    assert!(settings.join_output(pipeline::EVALUATION_JSON).exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn classify_reruns_from_vectorized_checkpoint() {
    let root = tempdir().unwrap();
    let settings = settings(root.path());
    let inputs = write_inputs(root.path());
    pipeline::run_all(&settings, &inputs, load_annotator(), ClassifierKind::Mlp)
        .await
        .unwrap();

    let before: VectorizedSet =
        checkpoint::load(&settings.checkpoint_path("vectorized.json")).unwrap();
    let report = pipeline::classify(&settings, ClassifierKind::Logistic)
        .await
        .unwrap();
    assert_eq!(report.confusion.iter().flatten().sum::<usize>(), 1);
    let after: VectorizedSet =
        checkpoint::load(&settings.checkpoint_path("vectorized.json")).unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn missing_upstream_checkpoint_is_stage_labelled() {
    let root = tempdir().unwrap();
    let settings = settings(root.path());
    let err = pipeline::scale(&settings).await.unwrap_err();
    assert_eq!(err.stage(), Some(Stage::Scale));
    let message = err.to_string();
    assert!(message.contains("stage 3"), "{message}");
    assert!(message.contains("spoiler-scope extract"), "{message}");
}
