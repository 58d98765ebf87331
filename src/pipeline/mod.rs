//! Stage orchestration: each stage reads the previous checkpoint and writes its own.

pub mod stage;

use std::{fs::File, path::PathBuf, sync::Arc};

use anyhow::{anyhow, Context, Result};
use ndarray::{Array2, Axis};
use polars::prelude::{CsvWriter, DataFrame, NamedFrom, SerWriter, Series};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    config::{ScalerFit, Settings},
    data::{
        checkpoint::{self, Artifact},
        join::{self, JoinSummary},
        merged, records,
    },
    model::{
        self,
        matrix::FeatureMatrix,
        metrics::{self, EvaluationReport},
        scaler::MinMaxScaler,
        split::{stratified_split, Split},
        tfidf::{TfidfConfig, TfidfVectorizer},
        ClassifierKind,
    },
    nlp::{self, annotate::Annotator, features::NUMERIC_COLUMNS, ExtractOptions, FeatureSet},
};
use stage::{timed, PipelineError, Stage};

pub const PREDICTIONS_CSV: &str = "predictions.csv";
pub const EVALUATION_JSON: &str = "evaluation.json";

/// Raw input files for stage 1.
#[derive(Debug, Clone)]
pub struct Inputs {
    pub reviews: PathBuf,
    pub movies: PathBuf,
}

impl Inputs {
    /// `reviews.jsonl` and `movies.jsonl` under the data directory.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            reviews: settings.join_data("reviews.jsonl"),
            movies: settings.join_data("movies.jsonl"),
        }
    }
}

/// Stage 3 checkpoint: numeric columns scaled, token strings carried alongside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaledTable {
    pub record_ids: Vec<u64>,
    pub labels: Vec<bool>,
    /// One row per record, columns in `NUMERIC_COLUMNS` order.
    pub numeric: Array2<f64>,
    pub token_strings: Vec<String>,
    pub scaler: MinMaxScaler,
    pub scaler_fit: ScalerFit,
}

impl Artifact for ScaledTable {
    const KIND: &'static str = "scaled";
    const VERSION: u32 = 1;
    const STAGE: Stage = Stage::Scale;
}

/// One side of the train/test split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    pub record_ids: Vec<u64>,
    pub labels: Vec<bool>,
    pub matrix: FeatureMatrix,
}

/// Stage 4 checkpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizedSet {
    pub train: Partition,
    pub test: Partition,
    pub vectorizer: TfidfVectorizer,
    pub split: Split,
    pub seed: u64,
}

impl Artifact for VectorizedSet {
    const KIND: &'static str = "vectorized";
    const VERSION: u32 = 1;
    const STAGE: Stage = Stage::Vectorize;
}

/// Stage 5 checkpoint, one entry per test row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predictions {
    pub model: ClassifierKind,
    pub record_ids: Vec<u64>,
    pub labels: Vec<bool>,
    pub predicted: Vec<bool>,
    /// `[P(false), P(true)]` per row.
    pub probabilities: Vec<[f64; 2]>,
}

impl Artifact for Predictions {
    const KIND: &'static str = "predictions";
    const VERSION: u32 = 1;
    const STAGE: Stage = Stage::Classify;
}

fn checkpoint_of<T: Artifact>(settings: &Settings) -> PathBuf {
    settings.checkpoint_path(&T::file_name())
}

/// Stage 1: filter movies, join reviews onto them and write the merged table.
pub async fn join(settings: &Settings, inputs: &Inputs) -> Result<JoinSummary, PipelineError> {
    timed(Stage::Join, async {
        let reviews = records::load_reviews(&inputs.reviews)?;
        let movies = records::load_movies(&inputs.movies)?;
        let (rows, summary) = join::join_reviews(&reviews, &movies);
        if rows.is_empty() {
            return Err(anyhow!("no review matched a movie with a valid release date"));
        }
        merged::write_merged(&rows, &settings.checkpoint_path(merged::FILE_NAME))?;
        Ok(summary)
    })
    .await
}

/// Stage 2: annotate the merged rows on the worker pool.
pub async fn extract(
    settings: &Settings,
    annotator: Arc<dyn Annotator>,
) -> Result<FeatureSet, PipelineError> {
    timed(Stage::Extract, async {
        let rows = merged::read_merged(&settings.checkpoint_path(merged::FILE_NAME))?;
        let features = nlp::extract_features(&rows, annotator, ExtractOptions::from(settings)).await?;
        checkpoint::save(&checkpoint_of::<FeatureSet>(settings), &features)?;
        Ok(features)
    })
    .await
}

/// Stage 3: min-max scale the numeric columns.
pub async fn scale(settings: &Settings) -> Result<ScaledTable, PipelineError> {
    timed(Stage::Scale, async {
        let features: FeatureSet = checkpoint::load(&checkpoint_of::<FeatureSet>(settings))?;
        let table = scale_features(&features, settings)?;
        checkpoint::save(&checkpoint_of::<ScaledTable>(settings), &table)?;
        Ok(table)
    })
    .await
}

pub fn scale_features(features: &FeatureSet, settings: &Settings) -> Result<ScaledTable> {
    let n = features.records.len();
    let raw = Array2::from_shape_fn((n, NUMERIC_COLUMNS.len()), |(row, col)| {
        features.records[row].features.numeric()[col]
    });
    let labels = features.labels();
    let fit_rows = match settings.scaler_fit {
        ScalerFit::Full => (0..n).collect(),
        ScalerFit::TrainOnly => stratified_split(&labels, settings.test_fraction, settings.seed)?.train,
    };
    let scaler = MinMaxScaler::fit(&raw, &fit_rows)?;
    for col in scaler.degenerate_columns() {
        warn!(column = NUMERIC_COLUMNS[col], "constant column scaled to 0");
    }
    info!(rows = n, fit_rows = fit_rows.len(), fit = ?settings.scaler_fit, "scaled numeric columns");
    Ok(ScaledTable {
        record_ids: features.records.iter().map(|r| r.record_id).collect(),
        labels,
        numeric: scaler.transform(&raw),
        token_strings: features
            .records
            .iter()
            .map(|r| r.features.token_string.clone())
            .collect(),
        scaler,
        scaler_fit: settings.scaler_fit,
    })
}

/// Stage 4: stratified split, then fit the vectorizer on the training strings only.
pub async fn vectorize(settings: &Settings) -> Result<VectorizedSet, PipelineError> {
    timed(Stage::Vectorize, async {
        let table: ScaledTable = checkpoint::load(&checkpoint_of::<ScaledTable>(settings))?;
        let set = split_and_vectorize(&table, settings)?;
        checkpoint::save(&checkpoint_of::<VectorizedSet>(settings), &set)?;
        Ok(set)
    })
    .await
}

pub fn split_and_vectorize(table: &ScaledTable, settings: &Settings) -> Result<VectorizedSet> {
    let split = stratified_split(&table.labels, settings.test_fraction, settings.seed)?;
    let train_docs = documents(table, &split.train);
    let vectorizer = TfidfVectorizer::fit(train_docs.as_slice(), TfidfConfig::default())?;

    let partition = |rows: &[usize], docs: &[&str]| -> Result<Partition> {
        let ngrams = vectorizer.transform(docs)?;
        Ok(Partition {
            record_ids: rows.iter().map(|&i| table.record_ids[i]).collect(),
            labels: rows.iter().map(|&i| table.labels[i]).collect(),
            matrix: FeatureMatrix::new(ngrams, table.numeric.select(Axis(0), rows))?,
        })
    };
    let train = partition(&split.train, &train_docs)?;
    let test = partition(&split.test, documents(table, &split.test).as_slice())?;
    info!(
        train = train.labels.len(),
        test = test.labels.len(),
        columns = train.matrix.n_cols(),
        "split and vectorized"
    );
    Ok(VectorizedSet {
        train,
        test,
        vectorizer,
        split,
        seed: settings.seed,
    })
}

fn documents<'a>(table: &'a ScaledTable, rows: &[usize]) -> Vec<&'a str> {
    rows.iter().map(|&i| table.token_strings[i].as_str()).collect()
}

/// Stage 5: train on the training partition, predict and score the test partition.
pub async fn classify(
    settings: &Settings,
    kind: ClassifierKind,
) -> Result<EvaluationReport, PipelineError> {
    timed(Stage::Classify, async {
        let set: VectorizedSet = checkpoint::load(&checkpoint_of::<VectorizedSet>(settings))?;
        let predictions = train_and_predict(&set, kind, settings.max_iter)?;
        checkpoint::save(&checkpoint_of::<Predictions>(settings), &predictions)?;
        write_predictions_csv(&predictions, &settings.join_output(PREDICTIONS_CSV))?;

        let report = metrics::evaluate(&predictions.labels, &predictions.predicted)?;
        checkpoint::save(&settings.join_output(EVALUATION_JSON), &report)?;
        info!(accuracy = report.accuracy, "evaluated test partition");
        Ok(report)
    })
    .await
}

pub fn train_and_predict(
    set: &VectorizedSet,
    kind: ClassifierKind,
    max_iter: usize,
) -> Result<Predictions> {
    let classifier = model::train(kind, &set.train.matrix, &set.train.labels, set.seed, max_iter)
        .context("training classifier")?;
    let proba = classifier.predict_proba(&set.test.matrix)?;
    let probabilities: Vec<[f64; 2]> = proba.outer_iter().map(|row| [row[0], row[1]]).collect();
    let predicted = probabilities.iter().map(|p| p[1] > 0.5).collect();
    Ok(Predictions {
        model: kind,
        record_ids: set.test.record_ids.clone(),
        labels: set.test.labels.clone(),
        predicted,
        probabilities,
    })
}

pub fn write_predictions_csv(predictions: &Predictions, path: &std::path::Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let ids: Vec<i64> = predictions.record_ids.iter().map(|&id| id as i64).collect();
    let p_false: Vec<f64> = predictions.probabilities.iter().map(|p| p[0]).collect();
    let p_true: Vec<f64> = predictions.probabilities.iter().map(|p| p[1]).collect();
    let mut df = DataFrame::new(vec![
        Series::new("record_id".into(), ids),
        Series::new("is_spoiler".into(), predictions.labels.clone()),
        Series::new("predicted".into(), predictions.predicted.clone()),
        Series::new("p_false".into(), p_false),
        Series::new("p_true".into(), p_true),
    ])?;
    let mut file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    CsvWriter::new(&mut file).finish(&mut df)?;
    info!(path = %path.display(), rows = df.height(), "wrote predictions");
    Ok(())
}

/// Every stage in order, each reading what the previous one wrote.
pub async fn run_all(
    settings: &Settings,
    inputs: &Inputs,
    annotator: Arc<dyn Annotator>,
    kind: ClassifierKind,
) -> Result<EvaluationReport, PipelineError> {
    join(settings, inputs).await?;
    extract(settings, annotator).await?;
    scale(settings).await?;
    vectorize(settings).await?;
    classify(settings, kind).await
}
