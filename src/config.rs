//! Runtime configuration utilities for spoiler-scope.

use std::{
    env,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use anyhow::{anyhow, Context};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Unigrams through trigrams.
pub const NGRAM_RANGE: (usize, usize) = (1, 3);
/// N-grams present in more than this fraction of training documents are dropped.
pub const MAX_DF: f64 = 0.9;
/// Vocabulary cap for the n-gram block.
pub const MAX_FEATURES: usize = 100_000;
/// Hidden layer widths of the feed-forward classifier.
pub const HIDDEN_LAYERS: [usize; 2] = [100, 100];
/// Minimum loss improvement counted as progress.
pub const TOLERANCE: f64 = 1e-4;
/// Consecutive epochs without progress before training stops.
pub const N_ITER_NO_CHANGE: usize = 10;

/// What to do when a single record cannot be annotated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
pub enum FailurePolicy {
    /// Abort the whole extraction batch on the first failed record.
    FailFast,
    /// Drop the failed record, log it and keep going.
    Skip,
}

/// Which rows the min-max scaler is fit on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
pub enum ScalerFit {
    /// Every row, before the train/test split. Leaks test statistics into training.
    Full,
    /// Training partition rows only.
    TrainOnly,
}

/// Application configuration resolved from `.env` and defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Root folder for raw inputs and checkpoints.
    pub data_dir: PathBuf,
    /// Root folder for predictions and reports.
    pub outputs_dir: PathBuf,
    /// Number of merged rows fed into extraction.
    pub sample_cap: usize,
    /// Width of the extraction worker pool.
    pub workers: usize,
    /// Per-record annotation timeout.
    pub task_timeout: Duration,
    pub failure_policy: FailurePolicy,
    pub scaler_fit: ScalerFit,
    /// Seed shared by the splitter and the classifier.
    pub seed: u64,
    pub test_fraction: f64,
    /// Epoch cap for classifier training.
    pub max_iter: usize,
}

impl Settings {
    /// Load configuration from environment with reasonable defaults.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let data_dir = env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));
        let outputs_dir = env::var("OUTPUTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./outputs"));

        let mut settings = Self::rooted(data_dir, outputs_dir);
        settings.sample_cap = env_or("SAMPLE_CAP", settings.sample_cap)?;
        settings.workers = env_or("EXTRACT_WORKERS", settings.workers)?;
        settings.task_timeout =
            Duration::from_secs(env_or("EXTRACT_TIMEOUT_SECS", settings.task_timeout.as_secs())?);
        settings.failure_policy = env_enum("EXTRACT_ON_FAILURE", settings.failure_policy)?;
        settings.scaler_fit = env_enum("SCALER_FIT", settings.scaler_fit)?;
        settings.seed = env_or("SPLIT_SEED", settings.seed)?;
        settings.test_fraction = env_or("TEST_FRACTION", settings.test_fraction)?;
        settings.max_iter = env_or("MAX_ITER", settings.max_iter)?;
        settings.validate()?;

        std::fs::create_dir_all(&settings.data_dir).context("creating data dir")?;
        std::fs::create_dir_all(&settings.outputs_dir).context("creating outputs dir")?;
        Ok(settings)
    }

    /// Defaults rooted at explicit directories. Does not touch the environment or the filesystem.
    pub fn rooted(data_dir: impl Into<PathBuf>, outputs_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            outputs_dir: outputs_dir.into(),
            sample_cap: 2000,
            workers: 2,
            task_timeout: Duration::from_secs(30),
            failure_policy: FailurePolicy::FailFast,
            scaler_fit: ScalerFit::Full,
            seed: 42,
            test_fraction: 0.2,
            max_iter: 200,
        }
    }

    /// Reject values no stage can work with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.sample_cap == 0 {
            return Err(anyhow!("SAMPLE_CAP must be at least 1"));
        }
        if self.workers == 0 {
            return Err(anyhow!("EXTRACT_WORKERS must be at least 1"));
        }
        if self.task_timeout.is_zero() {
            return Err(anyhow!("EXTRACT_TIMEOUT_SECS must be at least 1"));
        }
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(anyhow!(
                "TEST_FRACTION must lie strictly between 0 and 1, got {}",
                self.test_fraction
            ));
        }
        if self.max_iter == 0 {
            return Err(anyhow!("MAX_ITER must be at least 1"));
        }
        Ok(())
    }

    /// Convenience helper for derived path segments.
    pub fn join_data<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.data_dir.join(path)
    }

    /// Convenience helper for derived output path segments.
    pub fn join_output<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.outputs_dir.join(path)
    }

    /// Location of a stage-boundary checkpoint file.
    pub fn checkpoint_path(&self, file_name: &str) -> PathBuf {
        self.join_data("checkpoints").join(file_name)
    }
}

fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|err| anyhow!("invalid {key}={raw:?}: {err}")),
        Err(_) => Ok(default),
    }
}

fn env_enum<T: ValueEnum>(key: &str, default: T) -> anyhow::Result<T> {
    match env::var(key) {
        Ok(raw) => T::from_str(raw.trim(), true).map_err(|err| anyhow!("invalid {key}={raw:?}: {err}")),
        Err(_) => Ok(default),
    }
}
