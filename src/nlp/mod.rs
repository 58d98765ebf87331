//! Natural language processing and the concurrent feature extraction stage.

pub mod annotate;
pub mod features;
pub mod lexicon;
pub mod ner;

use std::{collections::HashMap, sync::Arc, time::Duration};

use anyhow::{anyhow, Result};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    config::{FailurePolicy, Settings},
    data::{checkpoint::Artifact, join::MergedRecord},
    pipeline::stage::{PipelineError, Stage},
};
use annotate::Annotator;
use features::{FeatureTuple, TextFeatures};

/// One extracted review, keyed by the identifier assigned at join time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    pub record_id: u64,
    pub is_spoiler: bool,
    pub features: FeatureTuple,
}

/// Stage 2 checkpoint payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    /// Sorted by `record_id`.
    pub records: Vec<ExtractedRecord>,
    /// Records dropped under [`FailurePolicy::Skip`].
    pub skipped: Vec<u64>,
    pub sample_cap: usize,
}

impl Artifact for FeatureSet {
    const KIND: &'static str = "features";
    const VERSION: u32 = 1;
    const STAGE: Stage = Stage::Extract;
}

impl FeatureSet {
    pub fn labels(&self) -> Vec<bool> {
        self.records.iter().map(|r| r.is_spoiler).collect()
    }
}

/// Knobs for [`extract_features`].
#[derive(Debug, Clone, Copy)]
pub struct ExtractOptions {
    pub sample_cap: usize,
    pub workers: usize,
    pub task_timeout: Duration,
    pub failure_policy: FailurePolicy,
}

impl From<&Settings> for ExtractOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            sample_cap: settings.sample_cap,
            workers: settings.workers,
            task_timeout: settings.task_timeout,
            failure_policy: settings.failure_policy,
        }
    }
}

/// Load the default annotator, shared read-only by every worker.
pub fn load_annotator() -> Arc<dyn Annotator> {
    Arc::new(lexicon::LexiconAnnotator) as Arc<dyn Annotator>
}

/// Annotate the first `sample_cap` merged rows on a bounded worker pool.
///
/// Workers only see `(record_id, text)`; label and elapsed days are re-attached by identifier
/// once results arrive, in whatever order they complete.
pub async fn extract_features(
    rows: &[MergedRecord],
    annotator: Arc<dyn Annotator>,
    options: ExtractOptions,
) -> Result<FeatureSet> {
    let sample = &rows[..rows.len().min(options.sample_cap)];
    if sample.is_empty() {
        return Err(anyhow!("no merged rows to extract features from"));
    }
    let side: HashMap<u64, (bool, i64)> = sample
        .iter()
        .map(|row| (row.record_id, (row.is_spoiler, row.days_since_release)))
        .collect();
    info!(
        records = sample.len(),
        workers = options.workers,
        policy = ?options.failure_policy,
        "extracting features"
    );

    let mut results = stream::iter(sample.iter().map(|row| (row.record_id, row.review_combined.clone())))
        .map(|(record_id, text)| {
            let annotator = Arc::clone(&annotator);
            async move {
                let outcome = annotate_one(annotator, text, options.task_timeout).await;
                (record_id, outcome)
            }
        })
        .buffer_unordered(options.workers.max(1));

    let mut records = Vec::with_capacity(sample.len());
    let mut skipped = Vec::new();
    while let Some((record_id, outcome)) = results.next().await {
        match outcome {
            Ok(text_features) => {
                let (is_spoiler, days) = side
                    .get(&record_id)
                    .copied()
                    .ok_or_else(|| anyhow!("result for unknown record {record_id}"))?;
                records.push(ExtractedRecord {
                    record_id,
                    is_spoiler,
                    features: text_features.with_days(days),
                });
                if records.len() % 500 == 0 {
                    debug!(done = records.len(), "extraction progress");
                }
            }
            Err(err) => match options.failure_policy {
                FailurePolicy::FailFast => {
                    return Err(PipelineError::Extraction {
                        record_id,
                        reason: format!("{err:#}"),
                    }
                    .into());
                }
                FailurePolicy::Skip => {
                    warn!(record_id, error = %format!("{err:#}"), "skipping record");
                    skipped.push(record_id);
                }
            },
        }
    }

    records.sort_by_key(|r| r.record_id);
    skipped.sort_unstable();
    if records.is_empty() {
        return Err(anyhow!("every record failed annotation"));
    }
    info!(extracted = records.len(), skipped = skipped.len(), "feature extraction complete");
    Ok(FeatureSet {
        records,
        skipped,
        sample_cap: options.sample_cap,
    })
}

/// Run one annotation on the blocking pool under a timeout.
///
/// A timed-out annotation keeps running on its blocking thread; its result is discarded.
async fn annotate_one(
    annotator: Arc<dyn Annotator>,
    text: String,
    timeout: Duration,
) -> Result<TextFeatures> {
    let task = tokio::task::spawn_blocking(move || {
        annotator
            .annotate(&text)
            .map(|doc| TextFeatures::from_doc(&doc))
    });
    match tokio::time::timeout(timeout, task).await {
        Err(_) => Err(anyhow!("annotation timed out after {timeout:?}")),
        Ok(Err(join_err)) => Err(anyhow!("annotation worker crashed: {join_err}")),
        Ok(Ok(result)) => result.map_err(anyhow::Error::from),
    }
}
