//! Stage identities, stage-labelled errors and the timing wrapper run around each stage.

use std::{fmt, future::Future, path::PathBuf, time::Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, info_span, Instrument};

/// The five pipeline stages, in dependency order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Join,
    Extract,
    Scale,
    Vectorize,
    Classify,
}

impl Stage {
    /// 1-based position in the pipeline.
    pub fn number(self) -> u8 {
        match self {
            Self::Join => 1,
            Self::Extract => 2,
            Self::Scale => 3,
            Self::Vectorize => 4,
            Self::Classify => 5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Join => "join & filter",
            Self::Extract => "feature extraction",
            Self::Scale => "scaling",
            Self::Vectorize => "split & vectorize",
            Self::Classify => "classify & evaluate",
        }
    }

    /// CLI sub-command that produces this stage's artifact.
    pub fn command(self) -> &'static str {
        match self {
            Self::Join => "join",
            Self::Extract => "extract",
            Self::Scale | Self::Vectorize => "prepare",
            Self::Classify => "train",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stage {} ({})", self.number(), self.name())
    }
}

/// Failures surfaced to the operator, always labelled with the stage involved.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{stage} failed: {source:#}")]
    Stage {
        stage: Stage,
        #[source]
        source: anyhow::Error,
    },
    #[error("{stage} output missing at {}; run `spoiler-scope {}` first", path.display(), stage.command())]
    MissingCheckpoint { stage: Stage, path: PathBuf },
    #[error(
        "{stage} output at {} is not a compatible checkpoint: expected {expected}, found {found}; re-run `spoiler-scope {}`",
        path.display(),
        stage.command()
    )]
    SchemaMismatch {
        stage: Stage,
        path: PathBuf,
        expected: String,
        found: String,
    },
    #[error("record {record_id} failed annotation: {reason}")]
    Extraction { record_id: u64, reason: String },
}

impl PipelineError {
    /// Wrap an arbitrary failure, keeping already stage-labelled errors intact.
    pub fn in_stage(stage: Stage, err: anyhow::Error) -> Self {
        match err.downcast::<PipelineError>() {
            Ok(labelled @ PipelineError::Stage { .. }) => labelled,
            Ok(other) => PipelineError::Stage {
                stage,
                source: anyhow::Error::new(other),
            },
            Err(source) => PipelineError::Stage { stage, source },
        }
    }

    /// Stage the failure is attributed to, when known.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Stage { stage, .. }
            | Self::MissingCheckpoint { stage, .. }
            | Self::SchemaMismatch { stage, .. } => Some(*stage),
            Self::Extraction { .. } => None,
        }
    }
}

/// Run one stage inside a span, logging its duration and labelling any failure with the stage.
pub async fn timed<T, Fut>(stage: Stage, work: Fut) -> Result<T, PipelineError>
where
    Fut: Future<Output = anyhow::Result<T>>,
{
    let span = info_span!("stage", number = stage.number(), name = stage.name());
    async move {
        info!("starting");
        let started = Instant::now();
        match work.await {
            Ok(value) => {
                info!(elapsed_ms = started.elapsed().as_millis() as u64, "finished");
                Ok(value)
            }
            Err(err) => {
                let err = PipelineError::in_stage(stage, err);
                error!(elapsed_ms = started.elapsed().as_millis() as u64, %err, "failed");
                Err(err)
            }
        }
    }
    .instrument(span)
    .await
}
