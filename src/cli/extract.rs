//! CLI entry-point for feature extraction.

use std::time::Duration;

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use crate::{
    config::{FailurePolicy, Settings},
    nlp, pipeline,
};

/// Args for the `extract` command.
#[derive(Debug, Clone, Default, ClapArgs)]
#[group(skip)]
pub struct Args {
    /// Number of merged rows to annotate.
    #[arg(long)]
    pub sample_cap: Option<usize>,
    /// Concurrent annotation workers.
    #[arg(long)]
    pub workers: Option<usize>,
    /// Per-record annotation timeout in seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,
    /// Behaviour when a record fails annotation.
    #[arg(long, value_enum)]
    pub on_failure: Option<FailurePolicy>,
}

impl Args {
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(cap) = self.sample_cap {
            settings.sample_cap = cap;
        }
        if let Some(workers) = self.workers {
            settings.workers = workers;
        }
        if let Some(secs) = self.timeout_secs {
            settings.task_timeout = Duration::from_secs(secs);
        }
        if let Some(policy) = self.on_failure {
            settings.failure_policy = policy;
        }
    }
}

#[instrument(skip(settings))]
pub async fn run(args: Args, mut settings: Settings) -> Result<()> {
    args.apply(&mut settings);
    settings.validate()?;
    pipeline::extract(&settings, nlp::load_annotator()).await?;
    Ok(())
}
