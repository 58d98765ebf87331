//! CLI entry-point for the join & filter stage.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use crate::{config::Settings, pipeline};

/// Args for the `join` command.
#[derive(Debug, Clone, Default, ClapArgs)]
#[group(skip)]
pub struct Args {
    /// Reviews JSON-lines file. Defaults to `$DATA_DIR/reviews.jsonl`.
    #[arg(long)]
    pub reviews: Option<PathBuf>,
    /// Movie metadata JSON-lines file. Defaults to `$DATA_DIR/movies.jsonl`.
    #[arg(long)]
    pub movies: Option<PathBuf>,
}

impl Args {
    pub fn inputs(&self, settings: &Settings) -> pipeline::Inputs {
        let defaults = pipeline::Inputs::from_settings(settings);
        pipeline::Inputs {
            reviews: self.reviews.clone().unwrap_or(defaults.reviews),
            movies: self.movies.clone().unwrap_or(defaults.movies),
        }
    }
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let summary = pipeline::join(&settings, &args.inputs(&settings)).await?;
    info!(merged = summary.merged, "join complete");
    Ok(())
}
