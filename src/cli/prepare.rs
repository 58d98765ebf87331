//! CLI entry-point for scaling, splitting and vectorizing.

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use crate::{
    config::{ScalerFit, Settings},
    pipeline,
};

/// Args for the `prepare` command.
#[derive(Debug, Clone, Default, ClapArgs)]
#[group(skip)]
pub struct Args {
    /// Rows the min-max scaler is fit on.
    #[arg(long, value_enum)]
    pub scaler_fit: Option<ScalerFit>,
    /// Seed for the stratified split.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Share of rows held out for testing.
    #[arg(long)]
    pub test_fraction: Option<f64>,
}

impl Args {
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(fit) = self.scaler_fit {
            settings.scaler_fit = fit;
        }
        if let Some(seed) = self.seed {
            settings.seed = seed;
        }
        if let Some(fraction) = self.test_fraction {
            settings.test_fraction = fraction;
        }
    }
}

#[instrument(skip(settings))]
pub async fn run(args: Args, mut settings: Settings) -> Result<()> {
    args.apply(&mut settings);
    settings.validate()?;
    pipeline::scale(&settings).await?;
    let set = pipeline::vectorize(&settings).await?;
    info!(
        train = set.train.labels.len(),
        test = set.test.labels.len(),
        "prepared feature matrices"
    );
    Ok(())
}
