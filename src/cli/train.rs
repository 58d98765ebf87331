//! CLI entry-point for training and evaluation.

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use crate::{config::Settings, model::ClassifierKind, pipeline};

/// Args for the `train` command.
#[derive(Debug, Clone, Default, ClapArgs)]
#[group(skip)]
pub struct Args {
    /// Classifier family.
    #[arg(long, value_enum, default_value_t = ClassifierKind::Mlp)]
    pub model: ClassifierKind,
    /// Epoch cap for training.
    #[arg(long)]
    pub max_iter: Option<usize>,
}

impl Args {
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(max_iter) = self.max_iter {
            settings.max_iter = max_iter;
        }
    }
}

#[instrument(skip(settings))]
pub async fn run(args: Args, mut settings: Settings) -> Result<()> {
    args.apply(&mut settings);
    settings.validate()?;
    let report = pipeline::classify(&settings, args.model).await?;
    println!("{report}");
    Ok(())
}
