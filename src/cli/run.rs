//! CLI entry-point running every stage end to end.

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use crate::{config::Settings, nlp, pipeline};

/// Args for the `run` command: the union of every stage's flags.
#[derive(Debug, Clone, Default, ClapArgs)]
#[group(skip)]
pub struct Args {
    #[command(flatten)]
    pub join: super::join::Args,
    #[command(flatten)]
    pub extract: super::extract::Args,
    #[command(flatten)]
    pub prepare: super::prepare::Args,
    #[command(flatten)]
    pub train: super::train::Args,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, mut settings: Settings) -> Result<()> {
    args.extract.apply(&mut settings);
    args.prepare.apply(&mut settings);
    args.train.apply(&mut settings);
    settings.validate()?;

    let inputs = args.join.inputs(&settings);
    let report =
        pipeline::run_all(&settings, &inputs, nlp::load_annotator(), args.train.model).await?;
    println!("{report}");
    Ok(())
}
