//! Command-line interface wiring for spoiler-scope.

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::Settings;

pub mod extract;
pub mod join;
pub mod prepare;
pub mod run;
pub mod train;

/// Top-level CLI definition.
#[derive(Debug, Parser)]
#[command(author, version, about = "Review spoiler classification pipeline", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Parse CLI arguments from the environment.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Dispatch the selected sub-command.
    pub async fn dispatch(self, settings: Settings) -> Result<()> {
        match self.command {
            Commands::Join(args) => join::run(args, settings).await,
            Commands::Extract(args) => extract::run(args, settings).await,
            Commands::Prepare(args) => prepare::run(args, settings).await,
            Commands::Train(args) => train::run(args, settings).await,
            Commands::Run(args) => run::run(args, settings).await,
        }
    }
}

/// Supported sub-commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Filter movies by release date and join reviews onto them.
    Join(join::Args),
    /// Annotate merged reviews and derive feature tuples.
    Extract(extract::Args),
    /// Scale numeric features, split and vectorize.
    Prepare(prepare::Args),
    /// Train the classifier and evaluate it on the test partition.
    Train(train::Args),
    /// Run every stage in order.
    Run(run::Args),
}
