//! Command-line interface wiring for aspect-eval.

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::Settings;

pub mod evaluate;
pub mod extract;

/// Top-level CLI definition.
#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Extract entity/aspect pairs from a review and score them against labels",
    long_about = None
)]
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
            Commands::Evaluate(args) => evaluate::run(args, settings).await,
            Commands::Extract(args) => extract::run(args, settings).await,
        }
    }
}

/// Supported sub-commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Extract from the first review of a CSV and score it against its labels.
    Evaluate(evaluate::Args),
    /// Run extraction only and print every parsed pair.
    Extract(extract::Args),
}
