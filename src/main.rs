//! Entry point wiring CLI dispatch to the extraction pipeline.

use anyhow::Result;
use aspect_eval::{cli::Cli, config::Settings, logging};
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing()?;
    let settings = Settings::load()?;

    info!(?cli, "starting command");
    cli.dispatch(settings).await
}
