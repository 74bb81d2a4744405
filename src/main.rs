use std::io::Write;

use anyhow::Context;
use clap::Parser;

use lexdesk::bootstrap::init_logging;
use lexdesk::cli::{self, Cli};
use lexdesk::{Config, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref()).context("failed to load settings")?;
    let config = Config::resolve(&settings).context("invalid configuration")?;
    init_logging(&config.logging)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    cli::run(cli, &config, &mut out).await?;
    out.flush()?;
    Ok(())
}
