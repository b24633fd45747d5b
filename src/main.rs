mod cli;
mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use ragline_core::{CredentialStore, RaglineConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let mut config = RaglineConfig::load().context("failed to load configuration")?;
    if let Some(api_url) = &args.api_url {
        config.api_url = api_url.clone();
    }

    let store = CredentialStore::new().context("cannot locate the credential store")?;

    commands::dispatch(args, config, store).await
}
