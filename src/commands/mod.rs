//! Command handlers and shared output helpers.

pub mod auth;
pub mod chat;
pub mod files;
pub mod urls;

use anyhow::{Result, bail};
use console::style;
use ragline_core::{ApiClient, CredentialStore, RaglineConfig};

use crate::cli::{Cli, Commands};

pub async fn dispatch(cli: Cli, config: RaglineConfig, store: CredentialStore) -> Result<()> {
    match cli.command {
        Commands::Register => auth::register(&config, &store).await,
        Commands::Login { email } => auth::login(&config, &store, email).await,
        Commands::Logout => auth::logout(&store),
        Commands::Whoami => auth::whoami(&authed_client(&config, &store)?, cli.json).await,
        Commands::Files(command) => {
            files::run(&authed_client(&config, &store)?, command, cli.json).await
        }
        Commands::Urls(command) => {
            urls::run(&authed_client(&config, &store)?, command, cli.json).await
        }
        Commands::Chat(command) => {
            chat::run(&authed_client(&config, &store)?, &config, command, cli.json).await
        }
        Commands::Ask {
            chat_id,
            context,
            message,
        } => {
            chat::ask(
                &authed_client(&config, &store)?,
                chat_id,
                &context,
                &message.join(" "),
            )
            .await
        }
    }
}

/// Client carrying the stored bearer token; fails with a hint when nobody
/// is logged in.
fn authed_client(config: &RaglineConfig, store: &CredentialStore) -> Result<ApiClient> {
    let Some(credentials) = store.load()? else {
        bail!("not logged in; run {} first", style("ragline login").cyan());
    };
    Ok(ApiClient::from_config(config, Some(credentials.token))?)
}

fn unauthed_client(config: &RaglineConfig) -> Result<ApiClient> {
    Ok(ApiClient::from_config(config, None)?)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn notice_ok(message: &str) {
    println!("{} {message}", style("✓").green().bold());
}

fn notice_err(message: &str) {
    eprintln!("{} {message}", style("✗").red().bold());
}

fn spinner(message: &str) -> indicatif::ProgressBar {
    let bar = indicatif::ProgressBar::new_spinner();
    bar.set_message(message.to_string());
    bar.enable_steady_tick(std::time::Duration::from_millis(120));
    bar
}

/// Ask before destroying something, unless `--yes` was given.
fn confirm_or_skip(prompt: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    Ok(dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}

fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}
