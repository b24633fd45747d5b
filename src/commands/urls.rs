//! Scrape job commands.

use std::time::Duration;

use anyhow::Result;
use console::style;
use ragline_core::{ApiClient, ScrapeStatus};

use super::{confirm_or_skip, notice_err, notice_ok, print_json, spinner};
use crate::cli::UrlsCommand;

const WATCH_POLL_INTERVAL: Duration = Duration::from_secs(2);

pub async fn run(client: &ApiClient, command: UrlsCommand, json: bool) -> Result<()> {
    match command {
        UrlsCommand::List => list(client, json).await,
        UrlsCommand::Add { url, watch } => add(client, url, watch).await,
        UrlsCommand::Show { id } => show(client, id, json).await,
        UrlsCommand::Contents { id } => contents(client, id, json).await,
        UrlsCommand::Retry { id } => retry(client, id).await,
        UrlsCommand::Rm { id, yes } => rm(client, id, yes).await,
    }
}

fn status_label(status: ScrapeStatus) -> console::StyledObject<String> {
    let text = status.to_string();
    match status {
        ScrapeStatus::Completed => style(text).green(),
        ScrapeStatus::Failed => style(text).red(),
        ScrapeStatus::InProgress => style(text).yellow(),
        ScrapeStatus::Pending => style(text).dim(),
    }
}

async fn list(client: &ApiClient, json: bool) -> Result<()> {
    let jobs = client.list_scrapes().await?;
    if json {
        return print_json(&jobs);
    }

    if jobs.is_empty() {
        println!("{}", style("no scrape jobs").dim());
        return Ok(());
    }

    for job in jobs {
        println!(
            "{:>6}  {:<12} {}",
            style(format!("#{}", job.id)).cyan(),
            status_label(job.status),
            job.url
        );
    }
    Ok(())
}

async fn add(client: &ApiClient, url: String, watch: bool) -> Result<()> {
    let mut job = client.create_scrape(&url).await?;
    notice_ok(&format!("scrape #{} registered ({})", job.id, job.status));

    if !watch {
        return Ok(());
    }

    let bar = spinner(&format!("scraping {}", job.url));
    while !job.status.is_terminal() {
        tokio::time::sleep(WATCH_POLL_INTERVAL).await;
        job = client.get_scrape(job.id).await?;
        bar.set_message(format!("scraping {} ({})", job.url, job.status));
    }
    bar.finish_and_clear();

    match job.status {
        ScrapeStatus::Completed => notice_ok(&format!("scrape #{} completed", job.id)),
        _ => notice_err(&format!("scrape #{} failed", job.id)),
    }
    Ok(())
}

async fn show(client: &ApiClient, id: i64, json: bool) -> Result<()> {
    let job = client.get_scrape(id).await?;
    if json {
        return print_json(&job);
    }

    println!(
        "{} {}  {}",
        style(format!("#{}", job.id)).cyan(),
        job.url,
        status_label(job.status)
    );
    println!(
        "{}",
        style(format!(
            "created {}, updated {}",
            job.created_at.format("%Y-%m-%d %H:%M"),
            job.updated_at.format("%Y-%m-%d %H:%M")
        ))
        .dim()
    );
    Ok(())
}

async fn contents(client: &ApiClient, id: i64, json: bool) -> Result<()> {
    let blocks = client.scrape_contents(id).await?;
    if json {
        return print_json(&blocks);
    }

    if blocks.is_empty() {
        println!("{}", style("no extracted content").dim());
        return Ok(());
    }

    let skin = termimad::MadSkin::default();
    for block in blocks {
        match block.content_type.as_str() {
            "MARKDOWN" | "TEXT" => skin.print_text(&block.content),
            "LINK" | "IMAGE" => println!("{} {}", style("→").dim(), block.link),
            _ => println!("{}", block.content),
        }
    }
    Ok(())
}

async fn retry(client: &ApiClient, id: i64) -> Result<()> {
    client.retry_scrape(id).await?;
    notice_ok(&format!("scrape #{id} re-queued"));
    Ok(())
}

async fn rm(client: &ApiClient, id: i64, yes: bool) -> Result<()> {
    if !confirm_or_skip(&format!("delete scrape #{id}?"), yes)? {
        return Ok(());
    }
    client.delete_scrape(id).await?;
    notice_ok(&format!("scrape #{id} deleted"));
    Ok(())
}
