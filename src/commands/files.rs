//! Uploaded document commands.

use anyhow::Result;
use console::style;
use ragline_core::ApiClient;

use super::{confirm_or_skip, format_size, notice_err, notice_ok, print_json, spinner};
use crate::cli::FilesCommand;

pub async fn run(client: &ApiClient, command: FilesCommand, json: bool) -> Result<()> {
    match command {
        FilesCommand::List => list(client, json).await,
        FilesCommand::Add { paths } => add(client, paths).await,
        FilesCommand::Show { id } => show(client, id, json).await,
        FilesCommand::Rm { id, yes } => rm(client, id, yes).await,
    }
}

async fn list(client: &ApiClient, json: bool) -> Result<()> {
    let files = client.list_files().await?;
    if json {
        return print_json(&files);
    }

    if files.is_empty() {
        println!("{}", style("no documents uploaded").dim());
        return Ok(());
    }

    for file in files {
        println!(
            "{:>6}  {:<40} {:>10}  {}",
            style(format!("#{}", file.id)).cyan(),
            file.filename,
            format_size(file.file_size),
            style(file.upload_date.format("%Y-%m-%d %H:%M")).dim()
        );
    }
    Ok(())
}

async fn add(client: &ApiClient, paths: Vec<std::path::PathBuf>) -> Result<()> {
    let bar = spinner(&format!("uploading {} file(s)", paths.len()));
    let outcome = client.upload_files(&paths).await;
    bar.finish_and_clear();

    let outcome = outcome?;
    for file in &outcome.files {
        notice_ok(&format!("{} uploaded as #{}", file.filename, file.id));
    }
    for rejection in &outcome.errors {
        notice_err(&format!("{}: {}", rejection.filename, rejection.error));
    }
    Ok(())
}

async fn show(client: &ApiClient, id: i64, json: bool) -> Result<()> {
    let file = client.get_file(id).await?;
    if json {
        return print_json(&file);
    }

    println!(
        "{} {} ({}, {})",
        style(format!("#{}", file.id)).cyan(),
        style(&file.filename).bold(),
        file.content_type,
        format_size(file.file_size)
    );
    println!(
        "{}",
        style(format!("uploaded {}", file.upload_date.format("%Y-%m-%d %H:%M"))).dim()
    );

    match &file.markdown_content {
        Some(content) if !content.is_empty() => {
            println!();
            termimad::MadSkin::default().print_text(content);
        }
        _ => println!("{}", style("no extracted text available").dim()),
    }
    Ok(())
}

async fn rm(client: &ApiClient, id: i64, yes: bool) -> Result<()> {
    if !confirm_or_skip(&format!("delete document #{id}?"), yes)? {
        return Ok(());
    }
    client.delete_file(id).await?;
    notice_ok(&format!("document #{id} deleted"));
    Ok(())
}
