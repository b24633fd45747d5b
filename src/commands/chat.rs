//! Conversation commands and the interactive chat loop.

use std::io::Write;

use anyhow::Result;
use console::style;
use dialoguer::Input;
use indicatif::ProgressBar;
use ragline_core::{
    ApiClient, Chat, MessageRole, RaglineConfig, SessionOutcome, SessionState, StreamHandler,
    StreamSession,
};

use super::{confirm_or_skip, notice_err, notice_ok, print_json, spinner};
use crate::cli::ChatCommand;

pub async fn run(
    client: &ApiClient,
    config: &RaglineConfig,
    command: ChatCommand,
    json: bool,
) -> Result<()> {
    match command {
        ChatCommand::List => list(client, json).await,
        ChatCommand::New { title } => new(client, &title.join(" ")).await,
        ChatCommand::Rm { id, yes } => rm(client, id, yes).await,
        ChatCommand::Open { id } => open(client, config, id).await,
    }
}

async fn list(client: &ApiClient, json: bool) -> Result<()> {
    let chats = client.list_chats().await?;
    if json {
        return print_json(&chats);
    }

    if chats.is_empty() {
        println!("{}", style("no conversations yet").dim());
        return Ok(());
    }

    for chat in chats {
        println!(
            "{:>6}  {:<40} {:>4} msg  {}",
            style(format!("#{}", chat.id)).cyan(),
            chat.title,
            chat.message_count,
            style(chat.updated_at.format("%Y-%m-%d %H:%M")).dim()
        );
    }
    Ok(())
}

async fn new(client: &ApiClient, title: &str) -> Result<()> {
    let chat = client.create_chat(title).await?;
    notice_ok(&format!("conversation #{} created: {}", chat.id, chat.title));
    Ok(())
}

async fn rm(client: &ApiClient, id: i64, yes: bool) -> Result<()> {
    if !confirm_or_skip(&format!("delete conversation #{id}?"), yes)? {
        return Ok(());
    }
    client.delete_chat(id).await?;
    notice_ok(&format!("conversation #{id} deleted"));
    Ok(())
}

/// One-shot streamed question with an explicit context id list.
pub async fn ask(client: &ApiClient, chat_id: i64, context: &[i64], message: &str) -> Result<()> {
    let mut state = SessionState::new();
    stream_turn(client, &mut state, chat_id, message, context).await
}

async fn open(client: &ApiClient, config: &RaglineConfig, chat_id: i64) -> Result<()> {
    let chat = client.get_chat(chat_id).await?;
    println!(
        "{} {}",
        style(&chat.title).bold(),
        style(format!("(conversation #{})", chat.id)).dim()
    );
    render_history(&chat, config.history_window);
    println!("{}", style("type a message, or :help for commands").dim());

    let mut state = SessionState::new();
    loop {
        let line: String = Input::new()
            .with_prompt("you")
            .allow_empty(true)
            .interact_text()?;
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }

        if let Some(directive) = line.strip_prefix(':') {
            if handle_directive(client, &mut state, directive).await? == Flow::Quit {
                break;
            }
            continue;
        }

        stream_turn(client, &mut state, chat_id, &line, &[]).await?;
    }
    Ok(())
}

fn render_history(chat: &Chat, window: usize) {
    let skin = termimad::MadSkin::default();
    let start = chat.messages.len().saturating_sub(window);
    if start > 0 {
        println!("{}", style(format!("… {start} earlier messages")).dim());
    }
    for message in &chat.messages[start..] {
        match message.role {
            MessageRole::User => {
                println!("{} {}", style("you:").cyan().bold(), message.content);
            }
            MessageRole::Assistant => {
                println!("{}", style("assistant:").magenta().bold());
                skin.print_text(&message.content);
            }
        }
    }
}

/// Prints streamed tokens as they arrive; surfaces error records as
/// notices without interrupting the stream.
struct StreamPrinter {
    bar: Option<ProgressBar>,
    printed: bool,
}

impl StreamPrinter {
    fn new(bar: ProgressBar) -> Self {
        Self {
            bar: Some(bar),
            printed: false,
        }
    }

    fn clear_spinner(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }

    fn finish_line(&mut self) {
        if self.printed {
            println!();
            self.printed = false;
        }
    }
}

impl StreamHandler for StreamPrinter {
    fn on_token(&mut self, text: &str) {
        self.clear_spinner();
        if !self.printed {
            println!("{}", style("assistant:").magenta().bold());
            self.printed = true;
        }
        print!("{text}");
        let _ = std::io::stdout().flush();
    }

    fn on_error(&mut self, message: &str) {
        self.clear_spinner();
        self.finish_line();
        notice_err(message);
    }
}

/// Send one message and stream the answer, honoring Ctrl-C as a silent
/// cooperative cancel.
async fn stream_turn(
    client: &ApiClient,
    state: &mut SessionState,
    chat_id: i64,
    message: &str,
    explicit_context: &[i64],
) -> Result<()> {
    let context = state.merged_context(explicit_context);
    let cancel = state.begin_stream(chat_id);
    let mut session = StreamSession::with_cancel(cancel.clone());

    let watcher = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let mut printer = StreamPrinter::new(spinner("thinking"));
    let result = client
        .stream_message(chat_id, message, &context, &mut session, &mut printer)
        .await;
    watcher.abort();
    printer.clear_spinner();

    match result {
        Err(err) => {
            printer.finish_line();
            state.finish_stream();
            notice_err(&err.to_string());
        }
        Ok(SessionOutcome::Cancelled) => {
            printer.finish_line();
            println!("{}", style("(cancelled)").dim());
            state.cancel_active();
        }
        Ok(SessionOutcome::Completed { message_id }) => {
            printer.finish_line();
            state.push_partial(session.accumulated());
            resolve_completion(client, state, chat_id, message_id).await;
        }
        Ok(SessionOutcome::Failed) | Ok(SessionOutcome::Exhausted) => {
            printer.finish_line();
            state.finish_stream();
        }
    }
    Ok(())
}

/// Swap the provisional answer for the server-confirmed message.
async fn resolve_completion(
    client: &ApiClient,
    state: &mut SessionState,
    chat_id: i64,
    message_id: i64,
) {
    match client.get_chat(chat_id).await {
        Ok(chat) => match state.reconcile(message_id, &chat.messages) {
            Some(confirmed) => {
                println!(
                    "{}",
                    style(format!("saved as message #{}", confirmed.id)).dim()
                );
            }
            None => {
                tracing::warn!(message_id, "completed message missing from history");
                state.finish_stream();
            }
        },
        Err(err) => {
            state.finish_stream();
            notice_err(&format!("could not refresh history: {err}"));
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

async fn handle_directive(
    client: &ApiClient,
    state: &mut SessionState,
    directive: &str,
) -> Result<Flow> {
    let mut words = directive.split_whitespace();
    match words.next().unwrap_or("") {
        "q" | "quit" => return Ok(Flow::Quit),
        "help" => {
            println!(":docs           list documents with selection markers");
            println!(":urls           list scrape jobs with selection markers");
            println!(":doc <id>...    toggle a document in the context");
            println!(":url <id>...    toggle a scrape job in the context");
            println!(":ctx            show the current context selection");
            println!(":clear          clear the context selection");
            println!(":q              leave the conversation");
        }
        "ctx" => {
            let ids = state.merged_context(&[]);
            if ids.is_empty() {
                println!("{}", style("no context selected").dim());
            } else {
                println!(
                    "documents: {:?}  scrape jobs: {:?}",
                    state.selected_files(),
                    state.selected_scrapes()
                );
            }
        }
        "clear" => {
            state.clear_selection();
            notice_ok("context cleared");
        }
        "docs" => {
            for file in client.list_files().await? {
                let marker = if state.selected_files().contains(&file.id) {
                    style("[x]").green()
                } else {
                    style("[ ]").dim()
                };
                println!(
                    "{marker} {:>6}  {}",
                    style(format!("#{}", file.id)).cyan(),
                    file.filename
                );
            }
        }
        "urls" => {
            for job in client.list_scrapes().await? {
                let marker = if state.selected_scrapes().contains(&job.id) {
                    style("[x]").green()
                } else {
                    style("[ ]").dim()
                };
                println!(
                    "{marker} {:>6}  {:<12} {}",
                    style(format!("#{}", job.id)).cyan(),
                    job.status.to_string(),
                    job.url
                );
            }
        }
        "doc" => toggle_ids(words, |id| state.toggle_file(id), "document"),
        "url" => toggle_ids(words, |id| state.toggle_scrape(id), "scrape job"),
        other => notice_err(&format!("unknown command :{other}; try :help")),
    }
    Ok(Flow::Continue)
}

fn toggle_ids<'a>(
    words: impl Iterator<Item = &'a str>,
    mut toggle: impl FnMut(i64) -> bool,
    kind: &str,
) {
    for word in words {
        match word.parse::<i64>() {
            Ok(id) => {
                if toggle(id) {
                    notice_ok(&format!("{kind} #{id} added to context"));
                } else {
                    notice_ok(&format!("{kind} #{id} removed from context"));
                }
            }
            Err(_) => notice_err(&format!("not an id: {word}")),
        }
    }
}
