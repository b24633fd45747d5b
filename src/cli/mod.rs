//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "ragline",
    version,
    about = "Terminal client for a document/URL knowledge base with streamed chat answers"
)]
pub struct Cli {
    /// Backend base URL; overrides the config file and RAGLINE_API_URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Print raw JSON instead of formatted output where applicable
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an account and log in
    Register,

    /// Log in with email and password
    Login {
        /// Email; prompted for when omitted
        #[arg(long)]
        email: Option<String>,
    },

    /// Forget the stored credentials
    Logout,

    /// Show the profile behind the stored token
    Whoami,

    /// Manage uploaded documents
    #[command(subcommand)]
    Files(FilesCommand),

    /// Manage URL scrape jobs
    #[command(subcommand)]
    Urls(UrlsCommand),

    /// Manage conversations and chat interactively
    #[command(subcommand)]
    Chat(ChatCommand),

    /// One-shot question with a streamed answer
    Ask {
        /// Conversation to ask in
        chat_id: i64,
        /// Context id to ground the answer; repeatable
        #[arg(short = 'c', long = "context")]
        context: Vec<i64>,
        /// The question
        #[arg(required = true)]
        message: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum FilesCommand {
    /// List uploaded documents
    List,
    /// Upload one or more local files
    Add {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Show one document, including its extracted text
    Show { id: i64 },
    /// Delete a document
    Rm {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum UrlsCommand {
    /// List scrape jobs
    List,
    /// Register a URL for scraping
    Add {
        url: String,
        /// Poll until the job reaches a terminal status
        #[arg(long)]
        watch: bool,
    },
    /// Show one scrape job
    Show { id: i64 },
    /// Show the extracted content blocks of a scrape job
    Contents { id: i64 },
    /// Re-queue a completed or failed job
    Retry { id: i64 },
    /// Delete a scrape job
    Rm {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ChatCommand {
    /// List conversations
    List,
    /// Create a conversation
    New {
        #[arg(required = true)]
        title: Vec<String>,
    },
    /// Delete a conversation
    Rm {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Open a conversation interactively
    Open { id: i64 },
}
