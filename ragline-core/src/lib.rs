//! # ragline-core
//!
//! Core library for `ragline`, a terminal client for a remote document/URL
//! knowledge base with streamed chat answers.
//!
//! The crate is organized into four modules:
//!
//! - `config/`: layered configuration (defaults, TOML file, environment).
//! - `api/`: typed HTTP client for the backend: auth, uploaded documents,
//!   URL scrape jobs, chats, and the streaming message endpoint.
//! - `stream/`: the streaming-response ingestor: record reassembly across
//!   arbitrary chunk boundaries, event classification, cooperative
//!   cancellation.
//! - `state/`: the persisted credential store and the per-session state
//!   container (context selection, active-stream slot, optimistic message
//!   reconciliation).
//!
//! The binary crate wires these together; nothing here reads credentials
//! or configuration from ambient global state.

pub mod api;
pub mod config;
pub mod state;
pub mod stream;

// Re-exports for convenience
pub use api::{
    ApiClient, ApiError, AuthSession, Chat, ChatMessage, DocumentFile, LoginRequest, MessageRole,
    RegisterRequest, ScrapeJob, ScrapeStatus, ScrapedContent, SendOutcome, UploadOutcome,
    UserProfile,
};
pub use config::{ConfigError, RaglineConfig};
pub use state::{CredentialStore, SessionState, StoredCredentials};
pub use stream::{
    CancelHandle, SessionOutcome, StreamError, StreamEvent, StreamHandler, StreamSession,
};
