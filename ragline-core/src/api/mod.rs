//! Typed client for the knowledge-base backend: auth, uploaded documents,
//! URL scrape jobs, and chats with streamed answers.

pub mod auth;
pub mod chats;
pub mod client;
pub mod files;
pub mod scrapes;

pub use auth::{AuthSession, LoginRequest, RegisterRequest, UserProfile};
pub use chats::{Chat, ChatMessage, MessageRole, SendOutcome};
pub use client::{ApiClient, ApiError};
pub use files::{DocumentFile, UploadOutcome, UploadRejection};
pub use scrapes::{ScrapeJob, ScrapeStatus, ScrapedContent};
