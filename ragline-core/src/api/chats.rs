//! Conversations and messages, including the streaming send path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::client::{ApiClient, ApiError};
use crate::config::constants::routes;
use crate::stream::{SessionOutcome, StreamHandler, StreamSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// A conversation. The list endpoint omits the message bodies; the detail
/// endpoint includes the full ordered history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub last_message: Option<String>,
    #[serde(default)]
    pub message_count: u64,
}

/// Result of the blocking (non-streaming) send.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendOutcome {
    pub user_message: ChatMessage,
    pub ai_message: ChatMessage,
}

#[derive(Debug, Serialize)]
struct MessageBody<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    scrape_ids: Option<&'a [i64]>,
}

impl ApiClient {
    pub async fn list_chats(&self) -> Result<Vec<Chat>, ApiError> {
        self.get_json(routes::chats::COLLECTION).await
    }

    pub async fn create_chat(&self, title: &str) -> Result<Chat, ApiError> {
        self.post_json(routes::chats::COLLECTION, &serde_json::json!({ "title": title }))
            .await
    }

    pub async fn get_chat(&self, id: i64) -> Result<Chat, ApiError> {
        self.get_json(&routes::chats::detail(id)).await
    }

    pub async fn delete_chat(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&routes::chats::detail(id)).await
    }

    /// Blocking send: waits for the full generation and returns both
    /// persisted messages.
    pub async fn send_message(
        &self,
        chat_id: i64,
        message: &str,
        context_ids: &[i64],
    ) -> Result<SendOutcome, ApiError> {
        let body = MessageBody {
            message,
            scrape_ids: some_if_nonempty(context_ids),
        };
        self.post_json(&routes::chats::messages(chat_id), &body).await
    }

    /// Streaming send: issues the request and drives the response body
    /// through `session`, dispatching events to `handler` as they arrive.
    ///
    /// `context_ids` is the already-merged union of explicit and selected
    /// ids; it is omitted from the body entirely when empty. Errors here
    /// cover request setup and the HTTP status only; everything after the
    /// first byte is reported through the handler and the returned
    /// [`SessionOutcome`].
    pub async fn stream_message<H>(
        &self,
        chat_id: i64,
        message: &str,
        context_ids: &[i64],
        session: &mut StreamSession,
        handler: &mut H,
    ) -> Result<SessionOutcome, ApiError>
    where
        H: StreamHandler + ?Sized,
    {
        let body = MessageBody {
            message,
            scrape_ids: some_if_nonempty(context_ids),
        };
        let response = self
            .post_stream(&routes::chats::messages_stream(chat_id), &body)
            .await?;

        Ok(session.run(response.bytes_stream(), handler).await)
    }
}

fn some_if_nonempty(ids: &[i64]) -> Option<&[i64]> {
    if ids.is_empty() { None } else { Some(ids) }
}
