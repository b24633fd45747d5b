//! Streaming response ingestion for the chat endpoint.
//!
//! The backend streams generated answers as a server-sent-event-style body:
//! records separated by a blank line, each carrying a `data: ` prefix and a
//! JSON payload. Network chunk boundaries are arbitrary, so records are
//! reassembled through a persistent buffer before classification.
//!
//! This module provides the parsing state machine ([`ingest_events`]), the
//! callback-driven session wrapper ([`StreamSession`]), and the cooperative
//! cancellation flag ([`CancelHandle`]) shared between the two.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub mod ingest;

pub use ingest::{StreamSession, drain_records, ingest_events};

/// One classified record from the chat streaming endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// An incremental fragment of the generated answer.
    Token { text: String },
    /// A failure the server reported mid-stream.
    Error { message: String },
    /// Terminal success marker carrying the id of the persisted message.
    Done { message_id: i64 },
}

/// Failure of the underlying transport while reading the stream.
///
/// Server-reported errors are not transport failures; they arrive as
/// [`StreamEvent::Error`] records and leave the read loop running.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("stream read failed: {0}")]
    Transport(String),
}

/// Terminal state of a [`StreamSession`].
///
/// A session reaches exactly one of these and is then discarded; sessions
/// are never reused across requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The server confirmed completion with the persisted message id.
    Completed { message_id: i64 },
    /// The source ended without a completion record.
    Exhausted,
    /// A transport read failed mid-stream.
    Failed,
    /// The caller cancelled the session.
    Cancelled,
}

/// Cooperative cancellation flag.
///
/// Clones share the flag. The read loop checks it before each read and
/// before dispatching each record; once set, no further callback fires and
/// a read failure caused by the aborted request is swallowed.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Callbacks invoked by [`StreamSession::run`], in record arrival order.
///
/// All methods default to no-ops so callers implement only what they need.
pub trait StreamHandler {
    /// An incremental content fragment arrived.
    fn on_token(&mut self, _text: &str) {}

    /// The server reported an error, or a transport read failed.
    fn on_error(&mut self, _message: &str) {}

    /// The server finished and persisted the answer under `message_id`.
    fn on_complete(&mut self, _message_id: i64) {}
}

/// Collects events into a vector; handy for tests and non-interactive use.
#[derive(Debug, Default)]
pub struct CollectingHandler {
    pub events: Vec<StreamEvent>,
}

impl StreamHandler for CollectingHandler {
    fn on_token(&mut self, text: &str) {
        self.events.push(StreamEvent::Token {
            text: text.to_string(),
        });
    }

    fn on_error(&mut self, message: &str) {
        self.events.push(StreamEvent::Error {
            message: message.to_string(),
        });
    }

    fn on_complete(&mut self, message_id: i64) {
        self.events.push(StreamEvent::Done { message_id });
    }
}
