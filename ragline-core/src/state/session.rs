//! In-memory session state: context selection, the active-stream slot, and
//! optimistic message reconciliation.
//!
//! This is the explicit replacement for what the reference client kept in
//! a global store. The state is owned by the interactive loop and passed
//! where needed; nothing reads it ambiently.

use crate::api::ChatMessage;
use crate::stream::CancelHandle;

/// Provisional assistant entry shown while a stream is in flight, before
/// the server has confirmed and persisted the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMessage {
    pub provisional_id: u64,
    pub chat_id: i64,
    pub content: String,
}

/// State for one interactive session.
#[derive(Debug, Default)]
pub struct SessionState {
    selected_files: Vec<i64>,
    selected_scrapes: Vec<i64>,
    active_stream: Option<CancelHandle>,
    pending: Option<PendingMessage>,
    next_provisional_id: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle a document id in the context selection.
    pub fn toggle_file(&mut self, id: i64) -> bool {
        toggle(&mut self.selected_files, id)
    }

    /// Toggle a scrape-job id in the context selection.
    pub fn toggle_scrape(&mut self, id: i64) -> bool {
        toggle(&mut self.selected_scrapes, id)
    }

    pub fn selected_files(&self) -> &[i64] {
        &self.selected_files
    }

    pub fn selected_scrapes(&self) -> &[i64] {
        &self.selected_scrapes
    }

    pub fn clear_selection(&mut self) {
        self.selected_files.clear();
        self.selected_scrapes.clear();
    }

    /// Union of explicit ids and the current selection, in order:
    /// explicit, then selected documents, then selected scrapes.
    /// Duplicates are dropped on first occurrence.
    pub fn merged_context(&self, explicit: &[i64]) -> Vec<i64> {
        let mut ids = Vec::new();
        for id in explicit
            .iter()
            .chain(self.selected_files.iter())
            .chain(self.selected_scrapes.iter())
        {
            if !ids.contains(id) {
                ids.push(*id);
            }
        }
        ids
    }

    /// Start a streaming request for `chat_id`.
    ///
    /// At most one stream is active per session: a still-active previous
    /// stream is cancelled before the new handle is installed. Also
    /// records the provisional assistant entry for later reconciliation.
    pub fn begin_stream(&mut self, chat_id: i64) -> CancelHandle {
        if let Some(previous) = self.active_stream.take() {
            previous.cancel();
        }

        self.next_provisional_id += 1;
        self.pending = Some(PendingMessage {
            provisional_id: self.next_provisional_id,
            chat_id,
            content: String::new(),
        });

        let handle = CancelHandle::new();
        self.active_stream = Some(handle.clone());
        handle
    }

    /// Append streamed text to the provisional entry.
    pub fn push_partial(&mut self, text: &str) {
        if let Some(pending) = &mut self.pending {
            pending.content.push_str(text);
        }
    }

    pub fn pending(&self) -> Option<&PendingMessage> {
        self.pending.as_ref()
    }

    /// Cancel the active stream, if any. The provisional entry is dropped:
    /// a cancelled answer is never persisted server-side.
    pub fn cancel_active(&mut self) -> bool {
        self.pending = None;
        match self.active_stream.take() {
            Some(handle) => {
                handle.cancel();
                true
            }
            None => false,
        }
    }

    /// Mark the stream finished without resolving the provisional entry
    /// (used after a failed stream; the entry is discarded).
    pub fn finish_stream(&mut self) {
        self.active_stream = None;
        self.pending = None;
    }

    /// Replace the provisional entry with the confirmed message.
    ///
    /// Looks up the completion event's `message_id` in the refreshed
    /// history; on a hit the provisional entry is dropped atomically and
    /// the confirmed message returned. On a miss the provisional entry is
    /// kept so the caller can retry after another refresh.
    pub fn reconcile(&mut self, message_id: i64, history: &[ChatMessage]) -> Option<ChatMessage> {
        let confirmed = history.iter().find(|message| message.id == message_id)?;
        self.pending = None;
        self.active_stream = None;
        Some(confirmed.clone())
    }
}

fn toggle(ids: &mut Vec<i64>, id: i64) -> bool {
    if let Some(pos) = ids.iter().position(|existing| *existing == id) {
        ids.remove(pos);
        false
    } else {
        ids.push(id);
        true
    }
}
