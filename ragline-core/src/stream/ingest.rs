//! Record reassembly and the read loop.
//!
//! The source yields opaque chunks at unpredictable boundaries: one record
//! may span several chunks and one chunk may hold several records. A
//! persistent buffer absorbs each chunk; complete records are drained off
//! the front and the (possibly incomplete) tail stays behind for the next
//! read.

use async_stream::stream;
use futures::{Stream, StreamExt};
use serde_json::Value;

use super::{CancelHandle, SessionOutcome, StreamError, StreamEvent, StreamHandler};
use crate::config::constants::streaming::{RECORD_PREFIX, RECORD_SEPARATOR};

/// Drain complete records from `buffer` and return their payloads with the
/// `data:` prefix stripped.
///
/// Records lacking the prefix are malformed and dropped without ending the
/// stream. Incomplete trailing content remains in the buffer for the next
/// call.
pub fn drain_records(buffer: &mut String) -> Vec<String> {
    let mut payloads = Vec::new();

    loop {
        let Some(idx) = buffer.find(RECORD_SEPARATOR) else {
            break;
        };

        let raw_record = buffer[..idx].replace('\r', "");
        buffer.drain(..idx + RECORD_SEPARATOR.len());

        if raw_record.trim().is_empty() {
            continue;
        }

        match extract_payload(&raw_record) {
            Some(payload) if !payload.is_empty() => payloads.push(payload),
            Some(_) => {}
            None => {
                tracing::debug!(record = %raw_record, "record without data prefix; skipping");
            }
        }
    }

    payloads
}

fn extract_payload(record: &str) -> Option<String> {
    let mut data_lines = Vec::new();

    for line in record.lines() {
        if let Some(data) = line.trim_end().strip_prefix(RECORD_PREFIX) {
            data_lines.push(data.trim_start());
        }
    }

    if data_lines.is_empty() {
        None
    } else {
        Some(data_lines.join("\n"))
    }
}

/// Classify one payload into a [`StreamEvent`].
///
/// Recognized fields are checked in fixed priority order: `token`, then
/// `error`, then `done` together with `messageId`. Invalid JSON and
/// unrecognized shapes yield `None` and are skipped by the caller.
fn classify_record(payload: &str) -> Option<StreamEvent> {
    let value: Value = match serde_json::from_str(payload) {
        Ok(value) => value,
        Err(err) => {
            tracing::debug!(%err, payload, "unparseable stream record; skipping");
            return None;
        }
    };

    if let Some(text) = value.get("token").and_then(Value::as_str) {
        if text.is_empty() {
            return None;
        }
        return Some(StreamEvent::Token {
            text: text.to_string(),
        });
    }

    if let Some(message) = value.get("error").and_then(Value::as_str) {
        return Some(StreamEvent::Error {
            message: message.to_string(),
        });
    }

    if value.get("done").and_then(Value::as_bool).unwrap_or(false) {
        if let Some(message_id) = value.get("messageId").and_then(Value::as_i64) {
            return Some(StreamEvent::Done { message_id });
        }
    }

    tracing::debug!(payload, "unrecognized stream record shape; skipping");
    None
}

/// Turn a chunked byte source into a stream of classified events.
///
/// The returned stream ends on source exhaustion, on the first transport
/// failure (reported once as `Err`), or silently once `cancel` is observed.
/// A transport failure that follows cancellation is attributed to the
/// aborted request and swallowed. Trailing buffered content that never
/// formed a complete record is discarded at exhaustion.
pub fn ingest_events<S, B, E>(
    source: S,
    cancel: CancelHandle,
) -> impl Stream<Item = Result<StreamEvent, StreamError>>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    stream! {
        let mut source = std::pin::pin!(source);
        let mut buffer = String::new();

        loop {
            if cancel.is_cancelled() {
                return;
            }

            let Some(next) = source.next().await else {
                break;
            };

            let chunk = match next {
                Ok(chunk) => chunk,
                Err(err) => {
                    if cancel.is_cancelled() {
                        return;
                    }
                    yield Err(StreamError::Transport(err.to_string()));
                    return;
                }
            };

            buffer.push_str(&String::from_utf8_lossy(chunk.as_ref()));

            for payload in drain_records(&mut buffer) {
                if cancel.is_cancelled() {
                    return;
                }
                if let Some(event) = classify_record(&payload) {
                    yield Ok(event);
                }
            }
        }

        if !buffer.trim().is_empty() {
            tracing::debug!(pending = buffer.len(), "discarding incomplete trailing record");
        }
    }
}

/// One streaming request, from first read to terminal state.
///
/// Owns the accumulated answer text and the cancellation flag. Created per
/// request and discarded when [`run`](Self::run) returns; never reused.
#[derive(Debug)]
pub struct StreamSession {
    cancel: CancelHandle,
    accumulated: String,
}

impl StreamSession {
    pub fn new() -> Self {
        Self::with_cancel(CancelHandle::new())
    }

    /// Build a session around an externally held cancellation flag.
    pub fn with_cancel(cancel: CancelHandle) -> Self {
        Self {
            cancel,
            accumulated: String::new(),
        }
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Concatenation of every token fragment seen so far, in arrival order.
    pub fn accumulated(&self) -> &str {
        &self.accumulated
    }

    /// Drive `source` to exhaustion, cancellation, or transport failure,
    /// dispatching each event to `handler` in arrival order.
    ///
    /// A server `Error` record is reported but leaves the loop reading; a
    /// transport failure is reported once and terminates it. Cancellation
    /// terminates silently: nothing is dispatched after the flag is
    /// observed, including for events already buffered.
    pub async fn run<S, B, E, H>(&mut self, source: S, handler: &mut H) -> SessionOutcome
    where
        S: Stream<Item = Result<B, E>>,
        B: AsRef<[u8]>,
        E: std::fmt::Display,
        H: StreamHandler + ?Sized,
    {
        let events = ingest_events(source, self.cancel.clone());
        let mut events = std::pin::pin!(events);
        let mut completed = None;

        while let Some(item) = events.next().await {
            if self.cancel.is_cancelled() {
                return SessionOutcome::Cancelled;
            }

            match item {
                Ok(StreamEvent::Token { text }) => {
                    self.accumulated.push_str(&text);
                    handler.on_token(&text);
                }
                Ok(StreamEvent::Error { message }) => {
                    handler.on_error(&message);
                }
                Ok(StreamEvent::Done { message_id }) => {
                    completed = Some(message_id);
                    handler.on_complete(message_id);
                }
                Err(err) => {
                    handler.on_error(&err.to_string());
                    return SessionOutcome::Failed;
                }
            }
        }

        if self.cancel.is_cancelled() {
            SessionOutcome::Cancelled
        } else if let Some(message_id) = completed {
            SessionOutcome::Completed { message_id }
        } else {
            SessionOutcome::Exhausted
        }
    }
}

impl Default for StreamSession {
    fn default() -> Self {
        Self::new()
    }
}
