//! End-to-end behavior of the streaming ingestor over the public surface:
//! reassembly across arbitrary chunk boundaries, ordering, malformed-record
//! tolerance, cancellation silence, and trailing-partial discard.

use futures::StreamExt;
use ragline_core::stream::{
    CancelHandle, CollectingHandler, SessionOutcome, StreamEvent, StreamHandler, StreamSession,
    ingest_events,
};

type Chunk = Result<Vec<u8>, String>;

fn chunks_of(parts: &[&str]) -> Vec<Chunk> {
    parts.iter().map(|p| Ok(p.as_bytes().to_vec())).collect()
}

async fn run_chunks(parts: &[&str]) -> (SessionOutcome, Vec<StreamEvent>, String) {
    let mut session = StreamSession::new();
    let mut handler = CollectingHandler::default();
    let outcome = session
        .run(futures::stream::iter(chunks_of(parts)), &mut handler)
        .await;
    let accumulated = session.accumulated().to_string();
    (outcome, handler.events, accumulated)
}

/// Every way of splitting a stream yields the same classified events as
/// delivering it whole.
#[tokio::test]
async fn reassembly_is_split_invariant() {
    let stream = "data: {\"token\":\"Hel\"}\n\ndata: {\"token\":\"lo\"}\n\n\
                  data: {\"done\":true,\"messageId\":7}\n\n";

    let (_, expected, _) = run_chunks(&[stream]).await;
    assert_eq!(expected.len(), 3);

    // Split at every byte offset, including mid-record and mid-separator.
    for split in 1..stream.len() {
        let (outcome, events, accumulated) = run_chunks(&[&stream[..split], &stream[split..]]).await;
        assert_eq!(events, expected, "split at byte {split} changed the events");
        assert_eq!(outcome, SessionOutcome::Completed { message_id: 7 });
        assert_eq!(accumulated, "Hello");
    }
}

#[tokio::test]
async fn events_fire_in_record_order() {
    let parts: Vec<String> = (0..10)
        .map(|i| format!("data: {{\"token\":\"t{i}\"}}\n\n"))
        .collect();
    let joined = parts.concat();

    let (_, events, _) = run_chunks(&[&joined]).await;
    let texts: Vec<&str> = events
        .iter()
        .map(|event| match event {
            StreamEvent::Token { text } => text.as_str(),
            other => panic!("unexpected event {other:?}"),
        })
        .collect();

    let expected: Vec<String> = (0..10).map(|i| format!("t{i}")).collect();
    assert_eq!(texts, expected);
}

/// A malformed record between two valid ones affects neither and never
/// reaches the error callback.
#[tokio::test]
async fn malformed_records_are_invisible() {
    let stream = "data: {\"token\":\"A\"}\n\ndata: not-json\n\ndata: {\"token\":\"B\"}\n\n";
    let (outcome, events, accumulated) = run_chunks(&[stream]).await;

    assert_eq!(outcome, SessionOutcome::Exhausted);
    assert_eq!(
        events,
        vec![
            StreamEvent::Token { text: "A".into() },
            StreamEvent::Token { text: "B".into() },
        ]
    );
    assert_eq!(accumulated, "AB");

    // Same for a record missing the data prefix entirely.
    let stream = "data: {\"token\":\"A\"}\n\n: comment\n\ndata: {\"token\":\"B\"}\n\n";
    let (_, events, _) = run_chunks(&[stream]).await;
    assert_eq!(events.len(), 2);
}

#[tokio::test]
async fn trailing_partial_record_is_discarded() {
    let stream = "data: {\"token\":\"done part\"}\n\ndata: {\"token\":\"never finis";
    let (outcome, events, _) = run_chunks(&[stream]).await;

    assert_eq!(outcome, SessionOutcome::Exhausted);
    assert_eq!(
        events,
        vec![StreamEvent::Token {
            text: "done part".into()
        }]
    );
}

/// Cancels the session from inside the token callback.
struct CancelAfterFirstToken {
    cancel: CancelHandle,
    events: Vec<StreamEvent>,
}

impl StreamHandler for CancelAfterFirstToken {
    fn on_token(&mut self, text: &str) {
        self.events.push(StreamEvent::Token {
            text: text.to_string(),
        });
        self.cancel.cancel();
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

/// Cancellation after the first token suppresses everything already
/// buffered or still in flight, and is not an error.
#[tokio::test]
async fn cancellation_silences_queued_events() {
    // Both records arrive in a single chunk, so the second is already
    // buffered when the handler cancels.
    let source = futures::stream::iter(chunks_of(&[
        "data: {\"token\":\"first\"}\n\ndata: {\"token\":\"second\"}\n\n",
        "data: {\"done\":true,\"messageId\":1}\n\n",
    ]));

    let mut session = StreamSession::new();
    let mut handler = CancelAfterFirstToken {
        cancel: session.cancel_handle(),
        events: Vec::new(),
    };

    let outcome = session.run(source, &mut handler).await;

    assert_eq!(outcome, SessionOutcome::Cancelled);
    assert_eq!(
        handler.events,
        vec![StreamEvent::Token {
            text: "first".into()
        }]
    );
}

#[tokio::test]
async fn cancellation_before_any_read_emits_nothing() {
    let cancel = CancelHandle::new();
    cancel.cancel();

    let source = futures::stream::iter(chunks_of(&["data: {\"token\":\"x\"}\n\n"]));
    let events: Vec<_> = ingest_events(source, cancel).collect().await;
    assert!(events.is_empty());
}

// Concrete end-to-end shapes the backend actually produces.

#[tokio::test]
async fn scenario_mid_record_split_yields_single_token() {
    let (_, events, accumulated) =
        run_chunks(&["data: {\"to", "ken\":\"Hel", "lo\"}\n\n"]).await;
    assert_eq!(
        events,
        vec![StreamEvent::Token {
            text: "Hello".into()
        }]
    );
    assert_eq!(accumulated, "Hello");
}

#[tokio::test]
async fn scenario_server_error_then_exhaustion() {
    let (outcome, events, _) = run_chunks(&["data: {\"error\":\"backend failure\"}\n\n"]).await;

    assert_eq!(outcome, SessionOutcome::Exhausted);
    assert_eq!(
        events,
        vec![StreamEvent::Error {
            message: "backend failure".into()
        }]
    );
}

#[tokio::test]
async fn scenario_done_carries_message_id() {
    let (outcome, events, _) = run_chunks(&["data: {\"done\":true,\"messageId\":42}\n\n"]).await;

    assert_eq!(outcome, SessionOutcome::Completed { message_id: 42 });
    assert_eq!(events, vec![StreamEvent::Done { message_id: 42 }]);
}

#[tokio::test]
async fn event_stream_surface_matches_handler_surface() {
    let source = futures::stream::iter(chunks_of(&[
        "data: {\"token\":\"A\"}\n\ndata: {\"done\":true,\"messageId\":3}\n\n",
    ]));

    let events: Vec<_> = ingest_events(source, CancelHandle::new())
        .map(|item| item.expect("no transport failure"))
        .collect()
        .await;

    assert_eq!(
        events,
        vec![
            StreamEvent::Token { text: "A".into() },
            StreamEvent::Done { message_id: 3 },
        ]
    );
}
