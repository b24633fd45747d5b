//! HTTP-level tests of the API client against a mock server: request
//! shapes, response decoding, error-body extraction, and the streamed chat
//! path.

use mockito::Matcher;
use ragline_core::api::{ApiClient, ApiError, LoginRequest, ScrapeStatus};
use ragline_core::stream::{CollectingHandler, SessionOutcome, StreamEvent, StreamSession};
use serde_json::json;

fn client_for(server: &mockito::ServerGuard) -> ApiClient {
    ApiClient::new(server.url()).expect("client builds")
}

#[tokio::test]
async fn login_returns_token_and_profile() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/users/login/")
        .match_body(Matcher::Json(json!({
            "email": "ada@example.com",
            "password": "secret"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "userId": 12,
                "email": "ada@example.com",
                "token": "jwt-token",
                "first_name": "Ada",
                "last_name": "Lovelace"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let session = client
        .login(&LoginRequest {
            email: "ada@example.com".into(),
            password: "secret".into(),
        })
        .await
        .expect("login succeeds");

    assert_eq!(session.user_id, 12);
    assert_eq!(session.token, "jwt-token");
    mock.assert_async().await;
}

#[tokio::test]
async fn error_body_message_is_extracted() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/users/login/")
        .with_status(400)
        .with_body(json!({ "error": "Invalid credentials" }).to_string())
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client
        .login(&LoginRequest {
            email: "x@example.com".into(),
            password: "bad".into(),
        })
        .await
        .expect_err("login fails");

    match err {
        ApiError::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Invalid credentials");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn unauthorized_maps_to_auth_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/users/me/")
        .with_status(401)
        .with_body(json!({ "detail": "Invalid token" }).to_string())
        .create_async()
        .await;

    let client = client_for(&server).with_token("stale");
    let err = client.current_user().await.expect_err("token rejected");
    assert!(matches!(err, ApiError::Auth(message) if message == "Invalid token"));
}

#[tokio::test]
async fn bearer_token_is_attached() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/scrapes/")
        .match_header("authorization", "Bearer tok-1")
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let client = client_for(&server).with_token("tok-1");
    let jobs = client.list_scrapes().await.expect("list succeeds");
    assert!(jobs.is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn scrape_jobs_decode_with_status() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/scrapes/")
        .with_status(200)
        .with_body(
            json!([{
                "id": 5,
                "url": "https://example.com/docs",
                "status": "IN_PROGRESS",
                "created_at": "2026-02-01T08:00:00Z",
                "updated_at": "2026-02-01T08:00:05Z"
            }])
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server).with_token("t");
    let jobs = client.list_scrapes().await.expect("decodes");
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].status, ScrapeStatus::InProgress);
    assert!(!jobs[0].status.is_terminal());
}

#[tokio::test]
async fn create_scrape_posts_the_url() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/scrapes/")
        .match_body(Matcher::Json(json!({ "url": "https://example.com" })))
        .with_status(201)
        .with_body(
            json!({
                "id": 9,
                "url": "https://example.com",
                "status": "PENDING",
                "created_at": "2026-02-01T08:00:00Z",
                "updated_at": "2026-02-01T08:00:00Z"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server).with_token("t");
    let job = client.create_scrape("https://example.com").await.expect("created");
    assert_eq!(job.id, 9);
    assert_eq!(job.status, ScrapeStatus::Pending);
    mock.assert_async().await;
}

#[tokio::test]
async fn delete_missing_chat_is_not_found() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("DELETE", "/api-chat/chats/99/")
        .with_status(404)
        .with_body(json!({ "error": "Chat not found" }).to_string())
        .create_async()
        .await;

    let client = client_for(&server).with_token("t");
    let err = client.delete_chat(99).await.expect_err("missing chat");
    assert!(matches!(err, ApiError::NotFound(message) if message == "Chat not found"));
}

#[tokio::test]
async fn chat_detail_includes_ordered_history() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api-chat/chats/3/")
        .with_status(200)
        .with_body(
            json!({
                "id": 3,
                "title": "Research",
                "created_at": "2026-02-01T08:00:00Z",
                "updated_at": "2026-02-01T09:00:00Z",
                "messages": [
                    {"id": 1, "role": "user", "content": "hi",
                     "timestamp": "2026-02-01T08:00:01Z"},
                    {"id": 2, "role": "assistant", "content": "hello",
                     "timestamp": "2026-02-01T08:00:02Z"}
                ],
                "last_message": "hello",
                "message_count": 2
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server).with_token("t");
    let chat = client.get_chat(3).await.expect("decodes");
    assert_eq!(chat.messages.len(), 2);
    assert_eq!(chat.messages[0].id, 1);
    assert_eq!(chat.messages[1].content, "hello");
}

#[tokio::test]
async fn blocking_send_returns_both_persisted_messages() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api-chat/chats/3/messages/")
        .match_body(Matcher::Json(json!({ "message": "hi", "scrape_ids": [4] })))
        .with_status(200)
        .with_body(
            json!({
                "user_message": {"id": 10, "role": "user", "content": "hi",
                                 "timestamp": "2026-02-01T08:00:01Z"},
                "ai_message": {"id": 11, "role": "assistant", "content": "hello",
                               "timestamp": "2026-02-01T08:00:03Z"}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server).with_token("t");
    let outcome = client
        .send_message(3, "hi", &[4])
        .await
        .expect("send succeeds");

    assert_eq!(outcome.user_message.id, 10);
    assert_eq!(outcome.ai_message.content, "hello");
    mock.assert_async().await;
}

#[tokio::test]
async fn stream_message_drives_the_ingestor() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api-chat/chats/3/messages/stream/")
        .match_body(Matcher::Json(json!({
            "message": "what is this corpus about?",
            "scrape_ids": [4, 8]
        })))
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(
            "data: {\"token\":\"It is \"}\n\n\
             data: {\"token\":\"about docs.\"}\n\n\
             data: {\"done\":true,\"messageId\":77}\n\n",
        )
        .create_async()
        .await;

    let client = client_for(&server).with_token("t");
    let mut session = StreamSession::new();
    let mut handler = CollectingHandler::default();

    let outcome = client
        .stream_message(
            3,
            "what is this corpus about?",
            &[4, 8],
            &mut session,
            &mut handler,
        )
        .await
        .expect("request accepted");

    assert_eq!(outcome, SessionOutcome::Completed { message_id: 77 });
    assert_eq!(session.accumulated(), "It is about docs.");
    assert_eq!(
        handler.events.last(),
        Some(&StreamEvent::Done { message_id: 77 })
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn stream_message_omits_empty_context() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api-chat/chats/3/messages/stream/")
        .match_body(Matcher::Json(json!({ "message": "hi" })))
        .with_status(200)
        .with_body("data: {\"done\":true,\"messageId\":1}\n\n")
        .create_async()
        .await;

    let client = client_for(&server).with_token("t");
    let mut session = StreamSession::new();
    let mut handler = CollectingHandler::default();
    let outcome = client
        .stream_message(3, "hi", &[], &mut session, &mut handler)
        .await
        .expect("request accepted");

    assert_eq!(outcome, SessionOutcome::Completed { message_id: 1 });
    mock.assert_async().await;
}

#[tokio::test]
async fn stream_request_rejected_before_first_byte_is_an_api_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api-chat/chats/3/messages/stream/")
        .with_status(500)
        .with_body(json!({ "error": "model unavailable" }).to_string())
        .create_async()
        .await;

    let client = client_for(&server).with_token("t");
    let mut session = StreamSession::new();
    let mut handler = CollectingHandler::default();
    let err = client
        .stream_message(3, "hi", &[], &mut session, &mut handler)
        .await
        .expect_err("rejected up front");

    assert!(matches!(err, ApiError::Api { status: 500, .. }));
    assert!(handler.events.is_empty());
}

#[tokio::test]
async fn file_listing_decodes() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/files/files/")
        .with_status(200)
        .with_body(
            json!([{
                "id": 2,
                "filename": "notes.md",
                "content_type": "text/markdown",
                "file_size": 1204,
                "upload_date": "2026-02-01T08:00:00Z"
            }])
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server).with_token("t");
    let files = client.list_files().await.expect("decodes");
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].filename, "notes.md");
    assert!(files[0].markdown_content.is_none());
}

#[tokio::test]
async fn upload_outcome_reports_partial_failures() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    let path = dir.path().join("notes.md");
    std::fs::write(&path, "# notes\n").expect("write sample");

    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/files/files/")
        .match_header(
            "content-type",
            Matcher::Regex("multipart/form-data.*".to_string()),
        )
        .with_status(201)
        .with_body(
            json!({
                "files": [{
                    "id": 4,
                    "filename": "notes.md",
                    "content_type": "text/markdown",
                    "file_size": 8,
                    "upload_date": "2026-02-01T08:00:00Z"
                }],
                "errors": [{ "filename": "broken.pdf", "error": "unreadable" }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server).with_token("t");
    let outcome = client
        .upload_files(&[path])
        .await
        .expect("partial success is still success");

    assert_eq!(outcome.files.len(), 1);
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].filename, "broken.pdf");
    mock.assert_async().await;
}
