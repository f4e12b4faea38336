//! Integration tests for the API client: what goes on the wire, and how
//! server responses (success and failure) come back out.
//!
//! Each test starts a one-shot HTTP server on a loopback port, points the
//! client at it, and inspects both directions of the exchange. No mock
//! framework: the canned responses are byte-for-byte what the backend
//! sends.

use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use taskdeck::api::ApiClient;
use taskdeck::error::ApiError;
use taskdeck::models::{Role, TaskDraft, TaskFilter, TaskPatch, TaskStatus};

// ─── Helpers ─────────────────────────────────────────────────────────────

/// Start a server that answers exactly one request with `response` and
/// hands back the raw request text through the join handle.
async fn one_shot_server(response: String) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.expect("read");
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if request_complete(&buf) {
                break;
            }
        }
        socket.write_all(response.as_bytes()).await.expect("write");
        socket.shutdown().await.ok();
        String::from_utf8_lossy(&buf).into_owned()
    });
    (format!("http://{addr}/api"), handle)
}

/// True once `buf` holds the full head plus `Content-Length` bytes of body.
fn request_complete(buf: &[u8]) -> bool {
    let Some(header_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
        return false;
    };
    let headers = String::from_utf8_lossy(&buf[..header_end]);
    let content_length = headers
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            if name.eq_ignore_ascii_case("content-length") {
                value.trim().parse::<usize>().ok()
            } else {
                None
            }
        })
        .unwrap_or(0);
    buf.len() >= header_end + 4 + content_length
}

fn http_response(status_line: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
}

fn client(base: &str) -> ApiClient {
    ApiClient::new(base, Duration::from_secs(2)).expect("client")
}

/// Body of a captured request (everything after the blank line).
fn request_body(request: &str) -> Value {
    let (_, body) = request.split_once("\r\n\r\n").expect("request has a body");
    serde_json::from_str(body).expect("body is JSON")
}

// ─── Authentication ──────────────────────────────────────────────────────

#[tokio::test]
async fn login_returns_the_session_triple() {
    let body = json!({
        "access": "acc-1",
        "refresh": "ref-1",
        "user": {
            "id": 3,
            "username": "mira",
            "email": "mira@example.com",
            "first_name": "Mira",
            "last_name": "Voss",
            "role": "manager"
        }
    });
    let (base, handle) = one_shot_server(http_response("200 OK", &body.to_string())).await;

    let auth = client(&base)
        .login("mira@example.com", "hunter2")
        .await
        .expect("login");
    assert_eq!(auth.access, "acc-1");
    assert_eq!(auth.refresh, "ref-1");
    assert_eq!(auth.user.role, Role::Manager);

    let request = handle.await.expect("server");
    assert!(request.starts_with("POST /api/auth/login/ "), "{request}");
    // Login itself must not send a bearer token.
    assert!(!request.to_ascii_lowercase().contains("authorization:"));
    let sent = request_body(&request);
    assert_eq!(sent["email"], "mira@example.com");
    assert_eq!(sent["password"], "hunter2");
}

#[tokio::test]
async fn refresh_posts_the_refresh_token_without_auth() {
    let (base, handle) =
        one_shot_server(http_response("200 OK", r#"{"access": "acc-2"}"#)).await;

    let tokens = client(&base).refresh("ref-1").await.expect("refresh");
    assert_eq!(tokens.access, "acc-2");
    assert_eq!(tokens.refresh, None);

    let request = handle.await.expect("server");
    assert!(request.starts_with("POST /api/auth/token/refresh/ "), "{request}");
    assert!(!request.to_ascii_lowercase().contains("authorization:"));
    assert_eq!(request_body(&request)["refresh"], "ref-1");
}

#[tokio::test]
async fn stale_token_maps_to_unauthorized_with_server_words() {
    let (base, _handle) = one_shot_server(http_response(
        "401 Unauthorized",
        r#"{"detail": "Given token not valid for any token type"}"#,
    ))
    .await;

    let err = client(&base)
        .task_stats("stale")
        .await
        .expect_err("must fail");
    match err {
        ApiError::Unauthorized(msg) => {
            assert_eq!(msg, "Given token not valid for any token type")
        }
        other => panic!("expected Unauthorized, got {other:?}"),
    }
}

// ─── Tasks ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_tasks_sends_bearer_token_and_filter_params() {
    let (base, handle) = one_shot_server(http_response("200 OK", "[]")).await;

    let filter = TaskFilter {
        status: Some(TaskStatus::InProgress),
        assignee: Some(7),
    };
    let tasks = client(&base)
        .list_tasks("tok-123", &filter)
        .await
        .expect("list");
    assert!(tasks.is_empty());

    let request = handle.await.expect("server");
    assert!(
        request.starts_with("GET /api/tasks/?status=in_progress&assignee=7 "),
        "{request}"
    );
    assert!(request
        .to_ascii_lowercase()
        .contains("authorization: bearer tok-123"));
}

#[tokio::test]
async fn task_list_decodes_nested_user_details() {
    let body = json!([{
        "id": 11,
        "title": "Ship weekly report",
        "description": "",
        "status": "todo",
        "deadline": "2026-08-29T00:00:00Z",
        "assignee": 5,
        "assignee_details": {
            "id": 5,
            "username": "ren",
            "email": "ren@example.com",
            "first_name": "Ren",
            "last_name": "Ito",
            "role": "member"
        },
        "created_by": 3,
        "created_by_details": null,
        "created_at": "2026-08-20T10:00:00Z",
        "updated_at": "2026-08-21T09:30:00Z"
    }]);
    let (base, _handle) = one_shot_server(http_response("200 OK", &body.to_string())).await;

    let tasks = client(&base)
        .list_tasks("tok", &TaskFilter::default())
        .await
        .expect("list");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].assignee_name(), "Ren Ito");
    assert_eq!(tasks[0].deadline_date(), "2026-08-29");
}

#[tokio::test]
async fn stats_decode_per_status_counts() {
    let (base, handle) = one_shot_server(http_response(
        "200 OK",
        r#"{"total": 10, "todo": 3, "in_progress": 4, "done": 3}"#,
    ))
    .await;

    let stats = client(&base).task_stats("tok").await.expect("stats");
    assert_eq!(stats.total, 10);
    assert_eq!(stats.in_progress, 4);

    let request = handle.await.expect("server");
    assert!(request.starts_with("GET /api/tasks/stats/ "), "{request}");
}

#[tokio::test]
async fn member_status_patch_sends_only_the_status_key() {
    let task = json!({
        "id": 11,
        "title": "Ship weekly report",
        "description": "",
        "status": "done",
        "deadline": null,
        "assignee": null,
        "created_by": 3,
        "created_at": "2026-08-20T10:00:00Z",
        "updated_at": "2026-08-21T09:30:00Z"
    });
    let (base, handle) = one_shot_server(http_response("200 OK", &task.to_string())).await;

    let patch = TaskPatch {
        status: Some(TaskStatus::Done),
        ..TaskPatch::default()
    };
    client(&base)
        .update_task("tok", 11, &patch)
        .await
        .expect("patch");

    let request = handle.await.expect("server");
    assert!(request.starts_with("PATCH /api/tasks/11/ "), "{request}");
    assert_eq!(request_body(&request), json!({"status": "done"}));
}

#[tokio::test]
async fn forbidden_create_carries_the_server_refusal() {
    let (base, _handle) = one_shot_server(http_response(
        "403 Forbidden",
        r#"{"error": "Only admins and managers can create tasks"}"#,
    ))
    .await;

    let draft = TaskDraft {
        title: "sneaky".to_string(),
        ..TaskDraft::default()
    };
    let err = client(&base)
        .create_task("tok", &draft)
        .await
        .expect_err("must fail");
    match err {
        ApiError::Forbidden(msg) => {
            assert_eq!(msg, "Only admins and managers can create tasks")
        }
        other => panic!("expected Forbidden, got {other:?}"),
    }
}

#[tokio::test]
async fn validation_errors_keep_the_field_map() {
    let (base, _handle) = one_shot_server(http_response(
        "400 Bad Request",
        r#"{"deadline": ["Datetime has wrong format."], "title": ["This field may not be blank."]}"#,
    ))
    .await;

    let draft = TaskDraft::default();
    let err = client(&base)
        .create_task("tok", &draft)
        .await
        .expect_err("must fail");
    let fields = err.fields().expect("validation error");
    assert_eq!(fields.first("deadline"), Some("Datetime has wrong format."));
    assert_eq!(
        fields.first_of(&["title", "deadline"]),
        Some("This field may not be blank.")
    );
}

#[tokio::test]
async fn delete_returns_unit_on_no_content() {
    let response =
        "HTTP/1.1 204 No Content\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_string();
    let (base, handle) = one_shot_server(response).await;

    client(&base).delete_task("tok", 42).await.expect("delete");

    let request = handle.await.expect("server");
    assert!(request.starts_with("DELETE /api/tasks/42/ "), "{request}");
}

// ─── Transport failures ──────────────────────────────────────────────────

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    // Port 1 is never listening; connect is refused immediately.
    let api = ApiClient::new("http://127.0.0.1:1", Duration::from_secs(1)).expect("client");
    let err = api
        .list_tasks("tok", &TaskFilter::default())
        .await
        .expect_err("must fail");
    assert!(matches!(err, ApiError::Transport(_)), "got {err:?}");
    assert!(err.server_message().is_none());
}
