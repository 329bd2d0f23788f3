//! Loopback server recording what the page client sends.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use futures_util::StreamExt;

use crate::domain::StreamEvent;

/// A command request as the server saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RecordedCommand {
    pub name: String,
    pub body_len: usize,
}

#[derive(Debug, Clone)]
pub(crate) struct TestServer {
    pub addr: SocketAddr,
    stream_opens: Arc<AtomicUsize>,
    commands: Arc<Mutex<Vec<RecordedCommand>>>,
    last_event_ids: Arc<Mutex<Vec<Option<String>>>>,
    fail_commands: bool,
}

impl TestServer {
    pub fn stream_opens(&self) -> usize {
        self.stream_opens.load(Ordering::SeqCst)
    }

    pub fn commands(&self) -> Vec<RecordedCommand> {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// `Last-Event-ID` of each request to `/closing.sse`, in arrival order.
    pub fn last_event_ids(&self) -> Vec<Option<String>> {
        self.last_event_ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Starts a server answering commands with `200`.
pub(crate) async fn spawn() -> TestServer {
    spawn_with(false).await
}

/// Starts a server answering commands with `500`.
pub(crate) async fn spawn_failing() -> TestServer {
    spawn_with(true).await
}

#[allow(clippy::panic)]
async fn spawn_with(fail_commands: bool) -> TestServer {
    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind loopback listener");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("listener address");
    };

    let server = TestServer {
        addr,
        stream_opens: Arc::new(AtomicUsize::new(0)),
        commands: Arc::new(Mutex::new(Vec::new())),
        last_event_ids: Arc::new(Mutex::new(Vec::new())),
        fail_commands,
    };

    let app = Router::new()
        .route("/api.sse", get(stream))
        .route("/closing.sse", get(closing_stream))
        .route("/api/{name}", post(command))
        .with_state(server.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    server
}

fn event_stream(body: Body) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/event-stream")], body)
}

/// Greets with `reset`, then stays open.
#[allow(clippy::panic)]
async fn stream(State(server): State<TestServer>) -> impl IntoResponse {
    server.stream_opens.fetch_add(1, Ordering::SeqCst);
    let Ok(wire) = StreamEvent::reset().encode(1024) else {
        panic!("reset encodes");
    };
    let greeting = futures_util::stream::once(async move { Ok::<_, Infallible>(Bytes::from(wire)) });
    event_stream(Body::from_stream(
        greeting.chain(futures_util::stream::pending()),
    ))
}

/// Sends a short reconnection time and an id with one `reset`, then ends
/// the response.
async fn closing_stream(State(server): State<TestServer>, headers: HeaderMap) -> impl IntoResponse {
    server.stream_opens.fetch_add(1, Ordering::SeqCst);
    let last_event_id = headers
        .get("last-event-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    server
        .last_event_ids
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(last_event_id);
    event_stream(Body::from("retry: 50\nid: 7\nevent: reset\ndata: \n\n"))
}

async fn command(
    State(server): State<TestServer>,
    Path(name): Path<String>,
    body: Bytes,
) -> (StatusCode, &'static str) {
    server
        .commands
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(RecordedCommand {
            name,
            body_len: body.len(),
        });
    if server.fail_commands {
        (StatusCode::INTERNAL_SERVER_ERROR, "API call failed")
    } else {
        (StatusCode::OK, "API call successful")
    }
}

/// Polls `condition` for up to five seconds.
pub(crate) async fn wait_until(condition: impl Fn() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
