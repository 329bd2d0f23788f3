//! Event Stream Listener: the page's long-lived push channel.
//!
//! [`EventStreamListener::open`] spawns one task that holds the connection
//! to `<origin>:8080/api.sse` and hands decoded events to the handlers
//! registered by name. Connection loss is handled the way an EventSource
//! does it: reconnect after the reconnection time, resending the last event
//! id. A response that is not an event stream closes the listener for good.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Url;
use reqwest::header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::sse::{self, SseFrame, SseItem};
use crate::error::ClientError;

/// Path of the event stream on the stream port.
pub const STREAM_PATH: &str = "/api.sse";

/// Reconnection time used until the server sends `retry:`.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(3000);

const EVENT_STREAM_MIME: &str = "text/event-stream";

/// Builds the event stream URL for a page origin: same scheme and host,
/// `port`, path `/api.sse`.
///
/// # Errors
///
/// Returns [`ClientError::InvalidOrigin`] unless `origin` is an http(s) URL
/// with a host.
pub fn stream_url(origin: &Url, port: u16) -> Result<Url, ClientError> {
    if !matches!(origin.scheme(), "http" | "https") || origin.host_str().is_none() {
        return Err(ClientError::InvalidOrigin(origin.to_string()));
    }

    let mut url = origin.clone();
    url.set_port(Some(port))
        .map_err(|()| ClientError::InvalidOrigin(origin.to_string()))?;
    url.set_path(STREAM_PATH);
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

/// Callback invoked for a named event.
pub type EventHandler = Arc<dyn Fn(&SseFrame) + Send + Sync>;

/// Handlers keyed by event name.
#[derive(Clone, Default)]
pub struct EventHandlers {
    handlers: HashMap<String, Vec<EventHandler>>,
}

impl fmt::Debug for EventHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandlers")
            .field("events", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl EventHandlers {
    /// Creates an empty handler table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for events named `event`.
    pub fn on<F>(&mut self, event: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(&SseFrame) + Send + Sync + 'static,
    {
        self.handlers
            .entry(event.into())
            .or_default()
            .push(Arc::new(handler));
        self
    }

    /// Returns `true` if at least one handler is registered for `event`.
    #[must_use]
    pub fn handles(&self, event: &str) -> bool {
        self.handlers.contains_key(event)
    }

    /// Invokes every handler registered for the frame's event type.
    ///
    /// Returns the number of handlers called.
    pub fn dispatch(&self, frame: &SseFrame) -> usize {
        let Some(handlers) = self.handlers.get(&frame.event) else {
            tracing::trace!(event = %frame.event, "no handler for event");
            return 0;
        };
        for handler in handlers {
            handler(frame);
        }
        handlers.len()
    }
}

/// Connection state, mirroring `EventSource.readyState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    /// Connecting or waiting to reconnect.
    Connecting,
    /// Receiving events.
    Open,
    /// Failed for good or closed by the page.
    Closed,
}

/// Handle to the page's event stream.
///
/// Dropping the handle closes the connection.
#[derive(Debug)]
pub struct EventStreamListener {
    url: Url,
    state: Arc<watch::Sender<ReadyState>>,
    task: JoinHandle<()>,
}

impl EventStreamListener {
    /// Opens the event stream in a background task and returns immediately.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[must_use]
    pub fn open(client: reqwest::Client, url: Url, handlers: EventHandlers) -> Self {
        let (state, _) = watch::channel(ReadyState::Connecting);
        let state = Arc::new(state);
        let task = tokio::spawn(run(client, url.clone(), handlers, Arc::clone(&state)));
        Self { url, state, task }
    }

    /// Returns the stream URL.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the current connection state.
    #[must_use]
    pub fn ready_state(&self) -> ReadyState {
        *self.state.borrow()
    }

    /// Waits until the listener reaches `target`.
    ///
    /// Returns `false` if the listener can no longer reach it.
    pub async fn wait_for(&self, target: ReadyState) -> bool {
        let mut rx = self.state.subscribe();
        rx.wait_for(|state| *state == target || *state == ReadyState::Closed)
            .await
            .is_ok_and(|state| *state == target)
    }

    /// Closes the connection; no reconnect follows.
    pub fn close(&self) {
        self.task.abort();
        self.state.send_replace(ReadyState::Closed);
    }
}

impl Drop for EventStreamListener {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn is_event_stream(response: &reqwest::Response) -> bool {
    if response.status() != reqwest::StatusCode::OK {
        return false;
    }
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(EVENT_STREAM_MIME))
}

async fn run(
    client: reqwest::Client,
    url: Url,
    handlers: EventHandlers,
    state: Arc<watch::Sender<ReadyState>>,
) {
    let mut reconnect_delay = DEFAULT_RECONNECT_DELAY;
    let mut last_event_id = String::new();

    loop {
        state.send_replace(ReadyState::Connecting);

        let mut request = client
            .get(url.clone())
            .header(ACCEPT, EVENT_STREAM_MIME)
            .header(CACHE_CONTROL, "no-cache");
        if !last_event_id.is_empty() {
            request = request.header("Last-Event-ID", last_event_id.as_str());
        }

        match request.send().await {
            Ok(response) if is_event_stream(&response) => {
                state.send_replace(ReadyState::Open);
                tracing::debug!(%url, "event stream open");

                let mut items = Box::pin(sse::decode(Box::pin(response.bytes_stream())));
                while let Some(item) = items.next().await {
                    match item {
                        SseItem::Retry(delay) => reconnect_delay = delay,
                        SseItem::Frame(frame) => {
                            last_event_id.clone_from(&frame.last_event_id);
                            handlers.dispatch(&frame);
                        }
                    }
                }
                tracing::debug!(%url, "event stream ended");
            }
            Ok(response) => {
                tracing::warn!(%url, status = %response.status(), "event stream refused");
                state.send_replace(ReadyState::Closed);
                return;
            }
            Err(e) => {
                tracing::debug!(%url, error = %e, "event stream connection failed");
            }
        }

        state.send_replace(ReadyState::Connecting);
        tokio::time::sleep(reconnect_delay).await;
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::client::test_server;

    fn url(s: &str) -> Url {
        let Ok(url) = Url::parse(s) else {
            panic!("valid url {s}");
        };
        url
    }

    fn frame(event: &str) -> SseFrame {
        SseFrame {
            event: event.to_string(),
            data: String::new(),
            last_event_id: String::new(),
        }
    }

    #[test]
    fn stream_url_uses_origin_host_and_stream_port() {
        let Ok(stream) = stream_url(&url("http://192.168.4.1"), 8080) else {
            panic!("valid origin");
        };
        assert_eq!(stream.as_str(), "http://192.168.4.1:8080/api.sse");
    }

    #[test]
    fn stream_url_drops_page_port_path_and_query() {
        let Ok(stream) = stream_url(&url("https://panel.local:3000/index.html?x=1#top"), 8080)
        else {
            panic!("valid origin");
        };
        assert_eq!(stream.as_str(), "https://panel.local:8080/api.sse");
    }

    #[test]
    fn stream_url_rejects_non_http_origin() {
        assert!(matches!(
            stream_url(&url("file:///tmp/index.html"), 8080),
            Err(ClientError::InvalidOrigin(_))
        ));
    }

    #[test]
    fn dispatch_only_reaches_named_handlers() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut handlers = EventHandlers::new();
        handlers.on("reset", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(handlers.dispatch(&frame("reset")), 1);
        assert_eq!(handlers.dispatch(&frame("message")), 0);
        assert_eq!(handlers.dispatch(&frame("update")), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(handlers.handles("reset"));
        assert!(!handlers.handles("message"));
    }

    #[tokio::test]
    async fn receives_named_events_from_server() {
        let server = test_server::spawn().await;
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut handlers = EventHandlers::new();
        handlers.on("reset", move |frame: &SseFrame| {
            assert!(frame.data.is_empty());
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let listener = EventStreamListener::open(
            reqwest::Client::new(),
            url(&format!("http://{}{STREAM_PATH}", server.addr)),
            handlers,
        );
        assert!(listener.wait_for(ReadyState::Open).await);
        assert!(test_server::wait_until(|| calls.load(Ordering::SeqCst) == 1).await);

        listener.close();
        assert_eq!(listener.ready_state(), ReadyState::Closed);
    }

    #[tokio::test]
    async fn reconnects_with_server_retry_and_last_event_id() {
        let server = test_server::spawn().await;
        let resets = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&resets);
        let mut handlers = EventHandlers::new();
        handlers.on("reset", move |frame: &SseFrame| {
            assert_eq!(frame.last_event_id, "7");
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let started = tokio::time::Instant::now();
        let listener = EventStreamListener::open(
            reqwest::Client::new(),
            url(&format!("http://{}/closing.sse", server.addr)),
            handlers,
        );
        assert!(test_server::wait_until(|| server.last_event_ids().len() >= 2).await);
        assert!(started.elapsed() < DEFAULT_RECONNECT_DELAY);

        let ids = server.last_event_ids();
        assert_eq!(ids.first(), Some(&None));
        assert_eq!(ids.get(1), Some(&Some("7".to_string())));
        assert!(resets.load(Ordering::SeqCst) >= 1);
        assert_ne!(listener.ready_state(), ReadyState::Closed);
        listener.close();
    }

    #[tokio::test]
    async fn non_stream_response_closes_for_good() {
        let server = test_server::spawn().await;
        let listener = EventStreamListener::open(
            reqwest::Client::new(),
            url(&format!("http://{}/missing", server.addr)),
            EventHandlers::new(),
        );
        assert!(!listener.wait_for(ReadyState::Open).await);
        assert_eq!(listener.ready_state(), ReadyState::Closed);
        assert_eq!(server.stream_opens(), 0);
    }
}
