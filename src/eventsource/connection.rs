//! Event stream of a single EventSource session.
//!
//! The stream first yields the session greeting, then forwards every event
//! published on the bus, each in its [`StreamEvent::encode`] wire form. A
//! comment line is sent when the bus stays quiet for [`KEEP_ALIVE_INTERVAL`].
//! It owns the session's [`SessionGuard`], so the slot is released as soon
//! as the response body is dropped.

use std::convert::Infallible;
use std::time::Duration;

use bytes::Bytes;
use futures_util::Stream;
use tokio::sync::broadcast;

use crate::domain::{SessionGuard, StreamEvent};

/// Idle time after which a keep-alive comment is written.
pub const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

const KEEP_ALIVE_COMMENT: &[u8] = b":\n\n";

/// Per-session state carried through the stream.
#[derive(Debug)]
pub struct SessionStream {
    guard: SessionGuard,
    events: broadcast::Receiver<StreamEvent>,
    greeting: Option<StreamEvent>,
    max_event_bytes: usize,
    keep_alive: Duration,
}

impl SessionStream {
    /// Creates the state for a freshly joined session.
    ///
    /// `events` must be subscribed before the greeting is sent so that no
    /// broadcast is missed in between.
    #[must_use]
    pub fn new(
        guard: SessionGuard,
        events: broadcast::Receiver<StreamEvent>,
        greeting: StreamEvent,
        max_event_bytes: usize,
    ) -> Self {
        Self {
            guard,
            events,
            greeting: Some(greeting),
            max_event_bytes,
            keep_alive: KEEP_ALIVE_INTERVAL,
        }
    }

    /// Overrides the keep-alive interval.
    #[must_use]
    pub fn with_keep_alive(mut self, keep_alive: Duration) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    fn encode(&self, event: &StreamEvent) -> Option<Bytes> {
        match event.encode(self.max_event_bytes) {
            Ok(wire) => Some(Bytes::from(wire)),
            Err(e) => {
                tracing::warn!(session = %self.guard.id(), error = %e, "dropping unsendable event");
                None
            }
        }
    }

    /// Turns the session into a `text/event-stream` body.
    pub fn into_stream(self) -> impl Stream<Item = Result<Bytes, Infallible>> + Send + 'static {
        futures_util::stream::unfold(self, |mut session| async move {
            if let Some(greeting) = session.greeting.take()
                && let Some(wire) = session.encode(&greeting)
            {
                return Some((Ok(wire), session));
            }

            loop {
                let next = tokio::time::timeout(session.keep_alive, session.events.recv()).await;
                match next {
                    Err(_) => {
                        return Some((Ok(Bytes::from_static(KEEP_ALIVE_COMMENT)), session));
                    }
                    Ok(Ok(event)) => {
                        if let Some(wire) = session.encode(&event) {
                            return Some((Ok(wire), session));
                        }
                    }
                    Ok(Err(broadcast::error::RecvError::Lagged(n))) => {
                        tracing::warn!(
                            session = %session.guard.id(),
                            lagged = n,
                            "event stream session lagged behind event bus"
                        );
                    }
                    Ok(Err(broadcast::error::RecvError::Closed)) => return None,
                }
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use futures_util::StreamExt;

    use super::*;
    use crate::domain::{EventBus, SessionRegistry};

    fn session(registry: &SessionRegistry, bus: &EventBus) -> SessionStream {
        let Ok(guard) = registry.acquire() else {
            panic!("free slot");
        };
        SessionStream::new(guard, bus.subscribe(), StreamEvent::reset(), 1024)
    }

    #[tokio::test]
    async fn greeting_comes_before_broadcasts() {
        let registry = SessionRegistry::new(1);
        let bus = EventBus::new(8);
        let mut stream = Box::pin(session(&registry, &bus).into_stream());

        let Some(Ok(first)) = stream.next().await else {
            panic!("expected greeting");
        };
        assert_eq!(first.as_ref(), b"event: reset\ndata: \n\n");

        assert_eq!(bus.publish(StreamEvent::new().with_data("1")), 1);
        let Some(Ok(second)) = stream.next().await else {
            panic!("expected broadcast");
        };
        assert_eq!(second.as_ref(), b"data: 1\n\n");
    }

    #[tokio::test]
    async fn unsendable_events_are_skipped() {
        let registry = SessionRegistry::new(1);
        let bus = EventBus::new(8);
        let mut stream = Box::pin(session(&registry, &bus).into_stream());
        let _ = stream.next().await;

        bus.publish(StreamEvent::new());
        bus.publish(StreamEvent::new().with_data("x".repeat(4096)));
        bus.publish(StreamEvent::new().with_data("ok"));
        let Some(Ok(next)) = stream.next().await else {
            panic!("expected broadcast");
        };
        assert_eq!(next.as_ref(), b"data: ok\n\n");
    }

    #[tokio::test]
    async fn idle_session_gets_keep_alive_comment() {
        let registry = SessionRegistry::new(1);
        let bus = EventBus::new(8);
        let stream = session(&registry, &bus).with_keep_alive(Duration::from_millis(20));
        let mut stream = Box::pin(stream.into_stream());
        let _ = stream.next().await;

        let Some(Ok(comment)) = stream.next().await else {
            panic!("expected keep-alive");
        };
        assert_eq!(comment.as_ref(), KEEP_ALIVE_COMMENT);
    }

    #[tokio::test]
    async fn dropping_stream_frees_slot() {
        let registry = SessionRegistry::new(1);
        let bus = EventBus::new(8);
        let stream = session(&registry, &bus).into_stream();
        assert_eq!(registry.active(), 1);
        drop(stream);
        assert_eq!(registry.active(), 0);
    }
}
