//! EventSource layer: the `text/event-stream` endpoint pages subscribe to.
//!
//! Served on its own listener (port 8080 by default), separate from the
//! web router.

pub mod connection;
pub mod handler;

use axum::Router;
use axum::routing::get;

use crate::app_state::AppState;

/// Path of the event stream endpoint.
pub const STREAM_PATH: &str = "/api.sse";

/// Builds the EventSource router.
pub fn build_router() -> Router<AppState> {
    Router::new().route(STREAM_PATH, get(handler::event_stream_handler))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use futures_util::StreamExt;
    use tower::ServiceExt;

    use super::*;
    use crate::config::PanelConfig;

    fn state(max_sessions: usize) -> AppState {
        let config = PanelConfig {
            sse_max_sessions: max_sessions,
            ..PanelConfig::default()
        };
        AppState::from_config(&config)
    }

    fn stream_request() -> Request<Body> {
        let Ok(request) = Request::get(STREAM_PATH).body(Body::empty()) else {
            panic!("valid request");
        };
        request
    }

    #[tokio::test]
    async fn new_session_is_greeted_with_reset() {
        let app = build_router().with_state(state(5));
        let Ok(response) = app.oneshot(stream_request()).await else {
            panic!("router is infallible");
        };
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).map(|v| v.as_bytes()),
            Some(&b"text/event-stream"[..])
        );
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .map(|v| v.as_bytes()),
            Some(&b"*"[..])
        );

        let mut body = response.into_body().into_data_stream();
        let Some(Ok(first)) = body.next().await else {
            panic!("expected greeting frame");
        };
        assert_eq!(first.as_ref(), b"event: reset\ndata: \n\n");
    }

    #[tokio::test]
    async fn execute_reaches_open_session_as_reset() {
        let state = state(5);
        let app = build_router().with_state(state.clone());
        let Ok(response) = app.oneshot(stream_request()).await else {
            panic!("router is infallible");
        };
        let mut body = response.into_body().into_data_stream();
        let _ = body.next().await;

        let Ok(execute) = crate::domain::CommandName::new("execute") else {
            panic!("valid command");
        };
        state.panel_service.handle_command(&execute);
        assert!(state.panel_service.tick());

        let Some(Ok(broadcast)) = body.next().await else {
            panic!("expected broadcast frame");
        };
        assert_eq!(broadcast.as_ref(), b"event: reset\ndata: \n\n");
    }

    #[tokio::test]
    async fn refuses_session_beyond_limit() {
        let state = state(1);
        let app = build_router().with_state(state.clone());

        let Ok(first) = app.clone().oneshot(stream_request()).await else {
            panic!("router is infallible");
        };
        assert_eq!(first.status(), StatusCode::OK);

        let Ok(second) = app.clone().oneshot(stream_request()).await else {
            panic!("router is infallible");
        };
        assert_eq!(second.status(), StatusCode::SERVICE_UNAVAILABLE);

        drop(first);
        assert_eq!(state.panel_service.sessions().active(), 0);
        let Ok(third) = app.oneshot(stream_request()).await else {
            panic!("router is infallible");
        };
        assert_eq!(third.status(), StatusCode::OK);
    }
}
