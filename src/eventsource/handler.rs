//! Axum handler for the EventSource endpoint.

use axum::body::Body;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;

use super::connection::SessionStream;
use crate::app_state::AppState;
use crate::error::PanelError;

/// Content type of the event stream body.
pub const EVENT_STREAM_CONTENT_TYPE: &str = "text/event-stream";

/// `GET /api.sse` — Open an HTML5 EventSource session.
///
/// The session first receives a `reset` event, then every broadcast.
///
/// # Errors
///
/// Returns [`PanelError::SessionLimitReached`] when every session slot is
/// in use.
pub async fn event_stream_handler(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, PanelError> {
    let service = &state.panel_service;
    let guard = service.sessions().acquire()?;
    let events = service.event_bus().subscribe();
    let session = SessionStream::new(
        guard,
        events,
        service.joined_event(),
        service.max_event_bytes(),
    );

    Ok((
        [
            (header::CONTENT_TYPE, EVENT_STREAM_CONTENT_TYPE),
            (header::CACHE_CONTROL, "no-cache"),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_EXPOSE_HEADERS, "*"),
        ],
        Body::from_stream(session.into_stream()),
    ))
}
