//! Command endpoint: `POST /api/<name>`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;

use crate::app_state::AppState;
use crate::domain::CommandName;
use crate::error::PanelError;

/// Body returned when a command was accepted.
pub const CALL_SUCCESSFUL: &str = "API call successful";

/// Body returned when a command was refused.
pub const CALL_FAILED: &str = "API call failed";

/// `POST /api/{*name}` — Run a panel command.
#[utoipa::path(
    post,
    path = "/api/{name}",
    tag = "Commands",
    summary = "Run a panel command",
    description = "Hands the command to the panel. `execute` schedules a reset broadcast to every event stream session on the next loop tick; other names are accepted and ignored. The request carries no body.",
    params(
        ("name" = String, Path, description = "Command name; everything after `/api/`, nested segments included"),
    ),
    responses(
        (status = 200, description = "Command accepted", body = String),
        (status = 400, description = "Command refused", body = String),
    )
)]
pub async fn run_command(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match CommandName::new(name).map_err(|e| PanelError::InvalidCommand(e.0)) {
        Ok(command) => {
            state.panel_service.handle_command(&command);
            (StatusCode::OK, CALL_SUCCESSFUL)
        }
        Err(e) => {
            tracing::warn!(error = %e, "api call failed");
            (StatusCode::BAD_REQUEST, CALL_FAILED)
        }
    }
}

/// `POST /api/` — A command without a name always fails.
pub async fn run_unnamed_command() -> impl IntoResponse {
    tracing::warn!("api call without command name");
    (StatusCode::BAD_REQUEST, CALL_FAILED)
}

/// Command routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/", post(run_unnamed_command))
        .route("/api/{*name}", post(run_command))
}
