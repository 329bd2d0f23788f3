//! HTTP endpoint handlers of the web router.

pub mod command;
pub mod files;
pub mod system;

use axum::Router;
use axum::routing::get;

use crate::app_state::AppState;

/// Composes command, system and asset routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(files::redirect_to_index))
        .merge(command::routes())
        .merge(system::routes())
        .fallback(files::serve_asset)
}
