//! Web layer: page assets, the command endpoint and system routes.
//!
//! Served on the web listener; the event stream lives on its own listener
//! (see [`crate::eventsource`]).

pub mod handlers;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;

/// OpenAPI document of the web router.
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "sse-panel", description = "Web control panel command API"),
    paths(handlers::command::run_command, handlers::system::health_handler),
    components(schemas(crate::error::ErrorResponse, handlers::system::HealthResponse))
)]
pub struct ApiDoc;

/// Builds the complete web router.
pub fn build_router() -> Router<AppState> {
    let router = handlers::routes();

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    router
}
