//! Static and templated page assets.

use axum::extract::State;
use axum::http::{Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Redirect, Response};

use crate::app_state::AppState;
use crate::error::PanelError;
use crate::web::assets;

/// Page served for `/`.
pub const INDEX_PATH: &str = "/index.html";

/// `GET /` — Redirect to the index page.
pub async fn redirect_to_index() -> Redirect {
    tracing::debug!("redirected to index");
    Redirect::temporary(INDEX_PATH)
}

/// `GET /<path>` — Serve a file from the asset directory.
///
/// HTML files are rendered through the placeholder table. The CORS headers
/// let pages loaded from here open the event stream on its separate port.
///
/// # Errors
///
/// Returns [`PanelError::AssetNotFound`] or [`PanelError::PathRejected`]
/// for unknown or refused paths.
pub async fn serve_asset(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
) -> Result<Response, PanelError> {
    if method != Method::GET && method != Method::HEAD {
        return Ok(StatusCode::METHOD_NOT_ALLOWED.into_response());
    }

    let asset = assets::load(&state.asset_dir, uri.path(), state.templates.as_ref()).await?;

    Ok((
        [
            (header::CONTENT_TYPE, asset.content_type),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_EXPOSE_HEADERS, "*"),
        ],
        asset.body,
    )
        .into_response())
}
