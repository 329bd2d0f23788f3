//! Asset lookup and loading for the web router.

use std::path::{Component, Path, PathBuf};

use crate::error::PanelError;
use crate::web::template::{self, TemplateSource};

/// Longest request path served, in bytes.
pub const MAX_PATH_LEN: usize = 256;

/// A loaded asset ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Value of the `Content-Type` header.
    pub content_type: &'static str,
    /// Response body.
    pub body: Vec<u8>,
}

/// Maps a request path onto a file below `root`.
///
/// # Errors
///
/// Returns [`PanelError::PathRejected`] if the path is too long or tries to
/// leave `root`.
pub fn resolve(root: &Path, request_path: &str) -> Result<PathBuf, PanelError> {
    if request_path.len() > MAX_PATH_LEN {
        return Err(PanelError::PathRejected("path too long".to_string()));
    }

    let relative = Path::new(request_path.trim_start_matches('/'));
    let mut resolved = root.to_path_buf();
    for component in relative.components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(PanelError::PathRejected(request_path.to_string()));
            }
        }
    }
    Ok(resolved)
}

/// Returns the content type for a file name, by case-insensitive extension.
#[must_use]
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("html") => "text/html",
        Some("js") => "text/javascript",
        Some("css") => "text/css",
        _ => "text/plain",
    }
}

/// Returns the `/`-separated path of `path` relative to `root`, the key
/// placeholder values are looked up under.
#[must_use]
pub fn asset_key(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Returns `true` for files that go through placeholder templating.
#[must_use]
pub fn is_templated(path: &Path) -> bool {
    content_type_for(path) == "text/html"
}

/// Loads the asset for `request_path`, rendering placeholders in HTML files.
///
/// # Errors
///
/// Returns [`PanelError::PathRejected`] for refused paths,
/// [`PanelError::AssetNotFound`] if no regular file exists there, and
/// [`PanelError::Io`] if reading fails.
pub async fn load<S: TemplateSource + ?Sized>(
    root: &Path,
    request_path: &str,
    templates: &S,
) -> Result<Asset, PanelError> {
    let path = resolve(root, request_path)?;

    let is_file = tokio::fs::metadata(&path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false);
    if !is_file {
        tracing::warn!(path = %path.display(), "file not found");
        return Err(PanelError::AssetNotFound(request_path.to_string()));
    }

    let content_type = content_type_for(&path);
    let raw = tokio::fs::read(&path).await?;

    let body = if is_templated(&path) {
        template::render(&raw, &asset_key(root, &path), templates)
    } else {
        raw
    };

    tracing::debug!(path = %path.display(), bytes = body.len(), "sent file");
    Ok(Asset { content_type, body })
}
