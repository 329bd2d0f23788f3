//! Command Dispatcher: fire-and-forget `POST /api/<name>`.

use reqwest::Url;

use crate::error::ClientError;

/// Sends bodiless command requests to the page origin.
///
/// Responses are never read; failures only show up in debug logs.
#[derive(Debug, Clone)]
pub struct CommandDispatcher {
    client: reqwest::Client,
    origin: Url,
}

impl CommandDispatcher {
    /// Creates a dispatcher for the given page origin.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidOrigin`] unless `origin` is an http(s)
    /// URL with a host.
    pub fn new(client: reqwest::Client, origin: &Url) -> Result<Self, ClientError> {
        if !matches!(origin.scheme(), "http" | "https") || origin.host_str().is_none() {
            return Err(ClientError::InvalidOrigin(origin.to_string()));
        }
        Ok(Self {
            client,
            origin: origin.clone(),
        })
    }

    /// Builds `<origin>/api/<name>`, with `name` encoded as one path segment.
    #[must_use]
    pub fn command_url(&self, name: &str) -> Url {
        let mut url = self.origin.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.set_path("/api/");
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(name);
        }
        url
    }

    /// Sends `POST /api/<name>` with no body and returns immediately.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn send_command(&self, name: &str) {
        let url = self.command_url(name);
        let request = self.client.post(url.clone());
        tracing::debug!(%url, "sending command");

        tokio::spawn(async move {
            if let Err(e) = request.send().await {
                tracing::debug!(%url, error = %e, "command request failed");
            }
        });
    }
}
