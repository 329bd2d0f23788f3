//! The loaded page: one event stream plus one bound control.

use reqwest::Url;

use super::command_dispatcher::CommandDispatcher;
use super::control::ControlPanel;
use super::sse::SseFrame;
use super::stream_listener::{EventHandlers, EventStreamListener, stream_url};
use crate::config::ClientConfig;
use crate::domain::RESET_EVENT;
use crate::error::ClientError;

/// Page-lifetime state. Dropping the page closes its event stream.
#[derive(Debug)]
pub struct Page {
    origin: Url,
    listener: EventStreamListener,
    controls: ControlPanel,
}

impl Page {
    /// Loads the page with a default HTTP client.
    ///
    /// # Errors
    ///
    /// See [`Page::load_with_client`]; also fails if the HTTP client cannot
    /// be built.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn load(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().build()?;
        Self::load_with_client(config, client)
    }

    /// Loads the page: opens the event stream once and binds the control.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidOrigin`] for an unusable origin and
    /// [`ClientError::InvalidCommand`] for an invalid bound command.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn load_with_client(
        config: &ClientConfig,
        client: reqwest::Client,
    ) -> Result<Self, ClientError> {
        Self::load_with_handlers(config, client, EventHandlers::new())
    }

    /// Loads the page with extra event handlers next to the page's own.
    ///
    /// # Errors
    ///
    /// Same as [`Page::load_with_client`].
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn load_with_handlers(
        config: &ClientConfig,
        client: reqwest::Client,
        mut handlers: EventHandlers,
    ) -> Result<Self, ClientError> {
        let origin = Url::parse(&config.origin)
            .map_err(|e| ClientError::InvalidOrigin(format!("{}: {e}", config.origin)))?;
        let url = stream_url(&origin, config.stream_port)?;

        let mut controls = ControlPanel::new(CommandDispatcher::new(client.clone(), &origin)?);
        controls.bind(config.control_id.clone(), &config.command)?;

        handlers.on(RESET_EVENT, on_reset);
        let listener = EventStreamListener::open(client, url, handlers);

        Ok(Self {
            origin,
            listener,
            controls,
        })
    }

    /// Activates the control with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UnknownControl`] if no such control exists.
    pub fn activate(&self, control_id: &str) -> Result<(), ClientError> {
        self.controls.activate(control_id)
    }

    /// Returns the page origin.
    #[must_use]
    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Returns the page's event stream.
    #[must_use]
    pub fn listener(&self) -> &EventStreamListener {
        &self.listener
    }

    /// Returns the page's controls.
    #[must_use]
    pub fn controls(&self) -> &ControlPanel {
        &self.controls
    }
}

/// Handler for `reset`. Does nothing.
pub fn on_reset(_frame: &SseFrame) {}
