//! Server-sent events pushed over the EventSource channel.
//!
//! A [`StreamEvent`] carries the three optional fields the panel uses
//! (`id`, `event`, `data`). [`StreamEvent::encode`] produces the
//! `text/event-stream` wire form that sessions write to the socket, and
//! enforces the per-event size limit before anything is published.

use crate::error::PanelError;

/// Name of the event that tells pages to reset their view.
pub const RESET_EVENT: &str = "reset";

/// One server-sent event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamEvent {
    id: Option<u32>,
    event: Option<String>,
    data: Option<String>,
}

impl StreamEvent {
    /// Creates an event with no fields set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The `reset` event: named `reset`, empty data, no id.
    #[must_use]
    pub fn reset() -> Self {
        Self {
            id: None,
            event: Some(RESET_EVENT.to_string()),
            data: Some(String::new()),
        }
    }

    /// Sets the `id` field.
    #[must_use]
    pub fn with_id(mut self, id: u32) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the `event` field.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::InvalidEventName`] if the name contains a
    /// line break.
    pub fn with_event(mut self, name: impl Into<String>) -> Result<Self, PanelError> {
        let name = name.into();
        if name.contains(['\n', '\r']) {
            return Err(PanelError::InvalidEventName(name));
        }
        self.event = Some(name);
        Ok(self)
    }

    /// Sets the `data` field. Line breaks (LF, CRLF or lone CR) split it
    /// over several `data:` lines.
    #[must_use]
    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        let data: String = data.into();
        self.data = Some(data.replace("\r\n", "\n").replace('\r', "\n"));
        self
    }

    /// Returns the `id` field.
    #[must_use]
    pub fn id(&self) -> Option<u32> {
        self.id
    }

    /// Returns the event name.
    #[must_use]
    pub fn event(&self) -> Option<&str> {
        self.event.as_deref()
    }

    /// Returns the data payload.
    #[must_use]
    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }

    /// Returns `true` when no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.event.is_none() && self.data.is_none()
    }

    /// Encodes the event in `text/event-stream` form, terminated by a blank line.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::EmptyEvent`] if no field is set, or
    /// [`PanelError::EventTooLarge`] if the encoded event plus two bytes of
    /// framing headroom exceeds `max_bytes`.
    pub fn encode(&self, max_bytes: usize) -> Result<String, PanelError> {
        if self.is_empty() {
            return Err(PanelError::EmptyEvent);
        }

        let mut out = String::new();
        if let Some(id) = self.id {
            out.push_str(&format!("id: {id}\n"));
        }
        if let Some(event) = &self.event {
            out.push_str("event: ");
            out.push_str(event);
            out.push('\n');
        }
        if let Some(data) = &self.data {
            for line in data.split('\n') {
                out.push_str("data: ");
                out.push_str(line);
                out.push('\n');
            }
        }
        out.push('\n');

        if out.len() + 1 > max_bytes {
            return Err(PanelError::EventTooLarge {
                len: out.len(),
                max: max_bytes,
            });
        }
        Ok(out)
    }
}
