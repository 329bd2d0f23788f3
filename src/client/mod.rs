//! Page client: the event stream listener and the command dispatcher.
//!
//! A [`Page`] owns one [`EventStreamListener`] for its whole lifetime and a
//! [`ControlPanel`] whose controls fire commands through the
//! [`CommandDispatcher`]. Neither side reads a response body.

pub mod command_dispatcher;
pub mod control;
pub mod page;
pub mod sse;
pub mod stream_listener;

#[cfg(test)]
mod test_server;

pub use command_dispatcher::CommandDispatcher;
pub use control::ControlPanel;
pub use page::Page;
pub use sse::{SseFrame, SseItem};
pub use stream_listener::{EventHandlers, EventStreamListener, ReadyState, stream_url};
