//! Domain layer: stream events, the event bus, command names and session
//! slots.
//!
//! This module contains the server-side model shared by the web router,
//! the EventSource router and the panel service.

pub mod command;
pub mod event_bus;
pub mod session;
pub mod stream_event;

pub use command::{CommandName, EXECUTE_COMMAND};
pub use event_bus::EventBus;
pub use session::{SessionGuard, SessionId, SessionRegistry};
pub use stream_event::{RESET_EVENT, StreamEvent};
