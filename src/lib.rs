//! # sse-panel
//!
//! Web control panel with an HTML5 EventSource push channel.
//!
//! The server half serves the panel page (with `$` placeholder templating),
//! accepts fire-and-forget commands on `POST /api/<name>`, and pushes events
//! to every open page over `GET /api.sse` on a separate port. The client
//! half is the page itself: it holds one event stream open for its lifetime
//! and sends a fixed command whenever its control is activated.
//!
//! ## Architecture
//!
//! ```text
//! Pages (browser or panel-client)
//!     │
//!     ├── Web router (api/)            :3000  assets, /api/<name>, /health
//!     ├── EventSource router (eventsource/)  :8080  /api.sse
//!     │
//!     ├── PanelService (service/)      commands, execution loop
//!     ├── EventBus + SessionRegistry (domain/)
//!     │
//!     └── Page client (client/)        stream listener, command dispatcher
//! ```

pub mod api;
pub mod app_state;
pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod eventsource;
pub mod service;
pub mod web;
