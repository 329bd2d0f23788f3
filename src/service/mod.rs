//! Service layer: command handling and the execution loop.

pub mod panel_service;

pub use panel_service::{CommandOutcome, PanelService};
