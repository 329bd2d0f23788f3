//! Shared application state injected into all Axum handlers.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::PanelConfig;
use crate::domain::{EventBus, SessionRegistry};
use crate::service::PanelService;
use crate::web::template::PlaceholderTable;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Panel service for commands, sessions and broadcasting.
    pub panel_service: Arc<PanelService>,
    /// Root of the served web assets.
    pub asset_dir: Arc<PathBuf>,
    /// Placeholder values for templated HTML.
    pub templates: Arc<PlaceholderTable>,
}

impl AppState {
    /// Builds the domain and service layers described by `config`.
    #[must_use]
    pub fn from_config(config: &PanelConfig) -> Self {
        let event_bus = EventBus::new(config.event_bus_capacity);
        let sessions = SessionRegistry::new(config.sse_max_sessions);
        let panel_service = Arc::new(PanelService::new(
            event_bus,
            sessions,
            config.sse_max_event_bytes,
        ));

        let mut templates = PlaceholderTable::new();
        templates.insert("index.html", config.index_template_values.clone());

        Self {
            panel_service,
            asset_dir: Arc::new(config.asset_dir.clone()),
            templates: Arc::new(templates),
        }
    }
}
