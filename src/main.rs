//! sse-panel server entry point.
//!
//! Starts the web router and the EventSource router on their own listeners
//! and runs the execution loop next to them.

use std::future::IntoFuture;
use std::sync::Arc;

use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use sse_panel::api;
use sse_panel::app_state::AppState;
use sse_panel::config::PanelConfig;
use sse_panel::eventsource;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json")) {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    // Load configuration
    let config = PanelConfig::from_env()?;
    tracing::info!(
        web = %config.web_listen_addr,
        sse = %config.sse_listen_addr,
        assets = %config.asset_dir.display(),
        "starting sse-panel"
    );

    // Build application state
    let app_state = AppState::from_config(&config);

    // Build routers
    let web_app = api::build_router()
        .layer(TimeoutLayer::new(config.http_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state.clone());

    let sse_app = eventsource::build_router()
        .layer(TraceLayer::new_for_http())
        .with_state(app_state.clone());

    // Shutdown signal shared by both servers and the execution loop
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown requested");
        }
        let _ = shutdown_tx.send(true);
    });

    let execution_loop = tokio::spawn(
        Arc::clone(&app_state.panel_service)
            .run_execution_loop(config.execution_poll_interval, shutdown_rx.clone()),
    );

    // Start servers
    let web_listener = tokio::net::TcpListener::bind(config.web_listen_addr).await?;
    tracing::info!(addr = %config.web_listen_addr, "web server listening");
    let sse_listener = tokio::net::TcpListener::bind(config.sse_listen_addr).await?;
    tracing::info!(addr = %config.sse_listen_addr, "event stream listening");

    tokio::try_join!(
        axum::serve(web_listener, web_app)
            .with_graceful_shutdown(wait_for(shutdown_rx.clone()))
            .into_future(),
        // Event streams never finish on their own, so stop accepting and let
        // the runtime drop the open sessions.
        async move {
            tokio::select! {
                result = axum::serve(sse_listener, sse_app).into_future() => result,
                () = wait_for(shutdown_rx) => Ok(()),
            }
        },
    )?;

    execution_loop.await?;
    tracing::info!("sse-panel stopped");
    Ok(())
}

async fn wait_for(mut shutdown: watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}
