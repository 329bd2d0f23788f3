//! Page client entry point.
//!
//! Loads the page (opens the event stream) and treats every line on stdin
//! as one activation of a control: an empty line activates the configured
//! control, any other line names the control to activate. The page stays
//! loaded until Ctrl-C.

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use sse_panel::client::Page;
use sse_panel::config::ClientConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ClientConfig::from_env();
    let page = Page::load(&config)?;
    tracing::info!(
        origin = %page.origin(),
        stream = %page.listener().url(),
        control = %config.control_id,
        "page loaded"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            line = lines.next_line(), if stdin_open => {
                match line? {
                    Some(line) => {
                        let id = match line.trim() {
                            "" => config.control_id.as_str(),
                            id => id,
                        };
                        if let Err(e) = page.activate(id) {
                            tracing::warn!(error = %e, "activation failed");
                        }
                    }
                    None => stdin_open = false,
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    page.listener().close();
    tracing::info!("page closed");
    Ok(())
}
