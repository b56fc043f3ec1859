use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vox_display::client::HttpConfigSource;
use vox_display::clock::run_clock;
use vox_display::config::DisplayConfig;
use vox_display::poller::{Poller, POLL_INTERVAL};
use vox_display::render::TerminalRenderer;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    // Logs go to stderr; stdout is the display surface.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vox_display=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // --- Configuration ---
    let config = DisplayConfig::from_env();
    tracing::info!(
        server = %config.server_url,
        timeout_ms = config.fetch_timeout.as_millis() as u64,
        "Loaded display configuration"
    );

    let source = HttpConfigSource::new(&config.server_url, config.fetch_timeout)
        .expect("Failed to build HTTP client");
    let renderer = Arc::new(TerminalRenderer::stdout());
    let cancel = CancellationToken::new();

    // --- Clock ---
    let clock_handle = tokio::spawn(run_clock(Arc::clone(&renderer), cancel.clone()));

    // --- Shutdown on Ctrl-C ---
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
        }
        signal_cancel.cancel();
    });

    // --- Poll loop ---
    Poller::new(source, renderer).run(POLL_INTERVAL, cancel).await;

    let _ = clock_handle.await;
    tracing::info!("Display stopped");
}
