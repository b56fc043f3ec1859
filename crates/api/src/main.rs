use std::net::SocketAddr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vox_api::config::ServerConfig;
use vox_api::editor::console::{run_console, ConsoleExit};
use vox_api::editor::Editor;
use vox_api::router::build_app_router;
use vox_api::state::AppState;
use vox_core::publish::PublishSink;
use vox_events::EventBus;
use vox_storage::{ImageStore, StateStore};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vox_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        data_dir = %config.data_dir.display(),
        "Loaded server configuration"
    );

    // --- Storage ---
    let state_store = StateStore::open(&config.data_dir).expect("Failed to open data directory");
    let images = Arc::new(
        ImageStore::open(config.images_dir()).expect("Failed to open image directory"),
    );

    let last_published = state_store.load_published().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Ignoring unreadable published snapshot");
        None
    });
    let sink = Arc::new(PublishSink::seeded(last_published));

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());
    let logger_handle = tokio::spawn(vox_events::log_events(event_bus.subscribe()));

    // --- Editor ---
    let mut editor = Editor::open(
        state_store,
        Arc::clone(&images),
        Arc::clone(&sink),
        Some(Arc::clone(&event_bus)),
    )
    .expect("Failed to load editor state");

    // The console owns the editor and is the only writer. A plain thread, so
    // a blocked stdin read never holds up runtime shutdown.
    let shutdown = CancellationToken::new();
    let console_shutdown = shutdown.clone();
    std::thread::Builder::new()
        .name("editor-console".into())
        .spawn(move || {
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            match run_console(&mut editor, stdin.lock(), stdout.lock()) {
                Ok(ConsoleExit::Quit) => console_shutdown.cancel(),
                Ok(ConsoleExit::EndOfInput) => {
                    tracing::info!("Console input closed, serving the last published state");
                }
                Err(e) => tracing::error!(error = %e, "Console failed"),
            }
        })
        .expect("Failed to start console thread");

    // --- App state ---
    let state = AppState { sink, images };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    logger_handle.abort();
    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal or the console's `quit` command.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal(quit: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
        () = quit.cancelled() => {
            tracing::info!("Console quit, starting graceful shutdown");
        }
    }
}
