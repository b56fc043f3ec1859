//! The fetch, diff and render cycle.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::client::ConfigSource;
use crate::render::{DisplayView, Renderer};

/// Fixed interval between config fetches.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Polls a [`ConfigSource`] and renders each distinct snapshot once.
pub struct Poller<S, R> {
    source: S,
    renderer: Arc<R>,
    /// Canonical JSON of the last snapshot handed to the renderer.
    last_rendered: Option<String>,
}

impl<S: ConfigSource, R: Renderer> Poller<S, R> {
    pub fn new(source: S, renderer: Arc<R>) -> Self {
        Self {
            source,
            renderer,
            last_rendered: None,
        }
    }

    /// One fetch, diff and render step. Returns whether anything was drawn.
    ///
    /// A failed or empty fetch leaves the current render on screen.
    pub async fn poll_once(&mut self) -> bool {
        let Some(snapshot) = self.source.fetch_config().await else {
            return false;
        };

        let canonical = match serde_json::to_string(&snapshot) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize snapshot");
                return false;
            }
        };
        if self.last_rendered.as_deref() == Some(canonical.as_str()) {
            return false;
        }

        self.renderer.render(&DisplayView::from_snapshot(&snapshot));
        tracing::info!(
            service = %snapshot.service_name,
            vocalists = snapshot.vocalists.len(),
            "Rendered new display content"
        );
        self.last_rendered = Some(canonical);
        true
    }

    /// Poll every `interval` until cancelled. Fetches never overlap: a slow
    /// fetch delays the next tick instead of queueing extra ones.
    pub async fn run(mut self, interval: Duration, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    self.poll_once().await;
                }
            }
        }
        tracing::info!("Poller stopped");
    }
}
