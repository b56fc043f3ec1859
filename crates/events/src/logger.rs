//! Background subscriber that records display events in the tracing log.

use tokio::sync::broadcast;

use crate::bus::DisplayEvent;

/// Run the logging loop until the bus is dropped.
///
/// Returns the number of events logged, which tests use to check delivery.
pub async fn log_events(mut receiver: broadcast::Receiver<DisplayEvent>) -> usize {
    let mut logged = 0;

    loop {
        match receiver.recv().await {
            Ok(event) => {
                tracing::info!(
                    event_type = %event.event_type,
                    event_id = ?event.event_id,
                    published_entries = ?event.published_entries,
                    payload = %event.payload,
                    "Display state changed"
                );
                logged += 1;
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::warn!(skipped = n, "Event logger lagged, some events were not logged");
            }
            Err(broadcast::error::RecvError::Closed) => {
                tracing::info!("Event bus closed, event logger shutting down");
                break;
            }
        }
    }

    logged
}
