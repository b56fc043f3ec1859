//! The 12-hour wall clock shown on the display.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, TimeZone};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::render::Renderer;

/// How often the clock is redrawn.
pub const CLOCK_INTERVAL: Duration = Duration::from_secs(1);

/// Format as `h:mm:ss AM/PM`, e.g. `9:05:07 PM`.
pub fn format_12h<Tz>(time: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    time.format("%-I:%M:%S %p").to_string()
}

/// Redraw the clock every second until cancelled. Runs independently of
/// the poll loop, so a slow fetch never stalls it.
pub async fn run_clock<R: Renderer>(renderer: Arc<R>, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(CLOCK_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            _ = ticker.tick() => renderer.show_clock(&format_12h(&Local::now())),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn formats_twelve_hour_time() {
        let at = |h, m, s| Utc.with_ymd_and_hms(2026, 10, 19, h, m, s).unwrap();

        assert_eq!(format_12h(&at(0, 0, 0)), "12:00:00 AM");
        assert_eq!(format_12h(&at(9, 5, 7)), "9:05:07 AM");
        assert_eq!(format_12h(&at(12, 30, 0)), "12:30:00 PM");
        assert_eq!(format_12h(&at(21, 5, 59)), "9:05:59 PM");
    }
}
