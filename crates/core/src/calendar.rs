//! Date helpers for default event instances.

use chrono::{Datelike, Duration};

use crate::types::Timestamp;

/// Name given to the event created when none exist yet.
pub const DEFAULT_EVENT_NAME: &str = "This Weekend";

/// The upcoming Sunday relative to `now`, keeping the time of day.
///
/// Returns `now` unchanged when `now` already falls on a Sunday.
pub fn next_sunday(now: Timestamp) -> Timestamp {
    let days_from_sunday = now.weekday().num_days_from_sunday() as i64;
    let days_until = (7 - days_from_sunday) % 7;
    now + Duration::days(days_until)
}
