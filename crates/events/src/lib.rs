//! In-process notifications for the vocalist display.
//!
//! - [`EventBus`]: publish/subscribe hub backed by `tokio::sync::broadcast`.
//! - [`DisplayEvent`]: the envelope emitted after every applied store change.
//! - [`log_events`]: a subscriber that writes each event to the tracing log.

pub mod bus;
pub mod logger;

pub use bus::{DisplayEvent, EventBus};
pub use logger::log_events;
