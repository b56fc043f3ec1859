//! Poll client for the vocalist display.
//!
//! A [`poller::Poller`] fetches the published snapshot on a fixed interval,
//! skips content it has already drawn, and hands new content to a
//! [`render::Renderer`]. A separate one-second clock task keeps the wall
//! clock moving between polls.

pub mod client;
pub mod clock;
pub mod config;
pub mod poller;
pub mod render;
