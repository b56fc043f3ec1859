//! Request handlers.
//!
//! Handlers only read published state; errors map to JSON via [`AppError`].
//!
//! [`AppError`]: crate::error::AppError

pub mod display;
