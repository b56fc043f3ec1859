//! Vocalist display server library.
//!
//! Exposes the building blocks (config, state, error handling, routes, the
//! editor facade and its console) so integration tests and the binary
//! entrypoint can both access them.

pub mod config;
pub mod editor;
pub mod error;
pub mod handlers;
pub mod router;
pub mod routes;
pub mod state;
