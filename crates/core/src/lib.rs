//! Domain model for the vocalist positions display.
//!
//! Everything in this crate is pure: no file system, no network, no clock
//! except where a caller passes one in. The I/O collaborators live in
//! `vox-storage` and `vox-api`.
//!
//! - [`assignments::AssignmentStore`] owns positions, event instances and the
//!   person photo map, and enforces the one-person-one-position rule.
//! - [`snapshot::project`] turns store state into a [`snapshot::PublishedSnapshot`].
//! - [`publish::PublishSink`] is the single-slot holder read by the server.

pub mod assignments;
pub mod calendar;
pub mod error;
pub mod models;
pub mod photos;
pub mod publish;
pub mod roster;
pub mod snapshot;
pub mod types;
