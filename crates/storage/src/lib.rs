//! File-system collaborators for the vocalist display.
//!
//! - [`StateStore`]: JSON blobs for positions, event instances, person photos
//!   and the last published snapshot.
//! - [`ImageStore`]: image files addressed by opaque generated names.

pub mod error;
pub mod images;
pub mod state;

pub use error::StorageError;
pub use images::ImageStore;
pub use state::StateStore;
