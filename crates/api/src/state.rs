use std::sync::Arc;

use vox_core::publish::PublishSink;
use vox_storage::ImageStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Handlers only read: the editor owns the store and is the single writer
/// to `sink`.
#[derive(Clone)]
pub struct AppState {
    /// Latest published snapshot.
    pub sink: Arc<PublishSink>,
    /// Uploaded photos served under `/api/images`.
    pub images: Arc<ImageStore>,
}
