/// Errors from the file-system collaborators.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Uploaded bytes are not an image format the display can show.
    #[error("Invalid image: {0}")]
    InvalidImage(String),
}
