//! Photo reference names and content types.
//!
//! Stored images are addressed by an opaque file name such as
//! `3f2a9c1e-....jpg`. Names arriving over the wire are checked against
//! [`validate_image_name`] before they ever touch the file system.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

/// Image extensions the image store produces and the server will serve.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// A single path segment made of safe characters plus a known extension.
static IMAGE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]{1,128}\.(?i:jpg|jpeg|png|webp)$").expect("valid regex")
});

/// Validate that `name` is an opaque stored-image identifier, not a path.
pub fn validate_image_name(name: &str) -> Result<(), CoreError> {
    if IMAGE_NAME_RE.is_match(name) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!("Invalid image name '{name}'")))
    }
}

/// MIME type for a stored image, derived from its extension.
pub fn content_type_for_name(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}
