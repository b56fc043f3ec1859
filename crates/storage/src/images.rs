//! Image storage addressed by opaque generated file names.
//!
//! Names handed out by [`ImageStore::save`] look like
//! `{uuid}.{ext}`; every lookup re-validates the name with
//! [`validate_image_name`], so a caller can never reach outside the image
//! directory.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use vox_core::photos::{validate_image_name, IMAGE_EXTENSIONS};

use crate::error::StorageError;

/// Directory of stored images.
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    /// Open (and create if needed) an image directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Store `bytes` under a fresh name. The extension follows the detected
    /// image format; anything other than JPEG, PNG or WebP is rejected.
    pub fn save(&self, bytes: &[u8]) -> Result<String, StorageError> {
        let ext = detect_extension(bytes)?;
        let filename = format!("{}.{ext}", uuid::Uuid::new_v4());
        fs::write(self.dir.join(&filename), bytes)?;
        tracing::debug!(%filename, size = bytes.len(), "Stored image");
        Ok(filename)
    }

    /// Read a stored image; unknown or invalid names are `Ok(None)`.
    pub fn load(&self, filename: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let Some(path) = self.path_for(filename) else {
            return Ok(None);
        };
        match fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a stored image. Deleting a missing file is not an error.
    pub fn delete(&self, filename: &str) -> Result<(), StorageError> {
        let Some(path) = self.path_for(filename) else {
            return Ok(());
        };
        match fs::remove_file(path) {
            Ok(()) => {
                tracing::debug!(%filename, "Deleted image");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Absolute path of a stored image, or `None` if `filename` is not a
    /// valid opaque image name.
    pub fn path_for(&self, filename: &str) -> Option<PathBuf> {
        validate_image_name(filename).ok()?;
        Some(self.dir.join(filename))
    }
}

/// File extension for an accepted image format, sniffed from its header.
pub fn detect_extension(bytes: &[u8]) -> Result<&'static str, StorageError> {
    let format =
        image::guess_format(bytes).map_err(|e| StorageError::InvalidImage(e.to_string()))?;
    format
        .extensions_str()
        .first()
        .copied()
        .filter(|ext| IMAGE_EXTENSIONS.contains(ext))
        .ok_or_else(|| StorageError::InvalidImage(format!("Unsupported image format {format:?}")))
}
