//! Error types for editor operations.

use thiserror::Error;

use crate::model::ObjectId;

/// Errors that can occur while serializing, restoring or loading scene state.
///
/// None of these reach the user as a crash: the component that hits one logs it
/// and abandons the operation.
#[derive(Error, Debug)]
pub enum EditorError {
    /// Snapshot or scene JSON could not be (de)serialized
    #[error("Scene serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Pixel kernel, encoder or decoder failure
    #[error("Raster error: {0}")]
    Raster(#[from] retouch_raster::RasterError),

    /// Image file could not be opened or decoded
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// A `blob:` source that was never stored
    #[error("Unknown blob source: {src}")]
    UnknownBlob {
        /// The source string that failed to resolve
        src: String,
    },

    /// An image object arrived without decoded pixels
    #[error("No pixels available for image object {id}")]
    MissingPixels {
        /// The image object lacking pixels
        id: ObjectId,
    },

    /// Snapshot was written by an incompatible scene format
    #[error("Unsupported scene format version: {found}")]
    UnsupportedVersion {
        /// Version found in the snapshot
        found: u32,
    },
}

impl EditorError {
    /// Create an unknown blob error.
    pub fn unknown_blob(src: impl Into<String>) -> Self {
        Self::UnknownBlob { src: src.into() }
    }
}

pub type Result<T> = std::result::Result<T, EditorError>;
