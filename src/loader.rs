//! Image source resolution.
//!
//! Image objects only carry an opaque `src` string. An [`ImageLoader`] turns
//! that string into pixels, and stores freshly encoded bitmaps (crop
//! results) under new sources.

use std::collections::HashMap;

use image::RgbaImage;

use crate::error::{EditorError, Result};

/// Prefix of sources held in memory by a [`BlobStore`].
pub const BLOB_PREFIX: &str = "blob:";

/// Resolves image sources and stores encoded blobs.
pub trait ImageLoader {
    /// Decode the image behind `src`.
    fn load(&mut self, src: &str) -> Result<RgbaImage>;

    /// Keep encoded image bytes and return a source that resolves to them.
    fn store(&mut self, encoded: Vec<u8>) -> String;

    /// Forget a source handed out by [`store`](Self::store). Returns false if
    /// it was not held.
    fn revoke(&mut self, src: &str) -> bool;
}

/// In-memory blob store with a filesystem fallback.
///
/// `blob:<n>` sources resolve to bytes handed to [`store`](ImageLoader::store).
/// Anything else is treated as a path and opened with the `image` crate.
#[derive(Debug, Default)]
pub struct BlobStore {
    blobs: HashMap<String, Vec<u8>>,
    next_blob: u64,
}

impl BlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode `image` as PNG and store it.
    pub fn insert_image(&mut self, image: &RgbaImage) -> Result<String> {
        let encoded = retouch_raster::encode_png(image)?;
        Ok(self.store(encoded))
    }

    /// Encoded bytes of a stored blob.
    pub fn bytes(&self, src: &str) -> Option<&[u8]> {
        self.blobs.get(src).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl ImageLoader for BlobStore {
    fn load(&mut self, src: &str) -> Result<RgbaImage> {
        if src.starts_with(BLOB_PREFIX) {
            let bytes = self
                .blobs
                .get(src)
                .ok_or_else(|| EditorError::unknown_blob(src))?;
            return Ok(retouch_raster::decode(bytes)?);
        }

        log::debug!("Opening image file {}", src);
        Ok(image::open(src)?.to_rgba8())
    }

    fn store(&mut self, encoded: Vec<u8>) -> String {
        self.next_blob += 1;
        let src = format!("{}{}", BLOB_PREFIX, self.next_blob);
        log::trace!("Stored {} bytes as {}", encoded.len(), src);
        self.blobs.insert(src.clone(), encoded);
        src
    }

    fn revoke(&mut self, src: &str) -> bool {
        self.blobs.remove(src).is_some()
    }
}
