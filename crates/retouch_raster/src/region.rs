//! Region extraction and PNG round-tripping.

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{ImageFormat, RgbaImage};

use crate::error::{RasterError, Result};

/// Copy the `width x height` region whose top-left corner sits at `(x, y)` in
/// `source` coordinates into a new bitmap.
///
/// The origin may be negative and the region may extend past the source; any
/// output pixel without a source pixel behind it is fully transparent, the same
/// as drawing a partially off-canvas image onto a cleared surface.
pub fn extract_region(
    source: &RgbaImage,
    x: i64,
    y: i64,
    width: u32,
    height: u32,
) -> Result<RgbaImage> {
    if width == 0 || height == 0 {
        return Err(RasterError::EmptyRegion { width, height });
    }

    let mut out = RgbaImage::new(width, height);
    let (src_w, src_h) = (i64::from(source.width()), i64::from(source.height()));

    for oy in 0..height {
        let sy = y + i64::from(oy);
        if sy < 0 || sy >= src_h {
            continue;
        }
        for ox in 0..width {
            let sx = x + i64::from(ox);
            if sx < 0 || sx >= src_w {
                continue;
            }
            out.put_pixel(ox, oy, *source.get_pixel(sx as u32, sy as u32));
        }
    }

    log::trace!("Extracted {}x{} region at ({}, {})", width, height, x, y);
    Ok(out)
}

/// Resize to exact dimensions. Returns a clone when the size already matches.
pub fn resize_exact(source: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    if source.dimensions() == (width, height) {
        return source.clone();
    }
    imageops::resize(source, width.max(1), height.max(1), FilterType::Triangle)
}

/// Encode a bitmap as PNG bytes.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Cursor::new(Vec::new());
    image.write_to(&mut bytes, ImageFormat::Png)?;
    Ok(bytes.into_inner())
}

/// Decode any supported encoded image into RGBA.
pub fn decode(bytes: &[u8]) -> Result<RgbaImage> {
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}
