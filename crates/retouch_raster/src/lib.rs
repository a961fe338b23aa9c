//! Pixel kernels for the retouch editor.
//!
//! Everything here works on `image::RgbaImage` and knows nothing about scenes,
//! history or filters-as-data. The editor crate decides *which* kernels run and
//! in what order; this crate only decides what they do to the pixels.

mod adjust;
mod convolve;
mod error;
mod region;

pub use adjust::{Lut, apply_lut, brightness_lut, contrast_lut, gamma_lut, noise};
pub use convolve::box_blur;
pub use error::{RasterError, Result};
pub use region::{decode, encode_png, extract_region, resize_exact};
