//! Per-channel tone adjustments.
//!
//! Brightness, contrast and gamma are pure per-value mappings, so they are
//! built as 256-entry lookup tables and applied to the colour channels in one
//! pass. Alpha is never touched. Noise is the odd one out: it needs a random
//! offset per pixel, drawn from a seeded generator so the same seed always
//! yields the same pixels.

use image::RgbaImage;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::error::{RasterError, Result};

/// Maps input channel values [0..255] to output values [0..255].
pub type Lut = [u8; 256];

fn clamp_channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

fn build_lut(f: impl Fn(f64) -> f64) -> Lut {
    let mut lut = [0u8; 256];
    for (i, entry) in lut.iter_mut().enumerate() {
        *entry = clamp_channel(f(i as f64));
    }
    lut
}

/// Brightness shift. `brightness` is normalized to [-1, 1] and is added to
/// every colour channel as a fraction of full scale.
pub fn brightness_lut(brightness: f64) -> Lut {
    let offset = brightness * 255.0;
    build_lut(|v| v + offset)
}

/// Contrast stretch around mid-grey. `contrast` is normalized to [-1, 1].
pub fn contrast_lut(contrast: f64) -> Lut {
    let c = (contrast * 255.0).floor();
    // c == 259 is unreachable for inputs in [-1, 1]
    let factor = 259.0 * (c + 255.0) / (255.0 * (259.0 - c));
    build_lut(|v| factor * (v - 128.0) + 128.0)
}

/// Gamma correction: `255 * (v / 255) ^ (1 / gamma)`.
pub fn gamma_lut(gamma: f64) -> Result<Lut> {
    if gamma <= 0.0 || !gamma.is_finite() {
        return Err(RasterError::InvalidGamma(gamma));
    }
    let inverse = 1.0 / gamma;
    Ok(build_lut(|v| 255.0 * (v / 255.0).powf(inverse)))
}

/// Apply a lookup table to the R, G and B channels in place.
pub fn apply_lut(image: &mut RgbaImage, lut: &Lut) {
    for pixel in image.pixels_mut() {
        for channel in pixel.0.iter_mut().take(3) {
            *channel = lut[*channel as usize];
        }
    }
}

/// Add uniform noise in place.
///
/// Each pixel gets a single offset in `[-amount / 2, amount / 2]` applied to
/// all three colour channels, so noise stays grey rather than coloured.
pub fn noise(image: &mut RgbaImage, amount: f64, seed: u64) {
    if amount <= 0.0 {
        return;
    }
    let mut rng = SmallRng::seed_from_u64(seed);
    for pixel in image.pixels_mut() {
        let offset = (0.5 - rng.random::<f64>()) * amount;
        for channel in pixel.0.iter_mut().take(3) {
            *channel = clamp_channel(f64::from(*channel) + offset);
        }
    }
}
