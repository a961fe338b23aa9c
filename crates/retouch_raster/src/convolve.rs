//! Box (averaging) convolution.

use image::{Rgba, RgbaImage};

use crate::error::{RasterError, Result};

/// Sum of `radius`-wide windows along one line of samples, with samples
/// outside the line clamped to the nearest end.
///
/// Runs in O(len) whatever the radius, via a prefix sum over the line plus
/// the count of clamped samples falling off either end.
fn window_sums(line: &[[f64; 4]], radius: u64, out: &mut Vec<[f64; 4]>) {
    out.clear();
    let len = line.len();
    if len == 0 {
        return;
    }

    let mut prefix = Vec::with_capacity(len + 1);
    let mut running = [0.0f64; 4];
    prefix.push(running);
    for sample in line {
        for c in 0..4 {
            running[c] += sample[c];
        }
        prefix.push(running);
    }

    let first = line[0];
    let last = line[len - 1];
    let last_index = (len - 1) as u64;
    for x in 0..len as u64 {
        let left_overflow = radius.saturating_sub(x);
        let right_overflow = (x + radius).saturating_sub(last_index);
        let lo = x.saturating_sub(radius) as usize;
        let hi = (x + radius).min(last_index) as usize;

        let mut acc = [0.0f64; 4];
        for c in 0..4 {
            acc[c] = prefix[hi + 1][c] - prefix[lo][c]
                + left_overflow as f64 * first[c]
                + right_overflow as f64 * last[c];
        }
        out.push(acc);
    }
}

/// Average every channel (alpha included) over a `kernel x kernel` window.
///
/// Samples outside the image are clamped to the nearest edge pixel. The sum is
/// computed separably (horizontal pass, then vertical) which gives the same
/// result as the full 2D box kernel. Cost does not depend on `kernel`.
pub fn box_blur(image: &RgbaImage, kernel: u32) -> Result<RgbaImage> {
    if kernel == 0 || kernel % 2 == 0 {
        return Err(RasterError::InvalidKernel(kernel));
    }
    let (width, height) = image.dimensions();
    if kernel == 1 || width == 0 || height == 0 {
        return Ok(image.clone());
    }

    let radius = u64::from(kernel / 2);
    let w = width as usize;
    let h = height as usize;

    let mut horizontal = vec![[0.0f64; 4]; w * h];
    let mut line = Vec::with_capacity(w.max(h));
    let mut sums = Vec::with_capacity(w.max(h));
    for y in 0..h {
        line.clear();
        line.extend((0..width).map(|x| image.get_pixel(x, y as u32).0.map(f64::from)));
        window_sums(&line, radius, &mut sums);
        horizontal[y * w..(y + 1) * w].copy_from_slice(&sums);
    }

    let norm = f64::from(kernel) * f64::from(kernel);
    let mut out = RgbaImage::new(width, height);
    for x in 0..w {
        line.clear();
        line.extend((0..h).map(|y| horizontal[y * w + x]));
        window_sums(&line, radius, &mut sums);
        for (y, acc) in sums.iter().enumerate() {
            let pixel = acc.map(|v| (v / norm).round().clamp(0.0, 255.0) as u8);
            out.put_pixel(x as u32, y as u32, Rgba(pixel));
        }
    }
    Ok(out)
}
