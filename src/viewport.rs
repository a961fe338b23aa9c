//! Canvas viewport transform and zoom-to-point mathematics.

use serde::{Deserialize, Serialize};

/// Uniform pan/zoom transform from canvas space to screen space.
///
/// Equivalent to the 2x3 affine matrix `[zoom, 0, 0, zoom, pan_x, pan_y]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub zoom: f64,
    pub pan_x: f64,
    pub pan_y: f64,
}

impl Viewport {
    /// Create a viewport with the given zoom and pan.
    pub fn new(zoom: f64, pan_x: f64, pan_y: f64) -> Self {
        Self { zoom, pan_x, pan_y }
    }

    /// Create an identity viewport (zoom=1, no pan).
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    /// The 2x3 affine matrix `[a, b, c, d, e, f]`.
    pub fn to_matrix(&self) -> [f64; 6] {
        [self.zoom, 0.0, 0.0, self.zoom, self.pan_x, self.pan_y]
    }

    /// Build a viewport from an affine matrix.
    ///
    /// Only uniform scale plus translation is representable; the horizontal
    /// scale `a` is taken as the zoom. Returns `None` for a singular matrix.
    pub fn from_matrix(matrix: [f64; 6]) -> Option<Self> {
        let [a, _, _, _, e, f] = matrix;
        if a == 0.0 || !a.is_finite() {
            return None;
        }
        Some(Self::new(a, e, f))
    }

    /// Map a screen point to canvas coordinates.
    pub fn to_canvas(&self, x: f64, y: f64) -> (f64, f64) {
        ((x - self.pan_x) / self.zoom, (y - self.pan_y) / self.zoom)
    }

    /// Zoom so that the canvas point currently under the screen point
    /// `(x, y)` stays under it.
    ///
    /// 1. Find the canvas-space point under `(x, y)`
    /// 2. After zooming, adjust pan so that same point maps back to `(x, y)`
    pub fn zoom_to_point(&self, new_zoom: f64, x: f64, y: f64) -> Viewport {
        let (cx, cy) = self.to_canvas(x, y);
        Viewport {
            zoom: new_zoom,
            pan_x: x - cx * new_zoom,
            pan_y: y - cy * new_zoom,
        }
    }

    /// Apply a pan delta to the viewport.
    pub fn pan_by(&self, dx: f64, dy: f64) -> Viewport {
        Viewport {
            zoom: self.zoom,
            pan_x: self.pan_x + dx,
            pan_y: self.pan_y + dy,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::identity()
    }
}
