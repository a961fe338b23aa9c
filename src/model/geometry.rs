//! Object placement and bounds.

use serde::{Deserialize, Serialize};

/// Placement of a scene object in canvas coordinates.
///
/// `left`/`top` locate the unrotated box; `angle` (degrees) rotates it about
/// its centre. The visible size is `width * scale_x` by `height * scale_y`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Geometry {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub angle: f64,
}

impl Geometry {
    /// Unscaled, unrotated geometry.
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: 0.0,
        }
    }

    /// Width after scaling.
    pub fn scaled_width(&self) -> f64 {
        self.width * self.scale_x
    }

    /// Height after scaling.
    pub fn scaled_height(&self) -> f64 {
        self.height * self.scale_y
    }

    /// Centre of the box in canvas coordinates.
    pub fn center(&self) -> (f64, f64) {
        (
            self.left + self.scaled_width() / 2.0,
            self.top + self.scaled_height() / 2.0,
        )
    }

    /// Axis-aligned bounding box of the scaled, rotated object.
    ///
    /// Returns `None` when the object has no area.
    pub fn bounding_rect(&self) -> Option<BoundingRect> {
        let w = self.scaled_width().abs();
        let h = self.scaled_height().abs();
        if w <= 0.0 || h <= 0.0 || !w.is_finite() || !h.is_finite() {
            return None;
        }

        let (cx, cy) = self.center();
        let (sin, cos) = self.angle.to_radians().sin_cos();
        let corners = [
            (-w / 2.0, -h / 2.0),
            (w / 2.0, -h / 2.0),
            (w / 2.0, h / 2.0),
            (-w / 2.0, h / 2.0),
        ];

        let mut min = (f64::INFINITY, f64::INFINITY);
        let mut max = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for (x, y) in corners {
            let rx = cx + x * cos - y * sin;
            let ry = cy + x * sin + y * cos;
            min = (min.0.min(rx), min.1.min(ry));
            max = (max.0.max(rx), max.1.max(ry));
        }

        Some(BoundingRect {
            left: min.0,
            top: min.1,
            width: max.0 - min.0,
            height: max.1 - min.1,
        })
    }

    /// Fold the current scale into width/height and reset scale to 1.
    ///
    /// Returns true if anything changed.
    pub fn normalize_scale(&mut self) -> bool {
        if self.scale_x == 1.0 && self.scale_y == 1.0 {
            return false;
        }
        self.width *= self.scale_x;
        self.height *= self.scale_y;
        self.scale_x = 1.0;
        self.scale_y = 1.0;
        true
    }
}

/// Axis-aligned rectangle in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}
