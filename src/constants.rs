//! Global constants for the retouch editor

/// Default canvas width
pub const DEFAULT_CANVAS_WIDTH: f64 = 800.0;

/// Default canvas height
pub const DEFAULT_CANVAS_HEIGHT: f64 = 500.0;

/// Lowest zoom level the canvas accepts
pub const MIN_ZOOM: f64 = 0.2;

/// Highest zoom level the canvas accepts
pub const MAX_ZOOM: f64 = 3.0;

/// Zoom increment for the zoom in/out buttons
pub const ZOOM_STEP: f64 = 0.1;

/// Per-notch wheel zoom base (zoom *= base ^ delta)
pub const WHEEL_ZOOM_BASE: f64 = 0.999;

/// Degrees added for a left rotation (right rotation is the negation)
pub const ROTATE_STEP_DEGREES: f64 = 45.0;

/// Maximum number of snapshots kept in the undo stack
pub const DEFAULT_MAX_HISTORY: usize = 100;

/// Quiet period before a burst of wheel/zoom events is captured
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Cadence of the unconditional fallback capture
pub const DEFAULT_FALLBACK_INTERVAL_MS: u64 = 2000;

/// Name given to the transient crop selection rectangle
pub const CROP_RECT_NAME: &str = "Crop Selection";

/// Default crop rectangle geometry (left, top, width, height)
pub const CROP_RECT_DEFAULT: (f64, f64, f64, f64) = (100.0, 80.0, 300.0, 200.0);

/// Crop rectangle fill: black at 30% opacity
pub const CROP_RECT_FILL: [u8; 4] = [0, 0, 0, 77];

/// Name prefix shared by every frame
pub const FRAME_NAME_PREFIX: &str = "Frame";

/// Default frame geometry (left, top, width, height)
pub const FRAME_DEFAULT: (f64, f64, f64, f64) = (50.0, 50.0, 200.0, 150.0);

/// Frame outline colour
pub const FRAME_STROKE: [u8; 4] = [255, 0, 0, 255];

/// Frame outline width in canvas pixels
pub const FRAME_STROKE_WIDTH: f64 = 1.0;

/// Download name for an exported image
pub const EXPORT_FILE_NAME: &str = "edited-image.png";
