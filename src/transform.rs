//! Zoom, pan and rotation.

use crate::constants::{MAX_ZOOM, MIN_ZOOM, ROTATE_STEP_DEGREES, WHEEL_ZOOM_BASE, ZOOM_STEP};
use crate::model::ObjectId;
use crate::scene::{SceneEvent, SceneModel};

/// Rotation direction for the rotate buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotateDirection {
    Left,
    Right,
}

impl RotateDirection {
    /// Signed degree delta: left is counter-clockwise positive.
    pub fn degrees(&self) -> f64 {
        match self {
            RotateDirection::Left => ROTATE_STEP_DEGREES,
            RotateDirection::Right => -ROTATE_STEP_DEGREES,
        }
    }
}

/// Clamp a zoom level to the supported range.
pub fn clamp_zoom(zoom: f64) -> f64 {
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}

/// Zoom about the canvas centre and announce the change.
///
/// Returns the zoom actually applied after clamping.
pub fn apply_zoom(scene: &mut dyn SceneModel, new_zoom: f64) -> f64 {
    let zoom = clamp_zoom(new_zoom);
    let (width, height) = scene.canvas_size();
    let viewport = scene.viewport().zoom_to_point(zoom, width / 2.0, height / 2.0);
    scene.set_viewport(viewport);
    scene.request_render();
    scene.fire(SceneEvent::ZoomChanged(zoom));
    log::trace!("Zoom set to {:.2}", zoom);
    zoom
}

/// Step zoom in by [`ZOOM_STEP`].
pub fn zoom_in(scene: &mut dyn SceneModel) -> f64 {
    let zoom = scene.zoom() + ZOOM_STEP;
    apply_zoom(scene, zoom)
}

/// Step zoom out by [`ZOOM_STEP`].
pub fn zoom_out(scene: &mut dyn SceneModel) -> f64 {
    let zoom = scene.zoom() - ZOOM_STEP;
    apply_zoom(scene, zoom)
}

/// One wheel step: zoom about the pointer by `WHEEL_ZOOM_BASE ^ delta_y`.
///
/// Unlike the buttons this follows the cursor, and it is announced as a
/// `Wheel` event so history treats the whole gesture as a burst.
pub fn wheel_zoom(scene: &mut dyn SceneModel, delta_y: f64, x: f64, y: f64) -> f64 {
    let zoom = clamp_zoom(scene.zoom() * WHEEL_ZOOM_BASE.powf(delta_y));
    let viewport = scene.viewport().zoom_to_point(zoom, x, y);
    scene.set_viewport(viewport);
    scene.fire(SceneEvent::Wheel);
    scene.request_render();
    zoom
}

/// Translate the viewport.
pub fn pan_by(scene: &mut dyn SceneModel, dx: f64, dy: f64) {
    let viewport = scene.viewport().pan_by(dx, dy);
    scene.set_viewport(viewport);
    scene.request_render();
}

/// Rotate `target` by one step. The angle is not wrapped.
///
/// Returns false when there is no target.
pub fn apply_rotate(
    scene: &mut dyn SceneModel,
    target: Option<ObjectId>,
    direction: RotateDirection,
) -> bool {
    let Some(id) = target else {
        return false;
    };
    let delta = direction.degrees();
    let rotated = scene.update_geometry(id, &mut |g| g.angle += delta);
    if rotated {
        scene.request_render();
    }
    rotated
}
