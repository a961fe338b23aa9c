//! Rectangular crop.
//!
//! Cropping is a two-step gesture. [`CropEngine::start`] drops a
//! semi-transparent selection rectangle onto the canvas; the user adjusts it;
//! [`CropEngine::apply`] cuts that region out of the target image's drawn
//! pixels and hands back a [`CropRequest`]. Swapping the new image in happens
//! later, once the bitmap has been through the encoder and loader, so the
//! request is keyed to the original image's id rather than to whatever is
//! selected by then.

use image::RgbaImage;

use crate::constants::{CROP_RECT_DEFAULT, CROP_RECT_FILL, CROP_RECT_NAME};
use crate::model::{BoundingRect, Geometry, ObjectId, ObjectKind, RectStyle, SceneObject};
use crate::scene::SceneModel;

/// Crop gesture state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CropState {
    #[default]
    Idle,
    /// Selection rectangle on the canvas
    Selecting {
        rect: ObjectId,
        /// Image chosen when the gesture started
        target: Option<ObjectId>,
    },
}

/// Pixels cut from an image, waiting to replace it.
#[derive(Debug, Clone)]
pub struct CropRequest {
    /// Image to replace when the new bitmap is ready
    pub original: ObjectId,
    pub pixels: RgbaImage,
    /// Canvas position of the crop box
    pub left: f64,
    pub top: f64,
}

/// Style of the crop selection rectangle.
pub fn crop_rect_style() -> RectStyle {
    RectStyle {
        fill: CROP_RECT_FILL,
        stroke: [255, 255, 255, 255],
        stroke_width: 1.0,
        dashed: true,
    }
}

/// Image a crop or export should work on: the active object if it is an
/// image, else the first image in z-order.
pub fn default_target(scene: &dyn SceneModel) -> Option<ObjectId> {
    let active = scene
        .active_object()
        .and_then(|id| scene.object(id))
        .filter(|o| o.is_image())
        .map(|o| o.id);
    active.or_else(|| scene.objects_of_kind(ObjectKind::Image).first().map(|o| o.id))
}

/// Cut `bounds` (canvas coordinates) out of an image's drawn pixels.
///
/// The image's offset is subtracted so the region is in the image's own
/// pixel space. A scaled image is resampled to its displayed size first.
/// Rotation of the image is not taken into account. Returns `None` for a
/// missing image or an empty region.
pub fn rasterize_region(
    scene: &dyn SceneModel,
    image: ObjectId,
    bounds: &BoundingRect,
) -> Option<RgbaImage> {
    let object = scene.object(image)?;
    let pixels = scene.pixels(image)?;
    let geometry = &object.geometry;

    let displayed_w = geometry.scaled_width().abs().round() as u32;
    let displayed_h = geometry.scaled_height().abs().round() as u32;
    let resampled;
    let source = if (displayed_w, displayed_h) == pixels.dimensions() {
        pixels
    } else {
        resampled = retouch_raster::resize_exact(pixels, displayed_w, displayed_h);
        &resampled
    };

    let x = (bounds.left - geometry.left).round() as i64;
    let y = (bounds.top - geometry.top).round() as i64;
    let width = bounds.width.round() as u32;
    let height = bounds.height.round() as u32;

    match retouch_raster::extract_region(source, x, y, width, height) {
        Ok(region) => Some(region),
        Err(e) => {
            log::debug!("Cannot rasterize region of image {}: {}", image, e);
            None
        }
    }
}

/// Drives the crop selection rectangle.
#[derive(Debug, Default)]
pub struct CropEngine {
    state: CropState,
}

impl CropEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CropState {
        self.state
    }

    pub fn is_selecting(&self) -> bool {
        matches!(self.state, CropState::Selecting { .. })
    }

    /// The selection rectangle, while selecting.
    pub fn rect(&self) -> Option<ObjectId> {
        match self.state {
            CropState::Selecting { rect, .. } => Some(rect),
            CropState::Idle => None,
        }
    }

    /// Enter crop mode: add the selection rectangle and make it active.
    ///
    /// The target image is fixed now, before the rectangle takes the
    /// selection. Starting again while selecting returns the existing
    /// rectangle.
    pub fn start(&mut self, scene: &mut dyn SceneModel) -> Option<ObjectId> {
        if let Some(rect) = self.rect()
            && scene.object(rect).is_some()
        {
            return Some(rect);
        }

        let target = default_target(scene);
        let id = scene.allocate_id();
        let (left, top, width, height) = CROP_RECT_DEFAULT;
        let rect = SceneObject::rect(
            id,
            CROP_RECT_NAME,
            Geometry::new(left, top, width, height),
            crop_rect_style(),
        );
        if !scene.add_object(rect, None) {
            return None;
        }
        scene.set_active_object(Some(id));
        scene.request_render();

        self.state = CropState::Selecting { rect: id, target };
        log::debug!("Crop mode started (target {:?})", target);
        Some(id)
    }

    /// Leave crop mode, removing the selection rectangle.
    pub fn stop(&mut self, scene: &mut dyn SceneModel) -> bool {
        let Some(rect) = self.rect() else {
            return false;
        };
        self.state = CropState::Idle;
        let removed = scene.remove_object(rect).is_some();
        if removed {
            scene.request_render();
        }
        log::debug!("Crop mode stopped");
        removed
    }

    /// Move or resize the selection rectangle.
    pub fn set_bounds(
        &mut self,
        scene: &mut dyn SceneModel,
        left: f64,
        top: f64,
        width: f64,
        height: f64,
    ) -> bool {
        let Some(rect) = self.rect() else {
            return false;
        };
        scene.update_geometry(rect, &mut |g| *g = Geometry::new(left, top, width, height))
    }

    /// Cut the selected region and leave crop mode.
    ///
    /// Aborts without touching the scene when there is no image or the
    /// rectangle has no bounds; crop mode stays on in that case.
    pub fn apply(&mut self, scene: &mut dyn SceneModel) -> Option<CropRequest> {
        let CropState::Selecting { rect, target } = self.state else {
            return None;
        };

        let target = target
            .filter(|id| scene.object(*id).is_some_and(SceneObject::is_image))
            .or_else(|| scene.objects_of_kind(ObjectKind::Image).first().map(|o| o.id));
        let Some(target) = target else {
            log::debug!("Crop aborted: no image in scene");
            return None;
        };
        let Some(bounds) = scene.object(rect).and_then(|o| o.geometry.bounding_rect()) else {
            log::debug!("Crop aborted: selection has no bounds");
            return None;
        };
        let pixels = rasterize_region(scene, target, &bounds)?;

        scene.remove_object(rect);
        scene.request_render();
        self.state = CropState::Idle;

        log::debug!(
            "Cropped {}x{} from image {}",
            pixels.width(),
            pixels.height(),
            target
        );
        Some(CropRequest {
            original: target,
            pixels,
            left: bounds.left,
            top: bounds.top,
        })
    }

    /// Re-derive state from the scene after it was replaced wholesale.
    pub fn reconcile(&mut self, scene: &dyn SceneModel) {
        let rect = scene
            .objects_of_kind(ObjectKind::Rect)
            .into_iter()
            .find(|o| o.name == CROP_RECT_NAME)
            .map(|o| o.id);

        self.state = match rect {
            Some(rect) => {
                let target = match self.state {
                    CropState::Selecting { target, .. } => target,
                    CropState::Idle => None,
                }
                .filter(|id| scene.object(*id).is_some())
                .or_else(|| default_target(scene));
                CropState::Selecting { rect, target }
            }
            None => CropState::Idle,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Scene;
    use image::Rgba;

    /// Image whose pixel (x, y) is `[x, y, 7, 255]`.
    fn add_gradient(scene: &mut Scene, left: f64, top: f64, w: u32, h: u32) -> ObjectId {
        let id = scene.allocate_id();
        let pixels = RgbaImage::from_fn(w, h, |x, y| Rgba([x as u8, y as u8, 7, 255]));
        scene.add_object(
            SceneObject::image(id, "blob:src", Geometry::new(left, top, w as f64, h as f64)),
            Some(pixels),
        );
        id
    }

    #[test]
    fn test_start_adds_active_rect() {
        let mut scene = Scene::new(800.0, 500.0);
        let image = add_gradient(&mut scene, 0.0, 0.0, 10, 10);
        let mut crop = CropEngine::new();

        let rect = crop.start(&mut scene).unwrap();
        assert_eq!(scene.active_object(), Some(rect));
        assert_eq!(
            crop.state(),
            CropState::Selecting {
                rect,
                target: Some(image)
            }
        );
        let object = scene.object(rect).unwrap();
        assert_eq!(object.name, CROP_RECT_NAME);
        assert_eq!(object.geometry, Geometry::new(100.0, 80.0, 300.0, 200.0));
        assert!(object.rect_style().unwrap().dashed);

        assert_eq!(crop.start(&mut scene), Some(rect));
        assert_eq!(scene.objects().len(), 2);
    }

    #[test]
    fn test_stop_removes_rect() {
        let mut scene = Scene::new(800.0, 500.0);
        let mut crop = CropEngine::new();
        let rect = crop.start(&mut scene).unwrap();
        assert!(crop.stop(&mut scene));
        assert!(scene.object(rect).is_none());
        assert!(!crop.stop(&mut scene));
    }

    #[test]
    fn test_crop_bounds_match_source_region() {
        let mut scene = Scene::new(800.0, 500.0);
        let image = add_gradient(&mut scene, 20.0, 30.0, 100, 100);
        let mut crop = CropEngine::new();
        crop.start(&mut scene);
        crop.set_bounds(&mut scene, 45.0, 40.0, 30.0, 20.0);

        let request = crop.apply(&mut scene).unwrap();
        assert_eq!(request.original, image);
        assert_eq!(request.pixels.dimensions(), (30, 20));
        // (cx - ix, cy - iy) = (25, 10)
        assert_eq!(request.pixels.get_pixel(0, 0).0, [25, 10, 7, 255]);
        assert_eq!(request.pixels.get_pixel(29, 19).0, [54, 29, 7, 255]);
        assert_eq!((request.left, request.top), (45.0, 40.0));

        assert!(!crop.is_selecting());
        assert_eq!(scene.objects().len(), 1);
    }

    #[test]
    fn test_crop_past_edge_is_transparent() {
        let mut scene = Scene::new(800.0, 500.0);
        add_gradient(&mut scene, 0.0, 0.0, 10, 10);
        let mut crop = CropEngine::new();
        crop.start(&mut scene);
        crop.set_bounds(&mut scene, 5.0, 5.0, 10.0, 10.0);

        let request = crop.apply(&mut scene).unwrap();
        assert_eq!(request.pixels.get_pixel(4, 4).0[3], 255);
        assert_eq!(request.pixels.get_pixel(5, 5).0[3], 0);
    }

    #[test]
    fn test_apply_without_image_aborts() {
        let mut scene = Scene::new(800.0, 500.0);
        let mut crop = CropEngine::new();
        let rect = crop.start(&mut scene).unwrap();
        let before = scene.to_serializable();

        assert!(crop.apply(&mut scene).is_none());
        assert_eq!(scene.to_serializable(), before);
        assert_eq!(crop.rect(), Some(rect));
    }

    #[test]
    fn test_apply_with_empty_rect_aborts() {
        let mut scene = Scene::new(800.0, 500.0);
        add_gradient(&mut scene, 0.0, 0.0, 10, 10);
        let mut crop = CropEngine::new();
        crop.start(&mut scene);
        crop.set_bounds(&mut scene, 0.0, 0.0, 0.0, 10.0);
        let before = scene.to_serializable();

        assert!(crop.apply(&mut scene).is_none());
        assert_eq!(scene.to_serializable(), before);
    }

    #[test]
    fn test_target_prefers_active_image() {
        let mut scene = Scene::new(800.0, 500.0);
        add_gradient(&mut scene, 0.0, 0.0, 10, 10);
        let second = add_gradient(&mut scene, 50.0, 50.0, 10, 10);
        scene.set_active_object(Some(second));

        let mut crop = CropEngine::new();
        crop.start(&mut scene);
        crop.set_bounds(&mut scene, 50.0, 50.0, 5.0, 5.0);
        assert_eq!(crop.apply(&mut scene).unwrap().original, second);
    }

    #[test]
    fn test_scaled_image_is_cropped_at_displayed_size() {
        let mut scene = Scene::new(800.0, 500.0);
        let image = add_gradient(&mut scene, 0.0, 0.0, 10, 10);
        scene.scale_object(image, 2.0, 2.0);
        let mut crop = CropEngine::new();
        crop.start(&mut scene);
        crop.set_bounds(&mut scene, 0.0, 0.0, 20.0, 20.0);

        let request = crop.apply(&mut scene).unwrap();
        assert_eq!(request.pixels.dimensions(), (20, 20));
        assert_eq!(request.pixels.get_pixel(19, 19).0[3], 255);
    }

    #[test]
    fn test_reconcile_follows_scene() {
        let mut scene = Scene::new(800.0, 500.0);
        let mut crop = CropEngine::new();
        let rect = crop.start(&mut scene).unwrap();

        let snapshot = scene.to_serializable();
        crop.stop(&mut scene);
        assert!(!crop.is_selecting());

        scene
            .load_serializable(snapshot, std::collections::HashMap::new())
            .unwrap();
        crop.reconcile(&scene);
        assert_eq!(crop.rect(), Some(rect));

        scene.remove_object(rect);
        crop.reconcile(&scene);
        assert_eq!(crop.state(), CropState::Idle);
    }
}
