//! Named frame regions.
//!
//! A frame is an outline-only rectangle named `"Frame N"`. Resizing one only
//! ever changes its scale, so the manager listens for scale and modify events
//! and folds the scale back into width and height. That keeps the outline one
//! pixel wide however far the frame is stretched.

use std::collections::BTreeSet;

use crate::constants::{FRAME_DEFAULT, FRAME_NAME_PREFIX, FRAME_STROKE, FRAME_STROKE_WIDTH};
use crate::crop::{default_target, rasterize_region};
use crate::model::{Geometry, ObjectId, ObjectKind, RectStyle, SceneObject};
use crate::scene::{SceneEvent, SceneModel, Subscription};

/// A frame rendered to PNG, ready for download.
#[derive(Debug, Clone)]
pub struct FrameExport {
    /// `"<frame name>.png"`
    pub file_name: String,
    pub png: Vec<u8>,
}

fn frame_style() -> RectStyle {
    RectStyle {
        fill: [0, 0, 0, 0],
        stroke: FRAME_STROKE,
        stroke_width: FRAME_STROKE_WIDTH,
        dashed: false,
    }
}

fn is_frame(object: &SceneObject) -> bool {
    object.kind() == ObjectKind::Rect && object.name.starts_with(FRAME_NAME_PREFIX)
}

/// Tracks frames and keeps their scale normalized.
#[derive(Debug, Default)]
pub struct FrameManager {
    frames: BTreeSet<ObjectId>,
    subscription: Option<Subscription>,
}

impl FrameManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start listening to `scene` and pick up any frames already in it.
    pub fn attach(&mut self, scene: &mut dyn SceneModel) {
        if let Some(old) = self.subscription.take() {
            scene.unsubscribe(old.id());
        }
        self.subscription = Some(scene.subscribe());
        self.reconcile(scene);
    }

    /// Stop listening.
    pub fn detach(&mut self, scene: &mut dyn SceneModel) {
        if let Some(subscription) = self.subscription.take() {
            scene.unsubscribe(subscription.id());
        }
    }

    /// Append a new frame. N in `"Frame N"` is one more than the number of
    /// rectangles already in the scene.
    pub fn add_frame(&mut self, scene: &mut dyn SceneModel) -> Option<ObjectId> {
        let n = scene.objects_of_kind(ObjectKind::Rect).len() + 1;
        let name = format!("{} {}", FRAME_NAME_PREFIX, n);
        let id = scene.allocate_id();
        let (left, top, width, height) = FRAME_DEFAULT;
        let frame = SceneObject::rect(
            id,
            name.as_str(),
            Geometry::new(left, top, width, height),
            frame_style(),
        );
        if !scene.add_object(frame, None) {
            return None;
        }
        self.frames.insert(id);
        scene.request_render();
        log::debug!("Added {}", name);
        Some(id)
    }

    /// Apply pending scale/modify events to registered frames.
    ///
    /// Returns the number of frames whose scale was folded.
    pub fn handle_events(&mut self, scene: &mut dyn SceneModel) -> usize {
        let Some(subscription) = &self.subscription else {
            return 0;
        };
        let events = subscription.drain();

        let mut touched = BTreeSet::new();
        for event in events {
            match event {
                SceneEvent::Scaling(id) | SceneEvent::Modified(id) if self.frames.contains(&id) => {
                    touched.insert(id);
                }
                SceneEvent::Removed(id) => {
                    self.frames.remove(&id);
                }
                SceneEvent::Loaded => self.reconcile(scene),
                _ => {}
            }
        }

        let mut normalized = 0;
        for id in touched {
            if self.normalize(scene, id) {
                normalized += 1;
            }
        }
        normalized
    }

    fn normalize(&self, scene: &mut dyn SceneModel, id: ObjectId) -> bool {
        let needs = scene
            .object(id)
            .is_some_and(|o| o.geometry.scale_x != 1.0 || o.geometry.scale_y != 1.0);
        if !needs {
            return false;
        }
        scene.update_geometry(id, &mut |g| {
            g.normalize_scale();
        });
        log::trace!("Normalized scale of frame {}", id);
        true
    }

    /// Re-register frames from the scene contents.
    pub fn reconcile(&mut self, scene: &dyn SceneModel) {
        self.frames = scene
            .objects()
            .iter()
            .filter(|o| is_frame(o))
            .map(|o| o.id)
            .collect();
    }

    /// Frames in z-order.
    pub fn frames<'a>(&self, scene: &'a dyn SceneModel) -> Vec<&'a SceneObject> {
        scene
            .objects()
            .iter()
            .filter(|o| self.frames.contains(&o.id))
            .collect()
    }

    fn find(&self, scene: &dyn SceneModel, name: &str) -> Option<ObjectId> {
        self.frames(scene)
            .into_iter()
            .find(|o| o.name == name)
            .map(|o| o.id)
    }

    /// Make the named frame the active object.
    pub fn select_frame(&self, scene: &mut dyn SceneModel, name: &str) -> bool {
        let Some(id) = self.find(scene, name) else {
            log::debug!("No frame named {:?}", name);
            return false;
        };
        scene.set_active_object(Some(id))
    }

    /// Rasterize the image under the named frame to PNG.
    pub fn export_frame(&self, scene: &dyn SceneModel, name: &str) -> Option<FrameExport> {
        let id = self.find(scene, name)?;
        let bounds = scene.object(id)?.geometry.bounding_rect()?;
        let image = default_target(scene)?;
        let pixels = rasterize_region(scene, image, &bounds)?;

        match retouch_raster::encode_png(&pixels) {
            Ok(png) => Some(FrameExport {
                file_name: format!("{}.png", name),
                png,
            }),
            Err(e) => {
                log::error!("Failed to encode {}: {}", name, e);
                None
            }
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Scene;
    use image::{Rgba, RgbaImage};

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    fn setup() -> (Scene, FrameManager) {
        let mut scene = Scene::new(800.0, 500.0);
        let mut frames = FrameManager::new();
        frames.attach(&mut scene);
        (scene, frames)
    }

    #[test]
    fn test_frames_are_numbered_by_rect_count() {
        let (mut scene, mut frames) = setup();
        let a = frames.add_frame(&mut scene).unwrap();
        let b = frames.add_frame(&mut scene).unwrap();
        assert_eq!(scene.object(a).unwrap().name, "Frame 1");
        assert_eq!(scene.object(b).unwrap().name, "Frame 2");

        let style = scene.object(a).unwrap().rect_style().copied().unwrap();
        assert_eq!(style.fill[3], 0);
        assert_eq!(style.stroke_width, FRAME_STROKE_WIDTH);
    }

    #[test]
    fn test_non_uniform_scale_is_folded() {
        let (mut scene, mut frames) = setup();
        let id = frames.add_frame(&mut scene).unwrap();
        let (_, _, width, height) = FRAME_DEFAULT;

        scene.scale_object(id, 2.0, 0.5);
        assert_eq!(frames.handle_events(&mut scene), 1);

        let object = scene.object(id).unwrap();
        assert_eq!(object.geometry.scale_x, 1.0);
        assert_eq!(object.geometry.scale_y, 1.0);
        assert!(approx_eq(object.geometry.width, width * 2.0));
        assert!(approx_eq(object.geometry.height, height * 0.5));
        assert_eq!(object.rect_style().unwrap().stroke_width, FRAME_STROKE_WIDTH);

        // The Modified event from the fold itself is a no-op
        assert_eq!(frames.handle_events(&mut scene), 0);
    }

    #[test]
    fn test_modified_event_also_normalizes() {
        let (mut scene, mut frames) = setup();
        let id = frames.add_frame(&mut scene).unwrap();
        scene.update_geometry(id, &mut |g| {
            g.scale_x = 3.0;
        });
        frames.handle_events(&mut scene);
        let geometry = scene.object(id).unwrap().geometry;
        assert_eq!(geometry.scale_x, 1.0);
        assert!(approx_eq(geometry.width, FRAME_DEFAULT.2 * 3.0));
    }

    #[test]
    fn test_other_rects_are_not_normalized() {
        let (mut scene, mut frames) = setup();
        let id = scene.allocate_id();
        scene.add_object(
            SceneObject::rect(id, "Crop Selection", Geometry::new(0.0, 0.0, 10.0, 10.0), frame_style()),
            None,
        );
        scene.scale_object(id, 2.0, 2.0);
        assert_eq!(frames.handle_events(&mut scene), 0);
        assert_eq!(scene.object(id).unwrap().geometry.scale_x, 2.0);
    }

    #[test]
    fn test_restored_frames_are_tracked() {
        let (mut scene, mut frames) = setup();
        frames.add_frame(&mut scene);
        let data = scene.to_serializable();
        let id = frames.add_frame(&mut scene).unwrap();
        scene.remove_object(id);
        frames.handle_events(&mut scene);
        assert_eq!(frames.frame_count(), 1);

        scene.load_serializable(data, std::collections::HashMap::new()).unwrap();
        frames.handle_events(&mut scene);
        assert_eq!(frames.frame_count(), 1);
        assert_eq!(frames.frames(&scene)[0].name, "Frame 1");
    }

    #[test]
    fn test_select_and_export() {
        let (mut scene, mut frames) = setup();
        let image = scene.allocate_id();
        let pixels = RgbaImage::from_pixel(400, 300, Rgba([9, 8, 7, 255]));
        scene.add_object(
            SceneObject::image(image, "blob:1", Geometry::new(0.0, 0.0, 400.0, 300.0)),
            Some(pixels),
        );
        let frame = frames.add_frame(&mut scene).unwrap();

        assert!(frames.select_frame(&mut scene, "Frame 1"));
        assert_eq!(scene.active_object(), Some(frame));
        assert!(!frames.select_frame(&mut scene, "Frame 9"));

        let export = frames.export_frame(&scene, "Frame 1").unwrap();
        assert_eq!(export.file_name, "Frame 1.png");
        let decoded = retouch_raster::decode(&export.png).unwrap();
        assert_eq!(
            decoded.dimensions(),
            (FRAME_DEFAULT.2 as u32, FRAME_DEFAULT.3 as u32)
        );
        assert_eq!(decoded.get_pixel(0, 0).0, [9, 8, 7, 255]);
    }
}
