//! In-memory scene graph.

use std::collections::HashMap;
use std::sync::mpsc::{self, Sender};

use image::RgbaImage;

use super::{SceneData, SceneEvent, SceneModel, Subscription, SubscriptionId};
use crate::error::{EditorError, Result};
use crate::filters;
use crate::model::{FilterSet, Geometry, ObjectData, ObjectId, SceneObject};
use crate::viewport::Viewport;

/// Decoded pixels of one image object.
struct ImageBitmap {
    /// Pixels as loaded
    source: RgbaImage,
    /// Pixels after the object's filters, recomputed on every filter change
    filtered: RgbaImage,
}

impl ImageBitmap {
    fn new(id: ObjectId, source: RgbaImage, filters: &FilterSet) -> Self {
        let filtered = render_or_source(id, &source, filters);
        Self { source, filtered }
    }
}

fn render_or_source(id: ObjectId, source: &RgbaImage, filters: &FilterSet) -> RgbaImage {
    match filters::render(source, filters, id) {
        Ok(pixels) => pixels,
        Err(e) => {
            log::error!("Failed to render filters for object {}: {}", id, e);
            source.clone()
        }
    }
}

/// Ordered object list plus pixels, viewport, selection and subscribers.
pub struct Scene {
    width: f64,
    height: f64,
    objects: Vec<SceneObject>,
    bitmaps: HashMap<ObjectId, ImageBitmap>,
    active: Option<ObjectId>,
    viewport: Viewport,
    next_id: ObjectId,
    subscribers: Vec<(SubscriptionId, Sender<SceneEvent>)>,
    next_subscription: SubscriptionId,
}

impl Scene {
    /// Create an empty scene with the given canvas size.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            objects: Vec::new(),
            bitmaps: HashMap::new(),
            active: None,
            viewport: Viewport::identity(),
            next_id: 1,
            subscribers: Vec::new(),
            next_subscription: 1,
        }
    }

    fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|o| o.id == id)
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl SceneModel for Scene {
    fn canvas_size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn allocate_id(&mut self) -> ObjectId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn add_object(&mut self, object: SceneObject, pixels: Option<RgbaImage>) -> bool {
        if self.index_of(object.id).is_some() {
            log::warn!("Refusing to add duplicate object id {}", object.id);
            return false;
        }

        let id = object.id;
        if let ObjectData::Image { filters, .. } = &object.data {
            let Some(source) = pixels else {
                log::warn!("Refusing to add image {} without pixels", id);
                return false;
            };
            self.bitmaps.insert(id, ImageBitmap::new(id, source, filters));
        }

        self.next_id = self.next_id.max(id + 1);
        self.objects.push(object);
        self.fire(SceneEvent::Added(id));
        true
    }

    fn remove_object(&mut self, id: ObjectId) -> Option<SceneObject> {
        let index = self.index_of(id)?;
        let object = self.objects.remove(index);
        self.bitmaps.remove(&id);
        if self.active == Some(id) {
            self.active = None;
        }
        self.fire(SceneEvent::Removed(id));
        Some(object)
    }

    fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    fn update_geometry(&mut self, id: ObjectId, f: &mut dyn FnMut(&mut Geometry)) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        f(&mut self.objects[index].geometry);
        self.fire(SceneEvent::Modified(id));
        true
    }

    fn scale_object(&mut self, id: ObjectId, scale_x: f64, scale_y: f64) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let geometry = &mut self.objects[index].geometry;
        geometry.scale_x = scale_x;
        geometry.scale_y = scale_y;
        self.fire(SceneEvent::Scaling(id));
        true
    }

    fn update_filters(&mut self, id: ObjectId, f: &mut dyn FnMut(&mut FilterSet)) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let Some(filters) = self.objects[index].filters_mut() else {
            return false;
        };
        f(filters);

        let filters = filters.clone();
        if let Some(bitmap) = self.bitmaps.get_mut(&id) {
            bitmap.filtered = render_or_source(id, &bitmap.source, &filters);
        }
        self.fire(SceneEvent::FilterApplied(id));
        true
    }

    fn pixels(&self, id: ObjectId) -> Option<&RgbaImage> {
        self.bitmaps.get(&id).map(|b| &b.filtered)
    }

    fn source_pixels(&self, id: ObjectId) -> Option<&RgbaImage> {
        self.bitmaps.get(&id).map(|b| &b.source)
    }

    fn active_object(&self) -> Option<ObjectId> {
        self.active
    }

    fn set_active_object(&mut self, id: Option<ObjectId>) -> bool {
        match id {
            Some(id) if self.index_of(id).is_none() => false,
            _ => {
                self.active = id;
                true
            }
        }
    }

    fn to_serializable(&self) -> SceneData {
        SceneData::new(self.objects.clone())
    }

    fn load_serializable(
        &mut self,
        data: SceneData,
        mut pixels: HashMap<ObjectId, RgbaImage>,
    ) -> Result<()> {
        // Validate everything before touching the live state
        let mut bitmaps = HashMap::new();
        for object in &data.objects {
            if let ObjectData::Image { filters, .. } = &object.data {
                let source = pixels
                    .remove(&object.id)
                    .ok_or(EditorError::MissingPixels { id: object.id })?;
                bitmaps.insert(object.id, ImageBitmap::new(object.id, source, filters));
            }
        }

        let max_id = data.objects.iter().map(|o| o.id).max().unwrap_or(0);
        self.next_id = self.next_id.max(max_id + 1);
        self.objects = data.objects;
        self.bitmaps = bitmaps;
        if let Some(active) = self.active
            && self.index_of(active).is_none()
        {
            self.active = None;
        }

        log::debug!("Loaded {} objects into scene", self.objects.len());
        self.fire(SceneEvent::Loaded);
        Ok(())
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.fire(SceneEvent::ViewportChanged);
    }

    fn fire(&mut self, event: SceneEvent) {
        // A send only fails once the receiver is gone; drop those senders
        self.subscribers.retain(|(_, sender)| sender.send(event).is_ok());
    }

    fn subscribe(&mut self) -> Subscription {
        let (sender, receiver) = mpsc::channel();
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.subscribers.push((id, sender));
        Subscription::new(id, receiver)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }
}
