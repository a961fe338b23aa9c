//! Scene object model.
//!
//! The [`SceneModel`] trait is everything the rest of the editor knows about
//! the scene graph: an ordered object list, per-image pixels, a viewport, and a
//! typed event stream. [`Scene`] is the in-memory implementation.
//!
//! ## Events
//!
//! Every mutation is announced as a [`SceneEvent`] to all subscribers. A
//! subscription is a queue the owner drains when it is ready, so a subscriber
//! never runs while the scene is mid-mutation and may freely mutate the scene
//! in response.

mod canvas;
mod data;

use std::collections::HashMap;
use std::sync::mpsc::Receiver;

use image::RgbaImage;

use crate::error::Result;
use crate::model::{FilterSet, Geometry, ObjectId, ObjectKind, SceneObject};
use crate::viewport::Viewport;

pub use canvas::Scene;
pub use data::{SCENE_FORMAT_VERSION, SceneData};

/// Identifies one subscription for `unsubscribe`.
pub type SubscriptionId = u64;

/// Mutation notifications emitted by a scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SceneEvent {
    /// An object was appended
    Added(ObjectId),
    /// An object was removed
    Removed(ObjectId),
    /// An object's geometry or visibility was committed
    Modified(ObjectId),
    /// An object's scale is changing (live resize, not yet committed)
    Scaling(ObjectId),
    /// An image's filter set changed
    FilterApplied(ObjectId),
    /// Pan or zoom changed the viewport
    ViewportChanged,
    /// Explicit zoom change, carrying the new zoom
    ZoomChanged(f64),
    /// A wheel gesture step
    Wheel,
    /// The whole object set was replaced from serialized data
    Loaded,
    /// A redraw was requested
    Rendered,
}

impl SceneEvent {
    /// The object this event concerns, if any.
    pub fn object_id(&self) -> Option<ObjectId> {
        match self {
            SceneEvent::Added(id)
            | SceneEvent::Removed(id)
            | SceneEvent::Modified(id)
            | SceneEvent::Scaling(id)
            | SceneEvent::FilterApplied(id) => Some(*id),
            _ => None,
        }
    }
}

/// Receiving end of a scene event subscription.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    receiver: Receiver<SceneEvent>,
}

impl Subscription {
    pub(crate) fn new(id: SubscriptionId, receiver: Receiver<SceneEvent>) -> Self {
        Self { id, receiver }
    }

    /// Get the subscription id.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Take every event queued since the last drain, oldest first.
    pub fn drain(&self) -> Vec<SceneEvent> {
        self.receiver.try_iter().collect()
    }
}

/// The scene graph contract consumed by history, filters, crop and frames.
pub trait SceneModel {
    /// Canvas size (width, height) in screen pixels.
    fn canvas_size(&self) -> (f64, f64);

    /// Reserve a fresh object id.
    fn allocate_id(&mut self) -> ObjectId;

    /// Append an object. Images must come with their decoded pixels.
    ///
    /// Returns false (and adds nothing) for a duplicate id or an image
    /// without pixels.
    fn add_object(&mut self, object: SceneObject, pixels: Option<RgbaImage>) -> bool;

    /// Remove an object, returning it.
    fn remove_object(&mut self, id: ObjectId) -> Option<SceneObject>;

    /// Look up an object.
    fn object(&self, id: ObjectId) -> Option<&SceneObject>;

    /// All objects in z-order (bottom first).
    fn objects(&self) -> &[SceneObject];

    /// Objects of one kind in z-order.
    fn objects_of_kind(&self, kind: ObjectKind) -> Vec<&SceneObject> {
        self.objects().iter().filter(|o| o.kind() == kind).collect()
    }

    /// Mutate an object's geometry and commit it (emits `Modified`).
    fn update_geometry(&mut self, id: ObjectId, f: &mut dyn FnMut(&mut Geometry)) -> bool;

    /// Live resize: set an object's scale without committing (emits `Scaling`).
    fn scale_object(&mut self, id: ObjectId, scale_x: f64, scale_y: f64) -> bool;

    /// Mutate an image's filters and recompute its pixels (emits
    /// `FilterApplied`). Returns false for missing or non-image objects.
    fn update_filters(&mut self, id: ObjectId, f: &mut dyn FnMut(&mut FilterSet)) -> bool;

    /// Filtered pixels of an image, as they are drawn.
    fn pixels(&self, id: ObjectId) -> Option<&RgbaImage>;

    /// Unfiltered source pixels of an image.
    fn source_pixels(&self, id: ObjectId) -> Option<&RgbaImage>;

    /// Currently selected object.
    fn active_object(&self) -> Option<ObjectId>;

    /// Select an object (or clear the selection). Returns false for an
    /// unknown id.
    fn set_active_object(&mut self, id: Option<ObjectId>) -> bool;

    /// Serializable description of every object.
    fn to_serializable(&self) -> SceneData;

    /// Replace the entire object set. `pixels` must hold source pixels for
    /// every image in `data`; otherwise nothing changes. Emits `Loaded`.
    fn load_serializable(&mut self, data: SceneData, pixels: HashMap<ObjectId, RgbaImage>) -> Result<()>;

    /// Current viewport.
    fn viewport(&self) -> Viewport;

    /// Replace the viewport (emits `ViewportChanged`).
    fn set_viewport(&mut self, viewport: Viewport);

    /// Current zoom.
    fn zoom(&self) -> f64 {
        self.viewport().zoom
    }

    /// Zoom about the canvas origin.
    fn set_zoom(&mut self, zoom: f64) {
        let viewport = self.viewport().zoom_to_point(zoom, 0.0, 0.0);
        self.set_viewport(viewport);
    }

    /// Ask the rendering surface to redraw (emits `Rendered`).
    fn request_render(&mut self) {
        self.fire(SceneEvent::Rendered);
    }

    /// Broadcast an event to all subscribers.
    fn fire(&mut self, event: SceneEvent);

    /// Start receiving events.
    fn subscribe(&mut self) -> Subscription;

    /// Stop delivering events to a subscription.
    fn unsubscribe(&mut self, id: SubscriptionId) -> bool;
}
