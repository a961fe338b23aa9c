//! Editor context.
//!
//! [`Editor`] owns the scene, history, crop engine, frame manager and image
//! loader, and is the single entry point for user operations. Nothing is
//! global: a host creates one editor per canvas.
//!
//! ## Asynchronous work
//!
//! Image loads, crop replacement and history restores are queued as jobs and
//! complete when the host calls [`Editor::pump`]. Timers (debounce and the
//! fallback capture) advance on [`Editor::tick`]. Between those calls the
//! scene is only changed by the synchronous operations.

use std::collections::{HashMap, HashSet, VecDeque};

use image::RgbaImage;
use web_time::Instant;

use crate::config::EditorConfig;
use crate::crop::{CropEngine, CropRequest};
use crate::error::{EditorError, Result};
use crate::filters::{self, FilterOutcome};
use crate::frame::{FrameExport, FrameManager};
use crate::history::{HistoryManager, Snapshot};
use crate::keybindings::{KeyBindings, KeyPress, ShortcutAction};
use crate::loader::{BlobStore, ImageLoader};
use crate::model::{FilterKind, Geometry, ObjectId, SceneObject};
use crate::scene::{Scene, SceneModel};
use crate::transform::{self, RotateDirection};

/// Deferred work completed by [`Editor::pump`].
#[derive(Debug)]
enum Job {
    LoadImage { src: String },
    ReplaceImage(CropRequest),
    Restore(Snapshot),
}

/// Image editor with undo/redo.
pub struct Editor<S = Scene, L = BlobStore> {
    scene: S,
    loader: L,
    history: HistoryManager,
    crop: CropEngine,
    frames: FrameManager,
    keybindings: KeyBindings,
    jobs: VecDeque<Job>,
    /// Sources this editor stored in the loader (crop results)
    owned_blobs: HashSet<String>,
    disposed: bool,
}

impl Editor {
    /// Create an editor with an empty in-memory scene and blob store.
    pub fn new(config: &EditorConfig) -> Self {
        let scene = Scene::new(config.canvas.width, config.canvas.height);
        Self::with_parts(scene, BlobStore::new(), config)
    }
}

impl<S: SceneModel, L: ImageLoader> Editor<S, L> {
    /// Create an editor around an existing scene and loader. History starts
    /// from the scene's current contents.
    pub fn with_parts(mut scene: S, loader: L, config: &EditorConfig) -> Self {
        let mut frames = FrameManager::new();
        frames.attach(&mut scene);
        let mut history = HistoryManager::new(&config.history);
        history.initialize(&mut scene, Instant::now());

        Self {
            scene,
            loader,
            history,
            crop: CropEngine::new(),
            frames,
            keybindings: config.keybindings,
            jobs: VecDeque::new(),
            owned_blobs: HashSet::new(),
            disposed: false,
        }
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn loader_mut(&mut self) -> &mut L {
        &mut self.loader
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn crop(&self) -> &CropEngine {
        &self.crop
    }

    /// Feed queued scene events to frames, then history.
    fn sync(&mut self, now: Instant) {
        if self.disposed {
            return;
        }
        self.frames.handle_events(&mut self.scene);
        self.history.process_events(&self.scene, now);
        self.release_unused_blobs();
    }

    /// Revoke stored crop results that neither the scene nor any history
    /// entry refers to anymore.
    fn release_unused_blobs(&mut self) {
        if self.owned_blobs.is_empty() {
            return;
        }
        let mut referenced: HashSet<&str> = self.history.referenced_sources().collect();
        referenced.extend(self.scene.objects().iter().filter_map(SceneObject::src));

        let unused: Vec<String> = self
            .owned_blobs
            .iter()
            .filter(|src| !referenced.contains(src.as_str()))
            .cloned()
            .collect();
        for src in unused {
            self.owned_blobs.remove(&src);
            if self.loader.revoke(&src) {
                log::debug!("Released {}", src);
            }
        }
    }

    fn after_edit(&mut self) {
        self.sync(Instant::now());
    }

    // === Images ===

    /// Queue loading `src`. On completion the image is centred, added and
    /// made active.
    pub fn load_image(&mut self, src: impl Into<String>) {
        let src = src.into();
        log::debug!("Queued load of {}", src);
        self.jobs.push_back(Job::LoadImage { src });
    }

    /// Remove the active object if it is the image loaded from `src`.
    pub fn remove_image(&mut self, src: &str) -> bool {
        let Some(id) = self
            .scene
            .active_object()
            .filter(|id| self.scene.object(*id).and_then(SceneObject::src) == Some(src))
        else {
            return false;
        };
        self.scene.remove_object(id);
        self.scene.request_render();
        self.after_edit();
        true
    }

    /// Select an object, or clear the selection.
    pub fn set_active(&mut self, id: Option<ObjectId>) -> bool {
        self.scene.set_active_object(id)
    }

    /// Filtered pixels of an image encoded as PNG.
    pub fn export_image(&self, id: ObjectId) -> Result<Vec<u8>> {
        let pixels = self
            .scene
            .pixels(id)
            .ok_or(EditorError::MissingPixels { id })?;
        Ok(retouch_raster::encode_png(pixels)?)
    }

    // === Transform ===

    pub fn zoom(&self) -> f64 {
        self.scene.zoom()
    }

    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        let zoom = transform::apply_zoom(&mut self.scene, zoom);
        self.after_edit();
        zoom
    }

    pub fn zoom_in(&mut self) -> f64 {
        let zoom = transform::zoom_in(&mut self.scene);
        self.after_edit();
        zoom
    }

    pub fn zoom_out(&mut self) -> f64 {
        let zoom = transform::zoom_out(&mut self.scene);
        self.after_edit();
        zoom
    }

    /// Wheel zoom about the pointer at `(x, y)`.
    pub fn wheel_zoom(&mut self, delta_y: f64, x: f64, y: f64) -> f64 {
        let zoom = transform::wheel_zoom(&mut self.scene, delta_y, x, y);
        self.after_edit();
        zoom
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        transform::pan_by(&mut self.scene, dx, dy);
        self.after_edit();
    }

    pub fn rotate_left(&mut self) -> bool {
        self.rotate(RotateDirection::Left)
    }

    pub fn rotate_right(&mut self) -> bool {
        self.rotate(RotateDirection::Right)
    }

    fn rotate(&mut self, direction: RotateDirection) -> bool {
        let target = self.scene.active_object();
        let rotated = transform::apply_rotate(&mut self.scene, target, direction);
        self.after_edit();
        rotated
    }

    /// Live resize of an object (as a drag handle would do).
    pub fn scale_object(&mut self, id: ObjectId, scale_x: f64, scale_y: f64) -> bool {
        let scaled = self.scene.scale_object(id, scale_x, scale_y);
        self.after_edit();
        scaled
    }

    // === Filters ===

    /// Apply a filter to the active object from a raw slider value.
    pub fn apply_filter(&mut self, kind: FilterKind, raw: f64) -> FilterOutcome {
        let target = self.scene.active_object();
        let outcome = filters::apply_filter(&mut self.scene, target, kind, raw);
        self.after_edit();
        outcome
    }

    // === Crop ===

    pub fn start_crop_mode(&mut self) -> Option<ObjectId> {
        let rect = self.crop.start(&mut self.scene);
        self.after_edit();
        rect
    }

    pub fn stop_crop_mode(&mut self) -> bool {
        let stopped = self.crop.stop(&mut self.scene);
        self.after_edit();
        stopped
    }

    /// Move or resize the crop selection.
    pub fn set_crop_bounds(&mut self, left: f64, top: f64, width: f64, height: f64) -> bool {
        let moved = self.crop.set_bounds(&mut self.scene, left, top, width, height);
        self.after_edit();
        moved
    }

    /// Cut the selection out of the target image. The image is replaced
    /// once the job completes.
    pub fn apply_crop(&mut self) -> bool {
        let request = self.crop.apply(&mut self.scene);
        self.after_edit();
        match request {
            Some(request) => {
                self.jobs.push_back(Job::ReplaceImage(request));
                true
            }
            None => false,
        }
    }

    // === Frames ===

    pub fn add_frame(&mut self) -> Option<ObjectId> {
        let id = self.frames.add_frame(&mut self.scene);
        self.after_edit();
        id
    }

    pub fn frames(&self) -> Vec<&SceneObject> {
        self.frames.frames(&self.scene)
    }

    pub fn select_frame(&mut self, name: &str) -> bool {
        self.frames.select_frame(&mut self.scene, name)
    }

    pub fn export_frame(&self, name: &str) -> Option<FrameExport> {
        self.frames.export_frame(&self.scene, name)
    }

    // === History ===

    /// Complete queued loads and crops so their results are recorded before
    /// a restore replaces the scene.
    fn settle_jobs(&mut self) {
        let completed = self.pump();
        if completed > 0 {
            log::debug!("Completed {} queued jobs before restore", completed);
        }
    }

    /// Queue a restore of the previous state. Jobs queued earlier are
    /// completed first.
    pub fn undo(&mut self) -> bool {
        self.settle_jobs();
        self.after_edit();
        match self.history.undo(&self.scene) {
            Some(snapshot) => {
                self.jobs.push_back(Job::Restore(snapshot));
                true
            }
            None => false,
        }
    }

    /// Queue a restore of the next state. Jobs queued earlier are completed
    /// first.
    pub fn redo(&mut self) -> bool {
        self.settle_jobs();
        self.after_edit();
        match self.history.redo(&self.scene) {
            Some(snapshot) => {
                self.jobs.push_back(Job::Restore(snapshot));
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Route a keyboard shortcut. Returns true if it triggered anything.
    pub fn handle_key(&mut self, press: KeyPress) -> bool {
        match self.keybindings.action_for(&press) {
            Some(ShortcutAction::Undo) => self.undo(),
            Some(ShortcutAction::Redo) => self.redo(),
            None => false,
        }
    }

    // === Scheduling ===

    /// Advance timers to `now`.
    pub fn tick(&mut self, now: Instant) {
        if self.disposed {
            return;
        }
        self.sync(now);
        self.history.tick(&self.scene, now);
    }

    /// Number of queued jobs.
    pub fn pending_jobs(&self) -> usize {
        self.jobs.len()
    }

    /// Complete the oldest queued job. Returns false if there was none.
    pub fn pump_one(&mut self) -> bool {
        let Some(job) = self.jobs.pop_front() else {
            return false;
        };
        match job {
            Job::LoadImage { src } => self.complete_load(src),
            Job::ReplaceImage(request) => self.complete_crop(request),
            Job::Restore(snapshot) => self.complete_restore(snapshot),
        }
        true
    }

    /// Complete every queued job in order. Returns how many ran.
    pub fn pump(&mut self) -> usize {
        let mut completed = 0;
        while self.pump_one() {
            completed += 1;
        }
        completed
    }

    /// Stop timers, detach listeners and drop queued jobs.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.history.dispose(&mut self.scene);
        self.frames.detach(&mut self.scene);
        if !self.jobs.is_empty() {
            log::debug!("Discarding {} queued jobs", self.jobs.len());
        }
        self.jobs.clear();
        self.disposed = true;
    }

    fn add_loaded_image(&mut self, src: String, pixels: RgbaImage, left: f64, top: f64) {
        let (width, height) = (f64::from(pixels.width()), f64::from(pixels.height()));
        let id = self.scene.allocate_id();
        let object = SceneObject::image(id, src, Geometry::new(left, top, width, height));
        if self.scene.add_object(object, Some(pixels)) {
            self.scene.set_active_object(Some(id));
            self.scene.request_render();
        }
        self.after_edit();
    }

    fn complete_load(&mut self, src: String) {
        let pixels = match self.loader.load(&src) {
            Ok(pixels) => pixels,
            Err(e) => {
                log::warn!("Failed to load image {}: {}", src, e);
                return;
            }
        };
        let (canvas_w, canvas_h) = self.scene.canvas_size();
        let left = (canvas_w - f64::from(pixels.width())) / 2.0;
        let top = (canvas_h - f64::from(pixels.height())) / 2.0;
        log::info!("Loaded {} ({}x{})", src, pixels.width(), pixels.height());
        self.add_loaded_image(src, pixels, left, top);
    }

    fn complete_crop(&mut self, request: CropRequest) {
        let png = match retouch_raster::encode_png(&request.pixels) {
            Ok(png) => png,
            Err(e) => {
                log::error!("Failed to encode crop: {}", e);
                return;
            }
        };
        let src = self.loader.store(png);
        self.owned_blobs.insert(src.clone());
        let pixels = match self.loader.load(&src) {
            Ok(pixels) => pixels,
            Err(e) => {
                log::error!("Failed to reload crop {}: {}", src, e);
                return;
            }
        };

        if self.scene.remove_object(request.original).is_none() {
            log::warn!(
                "Crop result dropped: image {} no longer exists",
                request.original
            );
            return;
        }
        log::debug!("Replacing image {} with {}", request.original, src);
        self.add_loaded_image(src, pixels, request.left, request.top);
    }

    fn complete_restore(&mut self, snapshot: Snapshot) {
        match self.restore(&snapshot) {
            Ok(()) => {
                self.crop.reconcile(&self.scene);
                // Drains restore events while history is still paused
                self.sync(Instant::now());
                self.history.finish_restore(snapshot);
            }
            Err(e) => {
                log::error!("Restore failed: {}", e);
                self.history.abort_restore();
            }
        }
    }

    /// Load `snapshot` into the scene. Pixels of images still in the scene
    /// are reused; everything else goes through the loader.
    fn restore(&mut self, snapshot: &Snapshot) -> Result<()> {
        let data = snapshot.decode()?;

        let mut pixels = HashMap::new();
        for object in &data.objects {
            let Some(src) = object.src() else {
                continue;
            };
            let live = self
                .scene
                .object(object.id)
                .filter(|live| live.src() == Some(src))
                .and_then(|_| self.scene.source_pixels(object.id))
                .cloned();
            let bitmap = match live {
                Some(bitmap) => bitmap,
                None => self.loader.load(src)?,
            };
            pixels.insert(object.id, bitmap);
        }

        self.scene.load_serializable(data, pixels)?;
        snapshot.apply_viewport(&mut self.scene);
        self.scene.request_render();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HistoryConfig;
    use crate::keybindings::KeyCode;
    use crate::model::{FilterChange, ObjectKind};
    use image::Rgba;
    use std::time::Duration;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| Rgba([x as u8, y as u8, 40, 255]))
    }

    /// Editor with one loaded 100x100 image.
    fn editor_with_image(config: &EditorConfig) -> (Editor, ObjectId) {
        let mut editor = Editor::new(config);
        let src = editor.loader_mut().insert_image(&gradient(100, 100)).unwrap();
        editor.load_image(src);
        assert_eq!(editor.pump(), 1);
        let id = editor.scene().active_object().unwrap();
        (editor, id)
    }

    fn images(editor: &Editor) -> Vec<&SceneObject> {
        editor.scene().objects_of_kind(ObjectKind::Image)
    }

    #[test]
    fn test_load_centres_and_activates() {
        let (editor, id) = editor_with_image(&EditorConfig::default());
        let object = editor.scene().object(id).unwrap();
        assert_eq!(object.geometry, Geometry::new(350.0, 200.0, 100.0, 100.0));
        assert_eq!(editor.history().undo_count(), 2);
    }

    #[test]
    fn test_failed_load_adds_nothing() {
        let mut editor = Editor::new(&EditorConfig::default());
        editor.load_image("blob:missing");
        editor.pump();
        assert!(editor.scene().objects().is_empty());
        assert_eq!(editor.history().undo_count(), 1);
    }

    #[test]
    fn test_remove_image_requires_active_match() {
        let (mut editor, id) = editor_with_image(&EditorConfig::default());
        let src = editor.scene().object(id).unwrap().src().unwrap().to_string();
        assert!(!editor.remove_image("blob:other"));
        assert!(editor.remove_image(&src));
        assert!(images(&editor).is_empty());
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let (mut editor, id) = editor_with_image(&EditorConfig::default());
        editor.rotate_left();
        editor.apply_filter(FilterKind::Brightness, 30.0);
        editor.add_frame();
        assert_eq!(editor.history().undo_count(), 5);
        assert_eq!(editor.history().redo_count(), 0);
        let before = editor.scene().to_serializable();

        for _ in 0..3 {
            assert!(editor.undo());
            editor.pump();
        }
        assert_eq!(editor.scene().object(id).unwrap().geometry.angle, 0.0);
        assert!(editor.frames().is_empty());

        for _ in 0..3 {
            assert!(editor.redo());
            editor.pump();
        }
        assert_eq!(editor.scene().to_serializable(), before);
        assert_eq!(editor.frames().len(), 1);
        assert!(!editor.can_redo());
        // Restored filters are re-rendered
        assert_ne!(editor.scene().pixels(id), editor.scene().source_pixels(id));
    }

    #[test]
    fn test_undo_completes_queued_load_first() {
        let (mut editor, first) = editor_with_image(&EditorConfig::default());
        editor.rotate_left();
        let second = editor.loader_mut().insert_image(&gradient(20, 20)).unwrap();
        editor.load_image(second);

        assert!(editor.undo());
        editor.pump();
        assert_eq!(images(&editor).len(), 1);
        assert_ne!(editor.scene().object(first).unwrap().geometry.angle, 0.0);
        assert_eq!(editor.history().redo_count(), 1);

        assert!(editor.redo());
        editor.pump();
        assert_eq!(images(&editor).len(), 2);
    }

    #[test]
    fn test_consecutive_undos_without_pump() {
        let (mut editor, id) = editor_with_image(&EditorConfig::default());
        editor.rotate_left();
        editor.rotate_left();

        assert!(editor.undo());
        assert!(editor.undo());
        editor.pump();
        assert_eq!(editor.scene().object(id).unwrap().geometry.angle, 0.0);
        assert_eq!(editor.history().redo_count(), 2);
    }

    #[test]
    fn test_huge_averaging_kernel() {
        let (mut editor, id) = editor_with_image(&EditorConfig::default());
        assert_eq!(
            editor.apply_filter(FilterKind::Averaging, 70_001.0),
            FilterOutcome::Applied(FilterChange::Inserted)
        );
        assert_eq!(
            editor.apply_filter(FilterKind::Averaging, 1e9),
            FilterOutcome::Applied(FilterChange::Updated)
        );
        assert_eq!(editor.scene().pixels(id).unwrap().dimensions(), (100, 100));
    }

    #[test]
    fn test_new_edit_after_undo_clears_redo() {
        let (mut editor, _) = editor_with_image(&EditorConfig::default());
        editor.rotate_right();
        editor.undo();
        editor.pump();
        assert!(editor.can_redo());

        editor.apply_filter(FilterKind::Gamma, 2.0);
        assert!(!editor.can_redo());
    }

    #[test]
    fn test_debounced_zoom_is_one_entry() {
        let (mut editor, _) = editor_with_image(&EditorConfig::default());
        for _ in 0..5 {
            editor.zoom_in();
        }
        assert!(approx_eq(editor.zoom(), 1.5));
        assert_eq!(editor.history().undo_count(), 2);

        editor.tick(Instant::now() + Duration::from_secs(1));
        assert_eq!(editor.history().undo_count(), 3);

        editor.undo();
        editor.pump();
        assert!(approx_eq(editor.zoom(), 1.0));
    }

    #[test]
    fn test_undo_mid_burst_reverts_whole_burst() {
        let (mut editor, _) = editor_with_image(&EditorConfig::default());
        for _ in 0..5 {
            editor.zoom_in();
        }
        editor.undo();
        editor.pump();
        assert!(approx_eq(editor.zoom(), 1.0));
        assert_eq!(editor.history().redo_count(), 1);
    }

    #[test]
    fn test_undebounced_zoom_reverts_one_step() {
        let config = EditorConfig {
            history: HistoryConfig {
                coalesce_zoom: false,
                ..HistoryConfig::default()
            },
            ..EditorConfig::default()
        };
        let (mut editor, _) = editor_with_image(&config);
        for _ in 0..5 {
            editor.zoom_in();
        }
        assert_eq!(editor.history().undo_count(), 7);

        editor.undo();
        editor.pump();
        assert!((editor.zoom() - 1.4).abs() < 1e-6);
    }

    #[test]
    fn test_zoom_clamps_at_max() {
        let (mut editor, _) = editor_with_image(&EditorConfig::default());
        for _ in 0..40 {
            editor.zoom_in();
        }
        assert!(approx_eq(editor.zoom(), crate::constants::MAX_ZOOM));
    }

    #[test]
    fn test_crop_replaces_image_on_completion() {
        let (mut editor, original) = editor_with_image(&EditorConfig::default());
        editor.apply_filter(FilterKind::Brightness, 10.0);
        editor.start_crop_mode();
        editor.set_crop_bounds(360.0, 210.0, 40.0, 30.0);
        assert!(editor.apply_crop());

        // Original stays until the job completes
        assert!(editor.scene().object(original).is_some());
        editor.pump();

        let images = images(&editor);
        assert_eq!(images.len(), 1);
        let cropped = images[0];
        assert_ne!(cropped.id, original);
        assert_eq!(cropped.geometry, Geometry::new(360.0, 210.0, 40.0, 30.0));
        assert!(cropped.filters().unwrap().is_empty());
        assert_eq!(editor.scene().active_object(), Some(cropped.id));

        // Brightness baked in: source (10, 10) was 10 + 25.5
        let pixels = editor.scene().pixels(cropped.id).unwrap();
        assert_eq!(pixels.dimensions(), (40, 30));
        assert_eq!(pixels.get_pixel(0, 0).0[0], 36);
    }

    #[test]
    fn test_undo_crop_brings_original_back() {
        let (mut editor, original) = editor_with_image(&EditorConfig::default());
        editor.start_crop_mode();
        editor.set_crop_bounds(360.0, 210.0, 40.0, 30.0);
        editor.apply_crop();
        editor.pump();

        editor.undo();
        editor.pump();
        let images = images(&editor);
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].id, original);
        assert!(!editor.crop().is_selecting());
        assert_eq!(
            editor.scene().pixels(original).unwrap().dimensions(),
            (100, 100)
        );
    }

    #[test]
    fn test_unreferenced_crop_blobs_are_released() {
        let config = EditorConfig {
            history: HistoryConfig {
                max_history: 3,
                ..HistoryConfig::default()
            },
            ..EditorConfig::default()
        };
        let (mut editor, _) = editor_with_image(&config);
        editor.start_crop_mode();
        editor.set_crop_bounds(350.0, 200.0, 50.0, 50.0);
        editor.apply_crop();
        editor.pump();
        let first_crop = images(&editor)[0].src().unwrap().to_string();
        assert_eq!(editor.loader().len(), 2);

        editor.start_crop_mode();
        editor.set_crop_bounds(350.0, 200.0, 20.0, 20.0);
        editor.apply_crop();
        editor.pump();
        // Still reachable through undo
        assert!(editor.loader().bytes(&first_crop).is_some());

        for _ in 0..3 {
            editor.rotate_left();
        }
        assert!(editor.loader().bytes(&first_crop).is_none());
        // The user's own image is never released
        assert_eq!(editor.loader().len(), 2);

        assert!(editor.undo());
        editor.pump();
        assert_eq!(images(&editor).len(), 1);
    }

    #[test]
    fn test_dropped_crop_result_is_released() {
        let (mut editor, original) = editor_with_image(&EditorConfig::default());
        editor.start_crop_mode();
        editor.apply_crop();
        editor.set_active(Some(original));
        let src = editor.scene().object(original).unwrap().src().unwrap().to_string();
        editor.remove_image(&src);
        editor.pump();
        editor.rotate_left();
        // Only the user's image remains
        assert_eq!(editor.loader().len(), 1);
    }

    #[test]
    fn test_crop_of_vanished_image_is_dropped() {
        let (mut editor, original) = editor_with_image(&EditorConfig::default());
        editor.start_crop_mode();
        editor.apply_crop();

        editor.set_active(Some(original));
        let src = editor.scene().object(original).unwrap().src().unwrap().to_string();
        editor.remove_image(&src);
        editor.pump();
        assert!(images(&editor).is_empty());
    }

    #[test]
    fn test_second_crop_completion_is_dropped() {
        let (mut editor, _) = editor_with_image(&EditorConfig::default());
        editor.start_crop_mode();
        editor.set_crop_bounds(350.0, 200.0, 50.0, 50.0);
        editor.apply_crop();
        editor.start_crop_mode();
        editor.set_crop_bounds(350.0, 200.0, 20.0, 20.0);
        editor.apply_crop();
        assert_eq!(editor.pending_jobs(), 2);

        editor.pump();
        let images = images(&editor);
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].geometry.width, 50.0);
    }

    #[test]
    fn test_failed_restore_leaves_stacks_and_scene() {
        let (mut editor, id) = editor_with_image(&EditorConfig::default());
        let src = editor.scene().object(id).unwrap().src().unwrap().to_string();
        editor.remove_image(&src);
        editor.loader_mut().revoke(&src);
        let before = editor.scene().to_serializable();
        let counts = (editor.history().undo_count(), editor.history().redo_count());

        assert!(editor.undo());
        editor.pump();
        assert_eq!(editor.scene().to_serializable(), before);
        assert_eq!(
            (editor.history().undo_count(), editor.history().redo_count()),
            counts
        );
        assert!(!editor.history().is_paused());
        assert!(editor.can_undo());
    }

    #[test]
    fn test_frame_resize_is_normalized() {
        let mut editor = Editor::new(&EditorConfig::default());
        let frame = editor.add_frame().unwrap();
        let entries = editor.history().undo_count();

        editor.scale_object(frame, 1.5, 2.0);
        let geometry = editor.scene().object(frame).unwrap().geometry;
        assert_eq!((geometry.scale_x, geometry.scale_y), (1.0, 1.0));
        assert!(approx_eq(geometry.width, 300.0));
        assert!(approx_eq(geometry.height, 300.0));
        assert_eq!(editor.history().undo_count(), entries + 1);
    }

    #[test]
    fn test_filter_on_frame_is_ignored() {
        let mut editor = Editor::new(&EditorConfig::default());
        editor.add_frame();
        assert!(editor.select_frame("Frame 1"));
        assert_eq!(
            editor.apply_filter(FilterKind::Noise, 200.0),
            FilterOutcome::NotApplicable
        );
        assert_eq!(editor.history().undo_count(), 2);
    }

    #[test]
    fn test_neutral_filter_adds_no_entry() {
        let (mut editor, _) = editor_with_image(&EditorConfig::default());
        assert_eq!(
            editor.apply_filter(FilterKind::Contrast, 0.0),
            FilterOutcome::Applied(FilterChange::Unchanged)
        );
        assert_eq!(editor.history().undo_count(), 2);
    }

    #[test]
    fn test_keyboard_shortcuts() {
        let (mut editor, _) = editor_with_image(&EditorConfig::default());
        editor.rotate_left();

        assert!(!editor.handle_key(KeyPress::ctrl(KeyCode::Z).in_text_input()));
        assert!(editor.handle_key(KeyPress::ctrl(KeyCode::Z)));
        editor.pump();
        assert!(editor.handle_key(KeyPress::ctrl(KeyCode::Z).with_shift()));
        editor.pump();
        assert!(!editor.can_redo());
    }

    #[test]
    fn test_export_image_and_frame() {
        let (mut editor, id) = editor_with_image(&EditorConfig::default());
        let png = editor.export_image(id).unwrap();
        assert_eq!(retouch_raster::decode(&png).unwrap(), gradient(100, 100));
        assert!(editor.export_image(999).is_err());

        editor.add_frame();
        let export = editor.export_frame("Frame 1").unwrap();
        assert_eq!(export.file_name, "Frame 1.png");
    }

    #[test]
    fn test_dispose_stops_everything() {
        let (mut editor, _) = editor_with_image(&EditorConfig::default());
        editor.load_image("blob:1");
        editor.dispose();
        assert_eq!(editor.pending_jobs(), 0);
        assert_eq!(editor.scene().subscriber_count(), 0);

        let entries = editor.history().undo_count();
        editor.rotate_left();
        editor.tick(Instant::now() + Duration::from_secs(10));
        assert_eq!(editor.history().undo_count(), entries);
    }
}
