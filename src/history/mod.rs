//! Snapshot-based edit history.
//!
//! The [`HistoryManager`] watches scene events and records whole-scene
//! [`Snapshot`]s onto a bounded [`SnapshotStack`]. Bursty events (wheel, pan
//! and optionally zoom) are coalesced by a debounce; a fallback timer
//! captures periodically so history never drifts far from the live scene.
//! Every capture path goes through the same content dedup.
//!
//! ## Restores
//!
//! Undo and redo only move the stacks and hand back the snapshot to load.
//! Recording stays paused until the caller reports the outcome with
//! [`HistoryManager::finish_restore`] or [`HistoryManager::abort_restore`],
//! so nothing the restore itself emits ends up in history.

mod capture;
mod snapshot;
mod stack;

use std::time::Duration;
use web_time::Instant;

use crate::config::HistoryConfig;
use crate::scene::{SceneEvent, SceneModel, Subscription};

pub use capture::{CaptureScheduler, CaptureTrigger};
pub use snapshot::Snapshot;
pub use stack::SnapshotStack;

/// Which way an in-flight restore moved the stacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreDirection {
    Undo,
    Redo,
}

/// Records scene snapshots and drives undo/redo.
#[derive(Debug)]
pub struct HistoryManager {
    stack: SnapshotStack<Snapshot>,
    last_serialized: Option<Snapshot>,
    /// Set for the whole duration of a restore
    paused: bool,
    pending: Option<RestoreDirection>,
    scheduler: CaptureScheduler,
    coalesce_zoom: bool,
    subscription: Option<Subscription>,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(&HistoryConfig::default())
    }
}

impl HistoryManager {
    pub fn new(config: &HistoryConfig) -> Self {
        Self {
            stack: SnapshotStack::new(config.max_history),
            last_serialized: None,
            paused: false,
            pending: None,
            scheduler: CaptureScheduler::new(
                Duration::from_millis(config.debounce_ms),
                Duration::from_millis(config.fallback_interval_ms),
            ),
            coalesce_zoom: config.coalesce_zoom,
            subscription: None,
        }
    }

    /// Subscribe to `scene`, start the fallback timer and record the
    /// initial state.
    ///
    /// Re-initializing drops any previous history.
    pub fn initialize(&mut self, scene: &mut dyn SceneModel, now: Instant) {
        if let Some(old) = self.subscription.take() {
            scene.unsubscribe(old.id());
        }
        self.subscription = Some(scene.subscribe());
        self.stack.clear();
        self.last_serialized = None;
        self.paused = false;
        self.pending = None;
        self.scheduler.stop();
        self.scheduler.start(now);
        self.capture(scene);
        log::debug!("History initialized");
    }

    /// Consume queued scene events and capture or arm the debounce.
    ///
    /// Events that arrive while paused belong to a restore and are dropped.
    pub fn process_events(&mut self, scene: &dyn SceneModel, now: Instant) {
        let Some(subscription) = &self.subscription else {
            return;
        };
        let events = subscription.drain();
        if events.is_empty() || self.paused {
            return;
        }

        let mut capture_now = false;
        for event in events {
            match event {
                SceneEvent::Wheel | SceneEvent::ViewportChanged => {
                    self.scheduler.schedule_debounce(now);
                }
                SceneEvent::ZoomChanged(_) if self.coalesce_zoom => {
                    self.scheduler.schedule_debounce(now);
                }
                // A redraw during a burst is part of the burst
                SceneEvent::Rendered => {
                    if !self.scheduler.debounce_pending() {
                        capture_now = true;
                    }
                }
                _ => capture_now = true,
            }
        }

        if capture_now {
            self.capture(scene);
        }
    }

    /// Fire due timers. The paused flag is checked here, at fire time.
    pub fn tick(&mut self, scene: &dyn SceneModel, now: Instant) {
        while let Some(trigger) = self.scheduler.poll(now) {
            if self.paused {
                log::trace!("{:?} capture skipped during restore", trigger);
                continue;
            }
            self.capture(scene);
        }
    }

    /// Record the current scene unless paused or unchanged.
    ///
    /// Returns true when a new entry was pushed.
    pub fn capture(&mut self, scene: &dyn SceneModel) -> bool {
        if self.paused {
            return false;
        }

        let snapshot = match Snapshot::capture(scene) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::error!("Failed to serialize scene for history: {}", e);
                return false;
            }
        };
        // Anything a pending debounce would have covered is in this snapshot
        self.scheduler.clear_debounce();

        if self.last_serialized.as_ref() == Some(&snapshot) {
            return false;
        }

        self.stack.push(snapshot.clone());
        self.last_serialized = Some(snapshot);
        log::debug!(
            "History push: {} undo, {} redo",
            self.stack.undo_count(),
            self.stack.redo_count()
        );
        true
    }

    /// Begin an undo: flush a pending burst, move the stacks and pause.
    ///
    /// Returns the snapshot the scene must be restored to, or `None` when
    /// there is nothing to undo or a restore is already in flight.
    pub fn undo(&mut self, scene: &dyn SceneModel) -> Option<Snapshot> {
        if self.pending.is_some() {
            log::debug!("Undo ignored: restore in progress");
            return None;
        }
        if self.scheduler.debounce_pending() {
            self.capture(scene);
        }

        let target = self.stack.undo()?;
        self.begin_restore(RestoreDirection::Undo);
        Some(target)
    }

    /// Begin a redo. Symmetric to [`undo`](Self::undo).
    pub fn redo(&mut self, scene: &dyn SceneModel) -> Option<Snapshot> {
        if self.pending.is_some() {
            log::debug!("Redo ignored: restore in progress");
            return None;
        }
        if self.scheduler.debounce_pending() && self.capture(scene) {
            // The flushed burst was a new edit and invalidated redo
            return None;
        }

        let target = self.stack.redo()?;
        self.begin_restore(RestoreDirection::Redo);
        Some(target)
    }

    fn begin_restore(&mut self, direction: RestoreDirection) {
        self.paused = true;
        self.pending = Some(direction);
        self.scheduler.clear_debounce();
        log::debug!(
            "{:?} started: {} undo, {} redo",
            direction,
            self.stack.undo_count(),
            self.stack.redo_count()
        );
    }

    /// The restore of `snapshot` completed; resume recording.
    pub fn finish_restore(&mut self, snapshot: Snapshot) {
        self.last_serialized = Some(snapshot);
        self.paused = false;
        if let Some(direction) = self.pending.take() {
            log::debug!("{:?} complete", direction);
        }
    }

    /// The restore failed; put the stacks back as they were and resume.
    pub fn abort_restore(&mut self) {
        match self.pending.take() {
            Some(RestoreDirection::Undo) => self.stack.revert_undo(),
            Some(RestoreDirection::Redo) => self.stack.revert_redo(),
            None => {}
        }
        self.paused = false;
        log::warn!("Restore aborted; history left unchanged");
    }

    /// Stop timers and detach from the scene.
    pub fn dispose(&mut self, scene: &mut dyn SceneModel) {
        self.scheduler.stop();
        if let Some(subscription) = self.subscription.take() {
            scene.unsubscribe(subscription.id());
        }
        log::debug!("History disposed");
    }

    pub fn can_undo(&self) -> bool {
        self.pending.is_none() && self.stack.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.pending.is_none() && self.stack.can_redo()
    }

    pub fn undo_count(&self) -> usize {
        self.stack.undo_count()
    }

    pub fn redo_count(&self) -> usize {
        self.stack.redo_count()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Direction of the restore in flight, if any.
    pub fn pending_restore(&self) -> Option<RestoreDirection> {
        self.pending
    }

    pub fn debounce_pending(&self) -> bool {
        self.scheduler.debounce_pending()
    }

    /// The snapshot history considers current.
    /// Image sources any held snapshot refers to.
    pub fn referenced_sources(&self) -> impl Iterator<Item = &str> {
        self.stack
            .iter()
            .chain(self.last_serialized.iter())
            .flat_map(|snapshot| snapshot.sources.iter().map(String::as_str))
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.stack.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Geometry, RectStyle, SceneObject};
    use crate::scene::Scene;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn add_rect(scene: &mut Scene, left: f64) {
        let id = scene.allocate_id();
        let style = RectStyle {
            fill: [0, 0, 0, 0],
            stroke: [255, 0, 0, 255],
            stroke_width: 1.0,
            dashed: false,
        };
        scene.add_object(
            SceneObject::rect(id, "r", Geometry::new(left, 0.0, 10.0, 10.0), style),
            None,
        );
    }

    fn setup() -> (Scene, HistoryManager, Instant) {
        let mut scene = Scene::new(800.0, 500.0);
        let mut history = HistoryManager::default();
        let t0 = Instant::now();
        history.initialize(&mut scene, t0);
        (scene, history, t0)
    }

    /// Load a snapshot back into the scene the way the editor does.
    fn restore(scene: &mut Scene, history: &mut HistoryManager, snapshot: Snapshot) {
        let data = snapshot.decode().unwrap();
        scene
            .load_serializable(data, std::collections::HashMap::new())
            .unwrap();
        snapshot.apply_viewport(scene);
        history.process_events(scene, Instant::now());
        history.finish_restore(snapshot);
    }

    #[test]
    fn test_initial_capture() {
        let (_, history, _) = setup();
        assert_eq!(history.undo_count(), 1);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_each_edit_is_one_entry() {
        let (mut scene, mut history, t0) = setup();
        for i in 0..4 {
            add_rect(&mut scene, i as f64 * 20.0);
            history.process_events(&scene, t0);
        }
        assert_eq!(history.undo_count(), 5);
        assert_eq!(history.redo_count(), 0);
    }

    #[test]
    fn test_capture_twice_is_deduplicated() {
        let (mut scene, mut history, _) = setup();
        add_rect(&mut scene, 0.0);
        assert!(history.capture(&scene));
        assert!(!history.capture(&scene));
        assert_eq!(history.undo_count(), 2);
    }

    #[test]
    fn test_undo_then_redo_restores_identical_content() {
        let (mut scene, mut history, t0) = setup();
        for i in 0..3 {
            add_rect(&mut scene, i as f64 * 20.0);
            history.process_events(&scene, t0);
        }
        let before = scene.to_serializable();

        for _ in 0..2 {
            let snapshot = history.undo(&scene).unwrap();
            restore(&mut scene, &mut history, snapshot);
        }
        assert_eq!(scene.objects().len(), 1);
        assert_eq!(history.redo_count(), 2);

        for _ in 0..2 {
            let snapshot = history.redo(&scene).unwrap();
            restore(&mut scene, &mut history, snapshot);
        }
        assert_eq!(scene.to_serializable(), before);
        assert_eq!(history.undo_count(), 4);
        assert_eq!(history.redo_count(), 0);
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let (mut scene, mut history, t0) = setup();
        add_rect(&mut scene, 0.0);
        history.process_events(&scene, t0);
        let snapshot = history.undo(&scene).unwrap();
        restore(&mut scene, &mut history, snapshot);
        assert!(history.can_redo());

        add_rect(&mut scene, 50.0);
        history.process_events(&scene, t0);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_restore_events_are_not_recorded() {
        let (mut scene, mut history, t0) = setup();
        add_rect(&mut scene, 0.0);
        history.process_events(&scene, t0);

        let snapshot = history.undo(&scene).unwrap();
        restore(&mut scene, &mut history, snapshot);
        assert_eq!(history.undo_count(), 1);
        assert_eq!(history.redo_count(), 1);

        // The fallback sees the restored state and finds nothing new
        history.tick(&scene, t0 + ms(5000));
        assert_eq!(history.undo_count(), 1);
    }

    #[test]
    fn test_fallback_records_unprocessed_drift() {
        let (mut scene, mut history, t0) = setup();
        add_rect(&mut scene, 0.0);

        history.tick(&scene, t0 + ms(1999));
        assert_eq!(history.undo_count(), 1);
        history.tick(&scene, t0 + ms(2000));
        assert_eq!(history.undo_count(), 2);
    }

    #[test]
    fn test_fallback_records_edit_dropped_during_restore() {
        let (mut scene, mut history, t0) = setup();
        add_rect(&mut scene, 0.0);
        history.process_events(&scene, t0);

        let snapshot = history.undo(&scene).unwrap();
        scene
            .load_serializable(snapshot.decode().unwrap(), std::collections::HashMap::new())
            .unwrap();
        // An edit lands while the restore is still in flight and is dropped
        add_rect(&mut scene, 40.0);
        history.process_events(&scene, t0);
        history.finish_restore(snapshot);
        assert!(!history.debounce_pending());
        assert_eq!(history.undo_count(), 1);

        history.tick(&scene, t0 + ms(2000));
        assert_eq!(history.undo_count(), 2);
        assert!(!history.can_redo());
        assert_eq!(
            history.current().unwrap().decode().unwrap().objects.len(),
            1
        );
    }

    #[test]
    fn test_debounce_coalesces_a_burst() {
        let (mut scene, mut history, t0) = setup();
        for i in 1..=5 {
            scene.set_zoom(1.0 + i as f64 * 0.1);
            scene.fire(SceneEvent::Wheel);
            scene.request_render();
            history.process_events(&scene, t0 + ms(i * 50));
        }
        assert_eq!(history.undo_count(), 1);
        assert!(history.debounce_pending());

        history.tick(&scene, t0 + ms(300));
        assert_eq!(history.undo_count(), 1);
        history.tick(&scene, t0 + ms(600));
        assert_eq!(history.undo_count(), 2);
    }

    #[test]
    fn test_debounce_firing_during_restore_is_ignored() {
        let (mut scene, mut history, t0) = setup();
        add_rect(&mut scene, 0.0);
        history.process_events(&scene, t0);

        let snapshot = history.undo(&scene).unwrap();
        // Viewport churn while the restore is in flight
        scene.set_zoom(2.0);
        history.process_events(&scene, t0);
        history.tick(&scene, t0 + ms(10_000));
        assert!(history.is_paused());
        assert_eq!(history.undo_count(), 1);

        restore(&mut scene, &mut history, snapshot);
        assert!(!history.is_paused());
        assert_eq!(history.undo_count(), 1);
        assert_eq!(history.redo_count(), 1);
    }

    #[test]
    fn test_undo_flushes_pending_burst() {
        let (mut scene, mut history, t0) = setup();
        scene.set_zoom(2.0);
        history.process_events(&scene, t0);
        assert_eq!(history.undo_count(), 1);

        let snapshot = history.undo(&scene).unwrap();
        assert_eq!(snapshot.zoom, 1.0);
        assert_eq!(history.redo_count(), 1);
    }

    #[test]
    fn test_abort_rolls_back_stacks() {
        let (mut scene, mut history, t0) = setup();
        add_rect(&mut scene, 0.0);
        history.process_events(&scene, t0);
        add_rect(&mut scene, 20.0);
        history.process_events(&scene, t0);

        history.undo(&scene).unwrap();
        assert!(history.undo(&scene).is_none());
        history.abort_restore();
        assert_eq!((history.undo_count(), history.redo_count()), (3, 0));
        assert!(!history.is_paused());

        let snapshot = history.undo(&scene).unwrap();
        restore(&mut scene, &mut history, snapshot);
        history.redo(&scene).unwrap();
        history.abort_restore();
        assert_eq!((history.undo_count(), history.redo_count()), (2, 1));
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut scene = Scene::new(800.0, 500.0);
        let config = HistoryConfig {
            max_history: 3,
            ..HistoryConfig::default()
        };
        let mut history = HistoryManager::new(&config);
        let t0 = Instant::now();
        history.initialize(&mut scene, t0);
        for i in 0..5 {
            add_rect(&mut scene, i as f64);
            history.process_events(&scene, t0);
        }
        assert_eq!(history.undo_count(), 3);
    }

    #[test]
    fn test_dispose_detaches() {
        let (mut scene, mut history, t0) = setup();
        assert_eq!(scene.subscriber_count(), 1);
        history.dispose(&mut scene);
        assert_eq!(scene.subscriber_count(), 0);
        add_rect(&mut scene, 0.0);
        history.process_events(&scene, t0);
        history.tick(&scene, t0 + ms(10_000));
        assert_eq!(history.undo_count(), 1);
    }
}
