//! Self-contained history entries.

use crate::error::Result;
use crate::scene::{SceneData, SceneModel};
use crate::viewport::Viewport;

/// Serialized scene plus the viewport it was captured under.
///
/// Holds no live references: everything needed for a restore is in the
/// JSON string and the transform.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Scene JSON as produced by [`SceneData::to_json`]
    pub scene: String,
    /// Viewport matrix `[a, b, c, d, e, f]`, preferred over `zoom` on restore
    pub viewport_transform: Option<[f64; 6]>,
    /// Zoom at capture time
    pub zoom: f64,
    /// Image sources the scene refers to
    pub sources: Vec<String>,
}

impl Snapshot {
    /// Serialize the current state of `scene`.
    pub fn capture(scene: &dyn SceneModel) -> Result<Self> {
        let viewport = scene.viewport();
        let data = scene.to_serializable();
        let sources = data
            .objects
            .iter()
            .filter_map(|object| object.src().map(str::to_string))
            .collect();
        Ok(Self {
            scene: data.to_json()?,
            viewport_transform: Some(viewport.to_matrix()),
            zoom: viewport.zoom,
            sources,
        })
    }

    /// Parse the scene JSON back into objects.
    pub fn decode(&self) -> Result<SceneData> {
        SceneData::from_json(&self.scene)
    }

    /// Re-apply the captured viewport. The matrix is preferred; without a
    /// usable one only the zoom is restored.
    pub fn apply_viewport(&self, scene: &mut dyn SceneModel) {
        match self.viewport_transform.and_then(Viewport::from_matrix) {
            Some(viewport) => scene.set_viewport(viewport),
            None => scene.set_zoom(self.zoom),
        }
    }
}
