//! Serialized scene format.

use serde::{Deserialize, Serialize};

use crate::error::{EditorError, Result};
use crate::model::SceneObject;

/// Current scene format version.
/// Increment this when making breaking changes to the serialized layout.
pub const SCENE_FORMAT_VERSION: u32 = 1;

/// Serialized object set. Viewport state is kept alongside, not inside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneData {
    pub version: u32,
    pub objects: Vec<SceneObject>,
}

impl SceneData {
    /// Wrap an object list in the current format version.
    pub fn new(objects: Vec<SceneObject>) -> Self {
        Self {
            version: SCENE_FORMAT_VERSION,
            objects,
        }
    }

    /// Serialize to compact JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from JSON, rejecting newer format versions.
    pub fn from_json(json: &str) -> Result<Self> {
        let data: Self = serde_json::from_str(json)?;
        if data.version > SCENE_FORMAT_VERSION {
            return Err(EditorError::UnsupportedVersion { found: data.version });
        }
        Ok(data)
    }
}
