//! Scene objects: raster images and rectangles.

use serde::{Deserialize, Serialize};

use super::filter::FilterSet;
use super::geometry::Geometry;

/// Unique identifier for a scene object. Never reused within a scene.
pub type ObjectId = u64;

/// Discriminant of [`ObjectData`], used for filtering object lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Image,
    Rect,
}

/// Fill and outline of a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RectStyle {
    /// RGBA fill; alpha 0 means no fill
    pub fill: [u8; 4],
    /// RGBA outline colour
    pub stroke: [u8; 4],
    /// Outline width in canvas pixels
    pub stroke_width: f64,
    /// Dashed outline
    #[serde(default)]
    pub dashed: bool,
}

/// Kind-specific payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ObjectData {
    /// Raster image resolved from an opaque source string
    Image {
        src: String,
        #[serde(default)]
        filters: FilterSet,
    },
    /// Plain rectangle (crop selections and frames)
    Rect { style: RectStyle },
}

/// One drawable entity in the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub id: ObjectId,
    #[serde(default)]
    pub name: String,
    pub geometry: Geometry,
    #[serde(flatten)]
    pub data: ObjectData,
}

impl SceneObject {
    /// Create an image object.
    pub fn image(id: ObjectId, src: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            id,
            name: String::new(),
            geometry,
            data: ObjectData::Image {
                src: src.into(),
                filters: FilterSet::new(),
            },
        }
    }

    /// Create a rectangle object.
    pub fn rect(id: ObjectId, name: impl Into<String>, geometry: Geometry, style: RectStyle) -> Self {
        Self {
            id,
            name: name.into(),
            geometry,
            data: ObjectData::Rect { style },
        }
    }

    /// Get the kind of this object.
    pub fn kind(&self) -> ObjectKind {
        match self.data {
            ObjectData::Image { .. } => ObjectKind::Image,
            ObjectData::Rect { .. } => ObjectKind::Rect,
        }
    }

    /// Check if this is an image.
    pub fn is_image(&self) -> bool {
        self.kind() == ObjectKind::Image
    }

    /// Image source, if this is an image.
    pub fn src(&self) -> Option<&str> {
        match &self.data {
            ObjectData::Image { src, .. } => Some(src),
            ObjectData::Rect { .. } => None,
        }
    }

    /// Active filters, if this is an image.
    pub fn filters(&self) -> Option<&FilterSet> {
        match &self.data {
            ObjectData::Image { filters, .. } => Some(filters),
            ObjectData::Rect { .. } => None,
        }
    }

    /// Mutable filters, if this is an image.
    pub fn filters_mut(&mut self) -> Option<&mut FilterSet> {
        match &mut self.data {
            ObjectData::Image { filters, .. } => Some(filters),
            ObjectData::Rect { .. } => None,
        }
    }

    /// Rectangle style, if this is a rectangle.
    pub fn rect_style(&self) -> Option<&RectStyle> {
        match &self.data {
            ObjectData::Rect { style } => Some(style),
            ObjectData::Image { .. } => None,
        }
    }
}
