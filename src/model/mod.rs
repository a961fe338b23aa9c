//! Data model: objects, geometry and filters.

mod filter;
mod geometry;
mod object;

pub use filter::{FilterChange, FilterKind, FilterParams, FilterSet};
pub use geometry::{BoundingRect, Geometry};
pub use object::{ObjectData, ObjectId, ObjectKind, RectStyle, SceneObject};
