//! retouch - non-destructive raster image editor core
//!
//! A scene of images and rectangles with zoom, rotation, cropping, named
//! frames and per-image filters, plus snapshot-based undo/redo. There is no
//! rendering surface here: a host UI (or the `retouch` binary) drives an
//! [`Editor`] and draws the scene however it likes.

pub mod config;
pub mod constants;
pub mod crop;
pub mod editor;
pub mod error;
pub mod filters;
pub mod frame;
pub mod history;
pub mod keybindings;
pub mod loader;
pub mod model;
pub mod scene;
pub mod script;
pub mod transform;
pub mod viewport;

pub use config::{ConfigError, EditorConfig};
pub use editor::Editor;
pub use error::{EditorError, Result};
pub use scene::{Scene, SceneEvent, SceneModel};
