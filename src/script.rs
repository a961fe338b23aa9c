//! JSON edit scripts for headless use.
//!
//! A script is a JSON array of operations, for example:
//!
//! ```json
//! [
//!   { "op": "filter", "kind": "brightness", "value": 20 },
//!   { "op": "rotate_left" },
//!   { "op": "start_crop" },
//!   { "op": "set_crop_bounds", "left": 360, "top": 210, "width": 80, "height": 60 },
//!   { "op": "apply_crop" }
//! ]
//! ```

use serde::{Deserialize, Serialize};

use crate::editor::Editor;
use crate::error::Result;
use crate::loader::ImageLoader;
use crate::model::FilterKind;
use crate::scene::SceneModel;

/// One editor operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOp {
    ZoomIn,
    ZoomOut,
    SetZoom { zoom: f64 },
    Pan { dx: f64, dy: f64 },
    RotateLeft,
    RotateRight,
    /// Raw slider value, normalized per kind
    Filter { kind: FilterKind, value: f64 },
    StartCrop,
    SetCropBounds {
        left: f64,
        top: f64,
        width: f64,
        height: f64,
    },
    ApplyCrop,
    StopCrop,
    AddFrame,
    SelectFrame { name: String },
    Undo,
    Redo,
}

impl EditOp {
    /// Run the operation and wait for any job it queued.
    ///
    /// Returns false when the operation was a no-op.
    pub fn apply<S: SceneModel, L: ImageLoader>(&self, editor: &mut Editor<S, L>) -> bool {
        let applied = match self {
            EditOp::ZoomIn => {
                editor.zoom_in();
                true
            }
            EditOp::ZoomOut => {
                editor.zoom_out();
                true
            }
            EditOp::SetZoom { zoom } => {
                editor.set_zoom(*zoom);
                true
            }
            EditOp::Pan { dx, dy } => {
                editor.pan_by(*dx, *dy);
                true
            }
            EditOp::RotateLeft => editor.rotate_left(),
            EditOp::RotateRight => editor.rotate_right(),
            EditOp::Filter { kind, value } => {
                editor.apply_filter(*kind, *value) != crate::filters::FilterOutcome::NotApplicable
            }
            EditOp::StartCrop => editor.start_crop_mode().is_some(),
            EditOp::SetCropBounds {
                left,
                top,
                width,
                height,
            } => editor.set_crop_bounds(*left, *top, *width, *height),
            EditOp::ApplyCrop => editor.apply_crop(),
            EditOp::StopCrop => editor.stop_crop_mode(),
            EditOp::AddFrame => editor.add_frame().is_some(),
            EditOp::SelectFrame { name } => editor.select_frame(name),
            EditOp::Undo => editor.undo(),
            EditOp::Redo => editor.redo(),
        };
        editor.pump();
        applied
    }
}

/// Parse a script.
pub fn parse_script(json: &str) -> Result<Vec<EditOp>> {
    Ok(serde_json::from_str(json)?)
}

/// Apply every operation in order. Returns how many were not no-ops.
pub fn run_script<S: SceneModel, L: ImageLoader>(
    editor: &mut Editor<S, L>,
    ops: &[EditOp],
) -> usize {
    let mut applied = 0;
    for op in ops {
        if op.apply(editor) {
            applied += 1;
        } else {
            log::debug!("Script op had no effect: {:?}", op);
        }
    }
    applied
}
