//! Keyboard shortcuts for undo and redo.
//!
//! The host UI translates its native key events into [`KeyPress`] and asks
//! [`KeyBindings::action_for`] what to do. Shortcuts never fire while the
//! user is typing into a text field.

use serde::{Deserialize, Serialize};

/// Keys the editor can bind. Only letters are bindable; everything else
/// arrives as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    Other,
}

/// Where keyboard focus is when a key is pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    /// Canvas or a non-text control
    #[default]
    Canvas,
    /// A text input or text area
    TextInput,
}

/// A key press with its modifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: KeyCode,
    /// Ctrl, or Cmd on macOS
    pub ctrl: bool,
    pub shift: bool,
    pub focus: Focus,
}

impl KeyPress {
    /// A press with Ctrl held on the canvas.
    pub fn ctrl(key: KeyCode) -> Self {
        Self {
            key,
            ctrl: true,
            shift: false,
            focus: Focus::Canvas,
        }
    }

    /// Same press with Shift held.
    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    /// Same press with focus moved to a text input.
    pub fn in_text_input(mut self) -> Self {
        self.focus = Focus::TextInput;
        self
    }
}

/// History action a shortcut maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    Undo,
    Redo,
}

/// Keybinding configuration for history shortcuts.
///
/// Undo is Ctrl+`undo`. Redo is Ctrl+`redo`, or Ctrl+Shift+`undo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBindings {
    pub undo: KeyCode,
    pub redo: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            undo: KeyCode::Z,
            redo: KeyCode::Y,
        }
    }
}

impl KeyBindings {
    /// Get the action that corresponds to a key press, if any.
    pub fn action_for(&self, press: &KeyPress) -> Option<ShortcutAction> {
        if press.focus == Focus::TextInput || !press.ctrl {
            return None;
        }

        if press.key == self.undo {
            if press.shift {
                Some(ShortcutAction::Redo)
            } else {
                Some(ShortcutAction::Undo)
            }
        } else if press.key == self.redo && !press.shift {
            Some(ShortcutAction::Redo)
        } else {
            None
        }
    }
}
