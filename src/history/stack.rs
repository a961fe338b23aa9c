//! Bounded undo/redo stacks of whole-state snapshots.

use std::collections::VecDeque;

use crate::constants::DEFAULT_MAX_HISTORY;

/// Undo/redo stacks where the top of the undo stack is always the current
/// state.
///
/// Unlike a "push before you change" stack, every entry here is a complete
/// state including the present one, so undo needs at least two entries: the
/// current state and one to go back to.
#[derive(Debug, Clone)]
pub struct SnapshotStack<T: Clone> {
    /// Oldest first; the back is the current state
    undo_stack: VecDeque<T>,
    /// States undone from, most recent last
    redo_stack: Vec<T>,
    /// Maximum undo entries; the oldest is evicted beyond this
    max_history: usize,
}

impl<T: Clone> Default for SnapshotStack<T> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

impl<T: Clone> SnapshotStack<T> {
    /// Create an empty stack. A capacity below 2 would make undo impossible,
    /// so it is raised to 2.
    pub fn new(max_history: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_history: max_history.max(2),
        }
    }

    /// Record a new current state from a live edit.
    ///
    /// This clears the redo stack since a new change invalidates the redo history.
    pub fn push(&mut self, state: T) {
        self.undo_stack.push_back(state);
        self.redo_stack.clear();

        while self.undo_stack.len() > self.max_history {
            self.undo_stack.pop_front();
        }
    }

    /// The current state.
    pub fn current(&self) -> Option<&T> {
        self.undo_stack.back()
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        self.undo_stack.len() > 1
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Move the current state onto the redo stack and return the state to
    /// restore.
    pub fn undo(&mut self) -> Option<T> {
        if !self.can_undo() {
            return None;
        }
        let current = self.undo_stack.pop_back()?;
        self.redo_stack.push(current);
        self.undo_stack.back().cloned()
    }

    /// Move the most recently undone state back onto the undo stack and
    /// return it.
    pub fn redo(&mut self) -> Option<T> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push_back(next.clone());
        Some(next)
    }

    /// Reverse the last [`undo`](Self::undo) when its restore failed.
    pub fn revert_undo(&mut self) {
        if let Some(state) = self.redo_stack.pop() {
            self.undo_stack.push_back(state);
        }
    }

    /// Reverse the last [`redo`](Self::redo) when its restore failed.
    pub fn revert_redo(&mut self) {
        if self.undo_stack.len() > 1
            && let Some(state) = self.undo_stack.pop_back()
        {
            self.redo_stack.push(state);
        }
    }

    /// Get number of undo entries, current state included
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get number of redo steps available
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Every held state, undo entries first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.undo_stack.iter().chain(self.redo_stack.iter())
    }
}
