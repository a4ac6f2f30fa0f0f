//! # Undo/Redo History
//!
//! Two LIFO stacks of [`Snapshot`]s. The undo stack is bounded: pushing past the limit
//! drops the oldest entry, never the newest.
//!
//! Whether a capture should invalidate the redo stack is decided by the caller through
//! [`CaptureOrigin`]: a capture that observes state restored by undo/redo is a
//! [`CaptureOrigin::Replay`] and leaves the redo stack alone. The engine keeps no
//! "replay in progress" flag of its own.

use std::collections::VecDeque;

use tracing::debug;

use crate::error::{InkpadError, Result};

pub const DEFAULT_HISTORY_LIMIT: usize = 30;

/// Editor state at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub content: String,
    pub title: String,
}

impl Snapshot {
    pub fn new(content: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            title: title.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOrigin {
    /// A normal edit; clears the redo stack.
    Edit,
    /// State put in place by undo/redo; the redo stack survives.
    Replay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    Captured,
    /// Content was blank after trimming.
    SkippedEmpty,
    /// Identical to the top of the undo stack.
    SkippedDuplicate,
}

#[derive(Debug, Clone)]
pub struct History {
    undo: VecDeque<Snapshot>,
    redo: Vec<Snapshot>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            limit: limit.max(1),
        }
    }

    pub fn capture(&mut self, snapshot: Snapshot, origin: CaptureOrigin) -> CaptureOutcome {
        if snapshot.content.trim().is_empty() {
            return CaptureOutcome::SkippedEmpty;
        }
        if self.undo.back() == Some(&snapshot) {
            return CaptureOutcome::SkippedDuplicate;
        }

        self.push_undo(snapshot);
        if origin == CaptureOrigin::Edit {
            self.redo.clear();
        }
        debug!(
            undo = self.undo.len(),
            redo = self.redo.len(),
            ?origin,
            "state captured"
        );
        CaptureOutcome::Captured
    }

    /// Swaps the live state for the most recent snapshot; `live` goes onto the redo stack.
    pub fn undo(&mut self, live: Snapshot) -> Result<Snapshot> {
        let previous = self.undo.pop_back().ok_or(InkpadError::NothingToUndo)?;
        self.redo.push(live);
        debug!(undo = self.undo.len(), redo = self.redo.len(), "undo");
        Ok(previous)
    }

    /// Swaps the live state for the most recently undone one; `live` goes onto the undo stack.
    pub fn redo(&mut self, live: Snapshot) -> Result<Snapshot> {
        let next = self.redo.pop().ok_or(InkpadError::NothingToRedo)?;
        self.push_undo(live);
        debug!(undo = self.undo.len(), redo = self.redo.len(), "redo");
        Ok(next)
    }

    pub fn reset(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Undo stack, oldest first.
    pub fn undo_stack(&self) -> impl Iterator<Item = &Snapshot> {
        self.undo.iter()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    fn push_undo(&mut self, snapshot: Snapshot) {
        self.undo.push_back(snapshot);
        while self.undo.len() > self.limit {
            self.undo.pop_front();
        }
    }
}
