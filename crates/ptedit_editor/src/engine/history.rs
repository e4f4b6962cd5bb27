//! Undo/redo history for the engine tree.
//!
//! Records are snapshots of the top-level node list. Nodes are `Rc`-shared,
//! so a snapshot costs one pointer per block; copy-on-write mutation keeps
//! the snapshotted nodes intact.

use super::node::EngineNode;
use super::selection::EngineRange;
use std::rc::Rc;
use std::time::{Duration, Instant};

const DEFAULT_COALESCE_WINDOW: Duration = Duration::from_millis(750);

/// Mutation intent used for history coalescing rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditIntent {
    Typing,
    Delete,
    Paste,
    Format,
    Structure,
}

/// Tree and selection at one point in time.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub blocks: Vec<Rc<EngineNode>>,
    pub selection: Option<EngineRange>,
}

#[derive(Clone, Debug)]
struct EditRecord {
    before: Snapshot,
    after: Snapshot,
    intent: EditIntent,
    at: Instant,
}

/// Snapshot-based undo/redo stack with bounded depth.
#[derive(Debug)]
pub struct EngineHistory {
    undo: Vec<EditRecord>,
    redo: Vec<EditRecord>,
    max_ops: usize,
    coalesce_window: Duration,
}

impl EngineHistory {
    pub fn new(max_ops: usize) -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            max_ops: max_ops.max(1),
            coalesce_window: DEFAULT_COALESCE_WINDOW,
        }
    }

    /// Record a mutation from `before` to `after`.
    pub fn record(&mut self, before: Snapshot, after: Snapshot, intent: EditIntent, at: Instant) {
        if before.blocks == after.blocks {
            return;
        }
        self.redo.clear();
        let incoming = EditRecord {
            before,
            after,
            intent,
            at,
        };
        if let Some(last) = self.undo.last_mut() {
            if Self::can_coalesce(last, &incoming, self.coalesce_window) {
                last.after = incoming.after;
                last.at = incoming.at;
                return;
            }
        }
        self.undo.push(incoming);
        if self.undo.len() > self.max_ops {
            let overflow = self.undo.len() - self.max_ops;
            self.undo.drain(..overflow);
        }
    }

    fn can_coalesce(previous: &EditRecord, next: &EditRecord, window: Duration) -> bool {
        previous.intent == EditIntent::Typing
            && next.intent == EditIntent::Typing
            && next.at.saturating_duration_since(previous.at) <= window
            && previous.after.selection == next.before.selection
    }

    /// Pop the latest record, returning the state to restore.
    pub fn undo(&mut self) -> Option<Snapshot> {
        let record = self.undo.pop()?;
        let before = record.before.clone();
        self.redo.push(record);
        Some(before)
    }

    /// Re-apply the latest undone record, returning the state to restore.
    pub fn redo(&mut self) -> Option<Snapshot> {
        let record = self.redo.pop()?;
        let after = record.after.clone();
        self.undo.push(record);
        Some(after)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    #[cfg(test)]
    fn undo_len(&self) -> usize {
        self.undo.len()
    }
}
