//! Internal editing engine: node tree, selection, history.
//!
//! The engine knows nothing about document paths or patches. It is driven
//! through [`crate::api::EditableApi`] and read back through the mappers in
//! [`crate::mapping`].

pub mod history;
pub mod node;
pub mod registry;
pub mod selection;
pub mod transforms;

pub use history::{EditIntent, EngineHistory, Snapshot};
pub use node::{EngineNode, TextBlockNode, TextLeaf};
pub use registry::{KeyRegistry, NodeKey};
pub use selection::{EnginePoint, EngineRange};
pub use transforms::{DeleteUnit, FlatPos};

use std::rc::Rc;
use std::time::Instant;

/// Engine state owned by the editable surface.
#[derive(Debug)]
pub struct Engine {
    blocks: Vec<Rc<EngineNode>>,
    registry: KeyRegistry,
    selection: Option<EngineRange>,
    focused: bool,
    history: EngineHistory,
    placeholder_key: Option<String>,
    pending_marks: Option<Vec<String>>,
    revision: u64,
    flushed_revision: u64,
}

/// Mutable view handed to an edit closure.
pub struct EngineTxn<'a> {
    pub blocks: &'a mut Vec<Rc<EngineNode>>,
    pub selection: &'a mut Option<EngineRange>,
}

impl EngineTxn<'_> {
    pub fn block(&self, index: usize) -> Option<&EngineNode> {
        self.blocks.get(index).map(Rc::as_ref)
    }

    /// Copy-on-write access to a text block.
    pub fn text_block_mut(&mut self, index: usize) -> Option<&mut TextBlockNode> {
        Rc::make_mut(self.blocks.get_mut(index)?).as_text_block_mut()
    }

    /// Copy-on-write access to a text leaf.
    pub fn leaf_mut(&mut self, block: usize, child: usize) -> Option<&mut TextLeaf> {
        let block = self.text_block_mut(block)?;
        match Rc::make_mut(block.children.get_mut(child)?) {
            EngineNode::Text(leaf) => Some(leaf),
            _ => None,
        }
    }

    pub fn set_selection(&mut self, range: Option<EngineRange>) {
        *self.selection = range;
    }
}

/// An empty default-style text block: what a document with no content edits as.
fn is_blank_line(node: &EngineNode) -> bool {
    node.is_empty_text_block()
        && node.as_text_block().is_some_and(|block| {
            block.style == ptedit_core::constants::DEFAULT_BLOCK_STYLE
                && block.list_item.is_none()
                && block.mark_defs.is_empty()
        })
}

fn same_nodes(left: &[Rc<EngineNode>], right: &[Rc<EngineNode>]) -> bool {
    left.len() == right.len() && left.iter().zip(right).all(|(a, b)| Rc::ptr_eq(a, b))
}

/// Clamp `point` into the bounds of `blocks`; `None` when the tree is empty.
pub fn clamp_point(blocks: &[Rc<EngineNode>], point: &EnginePoint) -> Option<EnginePoint> {
    let block_index = point.block().min(blocks.len().checked_sub(1)?);
    let block = &blocks[block_index];
    match block.as_ref() {
        EngineNode::TextBlock(text_block) => {
            let last_child = text_block.children.len().checked_sub(1)?;
            let child_index = point.child().unwrap_or(0).min(last_child);
            let len = text_block.children[child_index].offset_len();
            let offset = if point.block() > block_index || point.child() > Some(last_child) {
                len
            } else {
                point.offset.min(len)
            };
            Some(EnginePoint::new(vec![block_index, child_index], offset))
        }
        _ => Some(EnginePoint::new(vec![block_index], 0)),
    }
}

impl Engine {
    pub fn new(history_max_ops: usize) -> Self {
        Self {
            blocks: Vec::new(),
            registry: KeyRegistry::default(),
            selection: None,
            focused: false,
            history: EngineHistory::new(history_max_ops),
            placeholder_key: None,
            pending_marks: None,
            revision: 0,
            flushed_revision: 0,
        }
    }

    pub fn blocks(&self) -> &[Rc<EngineNode>] {
        &self.blocks
    }

    pub fn block(&self, index: usize) -> Option<&EngineNode> {
        self.blocks.get(index).map(Rc::as_ref)
    }

    /// Node at an engine index path.
    pub fn node(&self, path: &[usize]) -> Option<&EngineNode> {
        let (first, rest) = path.split_first()?;
        let block = self.block(*first)?;
        match rest {
            [] => Some(block),
            [child] => block.children().get(*child).map(Rc::as_ref),
            _ => None,
        }
    }

    pub fn lookup(&self, key: &NodeKey) -> Option<Rc<EngineNode>> {
        self.registry.get(key)
    }

    pub fn registry(&self) -> &KeyRegistry {
        &self.registry
    }

    /// Key of the placeholder block, while the tree holds only that block.
    pub fn placeholder_key(&self) -> Option<&str> {
        self.placeholder_key.as_deref()
    }

    /// True when the tree is exactly the untouched placeholder block.
    pub fn is_placeholder_only(&self) -> bool {
        match (self.placeholder_key.as_deref(), self.blocks.as_slice()) {
            (Some(key), [only]) => only.key() == key && only.is_empty_text_block(),
            _ => false,
        }
    }

    /// Replace the node list after external reconciliation.
    ///
    /// Not a local edit: the revision and history are untouched.
    pub fn sync_blocks(
        &mut self,
        blocks: Vec<Rc<EngineNode>>,
        placeholder_key: Option<String>,
        structural: bool,
    ) {
        self.blocks = blocks;
        self.placeholder_key = placeholder_key;
        if structural || self.registry.is_empty() {
            self.registry.rebuild(&self.blocks);
        }
        self.clamp_selection();
    }

    pub fn selection(&self) -> Option<&EngineRange> {
        self.selection.as_ref()
    }

    /// Set the selection after clamping it into the tree.
    pub fn set_selection(&mut self, range: Option<EngineRange>) {
        if range.as_ref() != self.selection.as_ref() {
            self.pending_marks = None;
        }
        self.selection = range;
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        if let Some(range) = self.selection.take() {
            self.selection = match (
                clamp_point(&self.blocks, &range.anchor),
                clamp_point(&self.blocks, &range.focus),
            ) {
                (Some(anchor), Some(focus)) => Some(EngineRange::new(anchor, focus)),
                _ => None,
            };
        }
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn pending_marks(&self) -> Option<&[String]> {
        self.pending_marks.as_deref()
    }

    pub fn set_pending_marks(&mut self, marks: Option<Vec<String>>) {
        self.pending_marks = marks;
    }

    /// Local edit counter; bumped by every mutating [`Engine::edit`].
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn has_unflushed_changes(&self) -> bool {
        self.revision != self.flushed_revision
    }

    pub fn mark_flushed(&mut self) {
        self.flushed_revision = self.revision;
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            blocks: self.blocks.clone(),
            selection: self.selection.clone(),
        }
    }

    /// Run a local edit, recording history when the tree changed.
    pub fn edit<R>(
        &mut self,
        intent: EditIntent,
        now: Instant,
        f: impl FnOnce(&mut EngineTxn<'_>) -> R,
    ) -> R {
        let before = self.snapshot();
        let result = {
            let mut txn = EngineTxn {
                blocks: &mut self.blocks,
                selection: &mut self.selection,
            };
            f(&mut txn)
        };
        self.clamp_selection();
        if before.blocks != self.blocks {
            self.after_local_change(&before.blocks);
            let after = self.snapshot();
            self.history.record(before, after, intent, now);
        }
        result
    }

    fn after_local_change(&mut self, previous: &[Rc<EngineNode>]) {
        self.revision += 1;
        self.placeholder_key = match self.blocks.as_slice() {
            [only] if is_blank_line(only) => Some(only.key().to_string()),
            _ => None,
        };
        if !same_nodes(previous, &self.blocks) {
            self.registry.rebuild(&self.blocks);
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        let previous = std::mem::replace(&mut self.blocks, snapshot.blocks);
        self.selection = snapshot.selection;
        self.clamp_selection();
        self.pending_marks = None;
        self.after_local_change(&previous);
    }

    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => false,
        }
    }

    pub fn history(&self) -> &EngineHistory {
        &self.history
    }
}
