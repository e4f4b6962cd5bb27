//! Weak `_key` lookup into the engine tree.

use super::node::EngineNode;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

/// Identity of a node in document terms.
///
/// Child keys are only unique within their block, so children are addressed
/// by `(block, child)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeKey {
    pub block: String,
    pub child: Option<String>,
}

impl NodeKey {
    pub fn block(block: &str) -> Self {
        Self {
            block: block.to_string(),
            child: None,
        }
    }

    pub fn child(block: &str, child: &str) -> Self {
        Self {
            block: block.to_string(),
            child: Some(child.to_string()),
        }
    }
}

/// Non-owning key → node table.
///
/// Entries never keep nodes alive; a lookup of a node that has since been
/// replaced returns `None`.
#[derive(Debug, Default)]
pub struct KeyRegistry {
    nodes: HashMap<NodeKey, Weak<EngineNode>>,
    rebuilds: u64,
}

impl KeyRegistry {
    /// Rebuild the table from the current top-level nodes.
    pub fn rebuild(&mut self, blocks: &[Rc<EngineNode>]) {
        self.nodes.clear();
        for block in blocks {
            let block_key = block.key();
            self.nodes
                .insert(NodeKey::block(block_key), Rc::downgrade(block));
            for child in block.children() {
                self.nodes
                    .insert(NodeKey::child(block_key, child.key()), Rc::downgrade(child));
            }
        }
        self.rebuilds += 1;
    }

    pub fn get(&self, key: &NodeKey) -> Option<Rc<EngineNode>> {
        self.nodes.get(key).and_then(Weak::upgrade)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of rebuilds so far.
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }
}
