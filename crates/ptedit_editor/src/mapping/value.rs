//! Document ⇄ engine tree conversion and incremental reconciliation.

use crate::engine::{EngineNode, TextBlockNode, TextLeaf};
use ptedit_core::{Block, Document, KeyGenerator, ReconcileStrategy, Span, TextBlock, TextSpan};
use std::collections::HashMap;
use std::rc::Rc;

pub fn span_to_node(span: &Span) -> Rc<EngineNode> {
    Rc::new(match span {
        Span::Text(span) => {
            EngineNode::Text(TextLeaf::new(span.key.clone(), &span.text, span.marks.clone()))
        }
        Span::Inline(object) => EngineNode::InlineObject(object.clone()),
    })
}

pub fn block_to_node(block: &Block) -> Rc<EngineNode> {
    Rc::new(match block {
        Block::Text(block) => EngineNode::TextBlock(TextBlockNode {
            key: block.key.clone(),
            style: block.style.clone(),
            list_item: block.list_item.clone(),
            level: block.level,
            mark_defs: block.mark_defs.clone(),
            children: block.children.iter().map(span_to_node).collect(),
        }),
        Block::Object(object) => EngineNode::BlockObject(object.clone()),
    })
}

fn node_to_span(node: &EngineNode) -> Option<Span> {
    match node {
        EngineNode::Text(leaf) => Some(Span::Text(TextSpan {
            key: leaf.key.clone(),
            text: leaf.text.to_string(),
            marks: leaf.marks.clone(),
        })),
        EngineNode::InlineObject(object) => Some(Span::Inline(object.clone())),
        _ => None,
    }
}

pub fn node_to_block(node: &EngineNode) -> Option<Block> {
    match node {
        EngineNode::TextBlock(block) => Some(Block::Text(TextBlock {
            key: block.key.clone(),
            style: block.style.clone(),
            mark_defs: block.mark_defs.clone(),
            children: block
                .children
                .iter()
                .filter_map(|child| node_to_span(child))
                .collect(),
            list_item: block.list_item.clone(),
            level: block.level,
        })),
        EngineNode::BlockObject(object) => Some(Block::Object(object.clone())),
        _ => None,
    }
}

/// The single empty line shown for an empty document.
pub fn placeholder_node(keys: &mut dyn KeyGenerator) -> Rc<EngineNode> {
    let block_key = keys.next_key();
    let span_key = keys.next_key();
    Rc::new(EngineNode::TextBlock(TextBlockNode::empty(block_key, span_key)))
}

/// Map a document to engine nodes.
///
/// An absent or empty document maps to a placeholder block; its key is
/// returned alongside so it can be hidden from [`from_engine_nodes`] callers.
pub fn to_engine_nodes(
    document: Option<&[Block]>,
    keys: &mut dyn KeyGenerator,
) -> (Vec<Rc<EngineNode>>, Option<String>) {
    match document {
        Some(blocks) if !blocks.is_empty() => (blocks.iter().map(block_to_node).collect(), None),
        _ => {
            let placeholder = placeholder_node(keys);
            let key = placeholder.key().to_string();
            (vec![placeholder], Some(key))
        }
    }
}

pub fn from_engine_nodes(nodes: &[Rc<EngineNode>]) -> Document {
    nodes.iter().filter_map(|node| node_to_block(node)).collect()
}

/// What a reconciliation pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub replaced: usize,
    pub appended: usize,
    pub removed: usize,
    /// Reused nodes that changed position (keyed strategy only).
    pub moved: usize,
    /// Set when a placeholder block was created for an empty document.
    pub placeholder_key: Option<String>,
}

impl ReconcileOutcome {
    pub fn is_structural(&self) -> bool {
        self.replaced > 0 || self.appended > 0 || self.removed > 0 || self.moved > 0
    }
}

/// Update `existing` in place to mirror `document`.
///
/// Unchanged nodes keep their `Rc` identity. An empty document keeps an
/// existing empty single block rather than minting a new placeholder.
pub fn reconcile(
    existing: &mut Vec<Rc<EngineNode>>,
    document: Option<&[Block]>,
    strategy: ReconcileStrategy,
    current_placeholder: Option<&str>,
    keys: &mut dyn KeyGenerator,
) -> ReconcileOutcome {
    let blocks = document.unwrap_or(&[]);
    if blocks.is_empty() {
        if let [only] = existing.as_slice() {
            if only.is_empty_text_block() {
                return ReconcileOutcome {
                    placeholder_key: current_placeholder
                        .map(str::to_string)
                        .or_else(|| Some(only.key().to_string())),
                    ..ReconcileOutcome::default()
                };
            }
        }
        let removed = existing.len();
        let placeholder = placeholder_node(keys);
        let key = placeholder.key().to_string();
        *existing = vec![placeholder];
        return ReconcileOutcome {
            replaced: 1,
            removed,
            placeholder_key: Some(key),
            ..ReconcileOutcome::default()
        };
    }
    match strategy {
        ReconcileStrategy::Positional => reconcile_positional(existing, blocks),
        ReconcileStrategy::Keyed => reconcile_keyed(existing, blocks),
    }
}

fn reconcile_positional(existing: &mut Vec<Rc<EngineNode>>, blocks: &[Block]) -> ReconcileOutcome {
    let mut outcome = ReconcileOutcome::default();
    for (index, block) in blocks.iter().enumerate() {
        let mapped = block_to_node(block);
        match existing.get_mut(index) {
            Some(current) => {
                if **current != *mapped {
                    *current = mapped;
                    outcome.replaced += 1;
                }
            }
            None => {
                existing.push(mapped);
                outcome.appended += 1;
            }
        }
    }
    if existing.len() > blocks.len() {
        outcome.removed = existing.len() - blocks.len();
        existing.truncate(blocks.len());
    }
    outcome
}

fn reconcile_keyed(existing: &mut Vec<Rc<EngineNode>>, blocks: &[Block]) -> ReconcileOutcome {
    let mut by_key: HashMap<&str, &Rc<EngineNode>> = HashMap::with_capacity(existing.len());
    for node in existing.iter() {
        by_key.entry(node.key()).or_insert(node);
    }
    let mut outcome = ReconcileOutcome::default();
    let mut next = Vec::with_capacity(blocks.len());
    for (index, block) in blocks.iter().enumerate() {
        let mapped = block_to_node(block);
        match by_key.get(block.key()) {
            Some(current) if ***current == *mapped => {
                if existing.get(index).map(|node| node.key()) != Some(block.key()) {
                    outcome.moved += 1;
                }
                next.push(Rc::clone(current));
            }
            Some(_) => {
                next.push(mapped);
                outcome.replaced += 1;
            }
            None => {
                next.push(mapped);
                outcome.appended += 1;
            }
        }
    }
    let kept: std::collections::HashSet<&str> = blocks.iter().map(Block::key).collect();
    outcome.removed = existing
        .iter()
        .filter(|node| !kept.contains(node.key()))
        .count();
    *existing = next;
    outcome
}
