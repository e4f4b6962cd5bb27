//! Engine node tree mirroring document blocks and spans.

use ptedit_core::{InlineObject, MarkDef, ObjectBlock};
use ropey::Rope;
use std::rc::Rc;

/// A node of the engine tree.
///
/// Blocks sit at depth one; text blocks own child leaves at depth two.
/// Nodes are shared behind `Rc` so history snapshots and reconciliation can
/// keep identity for unchanged nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineNode {
    TextBlock(TextBlockNode),
    BlockObject(ObjectBlock),
    Text(TextLeaf),
    InlineObject(InlineObject),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextBlockNode {
    pub key: String,
    pub style: String,
    pub list_item: Option<String>,
    pub level: Option<u32>,
    pub mark_defs: Vec<MarkDef>,
    pub children: Vec<Rc<EngineNode>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextLeaf {
    pub key: String,
    pub text: Rope,
    pub marks: Vec<String>,
}

impl TextLeaf {
    pub fn new(key: impl Into<String>, text: &str, marks: Vec<String>) -> Self {
        Self {
            key: key.into(),
            text: Rope::from_str(text),
            marks,
        }
    }

    pub fn len_chars(&self) -> usize {
        self.text.len_chars()
    }
}

impl EngineNode {
    pub fn key(&self) -> &str {
        match self {
            Self::TextBlock(block) => block.key.as_str(),
            Self::BlockObject(object) | Self::InlineObject(object) => object.key.as_str(),
            Self::Text(leaf) => leaf.key.as_str(),
        }
    }

    pub fn as_text_block(&self) -> Option<&TextBlockNode> {
        match self {
            Self::TextBlock(block) => Some(block),
            _ => None,
        }
    }

    pub fn as_text_block_mut(&mut self) -> Option<&mut TextBlockNode> {
        match self {
            Self::TextBlock(block) => Some(block),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextLeaf> {
        match self {
            Self::Text(leaf) => Some(leaf),
            _ => None,
        }
    }

    /// Children of a text block; empty for every other node.
    pub fn children(&self) -> &[Rc<EngineNode>] {
        match self {
            Self::TextBlock(block) => block.children.as_slice(),
            _ => &[],
        }
    }

    /// Max offset a point inside this node may carry.
    pub fn offset_len(&self) -> usize {
        match self {
            Self::Text(leaf) => leaf.len_chars(),
            _ => 0,
        }
    }

    /// True for a text block whose children are all empty text leaves.
    pub fn is_empty_text_block(&self) -> bool {
        match self {
            Self::TextBlock(block) => block
                .children
                .iter()
                .all(|child| {
                    matches!(child.as_ref(), EngineNode::Text(leaf) if leaf.len_chars() == 0)
                }),
            _ => false,
        }
    }
}

impl TextBlockNode {
    /// An empty block with one empty leaf.
    pub fn empty(key: impl Into<String>, leaf_key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            style: ptedit_core::constants::DEFAULT_BLOCK_STYLE.to_string(),
            list_item: None,
            level: None,
            mark_defs: Vec::new(),
            children: vec![Rc::new(EngineNode::Text(TextLeaf::new(
                leaf_key,
                "",
                Vec::new(),
            )))],
        }
    }

    pub fn child_index(&self, key: &str) -> Option<usize> {
        self.children.iter().position(|child| child.key() == key)
    }

    /// Drop markDefs no child references any more.
    pub fn prune_mark_defs(&mut self) {
        let children = &self.children;
        self.mark_defs.retain(|def| {
            children.iter().any(|child| {
                child
                    .as_text()
                    .is_some_and(|leaf| leaf.marks.iter().any(|m| *m == def.key))
            })
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_block_detection() {
        let block = EngineNode::TextBlock(TextBlockNode::empty("b", "s"));
        assert!(block.is_empty_text_block());
        assert_eq!(block.children().len(), 1);
        assert_eq!(block.children()[0].key(), "s");
    }

    #[test]
    fn prune_mark_defs_keeps_referenced_definitions() {
        let mut block = TextBlockNode::empty("b", "s");
        block.mark_defs = vec![MarkDef::new("m1", "link"), MarkDef::new("m2", "link")];
        block.children = vec![Rc::new(EngineNode::Text(TextLeaf::new(
            "s",
            "x",
            vec!["m2".to_string(), "strong".to_string()],
        )))];
        block.prune_mark_defs();
        assert_eq!(block.mark_defs.len(), 1);
        assert_eq!(block.mark_defs[0].key, "m2");
    }
}
