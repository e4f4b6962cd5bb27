//! Render tree produced from the engine tree through host renderers.
//!
//! Text leaves always render through the default leaf, which carries the
//! `data-pte-key` attribute the surface relies on to map host positions
//! back to spans. Everything around the leaves is up to the host.

use super::anchors::{AnchorRegistry, AnchorRole};
use crate::engine::{EngineNode, TextBlockNode, TextLeaf};
use ptedit_core::constants::KEY_MARKER_ATTRIBUTE;
use ptedit_core::models::marker::{markers_for_annotation, markers_for_block, markers_for_child};
use ptedit_core::{EditorConfig, InlineObject, MarkDef, Marker, ObjectBlock, Path};
use serde::Serialize;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Host-neutral render output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RenderNode {
    Element {
        tag: String,
        #[serde(skip_serializing_if = "BTreeMap::is_empty")]
        attributes: BTreeMap<String, String>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        children: Vec<RenderNode>,
    },
    Text {
        text: String,
    },
}

impl RenderNode {
    pub fn element(tag: &str, children: Vec<RenderNode>) -> Self {
        Self::Element {
            tag: tag.to_string(),
            attributes: BTreeMap::new(),
            children,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Builder-style attribute setter; a no-op on text nodes.
    pub fn with_attribute(mut self, name: &str, value: impl Into<String>) -> Self {
        if let Self::Element { attributes, .. } = &mut self {
            attributes.insert(name.to_string(), value.into());
        }
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        match self {
            Self::Element { attributes, .. } => attributes.get(name).map(String::as_str),
            Self::Text { .. } => None,
        }
    }

    pub fn children(&self) -> &[RenderNode] {
        match self {
            Self::Element { children, .. } => children,
            Self::Text { .. } => &[],
        }
    }

    /// Concatenated text of this subtree.
    pub fn text_content(&self) -> String {
        match self {
            Self::Text { text } => text.clone(),
            Self::Element { children, .. } => children.iter().map(Self::text_content).collect(),
        }
    }

    /// Depth-first search for the first element carrying `name=value`.
    pub fn find_by_attribute(&self, name: &str, value: &str) -> Option<&RenderNode> {
        if self.attribute(name) == Some(value) {
            return Some(self);
        }
        self.children()
            .iter()
            .find_map(|child| child.find_by_attribute(name, value))
    }
}

/// Text block styles; anything unrecognised renders as `Normal`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockStyle {
    Normal,
    Heading(u8),
    Blockquote,
}

impl BlockStyle {
    pub fn parse(style: &str) -> Self {
        match style {
            "blockquote" => Self::Blockquote,
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                Self::Heading(style.as_bytes()[1].saturating_sub(b'0'))
            }
            _ => Self::Normal,
        }
    }

    pub fn tag(self) -> String {
        match self {
            Self::Normal => "p".to_string(),
            Self::Heading(level) => format!("h{}", level),
            Self::Blockquote => "blockquote".to_string(),
        }
    }
}

/// Per-node render props: address, scoped markers and selection state.
#[derive(Clone, Debug)]
pub struct RenderProps<'a> {
    pub path: Path,
    pub markers: Vec<&'a Marker>,
    /// The selection focus sits on this node.
    pub focused: bool,
}

/// Host render callbacks. Every method has a plain default.
pub trait Renderers {
    fn render_text_block(
        &mut self,
        block: &TextBlockNode,
        style: BlockStyle,
        props: &RenderProps<'_>,
        children: Vec<RenderNode>,
    ) -> RenderNode {
        let mut node =
            RenderNode::element(&style.tag(), children).with_attribute("data-block", &block.key);
        if let Some(list_item) = &block.list_item {
            node = node
                .with_attribute("data-list-item", list_item)
                .with_attribute("data-level", block.level.unwrap_or(1).to_string());
        }
        if !props.markers.is_empty() {
            node = node.with_attribute("data-markers", props.markers.len().to_string());
        }
        node
    }

    fn render_block(&mut self, block: &ObjectBlock, props: &RenderProps<'_>) -> RenderNode {
        object_node("div", block, props)
    }

    fn render_child(&mut self, child: &InlineObject, props: &RenderProps<'_>) -> RenderNode {
        object_node("span", child, props)
    }

    fn render_annotation(
        &mut self,
        definition: &MarkDef,
        props: &RenderProps<'_>,
        children: Vec<RenderNode>,
    ) -> RenderNode {
        let mut node = RenderNode::element("span", children)
            .with_attribute("data-annotation", &definition.type_name)
            .with_attribute("data-mark-def", &definition.key);
        if !props.markers.is_empty() {
            node = node.with_attribute("data-markers", props.markers.len().to_string());
        }
        node
    }

    fn render_decorator(&mut self, mark: &str, children: Vec<RenderNode>) -> RenderNode {
        match mark {
            "strong" => RenderNode::element("strong", children),
            "em" => RenderNode::element("em", children),
            "code" => RenderNode::element("code", children),
            "underline" => RenderNode::element("u", children),
            "strike-through" => RenderNode::element("s", children),
            other => RenderNode::element("span", children).with_attribute("data-mark", other),
        }
    }
}

fn object_node(tag: &str, object: &ObjectBlock, props: &RenderProps<'_>) -> RenderNode {
    let mut node = RenderNode::element(tag, Vec::new())
        .with_attribute("data-object", &object.key)
        .with_attribute("data-type", &object.type_name);
    if props.focused {
        node = node.with_attribute("data-selected", "true");
    }
    node
}

/// Renderers that keep every default.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultRenderers;

impl Renderers for DefaultRenderers {}

/// Inputs shared by one render pass.
pub struct RenderPass<'a> {
    pub config: &'a EditorConfig,
    pub markers: &'a [Marker],
    pub focus_path: Option<&'a Path>,
}

fn leaf_node(leaf: &TextLeaf) -> RenderNode {
    RenderNode::element("span", vec![RenderNode::text(leaf.text.to_string())])
        .with_attribute(KEY_MARKER_ATTRIBUTE, &leaf.key)
}

impl RenderPass<'_> {
    fn is_focused(&self, path: &Path) -> bool {
        self.focus_path.is_some_and(|focus| focus.starts_with(path))
    }

    /// Render the whole tree, refilling `anchors` as objects are met.
    pub fn render(
        &self,
        blocks: &[Rc<EngineNode>],
        anchors: &mut AnchorRegistry,
        renderers: &mut dyn Renderers,
    ) -> Vec<RenderNode> {
        blocks
            .iter()
            .filter_map(|node| match node.as_ref() {
                EngineNode::TextBlock(block) => Some(self.text_block(block, anchors, renderers)),
                EngineNode::BlockObject(object) => {
                    let path = Path::block(object.key.clone());
                    anchors.register_object(
                        path.clone(),
                        &object.key,
                        &object.key,
                        AnchorRole::BlockObject,
                    );
                    let props = RenderProps {
                        markers: markers_for_block(self.markers, &object.key),
                        focused: self.is_focused(&path),
                        path,
                    };
                    Some(renderers.render_block(object, &props))
                }
                _ => None,
            })
            .collect()
    }

    fn text_block(
        &self,
        block: &TextBlockNode,
        anchors: &mut AnchorRegistry,
        renderers: &mut dyn Renderers,
    ) -> RenderNode {
        let children = block
            .children
            .iter()
            .map(|child| match child.as_ref() {
                EngineNode::InlineObject(object) => {
                    let path = Path::child(block.key.clone(), object.key.clone());
                    anchors.register_object(
                        path.clone(),
                        &block.key,
                        &object.key,
                        AnchorRole::InlineObject,
                    );
                    let props = RenderProps {
                        markers: markers_for_child(self.markers, &block.key, &object.key),
                        focused: self.is_focused(&path),
                        path,
                    };
                    renderers.render_child(object, &props)
                }
                EngineNode::Text(leaf) => self.marked_leaf(block, leaf, anchors, renderers),
                _ => RenderNode::text(""),
            })
            .collect();
        let path = Path::block(block.key.clone());
        let props = RenderProps {
            markers: markers_for_block(self.markers, &block.key),
            focused: self.is_focused(&path),
            path,
        };
        renderers.render_text_block(block, BlockStyle::parse(&block.style), &props, children)
    }

    /// Wrap a leaf in its decorators (innermost first) and then its annotations.
    fn marked_leaf(
        &self,
        block: &TextBlockNode,
        leaf: &TextLeaf,
        anchors: &mut AnchorRegistry,
        renderers: &mut dyn Renderers,
    ) -> RenderNode {
        let mut node = leaf_node(leaf);
        for mark in leaf.marks.iter().filter(|m| self.config.is_decorator(m)) {
            node = renderers.render_decorator(mark, vec![node]);
        }
        for mark in &leaf.marks {
            let Some(definition) = block.mark_defs.iter().find(|def| def.key == *mark) else {
                continue;
            };
            let path = Path::mark_def(block.key.clone(), definition.key.clone());
            anchors.register_annotation(path.clone(), &block.key, &definition.key, &leaf.key);
            let props = RenderProps {
                markers: markers_for_annotation(self.markers, &block.key, &definition.key),
                focused: self.is_focused(&Path::child(block.key.clone(), leaf.key.clone())),
                path,
            };
            node = renderers.render_annotation(definition, &props, vec![node]);
        }
        node
    }
}
