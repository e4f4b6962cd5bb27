//! Structural edits on the engine tree.
//!
//! Positions inside a text block are flat offsets: text leaves contribute
//! their char length, inline objects contribute one. Edits run in flat
//! offsets and convert back to leaf points afterwards, so leaf merging and
//! splitting never strands the selection.

use super::node::{EngineNode, TextBlockNode, TextLeaf};
use super::selection::{EnginePoint, EngineRange};
use ptedit_core::constants::DEFAULT_BLOCK_STYLE;
use ptedit_core::{KeyGenerator, MarkDef};
use std::rc::Rc;
use unicode_segmentation::UnicodeSegmentation;

/// Block index plus flat offset inside that block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct FlatPos {
    pub block: usize,
    pub offset: usize,
}

impl FlatPos {
    pub fn new(block: usize, offset: usize) -> Self {
        Self { block, offset }
    }
}

/// Granularity of backward/forward deletion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeleteUnit {
    Character,
    Word,
}

fn unit_len(node: &EngineNode) -> usize {
    match node {
        EngineNode::Text(leaf) => leaf.len_chars(),
        _ => 1,
    }
}

fn is_text(node: &EngineNode) -> bool {
    matches!(node, EngineNode::Text(_))
}

/// Flat length of a block; zero for object blocks.
pub fn block_len(node: &EngineNode) -> usize {
    node.children().iter().map(|child| unit_len(child)).sum()
}

fn empty_leaf(keys: &mut dyn KeyGenerator) -> Rc<EngineNode> {
    Rc::new(EngineNode::Text(TextLeaf::new(keys.next_key(), "", Vec::new())))
}

/// A fresh empty text block.
pub fn empty_block(keys: &mut dyn KeyGenerator) -> Rc<EngineNode> {
    let block_key = keys.next_key();
    let leaf_key = keys.next_key();
    Rc::new(EngineNode::TextBlock(TextBlockNode::empty(block_key, leaf_key)))
}

/// Copy-on-write access to block `index` when it is a text block.
pub fn text_block_mut(
    blocks: &mut [Rc<EngineNode>],
    index: usize,
) -> Option<&mut TextBlockNode> {
    let node = blocks.get_mut(index)?;
    node.as_text_block()?;
    Rc::make_mut(node).as_text_block_mut()
}

fn is_text_block(blocks: &[Rc<EngineNode>], index: usize) -> bool {
    blocks
        .get(index)
        .is_some_and(|node| node.as_text_block().is_some())
}

/// Leaf index and offset for a flat position, preferring the earlier leaf
/// at boundaries.
fn locate(children: &[Rc<EngineNode>], flat: usize) -> (usize, usize) {
    let mut remaining = flat;
    for (index, child) in children.iter().enumerate() {
        match child.as_ref() {
            EngineNode::Text(leaf) => {
                if remaining <= leaf.len_chars() {
                    return (index, remaining);
                }
                remaining -= leaf.len_chars();
            }
            _ => {
                if remaining == 0 {
                    return (index, 0);
                }
                remaining -= 1;
            }
        }
    }
    let last = children.len().saturating_sub(1);
    (last, children.last().map_or(0, |child| child.offset_len()))
}

/// Like [`locate`] but prefers the later leaf at boundaries.
fn locate_forward(children: &[Rc<EngineNode>], flat: usize) -> Option<(usize, usize)> {
    let mut remaining = flat;
    for (index, child) in children.iter().enumerate() {
        let len = unit_len(child);
        if remaining < len {
            return Some((index, remaining));
        }
        remaining -= len;
    }
    None
}

/// Index of the first child starting at or after `flat`.
fn boundary_index(children: &[Rc<EngineNode>], flat: usize) -> usize {
    let mut pos = 0;
    for (index, child) in children.iter().enumerate() {
        if pos >= flat {
            return index;
        }
        pos += unit_len(child);
    }
    children.len()
}

pub fn to_flat(blocks: &[Rc<EngineNode>], point: &EnginePoint) -> FlatPos {
    let block = point.block();
    let offset = match (blocks.get(block), point.child()) {
        (Some(node), Some(child)) => {
            node.children()
                .iter()
                .take(child)
                .map(|c| unit_len(c))
                .sum::<usize>()
                + point.offset
        }
        _ => 0,
    };
    FlatPos::new(block, offset)
}

pub fn to_point(blocks: &[Rc<EngineNode>], pos: FlatPos) -> EnginePoint {
    match blocks.get(pos.block).map(Rc::as_ref) {
        Some(EngineNode::TextBlock(block)) => {
            let (child, offset) = locate(&block.children, pos.offset);
            EnginePoint::new(vec![pos.block, child], offset)
        }
        _ => EnginePoint::new(vec![pos.block], 0),
    }
}

/// Ordered `(start, end)` flat positions of `range`.
pub fn flat_range(blocks: &[Rc<EngineNode>], range: &EngineRange) -> (FlatPos, FlatPos) {
    let (start, end) = range.ordered();
    (to_flat(blocks, start), to_flat(blocks, end))
}

pub fn collapsed_at(blocks: &[Rc<EngineNode>], pos: FlatPos) -> EngineRange {
    EngineRange::collapsed(to_point(blocks, pos))
}

pub fn range_between(blocks: &[Rc<EngineNode>], start: FlatPos, end: FlatPos) -> EngineRange {
    EngineRange::new(to_point(blocks, start), to_point(blocks, end))
}

/// Caret at the end of block `index`.
pub fn end_of(blocks: &[Rc<EngineNode>], index: usize) -> FlatPos {
    FlatPos::new(index, blocks.get(index).map_or(0, |node| block_len(node)))
}

/// Merge equal-mark neighbours, drop redundant empty leaves and pad inline
/// objects with text so every inline has a text neighbour on both sides.
pub fn normalize_block(block: &mut TextBlockNode, keys: &mut dyn KeyGenerator) {
    let mut merged: Vec<Rc<EngineNode>> = Vec::with_capacity(block.children.len());
    for child in block.children.drain(..) {
        let Some(next) = child.as_text() else {
            merged.push(child);
            continue;
        };
        let Some(prev) = merged.last_mut().filter(|prev| is_text(prev)) else {
            merged.push(child);
            continue;
        };
        if next.len_chars() == 0 {
            continue;
        }
        if prev.offset_len() == 0 {
            *prev = child;
            continue;
        }
        let same_marks = prev.as_text().is_some_and(|leaf| leaf.marks == next.marks);
        if !same_marks {
            merged.push(child);
            continue;
        }
        if let EngineNode::Text(leaf) = Rc::make_mut(prev) {
            leaf.text.append(next.text.clone());
        }
    }

    let mut padded: Vec<Rc<EngineNode>> = Vec::with_capacity(merged.len() + 2);
    for child in merged {
        let needs_text_before =
            !is_text(&child) && padded.last().map_or(true, |prev| !is_text(prev));
        if needs_text_before {
            padded.push(empty_leaf(keys));
        }
        padded.push(child);
    }
    if padded.last().map_or(true, |last| !is_text(last)) {
        padded.push(empty_leaf(keys));
    }
    block.children = padded;
    block.prune_mark_defs();
}

/// Ensure a leaf boundary at `flat`, splitting a text leaf when needed.
fn split_at(block: &mut TextBlockNode, flat: usize, keys: &mut dyn KeyGenerator) {
    let mut pos = 0;
    for index in 0..block.children.len() {
        let len = unit_len(&block.children[index]);
        if flat > pos && flat < pos + len {
            let right = match Rc::make_mut(&mut block.children[index]) {
                EngineNode::Text(leaf) => Some(TextLeaf {
                    key: keys.next_key(),
                    text: leaf.text.split_off(flat - pos),
                    marks: leaf.marks.clone(),
                }),
                _ => None,
            };
            if let Some(right) = right {
                block
                    .children
                    .insert(index + 1, Rc::new(EngineNode::Text(right)));
            }
            return;
        }
        pos += len;
    }
}

fn remove_within(block: &mut TextBlockNode, from: usize, to: usize, keys: &mut dyn KeyGenerator) {
    if from >= to {
        return;
    }
    split_at(block, from, keys);
    split_at(block, to, keys);
    let mut pos = 0;
    block.children.retain(|child| {
        let len = unit_len(child);
        let inside = len > 0 && pos >= from && pos + len <= to;
        pos += len;
        !inside
    });
}

/// Keep at least one editable line.
pub fn ensure_line(blocks: &mut Vec<Rc<EngineNode>>, keys: &mut dyn KeyGenerator) {
    if blocks.is_empty() {
        blocks.push(empty_block(keys));
    }
}

/// Delete everything between `start` and `end`, returning the caret.
pub fn delete_range(
    blocks: &mut Vec<Rc<EngineNode>>,
    start: FlatPos,
    end: FlatPos,
    keys: &mut dyn KeyGenerator,
) -> FlatPos {
    if start >= end {
        return start;
    }
    if start.block == end.block {
        if let Some(block) = text_block_mut(blocks, start.block) {
            remove_within(block, start.offset, end.offset, keys);
            normalize_block(block, keys);
        }
        return start;
    }

    let start_text = is_text_block(blocks, start.block);
    let end_text = is_text_block(blocks, end.block);
    if let Some(block) = text_block_mut(blocks, end.block) {
        remove_within(block, 0, end.offset, keys);
        normalize_block(block, keys);
    }
    if let Some(block) = text_block_mut(blocks, start.block) {
        let len = block.children.iter().map(|c| unit_len(c)).sum();
        remove_within(block, start.offset, len, keys);
    }
    if start_text && end_text {
        let tail = blocks
            .get(end.block)
            .map(|node| node.children().to_vec())
            .unwrap_or_default();
        let tail_defs = blocks
            .get(end.block)
            .and_then(|node| node.as_text_block())
            .map(|node| node.mark_defs.clone())
            .unwrap_or_default();
        if let Some(block) = text_block_mut(blocks, start.block) {
            block.children.extend(tail);
            merge_mark_defs(&mut block.mark_defs, tail_defs);
        }
    }
    if let Some(block) = text_block_mut(blocks, start.block) {
        normalize_block(block, keys);
    }

    let first = if start_text { start.block + 1 } else { start.block };
    let last = if end_text && !start_text {
        end.block
    } else {
        end.block + 1
    };
    let last = last.min(blocks.len());
    if first < last {
        blocks.drain(first..last);
    }
    ensure_line(blocks, keys);
    if start_text {
        start
    } else {
        FlatPos::new(start.block.min(blocks.len() - 1), 0)
    }
}

fn merge_mark_defs(target: &mut Vec<MarkDef>, incoming: Vec<MarkDef>) {
    for def in incoming {
        if !target.iter().any(|existing| existing.key == def.key) {
            target.push(def);
        }
    }
}

/// Insert `text` at `pos`.
///
/// `marks` forces the marks of the inserted run; `None` inherits the marks
/// of the leaf at the caret.
pub fn insert_text(
    blocks: &mut [Rc<EngineNode>],
    pos: FlatPos,
    text: &str,
    marks: Option<&[String]>,
    keys: &mut dyn KeyGenerator,
) -> FlatPos {
    if text.is_empty() {
        return pos;
    }
    let Some(block) = text_block_mut(blocks, pos.block) else {
        return pos;
    };
    let (index, offset) = locate(&block.children, pos.offset);
    let leaf_marks = block
        .children
        .get(index)
        .and_then(|child| child.as_text())
        .map(|leaf| leaf.marks.clone());
    let inherit = match (&leaf_marks, marks) {
        (Some(_), None) => true,
        (Some(current), Some(wanted)) => current.as_slice() == wanted,
        (None, _) => false,
    };
    if inherit {
        if let EngineNode::Text(leaf) = Rc::make_mut(&mut block.children[index]) {
            leaf.text.insert(offset, text);
        }
    } else {
        split_at(block, pos.offset, keys);
        let at = boundary_index(&block.children, pos.offset);
        let leaf = TextLeaf::new(
            keys.next_key(),
            text,
            marks.map(<[String]>::to_vec).unwrap_or_default(),
        );
        block.children.insert(at, Rc::new(EngineNode::Text(leaf)));
    }
    normalize_block(block, keys);
    FlatPos::new(pos.block, pos.offset + text.chars().count())
}

/// Insert child nodes (leaves or inline objects) at `pos`.
pub fn insert_children(
    blocks: &mut [Rc<EngineNode>],
    pos: FlatPos,
    nodes: Vec<Rc<EngineNode>>,
    mark_defs: Vec<MarkDef>,
    keys: &mut dyn KeyGenerator,
) -> FlatPos {
    let added: usize = nodes.iter().map(|node| unit_len(node)).sum();
    let Some(block) = text_block_mut(blocks, pos.block) else {
        return pos;
    };
    split_at(block, pos.offset, keys);
    let at = boundary_index(&block.children, pos.offset);
    let tail = block.children.split_off(at);
    block.children.extend(nodes);
    block.children.extend(tail);
    merge_mark_defs(&mut block.mark_defs, mark_defs);
    normalize_block(block, keys);
    FlatPos::new(pos.block, pos.offset + added)
}

/// Split the block at `pos`; the caret moves to the start of the new block.
pub fn split_block(
    blocks: &mut Vec<Rc<EngineNode>>,
    pos: FlatPos,
    keys: &mut dyn KeyGenerator,
) -> FlatPos {
    if pos.block >= blocks.len() {
        return pos;
    }
    let right = match text_block_mut(blocks, pos.block) {
        Some(block) => {
            split_at(block, pos.offset, keys);
            let at = boundary_index(&block.children, pos.offset);
            let tail: Vec<_> = block.children.drain(at..).collect();
            let mut right = TextBlockNode {
                key: keys.next_key(),
                style: block.style.clone(),
                list_item: block.list_item.clone(),
                level: block.level,
                mark_defs: block.mark_defs.clone(),
                children: tail,
            };
            normalize_block(block, keys);
            normalize_block(&mut right, keys);
            Rc::new(EngineNode::TextBlock(right))
        }
        None => empty_block(keys),
    };
    blocks.insert(pos.block + 1, right);
    FlatPos::new(pos.block + 1, 0)
}

#[derive(Clone, Copy)]
enum Slot {
    Missing,
    EmptyText,
    Text(usize),
    Object,
}

/// Insert whole blocks relative to `pos`.
///
/// An empty text block at `pos` is replaced; a caret inside a text block
/// splits it; otherwise the blocks land after the focus block (or before it
/// when the caret sits at offset zero).
///
/// # Returns
/// Index of the last inserted block, or `None` when `nodes` is empty.
pub fn insert_blocks(
    blocks: &mut Vec<Rc<EngineNode>>,
    pos: FlatPos,
    nodes: Vec<Rc<EngineNode>>,
    keys: &mut dyn KeyGenerator,
) -> Option<usize> {
    if nodes.is_empty() {
        return None;
    }
    let count = nodes.len();
    let slot = match blocks.get(pos.block) {
        None => Slot::Missing,
        Some(node) if node.is_empty_text_block() => Slot::EmptyText,
        Some(node) if node.as_text_block().is_some() => Slot::Text(block_len(node)),
        Some(_) => Slot::Object,
    };
    let at = match slot {
        Slot::Missing => blocks.len(),
        Slot::EmptyText => {
            blocks.remove(pos.block);
            pos.block
        }
        Slot::Text(_) if pos.offset == 0 => pos.block,
        Slot::Text(len) if pos.offset >= len => pos.block + 1,
        Slot::Text(_) => split_block(blocks, pos, keys).block,
        Slot::Object => pos.block + 1,
    };
    let tail = blocks.split_off(at);
    blocks.extend(nodes);
    blocks.extend(tail);
    Some(at + count - 1)
}

/// Join block `first` with the block after it.
///
/// Two text blocks merge; an object block on either side is removed
/// instead. Returns the caret, or `None` when there is nothing to join.
pub fn join_blocks(
    blocks: &mut Vec<Rc<EngineNode>>,
    first: usize,
    keys: &mut dyn KeyGenerator,
) -> Option<FlatPos> {
    if first + 1 >= blocks.len() {
        return None;
    }
    match (is_text_block(blocks, first), is_text_block(blocks, first + 1)) {
        (true, true) => {
            let caret = end_of(blocks, first);
            let removed = blocks.remove(first + 1);
            let block = text_block_mut(blocks, first)?;
            block.children.extend(removed.children().iter().cloned());
            if let Some(node) = removed.as_text_block() {
                merge_mark_defs(&mut block.mark_defs, node.mark_defs.clone());
            }
            normalize_block(block, keys);
            Some(caret)
        }
        (false, _) => {
            blocks.remove(first);
            Some(FlatPos::new(first, 0))
        }
        (true, false) => {
            blocks.remove(first + 1);
            Some(end_of(blocks, first))
        }
    }
}

/// Remove the object block at `index`, returning the caret.
pub fn remove_block(
    blocks: &mut Vec<Rc<EngineNode>>,
    index: usize,
    keys: &mut dyn KeyGenerator,
) -> FlatPos {
    if index < blocks.len() {
        blocks.remove(index);
    }
    ensure_line(blocks, keys);
    match index.checked_sub(1) {
        Some(previous) => end_of(blocks, previous.min(blocks.len() - 1)),
        None => FlatPos::new(0, 0),
    }
}

fn backward_distance(block: &TextBlockNode, flat: usize, unit: DeleteUnit) -> usize {
    let (index, offset) = locate(&block.children, flat);
    let leaf = match block.children.get(index).and_then(|child| child.as_text()) {
        Some(leaf) if offset > 0 => leaf,
        _ => return 1,
    };
    let prefix = leaf.text.slice(..offset).to_string();
    match unit {
        DeleteUnit::Character => prefix
            .graphemes(true)
            .next_back()
            .map_or(1, |g| g.chars().count()),
        DeleteUnit::Word => {
            let start = prefix
                .split_word_bound_indices()
                .rev()
                .find(|(_, segment)| !segment.trim().is_empty())
                .map_or(0, |(byte, _)| byte);
            prefix[start..].chars().count()
        }
    }
}

fn forward_distance(block: &TextBlockNode, flat: usize, unit: DeleteUnit) -> usize {
    let Some((index, offset)) = locate_forward(&block.children, flat) else {
        return 0;
    };
    let Some(leaf) = block.children.get(index).and_then(|child| child.as_text()) else {
        return 1;
    };
    let suffix = leaf.text.slice(offset..).to_string();
    match unit {
        DeleteUnit::Character => suffix
            .graphemes(true)
            .next()
            .map_or(1, |g| g.chars().count()),
        DeleteUnit::Word => {
            let end = suffix
                .split_word_bound_indices()
                .find(|(_, segment)| !segment.trim().is_empty())
                .map_or(suffix.len(), |(byte, segment)| byte + segment.len());
            suffix[..end].chars().count()
        }
    }
}

/// Backspace at a collapsed caret.
pub fn delete_backward(
    blocks: &mut Vec<Rc<EngineNode>>,
    pos: FlatPos,
    unit: DeleteUnit,
    keys: &mut dyn KeyGenerator,
) -> FlatPos {
    let Some(node) = blocks.get(pos.block) else {
        return pos;
    };
    let Some(block) = node.as_text_block() else {
        return remove_block(blocks, pos.block, keys);
    };
    if pos.offset == 0 {
        return match pos.block.checked_sub(1) {
            Some(previous) => join_blocks(blocks, previous, keys).unwrap_or(pos),
            None => pos,
        };
    }
    let distance = backward_distance(block, pos.offset, unit).min(pos.offset);
    let start = FlatPos::new(pos.block, pos.offset - distance);
    delete_range(blocks, start, pos, keys)
}

/// Forward delete at a collapsed caret.
pub fn delete_forward(
    blocks: &mut Vec<Rc<EngineNode>>,
    pos: FlatPos,
    unit: DeleteUnit,
    keys: &mut dyn KeyGenerator,
) -> FlatPos {
    let Some(node) = blocks.get(pos.block) else {
        return pos;
    };
    let Some(block) = node.as_text_block() else {
        let caret = remove_block(blocks, pos.block, keys);
        return if pos.block < blocks.len() {
            FlatPos::new(pos.block, 0)
        } else {
            caret
        };
    };
    let len = block_len(node);
    if pos.offset >= len {
        return join_blocks(blocks, pos.block, keys).unwrap_or(pos);
    }
    let distance = forward_distance(block, pos.offset, unit).min(len - pos.offset);
    let end = FlatPos::new(pos.block, pos.offset + distance);
    delete_range(blocks, pos, end, keys)
}

/// Per text block in `[start, end]`, the flat sub-range it covers.
fn block_spans(
    blocks: &[Rc<EngineNode>],
    start: FlatPos,
    end: FlatPos,
) -> Vec<(usize, usize, usize)> {
    (start.block..=end.block.min(blocks.len().saturating_sub(1)))
        .filter(|index| is_text_block(blocks, *index))
        .map(|index| {
            let from = if index == start.block { start.offset } else { 0 };
            let to = if index == end.block {
                end.offset
            } else {
                block_len(&blocks[index])
            };
            (index, from, to)
        })
        .collect()
}

fn apply_mark(
    block: &mut TextBlockNode,
    from: usize,
    to: usize,
    mark: &str,
    add: bool,
    keys: &mut dyn KeyGenerator,
) {
    split_at(block, from, keys);
    split_at(block, to, keys);
    let mut pos = 0;
    for child in block.children.iter_mut() {
        let len = unit_len(child);
        let inside = len > 0 && pos >= from && pos + len <= to;
        pos += len;
        let needs_change = child
            .as_text()
            .is_some_and(|leaf| leaf.marks.iter().any(|m| m == mark) != add);
        if !inside || !needs_change {
            continue;
        }
        if let EngineNode::Text(leaf) = Rc::make_mut(child) {
            if add {
                leaf.marks.push(mark.to_string());
            } else {
                leaf.marks.retain(|m| m != mark);
            }
        }
    }
    normalize_block(block, keys);
}

/// Add or remove `mark` on every text leaf inside `[start, end)`.
pub fn set_mark(
    blocks: &mut [Rc<EngineNode>],
    start: FlatPos,
    end: FlatPos,
    mark: &str,
    add: bool,
    keys: &mut dyn KeyGenerator,
) {
    for (index, from, to) in block_spans(blocks, start, end) {
        if from >= to {
            continue;
        }
        if let Some(block) = text_block_mut(blocks, index) {
            apply_mark(block, from, to, mark, add, keys);
        }
    }
}

/// Text leaves covering `[from, to)`, or the leaf at the caret when empty.
fn leaves_in(block: &TextBlockNode, from: usize, to: usize) -> Vec<&TextLeaf> {
    if from >= to {
        let (index, _) = locate(&block.children, from);
        return block
            .children
            .get(index)
            .and_then(|child| child.as_text())
            .into_iter()
            .collect();
    }
    let mut pos = 0;
    let mut leaves = Vec::new();
    for child in &block.children {
        let len = unit_len(child);
        if len > 0 && pos < to && pos + len > from {
            if let Some(leaf) = child.as_text() {
                leaves.push(leaf);
            }
        }
        pos += len;
    }
    leaves
}

/// Marks of every text leaf the range touches.
pub fn marks_in(blocks: &[Rc<EngineNode>], start: FlatPos, end: FlatPos) -> Vec<Vec<String>> {
    let collapsed = start == end;
    block_spans(blocks, start, end)
        .into_iter()
        .filter(|(_, from, to)| collapsed || from < to)
        .filter_map(|(index, from, to)| {
            let block = blocks[index].as_text_block()?;
            Some(
                leaves_in(block, from, to)
                    .into_iter()
                    .map(|leaf| leaf.marks.clone())
                    .collect::<Vec<_>>(),
            )
        })
        .flatten()
        .collect()
}

/// Attach a new annotation of `type_name` to the text inside `[start, end)`.
///
/// # Returns
/// `(block index, markDef key)` for every block that received a definition.
pub fn add_annotation(
    blocks: &mut [Rc<EngineNode>],
    start: FlatPos,
    end: FlatPos,
    definition: &MarkDef,
    keys: &mut dyn KeyGenerator,
) -> Vec<(usize, String)> {
    let mut added = Vec::new();
    for (index, from, to) in block_spans(blocks, start, end) {
        if from >= to {
            continue;
        }
        let Some(block) = text_block_mut(blocks, index) else {
            continue;
        };
        let mut def = definition.clone();
        def.key = keys.next_key();
        block.mark_defs.push(def.clone());
        apply_mark(block, from, to, &def.key, true, keys);
        added.push((index, def.key));
    }
    added
}

/// Annotation definitions referenced by text in `[start, end]`.
pub fn annotations_in(
    blocks: &[Rc<EngineNode>],
    start: FlatPos,
    end: FlatPos,
) -> Vec<(usize, MarkDef)> {
    let collapsed = start == end;
    let mut found: Vec<(usize, MarkDef)> = Vec::new();
    for (index, from, to) in block_spans(blocks, start, end) {
        if !collapsed && from >= to {
            continue;
        }
        let Some(block) = blocks[index].as_text_block() else {
            continue;
        };
        for leaf in leaves_in(block, from, to) {
            for mark in &leaf.marks {
                let Some(def) = block.mark_defs.iter().find(|def| def.key == *mark) else {
                    continue;
                };
                if !found.iter().any(|(_, seen)| seen.key == def.key) {
                    found.push((index, def.clone()));
                }
            }
        }
    }
    found
}

/// Remove annotations of `type_name` touched by `[start, end]`.
///
/// The whole annotation goes: its mark is stripped from every leaf of the
/// block and the orphaned definition is pruned.
pub fn remove_annotation(
    blocks: &mut [Rc<EngineNode>],
    start: FlatPos,
    end: FlatPos,
    type_name: &str,
    keys: &mut dyn KeyGenerator,
) -> usize {
    let targets: Vec<(usize, String)> = annotations_in(blocks, start, end)
        .into_iter()
        .filter(|(_, def)| def.type_name == type_name)
        .map(|(index, def)| (index, def.key))
        .collect();
    for (index, key) in &targets {
        if let Some(block) = text_block_mut(blocks, *index) {
            let len = block.children.iter().map(|c| unit_len(c)).sum();
            apply_mark(block, 0, len, key, false, keys);
        }
    }
    targets.len()
}

/// Toggle `style` on every text block in `[start, end]`.
///
/// When all of them already carry it they fall back to the default style.
pub fn toggle_block_style(
    blocks: &mut [Rc<EngineNode>],
    start: FlatPos,
    end: FlatPos,
    style: &str,
) {
    let targets: Vec<usize> = (start.block..=end.block)
        .filter(|index| is_text_block(blocks, *index))
        .collect();
    let all_set = targets.iter().all(|index| {
        blocks[*index]
            .as_text_block()
            .is_some_and(|block| block.style == style)
    });
    let next = if all_set { DEFAULT_BLOCK_STYLE } else { style };
    for index in targets {
        let unchanged = blocks[index]
            .as_text_block()
            .is_some_and(|block| block.style == next);
        if unchanged {
            continue;
        }
        if let Some(block) = text_block_mut(blocks, index) {
            block.style = next.to_string();
        }
    }
}

/// Remove whole children touched by `[start, end]` (the child at the caret
/// when collapsed).
pub fn remove_children(
    blocks: &mut [Rc<EngineNode>],
    start: FlatPos,
    end: FlatPos,
    keys: &mut dyn KeyGenerator,
) {
    let collapsed = start == end;
    for (index, from, to) in block_spans(blocks, start, end) {
        let Some(block) = text_block_mut(blocks, index) else {
            continue;
        };
        let doomed: Vec<usize> = if collapsed {
            locate_forward(&block.children, from)
                .map(|(child, _)| child)
                .into_iter()
                .collect()
        } else {
            let mut pos = 0;
            let mut hit = Vec::new();
            for (child_index, child) in block.children.iter().enumerate() {
                let len = unit_len(child);
                if len > 0 && pos < to && pos + len > from {
                    hit.push(child_index);
                }
                pos += len;
            }
            hit
        };
        for child_index in doomed.into_iter().rev() {
            block.children.remove(child_index);
        }
        normalize_block(block, keys);
    }
}
