//! External selection ⇄ engine range conversion.
//!
//! Keyed segments resolve by linear scan: the block first, then its
//! children, first match in document order wins.

use crate::engine::{EnginePoint, EngineRange};
use ptedit_core::models::block::find_block;
use ptedit_core::text::char_len;
use ptedit_core::{Block, Path, PathSegment, Point, Selection, Span};

fn span_len(span: &Span) -> usize {
    match span {
        Span::Text(span) => char_len(&span.text),
        Span::Inline(_) => 0,
    }
}

/// Resolve one external point; `None` when any part no longer exists.
pub fn to_engine_point(point: &Point, document: &[Block]) -> Option<EnginePoint> {
    let block_key = point.path.block_key()?;
    let (block_index, block) = find_block(document, block_key)?;
    match block {
        Block::Object(_) => (point.path.len() == 1 && point.offset == 0)
            .then(|| EnginePoint::new(vec![block_index], 0)),
        Block::Text(text_block) => {
            let (child_index, child) = match point.path.len() {
                1 => (0, text_block.children.first()?),
                _ => text_block.child(point.path.child_key()?)?,
            };
            (point.offset <= span_len(child))
                .then(|| EnginePoint::new(vec![block_index, child_index], point.offset))
        }
    }
}

/// Map an engine point back to document terms.
pub fn to_external_point(point: &EnginePoint, document: &[Block]) -> Option<Point> {
    let block = document.get(point.block())?;
    match (block, point.child()) {
        (Block::Object(object), None) => {
            (point.offset == 0).then(|| Point::new(Path::block(object.key.clone()), 0))
        }
        (Block::Text(text_block), Some(child_index)) => {
            let child = text_block.children.get(child_index)?;
            (point.offset <= span_len(child)).then(|| {
                Point::new(
                    Path::child(text_block.key.clone(), child.key().to_string()),
                    point.offset,
                )
            })
        }
        _ => None,
    }
}

/// Selection → engine range, or `None` when not representable.
pub fn to_engine_range(selection: &Selection, document: &[Block]) -> Option<EngineRange> {
    Some(EngineRange::new(
        to_engine_point(&selection.anchor, document)?,
        to_engine_point(&selection.focus, document)?,
    ))
}

/// Engine range → selection, or `None` when not representable.
pub fn to_external_selection(range: &EngineRange, document: &[Block]) -> Option<Selection> {
    Some(Selection::new(
        to_external_point(&range.anchor, document)?,
        to_external_point(&range.focus, document)?,
    ))
}

fn normalize_point(point: &Point, document: &[Block]) -> Option<Point> {
    let block_key = point.path.block_key()?;
    let (_, block) = find_block(document, block_key)?;
    match block {
        Block::Object(object) => Some(Point::new(Path::block(object.key.clone()), 0)),
        Block::Text(text_block) => {
            let resolved = point
                .path
                .child_key()
                .and_then(|key| text_block.child(key))
                .map(|(_, child)| (child, point.offset));
            let (child, offset) = match resolved {
                Some(found) => found,
                None if point.path.len() == 1 => (text_block.children.first()?, point.offset),
                None => {
                    let last = text_block.children.last()?;
                    (last, span_len(last))
                }
            };
            Some(Point::new(
                Path::child(text_block.key.clone(), child.key().to_string()),
                offset.min(span_len(child)),
            ))
        }
    }
}

/// Clamp a possibly stale selection onto the current document.
///
/// Missing blocks make the selection unrepresentable. Missing children clamp
/// to the end of the block's last child; offsets clamp to the leaf length.
pub fn normalize_selection(selection: &Selection, document: &[Block]) -> Option<Selection> {
    Some(Selection::new(
        normalize_point(&selection.anchor, document)?,
        normalize_point(&selection.focus, document)?,
    ))
}

/// Collapsed selection at the start of whatever `path` addresses.
pub fn selection_at_path(path: &Path, document: &[Block]) -> Option<Selection> {
    let point = Point::new(minimal_path(path, document)?, 0);
    Some(Selection::new(point.clone(), point))
}

/// Shorten `path` to the block or child it lives in.
pub fn minimal_path(path: &Path, document: &[Block]) -> Option<Path> {
    let block_key = path.block_key()?;
    let (_, block) = find_block(document, block_key)?;
    match (block, path.child_key()) {
        (Block::Text(text_block), Some(child_key)) => {
            text_block.child(child_key)?;
            Some(Path::child(block_key, child_key))
        }
        (Block::Text(text_block), None) => {
            let first = text_block.children.first()?;
            Some(Path::child(block_key, first.key().to_string()))
        }
        (Block::Object(_), _) => Some(Path::new(vec![PathSegment::key(block_key)])),
    }
}
