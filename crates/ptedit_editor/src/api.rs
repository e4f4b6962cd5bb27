//! Editable API: the programmatic operations surface over the engine.
//!
//! Everything here speaks document terms (paths, selections, blocks).
//! Mutations apply immediately and bump the engine revision; the surface
//! turns that into patches on its next flush.

use crate::engine::transforms::{self, FlatPos};
use crate::engine::{DeleteUnit, EditIntent, Engine, EngineNode, EngineRange};
use crate::mapping::range::{selection_at_path, to_engine_range, to_external_selection};
use crate::mapping::value::{block_to_node, from_engine_nodes, span_to_node};
use ptedit_core::models::block::document_to_value;
use ptedit_core::models::path::resolve_value;
use ptedit_core::{
    Block, Document, EditorConfig, InlineObject, KeyGenerator, MarkDef, Path, Selection,
};
use serde_json::{Map, Value};
use std::rc::Rc;
use std::time::Instant;
use tracing::{debug, warn};

const LOG_TARGET: &str = "ptedit_editor::api";

/// What [`EditableApi::delete`] removes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeleteMode {
    /// The selected content only.
    #[default]
    Selected,
    /// Every block the selection touches.
    Blocks,
    /// Every child the selection touches.
    Children,
}

/// Where a freshly added annotation landed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotationPaths {
    pub mark_def_path: Path,
    pub span_path: Path,
    pub block_path: Path,
}

/// Borrowed operations surface over an [`Engine`].
pub struct EditableApi<'a> {
    engine: &'a mut Engine,
    keys: &'a mut dyn KeyGenerator,
    config: &'a EditorConfig,
    now: Instant,
}

/// Re-express `[start, end]` after an edit, keeping the original direction.
fn restore_range(
    blocks: &[Rc<EngineNode>],
    original: Option<&EngineRange>,
    start: FlatPos,
    end: FlatPos,
) -> EngineRange {
    if original.is_some_and(EngineRange::is_backward) {
        transforms::range_between(blocks, end, start)
    } else {
        transforms::range_between(blocks, start, end)
    }
}

impl<'a> EditableApi<'a> {
    pub fn new(
        engine: &'a mut Engine,
        keys: &'a mut dyn KeyGenerator,
        config: &'a EditorConfig,
        now: Instant,
    ) -> Self {
        Self {
            engine,
            keys,
            config,
            now,
        }
    }

    fn document(&self) -> Document {
        from_engine_nodes(self.engine.blocks())
    }

    fn caret_range(&self) -> Option<(FlatPos, FlatPos)> {
        self.engine
            .selection()
            .map(|range| transforms::flat_range(self.engine.blocks(), range))
    }

    fn caret_in_text_block(&self) -> bool {
        self.caret_range().is_some_and(|(start, _)| {
            self.engine
                .block(start.block)
                .is_some_and(|node| node.as_text_block().is_some())
        })
    }

    /// Delete the selected range, then run `f` at the caret it leaves.
    fn replace_selection<F>(&mut self, intent: EditIntent, f: F) -> bool
    where
        F: FnOnce(&mut Vec<Rc<EngineNode>>, FlatPos, &mut dyn KeyGenerator) -> FlatPos,
    {
        let Some((start, end)) = self.caret_range() else {
            debug!(target: LOG_TARGET, ?intent, "no selection; edit ignored");
            return false;
        };
        let keys = &mut *self.keys;
        self.engine.edit(intent, self.now, |txn| {
            let caret = transforms::delete_range(txn.blocks, start, end, keys);
            let caret = f(txn.blocks, caret, keys);
            txn.set_selection(Some(transforms::collapsed_at(txn.blocks, caret)));
        });
        true
    }

    /// Apply an edit that keeps the selection extent (formatting).
    fn edit_in_place<R>(
        &mut self,
        f: impl FnOnce(&mut Vec<Rc<EngineNode>>, FlatPos, FlatPos, &mut dyn KeyGenerator) -> R,
    ) -> Option<R> {
        let (start, end) = self.caret_range()?;
        let original = self.engine.selection().cloned();
        let keys = &mut *self.keys;
        Some(self.engine.edit(EditIntent::Format, self.now, |txn| {
            let result = f(txn.blocks, start, end, keys);
            txn.set_selection(Some(restore_range(txn.blocks, original.as_ref(), start, end)));
            result
        }))
    }

    /// Select `selection` when it resolves against the current value.
    ///
    /// # Returns
    /// `false` (and a warning) when any part of it no longer exists.
    pub fn select(&mut self, selection: &Selection) -> bool {
        let document = self.document();
        match to_engine_range(selection, &document) {
            Some(range) => {
                self.engine.set_selection(Some(range));
                true
            }
            None => {
                warn!(
                    target: LOG_TARGET,
                    anchor = %selection.anchor.path,
                    focus = %selection.focus.path,
                    "selection is not representable; ignoring"
                );
                false
            }
        }
    }

    /// Collapse the selection at the start of whatever `path` addresses.
    pub fn select_path(&mut self, path: &Path) -> bool {
        let document = self.document();
        match selection_at_path(path, &document) {
            Some(selection) => self.select(&selection),
            None => {
                warn!(target: LOG_TARGET, %path, "path does not resolve; ignoring select");
                false
            }
        }
    }

    pub fn deselect(&mut self) {
        self.engine.set_selection(None);
    }

    pub fn focus(&mut self) {
        self.engine.set_focused(true);
    }

    pub fn blur(&mut self) {
        self.engine.set_focused(false);
    }

    pub fn is_focused(&self) -> bool {
        self.engine.is_focused()
    }

    pub fn get_selection(&self) -> Option<Selection> {
        let range = self.engine.selection()?;
        to_external_selection(range, &self.document())
    }

    /// Path of the selection focus, if any.
    pub fn focus_path(&self) -> Option<Path> {
        self.get_selection().map(|selection| selection.focus.path)
    }

    /// The document, or `None` while the editor holds only its placeholder line.
    pub fn get_value(&self) -> Option<Document> {
        if self.engine.is_placeholder_only() {
            None
        } else {
            Some(self.document())
        }
    }

    /// Type `text` at the selection, replacing any selected content.
    pub fn insert_text(&mut self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        let marks = self.engine.pending_marks().map(<[String]>::to_vec);
        let applied = self.replace_selection(
            EditIntent::Typing,
            |blocks, caret, keys| {
                let on_object = blocks
                    .get(caret.block)
                    .is_some_and(|node| node.as_text_block().is_none());
                let caret = if on_object {
                    transforms::split_block(blocks, caret, keys)
                } else {
                    caret
                };
                transforms::insert_text(blocks, caret, text, marks.as_deref(), keys)
            },
        );
        if applied {
            self.engine.set_pending_marks(None);
        }
        applied
    }

    /// Insert `block` at the selection; an empty focus block is replaced.
    ///
    /// # Returns
    /// Path of the inserted block.
    pub fn insert_block(&mut self, block: Block) -> Option<Path> {
        let path = Path::block(block.key().to_string());
        self.insert_blocks(vec![block], EditIntent::Structure)
            .then_some(path)
    }

    /// Insert whole blocks at the selection, or append them when there is none.
    pub fn insert_blocks(&mut self, blocks: Vec<Block>, intent: EditIntent) -> bool {
        if blocks.is_empty() {
            return false;
        }
        let nodes: Vec<_> = blocks.iter().map(block_to_node).collect();
        let (start, end) = self.caret_range().unwrap_or_else(|| {
            let at = if self.engine.is_placeholder_only() {
                FlatPos::new(0, 0)
            } else {
                FlatPos::new(self.engine.blocks().len(), 0)
            };
            (at, at)
        });
        let keys = &mut *self.keys;
        self.engine.edit(intent, self.now, |txn| {
            let caret = transforms::delete_range(txn.blocks, start, end, keys);
            if let Some(last) = transforms::insert_blocks(txn.blocks, caret, nodes, keys) {
                let end = transforms::end_of(txn.blocks, last);
                txn.set_selection(Some(transforms::collapsed_at(txn.blocks, end)));
            }
        });
        true
    }

    /// Insert an inline object at the caret.
    ///
    /// # Returns
    /// Path of the inserted child, or `None` when the caret is not in a text block.
    pub fn insert_child(&mut self, child: InlineObject) -> Option<Path> {
        let (start, _) = self.caret_range()?;
        let Some(EngineNode::TextBlock(block)) = self.engine.block(start.block) else {
            warn!(target: LOG_TARGET, child = %child.key, "inline objects need a text block caret");
            return None;
        };
        let path = Path::child(block.key.clone(), child.key.clone());
        let node = Rc::new(EngineNode::InlineObject(child));
        self.replace_selection(
            EditIntent::Structure,
            |blocks, caret, keys| {
                transforms::insert_children(blocks, caret, vec![node], Vec::new(), keys)
            },
        );
        Some(path)
    }

    /// Insert a pasted fragment: one text block splices inline, anything
    /// else lands as whole blocks.
    pub fn insert_fragment(&mut self, fragment: Vec<Block>) -> bool {
        let inline = match fragment.as_slice() {
            [Block::Text(block)] => Some((
                block.children.iter().map(span_to_node).collect::<Vec<_>>(),
                block.mark_defs.clone(),
            )),
            _ => None,
        };
        match inline.filter(|_| self.caret_in_text_block()) {
            Some((nodes, defs)) => self.replace_selection(
                EditIntent::Paste,
                |blocks, caret, keys| {
                    transforms::insert_children(blocks, caret, nodes, defs, keys)
                },
            ),
            None => self.insert_blocks(fragment, EditIntent::Paste),
        }
    }

    /// Delete content addressed by `selection` (the current selection when `None`).
    pub fn delete(&mut self, selection: Option<&Selection>, mode: DeleteMode) -> bool {
        let range = match selection {
            Some(selection) => match to_engine_range(selection, &self.document()) {
                Some(range) => range,
                None => {
                    warn!(
                        target: LOG_TARGET,
                        focus = %selection.focus.path,
                        "delete target does not resolve"
                    );
                    return false;
                }
            },
            None => match self.engine.selection() {
                Some(range) => range.clone(),
                None => return false,
            },
        };
        let (start, end) = transforms::flat_range(self.engine.blocks(), &range);
        let keys = &mut *self.keys;
        self.engine.edit(EditIntent::Delete, self.now, |txn| {
            let caret = match mode {
                DeleteMode::Selected => transforms::delete_range(txn.blocks, start, end, keys),
                DeleteMode::Blocks => {
                    let last = end.block.min(txn.blocks.len().saturating_sub(1));
                    if start.block <= last && start.block < txn.blocks.len() {
                        txn.blocks.drain(start.block..=last);
                    }
                    transforms::ensure_line(txn.blocks, keys);
                    FlatPos::new(start.block.min(txn.blocks.len() - 1), 0)
                }
                DeleteMode::Children => {
                    transforms::remove_children(txn.blocks, start, end, keys);
                    start
                }
            };
            txn.set_selection(Some(transforms::collapsed_at(txn.blocks, caret)));
        });
        true
    }

    fn delete_directional(&mut self, unit: DeleteUnit, backward: bool) -> bool {
        let Some((start, end)) = self.caret_range() else {
            return false;
        };
        let keys = &mut *self.keys;
        self.engine.edit(EditIntent::Delete, self.now, |txn| {
            let caret = if start != end {
                transforms::delete_range(txn.blocks, start, end, keys)
            } else if backward {
                transforms::delete_backward(txn.blocks, start, unit, keys)
            } else {
                transforms::delete_forward(txn.blocks, start, unit, keys)
            };
            txn.set_selection(Some(transforms::collapsed_at(txn.blocks, caret)));
        });
        true
    }

    pub fn delete_backward(&mut self, unit: DeleteUnit) -> bool {
        self.delete_directional(unit, true)
    }

    pub fn delete_forward(&mut self, unit: DeleteUnit) -> bool {
        self.delete_directional(unit, false)
    }

    /// Split the focus block at the caret.
    pub fn split_block(&mut self) -> bool {
        self.replace_selection(
            EditIntent::Structure,
            |blocks, caret, keys| transforms::split_block(blocks, caret, keys),
        )
    }

    /// Whether `mark` applies to the whole selection (or to the next typed text).
    pub fn is_mark_active(&self, mark: &str) -> bool {
        let Some((start, end)) = self.caret_range() else {
            return false;
        };
        if start == end {
            if let Some(pending) = self.engine.pending_marks() {
                return pending.iter().any(|m| m == mark);
            }
        }
        let marks = transforms::marks_in(self.engine.blocks(), start, end);
        !marks.is_empty() && marks.iter().all(|leaf| leaf.iter().any(|m| m == mark))
    }

    fn set_mark(&mut self, mark: &str, add: bool) -> bool {
        if !self.config.is_decorator(mark) {
            warn!(target: LOG_TARGET, mark, "not a configured decorator; ignoring");
            return false;
        }
        let Some((start, end)) = self.caret_range() else {
            return false;
        };
        if start == end {
            let mut marks = match self.engine.pending_marks() {
                Some(pending) => pending.to_vec(),
                None => transforms::marks_in(self.engine.blocks(), start, end)
                    .into_iter()
                    .next()
                    .unwrap_or_default(),
            };
            marks.retain(|m| m != mark);
            if add {
                marks.push(mark.to_string());
            }
            self.engine.set_pending_marks(Some(marks));
            return true;
        }
        self.edit_in_place(|blocks, start, end, keys| {
            transforms::set_mark(blocks, start, end, mark, add, keys)
        })
        .is_some()
    }

    pub fn add_mark(&mut self, mark: &str) -> bool {
        self.set_mark(mark, true)
    }

    pub fn remove_mark(&mut self, mark: &str) -> bool {
        self.set_mark(mark, false)
    }

    pub fn toggle_mark(&mut self, mark: &str) -> bool {
        let active = self.is_mark_active(mark);
        self.set_mark(mark, !active)
    }

    /// Annotate the selected text with a new `type_name` definition.
    ///
    /// # Returns
    /// Paths of the first definition created, or `None` for a collapsed or
    /// missing selection.
    pub fn add_annotation(
        &mut self,
        type_name: &str,
        fields: Map<String, Value>,
    ) -> Option<AnnotationPaths> {
        let (start, end) = self.caret_range()?;
        if start == end {
            debug!(target: LOG_TARGET, type_name, "collapsed selection; annotation skipped");
            return None;
        }
        let mut definition = MarkDef::new(String::new(), type_name);
        definition.fields = fields;
        let added = self.edit_in_place(|blocks, start, end, keys| {
            transforms::add_annotation(blocks, start, end, &definition, keys)
        })?;
        let (index, def_key) = added.into_iter().next()?;
        let block = self.engine.block(index)?.as_text_block()?;
        let span_key = block
            .children
            .iter()
            .filter_map(|child| child.as_text())
            .find(|leaf| leaf.marks.contains(&def_key))?
            .key
            .clone();
        Some(AnnotationPaths {
            mark_def_path: Path::mark_def(block.key.clone(), def_key),
            span_path: Path::child(block.key.clone(), span_key),
            block_path: Path::block(block.key.clone()),
        })
    }

    /// Remove annotations of `type_name` touched by the selection.
    pub fn remove_annotation(&mut self, type_name: &str) -> bool {
        self.edit_in_place(|blocks, start, end, keys| {
            transforms::remove_annotation(blocks, start, end, type_name, keys)
        })
        .is_some_and(|removed| removed > 0)
    }

    /// Annotation definitions referenced by the selected text.
    pub fn active_annotations(&self) -> Vec<MarkDef> {
        self.caret_range()
            .map(|(start, end)| {
                transforms::annotations_in(self.engine.blocks(), start, end)
                    .into_iter()
                    .map(|(_, def)| def)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Toggle `style` on the selected text blocks.
    pub fn toggle_block_style(&mut self, style: &str) -> bool {
        self.edit_in_place(|blocks, start, end, _| {
            transforms::toggle_block_style(blocks, start, end, style)
        })
        .is_some()
    }

    /// Whether every selected text block carries `style`.
    pub fn is_block_style_active(&self, style: &str) -> bool {
        let Some((start, end)) = self.caret_range() else {
            return false;
        };
        let mut text_blocks = (start.block..=end.block)
            .filter_map(|index| self.engine.block(index))
            .filter_map(EngineNode::as_text_block)
            .peekable();
        text_blocks.peek().is_some() && text_blocks.all(|block| block.style == style)
    }

    pub fn undo(&mut self) -> bool {
        self.engine.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.engine.redo()
    }

    /// The block, child or markDef `path` lives in, with its trimmed path.
    pub fn find_by_path(&self, path: &Path) -> Option<(Value, Path)> {
        path.block_key()?;
        let depth = if path.child_key().is_some() || path.mark_def_key().is_some() {
            3
        } else {
            1
        };
        let trimmed = path.head(depth);
        let document = document_to_value(&self.document());
        let value = resolve_value(&document, &trimmed)?.clone();
        Some((value, trimmed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::value::to_engine_nodes;
    use ptedit_core::models::block::document_from_value;
    use ptedit_core::{ObjectBlock, Point, SequentialKeys, Span};
    use serde_json::json;

    struct Fixture {
        engine: Engine,
        keys: SequentialKeys,
        config: EditorConfig,
    }

    impl Fixture {
        fn new(value: Value) -> Self {
            let document = document_from_value(value).expect("document");
            let mut keys = SequentialKeys::new("k");
            let (nodes, placeholder) = to_engine_nodes(Some(&document), &mut keys);
            let mut engine = Engine::new(50);
            engine.sync_blocks(nodes, placeholder, true);
            Self {
                engine,
                keys,
                config: EditorConfig::default(),
            }
        }

        fn api(&mut self) -> EditableApi<'_> {
            EditableApi::new(&mut self.engine, &mut self.keys, &self.config, Instant::now())
        }
    }

    fn hello() -> Value {
        json!([{"_key": "a", "_type": "block", "children": [
            {"_key": "a1", "_type": "span", "text": "Hello"}
        ]}])
    }

    fn spans(document: &Document, block: usize) -> Vec<(String, Vec<String>)> {
        document[block]
            .as_text()
            .map(|block| {
                block
                    .children
                    .iter()
                    .filter_map(Span::as_text)
                    .map(|span| (span.text.clone(), span.marks.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    #[test]
    fn unresolvable_select_is_a_no_op() {
        let mut fixture = Fixture::new(hello());
        let mut api = fixture.api();
        assert!(!api.select(&Selection::collapsed(Path::child("zz", "a1"), 0)));
        assert!(api.get_selection().is_none());
        assert!(api.select(&Selection::collapsed(Path::child("a", "a1"), 5)));
        assert_eq!(
            api.get_selection(),
            Some(Selection::collapsed(Path::child("a", "a1"), 5))
        );
    }

    #[test]
    fn pending_marks_apply_to_the_next_typed_text() {
        let mut fixture = Fixture::new(hello());
        let mut api = fixture.api();
        api.select(&Selection::collapsed(Path::child("a", "a1"), 5));
        assert!(api.add_mark("strong"));
        assert!(api.is_mark_active("strong"));
        assert!(api.insert_text(" you"));
        let value = api.get_value().expect("value");
        assert_eq!(
            spans(&value, 0),
            vec![
                ("Hello".to_string(), vec![]),
                (" you".to_string(), vec!["strong".to_string()]),
            ]
        );
        assert!(api.is_mark_active("strong"));
    }

    #[test]
    fn toggle_mark_over_a_range_round_trips() {
        let mut fixture = Fixture::new(hello());
        let mut api = fixture.api();
        api.select(&Selection::new(
            Point::new(Path::child("a", "a1"), 0),
            Point::new(Path::child("a", "a1"), 5),
        ));
        assert!(api.toggle_mark("em"));
        assert!(api.is_mark_active("em"));
        assert!(api.toggle_mark("em"));
        assert!(!api.is_mark_active("em"));
        let value = api.get_value().expect("value");
        assert_eq!(spans(&value, 0), vec![("Hello".to_string(), vec![])]);
        assert!(!api.add_mark("not-a-decorator"));
    }

    #[test]
    fn annotations_add_report_and_remove() {
        let mut fixture = Fixture::new(hello());
        let mut api = fixture.api();
        api.select(&Selection::new(
            Point::new(Path::child("a", "a1"), 1),
            Point::new(Path::child("a", "a1"), 4),
        ));
        let mut fields = Map::new();
        fields.insert("href".to_string(), json!("https://example.com"));
        let paths = api.add_annotation("link", fields).expect("annotation");
        assert_eq!(paths.block_path, Path::block("a"));

        let value = api.get_value().expect("value");
        let block = value[0].as_text().expect("text block");
        assert_eq!(block.mark_defs.len(), 1);
        assert_eq!(paths.mark_def_path, Path::mark_def("a", block.mark_defs[0].key.clone()));
        assert_eq!(api.active_annotations().len(), 1);

        assert!(api.remove_annotation("link"));
        let value = api.get_value().expect("value");
        assert!(value[0].as_text().expect("text block").mark_defs.is_empty());
        assert!(api.active_annotations().is_empty());
    }

    #[test]
    fn insert_block_replaces_empty_focus_block_and_selects_it() {
        let mut fixture = Fixture::new(Value::Null);
        let mut api = fixture.api();
        assert!(api.get_value().is_none());
        let path = api.insert_block(Block::Object(ObjectBlock::new("img", "image")));
        assert_eq!(path, Some(Path::block("img")));
        let value = api.get_value().expect("value");
        assert_eq!(value.len(), 1);
        assert_eq!(value[0].key(), "img");
        assert_eq!(api.get_selection(), Some(Selection::collapsed(Path::block("img"), 0)));
    }

    #[test]
    fn typing_into_the_placeholder_produces_a_value() {
        let mut fixture = Fixture::new(Value::Null);
        let mut api = fixture.api();
        assert!(api.select_path(&Path::block("k0")));
        api.insert_text("hi");
        let value = api.get_value().expect("value");
        assert_eq!(spans(&value, 0), vec![("hi".to_string(), vec![])]);
        api.delete_backward(DeleteUnit::Word);
        assert!(api.get_value().is_none());
    }

    #[test]
    fn split_then_backspace_rejoins_and_undo_restores() {
        let mut fixture = Fixture::new(hello());
        let mut api = fixture.api();
        api.select(&Selection::collapsed(Path::child("a", "a1"), 2));
        assert!(api.split_block());
        assert_eq!(api.get_value().map(|v| v.len()), Some(2));
        assert!(api.delete_backward(DeleteUnit::Character));
        let value = api.get_value().expect("value");
        assert_eq!(value.len(), 1);
        assert_eq!(spans(&value, 0), vec![("Hello".to_string(), vec![])]);

        assert!(api.undo());
        assert_eq!(api.get_value().map(|v| v.len()), Some(2));
        assert!(api.redo());
        assert_eq!(api.get_value().map(|v| v.len()), Some(1));
    }

    #[test]
    fn insert_child_returns_child_path() {
        let mut fixture = Fixture::new(hello());
        let mut api = fixture.api();
        api.select(&Selection::collapsed(Path::child("a", "a1"), 5));
        let path = api.insert_child(ObjectBlock::new("m1", "mention"));
        assert_eq!(path, Some(Path::child("a", "m1")));
        let (value, trimmed) = api
            .find_by_path(&Path::child("a", "m1").with(ptedit_core::PathSegment::field("user")))
            .expect("child");
        assert_eq!(trimmed, Path::child("a", "m1"));
        assert_eq!(value["_type"], json!("mention"));
    }

    #[test]
    fn delete_blocks_mode_removes_whole_blocks() {
        let mut fixture = Fixture::new(json!([
            {"_key": "a", "_type": "block",
             "children": [{"_key": "a1", "_type": "span", "text": "one"}]},
            {"_key": "img", "_type": "image"},
            {"_key": "b", "_type": "block",
             "children": [{"_key": "b1", "_type": "span", "text": "two"}]}
        ]));
        let mut api = fixture.api();
        let target = Selection::collapsed(Path::block("img"), 0);
        assert!(api.delete(Some(&target), DeleteMode::Blocks));
        let value = api.get_value().expect("value");
        assert_eq!(value.iter().map(Block::key).collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn toggle_block_style_reports_activity() {
        let mut fixture = Fixture::new(hello());
        let mut api = fixture.api();
        api.select(&Selection::collapsed(Path::child("a", "a1"), 0));
        assert!(!api.is_block_style_active("h1"));
        api.toggle_block_style("h1");
        assert!(api.is_block_style_active("h1"));
    }
}
