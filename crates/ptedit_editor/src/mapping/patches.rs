//! Engine change → document patch computation.
//!
//! Patches are derived by comparing the document as last reported to the
//! host with the document the engine now holds. The result is the smallest
//! patch list this module knows how to express: text edits become
//! `diffMatchPatch`, mark and style edits become field `set`s, structural
//! block edits become `insert`/`unset`.

use ptedit_core::constants::{CHILDREN_FIELD, MARKS_FIELD, MARK_DEFS_FIELD, TEXT_FIELD};
use ptedit_core::diff::diff_match_patch;
use ptedit_core::models::block::document_to_value;
use ptedit_core::{Block, InsertPosition, Patch, Path, PathSegment, Span, TextBlock};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

fn key_path(key: &str) -> Path {
    Path::block(key.to_string())
}

fn to_value<T: Clone + Into<Value>>(item: &T) -> Value {
    item.clone().into()
}

fn span_patches(block_key: &str, before: &Span, after: &Span, out: &mut Vec<Patch>) {
    let child_path = Path::child(block_key, after.key());
    match (before, after) {
        (Span::Text(old), Span::Text(new)) => {
            if let Some(patch) = diff_match_patch(&old.text, &new.text) {
                out.push(Patch::DiffMatchPatch {
                    path: child_path.clone().with(PathSegment::field(TEXT_FIELD)),
                    value: patch,
                });
            }
            if old.marks != new.marks {
                out.push(Patch::Set {
                    path: child_path.with(PathSegment::field(MARKS_FIELD)),
                    value: Value::from(new.marks.clone()),
                });
            }
        }
        _ if before != after => out.push(Patch::Set {
            path: child_path,
            value: to_value(after),
        }),
        _ => {}
    }
}

fn text_block_patches(before: &TextBlock, after: &TextBlock, out: &mut Vec<Patch>) {
    let block_path = key_path(&after.key);
    if before.list_item != after.list_item || before.level != after.level {
        out.push(Patch::Set {
            path: block_path,
            value: to_value(&Block::Text(after.clone())),
        });
        return;
    }
    if before.style != after.style {
        out.push(Patch::Set {
            path: block_path.clone().with(PathSegment::field("style")),
            value: Value::String(after.style.clone()),
        });
    }
    if before.mark_defs != after.mark_defs {
        out.push(Patch::Set {
            path: block_path.clone().with(PathSegment::field(MARK_DEFS_FIELD)),
            value: Value::Array(after.mark_defs.iter().map(to_value).collect()),
        });
    }
    let same_children = before.children.len() == after.children.len()
        && before
            .children
            .iter()
            .zip(&after.children)
            .all(|(old, new)| old.key() == new.key());
    if same_children {
        for (old, new) in before.children.iter().zip(&after.children) {
            span_patches(&after.key, old, new, out);
        }
    } else {
        out.push(Patch::Set {
            path: block_path.with(PathSegment::field(CHILDREN_FIELD)),
            value: Value::Array(after.children.iter().map(to_value).collect()),
        });
    }
}

fn block_patches(before: &Block, after: &Block, out: &mut Vec<Patch>) {
    match (before, after) {
        (Block::Text(old), Block::Text(new)) => text_block_patches(old, new, out),
        _ if before != after => out.push(Patch::Set {
            path: key_path(after.key()),
            value: after.to_value(),
        }),
        _ => {}
    }
}

/// Patches turning `before` into `after`.
pub fn diff_documents(before: &[Block], after: &[Block]) -> Vec<Patch> {
    if before == after {
        return Vec::new();
    }
    if after.is_empty() {
        return vec![Patch::Unset {
            path: Path::default(),
        }];
    }

    let after_keys: HashSet<&str> = after.iter().map(Block::key).collect();
    let before_by_key: HashMap<&str, &Block> = before.iter().map(|b| (b.key(), b)).collect();
    let retained_before: Vec<&str> = before
        .iter()
        .map(Block::key)
        .filter(|key| after_keys.contains(key))
        .collect();
    let retained_after: Vec<&str> = after
        .iter()
        .map(Block::key)
        .filter(|key| before_by_key.contains_key(key))
        .collect();
    if retained_before != retained_after {
        return vec![Patch::Set {
            path: Path::default(),
            value: document_to_value(after),
        }];
    }

    let mut patches: Vec<Patch> = before
        .iter()
        .filter(|block| !after_keys.contains(block.key()))
        .map(|block| Patch::Unset {
            path: key_path(block.key()),
        })
        .collect();

    let mut previous: Option<&str> = None;
    for (index, block) in after.iter().enumerate() {
        match before_by_key.get(block.key()) {
            Some(old) => block_patches(old, block, &mut patches),
            None => {
                let insert = match previous {
                    Some(prev) => Patch::Insert {
                        path: key_path(prev),
                        position: InsertPosition::After,
                        items: vec![block.to_value()],
                    },
                    None => match after[index..]
                        .iter()
                        .map(Block::key)
                        .find(|key| before_by_key.contains_key(key))
                    {
                        Some(next) => Patch::Insert {
                            path: key_path(next),
                            position: InsertPosition::Before,
                            items: vec![block.to_value()],
                        },
                        None => {
                            patches.push(Patch::SetIfMissing {
                                path: Path::default(),
                                value: Value::Array(Vec::new()),
                            });
                            Patch::Insert {
                                path: Path::new(vec![PathSegment::Index(0)]),
                                position: InsertPosition::Before,
                                items: vec![block.to_value()],
                            }
                        }
                    },
                };
                patches.push(insert);
            }
        }
        previous = Some(block.key());
    }
    patches
}

#[cfg(test)]
mod tests {
    use super::*;
    use ptedit_core::models::block::document_from_value;
    use serde_json::json;

    fn doc(value: Value) -> Vec<Block> {
        document_from_value(value).expect("document")
    }

    fn text_block(key: &str, span: &str, text: &str) -> Value {
        json!({"_key": key, "_type": "block", "style": "normal", "markDefs": [],
               "children": [{"_key": span, "_type": "span", "text": text, "marks": []}]})
    }

    #[test]
    fn equal_documents_produce_no_patches() {
        let document = doc(json!([text_block("a", "a1", "hi")]));
        assert!(diff_documents(&document, &document).is_empty());
    }

    #[test]
    fn text_edit_becomes_diff_match_patch() {
        let before = doc(json!([text_block("a", "a1", "hello")]));
        let after = doc(json!([text_block("a", "a1", "hello world")]));
        let patches = diff_documents(&before, &after);
        assert_eq!(patches.len(), 1);
        match &patches[0] {
            Patch::DiffMatchPatch { path, value } => {
                assert_eq!(path, &Path::child("a", "a1").with(PathSegment::field("text")));
                assert!(value.starts_with("@@"));
            }
            other => panic!("unexpected patch: {:?}", other),
        }
    }

    #[test]
    fn new_block_inserts_after_previous_key() {
        let before = doc(json!([text_block("a", "a1", "x")]));
        let after = doc(json!([text_block("a", "a1", "x"), text_block("b", "b1", "")]));
        let patches = diff_documents(&before, &after);
        assert_eq!(
            patches,
            vec![Patch::Insert {
                path: Path::block("a"),
                position: InsertPosition::After,
                items: vec![text_block("b", "b1", "")],
            }]
        );
    }

    #[test]
    fn first_block_into_empty_document_sets_if_missing() {
        let after = doc(json!([text_block("a", "a1", "x")]));
        let patches = diff_documents(&[], &after);
        assert!(matches!(patches[0], Patch::SetIfMissing { .. }));
        assert!(matches!(&patches[1], Patch::Insert { position: InsertPosition::Before, .. }));
    }

    #[test]
    fn removed_blocks_unset_and_emptied_documents_unset_root() {
        let before = doc(json!([text_block("a", "a1", "x"), {"_key": "img", "_type": "image"}]));
        let after = doc(json!([text_block("a", "a1", "x")]));
        assert_eq!(
            diff_documents(&before, &after),
            vec![Patch::Unset { path: Path::block("img") }]
        );
        assert_eq!(
            diff_documents(&before, &[]),
            vec![Patch::Unset { path: Path::default() }]
        );
    }

    #[test]
    fn reordering_falls_back_to_setting_the_whole_value() {
        let before = doc(json!([text_block("a", "a1", "x"), text_block("b", "b1", "y")]));
        let after = doc(json!([text_block("b", "b1", "y"), text_block("a", "a1", "x")]));
        let patches = diff_documents(&before, &after);
        assert!(matches!(&patches[..], [Patch::Set { path, .. }] if path.is_empty()));
    }

    #[test]
    fn mark_and_child_structure_changes_use_field_sets() {
        let before = doc(json!([text_block("a", "a1", "bold")]));
        let mut marked = before.clone();
        if let Some(Span::Text(span)) = marked[0].as_text_mut().map(|b| &mut b.children[0]) {
            span.marks.push("strong".to_string());
        }
        let patches = diff_documents(&before, &marked);
        assert_eq!(
            patches,
            vec![Patch::Set {
                path: Path::child("a", "a1").with(PathSegment::field("marks")),
                value: json!(["strong"]),
            }]
        );

        let split = doc(json!([{"_key": "a", "_type": "block", "style": "normal", "markDefs": [],
            "children": [
                {"_key": "a1", "_type": "span", "text": "bo", "marks": []},
                {"_key": "n", "_type": "span", "text": "ld", "marks": ["em"]}
            ]}]));
        let patches = diff_documents(&before, &split);
        assert!(matches!(&patches[..], [Patch::Set { path, .. }]
            if *path == Path::block("a").with(PathSegment::field("children"))));
    }
}
