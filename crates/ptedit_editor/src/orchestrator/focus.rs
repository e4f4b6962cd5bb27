//! Classification of host focus paths.

use ptedit_core::constants::{CHILDREN_FIELD, MARK_DEFS_FIELD};
use ptedit_core::models::block::find_block;
use ptedit_core::{Block, Path, PathSegment, Span};

/// What a focus path points at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FocusTarget {
    /// A markDef referenced by `span_path`; `form_path` is the markDef path.
    Annotation { span_path: Path, form_path: Path },
    /// An object block, addressed at any depth; `path` is the block path.
    BlockObject { path: Path },
    /// An inline object; `path` is `[block, "children", child]`.
    InlineObject { path: Path },
    /// Text, or nothing that exists.
    Other,
}

fn is_field(path: &Path, index: usize, name: &str) -> bool {
    path.get(index).is_some_and(|segment| segment.is_field(name))
}

/// Classify `path` against `document`.
pub fn classify(path: &Path, document: &[Block]) -> FocusTarget {
    let Some(block_key) = path.block_key() else {
        return FocusTarget::Other;
    };
    let Some((_, block)) = find_block(document, block_key) else {
        return FocusTarget::Other;
    };
    let text_block = match block {
        Block::Object(_) => {
            return FocusTarget::BlockObject {
                path: Path::block(block_key),
            }
        }
        Block::Text(text_block) => text_block,
    };

    if is_field(path, 1, MARK_DEFS_FIELD) {
        let span = path
            .get(2)
            .and_then(PathSegment::as_key)
            .filter(|def_key| text_block.mark_def(def_key).is_some())
            .and_then(|def_key| {
                text_block.children.iter().find_map(|child| match child {
                    Span::Text(span) if span.marks.iter().any(|m| m == def_key) => {
                        Some(span.key.as_str())
                    }
                    _ => None,
                })
            });
        return match span {
            Some(span_key) => FocusTarget::Annotation {
                span_path: Path::child(block_key, span_key),
                form_path: path.head(3),
            },
            None => FocusTarget::Other,
        };
    }

    if is_field(path, 1, CHILDREN_FIELD) {
        let inline = path
            .child_key()
            .and_then(|child_key| text_block.child(child_key))
            .filter(|(_, child)| !child.is_text());
        if let Some((_, child)) = inline {
            return FocusTarget::InlineObject {
                path: Path::child(block_key, child.key()),
            };
        }
    }
    FocusTarget::Other
}

#[cfg(test)]
mod tests {
    use super::*;
    use ptedit_core::models::block::document_from_value;
    use serde_json::json;

    fn document() -> Vec<Block> {
        document_from_value(json!([
            {"_key": "b", "_type": "block",
             "markDefs": [{"_key": "m1", "_type": "link"}, {"_key": "orphan", "_type": "link"}],
             "children": [
                {"_key": "s0", "_type": "span", "text": "plain "},
                {"_key": "s1", "_type": "span", "text": "linked", "marks": ["m1"]},
                {"_key": "i1", "_type": "mention"}
             ]},
            {"_key": "img", "_type": "image", "asset": {"ref": "x"}}
        ]))
        .expect("document")
    }

    #[test]
    fn annotation_paths_resolve_to_the_first_referencing_span() {
        let path = Path::mark_def("b", "m1").with(PathSegment::field("href"));
        assert_eq!(
            classify(&path, &document()),
            FocusTarget::Annotation {
                span_path: Path::child("b", "s1"),
                form_path: Path::mark_def("b", "m1"),
            }
        );
        assert_eq!(
            classify(&Path::mark_def("b", "orphan"), &document()),
            FocusTarget::Other
        );
    }

    #[test]
    fn object_blocks_match_at_any_depth() {
        let deep = Path::block("img")
            .with(PathSegment::field("asset"))
            .with(PathSegment::field("ref"));
        assert_eq!(
            classify(&deep, &document()),
            FocusTarget::BlockObject {
                path: Path::block("img")
            }
        );
    }

    #[test]
    fn inline_objects_match_but_text_spans_do_not() {
        let inline = Path::child("b", "i1").with(PathSegment::field("user"));
        assert_eq!(
            classify(&inline, &document()),
            FocusTarget::InlineObject {
                path: Path::child("b", "i1")
            }
        );
        assert_eq!(classify(&Path::child("b", "s1"), &document()), FocusTarget::Other);
        assert_eq!(classify(&Path::block("missing"), &document()), FocusTarget::Other);
    }
}
