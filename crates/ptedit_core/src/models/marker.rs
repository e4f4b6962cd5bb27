//! Markers: host-supplied UI annotations (validation results etc.) addressed by path.

use super::path::Path;
use crate::constants::{CHILDREN_FIELD, MARK_DEFS_FIELD};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerLevel {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    pub path: Path,
    pub level: MarkerLevel,
    pub message: String,
}

impl Marker {
    pub fn new(path: Path, level: MarkerLevel, message: impl Into<String>) -> Self {
        Self {
            path,
            level,
            message: message.into(),
        }
    }
}

/// Markers anywhere inside block `block_key`.
pub fn markers_for_block<'a>(markers: &'a [Marker], block_key: &str) -> Vec<&'a Marker> {
    markers
        .iter()
        .filter(|marker| marker.path.block_key() == Some(block_key))
        .collect()
}

/// Markers inside child `child_key` of block `block_key`.
pub fn markers_for_child<'a>(
    markers: &'a [Marker],
    block_key: &str,
    child_key: &str,
) -> Vec<&'a Marker> {
    markers
        .iter()
        .filter(|marker| {
            marker.path.block_key() == Some(block_key)
                && marker
                    .path
                    .get(1)
                    .is_some_and(|segment| segment.is_field(CHILDREN_FIELD))
                && marker.path.child_key() == Some(child_key)
        })
        .collect()
}

/// Markers inside annotation `mark_def_key` of block `block_key`.
pub fn markers_for_annotation<'a>(
    markers: &'a [Marker],
    block_key: &str,
    mark_def_key: &str,
) -> Vec<&'a Marker> {
    markers
        .iter()
        .filter(|marker| {
            marker.path.block_key() == Some(block_key)
                && marker
                    .path
                    .get(1)
                    .is_some_and(|segment| segment.is_field(MARK_DEFS_FIELD))
                && marker.path.mark_def_key() == Some(mark_def_key)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::path::PathSegment;

    fn fixture() -> Vec<Marker> {
        vec![
            Marker::new(Path::block("a"), MarkerLevel::Error, "block a"),
            Marker::new(Path::child("a", "s1"), MarkerLevel::Warning, "child s1"),
            Marker::new(
                Path::mark_def("a", "m1").with(PathSegment::field("href")),
                MarkerLevel::Error,
                "bad href",
            ),
            Marker::new(Path::child("b", "s1"), MarkerLevel::Info, "other block"),
        ]
    }

    #[test]
    fn block_scope_includes_nested_markers() {
        let markers = fixture();
        let scoped = markers_for_block(&markers, "a");
        assert_eq!(scoped.len(), 3);
    }

    #[test]
    fn child_and_annotation_scopes_do_not_leak_across_blocks() {
        let markers = fixture();
        let child = markers_for_child(&markers, "a", "s1");
        assert_eq!(child.len(), 1);
        assert_eq!(child[0].message, "child s1");

        let annotation = markers_for_annotation(&markers, "a", "m1");
        assert_eq!(annotation.len(), 1);
        assert_eq!(annotation[0].message, "bad href");
        assert!(markers_for_annotation(&markers, "b", "m1").is_empty());
    }
}
