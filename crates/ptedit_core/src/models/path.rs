//! Document addressing: paths of field, index and keyed segments.

use crate::constants::{CHILDREN_FIELD, MARK_DEFS_FIELD};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Keyed segment, serialized as `{"_key": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyedSegment {
    #[serde(rename = "_key")]
    pub key: String,
}

/// A single path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Index(usize),
    Field(String),
    Key(KeyedSegment),
}

impl PathSegment {
    pub fn key(key: impl Into<String>) -> Self {
        Self::Key(KeyedSegment { key: key.into() })
    }

    pub fn field(name: impl Into<String>) -> Self {
        Self::Field(name.into())
    }

    /// The `_key` of a keyed segment.
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Self::Key(segment) => Some(segment.key.as_str()),
            _ => None,
        }
    }

    pub fn as_field(&self) -> Option<&str> {
        match self {
            Self::Field(name) => Some(name.as_str()),
            _ => None,
        }
    }

    pub fn is_field(&self, name: &str) -> bool {
        self.as_field() == Some(name)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "[{}]", index),
            Self::Field(name) => write!(f, "{}", name),
            Self::Key(segment) => write!(f, "[_key==\"{}\"]", segment.key),
        }
    }
}

/// Address of a location in the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(pub Vec<PathSegment>);

impl Path {
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }

    /// `[{_key: block}]`
    pub fn block(block_key: impl Into<String>) -> Self {
        Self(vec![PathSegment::key(block_key)])
    }

    /// `[{_key: block}, "children", {_key: child}]`
    pub fn child(block_key: impl Into<String>, child_key: impl Into<String>) -> Self {
        Self(vec![
            PathSegment::key(block_key),
            PathSegment::field(CHILDREN_FIELD),
            PathSegment::key(child_key),
        ])
    }

    /// `[{_key: block}, "markDefs", {_key: mark_def}]`
    pub fn mark_def(block_key: impl Into<String>, mark_def_key: impl Into<String>) -> Self {
        Self(vec![
            PathSegment::key(block_key),
            PathSegment::field(MARK_DEFS_FIELD),
            PathSegment::key(mark_def_key),
        ])
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PathSegment> {
        self.0.get(index)
    }

    /// Append a segment, returning the extended path.
    pub fn with(mut self, segment: PathSegment) -> Self {
        self.0.push(segment);
        self
    }

    /// Prepend a segment in place.
    pub fn prepend(&mut self, segment: PathSegment) {
        self.0.insert(0, segment);
    }

    /// Concatenate `self` and `tail`.
    pub fn join(&self, tail: &Path) -> Path {
        let mut segments = self.0.clone();
        segments.extend(tail.0.iter().cloned());
        Path(segments)
    }

    /// The first `n` segments.
    pub fn head(&self, n: usize) -> Path {
        Path(self.0.iter().take(n).cloned().collect())
    }

    pub fn starts_with(&self, prefix: &Path) -> bool {
        self.0.len() >= prefix.0.len() && self.0[..prefix.0.len()] == prefix.0[..]
    }

    /// Key of the first segment when it is keyed.
    pub fn block_key(&self) -> Option<&str> {
        self.get(0).and_then(PathSegment::as_key)
    }

    /// Key of the child segment in `[block, "children", child, ...]`.
    pub fn child_key(&self) -> Option<&str> {
        if !self.get(1)?.is_field(CHILDREN_FIELD) {
            return None;
        }
        self.get(2).and_then(PathSegment::as_key)
    }

    /// Key of the markDef segment in `[block, "markDefs", def, ...]`.
    pub fn mark_def_key(&self) -> Option<&str> {
        if !self.get(1)?.is_field(MARK_DEFS_FIELD) {
            return None;
        }
        self.get(2).and_then(PathSegment::as_key)
    }
}

impl From<Vec<PathSegment>> for Path {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, segment) in self.0.iter().enumerate() {
            if index > 0 && matches!(segment, PathSegment::Field(_)) {
                f.write_str(".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

/// Resolve `path` inside an arbitrary JSON value.
///
/// Keyed segments match array items by `_key`, scanning in order.
pub fn resolve_value<'a>(root: &'a Value, path: &Path) -> Option<&'a Value> {
    path.segments()
        .iter()
        .try_fold(root, |current, segment| match segment {
            PathSegment::Field(name) => current.get(name.as_str()),
            PathSegment::Index(index) => current.as_array()?.get(*index),
            PathSegment::Key(keyed) => current
                .as_array()?
                .iter()
                .find(|item| item.get("_key").and_then(Value::as_str) == Some(keyed.key.as_str())),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn segments_round_trip_through_json_forms() {
        let path: Path =
            serde_json::from_value(json!([{"_key": "b1"}, "children", 2])).expect("path");
        assert_eq!(
            path,
            Path::new(vec![
                PathSegment::key("b1"),
                PathSegment::field("children"),
                PathSegment::Index(2),
            ])
        );
        assert_eq!(
            serde_json::to_value(&path).expect("json"),
            json!([{"_key": "b1"}, "children", 2])
        );
    }

    #[test]
    fn accessors_read_block_child_and_mark_def_keys() {
        let child = Path::child("b", "s");
        assert_eq!(child.block_key(), Some("b"));
        assert_eq!(child.child_key(), Some("s"));
        assert_eq!(child.mark_def_key(), None);

        let def = Path::mark_def("b", "m1");
        assert_eq!(def.mark_def_key(), Some("m1"));
        assert_eq!(def.child_key(), None);
        assert!(def.starts_with(&Path::block("b")));
        assert_eq!(def.to_string(), "[_key==\"b\"].markDefs[_key==\"m1\"]");
    }

    #[test]
    fn resolve_value_walks_keys_fields_and_indices() {
        let doc = json!([
            {"_key": "a", "_type": "image", "caption": "x"},
            {"_key": "b", "_type": "block", "children": [{"_key": "s", "text": "hi"}]}
        ]);
        let text = resolve_value(&doc, &Path::child("b", "s").with(PathSegment::field("text")));
        assert_eq!(text, Some(&json!("hi")));
        let caption = resolve_value(
            &doc,
            &Path::new(vec![PathSegment::Index(0), PathSegment::field("caption")]),
        );
        assert_eq!(caption, Some(&json!("x")));
        assert!(resolve_value(&doc, &Path::block("missing")).is_none());
    }
}
