//! Anchors registered while rendering, used to position edit popovers.

use ptedit_core::Path;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AnchorRole {
    BlockObject,
    InlineObject,
    Annotation,
}

/// Where a rendered object or annotation lives.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorHandle {
    /// Key of the object, or of the markDef for annotations.
    pub key: String,
    pub block_key: String,
    /// First span carrying the annotation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span_key: Option<String>,
    pub role: AnchorRole,
    /// Render pass that registered this anchor.
    pub revision: u64,
}

/// Path → anchor map, refilled on every render pass.
#[derive(Debug, Default)]
pub struct AnchorRegistry {
    anchors: HashMap<Path, AnchorHandle>,
    revision: u64,
}

impl AnchorRegistry {
    /// Start a render pass, forgetting anchors from the previous one.
    pub fn begin_pass(&mut self, revision: u64) {
        self.anchors.clear();
        self.revision = revision;
    }

    pub fn register_object(
        &mut self,
        path: Path,
        block_key: &str,
        key: &str,
        role: AnchorRole,
    ) {
        self.anchors.insert(
            path,
            AnchorHandle {
                key: key.to_string(),
                block_key: block_key.to_string(),
                span_key: None,
                role,
                revision: self.revision,
            },
        );
    }

    /// Register an annotation unless an earlier span already did.
    pub fn register_annotation(
        &mut self,
        path: Path,
        block_key: &str,
        def_key: &str,
        span_key: &str,
    ) {
        let revision = self.revision;
        self.anchors.entry(path).or_insert_with(|| AnchorHandle {
            key: def_key.to_string(),
            block_key: block_key.to_string(),
            span_key: Some(span_key.to_string()),
            role: AnchorRole::Annotation,
            revision,
        });
    }

    pub fn get(&self, path: &Path) -> Option<&AnchorHandle> {
        self.anchors.get(path)
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_annotated_span_wins_and_passes_reset() {
        let mut registry = AnchorRegistry::default();
        registry.begin_pass(3);
        let path = Path::mark_def("b", "m");
        registry.register_annotation(path.clone(), "b", "m", "s1");
        registry.register_annotation(path.clone(), "b", "m", "s2");
        let handle = registry.get(&path).expect("anchor");
        assert_eq!(handle.span_key.as_deref(), Some("s1"));
        assert_eq!(handle.revision, 3);

        registry.begin_pass(4);
        assert!(registry.is_empty());
    }
}
