//! Patch events describing document deltas for the host to apply.
//!
//! The editor never applies patches to the host document; it only builds
//! and forwards them. Paths are not validated here.

use super::path::{Path, PathSegment};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Side of the reference item an `insert` lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InsertPosition {
    Before,
    After,
}

/// A single document mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Patch {
    Set {
        path: Path,
        value: Value,
    },
    SetIfMissing {
        path: Path,
        value: Value,
    },
    Unset {
        path: Path,
    },
    Insert {
        path: Path,
        position: InsertPosition,
        items: Vec<Value>,
    },
    /// Text diff in diff-match-patch patch text format.
    DiffMatchPatch {
        path: Path,
        value: String,
    },
}

impl Patch {
    pub fn path(&self) -> &Path {
        match self {
            Self::Set { path, .. }
            | Self::SetIfMissing { path, .. }
            | Self::Unset { path }
            | Self::Insert { path, .. }
            | Self::DiffMatchPatch { path, .. } => path,
        }
    }

    fn path_mut(&mut self) -> &mut Path {
        match self {
            Self::Set { path, .. }
            | Self::SetIfMissing { path, .. }
            | Self::Unset { path }
            | Self::Insert { path, .. }
            | Self::DiffMatchPatch { path, .. } => path,
        }
    }

    /// Prepend `segment` to this patch's path.
    pub fn prefix(mut self, segment: PathSegment) -> Self {
        self.path_mut().prepend(segment);
        self
    }
}

/// Ordered list of patches emitted as one change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatchEvent {
    pub patches: Vec<Patch>,
}

impl PatchEvent {
    pub fn new(patches: Vec<Patch>) -> Self {
        Self { patches }
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// Prepend `segment` to every patch path.
    pub fn prefix_all(self, segment: PathSegment) -> Self {
        Self {
            patches: self
                .patches
                .into_iter()
                .map(|patch| patch.prefix(segment.clone()))
                .collect(),
        }
    }

    /// Map a patch event local to the object at `path` into a document-absolute one.
    ///
    /// Segments are prepended last-first so the result reads `path ++ local`.
    pub fn prefixed(self, path: &Path) -> Self {
        path.segments()
            .iter()
            .rev()
            .fold(self, |event, segment| event.prefix_all(segment.clone()))
    }
}
