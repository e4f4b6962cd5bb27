//! Core domain library for ptedit (document model, patches, config).

/// Configuration loading and defaults.
pub mod config;
/// Shared constants used across ptedit crates.
pub mod constants;
/// Diff-match-patch text patch builder.
pub mod diff;
/// Error types for document parsing and editor operations.
pub mod error;
/// Key generation for new blocks, spans and annotations.
pub mod keys;
/// Document, path, selection, patch, marker and presence models.
pub mod models;
/// Char-offset text helpers.
pub mod text;

pub use config::{EditorConfig, ReconcileStrategy};
pub use error::EditorError;
pub use keys::{KeyGenerator, RandomKeys, SequentialKeys};
pub use models::{
    block::{
        Block, Document, InlineObject, KeyedObject, MarkDef, ObjectBlock, Span, TextBlock,
        TextSpan,
    },
    marker::{Marker, MarkerLevel},
    patch::{InsertPosition, Patch, PatchEvent},
    path::{Path, PathSegment},
    presence::FormFieldPresence,
    selection::{Point, Selection},
};
