//! Error types for document parsing and editor operations.
use thiserror::Error;

/// Top-level error type for fallible (non-editing) operations.
///
/// Editing operations themselves never fail: unresolvable addresses are
/// logged and ignored. This type covers parsing inputs and configuration.
#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Unresolvable path: {0}")]
    UnresolvablePath(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Paste handler failed: {0}")]
    PasteHandler(String),
}
