//! Root crate facade for the ptedit portable-text editor.

/// Scripted command replay against a headless editor.
pub mod replay;

pub use ptedit_core::{
    models, Block, Document, EditorConfig, EditorError, Patch, PatchEvent, Path, Selection,
};
pub use ptedit_editor::{
    init_tracing, EditorCmd, EditorEvent, InputEvent, ObjectEditOrchestrator, RenderNode,
};
pub use replay::{replay, replay_files, ReplayOutput};
