//! Headless portable-text editor.
//!
//! The host owns the document. It feeds snapshots, selection and focus
//! paths in through [`ObjectEditOrchestrator`], forwards native input, and
//! drains [`EditorEvent`]s (patches, selection, focus, edit sessions) from
//! the receiver returned at construction.

/// Programmatic editing operations over the engine.
pub mod api;
/// Internal node tree, selection, history and edit transforms.
pub mod engine;
/// Event/command protocol between the editor and its host.
pub mod events;
/// Document ⇄ engine conversion: values, selections, patches.
pub mod mapping;
/// Object-editing orchestration on top of the surface.
pub mod orchestrator;
/// Rendering, input, composition and paste handling.
pub mod surface;

#[cfg(test)]
mod tests;

pub use api::{AnnotationPaths, DeleteMode, EditableApi};
pub use events::{drain, event_channel, EditorCmd, EditorEvent, EventSink};
pub use orchestrator::{
    EditKind, EditModal, ObjectEditData, ObjectEditOrchestrator, ObjectEditSession,
};
pub use surface::{
    ClipboardData, DefaultRenderers, EditableSurface, InputEvent, InputOutcome, PasteDisposition,
    PasteHandler, PasteInput, PasteResolution, PasteResult, RenderNode, Renderers,
};

use tracing_subscriber::EnvFilter;

/// Install a compact `tracing` formatter honouring `RUST_LOG`.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("ptedit=info,ptedit_editor=info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}
