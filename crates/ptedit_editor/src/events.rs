//! Event/command protocol between the editor and its host.
//!
//! Events flow out over a `crossbeam-channel` receiver the host drains
//! after every call; commands are the serialisable form of the imperative
//! API, used by replay scripts.

use crate::orchestrator::ObjectEditData;
use crate::surface::InputEvent;
use crossbeam_channel::{unbounded, Receiver, Sender};
use ptedit_core::{
    Block, Document, FormFieldPresence, InlineObject, Marker, Patch, PatchEvent, Path, Selection,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Events produced by the editor and polled by the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EditorEvent {
    /// The document changed; patches are relative to the last reported value.
    Change(PatchEvent),
    /// Focus moved to `path`.
    Focus { path: Path },
    Blur,
    /// The selection changed; `None` when it is no longer representable.
    Selection { selection: Option<Selection> },
    /// A paste handler started (`true`) or finished (`false`).
    Loading {
        #[serde(rename = "isLoading")]
        is_loading: bool,
    },
    FullscreenToggle,
    /// An object editor opened.
    EditOpened { data: ObjectEditData },
    /// The object editor for `editor_path` closed.
    EditClosed {
        #[serde(rename = "editorPath")]
        editor_path: Path,
    },
}

/// Commands a host (or a replay script) can dispatch.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EditorCmd {
    /// Replace the document snapshot; `null` clears it.
    SetValue { value: Option<Document> },
    SetFocusPath { path: Option<Path> },
    SetSelection { selection: Option<Selection> },
    SetMarkers { markers: Vec<Marker> },
    SetPresence { presence: Vec<FormFieldPresence> },
    #[serde(rename_all = "camelCase")]
    SetReadOnly { read_only: bool },
    /// Native input from the editable surface.
    Input { event: InputEvent },
    Focus,
    Blur,
    CloseEdit,
    /// Patches from the nested object form, relative to the open object.
    FormChange { patches: Vec<Patch> },
    /// Focus path inside the nested object form.
    FormFocus { path: Path },
    ToggleFullscreen,
    RestoreSelection,
    ToggleMark { mark: String },
    ToggleBlockStyle { style: String },
    #[serde(rename_all = "camelCase")]
    AddAnnotation {
        type_name: String,
        #[serde(default)]
        fields: Map<String, Value>,
    },
    InsertBlock { block: Block },
    InsertChild { child: InlineObject },
    Undo,
    Redo,
    /// Let time pass; the replay clock advances by `advance_ms` first.
    #[serde(rename_all = "camelCase")]
    Tick {
        #[serde(default)]
        advance_ms: u64,
    },
}

/// Sending half kept by the editor.
#[derive(Clone, Debug)]
pub struct EventSink {
    tx: Sender<EditorEvent>,
}

impl EventSink {
    /// Send `event`; a dropped receiver is not an error.
    pub fn emit(&self, event: EditorEvent) {
        tracing::trace!(target: "ptedit_editor::events", ?event, "emit");
        let _ = self.tx.send(event);
    }
}

/// Create a connected sink/receiver pair.
pub fn event_channel() -> (EventSink, Receiver<EditorEvent>) {
    let (tx, rx) = unbounded();
    (EventSink { tx }, rx)
}

/// Drain everything currently queued on `rx`.
pub fn drain(rx: &Receiver<EditorEvent>) -> Vec<EditorEvent> {
    rx.try_iter().collect()
}
