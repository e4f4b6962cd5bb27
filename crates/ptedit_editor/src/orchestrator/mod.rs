//! Object-editing orchestrator: the editor the host actually talks to.
//!
//! Wraps the editable surface and decides, from the host's focus path,
//! when a nested editor for an object block, inline object or annotation
//! opens and closes. Patches and focus paths from that nested editor are
//! re-rooted onto the document before they reach the host.

pub mod edit;
pub mod focus;

pub use edit::{EditKind, EditModal, ModalOverrides, ObjectEditData, ObjectEditSession};
pub use focus::{classify, FocusTarget};

use crate::events::{event_channel, EditorCmd, EditorEvent, EventSink};
use crate::surface::{EditableSurface, InputOutcome};
use crossbeam_channel::Receiver;
use ptedit_core::models::block::document_to_value;
use ptedit_core::models::path::resolve_value;
use ptedit_core::{
    Document, EditorConfig, FormFieldPresence, KeyGenerator, Marker, PatchEvent, Path,
    RandomKeys, Selection,
};
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, info, warn};

const LOG_TARGET: &str = "ptedit_editor::orchestrator";

/// An open deferred to the next tick, valid only for its generation.
#[derive(Clone, Debug, PartialEq, Eq)]
struct PendingOpen {
    generation: u64,
    data: ObjectEditData,
}

/// Portable-text editor with object editing.
pub struct ObjectEditOrchestrator {
    surface: EditableSurface,
    events: EventSink,
    is_active: bool,
    host_read_only: bool,
    edit: Option<ObjectEditData>,
    selection_to_restore: Option<Selection>,
    generation: u64,
    pending_open: Option<PendingOpen>,
    focus_path: Option<Path>,
    /// Editor path just closed; the host's echo of it must not reopen it.
    suppress_reopen: Option<Path>,
    presence: Vec<FormFieldPresence>,
    modals: ModalOverrides,
    fullscreen: bool,
}

impl ObjectEditOrchestrator {
    /// Create an editor and the receiver its events arrive on.
    pub fn new(config: EditorConfig) -> (Self, Receiver<EditorEvent>) {
        Self::with_keys(config, Box::new(RandomKeys))
    }

    pub fn with_keys(
        config: EditorConfig,
        keys: Box<dyn KeyGenerator>,
    ) -> (Self, Receiver<EditorEvent>) {
        let (events, rx) = event_channel();
        let host_read_only = config.read_only;
        let mut surface = EditableSurface::with_keys(config, keys, events.clone());
        surface.set_read_only(true);
        let orchestrator = Self {
            surface,
            events,
            is_active: false,
            host_read_only,
            edit: None,
            selection_to_restore: None,
            generation: 0,
            pending_open: None,
            focus_path: None,
            suppress_reopen: None,
            presence: Vec::new(),
            modals: ModalOverrides::default(),
            fullscreen: false,
        };
        (orchestrator, rx)
    }

    pub fn surface(&self) -> &EditableSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut EditableSurface {
        &mut self.surface
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn object_edit_data(&self) -> Option<&ObjectEditData> {
        self.edit.as_ref()
    }

    pub fn selection_to_restore(&self) -> Option<&Selection> {
        self.selection_to_restore.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn has_pending_open(&self) -> bool {
        self.pending_open.is_some()
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn modals_mut(&mut self) -> &mut ModalOverrides {
        &mut self.modals
    }

    /// Read-only when the host says so or the surface was never focused.
    pub fn is_read_only(&self) -> bool {
        self.host_read_only || !self.is_active
    }

    fn sync_read_only(&mut self) {
        let read_only = self.is_read_only();
        self.surface.set_read_only(read_only);
    }

    fn activate(&mut self) {
        self.is_active = true;
        self.sync_read_only();
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.host_read_only = read_only;
        self.sync_read_only();
    }

    pub fn set_value(&mut self, value: Option<Document>) {
        self.surface.set_value(value);
    }

    pub fn set_selection(&mut self, selection: Option<Selection>) {
        self.surface.set_selection(selection);
    }

    pub fn set_markers(&mut self, markers: Vec<Marker>) {
        self.surface.set_markers(markers);
    }

    pub fn set_presence(&mut self, presence: Vec<FormFieldPresence>) {
        self.presence = presence;
    }

    /// React to a changed host focus path.
    ///
    /// Annotations open immediately with their span selected; object blocks
    /// and inline objects are selected now and open on the next
    /// [`tick`](Self::tick). Nothing happens while an object is open.
    pub fn set_focus_path(&mut self, path: Option<Path>) {
        if path == self.focus_path {
            if self.echoes_closed(path.as_ref()) {
                self.suppress_reopen = None;
            }
            return;
        }
        let echoes_pending = self.pending_open.as_ref().is_some_and(|pending| {
            path.as_ref()
                .is_some_and(|p| p.starts_with(&pending.data.editor_path))
        });
        self.focus_path = path.clone();
        if echoes_pending {
            return;
        }
        self.generation += 1;
        if self.echoes_closed(path.as_ref()) {
            debug!(target: LOG_TARGET, "focus echoes a closed editor; not reopening");
            self.suppress_reopen = None;
            return;
        }
        self.suppress_reopen = None;
        if self.edit.is_some() {
            return;
        }
        let Some(path) = path else {
            return;
        };
        match classify(&path, &self.surface.document()) {
            FocusTarget::Annotation {
                span_path,
                form_path,
            } => {
                self.surface.select_path(&span_path);
                self.activate();
                self.open(ObjectEditData {
                    editor_path: span_path,
                    form_builder_path: form_path,
                    kind: EditKind::Annotation,
                });
            }
            FocusTarget::BlockObject { path } => self.defer_open(path, EditKind::BlockObject),
            FocusTarget::InlineObject { path } => self.defer_open(path, EditKind::InlineObject),
            FocusTarget::Other => {}
        }
    }

    pub fn focus_path(&self) -> Option<&Path> {
        self.focus_path.as_ref()
    }

    fn defer_open(&mut self, path: Path, kind: EditKind) {
        self.surface.select_path(&path);
        self.activate();
        debug!(
            target: LOG_TARGET,
            %path,
            ?kind,
            generation = self.generation,
            "open deferred to next tick"
        );
        self.pending_open = Some(PendingOpen {
            generation: self.generation,
            data: ObjectEditData {
                editor_path: path.clone(),
                form_builder_path: path,
                kind,
            },
        });
    }

    fn open(&mut self, data: ObjectEditData) {
        info!(
            target: LOG_TARGET,
            path = %data.form_builder_path,
            kind = ?data.kind,
            "object editor opened"
        );
        self.edit = Some(data.clone());
        self.events.emit(EditorEvent::EditOpened { data });
    }

    /// Run deferred work: surface timers, pending pastes, deferred opens.
    pub fn tick(&mut self, now: Instant) {
        self.surface.tick(now);
        let Some(pending) = self.pending_open.take() else {
            return;
        };
        if pending.generation != self.generation {
            debug!(
                target: LOG_TARGET,
                stale = pending.generation,
                current = self.generation,
                "stale deferred open dropped"
            );
            return;
        }
        if self.edit.is_some() {
            return;
        }
        let document = document_to_value(&self.surface.document());
        if resolve_value(&document, &pending.data.form_builder_path).is_none() {
            warn!(
                target: LOG_TARGET,
                path = %pending.data.form_builder_path,
                "object vanished before its editor opened"
            );
            return;
        }
        self.open(pending.data);
    }

    /// Close the open object editor and put the caret back on it.
    pub fn close_edit(&mut self) {
        let Some(data) = self.edit.take() else {
            return;
        };
        self.pending_open = None;
        self.events.emit(EditorEvent::EditClosed {
            editor_path: data.editor_path.clone(),
        });
        self.surface.select_path_silently(&data.editor_path);
        self.events.emit(EditorEvent::Focus {
            path: data.editor_path.clone(),
        });
        self.selection_to_restore = self.surface.selection();
        info!(target: LOG_TARGET, path = %data.editor_path, "object editor closed");
        self.suppress_reopen = Some(data.editor_path);
    }

    fn echoes_closed(&self, path: Option<&Path>) -> bool {
        match (&self.suppress_reopen, path) {
            (Some(closed), Some(path)) => path.starts_with(closed),
            _ => false,
        }
    }

    /// Re-root a nested form's patches onto the document and emit them.
    pub fn on_form_builder_change(&mut self, event: PatchEvent) {
        let Some(data) = &self.edit else {
            warn!(
                target: LOG_TARGET,
                patches = event.patches.len(),
                "form change without an open editor; dropped"
            );
            return;
        };
        let prefixed = event.prefixed(&data.form_builder_path);
        if !prefixed.is_empty() {
            self.events.emit(EditorEvent::Change(prefixed));
        }
    }

    /// Forward a nested form focus path, only while an editor is open.
    pub fn on_form_builder_focus(&mut self, path: &Path) {
        if let Some(data) = &self.edit {
            self.events.emit(EditorEvent::Focus {
                path: data.form_builder_path.join(path),
            });
        }
    }

    /// Surface focus changes from the host.
    pub fn handle_focus(&mut self, has_focus: bool) {
        if has_focus {
            self.activate();
            self.surface.focus();
        } else {
            self.surface.blur();
        }
    }

    pub fn focus(&mut self) {
        self.handle_focus(true);
    }

    pub fn blur(&mut self) {
        self.handle_focus(false);
    }

    pub fn toggle_fullscreen(&mut self) {
        self.selection_to_restore = self.surface.selection();
        self.fullscreen = !self.fullscreen;
        self.events.emit(EditorEvent::FullscreenToggle);
    }

    /// Re-apply the selection recorded by the last close or fullscreen toggle.
    pub fn restore_selection(&mut self) -> bool {
        match self.selection_to_restore.clone() {
            Some(selection) => self.surface.select(&selection),
            None => false,
        }
    }

    /// The open edit session as the host's form renderer needs it.
    pub fn edit_session(&self) -> Option<ObjectEditSession> {
        let data = self.edit.as_ref()?;
        let document = document_to_value(&self.surface.document());
        let value = resolve_value(&document, &data.form_builder_path)?.clone();
        let type_name = value
            .get("_type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Some(ObjectEditSession {
            data: data.clone(),
            modal: self.modals.resolve(&type_name, data.kind),
            type_name,
            value,
            anchor: self.surface.anchor(&data.form_builder_path).cloned(),
            markers: self
                .surface
                .markers()
                .iter()
                .filter(|marker| marker.path.starts_with(&data.form_builder_path))
                .cloned()
                .collect(),
            presence: self.presence.clone(),
        })
    }

    /// Apply one host command.
    ///
    /// # Returns
    /// The surface outcome for `Input` commands, `None` otherwise.
    pub fn dispatch(&mut self, cmd: EditorCmd, now: Instant) -> Option<InputOutcome> {
        let span = tracing::debug_span!("editor_cmd", generation = self.generation);
        let _guard = span.enter();
        match cmd {
            EditorCmd::SetValue { value } => self.set_value(value),
            EditorCmd::SetFocusPath { path } => self.set_focus_path(path),
            EditorCmd::SetSelection { selection } => self.set_selection(selection),
            EditorCmd::SetMarkers { markers } => self.set_markers(markers),
            EditorCmd::SetPresence { presence } => self.set_presence(presence),
            EditorCmd::SetReadOnly { read_only } => self.set_read_only(read_only),
            EditorCmd::Input { event } => return Some(self.surface.handle_input(event, now)),
            EditorCmd::Focus => self.focus(),
            EditorCmd::Blur => self.blur(),
            EditorCmd::CloseEdit => self.close_edit(),
            EditorCmd::FormChange { patches } => {
                self.on_form_builder_change(PatchEvent::new(patches))
            }
            EditorCmd::FormFocus { path } => self.on_form_builder_focus(&path),
            EditorCmd::ToggleFullscreen => self.toggle_fullscreen(),
            EditorCmd::RestoreSelection => {
                self.restore_selection();
            }
            EditorCmd::ToggleMark { mark } => {
                self.surface.with_api(now, |api| api.toggle_mark(&mark));
            }
            EditorCmd::ToggleBlockStyle { style } => {
                self.surface
                    .with_api(now, |api| api.toggle_block_style(&style));
            }
            EditorCmd::AddAnnotation { type_name, fields } => {
                self.surface
                    .with_api(now, |api| api.add_annotation(&type_name, fields));
            }
            EditorCmd::InsertBlock { block } => {
                self.surface.with_api(now, |api| api.insert_block(block));
            }
            EditorCmd::InsertChild { child } => {
                self.surface.with_api(now, |api| api.insert_child(child));
            }
            EditorCmd::Undo => {
                self.surface.with_api(now, |api| api.undo());
            }
            EditorCmd::Redo => {
                self.surface.with_api(now, |api| api.redo());
            }
            EditorCmd::Tick { .. } => self.tick(now),
        }
        None
    }
}

