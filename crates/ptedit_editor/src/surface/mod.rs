//! Editable surface: owns the engine and connects it to the host.
//!
//! The surface takes the host's props (document, selection, markers),
//! feeds native input into the facade, renders through host renderers and
//! reports every local change as a patch event.

pub mod anchors;
pub mod composition;
pub mod hotkeys;
pub mod paste;
pub mod render;

pub use anchors::{AnchorHandle, AnchorRegistry, AnchorRole};
pub use composition::CompositionState;
pub use hotkeys::{HotkeyAction, HotkeyMap, KeyChord, Modifiers};
pub use paste::{
    ClipboardData, DefaultInsertion, PasteDisposition, PasteHandler, PasteInput, PasteOutcome,
    PasteResolution, PasteResult,
};
pub use render::{BlockStyle, DefaultRenderers, RenderNode, RenderProps, Renderers};

use crate::api::{DeleteMode, EditableApi};
use crate::engine::transforms::{self, FlatPos};
use crate::engine::Engine;
use crate::events::{EditorEvent, EventSink};
use crate::mapping::{
    diff_documents, from_engine_nodes, normalize_selection, reconcile, to_external_selection,
};
use crossbeam_channel::TryRecvError;
use paste::PendingPaste;
use ptedit_core::{
    Block, Document, EditorConfig, EditorError, KeyGenerator, Marker, PatchEvent, Path,
    RandomKeys, Selection,
};
use render::RenderPass;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

const LOG_TARGET: &str = "ptedit_editor::surface";

/// Native input delivered by the host.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InputEvent {
    /// Before-input text insertion.
    Text { text: String },
    Key {
        key: String,
        #[serde(default)]
        modifiers: Modifiers,
    },
    CompositionStart,
    CompositionUpdate { text: String },
    CompositionEnd { text: String },
    Paste { data: ClipboardData },
    Copy,
    Cut,
    /// The user moved the native selection.
    Select { selection: Selection },
}

impl InputEvent {
    /// Whether the event can change the document.
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Self::Copy | Self::Select { .. })
    }
}

/// What the surface did with an [`InputEvent`].
#[derive(Clone, Debug, PartialEq)]
pub enum InputOutcome {
    Ignored,
    Applied,
    /// Copy/cut payload for the host clipboard.
    Clipboard(ClipboardData),
    Paste(PasteDisposition),
}

/// The editable surface component.
pub struct EditableSurface {
    engine: Engine,
    config: EditorConfig,
    keys: Box<dyn KeyGenerator>,
    /// Document as the host last saw it; patches are computed against it.
    baseline: Option<Document>,
    selection_prop: Option<Selection>,
    last_selection: Option<Selection>,
    composition: CompositionState,
    hotkeys: HotkeyMap,
    paste_handler: Option<Box<dyn PasteHandler>>,
    pending_paste: Option<PendingPaste>,
    anchors: AnchorRegistry,
    markers: Vec<Marker>,
    read_only: bool,
    render_passes: u64,
    events: EventSink,
}

impl EditableSurface {
    pub fn new(config: EditorConfig, events: EventSink) -> Self {
        Self::with_keys(config, Box::new(RandomKeys), events)
    }

    /// Build a surface with an explicit key source (deterministic in tests and replays).
    pub fn with_keys(
        config: EditorConfig,
        mut keys: Box<dyn KeyGenerator>,
        events: EventSink,
    ) -> Self {
        let mut engine = Engine::new(config.history_max_ops);
        let (blocks, placeholder) = crate::mapping::to_engine_nodes(None, keys.as_mut());
        engine.sync_blocks(blocks, placeholder, true);
        Self {
            engine,
            read_only: config.read_only,
            config,
            keys,
            baseline: None,
            selection_prop: None,
            last_selection: None,
            composition: CompositionState::default(),
            hotkeys: HotkeyMap::default(),
            paste_handler: None,
            pending_paste: None,
            anchors: AnchorRegistry::default(),
            markers: Vec::new(),
            render_passes: 0,
            events,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Facade over the engine. Call [`EditableSurface::flush`] afterwards to
    /// report what it changed.
    pub fn api(&mut self, now: Instant) -> EditableApi<'_> {
        EditableApi::new(&mut self.engine, self.keys.as_mut(), &self.config, now)
    }

    pub fn set_paste_handler(&mut self, handler: Option<Box<dyn PasteHandler>>) {
        self.paste_handler = handler;
    }

    pub fn hotkeys_mut(&mut self) -> &mut HotkeyMap {
        &mut self.hotkeys
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only || self.config.read_only
    }

    pub fn composition(&self) -> &CompositionState {
        &self.composition
    }

    pub fn is_composing(&self) -> bool {
        self.composition.composing
    }

    pub fn has_pending_paste(&self) -> bool {
        self.pending_paste.is_some()
    }

    pub fn set_markers(&mut self, markers: Vec<Marker>) {
        self.markers = markers;
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn anchor(&self, path: &Path) -> Option<&AnchorHandle> {
        self.anchors.get(path)
    }

    /// The document as the engine holds it; `None` while only the placeholder is shown.
    pub fn value(&self) -> Option<Document> {
        if self.engine.is_placeholder_only() {
            None
        } else {
            Some(self.document())
        }
    }

    /// Engine content including a placeholder line.
    pub fn document(&self) -> Document {
        from_engine_nodes(self.engine.blocks())
    }

    /// Engine selection in document terms.
    pub fn selection(&self) -> Option<Selection> {
        let range = self.engine.selection()?;
        to_external_selection(range, &self.document())
    }

    /// Accept a new document snapshot from the host.
    ///
    /// Pending local changes are flushed first. While composing the
    /// snapshot is dropped: the engine keeps its content and the next flush
    /// reports patches against the previous baseline.
    pub fn set_value(&mut self, value: Option<Document>) {
        self.flush();
        if self.composition.composing {
            debug!(
                target: LOG_TARGET,
                blocks = value.as_ref().map_or(0, Vec::len),
                "composing; external value dropped"
            );
            return;
        }
        let mut blocks = self.engine.blocks().to_vec();
        let outcome = reconcile(
            &mut blocks,
            value.as_deref(),
            self.config.reconcile,
            self.engine.placeholder_key(),
            self.keys.as_mut(),
        );
        debug!(
            target: LOG_TARGET,
            replaced = outcome.replaced,
            appended = outcome.appended,
            removed = outcome.removed,
            moved = outcome.moved,
            "value reconciled"
        );
        let structural = outcome.is_structural();
        self.engine
            .sync_blocks(blocks, outcome.placeholder_key, structural);
        self.baseline = value;
        self.last_selection = self.selection();
    }

    /// Accept the host's selection prop.
    ///
    /// Applied only when it differs from the engine selection and still
    /// resolves once normalized against the current document.
    pub fn set_selection(&mut self, selection: Option<Selection>) {
        self.selection_prop = selection.clone();
        let Some(selection) = selection else {
            return;
        };
        if self.selection().as_ref() == Some(&selection) {
            return;
        }
        match normalize_selection(&selection, &self.document()) {
            Some(normalized) => {
                if self.api(Instant::now()).select(&normalized) {
                    self.last_selection = Some(normalized);
                }
            }
            None => warn!(
                target: LOG_TARGET,
                focus = %selection.focus.path,
                "selection prop does not resolve; ignoring"
            ),
        }
    }

    pub fn selection_prop(&self) -> Option<&Selection> {
        self.selection_prop.as_ref()
    }

    /// Select whatever `path` addresses and report it.
    pub fn select_path(&mut self, path: &Path) -> bool {
        let selected = self.api(Instant::now()).select_path(path);
        self.flush();
        selected
    }

    /// Select `path` without reporting it; the caller announces focus itself.
    pub(crate) fn select_path_silently(&mut self, path: &Path) -> bool {
        let selected = self.api(Instant::now()).select_path(path);
        self.last_selection = self.selection();
        selected
    }

    /// Normalize and apply an editor-originated selection, then report it.
    pub fn select(&mut self, selection: &Selection) -> bool {
        let selected = match normalize_selection(selection, &self.document()) {
            Some(normalized) => self.api(Instant::now()).select(&normalized),
            None => {
                warn!(
                    target: LOG_TARGET,
                    focus = %selection.focus.path,
                    "selection no longer resolves"
                );
                false
            }
        };
        self.flush();
        selected
    }

    pub fn focus(&mut self) {
        self.engine.set_focused(true);
        self.flush();
    }

    pub fn blur(&mut self) {
        if self.engine.is_focused() {
            self.engine.set_focused(false);
            self.events.emit(EditorEvent::Blur);
        }
    }

    pub fn is_focused(&self) -> bool {
        self.engine.is_focused()
    }

    /// Apply native input, then flush.
    pub fn handle_input(&mut self, event: InputEvent, now: Instant) -> InputOutcome {
        if event.is_mutating() && self.is_read_only() {
            debug!(target: LOG_TARGET, ?event, "read-only; input ignored");
            return InputOutcome::Ignored;
        }
        let quiet = self.config.composition_quiet_period;
        let outcome = match event {
            InputEvent::Text { text } => {
                self.composition.touch(now, quiet);
                applied(self.api(now).insert_text(&text))
            }
            InputEvent::Key { key, modifiers } => self.apply_hotkey(&key, modifiers, now),
            InputEvent::CompositionStart => {
                self.composition.touch(now, quiet);
                InputOutcome::Applied
            }
            InputEvent::CompositionUpdate { text } => {
                self.composition.update_preedit(&text, now, quiet);
                InputOutcome::Applied
            }
            InputEvent::CompositionEnd { text } => {
                self.composition.commit(now, quiet);
                applied(self.api(now).insert_text(&text))
            }
            InputEvent::Paste { data } => InputOutcome::Paste(self.paste(data, now)),
            InputEvent::Copy => match self.selection_fragment() {
                Some(fragment) => InputOutcome::Clipboard(paste::clipboard_for_fragment(&fragment)),
                None => InputOutcome::Ignored,
            },
            InputEvent::Cut => match self.selection_fragment() {
                Some(fragment) => {
                    self.api(now).delete(None, DeleteMode::Selected);
                    InputOutcome::Clipboard(paste::clipboard_for_fragment(&fragment))
                }
                None => InputOutcome::Ignored,
            },
            InputEvent::Select { selection } => applied(self.api(now).select(&selection)),
        };
        self.flush();
        outcome
    }

    fn apply_hotkey(&mut self, key: &str, modifiers: Modifiers, now: Instant) -> InputOutcome {
        let Some(action) = self.hotkeys.action_for(key, modifiers).cloned() else {
            return InputOutcome::Ignored;
        };
        if self.composition.has_preedit() {
            self.composition.commit(now, self.config.composition_quiet_period);
        }
        let mut api = self.api(now);
        applied(match action {
            HotkeyAction::ToggleMark(mark) => api.toggle_mark(&mark),
            HotkeyAction::Undo => api.undo(),
            HotkeyAction::Redo => api.redo(),
            HotkeyAction::SplitBlock => api.split_block(),
            HotkeyAction::DeleteBackward(unit) => api.delete_backward(unit),
            HotkeyAction::DeleteForward(unit) => api.delete_forward(unit),
        })
    }

    /// Selected content as a standalone fragment; `None` for a collapsed selection.
    pub fn selection_fragment(&mut self) -> Option<Vec<Block>> {
        let range = self.engine.selection()?;
        let blocks = self.engine.blocks();
        let (start, end) = transforms::flat_range(blocks, range);
        if start == end {
            return None;
        }
        let mut nodes = blocks.get(start.block..=end.block)?.to_vec();
        let last = nodes.len() - 1;
        let tail = transforms::end_of(&nodes, last);
        let keys = self.keys.as_mut();
        transforms::delete_range(&mut nodes, FlatPos::new(last, end.offset), tail, keys);
        transforms::delete_range(
            &mut nodes,
            FlatPos::new(0, 0),
            FlatPos::new(0, start.offset),
            keys,
        );
        Some(from_engine_nodes(&nodes))
    }

    fn paste(&mut self, data: ClipboardData, now: Instant) -> PasteDisposition {
        let Some(selection) = self.selection() else {
            debug!(target: LOG_TARGET, "paste without selection; default not prevented");
            return PasteDisposition::Ignored;
        };
        if self.pending_paste.is_some() {
            debug!(target: LOG_TARGET, "paste while another is pending; dropped");
            return PasteDisposition::Pending;
        }
        let Some(mut handler) = self.paste_handler.take() else {
            self.default_paste(&data, now);
            return PasteDisposition::Handled;
        };
        self.events.emit(EditorEvent::Loading { is_loading: true });
        let input = PasteInput {
            event: data.clone(),
            value: self.value(),
            focus_path: Some(selection.focus.path.clone()),
            selection: Some(selection),
        };
        let resolution = handler.on_paste(input);
        self.paste_handler = Some(handler);
        match resolution {
            PasteResolution::Ready(outcome) => {
                self.resolve_paste(outcome, &data, now);
                PasteDisposition::Handled
            }
            PasteResolution::Pending(receiver) => {
                info!(target: LOG_TARGET, "paste handler pending");
                self.pending_paste = Some(PendingPaste {
                    receiver,
                    clipboard: data,
                });
                PasteDisposition::Pending
            }
        }
    }

    fn resolve_paste(&mut self, outcome: PasteOutcome, clipboard: &ClipboardData, now: Instant) {
        match outcome {
            Ok(Some(PasteResult {
                insert: Some(fragment),
                path,
            })) if !fragment.is_empty() => {
                let mut api = self.api(now);
                if let Some(path) = path {
                    api.select_path(&path);
                }
                api.insert_fragment(fragment);
            }
            Ok(_) => self.default_paste(clipboard, now),
            Err(err) => {
                warn!(
                    target: LOG_TARGET,
                    error = %err,
                    "paste handler failed; using default insertion"
                );
                self.default_paste(clipboard, now);
            }
        }
        self.events.emit(EditorEvent::Loading { is_loading: false });
    }

    fn default_paste(&mut self, clipboard: &ClipboardData, now: Instant) {
        match paste::default_insertion(clipboard, self.keys.as_mut()) {
            Some(DefaultInsertion::Text(text)) => {
                self.api(now).insert_text(&text);
            }
            Some(DefaultInsertion::Fragment(fragment)) => {
                self.api(now).insert_fragment(fragment);
            }
            None => debug!(target: LOG_TARGET, "clipboard has nothing insertable"),
        }
    }

    fn poll_paste(&mut self, now: Instant) {
        let Some(pending) = self.pending_paste.take() else {
            return;
        };
        match pending.receiver.try_recv() {
            Ok(outcome) => self.resolve_paste(outcome, &pending.clipboard, now),
            Err(TryRecvError::Empty) => self.pending_paste = Some(pending),
            Err(TryRecvError::Disconnected) => self.resolve_paste(
                Err(EditorError::PasteHandler(
                    "handler dropped its result channel".to_string(),
                )),
                &pending.clipboard,
                now,
            ),
        }
    }

    /// Advance deferred work: composition quiet period and pending pastes.
    pub fn tick(&mut self, now: Instant) {
        if self.composition.tick(now) {
            debug!(target: LOG_TARGET, "composition ended");
        }
        self.poll_paste(now);
        self.flush();
    }

    /// Report local changes: a `Change` when the document moved, then
    /// `Selection` and `Focus` when the selection did.
    pub fn flush(&mut self) {
        if self.engine.has_unflushed_changes() {
            let current = self.value();
            let patches = diff_documents(
                self.baseline.as_deref().unwrap_or(&[]),
                current.as_deref().unwrap_or(&[]),
            );
            self.engine.mark_flushed();
            if !patches.is_empty() {
                debug!(
                    target: LOG_TARGET,
                    patches = patches.len(),
                    revision = self.engine.revision(),
                    "change"
                );
                self.events.emit(EditorEvent::Change(PatchEvent::new(patches)));
            }
            self.baseline = current;
        }
        let selection = self.selection();
        if selection != self.last_selection {
            self.last_selection = selection.clone();
            let focus = selection.as_ref().map(|s| s.focus.path.clone());
            self.events.emit(EditorEvent::Selection { selection });
            if let Some(path) = focus {
                self.events.emit(EditorEvent::Focus { path });
            }
        }
    }

    /// Render the engine tree through `renderers`, refreshing anchors.
    pub fn render(&mut self, renderers: &mut dyn Renderers) -> Vec<RenderNode> {
        self.render_passes += 1;
        self.anchors.begin_pass(self.render_passes);
        let focus_path = self.selection().map(|selection| selection.focus.path);
        let pass = RenderPass {
            config: &self.config,
            markers: &self.markers,
            focus_path: focus_path.as_ref(),
        };
        pass.render(self.engine.blocks(), &mut self.anchors, renderers)
    }

    /// Run `f` against the facade as a single typed edit and flush.
    pub fn with_api<R>(&mut self, now: Instant, f: impl FnOnce(&mut EditableApi<'_>) -> R) -> R {
        let result = f(&mut self.api(now));
        self.flush();
        result
    }
}

fn applied(changed: bool) -> InputOutcome {
    if changed {
        InputOutcome::Applied
    } else {
        InputOutcome::Ignored
    }
}
