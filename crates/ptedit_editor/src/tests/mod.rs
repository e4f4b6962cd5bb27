//! Integration-style editor tests driving the orchestrator the way a host does.

use crate::events::{EditorCmd, EditorEvent};
use crate::orchestrator::ObjectEditOrchestrator;
use crate::surface::{InputEvent, InputOutcome, Modifiers};
use crossbeam_channel::Receiver;
use ptedit_core::models::block::document_from_value;
use ptedit_core::{Document, EditorConfig, Path, Selection, SequentialKeys};
use serde_json::{json, Value};
use std::time::{Duration, Instant};

mod paste_routing;

struct Harness {
    editor: ObjectEditOrchestrator,
    rx: Receiver<EditorEvent>,
    now: Instant,
}

fn doc(value: Value) -> Document {
    document_from_value(value).expect("document")
}

/// One text block with an annotated span and an inline object, an image
/// block, and a second text block.
fn sample_value() -> Value {
    json!([
        {"_key": "b1", "_type": "block", "style": "normal",
         "markDefs": [{"_key": "m1", "_type": "link", "href": "https://example.com"}],
         "children": [
            {"_key": "s1", "_type": "span", "text": "Hello ", "marks": []},
            {"_key": "s2", "_type": "span", "text": "world", "marks": ["m1"]},
            {"_key": "i1", "_type": "mention", "user": "ada"},
            {"_key": "s3", "_type": "span", "text": "!", "marks": []}
         ]},
        {"_key": "img", "_type": "image", "asset": {"_ref": "image-1"}},
        {"_key": "b2", "_type": "block", "style": "normal", "markDefs": [],
         "children": [{"_key": "s4", "_type": "span", "text": "Second", "marks": []}]}
    ])
}

fn make_editor_with(value: Option<Value>, config: EditorConfig) -> Harness {
    let (mut editor, rx) =
        ObjectEditOrchestrator::with_keys(config, Box::new(SequentialKeys::new("k")));
    editor.set_value(value.map(doc));
    let mut harness = Harness {
        editor,
        rx,
        now: Instant::now(),
    };
    harness.drain();
    harness
}

fn make_editor() -> Harness {
    make_editor_with(Some(sample_value()), EditorConfig::default())
}

/// Editor that has been focused, so it accepts input.
fn make_focused_editor() -> Harness {
    let mut harness = make_editor();
    harness.editor.focus();
    harness.drain();
    harness
}

impl Harness {
    fn drain(&mut self) -> Vec<EditorEvent> {
        self.rx.try_iter().collect()
    }

    fn advance(&mut self, ms: u64) {
        self.now += Duration::from_millis(ms);
    }

    fn tick(&mut self) {
        let now = self.now;
        self.editor.tick(now);
    }

    fn input(&mut self, event: InputEvent) -> InputOutcome {
        let now = self.now;
        self.editor.surface_mut().handle_input(event, now)
    }

    fn type_text(&mut self, text: &str) -> InputOutcome {
        self.input(InputEvent::Text {
            text: text.to_string(),
        })
    }

    fn key(&mut self, key: &str, modifiers: Modifiers) -> InputOutcome {
        self.input(InputEvent::Key {
            key: key.to_string(),
            modifiers,
        })
    }

    fn dispatch(&mut self, cmd: EditorCmd) -> Option<InputOutcome> {
        let now = self.now;
        self.editor.dispatch(cmd, now)
    }

    fn select(&mut self, selection: Selection) {
        self.input(InputEvent::Select { selection });
    }

    fn selection(&self) -> Option<Selection> {
        self.editor.surface().selection()
    }

    fn value(&self) -> Option<Document> {
        self.editor.surface().value()
    }
}

fn focus_events(events: &[EditorEvent]) -> Vec<Path> {
    events
        .iter()
        .filter_map(|event| match event {
            EditorEvent::Focus { path } => Some(path.clone()),
            _ => None,
        })
        .collect()
}

fn change_events(events: &[EditorEvent]) -> Vec<&ptedit_core::PatchEvent> {
    events
        .iter()
        .filter_map(|event| match event {
            EditorEvent::Change(patches) => Some(patches),
            _ => None,
        })
        .collect()
}
