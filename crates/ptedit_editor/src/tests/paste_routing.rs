//! Paste: default insertion, synchronous handlers, pending handlers.

use super::*;
use crate::surface::{ClipboardData, PasteDisposition, PasteInput, PasteResolution, PasteResult};
use ptedit_core::{Block, EditorError, ObjectBlock, Point};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

fn block_texts(harness: &Harness) -> Vec<String> {
    harness
        .value()
        .unwrap_or_default()
        .iter()
        .map(|block| block.as_text().map(|text| text.plain_text()).unwrap_or_default())
        .collect()
}

fn loading_events(events: &[EditorEvent]) -> Vec<bool> {
    events
        .iter()
        .filter_map(|event| match event {
            EditorEvent::Loading { is_loading } => Some(*is_loading),
            _ => None,
        })
        .collect()
}

fn paste(harness: &mut Harness, data: ClipboardData) -> InputOutcome {
    harness.input(InputEvent::Paste { data })
}

fn editor_at_end_of_second() -> Harness {
    let mut harness = make_focused_editor();
    harness.select(Selection::collapsed(Path::child("b2", "s4"), 6));
    harness.drain();
    harness
}

fn set_handler<F>(harness: &mut Harness, handler: F)
where
    F: FnMut(PasteInput) -> PasteResolution + 'static,
{
    harness
        .editor
        .surface_mut()
        .set_paste_handler(Some(Box::new(handler)));
}

#[test]
fn paste_without_selection_is_left_to_the_host() {
    let mut harness = make_focused_editor();
    assert_eq!(
        paste(&mut harness, ClipboardData::plain("x")),
        InputOutcome::Paste(PasteDisposition::Ignored)
    );
    assert!(harness.drain().is_empty());
}

#[test]
fn paste_into_read_only_editor_is_ignored() {
    let mut harness = make_editor();
    harness.select(Selection::collapsed(Path::child("b2", "s4"), 6));
    assert_eq!(
        paste(&mut harness, ClipboardData::plain("x")),
        InputOutcome::Ignored
    );
    assert_eq!(block_texts(&harness)[2], "Second");
}

#[test]
fn single_line_plain_text_is_typed_at_the_caret() {
    let mut harness = editor_at_end_of_second();
    assert_eq!(
        paste(&mut harness, ClipboardData::plain(" more")),
        InputOutcome::Paste(PasteDisposition::Handled)
    );
    assert_eq!(block_texts(&harness)[2], "Second more");
    assert!(loading_events(&harness.drain()).is_empty());
}

#[test]
fn multi_line_plain_text_becomes_blocks() {
    let mut harness = editor_at_end_of_second();
    paste(&mut harness, ClipboardData::plain("one\ntwo"));

    assert_eq!(
        block_texts(&harness),
        vec!["Hello world!", "", "Second", "one", "two"]
    );
    let value = harness.value().expect("value");
    let keys: HashSet<&str> = value.iter().map(Block::key).collect();
    assert_eq!(keys.len(), value.len());
    assert_eq!(
        harness.selection().map(|s| s.focus),
        Some(Point::new(
            Path::child(
                value[4].key(),
                value[4].as_text().expect("text").children[0].key()
            ),
            3
        ))
    );
}

#[test]
fn portable_text_clipboard_is_rekeyed_and_spliced() {
    let mut harness = editor_at_end_of_second();
    let fragment = json!([
        {"_key": "b1", "_type": "block", "style": "normal",
         "markDefs": [{"_key": "m1", "_type": "link", "href": "https://other.example"}],
         "children": [{"_key": "s1", "_type": "span", "text": " linked", "marks": ["m1"]}]}
    ]);
    paste(
        &mut harness,
        ClipboardData {
            portable_text: Some(fragment.to_string()),
            plain_text: Some(" linked".to_string()),
        },
    );

    let value = harness.value().expect("value");
    assert_eq!(value.len(), 3);
    let second = value[2].as_text().expect("text block");
    assert_eq!(second.plain_text(), "Second linked");
    let pasted_def = second
        .mark_defs
        .iter()
        .find(|def| def.fields.get("href") == Some(&json!("https://other.example")))
        .expect("pasted link definition");
    assert_ne!(pasted_def.key, "m1");
    let pasted_span = second
        .children
        .iter()
        .filter_map(|span| span.as_text())
        .find(|span| span.text == " linked")
        .expect("pasted span");
    assert_ne!(pasted_span.key, "s1");
    assert_eq!(pasted_span.marks, vec![pasted_def.key.clone()]);

    // The original link in the first block is untouched.
    let first = value[0].as_text().expect("text block");
    assert_eq!(first.mark_defs.len(), 1);
    assert_eq!(first.mark_defs[0].key, "m1");
}

#[test]
fn unparsable_portable_text_falls_back_to_plain_text() {
    let mut harness = editor_at_end_of_second();
    paste(
        &mut harness,
        ClipboardData {
            portable_text: Some("{not json".to_string()),
            plain_text: Some("!".to_string()),
        },
    );
    assert_eq!(block_texts(&harness)[2], "Second!");
}

#[test]
fn handler_fragment_is_inserted_with_its_own_keys() {
    let mut harness = editor_at_end_of_second();
    let seen: Rc<RefCell<Vec<PasteInput>>> = Rc::default();
    let log = Rc::clone(&seen);
    set_handler(&mut harness, move |input: PasteInput| {
        log.borrow_mut().push(input);
        let image = ObjectBlock::new("pasted-img", "image")
            .with_field("asset", json!({"_ref": "image-9"}));
        PasteResolution::Ready(Ok(Some(PasteResult {
            insert: Some(vec![Block::Object(image)]),
            path: None,
        })))
    });

    assert_eq!(
        paste(&mut harness, ClipboardData::plain("ignored")),
        InputOutcome::Paste(PasteDisposition::Handled)
    );
    let events = harness.drain();
    assert_eq!(loading_events(&events), vec![true, false]);
    assert_eq!(change_events(&events).len(), 1);

    let value = harness.value().expect("value");
    assert_eq!(value[3].key(), "pasted-img");
    assert_eq!(block_texts(&harness)[2], "Second");

    let inputs = seen.borrow();
    assert_eq!(inputs.len(), 1);
    assert_eq!(inputs[0].focus_path, Some(Path::child("b2", "s4")));
    assert_eq!(inputs[0].event, ClipboardData::plain("ignored"));
    assert!(inputs[0].value.is_some());
}

#[test]
fn handler_without_insert_falls_back_to_default() {
    let mut harness = editor_at_end_of_second();
    set_handler(&mut harness, |_: PasteInput| PasteResolution::Ready(Ok(None)));
    paste(&mut harness, ClipboardData::plain("?"));
    assert_eq!(block_texts(&harness)[2], "Second?");
    assert_eq!(loading_events(&harness.drain()), vec![true, false]);
}

#[test]
fn handler_error_falls_back_to_default() {
    let mut harness = editor_at_end_of_second();
    set_handler(&mut harness, |_: PasteInput| {
        PasteResolution::Ready(Err(EditorError::PasteHandler("upload failed".to_string())))
    });
    paste(&mut harness, ClipboardData::plain("?"));
    assert_eq!(block_texts(&harness)[2], "Second?");
}

#[test]
fn pending_handler_resolves_on_tick_at_requested_path() {
    let mut harness = editor_at_end_of_second();
    let (tx, rx) = crossbeam_channel::bounded(1);
    let mut receiver = Some(rx);
    set_handler(&mut harness, move |_: PasteInput| {
        PasteResolution::Pending(receiver.take().expect("single paste"))
    });

    assert_eq!(
        paste(&mut harness, ClipboardData::plain("unused")),
        InputOutcome::Paste(PasteDisposition::Pending)
    );
    assert!(harness.editor.surface().has_pending_paste());
    assert_eq!(loading_events(&harness.drain()), vec![true]);

    harness.tick();
    assert!(harness.editor.surface().has_pending_paste());
    assert!(harness.drain().is_empty());

    let fragment = doc(json!([
        {"_key": "f1", "_type": "block", "style": "normal", "markDefs": [],
         "children": [{"_key": "f1s", "_type": "span", "text": "Hey! ", "marks": []}]}
    ]));
    tx.send(Ok(Some(PasteResult {
        insert: Some(fragment),
        path: Some(Path::block("b1")),
    })))
    .expect("send");
    harness.tick();

    assert!(!harness.editor.surface().has_pending_paste());
    assert_eq!(block_texts(&harness)[0], "Hey! Hello world!");
    assert_eq!(block_texts(&harness)[2], "Second");
    let events = harness.drain();
    assert_eq!(loading_events(&events), vec![false]);
    assert_eq!(change_events(&events).len(), 1);
}

#[test]
fn dropped_pending_handler_falls_back_to_default() {
    let mut harness = editor_at_end_of_second();
    let (tx, rx) = crossbeam_channel::bounded(1);
    let mut receiver = Some(rx);
    set_handler(&mut harness, move |_: PasteInput| {
        PasteResolution::Pending(receiver.take().expect("single paste"))
    });
    paste(&mut harness, ClipboardData::plain("!"));
    drop(tx);

    harness.tick();
    assert!(!harness.editor.surface().has_pending_paste());
    assert_eq!(block_texts(&harness)[2], "Second!");
}

#[test]
fn paste_during_a_pending_paste_is_dropped() {
    let mut harness = editor_at_end_of_second();
    let (tx, rx) = crossbeam_channel::bounded(1);
    let calls = Rc::new(RefCell::new(0usize));
    let counter = Rc::clone(&calls);
    let mut receiver = Some(rx);
    set_handler(&mut harness, move |_: PasteInput| {
        *counter.borrow_mut() += 1;
        PasteResolution::Pending(receiver.take().expect("single paste"))
    });

    assert_eq!(
        paste(&mut harness, ClipboardData::plain("A")),
        InputOutcome::Paste(PasteDisposition::Pending)
    );
    assert_eq!(
        paste(&mut harness, ClipboardData::plain("B")),
        InputOutcome::Paste(PasteDisposition::Pending)
    );
    assert_eq!(*calls.borrow(), 1);
    assert_eq!(loading_events(&harness.drain()), vec![true]);

    tx.send(Ok(None)).expect("send");
    harness.tick();
    assert!(!harness.editor.surface().has_pending_paste());
    assert_eq!(block_texts(&harness)[2], "SecondA");
    assert_eq!(loading_events(&harness.drain()), vec![false]);
}

#[test]
fn copy_and_cut_produce_clipboard_payloads() {
    let mut harness = make_focused_editor();
    harness.select(Selection::new(
        Point::new(Path::child("b1", "s1"), 0),
        Point::new(Path::child("b1", "s1"), 5),
    ));

    let InputOutcome::Clipboard(copied) = harness.input(InputEvent::Copy) else {
        panic!("copy should produce clipboard data");
    };
    assert_eq!(copied.plain_text.as_deref(), Some("Hello"));
    assert!(copied.portable_text.is_some());
    assert_eq!(block_texts(&harness)[0], "Hello world!");

    let InputOutcome::Clipboard(cut) = harness.input(InputEvent::Cut) else {
        panic!("cut should produce clipboard data");
    };
    assert_eq!(cut.plain_text.as_deref(), Some("Hello"));
    assert_eq!(block_texts(&harness)[0], " world!");

    harness.select(Selection::collapsed(Path::child("b2", "s4"), 6));
    paste(&mut harness, cut);
    assert_eq!(block_texts(&harness)[2], "SecondHello");
}

#[test]
fn collapsed_copy_is_ignored() {
    let mut harness = make_focused_editor();
    harness.select(Selection::collapsed(Path::child("b1", "s1"), 2));
    assert_eq!(harness.input(InputEvent::Copy), InputOutcome::Ignored);
}
