use ptedit::{replay_files, EditorConfig, EditorEvent, Path};
use serde_json::json;
use std::fs;
use tempfile::TempDir;

fn write_fixture(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

fn script(lines: &[serde_json::Value]) -> String {
    lines
        .iter()
        .map(|line| line.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn replay_opens_and_closes_an_annotation_editor() {
    let dir = TempDir::new().expect("temp dir");
    let document = write_fixture(
        &dir,
        "doc.json",
        &json!([
            {"_key": "b", "_type": "block", "style": "normal",
             "markDefs": [{"_key": "m", "_type": "link", "href": "https://example.com"}],
             "children": [
                {"_key": "s1", "_type": "span", "text": "see ", "marks": []},
                {"_key": "s2", "_type": "span", "text": "docs", "marks": ["m"]}
             ]}
        ])
        .to_string(),
    );
    let commands = write_fixture(
        &dir,
        "script.jsonl",
        &script(&[
            json!({"type": "setFocusPath", "path": [{"_key": "b"}, "markDefs", {"_key": "m"}]}),
            json!({"type": "formChange", "patches": [
                {"type": "set", "path": ["href"], "value": "https://example.org"}
            ]}),
            json!({"type": "closeEdit"}),
        ]),
    );

    let output = replay_files(EditorConfig::default(), &document, &commands).expect("replay");
    let opened = output
        .events
        .iter()
        .position(|event| matches!(event, EditorEvent::EditOpened { .. }))
        .expect("edit opened");
    let closed = output
        .events
        .iter()
        .position(|event| matches!(event, EditorEvent::EditClosed { .. }))
        .expect("edit closed");
    assert!(opened < closed);
    assert_eq!(
        output.events.last(),
        Some(&EditorEvent::Focus {
            path: Path::child("b", "s2")
        })
    );
    let change = serde_json::to_value(&output.events[opened + 1]).expect("json");
    assert_eq!(change["type"], "change");
    assert_eq!(
        change["patches"][0]["path"],
        json!([{"_key": "b"}, "markDefs", {"_key": "m"}, "href"])
    );
}

#[test]
fn replay_from_null_document_types_into_placeholder() {
    let dir = TempDir::new().expect("temp dir");
    let document = write_fixture(&dir, "doc.json", "null");
    let commands = write_fixture(
        &dir,
        "script.jsonl",
        &script(&[
            json!({"type": "focus"}),
            json!({"type": "insertBlock", "block": {
                "_key": "intro", "_type": "block", "style": "normal", "markDefs": [],
                "children": [{"_key": "t", "_type": "span", "text": "Hello", "marks": []}]}}),
        ]),
    );

    let output = replay_files(EditorConfig::default(), &document, &commands).expect("replay");
    let value = output.value.expect("value");
    assert_eq!(value.len(), 1);
    assert_eq!(value[0].key(), "intro");
}

#[test]
fn missing_files_are_reported_with_their_path() {
    let dir = TempDir::new().expect("temp dir");
    let missing = dir.path().join("nope.json");
    let err = replay_files(EditorConfig::default(), &missing, &missing).expect_err("missing");
    assert!(format!("{err:#}").contains("nope.json"));
}
