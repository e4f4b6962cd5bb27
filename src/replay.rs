//! Replay of JSON-lines command scripts.
//!
//! Each non-blank script line is one [`EditorCmd`]. Time is virtual: a
//! `tick` command advances the clock by its `advanceMs` before the editor
//! sees it, so replays are deterministic.

use anyhow::{Context, Result};
use ptedit_core::models::block::document_from_value;
use ptedit_core::{Document, EditorConfig, SequentialKeys};
use ptedit_editor::{drain, EditorCmd, EditorEvent, ObjectEditOrchestrator};
use serde_json::Value;
use std::path::Path;
use std::time::{Duration, Instant};

/// Everything a replay produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayOutput {
    /// Events in emission order.
    pub events: Vec<EditorEvent>,
    /// The editor's value after the last command.
    pub value: Option<Document>,
}

fn parse_document(text: &str) -> Result<Option<Document>> {
    let value: Value = serde_json::from_str(text).context("document is not valid JSON")?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(Some(document_from_value(value)?))
}

/// Run `script` against an editor initialised with `document`.
///
/// # Errors
/// Returns an error naming the first script line that fails to parse.
pub fn replay(
    config: EditorConfig,
    document: Option<Document>,
    script: &str,
) -> Result<ReplayOutput> {
    let (mut editor, rx) =
        ObjectEditOrchestrator::with_keys(config, Box::new(SequentialKeys::new("r")));
    editor.set_value(document);
    let mut events = drain(&rx);
    let mut now = Instant::now();

    for (index, line) in script.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let cmd: EditorCmd = serde_json::from_str(line)
            .with_context(|| format!("script line {} is not a valid command", index + 1))?;
        if let EditorCmd::Tick { advance_ms } = &cmd {
            now += Duration::from_millis(*advance_ms);
        }
        tracing::debug!(line = index + 1, ?cmd, "replaying command");
        editor.dispatch(cmd, now);
        events.extend(drain(&rx));
    }

    Ok(ReplayOutput {
        events,
        value: editor.surface().value(),
    })
}

/// Load a document file (`null` allowed) and a script file, then replay.
pub fn replay_files(config: EditorConfig, document: &Path, script: &Path) -> Result<ReplayOutput> {
    let document_text = std::fs::read_to_string(document)
        .with_context(|| format!("failed to read document {}", document.display()))?;
    let script_text = std::fs::read_to_string(script)
        .with_context(|| format!("failed to read script {}", script.display()))?;
    let document = parse_document(&document_text)
        .with_context(|| format!("failed to load document {}", document.display()))?;
    replay(config, document, &script_text)
}
