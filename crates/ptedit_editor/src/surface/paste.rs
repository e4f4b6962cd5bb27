//! Clipboard payloads and the paste-handler contract.
//!
//! A paste either resolves immediately or hands back a channel the surface
//! polls on `tick`. Whatever the handler does not insert falls back to the
//! default insertion of the clipboard data.

use crossbeam_channel::Receiver;
use ptedit_core::models::block::{document_from_value, document_to_plain_text, document_to_value};
use ptedit_core::{
    Block, Document, EditorError, KeyGenerator, Path, Selection, Span, TextBlock, TextSpan,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Clipboard contents offered by the host, by mime type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipboardData {
    /// `application/x-portable-text`: a JSON array of blocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portable_text: Option<String>,
    /// `text/plain`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plain_text: Option<String>,
}

impl ClipboardData {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            portable_text: None,
            plain_text: Some(text.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.portable_text.is_none() && self.plain_text.as_deref().map_or(true, str::is_empty)
    }
}

/// What a paste handler sees.
#[derive(Clone, Debug, PartialEq)]
pub struct PasteInput {
    pub event: ClipboardData,
    /// Current document; `None` while the editor is empty.
    pub value: Option<Document>,
    pub focus_path: Option<Path>,
    pub selection: Option<Selection>,
}

/// Handler outcome. Without `insert` the surface falls back to default insertion.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PasteResult {
    pub insert: Option<Vec<Block>>,
    /// Where to insert; the current selection when `None`.
    pub path: Option<Path>,
}

pub type PasteOutcome = Result<Option<PasteResult>, EditorError>;

/// A handler's answer: ready now, or delivered later over a channel.
pub enum PasteResolution {
    Ready(PasteOutcome),
    Pending(Receiver<PasteOutcome>),
}

/// Host hook consulted before default paste insertion.
pub trait PasteHandler {
    fn on_paste(&mut self, input: PasteInput) -> PasteResolution;
}

impl<F> PasteHandler for F
where
    F: FnMut(PasteInput) -> PasteResolution,
{
    fn on_paste(&mut self, input: PasteInput) -> PasteResolution {
        self(input)
    }
}

/// What the surface did with a paste event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PasteDisposition {
    /// No selection or read-only; the host's default is not prevented.
    Ignored,
    /// Content was inserted (or nothing insertable was found).
    Handled,
    /// Waiting on the handler; resolved on a later `tick`. Further pastes
    /// are dropped until it resolves.
    Pending,
}

/// Paste waiting on a handler channel.
pub(crate) struct PendingPaste {
    pub(crate) receiver: Receiver<PasteOutcome>,
    pub(crate) clipboard: ClipboardData,
}

/// Default insertion derived from clipboard data.
#[derive(Clone, Debug, PartialEq)]
pub enum DefaultInsertion {
    /// Single-line text, typed at the caret.
    Text(String),
    /// Blocks, from portable-text JSON or multi-line text.
    Fragment(Vec<Block>),
}

/// Pick the default insertion for `clipboard`.
///
/// Portable-text JSON wins when it parses to at least one block; plain text
/// is used otherwise, one text block per line.
///
/// # Returns
/// `None` when the clipboard carries nothing insertable.
pub fn default_insertion(
    clipboard: &ClipboardData,
    keys: &mut dyn KeyGenerator,
) -> Option<DefaultInsertion> {
    let fragment = clipboard
        .portable_text
        .as_deref()
        .and_then(|json| serde_json::from_str(json).ok())
        .and_then(|value| document_from_value(value).ok())
        .filter(|blocks: &Document| !blocks.is_empty());
    if let Some(blocks) = fragment {
        return Some(DefaultInsertion::Fragment(rekey_fragment(blocks, keys)));
    }

    let text = clipboard.plain_text.as_deref().filter(|t| !t.is_empty())?;
    let lines: Vec<&str> = text.lines().collect();
    match lines.as_slice() {
        [] => None,
        [line] => Some(DefaultInsertion::Text((*line).to_string())),
        _ => Some(DefaultInsertion::Fragment(
            lines
                .iter()
                .map(|line| {
                    let span = TextSpan::new(keys.next_key(), *line);
                    Block::Text(TextBlock::new(keys.next_key(), vec![Span::Text(span)]))
                })
                .collect(),
        )),
    }
}

/// Give every block, child and markDef in `blocks` a fresh key.
///
/// Span marks pointing at renamed markDefs follow the rename.
pub fn rekey_fragment(blocks: Vec<Block>, keys: &mut dyn KeyGenerator) -> Vec<Block> {
    blocks
        .into_iter()
        .map(|block| match block {
            Block::Text(mut text) => {
                text.key = keys.next_key();
                let renamed: HashMap<String, String> = text
                    .mark_defs
                    .iter_mut()
                    .map(|def| {
                        let fresh = keys.next_key();
                        (std::mem::replace(&mut def.key, fresh.clone()), fresh)
                    })
                    .collect();
                for child in &mut text.children {
                    match child {
                        Span::Text(span) => {
                            span.key = keys.next_key();
                            for mark in &mut span.marks {
                                if let Some(fresh) = renamed.get(mark) {
                                    mark.clone_from(fresh);
                                }
                            }
                        }
                        Span::Inline(object) => object.key = keys.next_key(),
                    }
                }
                Block::Text(text)
            }
            Block::Object(mut object) => {
                object.key = keys.next_key();
                Block::Object(object)
            }
        })
        .collect()
}

/// Clipboard payload for a copied fragment: JSON plus plain text.
pub fn clipboard_for_fragment(fragment: &[Block]) -> ClipboardData {
    ClipboardData {
        portable_text: Some(document_to_value(fragment).to_string()),
        plain_text: Some(document_to_plain_text(fragment)),
    }
}
