//! Key chord → editor action mapping.

use crate::engine::DeleteUnit;
use ptedit_core::EditorError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Modifier state of a key press. `command` is Ctrl, or Cmd on macOS.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub command: bool,
    pub shift: bool,
    pub alt: bool,
}

/// A key plus the exact modifiers that must be held.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub key: String,
    pub modifiers: Modifiers,
}

impl FromStr for KeyChord {
    type Err = EditorError;

    /// Parse chords written as `mod+shift+z`, `alt+backspace` or `'`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut modifiers = Modifiers::default();
        let mut parts: Vec<&str> = value.split('+').map(str::trim).collect();
        let key = match parts.pop() {
            Some(key) if !key.is_empty() => key.to_ascii_lowercase(),
            _ => {
                return Err(EditorError::Config(format!(
                    "hotkey '{}' names no key",
                    value
                )))
            }
        };
        for part in parts {
            match part.to_ascii_lowercase().as_str() {
                "mod" | "ctrl" | "cmd" => modifiers.command = true,
                "shift" => modifiers.shift = true,
                "alt" | "option" => modifiers.alt = true,
                other => {
                    return Err(EditorError::Config(format!(
                        "unknown modifier '{}' in hotkey '{}'",
                        other, value
                    )))
                }
            }
        }
        Ok(Self { key, modifiers })
    }
}

impl KeyChord {
    pub fn matches(&self, key: &str, modifiers: Modifiers) -> bool {
        self.modifiers == modifiers && self.key.eq_ignore_ascii_case(key)
    }
}

/// Facade primitive bound to a chord.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HotkeyAction {
    ToggleMark(String),
    Undo,
    Redo,
    SplitBlock,
    DeleteBackward(DeleteUnit),
    DeleteForward(DeleteUnit),
}

/// Ordered chord bindings; the first match wins.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HotkeyMap {
    bindings: Vec<(KeyChord, HotkeyAction)>,
}

fn chord(text: &str) -> KeyChord {
    // Every literal below parses; an unparsable one degrades to a bare key.
    text.parse().unwrap_or_else(|_| KeyChord {
        key: text.to_string(),
        modifiers: Modifiers::default(),
    })
}

impl Default for HotkeyMap {
    fn default() -> Self {
        let mut map = Self {
            bindings: Vec::new(),
        };
        for (text, mark) in [
            ("mod+b", "strong"),
            ("mod+i", "em"),
            ("mod+'", "code"),
            ("mod+u", "underline"),
        ] {
            map.bind(chord(text), HotkeyAction::ToggleMark(mark.to_string()));
        }
        map.bind(chord("mod+z"), HotkeyAction::Undo);
        map.bind(chord("mod+shift+z"), HotkeyAction::Redo);
        map.bind(chord("mod+y"), HotkeyAction::Redo);
        map.bind(chord("enter"), HotkeyAction::SplitBlock);
        map.bind(
            chord("backspace"),
            HotkeyAction::DeleteBackward(DeleteUnit::Character),
        );
        map.bind(
            chord("alt+backspace"),
            HotkeyAction::DeleteBackward(DeleteUnit::Word),
        );
        map.bind(
            chord("delete"),
            HotkeyAction::DeleteForward(DeleteUnit::Character),
        );
        map.bind(
            chord("alt+delete"),
            HotkeyAction::DeleteForward(DeleteUnit::Word),
        );
        map
    }
}

impl HotkeyMap {
    /// Bind `chord`, replacing any earlier binding of the same chord.
    pub fn bind(&mut self, chord: KeyChord, action: HotkeyAction) {
        self.bindings.retain(|(existing, _)| *existing != chord);
        self.bindings.push((chord, action));
    }

    /// Bind a decorator toggle from chord text.
    ///
    /// # Errors
    /// Returns [`EditorError::Config`] when `chord` does not parse.
    pub fn bind_decorator(&mut self, chord: &str, mark: &str) -> Result<(), EditorError> {
        self.bind(chord.parse()?, HotkeyAction::ToggleMark(mark.to_string()));
        Ok(())
    }

    pub fn action_for(&self, key: &str, modifiers: Modifiers) -> Option<&HotkeyAction> {
        self.bindings
            .iter()
            .find(|(chord, _)| chord.matches(key, modifiers))
            .map(|(_, action)| action)
    }
}
