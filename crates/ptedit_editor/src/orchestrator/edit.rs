//! Object edit sessions: what is open, and how the host should present it.

use crate::surface::AnchorHandle;
use ptedit_core::{FormFieldPresence, Marker, Path};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EditKind {
    BlockObject,
    InlineObject,
    Annotation,
}

/// The object currently being edited. Never part of the document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectEditData {
    /// Where the editor selection goes while and after editing.
    pub editor_path: Path,
    /// Root the nested form's patches and focus paths are relative to.
    pub form_builder_path: Path,
    pub kind: EditKind,
}

/// Presentation of the nested editing form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EditModal {
    Popover,
    Dialog,
}

impl EditModal {
    pub fn default_for(kind: EditKind) -> Self {
        match kind {
            EditKind::BlockObject => Self::Dialog,
            EditKind::InlineObject | EditKind::Annotation => Self::Popover,
        }
    }
}

/// Per-`_type` modal overrides.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModalOverrides {
    by_type: HashMap<String, EditModal>,
}

impl ModalOverrides {
    pub fn set(&mut self, type_name: impl Into<String>, modal: EditModal) {
        self.by_type.insert(type_name.into(), modal);
    }

    pub fn resolve(&self, type_name: &str, kind: EditKind) -> EditModal {
        self.by_type
            .get(type_name)
            .copied()
            .unwrap_or_else(|| EditModal::default_for(kind))
    }
}

/// View of the open edit session handed to the host's form renderer.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectEditSession {
    pub data: ObjectEditData,
    pub type_name: String,
    /// Current JSON value of the edited object.
    pub value: Value,
    pub modal: EditModal,
    pub anchor: Option<AnchorHandle>,
    /// Markers inside the edited object.
    pub markers: Vec<Marker>,
    pub presence: Vec<FormFieldPresence>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_beat_kind_defaults() {
        let mut overrides = ModalOverrides::default();
        assert_eq!(overrides.resolve("image", EditKind::BlockObject), EditModal::Dialog);
        assert_eq!(overrides.resolve("link", EditKind::Annotation), EditModal::Popover);
        overrides.set("image", EditModal::Popover);
        assert_eq!(overrides.resolve("image", EditKind::BlockObject), EditModal::Popover);
    }
}
