//! Portable-text document model.

use crate::constants::{DEFAULT_BLOCK_STYLE, SPAN_TYPE, TEXT_BLOCK_TYPE};
use crate::error::EditorError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Ordered block sequence, owned by the host.
pub type Document = Vec<Block>;

/// Opaque keyed object: block objects, inline objects and markDefs share this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct KeyedObject {
    pub key: String,
    pub type_name: String,
    /// Every property other than `_key` and `_type`.
    pub fields: Map<String, Value>,
}

/// Non-text block.
pub type ObjectBlock = KeyedObject;
/// Non-text block child.
pub type InlineObject = KeyedObject;
/// Annotation definition referenced from span marks.
pub type MarkDef = KeyedObject;

impl KeyedObject {
    pub fn new(key: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            type_name: type_name.into(),
            fields: Map::new(),
        }
    }

    /// Builder-style field setter.
    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }
}

impl TryFrom<Value> for KeyedObject {
    type Error = EditorError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(mut fields) = value else {
            return Err(EditorError::InvalidDocument(
                "expected a JSON object".to_string(),
            ));
        };
        let key = take_string(&mut fields, "_key")
            .ok_or_else(|| EditorError::InvalidDocument("object is missing _key".to_string()))?;
        let type_name = take_string(&mut fields, "_type").ok_or_else(|| {
            EditorError::InvalidDocument(format!("object '{}' is missing _type", key))
        })?;
        Ok(Self {
            key,
            type_name,
            fields,
        })
    }
}

impl From<KeyedObject> for Value {
    fn from(object: KeyedObject) -> Self {
        let mut map = Map::with_capacity(object.fields.len() + 2);
        map.insert("_key".to_string(), Value::String(object.key));
        map.insert("_type".to_string(), Value::String(object.type_name));
        map.extend(object.fields);
        Value::Object(map)
    }
}

fn take_string(fields: &mut Map<String, Value>, name: &str) -> Option<String> {
    match fields.remove(name)? {
        Value::String(value) => Some(value),
        _ => None,
    }
}

fn default_style() -> String {
    DEFAULT_BLOCK_STYLE.to_string()
}

/// Literal text run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSpan {
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub marks: Vec<String>,
}

impl TextSpan {
    pub fn new(key: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            text: text.into(),
            marks: Vec::new(),
        }
    }

    pub fn with_marks(mut self, marks: &[&str]) -> Self {
        self.marks = marks.iter().map(|m| m.to_string()).collect();
        self
    }
}

/// Child of a text block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum Span {
    Text(TextSpan),
    Inline(InlineObject),
}

impl Span {
    pub fn key(&self) -> &str {
        match self {
            Self::Text(span) => span.key.as_str(),
            Self::Inline(object) => object.key.as_str(),
        }
    }

    pub fn as_text(&self) -> Option<&TextSpan> {
        match self {
            Self::Text(span) => Some(span),
            Self::Inline(_) => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }
}

impl TryFrom<Value> for Span {
    type Error = EditorError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        if value.get("_type").and_then(Value::as_str) == Some(SPAN_TYPE) {
            Ok(Self::Text(serde_json::from_value(value)?))
        } else {
            KeyedObject::try_from(value).map(Self::Inline)
        }
    }
}

impl From<Span> for Value {
    fn from(span: Span) -> Self {
        match span {
            Span::Text(span) => {
                let mut map = Map::with_capacity(4);
                map.insert("_key".to_string(), Value::String(span.key));
                map.insert("_type".to_string(), Value::String(SPAN_TYPE.to_string()));
                map.insert("text".to_string(), Value::String(span.text));
                map.insert(
                    "marks".to_string(),
                    Value::Array(span.marks.into_iter().map(Value::String).collect()),
                );
                Value::Object(map)
            }
            Span::Inline(object) => object.into(),
        }
    }
}

/// Styled text block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBlock {
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(default = "default_style")]
    pub style: String,
    #[serde(default)]
    pub mark_defs: Vec<MarkDef>,
    #[serde(default)]
    pub children: Vec<Span>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_item: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
}

impl TextBlock {
    pub fn new(key: impl Into<String>, children: Vec<Span>) -> Self {
        Self {
            key: key.into(),
            style: default_style(),
            mark_defs: Vec::new(),
            children,
            list_item: None,
            level: None,
        }
    }

    /// A block holding one empty span.
    pub fn empty(key: impl Into<String>, span_key: impl Into<String>) -> Self {
        Self::new(key, vec![Span::Text(TextSpan::new(span_key, ""))])
    }

    pub fn child(&self, key: &str) -> Option<(usize, &Span)> {
        self.children
            .iter()
            .enumerate()
            .find(|(_, child)| child.key() == key)
    }

    pub fn mark_def(&self, key: &str) -> Option<&MarkDef> {
        self.mark_defs.iter().find(|def| def.key == key)
    }

    /// Concatenated span text; inline objects contribute nothing.
    pub fn plain_text(&self) -> String {
        self.children
            .iter()
            .filter_map(Span::as_text)
            .map(|span| span.text.as_str())
            .collect()
    }

    /// True when the block has no text and no inline objects.
    pub fn is_empty(&self) -> bool {
        self.children
            .iter()
            .all(|child| matches!(child, Span::Text(span) if span.text.is_empty()))
    }
}

/// Top-level document unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum Block {
    Text(TextBlock),
    Object(ObjectBlock),
}

impl Block {
    pub fn key(&self) -> &str {
        match self {
            Self::Text(block) => block.key.as_str(),
            Self::Object(object) => object.key.as_str(),
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            Self::Text(_) => TEXT_BLOCK_TYPE,
            Self::Object(object) => object.type_name.as_str(),
        }
    }

    pub fn as_text(&self) -> Option<&TextBlock> {
        match self {
            Self::Text(block) => Some(block),
            Self::Object(_) => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextBlock> {
        match self {
            Self::Text(block) => Some(block),
            Self::Object(_) => None,
        }
    }

    pub fn to_value(&self) -> Value {
        Value::from(self.clone())
    }
}

impl TryFrom<Value> for Block {
    type Error = EditorError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        if value.get("_type").and_then(Value::as_str) == Some(TEXT_BLOCK_TYPE) {
            Ok(Self::Text(serde_json::from_value(value)?))
        } else {
            KeyedObject::try_from(value).map(Self::Object)
        }
    }
}

impl From<Block> for Value {
    fn from(block: Block) -> Self {
        match block {
            Block::Text(block) => {
                let mut value = serde_json::to_value(block).unwrap_or_default();
                if let Value::Object(map) = &mut value {
                    map.insert(
                        "_type".to_string(),
                        Value::String(TEXT_BLOCK_TYPE.to_string()),
                    );
                }
                value
            }
            Block::Object(object) => object.into(),
        }
    }
}

/// Parse a document from JSON text.
///
/// `null` parses as an empty document.
///
/// # Errors
/// Returns an error when the JSON is malformed or a block lacks `_key`/`_type`.
pub fn parse_document(json: &str) -> Result<Document, EditorError> {
    let value: Value = serde_json::from_str(json)?;
    document_from_value(value)
}

/// Convert a JSON value into a document.
///
/// # Errors
/// Returns an error when the value is not an array of valid blocks.
pub fn document_from_value(value: Value) -> Result<Document, EditorError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items.into_iter().map(Block::try_from).collect(),
        _ => Err(EditorError::InvalidDocument(
            "document must be an array of blocks".to_string(),
        )),
    }
}

pub fn document_to_value(document: &[Block]) -> Value {
    Value::Array(document.iter().map(Block::to_value).collect())
}

/// Linear scan for a block by key.
pub fn find_block<'a>(document: &'a [Block], key: &str) -> Option<(usize, &'a Block)> {
    document
        .iter()
        .enumerate()
        .find(|(_, block)| block.key() == key)
}

/// Plain text of a document, one line per text block.
pub fn document_to_plain_text(document: &[Block]) -> String {
    document
        .iter()
        .filter_map(Block::as_text)
        .map(TextBlock::plain_text)
        .collect::<Vec<_>>()
        .join("\n\n")
}
