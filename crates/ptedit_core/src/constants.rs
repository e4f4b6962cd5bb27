//! Shared constants used across ptedit crates.

/// `_type` of a text block.
pub const TEXT_BLOCK_TYPE: &str = "block";

/// `_type` of a text span.
pub const SPAN_TYPE: &str = "span";

/// Style applied to text blocks that do not declare one.
pub const DEFAULT_BLOCK_STYLE: &str = "normal";

/// Property name of block children.
pub const CHILDREN_FIELD: &str = "children";

/// Property name of block annotation definitions.
pub const MARK_DEFS_FIELD: &str = "markDefs";

/// Property name of span text.
pub const TEXT_FIELD: &str = "text";

/// Property name of span marks.
pub const MARKS_FIELD: &str = "marks";

/// Render attribute carrying the `_key` of a text leaf.
pub const KEY_MARKER_ATTRIBUTE: &str = "data-pte-key";

/// Clipboard mime type carrying a JSON block fragment.
pub const PORTABLE_TEXT_MIME: &str = "application/x-portable-text";

/// Clipboard mime type carrying plain text.
pub const PLAIN_TEXT_MIME: &str = "text/plain";

/// Default quiet period (ms) after which IME composition is considered over.
pub const DEFAULT_COMPOSITION_QUIET_MS: u64 = 1_000;

/// Default undo history depth.
pub const DEFAULT_HISTORY_MAX_OPS: usize = 200;

/// Length of generated `_key` values.
pub const GENERATED_KEY_LEN: usize = 12;

/// Decorators every editor accepts unless configured otherwise.
pub const DEFAULT_DECORATORS: &[&str] = &["strong", "em", "code", "underline", "strike-through"];
