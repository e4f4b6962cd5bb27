//! Presence descriptors, passed through to nested editing surfaces unmodified.

use super::path::Path;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormFieldPresence {
    pub user_id: String,
    pub session_id: String,
    pub path: Path,
    /// RFC 3339 timestamp supplied by the host.
    pub last_active_at: String,
}
