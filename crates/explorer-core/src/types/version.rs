//! File version history records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::VersionId;

/// A historical snapshot of a text file, maintained by the backend.
///
/// Version numbers start at 1 and only ever grow per file; deleting a version
/// leaves a gap rather than renumbering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileVersionRecord {
    /// Backend identifier of the version.
    pub id: VersionId,
    /// Sequential version number.
    pub version_number: u32,
    /// When the version was created.
    pub created_at: DateTime<Utc>,
    /// Who produced the change, when known.
    pub editor_username: Option<String>,
    /// Size of the snapshot in bytes.
    pub file_size_bytes: u64,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Hex digest of the snapshot content.
    pub content_hash: String,
}
