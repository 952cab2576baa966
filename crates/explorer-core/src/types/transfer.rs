//! Request and response payloads exchanged with a storage backend.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Position of a file within one upload batch.
///
/// Progress is keyed by this index rather than by name so that two files
/// with the same relative path in one batch keep separate progress entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UploadKey(pub usize);

/// One file handed to a batch upload endpoint.
#[derive(Debug, Clone)]
pub struct UploadFile {
    /// Progress key.
    pub key: UploadKey,
    /// Path relative to the destination directory (`world/level.dat`).
    pub relative_path: String,
    /// File content.
    pub data: Bytes,
}

/// Progress notification emitted by a backend while uploading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadProgressEvent {
    /// Which file in the batch.
    pub key: UploadKey,
    /// Bytes transferred so far.
    pub loaded: u64,
    /// Total bytes of the file.
    pub total: u64,
}

/// Progress callback supplied to the upload endpoints.
pub type ProgressCallback<'a> = &'a (dyn Fn(UploadProgressEvent) + Send + Sync);

/// A file the backend could not store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedFile {
    /// Relative path of the file.
    pub file: String,
    /// Backend error text.
    pub error: String,
}

/// Per-file result of a batch upload request that itself succeeded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchUploadResult {
    /// Relative paths stored successfully.
    pub successful: Vec<String>,
    /// Files that failed individually.
    pub failed: Vec<FailedFile>,
}

/// Text content returned by read endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextContent {
    /// Decoded content.
    pub content: String,
}

/// Parameters of a file write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteFileRequest {
    /// New content.
    pub content: String,
    /// Content encoding, `"utf-8"` for editor saves.
    pub encoding: String,
    /// Snapshot the current content into version history first.
    pub create_backup: bool,
    /// Editor recorded on the created version.
    pub editor: Option<String>,
}

impl WriteFileRequest {
    /// A UTF-8 editor save that records a backup version.
    pub fn editor_save(content: impl Into<String>, editor: Option<String>) -> Self {
        Self {
            content: content.into(),
            encoding: "utf-8".to_string(),
            create_backup: true,
            editor,
        }
    }
}

/// Parameters of a restore-from-version request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreRequest {
    /// Snapshot the current content before overwriting it.
    pub create_backup_before_restore: bool,
    /// Description stored on the backup version.
    pub description: Option<String>,
    /// Editor recorded on the backup version.
    pub editor: Option<String>,
}
