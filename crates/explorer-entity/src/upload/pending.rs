//! Candidate files and security filter verdicts.

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use explorer_core::types::path;

/// A file the user picked or dropped, not yet uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFile {
    /// Bare name for flat picks, `folder/sub/name` for folder uploads.
    pub relative_path: String,
    /// File content.
    pub data: Bytes,
}

impl PendingFile {
    /// Creates a pending file.
    pub fn new(relative_path: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            relative_path: relative_path.into(),
            data: data.into(),
        }
    }

    /// Size of the content in bytes.
    pub fn total_bytes(&self) -> u64 {
        self.data.len() as u64
    }

    /// Last segment of the relative path.
    pub fn file_name(&self) -> &str {
        path::file_name(&self.relative_path)
    }

    /// Whether the relative path carries directory structure.
    pub fn has_folder_structure(&self) -> bool {
        self.relative_path.contains('/')
    }
}

/// A drag-and-drop entry as exposed by the host's directory reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DroppedEntry {
    /// A plain file.
    File {
        /// File name.
        name: String,
        /// File content.
        data: Bytes,
    },
    /// A directory and everything below it.
    Directory {
        /// Directory name.
        name: String,
        /// Child entries.
        children: Vec<DroppedEntry>,
    },
}

/// Why the security filter rejected a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockReason {
    /// Larger than the per-file limit.
    FileTooLarge {
        /// File size.
        size: u64,
        /// Per-file limit.
        limit: u64,
    },
    /// Extension is on the dangerous list.
    DangerousExtension(String),
    /// Accepting it would exceed the file count limit.
    TooManyFiles {
        /// Count limit.
        limit: usize,
    },
    /// Accepting it would exceed the total size limit.
    TotalSizeExceeded {
        /// Total size limit.
        limit: u64,
    },
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileTooLarge { size, limit } => {
                write!(f, "file too large ({size} bytes, limit {limit} bytes)")
            }
            Self::DangerousExtension(ext) => write!(f, "dangerous extension (.{ext})"),
            Self::TooManyFiles { limit } => write!(f, "too many files (limit {limit})"),
            Self::TotalSizeExceeded { limit } => {
                write!(f, "total upload size exceeded (limit {limit} bytes)")
            }
        }
    }
}

/// A rejected file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockedFile {
    /// The file as submitted.
    pub file: PendingFile,
    /// Why it was rejected.
    pub reason: BlockReason,
}

/// Verdict of the security filter over one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterResult {
    /// Files cleared for upload, in input order.
    pub allowed: Vec<PendingFile>,
    /// Files rejected, in input order.
    pub blocked: Vec<BlockedFile>,
    /// Non-blocking remarks about allowed files.
    pub warnings: Vec<String>,
}
