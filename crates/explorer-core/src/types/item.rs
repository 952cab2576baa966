//! Directory listing entries as returned by a storage backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Capability flags of a listed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Permissions {
    /// Entry can be read.
    pub read: bool,
    /// Entry can be written.
    pub write: bool,
    /// Entry can be executed (or traversed, for directories).
    pub execute: bool,
}

impl Permissions {
    /// Read, write, and execute.
    pub fn all() -> Self {
        Self {
            read: true,
            write: true,
            execute: true,
        }
    }

    /// Read and write, no execute.
    pub fn read_write() -> Self {
        Self {
            read: true,
            write: true,
            execute: false,
        }
    }
}

/// One entry in a directory listing.
///
/// An immutable snapshot: the client only drops entries after a confirmed
/// delete or replaces the whole listing on refresh. `size` is `None` exactly
/// when the entry is a directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSystemItem {
    /// Entry name, unique within its directory.
    pub name: String,
    /// Whether this entry is a directory.
    pub is_directory: bool,
    /// File size in bytes; `None` for directories.
    pub size: Option<u64>,
    /// Last modification time.
    pub modified_at: DateTime<Utc>,
    /// Capability flags.
    pub permissions: Permissions,
    /// Full path from the server root.
    pub path: String,
}

impl FileSystemItem {
    /// Creates a file entry.
    pub fn file(path: impl Into<String>, size: u64, modified_at: DateTime<Utc>) -> Self {
        let path = path.into();
        Self {
            name: super::path::file_name(&path).to_string(),
            is_directory: false,
            size: Some(size),
            modified_at,
            permissions: Permissions::read_write(),
            path,
        }
    }

    /// Creates a directory entry.
    pub fn directory(path: impl Into<String>, modified_at: DateTime<Utc>) -> Self {
        let path = path.into();
        Self {
            name: super::path::file_name(&path).to_string(),
            is_directory: true,
            size: None,
            modified_at,
            permissions: Permissions::all(),
            path,
        }
    }

    /// Lowercase extension of the entry name, if any.
    pub fn extension(&self) -> Option<String> {
        super::path::extension(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_absent_iff_directory() {
        let dir = FileSystemItem::directory("/world", Utc::now());
        let file = FileSystemItem::file("/server.properties", 2048, Utc::now());
        assert!(dir.is_directory && dir.size.is_none());
        assert!(!file.is_directory && file.size == Some(2048));
        assert_eq!(file.name, "server.properties");
        assert_eq!(dir.name, "world");
    }
}
