//! Domain events published by the explorer after successful mutations.
//!
//! Observers (an activity feed, an audit log, a second open panel) subscribe
//! to the orchestrator's event channel; events are informational and carry
//! no state the explorer depends on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::ServerRef;

/// Wrapper for explorer events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The server whose files changed.
    pub server: ServerRef,
    /// Username of the acting session.
    pub actor: String,
    /// The event payload.
    pub payload: ExplorerEvent,
}

impl DomainEvent {
    /// Create a new domain event.
    pub fn new(server: ServerRef, actor: impl Into<String>, payload: ExplorerEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            server,
            actor: actor.into(),
            payload,
        }
    }
}

/// Mutations performed through the explorer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ExplorerEvent {
    /// An upload batch finished (possibly with per-file failures).
    Uploaded {
        /// Destination directory.
        destination: String,
        /// Relative paths stored.
        successful: Vec<String>,
        /// Number of files that failed.
        failed: usize,
    },
    /// An entry was renamed.
    Renamed {
        /// Previous full path.
        old_path: String,
        /// New full path.
        new_path: String,
    },
    /// Entries were deleted.
    Deleted {
        /// Directory the entries lived in.
        directory: String,
        /// Names removed.
        names: Vec<String>,
    },
    /// A file was saved from the editor.
    Saved {
        /// Full path of the file.
        path: String,
    },
    /// A file was restored from a stored version.
    Restored {
        /// Full path of the file.
        path: String,
        /// Version restored.
        version_number: u32,
    },
    /// A stored version was removed.
    VersionDeleted {
        /// Full path of the file.
        path: String,
        /// Version removed.
        version_number: u32,
    },
}
