//! File operation bookkeeping: classification, rename, delete.

pub mod kind;

use serde::{Deserialize, Serialize};

use explorer_core::types::FileSystemItem;

pub use kind::FileKind;

/// An in-progress rename of one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameTransaction {
    /// The entry being renamed.
    pub target: FileSystemItem,
    /// The name currently typed by the user.
    pub proposed_name: String,
    /// Whether the backend request is in flight.
    pub in_progress: bool,
    /// The last backend rejection, shown inline while the user corrects it.
    pub error: Option<String>,
}

impl RenameTransaction {
    /// Opens a transaction seeded with the entry's current name.
    pub fn new(target: FileSystemItem) -> Self {
        Self {
            proposed_name: target.name.clone(),
            target,
            in_progress: false,
            error: None,
        }
    }
}

/// Old and new full paths of a confirmed rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamedPaths {
    /// Path before the rename.
    pub old_path: String,
    /// Path after the rename.
    pub new_path: String,
}

/// One delete that failed inside a bulk delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteFailure {
    /// Entry name.
    pub name: String,
    /// Backend error text.
    pub reason: String,
}

/// Tally of one bulk delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOutcome {
    /// Entries deleted.
    pub success_count: usize,
    /// Entries the backend refused.
    pub fail_count: usize,
    /// Names deleted, in the order they were attempted.
    pub deleted_names: Vec<String>,
    /// Per-entry failure reasons.
    pub failures: Vec<DeleteFailure>,
}

impl DeleteOutcome {
    /// Whether every attempted delete succeeded.
    pub fn is_complete(&self) -> bool {
        self.fail_count == 0
    }
}
