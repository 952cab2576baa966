//! Results of an upload call.

use serde::{Deserialize, Serialize};

use super::pending::BlockedFile;

/// Name of the synthetic entry recorded when the whole batch call fails.
pub const UPLOAD_PROCESS_ENTRY: &str = "upload process";

/// A file that did not make it to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedUpload {
    /// Relative path, or [`UPLOAD_PROCESS_ENTRY`] for a batch-level failure.
    pub path: String,
    /// Why it failed.
    pub reason: String,
}

/// Per-file result of an upload that reached the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadOutcome {
    /// Relative paths stored.
    pub successful_paths: Vec<String>,
    /// Files that failed.
    pub failed_paths: Vec<FailedUpload>,
    /// Set when the batch request itself failed; `failed_paths` then holds
    /// the single synthetic [`UPLOAD_PROCESS_ENTRY`].
    pub process_error: Option<String>,
}

impl UploadOutcome {
    /// Outcome of a batch whose request failed as a whole.
    pub fn process_failure(error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            successful_paths: Vec::new(),
            failed_paths: vec![FailedUpload {
                path: UPLOAD_PROCESS_ENTRY.to_string(),
                reason: error.clone(),
            }],
            process_error: Some(error),
        }
    }

    /// Whether the batch request itself failed.
    pub fn is_process_failure(&self) -> bool {
        self.process_error.is_some()
    }

    /// Whether some, but not all, files failed.
    pub fn is_partial_failure(&self) -> bool {
        !self.is_process_failure()
            && !self.failed_paths.is_empty()
            && !self.successful_paths.is_empty()
    }
}

/// An upload that ran: the backend outcome plus what the filter set aside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReport {
    /// Backend outcome for the allowed files.
    pub outcome: UploadOutcome,
    /// Files the filter rejected before the call.
    pub blocked: Vec<BlockedFile>,
    /// Filter warnings.
    pub warnings: Vec<String>,
    /// Whether the batch went to the folder-structure endpoint.
    pub folder_upload: bool,
}

/// An upload stopped before any request because no file survived the filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadBlocked {
    /// Message for the blocking dialog.
    pub error: String,
    /// Every submitted file with its rejection reason.
    pub blocked: Vec<BlockedFile>,
    /// Filter warnings.
    pub warnings: Vec<String>,
}

/// Result of an upload call as seen by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadResult {
    /// The batch reached the backend.
    Completed(UploadReport),
    /// Nothing was allowed; show a blocking dialog, no progress view.
    Blocked(UploadBlocked),
}
