//! Upload batches: candidate files, filter verdicts, progress, outcomes.

pub mod outcome;
pub mod pending;
pub mod progress;

pub use outcome::{
    FailedUpload, UPLOAD_PROCESS_ENTRY, UploadBlocked, UploadOutcome, UploadReport, UploadResult,
};
pub use pending::{BlockReason, BlockedFile, DroppedEntry, FilterResult, PendingFile};
pub use progress::{UploadProgressItem, UploadProgressSnapshot};
