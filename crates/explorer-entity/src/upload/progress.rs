//! Per-file upload progress.

use serde::{Deserialize, Serialize};

use explorer_core::types::{UploadJobId, UploadKey};

/// Progress of one file in the current batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadProgressItem {
    /// Batch position; the progress key.
    pub key: UploadKey,
    /// Relative path for folder uploads, bare name otherwise.
    pub filename: String,
    /// Bytes transferred so far.
    pub bytes_loaded: u64,
    /// Size of the file.
    pub bytes_total: u64,
    /// Whole-number percentage, 0 to 100.
    pub percentage: u8,
}

impl UploadProgressItem {
    /// A fresh entry with nothing transferred.
    pub fn new(key: UploadKey, filename: impl Into<String>, bytes_total: u64) -> Self {
        Self {
            key,
            filename: filename.into(),
            bytes_loaded: 0,
            bytes_total,
            percentage: 0,
        }
    }

    /// Records a progress report, clamping to the file size.
    pub fn update(&mut self, loaded: u64, total: u64) {
        if total > 0 {
            self.bytes_total = total;
        }
        self.bytes_loaded = loaded.min(self.bytes_total);
        self.percentage = if self.bytes_total == 0 {
            100
        } else {
            ((self.bytes_loaded * 100) / self.bytes_total) as u8
        };
    }

    /// Marks the file fully transferred.
    pub fn complete(&mut self) {
        self.bytes_loaded = self.bytes_total;
        self.percentage = 100;
    }
}

/// Read-only view of the current batch's progress, handed to observers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadProgressSnapshot {
    /// Batch the entries belong to; `None` when no upload is shown.
    pub job_id: Option<UploadJobId>,
    /// One entry per allowed file, indexed by [`UploadKey`].
    pub items: Vec<UploadProgressItem>,
    /// Whether the backend call is in flight.
    pub in_flight: bool,
}

impl UploadProgressSnapshot {
    /// Looks up an entry by key.
    pub fn get(&self, key: UploadKey) -> Option<&UploadProgressItem> {
        self.items.get(key.0).filter(|item| item.key == key)
    }

    /// Mean percentage over all entries.
    pub fn overall_percentage(&self) -> u8 {
        if self.items.is_empty() {
            return 0;
        }
        let sum: u64 = self.items.iter().map(|i| u64::from(i.percentage)).sum();
        (sum / self.items.len() as u64) as u8
    }
}
