//! Upload coordination: filter, progress, dispatch, aggregation.

use std::collections::HashMap;

use tokio::sync::watch;
use tracing::{info, warn};

use explorer_core::config::SecurityPolicy;
use explorer_core::error::AppError;
use explorer_core::types::{
    BatchUploadResult, UploadFile, UploadJobId, UploadKey, UploadProgressEvent,
};
use explorer_entity::UserRole;
use explorer_entity::upload::{
    DroppedEntry, FailedUpload, PendingFile, UploadBlocked, UploadOutcome, UploadProgressItem,
    UploadProgressSnapshot, UploadReport, UploadResult,
};

use super::filter::SecurityFilter;
use super::folder::{flatten_dropped, is_folder_batch};
use crate::context::ExplorerContext;

/// Reason recorded for an allowed file the backend said nothing about.
const NO_RESULT_REASON: &str = "no result reported by backend";

/// Runs upload batches and owns their progress.
///
/// Progress lives in a watch channel: the coordinator is the only writer,
/// observers get snapshots through [`UploadCoordinator::subscribe`]. Every
/// batch gets a fresh job id, and progress reports for any other job are
/// dropped.
#[derive(Debug)]
pub struct UploadCoordinator {
    ctx: ExplorerContext,
    filter: SecurityFilter,
    progress: watch::Sender<UploadProgressSnapshot>,
}

impl UploadCoordinator {
    /// Creates a coordinator enforcing `policy`.
    pub fn new(ctx: ExplorerContext, policy: SecurityPolicy) -> Self {
        let (progress, _) = watch::channel(UploadProgressSnapshot::default());
        Self {
            ctx,
            filter: SecurityFilter::new(policy),
            progress,
        }
    }

    /// Switches the policy used by later batches.
    pub fn set_policy(&mut self, policy: SecurityPolicy) {
        self.filter = SecurityFilter::new(policy);
    }

    /// The policy in force.
    pub fn policy(&self) -> &SecurityPolicy {
        self.filter.policy()
    }

    /// Subscribes to progress snapshots.
    pub fn subscribe(&self) -> watch::Receiver<UploadProgressSnapshot> {
        self.progress.subscribe()
    }

    /// Copy of the current progress.
    pub fn progress(&self) -> UploadProgressSnapshot {
        self.progress.borrow().clone()
    }

    /// Clears progress when the progress view is dismissed.
    pub fn dismiss_progress(&mut self) {
        self.progress.send_replace(UploadProgressSnapshot::default());
    }

    /// Uploads dropped entries, reconstructing their folder structure.
    pub async fn upload_dropped(
        &mut self,
        entries: Vec<DroppedEntry>,
        destination_path: &str,
    ) -> Result<UploadResult, AppError> {
        let files = flatten_dropped(entries);
        let is_folder = is_folder_batch(&files);
        self.upload(files, is_folder, destination_path).await
    }

    /// Filters `files` and sends what survives to `destination_path`.
    ///
    /// Returns [`UploadResult::Blocked`] without any backend call when no
    /// file survives the filter. A batch is sent to the folder-structure
    /// endpoint when `is_folder_upload` is set or any allowed path contains
    /// a directory. Fails only when the session may not upload.
    pub async fn upload(
        &mut self,
        files: Vec<PendingFile>,
        is_folder_upload: bool,
        destination_path: &str,
    ) -> Result<UploadResult, AppError> {
        self.ctx
            .session
            .require(UserRole::Operator, "Uploading files")?;
        let submitted = files.len();
        let filtered = self.filter.filter(files);

        if filtered.allowed.is_empty() {
            self.progress.send_replace(UploadProgressSnapshot::default());
            warn!(
                destination = destination_path,
                blocked = filtered.blocked.len(),
                "Upload blocked by security filter"
            );
            return Ok(UploadResult::Blocked(UploadBlocked {
                error: format!(
                    "No files allowed for upload: all {submitted} file(s) were blocked"
                ),
                blocked: filtered.blocked,
                warnings: filtered.warnings,
            }));
        }

        let allowed = filtered.allowed;
        let folder_upload = is_folder_upload || is_folder_batch(&allowed);
        let job_id = UploadJobId::new();

        let items = allowed
            .iter()
            .enumerate()
            .map(|(index, file)| {
                let filename = if folder_upload {
                    file.relative_path.as_str()
                } else {
                    file.file_name()
                };
                UploadProgressItem::new(UploadKey(index), filename, file.total_bytes())
            })
            .collect();
        self.progress.send_replace(UploadProgressSnapshot {
            job_id: Some(job_id),
            items,
            in_flight: true,
        });

        let batch: Vec<UploadFile> = allowed
            .iter()
            .enumerate()
            .map(|(index, file)| UploadFile {
                key: UploadKey(index),
                relative_path: file.relative_path.clone(),
                data: file.data.clone(),
            })
            .collect();

        let progress = &self.progress;
        let on_progress = move |event: UploadProgressEvent| {
            progress.send_if_modified(|snapshot| {
                if snapshot.job_id != Some(job_id) {
                    return false;
                }
                match snapshot.items.iter_mut().find(|item| item.key == event.key) {
                    Some(item) => {
                        item.update(event.loaded, event.total);
                        true
                    }
                    None => false,
                }
            });
        };

        let backend = &self.ctx.backend;
        let server = self.ctx.server;
        let response = if folder_upload {
            backend
                .upload_folder_structure(server, destination_path, batch, &on_progress)
                .await
        } else {
            backend
                .upload_multiple_files(server, destination_path, batch, &on_progress)
                .await
        };

        let (outcome, succeeded) = match response {
            Ok(result) => reconcile(&allowed, result),
            Err(e) => {
                warn!(destination = destination_path, error = %e, "Upload request failed");
                (
                    UploadOutcome::process_failure(e.message),
                    vec![false; allowed.len()],
                )
            }
        };

        self.progress.send_if_modified(|snapshot| {
            if snapshot.job_id != Some(job_id) {
                return false;
            }
            snapshot.in_flight = false;
            for (item, done) in snapshot.items.iter_mut().zip(&succeeded) {
                if *done {
                    item.complete();
                }
            }
            true
        });

        info!(
            server = %self.ctx.server,
            destination = destination_path,
            folder_upload,
            successful = outcome.successful_paths.len(),
            failed = outcome.failed_paths.len(),
            blocked = filtered.blocked.len(),
            "Upload finished"
        );

        Ok(UploadResult::Completed(UploadReport {
            outcome,
            blocked: filtered.blocked,
            warnings: filtered.warnings,
            folder_upload,
        }))
    }
}

/// Maps the backend's per-file lists onto the allowed files, in input order.
///
/// Every allowed file ends up either successful or failed exactly once; a
/// file the backend did not mention counts as failed. Returns the outcome
/// and, per allowed file, whether it succeeded.
fn reconcile(allowed: &[PendingFile], result: BatchUploadResult) -> (UploadOutcome, Vec<bool>) {
    let mut reported_ok: HashMap<String, usize> = HashMap::new();
    for path in result.successful {
        *reported_ok.entry(path).or_default() += 1;
    }
    let mut reported_failed: HashMap<String, Vec<String>> = HashMap::new();
    for failed in result.failed {
        reported_failed
            .entry(failed.file)
            .or_default()
            .push(failed.error);
    }

    let mut outcome = UploadOutcome::default();
    let mut succeeded = Vec::with_capacity(allowed.len());
    for file in allowed {
        let path = &file.relative_path;
        if let Some(count) = reported_ok.get_mut(path).filter(|count| **count > 0) {
            *count -= 1;
            outcome.successful_paths.push(path.clone());
            succeeded.push(true);
            continue;
        }

        let reason = reported_failed
            .get_mut(path)
            .and_then(|reasons| (!reasons.is_empty()).then(|| reasons.remove(0)))
            .unwrap_or_else(|| NO_RESULT_REASON.to_string());
        outcome.failed_paths.push(FailedUpload {
            path: path.clone(),
            reason,
        });
        succeeded.push(false);
    }

    (outcome, succeeded)
}
