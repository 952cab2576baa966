//! Pre-upload security filter.

use explorer_core::config::SecurityPolicy;
use explorer_core::types::path;
use explorer_entity::upload::{BlockReason, BlockedFile, FilterResult, PendingFile};

/// Extensions rejected when the policy blocks dangerous files: native
/// executables, installers, and script hosts a game server never runs.
pub const DANGEROUS_EXTENSIONS: &[&str] = &[
    "exe", "dll", "com", "scr", "pif", "msi", "msp", "cpl", "hta", "vbs", "vbe", "wsf", "wsh",
    "ps1", "psm1", "reg", "lnk", "app", "deb", "rpm", "dmg", "cmd",
];

/// Extensions allowed through but flagged: start scripts and plugin archives
/// run with the server's privileges.
pub const SENSITIVE_EXTENSIONS: &[&str] = &["sh", "bat", "jar"];

/// Classifies candidate files against one [`SecurityPolicy`].
#[derive(Debug, Clone)]
pub struct SecurityFilter {
    policy: SecurityPolicy,
}

impl SecurityFilter {
    /// Creates a filter for `policy`.
    pub fn new(policy: SecurityPolicy) -> Self {
        Self { policy }
    }

    /// The policy in force.
    pub fn policy(&self) -> &SecurityPolicy {
        &self.policy
    }

    /// Splits `files` into allowed and blocked, in input order.
    ///
    /// Greedy over the input: the count and total-size limits close the
    /// accepted prefix the first time an otherwise acceptable file would
    /// break them, and every later acceptable file is rejected for the same
    /// limit. Oversized and dangerous files are rejected on their own and
    /// consume no budget.
    pub fn filter(&self, files: Vec<PendingFile>) -> FilterResult {
        let policy = &self.policy;
        let mut result = FilterResult::default();
        let mut accepted_bytes = 0u64;
        let mut closed: Option<BlockReason> = None;

        for file in files {
            let size = file.total_bytes();
            if size > policy.max_file_size_bytes {
                result.blocked.push(BlockedFile {
                    file,
                    reason: BlockReason::FileTooLarge {
                        size,
                        limit: policy.max_file_size_bytes,
                    },
                });
                continue;
            }

            if policy.block_dangerous_extensions {
                if let Some(ext) = dangerous_extension(file.file_name()) {
                    result.blocked.push(BlockedFile {
                        file,
                        reason: BlockReason::DangerousExtension(ext),
                    });
                    continue;
                }
            }

            if closed.is_none() {
                if result.allowed.len() + 1 > policy.max_file_count {
                    closed = Some(BlockReason::TooManyFiles {
                        limit: policy.max_file_count,
                    });
                } else if accepted_bytes + size > policy.max_total_size_bytes {
                    closed = Some(BlockReason::TotalSizeExceeded {
                        limit: policy.max_total_size_bytes,
                    });
                }
            }
            if let Some(reason) = &closed {
                result.blocked.push(BlockedFile {
                    file,
                    reason: reason.clone(),
                });
                continue;
            }

            accepted_bytes += size;
            result.warnings.extend(warnings_for(&file));
            result.allowed.push(file);
        }

        result
    }
}

/// Runs `files` through a one-off filter for `policy`.
pub fn filter_files(files: Vec<PendingFile>, policy: &SecurityPolicy) -> FilterResult {
    SecurityFilter::new(policy.clone()).filter(files)
}

fn dangerous_extension(name: &str) -> Option<String> {
    path::extension(name).filter(|ext| DANGEROUS_EXTENSIONS.contains(&ext.as_str()))
}

fn warnings_for(file: &PendingFile) -> Vec<String> {
    let mut warnings = Vec::new();
    let name = file.file_name();
    if file.total_bytes() == 0 {
        warnings.push(format!("{}: file is empty", file.relative_path));
    }
    if name.starts_with('.') {
        warnings.push(format!("{}: hidden file", file.relative_path));
    }
    if let Some(ext) = path::extension(name) {
        if SENSITIVE_EXTENSIONS.contains(&ext.as_str()) {
            warnings.push(format!(
                "{}: .{ext} files run with server privileges, review before use",
                file.relative_path
            ));
        }
    }
    warnings
}
