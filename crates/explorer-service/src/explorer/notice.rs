//! User-visible notices raised by the orchestrator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use explorer_core::error::{AppError, ErrorKind};

/// How loudly a notice is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeSeverity {
    /// Confirmation of a completed action.
    Info,
    /// Something went partly wrong, or a follow-up step failed.
    Warning,
    /// The requested action failed.
    Error,
    /// Must be acknowledged before the related dialog closes.
    Blocking,
}

/// One notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Identifier used to dismiss it.
    pub id: u64,
    /// Severity.
    pub severity: NoticeSeverity,
    /// Error category, when the notice reports a failure.
    pub kind: Option<ErrorKind>,
    /// Headline.
    pub message: String,
    /// Per-item detail lines.
    pub details: Vec<String>,
    /// When it was raised.
    pub raised_at: DateTime<Utc>,
}

/// Ordered list of open notices.
#[derive(Debug, Default)]
pub struct NoticeBoard {
    next_id: u64,
    notices: Vec<Notice>,
}

impl NoticeBoard {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises a notice and returns its id.
    pub fn push(
        &mut self,
        severity: NoticeSeverity,
        kind: Option<ErrorKind>,
        message: impl Into<String>,
        details: Vec<String>,
    ) -> u64 {
        self.next_id += 1;
        self.notices.push(Notice {
            id: self.next_id,
            severity,
            kind,
            message: message.into(),
            details,
            raised_at: Utc::now(),
        });
        self.next_id
    }

    /// Raises an info notice.
    pub fn info(&mut self, message: impl Into<String>) -> u64 {
        self.push(NoticeSeverity::Info, None, message, Vec::new())
    }

    /// Raises a notice for a failed action.
    pub fn error(&mut self, err: &AppError) -> u64 {
        self.push(
            NoticeSeverity::Error,
            Some(err.kind),
            err.message.clone(),
            Vec::new(),
        )
    }

    /// Open notices, oldest first.
    pub fn list(&self) -> &[Notice] {
        &self.notices
    }

    /// The newest notice.
    pub fn latest(&self) -> Option<&Notice> {
        self.notices.last()
    }

    /// Dismisses a non-blocking notice. Blocking notices stay until
    /// acknowledged; returns whether anything was removed.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.notices.len();
        self.notices
            .retain(|n| n.id != id || n.severity == NoticeSeverity::Blocking);
        self.notices.len() != before
    }

    /// Acknowledges and removes any notice, blocking ones included.
    pub fn acknowledge(&mut self, id: u64) -> bool {
        let before = self.notices.len();
        self.notices.retain(|n| n.id != id);
        self.notices.len() != before
    }

    /// Whether a blocking notice awaits acknowledgement.
    pub fn has_blocking(&self) -> bool {
        self.notices
            .iter()
            .any(|n| n.severity == NoticeSeverity::Blocking)
    }

    /// Removes every non-blocking notice.
    pub fn clear_transient(&mut self) {
        self.notices
            .retain(|n| n.severity == NoticeSeverity::Blocking);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocking_needs_acknowledgement() {
        let mut board = NoticeBoard::new();
        let id = board.push(
            NoticeSeverity::Blocking,
            Some(ErrorKind::UploadBlocked),
            "No files allowed",
            vec![],
        );
        assert!(!board.dismiss(id));
        assert!(board.has_blocking());
        assert!(board.acknowledge(id));
        assert!(board.list().is_empty());
    }

    #[test]
    fn test_dismiss_transient() {
        let mut board = NoticeBoard::new();
        let id = board.info("Saved");
        assert!(board.dismiss(id));
        assert!(!board.dismiss(id));
    }
}
