//! Single-entry rename.

use tracing::{info, warn};

use explorer_core::error::{AppError, ErrorKind};
use explorer_core::types::{FileSystemItem, path};
use explorer_entity::{RenameTransaction, RenamedPaths, UserRole};

use crate::context::ExplorerContext;

/// Holds at most one [`RenameTransaction`].
#[derive(Debug)]
pub struct RenameCoordinator {
    ctx: ExplorerContext,
    transaction: Option<RenameTransaction>,
}

impl RenameCoordinator {
    /// Creates an idle coordinator.
    pub fn new(ctx: ExplorerContext) -> Self {
        Self {
            ctx,
            transaction: None,
        }
    }

    /// The open transaction, if any.
    pub fn transaction(&self) -> Option<&RenameTransaction> {
        self.transaction.as_ref()
    }

    /// Whether a rename is open.
    pub fn is_active(&self) -> bool {
        self.transaction.is_some()
    }

    /// Opens a rename of `item`, discarding any unconfirmed one.
    pub fn start(&mut self, item: FileSystemItem) {
        self.transaction = Some(RenameTransaction::new(item));
    }

    /// Updates the typed name. Ignored when no rename is open.
    pub fn set_proposed_name(&mut self, name: impl Into<String>) {
        if let Some(tx) = self.transaction.as_mut() {
            tx.proposed_name = name.into();
        }
    }

    /// Drops the open transaction.
    pub fn cancel(&mut self) -> Option<RenameTransaction> {
        self.transaction.take()
    }

    /// Sends the rename to the backend.
    ///
    /// An empty name, an unchanged name, or a name containing `/` fails with
    /// an "Invalid parameters" validation error and no backend call. A
    /// backend rejection keeps the transaction open with its error set so
    /// the user can correct the name.
    pub async fn confirm(&mut self, current_path: &str) -> Result<RenamedPaths, AppError> {
        self.ctx
            .session
            .require(UserRole::Operator, "Renaming files")?;
        let Some(tx) = self.transaction.as_mut() else {
            return Err(AppError::validation("No rename in progress"));
        };

        let proposed = tx.proposed_name.trim().to_string();
        if proposed.is_empty() || proposed == tx.target.name || proposed.contains('/') {
            let err = AppError::validation("Invalid parameters");
            tx.error = Some(err.message.clone());
            return Err(err);
        }

        let paths = RenamedPaths {
            old_path: path::join(current_path, &tx.target.name),
            new_path: path::join(current_path, &proposed),
        };
        tx.in_progress = true;
        tx.error = None;

        let result = self
            .ctx
            .backend
            .rename_file(self.ctx.server, &paths.old_path, &paths.new_path)
            .await;

        match result {
            Ok(()) => {
                self.transaction = None;
                info!(
                    server = %self.ctx.server,
                    from = %paths.old_path,
                    to = %paths.new_path,
                    "Renamed entry"
                );
                Ok(paths)
            }
            Err(e) => {
                warn!(from = %paths.old_path, error = %e, "Rename rejected");
                if let Some(tx) = self.transaction.as_mut() {
                    tx.in_progress = false;
                    tx.error = Some(e.message.clone());
                }
                Err(e.reclassify(ErrorKind::Rename))
            }
        }
    }
}
