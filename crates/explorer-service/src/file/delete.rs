//! Single and bulk delete.

use tracing::{info, warn};

use explorer_core::error::{AppError, ErrorKind};
use explorer_core::types::{FileSystemItem, path};
use explorer_entity::{DeleteFailure, DeleteOutcome, UserRole};

use crate::context::ExplorerContext;
use crate::navigation::{PathModel, SelectionModel};

/// Deletes entries through the backend.
///
/// A single delete leaves refreshing the listing to the caller. A bulk
/// delete knows the result of every item, so it prunes the selection and
/// the listing itself instead of forcing a refetch.
#[derive(Debug)]
pub struct DeleteCoordinator {
    ctx: ExplorerContext,
}

impl DeleteCoordinator {
    /// Creates a new delete coordinator.
    pub fn new(ctx: ExplorerContext) -> Self {
        Self { ctx }
    }

    /// Deletes one entry of `current_path`.
    pub async fn delete_one(&self, item: &FileSystemItem, current_path: &str) -> Result<(), AppError> {
        self.ctx
            .session
            .require(UserRole::Operator, "Deleting files")?;
        let target = path::join(current_path, &item.name);
        self.ctx
            .backend
            .delete_file(self.ctx.server, &target)
            .await
            .map_err(|e| {
                warn!(path = %target, error = %e, "Delete failed");
                e.reclassify(ErrorKind::Delete)
            })?;

        info!(server = %self.ctx.server, path = %target, "Deleted entry");
        Ok(())
    }

    /// Deletes every entry of `items` whose name is selected.
    ///
    /// Calls are strictly sequential and a failure does not stop the rest.
    /// Deleted names are removed from `selection` before returning.
    pub async fn delete_bulk(
        &self,
        items: &[FileSystemItem],
        current_path: &str,
        selection: &mut SelectionModel,
    ) -> DeleteOutcome {
        let mut outcome = DeleteOutcome::default();

        for item in selection.selected_items(items) {
            match self.delete_one(item, current_path).await {
                Ok(()) => {
                    outcome.success_count += 1;
                    outcome.deleted_names.push(item.name.clone());
                }
                Err(e) => {
                    outcome.fail_count += 1;
                    outcome.failures.push(DeleteFailure {
                        name: item.name.clone(),
                        reason: e.message,
                    });
                }
            }
        }

        for name in &outcome.deleted_names {
            selection.remove(name);
        }

        info!(
            server = %self.ctx.server,
            directory = current_path,
            deleted = outcome.success_count,
            failed = outcome.fail_count,
            "Bulk delete finished"
        );
        outcome
    }

    /// Bulk-deletes the selected entries of the current listing and drops
    /// the deleted ones from it.
    pub async fn delete_selected(
        &self,
        navigation: &mut PathModel,
        selection: &mut SelectionModel,
    ) -> DeleteOutcome {
        let items = navigation.items().to_vec();
        let current_path = navigation.current_path().to_string();
        let outcome = self.delete_bulk(&items, &current_path, selection).await;
        navigation.remove_items(&outcome.deleted_names);
        outcome
    }
}
