//! Version history of the file open in the viewer.

use tracing::{info, warn};

use explorer_core::error::{AppError, ErrorKind};
use explorer_core::types::{FileVersionRecord, RestoreRequest, ServerRef};
use explorer_entity::UserRole;

use crate::context::ExplorerContext;

/// Lists, previews, restores, and deletes stored versions of one file.
///
/// Versions are kept in the order the backend returns them; nothing here
/// renumbers or reorders.
#[derive(Debug)]
pub struct VersionHistory {
    ctx: ExplorerContext,
    target: Option<(ServerRef, String)>,
    versions: Vec<FileVersionRecord>,
    is_loading: bool,
    selected: Option<u32>,
    selected_content: Option<String>,
    description: String,
    error: Option<String>,
}

impl VersionHistory {
    /// Creates an empty history pane.
    pub fn new(ctx: ExplorerContext) -> Self {
        Self {
            ctx,
            target: None,
            versions: Vec::new(),
            is_loading: false,
            selected: None,
            selected_content: None,
            description: String::new(),
            error: None,
        }
    }

    /// Versions of the loaded file. Empty means "no history".
    pub fn versions(&self) -> &[FileVersionRecord] {
        &self.versions
    }

    /// File the history belongs to.
    pub fn file_path(&self) -> Option<&str> {
        self.target.as_ref().map(|(_, path)| path.as_str())
    }

    /// Whether a fetch is outstanding.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Version shown in the detail pane.
    pub fn selected(&self) -> Option<u32> {
        self.selected
    }

    /// Content of the selected version, once fetched.
    pub fn selected_content(&self) -> Option<&str> {
        self.selected_content.as_deref()
    }

    /// Text of the restore description field.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Updates the restore description field.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Last failure shown in the pane.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Forgets the loaded file.
    pub fn reset(&mut self) {
        self.target = None;
        self.versions.clear();
        self.is_loading = false;
        self.selected = None;
        self.selected_content = None;
        self.description.clear();
        self.error = None;
    }

    /// Fetches the version list of `file_path`.
    pub async fn load(&mut self, server: ServerRef, file_path: &str) -> Result<(), AppError> {
        if self.file_path() != Some(file_path) {
            self.reset();
        }
        self.target = Some((server, file_path.to_string()));
        self.reload().await
    }

    /// Fetches the version list of the loaded file again.
    pub async fn reload(&mut self) -> Result<(), AppError> {
        let (server, file_path) = self.require_target()?;
        self.is_loading = true;
        let result = self.ctx.backend.get_file_history(server, &file_path).await;
        self.is_loading = false;

        match result {
            Ok(versions) => {
                self.versions = versions;
                self.error = None;
                if let Some(n) = self.selected {
                    if !self.versions.iter().any(|v| v.version_number == n) {
                        self.selected = None;
                        self.selected_content = None;
                    }
                }
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Shows version `n` in the detail pane, or closes the pane if `n` is
    /// already shown.
    pub async fn select_version(&mut self, n: u32) -> Result<(), AppError> {
        if self.selected == Some(n) {
            self.selected = None;
            self.selected_content = None;
            return Ok(());
        }

        let (server, file_path) = self.require_target()?;
        self.selected = Some(n);
        self.selected_content = None;
        match self
            .ctx
            .backend
            .get_file_version_content(server, &file_path, n)
            .await
        {
            Ok(text) => {
                if self.selected == Some(n) {
                    self.selected_content = Some(text.content);
                }
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Restores version `n`, snapshotting the current content first.
    ///
    /// The description field is cleared on call; an explicit `description`
    /// takes precedence over the field. Reacting to success (reloading the
    /// viewer) is up to the caller; the version list itself is refetched here.
    pub async fn restore(&mut self, n: u32, description: Option<String>) -> Result<(), AppError> {
        self.ctx
            .session
            .require(UserRole::Operator, "Restoring a file version")?;
        let (server, file_path) = self.require_target()?;
        let field = std::mem::take(&mut self.description);
        let description = description.or(Some(field)).filter(|d| !d.trim().is_empty());

        let request = RestoreRequest {
            create_backup_before_restore: true,
            description,
            editor: Some(self.ctx.username().to_string()),
        };
        if let Err(e) = self
            .ctx
            .backend
            .restore_file_from_version(server, &file_path, n, request)
            .await
        {
            return Err(self.fail(e));
        }
        info!(server = %server, path = %file_path, version = n, "Restored file version");

        if let Err(e) = self.reload().await {
            warn!(path = %file_path, error = %e, "History reload after restore failed");
        }
        Ok(())
    }

    /// Removes version `n`. Admin only; remaining versions keep their numbers.
    pub async fn delete_version(&mut self, n: u32) -> Result<(), AppError> {
        self.ctx
            .session
            .require(UserRole::Admin, "Deleting a file version")?;
        let (server, file_path) = self.require_target()?;

        if let Err(e) = self
            .ctx
            .backend
            .delete_file_version(server, &file_path, n)
            .await
        {
            return Err(self.fail(e));
        }
        info!(server = %server, path = %file_path, version = n, "Deleted file version");

        self.versions.retain(|v| v.version_number != n);
        if self.selected == Some(n) {
            self.selected = None;
            self.selected_content = None;
        }
        Ok(())
    }

    fn require_target(&self) -> Result<(ServerRef, String), AppError> {
        self.target
            .clone()
            .ok_or_else(|| AppError::validation("No file loaded in version history"))
    }

    fn fail(&mut self, e: AppError) -> AppError {
        let e = e.reclassify(ErrorKind::VersionHistory);
        warn!(path = ?self.file_path(), error = %e, "Version history request failed");
        self.error = Some(e.message.clone());
        e
    }
}
