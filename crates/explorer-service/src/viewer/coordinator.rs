//! File viewer and editor.

use tracing::{debug, info, warn};

use explorer_core::error::{AppError, ErrorKind};
use explorer_core::types::{FileSystemItem, WriteFileRequest, path};
use explorer_entity::file::kind::mime_type;
use explorer_entity::{FileKind, UserRole, ViewerContent, ViewerSession, ViewerTab};

use super::history::VersionHistory;
use crate::context::ExplorerContext;

/// Owns the single open [`ViewerSession`] and the object URL behind an
/// image preview.
///
/// The URL is revoked exactly once: when the session is closed, replaced by
/// another file, reloaded, or when the coordinator is dropped.
#[derive(Debug)]
pub struct ViewerCoordinator {
    ctx: ExplorerContext,
    session: Option<ViewerSession>,
    history: VersionHistory,
}

impl ViewerCoordinator {
    /// Creates a closed viewer.
    pub fn new(ctx: ExplorerContext) -> Self {
        Self {
            history: VersionHistory::new(ctx.clone()),
            ctx,
            session: None,
        }
    }

    /// The open session.
    pub fn session(&self) -> Option<&ViewerSession> {
        self.session.as_ref()
    }

    /// Whether a file is open.
    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// History pane of the open file.
    pub fn history(&self) -> &VersionHistory {
        &self.history
    }

    /// Mutable history pane, for selecting and restoring versions.
    pub fn history_mut(&mut self) -> &mut VersionHistory {
        &mut self.history
    }

    /// Opens `item` from `current_path`.
    ///
    /// Returns `Ok(false)` without touching the current session when the
    /// file is not viewable. Otherwise any previous session is released and
    /// the new content is fetched: raw bytes behind an object URL for
    /// images, decoded text for text files.
    pub async fn open(&mut self, item: &FileSystemItem, current_path: &str) -> Result<bool, AppError> {
        let kind = FileKind::classify(&item.name);
        if !kind.is_viewable() {
            debug!(name = %item.name, ?kind, "Not viewable");
            return Ok(false);
        }

        self.close();
        let file_path = path::join(current_path, &item.name);
        self.session = Some(ViewerSession::loading(item.clone(), file_path, kind));
        self.load_content().await?;
        Ok(true)
    }

    /// Fetches the open file's content again and shows the content tab.
    pub async fn reload(&mut self) -> Result<(), AppError> {
        let url = match self.session.as_mut() {
            Some(session) => {
                session.active_tab = ViewerTab::Content;
                session.is_editing = false;
                session.edited_content.clear();
                session.is_loading = true;
                std::mem::replace(&mut session.content, ViewerContent::Empty)
            }
            None => return Err(AppError::validation("No file is open")),
        };
        self.release(url);
        self.load_content().await
    }

    /// Releases the object URL and resets all viewer state.
    pub fn close(&mut self) {
        if let Some(session) = self.session.take() {
            self.release(session.content);
        }
        self.history.reset();
    }

    /// Copies the current text into the edit buffer.
    pub fn start_edit(&mut self) -> Result<(), AppError> {
        let session = self.open_session_mut()?;
        let Some(text) = session.content.text() else {
            return Err(AppError::validation("Only text files can be edited"));
        };
        session.edited_content = text.to_string();
        session.is_editing = true;
        Ok(())
    }

    /// Replaces the edit buffer.
    pub fn set_edited_content(&mut self, content: impl Into<String>) -> Result<(), AppError> {
        let session = self.open_session_mut()?;
        if !session.is_editing {
            return Err(AppError::validation("Not in edit mode"));
        }
        session.edited_content = content.into();
        Ok(())
    }

    /// Discards the edit buffer.
    pub fn cancel_edit(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.is_editing = false;
            session.edited_content.clear();
        }
    }

    /// Writes the edit buffer to the path the file was opened from.
    ///
    /// Every save asks the backend to snapshot the previous content, which
    /// is what populates version history. Returns the saved path.
    pub async fn save(&mut self) -> Result<String, AppError> {
        self.ctx.session.require(UserRole::Operator, "Saving files")?;
        let username = self.ctx.username().to_string();
        let session = self.open_session_mut()?;
        if !session.is_editing {
            return Err(AppError::validation("Not in edit mode"));
        }
        session.is_saving = true;
        let file_path = session.file_path.clone();
        let buffer = session.edited_content.clone();

        let result = self
            .ctx
            .backend
            .write_file(
                self.ctx.server,
                &file_path,
                WriteFileRequest::editor_save(buffer.clone(), Some(username)),
            )
            .await;

        let session = self.open_session_mut()?;
        session.is_saving = false;
        match result {
            Ok(()) => {
                session.content = ViewerContent::Text(buffer);
                session.is_editing = false;
                session.edited_content.clear();
                session.error = None;
                info!(server = %self.ctx.server, path = %file_path, "Saved file");
                Ok(file_path)
            }
            Err(e) => {
                warn!(path = %file_path, error = %e, "Save failed");
                session.error = Some(e.message.clone());
                Err(e.reclassify(ErrorKind::Viewer))
            }
        }
    }

    /// Hands the open file's bytes to the host's save-as.
    pub async fn download_current(&self) -> Result<(), AppError> {
        let session = self
            .session
            .as_ref()
            .ok_or_else(|| AppError::validation("No file is open"))?;
        let data = self
            .ctx
            .backend
            .download_file(self.ctx.server, &session.file_path)
            .await
            .map_err(|e| e.reclassify(ErrorKind::Viewer))?;
        self.ctx.blobs.save_as(&session.file.name, data)?;
        info!(path = %session.file_path, "Downloaded file");
        Ok(())
    }

    /// Switches to the history tab and loads the file's versions.
    pub async fn show_history(&mut self) -> Result<(), AppError> {
        let session = self.open_session_mut()?;
        session.active_tab = ViewerTab::History;
        let file_path = session.file_path.clone();
        self.history.load(self.ctx.server, &file_path).await
    }

    /// Switches back to the content tab.
    pub fn show_content(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.active_tab = ViewerTab::Content;
        }
    }

    async fn load_content(&mut self) -> Result<(), AppError> {
        let (kind, file_path, name) = match self.session.as_ref() {
            Some(s) => (s.kind, s.file_path.clone(), s.file.name.clone()),
            None => return Err(AppError::validation("No file is open")),
        };

        let backend = &self.ctx.backend;
        let loaded = match kind {
            FileKind::Image => backend
                .download_file(self.ctx.server, &file_path)
                .await
                .map(|bytes| {
                    ViewerContent::Image(self.ctx.blobs.create_object_url(bytes, &mime_type(&name)))
                }),
            FileKind::Text => backend
                .read_text_file(self.ctx.server, &file_path)
                .await
                .map(|text| ViewerContent::Text(text.content)),
            FileKind::Binary | FileKind::Unknown => Err(AppError::validation(format!(
                "File type cannot be viewed: {name}"
            ))),
        };

        let session = self.open_session_mut()?;
        session.is_loading = false;
        match loaded {
            Ok(content) => {
                session.content = content;
                session.error = None;
                debug!(path = %file_path, ?kind, "Loaded viewer content");
                Ok(())
            }
            Err(e) => {
                warn!(path = %file_path, error = %e, "Failed to load viewer content");
                session.error = Some(e.message.clone());
                Err(e.reclassify(ErrorKind::Viewer))
            }
        }
    }

    fn open_session_mut(&mut self) -> Result<&mut ViewerSession, AppError> {
        self.session
            .as_mut()
            .ok_or_else(|| AppError::validation("No file is open"))
    }

    fn release(&self, content: ViewerContent) {
        if let ViewerContent::Image(url) = content {
            debug!(url = url.as_str(), "Revoking preview URL");
            self.ctx.blobs.revoke_object_url(url);
        }
    }
}

impl Drop for ViewerCoordinator {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            self.release(session.content);
        }
    }
}
