//! The file explorer interaction model.

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use explorer_core::config::{UploadConfig, UploadProfile};
use explorer_core::error::{AppError, ErrorKind};
use explorer_core::events::{DomainEvent, ExplorerEvent};
use explorer_core::types::{FileSystemItem, path};
use explorer_entity::DeleteOutcome;
use explorer_entity::upload::{DroppedEntry, PendingFile, UploadResult};

use super::menu::{ClickSubscription, ContextMenu, DocumentClick, MenuAction, MenuScope};
use super::notice::{NoticeBoard, NoticeSeverity};
use crate::context::ExplorerContext;
use crate::file::{DeleteCoordinator, RenameCoordinator};
use crate::navigation::{PathModel, SelectionModel};
use crate::upload::UploadCoordinator;
use crate::viewer::ViewerCoordinator;

const EVENT_CAPACITY: usize = 64;
const CLICK_CAPACITY: usize = 16;

/// What the user is doing. Uploads run independently of this state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    /// Looking at the listing.
    Browsing,
    /// A context menu is open.
    ContextMenu(ContextMenu),
    /// Typing a new name.
    Renaming,
    /// Confirming deletion of one entry.
    ConfirmingDelete(FileSystemItem),
    /// Confirming deletion of the selection.
    ConfirmingBulkDelete(Vec<String>),
    /// A file is open in the viewer.
    Viewing,
}

/// Wires the coordinators into one explorer.
///
/// Every coordinator failure ends up as a [`Notice`](super::Notice);
/// every successful mutation is published as a [`DomainEvent`] and, except
/// for bulk delete, followed by a listing refresh whose own failure is
/// reported as a warning.
#[derive(Debug)]
pub struct FileExplorer {
    ctx: ExplorerContext,
    upload_config: UploadConfig,
    navigation: PathModel,
    selection: SelectionModel,
    uploads: UploadCoordinator,
    renamer: RenameCoordinator,
    deleter: DeleteCoordinator,
    viewer: ViewerCoordinator,
    interaction: Interaction,
    notices: NoticeBoard,
    events: broadcast::Sender<DomainEvent>,
    clicks: broadcast::Sender<DocumentClick>,
    menu_clicks: Option<ClickSubscription>,
}

impl FileExplorer {
    /// Creates an explorer at `/` using the general upload profile.
    pub fn new(ctx: ExplorerContext, upload_config: UploadConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (clicks, _) = broadcast::channel(CLICK_CAPACITY);
        Self {
            uploads: UploadCoordinator::new(
                ctx.clone(),
                upload_config.policy(UploadProfile::General).clone(),
            ),
            renamer: RenameCoordinator::new(ctx.clone()),
            deleter: DeleteCoordinator::new(ctx.clone()),
            viewer: ViewerCoordinator::new(ctx.clone()),
            navigation: PathModel::new(),
            selection: SelectionModel::new(),
            interaction: Interaction::Browsing,
            notices: NoticeBoard::new(),
            upload_config,
            events,
            clicks,
            menu_clicks: None,
            ctx,
        }
    }

    // -- Accessors --

    /// Collaborators in use.
    pub fn context(&self) -> &ExplorerContext {
        &self.ctx
    }

    /// Current directory and listing.
    pub fn navigation(&self) -> &PathModel {
        &self.navigation
    }

    /// Current selection.
    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    /// Upload coordinator, for progress subscriptions.
    pub fn uploads(&self) -> &UploadCoordinator {
        &self.uploads
    }

    /// Rename coordinator.
    pub fn renamer(&self) -> &RenameCoordinator {
        &self.renamer
    }

    /// Viewer.
    pub fn viewer(&self) -> &ViewerCoordinator {
        &self.viewer
    }

    /// Mutable viewer, for edit-buffer changes and version selection.
    pub fn viewer_mut(&mut self) -> &mut ViewerCoordinator {
        &mut self.viewer
    }

    /// Current interaction state.
    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    /// Open notices.
    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    /// Subscribes to domain events.
    pub fn subscribe_events(&self) -> broadcast::Receiver<DomainEvent> {
        self.events.subscribe()
    }

    /// Sender the host uses to report document clicks.
    pub fn document_clicks(&self) -> broadcast::Sender<DocumentClick> {
        self.clicks.clone()
    }

    /// Whether the explorer currently listens for document clicks.
    pub fn is_listening_for_clicks(&self) -> bool {
        self.menu_clicks.is_some()
    }

    // -- Navigation --

    /// Fetches the listing of the current directory.
    pub async fn load(&mut self) -> bool {
        match self.navigation.refresh(&*self.ctx.backend, self.ctx.server).await {
            Ok(_) => true,
            Err(e) => {
                self.notices.error(&e);
                false
            }
        }
    }

    /// Jumps to `path` and lists it.
    pub async fn navigate_to(&mut self, path: &str) -> bool {
        self.navigation.navigate_to_path(path::normalize(path));
        self.leave_directory();
        self.load().await
    }

    /// Moves to the parent directory and lists it. No-op at root.
    pub async fn navigate_up(&mut self) -> bool {
        if !self.navigation.navigate_up() {
            return false;
        }
        self.leave_directory();
        self.load().await
    }

    /// Enters a directory, or opens a viewable file.
    pub async fn open_item(&mut self, item: FileSystemItem) -> bool {
        if self.navigation.navigate_to_file(&item) {
            self.leave_directory();
            return self.load().await;
        }
        self.open_viewer(&item).await
    }

    /// Drops state tied to the directory being left: the selection, an
    /// unconfirmed rename, and a pending delete confirmation.
    fn leave_directory(&mut self) {
        self.selection.clear();
        self.abandon_rename();
        self.cancel_confirmation();
    }

    // -- Selection --

    /// Flips selection of `name`.
    pub fn toggle_selection(&mut self, name: &str) {
        self.selection.toggle(name);
    }

    /// Selects every listed entry.
    pub fn select_all(&mut self) {
        self.selection.select_all(self.navigation.items());
    }

    /// Clears the selection.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // -- Context menu --

    /// Opens the context menu for `target` and starts listening for clicks.
    /// An unconfirmed rename is abandoned.
    pub fn open_context_menu(&mut self, target: FileSystemItem) {
        self.abandon_rename();
        let menu = ContextMenu::for_target(target, &self.selection);
        debug!(target = %menu.target.name, bulk = menu.is_bulk(), "Opening context menu");
        self.menu_clicks = Some(ClickSubscription::acquire(&self.clicks));
        self.interaction = Interaction::ContextMenu(menu);
    }

    /// Closes the context menu and stops listening for clicks.
    pub fn close_context_menu(&mut self) {
        self.menu_clicks = None;
        if matches!(self.interaction, Interaction::ContextMenu(_)) {
            self.interaction = Interaction::Browsing;
        }
    }

    /// Processes reported document clicks; a click outside the menu closes
    /// it. Returns whether the menu was closed.
    pub fn poll_document_clicks(&mut self) -> bool {
        let outside = self
            .menu_clicks
            .as_mut()
            .is_some_and(ClickSubscription::clicked_outside);
        if outside {
            self.close_context_menu();
        }
        outside
    }

    /// Runs a context menu action. Ignored when no menu is open or the
    /// action is not offered.
    pub async fn choose(&mut self, action: MenuAction) {
        let Interaction::ContextMenu(menu) = &self.interaction else {
            return;
        };
        if !menu.actions().contains(&action) {
            debug!(?action, "Action not offered by this menu");
            return;
        }
        let menu = menu.clone();
        self.close_context_menu();

        match action {
            MenuAction::Open => {
                self.open_item(menu.target).await;
            }
            MenuAction::Rename => {
                self.renamer.start(menu.target);
                self.interaction = Interaction::Renaming;
            }
            MenuAction::Delete => {
                self.interaction = Interaction::ConfirmingDelete(menu.target);
            }
            MenuAction::Download => {
                self.download(&menu.target).await;
            }
            MenuAction::DeleteSelected => {
                if let MenuScope::Bulk { names } = menu.scope {
                    self.interaction = Interaction::ConfirmingBulkDelete(names);
                }
            }
            MenuAction::ClearSelection => self.selection.clear(),
        }
    }

    // -- Rename --

    /// Updates the name being typed.
    pub fn set_rename_text(&mut self, name: impl Into<String>) {
        self.renamer.set_proposed_name(name);
    }

    /// Confirms the open rename. On failure the rename stays open.
    pub async fn confirm_rename(&mut self) -> bool {
        let current = self.navigation.current_path().to_string();
        match self.renamer.confirm(&current).await {
            Ok(paths) => {
                self.selection.remove(path::file_name(&paths.old_path));
                self.interaction = Interaction::Browsing;
                self.notices
                    .info(format!("Renamed to {}", path::file_name(&paths.new_path)));
                self.publish(ExplorerEvent::Renamed {
                    old_path: paths.old_path,
                    new_path: paths.new_path,
                });
                self.refresh_after_mutation("Rename").await;
                true
            }
            Err(e) => {
                self.notices.error(&e);
                false
            }
        }
    }

    /// Abandons the open rename.
    pub fn cancel_rename(&mut self) {
        self.renamer.cancel();
        if self.interaction == Interaction::Renaming {
            self.interaction = Interaction::Browsing;
        }
    }

    fn abandon_rename(&mut self) {
        if self.interaction == Interaction::Renaming {
            self.cancel_rename();
        }
    }

    // -- Delete --

    /// Deletes the entry awaiting confirmation, then refreshes.
    pub async fn confirm_delete(&mut self) -> bool {
        let Interaction::ConfirmingDelete(item) = &self.interaction else {
            return false;
        };
        let item = item.clone();
        self.interaction = Interaction::Browsing;

        let current = self.navigation.current_path().to_string();
        match self.deleter.delete_one(&item, &current).await {
            Ok(()) => {
                self.selection.remove(&item.name);
                self.notices.info(format!("Deleted {}", item.name));
                self.publish(ExplorerEvent::Deleted {
                    directory: current,
                    names: vec![item.name],
                });
                self.refresh_after_mutation("Delete").await;
                true
            }
            Err(e) => {
                self.notices.error(&e);
                false
            }
        }
    }

    /// Deletes the names shown in the bulk confirmation dialog.
    ///
    /// Selection changes made while the dialog was open do not affect what
    /// is deleted. The listing is pruned locally from the per-item results
    /// rather than refetched, and the selection is cleared once the dialog
    /// completes.
    pub async fn confirm_bulk_delete(&mut self) -> Option<DeleteOutcome> {
        let Interaction::ConfirmingBulkDelete(names) = &self.interaction else {
            return None;
        };
        let mut confirmed: SelectionModel = names.iter().cloned().collect();
        self.interaction = Interaction::Browsing;

        let directory = self.navigation.current_path().to_string();
        let outcome = self
            .deleter
            .delete_selected(&mut self.navigation, &mut confirmed)
            .await;
        self.selection.clear();

        if outcome.is_complete() {
            self.notices
                .info(format!("Deleted {} item(s)", outcome.success_count));
        } else {
            let details = outcome
                .failures
                .iter()
                .map(|f| format!("{}: {}", f.name, f.reason))
                .collect();
            self.notices.push(
                NoticeSeverity::Warning,
                Some(ErrorKind::Delete),
                format!(
                    "Deleted {} item(s), {} failed",
                    outcome.success_count, outcome.fail_count
                ),
                details,
            );
        }

        if !outcome.deleted_names.is_empty() {
            self.publish(ExplorerEvent::Deleted {
                directory,
                names: outcome.deleted_names.clone(),
            });
        }
        Some(outcome)
    }

    /// Leaves a delete confirmation without deleting.
    pub fn cancel_confirmation(&mut self) {
        if matches!(
            self.interaction,
            Interaction::ConfirmingDelete(_) | Interaction::ConfirmingBulkDelete(_)
        ) {
            self.interaction = Interaction::Browsing;
        }
    }

    // -- Upload --

    /// Switches the security policy profile for later uploads.
    pub fn set_upload_profile(&mut self, profile: UploadProfile) {
        self.uploads
            .set_policy(self.upload_config.policy(profile).clone());
    }

    /// Uploads picked files into the current directory.
    ///
    /// Returns `None` when the session may not upload; the refusal is
    /// raised as an error notice.
    pub async fn upload_files(
        &mut self,
        files: Vec<PendingFile>,
        is_folder_upload: bool,
    ) -> Option<UploadResult> {
        let destination = self.navigation.current_path().to_string();
        let result = self
            .uploads
            .upload(files, is_folder_upload, &destination)
            .await;
        self.report_upload(result, destination).await
    }

    /// Uploads dropped entries into the current directory.
    pub async fn upload_dropped(&mut self, entries: Vec<DroppedEntry>) -> Option<UploadResult> {
        let destination = self.navigation.current_path().to_string();
        let result = self.uploads.upload_dropped(entries, &destination).await;
        self.report_upload(result, destination).await
    }

    /// Clears upload progress when its view is dismissed.
    pub fn dismiss_upload_progress(&mut self) {
        self.uploads.dismiss_progress();
    }

    async fn report_upload(
        &mut self,
        result: Result<UploadResult, AppError>,
        destination: String,
    ) -> Option<UploadResult> {
        let result = match result {
            Ok(result) => result,
            Err(e) => {
                self.notices.error(&e);
                return None;
            }
        };
        self.notify_upload(&result, destination).await;
        Some(result)
    }

    async fn notify_upload(&mut self, result: &UploadResult, destination: String) {
        let report = match result {
            UploadResult::Blocked(blocked) => {
                let details = blocked
                    .blocked
                    .iter()
                    .map(|b| format!("{}: {}", b.file.relative_path, b.reason))
                    .collect();
                self.notices.push(
                    NoticeSeverity::Blocking,
                    Some(ErrorKind::UploadBlocked),
                    blocked.error.clone(),
                    details,
                );
                return;
            }
            UploadResult::Completed(report) => report,
        };

        let outcome = &report.outcome;
        let mut details: Vec<String> = outcome
            .failed_paths
            .iter()
            .map(|f| format!("{}: {}", f.path, f.reason))
            .collect();
        details.extend(
            report
                .blocked
                .iter()
                .map(|b| format!("{}: blocked, {}", b.file.relative_path, b.reason)),
        );
        details.extend(report.warnings.iter().cloned());

        if let Some(error) = &outcome.process_error {
            self.notices.push(
                NoticeSeverity::Error,
                Some(ErrorKind::UploadProcess),
                format!("Upload failed: {error}"),
                details,
            );
        } else if !outcome.failed_paths.is_empty() || !report.blocked.is_empty() {
            self.notices.push(
                NoticeSeverity::Warning,
                None,
                format!(
                    "Uploaded {} file(s), {} failed, {} blocked",
                    outcome.successful_paths.len(),
                    outcome.failed_paths.len(),
                    report.blocked.len()
                ),
                details,
            );
        } else {
            self.notices.push(
                NoticeSeverity::Info,
                None,
                format!("Uploaded {} file(s)", outcome.successful_paths.len()),
                details,
            );
        }

        if !outcome.successful_paths.is_empty() {
            self.publish(ExplorerEvent::Uploaded {
                destination,
                successful: outcome.successful_paths.clone(),
                failed: outcome.failed_paths.len(),
            });
        }
        self.refresh_after_mutation("Upload").await;
    }

    // -- Viewer --

    /// Opens `item` in the viewer. Non-viewable files are ignored.
    pub async fn open_viewer(&mut self, item: &FileSystemItem) -> bool {
        let current = self.navigation.current_path().to_string();
        let opened = match self.viewer.open(item, &current).await {
            Ok(opened) => opened,
            Err(e) => {
                self.notices.error(&e);
                false
            }
        };
        if self.viewer.is_open() {
            self.abandon_rename();
            self.interaction = Interaction::Viewing;
        }
        opened
    }

    /// Closes the viewer, releasing its preview URL.
    pub fn close_viewer(&mut self) {
        self.viewer.close();
        if self.interaction == Interaction::Viewing {
            self.interaction = Interaction::Browsing;
        }
    }

    /// Saves the viewer's edit buffer.
    pub async fn save_viewer(&mut self) -> bool {
        match self.viewer.save().await {
            Ok(saved) => {
                self.notices
                    .info(format!("Saved {}", path::file_name(&saved)));
                self.publish(ExplorerEvent::Saved { path: saved });
                self.refresh_after_mutation("Save").await;
                true
            }
            Err(e) => {
                self.notices.error(&e);
                false
            }
        }
    }

    /// Shows the version history tab of the open file.
    pub async fn show_history(&mut self) -> bool {
        match self.viewer.show_history().await {
            Ok(()) => true,
            Err(e) => {
                self.notices.error(&e);
                false
            }
        }
    }

    /// Restores version `n` of the open file, then reloads the viewer on
    /// the content tab.
    pub async fn restore_version(&mut self, n: u32, description: Option<String>) -> bool {
        let Some(file_path) = self.viewer.session().map(|s| s.file_path.clone()) else {
            return false;
        };
        if let Err(e) = self.viewer.history_mut().restore(n, description).await {
            self.notices.error(&e);
            return false;
        }

        self.notices.info(format!("Restored version {n}"));
        self.publish(ExplorerEvent::Restored {
            path: file_path,
            version_number: n,
        });
        if let Err(e) = self.viewer.reload().await {
            self.notices.push(
                NoticeSeverity::Warning,
                Some(e.kind),
                format!("Version restored, but reloading the file failed: {}", e.message),
                Vec::new(),
            );
        }
        true
    }

    /// Deletes version `n` of the open file. Admin only.
    pub async fn delete_version(&mut self, n: u32) -> bool {
        let Some(file_path) = self.viewer.session().map(|s| s.file_path.clone()) else {
            return false;
        };
        match self.viewer.history_mut().delete_version(n).await {
            Ok(()) => {
                self.notices.info(format!("Deleted version {n}"));
                self.publish(ExplorerEvent::VersionDeleted {
                    path: file_path,
                    version_number: n,
                });
                true
            }
            Err(e) => {
                self.notices.error(&e);
                false
            }
        }
    }

    /// Downloads a listed file through the host's save-as.
    pub async fn download(&mut self, item: &FileSystemItem) -> bool {
        let target = path::join(self.navigation.current_path(), &item.name);
        let result = match self.ctx.backend.download_file(self.ctx.server, &target).await {
            Ok(data) => self.ctx.blobs.save_as(&item.name, data),
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => {
                info!(path = %target, "Downloaded file");
                true
            }
            Err(e) => {
                self.notices.error(&e);
                false
            }
        }
    }

    // -- Notices --

    /// Dismisses a non-blocking notice.
    pub fn dismiss_notice(&mut self, id: u64) -> bool {
        self.notices.dismiss(id)
    }

    /// Acknowledges any notice, blocking ones included.
    pub fn acknowledge_notice(&mut self, id: u64) -> bool {
        self.notices.acknowledge(id)
    }

    /// Releases the click subscription and the viewer's preview URL.
    pub fn teardown(&mut self) {
        self.close_context_menu();
        self.close_viewer();
    }

    // -- Internals --

    async fn refresh_after_mutation(&mut self, operation: &str) {
        if let Err(e) = self
            .navigation
            .refresh(&*self.ctx.backend, self.ctx.server)
            .await
        {
            warn!(operation, error = %e, "Refresh after mutation failed");
            self.notices.push(
                NoticeSeverity::Warning,
                Some(ErrorKind::Listing),
                format!(
                    "{operation} succeeded, but refreshing the listing failed: {}",
                    e.message
                ),
                Vec::new(),
            );
        }
    }

    fn publish(&self, payload: ExplorerEvent) {
        let event = DomainEvent::new(self.ctx.server, self.ctx.username(), payload);
        // No subscribers is not an error.
        let _ = self.events.send(event);
    }
}
