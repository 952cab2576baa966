//! Current directory, its listing, and navigation.

use tracing::{debug, warn};

use explorer_core::error::{AppError, ErrorKind};
use explorer_core::traits::StorageBackend;
use explorer_core::types::{FileSystemItem, ServerRef, path};
use explorer_entity::NavigationState;

/// Proof that a listing fetch was started, handed back when it completes.
///
/// A result is applied only if its ticket is still the newest one and the
/// directory has not changed since; anything else is stale and discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    seq: u64,
    path: String,
}

impl FetchTicket {
    /// Directory the fetch was started for.
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Owns [`NavigationState`]. Navigation only changes the path; fetching is a
/// separate, explicit step.
#[derive(Debug, Default)]
pub struct PathModel {
    state: NavigationState,
    seq: u64,
}

impl PathModel {
    /// Starts at `/` with an empty listing.
    pub fn new() -> Self {
        Self::default()
    }

    /// The whole navigation state.
    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    /// Directory being browsed.
    pub fn current_path(&self) -> &str {
        &self.state.current_path
    }

    /// Listing of the current directory.
    pub fn items(&self) -> &[FileSystemItem] {
        &self.state.items
    }

    /// Jumps to `path`. No fetch and no syntax check; a bad path shows up as a
    /// listing error.
    pub fn navigate_to_path(&mut self, path: impl Into<String>) {
        self.state.current_path = path.into();
        self.seq += 1;
    }

    /// Moves to the parent directory. Returns `false` at root.
    pub fn navigate_up(&mut self) -> bool {
        if self.state.current_path == path::ROOT {
            return false;
        }
        let parent = path::parent(&self.state.current_path);
        self.navigate_to_path(parent);
        true
    }

    /// Enters `item` if it is a directory. Returns whether the path changed.
    pub fn navigate_to_file(&mut self, item: &FileSystemItem) -> bool {
        if !item.is_directory {
            return false;
        }
        let next = path::join(&self.state.current_path, &item.name);
        self.navigate_to_path(next);
        true
    }

    /// Marks a fetch of the current directory as outstanding.
    ///
    /// Any ticket issued earlier becomes stale.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.seq += 1;
        self.state.is_loading = true;
        FetchTicket {
            seq: self.seq,
            path: self.state.current_path.clone(),
        }
    }

    /// Applies a fetch result.
    ///
    /// Returns `Ok(true)` when the listing was replaced, `Ok(false)` when the
    /// result was stale and ignored, and a listing error when the fetch failed.
    pub fn apply_listing(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<FileSystemItem>, AppError>,
    ) -> Result<bool, AppError> {
        if ticket.seq != self.seq || ticket.path != self.state.current_path {
            debug!(path = %ticket.path, "Discarding stale listing");
            return Ok(false);
        }

        self.state.is_loading = false;
        match result {
            Ok(items) => {
                self.state.items = items;
                self.state.last_error = None;
                Ok(true)
            }
            Err(e) => {
                let e = e.reclassify(ErrorKind::Listing);
                warn!(path = %ticket.path, error = %e, "Listing failed");
                self.state.last_error = Some(e.message.clone());
                Err(e)
            }
        }
    }

    /// Fetches the current directory and replaces the listing.
    pub async fn refresh(
        &mut self,
        backend: &dyn StorageBackend,
        server: ServerRef,
    ) -> Result<bool, AppError> {
        let ticket = self.begin_fetch();
        let result = backend.list_directory(server, ticket.path()).await;
        self.apply_listing(ticket, result)
    }

    /// Drops entries by name after a confirmed delete.
    pub fn remove_items(&mut self, names: &[String]) {
        self.state.items.retain(|item| !names.contains(&item.name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn dir(name: &str) -> FileSystemItem {
        FileSystemItem::directory(format!("/{name}"), Utc::now())
    }

    #[test]
    fn test_navigate_into_and_up_round_trips() {
        let mut model = PathModel::new();
        for start in ["/", "/world", "/plugins/essentials"] {
            model.navigate_to_path(start);
            assert!(model.navigate_to_file(&dir("region")));
            assert!(model.navigate_up());
            assert_eq!(model.current_path(), start);
        }
    }

    #[test]
    fn test_navigate_up_at_root_is_idempotent() {
        let mut model = PathModel::new();
        for _ in 0..3 {
            assert!(!model.navigate_up());
            assert_eq!(model.current_path(), "/");
        }
    }

    #[test]
    fn test_navigate_to_file_ignores_files() {
        let mut model = PathModel::new();
        let file = FileSystemItem::file("/server.properties", 2048, Utc::now());
        assert!(!model.navigate_to_file(&file));
        assert_eq!(model.current_path(), "/");
    }

    #[test]
    fn test_stale_listing_is_discarded() {
        let mut model = PathModel::new();
        let old = model.begin_fetch();
        model.navigate_to_file(&dir("world"));
        let current = model.begin_fetch();

        assert!(!model.apply_listing(old, Ok(vec![dir("stale")])).unwrap());
        assert!(model.items().is_empty());
        assert!(model.state().is_loading);

        assert!(model.apply_listing(current, Ok(vec![dir("region")])).unwrap());
        assert_eq!(model.items()[0].name, "region");
        assert!(!model.state().is_loading);
    }

    #[test]
    fn test_listing_error_is_recorded() {
        let mut model = PathModel::new();
        let ticket = model.begin_fetch();
        let err = model
            .apply_listing(ticket, Err(AppError::storage("backend offline")))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Listing);
        assert_eq!(model.state().last_error.as_deref(), Some("backend offline"));
    }
}
