//! Collaborators shared by every coordinator.

use std::sync::Arc;

use explorer_core::traits::{BlobHost, StorageBackend};
use explorer_core::types::ServerRef;
use explorer_entity::SessionContext;

/// The backend, blob host, server, and acting session an explorer runs against.
///
/// Cheap to clone; each coordinator keeps its own copy.
#[derive(Debug, Clone)]
pub struct ExplorerContext {
    /// Storage backend serving the server's files.
    pub backend: Arc<dyn StorageBackend>,
    /// Host environment for object URLs and downloads.
    pub blobs: Arc<dyn BlobHost>,
    /// Server whose files are shown.
    pub server: ServerRef,
    /// Who is operating the explorer.
    pub session: SessionContext,
}

impl ExplorerContext {
    /// Creates a new explorer context.
    pub fn new(
        backend: Arc<dyn StorageBackend>,
        blobs: Arc<dyn BlobHost>,
        server: ServerRef,
        session: SessionContext,
    ) -> Self {
        Self {
            backend,
            blobs,
            server,
            session,
        }
    }

    /// Username recorded on versions and events.
    pub fn username(&self) -> &str {
        &self.session.username
    }
}
