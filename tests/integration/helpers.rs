//! Shared test helpers for integration tests.

use std::sync::Arc;

use explorer_core::config::UploadConfig;
use explorer_core::types::{FileSystemItem, ServerRef};
use explorer_entity::{SessionContext, UserRole};
use explorer_service::{ExplorerContext, FileExplorer};
use explorer_storage::{MemoryBackend, MemoryBlobHost};

/// An explorer over fresh in-memory collaborators.
pub struct TestExplorer {
    /// Backend, for seeding and failure injection
    pub backend: Arc<MemoryBackend>,
    /// Blob host, for object URL bookkeeping
    pub blobs: Arc<MemoryBlobHost>,
    /// Collaborators handed to the explorer
    pub ctx: ExplorerContext,
    /// The explorer under test
    pub explorer: FileExplorer,
}

impl TestExplorer {
    /// Create an explorer for an admin user over an empty server.
    pub fn new() -> Self {
        Self::with_role(UserRole::Admin)
    }

    /// Create an explorer for a user with `role`.
    pub fn with_role(role: UserRole) -> Self {
        let backend = Arc::new(MemoryBackend::new());
        let blobs = Arc::new(MemoryBlobHost::new());
        let ctx = ExplorerContext::new(
            backend.clone(),
            blobs.clone(),
            ServerRef::new(),
            SessionContext::new("tester", role),
        );
        let explorer = FileExplorer::new(ctx.clone(), UploadConfig::default());
        Self {
            backend,
            blobs,
            ctx,
            explorer,
        }
    }

    /// Seed a typical server layout and list the root.
    pub async fn seeded() -> Self {
        let mut t = Self::new();
        let server = t.ctx.server;
        t.backend.insert_dir(server, "/world").await;
        t.backend.insert_dir(server, "/plugins").await;
        t.backend
            .insert_file(server, "/world/level.dat", "level")
            .await;
        t.backend
            .insert_file(server, "/server.properties", "motd=A Minecraft Server")
            .await;
        t.backend.insert_file(server, "/ops.json", "[]").await;
        assert!(t.explorer.load().await);
        t
    }

    /// The listed entry called `name` in the current directory.
    pub fn item(&self, name: &str) -> FileSystemItem {
        self.explorer
            .navigation()
            .state()
            .find(name)
            .cloned()
            .unwrap_or_else(|| panic!("'{name}' is not listed"))
    }

    /// Names listed in the current directory, in order.
    pub fn listed_names(&self) -> Vec<String> {
        self.explorer
            .navigation()
            .items()
            .iter()
            .map(|i| i.name.clone())
            .collect()
    }
}
