//! In-memory storage backend with failure injection.
//!
//! Holds one file tree per server. Any operation can be made to fail for a
//! specific path with [`MemoryBackend::fail`], and every call is counted, so
//! tests can assert both on outcomes and on how many requests were issued.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::RwLock;
use tracing::debug;

use explorer_core::error::AppError;
use explorer_core::result::AppResult;
use explorer_core::traits::StorageBackend;
use explorer_core::types::{
    BatchUploadResult, FailedFile, FileSystemItem, FileVersionRecord, ProgressCallback,
    RestoreRequest, ServerRef, TextContent, UploadFile, UploadProgressEvent, VersionId,
    WriteFileRequest, path,
};

use crate::digest::content_hash;

/// Backend operations, used to target injected failures and count calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendOp {
    /// `list_directory`
    List,
    /// `read_text_file`
    ReadText,
    /// `download_file`
    Download,
    /// `write_file`
    Write,
    /// `rename_file`
    Rename,
    /// `delete_file`
    Delete,
    /// Either upload endpoint. Keyed by the destination directory for a
    /// batch-level failure, or by a file's target path for a per-file one.
    Upload,
    /// `get_file_history`
    History,
    /// `get_file_version_content`
    VersionContent,
    /// `restore_file_from_version`
    Restore,
    /// `delete_file_version`
    DeleteVersion,
}

#[derive(Debug, Clone)]
enum Node {
    Directory { modified_at: DateTime<Utc> },
    File { data: Bytes, modified_at: DateTime<Utc> },
}

#[derive(Debug, Clone)]
struct StoredVersion {
    record: FileVersionRecord,
    data: Bytes,
}

#[derive(Debug, Default)]
struct History {
    last_number: u32,
    versions: Vec<StoredVersion>,
}

impl History {
    fn snapshot(&mut self, data: Bytes, editor: Option<String>, description: Option<String>) {
        self.last_number += 1;
        self.versions.push(StoredVersion {
            record: FileVersionRecord {
                id: VersionId::new(),
                version_number: self.last_number,
                created_at: Utc::now(),
                editor_username: editor,
                file_size_bytes: data.len() as u64,
                description,
                content_hash: content_hash(&data),
            },
            data,
        });
    }

    fn find(&self, version: u32) -> AppResult<&StoredVersion> {
        self.versions
            .iter()
            .find(|v| v.record.version_number == version)
            .ok_or_else(|| AppError::not_found(format!("Version {version} not found")))
    }
}

#[derive(Debug, Default)]
struct ServerTree {
    nodes: BTreeMap<String, Node>,
    history: HashMap<String, History>,
}

impl ServerTree {
    fn is_dir(&self, dir: &str) -> bool {
        dir == path::ROOT || matches!(self.nodes.get(dir), Some(Node::Directory { .. }))
    }

    fn ensure_dirs(&mut self, dir: &str) {
        if dir == path::ROOT || self.nodes.contains_key(dir) {
            return;
        }
        self.ensure_dirs(&path::parent(dir));
        self.nodes.insert(
            dir.to_string(),
            Node::Directory {
                modified_at: Utc::now(),
            },
        );
    }

    fn put_file(&mut self, file_path: &str, data: Bytes) {
        self.ensure_dirs(&path::parent(file_path));
        self.nodes.insert(
            file_path.to_string(),
            Node::File {
                data,
                modified_at: Utc::now(),
            },
        );
    }

    fn file_data(&self, file_path: &str) -> AppResult<Bytes> {
        match self.nodes.get(file_path) {
            Some(Node::File { data, .. }) => Ok(data.clone()),
            Some(Node::Directory { .. }) => Err(AppError::validation(format!(
                "Path is a directory: {file_path}"
            ))),
            None => Err(AppError::not_found(format!("File not found: {file_path}"))),
        }
    }

    /// The entry itself plus everything below it.
    fn subtree_keys(&self, root: &str) -> Vec<String> {
        let prefix = format!("{root}/");
        self.nodes
            .keys()
            .filter(|key| *key == root || key.starts_with(&prefix))
            .cloned()
            .collect()
    }
}

/// In-memory [`StorageBackend`].
#[derive(Debug, Default)]
pub struct MemoryBackend {
    /// File trees keyed by server.
    servers: RwLock<HashMap<ServerRef, ServerTree>>,
    /// Injected failures: (operation, path) -> error message.
    failures: DashMap<(BackendOp, String), String>,
    /// Call counters per operation.
    calls: DashMap<BackendOp, usize>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a file, creating missing parent directories.
    pub async fn insert_file(&self, server: ServerRef, file_path: &str, data: impl Into<Bytes>) {
        let mut servers = self.servers.write().await;
        servers
            .entry(server)
            .or_default()
            .put_file(&path::normalize(file_path), data.into());
    }

    /// Creates a directory and its ancestors.
    pub async fn insert_dir(&self, server: ServerRef, dir: &str) {
        let mut servers = self.servers.write().await;
        servers
            .entry(server)
            .or_default()
            .ensure_dirs(&path::normalize(dir));
    }

    /// Current content of a file, if it exists.
    pub async fn file_bytes(&self, server: ServerRef, file_path: &str) -> Option<Bytes> {
        let servers = self.servers.read().await;
        servers
            .get(&server)
            .and_then(|tree| tree.file_data(&path::normalize(file_path)).ok())
    }

    /// Whether a file or directory exists.
    pub async fn exists(&self, server: ServerRef, entry_path: &str) -> bool {
        let normalized = path::normalize(entry_path);
        let servers = self.servers.read().await;
        servers
            .get(&server)
            .is_some_and(|tree| tree.is_dir(&normalized) || tree.nodes.contains_key(&normalized))
    }

    /// Makes `op` on `target` fail with `message` until cleared.
    pub fn fail(&self, op: BackendOp, target: &str, message: &str) {
        self.failures
            .insert((op, path::normalize(target)), message.to_string());
    }

    /// Removes an injected failure.
    pub fn clear_failure(&self, op: BackendOp, target: &str) {
        self.failures.remove(&(op, path::normalize(target)));
    }

    /// Number of calls made to `op` so far.
    pub fn call_count(&self, op: BackendOp) -> usize {
        self.calls.get(&op).map(|count| *count).unwrap_or(0)
    }

    /// Counts the call and returns the injected failure for `target`, if any.
    fn enter(&self, op: BackendOp, target: &str) -> AppResult<()> {
        *self.calls.entry(op).or_insert(0) += 1;
        self.injected(op, target)
    }

    fn injected(&self, op: BackendOp, target: &str) -> AppResult<()> {
        match self.failures.get(&(op, target.to_string())) {
            Some(message) => Err(AppError::storage(message.value().clone())),
            None => Ok(()),
        }
    }

    async fn store_batch(
        &self,
        server: ServerRef,
        dest_path: &str,
        files: Vec<UploadFile>,
        on_progress: ProgressCallback<'_>,
        keep_structure: bool,
    ) -> AppResult<BatchUploadResult> {
        let dest = path::normalize(dest_path);
        self.enter(BackendOp::Upload, &dest)?;

        let mut servers = self.servers.write().await;
        let tree = servers.entry(server).or_default();
        if !tree.is_dir(&dest) {
            return Err(AppError::not_found(format!(
                "Destination directory not found: {dest}"
            )));
        }

        let mut result = BatchUploadResult::default();
        for file in files {
            let total = file.data.len() as u64;
            let relative = if keep_structure {
                file.relative_path.as_str()
            } else {
                path::file_name(&file.relative_path)
            };
            let target = path::normalize(&path::join(&dest, relative));

            on_progress(UploadProgressEvent {
                key: file.key,
                loaded: total / 2,
                total,
            });

            if let Err(e) = self.injected(BackendOp::Upload, &target) {
                result.failed.push(FailedFile {
                    file: file.relative_path,
                    error: e.message,
                });
                continue;
            }

            tree.put_file(&target, file.data);
            on_progress(UploadProgressEvent {
                key: file.key,
                loaded: total,
                total,
            });
            result.successful.push(file.relative_path);
        }

        debug!(
            %server,
            dest = %dest,
            stored = result.successful.len(),
            failed = result.failed.len(),
            "Stored upload batch"
        );
        Ok(result)
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    fn backend_type(&self) -> &str {
        "memory"
    }

    async fn list_directory(
        &self,
        server: ServerRef,
        dir_path: &str,
    ) -> AppResult<Vec<FileSystemItem>> {
        let dir = path::normalize(dir_path);
        self.enter(BackendOp::List, &dir)?;

        let servers = self.servers.read().await;
        let Some(tree) = servers.get(&server) else {
            return if dir == path::ROOT {
                Ok(Vec::new())
            } else {
                Err(AppError::not_found(format!("Directory not found: {dir}")))
            };
        };

        if !tree.is_dir(&dir) {
            return Err(match tree.nodes.get(&dir) {
                Some(_) => AppError::validation(format!("Not a directory: {dir}")),
                None => AppError::not_found(format!("Directory not found: {dir}")),
            });
        }

        let mut items: Vec<FileSystemItem> = tree
            .nodes
            .iter()
            .filter(|(key, _)| key.as_str() != path::ROOT && path::parent(key) == dir)
            .map(|(key, node)| match node {
                Node::Directory { modified_at } => FileSystemItem::directory(key, *modified_at),
                Node::File { data, modified_at } => {
                    FileSystemItem::file(key, data.len() as u64, *modified_at)
                }
            })
            .collect();

        items.sort_by(|a, b| {
            b.is_directory
                .cmp(&a.is_directory)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(items)
    }

    async fn read_text_file(&self, server: ServerRef, file_path: &str) -> AppResult<TextContent> {
        let file_path = path::normalize(file_path);
        let data = self.download_bytes(server, &file_path, BackendOp::ReadText).await?;
        let content = String::from_utf8(data.to_vec())
            .map_err(|_| AppError::validation(format!("File is not valid UTF-8: {file_path}")))?;
        Ok(TextContent { content })
    }

    async fn download_file(&self, server: ServerRef, file_path: &str) -> AppResult<Bytes> {
        self.download_bytes(server, &path::normalize(file_path), BackendOp::Download)
            .await
    }

    async fn write_file(
        &self,
        server: ServerRef,
        file_path: &str,
        request: WriteFileRequest,
    ) -> AppResult<()> {
        let file_path = path::normalize(file_path);
        self.enter(BackendOp::Write, &file_path)?;

        let mut servers = self.servers.write().await;
        let tree = servers.entry(server).or_default();
        if tree.is_dir(&file_path) {
            return Err(AppError::validation(format!(
                "Path is a directory: {file_path}"
            )));
        }

        if request.create_backup {
            if let Ok(current) = tree.file_data(&file_path) {
                tree.history
                    .entry(file_path.clone())
                    .or_default()
                    .snapshot(current, request.editor.clone(), None);
            }
        }

        tree.put_file(&file_path, Bytes::from(request.content.into_bytes()));
        debug!(%server, path = %file_path, backup = request.create_backup, "Wrote file");
        Ok(())
    }

    async fn rename_file(&self, server: ServerRef, old_path: &str, new_path: &str) -> AppResult<()> {
        let old = path::normalize(old_path);
        let new = path::normalize(new_path);
        self.enter(BackendOp::Rename, &old)?;

        let mut servers = self.servers.write().await;
        let tree = servers.entry(server).or_default();
        if !tree.nodes.contains_key(&old) {
            return Err(AppError::not_found(format!("Path not found: {old}")));
        }
        if tree.nodes.contains_key(&new) {
            return Err(AppError::conflict(format!("Target already exists: {new}")));
        }
        if !tree.is_dir(&path::parent(&new)) {
            return Err(AppError::not_found(format!(
                "Target directory not found: {}",
                path::parent(&new)
            )));
        }

        for key in tree.subtree_keys(&old) {
            let moved = format!("{new}{}", &key[old.len()..]);
            if let Some(node) = tree.nodes.remove(&key) {
                tree.nodes.insert(moved.clone(), node);
            }
            if let Some(history) = tree.history.remove(&key) {
                tree.history.insert(moved, history);
            }
        }

        debug!(%server, from = %old, to = %new, "Renamed entry");
        Ok(())
    }

    async fn delete_file(&self, server: ServerRef, file_path: &str) -> AppResult<()> {
        let target = path::normalize(file_path);
        self.enter(BackendOp::Delete, &target)?;
        if target == path::ROOT {
            return Err(AppError::validation("Refusing to delete the server root"));
        }

        let mut servers = self.servers.write().await;
        let tree = servers.entry(server).or_default();
        if !tree.nodes.contains_key(&target) {
            return Err(AppError::not_found(format!("Path not found: {target}")));
        }
        for key in tree.subtree_keys(&target) {
            tree.nodes.remove(&key);
            tree.history.remove(&key);
        }

        debug!(%server, path = %target, "Deleted entry");
        Ok(())
    }

    async fn upload_multiple_files(
        &self,
        server: ServerRef,
        dest_path: &str,
        files: Vec<UploadFile>,
        on_progress: ProgressCallback<'_>,
    ) -> AppResult<BatchUploadResult> {
        self.store_batch(server, dest_path, files, on_progress, false)
            .await
    }

    async fn upload_folder_structure(
        &self,
        server: ServerRef,
        dest_path: &str,
        files: Vec<UploadFile>,
        on_progress: ProgressCallback<'_>,
    ) -> AppResult<BatchUploadResult> {
        self.store_batch(server, dest_path, files, on_progress, true)
            .await
    }

    async fn get_file_history(
        &self,
        server: ServerRef,
        file_path: &str,
    ) -> AppResult<Vec<FileVersionRecord>> {
        let file_path = path::normalize(file_path);
        self.enter(BackendOp::History, &file_path)?;

        let servers = self.servers.read().await;
        let tree = servers
            .get(&server)
            .ok_or_else(|| AppError::not_found(format!("File not found: {file_path}")))?;
        tree.file_data(&file_path)?;

        Ok(tree
            .history
            .get(&file_path)
            .map(|h| h.versions.iter().map(|v| v.record.clone()).collect())
            .unwrap_or_default())
    }

    async fn get_file_version_content(
        &self,
        server: ServerRef,
        file_path: &str,
        version: u32,
    ) -> AppResult<TextContent> {
        let file_path = path::normalize(file_path);
        self.enter(BackendOp::VersionContent, &file_path)?;

        let servers = self.servers.read().await;
        let stored = servers
            .get(&server)
            .and_then(|tree| tree.history.get(&file_path))
            .ok_or_else(|| AppError::not_found(format!("No history for {file_path}")))?
            .find(version)?;

        let content = String::from_utf8(stored.data.to_vec())
            .map_err(|_| AppError::validation("Version content is not valid UTF-8"))?;
        Ok(TextContent { content })
    }

    async fn restore_file_from_version(
        &self,
        server: ServerRef,
        file_path: &str,
        version: u32,
        request: RestoreRequest,
    ) -> AppResult<()> {
        let file_path = path::normalize(file_path);
        self.enter(BackendOp::Restore, &file_path)?;

        let mut servers = self.servers.write().await;
        let tree = servers
            .get_mut(&server)
            .ok_or_else(|| AppError::not_found(format!("File not found: {file_path}")))?;
        let current = tree.file_data(&file_path)?;
        let history = tree
            .history
            .get_mut(&file_path)
            .ok_or_else(|| AppError::not_found(format!("No history for {file_path}")))?;
        let restored = history.find(version)?.data.clone();

        if request.create_backup_before_restore {
            history.snapshot(current, request.editor, request.description);
        }
        tree.put_file(&file_path, restored);

        debug!(%server, path = %file_path, version, "Restored file from version");
        Ok(())
    }

    async fn delete_file_version(
        &self,
        server: ServerRef,
        file_path: &str,
        version: u32,
    ) -> AppResult<()> {
        let file_path = path::normalize(file_path);
        self.enter(BackendOp::DeleteVersion, &file_path)?;

        let mut servers = self.servers.write().await;
        let history = servers
            .get_mut(&server)
            .and_then(|tree| tree.history.get_mut(&file_path))
            .ok_or_else(|| AppError::not_found(format!("No history for {file_path}")))?;
        let before = history.versions.len();
        history.versions.retain(|v| v.record.version_number != version);
        if history.versions.len() == before {
            return Err(AppError::not_found(format!("Version {version} not found")));
        }
        Ok(())
    }
}

impl MemoryBackend {
    async fn download_bytes(
        &self,
        server: ServerRef,
        file_path: &str,
        op: BackendOp,
    ) -> AppResult<Bytes> {
        self.enter(op, file_path)?;
        let servers = self.servers.read().await;
        servers
            .get(&server)
            .ok_or_else(|| AppError::not_found(format!("File not found: {file_path}")))?
            .file_data(file_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use explorer_core::types::UploadKey;

    fn no_progress() -> impl Fn(UploadProgressEvent) + Send + Sync {
        |_| {}
    }

    fn upload(key: usize, relative_path: &str, data: &'static str) -> UploadFile {
        UploadFile {
            key: UploadKey(key),
            relative_path: relative_path.to_string(),
            data: Bytes::from(data),
        }
    }

    #[tokio::test]
    async fn test_list_puts_directories_first() {
        let backend = MemoryBackend::new();
        let server = ServerRef::new();
        backend.insert_file(server, "/server.properties", "motd=hi").await;
        backend.insert_dir(server, "/world").await;

        let items = backend.list_directory(server, "/").await.unwrap();
        let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["world", "server.properties"]);
        assert_eq!(items[1].size, Some(7));
    }

    #[tokio::test]
    async fn test_folder_upload_keeps_structure_and_flat_upload_does_not() {
        let backend = MemoryBackend::new();
        let server = ServerRef::new();
        let progress = no_progress();

        backend
            .upload_folder_structure(
                server,
                "/",
                vec![upload(0, "world/region/r.0.0.mca", "x")],
                &progress,
            )
            .await
            .unwrap();
        backend
            .upload_multiple_files(server, "/", vec![upload(0, "plugins/a.jar", "y")], &progress)
            .await
            .unwrap();

        assert!(backend.exists(server, "/world/region/r.0.0.mca").await);
        assert!(backend.exists(server, "/a.jar").await);
        assert!(!backend.exists(server, "/plugins").await);
    }

    #[tokio::test]
    async fn test_per_file_upload_failure_is_reported() {
        let backend = MemoryBackend::new();
        let server = ServerRef::new();
        backend.fail(BackendOp::Upload, "/b.txt", "quota exceeded");

        let result = backend
            .upload_multiple_files(
                server,
                "/",
                vec![upload(0, "a.txt", "a"), upload(1, "b.txt", "b")],
                &no_progress(),
            )
            .await
            .unwrap();

        assert_eq!(result.successful, vec!["a.txt".to_string()]);
        assert_eq!(result.failed[0].error, "quota exceeded");
    }

    #[tokio::test]
    async fn test_rename_moves_subtree() {
        let backend = MemoryBackend::new();
        let server = ServerRef::new();
        backend.insert_file(server, "/world/level.dat", "lvl").await;

        backend.rename_file(server, "/world", "/world_old").await.unwrap();

        assert!(backend.exists(server, "/world_old/level.dat").await);
        assert!(!backend.exists(server, "/world").await);
    }

    #[tokio::test]
    async fn test_restore_snapshots_current_content() {
        let backend = MemoryBackend::new();
        let server = ServerRef::new();
        backend.insert_file(server, "/ops.json", "v1").await;
        backend
            .write_file(server, "/ops.json", WriteFileRequest::editor_save("v2", None))
            .await
            .unwrap();

        backend
            .restore_file_from_version(
                server,
                "/ops.json",
                1,
                RestoreRequest {
                    create_backup_before_restore: true,
                    description: Some("undo".into()),
                    editor: None,
                },
            )
            .await
            .unwrap();

        let history = backend.get_file_history(server, "/ops.json").await.unwrap();
        let numbers: Vec<_> = history.iter().map(|v| v.version_number).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert_eq!(history[1].description.as_deref(), Some("undo"));
        assert_eq!(
            backend.file_bytes(server, "/ops.json").await.unwrap(),
            Bytes::from("v1")
        );
    }

    #[tokio::test]
    async fn test_injected_failure_counts_call() {
        let backend = MemoryBackend::new();
        let server = ServerRef::new();
        backend.fail(BackendOp::List, "/", "backend offline");

        let err = backend.list_directory(server, "/").await.unwrap_err();
        assert_eq!(err.message, "backend offline");
        assert_eq!(backend.call_count(BackendOp::List), 1);
    }
}
