//! Local directory storage backend.
//!
//! Serves one directory tree as a server's files. Version history lives in a
//! sidecar directory under the root (hidden from listings): one folder per
//! tracked file holding an `index.json` and one `v{n}.snap` per version.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, warn};

use explorer_core::config::StorageConfig;
use explorer_core::error::{AppError, ErrorKind};
use explorer_core::result::AppResult;
use explorer_core::traits::StorageBackend;
use explorer_core::types::{
    BatchUploadResult, FailedFile, FileSystemItem, FileVersionRecord, Permissions,
    ProgressCallback, RestoreRequest, ServerRef, TextContent, UploadFile, UploadProgressEvent,
    VersionId, WriteFileRequest, path,
};

use crate::digest::content_hash;

/// Persisted version index of one file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryIndex {
    path: String,
    last_number: u32,
    versions: Vec<FileVersionRecord>,
}

/// Local filesystem [`StorageBackend`].
///
/// The server reference is not used to select a tree: one backend serves
/// exactly one server root.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    /// Directory served as `/`.
    root: PathBuf,
    /// Name of the history sidecar directory under `root`.
    history_dir: String,
}

impl LocalBackend {
    /// Create a backend rooted at `root_path`, creating the directory if needed.
    pub async fn new(root_path: &str, history_dir: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self {
            root,
            history_dir: history_dir.to_string(),
        })
    }

    /// Create a backend from the storage configuration section.
    pub async fn from_config(config: &StorageConfig) -> AppResult<Self> {
        Self::new(&config.root_path, &config.history_dir).await
    }

    /// Resolve an explorer path to a location under the root.
    ///
    /// `..` segments are resolved before joining, so the result never
    /// escapes the root. The history sidecar is not addressable.
    fn resolve(&self, explorer_path: &str) -> AppResult<(String, PathBuf)> {
        let normalized = path::normalize(explorer_path);
        let first = normalized.trim_start_matches('/').split('/').next();
        if first == Some(self.history_dir.as_str()) {
            return Err(AppError::validation(format!(
                "Path is reserved: {normalized}"
            )));
        }
        let full = self.root.join(normalized.trim_start_matches('/'));
        Ok((normalized, full))
    }

    fn history_root(&self) -> PathBuf {
        self.root.join(&self.history_dir)
    }

    fn history_folder(&self, explorer_path: &str) -> PathBuf {
        self.history_root().join(content_hash(explorer_path.as_bytes()))
    }

    async fn load_index(&self, explorer_path: &str) -> AppResult<Option<HistoryIndex>> {
        let index_path = self.history_folder(explorer_path).join("index.json");
        match fs::read(&index_path).await {
            Ok(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to read history index for {explorer_path}"),
                e,
            )),
        }
    }

    async fn save_index(&self, index: &HistoryIndex) -> AppResult<()> {
        let folder = self.history_folder(&index.path);
        fs::create_dir_all(&folder).await?;
        fs::write(folder.join("index.json"), serde_json::to_vec_pretty(index)?).await?;
        Ok(())
    }

    /// Append a snapshot of `data` to the history of `explorer_path`.
    async fn snapshot(
        &self,
        explorer_path: &str,
        data: Bytes,
        editor: Option<String>,
        description: Option<String>,
    ) -> AppResult<u32> {
        let mut index = self
            .load_index(explorer_path)
            .await?
            .unwrap_or_else(|| HistoryIndex {
                path: explorer_path.to_string(),
                ..HistoryIndex::default()
            });

        index.last_number += 1;
        let number = index.last_number;
        let folder = self.history_folder(explorer_path);
        fs::create_dir_all(&folder).await?;
        fs::write(folder.join(format!("v{number}.snap")), &data).await?;

        index.versions.push(FileVersionRecord {
            id: VersionId::new(),
            version_number: number,
            created_at: Utc::now(),
            editor_username: editor,
            file_size_bytes: data.len() as u64,
            description,
            content_hash: content_hash(&data),
        });
        self.save_index(&index).await?;

        debug!(path = explorer_path, version = number, "Recorded file version");
        Ok(number)
    }

    async fn read_version(&self, explorer_path: &str, version: u32) -> AppResult<Bytes> {
        let index = self
            .load_index(explorer_path)
            .await?
            .ok_or_else(|| AppError::not_found(format!("No history for {explorer_path}")))?;
        if !index.versions.iter().any(|v| v.version_number == version) {
            return Err(AppError::not_found(format!("Version {version} not found")));
        }
        let snap = self
            .history_folder(explorer_path)
            .join(format!("v{version}.snap"));
        Ok(Bytes::from(fs::read(&snap).await?))
    }

    /// All history indexes whose path is `root` or lies below it.
    async fn indexes_under(&self, root: &str) -> AppResult<Vec<HistoryIndex>> {
        let history_root = self.history_root();
        if !fs::try_exists(&history_root).await.unwrap_or(false) {
            return Ok(Vec::new());
        }

        let prefix = format!("{}/", root.trim_end_matches('/'));
        let mut found = Vec::new();
        let mut dir = fs::read_dir(&history_root).await?;
        while let Some(entry) = dir.next_entry().await? {
            let raw = match fs::read(entry.path().join("index.json")).await {
                Ok(raw) => raw,
                Err(_) => continue,
            };
            match serde_json::from_slice::<HistoryIndex>(&raw) {
                Ok(index) if index.path == root || index.path.starts_with(&prefix) => {
                    found.push(index)
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "Skipping unreadable history index"),
            }
        }
        Ok(found)
    }

    async fn relocate_history(&self, old: &str, new: &str) -> AppResult<()> {
        for mut index in self.indexes_under(old).await? {
            let from = self.history_folder(&index.path);
            index.path = format!("{new}{}", &index.path[old.len()..]);
            let to = self.history_folder(&index.path);
            fs::rename(&from, &to).await?;
            self.save_index(&index).await?;
        }
        Ok(())
    }

    async fn drop_history(&self, root: &str) -> AppResult<()> {
        for index in self.indexes_under(root).await? {
            fs::remove_dir_all(self.history_folder(&index.path)).await?;
        }
        Ok(())
    }

    async fn read_file(&self, explorer_path: &str) -> AppResult<Bytes> {
        let (normalized, full) = self.resolve(explorer_path)?;
        if fs::metadata(&full).await.is_ok_and(|m| m.is_dir()) {
            return Err(AppError::validation(format!(
                "Path is a directory: {normalized}"
            )));
        }
        let data = fs::read(&full).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("File not found: {normalized}"))
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to read file: {normalized}"),
                    e,
                )
            }
        })?;
        Ok(Bytes::from(data))
    }

    async fn store_file(&self, full: &Path, data: &[u8]) -> AppResult<()> {
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        fs::write(full, data).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write file: {}", full.display()),
                e,
            )
        })
    }

    async fn store_batch(
        &self,
        dest_path: &str,
        files: Vec<UploadFile>,
        on_progress: ProgressCallback<'_>,
        keep_structure: bool,
    ) -> AppResult<BatchUploadResult> {
        let (dest, dest_full) = self.resolve(dest_path)?;
        if !fs::metadata(&dest_full).await.is_ok_and(|m| m.is_dir()) {
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

            let stored = match self.resolve(&path::join(&dest, relative)) {
                Ok((_, full)) => self.store_file(&full, &file.data).await,
                Err(e) => Err(e),
            };
            match stored {
                Ok(()) => {
                    on_progress(UploadProgressEvent {
                        key: file.key,
                        loaded: total,
                        total,
                    });
                    result.successful.push(file.relative_path);
                }
                Err(e) => result.failed.push(FailedFile {
                    file: file.relative_path,
                    error: e.message,
                }),
            }
        }

        debug!(
            dest = %dest,
            stored = result.successful.len(),
            failed = result.failed.len(),
            "Stored upload batch"
        );
        Ok(result)
    }
}

fn permissions_of(meta: &std::fs::Metadata) -> Permissions {
    Permissions {
        read: true,
        write: !meta.permissions().readonly(),
        execute: meta.is_dir(),
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn backend_type(&self) -> &str {
        "local"
    }

    async fn list_directory(
        &self,
        _server: ServerRef,
        dir_path: &str,
    ) -> AppResult<Vec<FileSystemItem>> {
        let (dir_path, full) = self.resolve(dir_path)?;
        let mut dir = fs::read_dir(&full).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                AppError::not_found(format!("Directory not found: {dir_path}"))
            }
            _ => AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to list directory: {dir_path}"),
                e,
            ),
        })?;

        let mut items = Vec::new();
        while let Some(entry) = dir.next_entry().await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to read directory entry", e)
        })? {
            let name = entry.file_name().to_string_lossy().to_string();
            if dir_path == path::ROOT && name == self.history_dir {
                continue;
            }
            let meta = entry.metadata().await.map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to get entry metadata", e)
            })?;

            let modified_at = meta
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());
            let entry_path = path::join(&dir_path, &name);
            let mut item = if meta.is_dir() {
                FileSystemItem::directory(entry_path, modified_at)
            } else {
                FileSystemItem::file(entry_path, meta.len(), modified_at)
            };
            item.permissions = permissions_of(&meta);
            items.push(item);
        }

        items.sort_by(|a, b| {
            b.is_directory
                .cmp(&a.is_directory)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(items)
    }

    async fn read_text_file(&self, _server: ServerRef, file_path: &str) -> AppResult<TextContent> {
        let data = self.read_file(file_path).await?;
        let content = String::from_utf8(data.to_vec())
            .map_err(|_| AppError::validation(format!("File is not valid UTF-8: {file_path}")))?;
        Ok(TextContent { content })
    }

    async fn download_file(&self, _server: ServerRef, file_path: &str) -> AppResult<Bytes> {
        self.read_file(file_path).await
    }

    async fn write_file(
        &self,
        _server: ServerRef,
        file_path: &str,
        request: WriteFileRequest,
    ) -> AppResult<()> {
        let (normalized, full) = self.resolve(file_path)?;
        if request.create_backup {
            match self.read_file(&normalized).await {
                Ok(current) => {
                    self.snapshot(&normalized, current, request.editor.clone(), None)
                        .await?;
                }
                Err(e) if e.kind == ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }

        self.store_file(&full, request.content.as_bytes()).await?;
        debug!(path = %normalized, bytes = request.content.len(), "Wrote file");
        Ok(())
    }

    async fn rename_file(&self, _server: ServerRef, old_path: &str, new_path: &str) -> AppResult<()> {
        let (old, old_full) = self.resolve(old_path)?;
        let (new, new_full) = self.resolve(new_path)?;
        if old == path::ROOT {
            return Err(AppError::validation("Cannot rename the server root"));
        }
        if !fs::try_exists(&old_full).await.unwrap_or(false) {
            return Err(AppError::not_found(format!("Path not found: {old}")));
        }
        if fs::try_exists(&new_full).await.unwrap_or(false) {
            return Err(AppError::conflict(format!("Target already exists: {new}")));
        }

        fs::rename(&old_full, &new_full).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to rename {old} -> {new}"),
                e,
            )
        })?;
        self.relocate_history(&old, &new).await?;

        debug!(from = %old, to = %new, "Renamed entry");
        Ok(())
    }

    async fn delete_file(&self, _server: ServerRef, file_path: &str) -> AppResult<()> {
        let (target, full) = self.resolve(file_path)?;
        if target == path::ROOT {
            return Err(AppError::validation("Refusing to delete the server root"));
        }
        let meta = fs::metadata(&full).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AppError::not_found(format!("Path not found: {target}")),
            _ => AppError::with_source(ErrorKind::Storage, format!("Failed to stat {target}"), e),
        })?;

        let removed = if meta.is_dir() {
            fs::remove_dir_all(&full).await
        } else {
            fs::remove_file(&full).await
        };
        removed.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, format!("Failed to delete {target}"), e)
        })?;
        self.drop_history(&target).await?;

        debug!(path = %target, "Deleted entry");
        Ok(())
    }

    async fn upload_multiple_files(
        &self,
        _server: ServerRef,
        dest_path: &str,
        files: Vec<UploadFile>,
        on_progress: ProgressCallback<'_>,
    ) -> AppResult<BatchUploadResult> {
        self.store_batch(dest_path, files, on_progress, false).await
    }

    async fn upload_folder_structure(
        &self,
        _server: ServerRef,
        dest_path: &str,
        files: Vec<UploadFile>,
        on_progress: ProgressCallback<'_>,
    ) -> AppResult<BatchUploadResult> {
        self.store_batch(dest_path, files, on_progress, true).await
    }

    async fn get_file_history(
        &self,
        _server: ServerRef,
        file_path: &str,
    ) -> AppResult<Vec<FileVersionRecord>> {
        let (normalized, _) = self.resolve(file_path)?;
        self.read_file(&normalized).await?;
        Ok(self
            .load_index(&normalized)
            .await?
            .map(|index| index.versions)
            .unwrap_or_default())
    }

    async fn get_file_version_content(
        &self,
        _server: ServerRef,
        file_path: &str,
        version: u32,
    ) -> AppResult<TextContent> {
        let (normalized, _) = self.resolve(file_path)?;
        let data = self.read_version(&normalized, version).await?;
        let content = String::from_utf8(data.to_vec())
            .map_err(|_| AppError::validation("Version content is not valid UTF-8"))?;
        Ok(TextContent { content })
    }

    async fn restore_file_from_version(
        &self,
        _server: ServerRef,
        file_path: &str,
        version: u32,
        request: RestoreRequest,
    ) -> AppResult<()> {
        let (normalized, full) = self.resolve(file_path)?;
        let current = self.read_file(&normalized).await?;
        let restored = self.read_version(&normalized, version).await?;

        if request.create_backup_before_restore {
            self.snapshot(&normalized, current, request.editor, request.description)
                .await?;
        }
        self.store_file(&full, &restored).await?;

        debug!(path = %normalized, version, "Restored file from version");
        Ok(())
    }

    async fn delete_file_version(
        &self,
        _server: ServerRef,
        file_path: &str,
        version: u32,
    ) -> AppResult<()> {
        let (normalized, _) = self.resolve(file_path)?;
        let mut index = self
            .load_index(&normalized)
            .await?
            .ok_or_else(|| AppError::not_found(format!("No history for {normalized}")))?;

        let before = index.versions.len();
        index.versions.retain(|v| v.version_number != version);
        if index.versions.len() == before {
            return Err(AppError::not_found(format!("Version {version} not found")));
        }

        let snap = self
            .history_folder(&normalized)
            .join(format!("v{version}.snap"));
        if let Err(e) = fs::remove_file(&snap).await {
            warn!(path = %normalized, version, error = %e, "Version snapshot already missing");
        }
        self.save_index(&index).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use explorer_core::types::UploadKey;

    async fn backend() -> (tempfile::TempDir, LocalBackend) {
        let dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new(dir.path().to_str().unwrap(), ".explorer-history")
            .await
            .unwrap();
        (dir, backend)
    }

    #[tokio::test]
    async fn test_write_read_delete() {
        let (_dir, backend) = backend().await;
        let server = ServerRef::new();

        backend
            .write_file(server, "/config/a.yml", WriteFileRequest::editor_save("x: 1", None))
            .await
            .unwrap();
        let text = backend.read_text_file(server, "/config/a.yml").await.unwrap();
        assert_eq!(text.content, "x: 1");

        backend.delete_file(server, "/config").await.unwrap();
        let err = backend.read_text_file(server, "/config/a.yml").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_list_hides_history_and_sorts() {
        let (_dir, backend) = backend().await;
        let server = ServerRef::new();
        backend
            .write_file(server, "/b.txt", WriteFileRequest::editor_save("1", None))
            .await
            .unwrap();
        backend
            .write_file(server, "/b.txt", WriteFileRequest::editor_save("2", None))
            .await
            .unwrap();
        backend
            .write_file(server, "/world/level.dat", WriteFileRequest::editor_save("l", None))
            .await
            .unwrap();

        let items = backend.list_directory(server, "/").await.unwrap();
        let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["world", "b.txt"]);
    }

    #[tokio::test]
    async fn test_history_follows_rename_and_restore() {
        let (_dir, backend) = backend().await;
        let server = ServerRef::new();
        backend
            .write_file(server, "/ops.json", WriteFileRequest::editor_save("v1", None))
            .await
            .unwrap();
        backend
            .write_file(
                server,
                "/ops.json",
                WriteFileRequest::editor_save("v2", Some("alice".into())),
            )
            .await
            .unwrap();
        backend.rename_file(server, "/ops.json", "/admins.json").await.unwrap();

        let history = backend.get_file_history(server, "/admins.json").await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].editor_username.as_deref(), Some("alice"));

        backend
            .restore_file_from_version(
                server,
                "/admins.json",
                1,
                RestoreRequest {
                    create_backup_before_restore: true,
                    description: None,
                    editor: None,
                },
            )
            .await
            .unwrap();
        let text = backend.read_text_file(server, "/admins.json").await.unwrap();
        assert_eq!(text.content, "v1");
        let history = backend.get_file_history(server, "/admins.json").await.unwrap();
        assert_eq!(history.last().map(|v| v.version_number), Some(2));
    }

    #[tokio::test]
    async fn test_upload_cannot_escape_root() {
        let (dir, backend) = backend().await;
        let server = ServerRef::new();
        let files = vec![UploadFile {
            key: UploadKey(0),
            relative_path: "../../escape.txt".into(),
            data: Bytes::from("x"),
        }];

        let result = backend
            .upload_folder_structure(server, "/", files, &|_: UploadProgressEvent| {})
            .await
            .unwrap();

        assert_eq!(result.successful.len(), 1);
        assert!(dir.path().join("escape.txt").exists());
    }
}
