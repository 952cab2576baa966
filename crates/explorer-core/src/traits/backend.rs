//! Storage backend contract consumed by the explorer coordinators.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;
use crate::types::{
    BatchUploadResult, FileSystemItem, FileVersionRecord, ProgressCallback, RestoreRequest,
    ServerRef, TextContent, UploadFile, WriteFileRequest,
};

/// Request/response contract of the remote file storage.
///
/// Every call reports failure through its `AppResult`; implementations
/// never panic on a backend error. Paths are absolute explorer paths
/// (`/world/level.dat`).
#[async_trait]
pub trait StorageBackend: Send + Sync + std::fmt::Debug + 'static {
    /// Return the backend type name (e.g., `"local"`, `"memory"`).
    fn backend_type(&self) -> &str;

    /// List the entries of a directory.
    async fn list_directory(&self, server: ServerRef, path: &str)
    -> AppResult<Vec<FileSystemItem>>;

    /// Read a file as decoded text.
    async fn read_text_file(&self, server: ServerRef, path: &str) -> AppResult<TextContent>;

    /// Read a file's raw bytes.
    async fn download_file(&self, server: ServerRef, path: &str) -> AppResult<Bytes>;

    /// Overwrite a file's content.
    async fn write_file(
        &self,
        server: ServerRef,
        path: &str,
        request: WriteFileRequest,
    ) -> AppResult<()>;

    /// Rename or move an entry.
    async fn rename_file(&self, server: ServerRef, old_path: &str, new_path: &str)
    -> AppResult<()>;

    /// Delete a file or directory.
    async fn delete_file(&self, server: ServerRef, path: &str) -> AppResult<()>;

    /// Upload a flat batch of files into `dest_path`, using only their base names.
    async fn upload_multiple_files(
        &self,
        server: ServerRef,
        dest_path: &str,
        files: Vec<UploadFile>,
        on_progress: ProgressCallback<'_>,
    ) -> AppResult<BatchUploadResult>;

    /// Upload a batch preserving each file's relative directory structure.
    async fn upload_folder_structure(
        &self,
        server: ServerRef,
        dest_path: &str,
        files: Vec<UploadFile>,
        on_progress: ProgressCallback<'_>,
    ) -> AppResult<BatchUploadResult>;

    /// List the stored versions of a file.
    async fn get_file_history(
        &self,
        server: ServerRef,
        path: &str,
    ) -> AppResult<Vec<FileVersionRecord>>;

    /// Fetch the content of one version.
    async fn get_file_version_content(
        &self,
        server: ServerRef,
        path: &str,
        version: u32,
    ) -> AppResult<TextContent>;

    /// Replace the current content with a stored version.
    async fn restore_file_from_version(
        &self,
        server: ServerRef,
        path: &str,
        version: u32,
        request: RestoreRequest,
    ) -> AppResult<()>;

    /// Remove one stored version.
    async fn delete_file_version(&self, server: ServerRef, path: &str, version: u32)
    -> AppResult<()>;
}
