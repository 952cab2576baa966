//! In-process blob host.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use explorer_core::error::{AppError, ErrorKind};
use explorer_core::result::AppResult;
use explorer_core::traits::{BlobHost, ObjectUrl};

/// [`BlobHost`] that keeps object URLs and downloads in memory.
///
/// When a download directory is configured, `save_as` also writes the file
/// there. Counters let callers check that every URL handed out was revoked.
#[derive(Debug, Default)]
pub struct MemoryBlobHost {
    /// Live object URLs with their bytes and MIME type.
    urls: DashMap<String, (Bytes, String)>,
    /// Files offered through `save_as`, by name.
    downloads: DashMap<String, Bytes>,
    /// Optional directory receiving `save_as` files.
    download_dir: Option<PathBuf>,
    /// Number of URLs revoked so far.
    revoked: AtomicUsize,
}

impl MemoryBlobHost {
    /// Creates a host that keeps downloads in memory only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a host that also writes downloads into `dir`.
    pub fn with_download_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            download_dir: Some(dir.into()),
            ..Self::default()
        }
    }

    /// Number of object URLs currently alive.
    pub fn live_urls(&self) -> usize {
        self.urls.len()
    }

    /// Number of object URLs revoked so far.
    pub fn revoked_count(&self) -> usize {
        self.revoked.load(Ordering::Relaxed)
    }

    /// MIME type a live URL was created with.
    pub fn mime_of(&self, url: &ObjectUrl) -> Option<String> {
        self.urls.get(url.as_str()).map(|entry| entry.1.clone())
    }

    /// Bytes of the last download saved under `file_name`.
    pub fn download(&self, file_name: &str) -> Option<Bytes> {
        self.downloads.get(file_name).map(|entry| entry.clone())
    }
}

impl BlobHost for MemoryBlobHost {
    fn create_object_url(&self, data: Bytes, mime_type: &str) -> ObjectUrl {
        let url = format!("blob:explorer/{}", Uuid::new_v4());
        self.urls
            .insert(url.clone(), (data, mime_type.to_string()));
        ObjectUrl::new(url)
    }

    fn revoke_object_url(&self, url: ObjectUrl) {
        if self.urls.remove(url.as_str()).is_some() {
            self.revoked.fetch_add(1, Ordering::Relaxed);
            debug!(url = url.as_str(), "Revoked object URL");
        }
    }

    fn save_as(&self, file_name: &str, data: Bytes) -> AppResult<()> {
        if let Some(dir) = &self.download_dir {
            std::fs::create_dir_all(dir)?;
            let target = dir.join(file_name);
            std::fs::write(&target, &data).map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to save download: {}", target.display()),
                    e,
                )
            })?;
        }
        self.downloads.insert(file_name.to_string(), data);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revoke_releases_url() {
        let host = MemoryBlobHost::new();
        let url = host.create_object_url(Bytes::from_static(b"png"), "image/png");
        assert_eq!(host.mime_of(&url).as_deref(), Some("image/png"));
        assert_eq!(host.live_urls(), 1);

        host.revoke_object_url(url);
        assert_eq!(host.live_urls(), 0);
        assert_eq!(host.revoked_count(), 1);
    }

    #[test]
    fn test_save_as_writes_to_download_dir() {
        let dir = tempfile::tempdir().unwrap();
        let host = MemoryBlobHost::with_download_dir(dir.path());

        host.save_as("latest.log", Bytes::from("boot")).unwrap();

        assert_eq!(std::fs::read(dir.path().join("latest.log")).unwrap(), b"boot");
        assert_eq!(host.download("latest.log"), Some(Bytes::from("boot")));
    }
}
