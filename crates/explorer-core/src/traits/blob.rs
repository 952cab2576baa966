//! Host-side blob handling: object URLs for previews and save-as downloads.

use bytes::Bytes;

use crate::result::AppResult;

/// A revocable reference to in-memory bytes, usable as an image source.
///
/// Not `Clone`. [`BlobHost::revoke_object_url`] consumes it, so a URL is
/// revoked at most once.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct ObjectUrl(String);

impl ObjectUrl {
    /// Wraps a host-issued URL string.
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// The URL string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The environment the explorer runs in (a browser tab, a terminal, a test).
pub trait BlobHost: Send + Sync + std::fmt::Debug + 'static {
    /// Expose bytes under a fresh object URL.
    fn create_object_url(&self, data: Bytes, mime_type: &str) -> ObjectUrl;

    /// Release an object URL.
    fn revoke_object_url(&self, url: ObjectUrl);

    /// Offer bytes to the user as a downloaded file.
    fn save_as(&self, file_name: &str, data: Bytes) -> AppResult<()>;
}
