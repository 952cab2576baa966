//! Extension-based classification of files for the viewer.

use serde::{Deserialize, Serialize};

use explorer_core::types::path;

/// Extensions shown as images.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp", "svg"];

/// Extensions opened as editable text.
pub const TEXT_EXTENSIONS: &[&str] = &[
    "txt",
    "properties",
    "yml",
    "yaml",
    "json",
    "log",
    "sh",
    "bat",
    "cfg",
    "conf",
    "xml",
    "html",
    "css",
    "js",
    "ts",
    "md",
    "ini",
    "toml",
    "env",
];

/// What the viewer can do with a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// Displayed through an object URL.
    Image,
    /// Displayed and edited as text.
    Text,
    /// Has an extension, but not a viewable one.
    Binary,
    /// No extension at all.
    Unknown,
}

impl FileKind {
    /// Classifies a file by the extension of its name. Size plays no part.
    pub fn classify(name: &str) -> Self {
        match path::extension(name) {
            None => Self::Unknown,
            Some(ext) if IMAGE_EXTENSIONS.contains(&ext.as_str()) => Self::Image,
            Some(ext) if TEXT_EXTENSIONS.contains(&ext.as_str()) => Self::Text,
            Some(_) => Self::Binary,
        }
    }

    /// Whether the viewer can open this kind.
    pub fn is_viewable(self) -> bool {
        matches!(self, Self::Image | Self::Text)
    }
}

/// Returns whether `name` is shown as an image.
pub fn is_image(name: &str) -> bool {
    FileKind::classify(name) == FileKind::Image
}

/// Returns whether `name` is opened as text.
pub fn is_text(name: &str) -> bool {
    FileKind::classify(name) == FileKind::Text
}

/// Returns whether the viewer can open `name`.
pub fn is_viewable(name: &str) -> bool {
    FileKind::classify(name).is_viewable()
}

/// MIME type used when exposing file bytes through an object URL.
pub fn mime_type(name: &str) -> String {
    mime_guess::from_path(name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}
