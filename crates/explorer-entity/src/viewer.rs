//! The open file viewer/editor.

use serde::{Deserialize, Serialize};

use explorer_core::traits::ObjectUrl;
use explorer_core::types::FileSystemItem;

use crate::file::FileKind;

/// Which pane of the viewer is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewerTab {
    /// The file content.
    #[default]
    Content,
    /// The version history list.
    History,
}

/// Loaded content of a viewer session. Exactly one form is ever populated.
#[derive(Debug, PartialEq, Eq)]
pub enum ViewerContent {
    /// Still loading, or the load failed.
    Empty,
    /// An image exposed through an object URL.
    Image(ObjectUrl),
    /// Decoded text.
    Text(String),
}

impl ViewerContent {
    /// The object URL, for image sessions.
    pub fn image_url(&self) -> Option<&str> {
        match self {
            Self::Image(url) => Some(url.as_str()),
            _ => None,
        }
    }

    /// The text, for text sessions.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// One open file.
#[derive(Debug)]
pub struct ViewerSession {
    /// The entry being viewed.
    pub file: FileSystemItem,
    /// Full path, fixed when the file was opened.
    pub file_path: String,
    /// Image or text.
    pub kind: FileKind,
    /// Loaded content.
    pub content: ViewerContent,
    /// Whether content is being fetched.
    pub is_loading: bool,
    /// Whether the edit buffer is active.
    pub is_editing: bool,
    /// The edit buffer.
    pub edited_content: String,
    /// Whether a save is in flight.
    pub is_saving: bool,
    /// Visible pane.
    pub active_tab: ViewerTab,
    /// Last load or save failure.
    pub error: Option<String>,
}

impl ViewerSession {
    /// Starts a session in the loading state.
    pub fn loading(file: FileSystemItem, file_path: String, kind: FileKind) -> Self {
        Self {
            file,
            file_path,
            kind,
            content: ViewerContent::Empty,
            is_loading: true,
            is_editing: false,
            edited_content: String::new(),
            is_saving: false,
            active_tab: ViewerTab::Content,
            error: None,
        }
    }
}
