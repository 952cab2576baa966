//! Current directory and its listing.

use serde::{Deserialize, Serialize};

use explorer_core::types::{FileSystemItem, path};

/// What the explorer is currently showing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationState {
    /// Directory being browsed; root is `/`.
    pub current_path: String,
    /// Listing of `current_path`, replaced wholesale on every fetch.
    pub items: Vec<FileSystemItem>,
    /// Whether a listing fetch is outstanding.
    pub is_loading: bool,
    /// Message of the last failed fetch.
    pub last_error: Option<String>,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self {
            current_path: path::ROOT.to_string(),
            items: Vec::new(),
            is_loading: false,
            last_error: None,
        }
    }
}

impl NavigationState {
    /// Finds a listed entry by name.
    pub fn find(&self, name: &str) -> Option<&FileSystemItem> {
        self.items.iter().find(|item| item.name == name)
    }
}
