//! Names selected in the current directory.

use std::collections::BTreeSet;

use explorer_core::types::FileSystemItem;

/// Set of selected entry names. Keyed by name, so consumers match against
/// the current listing and ignore names that no longer appear in it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionModel {
    names: BTreeSet<String>,
}

impl SelectionModel {
    /// An empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips membership of `name`.
    pub fn toggle(&mut self, name: &str) {
        if !self.names.remove(name) {
            self.names.insert(name.to_string());
        }
    }

    /// Replaces the selection with exactly the names of `items`.
    pub fn select_all(&mut self, items: &[FileSystemItem]) {
        self.names = items.iter().map(|item| item.name.clone()).collect();
    }

    /// Empties the selection.
    pub fn clear(&mut self) {
        self.names.clear();
    }

    /// Whether `name` is selected.
    pub fn has(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Deselects `name`.
    pub fn remove(&mut self, name: &str) -> bool {
        self.names.remove(name)
    }

    /// Number of selected names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Selected names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Entries of `items` whose name is selected, in listing order.
    pub fn selected_items<'a>(&self, items: &'a [FileSystemItem]) -> Vec<&'a FileSystemItem> {
        items.iter().filter(|item| self.has(&item.name)).collect()
    }
}

impl FromIterator<String> for SelectionModel {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}
