//! Context menu model and document click subscription.

use tokio::sync::broadcast;

use explorer_core::types::FileSystemItem;
use explorer_entity::file::kind::is_viewable;

use crate::navigation::SelectionModel;

/// A click somewhere in the document, as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentClick {
    /// Whether the click landed inside the open context menu.
    pub inside_menu: bool,
}

/// Whether the menu acts on one entry or on the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuScope {
    /// Actions for the right-clicked entry.
    Single,
    /// Actions for every selected entry.
    Bulk {
        /// Selected names at the time the menu opened.
        names: Vec<String>,
    },
}

/// Actions offered by the context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Enter a directory or view a file.
    Open,
    /// Rename the entry.
    Rename,
    /// Delete the entry.
    Delete,
    /// Download the file.
    Download,
    /// Delete every selected entry.
    DeleteSelected,
    /// Clear the selection.
    ClearSelection,
}

/// An open context menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextMenu {
    /// The right-clicked entry.
    pub target: FileSystemItem,
    /// Single or bulk semantics.
    pub scope: MenuScope,
}

impl ContextMenu {
    /// Builds the menu for a right-click on `target`.
    ///
    /// Bulk when more than one entry is selected, or when the only selected
    /// entry is the target itself. Right-clicking outside the selection
    /// gives single-entry actions.
    pub fn for_target(target: FileSystemItem, selection: &SelectionModel) -> Self {
        let bulk = selection.len() > 1 || (selection.len() == 1 && selection.has(&target.name));
        let scope = if bulk {
            MenuScope::Bulk {
                names: selection.names().map(str::to_string).collect(),
            }
        } else {
            MenuScope::Single
        };
        Self { target, scope }
    }

    /// Whether bulk actions are shown.
    pub fn is_bulk(&self) -> bool {
        matches!(self.scope, MenuScope::Bulk { .. })
    }

    /// Actions to show, in display order.
    pub fn actions(&self) -> Vec<MenuAction> {
        if self.is_bulk() {
            return vec![MenuAction::DeleteSelected, MenuAction::ClearSelection];
        }

        let mut actions = Vec::new();
        if self.target.is_directory || is_viewable(&self.target.name) {
            actions.push(MenuAction::Open);
        }
        actions.push(MenuAction::Rename);
        if !self.target.is_directory {
            actions.push(MenuAction::Download);
        }
        actions.push(MenuAction::Delete);
        actions
    }
}

/// Subscription to document clicks, held only while a menu is open.
#[derive(Debug)]
pub(crate) struct ClickSubscription {
    rx: broadcast::Receiver<DocumentClick>,
}

impl ClickSubscription {
    pub(crate) fn acquire(clicks: &broadcast::Sender<DocumentClick>) -> Self {
        Self {
            rx: clicks.subscribe(),
        }
    }

    /// Drains pending clicks; true if any landed outside the menu.
    pub(crate) fn clicked_outside(&mut self) -> bool {
        let mut outside = false;
        loop {
            match self.rx.try_recv() {
                Ok(click) => outside |= !click.inside_menu,
                Err(broadcast::error::TryRecvError::Lagged(_)) => outside = true,
                Err(_) => break,
            }
        }
        outside
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn file(name: &str) -> FileSystemItem {
        FileSystemItem::file(format!("/{name}"), 1, Utc::now())
    }

    #[test]
    fn test_bulk_rules() {
        let mut selection = SelectionModel::new();
        assert!(!ContextMenu::for_target(file("a.txt"), &selection).is_bulk());

        selection.toggle("a.txt");
        assert!(ContextMenu::for_target(file("a.txt"), &selection).is_bulk());
        assert!(!ContextMenu::for_target(file("b.txt"), &selection).is_bulk());

        selection.toggle("c.txt");
        assert!(ContextMenu::for_target(file("b.txt"), &selection).is_bulk());
    }

    #[test]
    fn test_single_actions() {
        let selection = SelectionModel::new();
        let menu = ContextMenu::for_target(file("server.jar"), &selection);
        assert_eq!(
            menu.actions(),
            vec![MenuAction::Rename, MenuAction::Download, MenuAction::Delete]
        );
    }

    #[test]
    fn test_click_subscription() {
        let (tx, _) = broadcast::channel(8);
        let mut sub = ClickSubscription::acquire(&tx);
        tx.send(DocumentClick { inside_menu: true }).unwrap();
        assert!(!sub.clicked_outside());
        tx.send(DocumentClick { inside_menu: false }).unwrap();
        assert!(sub.clicked_outside());
        drop(sub);
        assert_eq!(tx.receiver_count(), 0);
    }
}
