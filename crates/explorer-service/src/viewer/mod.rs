//! The file viewer/editor and its version history pane.

pub mod coordinator;
pub mod history;

pub use coordinator::ViewerCoordinator;
pub use history::VersionHistory;
