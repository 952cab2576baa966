//! # explorer-service
//!
//! The file explorer's operation layer. Each coordinator owns one slice of
//! "what the user is doing in the file tree" and talks to the storage
//! backend through the [`ExplorerContext`] it was built with; the
//! [`FileExplorer`] orchestrator wires them into one interaction model.
//!
//! Coordinators never render anything. They return results, and the
//! orchestrator turns failures into notices.

pub mod context;
pub mod explorer;
pub mod file;
pub mod navigation;
pub mod upload;
pub mod viewer;

pub use context::ExplorerContext;
pub use explorer::{
    ContextMenu, DocumentClick, FileExplorer, Interaction, MenuAction, MenuScope, Notice,
    NoticeBoard, NoticeSeverity,
};
pub use file::{DeleteCoordinator, RenameCoordinator};
pub use navigation::{FetchTicket, PathModel, SelectionModel};
pub use upload::{SecurityFilter, UploadCoordinator};
pub use viewer::{VersionHistory, ViewerCoordinator};
