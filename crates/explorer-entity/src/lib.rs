//! # explorer-entity
//!
//! State models owned by the explorer coordinators: navigation state,
//! rename and delete bookkeeping, upload batches and progress, viewer
//! sessions, and the acting session's role.

pub mod file;
pub mod navigation;
pub mod session;
pub mod upload;
pub mod viewer;

pub use file::{DeleteFailure, DeleteOutcome, FileKind, RenameTransaction, RenamedPaths};
pub use navigation::NavigationState;
pub use session::{SessionContext, UserRole};
pub use viewer::{ViewerContent, ViewerSession, ViewerTab};
