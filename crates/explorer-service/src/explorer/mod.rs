//! The orchestrator and the interaction surface around it.

pub mod menu;
pub mod notice;
pub mod orchestrator;

pub use menu::{ContextMenu, DocumentClick, MenuAction, MenuScope};
pub use notice::{Notice, NoticeBoard, NoticeSeverity};
pub use orchestrator::{FileExplorer, Interaction};
