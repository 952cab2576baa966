//! In-place file operations: rename and delete.

pub mod delete;
pub mod rename;

pub use delete::DeleteCoordinator;
pub use rename::RenameCoordinator;
