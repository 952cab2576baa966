//! Uploads: security filtering, folder reconstruction, and the coordinator.

pub mod coordinator;
pub mod filter;
pub mod folder;

pub use coordinator::UploadCoordinator;
pub use filter::{SecurityFilter, filter_files};
pub use folder::{flatten_dropped, is_folder_batch};
