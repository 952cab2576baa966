//! Core traits defined in `explorer-core` and implemented by other crates.

pub mod backend;
pub mod blob;

pub use backend::StorageBackend;
pub use blob::{BlobHost, ObjectUrl};
