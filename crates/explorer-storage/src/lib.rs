//! # explorer-storage
//!
//! Storage backends and blob hosts the explorer can be wired to:
//! an in-memory backend with failure injection (tests, demos), a local
//! directory backend (the CLI), and an in-memory blob host.

pub mod blob;
pub mod digest;
pub mod providers;

pub use blob::MemoryBlobHost;
#[cfg(feature = "local")]
pub use providers::local::LocalBackend;
pub use providers::memory::{BackendOp, MemoryBackend};
