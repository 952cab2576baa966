//! # explorer-core
//!
//! Core crate for the game-server file explorer. Contains the storage
//! backend contract, configuration schemas, typed identifiers, path helpers,
//! domain events, and the unified error system.
//!
//! This crate has **no** internal dependencies on other explorer crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
