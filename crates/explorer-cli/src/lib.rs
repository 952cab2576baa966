//! # explorer-cli
//!
//! Drives a [`FileExplorer`](explorer_service::FileExplorer) against a local
//! server directory from the command line. Each invocation is one
//! interaction: navigate, act, print the notices the explorer raised.

pub mod commands;
pub mod output;

pub use commands::Cli;
