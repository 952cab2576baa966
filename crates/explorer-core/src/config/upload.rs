//! Upload security policy configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Limits applied by the security filter to one upload batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityPolicy {
    /// Largest single file accepted.
    pub max_file_size_bytes: u64,
    /// Largest cumulative size of accepted files.
    pub max_total_size_bytes: u64,
    /// Largest number of accepted files.
    pub max_file_count: usize,
    /// Whether executables and foreign scripts are rejected.
    pub block_dangerous_extensions: bool,
}

impl SecurityPolicy {
    /// Policy for everyday uploads into a server directory.
    pub fn general() -> Self {
        Self {
            max_file_size_bytes: 100 * 1024 * 1024,
            max_total_size_bytes: 500 * 1024 * 1024,
            max_file_count: 100,
            block_dangerous_extensions: true,
        }
    }

    /// Policy for world and server-file uploads (region files, plugin jars).
    pub fn server_files() -> Self {
        Self {
            max_file_size_bytes: 1024 * 1024 * 1024,
            max_total_size_bytes: 5 * 1024 * 1024 * 1024,
            max_file_count: 10_000,
            block_dangerous_extensions: true,
        }
    }
}

/// The two upload contexts, each with its own policy values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadProfile {
    /// Regular files.
    General,
    /// World folders and server files.
    ServerFiles,
}

impl fmt::Display for UploadProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::General => write!(f, "general"),
            Self::ServerFiles => write!(f, "server"),
        }
    }
}

impl FromStr for UploadProfile {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "general" => Ok(Self::General),
            "server" | "server_files" | "world" => Ok(Self::ServerFiles),
            _ => Err(AppError::validation(format!(
                "Invalid upload profile: '{s}'. Expected one of: general, server"
            ))),
        }
    }
}

/// Both upload profiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Policy for general uploads.
    #[serde(default = "SecurityPolicy::general")]
    pub general: SecurityPolicy,
    /// Policy for server-file uploads.
    #[serde(default = "SecurityPolicy::server_files")]
    pub server_files: SecurityPolicy,
}

impl UploadConfig {
    /// Returns the policy for the given profile.
    pub fn policy(&self, profile: UploadProfile) -> &SecurityPolicy {
        match profile {
            UploadProfile::General => &self.general,
            UploadProfile::ServerFiles => &self.server_files,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            general: SecurityPolicy::general(),
            server_files: SecurityPolicy::server_files(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_differ_only_in_limits() {
        let general = SecurityPolicy::general();
        let server = SecurityPolicy::server_files();
        assert!(server.max_file_size_bytes > general.max_file_size_bytes);
        assert!(server.max_file_count > general.max_file_count);
        assert_eq!(
            server.block_dangerous_extensions,
            general.block_dangerous_extensions
        );
    }

    #[test]
    fn test_profile_from_str() {
        assert_eq!(
            "world".parse::<UploadProfile>().unwrap(),
            UploadProfile::ServerFiles
        );
        assert_eq!(
            "GENERAL".parse::<UploadProfile>().unwrap(),
            UploadProfile::General
        );
        assert!("backup".parse::<UploadProfile>().is_err());
    }
}
