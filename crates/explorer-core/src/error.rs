//! Unified error types for the file explorer.
//!
//! Backend adapters and coordinators map their failures into [`AppError`]
//! so that every operation reports through the same `?`-friendly channel.
//! The [`ErrorKind`] tells the orchestrator which class of failure it is
//! looking at and therefore how loudly to surface it.

use std::fmt;
use thiserror::Error;

/// Category of an explorer failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The requested file, directory, or version does not exist.
    NotFound,
    /// The caller passed invalid parameters (empty rename, save outside edit mode, ...).
    Validation,
    /// The current session is not allowed to perform the action.
    Authorization,
    /// The target already exists or was modified concurrently.
    Conflict,
    /// Fetching a directory listing failed.
    Listing,
    /// Every candidate file was rejected by the security filter.
    UploadBlocked,
    /// The upload request itself failed (network, backend crash).
    UploadProcess,
    /// The backend rejected a rename.
    Rename,
    /// The backend rejected a delete.
    Delete,
    /// Loading or saving file content for the viewer failed.
    Viewer,
    /// A version-history request failed.
    VersionHistory,
    /// A storage I/O error occurred inside a backend.
    Storage,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An unexpected internal error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Authorization => write!(f, "AUTHORIZATION"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::Listing => write!(f, "LISTING"),
            Self::UploadBlocked => write!(f, "UPLOAD_BLOCKED"),
            Self::UploadProcess => write!(f, "UPLOAD_PROCESS"),
            Self::Rename => write!(f, "RENAME"),
            Self::Delete => write!(f, "DELETE"),
            Self::Viewer => write!(f, "VIEWER"),
            Self::VersionHistory => write!(f, "VERSION_HISTORY"),
            Self::Storage => write!(f, "STORAGE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified explorer error.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Re-tag an error with a different kind, keeping the message.
    ///
    /// Coordinators use this to turn a raw backend failure into the
    /// operation-specific kind the orchestrator reports on.
    pub fn reclassify(mut self, kind: ErrorKind) -> Self {
        self.kind = kind;
        self
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create an authorization error.
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authorization, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a rename error.
    pub fn rename(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Rename, message)
    }

    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        let kind = if err.kind() == std::io::ErrorKind::NotFound {
            ErrorKind::NotFound
        } else {
            ErrorKind::Storage
        };
        Self::with_source(kind, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
