//! Shared types: identifiers, listing entries, versions, transfer payloads.

pub mod id;
pub mod item;
pub mod path;
pub mod transfer;
pub mod version;

pub use id::{ServerRef, UploadJobId, VersionId};
pub use item::{FileSystemItem, Permissions};
pub use transfer::{
    BatchUploadResult, FailedFile, ProgressCallback, RestoreRequest, TextContent, UploadFile,
    UploadKey, UploadProgressEvent, WriteFileRequest,
};
pub use version::FileVersionRecord;
