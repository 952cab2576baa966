//! Listing, previewing, and downloading.

use serde::Serialize;
use tabled::Tabled;

use explorer_core::error::AppError;
use explorer_core::types::FileSystemItem;
use explorer_entity::ViewerContent;
use explorer_service::FileExplorer;

use super::{locate, report};
use crate::output::{self, OutputFormat};

/// Directory entry display row
#[derive(Debug, Serialize, Tabled)]
struct EntryRow {
    /// Entry name
    name: String,
    /// "dir" or "file"
    kind: String,
    /// Size
    size: String,
    /// Last modified
    modified: String,
    /// rwx flags
    permissions: String,
}

impl From<&FileSystemItem> for EntryRow {
    fn from(item: &FileSystemItem) -> Self {
        let flag = |on: bool, c: char| if on { c } else { '-' };
        Self {
            name: item.name.clone(),
            kind: if item.is_directory { "dir" } else { "file" }.to_string(),
            size: item
                .size
                .map(output::human_size)
                .unwrap_or_else(|| "-".to_string()),
            modified: item.modified_at.format("%Y-%m-%d %H:%M").to_string(),
            permissions: [
                flag(item.permissions.read, 'r'),
                flag(item.permissions.write, 'w'),
                flag(item.permissions.execute, 'x'),
            ]
            .iter()
            .collect(),
        }
    }
}

/// `ls`: lists a directory, directories first.
pub async fn list(explorer: &mut FileExplorer, path: &str, format: OutputFormat) -> Result<(), AppError> {
    if !explorer.navigate_to(path).await {
        return report(explorer, format);
    }

    let rows: Vec<EntryRow> = explorer.navigation().items().iter().map(EntryRow::from).collect();
    output::print_list(&rows, format, "Directory is empty.");
    Ok(())
}

/// `cat`: prints a text file, or the preview URL and type of an image.
pub async fn cat(explorer: &mut FileExplorer, path: &str) -> Result<(), AppError> {
    let item = locate(explorer, path).await?;
    if item.is_directory {
        return Err(AppError::validation(format!("'{}' is a directory", item.name)));
    }

    if !explorer.open_viewer(&item).await {
        report(explorer, OutputFormat::Table)?;
        return Err(AppError::validation(format!(
            "'{}' cannot be previewed",
            item.name
        )));
    }

    if let Some(session) = explorer.viewer().session() {
        match &session.content {
            ViewerContent::Text(text) => print!("{}", text),
            ViewerContent::Image(url) => {
                output::print_kv("File", &session.file_path);
                output::print_kv("Kind", &format!("{:?}", session.kind));
                output::print_kv("Preview URL", url.as_str());
            }
            ViewerContent::Empty => {}
        }
    }
    explorer.close_viewer();
    Ok(())
}

/// `download`: saves a file through the blob host into `download_dir`.
pub async fn download(explorer: &mut FileExplorer, path: &str, download_dir: &str) -> Result<(), AppError> {
    let item = locate(explorer, path).await?;
    if item.is_directory {
        return Err(AppError::validation("Directories cannot be downloaded"));
    }

    if !explorer.download(&item).await {
        return report(explorer, OutputFormat::Table);
    }
    output::print_success(&format!("Saved '{}' to {}", item.name, download_dir));
    Ok(())
}
