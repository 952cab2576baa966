//! Delete, rename, and edit.

use std::path::PathBuf;

use clap::Args;

use explorer_core::error::AppError;
use explorer_core::types::path;
use explorer_service::{FileExplorer, MenuAction};

use super::{locate, report};
use crate::output::OutputFormat;

/// Arguments for the edit command
#[derive(Debug, Args)]
pub struct EditArgs {
    /// File path
    pub path: String,

    /// Read the new content from a local file
    #[arg(long, conflicts_with = "content")]
    pub from_file: Option<PathBuf>,

    /// New content, inline
    #[arg(long)]
    pub content: Option<String>,
}

/// `rm`: deletes one entry, or several entries of one directory as a bulk
/// delete.
pub async fn remove(explorer: &mut FileExplorer, paths: &[String], yes: bool) -> Result<(), AppError> {
    let targets: Vec<String> = paths.iter().map(|p| path::normalize(p)).collect();
    let Some(first) = targets.first() else {
        return Err(AppError::validation("Nothing to delete"));
    };
    let directory = path::parent(first);
    if targets.iter().any(|t| path::parent(t) != directory) {
        return Err(AppError::validation(
            "All entries must be in the same directory",
        ));
    }

    let target = locate(explorer, first).await?;
    let mut names = Vec::with_capacity(targets.len());
    for t in &targets {
        let name = path::file_name(t);
        if explorer.navigation().state().find(name).is_none() {
            return Err(AppError::not_found(format!("'{}' does not exist", t)));
        }
        if !names.iter().any(|n: &String| n == name) {
            names.push(name.to_string());
        }
    }

    if !yes && !confirm(&format!("Delete {} from {}?", names.join(", "), directory))? {
        println!("Cancelled.");
        return Ok(());
    }

    if names.len() == 1 {
        explorer.open_context_menu(target);
        explorer.choose(MenuAction::Delete).await;
        explorer.confirm_delete().await;
        return report(explorer, OutputFormat::Table);
    }

    for name in &names {
        explorer.toggle_selection(name);
    }
    explorer.open_context_menu(target);
    explorer.choose(MenuAction::DeleteSelected).await;
    if let Some(outcome) = explorer.confirm_bulk_delete().await {
        tracing::debug!(
            deleted = outcome.success_count,
            failed = outcome.fail_count,
            "Bulk delete finished"
        );
    }
    report(explorer, OutputFormat::Table)
}

/// `mv`: renames an entry in place.
pub async fn rename(explorer: &mut FileExplorer, target: &str, name: &str) -> Result<(), AppError> {
    let item = locate(explorer, target).await?;

    explorer.open_context_menu(item);
    explorer.choose(MenuAction::Rename).await;
    explorer.set_rename_text(name);
    explorer.confirm_rename().await;
    report(explorer, OutputFormat::Table)
}

/// `edit`: replaces a text file's content through the viewer's editor.
pub async fn edit(explorer: &mut FileExplorer, args: &EditArgs) -> Result<(), AppError> {
    let content = match (&args.from_file, &args.content) {
        (Some(file), _) => tokio::fs::read_to_string(file).await.map_err(|e| {
            AppError::validation(format!("Failed to read {}: {}", file.display(), e))
        })?,
        (None, Some(content)) => content.clone(),
        (None, None) => {
            return Err(AppError::validation(
                "Provide the new content with --content or --from-file",
            ));
        }
    };

    let item = locate(explorer, &args.path).await?;
    if !explorer.open_viewer(&item).await {
        report(explorer, OutputFormat::Table)?;
        return Err(AppError::validation(format!("'{}' cannot be edited", item.name)));
    }

    let viewer = explorer.viewer_mut();
    viewer.start_edit()?;
    viewer.set_edited_content(content)?;
    explorer.save_viewer().await;
    report(explorer, OutputFormat::Table)
}

/// Asks for confirmation on the terminal.
pub fn confirm(prompt: &str) -> Result<bool, AppError> {
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| AppError::internal(format!("Input error: {}", e)))
}
