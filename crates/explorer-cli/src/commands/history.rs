//! Version history commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use explorer_core::error::AppError;
use explorer_core::types::FileVersionRecord;
use explorer_service::FileExplorer;

use super::{locate, report};
use crate::output::{self, OutputFormat};

/// Arguments for history commands
#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// History subcommand
    #[command(subcommand)]
    pub command: HistoryCommand,
}

/// History subcommands
#[derive(Debug, Subcommand)]
pub enum HistoryCommand {
    /// List stored versions
    List {
        /// File path
        path: String,
    },
    /// Print the content of one version
    Show {
        /// File path
        path: String,
        /// Version number
        version: u32,
    },
    /// Restore a version, snapshotting the current content first
    Restore {
        /// File path
        path: String,
        /// Version number
        version: u32,
        /// Description stored with the pre-restore snapshot
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete a stored version (admin only)
    Rm {
        /// File path
        path: String,
        /// Version number
        version: u32,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Version display row
#[derive(Debug, Serialize, Tabled)]
struct VersionRow {
    /// Version number
    version: u32,
    /// Created at
    created_at: String,
    /// Editor
    editor: String,
    /// Size
    size: String,
    /// Description
    description: String,
    /// Content hash prefix
    hash: String,
}

impl From<&FileVersionRecord> for VersionRow {
    fn from(v: &FileVersionRecord) -> Self {
        Self {
            version: v.version_number,
            created_at: v.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            editor: v.editor_username.clone().unwrap_or_else(|| "-".to_string()),
            size: output::human_size(v.file_size_bytes),
            description: v.description.clone().unwrap_or_default(),
            hash: v.content_hash.chars().take(12).collect(),
        }
    }
}

/// Execute history commands
pub async fn execute(
    explorer: &mut FileExplorer,
    args: &HistoryArgs,
    format: OutputFormat,
) -> Result<(), AppError> {
    let path = match &args.command {
        HistoryCommand::List { path }
        | HistoryCommand::Show { path, .. }
        | HistoryCommand::Restore { path, .. }
        | HistoryCommand::Rm { path, .. } => path,
    };
    open_history(explorer, path).await?;

    match &args.command {
        HistoryCommand::List { .. } => {
            let rows: Vec<VersionRow> = explorer
                .viewer()
                .history()
                .versions()
                .iter()
                .map(VersionRow::from)
                .collect();
            output::print_list(&rows, format, "No version history.");
            Ok(())
        }
        HistoryCommand::Show { version, .. } => {
            let history = explorer.viewer_mut().history_mut();
            history.select_version(*version).await?;
            print!("{}", history.selected_content().unwrap_or_default());
            Ok(())
        }
        HistoryCommand::Restore {
            version,
            description,
            ..
        } => {
            explorer
                .restore_version(*version, description.clone())
                .await;
            report(explorer, format)
        }
        HistoryCommand::Rm { path, version, yes } => {
            let prompt = format!("Delete version {} of {}?", version, path);
            if !yes && !super::manage::confirm(&prompt)? {
                println!("Cancelled.");
                return Ok(());
            }
            explorer.delete_version(*version).await;
            report(explorer, format)
        }
    }
}

/// Opens `path` in the viewer and loads its history tab.
async fn open_history(explorer: &mut FileExplorer, path: &str) -> Result<(), AppError> {
    let item = locate(explorer, path).await?;
    if !explorer.open_viewer(&item).await {
        report(explorer, OutputFormat::Table)?;
        return Err(AppError::validation(format!(
            "'{}' has no viewable history",
            item.name
        )));
    }
    if !explorer.show_history().await {
        report(explorer, OutputFormat::Table)?;
    }
    Ok(())
}
