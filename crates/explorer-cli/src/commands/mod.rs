//! CLI command definitions and dispatch.

pub mod browse;
pub mod history;
pub mod manage;
pub mod upload;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use explorer_core::config::AppConfig;
use explorer_core::error::{AppError, ErrorKind};
use explorer_core::traits::StorageBackend;
use explorer_core::types::{FileSystemItem, ServerRef, path};
use explorer_entity::{SessionContext, UserRole};
use explorer_service::{ExplorerContext, FileExplorer, NoticeSeverity};
use explorer_storage::{LocalBackend, MemoryBackend, MemoryBlobHost};

use crate::output::{self, OutputFormat};

/// Game server file explorer
#[derive(Debug, Parser)]
#[command(name = "explorer", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Environment overlay (`config/{env}.toml`)
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Acting username, recorded as editor on saves and restores
    #[arg(short, long, default_value = "console")]
    pub user: String,

    /// Acting role: admin, operator, or viewer
    #[arg(short, long, default_value = "operator")]
    pub role: String,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List a directory
    Ls {
        /// Directory path
        #[arg(default_value = "/")]
        path: String,
    },
    /// Print a text file, or describe an image
    Cat {
        /// File path
        path: String,
    },
    /// Save a file into the configured download directory
    Download {
        /// File path
        path: String,
    },
    /// Upload local files or folders
    Upload(upload::UploadArgs),
    /// Delete one or more entries of the same directory
    Rm {
        /// Entry paths
        #[arg(required = true)]
        paths: Vec<String>,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Rename an entry within its directory
    Mv {
        /// Entry path
        path: String,
        /// New name
        name: String,
    },
    /// Replace a text file's content, keeping a backup version
    Edit(manage::EditArgs),
    /// Version history of a text file
    History(history::HistoryArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        let mut explorer = open_explorer(config, &self.user, &self.role).await?;
        let format = self.format;

        let result = match &self.command {
            Commands::Ls { path } => browse::list(&mut explorer, path, format).await,
            Commands::Cat { path } => browse::cat(&mut explorer, path).await,
            Commands::Download { path } => {
                browse::download(&mut explorer, path, &config.storage.download_dir).await
            }
            Commands::Upload(args) => upload::execute(&mut explorer, args, format).await,
            Commands::Rm { paths, yes } => manage::remove(&mut explorer, paths, *yes).await,
            Commands::Mv { path, name } => manage::rename(&mut explorer, path, name).await,
            Commands::Edit(args) => manage::edit(&mut explorer, args).await,
            Commands::History(args) => history::execute(&mut explorer, args, format).await,
        };

        explorer.teardown();
        result
    }
}

/// Builds an explorer over the configured backend for the acting user.
pub async fn open_explorer(
    config: &AppConfig,
    user: &str,
    role: &str,
) -> Result<FileExplorer, AppError> {
    let role: UserRole = role.parse()?;

    let backend: Arc<dyn StorageBackend> = match config.storage.provider.as_str() {
        "local" => Arc::new(LocalBackend::from_config(&config.storage).await?),
        "memory" => Arc::new(MemoryBackend::new()),
        other => {
            return Err(AppError::configuration(format!(
                "Unsupported storage provider: '{}'",
                other
            )));
        }
    };
    let blobs = Arc::new(MemoryBlobHost::with_download_dir(
        &config.storage.download_dir,
    ));

    let server = match &config.storage.server_id {
        Some(id) => id.parse::<ServerRef>().map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Invalid server_id: '{}'", id),
                e,
            )
        })?,
        None => ServerRef::new(),
    };

    tracing::debug!(
        provider = backend.backend_type(),
        server = %server,
        user,
        role = %role,
        "Explorer ready"
    );

    let ctx = ExplorerContext::new(backend, blobs, server, SessionContext::new(user, role));
    Ok(FileExplorer::new(ctx, config.upload.clone()))
}

/// Navigates to the parent of `target` and returns its listed entry.
pub async fn locate(explorer: &mut FileExplorer, target: &str) -> Result<FileSystemItem, AppError> {
    let target = path::normalize(target);
    if target == path::ROOT {
        return Err(AppError::validation("The root directory cannot be targeted"));
    }

    if !explorer.navigate_to(&path::parent(&target)).await {
        return Err(take_failure(explorer));
    }
    explorer
        .navigation()
        .state()
        .find(path::file_name(&target))
        .cloned()
        .ok_or_else(|| AppError::not_found(format!("'{}' does not exist", target)))
}

/// Prints the notices raised so far.
///
/// Returns the first failure notice as an error so the process exits
/// non-zero; its detail lines are printed before returning.
pub fn report(explorer: &FileExplorer, format: OutputFormat) -> Result<(), AppError> {
    let mut failure = None;
    for notice in explorer.notices().list() {
        let is_failure = matches!(
            notice.severity,
            NoticeSeverity::Error | NoticeSeverity::Blocking
        );
        if is_failure && failure.is_none() {
            for detail in &notice.details {
                println!("    - {}", detail);
            }
            failure = Some(AppError::new(
                notice.kind.unwrap_or(ErrorKind::Internal),
                notice.message.clone(),
            ));
            continue;
        }
        output::print_notice(notice, format);
    }

    match failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Turns the newest failure notice into an error.
fn take_failure(explorer: &FileExplorer) -> AppError {
    explorer
        .notices()
        .list()
        .iter()
        .rev()
        .find(|n| matches!(n.severity, NoticeSeverity::Error | NoticeSeverity::Blocking))
        .map(|n| AppError::new(n.kind.unwrap_or(ErrorKind::Internal), n.message.clone()))
        .unwrap_or_else(|| AppError::internal("Operation failed without a reported cause"))
}

#[cfg(test)]
pub(crate) mod testing {
    use explorer_core::config::AppConfig;
    use tempfile::TempDir;

    /// Configuration over a fresh local server directory.
    pub fn config() -> (TempDir, AppConfig) {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.storage.root_path = dir.path().join("server").to_string_lossy().into_owned();
        config.storage.download_dir = dir.path().join("downloads").to_string_lossy().into_owned();
        std::fs::create_dir_all(dir.path().join("server")).unwrap();
        (dir, config)
    }
}
