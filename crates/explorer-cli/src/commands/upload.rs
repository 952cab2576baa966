//! Upload CLI command.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use clap::Args;

use explorer_core::config::UploadProfile;
use explorer_core::error::{AppError, ErrorKind};
use explorer_entity::upload::{DroppedEntry, UploadResult};
use explorer_service::FileExplorer;

use super::report;
use crate::output::{self, OutputFormat};

/// Security policy profile selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ProfileArg {
    /// Regular files
    General,
    /// World folders and server files (larger limits)
    Server,
}

impl From<ProfileArg> for UploadProfile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::General => Self::General,
            ProfileArg::Server => Self::ServerFiles,
        }
    }
}

/// Arguments for the upload command
#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Local files or folders to upload
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Destination directory on the server
    #[arg(short, long, default_value = "/")]
    pub dest: String,

    /// Security policy profile
    #[arg(short, long, value_enum, default_value = "general")]
    pub profile: ProfileArg,
}

/// Execute the upload command
pub async fn execute(
    explorer: &mut FileExplorer,
    args: &UploadArgs,
    format: OutputFormat,
) -> Result<(), AppError> {
    let paths = args.paths.clone();
    let entries = tokio::task::spawn_blocking(move || read_entries(&paths))
        .await
        .map_err(|e| AppError::internal(format!("Reader task failed: {}", e)))??;

    if !explorer.navigate_to(&args.dest).await {
        return report(explorer, format);
    }
    explorer.set_upload_profile(args.profile.into());

    let mut progress = explorer.uploads().subscribe();
    let watcher = tokio::spawn(async move {
        let mut last = None;
        while progress.changed().await.is_ok() {
            let snapshot = progress.borrow_and_update().clone();
            if snapshot.items.is_empty() {
                continue;
            }
            let pct = snapshot.overall_percentage();
            if last != Some(pct) {
                eprintln!("  uploading... {}%", pct);
                last = Some(pct);
            }
        }
    });

    let result = explorer.upload_dropped(entries).await;
    watcher.abort();

    if let Some(UploadResult::Completed(done)) = &result {
        for path in &done.outcome.successful_paths {
            output::print_kv("Uploaded", path);
        }
    }
    explorer.dismiss_upload_progress();
    report(explorer, format)
}

/// Reads local paths into dropped entries, preserving folder structure.
pub fn read_entries(paths: &[PathBuf]) -> Result<Vec<DroppedEntry>, AppError> {
    paths.iter().map(|p| read_entry(p)).collect()
}

fn read_entry(path: &Path) -> Result<DroppedEntry, AppError> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| AppError::validation(format!("Unsupported path: {}", path.display())))?
        .to_string();

    let meta = std::fs::metadata(path).map_err(|e| {
        AppError::with_source(
            ErrorKind::NotFound,
            format!("Cannot read {}", path.display()),
            e,
        )
    })?;

    if meta.is_dir() {
        let mut children: Vec<PathBuf> = std::fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<_, _>>()?;
        children.sort();
        let children = children
            .iter()
            .map(|child| read_entry(child))
            .collect::<Result<_, _>>()?;
        Ok(DroppedEntry::Directory { name, children })
    } else {
        let data = std::fs::read(path)?;
        Ok(DroppedEntry::File {
            name,
            data: Bytes::from(data),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{open_explorer, testing};
    use explorer_service::NoticeSeverity;

    #[test]
    fn test_read_entries_keeps_structure() {
        let dir = tempfile::tempdir().unwrap();
        let world = dir.path().join("world");
        std::fs::create_dir_all(world.join("region")).unwrap();
        std::fs::write(world.join("level.dat"), "L").unwrap();
        std::fs::write(world.join("region/r.0.0.mca"), "R").unwrap();

        let entries = read_entries(&[world]).unwrap();
        let DroppedEntry::Directory { name, children } = &entries[0] else {
            panic!("expected a directory");
        };
        assert_eq!(name, "world");
        assert_eq!(children.len(), 2);
        assert!(matches!(&children[0], DroppedEntry::File { name, .. } if name == "level.dat"));
    }

    #[tokio::test]
    async fn test_upload_folder_with_server_profile() {
        let (dir, config) = testing::config();
        let world = dir.path().join("local/world");
        std::fs::create_dir_all(world.join("region")).unwrap();
        std::fs::write(world.join("level.dat"), "L").unwrap();
        std::fs::write(world.join("region/r.0.0.mca"), "R").unwrap();
        let mut explorer = open_explorer(&config, "steve", "operator").await.unwrap();

        let args = UploadArgs {
            paths: vec![world],
            dest: "/".into(),
            profile: ProfileArg::Server,
        };
        execute(&mut explorer, &args, OutputFormat::Table).await.unwrap();

        let stored = dir.path().join("server/world/region/r.0.0.mca");
        assert_eq!(std::fs::read_to_string(stored).unwrap(), "R");
        assert_eq!(
            explorer.notices().latest().map(|n| n.severity),
            Some(NoticeSeverity::Info)
        );
    }

    #[tokio::test]
    async fn test_blocked_upload_fails_command() {
        let (dir, config) = testing::config();
        let exe = dir.path().join("setup.exe");
        std::fs::write(&exe, "MZ").unwrap();
        let mut explorer = open_explorer(&config, "steve", "operator").await.unwrap();

        let args = UploadArgs {
            paths: vec![exe],
            dest: "/".into(),
            profile: ProfileArg::General,
        };
        let err = execute(&mut explorer, &args, OutputFormat::Table).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::UploadBlocked);
        assert!(!dir.path().join("server/setup.exe").exists());
    }
}
