//! Integration tests for the security filter and uploads.

use explorer_core::config::{SecurityPolicy, UploadProfile};
use explorer_core::error::ErrorKind;
use explorer_entity::upload::{BlockReason, DroppedEntry, PendingFile, UploadResult};
use explorer_service::upload::filter_files;
use explorer_service::NoticeSeverity;
use explorer_storage::BackendOp;

use crate::helpers::TestExplorer;

fn policy(max_file: u64, max_total: u64, max_count: usize) -> SecurityPolicy {
    SecurityPolicy {
        max_file_size_bytes: max_file,
        max_total_size_bytes: max_total,
        max_file_count: max_count,
        block_dangerous_extensions: true,
    }
}

fn sized(name: &str, size: usize) -> PendingFile {
    PendingFile::new(name, vec![b'x'; size])
}

#[test]
fn test_filter_partitions_every_input() {
    let files = vec![
        sized("a.txt", 10),
        sized("huge.bin", 500),
        sized("run.exe", 1),
        sized("b.txt", 10),
        sized("c.txt", 10),
        sized("d.txt", 90),
    ];
    let result = filter_files(files.clone(), &policy(100, 100, 3));

    assert_eq!(result.allowed.len() + result.blocked.len(), files.len());
    for blocked in &result.blocked {
        assert!(!blocked.reason.to_string().is_empty());
    }
    let allowed: Vec<_> = result.allowed.iter().map(|f| f.relative_path.as_str()).collect();
    assert_eq!(allowed, vec!["a.txt", "b.txt", "c.txt"]);
    assert!(matches!(
        result.blocked.last().map(|b| &b.reason),
        Some(BlockReason::TooManyFiles { limit: 3 })
    ));
}

#[test]
fn test_filter_is_a_greedy_prefix() {
    let limits = policy(100, 100, 10);

    let big_first = filter_files(vec![sized("big", 80), sized("s1", 30), sized("s2", 30)], &limits);
    let big_last = filter_files(vec![sized("s1", 30), sized("s2", 30), sized("big", 80)], &limits);

    assert_eq!(big_first.allowed.len(), 1);
    assert_eq!(big_last.allowed.len(), 2);
    assert!(matches!(
        big_last.blocked[0].reason,
        BlockReason::TotalSizeExceeded { limit: 100 }
    ));
}

#[tokio::test]
async fn test_mixed_batch_uploads_only_allowed_files() {
    let mut t = TestExplorer::seeded().await;

    let result = t
        .explorer
        .upload_files(
            vec![PendingFile::new("a.txt", "hello"), PendingFile::new("b.exe", "MZ")],
            false,
        )
        .await;

    let Some(UploadResult::Completed(report)) = result else {
        panic!("upload should have run");
    };
    assert_eq!(report.outcome.successful_paths, vec!["a.txt"]);
    assert_eq!(report.blocked.len(), 1);
    assert_eq!(report.blocked[0].file.relative_path, "b.exe");
    assert!(report.blocked[0].reason.to_string().contains("dangerous extension"));

    assert!(t.backend.exists(t.ctx.server, "/a.txt").await);
    assert!(!t.backend.exists(t.ctx.server, "/b.exe").await);
    assert!(t.explorer.navigation().state().find("a.txt").is_some());
    assert_eq!(
        t.explorer.notices().latest().map(|n| n.severity),
        Some(NoticeSeverity::Warning)
    );
}

#[tokio::test]
async fn test_completed_upload_accounts_for_every_allowed_file() {
    let mut t = TestExplorer::seeded().await;
    t.backend.fail(BackendOp::Upload, "/plugins/broken.jar", "disk quota exceeded");
    assert!(t.explorer.navigate_to("/plugins").await);

    let files = vec![
        PendingFile::new("one.jar", "PK1"),
        PendingFile::new("broken.jar", "PK2"),
        PendingFile::new("three.jar", "PK3"),
    ];
    let Some(UploadResult::Completed(report)) = t.explorer.upload_files(files, false).await else {
        panic!("upload should have run");
    };

    let outcome = &report.outcome;
    assert_eq!(outcome.successful_paths.len() + outcome.failed_paths.len(), 3);
    assert!(outcome.is_partial_failure());
    assert_eq!(outcome.failed_paths[0].path, "broken.jar");
    assert_eq!(outcome.failed_paths[0].reason, "disk quota exceeded");
}

#[tokio::test]
async fn test_batch_failure_is_a_process_error() {
    let mut t = TestExplorer::seeded().await;
    t.backend.fail(BackendOp::Upload, "/", "connection reset");

    let Some(UploadResult::Completed(report)) = t
        .explorer
        .upload_files(vec![PendingFile::new("a.txt", "hello")], false)
        .await
    else {
        panic!("upload should have run");
    };

    assert!(report.outcome.is_process_failure());
    let notice = t.explorer.notices().latest().unwrap();
    assert_eq!(notice.severity, NoticeSeverity::Error);
    assert_eq!(notice.kind, Some(ErrorKind::UploadProcess));
}

#[tokio::test]
async fn test_dropped_world_folder_keeps_structure() {
    let mut t = TestExplorer::seeded().await;
    t.explorer.set_upload_profile(UploadProfile::ServerFiles);

    let world = DroppedEntry::Directory {
        name: "world_nether".into(),
        children: vec![
            DroppedEntry::File {
                name: "level.dat".into(),
                data: "nether".into(),
            },
            DroppedEntry::Directory {
                name: "DIM-1".into(),
                children: vec![DroppedEntry::File {
                    name: "r.0.0.mca".into(),
                    data: "region".into(),
                }],
            },
        ],
    };
    let Some(UploadResult::Completed(report)) = t.explorer.upload_dropped(vec![world]).await else {
        panic!("upload should have run");
    };

    assert!(report.folder_upload);
    assert_eq!(
        report.outcome.successful_paths,
        vec!["world_nether/level.dat", "world_nether/DIM-1/r.0.0.mca"]
    );
    assert_eq!(
        t.backend
            .file_bytes(t.ctx.server, "/world_nether/DIM-1/r.0.0.mca")
            .await
            .as_deref(),
        Some(&b"region"[..])
    );
    assert_eq!(t.explorer.uploads().progress().overall_percentage(), 100);

    t.explorer.dismiss_upload_progress();
    assert!(t.explorer.uploads().progress().items.is_empty());
}

#[tokio::test]
async fn test_fully_blocked_batch_needs_acknowledgement() {
    let mut t = TestExplorer::seeded().await;

    let result = t
        .explorer
        .upload_files(vec![PendingFile::new("payload.ps1", "Write-Host")], false)
        .await;

    let Some(UploadResult::Blocked(blocked)) = result else {
        panic!("batch should be blocked");
    };
    assert_eq!(blocked.blocked.len(), 1);
    assert_eq!(t.backend.call_count(BackendOp::Upload), 0);
    assert!(t.explorer.uploads().progress().items.is_empty());

    let id = t.explorer.notices().latest().unwrap().id;
    assert!(!t.explorer.dismiss_notice(id));
    assert!(t.explorer.acknowledge_notice(id));
    assert!(!t.explorer.notices().has_blocking());
}
