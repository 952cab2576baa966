//! Integration tests for the viewer, editing, and version history.

use explorer_core::error::ErrorKind;
use explorer_core::events::ExplorerEvent;
use explorer_entity::{UserRole, ViewerTab};
use explorer_service::Interaction;
use explorer_storage::BackendOp;

use crate::helpers::TestExplorer;

async fn with_image() -> TestExplorer {
    let mut t = TestExplorer::seeded().await;
    t.backend
        .insert_file(t.ctx.server, "/server-icon.png", vec![0x89, b'P', b'N', b'G'])
        .await;
    assert!(t.explorer.load().await);
    t
}

async fn edit(t: &mut TestExplorer, content: &str) {
    let viewer = t.explorer.viewer_mut();
    viewer.start_edit().unwrap();
    viewer.set_edited_content(content).unwrap();
    assert!(t.explorer.save_viewer().await);
}

#[tokio::test]
async fn test_image_preview_lifecycle() {
    let mut t = with_image().await;

    let icon = t.item("server-icon.png");
    assert!(t.explorer.open_item(icon).await);

    let session = t.explorer.viewer().session().unwrap();
    assert!(session.content.image_url().is_some());
    assert!(session.content.text().is_none());
    assert_eq!(*t.explorer.interaction(), Interaction::Viewing);
    assert_eq!(t.blobs.live_urls(), 1);

    t.explorer.close_viewer();
    assert!(t.explorer.viewer().session().is_none());
    assert_eq!(t.blobs.live_urls(), 0);
    assert_eq!(t.blobs.revoked_count(), 1);
}

#[tokio::test]
async fn test_opening_another_file_revokes_previous_url() {
    let mut t = with_image().await;

    assert!(t.explorer.open_viewer(&t.item("server-icon.png")).await);
    assert!(t.explorer.open_viewer(&t.item("ops.json")).await);

    assert_eq!(t.blobs.live_urls(), 0);
    assert_eq!(t.blobs.revoked_count(), 1);
    assert_eq!(
        t.explorer.viewer().session().unwrap().content.text(),
        Some("[]")
    );
}

#[tokio::test]
async fn test_unviewable_file_keeps_viewer_closed() {
    let mut t = TestExplorer::seeded().await;
    t.backend.insert_file(t.ctx.server, "/paper.jar", "PK").await;
    assert!(t.explorer.load().await);

    assert!(!t.explorer.open_viewer(&t.item("paper.jar")).await);
    assert!(!t.explorer.viewer().is_open());
    assert_eq!(t.backend.call_count(BackendOp::Download), 0);
}

#[tokio::test]
async fn test_save_records_previous_content_as_version() {
    let mut t = TestExplorer::seeded().await;
    let mut events = t.explorer.subscribe_events();
    assert!(t.explorer.open_viewer(&t.item("server.properties")).await);

    edit(&mut t, "motd=Survival").await;

    assert_eq!(
        t.backend
            .file_bytes(t.ctx.server, "/server.properties")
            .await
            .as_deref(),
        Some(&b"motd=Survival"[..])
    );
    assert!(t.explorer.show_history().await);
    let versions = t.explorer.viewer().history().versions();
    assert_eq!(versions.len(), 1);
    assert_eq!(versions[0].editor_username.as_deref(), Some("tester"));
    assert_eq!(
        t.explorer.viewer().session().unwrap().active_tab,
        ViewerTab::History
    );
    assert!(matches!(
        events.try_recv().unwrap().payload,
        ExplorerEvent::Saved { .. }
    ));
}

#[tokio::test]
async fn test_restore_is_non_destructive() {
    let mut t = TestExplorer::seeded().await;
    assert!(t.explorer.open_viewer(&t.item("server.properties")).await);
    edit(&mut t, "motd=v1").await;
    edit(&mut t, "motd=v2").await;
    assert!(t.explorer.show_history().await);
    let before: Vec<u32> = t
        .explorer
        .viewer()
        .history()
        .versions()
        .iter()
        .map(|v| v.version_number)
        .collect();

    assert!(t.explorer.restore_version(1, None).await);

    let after: Vec<u32> = t
        .explorer
        .viewer()
        .history()
        .versions()
        .iter()
        .map(|v| v.version_number)
        .collect();
    assert_eq!(after.len(), before.len() + 1);
    assert!(before.iter().all(|n| after.contains(n)));
    assert!(after.iter().max() > before.iter().max());

    let session = t.explorer.viewer().session().unwrap();
    assert_eq!(session.content.text(), Some("motd=A Minecraft Server"));
    assert_eq!(session.active_tab, ViewerTab::Content);
}

#[tokio::test]
async fn test_version_delete_is_admin_only() {
    let mut t = TestExplorer::with_role(UserRole::Operator);
    t.backend
        .insert_file(t.ctx.server, "/ops.json", "[]")
        .await;
    assert!(t.explorer.load().await);
    assert!(t.explorer.open_viewer(&t.item("ops.json")).await);
    edit(&mut t, "[\"steve\"]").await;
    assert!(t.explorer.show_history().await);

    assert!(!t.explorer.delete_version(1).await);

    assert_eq!(
        t.explorer.notices().latest().unwrap().kind,
        Some(ErrorKind::Authorization)
    );
    assert_eq!(t.backend.call_count(BackendOp::DeleteVersion), 0);
    assert_eq!(t.explorer.viewer().history().versions().len(), 1);
}

#[tokio::test]
async fn test_teardown_revokes_open_preview() {
    let mut t = with_image().await;
    assert!(t.explorer.open_viewer(&t.item("server-icon.png")).await);

    t.explorer.teardown();

    assert_eq!(t.blobs.live_urls(), 0);
    assert_eq!(t.blobs.revoked_count(), 1);
}
