//! Integration tests for single and bulk delete.

use explorer_core::error::ErrorKind;
use explorer_core::events::ExplorerEvent;
use explorer_entity::UserRole;
use explorer_service::{DeleteCoordinator, Interaction, MenuAction, NoticeSeverity, SelectionModel};
use explorer_storage::BackendOp;

use crate::helpers::TestExplorer;

async fn with_three_files() -> TestExplorer {
    let mut t = TestExplorer::new();
    let server = t.ctx.server;
    t.backend.insert_dir(server, "/logs").await;
    for name in ["file1.log", "file2.log", "file3.log"] {
        t.backend.insert_file(server, &format!("/logs/{name}"), "x").await;
    }
    assert!(t.explorer.navigate_to("/logs").await);
    t
}

#[tokio::test]
async fn test_bulk_delete_with_one_failure() {
    let mut t = with_three_files().await;
    t.backend.fail(BackendOp::Delete, "/logs/file2.log", "file is locked");
    let mut events = t.explorer.subscribe_events();
    t.explorer.select_all();

    t.explorer.open_context_menu(t.item("file1.log"));
    t.explorer.choose(MenuAction::DeleteSelected).await;
    assert!(matches!(
        t.explorer.interaction(),
        Interaction::ConfirmingBulkDelete(names) if names.len() == 3
    ));
    let outcome = t.explorer.confirm_bulk_delete().await.unwrap();

    assert_eq!(outcome.success_count, 2);
    assert_eq!(outcome.fail_count, 1);
    assert_eq!(outcome.deleted_names, vec!["file1.log", "file3.log"]);
    assert_eq!(outcome.failures[0].name, "file2.log");
    assert!(t.explorer.selection().is_empty());
    assert_eq!(t.listed_names(), vec!["file2.log"]);

    let notice = t.explorer.notices().latest().unwrap();
    assert_eq!(notice.severity, NoticeSeverity::Warning);
    assert_eq!(notice.details, vec!["file2.log: file is locked"]);

    let event = events.try_recv().unwrap();
    assert!(matches!(
        event.payload,
        ExplorerEvent::Deleted { ref names, .. } if names.len() == 2
    ));
}

#[tokio::test]
async fn test_bulk_delete_prunes_deleted_names_from_selection() {
    let t = with_three_files().await;
    t.backend.fail(BackendOp::Delete, "/logs/file3.log", "file is locked");
    let deleter = DeleteCoordinator::new(t.ctx.clone());
    let mut selection = SelectionModel::new();
    selection.toggle("file1.log");
    selection.toggle("file3.log");

    let outcome = deleter
        .delete_bulk(t.explorer.navigation().items(), "/logs", &mut selection)
        .await;

    for name in &outcome.deleted_names {
        assert!(!selection.has(name));
    }
    assert!(selection.has("file3.log"));
    assert_eq!(t.backend.call_count(BackendOp::Delete), 2);
}

#[tokio::test]
async fn test_single_delete_refreshes_listing() {
    let mut t = with_three_files().await;
    let lists = t.backend.call_count(BackendOp::List);

    t.explorer.open_context_menu(t.item("file2.log"));
    t.explorer.choose(MenuAction::Delete).await;
    assert!(t.explorer.confirm_delete().await);

    assert_eq!(t.backend.call_count(BackendOp::List), lists + 1);
    assert_eq!(t.listed_names(), vec!["file1.log", "file3.log"]);
}

#[tokio::test]
async fn test_cancelled_delete_touches_nothing() {
    let mut t = with_three_files().await;

    t.explorer.open_context_menu(t.item("file1.log"));
    t.explorer.choose(MenuAction::Delete).await;
    t.explorer.cancel_confirmation();

    assert_eq!(*t.explorer.interaction(), Interaction::Browsing);
    assert!(!t.explorer.confirm_delete().await);
    assert_eq!(t.backend.call_count(BackendOp::Delete), 0);
}

#[tokio::test]
async fn test_bulk_delete_deletes_what_the_dialog_showed() {
    let mut t = with_three_files().await;
    t.explorer.toggle_selection("file1.log");
    t.explorer.toggle_selection("file2.log");
    t.explorer.open_context_menu(t.item("file1.log"));
    t.explorer.choose(MenuAction::DeleteSelected).await;

    t.explorer.toggle_selection("file2.log");
    t.explorer.toggle_selection("file3.log");
    let outcome = t.explorer.confirm_bulk_delete().await.unwrap();

    assert_eq!(outcome.deleted_names, vec!["file1.log", "file2.log"]);
    assert_eq!(t.listed_names(), vec!["file3.log"]);
    assert!(t.backend.exists(t.ctx.server, "/logs/file3.log").await);
    assert!(t.explorer.selection().is_empty());
}

#[tokio::test]
async fn test_viewer_role_cannot_delete() {
    let mut t = TestExplorer::with_role(UserRole::Viewer);
    t.backend.insert_file(t.ctx.server, "/ops.json", "[]").await;
    assert!(t.explorer.load().await);

    t.explorer.open_context_menu(t.item("ops.json"));
    t.explorer.choose(MenuAction::Delete).await;
    assert!(!t.explorer.confirm_delete().await);

    assert!(t.backend.exists(t.ctx.server, "/ops.json").await);
    assert_eq!(t.backend.call_count(BackendOp::Delete), 0);
    let notice = t.explorer.notices().latest().unwrap();
    assert_eq!(notice.severity, NoticeSeverity::Error);
    assert_eq!(notice.kind, Some(ErrorKind::Authorization));
}
