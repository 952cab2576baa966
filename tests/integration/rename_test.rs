//! Integration tests for renaming.

use explorer_core::error::ErrorKind;
use explorer_service::{Interaction, MenuAction};
use explorer_storage::BackendOp;

use crate::helpers::TestExplorer;

#[tokio::test]
async fn test_rename_guards_issue_no_backend_call() {
    let mut t = TestExplorer::seeded().await;

    for proposed in ["ops.json", "   ", "", "a/b.json"] {
        t.explorer.open_context_menu(t.item("ops.json"));
        t.explorer.choose(MenuAction::Rename).await;
        t.explorer.set_rename_text(proposed);
        assert!(!t.explorer.confirm_rename().await);
        assert_eq!(
            t.explorer.notices().latest().unwrap().kind,
            Some(ErrorKind::Validation)
        );
        t.explorer.cancel_rename();
    }

    assert_eq!(t.backend.call_count(BackendOp::Rename), 0);
}

#[tokio::test]
async fn test_rename_moves_entry_and_history() {
    let mut t = TestExplorer::seeded().await;
    t.explorer.open_context_menu(t.item("server.properties"));
    t.explorer.choose(MenuAction::Rename).await;
    t.explorer.set_rename_text("  server.properties.bak ");

    assert!(t.explorer.confirm_rename().await);

    assert_eq!(*t.explorer.interaction(), Interaction::Browsing);
    assert!(t.backend.exists(t.ctx.server, "/server.properties.bak").await);
    assert!(!t.backend.exists(t.ctx.server, "/server.properties").await);
    assert!(t.explorer.navigation().state().find("server.properties.bak").is_some());
}

#[tokio::test]
async fn test_rename_failure_keeps_transaction_open() {
    let mut t = TestExplorer::seeded().await;
    t.backend.fail(BackendOp::Rename, "/ops.json", "permission denied");

    t.explorer.open_context_menu(t.item("ops.json"));
    t.explorer.choose(MenuAction::Rename).await;
    t.explorer.set_rename_text("operators.json");
    assert!(!t.explorer.confirm_rename().await);

    assert_eq!(*t.explorer.interaction(), Interaction::Renaming);
    let tx = t.explorer.renamer().transaction().unwrap();
    assert_eq!(tx.error.as_deref(), Some("permission denied"));
    assert!(!tx.in_progress);
    assert_eq!(
        t.explorer.notices().latest().unwrap().kind,
        Some(ErrorKind::Rename)
    );
}
