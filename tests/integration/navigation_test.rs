//! Integration tests for directory navigation and selection.

use explorer_core::error::ErrorKind;
use explorer_service::{MenuAction, NoticeSeverity, PathModel};
use explorer_storage::BackendOp;

use crate::helpers::TestExplorer;

#[tokio::test]
async fn test_list_root_then_enter_world() {
    let mut t = TestExplorer::seeded().await;
    assert_eq!(t.explorer.navigation().current_path(), "/");
    assert_eq!(
        t.listed_names(),
        vec!["plugins", "world", "ops.json", "server.properties"]
    );

    let world = t.item("world");
    assert!(t.explorer.open_item(world).await);

    assert_eq!(t.explorer.navigation().current_path(), "/world");
    assert_eq!(t.listed_names(), vec!["level.dat"]);
}

#[tokio::test]
async fn test_enter_then_up_round_trips() {
    let mut t = TestExplorer::seeded().await;
    let before = t.explorer.navigation().current_path().to_string();

    let plugins = t.item("plugins");
    assert!(t.explorer.open_item(plugins).await);
    assert!(t.explorer.navigate_up().await);

    assert_eq!(t.explorer.navigation().current_path(), before);
}

#[tokio::test]
async fn test_navigate_up_at_root_is_a_no_op() {
    let mut t = TestExplorer::seeded().await;
    let lists = t.backend.call_count(BackendOp::List);

    assert!(!t.explorer.navigate_up().await);
    assert!(!t.explorer.navigate_up().await);

    assert_eq!(t.explorer.navigation().current_path(), "/");
    assert_eq!(t.backend.call_count(BackendOp::List), lists);
}

#[tokio::test]
async fn test_stale_listing_is_ignored() {
    let t = TestExplorer::seeded().await;
    let mut model = PathModel::new();

    model.navigate_to_path("/world");
    let slow = model.begin_fetch();
    model.navigate_to_path("/plugins");
    let fast = model.begin_fetch();

    let plugins = t.ctx.backend.list_directory(t.ctx.server, "/plugins").await;
    assert!(model.apply_listing(fast, plugins).unwrap());
    let world = t.ctx.backend.list_directory(t.ctx.server, "/world").await;
    assert!(!model.apply_listing(slow, world).unwrap());

    assert_eq!(model.current_path(), "/plugins");
    assert!(model.items().is_empty());
}

#[tokio::test]
async fn test_listing_failure_becomes_error_notice() {
    let mut t = TestExplorer::seeded().await;
    t.backend.fail(BackendOp::List, "/world", "server offline");

    assert!(!t.explorer.navigate_to("/world").await);

    let notice = t.explorer.notices().latest().unwrap();
    assert_eq!(notice.severity, NoticeSeverity::Error);
    assert_eq!(notice.kind, Some(ErrorKind::Listing));
    assert_eq!(notice.message, "server offline");
}

#[tokio::test]
async fn test_bulk_menu_rules() {
    let mut t = TestExplorer::seeded().await;

    t.explorer.open_context_menu(t.item("ops.json"));
    assert!(matches!(
        t.explorer.interaction(),
        explorer_service::Interaction::ContextMenu(menu) if !menu.is_bulk()
    ));
    t.explorer.close_context_menu();

    t.explorer.toggle_selection("ops.json");
    t.explorer.open_context_menu(t.item("server.properties"));
    let explorer_service::Interaction::ContextMenu(menu) = t.explorer.interaction() else {
        panic!("menu should be open");
    };
    assert!(!menu.is_bulk());

    t.explorer.open_context_menu(t.item("ops.json"));
    let explorer_service::Interaction::ContextMenu(menu) = t.explorer.interaction() else {
        panic!("menu should be open");
    };
    assert_eq!(
        menu.actions(),
        vec![MenuAction::DeleteSelected, MenuAction::ClearSelection]
    );

    t.explorer.choose(MenuAction::ClearSelection).await;
    assert!(t.explorer.selection().is_empty());
    assert!(!t.explorer.is_listening_for_clicks());
}

#[tokio::test]
async fn test_teardown_releases_click_subscription() {
    let mut t = TestExplorer::seeded().await;
    let clicks = t.explorer.document_clicks();

    t.explorer.open_context_menu(t.item("ops.json"));
    assert_eq!(clicks.receiver_count(), 1);

    t.explorer.teardown();
    assert_eq!(clicks.receiver_count(), 0);
}
