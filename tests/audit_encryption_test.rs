mod common;

use common::{TestApp, ctx_for};
use equiplend_backend::config::MockEnvironment;
use equiplend_backend::coordinators::AdminCoordinator;
use equiplend_backend::types::db::audit_event;
use equiplend_backend::types::internal::identity::{Clearance, Role};
use sea_orm::EntityTrait;

const KEY: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

#[tokio::test]
async fn test_audit_payload_is_encrypted_at_rest() {
    let app = TestApp::with_env(MockEnvironment::empty().with_var("LOG_ENCRYPTION_KEY", KEY)).await;
    let admin = app.create_user("root", "pw", Role::Admin, Clearance::TopSecret).await;
    let coordinator = AdminCoordinator::new(app.app_data.clone());

    coordinator
        .set_approval_window(&ctx_for(&admin), 9, 17)
        .await
        .unwrap();

    let rows = audit_event::Entity::find()
        .all(&app.app_data.connections.audit)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert!(!rows[0].action.contains("approved hours"));
    assert!(hex_like(&rows[0].action));
    assert_ne!(rows[0].ip_address.as_deref(), Some("203.0.113.7"));

    let entries = coordinator
        .recent_audit_entries(&ctx_for(&admin), None)
        .await
        .unwrap();
    assert_eq!(entries[0].action, "Updated system approved hours to 9-17");
    assert_eq!(entries[0].ip_address.as_deref(), Some("203.0.113.7"));
}

#[tokio::test]
async fn test_plaintext_when_no_key() {
    let app = TestApp::new().await;
    let admin = app.create_user("root", "pw", Role::Admin, Clearance::TopSecret).await;
    AdminCoordinator::new(app.app_data.clone())
        .set_approval_window(&ctx_for(&admin), 9, 17)
        .await
        .unwrap();

    let rows = audit_event::Entity::find()
        .all(&app.app_data.connections.audit)
        .await
        .unwrap();
    assert_eq!(rows[0].action, "Updated system approved hours to 9-17");
}

fn hex_like(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_hexdigit())
}
