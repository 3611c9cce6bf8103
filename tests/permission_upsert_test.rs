mod common;

use common::{TestApp, ctx_for};
use equiplend_backend::coordinators::EquipmentCoordinator;
use equiplend_backend::types::internal::access::DenyReason;
use equiplend_backend::types::internal::equipment::PermissionRights;
use equiplend_backend::types::internal::identity::{Clearance, Role};

#[tokio::test]
async fn test_regrant_replaces_rights_and_keeps_grantor() {
    let app = TestApp::new().await;
    let owner = app.create_user("otto", "pw", Role::Manager, Clearance::Secret).await;
    let admin = app.create_user("root", "pw", Role::Admin, Clearance::TopSecret).await;
    let helper = app.create_user("hana", "pw", Role::Employee, Clearance::Public).await;
    let coordinator = EquipmentCoordinator::new(app.app_data.clone());

    let item = coordinator
        .register_equipment(&ctx_for(&owner), "3D printer", Clearance::Public)
        .await
        .unwrap();

    let first = coordinator
        .grant_permission(
            &ctx_for(&owner),
            &item.id,
            &helper.id,
            PermissionRights { can_edit: true, can_delete: true },
        )
        .await
        .unwrap();
    assert_eq!(first.granted_by_id, owner.id);

    let second = coordinator
        .grant_permission(
            &ctx_for(&admin),
            &item.id,
            &helper.id,
            PermissionRights { can_edit: false, can_delete: true },
        )
        .await
        .unwrap();
    assert!(!second.can_edit);
    assert!(second.can_delete);
    assert_eq!(second.granted_by_id, owner.id);

    let grants = coordinator.list_permissions(&ctx_for(&owner), &item.id).await.unwrap();
    assert_eq!(grants.len(), 1);

    let err = coordinator
        .list_permissions(&ctx_for(&helper), &item.id)
        .await
        .unwrap_err();
    assert_eq!(err.reason(), Some(DenyReason::NotOwnerNorAdmin));

    let entries = app.app_data.audit_logger.recent_entries(1).await.unwrap();
    assert_eq!(
        entries[0].action,
        "Granted permission on equipment \"3D printer\" to hana (Edit: false, Delete: true)"
    );

    coordinator
        .revoke_permission(&ctx_for(&owner), &item.id, &helper.id)
        .await
        .unwrap();
    assert!(
        coordinator
            .list_permissions(&ctx_for(&owner), &item.id)
            .await
            .unwrap()
            .is_empty()
    );
}
