mod common;

use common::{TEST_NOW, setup_test_lending_db};
use sea_orm::EntityTrait;
use equiplend_backend::errors::InternalError;
use equiplend_backend::stores::SystemConfigStore;
use equiplend_backend::types::db::system_config::Entity as SystemConfig;
use equiplend_backend::types::internal::approval_window::{
    APPROVAL_END_HOUR_KEY, APPROVAL_START_HOUR_KEY, ApprovalWindow,
};

#[tokio::test]
async fn test_approval_window_defaults_when_unset() {
    let db = setup_test_lending_db().await;
    let store = SystemConfigStore::new();

    let window = store.get_approval_window(&db).await.unwrap();
    assert_eq!(window, ApprovalWindow { start_hour: 8, end_hour: 18 });
    assert!(store.get_value(&db, APPROVAL_START_HOUR_KEY).await.unwrap().is_none());
}

#[tokio::test]
async fn test_set_approval_window_overwrites() {
    let db = setup_test_lending_db().await;
    let store = SystemConfigStore::new();

    store
        .set_approval_window(&db, &ApprovalWindow::new(9, 17).unwrap(), TEST_NOW)
        .await
        .unwrap();
    store
        .set_approval_window(&db, &ApprovalWindow::new(7, 21).unwrap(), TEST_NOW + 60)
        .await
        .unwrap();

    let window = store.get_approval_window(&db).await.unwrap();
    assert_eq!((window.start_hour, window.end_hour), (7, 21));
    assert_eq!(
        store.get_value(&db, APPROVAL_END_HOUR_KEY).await.unwrap().as_deref(),
        Some("21")
    );

    // Rows carry the caller-supplied time, not the wall clock
    let row = SystemConfig::find_by_id(APPROVAL_END_HOUR_KEY.to_string())
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.updated_at, TEST_NOW + 60);
}

#[tokio::test]
async fn test_partial_window_falls_back_per_key() {
    let db = setup_test_lending_db().await;
    let store = SystemConfigStore::new();

    store.set_value(&db, APPROVAL_END_HOUR_KEY, "20", TEST_NOW).await.unwrap();
    let window = store.get_approval_window(&db).await.unwrap();
    assert_eq!((window.start_hour, window.end_hour), (8, 20));
}

#[tokio::test]
async fn test_corrupt_hour_is_parse_error() {
    let db = setup_test_lending_db().await;
    let store = SystemConfigStore::new();

    store.set_value(&db, APPROVAL_START_HOUR_KEY, "noon", TEST_NOW).await.unwrap();
    let err = store.get_approval_window(&db).await.unwrap_err();
    assert!(matches!(err, InternalError::Parse { .. }));
}
