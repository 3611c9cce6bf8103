use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::errors::InternalError;
use crate::types::db::role_change_request::{self, Entity as RoleRequestEntity};
use crate::types::internal::identity::Role;
use crate::types::internal::role_change::{RoleChangeRequest, RoleChangeStatus};

/// Repository for role-change requests
#[derive(Debug, Default)]
pub struct RoleRequestStore;

impl RoleRequestStore {
    pub fn new() -> Self {
        Self
    }

    pub async fn create_request(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
        current_role: Role,
        requested_role: Role,
        reason: Option<String>,
        now: i64,
    ) -> Result<RoleChangeRequest, InternalError> {
        let model = role_change_request::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            user_id: Set(user_id.to_string()),
            current_role: Set(current_role.as_str().to_string()),
            requested_role: Set(requested_role.as_str().to_string()),
            reason: Set(reason),
            status: Set(RoleChangeStatus::Pending.as_str().to_string()),
            requested_at: Set(now),
            reviewed_at: Set(None),
            reviewed_by_id: Set(None),
        }
        .insert(conn)
        .await
        .map_err(|e| InternalError::database("create_role_request", e))?;

        RoleChangeRequest::try_from(model)
    }

    pub async fn get_request(
        &self,
        conn: &impl ConnectionTrait,
        request_id: &str,
    ) -> Result<Option<RoleChangeRequest>, InternalError> {
        RoleRequestEntity::find_by_id(request_id.to_string())
            .one(conn)
            .await
            .map_err(|e| InternalError::database("get_role_request", e))?
            .map(RoleChangeRequest::try_from)
            .transpose()
    }

    pub async fn has_pending(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
    ) -> Result<bool, InternalError> {
        let count = RoleRequestEntity::find()
            .filter(role_change_request::Column::UserId.eq(user_id))
            .filter(role_change_request::Column::Status.eq(RoleChangeStatus::Pending.as_str()))
            .count(conn)
            .await
            .map_err(|e| InternalError::database("count_pending_role_requests", e))?;
        Ok(count > 0)
    }

    /// Close a pending request; false when it was no longer pending
    pub async fn mark_decided(
        &self,
        conn: &impl ConnectionTrait,
        request_id: &str,
        status: RoleChangeStatus,
        reviewer_id: &str,
        now: i64,
    ) -> Result<bool, InternalError> {
        let result = RoleRequestEntity::update_many()
            .col_expr(role_change_request::Column::Status, Expr::value(status.as_str()))
            .col_expr(role_change_request::Column::ReviewedAt, Expr::value(now))
            .col_expr(role_change_request::Column::ReviewedById, Expr::value(reviewer_id))
            .filter(role_change_request::Column::Id.eq(request_id))
            .filter(role_change_request::Column::Status.eq(RoleChangeStatus::Pending.as_str()))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("decide_role_request", e))?;
        Ok(result.rows_affected == 1)
    }

    pub async fn list_for_user(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
    ) -> Result<Vec<RoleChangeRequest>, InternalError> {
        RoleRequestEntity::find()
            .filter(role_change_request::Column::UserId.eq(user_id))
            .order_by_desc(role_change_request::Column::RequestedAt)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("list_user_role_requests", e))?
            .into_iter()
            .map(RoleChangeRequest::try_from)
            .collect()
    }

    /// Pending requests, newest first
    pub async fn list_pending(
        &self,
        conn: &impl ConnectionTrait,
    ) -> Result<Vec<RoleChangeRequest>, InternalError> {
        RoleRequestEntity::find()
            .filter(role_change_request::Column::Status.eq(RoleChangeStatus::Pending.as_str()))
            .order_by_desc(role_change_request::Column::RequestedAt)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("list_pending_role_requests", e))?
            .into_iter()
            .map(RoleChangeRequest::try_from)
            .collect()
    }

    pub async fn delete_for_user(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
    ) -> Result<u64, InternalError> {
        let result = RoleRequestEntity::delete_many()
            .filter(role_change_request::Column::UserId.eq(user_id))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("delete_user_role_requests", e))?;
        Ok(result.rows_affected)
    }

    /// Null `reviewed_by_id` on requests a user reviewed
    pub async fn clear_reviewer(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
    ) -> Result<u64, InternalError> {
        let result = RoleRequestEntity::update_many()
            .col_expr(
                role_change_request::Column::ReviewedById,
                Expr::value(Option::<String>::None),
            )
            .filter(role_change_request::Column::ReviewedById.eq(user_id))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("clear_role_reviewer", e))?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::setup_test_lending_db;

    const NOW: i64 = 1_700_000_000;

    #[tokio::test]
    async fn test_pending_tracking_and_decision_guard() {
        let db = setup_test_lending_db().await;
        let store = RoleRequestStore::new();

        assert!(!store.has_pending(&db, "u1").await.unwrap());
        let req = store
            .create_request(&db, "u1", Role::Employee, Role::Manager, Some("team lead".into()), NOW)
            .await
            .unwrap();
        assert!(store.has_pending(&db, "u1").await.unwrap());
        assert_eq!(store.list_pending(&db).await.unwrap().len(), 1);

        assert!(store
            .mark_decided(&db, &req.id, RoleChangeStatus::Rejected, "admin", NOW + 1)
            .await
            .unwrap());
        assert!(!store
            .mark_decided(&db, &req.id, RoleChangeStatus::Approved, "admin", NOW + 2)
            .await
            .unwrap());

        let decided = store.get_request(&db, &req.id).await.unwrap().unwrap();
        assert_eq!(decided.status, RoleChangeStatus::Rejected);
        assert_eq!(decided.reviewed_at, Some(NOW + 1));
        assert_eq!(decided.reviewed_by_id.as_deref(), Some("admin"));
        assert!(!store.has_pending(&db, "u1").await.unwrap());
        assert!(store.list_pending(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_second_pending_request_for_user_is_rejected_by_schema() {
        let db = setup_test_lending_db().await;
        let store = RoleRequestStore::new();

        let first = store
            .create_request(&db, "u1", Role::Employee, Role::Manager, None, NOW)
            .await
            .unwrap();
        let err = store
            .create_request(&db, "u1", Role::Employee, Role::Admin, None, NOW + 1)
            .await
            .unwrap_err();
        assert!(matches!(err, InternalError::Database(_)));

        // Other users and decided requests are unaffected
        store
            .create_request(&db, "u2", Role::Employee, Role::Manager, None, NOW)
            .await
            .unwrap();
        store
            .mark_decided(&db, &first.id, RoleChangeStatus::Rejected, "admin", NOW + 2)
            .await
            .unwrap();
        store
            .create_request(&db, "u1", Role::Employee, Role::Admin, None, NOW + 3)
            .await
            .unwrap();
        assert_eq!(store.list_pending(&db).await.unwrap().len(), 2);
    }
}
