use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::errors::InternalError;
use crate::types::db::borrow_request::{self, Entity as BorrowEntity};
use crate::types::internal::borrow::{BorrowRequest, BorrowStatus};

/// Repository for borrow requests
///
/// Transitions are status-guarded updates: they report `false` when the row
/// was not in the expected state, so two racing approvals cannot both win.
#[derive(Debug, Default)]
pub struct BorrowStore;

impl BorrowStore {
    pub fn new() -> Self {
        Self
    }

    pub async fn create_request(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
        equipment_id: &str,
        now: i64,
    ) -> Result<BorrowRequest, InternalError> {
        let model = borrow_request::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            user_id: Set(user_id.to_string()),
            equipment_id: Set(equipment_id.to_string()),
            status: Set(BorrowStatus::Pending.as_str().to_string()),
            approved_by_id: Set(None),
            approved_at: Set(None),
            returned_at: Set(None),
            created_at: Set(now),
        }
        .insert(conn)
        .await
        .map_err(|e| InternalError::database("create_borrow_request", e))?;

        BorrowRequest::try_from(model)
    }

    pub async fn get_request(
        &self,
        conn: &impl ConnectionTrait,
        request_id: &str,
    ) -> Result<Option<BorrowRequest>, InternalError> {
        BorrowEntity::find_by_id(request_id.to_string())
            .one(conn)
            .await
            .map_err(|e| InternalError::database("get_borrow_request", e))?
            .map(BorrowRequest::try_from)
            .transpose()
    }

    /// `Pending -> Approved`
    pub async fn mark_approved(
        &self,
        conn: &impl ConnectionTrait,
        request_id: &str,
        approver_id: &str,
        now: i64,
    ) -> Result<bool, InternalError> {
        let result = BorrowEntity::update_many()
            .col_expr(
                borrow_request::Column::Status,
                Expr::value(BorrowStatus::Approved.as_str()),
            )
            .col_expr(borrow_request::Column::ApprovedById, Expr::value(approver_id))
            .col_expr(borrow_request::Column::ApprovedAt, Expr::value(now))
            .filter(borrow_request::Column::Id.eq(request_id))
            .filter(borrow_request::Column::Status.eq(BorrowStatus::Pending.as_str()))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("approve_borrow_request", e))?;
        Ok(result.rows_affected == 1)
    }

    /// `Approved -> Returned`
    pub async fn mark_returned(
        &self,
        conn: &impl ConnectionTrait,
        request_id: &str,
        now: i64,
    ) -> Result<bool, InternalError> {
        let result = BorrowEntity::update_many()
            .col_expr(
                borrow_request::Column::Status,
                Expr::value(BorrowStatus::Returned.as_str()),
            )
            .col_expr(borrow_request::Column::ReturnedAt, Expr::value(now))
            .filter(borrow_request::Column::Id.eq(request_id))
            .filter(borrow_request::Column::Status.eq(BorrowStatus::Approved.as_str()))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("return_borrow_request", e))?;
        Ok(result.rows_affected == 1)
    }

    /// All requests, newest first
    pub async fn list_all(
        &self,
        conn: &impl ConnectionTrait,
    ) -> Result<Vec<BorrowRequest>, InternalError> {
        BorrowEntity::find()
            .order_by_desc(borrow_request::Column::CreatedAt)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("list_borrow_requests", e))?
            .into_iter()
            .map(BorrowRequest::try_from)
            .collect()
    }

    /// Requests made by one user, newest first
    pub async fn list_for_user(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
    ) -> Result<Vec<BorrowRequest>, InternalError> {
        BorrowEntity::find()
            .filter(borrow_request::Column::UserId.eq(user_id))
            .order_by_desc(borrow_request::Column::CreatedAt)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("list_user_borrow_requests", e))?
            .into_iter()
            .map(BorrowRequest::try_from)
            .collect()
    }

    pub async fn delete_for_user(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
    ) -> Result<u64, InternalError> {
        let result = BorrowEntity::delete_many()
            .filter(borrow_request::Column::UserId.eq(user_id))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("delete_user_borrow_requests", e))?;
        Ok(result.rows_affected)
    }

    pub async fn delete_for_equipment(
        &self,
        conn: &impl ConnectionTrait,
        equipment_id: &str,
    ) -> Result<u64, InternalError> {
        let result = BorrowEntity::delete_many()
            .filter(borrow_request::Column::EquipmentId.eq(equipment_id))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("delete_equipment_borrow_requests", e))?;
        Ok(result.rows_affected)
    }

    /// Null `approved_by_id` on requests a user approved
    pub async fn clear_approver(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
    ) -> Result<u64, InternalError> {
        let result = BorrowEntity::update_many()
            .col_expr(
                borrow_request::Column::ApprovedById,
                Expr::value(Option::<String>::None),
            )
            .filter(borrow_request::Column::ApprovedById.eq(user_id))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("clear_borrow_approver", e))?;
        Ok(result.rows_affected)
    }
}
