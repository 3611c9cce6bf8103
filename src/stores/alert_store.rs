use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, QueryOrder,
    Set,
};

use crate::errors::InternalError;
use crate::types::db::alert::{self, Entity as AlertEntity};
use crate::types::internal::alert::{Alert, NewAlert};

/// Repository for security alerts
///
/// Alerts are append-only apart from the resolved flag.
#[derive(Debug, Default)]
pub struct AlertStore;

impl AlertStore {
    pub fn new() -> Self {
        Self
    }

    pub async fn insert_alert(
        &self,
        conn: &impl ConnectionTrait,
        alert: NewAlert,
        now: i64,
    ) -> Result<i64, InternalError> {
        let model = alert::ActiveModel {
            id: NotSet,
            alert_type: Set(alert.alert_type.as_str().to_string()),
            severity: Set(alert.severity.as_str().to_string()),
            message: Set(alert.message),
            user_id: Set(alert.user_id),
            ip_address: Set(alert.ip_address),
            created_at: Set(now),
            resolved: Set(false),
            resolved_at: Set(None),
        }
        .insert(conn)
        .await
        .map_err(|e| InternalError::database("insert_alert", e))?;
        Ok(model.id)
    }

    pub async fn get_alert(
        &self,
        conn: &impl ConnectionTrait,
        alert_id: i64,
    ) -> Result<Option<Alert>, InternalError> {
        AlertEntity::find_by_id(alert_id)
            .one(conn)
            .await
            .map_err(|e| InternalError::database("get_alert", e))?
            .map(Alert::try_from)
            .transpose()
    }

    /// Unresolved alerts, most severe first, then newest first
    ///
    /// Severity is stored as text, so ordering by it happens after loading.
    pub async fn list_unresolved(
        &self,
        conn: &impl ConnectionTrait,
        limit: usize,
    ) -> Result<Vec<Alert>, InternalError> {
        let mut alerts = AlertEntity::find()
            .filter(alert::Column::Resolved.eq(false))
            .order_by_desc(alert::Column::CreatedAt)
            .order_by_desc(alert::Column::Id)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("list_unresolved_alerts", e))?
            .into_iter()
            .map(Alert::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        // Stable sort keeps the newest-first order within a severity
        alerts.sort_by(|a, b| b.severity.cmp(&a.severity));
        alerts.truncate(limit);
        Ok(alerts)
    }

    /// Alerts recorded for a user, newest first
    pub async fn list_for_user(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
    ) -> Result<Vec<Alert>, InternalError> {
        AlertEntity::find()
            .filter(alert::Column::UserId.eq(user_id))
            .order_by_desc(alert::Column::CreatedAt)
            .order_by_desc(alert::Column::Id)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("list_user_alerts", e))?
            .into_iter()
            .map(Alert::try_from)
            .collect()
    }

    /// Mark an alert resolved; false when no such alert exists
    pub async fn resolve_alert(
        &self,
        conn: &impl ConnectionTrait,
        alert_id: i64,
        now: i64,
    ) -> Result<bool, InternalError> {
        let result = AlertEntity::update_many()
            .col_expr(alert::Column::Resolved, Expr::value(true))
            .col_expr(alert::Column::ResolvedAt, Expr::value(now))
            .filter(alert::Column::Id.eq(alert_id))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("resolve_alert", e))?;
        Ok(result.rows_affected == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::setup_test_lending_db;
    use crate::types::internal::alert::Severity;

    const NOW: i64 = 1_700_000_000;

    #[tokio::test]
    async fn test_unresolved_ordering_and_resolution() {
        let db = setup_test_lending_db().await;
        let store = AlertStore::new();

        let medium = store
            .insert_alert(&db, NewAlert::failed_login("u1", "1.1.1.1", 1, 5), NOW)
            .await
            .unwrap();
        let critical = store
            .insert_alert(&db, NewAlert::account_lockout("u1", "1.1.1.1"), NOW + 1)
            .await
            .unwrap();
        let high_old = store
            .insert_alert(&db, NewAlert::unauthorized_access("u2", "Equipment: X", "2.2.2.2"), NOW + 2)
            .await
            .unwrap();
        let high_new = store
            .insert_alert(&db, NewAlert::failed_login("u3", "3.3.3.3", 4, 5), NOW + 3)
            .await
            .unwrap();

        let ids: Vec<i64> = store
            .list_unresolved(&db, 100)
            .await
            .unwrap()
            .iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec![critical, high_new, high_old, medium]);

        let top_two = store.list_unresolved(&db, 2).await.unwrap();
        assert_eq!(top_two.len(), 2);
        assert_eq!(top_two[0].severity, Severity::Critical);

        assert!(store.resolve_alert(&db, critical, NOW + 10).await.unwrap());
        let resolved = store.get_alert(&db, critical).await.unwrap().unwrap();
        assert!(resolved.resolved);
        assert_eq!(resolved.resolved_at, Some(NOW + 10));
        assert_eq!(store.list_unresolved(&db, 100).await.unwrap().len(), 3);

        assert!(!store.resolve_alert(&db, 9999, NOW).await.unwrap());
    }
}
