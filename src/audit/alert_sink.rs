use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::audit::audit_logger::best_effort;
use crate::errors::InternalError;
use crate::providers::Clock;
use crate::stores::AlertStore;
use crate::types::internal::alert::NewAlert;

/// Append-only sink for security alerts
///
/// Raising an alert is fail-open: storage errors are logged, never returned.
pub struct AlertSink {
    db: DatabaseConnection,
    alert_store: Arc<AlertStore>,
    clock: Arc<dyn Clock>,
}

impl AlertSink {
    pub fn new(db: DatabaseConnection, alert_store: Arc<AlertStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            db,
            alert_store,
            clock,
        }
    }

    pub async fn raise(&self, alert: NewAlert) {
        tracing::warn!(
            alert_type = alert.alert_type.as_str(),
            severity = alert.severity.as_str(),
            user_id = alert.user_id.as_deref().unwrap_or("-"),
            "Security alert: {}",
            alert.message
        );
        let result: Result<(), InternalError> = self
            .alert_store
            .insert_alert(&self.db, alert, self.clock.timestamp())
            .await
            .map(|_| ());
        best_effort(result, "security alert");
    }
}

impl std::fmt::Debug for AlertSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertSink").field("db", &"<connection>").finish()
    }
}
