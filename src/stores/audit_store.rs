use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::errors::InternalError;
use crate::errors::internal::AuditError;
use crate::providers::AuditCodec;
use crate::types::db::audit_event::{self, Entity as AuditEventEntity};
use crate::types::internal::audit::{AuditEvent, AuditRecord};

/// Repository for audit event storage operations
///
/// Owns the audit database connection. The action text and IP address pass
/// through the audit codec on the way in and out.
pub struct AuditStore {
    db: DatabaseConnection,
    codec: Arc<dyn AuditCodec>,
}

impl AuditStore {
    /// Create a new AuditStore with the given database connection and codec
    pub fn new(db: DatabaseConnection, codec: Arc<dyn AuditCodec>) -> Self {
        Self { db, codec }
    }

    /// Encode and append an audit event
    ///
    /// # Errors
    ///
    /// Returns `InternalError` if encoding or the database insert fails
    pub async fn write_event(&self, event: AuditEvent, timestamp: i64) -> Result<(), InternalError> {
        let action = self
            .codec
            .encode(&event.action)
            .map_err(|source| AuditError::Encode { field: "action", source })?;
        let ip_address = event
            .ip_address
            .as_deref()
            .map(|ip| self.codec.encode(ip))
            .transpose()
            .map_err(|source| AuditError::Encode { field: "ip_address", source })?;

        let audit_event = audit_event::ActiveModel {
            id: sea_orm::ActiveValue::NotSet, // Let auto-increment handle this
            timestamp: Set(timestamp),
            event_type: Set(event.event_type.to_string()),
            user_id: Set(event.user_id),
            request_id: Set(event.request_id),
            action: Set(action),
            ip_address: Set(ip_address),
        };

        audit_event
            .insert(&self.db)
            .await
            .map_err(|e| InternalError::database("write_audit_event", e))?;

        Ok(())
    }

    /// Most recent entries, newest first, decoded
    pub async fn recent(&self, limit: u64) -> Result<Vec<AuditRecord>, InternalError> {
        let rows = AuditEventEntity::find()
            .order_by_desc(audit_event::Column::Timestamp)
            .order_by_desc(audit_event::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("list_audit_events", e))?;
        Ok(rows.into_iter().map(|row| self.decode(row)).collect())
    }

    /// Entries attributed to one user, oldest first, decoded
    pub async fn for_user(&self, user_id: &str) -> Result<Vec<AuditRecord>, InternalError> {
        let rows = AuditEventEntity::find()
            .filter(audit_event::Column::UserId.eq(user_id))
            .order_by_asc(audit_event::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("list_user_audit_events", e))?;
        Ok(rows.into_iter().map(|row| self.decode(row)).collect())
    }

    fn decode(&self, row: audit_event::Model) -> AuditRecord {
        AuditRecord {
            id: row.id,
            timestamp: row.timestamp,
            event_type: row.event_type,
            user_id: row.user_id,
            action: self.codec.decode(&row.action),
            ip_address: row.ip_address.map(|ip| self.codec.decode(&ip)),
        }
    }
}

impl std::fmt::Debug for AuditStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditStore")
            .field("db", &"<connection>")
            .field("codec", &"<codec>")
            .finish()
    }
}
