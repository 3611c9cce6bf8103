use std::sync::Arc;

use crate::errors::InternalError;
use crate::providers::Clock;
use crate::stores::AuditStore;
use crate::types::internal::audit::{AuditEvent, EventType};
use crate::types::internal::context::RequestContext;

/// Builder for audit events
///
/// # Example
/// ```ignore
/// AuditBuilder::new(audit_store, clock, EventType::BorrowReturned)
///     .with_context(ctx)
///     .user_id(&borrower_id)
///     .action(format!("Returned request {}", request_id))
///     .write()
///     .await?;
/// ```
pub struct AuditBuilder {
    event: AuditEvent,
    store: Arc<AuditStore>,
    clock: Arc<dyn Clock>,
}

impl AuditBuilder {
    pub fn new(store: Arc<AuditStore>, clock: Arc<dyn Clock>, event_type: EventType) -> Self {
        Self {
            event: AuditEvent::new(event_type, String::new()),
            store,
            clock,
        }
    }

    /// Populate attribution from the request context
    ///
    /// - `actor_id` -> `user_id` (overridable with `user_id`)
    /// - `ip_address` -> `ip_address` ("unknown" when absent)
    /// - `request_id` -> `request_id`
    pub fn with_context(mut self, ctx: &RequestContext) -> Self {
        self.event.user_id = Some(ctx.actor_id.clone());
        self.event.ip_address = Some(ctx.ip_label());
        self.event.request_id = Some(ctx.request_id.to_string());
        self
    }

    /// Attribute the entry to a specific user
    pub fn user_id(mut self, id: impl Into<String>) -> Self {
        self.event.user_id = Some(id.into());
        self
    }

    pub fn ip_address(mut self, ip: impl Into<String>) -> Self {
        self.event.ip_address = Some(ip.into());
        self
    }

    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.event.action = action.into();
        self
    }

    pub fn build(self) -> AuditEvent {
        self.event
    }

    /// Write the event, stamped with the current clock time
    pub async fn write(self) -> Result<(), InternalError> {
        let timestamp = self.clock.timestamp();
        self.store.write_event(self.event, timestamp).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{FixedClock, PlaintextCodec};
    use crate::test::utils::setup_test_audit_db;

    #[tokio::test]
    async fn test_builder_attributes_from_context_and_overrides_user() {
        let db = setup_test_audit_db().await;
        let store = Arc::new(AuditStore::new(db, Arc::new(PlaintextCodec)));
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::at_timestamp(1_000));
        let ctx = RequestContext::new().with_ip_address("192.168.1.9".parse().unwrap());

        let event = AuditBuilder::new(store.clone(), clock.clone(), EventType::RoleChangeDecided)
            .with_context(&ctx)
            .user_id("target-user")
            .action("Role change request rejected by admin")
            .build();
        assert_eq!(event.user_id.as_deref(), Some("target-user"));
        assert_eq!(event.ip_address.as_deref(), Some("192.168.1.9"));
        assert_eq!(event.request_id, Some(ctx.request_id.to_string()));

        AuditBuilder::new(store.clone(), clock, EventType::LoginSuccess)
            .with_context(&ctx)
            .action("Logged in")
            .write()
            .await
            .unwrap();

        let records = store.recent(10).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].timestamp, 1_000);
        assert_eq!(records[0].user_id.as_deref(), Some("unknown"));
        assert_eq!(records[0].action, "Logged in");
    }
}
