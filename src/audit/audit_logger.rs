use std::sync::Arc;

use crate::audit::AuditBuilder;
use crate::errors::InternalError;
use crate::providers::Clock;
use crate::stores::AuditStore;
use crate::types::internal::audit::{AuditRecord, EventType};

/// Audit logging for lending workflows
///
/// Domain-specific `log_*` methods live in the sibling modules (`borrow`,
/// `role_change`, `login`, `equipment`, `admin`). Every method returns the
/// write result; workflows pass it to [`best_effort`] so a failed audit write
/// never aborts the operation that triggered it.
pub struct AuditLogger {
    pub audit_store: Arc<AuditStore>,
    clock: Arc<dyn Clock>,
}

impl AuditLogger {
    pub fn new(audit_store: Arc<AuditStore>, clock: Arc<dyn Clock>) -> Self {
        Self { audit_store, clock }
    }

    /// Start a custom audit event
    pub fn builder(&self, event_type: EventType) -> AuditBuilder {
        AuditBuilder::new(self.audit_store.clone(), self.clock.clone(), event_type)
    }

    /// Most recent entries, newest first
    pub async fn recent_entries(&self, limit: u64) -> Result<Vec<AuditRecord>, InternalError> {
        self.audit_store.recent(limit).await
    }
}

/// Swallow and log a failed audit or alert write
pub fn best_effort(result: Result<(), InternalError>, what: &str) {
    if let Err(e) = result {
        tracing::error!(error = %e, "Failed to write {}", what);
    }
}

impl std::fmt::Debug for AuditLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLogger")
            .field("audit_store", &self.audit_store)
            .finish()
    }
}
