use super::AuditLogger;
use crate::errors::InternalError;
use crate::types::internal::approval_window::ApprovalWindow;
use crate::types::internal::audit::EventType;
use crate::types::internal::context::RequestContext;
use crate::types::internal::user::User;

impl AuditLogger {
    pub async fn log_user_registered(
        &self,
        ctx: &RequestContext,
        user: &User,
    ) -> Result<(), InternalError> {
        self.builder(EventType::UserRegistered)
            .with_context(ctx)
            .user_id(user.id.clone())
            .action(format!("Registered {} ({}, {})", user.username, user.role, user.clearance))
            .write()
            .await
    }

    pub async fn log_user_updated(
        &self,
        ctx: &RequestContext,
        admin_id: &str,
        user: &User,
    ) -> Result<(), InternalError> {
        self.builder(EventType::UserUpdated)
            .with_context(ctx)
            .user_id(admin_id)
            .action(format!(
                "Updated user {} (Role: {}, Clearance: {})",
                user.username, user.role, user.clearance
            ))
            .write()
            .await
    }

    pub async fn log_user_deleted(
        &self,
        ctx: &RequestContext,
        admin_id: &str,
        deleted_user_id: &str,
    ) -> Result<(), InternalError> {
        self.builder(EventType::UserDeleted)
            .with_context(ctx)
            .user_id(admin_id)
            .action(format!("Deleted user ID {}", deleted_user_id))
            .write()
            .await
    }

    pub async fn log_approval_window_updated(
        &self,
        ctx: &RequestContext,
        admin_id: &str,
        window: &ApprovalWindow,
    ) -> Result<(), InternalError> {
        self.builder(EventType::ConfigUpdated)
            .with_context(ctx)
            .user_id(admin_id)
            .action(format!(
                "Updated system approved hours to {}-{}",
                window.start_hour, window.end_hour
            ))
            .write()
            .await
    }

    pub async fn log_alert_resolved(
        &self,
        ctx: &RequestContext,
        admin_id: &str,
        alert_id: i64,
    ) -> Result<(), InternalError> {
        self.builder(EventType::AlertResolved)
            .with_context(ctx)
            .user_id(admin_id)
            .action(format!("Resolved alert {}", alert_id))
            .write()
            .await
    }
}
