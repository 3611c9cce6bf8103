use super::AuditLogger;
use crate::errors::InternalError;
use crate::providers::FailureOutcome;
use crate::types::internal::audit::EventType;
use crate::types::internal::context::RequestContext;

impl AuditLogger {
    pub async fn log_login_success(
        &self,
        ctx: &RequestContext,
        user_id: &str,
    ) -> Result<(), InternalError> {
        self.builder(EventType::LoginSuccess)
            .with_context(ctx)
            .user_id(user_id)
            .action("Logged in")
            .write()
            .await
    }

    /// Failed password check; the locking attempt is recorded as `AccountLocked`
    pub async fn log_login_failure(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        outcome: &FailureOutcome,
    ) -> Result<(), InternalError> {
        let event_type = if outcome.locked {
            EventType::AccountLocked
        } else {
            EventType::LoginFailure
        };
        self.builder(event_type)
            .with_context(ctx)
            .user_id(user_id)
            .action(outcome.audit_action())
            .write()
            .await
    }

    pub async fn log_password_changed(
        &self,
        ctx: &RequestContext,
        user_id: &str,
    ) -> Result<(), InternalError> {
        self.builder(EventType::PasswordChanged)
            .with_context(ctx)
            .user_id(user_id)
            .action("Password changed successfully")
            .write()
            .await
    }

    pub async fn log_password_change_rejected(
        &self,
        ctx: &RequestContext,
        user_id: &str,
    ) -> Result<(), InternalError> {
        self.builder(EventType::PasswordChangeFailed)
            .with_context(ctx)
            .user_id(user_id)
            .action("Failed password change attempt - incorrect current password")
            .write()
            .await
    }
}
