use super::AuditLogger;
use crate::errors::InternalError;
use crate::types::internal::audit::EventType;
use crate::types::internal::context::RequestContext;
use crate::types::internal::identity::Role;
use crate::types::internal::role_change::{RoleChangeRequest, RoleDecision};

impl AuditLogger {
    pub async fn log_role_change_requested(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        current_role: Role,
        requested_role: Role,
    ) -> Result<(), InternalError> {
        self.builder(EventType::RoleChangeRequested)
            .with_context(ctx)
            .user_id(user_id)
            .action(format!(
                "Requested role change from {} to {}",
                current_role, requested_role
            ))
            .write()
            .await
    }

    /// One entry for the deciding admin and one for the affected user
    pub async fn log_role_change_decided(
        &self,
        ctx: &RequestContext,
        admin_id: &str,
        request: &RoleChangeRequest,
        target_username: &str,
        decision: RoleDecision,
    ) -> Result<(), InternalError> {
        let (admin_action, user_action) = match decision {
            RoleDecision::Approve => (
                format!(
                    "Approved role change for user {} from {} to {}",
                    target_username, request.current_role, request.requested_role
                ),
                format!(
                    "Role changed from {} to {} (approved by admin)",
                    request.current_role, request.requested_role
                ),
            ),
            RoleDecision::Reject => (
                format!("Rejected role change request for user {}", target_username),
                "Role change request rejected by admin".to_string(),
            ),
        };

        let admin_entry = self
            .builder(EventType::RoleChangeDecided)
            .with_context(ctx)
            .user_id(admin_id)
            .action(admin_action)
            .write()
            .await;
        let user_entry = self
            .builder(EventType::RoleChangeDecided)
            .with_context(ctx)
            .user_id(request.user_id.clone())
            .action(user_action)
            .write()
            .await;

        admin_entry.and(user_entry)
    }
}
