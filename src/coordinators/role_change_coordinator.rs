use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::AppData;
use crate::audit::{AuditLogger, best_effort};
use crate::config::database::{begin_transaction, commit_transaction};
use crate::errors::WorkflowError;
use crate::providers::{AuthorizationProvider, Clock, Notifier};
use crate::stores::{RoleRequestStore, UserStore};
use crate::types::internal::access::DenyReason;
use crate::types::internal::context::RequestContext;
use crate::types::internal::role_change::{RoleChangeRequest, RoleChangeStatus, RoleDecision};

/// Role-change workflow: `Pending -> {Approved, Rejected}`
///
/// A user has at most one pending request. Approval updates the request and
/// the user's role in one transaction.
pub struct RoleChangeCoordinator {
    db: DatabaseConnection,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
    audit_logger: Arc<AuditLogger>,
    user_store: Arc<UserStore>,
    role_request_store: Arc<RoleRequestStore>,
    authorization: AuthorizationProvider,
}

impl RoleChangeCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            db: app_data.connections.lending.clone(),
            clock: Arc::clone(&app_data.clock),
            notifier: Arc::clone(&app_data.notifier),
            audit_logger: Arc::clone(&app_data.audit_logger),
            user_store: Arc::clone(&app_data.user_store),
            role_request_store: Arc::clone(&app_data.role_request_store),
            authorization: app_data.authorization,
        }
    }

    pub async fn submit(
        &self,
        ctx: &RequestContext,
        requested_role: &str,
        reason: Option<String>,
    ) -> Result<RoleChangeRequest, WorkflowError> {
        let caller = ctx.caller()?;

        let txn = begin_transaction(&self.db).await?;

        // Role snapshot comes from storage, not from the caller's token
        let user = self
            .user_store
            .get_user(&txn, &caller.id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("User", caller.id.clone()))?;
        let has_pending = self.role_request_store.has_pending(&txn, &caller.id).await?;

        let requested_role = self
            .authorization
            .can_submit_role_request(requested_role, has_pending)
            .inspect_err(|deny| {
                tracing::warn!(user_id = %caller.id, reason = %deny, "Role change submission rejected");
            })?;

        let reason = reason.map(|r| r.trim().to_string()).filter(|r| !r.is_empty());
        let request = self
            .role_request_store
            .create_request(
                &txn,
                &caller.id,
                user.role,
                requested_role,
                reason,
                self.clock.timestamp(),
            )
            .await?;
        commit_transaction(txn).await?;

        tracing::info!(
            request_id = %request.id,
            user_id = %caller.id,
            from = %request.current_role,
            to = %request.requested_role,
            "Role change requested"
        );
        best_effort(
            self.audit_logger
                .log_role_change_requested(ctx, &caller.id, request.current_role, request.requested_role)
                .await,
            "role change request audit entry",
        );

        Ok(request)
    }

    /// Admin decision on a pending request
    pub async fn decide(
        &self,
        ctx: &RequestContext,
        request_id: &str,
        decision: RoleDecision,
    ) -> Result<RoleChangeRequest, WorkflowError> {
        let caller = ctx.caller()?;
        self.authorization.can_manage_role_request(caller).into_result()?;

        let request = self
            .role_request_store
            .get_request(&self.db, request_id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("RoleChangeRequest", request_id))?;
        if request.status != RoleChangeStatus::Pending {
            return Err(DenyReason::AlreadyProcessed.into());
        }

        let now = self.clock.timestamp();
        let status = decision.resulting_status();

        // Dropping the transaction on an early return rolls it back
        let txn = begin_transaction(&self.db).await?;
        if !self
            .role_request_store
            .mark_decided(&txn, &request.id, status, &caller.id, now)
            .await?
        {
            return Err(DenyReason::AlreadyProcessed.into());
        }
        if decision == RoleDecision::Approve
            && !self
                .user_store
                .set_role(&txn, &request.user_id, request.requested_role, now)
                .await?
        {
            return Err(WorkflowError::not_found("User", request.user_id.clone()));
        }
        commit_transaction(txn).await?;

        tracing::info!(
            request_id = %request.id,
            admin_id = %caller.id,
            user_id = %request.user_id,
            status = %status,
            "Role change decided"
        );

        let decided = RoleChangeRequest {
            status,
            reviewed_at: Some(now),
            reviewed_by_id: Some(caller.id.clone()),
            ..request
        };

        let target = self.user_store.get_user(&self.db, &decided.user_id).await;
        let target_username = match &target {
            Ok(Some(user)) => user.username.clone(),
            _ => decided.user_id.clone(),
        };
        best_effort(
            self.audit_logger
                .log_role_change_decided(ctx, &caller.id, &decided, &target_username, decision)
                .await,
            "role change decision audit entries",
        );

        let body = match decision {
            RoleDecision::Approve => format!(
                "Your role change request has been approved. You are now a {}.",
                decided.requested_role
            ),
            RoleDecision::Reject => "Your role change request has been rejected.".to_string(),
        };
        if let Err(e) = self
            .notifier
            .notify(&target_username, "Role change request update", &body)
        {
            tracing::error!(error = %e, request_id = %decided.id, "Failed to notify user of role decision");
        }

        Ok(decided)
    }

    /// The caller's own requests, newest first
    pub async fn my_role_requests(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<RoleChangeRequest>, WorkflowError> {
        let caller = ctx.caller()?;
        Ok(self
            .role_request_store
            .list_for_user(&self.db, &caller.id)
            .await?)
    }

    pub async fn pending_role_requests(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<RoleChangeRequest>, WorkflowError> {
        let caller = ctx.caller()?;
        self.authorization.can_manage_role_request(caller).into_result()?;
        Ok(self.role_request_store.list_pending(&self.db).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::{create_test_user, setup_test_app_data};
    use crate::types::internal::identity::{Clearance, Role};
    use crate::types::internal::user::User;

    fn ctx_for(user: &User) -> RequestContext {
        RequestContext::new().with_identity(user.identity())
    }

    #[tokio::test]
    async fn test_submit_rejects_invalid_role_before_pending_check() {
        let (app_data, _clock, _notifier) = setup_test_app_data().await;
        let db = &app_data.connections.lending;
        let user = create_test_user(db, "dana", Role::Employee, Clearance::Public).await;
        let coordinator = RoleChangeCoordinator::new(app_data.clone());

        let request = coordinator
            .submit(&ctx_for(&user), " Manager ", Some("Running the lab".to_string()))
            .await
            .unwrap();
        assert_eq!(request.current_role, Role::Employee);
        assert_eq!(request.requested_role, Role::Manager);
        assert_eq!(request.status, RoleChangeStatus::Pending);

        let err = coordinator
            .submit(&ctx_for(&user), "overlord", None)
            .await
            .unwrap_err();
        assert_eq!(err.reason(), Some(DenyReason::InvalidRole));

        let err = coordinator
            .submit(&ctx_for(&user), "admin", None)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Conflict(DenyReason::PendingRequestExists)));
    }

    #[tokio::test]
    async fn test_approve_updates_role_once() {
        let (app_data, _clock, notifier) = setup_test_app_data().await;
        let db = &app_data.connections.lending;
        let user = create_test_user(db, "erin", Role::Employee, Clearance::Public).await;
        let admin = create_test_user(db, "root", Role::Admin, Clearance::TopSecret).await;
        let coordinator = RoleChangeCoordinator::new(app_data.clone());

        let request = coordinator
            .submit(&ctx_for(&user), "manager", None)
            .await
            .unwrap();

        let err = coordinator
            .decide(&ctx_for(&user), &request.id, RoleDecision::Approve)
            .await
            .unwrap_err();
        assert_eq!(err.reason(), Some(DenyReason::AdminRequired));

        let decided = coordinator
            .decide(&ctx_for(&admin), &request.id, RoleDecision::Approve)
            .await
            .unwrap();
        assert_eq!(decided.status, RoleChangeStatus::Approved);
        assert_eq!(decided.reviewed_by_id.as_deref(), Some(admin.id.as_str()));

        let stored = app_data.user_store.get_user(db, &user.id).await.unwrap().unwrap();
        assert_eq!(stored.role, Role::Manager);

        let err = coordinator
            .decide(&ctx_for(&admin), &request.id, RoleDecision::Reject)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Conflict(DenyReason::AlreadyProcessed)));

        let entries = app_data.audit_store.for_user(&user.id).await.unwrap();
        let actions: Vec<_> = entries.iter().map(|e| e.action.as_str()).collect();
        assert_eq!(
            actions,
            vec![
                "Requested role change from employee to manager",
                "Role changed from employee to manager (approved by admin)",
            ]
        );
        assert_eq!(notifier.addresses(), vec!["erin".to_string()]);
    }

    #[tokio::test]
    async fn test_reject_leaves_role_and_allows_resubmission() {
        let (app_data, _clock, _notifier) = setup_test_app_data().await;
        let db = &app_data.connections.lending;
        let user = create_test_user(db, "finn", Role::Employee, Clearance::Public).await;
        let admin = create_test_user(db, "root", Role::Admin, Clearance::TopSecret).await;
        let coordinator = RoleChangeCoordinator::new(app_data.clone());

        let request = coordinator.submit(&ctx_for(&user), "admin", None).await.unwrap();
        coordinator
            .decide(&ctx_for(&admin), &request.id, RoleDecision::Reject)
            .await
            .unwrap();

        let stored = app_data.user_store.get_user(db, &user.id).await.unwrap().unwrap();
        assert_eq!(stored.role, Role::Employee);
        assert!(
            coordinator
                .pending_role_requests(&ctx_for(&admin))
                .await
                .unwrap()
                .is_empty()
        );

        coordinator.submit(&ctx_for(&user), "manager", None).await.unwrap();
        assert_eq!(coordinator.my_role_requests(&ctx_for(&user)).await.unwrap().len(), 2);
    }
}
