use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::app_data::AppData;
use crate::audit::{AuditLogger, best_effort};
use crate::config::database::{begin_transaction, commit_transaction};
use crate::errors::WorkflowError;
use crate::providers::{AuthorizationProvider, Clock, CryptoProvider, PasswordPolicyProvider};
use crate::stores::{
    AlertStore, BorrowStore, EquipmentStore, RoleRequestStore, SystemConfigStore, UserStore,
};
use crate::types::internal::access::DenyReason;
use crate::types::internal::alert::Alert;
use crate::types::internal::approval_window::ApprovalWindow;
use crate::types::internal::audit::AuditRecord;
use crate::types::internal::context::RequestContext;
use crate::types::internal::identity::{Clearance, Identity, Role};
use crate::types::internal::user::User;

/// Upper bound on alerts returned for review
pub const ALERT_REVIEW_LIMIT: usize = 100;

/// Default number of audit entries returned for review
pub const DEFAULT_AUDIT_LIMIT: u64 = 200;

/// Admin coordinator for user administration, system configuration and
/// security review
///
/// Registration is the one operation open to unauthenticated callers; every
/// other method requires an admin caller.
pub struct AdminCoordinator {
    db: DatabaseConnection,
    clock: Arc<dyn Clock>,
    audit_logger: Arc<AuditLogger>,
    alert_store: Arc<AlertStore>,
    user_store: Arc<UserStore>,
    equipment_store: Arc<EquipmentStore>,
    borrow_store: Arc<BorrowStore>,
    role_request_store: Arc<RoleRequestStore>,
    system_config_store: Arc<SystemConfigStore>,
    authorization: AuthorizationProvider,
    crypto: Arc<CryptoProvider>,
    password_policy: PasswordPolicyProvider,
}

impl AdminCoordinator {
    /// Create AdminCoordinator from AppData
    ///
    /// Follows the AppData pattern: takes Arc<AppData> as single parameter
    /// and extracts the stores and providers it needs.
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            db: app_data.connections.lending.clone(),
            clock: Arc::clone(&app_data.clock),
            audit_logger: Arc::clone(&app_data.audit_logger),
            alert_store: Arc::clone(&app_data.alert_store),
            user_store: Arc::clone(&app_data.user_store),
            equipment_store: Arc::clone(&app_data.equipment_store),
            borrow_store: Arc::clone(&app_data.borrow_store),
            role_request_store: Arc::clone(&app_data.role_request_store),
            system_config_store: Arc::clone(&app_data.system_config_store),
            authorization: app_data.authorization,
            crypto: Arc::clone(&app_data.crypto),
            password_policy: app_data.password_policy,
        }
    }

    fn require_admin<'a>(
        &self,
        ctx: &'a RequestContext,
    ) -> Result<&'a Identity, WorkflowError> {
        let caller = ctx.caller()?;
        self.authorization
            .require_admin(caller)
            .into_result()
            .inspect_err(|reason| {
                tracing::warn!(user_id = %caller.id, reason = %reason, "Admin operation denied");
            })?;
        Ok(caller)
    }

    /// Register a new account
    ///
    /// New accounts are employees with Public clearance. Only an admin caller
    /// may choose a different role or clearance.
    ///
    /// # Errors
    /// * `WorkflowError::Invalid` - Empty username, password outside the policy, or username taken
    /// * `WorkflowError::Denied(AdminRequired)` - Non-admin asked for role or clearance
    pub async fn register_user(
        &self,
        ctx: &RequestContext,
        username: &str,
        password: &str,
        role: Option<Role>,
        clearance: Option<Clearance>,
    ) -> Result<User, WorkflowError> {
        if role.is_some() || clearance.is_some() {
            self.require_admin(ctx)?;
        }

        let username = username.trim();
        if username.is_empty() {
            return Err(WorkflowError::invalid("username", "must not be empty"));
        }
        self.password_policy
            .validate(password)
            .map_err(|e| WorkflowError::invalid("password", e.to_string()))?;
        if self.user_store.username_exists(&self.db, username).await? {
            return Err(WorkflowError::invalid("username", "already taken"));
        }

        let password_hash = self.crypto.hash_password(password)?;
        let user = self
            .user_store
            .create_user(
                &self.db,
                username,
                password_hash,
                role.unwrap_or(Role::Employee),
                clearance.unwrap_or(Clearance::Public),
                self.clock.timestamp(),
            )
            .await?;

        tracing::info!(user_id = %user.id, role = %user.role, "User registered");
        best_effort(
            self.audit_logger.log_user_registered(ctx, &user).await,
            "user registration audit entry",
        );
        Ok(user)
    }

    pub async fn list_users(&self, ctx: &RequestContext) -> Result<Vec<User>, WorkflowError> {
        self.require_admin(ctx)?;
        Ok(self.user_store.list_users(&self.db).await?)
    }

    /// Admin direct edit of role and clearance
    pub async fn update_user(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        role: Role,
        clearance: Clearance,
    ) -> Result<User, WorkflowError> {
        let caller = self.require_admin(ctx)?;

        if !self
            .user_store
            .set_role_and_clearance(&self.db, user_id, role, clearance, self.clock.timestamp())
            .await?
        {
            return Err(WorkflowError::not_found("User", user_id));
        }
        let user = self
            .user_store
            .get_user(&self.db, user_id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("User", user_id))?;

        tracing::info!(user_id = %user.id, admin_id = %caller.id, role = %role, clearance = %clearance, "User updated");
        best_effort(
            self.audit_logger
                .log_user_updated(ctx, &caller.id, &user)
                .await,
            "user update audit entry",
        );
        Ok(user)
    }

    /// Delete a user and detach everything that references them
    ///
    /// Runs as one transaction:
    /// 1. Delete the user's borrow and role-change requests
    /// 2. Null reviewer/approver references the user left on other requests
    /// 3. Delete grants held or issued by the user
    /// 4. Orphan equipment the user owned
    /// 5. Delete the user
    ///
    /// Audit entries are kept.
    pub async fn delete_user(&self, ctx: &RequestContext, user_id: &str) -> Result<(), WorkflowError> {
        let caller = self.require_admin(ctx)?;
        if caller.id == user_id {
            return Err(DenyReason::SelfActionForbidden.into());
        }

        let txn = begin_transaction(&self.db).await?;
        let borrow_requests = self.borrow_store.delete_for_user(&txn, user_id).await?;
        let role_requests = self.role_request_store.delete_for_user(&txn, user_id).await?;
        self.role_request_store.clear_reviewer(&txn, user_id).await?;
        self.borrow_store.clear_approver(&txn, user_id).await?;
        let permissions = self
            .equipment_store
            .delete_permissions_for_user(&txn, user_id)
            .await?;
        let orphaned = self.equipment_store.clear_owner(&txn, user_id).await?;
        if !self.user_store.delete_user(&txn, user_id).await? {
            return Err(WorkflowError::not_found("User", user_id));
        }
        commit_transaction(txn).await?;

        tracing::info!(
            user_id,
            admin_id = %caller.id,
            borrow_requests,
            role_requests,
            permissions,
            orphaned_equipment = orphaned,
            "User deleted"
        );
        best_effort(
            self.audit_logger
                .log_user_deleted(ctx, &caller.id, user_id)
                .await,
            "user delete audit entry",
        );
        Ok(())
    }

    pub async fn get_approval_window(
        &self,
        ctx: &RequestContext,
    ) -> Result<ApprovalWindow, WorkflowError> {
        self.require_admin(ctx)?;
        Ok(self.system_config_store.get_approval_window(&self.db).await?)
    }

    /// Replace the RuBAC approval window; both hours must be 0-23
    pub async fn set_approval_window(
        &self,
        ctx: &RequestContext,
        start_hour: u32,
        end_hour: u32,
    ) -> Result<ApprovalWindow, WorkflowError> {
        let caller = self.require_admin(ctx)?;
        let window = ApprovalWindow::new(start_hour, end_hour)?;

        let txn = begin_transaction(&self.db).await?;
        self.system_config_store
            .set_approval_window(&txn, &window, self.clock.timestamp())
            .await?;
        commit_transaction(txn).await?;

        tracing::info!(admin_id = %caller.id, start_hour, end_hour, "Approval window updated");
        best_effort(
            self.audit_logger
                .log_approval_window_updated(ctx, &caller.id, &window)
                .await,
            "approval window audit entry",
        );
        Ok(window)
    }

    /// Unresolved alerts, most severe first, then newest
    pub async fn list_unresolved_alerts(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<Alert>, WorkflowError> {
        self.require_admin(ctx)?;
        Ok(self
            .alert_store
            .list_unresolved(&self.db, ALERT_REVIEW_LIMIT)
            .await?)
    }

    pub async fn resolve_alert(&self, ctx: &RequestContext, alert_id: i64) -> Result<Alert, WorkflowError> {
        let caller = self.require_admin(ctx)?;

        let now = self.clock.timestamp();
        if !self.alert_store.resolve_alert(&self.db, alert_id, now).await? {
            return Err(WorkflowError::not_found("Alert", alert_id.to_string()));
        }
        let alert = self
            .alert_store
            .get_alert(&self.db, alert_id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("Alert", alert_id.to_string()))?;

        tracing::info!(alert_id, admin_id = %caller.id, "Alert resolved");
        best_effort(
            self.audit_logger
                .log_alert_resolved(ctx, &caller.id, alert_id)
                .await,
            "alert resolution audit entry",
        );
        Ok(alert)
    }

    /// Decoded audit entries, newest first
    pub async fn recent_audit_entries(
        &self,
        ctx: &RequestContext,
        limit: Option<u64>,
    ) -> Result<Vec<AuditRecord>, WorkflowError> {
        self.require_admin(ctx)?;
        Ok(self
            .audit_logger
            .recent_entries(limit.unwrap_or(DEFAULT_AUDIT_LIMIT))
            .await?)
    }
}
