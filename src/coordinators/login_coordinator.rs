use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::AppData;
use crate::audit::{AlertSink, AuditLogger, best_effort};
use crate::errors::{InternalError, WorkflowError};
use crate::providers::{Clock, CryptoProvider, FailureOutcome, LoginGuard, PasswordPolicyProvider};
use crate::stores::UserStore;
use crate::types::internal::context::RequestContext;
use crate::types::internal::login::{LoginResult, LoginState};
use crate::types::internal::user::User;

/// Bounded retries for the failed-login compare-and-swap
const MAX_SWAP_ATTEMPTS: usize = 5;

/// Password authentication with failed-login lockout, and password change
///
/// Failure handling is serialized per account by a compare-and-swap on the
/// stored counters, so exactly one concurrent attempt applies a lock and its
/// side effects.
pub struct LoginCoordinator {
    db: DatabaseConnection,
    clock: Arc<dyn Clock>,
    audit_logger: Arc<AuditLogger>,
    alert_sink: Arc<AlertSink>,
    user_store: Arc<UserStore>,
    crypto: Arc<CryptoProvider>,
    login_guard: LoginGuard,
    password_policy: PasswordPolicyProvider,
}

impl LoginCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            db: app_data.connections.lending.clone(),
            clock: Arc::clone(&app_data.clock),
            audit_logger: Arc::clone(&app_data.audit_logger),
            alert_sink: Arc::clone(&app_data.alert_sink),
            user_store: Arc::clone(&app_data.user_store),
            crypto: Arc::clone(&app_data.crypto),
            login_guard: app_data.login_guard,
            password_policy: app_data.password_policy,
        }
    }

    pub async fn authenticate(
        &self,
        ctx: &RequestContext,
        username: &str,
        password: &str,
    ) -> Result<LoginResult, WorkflowError> {
        let Some((user, password_hash)) =
            self.user_store.get_credentials(&self.db, username).await?
        else {
            tracing::debug!("Login attempt for unknown username");
            return Ok(LoginResult::InvalidCredentials);
        };

        let state = login_state(&user);
        let now = self.clock.timestamp();
        if let Some(until) = self.login_guard.active_lock(&state, now) {
            tracing::warn!(user_id = %user.id, locked_until = until, "Login rejected, account locked");
            return Ok(LoginResult::Locked { until });
        }

        if self.crypto.verify_password(password, &password_hash)? {
            self.record_success(ctx, &user, &state, now).await?;
            return Ok(LoginResult::Success(user.identity()));
        }

        match self.record_failure(&user, state, now).await? {
            FailureStep::Recorded(outcome) => {
                if outcome.locked {
                    tracing::warn!(user_id = %user.id, attempt = outcome.attempt, "Account locked after failed logins");
                } else {
                    tracing::info!(user_id = %user.id, attempt = outcome.attempt, source = %ctx.source, "Failed login");
                }
                best_effort(
                    self.audit_logger
                        .log_login_failure(ctx, &user.id, &outcome)
                        .await,
                    "login failure audit entry",
                );
                self.alert_sink
                    .raise(outcome.alert(&user.id, &ctx.ip_label(), self.login_guard.threshold()))
                    .await;
                Ok(LoginResult::InvalidCredentials)
            }
            FailureStep::LockedConcurrently(until) => Ok(LoginResult::Locked { until }),
            FailureStep::UserGone => Ok(LoginResult::InvalidCredentials),
        }
    }

    /// Replace the caller's password after verifying the current one
    ///
    /// The new password is checked against the policy before the current
    /// password is verified. A wrong current password is audited but does not
    /// count towards lockout.
    ///
    /// # Errors
    /// * `WorkflowError::Unauthenticated` - No verified caller
    /// * `WorkflowError::Invalid` - New password violates the policy, or the
    ///   current password is wrong
    /// * `WorkflowError::NotFound` - Caller's account no longer exists
    pub async fn change_password(
        &self,
        ctx: &RequestContext,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), WorkflowError> {
        let caller = ctx.caller()?;

        self.password_policy
            .validate(new_password)
            .map_err(|e| WorkflowError::invalid("new_password", e.to_string()))?;

        let stored_hash = self
            .user_store
            .get_password_hash(&self.db, &caller.id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("User", caller.id.as_str()))?;

        if !self.crypto.verify_password(current_password, &stored_hash)? {
            tracing::warn!(user_id = %caller.id, "Password change rejected, current password incorrect");
            best_effort(
                self.audit_logger
                    .log_password_change_rejected(ctx, &caller.id)
                    .await,
                "password change audit entry",
            );
            return Err(WorkflowError::invalid("current_password", "incorrect"));
        }

        let new_hash = self.crypto.hash_password(new_password)?;
        if !self
            .user_store
            .set_password_hash(&self.db, &caller.id, new_hash, self.clock.timestamp())
            .await?
        {
            return Err(WorkflowError::not_found("User", caller.id.as_str()));
        }

        tracing::info!(user_id = %caller.id, "Password changed");
        best_effort(
            self.audit_logger.log_password_changed(ctx, &caller.id).await,
            "password change audit entry",
        );
        Ok(())
    }

    async fn record_success(
        &self,
        ctx: &RequestContext,
        user: &User,
        state: &LoginState,
        now: i64,
    ) -> Result<(), WorkflowError> {
        let next = self.login_guard.after_success(state);
        if next != *state
            && !self
                .user_store
                .swap_login_state(&self.db, &user.id, state, &next, now)
                .await?
        {
            // A concurrent failure moved the counters; the success still stands
            tracing::debug!(user_id = %user.id, "Login state changed concurrently, counter not reset");
        }

        tracing::info!(user_id = %user.id, "Login succeeded");
        best_effort(
            self.audit_logger.log_login_success(ctx, &user.id).await,
            "login success audit entry",
        );
        Ok(())
    }

    async fn record_failure(
        &self,
        user: &User,
        mut state: LoginState,
        now: i64,
    ) -> Result<FailureStep, WorkflowError> {
        for _ in 0..MAX_SWAP_ATTEMPTS {
            let outcome = self.login_guard.after_failure(&state, now);
            if self
                .user_store
                .swap_login_state(&self.db, &user.id, &state, &outcome.next, now)
                .await?
            {
                return Ok(FailureStep::Recorded(outcome));
            }

            let Some(current) = self.user_store.get_user(&self.db, &user.id).await? else {
                return Ok(FailureStep::UserGone);
            };
            state = login_state(&current);
            if let Some(until) = self.login_guard.active_lock(&state, now) {
                return Ok(FailureStep::LockedConcurrently(until));
            }
        }

        tracing::error!(user_id = %user.id, "Gave up recording failed login after concurrent updates");
        Err(InternalError::concurrent_modification("record_failed_login").into())
    }
}

enum FailureStep {
    Recorded(FailureOutcome),
    /// Another attempt locked the account first
    LockedConcurrently(i64),
    UserGone,
}

fn login_state(user: &User) -> LoginState {
    LoginState {
        failed_login_count: user.failed_login_count,
        locked_until: user.locked_until,
    }
}
