use crate::types::internal::alert::NewAlert;
use crate::types::internal::login::LoginState;

/// Result of applying one failed password check to an account
#[derive(Debug, Clone, PartialEq)]
pub struct FailureOutcome {
    pub next: LoginState,
    /// Counter value this attempt reached (before any reset)
    pub attempt: u32,
    pub locked: bool,
}

impl FailureOutcome {
    /// The single alert raised for this attempt
    ///
    /// The locking attempt raises only the lockout alert.
    pub fn alert(&self, user_id: &str, ip: &str, threshold: u32) -> NewAlert {
        if self.locked {
            NewAlert::account_lockout(user_id, ip)
        } else {
            NewAlert::failed_login(user_id, ip, self.attempt, threshold)
        }
    }

    /// Audit text for this attempt
    pub fn audit_action(&self) -> String {
        if self.locked {
            "Account locked due to failed logins".to_string()
        } else {
            format!("Failed login attempt #{}", self.attempt)
        }
    }
}

/// Failed-login counter and lockout rules
///
/// Pure state transitions over `LoginState`; persistence and the
/// compare-and-swap around them live in the login coordinator.
#[derive(Debug, Clone, Copy)]
pub struct LoginGuard {
    threshold: u32,
    lock_duration_secs: i64,
}

impl LoginGuard {
    pub fn new(threshold: u32, lock_duration_secs: i64) -> Self {
        Self {
            threshold: threshold.max(1),
            lock_duration_secs,
        }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn lock_duration_secs(&self) -> i64 {
        self.lock_duration_secs
    }

    /// Active lock expiry, if the account is locked at `now`
    ///
    /// Expiry is evaluated lazily; a past `locked_until` is simply ignored.
    pub fn active_lock(&self, state: &LoginState, now: i64) -> Option<i64> {
        state.locked_until.filter(|until| *until > now)
    }

    pub fn after_failure(&self, state: &LoginState, now: i64) -> FailureOutcome {
        let attempt = state.failed_login_count.saturating_add(1);
        if attempt >= self.threshold {
            FailureOutcome {
                next: LoginState {
                    failed_login_count: 0,
                    locked_until: Some(now + self.lock_duration_secs),
                },
                attempt,
                locked: true,
            }
        } else {
            FailureOutcome {
                next: LoginState {
                    failed_login_count: attempt,
                    locked_until: state.locked_until,
                },
                attempt,
                locked: false,
            }
        }
    }

    /// Successful authentication resets the counter and leaves `locked_until` alone
    pub fn after_success(&self, state: &LoginState) -> LoginState {
        LoginState {
            failed_login_count: 0,
            locked_until: state.locked_until,
        }
    }
}
