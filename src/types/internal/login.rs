use super::identity::Identity;

/// Persisted lockout counters of one account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginState {
    pub failed_login_count: u32,
    pub locked_until: Option<i64>,
}

/// Result of an authentication attempt
#[derive(Debug, Clone, PartialEq)]
pub enum LoginResult {
    Success(Identity),
    InvalidCredentials,
    /// Account is locked; the password was not checked
    Locked { until: i64 },
}
