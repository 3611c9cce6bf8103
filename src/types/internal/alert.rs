use std::fmt;
use std::str::FromStr;

use crate::errors::InternalError;
use crate::types::db::alert;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertType {
    FailedLogin,
    AccountLockout,
    UnauthorizedAccess,
    SuspiciousActivity,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FailedLogin => "failed_login",
            Self::AccountLockout => "account_lockout",
            Self::UnauthorizedAccess => "unauthorized_access",
            Self::SuspiciousActivity => "suspicious_activity",
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertType {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "failed_login" => Ok(Self::FailedLogin),
            "account_lockout" => Ok(Self::AccountLockout),
            "unauthorized_access" => Ok(Self::UnauthorizedAccess),
            "suspicious_activity" => Ok(Self::SuspiciousActivity),
            other => Err(InternalError::parse("AlertType", format!("unknown alert type '{}'", other))),
        }
    }
}

/// Alert severity, ordered from least to most urgent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            other => Err(InternalError::parse("Severity", format!("unknown severity '{}'", other))),
        }
    }
}

/// Alert about to be raised
#[derive(Debug, Clone, PartialEq)]
pub struct NewAlert {
    pub alert_type: AlertType,
    pub severity: Severity,
    pub message: String,
    pub user_id: Option<String>,
    pub ip_address: Option<String>,
}

impl NewAlert {
    pub fn failed_login(user_id: &str, ip: &str, attempt: u32, threshold: u32) -> Self {
        // The attempt just before lockout is escalated
        let severity = if attempt + 1 >= threshold {
            Severity::High
        } else {
            Severity::Medium
        };
        Self {
            alert_type: AlertType::FailedLogin,
            severity,
            message: format!("Failed login attempt #{} from IP {}", attempt, ip),
            user_id: Some(user_id.to_string()),
            ip_address: Some(ip.to_string()),
        }
    }

    pub fn account_lockout(user_id: &str, ip: &str) -> Self {
        Self {
            alert_type: AlertType::AccountLockout,
            severity: Severity::Critical,
            message: format!(
                "Account locked due to multiple failed login attempts from IP {}",
                ip
            ),
            user_id: Some(user_id.to_string()),
            ip_address: Some(ip.to_string()),
        }
    }

    pub fn unauthorized_access(user_id: &str, resource: &str, ip: &str) -> Self {
        Self {
            alert_type: AlertType::UnauthorizedAccess,
            severity: Severity::High,
            message: format!("Unauthorized access attempt to {} from IP {}", resource, ip),
            user_id: Some(user_id.to_string()),
            ip_address: Some(ip.to_string()),
        }
    }

    pub fn suspicious_activity(user_id: &str, activity: &str, ip: &str) -> Self {
        Self {
            alert_type: AlertType::SuspiciousActivity,
            severity: Severity::Medium,
            message: format!("Suspicious activity detected: {} from IP {}", activity, ip),
            user_id: Some(user_id.to_string()),
            ip_address: Some(ip.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub id: i64,
    pub alert_type: AlertType,
    pub severity: Severity,
    pub message: String,
    pub user_id: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: i64,
    pub resolved: bool,
    pub resolved_at: Option<i64>,
}

impl TryFrom<alert::Model> for Alert {
    type Error = InternalError;

    fn try_from(m: alert::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            alert_type: m.alert_type.parse()?,
            severity: m.severity.parse()?,
            id: m.id,
            message: m.message,
            user_id: m.user_id,
            ip_address: m.ip_address,
            created_at: m.created_at,
            resolved: m.resolved,
            resolved_at: m.resolved_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_login_severity_escalates_before_threshold() {
        assert_eq!(NewAlert::failed_login("u", "1.2.3.4", 1, 5).severity, Severity::Medium);
        assert_eq!(NewAlert::failed_login("u", "1.2.3.4", 3, 5).severity, Severity::Medium);
        assert_eq!(NewAlert::failed_login("u", "1.2.3.4", 4, 5).severity, Severity::High);
    }

    #[test]
    fn test_lockout_is_critical() {
        let alert = NewAlert::account_lockout("u", "10.0.0.1");
        assert_eq!(alert.severity, Severity::Critical);
        assert_eq!(alert.alert_type, AlertType::AccountLockout);
        assert!(alert.message.contains("10.0.0.1"));
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::Medium > Severity::Low);
    }
}
