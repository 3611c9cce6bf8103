use std::fmt;

/// Event types for audit logging
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventType {
    LoginSuccess,
    LoginFailure,
    AccountLocked,
    PasswordChanged,
    PasswordChangeFailed,
    BorrowRequested,
    BorrowDenied,
    BorrowApproved,
    ApprovalBlocked,
    BorrowReturned,
    RoleChangeRequested,
    RoleChangeDecided,
    PermissionGranted,
    PermissionRevoked,
    EquipmentRegistered,
    EquipmentUpdated,
    EquipmentDeleted,
    UserRegistered,
    UserUpdated,
    UserDeleted,
    ConfigUpdated,
    AlertResolved,
    Custom(String),
}

impl EventType {
    /// Convert EventType to string representation for database storage
    pub fn as_str(&self) -> &str {
        match self {
            Self::LoginSuccess => "login_success",
            Self::LoginFailure => "login_failure",
            Self::AccountLocked => "account_locked",
            Self::PasswordChanged => "password_changed",
            Self::PasswordChangeFailed => "password_change_failed",
            Self::BorrowRequested => "borrow_requested",
            Self::BorrowDenied => "borrow_denied",
            Self::BorrowApproved => "borrow_approved",
            Self::ApprovalBlocked => "approval_blocked",
            Self::BorrowReturned => "borrow_returned",
            Self::RoleChangeRequested => "role_change_requested",
            Self::RoleChangeDecided => "role_change_decided",
            Self::PermissionGranted => "permission_granted",
            Self::PermissionRevoked => "permission_revoked",
            Self::EquipmentRegistered => "equipment_registered",
            Self::EquipmentUpdated => "equipment_updated",
            Self::EquipmentDeleted => "equipment_deleted",
            Self::UserRegistered => "user_registered",
            Self::UserUpdated => "user_updated",
            Self::UserDeleted => "user_deleted",
            Self::ConfigUpdated => "config_updated",
            Self::AlertResolved => "alert_resolved",
            Self::Custom(s) => s.as_str(),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}


/// Audit event before encoding and storage
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub event_type: EventType,
    pub user_id: Option<String>,
    pub ip_address: Option<String>,
    pub request_id: Option<String>,
    /// Plaintext description; encoded by the audit store before it is written
    pub action: String,
}

impl AuditEvent {
    pub fn new(event_type: EventType, action: impl Into<String>) -> Self {
        Self {
            event_type,
            user_id: None,
            ip_address: None,
            request_id: None,
            action: action.into(),
        }
    }
}

/// Stored audit entry with its payload decoded
#[derive(Debug, Clone, PartialEq)]
pub struct AuditRecord {
    pub id: i64,
    pub timestamp: i64,
    pub event_type: String,
    pub user_id: Option<String>,
    pub action: String,
    pub ip_address: Option<String>,
}
