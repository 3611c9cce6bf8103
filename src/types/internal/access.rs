use std::fmt;

use super::identity::Role;

/// Why an access decision denied the caller.
///
/// Each variant has a stable code that callers render to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DenyReason {
    NotOwnerNorAdmin,
    NoExplicitGrant,
    SelfActionForbidden,
    InsufficientClearance,
    OutsideApprovalWindow,
    AlreadyProcessed,
    AdminRequired,
    PendingRequestExists,
    InvalidRole,
    NotReturnable,
}

impl DenyReason {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotOwnerNorAdmin => "not_owner_nor_admin",
            Self::NoExplicitGrant => "no_explicit_grant",
            Self::SelfActionForbidden => "self_action_forbidden",
            Self::InsufficientClearance => "insufficient_clearance",
            Self::OutsideApprovalWindow => "outside_approval_window",
            Self::AlreadyProcessed => "already_processed",
            Self::AdminRequired => "admin_required",
            Self::PendingRequestExists => "pending_request_exists",
            Self::InvalidRole => "invalid_role",
            Self::NotReturnable => "not_returnable",
        }
    }

    /// Reasons describing the target's state rather than the caller's rights
    pub fn is_state_conflict(&self) -> bool {
        matches!(
            self,
            Self::AlreadyProcessed | Self::PendingRequestExists | Self::NotReturnable
        )
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Access-control model that produced an Allow
///
/// The time-of-day rule only ever denies, so it has no variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessModel {
    Rbac,
    Dac,
    Mac,
}

impl AccessModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rbac => "RBAC",
            Self::Dac => "DAC",
            Self::Mac => "MAC",
        }
    }
}

/// What satisfied the policy on an Allow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    /// Caller owns the resource
    Owner,
    /// Caller holds an explicit per-resource permission row
    ExplicitPermission,
    /// Caller's role is sufficient
    Role(Role),
    /// Resource is public
    PublicResource,
    /// Caller's clearance dominates the resource sensitivity
    Clearance,
    /// Caller is the subject of the request (e.g. the borrower)
    Requester,
}

impl Grant {
    pub fn model(&self) -> AccessModel {
        match self {
            Self::Owner | Self::ExplicitPermission | Self::Requester => AccessModel::Dac,
            Self::Role(_) => AccessModel::Rbac,
            Self::PublicResource | Self::Clearance => AccessModel::Mac,
        }
    }
}

impl fmt::Display for Grant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let model = self.model().as_str();
        match self {
            Self::Owner => write!(f, "Owner ({})", model),
            Self::ExplicitPermission => write!(f, "Permission ({})", model),
            Self::Role(role) => write!(f, "{} ({})", role, model),
            Self::PublicResource => write!(f, "Public ({})", model),
            Self::Clearance => write!(f, "Clearance ({})", model),
            Self::Requester => write!(f, "Requester ({})", model),
        }
    }
}

/// Outcome of a single authorization check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow(Grant),
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow(_))
    }

    pub fn deny_reason(&self) -> Option<DenyReason> {
        match self {
            Self::Allow(_) => None,
            Self::Deny(reason) => Some(*reason),
        }
    }

    /// Converts into a `Result`, keeping the grant for audit text
    pub fn into_result(self) -> Result<Grant, DenyReason> {
        match self {
            Self::Allow(grant) => Ok(grant),
            Self::Deny(reason) => Err(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_display_names_model() {
        assert_eq!(Grant::Owner.to_string(), "Owner (DAC)");
        assert_eq!(Grant::Role(Role::Manager).to_string(), "manager (RBAC)");
    }

    #[test]
    fn test_only_state_reasons_are_conflicts() {
        assert!(DenyReason::AlreadyProcessed.is_state_conflict());
        assert!(DenyReason::PendingRequestExists.is_state_conflict());
        assert!(!DenyReason::SelfActionForbidden.is_state_conflict());
        assert!(!DenyReason::InsufficientClearance.is_state_conflict());
    }
}
