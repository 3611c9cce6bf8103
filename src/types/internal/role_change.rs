use std::fmt;
use std::str::FromStr;

use super::identity::Role;
use crate::errors::InternalError;
use crate::types::db::role_change_request;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleChangeStatus {
    Pending,
    Approved,
    Rejected,
}

impl RoleChangeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for RoleChangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleChangeStatus {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(InternalError::parse("RoleChangeStatus", format!("unknown status '{}'", other))),
        }
    }
}

/// Admin verdict on a pending role change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleDecision {
    Approve,
    Reject,
}

impl RoleDecision {
    pub fn resulting_status(&self) -> RoleChangeStatus {
        match self {
            Self::Approve => RoleChangeStatus::Approved,
            Self::Reject => RoleChangeStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoleChangeRequest {
    pub id: String,
    pub user_id: String,
    pub current_role: Role,
    pub requested_role: Role,
    pub reason: Option<String>,
    pub status: RoleChangeStatus,
    pub requested_at: i64,
    pub reviewed_at: Option<i64>,
    pub reviewed_by_id: Option<String>,
}

impl TryFrom<role_change_request::Model> for RoleChangeRequest {
    type Error = InternalError;

    fn try_from(m: role_change_request::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            current_role: m.current_role.parse()?,
            requested_role: m.requested_role.parse()?,
            status: m.status.parse()?,
            id: m.id,
            user_id: m.user_id,
            reason: m.reason,
            requested_at: m.requested_at,
            reviewed_at: m.reviewed_at,
            reviewed_by_id: m.reviewed_by_id,
        })
    }
}
