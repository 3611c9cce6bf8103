use std::fmt;
use std::str::FromStr;

use crate::errors::InternalError;
use crate::types::db::borrow_request;

/// Borrow request lifecycle: `Pending -> Approved -> Returned`.
///
/// A request that is never approved stays `Pending`; denial leaves no row change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorrowStatus {
    Pending,
    Approved,
    Returned,
}

impl BorrowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Returned => "returned",
        }
    }
}

impl fmt::Display for BorrowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BorrowStatus {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "returned" => Ok(Self::Returned),
            other => Err(InternalError::parse("BorrowStatus", format!("unknown status '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BorrowRequest {
    pub id: String,
    pub user_id: String,
    pub equipment_id: String,
    pub status: BorrowStatus,
    pub approved_by_id: Option<String>,
    pub approved_at: Option<i64>,
    pub returned_at: Option<i64>,
    pub created_at: i64,
}

impl TryFrom<borrow_request::Model> for BorrowRequest {
    type Error = InternalError;

    fn try_from(m: borrow_request::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            status: m.status.parse()?,
            id: m.id,
            user_id: m.user_id,
            equipment_id: m.equipment_id,
            approved_by_id: m.approved_by_id,
            approved_at: m.approved_at,
            returned_at: m.returned_at,
            created_at: m.created_at,
        })
    }
}
