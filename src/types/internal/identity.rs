use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::InternalError;

/// Role assigned to a user (RBAC subject attribute)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Employee,
    Manager,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Employee, Role::Manager, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Manager => "manager",
            Self::Admin => "admin",
        }
    }

    /// Managers and admins may approve borrow requests on any equipment
    pub fn is_privileged(&self) -> bool {
        matches!(self, Self::Manager | Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "employee" => Ok(Self::Employee),
            "manager" => Ok(Self::Manager),
            "admin" => Ok(Self::Admin),
            other => Err(InternalError::parse("Role", format!("unknown role '{}'", other))),
        }
    }
}

/// Clearance / sensitivity level.
///
/// Forms a total order: `Public < Confidential < Secret < TopSecret`. The same
/// scale is used for a user's clearance and for an item's sensitivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Clearance {
    Public = 0,
    Confidential = 1,
    Secret = 2,
    TopSecret = 3,
}

impl Clearance {
    pub const ALL: [Clearance; 4] = [
        Clearance::Public,
        Clearance::Confidential,
        Clearance::Secret,
        Clearance::TopSecret,
    ];

    pub fn rank(&self) -> u8 {
        *self as u8
    }

    /// True iff `self` dominates `need` in the lattice
    pub fn at_least(&self, need: Clearance) -> bool {
        self.rank() >= need.rank()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Confidential => "confidential",
            Self::Secret => "secret",
            Self::TopSecret => "top_secret",
        }
    }
}

impl fmt::Display for Clearance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Public => "Public",
            Self::Confidential => "Confidential",
            Self::Secret => "Secret",
            Self::TopSecret => "Top Secret",
        };
        f.write_str(label)
    }
}

impl FromStr for Clearance {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Self::Public),
            "confidential" => Ok(Self::Confidential),
            "secret" => Ok(Self::Secret),
            "top_secret" => Ok(Self::TopSecret),
            other => Err(InternalError::parse("Clearance", format!("unknown level '{}'", other))),
        }
    }
}

/// Verified caller identity.
///
/// Produced by whatever verifies the session credential upstream; everything in
/// this crate trusts it as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub role: Role,
    pub clearance: Clearance,
}

impl Identity {
    pub fn new(id: impl Into<String>, role: Role, clearance: Clearance) -> Self {
        Self {
            id: id.into(),
            role,
            clearance,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lattice_is_total_order() {
        for have in Clearance::ALL {
            for need in Clearance::ALL {
                assert_eq!(have.at_least(need), have.rank() >= need.rank());
            }
        }
    }

    #[test]
    fn test_top_secret_dominates_everything() {
        assert!(Clearance::ALL.iter().all(|c| Clearance::TopSecret.at_least(*c)));
        assert!(!Clearance::Public.at_least(Clearance::Confidential));
    }

    #[test]
    fn test_role_round_trips_through_storage_text() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn test_clearance_display_uses_human_label() {
        assert_eq!(Clearance::TopSecret.to_string(), "Top Secret");
        assert_eq!("top_secret".parse::<Clearance>().unwrap(), Clearance::TopSecret);
    }
}
