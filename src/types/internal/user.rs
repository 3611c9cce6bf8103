use super::identity::{Clearance, Identity, Role};
use crate::errors::InternalError;
use crate::types::db::user;

/// User row as seen by the lending core (password hash excluded)
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub username: String,
    pub role: Role,
    pub clearance: Clearance,
    pub failed_login_count: u32,
    pub locked_until: Option<i64>,
}

impl User {
    pub fn identity(&self) -> Identity {
        Identity::new(self.id.clone(), self.role, self.clearance)
    }
}

impl TryFrom<user::Model> for User {
    type Error = InternalError;

    fn try_from(m: user::Model) -> Result<Self, Self::Error> {
        let failed_login_count = u32::try_from(m.failed_login_count)
            .map_err(|_| InternalError::parse("failed_login_count", m.failed_login_count.to_string()))?;
        Ok(Self {
            role: m.role.parse()?,
            clearance: m.clearance.parse()?,
            id: m.id,
            username: m.username,
            failed_login_count,
            locked_until: m.locked_until,
        })
    }
}
