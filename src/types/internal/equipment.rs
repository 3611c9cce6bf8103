use super::identity::Clearance;
use crate::errors::InternalError;
use crate::types::db::{equipment, equipment_permission};

/// The slice of a catalog item the policies read
#[derive(Debug, Clone, PartialEq)]
pub struct Equipment {
    pub id: String,
    pub name: String,
    pub sensitivity: Clearance,
    pub owner_id: Option<String>,
}

impl Equipment {
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id.as_deref() == Some(user_id)
    }
}

impl TryFrom<equipment::Model> for Equipment {
    type Error = InternalError;

    fn try_from(m: equipment::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            sensitivity: m.sensitivity.parse()?,
            id: m.id,
            name: m.name,
            owner_id: m.owner_id,
        })
    }
}

/// Per-resource DAC grant, one per (equipment, user) pair
#[derive(Debug, Clone, PartialEq)]
pub struct EquipmentPermission {
    pub equipment_id: String,
    pub user_id: String,
    pub can_edit: bool,
    pub can_delete: bool,
    pub granted_by_id: String,
}

impl From<equipment_permission::Model> for EquipmentPermission {
    fn from(m: equipment_permission::Model) -> Self {
        Self {
            equipment_id: m.equipment_id,
            user_id: m.user_id,
            can_edit: m.can_edit,
            can_delete: m.can_delete,
            granted_by_id: m.granted_by_id,
        }
    }
}

/// Rights requested when granting a permission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionRights {
    pub can_edit: bool,
    pub can_delete: bool,
}
