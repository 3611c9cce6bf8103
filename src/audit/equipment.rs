use super::AuditLogger;
use crate::errors::InternalError;
use crate::types::internal::audit::EventType;
use crate::types::internal::context::RequestContext;
use crate::types::internal::equipment::{Equipment, EquipmentPermission};

impl AuditLogger {
    pub async fn log_equipment_registered(
        &self,
        ctx: &RequestContext,
        owner_id: &str,
        owner_username: &str,
        equipment: &Equipment,
    ) -> Result<(), InternalError> {
        self.builder(EventType::EquipmentRegistered)
            .with_context(ctx)
            .user_id(owner_id)
            .action(format!(
                "Created equipment {} (Owner: {})",
                equipment.name, owner_username
            ))
            .write()
            .await
    }

    pub async fn log_equipment_updated(
        &self,
        ctx: &RequestContext,
        actor_id: &str,
        equipment: &Equipment,
    ) -> Result<(), InternalError> {
        self.builder(EventType::EquipmentUpdated)
            .with_context(ctx)
            .user_id(actor_id)
            .action(format!("Updated equipment {}", equipment.name))
            .write()
            .await
    }

    pub async fn log_equipment_deleted(
        &self,
        ctx: &RequestContext,
        actor_id: &str,
        equipment_id: &str,
    ) -> Result<(), InternalError> {
        self.builder(EventType::EquipmentDeleted)
            .with_context(ctx)
            .user_id(actor_id)
            .action(format!("Deleted equipment ID {}", equipment_id))
            .write()
            .await
    }

    pub async fn log_permission_granted(
        &self,
        ctx: &RequestContext,
        actor_id: &str,
        equipment: &Equipment,
        target_username: &str,
        permission: &EquipmentPermission,
    ) -> Result<(), InternalError> {
        self.builder(EventType::PermissionGranted)
            .with_context(ctx)
            .user_id(actor_id)
            .action(format!(
                "Granted permission on equipment \"{}\" to {} (Edit: {}, Delete: {})",
                equipment.name, target_username, permission.can_edit, permission.can_delete
            ))
            .write()
            .await
    }

    pub async fn log_permission_revoked(
        &self,
        ctx: &RequestContext,
        actor_id: &str,
        equipment: &Equipment,
        target_username: &str,
    ) -> Result<(), InternalError> {
        self.builder(EventType::PermissionRevoked)
            .with_context(ctx)
            .user_id(actor_id)
            .action(format!(
                "Revoked permission on equipment \"{}\" from {}",
                equipment.name, target_username
            ))
            .write()
            .await
    }
}
