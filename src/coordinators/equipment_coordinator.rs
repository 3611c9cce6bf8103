use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::AppData;
use crate::audit::{AuditLogger, best_effort};
use crate::config::database::{begin_transaction, commit_transaction};
use crate::errors::WorkflowError;
use crate::providers::{AuthorizationProvider, Clock};
use crate::stores::{BorrowStore, EquipmentStore, UserStore};
use crate::types::internal::context::RequestContext;
use crate::types::internal::equipment::{Equipment, EquipmentPermission, PermissionRights};
use crate::types::internal::identity::Clearance;

/// Equipment catalog and per-item grants (DAC)
pub struct EquipmentCoordinator {
    db: DatabaseConnection,
    clock: Arc<dyn Clock>,
    audit_logger: Arc<AuditLogger>,
    user_store: Arc<UserStore>,
    equipment_store: Arc<EquipmentStore>,
    borrow_store: Arc<BorrowStore>,
    authorization: AuthorizationProvider,
}

impl EquipmentCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            db: app_data.connections.lending.clone(),
            clock: Arc::clone(&app_data.clock),
            audit_logger: Arc::clone(&app_data.audit_logger),
            user_store: Arc::clone(&app_data.user_store),
            equipment_store: Arc::clone(&app_data.equipment_store),
            borrow_store: Arc::clone(&app_data.borrow_store),
            authorization: app_data.authorization,
        }
    }

    async fn load_equipment(&self, equipment_id: &str) -> Result<Equipment, WorkflowError> {
        self.equipment_store
            .get_equipment(&self.db, equipment_id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("Equipment", equipment_id))
    }

    async fn username_of(&self, user_id: &str) -> Result<String, WorkflowError> {
        Ok(self
            .user_store
            .get_user(&self.db, user_id)
            .await?
            .map(|u| u.username)
            .unwrap_or_else(|| user_id.to_string()))
    }

    /// Register a new item owned by the caller
    pub async fn register_equipment(
        &self,
        ctx: &RequestContext,
        name: &str,
        sensitivity: Clearance,
    ) -> Result<Equipment, WorkflowError> {
        let caller = ctx.caller()?;
        self.authorization
            .can_register_equipment(caller)
            .into_result()?;

        let name = validate_name(name)?;
        let equipment = self
            .equipment_store
            .create_equipment(&self.db, name, sensitivity, &caller.id, self.clock.timestamp())
            .await?;

        tracing::info!(equipment_id = %equipment.id, owner_id = %caller.id, "Equipment registered");
        let owner_username = self.username_of(&caller.id).await?;
        best_effort(
            self.audit_logger
                .log_equipment_registered(ctx, &caller.id, &owner_username, &equipment)
                .await,
            "equipment registration audit entry",
        );
        Ok(equipment)
    }

    pub async fn get_equipment(
        &self,
        ctx: &RequestContext,
        equipment_id: &str,
    ) -> Result<Equipment, WorkflowError> {
        ctx.caller()?;
        self.load_equipment(equipment_id).await
    }

    pub async fn list_equipment(&self, ctx: &RequestContext) -> Result<Vec<Equipment>, WorkflowError> {
        ctx.caller()?;
        Ok(self.equipment_store.list_equipment(&self.db).await?)
    }

    /// Owner, admin, or a grant with `can_edit`
    pub async fn update_equipment(
        &self,
        ctx: &RequestContext,
        equipment_id: &str,
        name: Option<&str>,
        sensitivity: Option<Clearance>,
    ) -> Result<Equipment, WorkflowError> {
        let caller = ctx.caller()?;
        let equipment = self.load_equipment(equipment_id).await?;
        let permission = self
            .equipment_store
            .get_permission(&self.db, &equipment.id, &caller.id)
            .await?;

        let grant = self
            .authorization
            .can_edit_equipment(caller, &equipment, permission.as_ref())
            .into_result()
            .inspect_err(|reason| {
                tracing::warn!(equipment_id = %equipment.id, user_id = %caller.id, reason = %reason, "Equipment edit denied");
            })?;

        let name = name.map(validate_name).transpose()?;
        let updated = self
            .equipment_store
            .update_equipment(&self.db, &equipment.id, name, sensitivity, self.clock.timestamp())
            .await?
            .ok_or_else(|| WorkflowError::not_found("Equipment", equipment_id))?;

        tracing::info!(equipment_id = %updated.id, user_id = %caller.id, grant = %grant, "Equipment updated");
        best_effort(
            self.audit_logger
                .log_equipment_updated(ctx, &caller.id, &updated)
                .await,
            "equipment update audit entry",
        );
        Ok(updated)
    }

    /// Owner, admin, or a grant with `can_delete`
    ///
    /// Borrow requests and grants on the item are removed with it.
    pub async fn delete_equipment(&self, ctx: &RequestContext, equipment_id: &str) -> Result<(), WorkflowError> {
        let caller = ctx.caller()?;
        let equipment = self.load_equipment(equipment_id).await?;
        let permission = self
            .equipment_store
            .get_permission(&self.db, &equipment.id, &caller.id)
            .await?;

        let grant = self
            .authorization
            .can_delete_equipment(caller, &equipment, permission.as_ref())
            .into_result()
            .inspect_err(|reason| {
                tracing::warn!(equipment_id = %equipment.id, user_id = %caller.id, reason = %reason, "Equipment delete denied");
            })?;

        let txn = begin_transaction(&self.db).await?;
        let requests = self.borrow_store.delete_for_equipment(&txn, &equipment.id).await?;
        let grants = self
            .equipment_store
            .delete_permissions_for_equipment(&txn, &equipment.id)
            .await?;
        if !self.equipment_store.delete_equipment(&txn, &equipment.id).await? {
            return Err(WorkflowError::not_found("Equipment", equipment_id));
        }
        commit_transaction(txn).await?;

        tracing::info!(
            equipment_id = %equipment.id,
            user_id = %caller.id,
            grant = %grant,
            borrow_requests = requests,
            permissions = grants,
            "Equipment deleted"
        );
        best_effort(
            self.audit_logger
                .log_equipment_deleted(ctx, &caller.id, &equipment.id)
                .await,
            "equipment delete audit entry",
        );
        Ok(())
    }

    /// Create or replace a user's grant on an item
    ///
    /// An existing grant keeps its original grantor; only the rights change.
    pub async fn grant_permission(
        &self,
        ctx: &RequestContext,
        equipment_id: &str,
        target_user_id: &str,
        rights: PermissionRights,
    ) -> Result<EquipmentPermission, WorkflowError> {
        let caller = ctx.caller()?;
        let equipment = self.load_equipment(equipment_id).await?;
        self.authorization
            .can_grant_or_revoke_permission(caller, &equipment, target_user_id)
            .into_result()?;

        let target = self
            .user_store
            .get_user(&self.db, target_user_id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("User", target_user_id))?;

        let permission = self
            .equipment_store
            .upsert_permission(
                &self.db,
                &equipment.id,
                &target.id,
                rights,
                &caller.id,
                self.clock.timestamp(),
            )
            .await?;

        tracing::info!(
            equipment_id = %equipment.id,
            target_user_id = %target.id,
            can_edit = permission.can_edit,
            can_delete = permission.can_delete,
            "Permission granted"
        );
        best_effort(
            self.audit_logger
                .log_permission_granted(ctx, &caller.id, &equipment, &target.username, &permission)
                .await,
            "permission grant audit entry",
        );
        Ok(permission)
    }

    pub async fn revoke_permission(
        &self,
        ctx: &RequestContext,
        equipment_id: &str,
        target_user_id: &str,
    ) -> Result<(), WorkflowError> {
        let caller = ctx.caller()?;
        let equipment = self.load_equipment(equipment_id).await?;
        self.authorization
            .can_grant_or_revoke_permission(caller, &equipment, target_user_id)
            .into_result()?;

        if !self
            .equipment_store
            .delete_permission(&self.db, &equipment.id, target_user_id)
            .await?
        {
            return Err(WorkflowError::not_found(
                "EquipmentPermission",
                format!("{}/{}", equipment.id, target_user_id),
            ));
        }

        tracing::info!(equipment_id = %equipment.id, target_user_id, "Permission revoked");
        let target_username = self.username_of(target_user_id).await?;
        best_effort(
            self.audit_logger
                .log_permission_revoked(ctx, &caller.id, &equipment, &target_username)
                .await,
            "permission revoke audit entry",
        );
        Ok(())
    }

    /// Grants on an item; visible to its owner and admins
    pub async fn list_permissions(
        &self,
        ctx: &RequestContext,
        equipment_id: &str,
    ) -> Result<Vec<EquipmentPermission>, WorkflowError> {
        let caller = ctx.caller()?;
        let equipment = self.load_equipment(equipment_id).await?;
        self.authorization
            .can_view_permissions(caller, &equipment)
            .into_result()?;
        Ok(self
            .equipment_store
            .list_permissions(&self.db, &equipment.id)
            .await?)
    }
}

fn validate_name(name: &str) -> Result<&str, WorkflowError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(WorkflowError::invalid("name", "must not be empty"));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::{create_test_user, setup_test_app_data};
    use crate::types::internal::access::DenyReason;
    use crate::types::internal::identity::Role;
    use crate::types::internal::user::User;

    fn ctx_for(user: &User) -> RequestContext {
        RequestContext::new().with_identity(user.identity())
    }

    #[tokio::test]
    async fn test_only_privileged_roles_register() {
        let (app_data, _clock, _notifier) = setup_test_app_data().await;
        let db = &app_data.connections.lending;
        let manager = create_test_user(db, "mia", Role::Manager, Clearance::Secret).await;
        let employee = create_test_user(db, "ed", Role::Employee, Clearance::Secret).await;
        let coordinator = EquipmentCoordinator::new(app_data.clone());

        let err = coordinator
            .register_equipment(&ctx_for(&employee), "Drill", Clearance::Public)
            .await
            .unwrap_err();
        assert_eq!(err.reason(), Some(DenyReason::NotOwnerNorAdmin));

        let err = coordinator
            .register_equipment(&ctx_for(&manager), "   ", Clearance::Public)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Invalid { .. }));

        let item = coordinator
            .register_equipment(&ctx_for(&manager), "Drill", Clearance::Public)
            .await
            .unwrap();
        assert_eq!(item.owner_id.as_deref(), Some(manager.id.as_str()));

        let entries = app_data.audit_logger.recent_entries(1).await.unwrap();
        assert_eq!(entries[0].action, "Created equipment Drill (Owner: mia)");
    }

    #[tokio::test]
    async fn test_grant_edit_but_not_delete() {
        let (app_data, _clock, _notifier) = setup_test_app_data().await;
        let db = &app_data.connections.lending;
        let owner = create_test_user(db, "olga", Role::Manager, Clearance::Secret).await;
        let helper = create_test_user(db, "hank", Role::Employee, Clearance::Public).await;
        let coordinator = EquipmentCoordinator::new(app_data.clone());

        let item = coordinator
            .register_equipment(&ctx_for(&owner), "Microscope", Clearance::Confidential)
            .await
            .unwrap();

        let err = coordinator
            .update_equipment(&ctx_for(&helper), &item.id, Some("Scope"), None)
            .await
            .unwrap_err();
        assert_eq!(err.reason(), Some(DenyReason::NotOwnerNorAdmin));

        coordinator
            .grant_permission(
                &ctx_for(&owner),
                &item.id,
                &helper.id,
                PermissionRights { can_edit: true, can_delete: false },
            )
            .await
            .unwrap();

        let updated = coordinator
            .update_equipment(&ctx_for(&helper), &item.id, Some("Scope"), None)
            .await
            .unwrap();
        assert_eq!(updated.name, "Scope");
        assert_eq!(updated.sensitivity, Clearance::Confidential);

        let err = coordinator
            .delete_equipment(&ctx_for(&helper), &item.id)
            .await
            .unwrap_err();
        assert_eq!(err.reason(), Some(DenyReason::NoExplicitGrant));
    }

    #[tokio::test]
    async fn test_self_grant_and_unknown_target() {
        let (app_data, _clock, _notifier) = setup_test_app_data().await;
        let db = &app_data.connections.lending;
        let owner = create_test_user(db, "olga", Role::Manager, Clearance::Secret).await;
        let coordinator = EquipmentCoordinator::new(app_data.clone());
        let item = coordinator
            .register_equipment(&ctx_for(&owner), "Lathe", Clearance::Public)
            .await
            .unwrap();
        let rights = PermissionRights { can_edit: true, can_delete: true };

        let err = coordinator
            .grant_permission(&ctx_for(&owner), &item.id, &owner.id, rights)
            .await
            .unwrap_err();
        assert_eq!(err.reason(), Some(DenyReason::SelfActionForbidden));

        let err = coordinator
            .grant_permission(&ctx_for(&owner), &item.id, "no-such-user", rights)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound { entity: "User", .. }));

        let err = coordinator
            .revoke_permission(&ctx_for(&owner), &item.id, "no-such-user")
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound { entity: "EquipmentPermission", .. }));
    }

    #[tokio::test]
    async fn test_delete_cascades_requests_and_grants() {
        let (app_data, _clock, _notifier) = setup_test_app_data().await;
        let db = &app_data.connections.lending;
        let owner = create_test_user(db, "olga", Role::Manager, Clearance::Secret).await;
        let borrower = create_test_user(db, "bea", Role::Employee, Clearance::Public).await;
        let coordinator = EquipmentCoordinator::new(app_data.clone());
        let item = coordinator
            .register_equipment(&ctx_for(&owner), "Saw", Clearance::Public)
            .await
            .unwrap();

        coordinator
            .grant_permission(
                &ctx_for(&owner),
                &item.id,
                &borrower.id,
                PermissionRights { can_edit: false, can_delete: false },
            )
            .await
            .unwrap();
        let request = app_data
            .borrow_store
            .create_request(db, &borrower.id, &item.id, 1)
            .await
            .unwrap();

        coordinator.delete_equipment(&ctx_for(&owner), &item.id).await.unwrap();

        assert!(app_data.equipment_store.get_equipment(db, &item.id).await.unwrap().is_none());
        assert!(app_data.borrow_store.get_request(db, &request.id).await.unwrap().is_none());
        assert!(
            app_data
                .equipment_store
                .list_permissions(db, &item.id)
                .await
                .unwrap()
                .is_empty()
        );
        let entries = app_data.audit_logger.recent_entries(1).await.unwrap();
        assert_eq!(entries[0].action, format!("Deleted equipment ID {}", item.id));
    }
}
