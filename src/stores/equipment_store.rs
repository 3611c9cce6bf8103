use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::errors::InternalError;
use crate::types::db::equipment::{self, Entity as EquipmentEntity};
use crate::types::db::equipment_permission::{self, Entity as PermissionEntity};
use crate::types::internal::equipment::{Equipment, EquipmentPermission, PermissionRights};
use crate::types::internal::identity::Clearance;

/// Repository for equipment and per-equipment permission grants
#[derive(Debug, Default)]
pub struct EquipmentStore;

impl EquipmentStore {
    pub fn new() -> Self {
        Self
    }

    pub async fn create_equipment(
        &self,
        conn: &impl ConnectionTrait,
        name: &str,
        sensitivity: Clearance,
        owner_id: &str,
        now: i64,
    ) -> Result<Equipment, InternalError> {
        let model = equipment::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            name: Set(name.to_string()),
            sensitivity: Set(sensitivity.as_str().to_string()),
            owner_id: Set(Some(owner_id.to_string())),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(conn)
        .await
        .map_err(|e| InternalError::database("create_equipment", e))?;

        Equipment::try_from(model)
    }

    pub async fn get_equipment(
        &self,
        conn: &impl ConnectionTrait,
        equipment_id: &str,
    ) -> Result<Option<Equipment>, InternalError> {
        EquipmentEntity::find_by_id(equipment_id.to_string())
            .one(conn)
            .await
            .map_err(|e| InternalError::database("get_equipment", e))?
            .map(Equipment::try_from)
            .transpose()
    }

    pub async fn list_equipment(
        &self,
        conn: &impl ConnectionTrait,
    ) -> Result<Vec<Equipment>, InternalError> {
        EquipmentEntity::find()
            .order_by_asc(equipment::Column::Name)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("list_equipment", e))?
            .into_iter()
            .map(Equipment::try_from)
            .collect()
    }

    /// Update name and/or sensitivity; `None` leaves the column unchanged
    pub async fn update_equipment(
        &self,
        conn: &impl ConnectionTrait,
        equipment_id: &str,
        name: Option<&str>,
        sensitivity: Option<Clearance>,
        now: i64,
    ) -> Result<Option<Equipment>, InternalError> {
        let Some(model) = EquipmentEntity::find_by_id(equipment_id.to_string())
            .one(conn)
            .await
            .map_err(|e| InternalError::database("get_equipment_for_update", e))?
        else {
            return Ok(None);
        };

        let mut active: equipment::ActiveModel = model.into();
        if let Some(name) = name {
            active.name = Set(name.to_string());
        }
        if let Some(sensitivity) = sensitivity {
            active.sensitivity = Set(sensitivity.as_str().to_string());
        }
        active.updated_at = Set(now);

        let updated = active
            .update(conn)
            .await
            .map_err(|e| InternalError::database("update_equipment", e))?;
        Equipment::try_from(updated).map(Some)
    }

    pub async fn delete_equipment(
        &self,
        conn: &impl ConnectionTrait,
        equipment_id: &str,
    ) -> Result<bool, InternalError> {
        let result = EquipmentEntity::delete_by_id(equipment_id.to_string())
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("delete_equipment", e))?;
        Ok(result.rows_affected == 1)
    }

    /// Null the owner of every item owned by a user
    pub async fn clear_owner(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
    ) -> Result<u64, InternalError> {
        let result = EquipmentEntity::update_many()
            .col_expr(equipment::Column::OwnerId, Expr::value(Option::<String>::None))
            .filter(equipment::Column::OwnerId.eq(user_id))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("clear_equipment_owner", e))?;
        Ok(result.rows_affected)
    }

    pub async fn get_permission(
        &self,
        conn: &impl ConnectionTrait,
        equipment_id: &str,
        user_id: &str,
    ) -> Result<Option<EquipmentPermission>, InternalError> {
        let model = PermissionEntity::find_by_id((equipment_id.to_string(), user_id.to_string()))
            .one(conn)
            .await
            .map_err(|e| InternalError::database("get_permission", e))?;
        Ok(model.map(EquipmentPermission::from))
    }

    /// Insert or replace the grant for one (equipment, user) pair
    ///
    /// An existing row keeps its `granted_by_id` and gets the new rights.
    pub async fn upsert_permission(
        &self,
        conn: &impl ConnectionTrait,
        equipment_id: &str,
        user_id: &str,
        rights: PermissionRights,
        granted_by_id: &str,
        now: i64,
    ) -> Result<EquipmentPermission, InternalError> {
        let model = equipment_permission::ActiveModel {
            equipment_id: Set(equipment_id.to_string()),
            user_id: Set(user_id.to_string()),
            can_edit: Set(rights.can_edit),
            can_delete: Set(rights.can_delete),
            granted_by_id: Set(granted_by_id.to_string()),
            created_at: Set(now),
        };

        PermissionEntity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    equipment_permission::Column::EquipmentId,
                    equipment_permission::Column::UserId,
                ])
                .update_columns([
                    equipment_permission::Column::CanEdit,
                    equipment_permission::Column::CanDelete,
                ])
                .to_owned(),
            )
            .exec_without_returning(conn)
            .await
            .map_err(|e| InternalError::database("upsert_permission", e))?;

        self.get_permission(conn, equipment_id, user_id)
            .await?
            .ok_or_else(|| {
                InternalError::database(
                    "upsert_permission",
                    sea_orm::DbErr::RecordNotFound("permission missing after upsert".to_string()),
                )
            })
    }

    pub async fn delete_permission(
        &self,
        conn: &impl ConnectionTrait,
        equipment_id: &str,
        user_id: &str,
    ) -> Result<bool, InternalError> {
        let result = PermissionEntity::delete_by_id((equipment_id.to_string(), user_id.to_string()))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("delete_permission", e))?;
        Ok(result.rows_affected == 1)
    }

    pub async fn list_permissions(
        &self,
        conn: &impl ConnectionTrait,
        equipment_id: &str,
    ) -> Result<Vec<EquipmentPermission>, InternalError> {
        let models = PermissionEntity::find()
            .filter(equipment_permission::Column::EquipmentId.eq(equipment_id))
            .order_by_asc(equipment_permission::Column::CreatedAt)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("list_permissions", e))?;
        Ok(models.into_iter().map(EquipmentPermission::from).collect())
    }

    pub async fn delete_permissions_for_equipment(
        &self,
        conn: &impl ConnectionTrait,
        equipment_id: &str,
    ) -> Result<u64, InternalError> {
        let result = PermissionEntity::delete_many()
            .filter(equipment_permission::Column::EquipmentId.eq(equipment_id))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("delete_equipment_permissions", e))?;
        Ok(result.rows_affected)
    }

    /// Remove grants held by or issued by a user
    pub async fn delete_permissions_for_user(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
    ) -> Result<u64, InternalError> {
        let result = PermissionEntity::delete_many()
            .filter(
                equipment_permission::Column::UserId
                    .eq(user_id)
                    .or(equipment_permission::Column::GrantedById.eq(user_id)),
            )
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("delete_user_permissions", e))?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::{create_test_user, setup_test_lending_db};
    use crate::types::internal::identity::Role;

    const NOW: i64 = 1_700_000_000;

    #[tokio::test]
    async fn test_permission_upsert_replaces_rights() {
        let db = setup_test_lending_db().await;
        let store = EquipmentStore::new();
        let owner = create_test_user(&db, "owner", Role::Manager, Clearance::Secret).await;
        let grantee = create_test_user(&db, "grantee", Role::Employee, Clearance::Public).await;
        let eq = store
            .create_equipment(&db, "Laser cutter", Clearance::Secret, &owner.id, NOW)
            .await
            .unwrap();

        store
            .upsert_permission(&db, &eq.id, &grantee.id, PermissionRights { can_edit: true, can_delete: false }, &owner.id, NOW)
            .await
            .unwrap();
        let second = store
            .upsert_permission(&db, &eq.id, &grantee.id, PermissionRights { can_edit: false, can_delete: true }, &owner.id, NOW + 5)
            .await
            .unwrap();

        assert!(!second.can_edit);
        assert!(second.can_delete);

        let all = store.list_permissions(&db, &eq.id).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], second);
    }

    #[tokio::test]
    async fn test_update_equipment_partial() {
        let db = setup_test_lending_db().await;
        let store = EquipmentStore::new();
        let owner = create_test_user(&db, "owner", Role::Manager, Clearance::Secret).await;
        let eq = store
            .create_equipment(&db, "Drill", Clearance::Public, &owner.id, NOW)
            .await
            .unwrap();

        let updated = store
            .update_equipment(&db, &eq.id, None, Some(Clearance::Confidential), NOW + 1)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Drill");
        assert_eq!(updated.sensitivity, Clearance::Confidential);

        assert!(store
            .update_equipment(&db, "missing", Some("x"), None, NOW)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_clear_owner_keeps_equipment() {
        let db = setup_test_lending_db().await;
        let store = EquipmentStore::new();
        let owner = create_test_user(&db, "owner", Role::Manager, Clearance::Secret).await;
        let eq = store
            .create_equipment(&db, "Drill", Clearance::Public, &owner.id, NOW)
            .await
            .unwrap();

        assert_eq!(store.clear_owner(&db, &owner.id).await.unwrap(), 1);
        let fetched = store.get_equipment(&db, &eq.id).await.unwrap().unwrap();
        assert!(fetched.owner_id.is_none());
    }
}
