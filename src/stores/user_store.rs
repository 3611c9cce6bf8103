use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::errors::InternalError;
use crate::types::db::user::{self, ActiveModel, Entity as UserEntity};
use crate::types::internal::identity::{Clearance, Role};
use crate::types::internal::login::LoginState;
use crate::types::internal::user::User;

/// Repository for user accounts
#[derive(Debug, Default)]
pub struct UserStore;

impl UserStore {
    pub fn new() -> Self {
        Self
    }

    pub async fn create_user(
        &self,
        conn: &impl ConnectionTrait,
        username: &str,
        password_hash: String,
        role: Role,
        clearance: Clearance,
        now: i64,
    ) -> Result<User, InternalError> {
        let model = ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            username: Set(username.to_string()),
            password_hash: Set(password_hash),
            role: Set(role.as_str().to_string()),
            clearance: Set(clearance.as_str().to_string()),
            failed_login_count: Set(0),
            locked_until: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(conn)
        .await
        .map_err(|e| InternalError::database("create_user", e))?;

        User::try_from(model)
    }

    pub async fn get_user(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
    ) -> Result<Option<User>, InternalError> {
        UserEntity::find_by_id(user_id.to_string())
            .one(conn)
            .await
            .map_err(|e| InternalError::database("get_user", e))?
            .map(User::try_from)
            .transpose()
    }

    /// Look up a user together with the stored password hash
    pub async fn get_credentials(
        &self,
        conn: &impl ConnectionTrait,
        username: &str,
    ) -> Result<Option<(User, String)>, InternalError> {
        let model = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(conn)
            .await
            .map_err(|e| InternalError::database("get_credentials", e))?;

        match model {
            Some(model) => {
                let hash = model.password_hash.clone();
                Ok(Some((User::try_from(model)?, hash)))
            }
            None => Ok(None),
        }
    }

    pub async fn get_password_hash(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
    ) -> Result<Option<String>, InternalError> {
        let model = UserEntity::find_by_id(user_id.to_string())
            .one(conn)
            .await
            .map_err(|e| InternalError::database("get_password_hash", e))?;
        Ok(model.map(|m| m.password_hash))
    }

    pub async fn set_password_hash(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
        password_hash: String,
        now: i64,
    ) -> Result<bool, InternalError> {
        let result = UserEntity::update_many()
            .col_expr(user::Column::PasswordHash, Expr::value(password_hash))
            .col_expr(user::Column::UpdatedAt, Expr::value(now))
            .filter(user::Column::Id.eq(user_id))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("set_password_hash", e))?;
        Ok(result.rows_affected == 1)
    }

    pub async fn username_exists(
        &self,
        conn: &impl ConnectionTrait,
        username: &str,
    ) -> Result<bool, InternalError> {
        let found = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(conn)
            .await
            .map_err(|e| InternalError::database("check_username", e))?;
        Ok(found.is_some())
    }

    pub async fn list_users(&self, conn: &impl ConnectionTrait) -> Result<Vec<User>, InternalError> {
        UserEntity::find()
            .order_by_asc(user::Column::Username)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("list_users", e))?
            .into_iter()
            .map(User::try_from)
            .collect()
    }

    /// Compare-and-swap of the lockout counters
    ///
    /// Writes `next` only if the row still holds `expected`. Returns false when
    /// another attempt changed the counters first.
    pub async fn swap_login_state(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
        expected: &LoginState,
        next: &LoginState,
        now: i64,
    ) -> Result<bool, InternalError> {
        let locked_guard = match expected.locked_until {
            Some(until) => user::Column::LockedUntil.eq(until),
            None => user::Column::LockedUntil.is_null(),
        };

        let result = UserEntity::update_many()
            .col_expr(
                user::Column::FailedLoginCount,
                Expr::value(next.failed_login_count as i32),
            )
            .col_expr(user::Column::LockedUntil, Expr::value(next.locked_until))
            .col_expr(user::Column::UpdatedAt, Expr::value(now))
            .filter(user::Column::Id.eq(user_id))
            .filter(user::Column::FailedLoginCount.eq(expected.failed_login_count as i32))
            .filter(locked_guard)
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("swap_login_state", e))?;

        Ok(result.rows_affected == 1)
    }

    pub async fn set_role(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
        role: Role,
        now: i64,
    ) -> Result<bool, InternalError> {
        let result = UserEntity::update_many()
            .col_expr(user::Column::Role, Expr::value(role.as_str()))
            .col_expr(user::Column::UpdatedAt, Expr::value(now))
            .filter(user::Column::Id.eq(user_id))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("set_role", e))?;
        Ok(result.rows_affected == 1)
    }

    pub async fn set_role_and_clearance(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
        role: Role,
        clearance: Clearance,
        now: i64,
    ) -> Result<bool, InternalError> {
        let result = UserEntity::update_many()
            .col_expr(user::Column::Role, Expr::value(role.as_str()))
            .col_expr(user::Column::Clearance, Expr::value(clearance.as_str()))
            .col_expr(user::Column::UpdatedAt, Expr::value(now))
            .filter(user::Column::Id.eq(user_id))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("set_role_and_clearance", e))?;
        Ok(result.rows_affected == 1)
    }

    pub async fn delete_user(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
    ) -> Result<bool, InternalError> {
        let result = UserEntity::delete_by_id(user_id.to_string())
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("delete_user", e))?;
        Ok(result.rows_affected == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::setup_test_lending_db;

    const NOW: i64 = 1_700_000_000;

    #[tokio::test]
    async fn test_create_and_fetch_user() {
        let db = setup_test_lending_db().await;
        let store = UserStore::new();

        let created = store
            .create_user(&db, "alice", "hash".to_string(), Role::Employee, Clearance::Public, NOW)
            .await
            .unwrap();

        let fetched = store.get_user(&db, &created.id).await.unwrap().unwrap();
        assert_eq!(fetched.username, "alice");
        assert_eq!(fetched.role, Role::Employee);
        assert_eq!(fetched.failed_login_count, 0);

        let (user, hash) = store.get_credentials(&db, "alice").await.unwrap().unwrap();
        assert_eq!(user.id, created.id);
        assert_eq!(hash, "hash");
        assert!(store.username_exists(&db, "alice").await.unwrap());
        assert!(!store.username_exists(&db, "bob").await.unwrap());
    }

    #[tokio::test]
    async fn test_swap_login_state_only_applies_once() {
        let db = setup_test_lending_db().await;
        let store = UserStore::new();
        let user = store
            .create_user(&db, "alice", "hash".to_string(), Role::Employee, Clearance::Public, NOW)
            .await
            .unwrap();

        let expected = LoginState { failed_login_count: 0, locked_until: None };
        let next = LoginState { failed_login_count: 1, locked_until: None };

        assert!(store.swap_login_state(&db, &user.id, &expected, &next, NOW).await.unwrap());
        // Second writer still holding the stale read loses
        assert!(!store.swap_login_state(&db, &user.id, &expected, &next, NOW).await.unwrap());

        let locked = LoginState { failed_login_count: 0, locked_until: Some(NOW + 120) };
        assert!(store.swap_login_state(&db, &user.id, &next, &locked, NOW).await.unwrap());

        let fetched = store.get_user(&db, &user.id).await.unwrap().unwrap();
        assert_eq!(fetched.failed_login_count, 0);
        assert_eq!(fetched.locked_until, Some(NOW + 120));
    }

    #[tokio::test]
    async fn test_password_hash_replace() {
        let db = setup_test_lending_db().await;
        let store = UserStore::new();
        let user = store
            .create_user(&db, "alice", "old".to_string(), Role::Employee, Clearance::Public, NOW)
            .await
            .unwrap();

        assert!(store.set_password_hash(&db, &user.id, "new".to_string(), NOW + 1).await.unwrap());
        assert_eq!(
            store.get_password_hash(&db, &user.id).await.unwrap().as_deref(),
            Some("new")
        );
        assert!(store.get_password_hash(&db, "missing").await.unwrap().is_none());
        assert!(!store.set_password_hash(&db, "missing", "x".to_string(), NOW).await.unwrap());
    }

    #[tokio::test]
    async fn test_set_role_and_delete() {
        let db = setup_test_lending_db().await;
        let store = UserStore::new();
        let user = store
            .create_user(&db, "alice", "hash".to_string(), Role::Employee, Clearance::Public, NOW)
            .await
            .unwrap();

        assert!(store
            .set_role_and_clearance(&db, &user.id, Role::Manager, Clearance::Secret, NOW)
            .await
            .unwrap());
        let fetched = store.get_user(&db, &user.id).await.unwrap().unwrap();
        assert_eq!(fetched.role, Role::Manager);
        assert_eq!(fetched.clearance, Clearance::Secret);

        assert!(store.delete_user(&db, &user.id).await.unwrap());
        assert!(store.get_user(&db, &user.id).await.unwrap().is_none());
        assert!(!store.set_role(&db, &user.id, Role::Admin, NOW).await.unwrap());
    }
}
