use sea_orm::sea_query::OnConflict;
use sea_orm::{ConnectionTrait, EntityTrait, Set};

use crate::errors::InternalError;
use crate::types::db::system_config::{self, Entity as SystemConfig};
use crate::types::internal::approval_window::{
    APPROVAL_END_HOUR_KEY, APPROVAL_START_HOUR_KEY, ApprovalWindow,
};

/// SystemConfigStore manages key/value system settings in the database
#[derive(Default)]
pub struct SystemConfigStore {}

impl SystemConfigStore {
    pub fn new() -> Self {
        Self {}
    }

    /// Get a raw configuration value
    ///
    /// # Returns
    /// * `Ok(Some(value))` - The stored value
    /// * `Ok(None)` - The key has never been set
    /// * `Err(InternalError)` - Database error
    pub async fn get_value(
        &self,
        conn: &impl ConnectionTrait,
        key: &str,
    ) -> Result<Option<String>, InternalError> {
        let row = SystemConfig::find_by_id(key.to_string())
            .one(conn)
            .await
            .map_err(|e| InternalError::database("get_system_config", e))?;
        Ok(row.map(|r| r.value))
    }

    /// Insert or overwrite a configuration value, stamped with `now`
    pub async fn set_value(
        &self,
        conn: &impl ConnectionTrait,
        key: &str,
        value: &str,
        now: i64,
    ) -> Result<(), InternalError> {
        let model = system_config::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value.to_string()),
            updated_at: Set(now),
        };

        SystemConfig::insert(model)
            .on_conflict(
                OnConflict::column(system_config::Column::Key)
                    .update_columns([system_config::Column::Value, system_config::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(conn)
            .await
            .map_err(|e| InternalError::database("set_system_config", e))?;

        Ok(())
    }

    async fn get_hour(
        &self,
        conn: &impl ConnectionTrait,
        key: &str,
        default: u32,
    ) -> Result<u32, InternalError> {
        match self.get_value(conn, key).await? {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|h| *h <= 23)
                .ok_or_else(|| InternalError::parse(key, format!("invalid hour '{}'", raw))),
            None => Ok(default),
        }
    }

    /// Load the approval window, falling back to the defaults for unset keys
    pub async fn get_approval_window(
        &self,
        conn: &impl ConnectionTrait,
    ) -> Result<ApprovalWindow, InternalError> {
        let defaults = ApprovalWindow::default();
        Ok(ApprovalWindow {
            start_hour: self
                .get_hour(conn, APPROVAL_START_HOUR_KEY, defaults.start_hour)
                .await?,
            end_hour: self
                .get_hour(conn, APPROVAL_END_HOUR_KEY, defaults.end_hour)
                .await?,
        })
    }

    pub async fn set_approval_window(
        &self,
        conn: &impl ConnectionTrait,
        window: &ApprovalWindow,
        now: i64,
    ) -> Result<(), InternalError> {
        self.set_value(conn, APPROVAL_START_HOUR_KEY, &window.start_hour.to_string(), now)
            .await?;
        self.set_value(conn, APPROVAL_END_HOUR_KEY, &window.end_hour.to_string(), now)
            .await
    }
}

impl std::fmt::Debug for SystemConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemConfigStore").finish()
    }
}
