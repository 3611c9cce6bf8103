use migration::{AuditMigrator, LendingMigrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection, DatabaseTransaction, TransactionTrait};

use crate::config::Settings;
use crate::errors::InternalError;

/// The two databases: lending state and the append-only audit log
#[derive(Debug, Clone)]
pub struct DatabaseConnections {
    pub lending: DatabaseConnection,
    pub audit: DatabaseConnection,
}

impl DatabaseConnections {
    /// Connect both databases. Does NOT run migrations.
    pub async fn init(settings: &Settings) -> Result<Self, InternalError> {
        let lending = Database::connect(settings.database_url())
            .await
            .map_err(|e| InternalError::database("connect_database", e))?;
        tracing::debug!("Connected to lending database: {}", settings.database_url());

        let audit = Database::connect(settings.audit_database_url())
            .await
            .map_err(|e| InternalError::database("connect_audit_database", e))?;
        tracing::debug!("Connected to audit database: {}", settings.audit_database_url());

        Ok(Self { lending, audit })
    }

    pub async fn migrate(&self) -> Result<(), InternalError> {
        migrate_lending_database(&self.lending).await?;
        migrate_audit_database(&self.audit).await
    }
}

/// Run pending migrations on the lending database
pub async fn migrate_lending_database(db: &DatabaseConnection) -> Result<(), InternalError> {
    LendingMigrator::up(db, None)
        .await
        .map_err(|e| InternalError::database("run_migrations", e))?;
    tracing::debug!("Lending database migrations completed");
    Ok(())
}

/// Run pending migrations on the audit database
pub async fn migrate_audit_database(audit_db: &DatabaseConnection) -> Result<(), InternalError> {
    AuditMigrator::up(audit_db, None)
        .await
        .map_err(|e| InternalError::database("run_audit_migrations", e))?;
    tracing::debug!("Audit database migrations completed");
    Ok(())
}

pub async fn begin_transaction(db: &DatabaseConnection) -> Result<DatabaseTransaction, InternalError> {
    db.begin().await.map_err(InternalError::transaction_begin)
}

pub async fn commit_transaction(txn: DatabaseTransaction) -> Result<(), InternalError> {
    txn.commit().await.map_err(InternalError::transaction_commit)
}
