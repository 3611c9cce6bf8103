use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Users::Username).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::Role).string().not_null().default("employee"))
                    .col(ColumnDef::new(Users::Clearance).string().not_null().default("public"))
                    .col(ColumnDef::new(Users::FailedLoginCount).integer().not_null().default(0))
                    .col(ColumnDef::new(Users::LockedUntil).big_integer().null())
                    .col(ColumnDef::new(Users::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // Owner is nulled (not cascaded) when the owning user is deleted
        manager
            .create_table(
                Table::create()
                    .table(Equipment::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Equipment::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Equipment::Name).string().not_null())
                    .col(ColumnDef::new(Equipment::Sensitivity).string().not_null().default("public"))
                    .col(ColumnDef::new(Equipment::OwnerId).string().null())
                    .col(ColumnDef::new(Equipment::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Equipment::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_equipment_owner_id")
                            .from(Equipment::Table, Equipment::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EquipmentPermissions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(EquipmentPermissions::EquipmentId).string().not_null())
                    .col(ColumnDef::new(EquipmentPermissions::UserId).string().not_null())
                    .col(ColumnDef::new(EquipmentPermissions::CanEdit).boolean().not_null().default(false))
                    .col(ColumnDef::new(EquipmentPermissions::CanDelete).boolean().not_null().default(false))
                    .col(ColumnDef::new(EquipmentPermissions::GrantedById).string().not_null())
                    .col(ColumnDef::new(EquipmentPermissions::CreatedAt).big_integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(EquipmentPermissions::EquipmentId)
                            .col(EquipmentPermissions::UserId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BorrowRequests::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(BorrowRequests::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(BorrowRequests::UserId).string().not_null())
                    .col(ColumnDef::new(BorrowRequests::EquipmentId).string().not_null())
                    .col(ColumnDef::new(BorrowRequests::Status).string().not_null().default("pending"))
                    .col(ColumnDef::new(BorrowRequests::ApprovedById).string().null())
                    .col(ColumnDef::new(BorrowRequests::ApprovedAt).big_integer().null())
                    .col(ColumnDef::new(BorrowRequests::ReturnedAt).big_integer().null())
                    .col(ColumnDef::new(BorrowRequests::CreatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_borrow_requests_user_id")
                    .table(BorrowRequests::Table)
                    .col(BorrowRequests::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RoleChangeRequests::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(RoleChangeRequests::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(RoleChangeRequests::UserId).string().not_null())
                    .col(ColumnDef::new(RoleChangeRequests::CurrentRole).string().not_null())
                    .col(ColumnDef::new(RoleChangeRequests::RequestedRole).string().not_null())
                    .col(ColumnDef::new(RoleChangeRequests::Reason).string().null())
                    .col(ColumnDef::new(RoleChangeRequests::Status).string().not_null().default("pending"))
                    .col(ColumnDef::new(RoleChangeRequests::RequestedAt).big_integer().not_null())
                    .col(ColumnDef::new(RoleChangeRequests::ReviewedAt).big_integer().null())
                    .col(ColumnDef::new(RoleChangeRequests::ReviewedById).string().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_role_change_requests_user_status")
                    .table(RoleChangeRequests::Table)
                    .col(RoleChangeRequests::UserId)
                    .col(RoleChangeRequests::Status)
                    .to_owned(),
            )
            .await?;

        // At most one pending role-change request per user
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_role_change_requests_one_pending \
                 ON role_change_requests (user_id) WHERE status = 'pending'",
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Alerts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alerts::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Alerts::AlertType).string().not_null())
                    .col(ColumnDef::new(Alerts::Severity).string().not_null())
                    .col(ColumnDef::new(Alerts::Message).string().not_null())
                    .col(ColumnDef::new(Alerts::UserId).string().null())
                    .col(ColumnDef::new(Alerts::IpAddress).string().null())
                    .col(ColumnDef::new(Alerts::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Alerts::Resolved).boolean().not_null().default(false))
                    .col(ColumnDef::new(Alerts::ResolvedAt).big_integer().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SystemConfig::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SystemConfig::Key).string().not_null().primary_key())
                    .col(ColumnDef::new(SystemConfig::Value).string().not_null())
                    .col(ColumnDef::new(SystemConfig::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(SystemConfig::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Alerts::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(RoleChangeRequests::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(BorrowRequests::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(EquipmentPermissions::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Equipment::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Users::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    PasswordHash,
    Role,
    Clearance,
    FailedLoginCount,
    LockedUntil,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Equipment {
    Table,
    Id,
    Name,
    Sensitivity,
    OwnerId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum EquipmentPermissions {
    Table,
    EquipmentId,
    UserId,
    CanEdit,
    CanDelete,
    GrantedById,
    CreatedAt,
}

#[derive(DeriveIden)]
enum BorrowRequests {
    Table,
    Id,
    UserId,
    EquipmentId,
    Status,
    ApprovedById,
    ApprovedAt,
    ReturnedAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum RoleChangeRequests {
    Table,
    Id,
    UserId,
    CurrentRole,
    RequestedRole,
    Reason,
    Status,
    RequestedAt,
    ReviewedAt,
    ReviewedById,
}

#[derive(DeriveIden)]
enum Alerts {
    Table,
    Id,
    AlertType,
    Severity,
    Message,
    UserId,
    IpAddress,
    CreatedAt,
    Resolved,
    ResolvedAt,
}

#[derive(DeriveIden)]
enum SystemConfig {
    Table,
    Key,
    Value,
    UpdatedAt,
}
