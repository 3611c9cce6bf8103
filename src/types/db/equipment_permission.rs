use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "equipment_permissions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub equipment_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    pub can_edit: bool,
    pub can_delete: bool,
    pub granted_by_id: String,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
