//! `SeaORM` Entity for the branches table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "branches")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub code: String,
    pub address: Option<String>,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::branch_stock::Entity")]
    BranchStock,
    #[sea_orm(has_many = "super::branch_dues::Entity")]
    BranchDues,
}

impl Related<super::branch_stock::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BranchStock.def()
    }
}

impl Related<super::branch_dues::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BranchDues.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
