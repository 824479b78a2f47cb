//! `SeaORM` Entity for the branch_dues table.
//!
//! `counterparty_branch_id` is the branch the debt is held against;
//! `branch_id` is the branch where the obligation arose. `due_type`
//! distinguishes a receivable from a payable.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "branch_dues")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub counterparty_branch_id: Uuid,
    pub branch_id: Uuid,
    #[sea_orm(unique)]
    pub stock_movement_id: Option<Uuid>,
    pub due_type: String,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub remaining_amount: Decimal,
    pub status: String,
    pub due_date: Date,
    pub payment_date: Option<Date>,
    pub description: Option<String>,
    pub version: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::branches::Entity",
        from = "Column::CounterpartyBranchId",
        to = "super::branches::Column::Id"
    )]
    CounterpartyBranch,
    #[sea_orm(
        belongs_to = "super::branches::Entity",
        from = "Column::BranchId",
        to = "super::branches::Column::Id"
    )]
    Branches,
    #[sea_orm(
        belongs_to = "super::stock_movements::Entity",
        from = "Column::StockMovementId",
        to = "super::stock_movements::Column::Id"
    )]
    StockMovements,
}

impl Related<super::branches::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Branches.def()
    }
}

impl Related<super::stock_movements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockMovements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
