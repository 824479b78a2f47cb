//! `SeaORM` Entity for the due_payments table.
//!
//! Payments reference a due polymorphically through `(due_kind, due_id)`,
//! so no relational foreign key is declared for the due itself.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "due_payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub due_kind: String,
    pub due_id: Uuid,
    pub branch_id: Uuid,
    pub amount: Decimal,
    pub payment_method: String,
    pub payment_date: Date,
    pub reference_number: Option<String>,
    pub description: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
