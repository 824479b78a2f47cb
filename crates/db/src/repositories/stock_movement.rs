//! Repository for stock movements.
//!
//! Recording a movement, applying its branch stock effects, and creating
//! the due it obligates happen in one transaction. A failure anywhere,
//! including an invariant violation while creating the due, rolls the
//! whole movement back; there is no state where a movement exists
//! without its ledger entry.

use chrono::{NaiveDate, Utc};
use kasira_core::dues::DueStatus;
use kasira_core::stock::{
    self, MovementError, MovementStatus, MovementType, NewMovement, StockEffect,
};
use kasira_shared::types::{PageMeta, PageRequest, PageResponse};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{branch_stock, branches, products, stock_movements, suppliers};

use super::due_ledger::{self, CreateDueInput, DueRow, DueStoreError};

/// Error types for stock movement operations.
#[derive(Debug, thiserror::Error)]
pub enum MovementStoreError {
    /// The movement input violated a validation rule.
    #[error(transparent)]
    Movement(#[from] MovementError),

    /// The derived due could not be created or updated.
    #[error(transparent)]
    Due(#[from] DueStoreError),

    /// The movement does not exist.
    #[error("Stock movement '{0}' not found")]
    NotFound(Uuid),

    /// The movement has already been cancelled.
    #[error("Stock movement '{0}' is already cancelled")]
    AlreadyCancelled(Uuid),

    /// A referenced master record does not exist.
    #[error("{0} '{1}' not found")]
    InvalidReference(&'static str, Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl MovementStoreError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Movement(e) => e.error_code(),
            Self::Due(e) => e.error_code(),
            Self::NotFound(_) => "MOVEMENT_NOT_FOUND",
            Self::AlreadyCancelled(_) => "MOVEMENT_ALREADY_CANCELLED",
            Self::InvalidReference(..) => "INVALID_REFERENCE",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for API responses.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::Movement(e) => e.http_status_code(),
            Self::Due(e) => e.http_status_code(),
            Self::NotFound(_) => 404,
            Self::AlreadyCancelled(_) | Self::InvalidReference(..) => 400,
            Self::Database(_) => 500,
        }
    }
}

/// A movement together with the due it derived, if any.
#[derive(Debug, Clone, Serialize)]
pub struct MovementRecord {
    /// The movement row.
    pub movement: stock_movements::Model,
    /// The due the movement obligated.
    pub due: Option<DueRow>,
}

/// Changes to an existing movement. `None` fields are left untouched.
///
/// The movement's type, product, and branches are immutable; correcting
/// those means cancelling and re-recording.
#[derive(Debug, Clone, Default)]
pub struct UpdateMovement {
    /// New quantity.
    pub quantity: Option<Decimal>,
    /// New unit price.
    pub unit_price: Option<Decimal>,
    /// Explicit new total. Otherwise recomputed when quantity or price change.
    pub total_amount: Option<Decimal>,
    /// New description.
    pub description: Option<Option<String>>,
}

/// Filters for listing movements.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovementListFilter {
    /// Only movements at this branch.
    pub branch_id: Option<Uuid>,
    /// Only movements of this product.
    pub product_id: Option<Uuid>,
    /// Only movements of this type.
    pub movement_type: Option<MovementType>,
    /// Only movements in this status.
    pub status: Option<MovementStatus>,
}

/// Repository for recording, correcting, and cancelling stock movements.
#[derive(Debug, Clone)]
pub struct StockMovementRepository {
    db: DatabaseConnection,
}

impl StockMovementRepository {
    /// Creates a new stock movement repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a movement, applies its stock effects, and creates the
    /// due it obligates, all in one transaction.
    ///
    /// The `auto_update_product` flag gates both side effects: when it
    /// is off the movement is persisted as a bare record, with no stock
    /// adjustment and no derived due. No due is created when the
    /// movement's total is zero either.
    ///
    /// # Errors
    ///
    /// Fails on validation errors, unknown references, insufficient
    /// stock at a debited branch, or a due invariant violation. Nothing
    /// is persisted on failure.
    pub async fn record(
        &self,
        input: NewMovement,
        created_by: Option<Uuid>,
    ) -> Result<MovementRecord, MovementStoreError> {
        stock::validate_movement(&input)?;
        let today = Utc::now().date_naive();
        let total = stock::compute_total(input.quantity, input.unit_price, input.total_amount);

        let txn = self.db.begin().await?;

        ensure_product(&txn, input.product_id).await?;
        ensure_branch(&txn, input.branch_id).await?;
        if let Some(reference) = input.reference_branch_id {
            ensure_branch(&txn, reference).await?;
        }
        if let Some(supplier) = input.supplier_id {
            ensure_supplier(&txn, supplier).await?;
        }

        let mut previous_quantity = None;
        if input.auto_update_product {
            for effect in stock::quantity_effects(&input) {
                if let Some(previous) = apply_effect(&txn, input.product_id, &effect).await? {
                    previous_quantity = Some(previous);
                }
            }
        }

        let movement_id = Uuid::new_v4();
        let now = Utc::now();
        let movement = stock_movements::ActiveModel {
            id: Set(movement_id),
            movement_type: Set(input.movement_type.as_str().to_owned()),
            status: Set(MovementStatus::Completed.as_str().to_owned()),
            product_id: Set(input.product_id),
            branch_id: Set(input.branch_id),
            reference_branch_id: Set(input.reference_branch_id),
            supplier_id: Set(input.supplier_id),
            quantity: Set(input.quantity),
            previous_quantity: Set(previous_quantity),
            unit_price: Set(input.unit_price),
            total_amount: Set(total),
            paid_amount: Set(input.paid_amount),
            auto_update_product: Set(input.auto_update_product),
            description: Set(input.description.clone()),
            created_by: Set(created_by),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let due = match stock::derive_due_plan(&input, today) {
            Some(plan) if input.auto_update_product && total > Decimal::ZERO => Some(
                due_ledger::insert_due(
                    &txn,
                    CreateDueInput {
                        kind: plan.kind,
                        counterparty_id: plan.counterparty_id,
                        branch_id: input.branch_id,
                        stock_movement_id: Some(movement_id),
                        due_type: plan.due_type,
                        total_amount: total,
                        paid_amount: input.paid_amount,
                        due_date: plan.due_date,
                        description: input.description,
                    },
                    today,
                )
                .await?,
            ),
            _ => None,
        };

        txn.commit().await?;
        tracing::info!(
            movement_id = %movement.id,
            movement_type = %movement.movement_type,
            due_created = due.is_some(),
            "stock movement recorded"
        );
        Ok(MovementRecord { movement, due })
    }

    /// Corrects a movement's amounts and resyncs stock and linked dues.
    ///
    /// # Errors
    ///
    /// Fails if the movement does not exist or is cancelled, if the new
    /// quantity would leave a branch's stock negative, or if payments
    /// already applied to the linked due exceed the new total.
    pub async fn update(
        &self,
        movement_id: Uuid,
        changes: UpdateMovement,
    ) -> Result<MovementRecord, MovementStoreError> {
        let today = Utc::now().date_naive();
        let txn = self.db.begin().await?;

        let movement = stock_movements::Entity::find_by_id(movement_id)
            .one(&txn)
            .await?
            .ok_or(MovementStoreError::NotFound(movement_id))?;
        if parse_movement_status(&movement.status)? == MovementStatus::Cancelled {
            return Err(MovementStoreError::AlreadyCancelled(movement_id));
        }

        let new_quantity = changes.quantity.unwrap_or(movement.quantity);
        let new_unit_price = changes.unit_price.unwrap_or(movement.unit_price);
        let amounts_changed =
            new_quantity != movement.quantity || new_unit_price != movement.unit_price;
        let new_total = changes.total_amount.unwrap_or(if amounts_changed {
            new_quantity * new_unit_price
        } else {
            movement.total_amount
        });

        let old_input = as_new_movement(&movement)?;
        let mut new_input = old_input.clone();
        new_input.quantity = new_quantity;
        new_input.unit_price = new_unit_price;
        stock::validate_movement(&new_input)?;

        if movement.auto_update_product && new_quantity != movement.quantity {
            revert_effects(&txn, &movement, &old_input).await?;
            for effect in stock::quantity_effects(&new_input) {
                apply_effect(&txn, movement.product_id, &effect).await?;
            }
        }

        let mut active: stock_movements::ActiveModel = movement.clone().into();
        active.quantity = Set(new_quantity);
        active.unit_price = Set(new_unit_price);
        active.total_amount = Set(new_total);
        if let Some(description) = changes.description {
            active.description = Set(description);
        }
        active.updated_at = Set(Utc::now());
        let movement = active.update(&txn).await?;

        let mut linked_due = None;
        for due in due_ledger::find_by_movement(&txn, movement_id).await? {
            if due.status.is_cancelled() {
                linked_due = Some(due);
                continue;
            }
            if new_total == due.total_amount {
                linked_due = Some(due);
                continue;
            }
            kasira_core::dues::validate_resync_total(new_total, due.paid_amount)
                .map_err(DueStoreError::from)?;
            let remaining = kasira_core::dues::compute_remaining(new_total, due.paid_amount);
            let status = kasira_core::dues::derive_status(
                new_total,
                due.paid_amount,
                due.due_date,
                today,
            );
            let payment_date = if status == DueStatus::Paid {
                due.payment_date.or(Some(today))
            } else {
                None
            };
            linked_due = Some(
                due_ledger::cas_update(
                    &txn,
                    &due,
                    new_total,
                    due.paid_amount,
                    remaining,
                    status,
                    payment_date,
                )
                .await?,
            );
        }

        txn.commit().await?;
        tracing::info!(movement_id = %movement.id, "stock movement updated");
        Ok(MovementRecord {
            movement,
            due: linked_due,
        })
    }

    /// Cancels a movement, reverting its stock effects and deleting the
    /// dues it derived, together with their payments.
    ///
    /// # Errors
    ///
    /// Fails if the movement does not exist, is already cancelled, or
    /// reverting an applied credit would leave a branch's stock negative.
    pub async fn cancel(&self, movement_id: Uuid) -> Result<stock_movements::Model, MovementStoreError> {
        let txn = self.db.begin().await?;

        let movement = stock_movements::Entity::find_by_id(movement_id)
            .one(&txn)
            .await?
            .ok_or(MovementStoreError::NotFound(movement_id))?;
        if parse_movement_status(&movement.status)? == MovementStatus::Cancelled {
            return Err(MovementStoreError::AlreadyCancelled(movement_id));
        }

        if movement.auto_update_product {
            let input = as_new_movement(&movement)?;
            revert_effects(&txn, &movement, &input).await?;
        }

        for due in due_ledger::find_by_movement(&txn, movement_id).await? {
            due_ledger::delete_due(&txn, due.due_ref()).await?;
        }

        let mut active: stock_movements::ActiveModel = movement.into();
        active.status = Set(MovementStatus::Cancelled.as_str().to_owned());
        active.updated_at = Set(Utc::now());
        let movement = active.update(&txn).await?;

        txn.commit().await?;
        tracing::info!(movement_id = %movement.id, "stock movement cancelled");
        Ok(movement)
    }

    /// Fetches one movement with its derived due.
    ///
    /// # Errors
    ///
    /// Fails with `NotFound` if the movement does not exist.
    pub async fn get(&self, movement_id: Uuid) -> Result<MovementRecord, MovementStoreError> {
        let movement = stock_movements::Entity::find_by_id(movement_id)
            .one(&self.db)
            .await?
            .ok_or(MovementStoreError::NotFound(movement_id))?;
        let due = due_ledger::find_by_movement(&self.db, movement_id)
            .await?
            .into_iter()
            .next();
        Ok(MovementRecord { movement, due })
    }

    /// Lists movements, newest first.
    pub async fn list(
        &self,
        filter: &MovementListFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<stock_movements::Model>, MovementStoreError> {
        let mut query = stock_movements::Entity::find();
        if let Some(branch) = filter.branch_id {
            query = query.filter(stock_movements::Column::BranchId.eq(branch));
        }
        if let Some(product) = filter.product_id {
            query = query.filter(stock_movements::Column::ProductId.eq(product));
        }
        if let Some(movement_type) = filter.movement_type {
            query = query.filter(stock_movements::Column::MovementType.eq(movement_type.as_str()));
        }
        if let Some(status) = filter.status {
            query = query.filter(stock_movements::Column::Status.eq(status.as_str()));
        }

        let total = query.clone().count(&self.db).await?;
        let rows = query
            .order_by_desc(stock_movements::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse {
            data: rows,
            meta: PageMeta {
                page: page.page,
                per_page: page.per_page,
                total,
            },
        })
    }

    /// Returns the current stock quantity of a product at a branch.
    pub async fn stock_level(
        &self,
        product_id: Uuid,
        branch_id: Uuid,
    ) -> Result<Decimal, MovementStoreError> {
        let quantity = branch_stock::Entity::find()
            .filter(branch_stock::Column::ProductId.eq(product_id))
            .filter(branch_stock::Column::BranchId.eq(branch_id))
            .one(&self.db)
            .await?
            .map_or(Decimal::ZERO, |row| row.quantity);
        Ok(quantity)
    }
}

async fn ensure_product<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<(), MovementStoreError> {
    let active = products::Entity::find_by_id(id)
        .one(conn)
        .await?
        .is_some_and(|p| p.is_active);
    if !active {
        return Err(MovementStoreError::InvalidReference("Product", id));
    }
    Ok(())
}

async fn ensure_branch<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<(), MovementStoreError> {
    let active = branches::Entity::find_by_id(id)
        .one(conn)
        .await?
        .is_some_and(|b| b.is_active);
    if !active {
        return Err(MovementStoreError::InvalidReference("Branch", id));
    }
    Ok(())
}

async fn ensure_supplier<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<(), MovementStoreError> {
    let active = suppliers::Entity::find_by_id(id)
        .one(conn)
        .await?
        .is_some_and(|s| s.is_active);
    if !active {
        return Err(MovementStoreError::InvalidReference("Supplier", id));
    }
    Ok(())
}

/// Adds `delta` to the branch's stock of a product, creating the row
/// on first touch. Rejects any change that would leave the quantity
/// negative.
async fn adjust_stock<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    branch_id: Uuid,
    delta: Decimal,
) -> Result<(), MovementStoreError> {
    let existing = branch_stock::Entity::find()
        .filter(branch_stock::Column::ProductId.eq(product_id))
        .filter(branch_stock::Column::BranchId.eq(branch_id))
        .one(conn)
        .await?;

    let current = existing.as_ref().map_or(Decimal::ZERO, |row| row.quantity);
    let new_quantity = current + delta;
    if new_quantity < Decimal::ZERO {
        return Err(MovementError::InsufficientStock {
            branch_id,
            available: current,
            requested: -delta,
        }
        .into());
    }

    write_stock(conn, existing, product_id, branch_id, new_quantity).await
}

/// Sets the branch's stock of a product to an absolute quantity and
/// returns the previous quantity.
async fn set_stock<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    branch_id: Uuid,
    quantity: Decimal,
) -> Result<Decimal, MovementStoreError> {
    let existing = branch_stock::Entity::find()
        .filter(branch_stock::Column::ProductId.eq(product_id))
        .filter(branch_stock::Column::BranchId.eq(branch_id))
        .one(conn)
        .await?;
    let previous = existing.as_ref().map_or(Decimal::ZERO, |row| row.quantity);
    write_stock(conn, existing, product_id, branch_id, quantity).await?;
    Ok(previous)
}

async fn write_stock<C: ConnectionTrait>(
    conn: &C,
    existing: Option<branch_stock::Model>,
    product_id: Uuid,
    branch_id: Uuid,
    quantity: Decimal,
) -> Result<(), MovementStoreError> {
    let now = Utc::now();
    match existing {
        Some(row) => {
            let mut active: branch_stock::ActiveModel = row.into();
            active.quantity = Set(quantity);
            active.updated_at = Set(now);
            active.update(conn).await?;
        }
        None => {
            branch_stock::ActiveModel {
                id: Set(Uuid::new_v4()),
                product_id: Set(product_id),
                branch_id: Set(branch_id),
                quantity: Set(quantity),
                updated_at: Set(now),
            }
            .insert(conn)
            .await?;
        }
    }
    Ok(())
}

/// Applies one stock effect. Returns the previous quantity for
/// absolute adjustments so the movement can record it.
async fn apply_effect<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    effect: &StockEffect,
) -> Result<Option<Decimal>, MovementStoreError> {
    match *effect {
        StockEffect::Credit {
            branch_id,
            quantity,
        } => {
            adjust_stock(conn, product_id, branch_id, quantity).await?;
            Ok(None)
        }
        StockEffect::Debit {
            branch_id,
            quantity,
        } => {
            adjust_stock(conn, product_id, branch_id, -quantity).await?;
            Ok(None)
        }
        StockEffect::SetAbsolute {
            branch_id,
            quantity,
        } => Ok(Some(set_stock(conn, product_id, branch_id, quantity).await?)),
    }
}

/// Reverts every stock effect of an applied movement.
async fn revert_effects<C: ConnectionTrait>(
    conn: &C,
    movement: &stock_movements::Model,
    input: &NewMovement,
) -> Result<(), MovementStoreError> {
    for effect in stock::quantity_effects(input) {
        match effect {
            StockEffect::Credit {
                branch_id,
                quantity,
            } => adjust_stock(conn, movement.product_id, branch_id, -quantity).await?,
            StockEffect::Debit {
                branch_id,
                quantity,
            } => adjust_stock(conn, movement.product_id, branch_id, quantity).await?,
            StockEffect::SetAbsolute { branch_id, .. } => {
                if let Some(previous) = movement.previous_quantity {
                    set_stock(conn, movement.product_id, branch_id, previous).await?;
                }
            }
        }
    }
    Ok(())
}

fn parse_movement_status(raw: &str) -> Result<MovementStatus, MovementStoreError> {
    raw.parse()
        .map_err(DbErr::Custom)
        .map_err(MovementStoreError::from)
}

fn as_new_movement(m: &stock_movements::Model) -> Result<NewMovement, MovementStoreError> {
    Ok(NewMovement {
        movement_type: m
            .movement_type
            .parse()
            .map_err(DbErr::Custom)
            .map_err(MovementStoreError::from)?,
        product_id: m.product_id,
        branch_id: m.branch_id,
        reference_branch_id: m.reference_branch_id,
        supplier_id: m.supplier_id,
        quantity: m.quantity,
        unit_price: m.unit_price,
        total_amount: Some(m.total_amount),
        paid_amount: m.paid_amount,
        auto_update_product: m.auto_update_product,
        description: m.description.clone(),
    })
}
