//! Repository over the three due ledgers.
//!
//! Supplier, branch, and customer dues are structurally identical tables;
//! this repository dispatches on [`DueKind`] so every invariant check
//! lives in exactly one place. Amount updates go through a
//! compare-and-swap on the row's `version` column, which works the same
//! on PostgreSQL and SQLite and turns lost updates into a retryable
//! [`DueStoreError::ConcurrentModification`].

use chrono::{DateTime, NaiveDate, Utc};
use kasira_core::dues::{self, DueError, DueKind, DueRef, DueStatus};
use kasira_shared::types::{PageMeta, PageRequest, PageResponse};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::entities::{
    branch_dues, branches, customer_dues, customers, due_payments, stock_movements, supplier_dues,
    suppliers,
};

/// Error types for due ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum DueStoreError {
    /// An amount or state invariant was violated.
    #[error(transparent)]
    Due(#[from] DueError),

    /// The referenced counterparty does not exist.
    #[error("{0} '{1}' not found")]
    InvalidReference(&'static str, Uuid),

    /// The movement already has a linked due.
    #[error("Stock movement '{0}' already has a linked due")]
    DuplicateDue(Uuid),

    /// The due does not exist.
    #[error("{kind} due '{id}' not found")]
    NotFound {
        /// Which ledger was queried.
        kind: DueKind,
        /// The missing due id.
        id: Uuid,
    },

    /// Another writer updated the due between read and write.
    #[error("Due was modified concurrently, retry the operation")]
    ConcurrentModification,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl DueStoreError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Due(e) => e.error_code(),
            Self::InvalidReference(..) => "INVALID_REFERENCE",
            Self::DuplicateDue(_) => "DUPLICATE_DUE",
            Self::NotFound { .. } => "DUE_NOT_FOUND",
            Self::ConcurrentModification => "CONCURRENT_MODIFICATION",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for API responses.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::Due(e) => e.http_status_code(),
            Self::InvalidReference(..) => 400,
            Self::NotFound { .. } => 404,
            Self::DuplicateDue(_) | Self::ConcurrentModification => 409,
            Self::Database(_) => 500,
        }
    }
}

/// A due row in ledger-neutral form.
#[derive(Debug, Clone, Serialize)]
pub struct DueRow {
    /// The due id.
    pub id: Uuid,
    /// Which ledger the due belongs to.
    pub kind: DueKind,
    /// The supplier, branch, or customer the due is against.
    pub counterparty_id: Uuid,
    /// The branch where the obligation arose.
    pub branch_id: Uuid,
    /// The movement that derived this due, if any.
    pub stock_movement_id: Option<Uuid>,
    /// Ledger-specific classification (stock_purchase, receivable, ...).
    pub due_type: String,
    /// The full obligated amount.
    pub total_amount: Decimal,
    /// Amount paid so far.
    pub paid_amount: Decimal,
    /// `total_amount - paid_amount`, kept denormalized.
    pub remaining_amount: Decimal,
    /// Current lifecycle status.
    pub status: DueStatus,
    /// When the due must be settled.
    pub due_date: NaiveDate,
    /// Date of the payment that settled the due, if settled.
    pub payment_date: Option<NaiveDate>,
    /// Free-text description.
    pub description: Option<String>,
    /// Optimistic-concurrency version.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl DueRow {
    /// Returns the tagged reference for this due.
    #[must_use]
    pub const fn due_ref(&self) -> DueRef {
        DueRef::new(self.kind, self.id)
    }
}

/// A due together with display labels for its references.
#[derive(Debug, Clone, Serialize)]
pub struct DueDetails {
    /// The due row.
    #[serde(flatten)]
    pub due: DueRow,
    /// Name of the supplier, branch, or customer.
    pub counterparty_name: Option<String>,
    /// Name of the branch where the obligation arose.
    pub branch_name: Option<String>,
    /// Type of the movement that derived this due, if any.
    pub movement_type: Option<String>,
}

/// Input for creating a due directly.
#[derive(Debug, Clone)]
pub struct CreateDueInput {
    /// Which ledger to create the due in.
    pub kind: DueKind,
    /// The supplier, branch, or customer the due is against.
    pub counterparty_id: Uuid,
    /// The branch where the obligation arose.
    pub branch_id: Uuid,
    /// The movement that derived this due, if any.
    pub stock_movement_id: Option<Uuid>,
    /// Ledger-specific classification.
    pub due_type: String,
    /// The full obligated amount. Must be positive.
    pub total_amount: Decimal,
    /// Amount already paid. Must be within `[0, total_amount]`.
    pub paid_amount: Decimal,
    /// When the due must be settled.
    pub due_date: NaiveDate,
    /// Free-text description.
    pub description: Option<String>,
}

/// Filters for listing dues within one ledger.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DueListFilter {
    /// Only dues against this counterparty.
    pub counterparty_id: Option<Uuid>,
    /// Only dues belonging to this branch.
    pub branch_id: Option<Uuid>,
    /// Only dues in this status.
    pub status: Option<DueStatus>,
    /// Only dues of this classification.
    pub due_type: Option<String>,
}

/// Totals for one status bucket of a ledger summary.
#[derive(Debug, Clone, Serialize)]
pub struct DueStatusSummary {
    /// The status this bucket covers.
    pub status: DueStatus,
    /// Number of dues in this status.
    pub due_count: u64,
    /// Sum of total amounts.
    pub total_amount: Decimal,
    /// Sum of paid amounts.
    pub total_paid: Decimal,
    /// Sum of remaining amounts.
    pub total_remaining: Decimal,
}

/// Aggregate totals over one ledger, cancelled dues excluded.
#[derive(Debug, Clone, Serialize)]
pub struct DueSummary {
    /// Per-status breakdown, empty statuses omitted.
    pub by_status: Vec<DueStatusSummary>,
    /// Sum of total amounts.
    pub total_amount: Decimal,
    /// Sum of paid amounts.
    pub total_paid: Decimal,
    /// Sum of remaining amounts.
    pub total_remaining: Decimal,
    /// Number of dues counted.
    pub due_count: u64,
    /// Number of those currently overdue.
    pub overdue_count: u64,
}

fn parse_status(raw: &str) -> Result<DueStatus, DueStoreError> {
    DueStatus::from_str(raw)
        .map_err(DbErr::Custom)
        .map_err(DueStoreError::from)
}

impl TryFrom<supplier_dues::Model> for DueRow {
    type Error = DueStoreError;

    fn try_from(m: supplier_dues::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: m.id,
            kind: DueKind::Supplier,
            counterparty_id: m.supplier_id,
            branch_id: m.branch_id,
            stock_movement_id: m.stock_movement_id,
            due_type: m.due_type,
            total_amount: m.total_amount,
            paid_amount: m.paid_amount,
            remaining_amount: m.remaining_amount,
            status: parse_status(&m.status)?,
            due_date: m.due_date,
            payment_date: m.payment_date,
            description: m.description,
            version: m.version,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}

impl TryFrom<branch_dues::Model> for DueRow {
    type Error = DueStoreError;

    fn try_from(m: branch_dues::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: m.id,
            kind: DueKind::Branch,
            counterparty_id: m.counterparty_branch_id,
            branch_id: m.branch_id,
            stock_movement_id: m.stock_movement_id,
            due_type: m.due_type,
            total_amount: m.total_amount,
            paid_amount: m.paid_amount,
            remaining_amount: m.remaining_amount,
            status: parse_status(&m.status)?,
            due_date: m.due_date,
            payment_date: m.payment_date,
            description: m.description,
            version: m.version,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}

impl TryFrom<customer_dues::Model> for DueRow {
    type Error = DueStoreError;

    fn try_from(m: customer_dues::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: m.id,
            kind: DueKind::Customer,
            counterparty_id: m.customer_id,
            branch_id: m.branch_id,
            stock_movement_id: m.stock_movement_id,
            due_type: m.due_type,
            total_amount: m.total_amount,
            paid_amount: m.paid_amount,
            remaining_amount: m.remaining_amount,
            status: parse_status(&m.status)?,
            due_date: m.due_date,
            payment_date: m.payment_date,
            description: m.description,
            version: m.version,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}

/// Loads one due by ledger and id.
pub(crate) async fn find_due<C: ConnectionTrait>(
    conn: &C,
    due: DueRef,
) -> Result<Option<DueRow>, DueStoreError> {
    match due.kind {
        DueKind::Supplier => supplier_dues::Entity::find_by_id(due.id)
            .one(conn)
            .await?
            .map(DueRow::try_from)
            .transpose(),
        DueKind::Branch => branch_dues::Entity::find_by_id(due.id)
            .one(conn)
            .await?
            .map(DueRow::try_from)
            .transpose(),
        DueKind::Customer => customer_dues::Entity::find_by_id(due.id)
            .one(conn)
            .await?
            .map(DueRow::try_from)
            .transpose(),
    }
}

/// Loads one due or fails with `NotFound`.
pub(crate) async fn require_due<C: ConnectionTrait>(
    conn: &C,
    due: DueRef,
) -> Result<DueRow, DueStoreError> {
    find_due(conn, due).await?.ok_or(DueStoreError::NotFound {
        kind: due.kind,
        id: due.id,
    })
}

/// Loads every due derived from one movement, across all three ledgers.
pub(crate) async fn find_by_movement<C: ConnectionTrait>(
    conn: &C,
    movement_id: Uuid,
) -> Result<Vec<DueRow>, DueStoreError> {
    let mut rows = Vec::new();
    for m in supplier_dues::Entity::find()
        .filter(supplier_dues::Column::StockMovementId.eq(movement_id))
        .all(conn)
        .await?
    {
        rows.push(DueRow::try_from(m)?);
    }
    for m in branch_dues::Entity::find()
        .filter(branch_dues::Column::StockMovementId.eq(movement_id))
        .all(conn)
        .await?
    {
        rows.push(DueRow::try_from(m)?);
    }
    for m in customer_dues::Entity::find()
        .filter(customer_dues::Column::StockMovementId.eq(movement_id))
        .all(conn)
        .await?
    {
        rows.push(DueRow::try_from(m)?);
    }
    Ok(rows)
}

/// Checks whether one ledger already holds a due derived from the
/// movement. Uniqueness is per ledger; the same movement may legally
/// back one due in each.
async fn movement_has_due<C: ConnectionTrait>(
    conn: &C,
    kind: DueKind,
    movement_id: Uuid,
) -> Result<bool, DueStoreError> {
    let found = match kind {
        DueKind::Supplier => supplier_dues::Entity::find()
            .filter(supplier_dues::Column::StockMovementId.eq(movement_id))
            .one(conn)
            .await?
            .is_some(),
        DueKind::Branch => branch_dues::Entity::find()
            .filter(branch_dues::Column::StockMovementId.eq(movement_id))
            .one(conn)
            .await?
            .is_some(),
        DueKind::Customer => customer_dues::Entity::find()
            .filter(customer_dues::Column::StockMovementId.eq(movement_id))
            .one(conn)
            .await?
            .is_some(),
    };
    Ok(found)
}

/// Verifies the counterparty exists and is active in the ledger's
/// master table.
pub(crate) async fn ensure_counterparty<C: ConnectionTrait>(
    conn: &C,
    kind: DueKind,
    id: Uuid,
) -> Result<(), DueStoreError> {
    let found = match kind {
        DueKind::Supplier => suppliers::Entity::find_by_id(id)
            .one(conn)
            .await?
            .is_some_and(|s| s.is_active),
        DueKind::Branch => branches::Entity::find_by_id(id)
            .one(conn)
            .await?
            .is_some_and(|b| b.is_active),
        DueKind::Customer => customers::Entity::find_by_id(id)
            .one(conn)
            .await?
            .is_some_and(|c| c.is_active),
    };
    if found {
        Ok(())
    } else {
        Err(DueStoreError::InvalidReference(
            match kind {
                DueKind::Supplier => "Supplier",
                DueKind::Branch => "Branch",
                DueKind::Customer => "Customer",
            },
            id,
        ))
    }
}

/// Verifies the branch the due belongs to exists and is active.
pub(crate) async fn ensure_owning_branch<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<(), DueStoreError> {
    ensure_counterparty(conn, DueKind::Branch, id).await
}

async fn counterparty_name<C: ConnectionTrait>(
    conn: &C,
    kind: DueKind,
    id: Uuid,
) -> Result<Option<String>, DbErr> {
    Ok(match kind {
        DueKind::Supplier => suppliers::Entity::find_by_id(id)
            .one(conn)
            .await?
            .map(|s| s.name),
        DueKind::Branch => branches::Entity::find_by_id(id)
            .one(conn)
            .await?
            .map(|b| b.name),
        DueKind::Customer => customers::Entity::find_by_id(id)
            .one(conn)
            .await?
            .map(|c| c.name),
    })
}

/// Validates and inserts a new due.
///
/// Shared by the public `create` and by the stock movement recorder,
/// which calls it inside its own transaction.
pub(crate) async fn insert_due<C: ConnectionTrait>(
    conn: &C,
    input: CreateDueInput,
    today: NaiveDate,
) -> Result<DueRow, DueStoreError> {
    let state = dues::initial_state(
        input.total_amount,
        input.paid_amount,
        input.due_date,
        today,
    )?;

    ensure_counterparty(conn, input.kind, input.counterparty_id).await?;
    ensure_owning_branch(conn, input.branch_id).await?;

    if let Some(movement_id) = input.stock_movement_id {
        if stock_movements::Entity::find_by_id(movement_id)
            .one(conn)
            .await?
            .is_none()
        {
            return Err(DueStoreError::InvalidReference("Stock movement", movement_id));
        }
        if movement_has_due(conn, input.kind, movement_id).await? {
            return Err(DueStoreError::DuplicateDue(movement_id));
        }
    }

    let id = Uuid::new_v4();
    let now = Utc::now();

    match input.kind {
        DueKind::Supplier => {
            let model = supplier_dues::ActiveModel {
                id: Set(id),
                supplier_id: Set(input.counterparty_id),
                branch_id: Set(input.branch_id),
                stock_movement_id: Set(input.stock_movement_id),
                due_type: Set(input.due_type),
                total_amount: Set(input.total_amount),
                paid_amount: Set(state.paid_amount),
                remaining_amount: Set(state.remaining_amount),
                status: Set(state.status.as_str().to_owned()),
                due_date: Set(input.due_date),
                payment_date: Set(None),
                description: Set(input.description),
                version: Set(0),
                created_at: Set(now),
                updated_at: Set(now),
            };
            let inserted = supplier_dues::Entity::insert(model)
                .exec_with_returning(conn)
                .await?;
            DueRow::try_from(inserted)
        }
        DueKind::Branch => {
            let model = branch_dues::ActiveModel {
                id: Set(id),
                counterparty_branch_id: Set(input.counterparty_id),
                branch_id: Set(input.branch_id),
                stock_movement_id: Set(input.stock_movement_id),
                due_type: Set(input.due_type),
                total_amount: Set(input.total_amount),
                paid_amount: Set(state.paid_amount),
                remaining_amount: Set(state.remaining_amount),
                status: Set(state.status.as_str().to_owned()),
                due_date: Set(input.due_date),
                payment_date: Set(None),
                description: Set(input.description),
                version: Set(0),
                created_at: Set(now),
                updated_at: Set(now),
            };
            let inserted = branch_dues::Entity::insert(model)
                .exec_with_returning(conn)
                .await?;
            DueRow::try_from(inserted)
        }
        DueKind::Customer => {
            let model = customer_dues::ActiveModel {
                id: Set(id),
                customer_id: Set(input.counterparty_id),
                branch_id: Set(input.branch_id),
                stock_movement_id: Set(input.stock_movement_id),
                due_type: Set(input.due_type),
                total_amount: Set(input.total_amount),
                paid_amount: Set(state.paid_amount),
                remaining_amount: Set(state.remaining_amount),
                status: Set(state.status.as_str().to_owned()),
                due_date: Set(input.due_date),
                payment_date: Set(None),
                description: Set(input.description),
                version: Set(0),
                created_at: Set(now),
                updated_at: Set(now),
            };
            let inserted = customer_dues::Entity::insert(model)
                .exec_with_returning(conn)
                .await?;
            DueRow::try_from(inserted)
        }
    }
}

/// Writes new amounts and status behind a version compare-and-swap.
///
/// The update only lands if the row still carries `due.version`; zero
/// affected rows means another writer got there first. `payment_date`
/// is written as given, so callers decide whether settling or
/// un-settling a due records or clears the date.
pub(crate) async fn cas_update<C: ConnectionTrait>(
    conn: &C,
    due: &DueRow,
    total: Decimal,
    paid: Decimal,
    remaining: Decimal,
    status: DueStatus,
    payment_date: Option<NaiveDate>,
) -> Result<DueRow, DueStoreError> {
    let now = Utc::now();
    let affected = match due.kind {
        DueKind::Supplier => {
            supplier_dues::Entity::update_many()
                .col_expr(supplier_dues::Column::TotalAmount, Expr::value(total))
                .col_expr(supplier_dues::Column::PaidAmount, Expr::value(paid))
                .col_expr(supplier_dues::Column::RemainingAmount, Expr::value(remaining))
                .col_expr(supplier_dues::Column::Status, Expr::value(status.as_str()))
                .col_expr(supplier_dues::Column::PaymentDate, Expr::value(payment_date))
                .col_expr(supplier_dues::Column::Version, Expr::value(due.version + 1))
                .col_expr(supplier_dues::Column::UpdatedAt, Expr::value(now))
                .filter(supplier_dues::Column::Id.eq(due.id))
                .filter(supplier_dues::Column::Version.eq(due.version))
                .exec(conn)
                .await?
                .rows_affected
        }
        DueKind::Branch => {
            branch_dues::Entity::update_many()
                .col_expr(branch_dues::Column::TotalAmount, Expr::value(total))
                .col_expr(branch_dues::Column::PaidAmount, Expr::value(paid))
                .col_expr(branch_dues::Column::RemainingAmount, Expr::value(remaining))
                .col_expr(branch_dues::Column::Status, Expr::value(status.as_str()))
                .col_expr(branch_dues::Column::PaymentDate, Expr::value(payment_date))
                .col_expr(branch_dues::Column::Version, Expr::value(due.version + 1))
                .col_expr(branch_dues::Column::UpdatedAt, Expr::value(now))
                .filter(branch_dues::Column::Id.eq(due.id))
                .filter(branch_dues::Column::Version.eq(due.version))
                .exec(conn)
                .await?
                .rows_affected
        }
        DueKind::Customer => {
            customer_dues::Entity::update_many()
                .col_expr(customer_dues::Column::TotalAmount, Expr::value(total))
                .col_expr(customer_dues::Column::PaidAmount, Expr::value(paid))
                .col_expr(customer_dues::Column::RemainingAmount, Expr::value(remaining))
                .col_expr(customer_dues::Column::Status, Expr::value(status.as_str()))
                .col_expr(customer_dues::Column::PaymentDate, Expr::value(payment_date))
                .col_expr(customer_dues::Column::Version, Expr::value(due.version + 1))
                .col_expr(customer_dues::Column::UpdatedAt, Expr::value(now))
                .filter(customer_dues::Column::Id.eq(due.id))
                .filter(customer_dues::Column::Version.eq(due.version))
                .exec(conn)
                .await?
                .rows_affected
        }
    };

    if affected == 0 {
        return Err(DueStoreError::ConcurrentModification);
    }

    Ok(DueRow {
        total_amount: total,
        paid_amount: paid,
        remaining_amount: remaining,
        status,
        payment_date,
        version: due.version + 1,
        updated_at: now,
        ..due.clone()
    })
}

/// Deletes a due and its payments.
pub(crate) async fn delete_due<C: ConnectionTrait>(
    conn: &C,
    due: DueRef,
) -> Result<(), DueStoreError> {
    due_payments::Entity::delete_many()
        .filter(due_payments::Column::DueKind.eq(due.kind.as_str()))
        .filter(due_payments::Column::DueId.eq(due.id))
        .exec(conn)
        .await?;

    let affected = match due.kind {
        DueKind::Supplier => {
            supplier_dues::Entity::delete_by_id(due.id)
                .exec(conn)
                .await?
                .rows_affected
        }
        DueKind::Branch => {
            branch_dues::Entity::delete_by_id(due.id)
                .exec(conn)
                .await?
                .rows_affected
        }
        DueKind::Customer => {
            customer_dues::Entity::delete_by_id(due.id)
                .exec(conn)
                .await?
                .rows_affected
        }
    };

    if affected == 0 {
        return Err(DueStoreError::NotFound {
            kind: due.kind,
            id: due.id,
        });
    }
    Ok(())
}

/// Repository for reading and maintaining dues across the three ledgers.
#[derive(Debug, Clone)]
pub struct DueLedgerRepository {
    db: DatabaseConnection,
}

impl DueLedgerRepository {
    /// Creates a new due ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a due directly, without a backing movement.
    ///
    /// # Errors
    ///
    /// Fails if the amounts violate the ledger invariants, the
    /// counterparty does not exist, or the movement already has a due.
    pub async fn create(&self, input: CreateDueInput) -> Result<DueRow, DueStoreError> {
        let today = Utc::now().date_naive();
        let txn = self.db.begin().await?;
        let row = insert_due(&txn, input, today).await?;
        txn.commit().await?;
        tracing::info!(due_id = %row.id, kind = %row.kind, "due created");
        Ok(row)
    }

    /// Fetches one due with display labels for its references.
    ///
    /// # Errors
    ///
    /// Fails with `NotFound` if the due does not exist.
    pub async fn get(&self, due: DueRef) -> Result<DueDetails, DueStoreError> {
        let row = require_due(&self.db, due).await?;
        let counterparty = counterparty_name(&self.db, row.kind, row.counterparty_id).await?;
        let branch = branches::Entity::find_by_id(row.branch_id)
            .one(&self.db)
            .await?
            .map(|b| b.name);
        let movement = match row.stock_movement_id {
            Some(movement_id) => stock_movements::Entity::find_by_id(movement_id)
                .one(&self.db)
                .await?
                .map(|m| m.movement_type),
            None => None,
        };
        Ok(DueDetails {
            due: row,
            counterparty_name: counterparty,
            branch_name: branch,
            movement_type: movement,
        })
    }

    /// Fetches every non-cancelled due derived from one movement.
    pub async fn get_by_movement(&self, movement_id: Uuid) -> Result<Vec<DueRow>, DueStoreError> {
        let rows = find_by_movement(&self.db, movement_id).await?;
        Ok(rows
            .into_iter()
            .filter(|row| !row.status.is_cancelled())
            .collect())
    }

    /// Lists dues within one ledger, soonest due date first.
    pub async fn list(
        &self,
        kind: DueKind,
        filter: &DueListFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<DueRow>, DueStoreError> {
        let (total, rows) = match kind {
            DueKind::Supplier => {
                let mut query = supplier_dues::Entity::find();
                if let Some(counterparty) = filter.counterparty_id {
                    query = query.filter(supplier_dues::Column::SupplierId.eq(counterparty));
                }
                if let Some(branch) = filter.branch_id {
                    query = query.filter(supplier_dues::Column::BranchId.eq(branch));
                }
                if let Some(status) = filter.status {
                    query = query.filter(supplier_dues::Column::Status.eq(status.as_str()));
                }
                if let Some(due_type) = &filter.due_type {
                    query = query.filter(supplier_dues::Column::DueType.eq(due_type));
                }
                let total = query.clone().count(&self.db).await?;
                let models = query
                    .order_by_asc(supplier_dues::Column::DueDate)
                    .order_by_desc(supplier_dues::Column::CreatedAt)
                    .offset(page.offset())
                    .limit(page.limit())
                    .all(&self.db)
                    .await?;
                let rows = models
                    .into_iter()
                    .map(DueRow::try_from)
                    .collect::<Result<Vec<_>, _>>()?;
                (total, rows)
            }
            DueKind::Branch => {
                let mut query = branch_dues::Entity::find();
                if let Some(counterparty) = filter.counterparty_id {
                    query =
                        query.filter(branch_dues::Column::CounterpartyBranchId.eq(counterparty));
                }
                if let Some(branch) = filter.branch_id {
                    query = query.filter(branch_dues::Column::BranchId.eq(branch));
                }
                if let Some(status) = filter.status {
                    query = query.filter(branch_dues::Column::Status.eq(status.as_str()));
                }
                if let Some(due_type) = &filter.due_type {
                    query = query.filter(branch_dues::Column::DueType.eq(due_type));
                }
                let total = query.clone().count(&self.db).await?;
                let models = query
                    .order_by_asc(branch_dues::Column::DueDate)
                    .order_by_desc(branch_dues::Column::CreatedAt)
                    .offset(page.offset())
                    .limit(page.limit())
                    .all(&self.db)
                    .await?;
                let rows = models
                    .into_iter()
                    .map(DueRow::try_from)
                    .collect::<Result<Vec<_>, _>>()?;
                (total, rows)
            }
            DueKind::Customer => {
                let mut query = customer_dues::Entity::find();
                if let Some(counterparty) = filter.counterparty_id {
                    query = query.filter(customer_dues::Column::CustomerId.eq(counterparty));
                }
                if let Some(branch) = filter.branch_id {
                    query = query.filter(customer_dues::Column::BranchId.eq(branch));
                }
                if let Some(status) = filter.status {
                    query = query.filter(customer_dues::Column::Status.eq(status.as_str()));
                }
                if let Some(due_type) = &filter.due_type {
                    query = query.filter(customer_dues::Column::DueType.eq(due_type));
                }
                let total = query.clone().count(&self.db).await?;
                let models = query
                    .order_by_asc(customer_dues::Column::DueDate)
                    .order_by_desc(customer_dues::Column::CreatedAt)
                    .offset(page.offset())
                    .limit(page.limit())
                    .all(&self.db)
                    .await?;
                let rows = models
                    .into_iter()
                    .map(DueRow::try_from)
                    .collect::<Result<Vec<_>, _>>()?;
                (total, rows)
            }
        };

        Ok(PageResponse {
            data: rows,
            meta: PageMeta {
                page: page.page,
                per_page: page.per_page,
                total,
            },
        })
    }

    /// Cancels a due.
    ///
    /// # Errors
    ///
    /// Fails if the due is already cancelled or fully settled, or if it
    /// was modified concurrently.
    pub async fn cancel(&self, due: DueRef) -> Result<DueRow, DueStoreError> {
        let row = require_due(&self.db, due).await?;
        dues::can_cancel(row.status)?;
        let updated = cas_update(
            &self.db,
            &row,
            row.total_amount,
            row.paid_amount,
            row.remaining_amount,
            DueStatus::Cancelled,
            row.payment_date,
        )
        .await?;
        tracing::info!(due_id = %due.id, kind = %due.kind, "due cancelled");
        Ok(updated)
    }

    /// Deletes a due and all of its payments.
    ///
    /// # Errors
    ///
    /// Fails with `NotFound` if the due does not exist.
    pub async fn delete(&self, due: DueRef) -> Result<(), DueStoreError> {
        let txn = self.db.begin().await?;
        delete_due(&txn, due).await?;
        txn.commit().await?;
        tracing::info!(due_id = %due.id, kind = %due.kind, "due deleted");
        Ok(())
    }

    /// Aggregates outstanding amounts over one ledger, broken down by
    /// status with grand totals alongside.
    ///
    /// Cancelled dues are excluded. Overdue is judged against today's
    /// date at call time, so a pending due past its date counts even if
    /// its stored status has not been recomputed yet.
    pub async fn summary(
        &self,
        kind: DueKind,
        filter: &DueListFilter,
    ) -> Result<DueSummary, DueStoreError> {
        let page = PageRequest {
            page: 1,
            per_page: u32::MAX,
        };
        let rows = self.list(kind, filter, &page).await?.data;

        let today = Utc::now().date_naive();
        let mut by_status: Vec<DueStatusSummary> = [
            DueStatus::Pending,
            DueStatus::Partial,
            DueStatus::Overdue,
            DueStatus::Paid,
        ]
        .into_iter()
        .map(|status| DueStatusSummary {
            status,
            due_count: 0,
            total_amount: Decimal::ZERO,
            total_paid: Decimal::ZERO,
            total_remaining: Decimal::ZERO,
        })
        .collect();
        let mut summary = DueSummary {
            by_status: Vec::new(),
            total_amount: Decimal::ZERO,
            total_paid: Decimal::ZERO,
            total_remaining: Decimal::ZERO,
            due_count: 0,
            overdue_count: 0,
        };
        for row in rows {
            if row.status.is_cancelled() {
                continue;
            }
            if let Some(bucket) = by_status.iter_mut().find(|b| b.status == row.status) {
                bucket.due_count += 1;
                bucket.total_amount += row.total_amount;
                bucket.total_paid += row.paid_amount;
                bucket.total_remaining += row.remaining_amount;
            }
            summary.total_amount += row.total_amount;
            summary.total_paid += row.paid_amount;
            summary.total_remaining += row.remaining_amount;
            summary.due_count += 1;
            if row.remaining_amount > Decimal::ZERO && row.due_date < today {
                summary.overdue_count += 1;
            }
        }
        by_status.retain(|b| b.due_count > 0);
        summary.by_status = by_status;
        Ok(summary)
    }
}
