//! Repository for payments against dues.
//!
//! Every mutation here runs in one transaction with the owning due's
//! amount update, so the payment history and the due's paid amount can
//! never drift apart. Payment updates and deletions are applied as
//! signed deltas against the due.

use chrono::{NaiveDate, Utc};
use kasira_core::dues::{self, DueRef, DueStatus, PaymentMethod};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::entities::due_payments;

use super::due_ledger::{self, DueRow, DueStoreError};

/// Error types for payment operations.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// The owning due rejected the change.
    #[error(transparent)]
    Due(#[from] DueStoreError),

    /// The payment does not exist.
    #[error("Payment '{0}' not found")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl PaymentError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Due(e) => e.error_code(),
            Self::NotFound(_) => "PAYMENT_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for API responses.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::Due(e) => e.http_status_code(),
            Self::NotFound(_) => 404,
            Self::Database(_) => 500,
        }
    }
}

/// Input for recording a payment against a due.
#[derive(Debug, Clone)]
pub struct NewPayment {
    /// The due being paid.
    pub due: DueRef,
    /// Payment amount. Must be positive and within the remaining balance.
    pub amount: Decimal,
    /// How the payment was made.
    pub payment_method: PaymentMethod,
    /// When the payment was made.
    pub payment_date: NaiveDate,
    /// External reference (cheque number, transfer id).
    pub reference_number: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
    /// The user who recorded the payment.
    pub created_by: Option<Uuid>,
}

/// Changes to an existing payment. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdatePayment {
    /// New payment amount.
    pub amount: Option<Decimal>,
    /// New payment method.
    pub payment_method: Option<PaymentMethod>,
    /// New payment date.
    pub payment_date: Option<NaiveDate>,
    /// New external reference.
    pub reference_number: Option<Option<String>>,
    /// New description.
    pub description: Option<Option<String>>,
}

/// A payment together with the due state it left behind.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentRecord {
    /// The payment row.
    pub payment: due_payments::Model,
    /// The owning due after the change.
    pub due: DueRow,
}

/// Repository for recording, correcting, and deleting due payments.
#[derive(Debug, Clone)]
pub struct DuePaymentRepository {
    db: DatabaseConnection,
}

impl DuePaymentRepository {
    /// Creates a new due payment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a payment and updates the owning due atomically.
    ///
    /// # Errors
    ///
    /// Fails if the due does not exist, is cancelled, the amount is not
    /// positive, or it exceeds the remaining balance. The due and the
    /// payment history are left untouched on failure.
    pub async fn add(&self, input: NewPayment) -> Result<PaymentRecord, PaymentError> {
        if input.amount <= Decimal::ZERO {
            return Err(DueStoreError::Due(dues::DueError::InvalidAmount).into());
        }

        let today = Utc::now().date_naive();
        let txn = self.db.begin().await?;

        let due = due_ledger::require_due(&txn, input.due).await?;
        if due.status.is_cancelled() {
            return Err(DueStoreError::Due(dues::DueError::AlreadyCancelled).into());
        }

        let change = dues::apply_delta(
            due.total_amount,
            due.paid_amount,
            input.amount,
            due.due_date,
            today,
        )
        .map_err(DueStoreError::from)?;

        let payment_date = settlement_date(change.status, input.payment_date, &due);
        let updated = due_ledger::cas_update(
            &txn,
            &due,
            due.total_amount,
            change.paid_amount,
            change.remaining_amount,
            change.status,
            payment_date,
        )
        .await?;

        let now = Utc::now();
        let payment = due_payments::ActiveModel {
            id: Set(Uuid::new_v4()),
            due_kind: Set(input.due.kind.as_str().to_owned()),
            due_id: Set(input.due.id),
            branch_id: Set(due.branch_id),
            amount: Set(input.amount),
            payment_method: Set(input.payment_method.as_str().to_owned()),
            payment_date: Set(input.payment_date),
            reference_number: Set(input.reference_number),
            description: Set(input.description),
            created_by: Set(input.created_by),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        tracing::info!(
            payment_id = %payment.id,
            due_id = %updated.id,
            amount = %payment.amount,
            "payment recorded"
        );
        Ok(PaymentRecord {
            payment,
            due: updated,
        })
    }

    /// Corrects a payment, re-applying the amount difference to the due.
    ///
    /// # Errors
    ///
    /// Fails if the payment does not exist, the new amount is not
    /// positive, the owning due is cancelled, or an increased amount
    /// would exceed the due's remaining balance.
    pub async fn update(
        &self,
        payment_id: Uuid,
        changes: UpdatePayment,
    ) -> Result<PaymentRecord, PaymentError> {
        let today = Utc::now().date_naive();
        let txn = self.db.begin().await?;

        let payment = due_payments::Entity::find_by_id(payment_id)
            .one(&txn)
            .await?
            .ok_or(PaymentError::NotFound(payment_id))?;
        let due_ref = due_ref_of(&payment)?;
        let due = due_ledger::require_due(&txn, due_ref).await?;

        let new_amount = changes.amount.unwrap_or(payment.amount);
        if new_amount <= Decimal::ZERO {
            return Err(DueStoreError::Due(dues::DueError::InvalidAmount).into());
        }
        let delta = new_amount - payment.amount;
        let updated_due = if delta.is_zero() {
            due
        } else {
            if due.status.is_cancelled() {
                return Err(DueStoreError::Due(dues::DueError::AlreadyCancelled).into());
            }
            let change = dues::apply_delta(
                due.total_amount,
                due.paid_amount,
                delta,
                due.due_date,
                today,
            )
            .map_err(DueStoreError::from)?;
            let payment_date = settlement_date(
                change.status,
                changes.payment_date.unwrap_or(payment.payment_date),
                &due,
            );
            due_ledger::cas_update(
                &txn,
                &due,
                due.total_amount,
                change.paid_amount,
                change.remaining_amount,
                change.status,
                payment_date,
            )
            .await?
        };

        let mut active: due_payments::ActiveModel = payment.into();
        active.amount = Set(new_amount);
        if let Some(method) = changes.payment_method {
            active.payment_method = Set(method.as_str().to_owned());
        }
        if let Some(date) = changes.payment_date {
            active.payment_date = Set(date);
        }
        if let Some(reference) = changes.reference_number {
            active.reference_number = Set(reference);
        }
        if let Some(description) = changes.description {
            active.description = Set(description);
        }
        active.updated_at = Set(Utc::now());
        let payment = active.update(&txn).await?;

        txn.commit().await?;
        tracing::info!(payment_id = %payment.id, due_id = %updated_due.id, "payment updated");
        Ok(PaymentRecord {
            payment,
            due: updated_due,
        })
    }

    /// Deletes a payment, restoring its amount to the due's balance.
    ///
    /// Reversing a payment on a cancelled due restores the amounts but
    /// leaves the status as cancelled; cancellation is only ever undone
    /// explicitly.
    ///
    /// # Errors
    ///
    /// Fails if the payment does not exist.
    pub async fn delete(&self, payment_id: Uuid) -> Result<DueRow, PaymentError> {
        let today = Utc::now().date_naive();
        let txn = self.db.begin().await?;

        let payment = due_payments::Entity::find_by_id(payment_id)
            .one(&txn)
            .await?
            .ok_or(PaymentError::NotFound(payment_id))?;
        let due_ref = due_ref_of(&payment)?;
        let due = due_ledger::require_due(&txn, due_ref).await?;

        let change = dues::apply_delta(
            due.total_amount,
            due.paid_amount,
            -payment.amount,
            due.due_date,
            today,
        )
        .map_err(DueStoreError::from)?;
        let status = if due.status.is_cancelled() {
            DueStatus::Cancelled
        } else {
            change.status
        };
        let payment_date = if status == DueStatus::Paid {
            due.payment_date
        } else {
            None
        };
        let updated = due_ledger::cas_update(
            &txn,
            &due,
            due.total_amount,
            change.paid_amount,
            change.remaining_amount,
            status,
            payment_date,
        )
        .await?;

        due_payments::Entity::delete_by_id(payment_id)
            .exec(&txn)
            .await?;

        txn.commit().await?;
        tracing::info!(payment_id = %payment_id, due_id = %updated.id, "payment deleted");
        Ok(updated)
    }

    /// Fetches one payment row.
    ///
    /// # Errors
    ///
    /// Fails if the payment does not exist.
    pub async fn get(&self, payment_id: Uuid) -> Result<due_payments::Model, PaymentError> {
        due_payments::Entity::find_by_id(payment_id)
            .one(&self.db)
            .await?
            .ok_or(PaymentError::NotFound(payment_id))
    }

    /// Lists the payment history of one due, newest first.
    pub async fn list_for_due(
        &self,
        due: DueRef,
    ) -> Result<Vec<due_payments::Model>, PaymentError> {
        let rows = due_payments::Entity::find()
            .filter(due_payments::Column::DueKind.eq(due.kind.as_str()))
            .filter(due_payments::Column::DueId.eq(due.id))
            .order_by_desc(due_payments::Column::PaymentDate)
            .order_by_desc(due_payments::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(rows)
    }
}

/// Records the settlement date when the change settles the due, keeps
/// the existing one when it stays settled, and clears it otherwise.
fn settlement_date(status: DueStatus, paid_on: NaiveDate, due: &DueRow) -> Option<NaiveDate> {
    if status == DueStatus::Paid {
        Some(due.payment_date.unwrap_or(paid_on))
    } else {
        None
    }
}

fn due_ref_of(payment: &due_payments::Model) -> Result<DueRef, PaymentError> {
    let kind = payment
        .due_kind
        .parse()
        .map_err(DbErr::Custom)
        .map_err(PaymentError::from)?;
    Ok(DueRef::new(kind, payment.due_id))
}
