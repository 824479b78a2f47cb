//! Derivation of due obligations from stock movements.

use chrono::{Duration, NaiveDate};
use uuid::Uuid;

use crate::dues::DueKind;

use super::types::{MovementType, NewMovement};

/// Payment term for supplier dues created from arrivals, in days.
pub const SUPPLIER_DUE_TERM_DAYS: i64 = 30;

/// Payment term for inter-branch dues created from transfers, in days.
pub const BRANCH_DUE_TERM_DAYS: i64 = 15;

/// A due obligation a movement gives rise to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuePlan {
    /// Which ledger the due belongs to.
    pub kind: DueKind,
    /// The supplier or branch the due is owed to / by.
    pub counterparty_id: Uuid,
    /// When the due must be settled.
    pub due_date: NaiveDate,
    /// Ledger-specific classification of the due.
    pub due_type: String,
}

/// Decides whether a movement obligates a due, and in which ledger.
///
/// Arrivals with a supplier create a supplier due at 30-day terms.
/// Transfers create inter-branch dues at 15-day terms: a receivable at
/// the receiving branch, a payable at the sending branch. Dispatches
/// and adjustments never create dues on their own.
#[must_use]
pub fn derive_due_plan(input: &NewMovement, today: NaiveDate) -> Option<DuePlan> {
    match input.movement_type {
        MovementType::Arrival => input.supplier_id.map(|supplier_id| DuePlan {
            kind: DueKind::Supplier,
            counterparty_id: supplier_id,
            due_date: today + Duration::days(SUPPLIER_DUE_TERM_DAYS),
            due_type: "stock_purchase".to_owned(),
        }),
        MovementType::TransferIn => input.reference_branch_id.map(|branch| DuePlan {
            kind: DueKind::Branch,
            counterparty_id: branch,
            due_date: today + Duration::days(BRANCH_DUE_TERM_DAYS),
            due_type: "receivable".to_owned(),
        }),
        MovementType::TransferOut => input.reference_branch_id.map(|branch| DuePlan {
            kind: DueKind::Branch,
            counterparty_id: branch,
            due_date: today + Duration::days(BRANCH_DUE_TERM_DAYS),
            due_type: "payable".to_owned(),
        }),
        MovementType::Dispatch | MovementType::Adjustment => None,
    }
}
