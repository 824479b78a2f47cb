//! Pure amount arithmetic and status derivation for dues.
//!
//! Every mutation of a due row funnels through these functions so the
//! invariant `remaining_amount == total_amount - paid_amount` and the
//! status rules are enforced in exactly one place, regardless of which
//! of the three ledgers the row lives in.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::DueError;
use super::types::DueStatus;

/// The outstanding balance: `total - paid`.
#[must_use]
pub fn compute_remaining(total: Decimal, paid: Decimal) -> Decimal {
    total - paid
}

/// Derives the status of a due from its amounts and dates.
///
/// Rules, in precedence order:
/// 1. `Paid` when nothing remains (`total - paid <= 0`)
/// 2. `Overdue` when the due date is strictly in the past
/// 3. `Partial` when some payment has been received
/// 4. `Pending` otherwise
///
/// `Cancelled` is never derived here; it is set explicitly and checked by
/// [`can_cancel`].
#[must_use]
pub fn derive_status(
    total: Decimal,
    paid: Decimal,
    due_date: NaiveDate,
    today: NaiveDate,
) -> DueStatus {
    if compute_remaining(total, paid) <= Decimal::ZERO {
        DueStatus::Paid
    } else if due_date < today {
        DueStatus::Overdue
    } else if paid > Decimal::ZERO {
        DueStatus::Partial
    } else {
        DueStatus::Pending
    }
}

/// Validates a payment amount against the outstanding balance.
///
/// # Errors
///
/// Returns `InvalidAmount` if `amount <= 0`, or `ExceedsRemaining` if the
/// payment is larger than the balance.
pub fn validate_payment_amount(amount: Decimal, remaining: Decimal) -> Result<(), DueError> {
    if amount <= Decimal::ZERO {
        return Err(DueError::InvalidAmount);
    }
    if amount > remaining {
        return Err(DueError::ExceedsRemaining { amount, remaining });
    }
    Ok(())
}

/// Result of recomputing a due's amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountChange {
    /// New paid amount (clamped to `[0, total]`).
    pub paid_amount: Decimal,
    /// New remaining amount (clamped to `>= 0`).
    pub remaining_amount: Decimal,
    /// Status derived from the new amounts.
    pub status: DueStatus,
}

/// Applies a signed payment delta to a due's amounts.
///
/// Positive deltas are payments and are validated against the current
/// remaining balance. Negative deltas are reversals (payment updates or
/// deletions). Results are clamped so `paid` stays within `[0, total]`
/// and `remaining` never goes negative when a payment exactly settles
/// the due.
///
/// # Errors
///
/// Returns `ExceedsRemaining` if a positive delta is larger than the
/// current balance, leaving the due untouched.
pub fn apply_delta(
    total: Decimal,
    paid: Decimal,
    delta: Decimal,
    due_date: NaiveDate,
    today: NaiveDate,
) -> Result<AmountChange, DueError> {
    if delta > Decimal::ZERO {
        validate_payment_amount(delta, compute_remaining(total, paid))?;
    }

    let mut new_paid = paid + delta;
    if new_paid > total {
        new_paid = total;
    }
    if new_paid < Decimal::ZERO {
        new_paid = Decimal::ZERO;
    }

    let remaining = compute_remaining(total, new_paid);
    Ok(AmountChange {
        paid_amount: new_paid,
        remaining_amount: remaining,
        status: derive_status(total, new_paid, due_date, today),
    })
}

/// Computes the initial amounts and status of a new due.
///
/// # Errors
///
/// Returns `NonPositiveTotal` if `total <= 0`, `InvalidAmount` if the
/// initial paid amount is negative, or `PaidExceedsTotal` if it is larger
/// than the total.
pub fn initial_state(
    total: Decimal,
    paid: Decimal,
    due_date: NaiveDate,
    today: NaiveDate,
) -> Result<AmountChange, DueError> {
    if total <= Decimal::ZERO {
        return Err(DueError::NonPositiveTotal);
    }
    if paid < Decimal::ZERO {
        return Err(DueError::InvalidAmount);
    }
    if paid > total {
        return Err(DueError::PaidExceedsTotal { paid, total });
    }

    Ok(AmountChange {
        paid_amount: paid,
        remaining_amount: compute_remaining(total, paid),
        status: derive_status(total, paid, due_date, today),
    })
}

/// Validates an absolute total resync against payments already applied.
///
/// Used when an originating stock movement is edited: the due's total is
/// overwritten, but never below what has already been paid.
///
/// # Errors
///
/// Returns `NonPositiveTotal` or `PaidExceedsTotal`.
pub fn validate_resync_total(new_total: Decimal, paid: Decimal) -> Result<(), DueError> {
    if new_total <= Decimal::ZERO {
        return Err(DueError::NonPositiveTotal);
    }
    if paid > new_total {
        return Err(DueError::PaidExceedsTotal {
            paid,
            total: new_total,
        });
    }
    Ok(())
}

/// Checks whether a due in the given status may be cancelled.
///
/// `Paid` and `Cancelled` are terminal with respect to cancellation:
/// a settled due cannot be cancelled, and cancelling twice is rejected
/// so the conditional update stays idempotency-safe.
///
/// # Errors
///
/// Returns `AlreadyCancelled` or `CannotCancelPaid`.
pub fn can_cancel(status: DueStatus) -> Result<(), DueError> {
    match status {
        DueStatus::Cancelled => Err(DueError::AlreadyCancelled),
        DueStatus::Paid => Err(DueError::CannotCancelPaid),
        DueStatus::Pending | DueStatus::Partial | DueStatus::Overdue => Ok(()),
    }
}
