//! Property-based tests for due amount invariants.
//!
//! - Remaining-amount integrity: `remaining == total - paid` after every
//!   recomputation
//! - Settlement law: `status == paid` iff `remaining <= 0`
//! - Overpayment rejection leaves nothing to clamp
//! - Payment/reversal round-trips restore the original amounts

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::amount::{apply_delta, compute_remaining, derive_status, initial_state};
use super::error::DueError;
use super::types::DueStatus;

/// Strategy to generate positive decimal amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate non-negative decimal amounts (0.00 to 10,000.00).
fn non_negative_amount() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for `(total, paid)` with `0 <= paid <= total`.
///
/// `paid` is drawn from the range `total` allows rather than filtered
/// after the fact, so no generated case is ever rejected.
fn total_and_paid() -> impl Strategy<Value = (Decimal, Decimal)> {
    (1i64..1_000_000i64)
        .prop_flat_map(|total| (Just(total), 0i64..=total))
        .prop_map(|(total, paid)| (Decimal::new(total, 2), Decimal::new(paid, 2)))
}

/// Strategy for `(total, paid)` with `paid` strictly below `total`.
fn total_and_partial_paid() -> impl Strategy<Value = (Decimal, Decimal)> {
    (1i64..1_000_000i64)
        .prop_flat_map(|total| (Just(total), 0i64..total))
        .prop_map(|(total, paid)| (Decimal::new(total, 2), Decimal::new(paid, 2)))
}

/// Strategy for `(total, paid, delta)` with `0 < delta <= total - paid`.
fn total_paid_and_delta() -> impl Strategy<Value = (Decimal, Decimal, Decimal)> {
    (1i64..1_000_000i64)
        .prop_flat_map(|total| (Just(total), 0i64..total))
        .prop_flat_map(|(total, paid)| (Just(total), Just(paid), 1i64..=total - paid))
        .prop_map(|(total, paid, delta)| {
            (
                Decimal::new(total, 2),
                Decimal::new(paid, 2),
                Decimal::new(delta, 2),
            )
        })
}

/// Strategy to generate a (due_date, today) pair within 2026.
fn date_pair() -> impl Strategy<Value = (NaiveDate, NaiveDate)> {
    ((1u32..=365u32), (1u32..=365u32)).prop_map(|(a, b)| {
        let base = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        (
            base + chrono::Days::new(u64::from(a)),
            base + chrono::Days::new(u64::from(b)),
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// For any valid creation input, `remaining == total - paid`.
    #[test]
    fn prop_initial_remaining_integrity(
        (total, paid) in total_and_paid(),
        (due_date, today) in date_pair(),
    ) {
        let change = initial_state(total, paid, due_date, today).unwrap();
        prop_assert_eq!(change.remaining_amount, total - change.paid_amount);
        prop_assert!(change.remaining_amount >= Decimal::ZERO);
    }

    /// `status == Paid` exactly when nothing remains.
    #[test]
    fn prop_paid_iff_zero_remaining(
        total in positive_amount(),
        paid in non_negative_amount(),
        (due_date, today) in date_pair(),
    ) {
        let status = derive_status(total, paid, due_date, today);
        let remaining = compute_remaining(total, paid);

        prop_assert_eq!(status == DueStatus::Paid, remaining <= Decimal::ZERO);
    }

    /// Cancelled is never derived from amounts and dates.
    #[test]
    fn prop_cancelled_never_derived(
        total in positive_amount(),
        paid in non_negative_amount(),
        (due_date, today) in date_pair(),
    ) {
        prop_assert_ne!(
            derive_status(total, paid, due_date, today),
            DueStatus::Cancelled
        );
    }

    /// A delta within the balance keeps the remaining-amount invariant.
    #[test]
    fn prop_apply_delta_keeps_invariant(
        (total, paid, delta) in total_paid_and_delta(),
        (due_date, today) in date_pair(),
    ) {
        let change = apply_delta(total, paid, delta, due_date, today).unwrap();
        prop_assert_eq!(change.remaining_amount, total - change.paid_amount);
        prop_assert!(change.paid_amount <= total);
        prop_assert!(change.remaining_amount >= Decimal::ZERO);
    }

    /// A delta beyond the balance always fails with `ExceedsRemaining`.
    #[test]
    fn prop_overpayment_always_rejected(
        (total, paid) in total_and_paid(),
        excess in positive_amount(),
        (due_date, today) in date_pair(),
    ) {
        let delta = (total - paid) + excess;
        let result = apply_delta(total, paid, delta, due_date, today);
        let rejected = matches!(result, Err(DueError::ExceedsRemaining { .. }));
        prop_assert!(rejected);
    }

    /// Paying then reversing the same amount restores the original state.
    #[test]
    fn prop_payment_reversal_round_trip(
        (total, paid, delta) in total_paid_and_delta(),
        (due_date, today) in date_pair(),
    ) {
        let after_pay = apply_delta(total, paid, delta, due_date, today).unwrap();
        let after_reverse = apply_delta(
            total,
            after_pay.paid_amount,
            -delta,
            due_date,
            today,
        )
        .unwrap();

        prop_assert_eq!(after_reverse.paid_amount, paid);
        prop_assert_eq!(after_reverse.remaining_amount, total - paid);
        prop_assert_eq!(
            after_reverse.status,
            derive_status(total, paid, due_date, today)
        );
    }

    /// Exact settlement clamps remaining to zero and reports Paid.
    #[test]
    fn prop_exact_settlement_is_paid(
        (total, paid) in total_and_partial_paid(),
        (due_date, today) in date_pair(),
    ) {
        let change = apply_delta(total, paid, total - paid, due_date, today).unwrap();
        prop_assert_eq!(change.remaining_amount, Decimal::ZERO);
        prop_assert_eq!(change.paid_amount, total);
        prop_assert_eq!(change.status, DueStatus::Paid);
    }
}
