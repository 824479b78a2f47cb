//! Due ledger invariants.
//!
//! A due records money owed by/to a counterparty (supplier, branch, or
//! customer), tied to one originating stock movement. This module holds
//! the pure rules that keep the three parallel ledgers consistent:
//! - Remaining-amount arithmetic (`remaining = total - paid`)
//! - Status derivation (pending/partial/paid/overdue)
//! - Payment amount validation and settlement clamping
//! - The due state machine (cancellation rules)

pub mod amount;
pub mod error;
pub mod types;

#[cfg(test)]
mod props;

pub use amount::{
    AmountChange, apply_delta, can_cancel, compute_remaining, derive_status, initial_state,
    validate_payment_amount, validate_resync_total,
};
pub use error::DueError;
pub use types::{DueKind, DueRef, DueStatus, PaymentMethod};
