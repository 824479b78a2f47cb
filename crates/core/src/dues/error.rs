//! Error types for due amount and state validation.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by the pure due invariant checks.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DueError {
    /// Payment amount must be positive.
    #[error("Payment amount must be positive")]
    InvalidAmount,

    /// Payment would exceed the outstanding balance.
    #[error("Payment of {amount} exceeds remaining balance of {remaining}")]
    ExceedsRemaining {
        /// The attempted payment amount.
        amount: Decimal,
        /// The due's current remaining amount.
        remaining: Decimal,
    },

    /// A due's total amount must be positive.
    #[error("Total amount must be positive")]
    NonPositiveTotal,

    /// Paid amount cannot exceed the total amount.
    #[error("Paid amount {paid} exceeds total amount {total}")]
    PaidExceedsTotal {
        /// The paid amount.
        paid: Decimal,
        /// The total amount.
        total: Decimal,
    },

    /// The due has already been cancelled.
    #[error("Due is already cancelled")]
    AlreadyCancelled,

    /// A fully settled due cannot be cancelled.
    #[error("Cannot cancel a settled due")]
    CannotCancelPaid,
}

impl DueError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount => "INVALID_AMOUNT",
            Self::ExceedsRemaining { .. } => "EXCEEDS_REMAINING",
            Self::NonPositiveTotal => "NON_POSITIVE_TOTAL",
            Self::PaidExceedsTotal { .. } => "PAID_EXCEEDS_TOTAL",
            Self::AlreadyCancelled => "ALREADY_CANCELLED",
            Self::CannotCancelPaid => "CANNOT_CANCEL_PAID",
        }
    }

    /// Returns the HTTP status code for API responses. Every variant is
    /// a validation or business-rule failure.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        400
    }
}
