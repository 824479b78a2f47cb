//! Error types for stock movement validation.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised by the pure movement validation rules.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MovementError {
    /// Quantity must be positive (non-negative for adjustments).
    #[error("Quantity must be positive")]
    InvalidQuantity,

    /// Unit price cannot be negative.
    #[error("Unit price cannot be negative")]
    NegativeUnitPrice,

    /// Transfer movements require a reference branch.
    #[error("Transfer movements require a reference branch")]
    MissingReferenceBranch,

    /// A transfer cannot reference the source branch itself.
    #[error("Reference branch must differ from the source branch")]
    ReferenceBranchSameAsSource,

    /// Initial paid amount cannot be negative.
    #[error("Initial paid amount cannot be negative")]
    NegativePaidAmount,

    /// Not enough stock at the branch for an outgoing movement.
    #[error("Insufficient stock at branch {branch_id}: available {available}, requested {requested}")]
    InsufficientStock {
        /// The branch being debited.
        branch_id: Uuid,
        /// Quantity currently available.
        available: Decimal,
        /// Quantity requested.
        requested: Decimal,
    },
}

impl MovementError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidQuantity => "INVALID_QUANTITY",
            Self::NegativeUnitPrice => "NEGATIVE_UNIT_PRICE",
            Self::MissingReferenceBranch => "MISSING_REFERENCE_BRANCH",
            Self::ReferenceBranchSameAsSource => "REFERENCE_BRANCH_SAME_AS_SOURCE",
            Self::NegativePaidAmount => "NEGATIVE_PAID_AMOUNT",
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
        }
    }

    /// Returns the HTTP status code for API responses. Every variant is
    /// a validation or business-rule failure.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        400
    }
}
