//! Domain types and validation for stock movements.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::MovementError;

/// The kind of stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    /// Stock arriving from a supplier.
    Arrival,
    /// Stock leaving the branch (sale, write-off dispatch).
    Dispatch,
    /// Stock received from another branch.
    TransferIn,
    /// Stock sent to another branch.
    TransferOut,
    /// Absolute correction of the branch's quantity.
    Adjustment,
}

impl MovementType {
    /// Returns the snake_case wire name of the movement type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Arrival => "arrival",
            Self::Dispatch => "dispatch",
            Self::TransferIn => "transfer_in",
            Self::TransferOut => "transfer_out",
            Self::Adjustment => "adjustment",
        }
    }

    /// Returns true for branch-to-branch transfer types.
    #[must_use]
    pub const fn is_transfer(self) -> bool {
        matches!(self, Self::TransferIn | Self::TransferOut)
    }

    /// Returns true for types that remove stock from the source branch.
    #[must_use]
    pub const fn is_outgoing(self) -> bool {
        matches!(self, Self::Dispatch | Self::TransferOut)
    }
}

impl std::fmt::Display for MovementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MovementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "arrival" => Ok(Self::Arrival),
            "dispatch" => Ok(Self::Dispatch),
            "transfer_in" => Ok(Self::TransferIn),
            "transfer_out" => Ok(Self::TransferOut),
            "adjustment" => Ok(Self::Adjustment),
            _ => Err(format!("unknown movement type: {s}")),
        }
    }
}

/// Lifecycle status of a recorded movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementStatus {
    /// Recorded and (if auto-update was on) applied to stock.
    Completed,
    /// Cancelled; stock effects reverted, dues removed.
    Cancelled,
}

impl MovementStatus {
    /// Returns the lowercase wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for MovementStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("unknown movement status: {s}")),
        }
    }
}

/// Validated input for recording a stock movement.
#[derive(Debug, Clone)]
pub struct NewMovement {
    /// The kind of movement.
    pub movement_type: MovementType,
    /// The product being moved.
    pub product_id: Uuid,
    /// The branch the movement happens at.
    pub branch_id: Uuid,
    /// The other branch for transfer types.
    pub reference_branch_id: Option<Uuid>,
    /// The supplier for arrivals that obligate a due.
    pub supplier_id: Option<Uuid>,
    /// Quantity moved (absolute quantity for adjustments).
    pub quantity: Decimal,
    /// Price per unit.
    pub unit_price: Decimal,
    /// Explicit total; computed as `quantity * unit_price` when absent.
    pub total_amount: Option<Decimal>,
    /// Amount already paid at recording time, seeded into the derived due.
    pub paid_amount: Decimal,
    /// Whether stock quantities and dues are updated automatically.
    pub auto_update_product: bool,
    /// Free-text description.
    pub description: Option<String>,
}

/// Validates a movement input against the pure rules.
///
/// Transfer types require a reference branch that differs from the source
/// branch; quantities must be positive (adjustments may set zero); prices
/// and initial paid amounts must be non-negative.
///
/// # Errors
///
/// Returns the first violated [`MovementError`].
pub fn validate_movement(input: &NewMovement) -> Result<(), MovementError> {
    match input.movement_type {
        MovementType::Adjustment => {
            if input.quantity < Decimal::ZERO {
                return Err(MovementError::InvalidQuantity);
            }
        }
        _ => {
            if input.quantity <= Decimal::ZERO {
                return Err(MovementError::InvalidQuantity);
            }
        }
    }

    if input.unit_price < Decimal::ZERO {
        return Err(MovementError::NegativeUnitPrice);
    }
    if input.paid_amount < Decimal::ZERO {
        return Err(MovementError::NegativePaidAmount);
    }

    if input.movement_type.is_transfer() {
        match input.reference_branch_id {
            None => return Err(MovementError::MissingReferenceBranch),
            Some(reference) if reference == input.branch_id => {
                return Err(MovementError::ReferenceBranchSameAsSource);
            }
            Some(_) => {}
        }
    }

    Ok(())
}

/// Computes a movement's total amount.
///
/// The explicit total wins when supplied; otherwise
/// `quantity * unit_price`.
#[must_use]
pub fn compute_total(quantity: Decimal, unit_price: Decimal, explicit: Option<Decimal>) -> Decimal {
    explicit.unwrap_or_else(|| quantity * unit_price)
}
