//! Domain types for the due ledgers.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which of the three parallel due ledgers a record belongs to.
///
/// The ledgers are structurally identical; the kind selects the
/// counterparty table (supplier, branch, or customer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DueKind {
    /// Money owed to a supplier (stock purchases).
    Supplier,
    /// Money owed between branches (stock transfers).
    Branch,
    /// Money owed by a customer.
    Customer,
}

impl DueKind {
    /// Returns the lowercase wire name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Supplier => "supplier",
            Self::Branch => "branch",
            Self::Customer => "customer",
        }
    }
}

impl std::fmt::Display for DueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DueKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "supplier" => Ok(Self::Supplier),
            "branch" => Ok(Self::Branch),
            "customer" => Ok(Self::Customer),
            _ => Err(format!("unknown due kind: {s}")),
        }
    }
}

/// Polymorphic reference to a due in one of the three ledgers.
///
/// Payments point at dues through this tagged pair instead of a raw
/// string discriminator switched on at every call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueRef {
    /// The ledger the due lives in.
    pub kind: DueKind,
    /// The due's ID within that ledger.
    pub id: Uuid,
}

impl DueRef {
    /// Creates a new due reference.
    #[must_use]
    pub const fn new(kind: DueKind, id: Uuid) -> Self {
        Self { kind, id }
    }
}

/// Lifecycle status of a due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DueStatus {
    /// No payment received yet.
    Pending,
    /// Partially paid, balance outstanding.
    Partial,
    /// Fully settled (remaining amount is zero).
    Paid,
    /// Unpaid or partial with the due date in the past. Time-derived,
    /// never sticky: recomputation can move it back to pending/partial.
    Overdue,
    /// Explicitly cancelled. Terminal.
    Cancelled,
}

impl DueStatus {
    /// Returns the lowercase wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Partial => "partial",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns true if the due is fully settled.
    #[must_use]
    pub const fn is_paid(self) -> bool {
        matches!(self, Self::Paid)
    }

    /// Returns true if the due has been cancelled.
    #[must_use]
    pub const fn is_cancelled(self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl std::fmt::Display for DueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DueStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "partial" => Ok(Self::Partial),
            "paid" => Ok(Self::Paid),
            "overdue" => Ok(Self::Overdue),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("unknown due status: {s}")),
        }
    }
}

/// Accepted payment methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash payment.
    Cash,
    /// Bank transfer.
    BankTransfer,
    /// Cheque.
    Cheque,
    /// Card payment.
    Card,
}

impl PaymentMethod {
    /// Returns the snake_case wire name of the method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::BankTransfer => "bank_transfer",
            Self::Cheque => "cheque",
            Self::Card => "card",
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cash" => Ok(Self::Cash),
            "bank_transfer" => Ok(Self::BankTransfer),
            "cheque" => Ok(Self::Cheque),
            "card" => Ok(Self::Card),
            _ => Err(format!("unknown payment method: {s}")),
        }
    }
}
