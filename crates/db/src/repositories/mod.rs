//! Repository abstractions for data access.

pub mod due_ledger;
pub mod due_payment;
pub mod stock_movement;


pub use due_ledger::{
    CreateDueInput, DueDetails, DueLedgerRepository, DueListFilter, DueRow, DueStatusSummary,
    DueStoreError, DueSummary,
};
pub use due_payment::{DuePaymentRepository, NewPayment, PaymentError, PaymentRecord, UpdatePayment};
pub use stock_movement::{
    MovementRecord, MovementStoreError, MovementListFilter, StockMovementRepository, UpdateMovement,
};
