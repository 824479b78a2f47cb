//! Stock movement rules.
//!
//! A movement is a recorded change in product stock quantity (arrival,
//! dispatch, transfer, adjustment) that may obligate a due. This module
//! holds the pure parts: input validation, per-branch quantity effects,
//! and derivation of the due a movement implies.

pub mod effect;
pub mod error;
pub mod plan;
pub mod types;

pub use effect::{StockEffect, quantity_effects};
pub use error::MovementError;
pub use plan::{BRANCH_DUE_TERM_DAYS, DuePlan, SUPPLIER_DUE_TERM_DAYS, derive_due_plan};
pub use types::{MovementStatus, MovementType, NewMovement, compute_total, validate_movement};
