//! Core business logic for Kasira.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. All domain types, validation rules, and calculations
//! live here.
//!
//! # Modules
//!
//! - `dues` - Due ledger invariants: remaining amounts, status derivation,
//!   payment validation, the due state machine
//! - `stock` - Stock movement validation, quantity effects, and derivation
//!   of the dues a movement implies

pub mod dues;
pub mod stock;
