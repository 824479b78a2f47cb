//! `SeaORM` entity definitions.

pub mod branch_dues;
pub mod branch_stock;
pub mod branches;
pub mod customer_dues;
pub mod customers;
pub mod due_payments;
pub mod products;
pub mod stock_movements;
pub mod supplier_dues;
pub mod suppliers;
