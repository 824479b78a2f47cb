//! Shared setup for integration tests.
//!
//! Tests run against in-memory SQLite with the real migrations applied.
//! The pool is capped at one connection so every handle sees the same
//! in-memory database.

#![allow(dead_code)]

use chrono::Utc;
use kasira_db::entities::{branches, customers, products, suppliers};
use kasira_db::migration::Migrator;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait, Set};
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:".to_owned());
    options.max_connections(1);
    let db = Database::connect(options)
        .await
        .expect("Failed to connect to in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

pub async fn create_branch(db: &DatabaseConnection, name: &str) -> Uuid {
    let id = Uuid::new_v4();
    let now = Utc::now();
    branches::ActiveModel {
        id: Set(id),
        name: Set(name.to_owned()),
        code: Set(format!("BR-{id}")),
        address: Set(None),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to create test branch");
    id
}

pub async fn create_supplier(db: &DatabaseConnection, name: &str) -> Uuid {
    let id = Uuid::new_v4();
    let now = Utc::now();
    suppliers::ActiveModel {
        id: Set(id),
        name: Set(name.to_owned()),
        contact: Set(None),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to create test supplier");
    id
}

pub async fn create_customer(db: &DatabaseConnection, name: &str) -> Uuid {
    let id = Uuid::new_v4();
    let now = Utc::now();
    customers::ActiveModel {
        id: Set(id),
        name: Set(name.to_owned()),
        contact: Set(None),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to create test customer");
    id
}

pub async fn deactivate_supplier(db: &DatabaseConnection, id: Uuid) {
    let supplier = suppliers::Entity::find_by_id(id)
        .one(db)
        .await
        .expect("Failed to load supplier")
        .expect("Supplier missing");
    let mut model: suppliers::ActiveModel = supplier.into();
    model.is_active = Set(false);
    model.update(db).await.expect("Failed to deactivate supplier");
}

pub async fn create_product(db: &DatabaseConnection, unit_price: Decimal) -> Uuid {
    let id = Uuid::new_v4();
    let now = Utc::now();
    products::ActiveModel {
        id: Set(id),
        sku: Set(format!("SKU-{id}")),
        name: Set("Test Product".to_owned()),
        unit_price: Set(unit_price),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to create test product");
    id
}
