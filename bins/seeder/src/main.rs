//! Database seeder for Kasira development and testing.
//!
//! Seeds a demo branch/supplier/customer/product set for local
//! development and testing purposes.
//!
//! Usage: cargo run --bin seeder

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use std::str::FromStr;
use uuid::Uuid;

use kasira_db::entities::{branches, customers, products, suppliers};

/// Demo branch IDs (consistent for all seeds).
const BRANCHES: &[(&str, &str, &str)] = &[
    (
        "00000000-0000-0000-0000-000000000101",
        "Central Warehouse",
        "HQ-01",
    ),
    (
        "00000000-0000-0000-0000-000000000102",
        "Downtown Store",
        "ST-01",
    ),
];

/// Demo supplier IDs.
const SUPPLIERS: &[(&str, &str)] = &[
    ("00000000-0000-0000-0000-000000000201", "Acme Wholesale"),
    ("00000000-0000-0000-0000-000000000202", "Global Foods Co"),
];

/// Demo customer IDs.
const CUSTOMERS: &[(&str, &str)] = &[
    ("00000000-0000-0000-0000-000000000301", "Corner Cafe"),
    ("00000000-0000-0000-0000-000000000302", "Hotel Meridian"),
];

/// Demo product IDs with SKU, name, and unit price.
const PRODUCTS: &[(&str, &str, &str, &str)] = &[
    (
        "00000000-0000-0000-0000-000000000401",
        "RICE-5KG",
        "Premium Rice 5kg",
        "68.50",
    ),
    (
        "00000000-0000-0000-0000-000000000402",
        "OIL-1L",
        "Cooking Oil 1L",
        "18.00",
    ),
    (
        "00000000-0000-0000-0000-000000000403",
        "SUGAR-1KG",
        "White Sugar 1kg",
        "14.25",
    ),
];

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = kasira_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding branches...");
    seed_branches(&db).await;

    println!("Seeding suppliers...");
    seed_suppliers(&db).await;

    println!("Seeding customers...");
    seed_customers(&db).await;

    println!("Seeding products...");
    seed_products(&db).await;

    println!("Seeding complete!");
}

fn parse_id(raw: &str) -> Uuid {
    Uuid::parse_str(raw).expect("Seed IDs are valid UUIDs")
}

async fn seed_branches(db: &DatabaseConnection) {
    for (id, name, code) in BRANCHES {
        let id = parse_id(id);
        if branches::Entity::find_by_id(id)
            .one(db)
            .await
            .ok()
            .flatten()
            .is_some()
        {
            println!("  Branch {name} already exists, skipping...");
            continue;
        }

        let branch = branches::ActiveModel {
            id: Set(id),
            name: Set((*name).to_string()),
            code: Set((*code).to_string()),
            address: Set(None),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
        };

        if let Err(e) = branch.insert(db).await {
            eprintln!("Failed to insert branch {name}: {e}");
        } else {
            println!("  Created branch: {name}");
        }
    }
}

async fn seed_suppliers(db: &DatabaseConnection) {
    for (id, name) in SUPPLIERS {
        let id = parse_id(id);
        if suppliers::Entity::find_by_id(id)
            .one(db)
            .await
            .ok()
            .flatten()
            .is_some()
        {
            println!("  Supplier {name} already exists, skipping...");
            continue;
        }

        let supplier = suppliers::ActiveModel {
            id: Set(id),
            name: Set((*name).to_string()),
            contact: Set(None),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
        };

        if let Err(e) = supplier.insert(db).await {
            eprintln!("Failed to insert supplier {name}: {e}");
        } else {
            println!("  Created supplier: {name}");
        }
    }
}

async fn seed_customers(db: &DatabaseConnection) {
    for (id, name) in CUSTOMERS {
        let id = parse_id(id);
        if customers::Entity::find_by_id(id)
            .one(db)
            .await
            .ok()
            .flatten()
            .is_some()
        {
            println!("  Customer {name} already exists, skipping...");
            continue;
        }

        let customer = customers::ActiveModel {
            id: Set(id),
            name: Set((*name).to_string()),
            contact: Set(None),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
        };

        if let Err(e) = customer.insert(db).await {
            eprintln!("Failed to insert customer {name}: {e}");
        } else {
            println!("  Created customer: {name}");
        }
    }
}

async fn seed_products(db: &DatabaseConnection) {
    for (id, sku, name, price) in PRODUCTS {
        let id = parse_id(id);
        if products::Entity::find_by_id(id)
            .one(db)
            .await
            .ok()
            .flatten()
            .is_some()
        {
            println!("  Product {name} already exists, skipping...");
            continue;
        }

        let product = products::ActiveModel {
            id: Set(id),
            sku: Set((*sku).to_string()),
            name: Set((*name).to_string()),
            unit_price: Set(Decimal::from_str(price).expect("Seed prices are valid decimals")),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
        };

        if let Err(e) = product.insert(db).await {
            eprintln!("Failed to insert product {name}: {e}");
        } else {
            println!("  Created product: {name} ({sku})");
        }
    }
}
