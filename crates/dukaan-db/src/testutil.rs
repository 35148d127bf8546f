//! Shared helpers for repository tests.
//!
//! Every test gets its own in-memory SQLite database with migrations
//! applied, plus seed helpers for the rows most tests need.

use uuid::Uuid;

use crate::pool::{Database, DbConfig};
use dukaan_core::{Customer, NewCustomer, NewStock, Stock};

/// Creates a fresh in-memory database with all migrations applied.
pub(crate) async fn test_db() -> Database {
    Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database should initialize")
}

/// Creates a business with an admin owner.
///
/// Returns `(business_id, owner_user_id)`.
pub(crate) async fn seed_business(db: &Database) -> (String, String) {
    let auth_id = format!("auth|{}", Uuid::new_v4());
    let (owner, business) = db
        .businesses()
        .create_with_owner("Test Kirana", &auth_id, "owner@test.in")
        .await
        .expect("seed business should be created");
    (business.id, owner.id)
}

/// Creates a stock item under the given business.
pub(crate) async fn seed_stock(
    db: &Database,
    business_id: &str,
    name: &str,
    regular_price_paise: i64,
    quantity_available: i64,
) -> Stock {
    db.stocks()
        .create(&NewStock {
            business_id: business_id.to_string(),
            name: name.to_string(),
            regular_price_paise,
            quantity_available,
            image: String::new(),
        })
        .await
        .expect("seed stock should be created")
}

/// Creates a customer under the given business.
pub(crate) async fn seed_customer(db: &Database, business_id: &str, name: &str) -> Customer {
    db.customers()
        .create(&NewCustomer {
            business_id: business_id.to_string(),
            name: name.to_string(),
            phone: None,
            email: None,
        })
        .await
        .expect("seed customer should be created")
}
