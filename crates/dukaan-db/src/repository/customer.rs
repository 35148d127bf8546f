//! # Customer Repository
//!
//! Customers and their per-stock special prices.
//!
//! ## Special Prices
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                 Special Price Upsert                                │
//! │                                                                     │
//! │  set_special_price(customer, stock, Rs 7.00)                        │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  Row exists for (customer, stock)?                                  │
//! │       ├── yes → UPDATE price in place (id unchanged)                │
//! │       └── no  → INSERT new row                                      │
//! │                                                                     │
//! │  At most one row per pair; UNIQUE(customer_id, stock_id) backstops  │
//! │  the upsert against races.                                          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Changing or removing a special price never touches existing order items:
//! those carry their own unit-price snapshots.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use dukaan_core::validation::{validate_name, validate_phone, validate_price_paise};
use dukaan_core::{CoreError, Customer, NewCustomer, SpecialPrice, SpecialPriceDetail};

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

const CUSTOMER_COLUMNS: &str = "id, business_id, name, phone, email, created_at";

const SPECIAL_PRICE_COLUMNS: &str =
    "id, business_id, customer_id, stock_id, special_price_paise, created_at";

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    // =========================================================================
    // Customers
    // =========================================================================

    /// Creates a new customer.
    pub async fn create(&self, new: &NewCustomer) -> DbResult<Customer> {
        validate_name(&new.name).map_err(CoreError::from)?;
        validate_phone(new.phone.as_deref()).map_err(CoreError::from)?;

        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            business_id: new.business_id.clone(),
            name: new.name.trim().to_string(),
            phone: new.phone.clone(),
            email: new.email.clone(),
            created_at: Utc::now(),
        };

        debug!(id = %customer.id, name = %customer.name, "Creating customer");

        sqlx::query(
            r#"
            INSERT INTO customers (id, business_id, name, phone, email, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.business_id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(customer.created_at)
        .execute(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Gets a customer by their ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Lists a business's customers, newest first.
    pub async fn list_by_business(&self, business_id: &str) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers
             WHERE business_id = ?1 ORDER BY created_at DESC"
        ))
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Updates a customer. `None` phone/email are left unchanged.
    pub async fn update(
        &self,
        id: &str,
        name: &str,
        phone: Option<&str>,
        email: Option<&str>,
    ) -> DbResult<()> {
        validate_name(name).map_err(CoreError::from)?;
        validate_phone(phone).map_err(CoreError::from)?;

        debug!(id = %id, "Updating customer");

        let result = sqlx::query(
            r#"
            UPDATE customers SET
                name = ?2,
                phone = COALESCE(?3, phone),
                email = COALESCE(?4, email)
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(name.trim())
        .bind(phone)
        .bind(email)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(())
    }

    /// Deletes a customer.
    ///
    /// Does not cascade: the customer's orders, payments and special prices
    /// remain, with readers treating the reference as dangling.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting customer");

        let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(())
    }

    // =========================================================================
    // Special Prices
    // =========================================================================

    /// Sets a customer's special price for one stock item (upsert).
    ///
    /// ## Returns
    /// The id of the special-price row (existing id when updated in place).
    pub async fn set_special_price(
        &self,
        business_id: &str,
        customer_id: &str,
        stock_id: &str,
        special_price_paise: i64,
    ) -> DbResult<String> {
        validate_price_paise(special_price_paise).map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await?;

        let existing: Option<String> = sqlx::query_scalar(
            "SELECT id FROM customer_special_prices
             WHERE customer_id = ?1 AND stock_id = ?2",
        )
        .bind(customer_id)
        .bind(stock_id)
        .fetch_optional(&mut *tx)
        .await?;

        let id = match existing {
            Some(id) => {
                debug!(id = %id, "Updating special price in place");
                sqlx::query(
                    "UPDATE customer_special_prices SET special_price_paise = ?2 WHERE id = ?1",
                )
                .bind(&id)
                .bind(special_price_paise)
                .execute(&mut *tx)
                .await?;
                id
            }
            None => {
                let id = Uuid::new_v4().to_string();
                debug!(id = %id, "Creating special price");
                sqlx::query(
                    r#"
                    INSERT INTO customer_special_prices (
                        id, business_id, customer_id, stock_id,
                        special_price_paise, created_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                    "#,
                )
                .bind(&id)
                .bind(business_id)
                .bind(customer_id)
                .bind(stock_id)
                .bind(special_price_paise)
                .bind(Utc::now())
                .execute(&mut *tx)
                .await?;
                id
            }
        };

        tx.commit().await?;
        Ok(id)
    }

    /// Removes a customer's special price for one stock item.
    ///
    /// Removing a price that doesn't exist is a no-op.
    pub async fn remove_special_price(&self, customer_id: &str, stock_id: &str) -> DbResult<()> {
        debug!(customer_id = %customer_id, stock_id = %stock_id, "Removing special price");

        sqlx::query(
            "DELETE FROM customer_special_prices WHERE customer_id = ?1 AND stock_id = ?2",
        )
        .bind(customer_id)
        .bind(stock_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a customer's special price for one stock, if any.
    pub async fn get_special_price(
        &self,
        customer_id: &str,
        stock_id: &str,
    ) -> DbResult<Option<SpecialPrice>> {
        let price = sqlx::query_as::<_, SpecialPrice>(&format!(
            "SELECT {SPECIAL_PRICE_COLUMNS} FROM customer_special_prices
             WHERE customer_id = ?1 AND stock_id = ?2"
        ))
        .bind(customer_id)
        .bind(stock_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(price)
    }

    /// Lists a customer's special prices with stock details.
    ///
    /// Stock fields are `None` for prices whose stock has been deleted.
    pub async fn list_special_prices(
        &self,
        customer_id: &str,
    ) -> DbResult<Vec<SpecialPriceDetail>> {
        let prices = sqlx::query_as::<_, SpecialPriceDetail>(
            r#"
            SELECT
                sp.id, sp.business_id, sp.customer_id, sp.stock_id,
                sp.special_price_paise, sp.created_at,
                s.name AS stock_name,
                s.regular_price_paise AS regular_price_paise,
                s.image AS stock_image
            FROM customer_special_prices sp
            LEFT JOIN stocks s ON s.id = sp.stock_id
            WHERE sp.customer_id = ?1
            ORDER BY sp.created_at
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(prices)
    }

    /// Returns the unit price (in paise) this customer would pay for a stock.
    ///
    /// Special price if set, else the regular price, else 0 when the stock
    /// doesn't exist. The zero fallback keeps price previews total-safe for
    /// references that dangle.
    pub async fn get_price_for_customer(
        &self,
        customer_id: &str,
        stock_id: &str,
    ) -> DbResult<i64> {
        let special: Option<i64> = sqlx::query_scalar(
            "SELECT special_price_paise FROM customer_special_prices
             WHERE customer_id = ?1 AND stock_id = ?2",
        )
        .bind(customer_id)
        .bind(stock_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(paise) = special {
            return Ok(paise);
        }

        let regular: Option<i64> =
            sqlx::query_scalar("SELECT regular_price_paise FROM stocks WHERE id = ?1")
                .bind(stock_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(regular.unwrap_or(0))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::testutil::{seed_business, seed_customer, seed_stock, test_db};
    use crate::DbError;

    #[tokio::test]
    async fn test_create_and_list_newest_first() {
        let db = test_db().await;
        let (business_id, _) = seed_business(&db).await;

        seed_customer(&db, &business_id, "Asha").await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        seed_customer(&db, &business_id, "Bilal").await;

        let customers = db.customers().list_by_business(&business_id).await.unwrap();
        assert_eq!(customers.len(), 2);
        assert_eq!(customers[0].name, "Bilal");
    }

    #[tokio::test]
    async fn test_update_keeps_unset_fields() {
        let db = test_db().await;
        let (business_id, _) = seed_business(&db).await;
        let customer = db
            .customers()
            .create(&dukaan_core::NewCustomer {
                business_id: business_id.clone(),
                name: "Asha".to_string(),
                phone: Some("+91 98765 43210".to_string()),
                email: None,
            })
            .await
            .unwrap();

        db.customers()
            .update(&customer.id, "Asha Devi", None, Some("asha@example.in"))
            .await
            .unwrap();

        let updated = db.customers().get_by_id(&customer.id).await.unwrap().unwrap();
        assert_eq!(updated.name, "Asha Devi");
        assert_eq!(updated.phone.as_deref(), Some("+91 98765 43210"));
        assert_eq!(updated.email.as_deref(), Some("asha@example.in"));
    }

    #[tokio::test]
    async fn test_special_price_upsert_updates_in_place() {
        let db = test_db().await;
        let (business_id, _) = seed_business(&db).await;
        let stock = seed_stock(&db, &business_id, "Rice", 1000, 10).await;
        let customer = seed_customer(&db, &business_id, "Asha").await;

        let first_id = db
            .customers()
            .set_special_price(&business_id, &customer.id, &stock.id, 700)
            .await
            .unwrap();
        let second_id = db
            .customers()
            .set_special_price(&business_id, &customer.id, &stock.id, 650)
            .await
            .unwrap();

        // Same row, updated in place.
        assert_eq!(first_id, second_id);

        let prices = db.customers().list_special_prices(&customer.id).await.unwrap();
        assert_eq!(prices.len(), 1);
        assert_eq!(prices[0].special_price_paise, 650);
        assert_eq!(prices[0].stock_name.as_deref(), Some("Rice"));
    }

    #[tokio::test]
    async fn test_remove_special_price_is_idempotent() {
        let db = test_db().await;
        let (business_id, _) = seed_business(&db).await;
        let stock = seed_stock(&db, &business_id, "Rice", 1000, 10).await;
        let customer = seed_customer(&db, &business_id, "Asha").await;

        db.customers()
            .set_special_price(&business_id, &customer.id, &stock.id, 700)
            .await
            .unwrap();
        db.customers()
            .remove_special_price(&customer.id, &stock.id)
            .await
            .unwrap();
        // Second removal: nothing to delete, still ok.
        db.customers()
            .remove_special_price(&customer.id, &stock.id)
            .await
            .unwrap();

        assert!(db
            .customers()
            .get_special_price(&customer.id, &stock.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_price_for_customer_resolution() {
        let db = test_db().await;
        let (business_id, _) = seed_business(&db).await;
        let stock = seed_stock(&db, &business_id, "Rice", 1000, 10).await;
        let customer = seed_customer(&db, &business_id, "Asha").await;

        // No special: regular price.
        assert_eq!(
            db.customers()
                .get_price_for_customer(&customer.id, &stock.id)
                .await
                .unwrap(),
            1000
        );

        db.customers()
            .set_special_price(&business_id, &customer.id, &stock.id, 700)
            .await
            .unwrap();
        assert_eq!(
            db.customers()
                .get_price_for_customer(&customer.id, &stock.id)
                .await
                .unwrap(),
            700
        );

        // Missing stock: zero.
        assert_eq!(
            db.customers()
                .get_price_for_customer(&customer.id, "ghost")
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_special_price_detail_survives_stock_deletion() {
        let db = test_db().await;
        let (business_id, _) = seed_business(&db).await;
        let stock = seed_stock(&db, &business_id, "Rice", 1000, 10).await;
        let customer = seed_customer(&db, &business_id, "Asha").await;

        db.customers()
            .set_special_price(&business_id, &customer.id, &stock.id, 700)
            .await
            .unwrap();
        db.stocks().delete(&stock.id).await.unwrap();

        let prices = db.customers().list_special_prices(&customer.id).await.unwrap();
        assert_eq!(prices.len(), 1);
        assert!(prices[0].stock_name.is_none());
        assert!(prices[0].regular_price_paise.is_none());
    }

    #[tokio::test]
    async fn test_delete_customer_leaves_orders_behind() {
        let db = test_db().await;
        let (business_id, owner_id) = seed_business(&db).await;
        let stock = seed_stock(&db, &business_id, "Rice", 1000, 10).await;
        let customer = seed_customer(&db, &business_id, "Asha").await;

        let order = db
            .orders()
            .create_order(
                &dukaan_core::NewOrder {
                    business_id: business_id.clone(),
                    customer_id: Some(customer.id.clone()),
                    created_by: owner_id,
                    items: vec![dukaan_core::OrderLineInput {
                        stock_id: stock.id.clone(),
                        quantity: 1,
                    }],
                },
                dukaan_core::pricing::MissingStockPolicy::Skip,
            )
            .await
            .unwrap();

        db.customers().delete(&customer.id).await.unwrap();

        // Order remains; the detail view degrades to customer: None.
        let details = db.orders().get_with_details(&order.id).await.unwrap();
        assert!(details.customer.is_none());
        assert_eq!(details.order.customer_id.as_deref(), Some(customer.id.as_str()));
    }

    #[tokio::test]
    async fn test_delete_missing_customer_is_not_found() {
        let db = test_db().await;
        let err = db.customers().delete("ghost").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
