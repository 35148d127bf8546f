//! # Stock Repository
//!
//! Database operations for stock items, including the inventory ledger.
//!
//! ## The Inventory Ledger
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Reserve / Release                                │
//! │                                                                     │
//! │  Order placed                                                       │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  reserve(stock, qty)                                                │
//! │       │  UPDATE stocks                                              │
//! │       │  SET quantity_available = quantity_available - qty          │
//! │       │  WHERE id = ? AND quantity_available >= qty                 │
//! │       │                                                             │
//! │       ├── rows_affected = 1 → reserved                              │
//! │       └── rows_affected = 0 → InsufficientStock (or stock gone)     │
//! │                                                                     │
//! │  Order edited/deleted                                               │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  release(stock, qty) — unconditional increment, no ceiling:         │
//! │  availability is a simple counter, repeated edit cycles may push    │
//! │  it past any original catalog quantity                              │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The guard predicate makes check-and-decrement one atomic statement, so
//! concurrent orders cannot race past the availability check. Order
//! mutations call the `*_on` variants against their own transaction.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use dukaan_core::validation::{
    validate_name, validate_price_paise, validate_stock_quantity,
};
use dukaan_core::{CoreError, NewStock, Stock, StockForOrder, StockUpdate};

/// Repository for stock database operations.
#[derive(Debug, Clone)]
pub struct StockRepository {
    pool: SqlitePool,
}

const STOCK_COLUMNS: &str = "id, business_id, name, regular_price_paise, \
     quantity_available, image, created_at, updated_at";

impl StockRepository {
    /// Creates a new StockRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StockRepository { pool }
    }

    /// Creates a new stock item.
    ///
    /// ## Returns
    /// The created stock with generated id and timestamps.
    pub async fn create(&self, new: &NewStock) -> DbResult<Stock> {
        validate_name(&new.name).map_err(CoreError::from)?;
        validate_price_paise(new.regular_price_paise).map_err(CoreError::from)?;
        validate_stock_quantity(new.quantity_available).map_err(CoreError::from)?;

        let now = Utc::now();
        let stock = Stock {
            id: Uuid::new_v4().to_string(),
            business_id: new.business_id.clone(),
            name: new.name.trim().to_string(),
            regular_price_paise: new.regular_price_paise,
            quantity_available: new.quantity_available,
            image: new.image.clone(),
            created_at: now,
            updated_at: now,
        };

        debug!(id = %stock.id, name = %stock.name, "Creating stock");

        sqlx::query(
            r#"
            INSERT INTO stocks (
                id, business_id, name, regular_price_paise,
                quantity_available, image, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&stock.id)
        .bind(&stock.business_id)
        .bind(&stock.name)
        .bind(stock.regular_price_paise)
        .bind(stock.quantity_available)
        .bind(&stock.image)
        .bind(stock.created_at)
        .bind(stock.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(stock)
    }

    /// Gets a stock item by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Stock))` - Stock found
    /// * `Ok(None)` - Stock not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Stock>> {
        let stock = sqlx::query_as::<_, Stock>(&format!(
            "SELECT {STOCK_COLUMNS} FROM stocks WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(stock)
    }

    /// Lists all stock items for a business, oldest first.
    pub async fn list_by_business(&self, business_id: &str) -> DbResult<Vec<Stock>> {
        let stocks = sqlx::query_as::<_, Stock>(&format!(
            "SELECT {STOCK_COLUMNS} FROM stocks WHERE business_id = ?1 ORDER BY created_at"
        ))
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(stocks)
    }

    /// Lists a business's stock with the price a given customer would pay.
    ///
    /// Walk-in (no customer): every row carries the regular price.
    /// With a customer: rows with a special price carry it and are flagged.
    ///
    /// ## Example
    /// ```rust,ignore
    /// // Order screen for customer X
    /// let stocks = repo.list_for_order(&business_id, Some(&customer_id)).await?;
    /// for s in &stocks {
    ///     println!("{}: {} (special: {})", s.name, s.final_price(), s.has_special_price);
    /// }
    /// ```
    pub async fn list_for_order(
        &self,
        business_id: &str,
        customer_id: Option<&str>,
    ) -> DbResult<Vec<StockForOrder>> {
        // LEFT JOIN against a NULL customer_id never matches, so the
        // walk-in case falls out of the same query.
        let stocks = sqlx::query_as::<_, StockForOrder>(
            r#"
            SELECT
                s.id, s.business_id, s.name, s.regular_price_paise,
                s.quantity_available, s.image, s.created_at, s.updated_at,
                COALESCE(sp.special_price_paise, s.regular_price_paise) AS final_price_paise,
                (sp.id IS NOT NULL) AS has_special_price
            FROM stocks s
            LEFT JOIN customer_special_prices sp
                ON sp.stock_id = s.id AND sp.customer_id = ?2
            WHERE s.business_id = ?1
            ORDER BY s.created_at
            "#,
        )
        .bind(business_id)
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(stocks)
    }

    /// Updates a stock item. `None` fields are left unchanged.
    ///
    /// ## Returns
    /// * `Ok(())` - Update successful
    /// * `Err(DbError::NotFound)` - Stock doesn't exist
    pub async fn update(&self, id: &str, update: &StockUpdate) -> DbResult<()> {
        if let Some(name) = &update.name {
            validate_name(name).map_err(CoreError::from)?;
        }
        if let Some(price) = update.regular_price_paise {
            validate_price_paise(price).map_err(CoreError::from)?;
        }
        if let Some(qty) = update.quantity_available {
            validate_stock_quantity(qty).map_err(CoreError::from)?;
        }

        debug!(id = %id, "Updating stock");

        let result = sqlx::query(
            r#"
            UPDATE stocks SET
                name = COALESCE(?2, name),
                regular_price_paise = COALESCE(?3, regular_price_paise),
                quantity_available = COALESCE(?4, quantity_available),
                image = COALESCE(?5, image),
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(update.name.as_deref().map(str::trim))
        .bind(update.regular_price_paise)
        .bind(update.quantity_available)
        .bind(&update.image)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Stock", id));
        }

        Ok(())
    }

    /// Sets the available quantity to an absolute value.
    ///
    /// Used by the stock screen's direct quantity edit. Order flows never
    /// call this; they go through [`reserve`](Self::reserve) and
    /// [`release`](Self::release).
    pub async fn set_quantity(&self, id: &str, quantity_available: i64) -> DbResult<()> {
        validate_stock_quantity(quantity_available).map_err(CoreError::from)?;

        let result = sqlx::query(
            "UPDATE stocks SET quantity_available = ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(quantity_available)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Stock", id));
        }

        Ok(())
    }

    /// Deletes a stock item.
    ///
    /// Does not cascade: existing order items keep their snapshots and
    /// special prices for this stock are left dangling (readers treat them
    /// as absent).
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting stock");

        let result = sqlx::query("DELETE FROM stocks WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Stock", id));
        }

        Ok(())
    }

    // =========================================================================
    // Inventory Ledger
    // =========================================================================

    /// Reserves `quantity` units of a stock item (standalone, autocommit).
    ///
    /// ## Returns
    /// * `Ok(())` - Quantity decremented
    /// * `Err(Domain(InsufficientStock))` - Not enough available
    /// * `Err(NotFound)` - Stock doesn't exist
    pub async fn reserve(&self, stock_id: &str, quantity: i64) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        Self::reserve_on(&mut conn, stock_id, quantity).await
    }

    /// Releases `quantity` units back to a stock item (standalone, autocommit).
    pub async fn release(&self, stock_id: &str, quantity: i64) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        Self::release_on(&mut conn, stock_id, quantity).await
    }

    /// Reserves stock on an existing connection (used inside order
    /// transactions).
    ///
    /// The `quantity_available >= ?` predicate makes the availability check
    /// and the decrement a single atomic statement: concurrent mutations
    /// cannot race past the check.
    pub(crate) async fn reserve_on(
        conn: &mut SqliteConnection,
        stock_id: &str,
        quantity: i64,
    ) -> DbResult<()> {
        debug!(stock_id = %stock_id, quantity = %quantity, "Reserving stock");

        let result = sqlx::query(
            r#"
            UPDATE stocks
            SET quantity_available = quantity_available - ?2, updated_at = ?3
            WHERE id = ?1 AND quantity_available >= ?2
            "#,
        )
        .bind(stock_id)
        .bind(quantity)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            // Either the stock vanished or there isn't enough of it.
            // Fetch once more for a precise error.
            let row: Option<(String, i64)> =
                sqlx::query_as("SELECT name, quantity_available FROM stocks WHERE id = ?1")
                    .bind(stock_id)
                    .fetch_optional(&mut *conn)
                    .await?;

            return Err(match row {
                Some((name, available)) => CoreError::InsufficientStock {
                    name,
                    available,
                    requested: quantity,
                }
                .into(),
                None => DbError::not_found("Stock", stock_id),
            });
        }

        Ok(())
    }

    /// Releases stock on an existing connection (used inside order
    /// transactions).
    ///
    /// Unconditional increment with no upper bound. A release against a
    /// since-deleted stock is a no-op, matching order deletion semantics:
    /// removing an order whose stock is gone must still succeed.
    pub(crate) async fn release_on(
        conn: &mut SqliteConnection,
        stock_id: &str,
        quantity: i64,
    ) -> DbResult<()> {
        debug!(stock_id = %stock_id, quantity = %quantity, "Releasing stock");

        sqlx::query(
            r#"
            UPDATE stocks
            SET quantity_available = quantity_available + ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(stock_id)
        .bind(quantity)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::testutil::{seed_business, seed_stock, test_db};
    use crate::DbError;
    use dukaan_core::{CoreError, StockUpdate};

    #[tokio::test]
    async fn test_create_and_get() {
        let db = test_db().await;
        let (business_id, _) = seed_business(&db).await;

        let stock = seed_stock(&db, &business_id, "Basmati 1kg", 12000, 40).await;
        let fetched = db.stocks().get_by_id(&stock.id).await.unwrap().unwrap();

        assert_eq!(fetched.name, "Basmati 1kg");
        assert_eq!(fetched.regular_price_paise, 12000);
        assert_eq!(fetched.quantity_available, 40);
    }

    #[tokio::test]
    async fn test_partial_update_leaves_other_fields() {
        let db = test_db().await;
        let (business_id, _) = seed_business(&db).await;
        let stock = seed_stock(&db, &business_id, "Chai Patti", 5000, 10).await;

        db.stocks()
            .update(
                &stock.id,
                &StockUpdate {
                    regular_price_paise: Some(5500),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let updated = db.stocks().get_by_id(&stock.id).await.unwrap().unwrap();
        assert_eq!(updated.regular_price_paise, 5500);
        assert_eq!(updated.name, "Chai Patti");
        assert_eq!(updated.quantity_available, 10);
    }

    #[tokio::test]
    async fn test_reserve_decrements_and_guards() {
        let db = test_db().await;
        let (business_id, _) = seed_business(&db).await;
        let stock = seed_stock(&db, &business_id, "Sugar 1kg", 4500, 5).await;

        db.stocks().reserve(&stock.id, 3).await.unwrap();
        let after = db.stocks().get_by_id(&stock.id).await.unwrap().unwrap();
        assert_eq!(after.quantity_available, 2);

        // Only 2 left; asking for 3 must fail and change nothing.
        let err = db.stocks().reserve(&stock.id, 3).await.unwrap_err();
        match err {
            DbError::Domain(CoreError::InsufficientStock {
                name,
                available,
                requested,
            }) => {
                assert_eq!(name, "Sugar 1kg");
                assert_eq!(available, 2);
                assert_eq!(requested, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let unchanged = db.stocks().get_by_id(&stock.id).await.unwrap().unwrap();
        assert_eq!(unchanged.quantity_available, 2);
    }

    #[tokio::test]
    async fn test_release_has_no_ceiling() {
        let db = test_db().await;
        let (business_id, _) = seed_business(&db).await;
        let stock = seed_stock(&db, &business_id, "Atta 5kg", 25000, 10).await;

        // Availability is a plain counter: releases can push it past the
        // original quantity.
        db.stocks().release(&stock.id, 100).await.unwrap();
        let after = db.stocks().get_by_id(&stock.id).await.unwrap().unwrap();
        assert_eq!(after.quantity_available, 110);
    }

    #[tokio::test]
    async fn test_reserve_missing_stock_is_not_found() {
        let db = test_db().await;
        let err = db.stocks().reserve("no-such-stock", 1).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_by_business_is_tenant_scoped() {
        let db = test_db().await;
        let (business_a, _) = seed_business(&db).await;
        let (business_b, _) = seed_business(&db).await;
        seed_stock(&db, &business_a, "Only in A", 100, 1).await;

        assert_eq!(db.stocks().list_by_business(&business_a).await.unwrap().len(), 1);
        assert!(db.stocks().list_by_business(&business_b).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_stock_is_not_found() {
        let db = test_db().await;
        let err = db.stocks().delete("ghost").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
