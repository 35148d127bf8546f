//! # Order Repository
//!
//! Order lifecycle: creation, edit, deletion, and detail views. This is the
//! transactional core of Dukaan.
//!
//! ## Order Creation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                  create_order (one transaction)                     │
//! │                                                                     │
//! │  BEGIN                                                              │
//! │    │                                                                │
//! │    ├── load stock snapshot for referenced lines                     │
//! │    ├── load the customer's special prices (walk-in: none)           │
//! │    ├── price_lines(...)        ← pure, in dukaan-core               │
//! │    │                                                                │
//! │    ├── INSERT order (total = 0)                                     │
//! │    ├── for each priced line:                                        │
//! │    │     INSERT order_item (unit price snapshot)                    │
//! │    │     reserve stock (guarded decrement)                          │
//! │    │         └── insufficient? → error → ROLLBACK, nothing persists │
//! │    └── UPDATE order total = Σ line totals                           │
//! │  COMMIT                                                             │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Order Edit
//! Editing replaces the item set wholesale: release every old line back to
//! stock, delete the old items, then run creation again with the new lines.
//! Re-pricing uses *current* catalog and special prices, so an edited order
//! may total differently than the original even with identical lines.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::stock::StockRepository;
use dukaan_core::pricing::{price_lines, MissingStockPolicy, PricedOrder};
use dukaan_core::{
    CoreError, Customer, Money, NewOrder, Order, OrderDetails, OrderItem, OrderItemDetail,
    OrderLineInput, Stock, User,
};

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

const ORDER_COLUMNS: &str =
    "id, business_id, customer_id, created_by, total_amount_paise, created_at";

const ITEM_COLUMNS: &str =
    "id, order_id, stock_id, quantity, unit_price_paise, total_price_paise, created_at";

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Creates an order with its line items, atomically.
    ///
    /// ## Arguments
    /// * `req` - Business, optional customer, creating user, and lines
    /// * `policy` - What to do with lines whose stock no longer exists
    ///
    /// ## Returns
    /// * `Ok(Order)` - Order persisted; total equals the sum of item totals
    /// * `Err(Domain(InsufficientStock))` - A line exceeded availability;
    ///   nothing was persisted
    ///
    /// An order whose every line was skipped still commits, with no items
    /// and a total of zero.
    pub async fn create_order(
        &self,
        req: &NewOrder,
        policy: MissingStockPolicy,
    ) -> DbResult<Order> {
        let mut tx = self.pool.begin().await?;

        let priced =
            Self::price_request(&mut tx, &req.items, req.customer_id.as_deref(), policy).await?;

        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4().to_string(),
            business_id: req.business_id.clone(),
            customer_id: req.customer_id.clone(),
            created_by: req.created_by.clone(),
            total_amount_paise: priced.total.paise(),
            created_at: now,
        };

        debug!(
            order_id = %order.id,
            lines = priced.lines.len(),
            "Creating order"
        );

        // Total starts at zero and is patched after the items land, so the
        // stored value is always derived from persisted items.
        sqlx::query(
            r#"
            INSERT INTO orders (
                id, business_id, customer_id, created_by,
                total_amount_paise, created_at
            ) VALUES (?1, ?2, ?3, ?4, 0, ?5)
            "#,
        )
        .bind(&order.id)
        .bind(&order.business_id)
        .bind(&order.customer_id)
        .bind(&order.created_by)
        .bind(order.created_at)
        .execute(&mut *tx)
        .await?;

        Self::write_items(&mut tx, &order.id, &priced, now).await?;
        Self::patch_total(&mut tx, &order.id, priced.total).await?;

        tx.commit().await?;

        info!(
            order_id = %order.id,
            total_paise = order.total_amount_paise,
            "Order created"
        );

        Ok(order)
    }

    /// Replaces an order's items with a new set, atomically.
    ///
    /// Old lines are released back to stock, then the new lines are priced
    /// and reserved exactly as on creation. The order keeps its customer,
    /// creator and creation time.
    ///
    /// ## Returns
    /// The order with its recomputed total.
    pub async fn update_order(
        &self,
        order_id: &str,
        items: &[OrderLineInput],
        policy: MissingStockPolicy,
    ) -> DbResult<Order> {
        let mut tx = self.pool.begin().await?;

        let mut order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"
        ))
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;

        debug!(order_id = %order_id, "Updating order");

        Self::release_items(&mut tx, order_id).await?;

        let priced =
            Self::price_request(&mut tx, items, order.customer_id.as_deref(), policy).await?;

        Self::write_items(&mut tx, order_id, &priced, Utc::now()).await?;
        Self::patch_total(&mut tx, order_id, priced.total).await?;

        tx.commit().await?;

        order.total_amount_paise = priced.total.paise();

        info!(
            order_id = %order_id,
            total_paise = order.total_amount_paise,
            "Order updated"
        );

        Ok(order)
    }

    /// Deletes an order, returning all of its items' quantities to stock.
    ///
    /// Releases against since-deleted stock are silently skipped; the
    /// deletion itself always proceeds.
    pub async fn delete_order(&self, order_id: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        debug!(order_id = %order_id, "Deleting order");

        Self::release_items(&mut tx, order_id).await?;

        let result = sqlx::query("DELETE FROM orders WHERE id = ?1")
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", order_id));
        }

        tx.commit().await?;

        info!(order_id = %order_id, "Order deleted");
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Gets an order by its ID.
    pub async fn get_by_id(&self, order_id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"
        ))
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Lists a business's orders, newest first.
    pub async fn list_by_business(&self, business_id: &str) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders
             WHERE business_id = ?1 ORDER BY created_at DESC"
        ))
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Gets the raw line items of an order.
    pub async fn get_items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items
             WHERE order_id = ?1 ORDER BY created_at"
        ))
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Gets an order with customer, creator and item details for display.
    ///
    /// Dangling references degrade rather than fail: a deleted customer or
    /// creator comes back as `None`, a deleted stock as name "Unknown".
    pub async fn get_with_details(&self, order_id: &str) -> DbResult<OrderDetails> {
        let order = self
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;

        let customer = match &order.customer_id {
            Some(customer_id) => {
                sqlx::query_as::<_, Customer>(
                    "SELECT id, business_id, name, phone, email, created_at
                     FROM customers WHERE id = ?1",
                )
                .bind(customer_id)
                .fetch_optional(&self.pool)
                .await?
            }
            None => None,
        };

        let created_by_user = sqlx::query_as::<_, User>(
            "SELECT id, auth_id, email, role, business_id FROM users WHERE id = ?1",
        )
        .bind(&order.created_by)
        .fetch_optional(&self.pool)
        .await?;

        let items = sqlx::query_as::<_, OrderItemDetail>(
            r#"
            SELECT
                oi.id, oi.order_id, oi.stock_id, oi.quantity,
                oi.unit_price_paise, oi.total_price_paise, oi.created_at,
                COALESCE(s.name, 'Unknown') AS stock_name,
                s.image AS stock_image
            FROM order_items oi
            LEFT JOIN stocks s ON s.id = oi.stock_id
            WHERE oi.order_id = ?1
            ORDER BY oi.created_at
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(OrderDetails {
            order,
            customer,
            created_by_user,
            items,
        })
    }

    // =========================================================================
    // Transaction Steps
    // =========================================================================

    /// Prices the submitted lines against current catalog and special prices.
    ///
    /// Reads happen on the order's own transaction so the priced snapshot is
    /// consistent with the reservations that follow.
    async fn price_request(
        tx: &mut Transaction<'_, Sqlite>,
        items: &[OrderLineInput],
        customer_id: Option<&str>,
        policy: MissingStockPolicy,
    ) -> DbResult<PricedOrder> {
        let stocks = Self::load_stock_snapshot(&mut *tx, items).await?;

        let special_prices = match customer_id {
            Some(customer_id) => Self::load_special_prices(&mut *tx, customer_id).await?,
            None => HashMap::new(),
        };

        let priced = price_lines(items, &stocks, &special_prices, policy)?;
        Ok(priced)
    }

    /// Loads the stock rows referenced by the submitted lines, keyed by id.
    /// Lines whose stock is missing simply don't appear in the map.
    async fn load_stock_snapshot(
        conn: &mut SqliteConnection,
        items: &[OrderLineInput],
    ) -> DbResult<HashMap<String, Stock>> {
        let mut stocks = HashMap::with_capacity(items.len());

        for line in items {
            if stocks.contains_key(&line.stock_id) {
                continue;
            }
            let stock = sqlx::query_as::<_, Stock>(
                "SELECT id, business_id, name, regular_price_paise,
                        quantity_available, image, created_at, updated_at
                 FROM stocks WHERE id = ?1",
            )
            .bind(&line.stock_id)
            .fetch_optional(&mut *conn)
            .await?;

            if let Some(stock) = stock {
                stocks.insert(stock.id.clone(), stock);
            }
        }

        Ok(stocks)
    }

    /// Loads a customer's special prices keyed by stock id.
    async fn load_special_prices(
        conn: &mut SqliteConnection,
        customer_id: &str,
    ) -> DbResult<HashMap<String, Money>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT stock_id, special_price_paise
             FROM customer_special_prices WHERE customer_id = ?1",
        )
        .bind(customer_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(stock_id, paise)| (stock_id, Money::from_paise(paise)))
            .collect())
    }

    /// Inserts the priced lines as order items and reserves their stock.
    ///
    /// The reservation is the availability check: a line that cannot be
    /// covered errors out here and the caller's transaction rolls back.
    async fn write_items(
        tx: &mut Transaction<'_, Sqlite>,
        order_id: &str,
        priced: &PricedOrder,
        now: chrono::DateTime<chrono::Utc>,
    ) -> DbResult<()> {
        for line in &priced.lines {
            sqlx::query(
                r#"
                INSERT INTO order_items (
                    id, order_id, stock_id, quantity,
                    unit_price_paise, total_price_paise, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(order_id)
            .bind(&line.stock_id)
            .bind(line.quantity)
            .bind(line.unit_price.paise())
            .bind(line.line_total.paise())
            .bind(now)
            .execute(&mut **tx)
            .await?;

            StockRepository::reserve_on(&mut *tx, &line.stock_id, line.quantity).await?;
        }

        Ok(())
    }

    /// Returns an order's item quantities to stock and deletes the items.
    async fn release_items(tx: &mut Transaction<'_, Sqlite>, order_id: &str) -> DbResult<()> {
        let items: Vec<(String, i64)> = sqlx::query_as(
            "SELECT stock_id, quantity FROM order_items WHERE order_id = ?1",
        )
        .bind(order_id)
        .fetch_all(&mut **tx)
        .await?;

        for (stock_id, quantity) in &items {
            StockRepository::release_on(&mut *tx, stock_id, *quantity).await?;
        }

        sqlx::query("DELETE FROM order_items WHERE order_id = ?1")
            .bind(order_id)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Patches the denormalized order total.
    async fn patch_total(
        tx: &mut Transaction<'_, Sqlite>,
        order_id: &str,
        total: Money,
    ) -> DbResult<()> {
        sqlx::query("UPDATE orders SET total_amount_paise = ?2 WHERE id = ?1")
            .bind(order_id)
            .bind(total.paise())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
