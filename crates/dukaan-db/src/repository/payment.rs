//! # Payment Repository
//!
//! Payments received from customers and the running khata balance.
//!
//! ## Balance Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Customer Balance                                 │
//! │                                                                     │
//! │  debit  = Σ order totals for the customer (what they took)          │
//! │  credit = Σ payments from the customer    (what they paid)          │
//! │                                                                     │
//! │  balance = debit - credit                                           │
//! │      > 0  customer owes the shop                                    │
//! │      = 0  settled                                                   │
//! │      < 0  shop owes the customer (overpayment / advance)            │
//! │                                                                     │
//! │  Always recomputed from the rows, never cached: editing or          │
//! │  deleting an order or payment is immediately reflected.             │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use dukaan_core::validation::validate_payment_amount;
use dukaan_core::{CoreError, CustomerBalance, NewPayment, Payment, PaymentUpdate};

/// Repository for payment database operations.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: SqlitePool,
}

const PAYMENT_COLUMNS: &str =
    "id, business_id, customer_id, amount_paise, method, note, created_at";

impl PaymentRepository {
    /// Creates a new PaymentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PaymentRepository { pool }
    }

    /// Records a payment from a customer.
    pub async fn create(&self, new: &NewPayment) -> DbResult<Payment> {
        validate_payment_amount(new.amount_paise).map_err(CoreError::from)?;

        let payment = Payment {
            id: Uuid::new_v4().to_string(),
            business_id: new.business_id.clone(),
            customer_id: new.customer_id.clone(),
            amount_paise: new.amount_paise,
            method: new.method,
            note: new.note.clone(),
            created_at: Utc::now(),
        };

        debug!(
            id = %payment.id,
            amount_paise = payment.amount_paise,
            "Recording payment"
        );

        sqlx::query(
            r#"
            INSERT INTO payments (
                id, business_id, customer_id, amount_paise, method, note, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.business_id)
        .bind(&payment.customer_id)
        .bind(payment.amount_paise)
        .bind(payment.method)
        .bind(&payment.note)
        .bind(payment.created_at)
        .execute(&self.pool)
        .await?;

        Ok(payment)
    }

    /// Gets a payment by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Payment>> {
        let payment = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(payment)
    }

    /// Updates a payment. `None` fields are left unchanged.
    pub async fn update(&self, id: &str, update: &PaymentUpdate) -> DbResult<()> {
        if let Some(amount) = update.amount_paise {
            validate_payment_amount(amount).map_err(CoreError::from)?;
        }

        debug!(id = %id, "Updating payment");

        let result = sqlx::query(
            r#"
            UPDATE payments SET
                amount_paise = COALESCE(?2, amount_paise),
                method = COALESCE(?3, method),
                note = COALESCE(?4, note)
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(update.amount_paise)
        .bind(update.method)
        .bind(&update.note)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Payment", id));
        }

        Ok(())
    }

    /// Deletes a payment. The customer's balance rises accordingly.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting payment");

        let result = sqlx::query("DELETE FROM payments WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Payment", id));
        }

        Ok(())
    }

    /// Lists a customer's payments within a business, newest first.
    pub async fn list_by_customer(
        &self,
        business_id: &str,
        customer_id: &str,
    ) -> DbResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments
             WHERE business_id = ?1 AND customer_id = ?2
             ORDER BY created_at DESC"
        ))
        .bind(business_id)
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    /// Lists all payments for a business, newest first.
    pub async fn list_by_business(&self, business_id: &str) -> DbResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments
             WHERE business_id = ?1 ORDER BY created_at DESC"
        ))
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    /// Computes a customer's running balance from their orders and payments.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let bal = db.payments().get_customer_balance(&biz, &cust).await?;
    /// // orders Rs 100, payments Rs 40 → owes Rs 60
    /// assert_eq!(bal.balance_paise, 6000);
    /// ```
    pub async fn get_customer_balance(
        &self,
        business_id: &str,
        customer_id: &str,
    ) -> DbResult<CustomerBalance> {
        let total_debit_paise: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(total_amount_paise), 0) FROM orders
             WHERE business_id = ?1 AND customer_id = ?2",
        )
        .bind(business_id)
        .bind(customer_id)
        .fetch_one(&self.pool)
        .await?;

        let total_credit_paise: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount_paise), 0) FROM payments
             WHERE business_id = ?1 AND customer_id = ?2",
        )
        .bind(business_id)
        .bind(customer_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(CustomerBalance {
            total_debit_paise,
            total_credit_paise,
            balance_paise: total_debit_paise - total_credit_paise,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::testutil::{seed_business, seed_customer, seed_stock, test_db};
    use crate::DbError;
    use dukaan_core::pricing::MissingStockPolicy;
    use dukaan_core::{
        CoreError, NewOrder, NewPayment, OrderLineInput, PaymentMethod, PaymentUpdate,
    };

    async fn pay(
        db: &crate::Database,
        business_id: &str,
        customer_id: &str,
        amount_paise: i64,
    ) -> dukaan_core::Payment {
        db.payments()
            .create(&NewPayment {
                business_id: business_id.to_string(),
                customer_id: customer_id.to_string(),
                amount_paise,
                method: PaymentMethod::Cash,
                note: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_balance_is_orders_minus_payments() {
        let db = test_db().await;
        let (business_id, owner_id) = seed_business(&db).await;
        let stock = seed_stock(&db, &business_id, "Rice", 10000, 50).await;
        let customer = seed_customer(&db, &business_id, "Asha").await;

        // One order of Rs 100.
        db.orders()
            .create_order(
                &NewOrder {
                    business_id: business_id.clone(),
                    customer_id: Some(customer.id.clone()),
                    created_by: owner_id,
                    items: vec![OrderLineInput {
                        stock_id: stock.id.clone(),
                        quantity: 1,
                    }],
                },
                MissingStockPolicy::Skip,
            )
            .await
            .unwrap();

        // Rs 40 paid.
        pay(&db, &business_id, &customer.id, 4000).await;

        let bal = db
            .payments()
            .get_customer_balance(&business_id, &customer.id)
            .await
            .unwrap();
        assert_eq!(bal.total_debit_paise, 10000);
        assert_eq!(bal.total_credit_paise, 4000);
        assert_eq!(bal.balance_paise, 6000);
    }

    #[tokio::test]
    async fn test_balance_goes_negative_on_overpayment() {
        let db = test_db().await;
        let (business_id, _) = seed_business(&db).await;
        let customer = seed_customer(&db, &business_id, "Asha").await;

        pay(&db, &business_id, &customer.id, 5000).await;

        let bal = db
            .payments()
            .get_customer_balance(&business_id, &customer.id)
            .await
            .unwrap();
        assert_eq!(bal.balance_paise, -5000);
    }

    #[tokio::test]
    async fn test_balance_zero_with_no_history() {
        let db = test_db().await;
        let (business_id, _) = seed_business(&db).await;
        let customer = seed_customer(&db, &business_id, "Asha").await;

        let bal = db
            .payments()
            .get_customer_balance(&business_id, &customer.id)
            .await
            .unwrap();
        assert_eq!(bal.total_debit_paise, 0);
        assert_eq!(bal.total_credit_paise, 0);
        assert_eq!(bal.balance_paise, 0);
    }

    #[tokio::test]
    async fn test_deleting_payment_raises_balance() {
        let db = test_db().await;
        let (business_id, _) = seed_business(&db).await;
        let customer = seed_customer(&db, &business_id, "Asha").await;

        let payment = pay(&db, &business_id, &customer.id, 4000).await;
        db.payments().delete(&payment.id).await.unwrap();

        let bal = db
            .payments()
            .get_customer_balance(&business_id, &customer.id)
            .await
            .unwrap();
        assert_eq!(bal.total_credit_paise, 0);
    }

    #[tokio::test]
    async fn test_partial_update() {
        let db = test_db().await;
        let (business_id, _) = seed_business(&db).await;
        let customer = seed_customer(&db, &business_id, "Asha").await;

        let payment = pay(&db, &business_id, &customer.id, 4000).await;
        db.payments()
            .update(
                &payment.id,
                &PaymentUpdate {
                    method: Some(PaymentMethod::Upi),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let updated = db.payments().get_by_id(&payment.id).await.unwrap().unwrap();
        assert_eq!(updated.method, PaymentMethod::Upi);
        assert_eq!(updated.amount_paise, 4000);
    }

    #[tokio::test]
    async fn test_update_with_no_note_keeps_existing_note() {
        let db = test_db().await;
        let (business_id, _) = seed_business(&db).await;
        let customer = seed_customer(&db, &business_id, "Asha").await;

        let payment = db
            .payments()
            .create(&NewPayment {
                business_id: business_id.clone(),
                customer_id: customer.id.clone(),
                amount_paise: 4000,
                method: PaymentMethod::Cash,
                note: Some("Diwali advance".to_string()),
            })
            .await
            .unwrap();

        // A `None` note means "unchanged", not "clear".
        db.payments()
            .update(
                &payment.id,
                &PaymentUpdate {
                    amount_paise: Some(4500),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let updated = db.payments().get_by_id(&payment.id).await.unwrap().unwrap();
        assert_eq!(updated.note.as_deref(), Some("Diwali advance"));
        assert_eq!(updated.amount_paise, 4500);
    }

    #[tokio::test]
    async fn test_zero_amount_rejected() {
        let db = test_db().await;
        let (business_id, _) = seed_business(&db).await;
        let customer = seed_customer(&db, &business_id, "Asha").await;

        let err = db
            .payments()
            .create(&NewPayment {
                business_id: business_id.clone(),
                customer_id: customer.id.clone(),
                amount_paise: 0,
                method: PaymentMethod::Cash,
                note: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_lists_are_scoped_and_newest_first() {
        let db = test_db().await;
        let (business_a, _) = seed_business(&db).await;
        let (business_b, _) = seed_business(&db).await;
        let customer = seed_customer(&db, &business_a, "Asha").await;

        pay(&db, &business_a, &customer.id, 1000).await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        pay(&db, &business_a, &customer.id, 2000).await;

        let payments = db
            .payments()
            .list_by_customer(&business_a, &customer.id)
            .await
            .unwrap();
        assert_eq!(payments.len(), 2);
        assert_eq!(payments[0].amount_paise, 2000);

        assert!(db.payments().list_by_business(&business_b).await.unwrap().is_empty());
    }
}
