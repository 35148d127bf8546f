//! # Domain Types
//!
//! Core domain types used throughout Dukaan.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                │
//! │                                                                     │
//! │  Business ──owns──► Stock, Customer, Order, Payment                 │
//! │                                                                     │
//! │  ┌───────────────┐   ┌───────────────┐   ┌───────────────┐          │
//! │  │    Stock      │   │    Order      │   │   Payment     │          │
//! │  │  ───────────  │   │  ───────────  │   │  ───────────  │          │
//! │  │  id (UUID)    │   │  id (UUID)    │   │  id (UUID)    │          │
//! │  │  name         │   │  customer_id? │   │  customer_id  │          │
//! │  │  price paise  │   │  total paise  │   │  method       │          │
//! │  │  qty avail    │   │  created_by   │   │  amount paise │          │
//! │  └───────────────┘   └───────┬───────┘   └───────────────┘          │
//! │                              │                                      │
//! │                       ┌──────▼────────┐                             │
//! │                       │  OrderItem    │  price snapshot at sale     │
//! │                       └───────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Tenant Boundary
//! Every Stock/Customer/Order/Payment belongs to exactly one Business.
//! Cross-business references must never be followed; repository queries
//! always filter by `business_id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// User & Business
// =============================================================================

/// Role of a user within a business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Business owner. Admins cannot be deleted.
    Admin,
    /// Invited staff member of an existing business.
    TeamMember,
}

/// A user account, linked to the external identity provider.
///
/// Authentication itself is delegated; we only store the provider's subject
/// id (`auth_id`) to associate sessions with rows.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Subject id from the external identity provider.
    pub auth_id: String,

    pub email: String,

    pub role: UserRole,

    /// None while an owner is mid-onboarding (business not yet created).
    pub business_id: Option<String>,
}

/// A business: the root tenant boundary.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Business {
    pub id: String,
    pub name: String,
    /// The admin user who owns this business.
    pub owner_id: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Stock
// =============================================================================

/// An inventory item available for sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Stock {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Business this stock belongs to.
    pub business_id: String,

    /// Display name shown in catalogs and on order details.
    pub name: String,

    /// Regular catalog price in paise.
    pub regular_price_paise: i64,

    /// Units currently available. Never negative.
    pub quantity_available: i64,

    /// Image reference (upload mechanics are external).
    pub image: String,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Stock {
    /// Returns the regular price as a Money type.
    #[inline]
    pub fn regular_price(&self) -> Money {
        Money::from_paise(self.regular_price_paise)
    }
}

/// A stock row enriched with the price the given customer would pay.
///
/// Produced by the order screen query: walk-in customers always see the
/// regular price; customers with a special price see that instead.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockForOrder {
    pub id: String,
    pub business_id: String,
    pub name: String,
    pub regular_price_paise: i64,
    pub quantity_available: i64,
    pub image: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    /// Special price if one exists for the customer, else the regular price.
    pub final_price_paise: i64,
    pub has_special_price: bool,
}

impl StockForOrder {
    /// Returns the effective price as Money.
    #[inline]
    pub fn final_price(&self) -> Money {
        Money::from_paise(self.final_price_paise)
    }
}

/// Fields for creating a stock item.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewStock {
    pub business_id: String,
    pub name: String,
    pub regular_price_paise: i64,
    pub quantity_available: i64,
    pub image: String,
}

/// Partial update for a stock item. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockUpdate {
    pub name: Option<String>,
    pub regular_price_paise: Option<i64>,
    pub quantity_available: Option<i64>,
    pub image: Option<String>,
}

// =============================================================================
// Customer & Special Prices
// =============================================================================

/// A customer of a business.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub business_id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Fields for creating a customer.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewCustomer {
    pub business_id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// A customer-specific unit-price override for one stock item.
///
/// At most one row exists per (customer, stock) pair; writes go through an
/// upsert that updates in place.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SpecialPrice {
    pub id: String,
    pub business_id: String,
    pub customer_id: String,
    pub stock_id: String,
    pub special_price_paise: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl SpecialPrice {
    /// Returns the override price as Money.
    #[inline]
    pub fn special_price(&self) -> Money {
        Money::from_paise(self.special_price_paise)
    }
}

/// A special price enriched with details of the stock it overrides.
///
/// Stock fields are `None` when the stock row has since been deleted
/// (deletes do not cascade).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SpecialPriceDetail {
    pub id: String,
    pub business_id: String,
    pub customer_id: String,
    pub stock_id: String,
    pub special_price_paise: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub stock_name: Option<String>,
    pub regular_price_paise: Option<i64>,
    pub stock_image: Option<String>,
}

// =============================================================================
// Order
// =============================================================================

/// An order placed by (or for) a customer.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub business_id: String,
    /// None for walk-in orders (always priced at regular catalog price).
    pub customer_id: Option<String>,
    /// The user who rang the order up.
    pub created_by: String,
    /// Denormalized: always equals the sum of this order's item totals.
    pub total_amount_paise: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Returns the order total as Money.
    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_paise(self.total_amount_paise)
    }
}

/// A line item in an order.
/// Uses the snapshot pattern to freeze the unit price at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub stock_id: String,
    pub quantity: i64,
    /// Unit price in paise at time of sale (frozen).
    pub unit_price_paise: i64,
    /// Line total (unit_price × quantity), also frozen.
    pub total_price_paise: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    /// Returns the unit price snapshot as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_paise(self.unit_price_paise)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn total_price(&self) -> Money {
        Money::from_paise(self.total_price_paise)
    }
}

/// An order item enriched with stock presentation details.
///
/// `stock_name` falls back to "Unknown" when the stock row has been deleted.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderItemDetail {
    pub id: String,
    pub order_id: String,
    pub stock_id: String,
    pub quantity: i64,
    pub unit_price_paise: i64,
    pub total_price_paise: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub stock_name: String,
    pub stock_image: Option<String>,
}

/// Full order view for the order detail screen.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderDetails {
    pub order: Order,
    /// None for walk-in orders or when the customer row was deleted.
    pub customer: Option<Customer>,
    /// None when the creating user was deleted.
    pub created_by_user: Option<User>,
    pub items: Vec<OrderItemDetail>,
}

/// One (stock, quantity) pairing submitted by the order screen.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderLineInput {
    pub stock_id: String,
    pub quantity: i64,
}

/// Request to create an order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewOrder {
    pub business_id: String,
    pub customer_id: Option<String>,
    pub created_by: String,
    pub items: Vec<OrderLineInput>,
}

// =============================================================================
// Payment
// =============================================================================

/// How a customer settled (part of) their balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Upi,
    Bank,
    Cheque,
}

/// A payment received from a customer (a credit against their balance).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Payment {
    pub id: String,
    pub business_id: String,
    pub customer_id: String,
    pub amount_paise: i64,
    pub method: PaymentMethod,
    pub note: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Payment {
    /// Returns the payment amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_paise(self.amount_paise)
    }
}

/// Fields for recording a payment.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewPayment {
    pub business_id: String,
    pub customer_id: String,
    pub amount_paise: i64,
    pub method: PaymentMethod,
    pub note: Option<String>,
}

/// Partial update for a payment. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentUpdate {
    pub amount_paise: Option<i64>,
    pub method: Option<PaymentMethod>,
    /// `None` means "leave the note as is", even though the stored note is
    /// itself nullable. A note cannot be cleared back to empty through an
    /// update; delete and re-record the payment instead.
    pub note: Option<String>,
}

/// A customer's running khata balance.
///
/// debit = everything ordered, credit = everything paid; balance is what the
/// customer still owes. Recomputed on every call, never cached.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerBalance {
    pub total_debit_paise: i64,
    pub total_credit_paise: i64,
    pub balance_paise: i64,
}

impl CustomerBalance {
    /// Returns the outstanding balance as Money.
    #[inline]
    pub fn balance(&self) -> Money {
        Money::from_paise(self.balance_paise)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
