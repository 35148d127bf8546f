//! # dukaan-core: Pure Business Logic for Dukaan
//!
//! This crate is the heart of Dukaan, a multi-tenant retail ledger. It
//! contains all business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       Dukaan Architecture                           │
//! │                                                                     │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │                    Web Frontend (external)                    │ │
//! │  │    Stock UI ──► Order Cart UI ──► Payments UI ──► Khata UI    │ │
//! │  └─────────────────────────────┬─────────────────────────────────┘ │
//! │                                │ JSON (ts-rs generated types)       │
//! │  ┌─────────────────────────────▼─────────────────────────────────┐ │
//! │  │               ★ dukaan-core (THIS CRATE) ★                    │ │
//! │  │                                                               │ │
//! │  │   ┌─────────┐  ┌─────────┐  ┌──────────┐  ┌────────────┐     │ │
//! │  │   │  types  │  │  money  │  │ pricing  │  │ validation │     │ │
//! │  │   │  Stock  │  │  Money  │  │ resolve  │  │   rules    │     │ │
//! │  │   │  Order  │  │ (paise) │  │  lines   │  │   checks   │     │ │
//! │  │   └─────────┘  └─────────┘  └──────────┘  └────────────┘     │ │
//! │  │                                                               │ │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS          │ │
//! │  └─────────────────────────────┬─────────────────────────────────┘ │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼─────────────────────────────────┐ │
//! │  │                   dukaan-db (Database Layer)                  │ │
//! │  │          SQLite queries, migrations, repositories             │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Business, Stock, Customer, Order, Payment)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`pricing`] - Price resolution and order line composition
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in paise (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use dukaan_core::money::Money;
//! use dukaan_core::pricing::resolve_unit_price;
//!
//! // Create money from paise (never from floats!)
//! let regular = Money::from_paise(1000); // Rs 10.00
//! let special = Money::from_paise(700);  // Rs 7.00
//!
//! // Special price wins when present
//! assert_eq!(resolve_unit_price(Some(special), regular), special);
//! assert_eq!(resolve_unit_price(None, regular), regular);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use dukaan_core::Money` instead of
// `use dukaan_core::money::Money`

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items allowed in a single order.
///
/// ## Business Reason
/// Prevents runaway carts and keeps a single mutation's transaction small.
pub const MAX_ORDER_ITEMS: usize = 100;

/// Maximum quantity of a single stock item per order line.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 9999;

/// Maximum price or payment amount in paise (Rs 1,000 crore).
///
/// ## Business Reason
/// Bounds what a fat-fingered price entry can do, and keeps every order
/// total representable: MAX_PRICE_PAISE × MAX_ITEM_QUANTITY ×
/// MAX_ORDER_ITEMS stays well inside i64.
pub const MAX_PRICE_PAISE: i64 = 1_000_000_000_000;
