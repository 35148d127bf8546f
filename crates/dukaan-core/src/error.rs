//! # Error Types
//!
//! Domain-specific error types for dukaan-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                 │
//! │                                                                     │
//! │  dukaan-core errors (this file)                                     │
//! │  ├── CoreError        - Business rule violations                    │
//! │  └── ValidationError  - Input validation failures                   │
//! │                                                                     │
//! │  dukaan-db errors (separate crate)                                  │
//! │  └── DbError          - Database operation failures                 │
//! │      └── Domain(CoreError) - business failures surfaced from        │
//! │                              inside a transaction                   │
//! │                                                                     │
//! │  Flow: ValidationError → CoreError → DbError → caller               │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (stock name, id, etc.)
//! 3. Errors are enum variants, never String
//! 4. Any error raised inside a mutation aborts that mutation entirely

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations. They abort the mutation
/// that raised them (the surrounding transaction rolls back) and surface to
/// the caller, who displays the message and allows retry.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Stock item cannot be found.
    ///
    /// Raised only under [`crate::pricing::MissingStockPolicy::Strict`];
    /// the default policy silently skips lines whose stock is missing.
    #[error("Stock not found: {0}")]
    StockNotFound(String),

    /// Insufficient stock to fulfil an order line.
    ///
    /// ## User Workflow
    /// ```text
    /// Add line (qty: 5)
    ///      │
    ///      ▼
    /// Reserve against available=3
    ///      │
    ///      ▼
    /// InsufficientStock { name: "Basmati 1kg", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// UI shows: "Insufficient stock for Basmati 1kg"
    /// ```
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Customer not found.
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// User not found.
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Operation is not permitted for this user.
    ///
    /// ## When This Occurs
    /// - Attempting to delete an admin user
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Order has more line items than allowed.
    #[error("Order cannot have more than {max} items")]
    TooManyItems { max: usize },

    /// A money calculation exceeded the representable range.
    ///
    /// Price validation bounds inputs so this cannot happen through the
    /// repositories; it guards direct callers of the pricing functions.
    #[error("Amount exceeds the maximum representable value")]
    AmountOverflow,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
