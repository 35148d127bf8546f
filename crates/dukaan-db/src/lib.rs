//! # dukaan-db: Database Layer for Dukaan
//!
//! This crate provides database access for the Dukaan retail ledger.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        Dukaan Data Flow                             │
//! │                                                                     │
//! │  API handler (create_order)                                         │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │                    dukaan-db (THIS CRATE)                     │ │
//! │  │                                                               │ │
//! │  │   ┌─────────────┐   ┌────────────────┐   ┌────────────────┐  │ │
//! │  │   │  Database   │   │  Repositories  │   │   Migrations   │  │ │
//! │  │   │  (pool.rs)  │   │  (repository/) │   │   (embedded)   │  │ │
//! │  │   │             │   │                │   │                │  │ │
//! │  │   │ SqlitePool  │◄──│ StockRepo      │   │ 001_init.sql   │  │ │
//! │  │   │ WAL mode    │   │ OrderRepo      │   │                │  │ │
//! │  │   │             │   │ CustomerRepo…  │   │                │  │ │
//! │  │   └─────────────┘   └────────────────┘   └────────────────┘  │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  SQLite file (or :memory: in tests)                                 │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Transaction Discipline
//! The hosted backend this system replaces ran every mutation as one atomic
//! unit. Here that contract is explicit: order create/update/delete and
//! every other multi-step mutation runs inside a single sqlx transaction,
//! so a failure (e.g. insufficient stock) leaves nothing partial behind.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

#[cfg(test)]
pub(crate) mod testutil;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::DbError;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::business::BusinessRepository;
pub use repository::customer::CustomerRepository;
pub use repository::order::OrderRepository;
pub use repository::payment::PaymentRepository;
pub use repository::stock::StockRepository;
pub use repository::user::UserRepository;
