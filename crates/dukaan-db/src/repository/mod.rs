//! # Repository Module
//!
//! Database repository implementations for Dukaan.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                     │
//! │                                                                     │
//! │  The Repository pattern abstracts database access behind a clean    │
//! │  API.                                                               │
//! │                                                                     │
//! │  API handler                                                        │
//! │       │                                                             │
//! │       │  db.orders().create_order(&req, policy)                     │
//! │       ▼                                                             │
//! │  OrderRepository                                                    │
//! │  ├── create_order(&self, req, policy)                               │
//! │  ├── update_order(&self, id, items, policy)                         │
//! │  ├── delete_order(&self, id)                                        │
//! │  └── get_with_details(&self, id)                                    │
//! │       │                                                             │
//! │       │  SQL in one transaction                                     │
//! │       ▼                                                             │
//! │  SQLite Database                                                    │
//! │                                                                     │
//! │  Benefits:                                                          │
//! │  • Clean separation of concerns                                     │
//! │  • SQL is isolated in one place                                     │
//! │  • Transaction boundaries are visible in one file                   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`business::BusinessRepository`] - Business creation and lookup
//! - [`user::UserRepository`] - User accounts linked to external auth
//! - [`stock::StockRepository`] - Stock CRUD and the inventory ledger
//! - [`customer::CustomerRepository`] - Customers and special prices
//! - [`order::OrderRepository`] - Order lifecycle (the transactional core)
//! - [`payment::PaymentRepository`] - Payments and customer balances

pub mod business;
pub mod customer;
pub mod order;
pub mod payment;
pub mod stock;
pub mod user;
