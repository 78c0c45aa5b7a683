//! # dokon-db: Data Service and Entity Store for Dokon
//!
//! This crate owns everything that talks to storage: the row-oriented
//! [`DataService`] abstraction, its SQLite and in-memory implementations,
//! and the [`EntityStore`] that caches every collection the back-office
//! works with.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Dokon Data Flow                                  │
//! │                                                                         │
//! │  Command (add_stock_movement)                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     dokon-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │  EntityStore  │    │  DataService  │    │  Migrations  │  │   │
//! │  │   │  (store/)     │───►│  (service.rs) │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ cached Vecs   │    │ Database      │    │ 001_init.sql │  │   │
//! │  │   │ validation    │    │ MemoryData..  │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   <platform data dir>/dokon.db                                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`service`] - `DataService` trait, `Table`, `Query`, row helpers
//! - [`pool`] - SQLite connection pool and `DataService` implementation
//! - [`memory`] - in-memory `DataService` with failure injection
//! - [`migrations`] - embedded database migrations
//! - [`store`] - `EntityStore` caches and mutations
//! - [`error`] - `DbError` and `StoreError`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use dokon_db::{Database, DbConfig, EntityStore};
//!
//! let db = Database::new(DbConfig::new("path/to/dokon.db")).await?;
//! let mut store = EntityStore::new(Arc::new(db));
//! store.load().await?;
//!
//! let low = dokon_core::report::low_stock(store.products());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod memory;
pub mod migrations;
pub mod pool;
pub mod service;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, StoreError, StoreResult};
pub use memory::{MemoryDataService, Operation};
pub use pool::{Database, DbConfig};
pub use service::{DataService, Query, Row, Table};
pub use store::EntityStore;
