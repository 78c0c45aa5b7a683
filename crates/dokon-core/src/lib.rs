//! # dokon-core: Pure Business Logic for Dokon
//!
//! This crate holds every computation the back-office performs on its
//! entity collections. Nothing here touches a database, a clock or a timer:
//! callers pass in snapshots and "now".
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Dokon Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Presentation (out of scope)                     │   │
//! │  │   Products ── Warehouse ── Sales ── Customers ── Reports        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             apps/backoffice (commands, watcher)                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ dokon-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌──────────┐  │   │
//! │  │   │  types  │ │  money  │ │  cart   │ │ report  │ │ notific. │  │   │
//! │  │   │ Product │ │  Money  │ │  Cart   │ │ Period  │ │  Center  │  │   │
//! │  │   │  Sale   │ │Discount │ │CartLine │ │ Report  │ │  Rules   │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └──────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          dokon-db (DataService + EntityStore caches)            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities (Product, Sale, StockMovement, ...) and their inputs
//! - [`money`] - Integer money and basis-point discounts
//! - [`error`] - Domain error types
//! - [`validation`] - Field rules checked before any write
//! - [`cart`] - Session cart and its totals
//! - [`period`] - Calendar windows for reporting
//! - [`report`] - Derived values: low stock, revenue, profit, rankings
//! - [`notification`] - Alert rules and the read/unread list
//!
//! ## Example Usage
//!
//! ```rust
//! use dokon_core::money::{DiscountRate, Money};
//!
//! let price = Money::from_cents(1_000_000);
//! let off = price.discount_amount(DiscountRate::from_percent(15));
//! assert_eq!(off.cents(), 150_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod notification;
pub mod period;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine, CartTotals};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{DiscountRate, Money};
pub use notification::{NotificationCenter, WatchSnapshot};
pub use period::{Period, Window};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Category name given to products whose category was deleted.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Maximum distinct lines allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line, regardless of stock on hand.
///
/// Catches typing 1000 instead of 10 for products with a huge stock.
pub const MAX_ITEM_QUANTITY: i64 = 9_999;

/// Maximum stock on hand, or reorder threshold, of a single product.
pub const MAX_STOCK_QUANTITY: i64 = 10_000_000;

/// Maximum cost or selling price of a product, in cents (one billion in
/// major units).
pub const MAX_PRICE_CENTS: i64 = 100_000_000_000;

/// Default number of notifications kept by the notification center.
pub const DEFAULT_NOTIFICATION_CAPACITY: usize = 50;

/// How many products the "top products" ranking returns.
pub const TOP_PRODUCTS_LIMIT: usize = 5;
