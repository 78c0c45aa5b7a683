//! # Commands Module
//!
//! Everything a presentation layer calls into.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs           ◄─── You are here (exports)
//! ├── product.rs       ◄─── Product list, search, CRUD
//! ├── category.rs      ◄─── Categories (delete reassigns products)
//! ├── customer.rs      ◄─── Customer list, search, CRUD
//! ├── supplier.rs      ◄─── Supplier CRUD
//! ├── warehouse.rs     ◄─── Stock movements, inventory stats, purchase orders
//! ├── cart.rs          ◄─── Cart manipulation
//! ├── sale.rs          ◄─── Checkout and sales history
//! ├── report.rs        ◄─── Sales report, dashboard, spreadsheet export
//! ├── notification.rs  ◄─── Notification bell
//! └── config.rs        ◄─── Configuration retrieval
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  Presentation layer                                                     │
//! │  ──────────────────                                                     │
//! │  let product = add_product(&state, &input).await?;                      │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  pub async fn add_product(                                              │
//! │      state: &AppState,        ◄── Built once at startup                 │
//! │      input: &NewProduct,      ◄── From the form                         │
//! │  ) -> Result<Product, ApiError>                                         │
//! │         │                                                               │
//! │         │ store.write() ─► validate ─► data service ─► cache            │
//! │         ▼                                                               │
//! │  Ok(Product) or Err(ApiError { code, message })                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All payload and response types are serde types, so a presentation layer
//! can forward them as JSON unchanged.

pub mod cart;
pub mod category;
pub mod config;
pub mod customer;
pub mod notification;
pub mod product;
pub mod report;
pub mod sale;
pub mod supplier;
pub mod warehouse;
