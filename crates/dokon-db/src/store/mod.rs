//! # Entity Store
//!
//! In-memory collections of every entity, obtained from and persisted to a
//! [`DataService`].
//!
//! ## Mutation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        EntityStore mutation                             │
//! │                                                                         │
//! │  add_product(input)                                                    │
//! │       │                                                                 │
//! │       ├── validate ──── Err ──► StoreError::Validation (nothing written)│
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DataService::insert ── Err ──► StoreError::ExternalService            │
//! │       │                          (cache untouched, operator retries)   │
//! │       ▼                                                                 │
//! │  cache: add → insert at head                                           │
//! │         update → replace in place                                      │
//! │         delete → filter out                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each entity's operations live in their own file:
//! - [`product`] / [`category`] / [`customer`] / [`supplier`]
//! - [`sale`] - the two-phase header + items write
//! - [`stock`] - the append-only movement ledger and its quantity effects
//! - [`purchase`] - purchase orders and their status machine

pub mod category;
pub mod customer;
pub mod product;
pub mod purchase;
pub mod sale;
pub mod stock;
pub mod supplier;

use std::fmt;
use std::sync::Arc;

use dokon_core::{
    Category, Customer, Product, PurchaseOrder, Sale, StockMovement, Supplier, WatchSnapshot,
};
use tracing::{error, info, warn};

use crate::error::{DbError, StoreError, StoreResult};
use crate::service::DataService;

/// Cached view of the back-office data plus the mutations that keep it in
/// step with the data service.
///
/// ## Usage
/// ```rust,ignore
/// let service = Arc::new(Database::new(DbConfig::new("dokon.db")).await?);
/// let mut store = EntityStore::new(service);
/// store.load().await?;
///
/// let product = store.add_product(&new_product).await?;
/// assert_eq!(store.products()[0].id, product.id);
/// ```
pub struct EntityStore {
    service: Arc<dyn DataService>,
    products: Vec<Product>,
    categories: Vec<Category>,
    customers: Vec<Customer>,
    suppliers: Vec<Supplier>,
    sales: Vec<Sale>,
    stock_movements: Vec<StockMovement>,
    purchase_orders: Vec<PurchaseOrder>,
}

impl fmt::Debug for EntityStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityStore")
            .field("products", &self.products.len())
            .field("categories", &self.categories.len())
            .field("customers", &self.customers.len())
            .field("suppliers", &self.suppliers.len())
            .field("sales", &self.sales.len())
            .field("stock_movements", &self.stock_movements.len())
            .field("purchase_orders", &self.purchase_orders.len())
            .finish()
    }
}

impl EntityStore {
    /// Creates an empty store. Call [`EntityStore::load`] to fill it.
    pub fn new(service: Arc<dyn DataService>) -> Self {
        EntityStore {
            service,
            products: Vec::new(),
            categories: Vec::new(),
            customers: Vec::new(),
            suppliers: Vec::new(),
            sales: Vec::new(),
            stock_movements: Vec::new(),
            purchase_orders: Vec::new(),
        }
    }

    /// Fetches every collection from the data service.
    ///
    /// All collections are fetched before any cache is replaced, so a
    /// failed load leaves the previous contents in place.
    pub async fn load(&mut self) -> StoreResult<()> {
        let products = self.fetch_products().await?;
        let categories = self.fetch_categories().await?;
        let customers = self.fetch_customers().await?;
        let suppliers = self.fetch_suppliers().await?;
        let sales = self.fetch_sales().await?;
        let stock_movements = self.fetch_stock_movements().await?;
        let purchase_orders = self.fetch_purchase_orders().await?;

        info!(
            products = products.len(),
            categories = categories.len(),
            customers = customers.len(),
            suppliers = suppliers.len(),
            sales = sales.len(),
            stock_movements = stock_movements.len(),
            purchase_orders = purchase_orders.len(),
            "Entity store loaded"
        );

        self.products = products;
        self.categories = categories;
        self.customers = customers;
        self.suppliers = suppliers;
        self.sales = sales;
        self.stock_movements = stock_movements;
        self.purchase_orders = purchase_orders;
        Ok(())
    }

    /// Discards the caches and fetches everything again.
    pub async fn reload(&mut self) -> StoreResult<()> {
        self.load().await
    }

    // =========================================================================
    // Collections (newest first; categories by name)
    // =========================================================================

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    pub fn suppliers(&self) -> &[Supplier] {
        &self.suppliers
    }

    pub fn sales(&self) -> &[Sale] {
        &self.sales
    }

    pub fn stock_movements(&self) -> &[StockMovement] {
        &self.stock_movements
    }

    pub fn purchase_orders(&self) -> &[PurchaseOrder] {
        &self.purchase_orders
    }

    /// What the notification rules look at.
    pub fn snapshot(&self) -> WatchSnapshot<'_> {
        WatchSnapshot {
            products: &self.products,
            sales: &self.sales,
            customers: &self.customers,
        }
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn customer(&self, id: &str) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id == id)
    }

    pub fn supplier(&self, id: &str) -> Option<&Supplier> {
        self.suppliers.iter().find(|s| s.id == id)
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn purchase_order(&self, id: &str) -> Option<&PurchaseOrder> {
        self.purchase_orders.iter().find(|o| o.id == id)
    }

    pub(crate) fn service(&self) -> &dyn DataService {
        self.service.as_ref()
    }
}

/// Logs a failed data service call and converts it for the caller.
///
/// A missing row is something the operator can act on; anything else is
/// an outage.
pub(crate) fn surface<'a>(
    operation: &'static str,
    id: &'a str,
) -> impl FnOnce(DbError) -> StoreError + 'a {
    move |err| {
        match &err {
            DbError::NotFound { .. } => warn!(operation, id, error = %err, "Row not found"),
            _ => error!(operation, id, error = %err, "Data service call failed"),
        }
        StoreError::from(err)
    }
}

/// Puts `item` back where the row with the same id was, or at the head.
pub(crate) fn replace_or_prepend<T>(items: &mut Vec<T>, item: T, same: impl Fn(&T) -> bool) {
    match items.iter().position(same) {
        Some(index) => items[index] = item,
        None => items.insert(0, item),
    }
}

// =============================================================================
// Test fixtures
// =============================================================================

#[cfg(test)]
pub(crate) mod fixtures {
    use std::sync::Arc;

    use dokon_core::{DiscountRate, Money, NewProduct};

    use super::EntityStore;
    use crate::memory::MemoryDataService;

    pub fn new_product(name: &str, category: &str, quantity: i64, min_quantity: i64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            category: category.to_string(),
            brand: "Dokon".to_string(),
            cost_price: Money::from_cents(800),
            selling_price: Money::from_cents(1_000),
            discount: DiscountRate::zero(),
            quantity,
            min_quantity,
            barcode: String::new(),
            description: String::new(),
            image_url: None,
        }
    }

    /// A loaded, empty store over an in-memory service the test can poke.
    pub async fn store() -> (EntityStore, Arc<MemoryDataService>) {
        let service = Arc::new(MemoryDataService::new());
        let mut store = EntityStore::new(service.clone());
        store.load().await.unwrap();
        (store, service)
    }
}
