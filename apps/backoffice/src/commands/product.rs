//! # Product Commands
//!
//! Product list, search and CRUD for the products screen.
//!
//! ## Search Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Product Search Flow                                  │
//! │                                                                         │
//! │  Operator types "cola"                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  search_products(&state, "cola")                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate_search_query (trim, ≤ 100 chars)                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Scan the cached products: name / category / brand                      │
//! │  (case-insensitive) or barcode substring                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Vec<Product>, cache order (newest first)                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Instant;

use tracing::{debug, info};

use dokon_core::report::{low_stock, search_products as search};
use dokon_core::validation::validate_search_query;
use dokon_core::{NewProduct, Product, ProductPatch};

use crate::error::ApiError;
use crate::state::AppState;

/// All products, newest first.
pub async fn list_products(state: &AppState) -> Vec<Product> {
    state.store.read().await.products().to_vec()
}

/// Searches products by name, category, brand or barcode.
///
/// An empty query returns every product.
pub async fn search_products(state: &AppState, query: &str) -> Result<Vec<Product>, ApiError> {
    let query = validate_search_query(query)?;
    debug!(query = %query, "search_products command");

    let start = Instant::now();
    let store = state.store.read().await;
    let results: Vec<Product> = search(store.products(), &query).into_iter().cloned().collect();

    debug!(
        query = %query,
        results = results.len(),
        elapsed_us = start.elapsed().as_micros() as u64,
        "Product search completed"
    );
    Ok(results)
}

pub async fn get_product(state: &AppState, id: &str) -> Result<Product, ApiError> {
    state
        .store
        .read()
        .await
        .product(id)
        .cloned()
        .ok_or_else(|| ApiError::not_found("product", id))
}

/// Products at or below their reorder threshold.
pub async fn low_stock_products(state: &AppState) -> Vec<Product> {
    let store = state.store.read().await;
    low_stock(store.products()).into_iter().cloned().collect()
}

pub async fn add_product(state: &AppState, input: &NewProduct) -> Result<Product, ApiError> {
    let product = state.store.write().await.add_product(input).await?;
    info!(id = %product.id, name = %product.name, "Product added");
    Ok(product)
}

pub async fn update_product(
    state: &AppState,
    id: &str,
    patch: &ProductPatch,
) -> Result<Product, ApiError> {
    Ok(state.store.write().await.update_product(id, patch).await?)
}

/// Deletes a product. Past sales keep their line snapshots.
pub async fn delete_product(state: &AppState, id: &str) -> Result<(), ApiError> {
    state.store.write().await.delete_product(id).await?;
    info!(id = %id, "Product deleted");
    Ok(())
}
