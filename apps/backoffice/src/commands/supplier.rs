//! # Supplier Commands

use dokon_core::{NewSupplier, Supplier, SupplierPatch};

use crate::error::ApiError;
use crate::state::AppState;

pub async fn list_suppliers(state: &AppState) -> Vec<Supplier> {
    state.store.read().await.suppliers().to_vec()
}

pub async fn add_supplier(state: &AppState, input: &NewSupplier) -> Result<Supplier, ApiError> {
    Ok(state.store.write().await.add_supplier(input).await?)
}

pub async fn update_supplier(
    state: &AppState,
    id: &str,
    patch: &SupplierPatch,
) -> Result<Supplier, ApiError> {
    Ok(state.store.write().await.update_supplier(id, patch).await?)
}

pub async fn delete_supplier(state: &AppState, id: &str) -> Result<(), ApiError> {
    state.store.write().await.delete_supplier(id).await?;
    Ok(())
}
