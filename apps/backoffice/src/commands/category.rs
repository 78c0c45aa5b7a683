//! # Category Commands
//!
//! Products refer to categories by name. Renaming a category moves its
//! products along; deleting one moves them to `uncategorized`.

use serde::{Deserialize, Serialize};
use tracing::info;

use dokon_core::{Category, CategoryPatch, NewCategory};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCategoryResponse {
    /// Products moved to `uncategorized`.
    pub reassigned: usize,
}

/// All categories, sorted by name.
pub async fn list_categories(state: &AppState) -> Vec<Category> {
    state.store.read().await.categories().to_vec()
}

pub async fn add_category(state: &AppState, input: &NewCategory) -> Result<Category, ApiError> {
    Ok(state.store.write().await.add_category(input).await?)
}

pub async fn update_category(
    state: &AppState,
    id: &str,
    patch: &CategoryPatch,
) -> Result<Category, ApiError> {
    Ok(state.store.write().await.update_category(id, patch).await?)
}

pub async fn delete_category(
    state: &AppState,
    id: &str,
) -> Result<DeleteCategoryResponse, ApiError> {
    let reassigned = state.store.write().await.delete_category(id).await?;
    info!(id = %id, reassigned, "Category deleted");
    Ok(DeleteCategoryResponse { reassigned })
}
