//! Category operations and their cascade onto products.
//!
//! Products reference categories by name, so the cascade is by name too:
//!
//! ```text
//! rename "Drinks" → "Ichimliklar"   every product with category "Drinks"
//!                                    moves to "Ichimliklar"
//!
//! delete "Drinks"                    every product with category "Drinks"
//!                                    moves to "uncategorized"
//! ```
//!
//! A product that fails to move is logged and skipped. The category change
//! itself has already been written at that point.

use dokon_core::validation::{validate_category_patch, validate_new_category};
use dokon_core::{
    Category, CategoryPatch, NewCategory, ProductPatch, DEFAULT_CATEGORY_COLOR, UNCATEGORIZED,
};
use tracing::{debug, info, warn};

use super::{replace_or_prepend, surface, EntityStore};
use crate::error::{StoreError, StoreResult};
use crate::service::{from_row, from_rows, to_row, Query, Table};

impl EntityStore {
    pub(crate) async fn fetch_categories(&self) -> StoreResult<Vec<Category>> {
        let rows = self
            .service()
            .select(Table::Categories, &Query::new().order("name", true))
            .await
            .map_err(surface("load categories", ""))?;
        Ok(from_rows(rows)?)
    }

    pub async fn add_category(&mut self, input: &NewCategory) -> StoreResult<Category> {
        let mut input = validate_new_category(input)?;
        if input.color.trim().is_empty() {
            input.color = DEFAULT_CATEGORY_COLOR.to_string();
        }

        let row = self
            .service()
            .insert(Table::Categories, to_row(&input)?)
            .await
            .map_err(surface("add category", &input.name))?;
        let category: Category = from_row(row)?;

        debug!(id = %category.id, name = %category.name, "Category added");
        self.categories.push(category.clone());
        self.sort_categories();
        Ok(category)
    }

    /// Updates a category. A rename moves the products that used the old
    /// name along with it.
    pub async fn update_category(
        &mut self,
        id: &str,
        patch: &CategoryPatch,
    ) -> StoreResult<Category> {
        let patch = validate_category_patch(patch)?;
        let old_name = self
            .category(id)
            .map(|c| c.name.clone())
            .ok_or_else(|| StoreError::not_found("category", id))?;

        let row = self
            .service()
            .update(Table::Categories, id, to_row(&patch)?)
            .await
            .map_err(surface("update category", id))?;
        let category: Category = from_row(row)?;

        debug!(id = %category.id, name = %category.name, "Category updated");
        replace_or_prepend(&mut self.categories, category.clone(), |c| c.id == id);
        self.sort_categories();

        if category.name != old_name {
            let moved = self.move_products(&old_name, &category.name).await;
            info!(from = %old_name, to = %category.name, moved, "Category renamed");
        }
        Ok(category)
    }

    /// Deletes a category and reassigns its products to
    /// [`UNCATEGORIZED`]. Returns how many products were reassigned.
    ///
    /// Products are never deleted and the product count is unchanged.
    pub async fn delete_category(&mut self, id: &str) -> StoreResult<usize> {
        let name = self
            .category(id)
            .map(|c| c.name.clone())
            .ok_or_else(|| StoreError::not_found("category", id))?;

        self.service()
            .delete(Table::Categories, id)
            .await
            .map_err(surface("delete category", id))?;

        debug!(id = %id, name = %name, "Category deleted");
        self.categories.retain(|c| c.id != id);

        let moved = self.move_products(&name, UNCATEGORIZED).await;
        info!(category = %name, moved, "Products reassigned to {UNCATEGORIZED}");
        Ok(moved)
    }

    /// Sets `category = to` on every cached product with `category = from`.
    async fn move_products(&mut self, from: &str, to: &str) -> usize {
        let ids: Vec<String> = self
            .products
            .iter()
            .filter(|p| p.category == from)
            .map(|p| p.id.clone())
            .collect();

        let mut moved = 0;
        for id in ids {
            match self.update_product(&id, &ProductPatch::category(to)).await {
                Ok(_) => moved += 1,
                Err(err) => {
                    warn!(product_id = %id, from, to, error = %err, "Could not reassign product")
                }
            }
        }
        moved
    }

    fn sort_categories(&mut self) {
        self.categories.sort_by(|a, b| a.name.cmp(&b.name));
    }
}
