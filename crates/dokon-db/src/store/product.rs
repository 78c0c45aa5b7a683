//! Product operations.

use dokon_core::validation::{validate_new_product, validate_product_patch};
use dokon_core::{NewProduct, Product, ProductPatch};
use tracing::debug;

use super::{replace_or_prepend, surface, EntityStore};
use crate::error::StoreResult;
use crate::service::{from_row, from_rows, to_row, Query, Table};

impl EntityStore {
    pub(crate) async fn fetch_products(&self) -> StoreResult<Vec<Product>> {
        let rows = self
            .service()
            .select(Table::Products, &Query::newest_first())
            .await
            .map_err(surface("load products", ""))?;
        Ok(from_rows(rows)?)
    }

    /// Validates and stores a new product, then puts it at the head of the
    /// cached list.
    pub async fn add_product(&mut self, input: &NewProduct) -> StoreResult<Product> {
        let input = validate_new_product(input)?;

        let row = self
            .service()
            .insert(Table::Products, to_row(&input)?)
            .await
            .map_err(surface("add product", &input.name))?;
        let product: Product = from_row(row)?;

        debug!(id = %product.id, name = %product.name, "Product added");
        self.products.insert(0, product.clone());
        Ok(product)
    }

    /// Merges `patch` into the stored product.
    ///
    /// Fails with `NotFound` when the data service has no such id.
    pub async fn update_product(&mut self, id: &str, patch: &ProductPatch) -> StoreResult<Product> {
        let patch = validate_product_patch(patch)?;

        let row = self
            .service()
            .update(Table::Products, id, to_row(&patch)?)
            .await
            .map_err(surface("update product", id))?;
        let product: Product = from_row(row)?;

        debug!(id = %product.id, quantity = product.quantity, "Product updated");
        replace_or_prepend(&mut self.products, product.clone(), |p| p.id == id);
        Ok(product)
    }

    /// Removes the product. Sales keep their line snapshots.
    pub async fn delete_product(&mut self, id: &str) -> StoreResult<()> {
        self.service()
            .delete(Table::Products, id)
            .await
            .map_err(surface("delete product", id))?;

        debug!(id = %id, "Product deleted");
        self.products.retain(|p| p.id != id);
        Ok(())
    }
}
