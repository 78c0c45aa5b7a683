//! Supplier operations.

use dokon_core::validation::{validate_new_supplier, validate_supplier_patch};
use dokon_core::{NewSupplier, Supplier, SupplierPatch};
use tracing::debug;

use super::{replace_or_prepend, surface, EntityStore};
use crate::error::StoreResult;
use crate::service::{from_row, from_rows, to_row, Query, Table};

impl EntityStore {
    pub(crate) async fn fetch_suppliers(&self) -> StoreResult<Vec<Supplier>> {
        let rows = self
            .service()
            .select(Table::Suppliers, &Query::newest_first())
            .await
            .map_err(surface("load suppliers", ""))?;
        Ok(from_rows(rows)?)
    }

    pub async fn add_supplier(&mut self, input: &NewSupplier) -> StoreResult<Supplier> {
        let input = validate_new_supplier(input)?;

        let row = self
            .service()
            .insert(Table::Suppliers, to_row(&input)?)
            .await
            .map_err(surface("add supplier", &input.name))?;
        let supplier: Supplier = from_row(row)?;

        debug!(id = %supplier.id, "Supplier added");
        self.suppliers.insert(0, supplier.clone());
        Ok(supplier)
    }

    pub async fn update_supplier(
        &mut self,
        id: &str,
        patch: &SupplierPatch,
    ) -> StoreResult<Supplier> {
        let patch = validate_supplier_patch(patch)?;

        let row = self
            .service()
            .update(Table::Suppliers, id, to_row(&patch)?)
            .await
            .map_err(surface("update supplier", id))?;
        let supplier: Supplier = from_row(row)?;

        debug!(id = %supplier.id, "Supplier updated");
        replace_or_prepend(&mut self.suppliers, supplier.clone(), |s| s.id == id);
        Ok(supplier)
    }

    pub async fn delete_supplier(&mut self, id: &str) -> StoreResult<()> {
        self.service()
            .delete(Table::Suppliers, id)
            .await
            .map_err(surface("delete supplier", id))?;

        debug!(id = %id, "Supplier deleted");
        self.suppliers.retain(|s| s.id != id);
        Ok(())
    }
}
