//! # Stock Movements
//!
//! The append-only ledger of inventory changes. Recording a movement also
//! adjusts the product it references:
//!
//! | Kind       | Effect on `quantity`          |
//! |------------|-------------------------------|
//! | inbound    | `+q`                          |
//! | outbound   | `−q`, refused if it goes < 0  |
//! | return     | `+q`                          |
//! | stock_take | set to `q`                    |
//!
//! A result below zero or above `MAX_STOCK_QUANTITY` is refused before
//! anything is written. The movement is written
//! first and the product second; if the product update fails the movement
//! stays recorded and the error is returned.

use dokon_core::validation::{validate_new_stock_movement, validate_stock_level};
use dokon_core::{CoreError, NewStockMovement, ProductPatch, StockMovement};
use tracing::{debug, error};

use super::{surface, EntityStore};
use crate::error::{StoreError, StoreResult};
use crate::service::{from_row, from_rows, to_row, Query, Table};

impl EntityStore {
    pub(crate) async fn fetch_stock_movements(&self) -> StoreResult<Vec<StockMovement>> {
        let rows = self
            .service()
            .select(Table::StockMovements, &Query::newest_first())
            .await
            .map_err(surface("load stock movements", ""))?;
        Ok(from_rows(rows)?)
    }

    /// Records a movement and applies its effect to the product.
    pub async fn add_stock_movement(
        &mut self,
        input: &NewStockMovement,
    ) -> StoreResult<StockMovement> {
        validate_new_stock_movement(input)?;

        let product = self
            .product(&input.product_id)
            .ok_or_else(|| StoreError::not_found("product", &input.product_id))?;

        let new_quantity = input.kind.apply(product.quantity, input.quantity);
        if new_quantity < 0 {
            return Err(CoreError::InsufficientStock {
                product: product.name.clone(),
                available: product.quantity,
                requested: input.quantity,
            }
            .into());
        }
        validate_stock_level("quantity", new_quantity)?;

        let row = self
            .service()
            .insert(Table::StockMovements, to_row(input)?)
            .await
            .map_err(surface("add stock movement", &input.product_id))?;
        let movement: StockMovement = from_row(row)?;

        debug!(
            id = %movement.id,
            product_id = %movement.product_id,
            kind = %movement.kind,
            quantity = movement.quantity,
            "Stock movement recorded"
        );
        self.stock_movements.insert(0, movement.clone());

        if let Err(err) = self
            .update_product(&input.product_id, &ProductPatch::quantity(new_quantity))
            .await
        {
            error!(
                movement_id = %movement.id,
                product_id = %input.product_id,
                "Movement recorded but product quantity not updated"
            );
            return Err(err);
        }

        Ok(movement)
    }

    /// Movements of one product, newest first.
    pub fn movements_for(&self, product_id: &str) -> Vec<&StockMovement> {
        self.stock_movements
            .iter()
            .filter(|m| m.product_id == product_id)
            .collect()
    }
}
