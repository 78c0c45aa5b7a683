//! # Warehouse Commands
//!
//! Stock movements, inventory figures and purchase orders.
//!
//! ## Receiving a Delivery
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add_purchase_order ──► pending                                         │
//! │                            │                                            │
//! │               goods arrive │                                            │
//! │                            ▼                                            │
//! │  add_stock_movement(inbound, q) per line ──► product.quantity += q      │
//! │                            │                                            │
//! │                            ▼                                            │
//! │  update_purchase_order(status: accepted)                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::info;

use dokon_core::report::InventoryStats;
use dokon_core::{
    MovementKind, NewPurchaseOrder, NewStockMovement, PurchaseOrder, PurchaseOrderPatch,
    StockMovement,
};

use crate::error::ApiError;
use crate::state::AppState;

/// A stock movement as entered on the warehouse screen. The operator is
/// taken from the session, not the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockMovementRequest {
    pub product_id: String,
    #[serde(rename = "type")]
    pub kind: MovementKind,
    pub quantity: i64,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub supplier_id: Option<String>,
}

// =============================================================================
// Stock movements
// =============================================================================

/// Movements newest first, optionally for one product.
pub async fn list_stock_movements(
    state: &AppState,
    product_id: Option<&str>,
) -> Vec<StockMovement> {
    let store = state.store.read().await;
    match product_id {
        Some(id) => store.movements_for(id).into_iter().cloned().collect(),
        None => store.stock_movements().to_vec(),
    }
}

/// Records a movement and applies it to the product's quantity.
pub async fn add_stock_movement(
    state: &AppState,
    request: &StockMovementRequest,
) -> Result<StockMovement, ApiError> {
    let input = NewStockMovement {
        product_id: request.product_id.clone(),
        kind: request.kind,
        quantity: request.quantity,
        reason: request.reason.clone(),
        supplier_id: request.supplier_id.clone(),
        user_id: state.operator().id,
    };

    let movement = state.store.write().await.add_stock_movement(&input).await?;
    info!(
        id = %movement.id,
        product_id = %movement.product_id,
        kind = %movement.kind,
        quantity = movement.quantity,
        "Stock movement recorded"
    );
    Ok(movement)
}

pub async fn inventory_stats(state: &AppState) -> InventoryStats {
    InventoryStats::compute(state.store.read().await.products())
}

// =============================================================================
// Purchase orders
// =============================================================================

/// All purchase orders, newest first.
pub async fn list_purchase_orders(state: &AppState) -> Vec<PurchaseOrder> {
    state.store.read().await.purchase_orders().to_vec()
}

pub async fn pending_purchase_orders(state: &AppState) -> Vec<PurchaseOrder> {
    state
        .store
        .read()
        .await
        .pending_purchase_orders()
        .into_iter()
        .cloned()
        .collect()
}

pub async fn add_purchase_order(
    state: &AppState,
    input: &NewPurchaseOrder,
) -> Result<PurchaseOrder, ApiError> {
    let order = state.store.write().await.add_purchase_order(input).await?;
    info!(id = %order.id, total = %order.total_amount, "Purchase order created");
    Ok(order)
}

pub async fn update_purchase_order(
    state: &AppState,
    id: &str,
    patch: &PurchaseOrderPatch,
) -> Result<PurchaseOrder, ApiError> {
    Ok(state.store.write().await.update_purchase_order(id, patch).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::product::{add_product, get_product};
    use crate::commands::supplier::add_supplier;
    use crate::error::ErrorCode;
    use crate::state::fixtures::{new_product, state};
    use dokon_core::{
        Money, NewSupplier, PurchaseOrderItem, PurchaseOrderStatus, MAX_PRICE_CENTS,
        MAX_STOCK_QUANTITY,
    };

    fn request(product_id: &str, kind: MovementKind, quantity: i64) -> StockMovementRequest {
        StockMovementRequest {
            product_id: product_id.to_string(),
            kind,
            quantity,
            reason: String::new(),
            supplier_id: None,
        }
    }

    #[tokio::test]
    async fn test_inbound_movement_is_stamped_with_operator() {
        let (state, _) = state().await;
        let product = add_product(&state, &new_product("Choy 100g", 1_500, 3, 5)).await.unwrap();
        assert!(product.is_low_stock());

        let movement = add_stock_movement(&state, &request(&product.id, MovementKind::Inbound, 10))
            .await
            .unwrap();
        assert_eq!(movement.user_id, "operator");

        let product = get_product(&state, &product.id).await.unwrap();
        assert_eq!(product.quantity, 13);
        assert!(!product.is_low_stock());

        assert_eq!(list_stock_movements(&state, Some(&product.id)).await.len(), 1);
        assert_eq!(list_stock_movements(&state, Some("other")).await.len(), 0);

        let stats = inventory_stats(&state).await;
        assert_eq!(stats.total_units, 13);
        assert_eq!(stats.low_stock_count, 0);
    }

    #[tokio::test]
    async fn test_outbound_beyond_stock_is_refused() {
        let (state, _) = state().await;
        let product = add_product(&state, &new_product("Choy 100g", 1_500, 3, 5)).await.unwrap();

        let err = add_stock_movement(&state, &request(&product.id, MovementKind::Outbound, 4))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert!(list_stock_movements(&state, None).await.is_empty());
    }

    #[tokio::test]
    async fn test_inventory_stats_at_stock_and_price_ceilings() {
        let (state, _) = state().await;
        let err = add_product(&state, &new_product("Un 50kg", 1_000, i64::MAX / 10, 0))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        for name in ["Un 50kg", "Shakar 50kg"] {
            add_product(&state, &new_product(name, MAX_PRICE_CENTS, MAX_STOCK_QUANTITY, 0))
                .await
                .unwrap();
        }

        let stats = inventory_stats(&state).await;
        assert_eq!(stats.total_units, 2 * MAX_STOCK_QUANTITY);
        assert_eq!(
            stats.retail_value,
            Money::from_cents(MAX_PRICE_CENTS).multiply_quantity(2 * MAX_STOCK_QUANTITY)
        );
    }

    #[tokio::test]
    async fn test_purchase_order_flow() {
        let (state, _) = state().await;
        let supplier = add_supplier(
            &state,
            &NewSupplier {
                name: "Nestle Uzbekistan".to_string(),
                contact_person: "Sardor".to_string(),
                phone: "+998712000002".to_string(),
                email: None,
                address: None,
            },
        )
        .await
        .unwrap();

        let order = add_purchase_order(
            &state,
            &NewPurchaseOrder {
                supplier_id: supplier.id.clone(),
                items: vec![PurchaseOrderItem {
                    product_id: "p-1".to_string(),
                    quantity: 12,
                    unit_price: Money::from_cents(5_000),
                }],
                delivery_date: None,
                notes: String::new(),
            },
        )
        .await
        .unwrap();
        assert_eq!(order.total_amount, Money::from_cents(60_000));
        assert_eq!(pending_purchase_orders(&state).await.len(), 1);

        let cancel = PurchaseOrderPatch {
            status: Some(PurchaseOrderStatus::Cancelled),
            ..Default::default()
        };
        update_purchase_order(&state, &order.id, &cancel).await.unwrap();
        assert!(pending_purchase_orders(&state).await.is_empty());

        let reopen = PurchaseOrderPatch {
            status: Some(PurchaseOrderStatus::Pending),
            ..Default::default()
        };
        let err = update_purchase_order(&state, &order.id, &reopen).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
        assert_eq!(list_purchase_orders(&state).await.len(), 1);
    }
}
