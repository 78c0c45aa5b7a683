//! Purchase orders: header in `purchase_orders`, lines in
//! `purchase_order_items`. Orders are created and updated, never deleted.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use dokon_core::validation::{validate_new_purchase_order, validate_text};
use dokon_core::{
    CoreError, Money, NewPurchaseOrder, PurchaseOrder, PurchaseOrderItem, PurchaseOrderPatch,
    PurchaseOrderStatus,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::{replace_or_prepend, surface, EntityStore};
use crate::error::{StoreError, StoreResult};
use crate::service::{from_row, from_rows, row_id, to_row, Query, Table};

#[derive(Serialize)]
struct OrderHeader<'a> {
    supplier_id: &'a str,
    total_amount: Money,
    status: PurchaseOrderStatus,
    order_date: NaiveDate,
    delivery_date: Option<NaiveDate>,
    notes: &'a str,
}

#[derive(Serialize, Deserialize)]
struct OrderItemRow {
    order_id: String,
    position: usize,
    #[serde(flatten)]
    item: PurchaseOrderItem,
}

impl EntityStore {
    pub(crate) async fn fetch_purchase_orders(&self) -> StoreResult<Vec<PurchaseOrder>> {
        let headers = self
            .service()
            .select(Table::PurchaseOrders, &Query::newest_first())
            .await
            .map_err(surface("load purchase orders", ""))?;
        let item_rows = self
            .service()
            .select(Table::PurchaseOrderItems, &Query::new())
            .await
            .map_err(surface("load purchase order items", ""))?;

        let mut items: HashMap<String, Vec<(usize, PurchaseOrderItem)>> = HashMap::new();
        for row in from_rows::<OrderItemRow>(item_rows)? {
            items
                .entry(row.order_id)
                .or_default()
                .push((row.position, row.item));
        }

        let mut orders: Vec<PurchaseOrder> = from_rows(headers)?;
        for order in &mut orders {
            if let Some(mut lines) = items.remove(&order.id) {
                lines.sort_by_key(|(position, _)| *position);
                order.items = lines.into_iter().map(|(_, item)| item).collect();
            }
        }
        Ok(orders)
    }

    /// Creates a pending order dated today, with
    /// `total_amount = Σ quantity × unit_price`.
    pub async fn add_purchase_order(
        &mut self,
        input: &NewPurchaseOrder,
    ) -> StoreResult<PurchaseOrder> {
        validate_new_purchase_order(input)?;
        if self.supplier(&input.supplier_id).is_none() {
            return Err(StoreError::not_found("supplier", &input.supplier_id));
        }

        let header = OrderHeader {
            supplier_id: &input.supplier_id,
            total_amount: input.total_amount(),
            status: PurchaseOrderStatus::Pending,
            order_date: Utc::now().date_naive(),
            delivery_date: input.delivery_date,
            notes: input.notes.trim(),
        };
        let row = self
            .service()
            .insert(Table::PurchaseOrders, to_row(&header)?)
            .await
            .map_err(surface("add purchase order", &input.supplier_id))?;
        let order_id = row_id(&row)?;

        let item_rows = input
            .items
            .iter()
            .enumerate()
            .map(|(position, item)| {
                to_row(&OrderItemRow {
                    order_id: order_id.clone(),
                    position,
                    item: item.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if let Err(err) = self
            .service()
            .insert_many(Table::PurchaseOrderItems, item_rows)
            .await
        {
            error!(order_id = %order_id, error = %err, "Purchase order saved without items");
            return Err(err.into());
        }

        let mut order: PurchaseOrder = from_row(row)?;
        order.items = input.items.clone();

        debug!(id = %order.id, total = %order.total_amount, "Purchase order added");
        self.purchase_orders.insert(0, order.clone());
        Ok(order)
    }

    /// Updates status, delivery date or notes.
    ///
    /// A status change must be allowed by
    /// [`PurchaseOrderStatus::can_transition_to`]; setting the current
    /// status again is a no-op for the status field.
    pub async fn update_purchase_order(
        &mut self,
        id: &str,
        patch: &PurchaseOrderPatch,
    ) -> StoreResult<PurchaseOrder> {
        let current = self
            .purchase_order(id)
            .ok_or_else(|| StoreError::not_found("purchase_order", id))?;

        if let Some(next) = patch.status {
            if next != current.status && !current.status.can_transition_to(next) {
                return Err(CoreError::InvalidStatusTransition {
                    order_id: id.to_string(),
                    from: current.status.to_string(),
                    to: next.to_string(),
                }
                .into());
            }
        }
        if let Some(notes) = &patch.notes {
            validate_text("notes", notes, 1_000)?;
        }
        let items = current.items.clone();

        let row = self
            .service()
            .update(Table::PurchaseOrders, id, to_row(patch)?)
            .await
            .map_err(surface("update purchase order", id))?;
        let mut order: PurchaseOrder = from_row(row)?;
        order.items = items;

        debug!(id = %order.id, status = %order.status, "Purchase order updated");
        replace_or_prepend(&mut self.purchase_orders, order.clone(), |o| o.id == id);
        Ok(order)
    }

    /// Orders still waiting on the supplier.
    pub fn pending_purchase_orders(&self) -> Vec<&PurchaseOrder> {
        self.purchase_orders
            .iter()
            .filter(|o| o.status == PurchaseOrderStatus::Pending)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Operation;
    use crate::store::fixtures::store;
    use crate::store::supplier::tests::new_supplier;

    fn order(supplier_id: &str) -> NewPurchaseOrder {
        NewPurchaseOrder {
            supplier_id: supplier_id.to_string(),
            items: vec![
                PurchaseOrderItem {
                    product_id: "p-1".to_string(),
                    quantity: 24,
                    unit_price: Money::from_cents(450),
                },
                PurchaseOrderItem {
                    product_id: "p-2".to_string(),
                    quantity: 10,
                    unit_price: Money::from_cents(1_200),
                },
            ],
            delivery_date: NaiveDate::from_ymd_opt(2026, 3, 1),
            notes: "Morning delivery".to_string(),
        }
    }

    #[tokio::test]
    async fn test_add_computes_total_and_starts_pending() {
        let (mut store, _) = store().await;
        let supplier = store.add_supplier(&new_supplier("Nestle")).await.unwrap();

        let order = store.add_purchase_order(&order(&supplier.id)).await.unwrap();
        assert_eq!(order.total_amount, Money::from_cents(22_800));
        assert_eq!(order.status, PurchaseOrderStatus::Pending);
        assert_eq!(store.pending_purchase_orders().len(), 1);

        store.reload().await.unwrap();
        assert_eq!(store.purchase_orders()[0], order);
    }

    #[tokio::test]
    async fn test_status_machine_is_enforced() {
        let (mut store, service) = store().await;
        let supplier = store.add_supplier(&new_supplier("Nestle")).await.unwrap();
        let order = store.add_purchase_order(&order(&supplier.id)).await.unwrap();

        let accept = PurchaseOrderPatch {
            status: Some(PurchaseOrderStatus::Accepted),
            ..Default::default()
        };
        let accepted = store.update_purchase_order(&order.id, &accept).await.unwrap();
        assert_eq!(accepted.status, PurchaseOrderStatus::Accepted);
        assert_eq!(accepted.items.len(), 2);

        // Accepted is terminal; the refusal happens before any write.
        service.fail_on(Table::PurchaseOrders, Operation::Update).await;
        let cancel = PurchaseOrderPatch {
            status: Some(PurchaseOrderStatus::Cancelled),
            ..Default::default()
        };
        let err = store.update_purchase_order(&order.id, &cancel).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Domain(CoreError::InvalidStatusTransition { .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_supplier_is_rejected() {
        let (mut store, _) = store().await;
        assert!(matches!(
            store.add_purchase_order(&order("missing")).await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_order_is_invalid() {
        let (mut store, _) = store().await;
        let supplier = store.add_supplier(&new_supplier("Nestle")).await.unwrap();
        let mut input = order(&supplier.id);
        input.items.clear();
        assert!(matches!(
            store.add_purchase_order(&input).await,
            Err(StoreError::Validation(_))
        ));
    }
}
