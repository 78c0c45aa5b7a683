//! # Sale Writes
//!
//! A sale is a header row in `sales` plus one row per line in `sale_items`.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       add_sale(draft)                                   │
//! │                                                                         │
//! │  1. HEADER                                                             │
//! │     └── insert sales { customer_id, user_id, total, payment_method }   │
//! │         └── Err → ExternalService, nothing written                     │
//! │                                                                         │
//! │  2. ITEMS                                                              │
//! │     └── insert_many sale_items [{ sale_id, position, product_id, ..}] │
//! │         └── Err → OrphanedSale { sale_id }                             │
//! │             header stays in the data service with no items             │
//! │                                                                         │
//! │  3. CACHE                                                              │
//! │     └── sale (with its items) inserted at the head                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing compensates for step 2. The orphaned header id is returned so
//! the operator or an administrator can reconcile it.

use std::collections::HashMap;

use dokon_core::validation::validate_required;
use dokon_core::{CoreError, Money, PaymentMethod, Sale, SaleDraft, SaleItem};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::{surface, EntityStore};
use crate::error::{StoreError, StoreResult};
use crate::service::{from_row, from_rows, row_id, to_row, Query, Table};

/// The `sales` row without its items.
#[derive(Serialize)]
struct SaleHeader<'a> {
    customer_id: Option<&'a str>,
    user_id: &'a str,
    total: Money,
    payment_method: PaymentMethod,
}

/// One `sale_items` row.
#[derive(Serialize, Deserialize)]
struct SaleItemRow {
    sale_id: String,
    /// Line order within the sale.
    position: usize,
    #[serde(flatten)]
    item: SaleItem,
}

impl EntityStore {
    pub(crate) async fn fetch_sales(&self) -> StoreResult<Vec<Sale>> {
        let headers = self
            .service()
            .select(Table::Sales, &Query::newest_first())
            .await
            .map_err(surface("load sales", ""))?;
        let item_rows = self
            .service()
            .select(Table::SaleItems, &Query::new())
            .await
            .map_err(surface("load sale items", ""))?;

        let mut items: HashMap<String, Vec<(usize, SaleItem)>> = HashMap::new();
        for row in from_rows::<SaleItemRow>(item_rows)? {
            items
                .entry(row.sale_id)
                .or_default()
                .push((row.position, row.item));
        }

        let mut sales: Vec<Sale> = from_rows(headers)?;
        for sale in &mut sales {
            if let Some(mut lines) = items.remove(&sale.id) {
                lines.sort_by_key(|(position, _)| *position);
                sale.items = lines.into_iter().map(|(_, item)| item).collect();
            }
        }
        Ok(sales)
    }

    /// Writes a sale: header first, then its items.
    ///
    /// ## Errors
    /// - `Domain(EmptyCart)` when the draft has no items
    /// - `ExternalService` when the header write fails (nothing written)
    /// - `OrphanedSale` when the header was written but the items were not
    pub async fn add_sale(&mut self, draft: &SaleDraft) -> StoreResult<Sale> {
        if draft.items.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }
        validate_required("user_id", &draft.user_id, 128)?;

        let header = SaleHeader {
            customer_id: draft.customer_id.as_deref(),
            user_id: &draft.user_id,
            total: draft.total,
            payment_method: draft.payment_method,
        };
        let row = self
            .service()
            .insert(Table::Sales, to_row(&header)?)
            .await
            .map_err(surface("add sale", &draft.user_id))?;
        let sale_id = row_id(&row)?;

        let item_rows = draft
            .items
            .iter()
            .enumerate()
            .map(|(position, item)| {
                to_row(&SaleItemRow {
                    sale_id: sale_id.clone(),
                    position,
                    item: item.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| StoreError::OrphanedSale {
                sale_id: sale_id.clone(),
                source,
            })?;

        if let Err(source) = self.service().insert_many(Table::SaleItems, item_rows).await {
            error!(sale_id = %sale_id, error = %source, "Sale header saved without items");
            return Err(StoreError::OrphanedSale { sale_id, source });
        }

        let mut sale: Sale = from_row(row)?;
        sale.items = draft.items.clone();

        debug!(
            id = %sale.id,
            items = sale.items.len(),
            total = %sale.total,
            payment_method = %sale.payment_method,
            "Sale added"
        );
        self.sales.insert(0, sale.clone());
        Ok(sale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Operation;
    use crate::store::fixtures::store;
    use dokon_core::DiscountRate;

    fn draft() -> SaleDraft {
        let items = vec![
            SaleItem {
                product_id: "p-1".to_string(),
                quantity: 2,
                price: Money::from_cents(5_000),
                discount: DiscountRate::from_percent(10),
            },
            SaleItem {
                product_id: "p-2".to_string(),
                quantity: 1,
                price: Money::from_cents(3_000),
                discount: DiscountRate::zero(),
            },
        ];
        let total = items.iter().map(SaleItem::net).sum();
        SaleDraft {
            customer_id: None,
            user_id: "op-1".to_string(),
            items,
            total,
            payment_method: PaymentMethod::Cash,
        }
    }

    #[tokio::test]
    async fn test_sale_round_trips_with_items_in_order() {
        let (mut store, service) = store().await;
        let sale = store.add_sale(&draft()).await.unwrap();

        assert_eq!(sale.total, Money::from_cents(12_000));
        assert_eq!(service.count(Table::SaleItems).await, 2);

        store.reload().await.unwrap();
        let loaded = &store.sales()[0];
        assert_eq!(loaded, &sale);
        assert_eq!(loaded.items[0].product_id, "p-1");
    }

    #[tokio::test]
    async fn test_header_failure_writes_nothing() {
        let (mut store, service) = store().await;
        service.fail_on(Table::Sales, Operation::Insert).await;

        let err = store.add_sale(&draft()).await.unwrap_err();
        assert!(matches!(err, StoreError::ExternalService(_)));
        assert_eq!(service.count(Table::Sales).await, 0);
        assert!(store.sales().is_empty());
    }

    #[tokio::test]
    async fn test_items_failure_leaves_orphaned_header() {
        let (mut store, service) = store().await;
        service.fail_on(Table::SaleItems, Operation::Insert).await;

        let err = store.add_sale(&draft()).await.unwrap_err();
        let StoreError::OrphanedSale { sale_id, .. } = err else {
            panic!("expected OrphanedSale, got {err:?}");
        };

        assert_eq!(service.count(Table::Sales).await, 1);
        assert_eq!(service.count(Table::SaleItems).await, 0);
        assert!(store.sales().is_empty());

        store.reload().await.unwrap();
        assert_eq!(store.sales()[0].id, sale_id);
        assert!(store.sales()[0].items.is_empty());
    }

    #[tokio::test]
    async fn test_empty_draft_is_rejected() {
        let (mut store, _) = store().await;
        let mut empty = draft();
        empty.items.clear();
        assert!(matches!(
            store.add_sale(&empty).await,
            Err(StoreError::Domain(CoreError::EmptyCart))
        ));
    }
}
