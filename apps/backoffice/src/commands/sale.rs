//! # Sale Commands
//!
//! Checkout and the sales history.
//!
//! ## Checkout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Copy the cart into a SaleDraft          (cart lock, no await)       │
//! │        │ empty cart ──► EMPTY_CART, nothing written                     │
//! │        ▼                                                                │
//! │  2. store.add_sale(draft)                   (header, then items)        │
//! │        │ header failed ──► EXTERNAL_SERVICE, cart kept                  │
//! │        │ items failed  ──► PARTIAL_WRITE, cart kept                     │
//! │        ▼                                                                │
//! │  3. Drop the sold lines from the cart                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Checkout does not touch product quantities; stock only changes through
//! stock movements.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use dokon_core::report::filter_sales;
use dokon_core::{PaymentMethod, Period, Sale};

use crate::error::ApiError;
use crate::state::AppState;

/// Checkout payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(default)]
    pub customer_id: Option<String>,
    pub payment_method: PaymentMethod,
}

/// Turns the cart into a sale.
///
/// On success the sold lines leave the cart. A line edited or added while
/// the sale was being written stays for the next checkout. On any failure
/// the cart is left exactly as it was so the operator can retry.
pub async fn checkout(state: &AppState, request: &CheckoutRequest) -> Result<Sale, ApiError> {
    let operator = state.operator();
    let draft = state.cart.with_cart(|cart| {
        cart.to_sale_draft(request.customer_id.clone(), &operator.id, request.payment_method)
    })?;
    debug!(lines = draft.items.len(), total = %draft.total, "checkout command");

    if let Some(customer_id) = &draft.customer_id {
        if state.store.read().await.customer(customer_id).is_none() {
            return Err(ApiError::not_found("customer", customer_id));
        }
    }

    let sale = match state.store.write().await.add_sale(&draft).await {
        Ok(sale) => sale,
        Err(err) => {
            warn!(error = %err, "Checkout failed, cart kept");
            return Err(err.into());
        }
    };

    state.cart.with_cart_mut(|cart| cart.remove_sold(&draft.items));

    info!(
        sale_id = %sale.id,
        total = %sale.total,
        items = sale.items.len(),
        payment = %sale.payment_method,
        "Sale completed"
    );
    Ok(sale)
}

/// Sales in a period, newest first. No period means all sales.
pub async fn list_sales(state: &AppState, period: Option<Period>) -> Result<Vec<Sale>, ApiError> {
    let store = state.store.read().await;
    let Some(period) = period else {
        return Ok(store.sales().to_vec());
    };

    period.validate()?;
    let window = period.window(state.now());
    Ok(filter_sales(store.sales(), &window).into_iter().cloned().collect())
}

pub async fn get_sale(state: &AppState, id: &str) -> Result<Sale, ApiError> {
    state
        .store
        .read()
        .await
        .sales()
        .iter()
        .find(|s| s.id == id)
        .cloned()
        .ok_or_else(|| ApiError::not_found("sale", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::cart::{add_to_cart, get_cart, update_cart_item};
    use crate::commands::product::add_product;
    use crate::error::ErrorCode;
    use crate::state::fixtures::{new_product, state};
    use dokon_core::Money;
    use dokon_db::{Operation, Table};

    fn cash() -> CheckoutRequest {
        CheckoutRequest {
            customer_id: None,
            payment_method: PaymentMethod::Cash,
        }
    }

    #[tokio::test]
    async fn test_checkout_clears_cart_on_success() {
        let (state, _) = state().await;
        let cola = add_product(&state, &new_product("Cola 1L", 1_000, 10, 2)).await.unwrap();
        add_to_cart(&state, &cola.id, Some(3)).await.unwrap();

        let sale = checkout(&state, &cash()).await.unwrap();
        assert_eq!(sale.total, Money::from_cents(3_000));
        assert_eq!(sale.items.len(), 1);
        assert_eq!(sale.user_id, "operator");

        assert!(get_cart(&state).lines.is_empty());
        assert_eq!(get_sale(&state, &sale.id).await.unwrap(), sale);
        assert_eq!(list_sales(&state, Some(Period::Today)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_checkout_failure_preserves_cart() {
        let (state, service) = state().await;
        let cola = add_product(&state, &new_product("Cola 1L", 1_000, 10, 2)).await.unwrap();
        let fanta = add_product(&state, &new_product("Fanta 1L", 900, 10, 2)).await.unwrap();
        add_to_cart(&state, &cola.id, Some(2)).await.unwrap();
        add_to_cart(&state, &fanta.id, Some(1)).await.unwrap();
        let before = get_cart(&state);

        service.fail_on(Table::Sales, Operation::Insert).await;
        let err = checkout(&state, &cash()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ExternalService);
        assert_eq!(get_cart(&state), before);

        // Header saved, items refused
        service.recover().await;
        service.fail_on(Table::SaleItems, Operation::Insert).await;
        let err = checkout(&state, &cash()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PartialWrite);
        assert_eq!(get_cart(&state), before);
        assert!(list_sales(&state, None).await.unwrap().is_empty());

        // Operator retries once the service is back
        service.recover().await;
        checkout(&state, &cash()).await.unwrap();
        assert!(get_cart(&state).lines.is_empty());
    }

    #[tokio::test]
    async fn test_edit_during_checkout_stays_in_cart() {
        let (state, _) = state().await;
        let cola = add_product(&state, &new_product("Cola 1L", 1_000, 10, 2)).await.unwrap();
        let fanta = add_product(&state, &new_product("Fanta 1L", 900, 10, 2)).await.unwrap();
        add_to_cart(&state, &cola.id, Some(2)).await.unwrap();
        add_to_cart(&state, &fanta.id, Some(1)).await.unwrap();

        let store = state.store.write().await;
        let pending = tokio::spawn({
            let state = state.clone();
            async move { checkout(&state, &cash()).await }
        });
        tokio::task::yield_now().await;
        update_cart_item(&state, &cola.id, 4).unwrap();
        drop(store);

        let sale = pending.await.unwrap().unwrap();
        let sold_cola = sale.items.iter().find(|i| i.product_id == cola.id).unwrap();
        assert_eq!(sold_cola.quantity, 2);

        let cart = get_cart(&state);
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.lines[0].product_id, cola.id);
        assert_eq!(cart.lines[0].quantity, 4);
    }

    #[tokio::test]
    async fn test_empty_cart_writes_nothing() {
        let (state, service) = state().await;
        let err = checkout(&state, &cash()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyCart);
        assert_eq!(service.count(Table::Sales).await, 0);
    }

    #[tokio::test]
    async fn test_unknown_customer_is_refused() {
        let (state, _) = state().await;
        let cola = add_product(&state, &new_product("Cola 1L", 1_000, 10, 2)).await.unwrap();
        add_to_cart(&state, &cola.id, None).await.unwrap();

        let request = CheckoutRequest {
            customer_id: Some("c-404".to_string()),
            payment_method: PaymentMethod::Card,
        };
        let err = checkout(&state, &request).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(get_cart(&state).lines.len(), 1);
    }
}
