//! # Cart Commands
//!
//! Commands for cart manipulation.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Checkout │────►│   Sale   │       │
//! │  │  Cart    │     │          │     │          │     │  saved   │       │
//! │  └──────────┘     └──────────┘     └────┬─────┘     └──────────┘       │
//! │       ▲                │                │                │              │
//! │       │           add_to_cart      write failed          │              │
//! │       │           update_cart_item      │                │              │
//! │       │           remove_from_cart      ▼                │              │
//! │       │                │           cart kept,            │              │
//! │       │                ▼           operator retries      │              │
//! │       └─────────── clear_cart ◄──────────────────────────┘              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use dokon_core::{Cart, CartLine, CartTotals};

use crate::error::ApiError;
use crate::state::AppState;

/// Cart response including lines and totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub lines: Vec<CartLine>,
    pub totals: CartTotals,
}

impl From<&Cart> for CartResponse {
    fn from(cart: &Cart) -> Self {
        CartResponse {
            lines: cart.lines.clone(),
            totals: CartTotals::from(cart),
        }
    }
}

/// Gets the current cart contents.
pub fn get_cart(state: &AppState) -> CartResponse {
    state.cart.with_cart(|cart| CartResponse::from(cart))
}

/// Adds a product to the cart.
///
/// ## Behavior
/// - If product already in cart: quantity increases
/// - If product not in cart: added as a new line
/// - Price and discount are frozen when first added
/// - Quantity is clamped to the stock on hand
///
/// ## Arguments
/// * `product_id` - Product to add, looked up in the store
/// * `quantity` - Quantity to add (default: 1)
pub async fn add_to_cart(
    state: &AppState,
    product_id: &str,
    quantity: Option<i64>,
) -> Result<CartResponse, ApiError> {
    let quantity = quantity.unwrap_or(1);
    debug!(product_id = %product_id, quantity, "add_to_cart command");

    let product = state
        .store
        .read()
        .await
        .product(product_id)
        .cloned()
        .ok_or_else(|| ApiError::not_found("product", product_id))?;

    state.cart.with_cart_mut(|cart| -> Result<CartResponse, ApiError> {
        cart.add(&product, quantity)?;
        Ok(CartResponse::from(&*cart))
    })
}

/// Sets the quantity of a line. Zero or less removes it.
pub fn update_cart_item(
    state: &AppState,
    product_id: &str,
    quantity: i64,
) -> Result<CartResponse, ApiError> {
    debug!(product_id = %product_id, quantity, "update_cart_item command");
    state.cart.with_cart_mut(|cart| -> Result<CartResponse, ApiError> {
        cart.set_quantity(product_id, quantity)?;
        Ok(CartResponse::from(&*cart))
    })
}

pub fn remove_from_cart(state: &AppState, product_id: &str) -> CartResponse {
    state.cart.with_cart_mut(|cart| {
        cart.remove(product_id);
        CartResponse::from(&*cart)
    })
}

pub fn clear_cart(state: &AppState) -> CartResponse {
    state.cart.with_cart_mut(|cart| {
        cart.clear();
        CartResponse::from(&*cart)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::product::add_product;
    use crate::error::ErrorCode;
    use crate::state::fixtures::{new_product, state};
    use dokon_core::{DiscountRate, Money};

    #[tokio::test]
    async fn test_adding_twice_merges_lines() {
        let (state, _) = state().await;
        let cola = add_product(&state, &new_product("Cola 1L", 1_000, 10, 2)).await.unwrap();

        add_to_cart(&state, &cola.id, None).await.unwrap();
        let cart = add_to_cart(&state, &cola.id, None).await.unwrap();

        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.lines[0].quantity, 2);
        assert_eq!(cart.totals.total, Money::from_cents(2_000));
    }

    #[tokio::test]
    async fn test_totals_with_discount_and_clamping() {
        let (state, _) = state().await;
        let mut input = new_product("Choy 100g", 20_000, 4, 1);
        input.discount = DiscountRate::from_percent(10);
        let tea = add_product(&state, &input).await.unwrap();

        let cart = add_to_cart(&state, &tea.id, Some(3)).await.unwrap();
        assert_eq!(cart.totals.subtotal, Money::from_cents(60_000));
        assert_eq!(cart.totals.discount, Money::from_cents(6_000));
        assert_eq!(cart.totals.total, Money::from_cents(54_000));

        // Only 4 on hand
        let cart = update_cart_item(&state, &tea.id, 9).unwrap();
        assert_eq!(cart.lines[0].quantity, 4);

        let cart = update_cart_item(&state, &tea.id, 0).unwrap();
        assert!(cart.lines.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_product_and_line() {
        let (state, _) = state().await;
        let err = add_to_cart(&state, "missing", Some(1)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = update_cart_item(&state, "missing", 2).unwrap_err();
        assert_eq!(err.code, ErrorCode::CartError);

        assert!(remove_from_cart(&state, "missing").lines.is_empty());
    }

    #[tokio::test]
    async fn test_out_of_stock_product_is_refused() {
        let (state, _) = state().await;
        let empty = add_product(&state, &new_product("Sprite 1L", 1_000, 0, 2)).await.unwrap();

        let err = add_to_cart(&state, &empty.id, Some(1)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert!(get_cart(&state).lines.is_empty());
    }
}
