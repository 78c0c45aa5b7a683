//! # Cart
//!
//! The session-scoped list of lines rung up at the till. Nothing here is
//! persisted; checkout turns the cart into a [`SaleDraft`] that the entity
//! store writes.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Cart Operations                                 │
//! │                                                                         │
//! │  Operator Action          Method                  Effect                │
//! │  ───────────────          ──────                  ──────                │
//! │                                                                         │
//! │  Scan / click product ───► add(product, q) ─────► merge or append      │
//! │                                                   (clamped to stock)   │
//! │                                                                         │
//! │  Change quantity ────────► set_quantity(id, q) ─► q ≤ 0 removes line   │
//! │                                                                         │
//! │  Click remove ───────────► remove(id) ──────────► line dropped         │
//! │                                                                         │
//! │  Pay ────────────────────► to_sale_draft(..) ───► SaleDraft            │
//! │                                                   (EmptyCart if none)  │
//! │                                                                         │
//! │  Sale written ───────────► clear() ─────────────► lines = []           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Lines are unique by `product_id`
//! - Every line has `1 <= quantity <= available`
//! - `total() == subtotal() - discount_amount()`, and both are `>= 0` while
//!   every discount is within 0..=100%

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::{DiscountRate, Money};
use crate::types::{PaymentMethod, Product, SaleDraft, SaleItem};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

// =============================================================================
// Cart Line
// =============================================================================

/// One product in the cart.
///
/// Price and discount are captured when the product is first added. If the
/// product is edited afterwards the line keeps the original figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    pub product_id: String,
    /// Name at time of adding, for display.
    pub name: String,
    pub unit_price: Money,
    pub discount: DiscountRate,
    pub quantity: i64,
    /// Stock on hand when the product was last added. Upper bound for
    /// `quantity`.
    pub available: i64,
}

impl CartLine {
    fn from_product(product: &Product, quantity: i64) -> Self {
        CartLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.selling_price,
            discount: product.discount,
            quantity,
            available: product.quantity,
        }
    }

    /// `unit_price × quantity`.
    #[inline]
    pub fn gross(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }

    /// Amount this line's discount takes off, rounded once per line.
    #[inline]
    pub fn discount_amount(&self) -> Money {
        self.gross().discount_amount(self.discount)
    }

    #[inline]
    pub fn net(&self) -> Money {
        self.gross() - self.discount_amount()
    }

    fn to_sale_item(&self) -> SaleItem {
        SaleItem {
            product_id: self.product_id.clone(),
            quantity: self.quantity,
            price: self.unit_price,
            discount: self.discount,
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The cart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cart {
    pub lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Cart::default()
    }

    /// Adds `quantity` units of a product.
    ///
    /// ## Behavior
    /// - Product already in cart: quantity grows by `quantity`
    /// - Product not in cart: a new line is appended
    /// - Either way the line is clamped to the product's current stock
    ///
    /// ## Errors
    /// - `Validation` when `quantity <= 0`
    /// - `QuantityTooLarge` when `quantity > MAX_ITEM_QUANTITY`
    /// - `InsufficientStock` when the product has no stock at all
    /// - `CartTooLarge` when a new line would exceed `MAX_CART_ITEMS`
    pub fn add(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        if quantity <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            }
            .into());
        }
        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }
        if product.quantity <= 0 {
            return Err(CoreError::InsufficientStock {
                product: product.name.clone(),
                available: product.quantity.max(0),
                requested: quantity,
            });
        }

        let ceiling = product.quantity.min(MAX_ITEM_QUANTITY);

        if let Some(line) = self.line_mut(&product.id) {
            line.available = product.quantity;
            line.quantity = (line.quantity + quantity).min(ceiling);
            return Ok(());
        }

        if self.lines.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        self.lines
            .push(CartLine::from_product(product, quantity.min(ceiling)));
        Ok(())
    }

    /// Sets a line's quantity.
    ///
    /// `quantity <= 0` removes the line. Larger values are clamped to the
    /// stock captured on the line.
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity <= 0 {
            self.remove(product_id);
            return Ok(());
        }
        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }

        let line = self
            .line_mut(product_id)
            .ok_or_else(|| CoreError::NotInCart(product_id.to_string()))?;
        line.quantity = quantity.min(line.available);
        Ok(())
    }

    /// Drops a line. Returns whether one was there.
    pub fn remove(&mut self, product_id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.product_id != product_id);
        self.lines.len() != before
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Drops the lines that were sold as `items`. A line whose quantity
    /// changed since the sale was drafted, or that was added after it, stays.
    pub fn remove_sold(&mut self, items: &[SaleItem]) {
        self.lines.retain(|line| {
            !items
                .iter()
                .any(|item| item.product_id == line.product_id && item.quantity == line.quantity)
        });
    }

    pub fn line(&self, product_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product_id == product_id)
    }

    fn line_mut(&mut self, product_id: &str) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| line.product_id == product_id)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines.
    #[inline]
    pub fn item_count(&self) -> usize {
        self.lines.len()
    }

    /// Units across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Σ(unit price × quantity).
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::gross).sum()
    }

    /// Σ(unit price × quantity × discount%).
    pub fn discount_amount(&self) -> Money {
        self.lines.iter().map(CartLine::discount_amount).sum()
    }

    pub fn total(&self) -> Money {
        self.subtotal() - self.discount_amount()
    }

    /// Builds the sale to write at checkout. The cart itself is untouched;
    /// the caller clears it once the write succeeds.
    pub fn to_sale_draft(
        &self,
        customer_id: Option<String>,
        user_id: &str,
        payment_method: PaymentMethod,
    ) -> CoreResult<SaleDraft> {
        if self.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        Ok(SaleDraft {
            customer_id,
            user_id: user_id.to_string(),
            items: self.lines.iter().map(CartLine::to_sale_item).collect(),
            total: self.total(),
            payment_method,
        })
    }
}

/// Cart totals summary for the till display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartTotals {
    pub item_count: usize,
    pub total_quantity: i64,
    pub subtotal: Money,
    pub discount: Money,
    pub total: Money,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
            subtotal: cart.subtotal(),
            discount: cart.discount_amount(),
            total: cart.total(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
