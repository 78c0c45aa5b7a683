//! # Cart State
//!
//! The session's cart.
//!
//! ## Thread Safety
//! The cart is wrapped in `Arc<Mutex<T>>` because several commands touch it
//! and only one may change it at a time. Cart operations never await, so a
//! std `Mutex` is enough; the guard must not live across an `.await`.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State Operations                                │
//! │                                                                         │
//! │  Operator Action          Command                 Cart State Change     │
//! │  ───────────────          ───────                 ─────────────────     │
//! │                                                                         │
//! │  Pick Product ───────────► add_to_cart() ───────► lines.push / qty += n │
//! │                                                                         │
//! │  Change Quantity ────────► update_cart_item() ──► qty = n (≤ 0 removes) │
//! │                                                                         │
//! │  Click Remove ───────────► remove_from_cart() ──► lines.retain(..)     │
//! │                                                                         │
//! │  Click Clear ────────────► clear_cart() ────────► lines.clear()        │
//! │                                                                         │
//! │  Pay ────────────────────► checkout() ──────────► cleared on success   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use dokon_core::Cart;

#[derive(Debug, Clone, Default)]
pub struct CartState {
    cart: Arc<Mutex<Cart>>,
}

impl CartState {
    /// Creates a new empty cart state.
    pub fn new() -> Self {
        CartState::default()
    }

    /// Executes a function with read access to the cart.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let totals = state.cart.with_cart(|cart| CartTotals::from(cart));
    /// ```
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        // A panic mid-update cannot leave a Cart half-built; keep going
        let cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&cart)
    }

    /// Executes a function with write access to the cart.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// state.cart.with_cart_mut(|cart| cart.add(&product, 1))?;
    /// ```
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut cart)
    }
}
