//! # Error Types
//!
//! Domain-specific error types for dokon-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  dokon-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule violations (cart, stock, FSM)    │
//! │  └── ValidationError  - Input rejected before any write                │
//! │                                                                         │
//! │  dokon-db errors (separate crate)                                      │
//! │  ├── DbError          - External data service failures                 │
//! │  └── StoreError       - What EntityStore operations return             │
//! │                                                                         │
//! │  Back-office errors (in app)                                           │
//! │  └── ApiError         - What the presentation layer sees               │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StoreError → ApiError → Screen    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Checkout was attempted with no lines in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Product has no stock left to put in the cart or move out.
    ///
    /// ## User Workflow
    /// ```text
    /// Outbound movement (qty: 5)
    ///      │
    ///      ▼
    /// Check stock: available=3
    ///      │
    ///      ▼
    /// InsufficientStock { product: "Choy 100g", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// Screen shows: "Only 3 Choy 100g in stock"
    /// ```
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// The cart has no line for this product.
    #[error("Product {0} is not in the cart")]
    NotInCart(String),

    /// Cart has reached the maximum number of distinct lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds the hard ceiling.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// A purchase order status change that the state machine forbids.
    #[error("Purchase order {order_id} cannot move from {from} to {to}")]
    InvalidStatusTransition {
        order_id: String,
        from: String,
        to: String,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised at form submission, before the data service is called.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., malformed email, inverted date range).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    pub(crate) fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
