//! # API Error Type
//!
//! Unified error type for back-office commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Dokon                                  │
//! │                                                                         │
//! │  Screen                      Rust Backend                               │
//! │  ──────                      ────────────                               │
//! │                                                                         │
//! │  checkout(...)                                                          │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Validation? ─── ValidationError ───────────────────┐           │  │
//! │  │         │                                            │           │  │
//! │  │         ▼                                            ▼           │  │
//! │  │  Business rule? ─── CoreError::EmptyCart ──────── ApiError ────►│  │
//! │  │         │                                            ▲           │  │
//! │  │         ▼                                            │           │  │
//! │  │  Data service? ─── StoreError::ExternalService ──────┘           │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  e.code    = "EMPTY_CART"                                               │
//! │  e.message = "Cart is empty"                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use dokon_core::{CoreError, ValidationError};
use dokon_db::{DbError, StoreError};

use crate::state::ConfigError;

/// Error returned from commands.
///
/// ## Serialization
/// This is what the screen receives when a command fails:
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "product not found: 7b2c..."
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The mutation targets an id that does not exist
    NotFound,

    /// Input validation failed, nothing was written
    ValidationError,

    /// The data service rejected or failed the call; the operator may retry
    ExternalService,

    /// A business rule refused the operation
    BusinessLogic,

    /// Cart operation failed
    CartError,

    /// Checkout with no lines
    EmptyCart,

    /// Not enough units on hand
    InsufficientStock,

    /// Part of a multi-row write was saved (sale header without items)
    PartialWrite,

    /// Internal error
    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::EmptyCart => ErrorCode::EmptyCart,
            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::NotInCart(_) | CoreError::CartTooLarge { .. } => ErrorCode::CartError,
            CoreError::QuantityTooLarge { .. } | CoreError::Validation(_) => {
                ErrorCode::ValidationError
            }
            CoreError::InvalidStatusTransition { .. } => ErrorCode::BusinessLogic,
        };
        ApiError::new(code, err.to_string())
    }
}

/// Converts data service errors to API errors.
///
/// The underlying message is logged; the screen gets a generic one.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::Serialization(e) => {
                tracing::error!("Row conversion failed: {}", e);
                ApiError::internal("Stored data could not be read")
            }
            other => {
                tracing::error!("Data service call failed: {}", other);
                ApiError::new(
                    ErrorCode::ExternalService,
                    "The data service is unavailable, please try again",
                )
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(e) => e.into(),
            StoreError::Domain(e) => e.into(),
            StoreError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            StoreError::ExternalService(e) => e.into(),
            StoreError::OrphanedSale { sale_id, source } => {
                tracing::error!(sale_id = %sale_id, "Sale items not saved: {}", source);
                ApiError::new(
                    ErrorCode::PartialWrite,
                    format!("Sale {} was saved without its items; the cart was kept", sale_id),
                )
            }
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
