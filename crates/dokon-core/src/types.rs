//! # Domain Types
//!
//! Entities held by the entity store, the inputs used to create them, and
//! the partial updates used to change them.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │  StockMovement  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  category(name) │◄──│  items[]        │   │  type           │       │
//! │  │  selling_price  │   │   (snapshots)   │   │  quantity       │       │
//! │  │  quantity       │   │  total          │   │  product_id ────┼──►    │
//! │  │  min_quantity   │   │  payment_method │   │  (append-only)  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Category     │   │  PurchaseOrder  │   │  Notification   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  name, color    │   │  status (FSM)   │   │  type, read     │       │
//! │  └─────────────────┘   │  items[]        │   │  (never stored) │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Weak References
//! `Sale.items[].product_id`, `StockMovement.product_id` and
//! `PurchaseOrder.items[].product_id` point at products that may since have
//! been deleted. Lookups that fail to resolve mean "unknown product", not an
//! error.
//!
//! ## Timestamps
//! `id`, `created_at` and `updated_at` are assigned by the data service on
//! insert and update. The `New*` inputs therefore never carry them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::{DiscountRate, Money};

// =============================================================================
// Product
// =============================================================================

/// A product on the shelf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Category NAME, not an id. Free text matched against `Category.name`.
    pub category: String,

    pub brand: String,

    /// Purchase cost per unit.
    pub cost_price: Money,

    /// Shelf price per unit.
    pub selling_price: Money,

    /// Discount applied at the till (0..=100%).
    pub discount: DiscountRate,

    /// Units on hand, never negative.
    pub quantity: i64,

    /// Reorder threshold.
    pub min_quantity: i64,

    /// Barcode, possibly empty.
    #[serde(default)]
    pub barcode: String,

    #[serde(default)]
    pub description: String,

    /// Public URL returned by the image storage service.
    #[serde(default)]
    pub image_url: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// A product is low on stock once it falls to its reorder threshold.
    ///
    /// ```rust
    /// # use dokon_core::types::Product;
    /// # fn check(p: &Product) {
    /// assert_eq!(p.is_low_stock(), p.quantity <= p.min_quantity);
    /// # }
    /// ```
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_quantity
    }

    /// Shelf price after the product's own discount.
    pub fn discounted_price(&self) -> Money {
        self.selling_price.apply_discount(self.discount)
    }

    /// Case-insensitive match over name, category and brand, plus a barcode
    /// substring match. An empty term matches everything.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim();
        if term.is_empty() {
            return true;
        }
        let needle = term.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self.category.to_lowercase().contains(&needle)
            || self.brand.to_lowercase().contains(&needle)
            || self.barcode.contains(term)
    }
}

/// Fields for creating a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub brand: String,
    pub cost_price: Money,
    pub selling_price: Money,
    #[serde(default)]
    pub discount: DiscountRate,
    pub quantity: i64,
    pub min_quantity: i64,
    #[serde(default)]
    pub barcode: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Partial update of a product. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_price: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selling_price: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<DiscountRate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl ProductPatch {
    /// Patch that only sets the stock level.
    pub fn quantity(quantity: i64) -> Self {
        ProductPatch {
            quantity: Some(quantity),
            ..Default::default()
        }
    }

    /// Patch that only moves the product to another category.
    pub fn category(category: impl Into<String>) -> Self {
        ProductPatch {
            category: Some(category.into()),
            ..Default::default()
        }
    }
}

// =============================================================================
// Category
// =============================================================================

/// Colour given to categories created without one.
pub const DEFAULT_CATEGORY_COLOR: &str = "#3B82F6";

/// A product category. Products refer to it by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Display hint, e.g. `#3B82F6`.
    pub color: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Empty means [`DEFAULT_CATEGORY_COLOR`].
    #[serde(default)]
    pub color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

// =============================================================================
// Customer
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    /// Loyalty points accumulated so far.
    #[serde(default)]
    pub bonus_points: i64,
    /// Running sum of everything this customer has bought.
    #[serde(default)]
    pub total_purchases: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// Case-insensitive match over name and email, substring match on phone.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim();
        if term.is_empty() {
            return true;
        }
        let needle = term.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self.phone.contains(term)
            || self
                .email
                .as_deref()
                .is_some_and(|email| email.to_lowercase().contains(&needle))
    }

    /// Has bought at least once.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.total_purchases.is_positive()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewCustomer {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub bonus_points: i64,
    #[serde(default)]
    pub total_purchases: Money,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonus_points: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_purchases: Option<Money>,
}

// =============================================================================
// Supplier
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Supplier {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub contact_person: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSupplier {
    pub name: String,
    #[serde(default)]
    pub contact_person: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SupplierPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash at the till.
    Cash,
    /// Card on the external terminal.
    Card,
    /// Bank transfer or payment app.
    Online,
}

impl PaymentMethod {
    /// Every method, in report order.
    pub const ALL: [PaymentMethod; 3] =
        [PaymentMethod::Cash, PaymentMethod::Card, PaymentMethod::Online];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Online => "online",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Sale
// =============================================================================

/// One line of a sale.
///
/// Price and discount are frozen at checkout; later product edits never
/// reach back into historical sales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleItem {
    pub product_id: String,
    pub quantity: i64,
    /// Unit price at time of sale (frozen).
    pub price: Money,
    /// Discount at time of sale (frozen).
    pub discount: DiscountRate,
}

impl SaleItem {
    /// `price × quantity` before the discount.
    #[inline]
    pub fn gross(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }

    /// Line total net of the snapshot discount.
    pub fn net(&self) -> Money {
        self.gross().apply_discount(self.discount)
    }
}

/// A completed sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Sale {
    pub id: String,
    #[serde(default)]
    pub customer_id: Option<String>,
    /// Operator who rang the sale up.
    pub user_id: String,
    /// Line items, stored in their own table and attached on load.
    #[serde(default)]
    pub items: Vec<SaleItem>,
    /// Total after discounts.
    pub total: Money,
    pub payment_method: PaymentMethod,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A sale ready to be written: the cart's output at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleDraft {
    #[serde(default)]
    pub customer_id: Option<String>,
    pub user_id: String,
    pub items: Vec<SaleItem>,
    pub total: Money,
    pub payment_method: PaymentMethod,
}

// =============================================================================
// Stock Movement
// =============================================================================

/// Kind of stock movement and its effect on the product's quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    /// Goods received: `+q`.
    Inbound,
    /// Goods written off or shipped: `−q`.
    Outbound,
    /// Goods brought back by a customer: `+q`.
    Return,
    /// Physical count: quantity becomes `q`.
    StockTake,
}

impl MovementKind {
    /// Quantity after applying a movement of `amount` to `current`.
    ///
    /// ```rust
    /// use dokon_core::types::MovementKind;
    ///
    /// assert_eq!(MovementKind::Inbound.apply(3, 10), 13);
    /// assert_eq!(MovementKind::Outbound.apply(13, 4), 9);
    /// assert_eq!(MovementKind::StockTake.apply(9, 7), 7);
    /// ```
    pub fn apply(&self, current: i64, amount: i64) -> i64 {
        match self {
            MovementKind::Inbound | MovementKind::Return => current.saturating_add(amount),
            MovementKind::Outbound => current.saturating_sub(amount),
            MovementKind::StockTake => amount,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::Inbound => "inbound",
            MovementKind::Outbound => "outbound",
            MovementKind::Return => "return",
            MovementKind::StockTake => "stock_take",
        }
    }
}

impl fmt::Display for MovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An append-only ledger entry. Never edited, never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockMovement {
    pub id: String,
    pub product_id: String,
    #[serde(rename = "type")]
    pub kind: MovementKind,
    pub quantity: i64,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub supplier_id: Option<String>,
    pub user_id: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewStockMovement {
    pub product_id: String,
    #[serde(rename = "type")]
    pub kind: MovementKind,
    pub quantity: i64,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub supplier_id: Option<String>,
    pub user_id: String,
}

// =============================================================================
// Purchase Order
// =============================================================================

/// Purchase order lifecycle.
///
/// ```text
///              ┌──────────┐
///         ┌───►│ Accepted │ (terminal)
/// ┌───────┴─┐  └──────────┘
/// │ Pending │
/// └───────┬─┘  ┌───────────┐
///         └───►│ Cancelled │ (terminal)
///              └───────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseOrderStatus {
    Pending,
    Accepted,
    Cancelled,
}

impl PurchaseOrderStatus {
    /// Only pending orders move, and only forward.
    pub fn can_transition_to(&self, next: PurchaseOrderStatus) -> bool {
        matches!(
            (self, next),
            (PurchaseOrderStatus::Pending, PurchaseOrderStatus::Accepted)
                | (PurchaseOrderStatus::Pending, PurchaseOrderStatus::Cancelled)
        )
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PurchaseOrderStatus::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseOrderStatus::Pending => "pending",
            PurchaseOrderStatus::Accepted => "accepted",
            PurchaseOrderStatus::Cancelled => "cancelled",
        }
    }
}

impl Default for PurchaseOrderStatus {
    fn default() -> Self {
        PurchaseOrderStatus::Pending
    }
}

impl fmt::Display for PurchaseOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PurchaseOrderItem {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price: Money,
}

impl PurchaseOrderItem {
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PurchaseOrder {
    pub id: String,
    pub supplier_id: String,
    /// Line items, stored in their own table and attached on load.
    #[serde(default)]
    pub items: Vec<PurchaseOrderItem>,
    /// `Σ quantity × unit_price`, fixed when the order is created.
    pub total_amount: Money,
    pub status: PurchaseOrderStatus,
    #[ts(as = "String")]
    pub order_date: NaiveDate,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub delivery_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewPurchaseOrder {
    pub supplier_id: String,
    pub items: Vec<PurchaseOrderItem>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub delivery_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: String,
}

impl NewPurchaseOrder {
    pub fn total_amount(&self) -> Money {
        self.items.iter().map(PurchaseOrderItem::line_total).sum()
    }
}

/// Field update of a purchase order. A `status` change is checked against
/// [`PurchaseOrderStatus::can_transition_to`] before it is written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PurchaseOrderPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PurchaseOrderStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub delivery_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

// =============================================================================
// Notifications
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Info,
    Warning,
    Error,
    Success,
}

/// Screens a notification can send the operator to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Dashboard,
    Products,
    Warehouse,
    Sales,
    Customers,
    Employees,
    Reports,
    Settings,
}

/// Navigation hint attached to a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NotificationAction {
    pub label: String,
    pub screen: Screen,
}

impl NotificationAction {
    pub fn view(screen: Screen) -> Self {
        NotificationAction {
            label: "View".to_string(),
            screen,
        }
    }
}

/// An alert shown in the header bell. Lives in memory only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub read: bool,
    #[serde(default)]
    pub action: Option<NotificationAction>,
}

/// Notification raised by hand, before the center assigns id and time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewNotification {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub action: Option<NotificationAction>,
}

// =============================================================================
// Operator
// =============================================================================

/// Role label attached to the signed-in operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Cashier,
    Storekeeper,
    Accountant,
}

impl Default for Role {
    fn default() -> Self {
        Role::Cashier
    }
}

/// The signed-in operator, resolved outside this system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Operator {
    pub id: String,
    pub name: String,
    pub role: Role,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product(quantity: i64, min_quantity: i64) -> Product {
        serde_json::from_value(json!({
            "id": "p-1",
            "name": "Choy Ahmad 100g",
            "category": "Ichimliklar",
            "brand": "Ahmad",
            "cost_price": 1_200_000,
            "selling_price": 1_500_000,
            "discount": 0,
            "quantity": quantity,
            "min_quantity": min_quantity,
            "barcode": "4780001234567",
            "description": "",
            "created_at": "2026-03-01T09:00:00Z",
            "updated_at": "2026-03-01T09:00:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn test_low_stock_threshold_is_inclusive() {
        assert!(product(3, 5).is_low_stock());
        assert!(product(5, 5).is_low_stock());
        assert!(!product(6, 5).is_low_stock());
        assert!(product(0, 0).is_low_stock());
    }

    #[test]
    fn test_product_search() {
        let p = product(10, 2);
        assert!(p.matches("choy"));
        assert!(p.matches("ICHIMLIK"));
        assert!(p.matches("ahmad"));
        assert!(p.matches("12345"));
        assert!(p.matches("  "));
        assert!(!p.matches("qahva"));
    }

    #[test]
    fn test_movement_effects() {
        assert_eq!(MovementKind::Inbound.apply(3, 10), 13);
        assert_eq!(MovementKind::Return.apply(3, 2), 5);
        assert_eq!(MovementKind::Outbound.apply(3, 3), 0);
        assert_eq!(MovementKind::StockTake.apply(3, 42), 42);
        assert_eq!(MovementKind::Inbound.apply(i64::MAX, 1), i64::MAX);
    }

    #[test]
    fn test_movement_kind_serializes_as_type() {
        let value = serde_json::to_value(NewStockMovement {
            product_id: "p-1".to_string(),
            kind: MovementKind::StockTake,
            quantity: 4,
            reason: String::new(),
            supplier_id: None,
            user_id: "u-1".to_string(),
        })
        .unwrap();
        assert_eq!(value["type"], "stock_take");
    }

    #[test]
    fn test_purchase_order_transitions() {
        use PurchaseOrderStatus::*;
        assert!(Pending.can_transition_to(Accepted));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(!Pending.can_transition_to(Pending));
        assert!(!Accepted.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Pending));
        assert!(Accepted.is_terminal());
    }

    #[test]
    fn test_sale_item_net_uses_snapshot_discount() {
        let item = SaleItem {
            product_id: "p-1".to_string(),
            quantity: 2,
            price: Money::from_cents(10_000),
            discount: DiscountRate::from_percent(10),
        };
        assert_eq!(item.gross().cents(), 20_000);
        assert_eq!(item.net().cents(), 18_000);
    }

    #[test]
    fn test_patch_skips_absent_fields() {
        let value = serde_json::to_value(ProductPatch::quantity(13)).unwrap();
        assert_eq!(value, json!({ "quantity": 13 }));
    }

    #[test]
    fn test_new_purchase_order_total() {
        let order = NewPurchaseOrder {
            supplier_id: "s-1".to_string(),
            items: vec![
                PurchaseOrderItem {
                    product_id: "p-1".to_string(),
                    quantity: 10,
                    unit_price: Money::from_cents(1_200),
                },
                PurchaseOrderItem {
                    product_id: "p-2".to_string(),
                    quantity: 3,
                    unit_price: Money::from_cents(500),
                },
            ],
            delivery_date: None,
            notes: String::new(),
        };
        assert_eq!(order.total_amount().cents(), 13_500);
    }
}
