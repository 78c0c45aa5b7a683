//! # Validation Module
//!
//! Field rules checked at form submission, before the data service is
//! called. A rejected input never mutates any state.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Screen (out of scope)                                        │
//! │  └── Basic format checks, immediate feedback                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: EntityStore (Rust)                                           │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: field rules per entity                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Data service                                                 │
//! │  └── NOT NULL / primary key constraints                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use dokon_core::validation::{validate_quantity, validate_required};
//!
//! assert_eq!(validate_required("name", "  Non  ", 200).unwrap(), "Non");
//! assert!(validate_quantity(0).is_err());
//! ```

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::money::{DiscountRate, Money};
use crate::types::{
    CategoryPatch, CustomerPatch, MovementKind, NewCategory, NewCustomer, NewProduct,
    NewPurchaseOrder, NewStockMovement, NewSupplier, ProductPatch, SupplierPatch,
};
use crate::{MAX_ITEM_QUANTITY, MAX_PRICE_CENTS, MAX_STOCK_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;
const MAX_PHONE_LEN: usize = 32;
const MAX_EMAIL_LEN: usize = 254;
const MAX_TEXT_LEN: usize = 2000;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required text field and returns it trimmed.
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most `max` characters
pub fn validate_required(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

/// Validates an optional free-text field's length.
pub fn validate_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

/// Validates an optional email address.
///
/// Only the shape is checked: one `@` with text on both sides and a dot in
/// the domain. Empty counts as "not given".
///
/// ## Example
/// ```rust
/// use dokon_core::validation::validate_email;
///
/// assert!(validate_email(Some("kassa@dokon.uz")).is_ok());
/// assert!(validate_email(None).is_ok());
/// assert!(validate_email(Some("kassa")).is_err());
/// ```
pub fn validate_email(email: Option<&str>) -> ValidationResult<()> {
    let Some(email) = email.map(str::trim).filter(|e| !e.is_empty()) else {
        return Ok(());
    };

    validate_text("email", email, MAX_EMAIL_LEN)?;

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    };

    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like name@domain.tld".to_string(),
        });
    }

    Ok(())
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (returns everything)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity for carts, movements and purchase orders.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a count that may be zero, such as bonus points.
pub fn validate_non_negative(field: &str, value: i64) -> ValidationResult<()> {
    validate_bounded(field, value, i64::MAX)
}

/// Validates a stock level or threshold: 0 to MAX_STOCK_QUANTITY.
pub fn validate_stock_level(field: &str, value: i64) -> ValidationResult<()> {
    validate_bounded(field, value, MAX_STOCK_QUANTITY)
}

fn validate_bounded(field: &str, value: i64, max: i64) -> ValidationResult<()> {
    if !(0..=max).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max,
        });
    }
    Ok(())
}

/// Validates a price: 0 (free items) to MAX_PRICE_CENTS.
///
/// ## Example
/// ```rust
/// use dokon_core::money::Money;
/// use dokon_core::validation::validate_price;
///
/// assert!(validate_price("selling_price", Money::from_cents(1099)).is_ok());
/// assert!(validate_price("selling_price", Money::zero()).is_ok());
/// assert!(validate_price("selling_price", Money::from_cents(-100)).is_err());
/// ```
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    validate_bounded(field, price.cents(), MAX_PRICE_CENTS)
}

/// Validates a discount: 0 to 10000 basis points (0% to 100%).
pub fn validate_discount(rate: DiscountRate) -> ValidationResult<()> {
    if rate.bps() > DiscountRate::MAX_BPS {
        return Err(ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: DiscountRate::MAX_BPS as i64,
        });
    }

    Ok(())
}

/// Validates an inclusive date range.
pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> ValidationResult<()> {
    if end < start {
        return Err(ValidationError::InvalidFormat {
            field: "period".to_string(),
            reason: format!("end {end} is before start {start}"),
        });
    }
    Ok(())
}

// =============================================================================
// Entity Validators
// =============================================================================

/// Validates a new product and returns it with trimmed text fields.
///
/// ## Rules
/// - name, category and brand are required
/// - prices are within 0..=MAX_PRICE_CENTS
/// - quantity and min_quantity are within 0..=MAX_STOCK_QUANTITY
/// - discount is within 0..=100%
pub fn validate_new_product(input: &NewProduct) -> ValidationResult<NewProduct> {
    let name = validate_required("name", &input.name, MAX_NAME_LEN)?;
    let category = validate_required("category", &input.category, MAX_NAME_LEN)?;
    let brand = validate_required("brand", &input.brand, MAX_NAME_LEN)?;
    validate_price("cost_price", input.cost_price)?;
    validate_price("selling_price", input.selling_price)?;
    validate_discount(input.discount)?;
    validate_stock_level("quantity", input.quantity)?;
    validate_stock_level("min_quantity", input.min_quantity)?;
    validate_text("description", &input.description, MAX_TEXT_LEN)?;

    Ok(NewProduct {
        name,
        category,
        brand,
        barcode: input.barcode.trim().to_string(),
        ..input.clone()
    })
}

/// Validates the fields present in a product patch.
pub fn validate_product_patch(patch: &ProductPatch) -> ValidationResult<ProductPatch> {
    let mut patch = patch.clone();

    if let Some(name) = &patch.name {
        patch.name = Some(validate_required("name", name, MAX_NAME_LEN)?);
    }
    if let Some(category) = &patch.category {
        patch.category = Some(validate_required("category", category, MAX_NAME_LEN)?);
    }
    if let Some(brand) = &patch.brand {
        patch.brand = Some(validate_required("brand", brand, MAX_NAME_LEN)?);
    }
    if let Some(price) = patch.cost_price {
        validate_price("cost_price", price)?;
    }
    if let Some(price) = patch.selling_price {
        validate_price("selling_price", price)?;
    }
    if let Some(discount) = patch.discount {
        validate_discount(discount)?;
    }
    if let Some(quantity) = patch.quantity {
        validate_stock_level("quantity", quantity)?;
    }
    if let Some(min_quantity) = patch.min_quantity {
        validate_stock_level("min_quantity", min_quantity)?;
    }
    if let Some(description) = &patch.description {
        validate_text("description", description, MAX_TEXT_LEN)?;
    }

    Ok(patch)
}

pub fn validate_new_category(input: &NewCategory) -> ValidationResult<NewCategory> {
    Ok(NewCategory {
        name: validate_required("name", &input.name, MAX_NAME_LEN)?,
        ..input.clone()
    })
}

pub fn validate_category_patch(patch: &CategoryPatch) -> ValidationResult<CategoryPatch> {
    let mut patch = patch.clone();
    if let Some(name) = &patch.name {
        patch.name = Some(validate_required("name", name, MAX_NAME_LEN)?);
    }
    Ok(patch)
}

/// Customers need a name and a phone; email is shape-checked when given.
pub fn validate_new_customer(input: &NewCustomer) -> ValidationResult<NewCustomer> {
    let name = validate_required("name", &input.name, MAX_NAME_LEN)?;
    let phone = validate_required("phone", &input.phone, MAX_PHONE_LEN)?;
    validate_email(input.email.as_deref())?;
    validate_non_negative("bonus_points", input.bonus_points)?;
    validate_non_negative("total_purchases", input.total_purchases.cents())?;

    Ok(NewCustomer {
        name,
        phone,
        ..input.clone()
    })
}

pub fn validate_customer_patch(patch: &CustomerPatch) -> ValidationResult<CustomerPatch> {
    let mut patch = patch.clone();
    if let Some(name) = &patch.name {
        patch.name = Some(validate_required("name", name, MAX_NAME_LEN)?);
    }
    if let Some(phone) = &patch.phone {
        patch.phone = Some(validate_required("phone", phone, MAX_PHONE_LEN)?);
    }
    validate_email(patch.email.as_deref())?;
    if let Some(points) = patch.bonus_points {
        validate_non_negative("bonus_points", points)?;
    }
    Ok(patch)
}

pub fn validate_new_supplier(input: &NewSupplier) -> ValidationResult<NewSupplier> {
    let name = validate_required("name", &input.name, MAX_NAME_LEN)?;
    let phone = validate_required("phone", &input.phone, MAX_PHONE_LEN)?;
    validate_email(input.email.as_deref())?;

    Ok(NewSupplier {
        name,
        phone,
        contact_person: input.contact_person.trim().to_string(),
        ..input.clone()
    })
}

pub fn validate_supplier_patch(patch: &SupplierPatch) -> ValidationResult<SupplierPatch> {
    let mut patch = patch.clone();
    if let Some(name) = &patch.name {
        patch.name = Some(validate_required("name", name, MAX_NAME_LEN)?);
    }
    if let Some(phone) = &patch.phone {
        patch.phone = Some(validate_required("phone", phone, MAX_PHONE_LEN)?);
    }
    validate_email(patch.email.as_deref())?;
    Ok(patch)
}

/// Validates a stock movement.
///
/// A stock-take records the counted quantity, so zero is allowed there.
/// Every other kind moves at least one unit.
pub fn validate_new_stock_movement(input: &NewStockMovement) -> ValidationResult<()> {
    validate_required("product_id", &input.product_id, MAX_NAME_LEN)?;
    validate_required("user_id", &input.user_id, MAX_NAME_LEN)?;
    validate_text("reason", &input.reason, MAX_TEXT_LEN)?;

    match input.kind {
        MovementKind::StockTake => validate_stock_level("quantity", input.quantity),
        _ => validate_quantity(input.quantity),
    }
}

/// Validates a purchase order: a supplier and at least one valid line.
pub fn validate_new_purchase_order(input: &NewPurchaseOrder) -> ValidationResult<()> {
    validate_required("supplier_id", &input.supplier_id, MAX_NAME_LEN)?;

    if input.items.is_empty() {
        return Err(ValidationError::required("items"));
    }

    for item in &input.items {
        validate_required("product_id", &item.product_id, MAX_NAME_LEN)?;
        validate_quantity(item.quantity)?;
        validate_price("unit_price", item.unit_price)?;
    }

    validate_text("notes", &input.notes, MAX_TEXT_LEN)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PurchaseOrderItem;

    fn new_product() -> NewProduct {
        NewProduct {
            name: "  Non  ".to_string(),
            category: "Non mahsulotlari".to_string(),
            brand: "Toshkent Non".to_string(),
            cost_price: Money::from_cents(300_000),
            selling_price: Money::from_cents(400_000),
            discount: DiscountRate::zero(),
            quantity: 40,
            min_quantity: 10,
            barcode: String::new(),
            description: String::new(),
            image_url: None,
        }
    }

    #[test]
    fn test_validate_new_product_trims() {
        let valid = validate_new_product(&new_product()).unwrap();
        assert_eq!(valid.name, "Non");
    }

    #[test]
    fn test_validate_new_product_rejects() {
        let mut input = new_product();
        input.brand = "   ".to_string();
        assert!(matches!(
            validate_new_product(&input),
            Err(ValidationError::Required { .. })
        ));

        let mut input = new_product();
        input.quantity = -1;
        assert!(validate_new_product(&input).is_err());

        let mut input = new_product();
        input.discount = DiscountRate::from_bps(10_001);
        assert!(validate_new_product(&input).is_err());

        let mut input = new_product();
        input.discount = DiscountRate::from_percent(100);
        assert!(validate_new_product(&input).is_ok());
    }

    #[test]
    fn test_validate_product_patch() {
        assert!(validate_product_patch(&ProductPatch::quantity(0)).is_ok());
        assert!(validate_product_patch(&ProductPatch::quantity(-5)).is_err());
        assert!(validate_product_patch(&ProductPatch::category("")).is_err());
    }

    #[test]
    fn test_stock_and_price_ceilings() {
        let mut input = new_product();
        input.quantity = MAX_STOCK_QUANTITY;
        input.min_quantity = MAX_STOCK_QUANTITY;
        input.selling_price = Money::from_cents(MAX_PRICE_CENTS);
        assert!(validate_new_product(&input).is_ok());

        let mut input = new_product();
        input.quantity = MAX_STOCK_QUANTITY + 1;
        assert!(matches!(
            validate_new_product(&input),
            Err(ValidationError::OutOfRange { max: MAX_STOCK_QUANTITY, .. })
        ));

        let mut input = new_product();
        input.cost_price = Money::from_cents(MAX_PRICE_CENTS + 1);
        assert!(validate_new_product(&input).is_err());

        assert!(validate_product_patch(&ProductPatch::quantity(i64::MAX / 10)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(MAX_ITEM_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email(Some("a@b.uz")).is_ok());
        assert!(validate_email(Some("")).is_ok());
        assert!(validate_email(Some("@b.uz")).is_err());
        assert!(validate_email(Some("a@b")).is_err());
        assert!(validate_email(Some("a@@b.uz")).is_err());
    }

    #[test]
    fn test_validate_customer_requires_phone() {
        let input = NewCustomer {
            name: "Aziza".to_string(),
            phone: " ".to_string(),
            email: None,
            address: None,
            bonus_points: 0,
            total_purchases: Money::zero(),
        };
        assert!(validate_new_customer(&input).is_err());
    }

    #[test]
    fn test_stock_take_allows_zero() {
        let mut movement = NewStockMovement {
            product_id: "p-1".to_string(),
            kind: MovementKind::StockTake,
            quantity: 0,
            reason: "count".to_string(),
            supplier_id: None,
            user_id: "u-1".to_string(),
        };
        assert!(validate_new_stock_movement(&movement).is_ok());

        movement.kind = MovementKind::Inbound;
        assert!(validate_new_stock_movement(&movement).is_err());
    }

    #[test]
    fn test_purchase_order_needs_items() {
        let mut order = NewPurchaseOrder {
            supplier_id: "s-1".to_string(),
            items: vec![],
            delivery_date: None,
            notes: String::new(),
        };
        assert!(validate_new_purchase_order(&order).is_err());

        order.items.push(PurchaseOrderItem {
            product_id: "p-1".to_string(),
            quantity: 5,
            unit_price: Money::from_cents(100),
        });
        assert!(validate_new_purchase_order(&order).is_ok());
    }

    #[test]
    fn test_validate_date_range() {
        let a = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let b = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();
        assert!(validate_date_range(a, b).is_ok());
        assert!(validate_date_range(a, a).is_ok());
        assert!(validate_date_range(b, a).is_err());
    }
}
