//! # Data Service
//!
//! The row-oriented CRUD collaborator the entity store talks to. Rows are
//! JSON objects; the service owns `id`, `created_at` and `updated_at`.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         DataService                                     │
//! │                                                                         │
//! │   select(table, query)        ──► Vec<Row>                              │
//! │   insert(table, row)          ──► Row      (id + timestamps assigned)   │
//! │   insert_many(table, rows)    ──► Vec<Row> (all or nothing)             │
//! │   update(table, id, patch)    ──► Row      (shallow merge)              │
//! │   delete(table, id)           ──► ()                                    │
//! │                                                                         │
//! │   Implementations:                                                      │
//! │   ├── Database           (sqlx SQLite, pool.rs)                         │
//! │   └── MemoryDataService  (in process, can be told to fail)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::cmp::Ordering;
use std::fmt;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{DbError, DbResult};

/// One row: a JSON object keyed by column name.
pub type Row = Map<String, Value>;

// =============================================================================
// Tables
// =============================================================================

/// Every table the back-office reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Products,
    Categories,
    Customers,
    Suppliers,
    Sales,
    SaleItems,
    StockMovements,
    PurchaseOrders,
    PurchaseOrderItems,
}

impl Table {
    pub const ALL: [Table; 9] = [
        Table::Products,
        Table::Categories,
        Table::Customers,
        Table::Suppliers,
        Table::Sales,
        Table::SaleItems,
        Table::StockMovements,
        Table::PurchaseOrders,
        Table::PurchaseOrderItems,
    ];

    /// SQL table name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Products => "products",
            Table::Categories => "categories",
            Table::Customers => "customers",
            Table::Suppliers => "suppliers",
            Table::Sales => "sales",
            Table::SaleItems => "sale_items",
            Table::StockMovements => "stock_movements",
            Table::PurchaseOrders => "purchase_orders",
            Table::PurchaseOrderItems => "purchase_order_items",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Query
// =============================================================================

/// Equality filters plus an optional sort column.
///
/// ```rust
/// use dokon_db::Query;
///
/// let query = Query::new()
///     .eq("category", "Ichimliklar")
///     .order("created_at", false);
/// assert_eq!(query.filters.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<(String, Value)>,
    /// `(column, ascending)`.
    pub order: Option<(String, bool)>,
}

impl Query {
    pub fn new() -> Self {
        Query::default()
    }

    /// Keeps rows whose `column` equals `value`.
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((column.into(), value.into()));
        self
    }

    pub fn order(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.order = Some((column.into(), ascending));
        self
    }

    /// Newest rows first.
    pub fn newest_first() -> Self {
        Query::new().order("created_at", false)
    }

    /// Whether a row passes every filter.
    pub fn matches(&self, row: &Row) -> bool {
        self.filters
            .iter()
            .all(|(column, value)| row.get(column).unwrap_or(&Value::Null) == value)
    }

    /// Rejects column names that are not plain identifiers.
    pub(crate) fn validate_columns(&self) -> DbResult<()> {
        let columns = self
            .filters
            .iter()
            .map(|(c, _)| c.as_str())
            .chain(self.order.as_ref().map(|(c, _)| c.as_str()));
        for column in columns {
            if !is_identifier(column) {
                return Err(DbError::QueryFailed(format!("invalid column name: {column:?}")));
            }
        }
        Ok(())
    }
}

fn is_identifier(column: &str) -> bool {
    !column.is_empty() && column.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Orders two JSON values the way SQLite orders `json_extract` results:
/// nulls first, then numbers, then text.
pub(crate) fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) | Value::Number(_) => 1,
            Value::String(_) => 2,
            Value::Array(_) | Value::Object(_) => 3,
        }
    }

    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or_default();
            let y = y.as_f64().unwrap_or_default();
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

// =============================================================================
// DataService
// =============================================================================

/// The external CRUD collaborator.
///
/// Implementations serialize conflicting writes on their own; callers await
/// each call in turn and never retry automatically.
#[async_trait]
pub trait DataService: Send + Sync {
    /// Rows of `table` matching `query`.
    async fn select(&self, table: Table, query: &Query) -> DbResult<Vec<Row>>;

    /// Writes a new row and returns it as stored.
    async fn insert(&self, table: Table, row: Row) -> DbResult<Row>;

    /// Writes several rows at once. Either all are stored or none.
    async fn insert_many(&self, table: Table, rows: Vec<Row>) -> DbResult<Vec<Row>>;

    /// Merges `patch` into the row and returns the result.
    ///
    /// Fails with `NotFound` when the id does not exist.
    async fn update(&self, table: Table, id: &str, patch: Row) -> DbResult<Row>;

    /// Fails with `NotFound` when the id does not exist.
    async fn delete(&self, table: Table, id: &str) -> DbResult<()>;
}

// =============================================================================
// Row helpers
// =============================================================================

/// Current time in the format the service stamps rows with.
pub(crate) fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Assigns `id`, `created_at` and `updated_at` to a row about to be stored.
pub(crate) fn stamp_new(mut row: Row) -> Row {
    let now = timestamp_now();
    row.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
    row.insert("created_at".to_string(), Value::String(now.clone()));
    row.insert("updated_at".to_string(), Value::String(now));
    row
}

/// Shallow-merges `patch` into `row`. `id` and `created_at` never change.
pub(crate) fn merge_patch(row: &mut Row, patch: Row) {
    for (key, value) in patch {
        if key == "id" || key == "created_at" {
            continue;
        }
        row.insert(key, value);
    }
    row.insert("updated_at".to_string(), Value::String(timestamp_now()));
}

/// Serializes a value that must become a JSON object.
pub fn to_row<T: Serialize>(value: &T) -> DbResult<Row> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(DbError::Internal(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

pub fn from_row<T: DeserializeOwned>(row: Row) -> DbResult<T> {
    Ok(serde_json::from_value(Value::Object(row))?)
}

pub fn from_rows<T: DeserializeOwned>(rows: Vec<Row>) -> DbResult<Vec<T>> {
    rows.into_iter().map(from_row).collect()
}

/// The `id` column of a stored row.
pub fn row_id(row: &Row) -> DbResult<String> {
    row.get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| DbError::Internal("row without an id".to_string()))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_matches() {
        let row = to_row(&json!({ "category": "Non", "quantity": 3 })).unwrap();
        assert!(Query::new().eq("category", "Non").matches(&row));
        assert!(Query::new().eq("quantity", 3).matches(&row));
        assert!(!Query::new().eq("category", "Sut").matches(&row));
        assert!(Query::new().eq("missing", Value::Null).matches(&row));
    }

    #[test]
    fn test_column_names_are_checked() {
        assert!(Query::new().eq("created_at", 1).validate_columns().is_ok());
        assert!(Query::new().eq("a'); DROP", 1).validate_columns().is_err());
        assert!(Query::new().order("", true).validate_columns().is_err());
    }

    #[test]
    fn test_stamp_and_merge() {
        let row = stamp_new(Row::new());
        let id = row_id(&row).unwrap();
        let created = row["created_at"].clone();

        let mut merged = row.clone();
        let patch = to_row(&json!({ "id": "other", "created_at": "x", "name": "Non" })).unwrap();
        merge_patch(&mut merged, patch);

        assert_eq!(row_id(&merged).unwrap(), id);
        assert_eq!(merged["created_at"], created);
        assert_eq!(merged["name"], "Non");
    }

    #[test]
    fn test_compare_values() {
        assert_eq!(compare_values(&json!(2), &json!(10)), Ordering::Less);
        assert_eq!(compare_values(&json!("b"), &json!("a")), Ordering::Greater);
        assert_eq!(compare_values(&Value::Null, &json!("a")), Ordering::Less);
    }

    #[test]
    fn test_to_row_rejects_non_objects() {
        assert!(to_row(&5).is_err());
    }
}
