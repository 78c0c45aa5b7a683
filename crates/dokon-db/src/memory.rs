//! # In-Memory Data Service
//!
//! A [`DataService`] that keeps every table in a `Vec<Row>` behind a mutex.
//! Used by tests and demos, and to simulate the data service failing.
//!
//! ## Failure Injection
//! ```text
//! service.fail_on(Table::SaleItems, Operation::Insert).await;
//!
//! insert(sales, header)       ──► OK
//! insert_many(sale_items, ..) ──► Err(QueryFailed("injected failure ..."))
//! ```
//! A failed call changes nothing. `insert_many` counts as an insert.

use std::collections::{HashMap, HashSet};
use std::fmt;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::service::{
    compare_values, merge_patch, row_id, stamp_new, DataService, Query, Row, Table,
};

/// The kind of call a failure is injected into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Select,
    Insert,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Select => "select",
            Operation::Insert => "insert",
            Operation::Update => "update",
            Operation::Delete => "delete",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Default)]
struct Inner {
    tables: HashMap<Table, Vec<Row>>,
    failures: HashSet<(Table, Operation)>,
}

impl Inner {
    fn check(&self, table: Table, operation: Operation) -> DbResult<()> {
        if self.failures.contains(&(table, operation)) {
            return Err(DbError::QueryFailed(format!(
                "injected failure on {operation} {table}"
            )));
        }
        Ok(())
    }

    fn rows_mut(&mut self, table: Table) -> &mut Vec<Row> {
        self.tables.entry(table).or_default()
    }
}

/// In-process [`DataService`].
#[derive(Debug, Default)]
pub struct MemoryDataService {
    inner: Mutex<Inner>,
}

impl MemoryDataService {
    pub fn new() -> Self {
        MemoryDataService::default()
    }

    /// Makes every later `operation` on `table` fail until [`Self::recover`].
    pub async fn fail_on(&self, table: Table, operation: Operation) {
        self.inner.lock().await.failures.insert((table, operation));
    }

    /// Clears every injected failure.
    pub async fn recover(&self) {
        self.inner.lock().await.failures.clear();
    }

    /// Number of rows currently in `table`.
    pub async fn count(&self, table: Table) -> usize {
        self.inner
            .lock()
            .await
            .tables
            .get(&table)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl DataService for MemoryDataService {
    async fn select(&self, table: Table, query: &Query) -> DbResult<Vec<Row>> {
        query.validate_columns()?;
        let inner = self.inner.lock().await;
        inner.check(table, Operation::Select)?;

        let mut rows: Vec<Row> = inner
            .tables
            .get(&table)
            .map(|rows| rows.iter().filter(|row| query.matches(row)).cloned().collect())
            .unwrap_or_default();

        if let Some((column, ascending)) = &query.order {
            rows.sort_by(|a, b| {
                let a = a.get(column).unwrap_or(&serde_json::Value::Null);
                let b = b.get(column).unwrap_or(&serde_json::Value::Null);
                let ordering = compare_values(a, b);
                if *ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }

        Ok(rows)
    }

    async fn insert(&self, table: Table, row: Row) -> DbResult<Row> {
        let mut inner = self.inner.lock().await;
        inner.check(table, Operation::Insert)?;

        let row = stamp_new(row);
        inner.rows_mut(table).push(row.clone());
        debug!(table = %table, id = ?row.get("id"), "Inserted row");
        Ok(row)
    }

    async fn insert_many(&self, table: Table, rows: Vec<Row>) -> DbResult<Vec<Row>> {
        let mut inner = self.inner.lock().await;
        inner.check(table, Operation::Insert)?;

        let stored: Vec<Row> = rows.into_iter().map(stamp_new).collect();
        inner.rows_mut(table).extend(stored.iter().cloned());
        debug!(table = %table, rows = stored.len(), "Inserted rows");
        Ok(stored)
    }

    async fn update(&self, table: Table, id: &str, patch: Row) -> DbResult<Row> {
        let mut inner = self.inner.lock().await;
        inner.check(table, Operation::Update)?;

        let row = inner
            .rows_mut(table)
            .iter_mut()
            .find(|row| row_id(row).is_ok_and(|row_id| row_id == id))
            .ok_or_else(|| DbError::not_found(table.as_str(), id))?;

        merge_patch(row, patch);
        Ok(row.clone())
    }

    async fn delete(&self, table: Table, id: &str) -> DbResult<()> {
        let mut inner = self.inner.lock().await;
        inner.check(table, Operation::Delete)?;

        let rows = inner.rows_mut(table);
        let before = rows.len();
        rows.retain(|row| !row_id(row).is_ok_and(|row_id| row_id == id));

        if rows.len() == before {
            return Err(DbError::not_found(table.as_str(), id));
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::to_row;
    use serde_json::json;

    fn row(value: serde_json::Value) -> Row {
        to_row(&value).unwrap()
    }

    #[tokio::test]
    async fn test_crud_cycle() {
        let service = MemoryDataService::new();
        let stored = service
            .insert(Table::Customers, row(json!({ "name": "Aziz" })))
            .await
            .unwrap();
        let id = row_id(&stored).unwrap();

        let updated = service
            .update(Table::Customers, &id, row(json!({ "phone": "+998901234567" })))
            .await
            .unwrap();
        assert_eq!(updated["name"], "Aziz");
        assert_eq!(updated["phone"], "+998901234567");

        service.delete(Table::Customers, &id).await.unwrap();
        assert_eq!(service.count(Table::Customers).await, 0);
        assert!(matches!(
            service.delete(Table::Customers, &id).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_select_orders_descending() {
        let service = MemoryDataService::new();
        for total in [300, 100, 200] {
            service
                .insert(Table::Sales, row(json!({ "total": total })))
                .await
                .unwrap();
        }

        let rows = service
            .select(Table::Sales, &Query::new().order("total", false))
            .await
            .unwrap();
        let totals: Vec<i64> = rows.iter().map(|r| r["total"].as_i64().unwrap()).collect();
        assert_eq!(totals, vec![300, 200, 100]);
    }

    #[tokio::test]
    async fn test_injected_failure_changes_nothing() {
        let service = MemoryDataService::new();
        service.fail_on(Table::SaleItems, Operation::Insert).await;

        let result = service
            .insert_many(Table::SaleItems, vec![row(json!({ "sale_id": "s1" }))])
            .await;
        assert!(matches!(result, Err(DbError::QueryFailed(_))));
        assert_eq!(service.count(Table::SaleItems).await, 0);

        // Other tables and operations are unaffected.
        service
            .insert(Table::Sales, row(json!({ "total": 1 })))
            .await
            .unwrap();

        service.recover().await;
        service
            .insert_many(Table::SaleItems, vec![row(json!({ "sale_id": "s1" }))])
            .await
            .unwrap();
        assert_eq!(service.count(Table::SaleItems).await, 1);
    }
}
