//! # SQLite Data Service
//!
//! Connection pool configuration and the SQLite implementation of
//! [`DataService`].
//!
//! ## Storage Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Every table has the same shape:                                        │
//! │                                                                         │
//! │  ┌──────────────┬──────────────────────────────┬────────────┬─────────┐ │
//! │  │ id (PK)      │ body (JSON object, full row) │ created_at │ updated │ │
//! │  └──────────────┴──────────────────────────────┴────────────┴─────────┘ │
//! │                                                                         │
//! │  Filters:  json_extract(body, '$.column') = ?                           │
//! │  Ordering: json_extract(body, '$.column') ASC|DESC, then rowid          │
//! │                                                                         │
//! │  The entity layer decides what a row contains; the schema never has    │
//! │  to change when an entity gains a field.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! SQLite WAL (Write-Ahead Logging) mode is enabled:
//! - Readers don't block writers
//! - Writers don't block readers
//! - Better crash recovery

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::service::{merge_patch, row_id, stamp_new, DataService, Query, Row, Table};

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/dokon.db")
///     .max_connections(5)
///     .min_connections(1);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5 (one shop, a handful of screens)
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// Connection timeout duration.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    /// Creates a new database configuration with the given path.
    /// The file is created if it doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1, // In-memory requires single connection
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }

    fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == ":memory:"
    }
}

// =============================================================================
// Database
// =============================================================================

/// SQLite-backed [`DataService`].
#[derive(Debug, Clone)]
pub struct Database {
    /// The SQLite connection pool.
    pool: SqlitePool,
}

impl Database {
    /// Creates a new database connection pool.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist
    /// 2. Configures SQLite: WAL, NORMAL synchronous
    /// 3. Creates the connection pool
    /// 4. Runs migrations (if enabled)
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        let connect_url = if config.is_in_memory() {
            "sqlite::memory:".to_string()
        } else {
            format!("sqlite://{}?mode=rwc", config.database_path.display())
        };

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        let db = Database { pool };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Runs database migrations. Idempotent.
    pub async fn run_migrations(&self) -> DbResult<()> {
        info!("Running database migrations");
        migrations::run_migrations(&self.pool).await?;
        info!("Migrations complete");
        Ok(())
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Closes the database connection pool.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks if the database can execute queries.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    /// Number of rows in a table.
    pub async fn count(&self, table: Table) -> DbResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", table.as_str());
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
        Ok(count)
    }
}

// =============================================================================
// SQL building
// =============================================================================

/// A value bound into a query.
#[derive(Debug, Clone)]
enum Bind {
    Text(String),
    Int(i64),
    Real(f64),
}

/// `json_extract` returns SQL values, so JSON scalars bind as their SQL
/// counterparts. `true`/`false` come back as 1/0.
fn bind_for(value: &Value) -> Bind {
    match value {
        Value::String(s) => Bind::Text(s.clone()),
        Value::Bool(b) => Bind::Int(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Bind::Int(i),
            None => Bind::Real(n.as_f64().unwrap_or_default()),
        },
        other => Bind::Text(other.to_string()),
    }
}

fn json_path(column: &str) -> String {
    format!("$.{column}")
}

/// Builds `SELECT body ...` for a query, with its bind values in order.
fn select_sql(table: Table, query: &Query) -> (String, Vec<Bind>) {
    let mut sql = format!("SELECT body FROM {}", table.as_str());
    let mut binds = Vec::new();

    let mut conditions = Vec::new();
    for (column, value) in &query.filters {
        binds.push(Bind::Text(json_path(column)));
        if value.is_null() {
            conditions.push("json_extract(body, ?) IS NULL");
        } else {
            conditions.push("json_extract(body, ?) = ?");
            binds.push(bind_for(value));
        }
    }
    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }

    match &query.order {
        Some((column, ascending)) => {
            binds.push(Bind::Text(json_path(column)));
            let direction = if *ascending { "ASC" } else { "DESC" };
            sql.push_str(&format!(
                " ORDER BY json_extract(body, ?) {direction}, rowid ASC"
            ));
        }
        None => sql.push_str(" ORDER BY rowid ASC"),
    }

    (sql, binds)
}

fn parse_body(body: &str) -> DbResult<Row> {
    Ok(serde_json::from_str(body)?)
}

fn text_column(row: &Row, column: &str) -> DbResult<String> {
    row.get(column)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| DbError::Internal(format!("row without {column}")))
}

// =============================================================================
// DataService implementation
// =============================================================================

#[async_trait]
impl DataService for Database {
    async fn select(&self, table: Table, query: &Query) -> DbResult<Vec<Row>> {
        query.validate_columns()?;
        let (sql, binds) = select_sql(table, query);

        let mut q = sqlx::query_scalar::<_, String>(&sql);
        for bind in binds {
            q = match bind {
                Bind::Text(s) => q.bind(s),
                Bind::Int(i) => q.bind(i),
                Bind::Real(f) => q.bind(f),
            };
        }

        let bodies = q.fetch_all(&self.pool).await?;
        debug!(table = %table, rows = bodies.len(), "Selected rows");
        bodies.iter().map(|b| parse_body(b)).collect()
    }

    async fn insert(&self, table: Table, row: Row) -> DbResult<Row> {
        let row = stamp_new(row);
        let sql = format!(
            "INSERT INTO {} (id, body, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
            table.as_str()
        );

        sqlx::query(&sql)
            .bind(row_id(&row)?)
            .bind(serde_json::to_string(&row)?)
            .bind(text_column(&row, "created_at")?)
            .execute(&self.pool)
            .await?;

        debug!(table = %table, id = ?row.get("id"), "Inserted row");
        Ok(row)
    }

    async fn insert_many(&self, table: Table, rows: Vec<Row>) -> DbResult<Vec<Row>> {
        let sql = format!(
            "INSERT INTO {} (id, body, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
            table.as_str()
        );

        let mut tx = self.pool.begin().await?;
        let mut stored = Vec::with_capacity(rows.len());

        for row in rows {
            let row = stamp_new(row);
            sqlx::query(&sql)
                .bind(row_id(&row)?)
                .bind(serde_json::to_string(&row)?)
                .bind(text_column(&row, "created_at")?)
                .execute(&mut *tx)
                .await?;
            stored.push(row);
        }

        tx.commit().await?;
        debug!(table = %table, rows = stored.len(), "Inserted rows");
        Ok(stored)
    }

    async fn update(&self, table: Table, id: &str, patch: Row) -> DbResult<Row> {
        let select = format!("SELECT body FROM {} WHERE id = ?1", table.as_str());
        let update = format!(
            "UPDATE {} SET body = ?1, updated_at = ?2 WHERE id = ?3",
            table.as_str()
        );

        let mut tx = self.pool.begin().await?;

        let body: Option<String> = sqlx::query_scalar(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(body) = body else {
            return Err(DbError::not_found(table.as_str(), id));
        };

        let mut row = parse_body(&body)?;
        merge_patch(&mut row, patch);

        sqlx::query(&update)
            .bind(serde_json::to_string(&row)?)
            .bind(text_column(&row, "updated_at")?)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        debug!(table = %table, id = %id, "Updated row");
        Ok(row)
    }

    async fn delete(&self, table: Table, id: &str) -> DbResult<()> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", table.as_str());
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(table.as_str(), id));
        }

        debug!(table = %table, id = %id, "Deleted row");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
