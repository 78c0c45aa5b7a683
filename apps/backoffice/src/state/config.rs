//! # Configuration
//!
//! Application configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`DOKON_*`)
//! 2. Config file (`config.toml` in the platform config dir, or `DOKON_CONFIG`)
//! 3. Defaults (this file)
//!
//! ## Example `config.toml`
//! ```toml
//! [store]
//! name = "Chorsu Dokon"
//! currency_code = "UZS"
//! currency_symbol = "UZS "
//! utc_offset_minutes = 300
//!
//! [notifications]
//! interval_secs = 30
//!
//! [operator]
//! id = "op-1"
//! name = "Dilnoza"
//! role = "cashier"
//! ```
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, Offset, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use dokon_core::{Money, Operator, Role, DEFAULT_NOTIFICATION_CAPACITY};

/// Largest accepted watcher interval.
pub const MAX_INTERVAL_SECS: u64 = 3_600;

/// Largest accepted calendar offset from UTC: ±14h.
pub const MAX_OFFSET_MINUTES: i32 = 14 * 60;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Could not determine the platform data directory")]
    NoDataDir,
}

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreSection,
    pub database: DatabaseSection,
    pub notifications: NotificationSection,
    pub operator: OperatorSection,
}

/// Shop identity, currency and calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    /// Store name (dashboard header, exported reports)
    pub name: String,

    /// Currency code (ISO 4217)
    pub currency_code: String,

    /// Currency symbol (for display, printed before the amount)
    pub currency_symbol: String,

    /// Number of decimal places for currency
    pub currency_decimals: u8,

    /// The shop's offset from UTC. "Today" and "this month" follow it.
    pub utc_offset_minutes: i32,
}

impl Default for StoreSection {
    fn default() -> Self {
        StoreSection {
            name: "Dokon".to_string(),
            currency_code: "UZS".to_string(),
            currency_symbol: "UZS ".to_string(),
            currency_decimals: 2,
            utc_offset_minutes: 5 * 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    /// SQLite file. Defaults to `dokon.db` in the platform data dir.
    pub path: Option<PathBuf>,
    pub max_connections: u32,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        DatabaseSection {
            path: None,
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSection {
    /// Seconds between watcher evaluations.
    pub interval_secs: u64,
    /// Most recent notifications kept.
    pub capacity: usize,
}

impl Default for NotificationSection {
    fn default() -> Self {
        NotificationSection {
            interval_secs: 60,
            capacity: DEFAULT_NOTIFICATION_CAPACITY,
        }
    }
}

/// The operator this session acts as; identity is resolved elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperatorSection {
    pub id: String,
    pub name: String,
    pub role: Role,
}

impl Default for OperatorSection {
    fn default() -> Self {
        OperatorSection {
            id: "operator".to_string(),
            name: "Operator".to_string(),
            role: Role::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from the default file location and environment.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("DOKON_CONFIG")
            .ok()
            .map(PathBuf::from)
            .or_else(default_config_path);
        Self::load_from(path.as_deref(), |key| std::env::var(key).ok())
    }

    /// Loads from `path` (when it exists), then applies variables from `env`.
    pub fn load_from(
        path: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) if path.exists() => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                info!(path = %path.display(), "Loaded config file");
                Self::from_toml_str(&text)?
            }
            _ => {
                debug!("No config file, using defaults");
                AppConfig::default()
            }
        };

        config.apply_env(env)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Overrides fields from `DOKON_*` variables.
    ///
    /// ## Environment Variables
    /// - `DOKON_STORE_NAME`, `DOKON_CURRENCY_CODE`, `DOKON_CURRENCY_SYMBOL`
    /// - `DOKON_UTC_OFFSET_MINUTES`
    /// - `DOKON_DB_PATH`, `DOKON_DB_MAX_CONNECTIONS`
    /// - `DOKON_NOTIFY_INTERVAL_SECS`, `DOKON_NOTIFY_CAPACITY`
    /// - `DOKON_OPERATOR_ID`, `DOKON_OPERATOR_NAME`, `DOKON_OPERATOR_ROLE`
    pub fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(v) = env("DOKON_STORE_NAME") {
            self.store.name = v;
        }
        if let Some(v) = env("DOKON_CURRENCY_CODE") {
            self.store.currency_code = v;
        }
        if let Some(v) = env("DOKON_CURRENCY_SYMBOL") {
            self.store.currency_symbol = v;
        }
        if let Some(v) = env("DOKON_UTC_OFFSET_MINUTES") {
            self.store.utc_offset_minutes = parse_var("DOKON_UTC_OFFSET_MINUTES", &v)?;
        }
        if let Some(v) = env("DOKON_DB_PATH") {
            self.database.path = Some(PathBuf::from(v));
        }
        if let Some(v) = env("DOKON_DB_MAX_CONNECTIONS") {
            self.database.max_connections = parse_var("DOKON_DB_MAX_CONNECTIONS", &v)?;
        }
        if let Some(v) = env("DOKON_NOTIFY_INTERVAL_SECS") {
            self.notifications.interval_secs = parse_var("DOKON_NOTIFY_INTERVAL_SECS", &v)?;
        }
        if let Some(v) = env("DOKON_NOTIFY_CAPACITY") {
            self.notifications.capacity = parse_var("DOKON_NOTIFY_CAPACITY", &v)?;
        }
        if let Some(v) = env("DOKON_OPERATOR_ID") {
            self.operator.id = v;
        }
        if let Some(v) = env("DOKON_OPERATOR_NAME") {
            self.operator.name = v;
        }
        if let Some(v) = env("DOKON_OPERATOR_ROLE") {
            self.operator.role = parse_role(&v)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.operator.id.trim().is_empty() {
            return Err(ConfigError::Invalid("operator.id must not be empty".to_string()));
        }
        if !(1..=MAX_INTERVAL_SECS).contains(&self.notifications.interval_secs) {
            return Err(ConfigError::Invalid(format!(
                "notifications.interval_secs must be between 1 and {MAX_INTERVAL_SECS}"
            )));
        }
        if self.notifications.capacity == 0 {
            return Err(ConfigError::Invalid(
                "notifications.capacity must be positive".to_string(),
            ));
        }
        if self.store.utc_offset_minutes.abs() > MAX_OFFSET_MINUTES {
            return Err(ConfigError::Invalid(format!(
                "store.utc_offset_minutes must be within ±{MAX_OFFSET_MINUTES}"
            )));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// The shop's calendar offset.
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.store.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }

    /// "Now" in the shop's calendar.
    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset())
    }

    pub fn operator(&self) -> Operator {
        Operator {
            id: self.operator.id.clone(),
            name: self.operator.name.clone(),
            role: self.operator.role,
        }
    }

    /// The configured database file, or `dokon.db` in the platform data dir.
    ///
    /// ## Platform-Specific Paths
    /// - **macOS**: `~/Library/Application Support/uz.dokon.backoffice/dokon.db`
    /// - **Windows**: `%APPDATA%\dokon\backoffice\data\dokon.db`
    /// - **Linux**: `~/.local/share/backoffice/dokon.db`
    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.database.path {
            return Ok(path.clone());
        }

        let dirs = project_dirs().ok_or(ConfigError::NoDataDir)?;
        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir).map_err(|source| ConfigError::Io {
            path: data_dir.to_path_buf(),
            source,
        })?;
        Ok(data_dir.join("dokon.db"))
    }

    /// Formats a minor-unit amount as a currency string.
    ///
    /// ## Example
    /// ```rust
    /// use dokon_backoffice::state::AppConfig;
    ///
    /// let config = AppConfig::default();
    /// assert_eq!(config.format_currency(1234), "UZS 12.34");
    /// ```
    pub fn format_currency(&self, cents: i64) -> String {
        let decimals = u32::from(self.store.currency_decimals);
        let divisor = 10_i64.pow(decimals);
        let whole = cents / divisor;
        let frac = (cents % divisor).abs();

        format!(
            "{}{}{}",
            if cents < 0 { "-" } else { "" },
            self.store.currency_symbol,
            if decimals > 0 {
                format!("{}.{:0width$}", whole.abs(), frac, width = decimals as usize)
            } else {
                whole.abs().to_string()
            }
        )
    }

    pub fn format_money(&self, amount: Money) -> String {
        self.format_currency(amount.cents())
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("uz", "dokon", "backoffice")
}

fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("{key}: cannot parse {value:?}")))
}

fn parse_role(value: &str) -> Result<Role, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "admin" => Ok(Role::Admin),
        "cashier" => Ok(Role::Cashier),
        "storekeeper" => Ok(Role::Storekeeper),
        "accountant" => Ok(Role::Accountant),
        other => Err(ConfigError::Invalid(format!("unknown operator role {other:?}"))),
    }
}
