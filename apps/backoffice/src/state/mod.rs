//! # State Module
//!
//! Everything a command needs, composed into one [`AppState`] that is built
//! at startup and passed to each command explicitly. There are no globals.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                         AppState                                │   │
//! │  │  AppState::new(config, service)   (tests, demos)                │   │
//! │  │  AppState::open(config)           (SQLite file from config)     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                              │                                          │
//! │        ┌──────────────────┬──┴───────────────┬──────────────────┐      │
//! │        ▼                  ▼                  ▼                  ▼       │
//! │  ┌────────────┐  ┌──────────────┐  ┌──────────────────┐  ┌──────────┐  │
//! │  │ StoreState │  │  CartState   │  │NotificationState │  │AppConfig │  │
//! │  │            │  │              │  │                  │  │          │  │
//! │  │ Arc<Rw     │  │ Arc<Mutex<   │  │ Arc<Mutex<       │  │ Arc<..>  │  │
//! │  │ Lock<Entity│  │   Cart       │  │  Notification    │  │ read-only│  │
//! │  │ Store>>    │  │ >>           │  │  Center>>        │  │          │  │
//! │  └────────────┘  └──────────────┘  └──────────────────┘  └──────────┘  │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • StoreState: tokio RwLock, held across data service awaits           │
//! │  • CartState / NotificationState: std Mutex, never held across .await  │
//! │  • AppConfig: read-only after initialization                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod config;
mod notifications;
mod store;

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use tracing::info;

use dokon_core::{NotificationCenter, Operator};
use dokon_db::{DataService, Database, DbConfig, EntityStore};

use crate::error::ApiError;

pub use cart::CartState;
pub use config::{
    AppConfig, ConfigError, DatabaseSection, NotificationSection, OperatorSection, StoreSection,
};
pub use notifications::NotificationState;
pub use store::StoreState;

/// The composed application state. Cloning is cheap and every clone shares
/// the same store, cart and notifications.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: StoreState,
    pub cart: CartState,
    pub notifications: NotificationState,
}

impl AppState {
    /// Builds state over any data service. The store starts empty; call
    /// [`AppState::load`] before serving commands.
    pub fn new(config: AppConfig, service: Arc<dyn DataService>) -> Self {
        let center = NotificationCenter::new(config.notifications.capacity, Utc::now());
        AppState {
            store: StoreState::new(EntityStore::new(service)),
            cart: CartState::new(),
            notifications: NotificationState::new(center),
            config: Arc::new(config),
        }
    }

    /// Opens the SQLite database named by the config and builds state over
    /// it. The database handle is returned so the caller can close it.
    pub async fn open(config: AppConfig) -> Result<(Self, Database), ApiError> {
        let path = config.database_path()?;
        info!(path = %path.display(), "Opening database");

        let db = Database::new(
            DbConfig::new(path).max_connections(config.database.max_connections),
        )
        .await?;

        let state = AppState::new(config, Arc::new(db.clone()));
        Ok((state, db))
    }

    /// Fetches every collection into the store.
    pub async fn load(&self) -> Result<(), ApiError> {
        self.store.write().await.load().await?;
        Ok(())
    }

    /// "Now" in the shop's calendar.
    pub fn now(&self) -> DateTime<FixedOffset> {
        self.config.now()
    }

    /// The operator commands act as.
    pub fn operator(&self) -> Operator {
        self.config.operator()
    }
}
