//! # Dokon Back-Office Library
//!
//! Application state, the commands a presentation layer calls, and the
//! notification watcher.
//!
//! ## Module Organization
//! ```text
//! dokon_backoffice/
//! ├── lib.rs            ◄─── You are here (module exports, logging setup)
//! ├── state/
//! │   ├── mod.rs        ◄─── AppState: explicit composition, no globals
//! │   ├── config.rs     ◄─── AppConfig: defaults → TOML → DOKON_* env
//! │   ├── store.rs      ◄─── EntityStore behind a RwLock
//! │   ├── cart.rs       ◄─── Session cart
//! │   └── notifications.rs ◄─ Notification center
//! ├── commands/         ◄─── One file per screen
//! ├── watcher.rs        ◄─── Timer-driven notification rules
//! └── error.rs          ◄─── API error type for commands
//! ```
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  AppConfig::load()                                                      │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  AppState::open(config) ──► SQLite + migrations                         │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  state.load() ──► every collection cached                               │
//! │        │                                                                │
//! │        ├──► Watcher::new(state.clone(), sink).start()                   │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  commands::*(&state, ...) until shutdown                                │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  watcher.shutdown(), db.close()                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod error;
pub mod state;
pub mod watcher;

use tracing_subscriber::EnvFilter;

pub use error::{ApiError, ErrorCode};
pub use state::{AppConfig, AppState};
pub use watcher::{LogSink, NotificationSink, Watcher, WatcherHandle};

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=dokon=trace` - Show trace for dokon crates only
/// - Default: `info,dokon=debug,sqlx=warn`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,dokon=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
