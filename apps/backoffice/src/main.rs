//! # Dokon Back-Office Entry Point
//!
//! Headless runner: loads configuration and the store, runs the
//! notification watcher with a logging sink, and stops on Ctrl-C.
//!
//! ## Startup Sequence
//! 1. Initialize tracing (logging)
//! 2. Load configuration (defaults → config file → DOKON_* env)
//! 3. Open the database & run migrations
//! 4. Load every collection into the store
//! 5. Start the watcher (first evaluation runs immediately)
//! 6. Wait for Ctrl-C, then shut down

use std::sync::Arc;

use tracing::{error, info};

use dokon_backoffice::{init_tracing, AppConfig, AppState, LogSink, Watcher};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    info!("Starting Dokon back-office");

    let config = AppConfig::load()?;
    info!(
        store = %config.store.name,
        operator = %config.operator.id,
        interval_secs = config.notifications.interval_secs,
        "Configuration loaded"
    );

    let (state, db) = AppState::open(config).await?;
    state.load().await?;
    {
        let store = state.store.read().await;
        info!(
            products = store.products().len(),
            customers = store.customers().len(),
            sales = store.sales().len(),
            "Store loaded"
        );
    }

    let watcher = Watcher::new(state.clone(), Arc::new(LogSink)).start();

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");

    if let Err(e) = watcher.shutdown().await {
        error!("Watcher did not stop cleanly: {}", e);
    }
    db.close().await;

    info!("Dokon back-office stopped");
    Ok(())
}
