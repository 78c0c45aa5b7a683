//! # Store State
//!
//! The entity store behind a tokio `RwLock`. Reads (lists, reports, the
//! watcher's snapshot) share the lock; mutations take it exclusively for
//! the whole write-then-cache sequence, so two mutations never interleave.

use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use dokon_db::EntityStore;

#[derive(Debug, Clone)]
pub struct StoreState {
    store: Arc<RwLock<EntityStore>>,
}

impl StoreState {
    pub fn new(store: EntityStore) -> Self {
        StoreState {
            store: Arc::new(RwLock::new(store)),
        }
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, EntityStore> {
        self.store.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, EntityStore> {
        self.store.write().await
    }
}
