//! # Notification State
//!
//! The notification center shared by the watcher and the notification
//! commands. Same locking rules as the cart.

use std::sync::{Arc, Mutex, PoisonError};

use dokon_core::NotificationCenter;

#[derive(Debug, Clone)]
pub struct NotificationState {
    center: Arc<Mutex<NotificationCenter>>,
}

impl NotificationState {
    pub fn new(center: NotificationCenter) -> Self {
        NotificationState {
            center: Arc::new(Mutex::new(center)),
        }
    }

    pub fn with_center<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&NotificationCenter) -> R,
    {
        let center = self.center.lock().unwrap_or_else(PoisonError::into_inner);
        f(&center)
    }

    pub fn with_center_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut NotificationCenter) -> R,
    {
        let mut center = self.center.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut center)
    }
}
