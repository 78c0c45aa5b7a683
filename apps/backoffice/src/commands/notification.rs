//! # Notification Commands
//!
//! The header bell: list, mark read, dismiss, raise by hand, and evaluate
//! the rules without waiting for the watcher.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use dokon_core::{NewNotification, Notification};

use crate::error::ApiError;
use crate::state::AppState;
use crate::watcher;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationsResponse {
    /// Newest first.
    pub items: Vec<Notification>,
    pub unread_count: usize,
}

pub fn list_notifications(state: &AppState) -> NotificationsResponse {
    state.notifications.with_center(|center| NotificationsResponse {
        items: center.notifications().to_vec(),
        unread_count: center.unread_count(),
    })
}

pub fn mark_as_read(state: &AppState, id: &str) -> Result<NotificationsResponse, ApiError> {
    if !state.notifications.with_center_mut(|center| center.mark_as_read(id)) {
        return Err(ApiError::not_found("notification", id));
    }
    Ok(list_notifications(state))
}

pub fn mark_all_as_read(state: &AppState) -> NotificationsResponse {
    state.notifications.with_center_mut(|center| center.mark_all_as_read());
    list_notifications(state)
}

pub fn remove_notification(state: &AppState, id: &str) -> Result<NotificationsResponse, ApiError> {
    if !state.notifications.with_center_mut(|center| center.remove(id)) {
        return Err(ApiError::not_found("notification", id));
    }
    Ok(list_notifications(state))
}

/// Raises a notification by hand, e.g. after an export finished.
pub fn add_notification(state: &AppState, new: NewNotification) -> Result<Notification, ApiError> {
    if new.title.trim().is_empty() {
        return Err(ApiError::validation("title is required"));
    }
    Ok(state
        .notifications
        .with_center_mut(|center| center.add(new, Utc::now())))
}

/// Runs the rules now and returns what they raised.
pub async fn evaluate_notifications(state: &AppState) -> Vec<Notification> {
    watcher::evaluate(state).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::product::add_product;
    use crate::error::ErrorCode;
    use crate::state::fixtures::{new_product, state};
    use dokon_core::NotificationKind;

    #[tokio::test]
    async fn test_low_stock_alert_is_not_duplicated() {
        let (state, _) = state().await;
        add_product(&state, &new_product("Fanta 1L", 1_000, 1, 5)).await.unwrap();

        assert_eq!(evaluate_notifications(&state).await.len(), 1);
        assert!(evaluate_notifications(&state).await.is_empty());

        let list = list_notifications(&state);
        assert_eq!(list.items.len(), 1);
        assert_eq!(list.items[0].kind, NotificationKind::Warning);
        assert_eq!(list.unread_count, 1);
    }

    #[tokio::test]
    async fn test_read_and_remove() {
        let (state, _) = state().await;
        let first = add_notification(
            &state,
            NewNotification {
                kind: NotificationKind::Info,
                title: "Export ready".to_string(),
                message: "dokon-sales.xlsx".to_string(),
                action: None,
            },
        )
        .unwrap();
        add_notification(
            &state,
            NewNotification {
                kind: NotificationKind::Success,
                title: "Backup done".to_string(),
                message: String::new(),
                action: None,
            },
        )
        .unwrap();

        assert_eq!(mark_as_read(&state, &first.id).unwrap().unread_count, 1);
        assert_eq!(mark_all_as_read(&state).unread_count, 0);

        let list = remove_notification(&state, &first.id).unwrap();
        assert_eq!(list.items.len(), 1);
        assert_eq!(
            remove_notification(&state, &first.id).unwrap_err().code,
            ErrorCode::NotFound
        );
    }
}
