//! # Config Commands

use serde::{Deserialize, Serialize};
use tracing::debug;

use dokon_core::Operator;

use crate::state::AppState;

/// The parts of the configuration a presentation layer needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    pub store_name: String,
    pub currency_code: String,
    pub currency_symbol: String,
    pub currency_decimals: u8,
    pub utc_offset_minutes: i32,
    pub notification_interval_secs: u64,
    pub operator: Operator,
}

/// Gets the current application configuration.
///
/// ## When Used
/// - App startup (header, currency formatting)
/// - Export file names and titles
pub fn get_config(state: &AppState) -> ConfigResponse {
    debug!("get_config command");
    let config = &state.config;
    ConfigResponse {
        store_name: config.store.name.clone(),
        currency_code: config.store.currency_code.clone(),
        currency_symbol: config.store.currency_symbol.clone(),
        currency_decimals: config.store.currency_decimals,
        utc_offset_minutes: config.store.utc_offset_minutes,
        notification_interval_secs: config.notifications.interval_secs,
        operator: config.operator(),
    }
}

/// Formats a minor-unit amount with the configured currency.
pub fn format_currency(state: &AppState, cents: i64) -> String {
    state.config.format_currency(cents)
}
