//! # Report Commands
//!
//! Read-only figures for the dashboard and reports screens. Everything is
//! recomputed from the store's current collections on each call.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::debug;

use dokon_core::report::{DashboardStats, SalesReport, Sheet};
use dokon_core::Period;

use crate::error::ApiError;
use crate::state::AppState;

/// What the spreadsheet export collaborator receives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesExport {
    pub store_name: String,
    pub currency_code: String,
    pub generated_at: DateTime<FixedOffset>,
    /// Suggested file name, e.g. `dokon-sales-2026-03-10.xlsx`.
    pub file_name: String,
    pub sheets: Vec<Sheet>,
}

/// Revenue, profit, rankings and the comparison with the previous period.
pub async fn sales_report(state: &AppState, period: Period) -> Result<SalesReport, ApiError> {
    period.validate()?;
    debug!(period = %period.label(), "sales_report command");

    let store = state.store.read().await;
    Ok(SalesReport::build(period, state.now(), store.sales(), store.products()))
}

pub async fn dashboard_stats(state: &AppState) -> DashboardStats {
    let store = state.store.read().await;
    DashboardStats::compute(store.products(), store.customers(), store.sales(), state.now())
}

/// Builds the report for `period` and flattens it into sheets.
pub async fn export_sales_report(
    state: &AppState,
    period: Period,
) -> Result<SalesExport, ApiError> {
    let report = sales_report(state, period).await?;
    let now = state.now();

    Ok(SalesExport {
        store_name: state.config.store.name.clone(),
        currency_code: state.config.store.currency_code.clone(),
        generated_at: now,
        file_name: format!("dokon-sales-{}.xlsx", now.format("%Y-%m-%d")),
        sheets: report.to_sheets(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::cart::add_to_cart;
    use crate::commands::product::add_product;
    use crate::commands::sale::{checkout, CheckoutRequest};
    use crate::error::ErrorCode;
    use crate::state::fixtures::{new_product, state};
    use chrono::NaiveDate;
    use dokon_core::{Money, PaymentMethod};

    async fn sell(state: &AppState, product_id: &str, quantity: i64, method: PaymentMethod) {
        add_to_cart(state, product_id, Some(quantity)).await.unwrap();
        checkout(
            state,
            &CheckoutRequest {
                customer_id: None,
                payment_method: method,
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_report_over_todays_sales() {
        let (state, _) = state().await;
        let a = add_product(&state, &new_product("Cola", 5_000, 50, 2)).await.unwrap();
        let b = add_product(&state, &new_product("Fanta", 10_000, 50, 2)).await.unwrap();

        sell(&state, &a.id, 2, PaymentMethod::Cash).await;
        sell(&state, &b.id, 2, PaymentMethod::Card).await;
        sell(&state, &a.id, 1, PaymentMethod::Cash).await;

        let report = sales_report(&state, Period::Today).await.unwrap();
        assert_eq!(report.summary.transactions, 3);
        assert_eq!(report.summary.revenue, Money::from_cents(35_000));
        assert_eq!(report.top_products[0].name, "Cola");

        let cash = report
            .payment_breakdown
            .iter()
            .find(|p| p.method == PaymentMethod::Cash)
            .unwrap();
        assert_eq!(cash.total, Money::from_cents(15_000));
        assert!((cash.percent - 42.857).abs() < 0.01);

        let dashboard = dashboard_stats(&state).await;
        assert_eq!(dashboard.today.transactions, 3);
        assert_eq!(dashboard.product_count, 2);
    }

    #[tokio::test]
    async fn test_export_has_four_sheets() {
        let (state, _) = state().await;
        let export = export_sales_report(&state, Period::Month).await.unwrap();
        assert_eq!(export.store_name, "Dokon");
        let names: Vec<&str> = export.sheets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Summary", "Top products", "Payment methods", "Recent sales"]);
    }

    #[tokio::test]
    async fn test_reversed_custom_range_is_rejected() {
        let (state, _) = state().await;
        let period = Period::Custom {
            start: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            end: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        };
        let err = sales_report(&state, period).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
