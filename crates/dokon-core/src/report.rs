//! # Derived Values
//!
//! Pure functions over entity snapshots: low stock, period filtering,
//! revenue, profit, rankings and the dashboard figures. Nothing is cached;
//! every call recomputes from the slices it is given.
//!
//! ## Report Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Period + now ──► Window ──► filter_sales(sales) ──► &[&Sale]          │
//! │                                                      │                  │
//! │              ┌────────────────┬──────────────────────┼─────────────┐    │
//! │              ▼                ▼                      ▼             ▼    │
//! │        SalesSummary     ProfitSummary          top_products   payment  │
//! │        revenue, count   (needs products)       (needs products) shares │
//! │              │                │                      │             │    │
//! │              └────────────────┴──────────┬───────────┴─────────────┘    │
//! │                                          ▼                              │
//! │                                     SalesReport ──► to_sheets()         │
//! │                                                     (spreadsheet rows)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Weak References
//! Sale lines may point at products that were deleted since. Such lines
//! are left out of profit and rankings and counted instead, never treated
//! as an error.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::period::{Period, Window};
use crate::types::{Customer, PaymentMethod, Product, Sale};
use crate::TOP_PRODUCTS_LIMIT;

/// How many sales the "recent sales" part of a report lists.
pub const RECENT_SALES_LIMIT: usize = 20;

fn index_products(products: &[Product]) -> HashMap<&str, &Product> {
    products.iter().map(|p| (p.id.as_str(), p)).collect()
}

// =============================================================================
// Stock
// =============================================================================

/// Products at or below their reorder threshold, in input order.
pub fn low_stock(products: &[Product]) -> Vec<&Product> {
    products.iter().filter(|p| p.is_low_stock()).collect()
}

/// Products matching a search term. See [`Product::matches`].
pub fn search_products<'a>(products: &'a [Product], term: &str) -> Vec<&'a Product> {
    products.iter().filter(|p| p.matches(term)).collect()
}

/// Customers matching a search term. See [`Customer::matches`].
pub fn search_customers<'a>(customers: &'a [Customer], term: &str) -> Vec<&'a Customer> {
    customers.iter().filter(|c| c.matches(term)).collect()
}

/// Figures for the warehouse screen header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventoryStats {
    pub product_count: usize,
    pub total_units: i64,
    pub low_stock_count: usize,
    /// Σ selling_price × quantity.
    pub retail_value: Money,
    /// Σ cost_price × quantity.
    pub cost_value: Money,
}

impl InventoryStats {
    pub fn compute(products: &[Product]) -> Self {
        InventoryStats {
            product_count: products.len(),
            total_units: products.iter().map(|p| p.quantity).sum(),
            low_stock_count: products.iter().filter(|p| p.is_low_stock()).count(),
            retail_value: products
                .iter()
                .map(|p| p.selling_price.multiply_quantity(p.quantity))
                .sum(),
            cost_value: products
                .iter()
                .map(|p| p.cost_price.multiply_quantity(p.quantity))
                .sum(),
        }
    }
}

// =============================================================================
// Sales aggregates
// =============================================================================

/// Sales whose `created_at` falls inside the window, in input order.
pub fn filter_sales<'a>(sales: &'a [Sale], window: &Window) -> Vec<&'a Sale> {
    sales
        .iter()
        .filter(|s| window.contains(s.created_at))
        .collect()
}

/// Revenue and transaction count over a set of sales.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesSummary {
    pub revenue: Money,
    pub transactions: usize,
    /// `revenue / transactions`, zero when there are none.
    pub average: Money,
}

impl SalesSummary {
    pub fn compute(sales: &[&Sale]) -> Self {
        let revenue: Money = sales.iter().map(|s| s.total).sum();
        SalesSummary {
            revenue,
            transactions: sales.len(),
            average: revenue.average_over(sales.len()),
        }
    }
}

/// Profit over a set of sales.
///
/// Revenue comes from the sale line snapshots (net of their discount).
/// Cost comes from the product's current `cost_price`, the only cost known.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProfitSummary {
    pub revenue: Money,
    pub cost: Money,
    pub profit: Money,
    /// `profit / revenue × 100`, zero when revenue is zero.
    pub margin_percent: f64,
    /// Lines skipped because their product no longer exists.
    pub unresolved_lines: usize,
}

impl ProfitSummary {
    pub fn compute(sales: &[&Sale], products: &[Product]) -> Self {
        let index = index_products(products);
        let mut revenue = Money::zero();
        let mut cost = Money::zero();
        let mut unresolved_lines = 0;

        for item in sales.iter().flat_map(|s| s.items.iter()) {
            match index.get(item.product_id.as_str()) {
                Some(product) => {
                    revenue += item.net();
                    cost += product.cost_price.multiply_quantity(item.quantity);
                }
                None => unresolved_lines += 1,
            }
        }

        let profit = revenue - cost;
        ProfitSummary {
            revenue,
            cost,
            profit,
            margin_percent: profit.percent_of(revenue),
            unresolved_lines,
        }
    }
}

/// One row of the best-sellers table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TopProduct {
    pub product_id: String,
    pub name: String,
    pub quantity: i64,
    /// Σ net line totals from the snapshots.
    pub revenue: Money,
}

/// Best sellers by units sold, highest first, at most `limit` rows.
///
/// Ties are broken by product name. Lines for deleted products are left out.
pub fn top_products(sales: &[&Sale], products: &[Product], limit: usize) -> Vec<TopProduct> {
    let index = index_products(products);
    let mut totals: HashMap<&str, TopProduct> = HashMap::new();

    for item in sales.iter().flat_map(|s| s.items.iter()) {
        let Some(product) = index.get(item.product_id.as_str()) else {
            continue;
        };
        let entry = totals
            .entry(product.id.as_str())
            .or_insert_with(|| TopProduct {
                product_id: product.id.clone(),
                name: product.name.clone(),
                quantity: 0,
                revenue: Money::zero(),
            });
        entry.quantity += item.quantity;
        entry.revenue += item.net();
    }

    let mut ranked: Vec<TopProduct> = totals.into_values().collect();
    ranked.sort_by(|a, b| {
        b.quantity
            .cmp(&a.quantity)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.product_id.cmp(&b.product_id))
    });
    ranked.truncate(limit);
    ranked
}

/// Revenue for one payment method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentShare {
    pub method: PaymentMethod,
    pub total: Money,
    pub count: usize,
    /// Share of overall revenue, zero when revenue is zero.
    pub percent: f64,
}

/// Revenue split across every payment method, including unused ones.
pub fn payment_breakdown(sales: &[&Sale]) -> Vec<PaymentShare> {
    let revenue: Money = sales.iter().map(|s| s.total).sum();

    PaymentMethod::ALL
        .iter()
        .map(|&method| {
            let matching = sales.iter().filter(|s| s.payment_method == method);
            let total: Money = matching.clone().map(|s| s.total).sum();
            PaymentShare {
                method,
                total,
                count: matching.count(),
                percent: total.percent_of(revenue),
            }
        })
        .collect()
}

/// `(current − previous) / previous × 100`, reported as 0 when `previous`
/// is 0.
pub fn percent_change(current: i64, previous: i64) -> f64 {
    if previous == 0 {
        return 0.0;
    }
    (current - previous) as f64 / previous as f64 * 100.0
}

/// Change against the previous window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PeriodChange {
    pub previous: SalesSummary,
    pub revenue_percent: f64,
    pub transactions_percent: f64,
}

impl PeriodChange {
    pub fn compute(current: &SalesSummary, previous: SalesSummary) -> Self {
        PeriodChange {
            revenue_percent: percent_change(current.revenue.cents(), previous.revenue.cents()),
            transactions_percent: percent_change(
                current.transactions as i64,
                previous.transactions as i64,
            ),
            previous,
        }
    }
}

// =============================================================================
// Sales report
// =============================================================================

/// A sale as listed in a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RecentSale {
    pub id: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub customer_id: Option<String>,
    pub item_count: usize,
    pub total: Money,
    pub payment_method: PaymentMethod,
}

/// Everything the reports screen shows for one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesReport {
    pub period: Period,
    pub window: Window,
    pub summary: SalesSummary,
    pub profit: ProfitSummary,
    pub top_products: Vec<TopProduct>,
    pub payment_breakdown: Vec<PaymentShare>,
    pub change: PeriodChange,
    /// Newest first.
    pub recent_sales: Vec<RecentSale>,
}

impl SalesReport {
    pub fn build(
        period: Period,
        now: DateTime<FixedOffset>,
        sales: &[Sale],
        products: &[Product],
    ) -> Self {
        let window = period.window(now);
        let current = filter_sales(sales, &window);
        let previous = filter_sales(sales, &period.previous_window(now));

        let summary = SalesSummary::compute(&current);
        let change = PeriodChange::compute(&summary, SalesSummary::compute(&previous));

        let mut recent: Vec<&Sale> = current.clone();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let recent_sales = recent
            .into_iter()
            .take(RECENT_SALES_LIMIT)
            .map(|s| RecentSale {
                id: s.id.clone(),
                created_at: s.created_at,
                customer_id: s.customer_id.clone(),
                item_count: s.items.len(),
                total: s.total,
                payment_method: s.payment_method,
            })
            .collect();

        SalesReport {
            period,
            window,
            summary,
            profit: ProfitSummary::compute(&current, products),
            top_products: top_products(&current, products, TOP_PRODUCTS_LIMIT),
            payment_breakdown: payment_breakdown(&current),
            change,
            recent_sales,
        }
    }

    /// Rows for the spreadsheet export collaborator. Formatting of the
    /// workbook itself is not done here.
    pub fn to_sheets(&self) -> Vec<Sheet> {
        let summary = Sheet {
            name: "Summary".to_string(),
            headers: row(["Metric", "Value"]),
            rows: vec![
                row(["Period", &self.period.label()]),
                row(["Revenue", &self.summary.revenue.to_string()]),
                row(["Transactions", &self.summary.transactions.to_string()]),
                row(["Average sale", &self.summary.average.to_string()]),
                row(["Cost", &self.profit.cost.to_string()]),
                row(["Profit", &self.profit.profit.to_string()]),
                row(["Margin %", &format!("{:.1}", self.profit.margin_percent)]),
                row(["Revenue change %", &format!("{:.1}", self.change.revenue_percent)]),
            ],
        };

        let top = Sheet {
            name: "Top products".to_string(),
            headers: row(["#", "Product", "Quantity", "Revenue"]),
            rows: self
                .top_products
                .iter()
                .enumerate()
                .map(|(i, p)| {
                    row([
                        &(i + 1).to_string(),
                        &p.name,
                        &p.quantity.to_string(),
                        &p.revenue.to_string(),
                    ])
                })
                .collect(),
        };

        let payments = Sheet {
            name: "Payment methods".to_string(),
            headers: row(["Method", "Sales", "Total", "Share %"]),
            rows: self
                .payment_breakdown
                .iter()
                .map(|p| {
                    row([
                        p.method.as_str(),
                        &p.count.to_string(),
                        &p.total.to_string(),
                        &format!("{:.1}", p.percent),
                    ])
                })
                .collect(),
        };

        let recent = Sheet {
            name: "Recent sales".to_string(),
            headers: row(["Date", "Sale", "Items", "Total", "Payment"]),
            rows: self
                .recent_sales
                .iter()
                .map(|s| {
                    row([
                        &s.created_at.format("%Y-%m-%d %H:%M").to_string(),
                        &s.id,
                        &s.item_count.to_string(),
                        &s.total.to_string(),
                        s.payment_method.as_str(),
                    ])
                })
                .collect(),
        };

        vec![summary, top, payments, recent]
    }
}

/// One worksheet of plain cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn row<const N: usize>(cells: [&str; N]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

// =============================================================================
// Dashboard
// =============================================================================

/// Tiles on the dashboard home screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DashboardStats {
    pub today: SalesSummary,
    pub product_count: usize,
    pub customer_count: usize,
    pub low_stock_count: usize,
    /// Customers with at least one purchase.
    pub active_customers: usize,
}

impl DashboardStats {
    pub fn compute(
        products: &[Product],
        customers: &[Customer],
        sales: &[Sale],
        now: DateTime<FixedOffset>,
    ) -> Self {
        let today = filter_sales(sales, &Period::Today.window(now));
        DashboardStats {
            today: SalesSummary::compute(&today),
            product_count: products.len(),
            customer_count: customers.len(),
            low_stock_count: low_stock(products).len(),
            active_customers: customers.iter().filter(|c| c.is_active()).count(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::DiscountRate;
    use crate::types::SaleItem;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(5 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 3, 10, 15, 0, 0)
            .unwrap()
    }

    fn product(id: &str, name: &str, cost: i64, price: i64, qty: i64, min: i64) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            category: "Oziq-ovqat".to_string(),
            brand: "Dokon".to_string(),
            cost_price: Money::from_cents(cost),
            selling_price: Money::from_cents(price),
            discount: DiscountRate::zero(),
            quantity: qty,
            min_quantity: min,
            barcode: String::new(),
            description: String::new(),
            image_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn item(product_id: &str, quantity: i64, price: i64) -> SaleItem {
        SaleItem {
            product_id: product_id.to_string(),
            quantity,
            price: Money::from_cents(price),
            discount: DiscountRate::zero(),
        }
    }

    fn sale(
        id: &str,
        total: i64,
        method: PaymentMethod,
        ago: Duration,
        items: Vec<SaleItem>,
    ) -> Sale {
        Sale {
            id: id.to_string(),
            customer_id: None,
            user_id: "u-1".to_string(),
            items,
            total: Money::from_cents(total),
            payment_method: method,
            created_at: now().with_timezone(&Utc) - ago,
        }
    }

    #[test]
    fn test_low_stock_set() {
        let products = vec![
            product("a", "A", 1, 2, 3, 5),
            product("b", "B", 1, 2, 13, 5),
            product("c", "C", 1, 2, 5, 5),
        ];
        let low: Vec<&str> = low_stock(&products).iter().map(|p| p.id.as_str()).collect();
        assert_eq!(low, vec!["a", "c"]);
    }

    #[test]
    fn test_summary_of_no_sales_is_zero() {
        let summary = SalesSummary::compute(&[]);
        assert_eq!(summary.transactions, 0);
        assert!(summary.revenue.is_zero());
        assert!(summary.average.is_zero());
    }

    #[test]
    fn test_summary_and_payment_breakdown() {
        let sales = vec![
            sale("1", 10_000, PaymentMethod::Cash, Duration::hours(1), vec![]),
            sale("2", 20_000, PaymentMethod::Card, Duration::hours(2), vec![]),
            sale("3", 5_000, PaymentMethod::Cash, Duration::hours(3), vec![]),
            sale("old", 99_000, PaymentMethod::Cash, Duration::days(3), vec![]),
        ];
        let today = filter_sales(&sales, &Period::Today.window(now()));

        let summary = SalesSummary::compute(&today);
        assert_eq!(summary.transactions, 3);
        assert_eq!(summary.revenue.cents(), 35_000);
        assert_eq!(summary.average.cents(), 35_000 / 3);

        let breakdown = payment_breakdown(&today);
        assert_eq!(breakdown.len(), 3);
        assert_eq!(breakdown[0].method, PaymentMethod::Cash);
        assert_eq!(breakdown[0].total.cents(), 15_000);
        assert!((breakdown[0].percent - 42.857).abs() < 0.01);
        assert_eq!(breakdown[1].total.cents(), 20_000);
        assert!((breakdown[1].percent - 57.142).abs() < 0.01);
        assert_eq!(breakdown[2].count, 0);
        assert_eq!(breakdown[2].percent, 0.0);
    }

    #[test]
    fn test_payment_breakdown_without_revenue() {
        let breakdown = payment_breakdown(&[]);
        assert!(breakdown.iter().all(|p| p.percent == 0.0 && p.total.is_zero()));
    }

    #[test]
    fn test_top_products_ranking() {
        let products = vec![
            product("a", "Apple", 10, 20, 100, 1),
            product("b", "Banana", 10, 20, 100, 1),
            product("c", "Cherry", 10, 20, 100, 1),
        ];
        let sales = vec![
            sale(
                "1",
                0,
                PaymentMethod::Cash,
                Duration::hours(1),
                vec![item("a", 3, 20), item("b", 4, 20)],
            ),
            sale(
                "2",
                0,
                PaymentMethod::Cash,
                Duration::hours(1),
                vec![item("a", 2, 20), item("b", 5, 20), item("c", 2, 20)],
            ),
            sale("3", 0, PaymentMethod::Cash, Duration::hours(1), vec![item("gone", 50, 20)]),
        ];
        let refs: Vec<&Sale> = sales.iter().collect();

        let ranked: Vec<String> = top_products(&refs, &products, 5)
            .into_iter()
            .map(|p| p.product_id)
            .collect();
        assert_eq!(ranked, vec!["b", "a", "c"]);

        assert_eq!(top_products(&refs, &products, 1).len(), 1);
    }

    #[test]
    fn test_top_products_tie_broken_by_name() {
        let products = vec![product("z", "Zira", 1, 2, 9, 1), product("y", "Anor", 1, 2, 9, 1)];
        let sales = vec![sale(
            "1",
            0,
            PaymentMethod::Cash,
            Duration::hours(1),
            vec![item("z", 2, 2), item("y", 2, 2)],
        )];
        let refs: Vec<&Sale> = sales.iter().collect();
        let ranked = top_products(&refs, &products, 5);
        assert_eq!(ranked[0].name, "Anor");
    }

    #[test]
    fn test_profit_uses_snapshot_revenue_and_current_cost() {
        // Price went up since the sale; revenue still uses the snapshot
        let products = vec![product("a", "A", 600, 2_000, 10, 1)];
        let mut discounted = item("a", 2, 1_000);
        discounted.discount = DiscountRate::from_percent(10);
        let sales = vec![sale(
            "1",
            1_800,
            PaymentMethod::Cash,
            Duration::hours(1),
            vec![discounted, item("deleted", 1, 500)],
        )];
        let refs: Vec<&Sale> = sales.iter().collect();

        let profit = ProfitSummary::compute(&refs, &products);
        assert_eq!(profit.revenue.cents(), 1_800);
        assert_eq!(profit.cost.cents(), 1_200);
        assert_eq!(profit.profit.cents(), 600);
        assert!((profit.margin_percent - 33.333).abs() < 0.01);
        assert_eq!(profit.unresolved_lines, 1);
    }

    #[test]
    fn test_profit_margin_zero_without_revenue() {
        let profit = ProfitSummary::compute(&[], &[]);
        assert_eq!(profit.margin_percent, 0.0);
    }

    #[test]
    fn test_percent_change() {
        assert_eq!(percent_change(150, 100), 50.0);
        assert_eq!(percent_change(50, 100), -50.0);
        assert_eq!(percent_change(100, 0), 0.0);
    }

    #[test]
    fn test_sales_report_with_previous_period() {
        let products = vec![product("a", "A", 500, 1_000, 10, 1)];
        let sales = vec![
            sale(
                "today-1",
                3_000,
                PaymentMethod::Cash,
                Duration::hours(1),
                vec![item("a", 3, 1_000)],
            ),
            sale(
                "today-2",
                1_000,
                PaymentMethod::Online,
                Duration::hours(2),
                vec![item("a", 1, 1_000)],
            ),
            sale(
                "yesterday",
                2_000,
                PaymentMethod::Card,
                Duration::hours(24),
                vec![item("a", 2, 1_000)],
            ),
        ];

        let report = SalesReport::build(Period::Today, now(), &sales, &products);
        assert_eq!(report.summary.revenue.cents(), 4_000);
        assert_eq!(report.change.previous.revenue.cents(), 2_000);
        assert_eq!(report.change.revenue_percent, 100.0);
        assert_eq!(report.top_products[0].quantity, 4);
        assert_eq!(report.recent_sales[0].id, "today-1");

        let sheets = report.to_sheets();
        assert_eq!(sheets.len(), 4);
        assert_eq!(sheets[1].rows.len(), 1);
        assert_eq!(sheets[2].rows.len(), 3);
        assert_eq!(sheets[3].rows.len(), 2);
        assert_eq!(sheets[0].rows[1], vec!["Revenue".to_string(), "40.00".to_string()]);
    }

    #[test]
    fn test_dashboard_and_inventory_stats() {
        let products = vec![
            product("a", "A", 500, 1_000, 3, 5),
            product("b", "B", 100, 300, 10, 2),
        ];
        let customers: Vec<Customer> = serde_json::from_value(serde_json::json!([
            { "id": "c1", "name": "Aziza", "phone": "+998901112233", "total_purchases": 5000,
              "created_at": "2026-03-01T00:00:00Z", "updated_at": "2026-03-01T00:00:00Z" },
            { "id": "c2", "name": "Bobur", "phone": "+998907778899",
              "created_at": "2026-03-01T00:00:00Z", "updated_at": "2026-03-01T00:00:00Z" }
        ]))
        .unwrap();
        let sales = vec![sale("1", 2_500, PaymentMethod::Cash, Duration::hours(1), vec![])];

        let stats = DashboardStats::compute(&products, &customers, &sales, now());
        assert_eq!(stats.today.revenue.cents(), 2_500);
        assert_eq!(stats.product_count, 2);
        assert_eq!(stats.low_stock_count, 1);
        assert_eq!(stats.customer_count, 2);
        assert_eq!(stats.active_customers, 1);

        let inventory = InventoryStats::compute(&products);
        assert_eq!(inventory.total_units, 13);
        assert_eq!(inventory.retail_value.cents(), 3_000 + 3_000);
        assert_eq!(inventory.cost_value.cents(), 1_500 + 1_000);
    }

    #[test]
    fn test_search() {
        let products = vec![product("a", "Sut 1L", 1, 2, 3, 1), product("b", "Non", 1, 2, 3, 1)];
        assert_eq!(search_products(&products, "sut").len(), 1);
        assert_eq!(search_products(&products, "").len(), 2);
    }
}
