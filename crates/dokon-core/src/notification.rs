//! # Notification Center
//!
//! Alert rules evaluated against entity snapshots, and the read/unread list
//! they feed. The timer that drives evaluation lives in the app; this module
//! only decides what is new.
//!
//! ## Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Rule            Kind      Fires when                    Deduplicated by│
//! │  ──────────────  ────────  ────────────────────────────  ───────────────│
//! │  Low stock       warning   product.quantity <= min       product id,    │
//! │                                                          until it       │
//! │                                                          recovers       │
//! │  Sales today     success   a sale exists on today's      calendar day   │
//! │                            local date                                   │
//! │  New customer    info      customer.created_at is newer  last evaluation│
//! │                            than the last evaluation      timestamp      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The list keeps the newest `capacity` notifications; older ones are
//! dropped silently.

use std::collections::HashSet;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use uuid::Uuid;

use crate::types::{
    Customer, NewNotification, Notification, NotificationAction, NotificationKind, Product, Sale,
    Screen,
};
use crate::DEFAULT_NOTIFICATION_CAPACITY;

/// The collections the rules look at.
#[derive(Debug, Clone, Copy)]
pub struct WatchSnapshot<'a> {
    pub products: &'a [Product],
    pub sales: &'a [Sale],
    pub customers: &'a [Customer],
}

/// Alert list plus the rule state that keeps alerts from repeating.
#[derive(Debug, Clone)]
pub struct NotificationCenter {
    /// Newest first.
    items: Vec<Notification>,
    capacity: usize,
    /// Products that already have a low-stock alert.
    low_stock_alerted: HashSet<String>,
    /// Day the "sales today" alert was last raised for.
    sales_alert_day: Option<NaiveDate>,
    last_evaluated: DateTime<Utc>,
}

impl NotificationCenter {
    /// Creates an empty center. Customers created before `now` never raise
    /// a "new customer" alert.
    pub fn new(capacity: usize, now: DateTime<Utc>) -> Self {
        NotificationCenter {
            items: Vec::new(),
            capacity: capacity.max(1),
            low_stock_alerted: HashSet::new(),
            sales_alert_day: None,
            last_evaluated: now,
        }
    }

    pub fn with_default_capacity(now: DateTime<Utc>) -> Self {
        Self::new(DEFAULT_NOTIFICATION_CAPACITY, now)
    }

    // =========================================================================
    // Evaluation
    // =========================================================================

    /// Runs every rule once and returns the notifications it raised.
    ///
    /// Calling this twice with an unchanged snapshot raises nothing the
    /// second time.
    pub fn evaluate(
        &mut self,
        snapshot: WatchSnapshot<'_>,
        now: DateTime<FixedOffset>,
    ) -> Vec<Notification> {
        let now_utc = now.with_timezone(&Utc);
        let mut raised = Vec::new();

        // Low stock: one alert per product, released once it recovers
        let low: HashSet<&str> = snapshot
            .products
            .iter()
            .filter(|p| p.is_low_stock())
            .map(|p| p.id.as_str())
            .collect();
        self.low_stock_alerted.retain(|id| low.contains(id.as_str()));

        for product in snapshot.products.iter().filter(|p| p.is_low_stock()) {
            if self.low_stock_alerted.insert(product.id.clone()) {
                raised.push(build(
                    NotificationKind::Warning,
                    format!("Low stock: {}", product.name),
                    format!(
                        "{} left, minimum is {}",
                        product.quantity, product.min_quantity
                    ),
                    Some(NotificationAction::view(Screen::Products)),
                    now_utc,
                ));
            }
        }

        // Sales today: once per local calendar day
        let today = now.date_naive();
        if self.sales_alert_day != Some(today) {
            let offset = *now.offset();
            let count = snapshot
                .sales
                .iter()
                .filter(|s| s.created_at.with_timezone(&offset).date_naive() == today)
                .count();
            if count > 0 {
                self.sales_alert_day = Some(today);
                raised.push(build(
                    NotificationKind::Success,
                    "New sales today".to_string(),
                    format!("{count} sales made today"),
                    Some(NotificationAction::view(Screen::Sales)),
                    now_utc,
                ));
            }
        }

        // New customers since the previous evaluation
        for customer in snapshot
            .customers
            .iter()
            .filter(|c| c.created_at > self.last_evaluated)
        {
            raised.push(build(
                NotificationKind::Info,
                "New customer".to_string(),
                format!("{} joined the customer list", customer.name),
                Some(NotificationAction::view(Screen::Customers)),
                now_utc,
            ));
        }
        // A customer stamped after `now` was still alerted above, so the
        // watermark covers it too
        let newest = snapshot.customers.iter().map(|c| c.created_at).max();
        self.last_evaluated = self.last_evaluated.max(now_utc).max(newest.unwrap_or(now_utc));

        for notification in &raised {
            self.push(notification.clone());
        }
        raised
    }

    // =========================================================================
    // List operations
    // =========================================================================

    /// Raises a notification by hand.
    pub fn add(&mut self, new: NewNotification, now: DateTime<Utc>) -> Notification {
        let notification = build(new.kind, new.title, new.message, new.action, now);
        self.push(notification.clone());
        notification
    }

    /// Returns whether a notification with this id exists.
    pub fn mark_as_read(&mut self, id: &str) -> bool {
        match self.items.iter_mut().find(|n| n.id == id) {
            Some(notification) => {
                notification.read = true;
                true
            }
            None => false,
        }
    }

    pub fn mark_all_as_read(&mut self) {
        for notification in &mut self.items {
            notification.read = true;
        }
    }

    /// Returns whether a notification was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        self.items.len() != before
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| !n.read).count()
    }

    /// Newest first.
    pub fn notifications(&self) -> &[Notification] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn push(&mut self, notification: Notification) {
        self.items.insert(0, notification);
        self.items.truncate(self.capacity);
    }
}

fn build(
    kind: NotificationKind,
    title: String,
    message: String,
    action: Option<NotificationAction>,
    now: DateTime<Utc>,
) -> Notification {
    Notification {
        id: Uuid::new_v4().to_string(),
        kind,
        title,
        message,
        created_at: now,
        read: false,
        action,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::{DiscountRate, Money};
    use crate::types::PaymentMethod;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(5 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 3, 10, 15, 0, 0)
            .unwrap()
    }

    fn product(id: &str, quantity: i64, min_quantity: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {id}"),
            category: "Oziq-ovqat".to_string(),
            brand: "Dokon".to_string(),
            cost_price: Money::from_cents(100),
            selling_price: Money::from_cents(200),
            discount: DiscountRate::zero(),
            quantity,
            min_quantity,
            barcode: String::new(),
            description: String::new(),
            image_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sale(created_at: DateTime<Utc>) -> Sale {
        Sale {
            id: Uuid::new_v4().to_string(),
            customer_id: None,
            user_id: "u-1".to_string(),
            items: vec![],
            total: Money::from_cents(1_000),
            payment_method: PaymentMethod::Cash,
            created_at,
        }
    }

    fn customer(name: &str, created_at: DateTime<Utc>) -> Customer {
        Customer {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            phone: "+998900000000".to_string(),
            email: None,
            address: None,
            bonus_points: 0,
            total_purchases: Money::zero(),
            created_at,
            updated_at: created_at,
        }
    }

    fn center() -> NotificationCenter {
        NotificationCenter::with_default_capacity(now().with_timezone(&Utc) - Duration::minutes(5))
    }

    fn snapshot<'a>(
        products: &'a [Product],
        sales: &'a [Sale],
        customers: &'a [Customer],
    ) -> WatchSnapshot<'a> {
        WatchSnapshot {
            products,
            sales,
            customers,
        }
    }

    #[test]
    fn test_low_stock_alert_is_not_duplicated() {
        let mut center = center();
        let products = vec![product("a", 3, 5), product("b", 10, 5)];

        let first = center.evaluate(snapshot(&products, &[], &[]), now());
        let second = center.evaluate(snapshot(&products, &[], &[]), now() + Duration::minutes(1));

        assert_eq!(first.len(), 1);
        assert_eq!(first[0].kind, NotificationKind::Warning);
        assert!(second.is_empty());
        assert_eq!(center.len(), 1);
    }

    #[test]
    fn test_low_stock_alert_rearms_after_recovery() {
        let mut center = center();
        let low = vec![product("a", 3, 5)];
        let recovered = vec![product("a", 13, 5)];

        assert_eq!(center.evaluate(snapshot(&low, &[], &[]), now()).len(), 1);
        assert!(center.evaluate(snapshot(&recovered, &[], &[]), now()).is_empty());
        assert_eq!(center.evaluate(snapshot(&low, &[], &[]), now()).len(), 1);
    }

    #[test]
    fn test_sales_alert_once_per_day() {
        let mut center = center();
        let today_utc = now().with_timezone(&Utc);
        let sales = vec![
            sale(today_utc - Duration::hours(1)),
            sale(today_utc - Duration::hours(2)),
        ];

        let raised = center.evaluate(snapshot(&[], &sales, &[]), now());
        assert_eq!(raised.len(), 1);
        assert_eq!(raised[0].kind, NotificationKind::Success);
        assert!(raised[0].message.starts_with('2'));

        assert!(center.evaluate(snapshot(&[], &sales, &[]), now()).is_empty());

        // Next day, with a new sale on it
        let tomorrow = now() + Duration::days(1);
        let mut later = sales.clone();
        later.push(sale(tomorrow.with_timezone(&Utc)));
        assert_eq!(center.evaluate(snapshot(&[], &later, &[]), tomorrow).len(), 1);
    }

    #[test]
    fn test_yesterdays_sales_do_not_alert() {
        let mut center = center();
        let sales = vec![sale(now().with_timezone(&Utc) - Duration::days(1))];
        assert!(center.evaluate(snapshot(&[], &sales, &[]), now()).is_empty());
    }

    #[test]
    fn test_new_customer_alerts() {
        let mut center = center();
        let start = now().with_timezone(&Utc);
        let customers = vec![
            customer("Old", start - Duration::days(30)),
            customer("Aziza", start - Duration::minutes(1)),
        ];

        let raised = center.evaluate(snapshot(&[], &[], &customers), now());
        assert_eq!(raised.len(), 1);
        assert_eq!(raised[0].kind, NotificationKind::Info);
        assert!(raised[0].message.contains("Aziza"));

        assert!(center
            .evaluate(snapshot(&[], &[], &customers), now() + Duration::minutes(1))
            .is_empty());
    }

    #[test]
    fn test_customer_stamped_after_now_alerts_once() {
        let mut center = center();
        let customers = vec![customer("Jasur", now().with_timezone(&Utc) + Duration::seconds(5))];

        assert_eq!(center.evaluate(snapshot(&[], &[], &customers), now()).len(), 1);
        assert!(center
            .evaluate(snapshot(&[], &[], &customers), now() + Duration::seconds(1))
            .is_empty());
    }

    #[test]
    fn test_read_state() {
        let mut center = center();
        let products = vec![product("a", 0, 1), product("b", 0, 1)];
        let raised = center.evaluate(snapshot(&products, &[], &[]), now());
        assert_eq!(center.unread_count(), 2);

        assert!(center.mark_as_read(&raised[0].id));
        assert!(!center.mark_as_read("missing"));
        assert_eq!(center.unread_count(), 1);

        center.mark_all_as_read();
        assert_eq!(center.unread_count(), 0);

        assert!(center.remove(&raised[1].id));
        assert_eq!(center.len(), 1);
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut center = NotificationCenter::new(3, now().with_timezone(&Utc));
        for i in 0..5 {
            center.add(
                NewNotification {
                    kind: NotificationKind::Info,
                    title: format!("n{i}"),
                    message: String::new(),
                    action: None,
                },
                Utc::now(),
            );
        }
        let titles: Vec<&str> = center.notifications().iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["n4", "n3", "n2"]);
    }
}
