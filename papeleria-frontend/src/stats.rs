//! Dashboard figures computed from the sales history.
//!
//! The current window runs from the range start onwards; the prior window is the span of the
//! same length that ends where the current one starts.

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{Product, Transaction};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    #[default]
    Day,
    Week,
    Month,
}

impl TimeRange {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeRange::Day => "day",
            TimeRange::Week => "week",
            TimeRange::Month => "month",
        }
    }

    pub fn window_start(self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            TimeRange::Day => now - Duration::days(1),
            TimeRange::Week => now - Duration::days(7),
            TimeRange::Month => now
                .checked_sub_months(Months::new(1))
                .unwrap_or_else(|| now - Duration::days(30)),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProductRank {
    pub product_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DashboardStats {
    pub range: TimeRange,
    pub window_start: DateTime<Utc>,
    pub prior_window_start: DateTime<Utc>,
    pub total_sales: f64,
    pub units_sold: i64,
    pub transaction_count: usize,
    pub prior_total: f64,
    /// Percent change against the prior window; 0 when the prior window sold nothing.
    pub growth_percent: f64,
    pub average_ticket: f64,
    /// Share of `total_sales + prior_total`, in percent.
    pub current_share: f64,
    pub prior_share: f64,
    pub top_products: Vec<ProductRank>,
}

impl DashboardStats {
    /// Fills in product names the catalog knows about.
    pub fn annotate(&mut self, catalog: &[Product]) {
        for rank in &mut self.top_products {
            rank.name = catalog
                .iter()
                .find(|p| p.id == rank.product_id)
                .map(|p| p.name.clone());
        }
    }
}

pub fn growth_percent(current: f64, prior: f64) -> f64 {
    if prior > 0.0 {
        (current - prior) / prior * 100.0
    } else {
        0.0
    }
}

pub fn aggregate(
    sales: &[Transaction],
    range: TimeRange,
    now: DateTime<Utc>,
    top_n: usize,
) -> DashboardStats {
    let window_start = range.window_start(now);
    let prior_window_start = window_start - (now - window_start);

    let current: Vec<&Transaction> = sales.iter().filter(|s| s.date >= window_start).collect();
    let prior_total: f64 = sales
        .iter()
        .filter(|s| s.date < window_start && s.date >= prior_window_start)
        .map(|s| s.total)
        .sum();

    let total_sales: f64 = current.iter().map(|s| s.total).sum();
    let units_sold: i64 = current
        .iter()
        .flat_map(|s| s.items.iter())
        .map(|item| item.quantity)
        .sum();
    let transaction_count = current.len();

    let average_ticket = if transaction_count > 0 {
        total_sales / transaction_count as f64
    } else {
        0.0
    };

    let (current_share, prior_share) = if total_sales + prior_total > 0.0 {
        let both = total_sales + prior_total;
        (total_sales / both * 100.0, prior_total / both * 100.0)
    } else {
        (0.0, 0.0)
    };

    DashboardStats {
        range,
        window_start,
        prior_window_start,
        total_sales,
        units_sold,
        transaction_count,
        prior_total,
        growth_percent: growth_percent(total_sales, prior_total),
        average_ticket,
        current_share,
        prior_share,
        top_products: top_products(&current, top_n),
    }
}

/// Products by summed quantity; ties keep the order in which products were first seen.
fn top_products(sales: &[&Transaction], limit: usize) -> Vec<ProductRank> {
    let mut position: HashMap<i64, usize> = HashMap::new();
    let mut ranks: Vec<ProductRank> = Vec::new();

    for item in sales.iter().flat_map(|s| s.items.iter()) {
        match position.get(&item.product_id) {
            Some(&i) => ranks[i].quantity += item.quantity,
            None => {
                position.insert(item.product_id, ranks.len());
                ranks.push(ProductRank {
                    product_id: item.product_id,
                    name: None,
                    quantity: item.quantity,
                });
            }
        }
    }

    // stable
    ranks.sort_by(|a, b| b.quantity.cmp(&a.quantity));
    ranks.truncate(limit);
    ranks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionLine;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 15, 12, 0, 0).unwrap()
    }

    fn sale(id: i64, hours_ago: i64, total: f64, lines: &[(i64, i64)]) -> Transaction {
        Transaction {
            id,
            counterparty_id: Some(1),
            date: now() - Duration::hours(hours_ago),
            items: lines
                .iter()
                .map(|&(product_id, quantity)| TransactionLine {
                    product_id,
                    quantity,
                    unit_price: 1.0,
                    subtotal: quantity as f64,
                })
                .collect(),
            total,
        }
    }

    #[test]
    fn growth_against_prior_day() {
        let sales = vec![
            sale(1, 2, 100.0, &[(1, 2)]),
            sale(2, 5, 50.0, &[(2, 1)]),
            sale(3, 30, 100.0, &[(1, 4)]),
            // outside both windows
            sale(4, 60, 999.0, &[(3, 9)]),
        ];
        let stats = aggregate(&sales, TimeRange::Day, now(), 5);

        assert_eq!(stats.total_sales, 150.0);
        assert_eq!(stats.prior_total, 100.0);
        assert!((stats.growth_percent - 50.0).abs() < 1e-9);
        assert_eq!(stats.transaction_count, 2);
        assert_eq!(stats.units_sold, 3);
        assert_eq!(stats.average_ticket, 75.0);
        assert!((stats.current_share - 60.0).abs() < 1e-9);
        assert!((stats.prior_share - 40.0).abs() < 1e-9);
    }

    #[test]
    fn growth_is_zero_without_prior_sales() {
        for current in [0.0, 0.01, 150.0, 1e9] {
            assert_eq!(growth_percent(current, 0.0), 0.0);
        }

        let stats = aggregate(&[sale(1, 1, 80.0, &[(1, 1)])], TimeRange::Week, now(), 5);
        assert_eq!(stats.prior_total, 0.0);
        assert_eq!(stats.growth_percent, 0.0);
    }

    #[test]
    fn empty_history_has_zero_average_ticket() {
        let stats = aggregate(&[], TimeRange::Month, now(), 5);
        assert_eq!(stats.transaction_count, 0);
        assert_eq!(stats.average_ticket, 0.0);
        assert_eq!(stats.current_share, 0.0);
        assert!(stats.top_products.is_empty());
    }

    #[test]
    fn window_boundaries() {
        let start = TimeRange::Week.window_start(now());
        assert_eq!(start, now() - Duration::days(7));

        let sales = vec![
            sale(1, 24 * 7, 10.0, &[]),     // exactly at the start: current
            sale(2, 24 * 14, 20.0, &[]),    // exactly at the prior start: prior
            sale(3, 24 * 14 + 1, 40.0, &[]), // before the prior window
        ];
        let stats = aggregate(&sales, TimeRange::Week, now(), 5);
        assert_eq!(stats.total_sales, 10.0);
        assert_eq!(stats.prior_total, 20.0);
    }

    #[test]
    fn month_is_a_calendar_month() {
        let start = TimeRange::Month.window_start(now());
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 2, 15, 12, 0, 0).unwrap());
    }

    #[test]
    fn top_products_by_quantity_with_first_seen_ties() {
        let sales = vec![
            sale(1, 1, 1.0, &[(7, 2), (3, 5)]),
            sale(2, 2, 1.0, &[(9, 2), (7, 1), (4, 1)]),
        ];
        let stats = aggregate(&sales, TimeRange::Day, now(), 3);
        let ranking: Vec<(i64, i64)> = stats
            .top_products
            .iter()
            .map(|r| (r.product_id, r.quantity))
            .collect();
        assert_eq!(ranking, vec![(3, 5), (7, 3), (9, 2)]);
    }

    #[test]
    fn annotate_adds_known_names() {
        let mut stats = aggregate(&[sale(1, 1, 1.0, &[(2, 1), (5, 1)])], TimeRange::Day, now(), 5);
        let catalog = vec![Product {
            id: 2,
            code: "00002".into(),
            name: "Borrador".into(),
            description: String::new(),
            price: 0.3,
            stock: 10,
            category_id: None,
            supplier_id: None,
        }];
        stats.annotate(&catalog);
        assert_eq!(stats.top_products[0].name.as_deref(), Some("Borrador"));
        assert_eq!(stats.top_products[1].name, None);
    }
}
