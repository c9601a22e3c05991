use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cart::LineItem;
use crate::models::{Product, Transaction};
use crate::totals::{money, DisplayTotals, Totals};

/// What an invoice renderer needs after a successful checkout.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Receipt {
    /// Absent when the remote API accepted the transaction but its answer was unreadable.
    pub transaction_id: Option<i64>,
    pub counterparty_id: i64,
    pub date: DateTime<Utc>,
    pub lines: Vec<ReceiptLine>,
    pub totals: DisplayTotals,
    /// Total as recorded by the remote API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recorded_total: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReceiptLine {
    pub product_id: i64,
    pub product: String,
    pub quantity: i64,
    pub unit_price: String,
    pub subtotal: String,
}

impl Receipt {
    /// Lines and totals come from the submitted cart; `created` adds what the remote API
    /// recorded, when known.
    pub fn new(
        created: Option<&Transaction>,
        counterparty_id: i64,
        items: &[LineItem],
        catalog: &[Product],
    ) -> Self {
        let lines = items
            .iter()
            .map(|item| ReceiptLine {
                product_id: item.product_id,
                product: catalog
                    .iter()
                    .find(|p| p.id == item.product_id)
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| format!("#{}", item.product_id)),
                quantity: item.quantity,
                unit_price: money(item.unit_price),
                subtotal: money(item.subtotal()),
            })
            .collect();

        Self {
            transaction_id: created.map(|t| t.id),
            counterparty_id: created
                .and_then(|t| t.counterparty_id)
                .unwrap_or(counterparty_id),
            date: created.map_or_else(Utc::now, |t| t.date),
            lines,
            totals: Totals::from_items(items).display(),
            recorded_total: created.map(|t| money(t.total)),
        }
    }
}
